//! Boolean atoms and clause sets.
//!
//! Everything the encoder and the model builder produce is expressed in terms
//! of [`Lit`]. Integer-valued decision variables are one-hot expanded before
//! they reach this layer, so any clause-level oracle can consume a
//! [`Constraint`] directly.

use std::fmt;
use std::ops::Not;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Var(u32);

impl Var {
    pub(crate) fn from_index(index: usize) -> Var {
        Var(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn positive(self) -> Lit {
        Lit(self.0 << 1)
    }

    pub fn negative(self) -> Lit {
        Lit(self.0 << 1 | 1)
    }
}

/// A variable and a sign packed into one word; the low bit is the sign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Lit(u32);

impl Lit {
    pub fn var(self) -> Var {
        Var(self.0 >> 1)
    }

    pub fn is_negated(self) -> bool {
        self.0 & 1 == 1
    }

    /// Truth value of this literal when its variable has value `var_value`.
    pub fn eval(self, var_value: bool) -> bool {
        var_value != self.is_negated()
    }

    /// 1-based signed integer form used by DIMACS and IPASIR-style solvers.
    pub fn to_dimacs(self) -> i32 {
        let v = self.var().0 as i32 + 1;
        if self.is_negated() {
            -v
        } else {
            v
        }
    }
}

impl Not for Lit {
    type Output = Lit;
    fn not(self) -> Lit {
        Lit(self.0 ^ 1)
    }
}

impl fmt::Display for Lit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

/// A conjunction of clauses.
///
/// The empty conjunction is trivially true; a conjunction holding the empty
/// clause is trivially false. Clauses are stored back to back in one literal
/// buffer, `ends[i]` being the end of clause `i`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constraint {
    lits: Vec<Lit>,
    ends: Vec<usize>,
}

impl Constraint {
    pub fn trivial() -> Constraint {
        Constraint::default()
    }

    pub fn contradiction() -> Constraint {
        let mut c = Constraint::default();
        c.push(None);
        c
    }

    pub fn push<I: IntoIterator<Item = Lit>>(&mut self, clause: I) {
        self.lits.extend(clause);
        self.ends.push(self.lits.len());
    }

    pub fn extend(&mut self, other: Constraint) {
        let offset = self.lits.len();
        self.lits.extend(other.lits);
        self.ends.extend(other.ends.into_iter().map(|end| end + offset));
    }

    pub fn and(mut self, other: Constraint) -> Constraint {
        self.extend(other);
        self
    }

    pub fn clauses(&self) -> impl Iterator<Item = &[Lit]> + '_ {
        self.ends.iter().scan(0, move |start, &end| {
            let clause = &self.lits[*start..end];
            *start = end;
            Some(clause)
        })
    }

    pub fn len(&self) -> usize {
        self.ends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ends.is_empty()
    }

    /// Total number of literal occurrences.
    pub fn num_lits(&self) -> usize {
        self.lits.len()
    }

    /// Largest variable index mentioned, plus one.
    pub fn num_vars(&self) -> usize {
        self.lits.iter().map(|l| l.var().index() + 1).max().unwrap_or(0)
    }

    /// Checks the conjunction under a total assignment.
    pub fn is_satisfied_by(&self, value: impl Fn(Var) -> bool) -> bool {
        self.clauses().all(|clause| clause.iter().any(|l| l.eval(value(l.var()))))
    }
}

impl std::iter::FromIterator<Vec<Lit>> for Constraint {
    fn from_iter<I: IntoIterator<Item = Vec<Lit>>>(iter: I) -> Constraint {
        let mut c = Constraint::default();
        for clause in iter {
            c.push(clause);
        }
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negation_flips_dimacs_sign() {
        let v = Var::from_index(4);
        assert_eq!(v.positive().to_dimacs(), 5);
        assert_eq!((!v.positive()).to_dimacs(), -5);
        assert_eq!(!!v.positive(), v.positive());
    }

    #[test]
    fn trivial_and_contradiction() {
        assert!(Constraint::trivial().is_satisfied_by(|_| false));
        assert!(!Constraint::contradiction().is_satisfied_by(|_| true));
    }

    #[test]
    fn satisfied_by_checks_every_clause() {
        let a = Var::from_index(0);
        let b = Var::from_index(1);
        let c: Constraint = vec![vec![a.positive(), b.positive()], vec![!a.positive()]]
            .into_iter()
            .collect();
        assert!(c.is_satisfied_by(|v| v == b));
        assert!(!c.is_satisfied_by(|v| v == a));
        assert_eq!(c.num_vars(), 2);
    }

    #[test]
    fn clauses_keep_their_boundaries() {
        let a = Var::from_index(0).positive();
        let b = Var::from_index(1).positive();
        let mut c = Constraint::trivial();
        c.push(vec![a, b]);
        c.push(None);
        let mut d = Constraint::trivial();
        d.push(vec![!b]);
        d.push(vec![!a, b]);
        c.extend(d);

        let clauses = c.clauses().map(|cl| cl.to_vec()).collect::<Vec<_>>();
        assert_eq!(clauses, vec![vec![a, b], vec![], vec![!b], vec![!a, b]]);
        assert_eq!((c.len(), c.num_lits()), (4, 5));
        assert_eq!(std::mem::size_of::<Lit>(), 4);
    }
}
