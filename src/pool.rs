//! Per-invocation variable pool.
//!
//! Decision atoms are keyed by [`Atom`], auxiliary counter blocks by
//! [`Namespace`]. Allocating either key twice is a caller bug and is reported
//! as [`Error::NamingCollision`].

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::lit::{Lit, Var};
use crate::model::{Slot, Team};
use crate::Error;

static NEXT_RUN: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RunId(pub u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A named decision atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Atom {
    /// `cell(period, week).slot == team`
    Assign { period: usize, week: usize, slot: Slot, team: Team },
    /// `cell(period, week)` hosts `low` against `high`, in either order.
    Meets { period: usize, week: usize, low: Team, high: Team },
    /// `team` takes `slot` in some period of `week`.
    Plays { week: usize, slot: Slot, team: Team },
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::Assign { period, week, slot, team } => {
                write!(f, "p{} w{} {}={}", period, week, slot, team)
            }
            Atom::Meets { period, week, low, high } => {
                write!(f, "p{} w{} meets {}-{}", period, week, low, high)
            }
            Atom::Plays { week, slot, team } => write!(f, "w{} {} {}", week, slot, team),
        }
    }
}

/// Constraint family and indices owning a block of counter variables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Family {
    Domain { period: usize, week: usize, slot: Slot },
    TeamWeek { team: Team, week: usize },
    Pair { low: Team, high: Team },
    TeamPeriod { team: Team, period: usize },
    Home { team: Team },
    Away { team: Team },
    /// Free-form key for callers outside the round-robin model.
    Custom(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Part {
    Whole,
    Upper,
    Lower,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Namespace {
    pub family: Family,
    pub part: Part,
}

impl Namespace {
    pub fn new(family: Family) -> Namespace {
        Namespace { family, part: Part::Whole }
    }

    /// Sub-namespace for the at-most half of a two-sided bound.
    pub fn upper(self) -> Namespace {
        Namespace { part: Part::Upper, ..self }
    }

    /// Sub-namespace for the at-least half of a two-sided bound.
    pub fn lower(self) -> Namespace {
        Namespace { part: Part::Lower, ..self }
    }
}

impl From<Family> for Namespace {
    fn from(family: Family) -> Namespace {
        Namespace::new(family)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.family {
            Family::Domain { period, week, slot } => write!(f, "domain_p{}_w{}_{}", period, week, slot)?,
            Family::TeamWeek { team, week } => write!(f, "team_{}_week_{}", team, week)?,
            Family::Pair { low, high } => write!(f, "pair_{}_{}", low, high)?,
            Family::TeamPeriod { team, period } => write!(f, "team_{}_period_{}", team, period)?,
            Family::Home { team } => write!(f, "home_team_{}", team)?,
            Family::Away { team } => write!(f, "away_team_{}", team)?,
            Family::Custom(key) => write!(f, "custom_{}", key)?,
        }
        match self.part {
            Part::Whole => Ok(()),
            Part::Upper => write!(f, "_upper"),
            Part::Lower => write!(f, "_lower"),
        }
    }
}

/// Where a variable came from, for diagnostics and DIMACS comments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Atom(Atom),
    Counter { namespace: Namespace, row: usize, col: usize },
}

#[derive(Debug)]
pub struct Pool {
    run: RunId,
    origins: Vec<Origin>,
    atoms: HashMap<Atom, Var>,
    namespaces: HashSet<Namespace>,
}

impl Default for Pool {
    fn default() -> Self {
        Pool::new()
    }
}

impl Pool {
    pub fn new() -> Pool {
        Pool::with_run(RunId(NEXT_RUN.fetch_add(1, Ordering::Relaxed)))
    }

    pub fn with_run(run: RunId) -> Pool {
        Pool {
            run,
            origins: Vec::new(),
            atoms: HashMap::new(),
            namespaces: HashSet::new(),
        }
    }

    pub fn run(&self) -> RunId {
        self.run
    }

    pub fn num_vars(&self) -> usize {
        self.origins.len()
    }

    pub fn origin(&self, var: Var) -> Option<Origin> {
        self.origins.get(var.index()).copied()
    }

    fn fresh(&mut self, origin: Origin) -> Var {
        let v = Var::from_index(self.origins.len());
        self.origins.push(origin);
        v
    }

    pub fn atom(&mut self, atom: Atom) -> Result<Lit, Error> {
        if self.atoms.contains_key(&atom) {
            return Err(Error::NamingCollision(format!("{} atom {}", self.run, atom)));
        }
        let v = self.fresh(Origin::Atom(atom));
        self.atoms.insert(atom, v);
        Ok(v.positive())
    }

    pub fn lookup(&self, atom: &Atom) -> Option<Lit> {
        self.atoms.get(atom).map(|v| v.positive())
    }

    /// Allocates a `rows` x `cols` block of counter variables owned by
    /// `namespace`. An empty block still claims the namespace.
    pub fn counters(&mut self, namespace: Namespace, rows: usize, cols: usize) -> Result<Vec<Vec<Lit>>, Error> {
        if !self.namespaces.insert(namespace) {
            return Err(Error::NamingCollision(format!("{} namespace {}", self.run, namespace)));
        }

        let mut block = Vec::with_capacity(rows);
        for row in 0..rows {
            let mut r = Vec::with_capacity(cols);
            for col in 0..cols {
                r.push(self.fresh(Origin::Counter { namespace, row, col }).positive());
            }
            block.push(r);
        }
        Ok(block)
    }

    pub fn reserve(&mut self, namespace: Namespace) -> Result<(), Error> {
        self.counters(namespace, 0, 0).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_are_fresh_and_named() {
        let mut pool = Pool::with_run(RunId(7));
        let ns = Namespace::new(Family::TeamWeek { team: 3, week: 1 });
        let block = pool.counters(ns, 2, 3).unwrap();
        assert_eq!(pool.num_vars(), 6);
        assert_eq!(block[1][2].var().index(), 5);
        assert_eq!(
            pool.origin(block[1][0].var()),
            Some(Origin::Counter { namespace: ns, row: 1, col: 0 })
        );
    }

    #[test]
    fn namespace_reuse_is_a_collision() {
        let mut pool = Pool::new();
        let ns = Namespace::new(Family::Pair { low: 1, high: 2 });
        pool.reserve(ns).unwrap();
        match pool.counters(ns, 1, 1) {
            Err(Error::NamingCollision(msg)) => assert!(msg.contains("pair_1_2")),
            other => panic!("expected collision, got {:?}", other),
        }
        // An empty block claims the namespace as firmly as a full one.
        let full = Namespace::new(Family::Home { team: 1 });
        pool.counters(full, 2, 2).unwrap();
        assert!(matches!(pool.reserve(full), Err(Error::NamingCollision(_))));
        // Upper and lower parts are distinct keys.
        pool.reserve(ns.upper()).unwrap();
        pool.reserve(ns.lower()).unwrap();
    }

    #[test]
    fn atom_reuse_is_a_collision() {
        let mut pool = Pool::new();
        let atom = Atom::Assign { period: 0, week: 0, slot: Slot::Home, team: 1 };
        let lit = pool.atom(atom).unwrap();
        assert_eq!(pool.lookup(&atom), Some(lit));
        assert!(matches!(pool.atom(atom), Err(Error::NamingCollision(_))));
    }

    #[test]
    fn pools_get_distinct_runs() {
        assert_ne!(Pool::new().run(), Pool::new().run());
    }
}
