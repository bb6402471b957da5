//! Satisfiability oracles.

use std::time::Duration;

use log::*;

use crate::lit::{Constraint, Lit};
use crate::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Satisfiable,
    Unsatisfiable,
    /// The time budget ran out, or the engine gave up.
    Unknown,
}

/// An external decision procedure for clause sets.
///
/// The time budget is a soft cap; an oracle may overrun it slightly before
/// it notices. [`Oracle::value`] is only meaningful after
/// [`Verdict::Satisfiable`].
pub trait Oracle {
    fn add_constraint(&mut self, constraint: &Constraint);
    fn set_time_budget(&mut self, budget: Duration);
    fn solve(&mut self) -> Result<Verdict, Error>;
    fn value(&self, lit: Lit) -> Result<bool, Error>;
}

/// CaDiCaL through the `cadical` crate.
pub struct Cadical {
    solver: cadical::Solver<cadical::Timeout>,
    max_var: usize,
    budget: Option<Duration>,
    verdict: Option<Verdict>,
}

impl Default for Cadical {
    fn default() -> Self {
        Cadical::new()
    }
}

impl Cadical {
    pub fn new() -> Cadical {
        Cadical { solver: cadical::Solver::new(), max_var: 0, budget: None, verdict: None }
    }

    pub fn num_variables(&self) -> usize {
        self.solver.num_variables() as usize
    }

    pub fn num_clauses(&self) -> usize {
        self.solver.num_clauses() as usize
    }
}

impl Oracle for Cadical {
    fn add_constraint(&mut self, constraint: &Constraint) {
        self.max_var = self.max_var.max(constraint.num_vars());
        for clause in constraint.clauses() {
            self.solver.add_clause(clause.iter().map(|l| l.to_dimacs()));
        }
        self.verdict = None;
    }

    fn set_time_budget(&mut self, budget: Duration) {
        self.budget = Some(budget);
    }

    fn solve(&mut self) -> Result<Verdict, Error> {
        if self.budget == Some(Duration::from_secs(0)) {
            info!("Time budget is zero, not starting the search.");
            self.verdict = Some(Verdict::Unknown);
            return Ok(Verdict::Unknown);
        }

        self.solver.set_callbacks(None);
        if let Some(budget) = self.budget {
            debug!("setting timeout {:?}", budget);
            self.solver.set_callbacks(Some(cadical::Timeout::new(budget.as_secs_f32())));
        }

        info!("Solving with vars {} clauses {}", self.num_variables(), self.num_clauses());
        let verdict = match self.solver.solve() {
            Some(true) => Verdict::Satisfiable,
            Some(false) => Verdict::Unsatisfiable,
            None => Verdict::Unknown,
        };
        info!("CaDiCaL verdict: {:?}", verdict);
        self.verdict = Some(verdict);
        Ok(verdict)
    }

    fn value(&self, lit: Lit) -> Result<bool, Error> {
        if self.verdict != Some(Verdict::Satisfiable) {
            return Err(Error::Oracle(format!("value of {} requested without a model ({:?})", lit, self.verdict)));
        }
        if lit.var().index() >= self.max_var {
            return Err(Error::Oracle(format!("literal {} is unknown to the solver", lit)));
        }
        self.solver
            .value(lit.to_dimacs())
            .ok_or_else(|| Error::Oracle(format!("no value for literal {} in the model", lit)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lit::Var;

    fn lit(i: usize) -> Lit {
        Var::from_index(i).positive()
    }

    #[test]
    fn satisfiable_model_is_readable() {
        let mut oracle = Cadical::new();
        let c: Constraint = vec![vec![lit(0), lit(1)], vec![!lit(0)]].into_iter().collect();
        oracle.add_constraint(&c);
        assert_eq!(oracle.solve().unwrap(), Verdict::Satisfiable);
        assert_eq!(oracle.value(lit(0)).unwrap(), false);
        assert_eq!(oracle.value(lit(1)).unwrap(), true);
        assert_eq!(oracle.value(!lit(1)).unwrap(), false);
    }

    #[test]
    fn contradiction_is_unsatisfiable() {
        let mut oracle = Cadical::new();
        let c: Constraint = vec![vec![lit(0)], vec![!lit(0)]].into_iter().collect();
        oracle.add_constraint(&c);
        assert_eq!(oracle.solve().unwrap(), Verdict::Unsatisfiable);
        assert!(matches!(oracle.value(lit(0)), Err(Error::Oracle(_))));
    }

    #[test]
    fn zero_budget_is_unknown() {
        let mut oracle = Cadical::new();
        let c: Constraint = vec![vec![lit(0), lit(1)]].into_iter().collect();
        oracle.add_constraint(&c);
        oracle.set_time_budget(Duration::from_secs(0));
        assert_eq!(oracle.solve().unwrap(), Verdict::Unknown);
    }
}
