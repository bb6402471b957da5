//! Round-robin constraint model.
//!
//! A schedule for `n` teams has `n/2` periods and `n-1` weeks. Each
//! (period, week) cell holds a home and an away team, each represented as a
//! one-hot [`TeamVar`] over `1..=n`.
//!
//! Example: 6 teams, 5 weeks, 3 periods
//!
//! ```text
//!  w0   w1   w2   w3   w4
//!  1,2  3,1  ...
//!  3,4  5,2
//!  5,6  6,4
//! ```

use std::fmt;
use std::iter::once;

use itertools::{iproduct, Itertools};
use log::*;

use crate::cardinality::{self, CardinalityConstraint};
use crate::lit::{Constraint, Lit};
use crate::pool::{Atom, Family, Namespace, Pool};
use crate::Error;

pub type Team = u32;

/// Largest accepted team count. The clause count grows as n^4 (one meet atom
/// per pair and cell), reaching about 6.5 million clauses at 40 teams.
pub const MAX_TEAMS: usize = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Slot {
    Home,
    Away,
}

impl Slot {
    pub const BOTH: [Slot; 2] = [Slot::Home, Slot::Away];
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Slot::Home => write!(f, "home"),
            Slot::Away => write!(f, "away"),
        }
    }
}

/// A validated tournament size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instance {
    teams: usize,
}

impl Instance {
    pub fn new(teams: usize) -> Result<Instance, Error> {
        if teams < 2 {
            return Err(Error::InvalidInstance { teams, reason: "at least 2 teams are required" });
        }
        if teams % 2 != 0 {
            return Err(Error::InvalidInstance { teams, reason: "the number of teams must be even" });
        }
        if teams > MAX_TEAMS {
            return Err(Error::InvalidInstance { teams, reason: "too many teams" });
        }
        Ok(Instance { teams })
    }

    pub fn teams(&self) -> usize {
        self.teams
    }

    pub fn team_ids(&self) -> impl Iterator<Item = Team> + Clone {
        1..=(self.teams as Team)
    }

    pub fn weeks(&self) -> usize {
        self.teams - 1
    }

    pub fn periods(&self) -> usize {
        (self.teams + 1) / 2
    }

    /// Allowed range for the number of home (and of away) games of a team:
    /// `floor((n-1)/2) ..= ceil((n-1)/2 + 1)`.
    pub fn home_bounds(&self) -> (usize, usize) {
        let weeks = self.weeks();
        (weeks / 2, (weeks + 3) / 2)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildOptions {
    /// Order home < away in every cell of week 0.
    pub symmetry_breaking: bool,
    /// Maximum number of appearances of a team in one period.
    pub period_cap: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions { symmetry_breaking: true, period_cap: 2 }
    }
}

/// Integer decision variable over `1..=n`, one literal per value.
#[derive(Clone, Debug)]
pub struct TeamVar {
    lits: Vec<Lit>,
}

impl TeamVar {
    /// The condition `self == team`.
    pub fn eq(&self, team: Team) -> Lit {
        self.lits[(team - 1) as usize]
    }

    pub fn domain(&self) -> &[Lit] {
        &self.lits
    }
}

#[derive(Clone, Debug)]
pub struct Cell {
    pub home: TeamVar,
    pub away: TeamVar,
}

impl Cell {
    pub fn slot(&self, slot: Slot) -> &TeamVar {
        match slot {
            Slot::Home => &self.home,
            Slot::Away => &self.away,
        }
    }
}

#[derive(Debug)]
pub struct RoundRobinModel {
    instance: Instance,
    options: BuildOptions,
    cells: Vec<Vec<Cell>>,
    constraint: Constraint,
    num_cardinality: usize,
}

impl RoundRobinModel {
    pub fn build(pool: &mut Pool, instance: Instance, options: &BuildOptions) -> Result<RoundRobinModel, Error> {
        let n = instance.teams();
        let weeks = instance.weeks();
        let periods = instance.periods();

        let mut cells = Vec::with_capacity(periods);
        for period in 0..periods {
            let mut row = Vec::with_capacity(weeks);
            for week in 0..weeks {
                let mut var = |slot: Slot| -> Result<TeamVar, Error> {
                    let lits = instance
                        .team_ids()
                        .map(|team| pool.atom(Atom::Assign { period, week, slot, team }))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(TeamVar { lits })
                };
                let home = var(Slot::Home)?;
                let away = var(Slot::Away)?;
                row.push(Cell { home, away });
            }
            cells.push(row);
        }

        let mut constraint = Constraint::trivial();
        let mut card = Vec::new();

        // Each slot holds exactly one team, and no team plays itself.
        for (period, week) in iproduct!(0..periods, 0..weeks) {
            let cell = &cells[period][week];
            for slot in Slot::BOTH.iter().copied() {
                let ns = Namespace::new(Family::Domain { period, week, slot });
                card.push(CardinalityConstraint::exactly(ns, cell.slot(slot).domain().to_vec(), 1));
            }
            for team in instance.team_ids() {
                constraint.push(vec![!cell.home.eq(team), !cell.away.eq(team)]);
            }
        }

        // Each team plays exactly once per week.
        for (team, week) in iproduct!(instance.team_ids(), 0..weeks) {
            let lits = iproduct!(0..periods, Slot::BOTH.iter().copied())
                .map(|(period, slot)| cells[period][week].slot(slot).eq(team))
                .collect::<Vec<_>>();
            card.push(CardinalityConstraint::exactly(Namespace::new(Family::TeamWeek { team, week }), lits, 1));
        }

        // Each pair meets exactly once.
        for (low, high) in instance.team_ids().tuple_combinations() {
            let mut lits = Vec::with_capacity(periods * weeks);
            for (period, week) in iproduct!(0..periods, 0..weeks) {
                let cell = &cells[period][week];
                let meets = pool.atom(Atom::Meets { period, week, low, high })?;
                let (h1, a1) = (cell.home.eq(low), cell.away.eq(low));
                let (h2, a2) = (cell.home.eq(high), cell.away.eq(high));

                // meets <-> (h1 & a2) | (h2 & a1)
                constraint.push(vec![!h1, !a2, meets]);
                constraint.push(vec![!h2, !a1, meets]);
                constraint.push(vec![!meets, h1, h2]);
                constraint.push(vec![!meets, h1, a1]);
                constraint.push(vec![!meets, a2, h2]);
                constraint.push(vec![!meets, a2, a1]);
                lits.push(meets);
            }
            card.push(CardinalityConstraint::exactly(Namespace::new(Family::Pair { low, high }), lits, 1));
        }

        // No team plays more than `period_cap` times in the same period.
        for (team, period) in iproduct!(instance.team_ids(), 0..periods) {
            let lits = iproduct!(0..weeks, Slot::BOTH.iter().copied())
                .map(|(week, slot)| cells[period][week].slot(slot).eq(team))
                .collect::<Vec<_>>();
            let ns = Namespace::new(Family::TeamPeriod { team, period });
            card.push(CardinalityConstraint::at_most(ns, lits, options.period_cap));
        }

        // Home/away balance, counted in weeks. `plays` holds iff the team
        // takes that slot in some period of the week.
        let (lower, upper) = instance.home_bounds();
        for (team, slot) in iproduct!(instance.team_ids(), Slot::BOTH.iter().copied()) {
            let mut lits = Vec::with_capacity(weeks);
            for week in 0..weeks {
                let plays = pool.atom(Atom::Plays { week, slot, team })?;
                let here = (0..periods).map(|period| cells[period][week].slot(slot).eq(team)).collect::<Vec<_>>();
                for eq in here.iter() {
                    constraint.push(vec![!*eq, plays]);
                }
                constraint.push(once(!plays).chain(here));
                lits.push(plays);
            }
            let family = match slot {
                Slot::Home => Family::Home { team },
                Slot::Away => Family::Away { team },
            };
            card.push(CardinalityConstraint::between(Namespace::new(family), lits, lower, upper));
        }

        // Reduce symmetries: relabeling teams maps any schedule onto one where
        // every game of week 0 has home < away.
        if options.symmetry_breaking && weeks > 0 {
            for period in 0..periods {
                let cell = &cells[period][0];
                for (away, home) in instance.team_ids().tuple_combinations() {
                    constraint.push(vec![!cell.home.eq(home), !cell.away.eq(away)]);
                }
            }
        }

        let num_cardinality = card.len();
        for c in card {
            constraint.extend(cardinality::encode(pool, c)?);
        }

        info!(
            "Round-robin model n={} ({} periods x {} weeks): {} cardinality constraints, vars {} clauses {}",
            n,
            periods,
            weeks,
            num_cardinality,
            pool.num_vars(),
            constraint.len()
        );

        Ok(RoundRobinModel { instance, options: options.clone(), cells, constraint, num_cardinality })
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn cell(&self, period: usize, week: usize) -> &Cell {
        &self.cells[period][week]
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Moves the clause set out, leaving the cells for decoding.
    pub fn take_constraint(&mut self) -> Constraint {
        std::mem::take(&mut self.constraint)
    }

    pub fn num_cardinality(&self) -> usize {
        self.num_cardinality
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::RunId;

    #[test]
    fn instance_rejects_bad_team_counts() {
        for teams in &[0, 1, 3, 7, MAX_TEAMS + 2] {
            assert!(matches!(Instance::new(*teams), Err(Error::InvalidInstance { .. })), "n={}", teams);
        }
        let inst = Instance::new(6).unwrap();
        assert_eq!((inst.weeks(), inst.periods()), (5, 3));
        assert_eq!(inst.home_bounds(), (2, 4));
        assert_eq!(Instance::new(4).unwrap().home_bounds(), (1, 3));
    }

    #[test]
    fn cells_are_one_hot_atoms() {
        let mut pool = Pool::new();
        let model = RoundRobinModel::build(&mut pool, Instance::new(4).unwrap(), &BuildOptions::default()).unwrap();
        assert_eq!(model.cells().len(), 2);
        assert!(model.cells().iter().all(|row| row.len() == 3));
        let cell = model.cell(1, 2);
        assert_eq!(cell.home.domain().len(), 4);
        assert_eq!(
            pool.lookup(&Atom::Assign { period: 1, week: 2, slot: Slot::Away, team: 3 }),
            Some(cell.away.eq(3))
        );
    }

    #[test]
    fn building_is_deterministic() {
        let build = |options: &BuildOptions| {
            let mut pool = Pool::with_run(RunId(1));
            let model = RoundRobinModel::build(&mut pool, Instance::new(6).unwrap(), options).unwrap();
            (pool.num_vars(), model.constraint().clone())
        };
        let options = BuildOptions::default();
        let (vars_a, a) = build(&options);
        let (vars_b, b) = build(&options);
        assert_eq!(vars_a, vars_b);
        assert_eq!(a.len(), b.len());
        assert_eq!(a, b);
    }

    #[test]
    fn symmetry_breaking_adds_week_zero_clauses() {
        let size = |symmetry_breaking| {
            let mut pool = Pool::new();
            let options = BuildOptions { symmetry_breaking, ..BuildOptions::default() };
            RoundRobinModel::build(&mut pool, Instance::new(6).unwrap(), &options).unwrap().constraint().len()
        };
        // 3 periods, C(6,2) forbidden (home, away) orderings each.
        assert_eq!(size(true) - size(false), 3 * 15);
    }

    #[test]
    fn balance_is_counted_per_week() {
        let mut pool = Pool::new();
        let model = RoundRobinModel::build(&mut pool, Instance::new(6).unwrap(), &BuildOptions::default()).unwrap();
        let plays = pool.lookup(&Atom::Plays { week: 2, slot: Slot::Home, team: 4 }).unwrap();
        let homes = (0..3).map(|p| model.cell(p, 2).home.eq(4)).collect::<Vec<_>>();

        // Home in period 1 of week 2 forces the weekly atom, and the weekly
        // atom needs some period.
        let clauses = model.constraint().clauses().collect::<Vec<_>>();
        assert!(clauses.contains(&&[!homes[1], plays][..]));
        assert!(clauses.contains(&&[!plays, homes[0], homes[1], homes[2]][..]));
    }

    #[test]
    fn largest_instance_builds() {
        let mut pool = Pool::new();
        let mut model =
            RoundRobinModel::build(&mut pool, Instance::new(MAX_TEAMS).unwrap(), &BuildOptions::default()).unwrap();
        let clauses = model.take_constraint();
        assert!(clauses.len() < 7_000_000, "{} clauses", clauses.len());
        assert!(model.constraint().is_empty());
        assert_eq!(model.cells().len(), MAX_TEAMS / 2);
    }

    #[test]
    fn reusing_a_pool_collides() {
        let mut pool = Pool::new();
        let instance = Instance::new(4).unwrap();
        RoundRobinModel::build(&mut pool, instance, &BuildOptions::default()).unwrap();
        assert!(matches!(
            RoundRobinModel::build(&mut pool, instance, &BuildOptions::default()),
            Err(Error::NamingCollision(_))
        ));
    }
}
