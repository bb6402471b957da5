//! Decoded schedules.
//!
//! A [`Schedule`] is read back from a satisfied oracle, checked against the
//! round-robin rules by [`Schedule::verify`], and serialized as nested
//! `[home, away]` pairs, periods outer and weeks inner.

use std::collections::HashMap;
use std::fmt;

use itertools::{iproduct, Itertools};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{BuildOptions, Instance, RoundRobinModel, Team, TeamVar};
use crate::oracle::Oracle;
use crate::Error;

/// One game, serialized as `[home, away]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[Team; 2]", into = "[Team; 2]")]
pub struct Game {
    pub home: Team,
    pub away: Team,
}

impl From<[Team; 2]> for Game {
    fn from(pair: [Team; 2]) -> Game {
        Game { home: pair[0], away: pair[1] }
    }
}

impl From<Game> for [Team; 2] {
    fn from(game: Game) -> [Team; 2] {
        [game.home, game.away]
    }
}

/// Periods outer, weeks inner.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    periods: Vec<Vec<Game>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Violation {
    #[error("expected {periods} periods of {weeks} weeks")]
    Shape { periods: usize, weeks: usize },
    #[error("team {team} in period {period} week {week} is out of range")]
    OutOfRange { period: usize, week: usize, team: Team },
    #[error("team {team} plays itself in period {period} week {week}")]
    SelfPlay { period: usize, week: usize, team: Team },
    #[error("team {team} plays {count} games in week {week}")]
    WeeklyCount { team: Team, week: usize, count: usize },
    #[error("teams {low} and {high} meet {count} times")]
    PairCount { low: Team, high: Team, count: usize },
    #[error("team {team} appears {count} times in period {period}")]
    PeriodCap { team: Team, period: usize, count: usize },
    #[error("team {team} has {home} home games, allowed {min}..={max}")]
    HomeBalance { team: Team, home: usize, min: usize, max: usize },
    #[error("team {team} has {away} away games, allowed {min}..={max}")]
    AwayBalance { team: Team, away: usize, min: usize, max: usize },
}

fn decode_team(oracle: &impl Oracle, var: &TeamVar, period: usize, week: usize) -> Result<Team, Error> {
    let mut found = None;
    for (idx, lit) in var.domain().iter().enumerate() {
        if oracle.value(*lit)? {
            if found.is_some() {
                return Err(Error::Oracle(format!("several teams assigned to period {} week {}", period, week)));
            }
            found = Some(idx as Team + 1);
        }
    }
    found.ok_or_else(|| Error::Oracle(format!("no team assigned to period {} week {}", period, week)))
}

impl Schedule {
    pub fn new(periods: Vec<Vec<Game>>) -> Schedule {
        Schedule { periods }
    }

    /// Reads every cell of `model` from a satisfied oracle.
    pub fn decode(model: &RoundRobinModel, oracle: &impl Oracle) -> Result<Schedule, Error> {
        let mut periods = Vec::with_capacity(model.cells().len());
        for (period, row) in model.cells().iter().enumerate() {
            let mut games = Vec::with_capacity(row.len());
            for (week, cell) in row.iter().enumerate() {
                let home = decode_team(oracle, &cell.home, period, week)?;
                let away = decode_team(oracle, &cell.away, period, week)?;
                games.push(Game { home, away });
            }
            periods.push(games);
        }
        Ok(Schedule { periods })
    }

    pub fn periods(&self) -> &[Vec<Game>] {
        &self.periods
    }

    pub fn num_periods(&self) -> usize {
        self.periods.len()
    }

    pub fn num_weeks(&self) -> usize {
        self.periods.first().map(|p| p.len()).unwrap_or(0)
    }

    pub fn game(&self, period: usize, week: usize) -> Game {
        self.periods[period][week]
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn home_count(&self, team: Team) -> usize {
        self.periods.iter().flatten().filter(|g| g.home == team).count()
    }

    pub fn away_count(&self, team: Team) -> usize {
        self.periods.iter().flatten().filter(|g| g.away == team).count()
    }

    /// Checks every round-robin rule the model encodes, reporting the first
    /// one that is broken.
    pub fn verify(&self, instance: &Instance, options: &BuildOptions) -> Result<(), Violation> {
        let (periods, weeks) = (instance.periods(), instance.weeks());
        if self.periods.len() != periods || self.periods.iter().any(|row| row.len() != weeks) {
            return Err(Violation::Shape { periods, weeks });
        }

        let n = instance.teams() as Team;
        for (period, week) in iproduct!(0..periods, 0..weeks) {
            let g = self.game(period, week);
            for team in [g.home, g.away].iter().copied() {
                if team < 1 || team > n {
                    return Err(Violation::OutOfRange { period, week, team });
                }
            }
            if g.home == g.away {
                return Err(Violation::SelfPlay { period, week, team: g.home });
            }
        }

        for (team, week) in iproduct!(instance.team_ids(), 0..weeks) {
            let count = (0..periods)
                .map(|p| self.game(p, week))
                .filter(|g| g.home == team || g.away == team)
                .count();
            if count != 1 {
                return Err(Violation::WeeklyCount { team, week, count });
            }
        }

        let mut meetings: HashMap<(Team, Team), usize> = HashMap::new();
        for g in self.periods.iter().flatten() {
            *meetings.entry((g.home.min(g.away), g.home.max(g.away))).or_insert(0) += 1;
        }
        for (low, high) in instance.team_ids().tuple_combinations() {
            let count = meetings.get(&(low, high)).copied().unwrap_or(0);
            if count != 1 {
                return Err(Violation::PairCount { low, high, count });
            }
        }

        for (team, period) in iproduct!(instance.team_ids(), 0..periods) {
            let count = self.periods[period].iter().filter(|g| g.home == team || g.away == team).count();
            if count > options.period_cap {
                return Err(Violation::PeriodCap { team, period, count });
            }
        }

        let (min, max) = instance.home_bounds();
        for team in instance.team_ids() {
            let home = self.home_count(team);
            if home < min || home > max {
                return Err(Violation::HomeBalance { team, home, min, max });
            }
            let away = self.away_count(team);
            if away < min || away > max {
                return Err(Violation::AwayBalance { team, away, min, max });
            }
        }

        Ok(())
    }
}

/// One column per week, one row per period.
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for week in 0..self.num_weeks() {
            write!(f, " {:^5} ", format!("w{}", week))?;
        }
        writeln!(f)?;
        for row in self.periods.iter() {
            for g in row.iter() {
                write!(f, " {:>2},{:<2} ", g.home, g.away)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
