//! One full run: build, solve, decode.

use std::time::{Duration, Instant};

use log::*;

use crate::envelope::{ResultEnvelope, FAILURE_SECONDS};
use crate::model::{BuildOptions, Instance, RoundRobinModel};
use crate::oracle::{Cadical, Oracle, Verdict};
use crate::pool::Pool;
use crate::schedule::Schedule;
use crate::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct SolveOptions {
    pub time_budget: Duration,
    pub build: BuildOptions,
}

impl Default for SolveOptions {
    fn default() -> Self {
        SolveOptions { time_budget: Duration::from_secs(FAILURE_SECONDS), build: BuildOptions::default() }
    }
}

/// Solves `teams` with a fresh CaDiCaL instance.
pub fn solve(teams: usize, options: &SolveOptions) -> Result<ResultEnvelope, Error> {
    solve_with(&mut Cadical::new(), teams, options)
}

/// Builds the model for `teams` and hands it to `oracle`.
///
/// Invalid team counts are rejected before the oracle is touched.
pub fn solve_with<O: Oracle>(oracle: &mut O, teams: usize, options: &SolveOptions) -> Result<ResultEnvelope, Error> {
    let instance = Instance::new(teams)?;
    let mut pool = Pool::new();
    let model = RoundRobinModel::build(&mut pool, instance, &options.build)?;
    debug!("{} allocated {} variables", pool.run(), pool.num_vars());
    drop(pool);
    solve_model(oracle, model, options.time_budget)
}

/// Solves an already built model. The clause set is released once the
/// oracle holds it, and only the search itself counts towards `time`.
/// Unsatisfiable and timed-out runs both yield [`ResultEnvelope::failure`].
pub fn solve_model<O: Oracle>(
    oracle: &mut O,
    mut model: RoundRobinModel,
    time_budget: Duration,
) -> Result<ResultEnvelope, Error> {
    let n = model.instance().teams();
    oracle.add_constraint(&model.take_constraint());
    oracle.set_time_budget(time_budget);

    let start = Instant::now();
    let verdict = oracle.solve()?;
    let elapsed = start.elapsed();

    match verdict {
        Verdict::Satisfiable => {
            let schedule = Schedule::decode(&model, oracle)?;
            schedule
                .verify(model.instance(), model.options())
                .map_err(|v| Error::Oracle(format!("decoded schedule is invalid: {}", v)))?;
            info!("n={} solved in {:.2}s", n, elapsed.as_secs_f32());
            Ok(ResultEnvelope::feasible(elapsed, schedule))
        }
        Verdict::Unsatisfiable => {
            info!("n={} is unsatisfiable", n);
            Ok(ResultEnvelope::failure())
        }
        Verdict::Unknown => {
            info!("n={} timed out after {:?}", n, time_budget);
            Ok(ResultEnvelope::failure())
        }
    }
}
