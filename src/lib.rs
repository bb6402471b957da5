//! SAT model of a single round-robin tournament schedule with periods.
//!
//! [`solve`] builds the model for `n` teams, hands it to an [`Oracle`] and
//! wraps the decoded [`Schedule`] in a [`ResultEnvelope`].

pub mod cardinality;
pub mod dimacs;
pub mod envelope;
pub mod error;
pub mod lit;
pub mod model;
pub mod oracle;
pub mod pool;
pub mod schedule;
pub mod solve;

pub use envelope::ResultEnvelope;
pub use error::Error;
pub use model::{BuildOptions, Instance, RoundRobinModel, Team};
pub use oracle::{Cadical, Oracle, Verdict};
pub use pool::Pool;
pub use schedule::{Game, Schedule, Violation};
pub use solve::{solve, solve_model, solve_with, SolveOptions};
