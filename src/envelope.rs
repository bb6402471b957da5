//! Result record shared with the other scheduling backends.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::schedule::Schedule;

/// `time` reported for every failed run, whatever the reason.
pub const FAILURE_SECONDS: u64 = 300;

/// `optimal` is a feasibility flag here; no objective is ever computed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultEnvelope {
    pub time: u64,
    pub optimal: bool,
    pub obj: Option<f64>,
    pub sol: Schedule,
}

impl ResultEnvelope {
    pub fn feasible(elapsed: Duration, schedule: Schedule) -> ResultEnvelope {
        ResultEnvelope { time: elapsed.as_secs(), optimal: true, obj: None, sol: schedule }
    }

    pub fn failure() -> ResultEnvelope {
        ResultEnvelope { time: FAILURE_SECONDS, optimal: false, obj: None, sol: Schedule::default() }
    }

    pub fn is_feasible(&self) -> bool {
        self.optimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Game;

    #[test]
    fn failure_is_the_sentinel_record() {
        let json = serde_json::to_value(ResultEnvelope::failure()).unwrap();
        assert_eq!(json, serde_json::json!({"time": 300, "optimal": false, "obj": null, "sol": []}));
    }

    #[test]
    fn feasible_rounds_time_down() {
        let schedule = Schedule::new(vec![vec![Game { home: 1, away: 2 }]]);
        let env = ResultEnvelope::feasible(Duration::from_millis(2999), schedule);
        assert!(env.is_feasible());
        assert_eq!(
            serde_json::to_string(&env).unwrap(),
            r#"{"time":2,"optimal":true,"obj":null,"sol":[[[1,2]]]}"#
        );
    }
}
