//! Simulation clock: the shared day counter and run state.
//!
//! The clock is a singleton row in the store. It is read and written
//! only inside the engine's transaction; components receive the current
//! day as a plain value and never touch the clock themselves.

use crate::error::{SimError, SimResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Day;

/// Token the instructor must supply to reset a simulation.
pub const RESET_CONFIRMATION: &str = "RESET";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockState {
    Paused,
    Running,
    Finished,
}

impl ClockState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockState::Paused => "paused",
            ClockState::Running => "running",
            ClockState::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<ClockState> {
        match s {
            "paused" => Some(ClockState::Paused),
            "running" => Some(ClockState::Running),
            "finished" => Some(ClockState::Finished),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationClock {
    pub run_id: String,
    pub current_day: Day,
    pub state: ClockState,
    pub duration_days: Day,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl SimulationClock {
    pub fn new(run_id: String, duration_days: Day) -> Self {
        Self {
            run_id,
            current_day: 1,
            state: ClockState::Paused,
            duration_days,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Move the day counter forward by one. Callers must have checked
    /// `is_running()`; the engine does this before opening the transaction.
    pub fn advance(&mut self) -> Day {
        debug_assert!(self.is_running(), "advance() on a non-running clock");
        self.current_day += 1;
        self.current_day
    }

    /// `paused -> running`. Also used for resume; a finished simulation
    /// cannot be restarted.
    pub fn start(&mut self) -> SimResult<()> {
        match self.state {
            ClockState::Finished => Err(SimError::AlreadyFinished),
            _ => {
                self.state = ClockState::Running;
                if self.started_at.is_none() {
                    self.started_at = Some(Utc::now());
                }
                Ok(())
            }
        }
    }

    /// `running -> paused`.
    pub fn pause(&mut self) -> SimResult<()> {
        match self.state {
            ClockState::Running => {
                self.state = ClockState::Paused;
                Ok(())
            }
            other => Err(SimError::NotRunning {
                state: other.as_str().to_string(),
            }),
        }
    }

    /// `running -> finished`.
    pub fn finish(&mut self) -> SimResult<()> {
        match self.state {
            ClockState::Running => {
                self.state = ClockState::Finished;
                self.finished_at = Some(Utc::now());
                Ok(())
            }
            other => Err(SimError::NotRunning {
                state: other.as_str().to_string(),
            }),
        }
    }

    /// Back to day 1, paused. The only transition that ever decreases the
    /// day counter, guarded by an explicit confirmation token.
    pub fn reset(&mut self, confirmation: &str) -> SimResult<()> {
        if confirmation != RESET_CONFIRMATION {
            return Err(SimError::ResetConfirmation {
                expected: RESET_CONFIRMATION,
            });
        }
        self.current_day = 1;
        self.state = ClockState::Paused;
        self.started_at = None;
        self.finished_at = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        let mut clock = SimulationClock::new("run-1".into(), 30);
        assert_eq!(clock.state, ClockState::Paused);
        assert_eq!(clock.current_day, 1);

        clock.start().unwrap();
        assert!(clock.is_running());
        assert!(clock.started_at.is_some());

        clock.pause().unwrap();
        assert!(clock.pause().is_err());

        clock.start().unwrap();
        clock.finish().unwrap();
        assert_eq!(clock.state, ClockState::Finished);
        assert!(matches!(clock.start(), Err(SimError::AlreadyFinished)));
    }

    #[test]
    fn reset_requires_token() {
        let mut clock = SimulationClock::new("run-1".into(), 30);
        clock.start().unwrap();
        clock.advance();
        clock.advance();
        assert_eq!(clock.current_day, 3);

        assert!(clock.reset("yes please").is_err());
        assert_eq!(clock.current_day, 3);

        clock.reset(RESET_CONFIRMATION).unwrap();
        assert_eq!(clock.current_day, 1);
        assert_eq!(clock.state, ClockState::Paused);
    }
}
