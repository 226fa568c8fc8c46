//! Simulation parameters for the timed progress animation.

use std::time::Duration;

use shared::domain::Phase;
use thiserror::Error;

pub const DEFAULT_UPLOAD_STEP: u8 = 10;
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(200);
pub const DEFAULT_PROCESSING_STEP: u8 = 2;
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("schedule has no phases")]
    Empty,
    #[error("{phase:?} step must be between 1 and 100, got {step}")]
    InvalidStep { phase: Phase, step: u8 },
    #[error("{0:?} appears more than once")]
    DuplicatePhase(Phase),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSchedule {
    pub phase: Phase,
    pub step: u8,
    pub delay: Duration,
}

impl PhaseSchedule {
    /// Progress values for this phase: 0, step, 2*step, ... always ending at exactly 100.
    pub fn progress_values(&self) -> Vec<u8> {
        let step = self.step.max(1);
        let mut values: Vec<u8> = (0..=100u8).step_by(step as usize).collect();
        if values.last() != Some(&100) {
            values.push(100);
        }
        values
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSchedule {
    phases: Vec<PhaseSchedule>,
}

impl SimulationSchedule {
    pub fn new(phases: Vec<PhaseSchedule>) -> Result<Self, ScheduleError> {
        if phases.is_empty() {
            return Err(ScheduleError::Empty);
        }
        for (i, phase) in phases.iter().enumerate() {
            if phase.step == 0 || phase.step > 100 {
                return Err(ScheduleError::InvalidStep {
                    phase: phase.phase,
                    step: phase.step,
                });
            }
            if phases[..i].iter().any(|earlier| earlier.phase == phase.phase) {
                return Err(ScheduleError::DuplicatePhase(phase.phase));
            }
        }
        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[PhaseSchedule] {
        &self.phases
    }

    pub fn total_duration(&self) -> Duration {
        self.phases
            .iter()
            .map(|phase| phase.delay * phase.progress_values().len() as u32)
            .sum()
    }
}

impl Default for SimulationSchedule {
    fn default() -> Self {
        Self {
            phases: vec![
                PhaseSchedule {
                    phase: Phase::Uploading,
                    step: DEFAULT_UPLOAD_STEP,
                    delay: DEFAULT_UPLOAD_DELAY,
                },
                PhaseSchedule {
                    phase: Phase::Processing,
                    step: DEFAULT_PROCESSING_STEP,
                    delay: DEFAULT_PROCESSING_DELAY,
                },
            ],
        }
    }
}
