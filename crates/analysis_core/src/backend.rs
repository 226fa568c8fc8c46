//! Analysis backend seam. The workflow only sees phased progress and a final outcome, so the
//! simulated backend can be swapped for a real upload/inference call.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::{
    domain::{DisplayRef, FileRef, Phase},
    protocol::PhaseProgress,
};
use tokio::sync::mpsc;

use crate::schedule::SimulationSchedule;

pub const PROGRESS_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub file: FileRef,
    pub original: DisplayRef,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOutput {
    pub result: DisplayRef,
}

pub struct ProgressReporter {
    tx: mpsc::Sender<PhaseProgress>,
}

impl ProgressReporter {
    pub fn new(tx: mpsc::Sender<PhaseProgress>) -> Self {
        Self { tx }
    }

    pub async fn phase_started(&self, phase: Phase) -> Result<()> {
        self.send(PhaseProgress::PhaseStarted { phase }).await
    }

    pub async fn step(&self, phase: Phase, percent: u8) -> Result<()> {
        self.send(PhaseProgress::Step {
            phase,
            percent: percent.min(100),
        })
        .await
    }

    async fn send(&self, progress: PhaseProgress) -> Result<()> {
        self.tx
            .send(progress)
            .await
            .map_err(|_| anyhow!("progress receiver dropped"))
    }
}

#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        request: AnalysisRequest,
        reporter: ProgressReporter,
    ) -> Result<AnalysisOutput>;
}

/// Replays a fixed schedule and hands back the original reference as the result.
#[derive(Debug, Clone, Default)]
pub struct SimulatedBackend {
    schedule: SimulationSchedule,
}

impl SimulatedBackend {
    pub fn new(schedule: SimulationSchedule) -> Self {
        Self { schedule }
    }
}

#[async_trait]
impl AnalysisBackend for SimulatedBackend {
    async fn analyze(
        &self,
        request: AnalysisRequest,
        reporter: ProgressReporter,
    ) -> Result<AnalysisOutput> {
        for phase in self.schedule.phases() {
            reporter.phase_started(phase.phase).await?;
            for percent in phase.progress_values() {
                tokio::time::sleep(phase.delay).await;
                reporter.step(phase.phase, percent).await?;
            }
        }
        // No processed image exists without a real backend.
        Ok(AnalysisOutput {
            result: request.original,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::schedule::PhaseSchedule;

    #[tokio::test(start_paused = true)]
    async fn simulated_backend_reports_every_step_in_order() {
        let schedule = SimulationSchedule::new(vec![
            PhaseSchedule {
                phase: Phase::Uploading,
                step: 50,
                delay: Duration::from_millis(10),
            },
            PhaseSchedule {
                phase: Phase::Processing,
                step: 25,
                delay: Duration::from_millis(5),
            },
        ])
        .expect("schedule");
        let backend = SimulatedBackend::new(schedule);
        let (tx, mut rx) = mpsc::channel(PROGRESS_CHANNEL_CAPACITY);
        let request = AnalysisRequest {
            file: FileRef::new("a.png", "image/png", vec![1]),
            original: DisplayRef(7),
        };

        let output = backend
            .analyze(request, ProgressReporter::new(tx))
            .await
            .expect("analyze");
        assert_eq!(output.result, DisplayRef(7));

        let mut seen = Vec::new();
        while let Some(progress) = rx.recv().await {
            seen.push(progress);
        }
        let steps = |phase: Phase, values: &[u8]| {
            values
                .iter()
                .map(move |&percent| PhaseProgress::Step { phase, percent })
                .collect::<Vec<_>>()
        };
        let mut expected = vec![PhaseProgress::PhaseStarted {
            phase: Phase::Uploading,
        }];
        expected.extend(steps(Phase::Uploading, &[0, 50, 100]));
        expected.push(PhaseProgress::PhaseStarted {
            phase: Phase::Processing,
        });
        expected.extend(steps(Phase::Processing, &[0, 25, 50, 75, 100]));
        assert_eq!(seen, expected);
    }

    #[tokio::test]
    async fn reporter_fails_once_receiver_is_gone() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let reporter = ProgressReporter::new(tx);
        assert!(reporter.phase_started(Phase::Uploading).await.is_err());
    }
}
