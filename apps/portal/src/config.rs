use std::{fs, path::Path, time::Duration};

use analysis_core::{
    schedule::{
        DEFAULT_PROCESSING_DELAY, DEFAULT_PROCESSING_STEP, DEFAULT_UPLOAD_DELAY,
        DEFAULT_UPLOAD_STEP,
    },
    PhaseSchedule, ScheduleError, SimulationSchedule,
};
use anyhow::Context;
use serde::Deserialize;
use shared::domain::Phase;
use tracing::warn;

pub const DEFAULT_CONFIG_FILE: &str = "portal.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub upload_step: u8,
    pub upload_delay_ms: u64,
    pub processing_step: u8,
    pub processing_delay_ms: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            upload_step: DEFAULT_UPLOAD_STEP,
            upload_delay_ms: DEFAULT_UPLOAD_DELAY.as_millis() as u64,
            processing_step: DEFAULT_PROCESSING_STEP,
            processing_delay_ms: DEFAULT_PROCESSING_DELAY.as_millis() as u64,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    upload_step: Option<u8>,
    upload_delay_ms: Option<u64>,
    processing_step: Option<u8>,
    processing_delay_ms: Option<u64>,
    log_filter: Option<String>,
}

impl Settings {
    pub fn schedule(&self) -> Result<SimulationSchedule, ScheduleError> {
        SimulationSchedule::new(vec![
            PhaseSchedule {
                phase: Phase::Uploading,
                step: self.upload_step,
                delay: Duration::from_millis(self.upload_delay_ms),
            },
            PhaseSchedule {
                phase: Phase::Processing,
                step: self.processing_step,
                delay: Duration::from_millis(self.processing_delay_ms),
            },
        ])
    }

    fn merge_file(&mut self, file: FileSettings) {
        if let Some(v) = file.upload_step {
            self.upload_step = v;
        }
        if let Some(v) = file.upload_delay_ms {
            self.upload_delay_ms = v;
        }
        if let Some(v) = file.processing_step {
            self.processing_step = v;
        }
        if let Some(v) = file.processing_delay_ms {
            self.processing_delay_ms = v;
        }
        if let Some(v) = file.log_filter {
            self.log_filter = v;
        }
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        override_parsed(&lookup, "APP__UPLOAD_STEP", &mut self.upload_step);
        override_parsed(&lookup, "APP__UPLOAD_DELAY_MS", &mut self.upload_delay_ms);
        override_parsed(&lookup, "APP__PROCESSING_STEP", &mut self.processing_step);
        override_parsed(
            &lookup,
            "APP__PROCESSING_DELAY_MS",
            &mut self.processing_delay_ms,
        );
        if let Some(v) = lookup("APP__LOG_FILTER") {
            self.log_filter = v;
        }
    }
}

fn override_parsed<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(parsed) => *target = parsed,
        Err(_) => warn!(key, value = %raw, "ignoring unparsable setting"),
    }
}

/// Defaults, then `path` (or `portal.toml` when present), then `APP__*` variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    load_settings_with(path, |key| std::env::var(key).ok())
}

pub(crate) fn load_settings_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let raw = match path {
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read config '{}'", path.display()))?,
        ),
        None => fs::read_to_string(DEFAULT_CONFIG_FILE).ok(),
    };
    if let Some(raw) = raw {
        let file: FileSettings = toml::from_str(&raw).context("invalid portal config")?;
        settings.merge_file(file);
    }

    settings.apply_env(lookup);
    Ok(settings)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
