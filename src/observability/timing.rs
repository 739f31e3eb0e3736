//! Per-run timing for linters and pipeline stages.
//!
//! A [`Stopwatch`] belongs to one run (no global collector), so two runs in
//! the same process never mix their numbers. Stage durations accumulate by
//! name; the summary lists them slowest first.

use serde::Serialize;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub name: String,
    pub duration: Duration,
}

impl StageTiming {
    /// Format the timing as a human-readable string.
    pub fn format(&self) -> String {
        format!("{}: {}", self.name, format_duration(self.duration))
    }
}

#[derive(Debug)]
pub struct Stopwatch {
    name: String,
    started: Instant,
    stages: Vec<StageTiming>,
}

impl Stopwatch {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started: Instant::now(),
            stages: Vec::new(),
        }
    }

    /// Run `f` and charge its duration to `stage`.
    pub fn track_stage<T>(&mut self, stage: &str, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(stage, start.elapsed());
        out
    }

    pub fn record(&mut self, stage: &str, duration: Duration) {
        match self.stages.iter_mut().find(|s| s.name == stage) {
            Some(existing) => existing.duration += duration,
            None => self.stages.push(StageTiming {
                name: stage.to_string(),
                duration,
            }),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Stage timings, slowest first.
    pub fn stages(&self) -> Vec<StageTiming> {
        let mut stages = self.stages.clone();
        stages.sort_by(|a, b| b.duration.cmp(&a.duration));
        stages
    }

    pub fn summary(&self) -> String {
        let stages = self
            .stages()
            .iter()
            .map(StageTiming::format)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "{} took {} with stages: {}",
            self.name,
            format_duration(self.elapsed()),
            stages
        )
    }

    pub fn print(&self) {
        log::info!("{}", self.summary());
    }

    /// Log only the stage breakdown; used for pipelines where the total is logged elsewhere.
    pub fn print_stages(&self) {
        if self.stages.is_empty() {
            return;
        }
        let stages = self
            .stages()
            .iter()
            .map(StageTiming::format)
            .collect::<Vec<_>>()
            .join(", ");
        log::info!("{} stages: {}", self.name, stages);
    }
}

/// Idle time of each worker relative to the last worker to finish.
///
/// The last finisher itself is reported with zero idle time.
pub fn worker_idle_times(finish_times: &[Instant]) -> Vec<Duration> {
    let Some(last) = finish_times.iter().max() else {
        return Vec::new();
    };
    finish_times.iter().map(|t| last.duration_since(*t)).collect()
}

/// Format a duration for display.
pub fn format_duration(d: Duration) -> String {
    if d.as_secs() >= 1 {
        format!("{:.2}s", d.as_secs_f64())
    } else if d.as_millis() >= 1 {
        format!("{:.1}ms", d.as_secs_f64() * 1000.0)
    } else {
        format!("{:.0}µs", d.as_secs_f64() * 1_000_000.0)
    }
}
