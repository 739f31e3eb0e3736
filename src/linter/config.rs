//! Registration metadata for one linter.

use super::task::AnalyzerTask;
use crate::analysis::LogicalLinter;
use crate::core::LoadLevel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Linter groups users can enable at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    Bugs,
    Complexity,
    Format,
    Performance,
    Style,
    Unused,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Bugs,
        Preset::Complexity,
        Preset::Format,
        Preset::Performance,
        Preset::Style,
        Preset::Unused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Bugs => "bugs",
            Preset::Complexity => "complexity",
            Preset::Format => "format",
            Preset::Performance => "performance",
            Preset::Style => "style",
            Preset::Unused => "unused",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a linter is executed.
#[derive(Clone)]
pub enum LinterKind {
    /// Runs as its own job.
    Standalone(Arc<dyn AnalyzerTask>),
    /// Joins the shared meta-linter batch.
    Batched(Arc<LogicalLinter>),
}

#[derive(Clone)]
pub struct LinterConfig {
    name: String,
    kind: LinterKind,
    presets: Vec<Preset>,
    speed: u8,
    alternative_names: Vec<String>,
    url: Option<String>,
    can_auto_fix: bool,
    enabled_by_default: bool,
    load_level: LoadLevel,
}

impl LinterConfig {
    pub fn standalone(task: Arc<dyn AnalyzerTask>) -> Self {
        Self::with_kind(task.name().to_string(), LinterKind::Standalone(task), LoadLevel::Syntax)
    }

    pub fn batched(linter: LogicalLinter) -> Self {
        let level = linter.load_level();
        Self::with_kind(
            linter.name().to_string(),
            LinterKind::Batched(Arc::new(linter)),
            level,
        )
    }

    fn with_kind(name: String, kind: LinterKind, load_level: LoadLevel) -> Self {
        Self {
            name,
            kind,
            presets: Vec::new(),
            speed: 5,
            alternative_names: Vec::new(),
            url: None,
            can_auto_fix: false,
            enabled_by_default: false,
            load_level,
        }
    }

    pub fn with_presets(mut self, presets: impl IntoIterator<Item = Preset>) -> Self {
        self.presets.extend(presets);
        self
    }

    /// Relative speed, 1 (slowest) to 10 (fastest). Values are clamped.
    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed.clamp(1, 10);
        self
    }

    pub fn with_alternative_names<S: Into<String>>(
        mut self,
        names: impl IntoIterator<Item = S>,
    ) -> Self {
        self.alternative_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_auto_fix(mut self) -> Self {
        self.can_auto_fix = true;
        self
    }

    pub fn enabled_by_default(mut self) -> Self {
        self.enabled_by_default = true;
        self
    }

    /// Raise the declared load level. Batched linters keep the higher of
    /// this and their own declaration.
    pub fn with_load_level(mut self, level: LoadLevel) -> Self {
        self.load_level = self.load_level.max(level);
        if let LinterKind::Batched(linter) = &self.kind {
            if linter.load_level() < self.load_level {
                let raised = linter.as_ref().clone().with_load_level(self.load_level);
                self.kind = LinterKind::Batched(Arc::new(raised));
            }
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &LinterKind {
        &self.kind
    }

    pub fn is_batched(&self) -> bool {
        matches!(self.kind, LinterKind::Batched(_))
    }

    pub fn presets(&self) -> &[Preset] {
        &self.presets
    }

    pub fn speed(&self) -> u8 {
        self.speed
    }

    pub fn alternative_names(&self) -> &[String] {
        &self.alternative_names
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn can_auto_fix(&self) -> bool {
        self.can_auto_fix
    }

    pub fn is_enabled_by_default(&self) -> bool {
        self.enabled_by_default
    }

    pub fn load_level(&self) -> LoadLevel {
        self.load_level
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name == name || self.alternative_names.iter().any(|alt| alt == name)
    }
}

impl fmt::Debug for LinterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinterConfig")
            .field("name", &self.name)
            .field("batched", &self.is_batched())
            .field("presets", &self.presets)
            .field("speed", &self.speed)
            .field("alternative_names", &self.alternative_names)
            .field("load_level", &self.load_level)
            .finish()
    }
}
