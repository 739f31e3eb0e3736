//! Read-only table of every known linter.
//!
//! Built once at startup and passed explicitly to whoever needs it. The
//! registry answers lookups (including alternative names and presets); it
//! never decides which linters run.

use super::config::{LinterConfig, Preset};
use crate::errors::{LintError, Result};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Default, Clone)]
pub struct LinterRegistry {
    configs: Vec<LinterConfig>,
    by_name: HashMap<String, usize>,
}

impl LinterRegistry {
    /// Build a registry. Two linters sharing a name or alternative name is an error.
    pub fn new(configs: Vec<LinterConfig>) -> Result<Self> {
        let mut by_name = HashMap::new();
        for (index, config) in configs.iter().enumerate() {
            let names = std::iter::once(config.name())
                .chain(config.alternative_names().iter().map(String::as_str));
            for name in names {
                if let Some(previous) = by_name.insert(name.to_string(), index) {
                    if previous != index {
                        return Err(LintError::Registry(format!(
                            "name {} is used by both {} and {}",
                            name,
                            configs[previous].name(),
                            config.name()
                        )));
                    }
                }
            }
        }
        Ok(Self { configs, by_name })
    }

    /// Look up a linter by its name or any alternative name.
    pub fn get(&self, name: &str) -> Option<&LinterConfig> {
        self.by_name.get(name).map(|&index| &self.configs[index])
    }

    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        self.get(name).map(LinterConfig::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn all(&self) -> &[LinterConfig] {
        &self.configs
    }

    pub fn enabled_by_default(&self) -> Vec<&LinterConfig> {
        self.configs
            .iter()
            .filter(|c| c.is_enabled_by_default())
            .collect()
    }

    pub fn for_preset(&self, preset: Preset) -> Vec<&LinterConfig> {
        self.configs
            .iter()
            .filter(|c| c.presets().contains(&preset))
            .collect()
    }

    /// Presets used by at least one registered linter, sorted.
    pub fn all_presets(&self) -> Vec<Preset> {
        self.configs
            .iter()
            .flat_map(|c| c.presets().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AnalysisContext;
    use crate::linter::FnTask;
    use std::sync::Arc;

    fn task(name: &str) -> LinterConfig {
        LinterConfig::standalone(Arc::new(FnTask::new(name, |_: &AnalysisContext| Ok(vec![]))))
    }

    fn registry() -> LinterRegistry {
        LinterRegistry::new(vec![
            task("govet")
                .with_alternative_names(["vet", "vetshadow"])
                .with_presets([Preset::Bugs])
                .enabled_by_default(),
            task("gofmt").with_presets([Preset::Format]).with_auto_fix(),
            task("gocyclo").with_presets([Preset::Complexity]),
        ])
        .unwrap()
    }

    #[test]
    fn test_get_resolves_alternative_names() {
        let registry = registry();
        assert_eq!(registry.canonical_name("vet"), Some("govet"));
        assert_eq!(registry.canonical_name("govet"), Some("govet"));
        assert!(registry.get("golint").is_none());
    }

    #[test]
    fn test_duplicate_alias_rejected() {
        let result = LinterRegistry::new(vec![
            task("govet").with_alternative_names(["vet"]),
            task("vet"),
        ]);
        assert!(matches!(result, Err(LintError::Registry(_))));
    }

    #[test]
    fn test_presets_and_defaults() {
        let registry = registry();
        assert_eq!(
            registry.all_presets(),
            vec![Preset::Bugs, Preset::Complexity, Preset::Format]
        );
        assert_eq!(registry.for_preset(Preset::Format)[0].name(), "gofmt");
        let defaults: Vec<_> = registry.enabled_by_default().iter().map(|c| c.name()).collect();
        assert_eq!(defaults, vec!["govet"]);
    }
}
