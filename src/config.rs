use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::FilterError;
use crate::filter::{DEFAULT_MAX_DECODE_DEPTH, ExprOption, QueryPipeline, RuleDecoder};

pub const CONFIG_ENV: &str = "FILTERKIT_CONFIG";
pub const CONFIG_FILE: &str = "filterkit.toml";

/// On-disk settings used by the CLI and by services embedding the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub max_decode_depth: usize,
    pub policy: ExprOption,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { max_decode_depth: DEFAULT_MAX_DECODE_DEPTH, policy: ExprOption::default() }
    }
}

impl FilterConfig {
    /// # Errors
    /// Returns `Config` when the text is not valid TOML for this shape.
    pub fn from_toml_str(raw: &str) -> Result<Self, FilterError> {
        toml::from_str(raw).map_err(|e| FilterError::Config(e.to_string()))
    }

    /// # Errors
    /// Returns `Io` if the file cannot be read, `Config` if it does not parse.
    pub fn from_file(path: &Path) -> Result<Self, FilterError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw).map_err(|e| match e {
            FilterError::Config(msg) => FilterError::Config(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Loads settings. Precedence: explicit path, then `FILTERKIT_CONFIG`, then
    /// `./filterkit.toml`, then defaults. Environment limits are applied last.
    ///
    /// An explicit path that does not exist is an error; the implicit locations are optional.
    ///
    /// # Errors
    /// Returns `Io` or `Config` from reading and parsing, or `Config` for a bad env override.
    pub fn load(explicit: Option<&Path>) -> Result<Self, FilterError> {
        let mut cfg = match resolve_path(explicit) {
            Some(p) => Self::from_file(&p)?,
            None => Self::default(),
        };
        cfg.apply_env_with(|k| std::env::var(k).ok())?;
        Ok(cfg)
    }

    /// Applies `FILTERKIT_MAX_*` overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns `Config` when an override is not a non-negative integer.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), FilterError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots: [(&str, &mut usize); 5] = [
            ("FILTERKIT_MAX_RULES_LIMIT", &mut self.policy.max_rules_limit),
            ("FILTERKIT_MAX_RULES_DEPTH", &mut self.policy.max_rules_depth),
            ("FILTERKIT_MAX_IN_LIMIT", &mut self.policy.max_in_limit),
            ("FILTERKIT_MAX_NOT_IN_LIMIT", &mut self.policy.max_not_in_limit),
            ("FILTERKIT_MAX_DECODE_DEPTH", &mut self.max_decode_depth),
        ];
        for (key, slot) in slots {
            if let Some(raw) = lookup(key) {
                *slot = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| FilterError::Config(format!("{key} must be a non-negative integer, got {raw:?}")))?;
            }
        }
        Ok(())
    }

    #[must_use]
    pub const fn decoder(&self) -> RuleDecoder {
        RuleDecoder::new(self.max_decode_depth)
    }

    #[must_use]
    pub fn pipeline(&self) -> QueryPipeline {
        QueryPipeline::new(self.policy.clone(), self.decoder())
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = explicit {
        return Some(p.to_path_buf());
    }
    if let Ok(p) = std::env::var(CONFIG_ENV)
        && !p.is_empty()
    {
        return Some(PathBuf::from(p));
    }
    let local = std::env::current_dir().ok()?.join(CONFIG_FILE);
    local.exists().then_some(local)
}
