use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

use super::decode::RuleDecoder;
use super::rule::Rule;
use super::types::{ExprOption, RuleOption};
use crate::errors::FilterError;

/// The two wire encodings a rule can arrive in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Json,
    Bson,
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json => f.write_str("json"),
            Self::Bson => f.write_str("bson"),
        }
    }
}

impl FromStr for WireFormat {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "bson" => Ok(Self::Bson),
            other => Err(FilterError::Config(format!("unknown wire format: {other}"))),
        }
    }
}

/// Decode, validate and compile in one call, the way a service layer consumes the engine.
#[derive(Debug, Clone, Default)]
pub struct QueryPipeline {
    decoder: RuleDecoder,
    policy: ExprOption,
}

impl QueryPipeline {
    #[must_use]
    pub const fn new(policy: ExprOption, decoder: RuleDecoder) -> Self {
        Self { decoder, policy }
    }

    #[must_use]
    pub const fn policy(&self) -> &ExprOption {
        &self.policy
    }

    /// # Errors
    /// Returns the decoder's error for malformed or too deeply nested input.
    pub fn decode(&self, raw: &[u8], format: WireFormat) -> Result<Rule, FilterError> {
        match format {
            WireFormat::Json => self.decoder.from_json_slice(raw),
            WireFormat::Bson => self.decoder.from_bson_slice(raw),
        }
    }

    /// Decodes `raw`, validates it against the policy and compiles it.
    ///
    /// # Errors
    /// Returns the first decode, validation or compile failure.
    pub fn run(&self, raw: &[u8], format: WireFormat, ctx: Option<&RuleOption>) -> Result<Document, FilterError> {
        let rule = self.decode(raw, format)?;
        self.compile_checked(&rule, ctx)
    }

    /// Validates an already decoded tree, then compiles it.
    ///
    /// # Errors
    /// Returns the first validation or compile failure.
    pub fn compile_checked(&self, rule: &Rule, ctx: Option<&RuleOption>) -> Result<Document, FilterError> {
        let started = Instant::now();
        rule.validate(&self.policy)?;
        let out = rule.compile(ctx)?;
        crate::devlog!(
            "{{\"event\":\"compile\",\"kind\":\"{}\",\"fields\":{},\"duration_us\":{}}}",
            rule.kind(),
            rule.fields().len(),
            started.elapsed().as_micros()
        );
        Ok(out)
    }
}
