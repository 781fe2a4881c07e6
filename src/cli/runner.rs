use bson::Bson;
use std::io::Write;

use crate::config::FilterConfig;
use crate::errors::FilterError;
use crate::filter::{Rule, WireFormat};
use crate::logger::AUDIT_TARGET;

use super::command::{Command, RuleSource};
use super::util::infer_format;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Default)]
pub enum OutputMode {
    #[default]
    Human,
    Plain,
    Json,
}

impl std::str::FromStr for OutputMode {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "plain" => Ok(Self::Plain),
            "json" => Ok(Self::Json),
            other => Err(FilterError::Config(format!("unknown output mode: {other}"))),
        }
    }
}

/// Runs a command with human output on stdout.
///
/// # Errors
/// See [`run_with_format`].
pub fn run(cfg: &FilterConfig, cmd: Command) -> Result<(), FilterError> {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    run_with_format(cfg, cmd, OutputMode::Human, &mut lock)
}

/// Runs a command and writes its result to `out`.
///
/// # Errors
/// Returns the first read, decode, validation or compile failure.
pub fn run_with_format<W: Write>(cfg: &FilterConfig, cmd: Command, mode: OutputMode, out: &mut W) -> Result<(), FilterError> {
    let name = cmd.name();
    let result = dispatch(cfg, cmd, mode, out);
    match &result {
        Ok(()) => log::info!(target: AUDIT_TARGET, "command={name} status=ok"),
        Err(e) => log::info!(target: AUDIT_TARGET, "command={name} status=error error=\"{e}\""),
    }
    result
}

fn dispatch<W: Write>(cfg: &FilterConfig, cmd: Command, mode: OutputMode, out: &mut W) -> Result<(), FilterError> {
    let pipeline = cfg.pipeline();
    match cmd {
        Command::Validate { source } => {
            let rule = read_rule(cfg, &source)?;
            rule.validate(pipeline.policy())?;
            let fields = rule.fields();
            match mode {
                OutputMode::Json => {
                    let json = serde_json::json!({"valid": true, "kind": rule.kind().to_string(), "fields": fields});
                    writeln!(out, "{json}")?;
                }
                OutputMode::Plain => writeln!(out, "ok")?,
                OutputMode::Human => writeln!(out, "valid {} fields={}", rule.kind(), fields.join(","))?,
            }
            Ok(())
        }
        Command::Compile { source, parent } => {
            let rule = read_rule(cfg, &source)?;
            let doc = pipeline.compile_checked(&rule, parent.as_ref())?;
            let json = Bson::Document(doc).into_relaxed_extjson();
            match mode {
                OutputMode::Human => writeln!(out, "{}", serde_json::to_string_pretty(&json)?)?,
                OutputMode::Plain | OutputMode::Json => writeln!(out, "{json}")?,
            }
            Ok(())
        }
        Command::Fields { source } => {
            let rule = read_rule(cfg, &source)?;
            let fields = rule.fields();
            match mode {
                OutputMode::Json => writeln!(out, "{}", serde_json::to_string(&fields)?)?,
                _ => {
                    for f in fields {
                        writeln!(out, "{f}")?;
                    }
                }
            }
            Ok(())
        }
        Command::Convert { input, from, to, out: target } => {
            let from = from.unwrap_or_else(|| infer_format(&input));
            let raw = std::fs::read(&input)?;
            let rule = pipeline.decode(&raw, from)?;
            let bytes = match to {
                WireFormat::Json => rule.to_json_string()?.into_bytes(),
                WireFormat::Bson => rule.to_bson_bytes()?,
            };
            match target {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    let dest = path.display().to_string();
                    match mode {
                        OutputMode::Json => {
                            let json = serde_json::json!({"from": from, "to": to, "bytes": bytes.len(), "out": dest});
                            writeln!(out, "{json}")?;
                        }
                        OutputMode::Plain => writeln!(out, "{dest}")?,
                        OutputMode::Human => writeln!(out, "converted {from} -> {to} bytes={} out={dest}", bytes.len())?,
                    }
                }
                None => {
                    out.write_all(&bytes)?;
                    if to == WireFormat::Json {
                        writeln!(out)?;
                    }
                }
            }
            Ok(())
        }
    }
}

fn read_rule(cfg: &FilterConfig, source: &RuleSource) -> Result<Rule, FilterError> {
    let decoder = cfg.decoder();
    match source {
        RuleSource::Inline(text) => decoder.from_json_str(text),
        RuleSource::File { path, format } => {
            let raw = std::fs::read(path)?;
            match format.unwrap_or_else(|| infer_format(path)) {
                WireFormat::Json => decoder.from_json_slice(&raw),
                WireFormat::Bson => decoder.from_bson_slice(&raw),
            }
        }
    }
}
