use std::path::Path;

use crate::errors::FilterError;
use crate::filter::{ColumnType, RuleOption, WireFormat};

/// Parses an optional `--format` style flag.
///
/// # Errors
/// Returns `Config` for names other than `json` and `bson`.
pub fn parse_wire_format(s: Option<&str>) -> Result<Option<WireFormat>, FilterError> {
    s.map(str::parse).transpose()
}

/// Picks the wire format from the file extension; anything but `.bson` reads as JSON.
#[must_use]
pub fn infer_format(path: &Path) -> WireFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("bson") => WireFormat::Bson,
        _ => WireFormat::Json,
    }
}

/// Builds the compile context from `--parent` and `--parent-type`.
///
/// # Errors
/// Returns `Config` when only one of the two is given or the type is not `object`/`array`.
pub fn parse_parent(parent: Option<&str>, parent_type: Option<&str>) -> Result<Option<RuleOption>, FilterError> {
    match (parent, parent_type) {
        (None, None) => Ok(None),
        (Some(p), Some(t)) => {
            let typ: ColumnType = t.parse()?;
            if !matches!(typ, ColumnType::Object | ColumnType::Array) {
                return Err(FilterError::Config(format!("parent type must be object or array, got {typ}")));
            }
            Ok(Some(RuleOption::new(p, typ)))
        }
        _ => Err(FilterError::Config("--parent and --parent-type must be given together".into())),
    }
}
