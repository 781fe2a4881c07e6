//! Filter expressions for document queries.
//!
//! A filter is a tree of [`filter::Rule`]s: atom rules test one field with one
//! operator, combined rules join children with `AND` / `OR`. Trees arrive as JSON
//! or BSON, are checked against an [`filter::ExprOption`] policy and compile to a
//! Mongo-style query document.
//!
//! ```
//! use filterkit::filter::{ExprOption, parse_rule_json};
//!
//! let rule = parse_rule_json(r#"{"field":"age","operator":"greater","value":18}"#).unwrap();
//! rule.validate(&ExprOption::default()).unwrap();
//! let doc = rule.compile(None).unwrap();
//! assert_eq!(doc, bson::doc! { "age": { "$gt": 18 } });
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod filter;
pub mod logger;
pub mod utils;

pub use config::FilterConfig;
pub use errors::FilterError;

/// Initializes logging from the `FILTERKIT_LOG_*` environment variables.
///
/// # Errors
/// Returns an error if the log directory or appenders cannot be set up.
pub fn init() -> Result<(), FilterError> {
    logger::configure_from_env()
}
