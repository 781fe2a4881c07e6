//! Small helpers shared by the engine: developer trace lines and numeric conversions.
pub mod devlog;
pub mod num;
