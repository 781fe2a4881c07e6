mod command;
mod runner;
mod util;

pub use command::{Command, RuleSource};
pub use runner::{OutputMode, run, run_with_format};
pub use util::{infer_format, parse_parent, parse_wire_format};
