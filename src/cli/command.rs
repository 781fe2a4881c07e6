use std::path::PathBuf;

use crate::filter::{RuleOption, WireFormat};

/// Where a command reads its rule from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleSource {
    /// Rule text given on the command line, always JSON.
    Inline(String),
    File {
        path: PathBuf,
        format: Option<WireFormat>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Validate {
        source: RuleSource,
    },
    Compile {
        source: RuleSource,
        parent: Option<RuleOption>,
    },
    Fields {
        source: RuleSource,
    },
    /// Re-encode a rule file between the wire formats.
    Convert {
        input: PathBuf,
        from: Option<WireFormat>,
        to: WireFormat,
        out: Option<PathBuf>,
    },
}

impl Command {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Validate { .. } => "validate",
            Self::Compile { .. } => "compile",
            Self::Fields { .. } => "fields",
            Self::Convert { .. } => "convert",
        }
    }
}
