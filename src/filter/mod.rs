// Submodules for separation of concerns
mod compile;
mod decode;
mod encode;
mod operator;
mod pipeline;
mod rule;
mod types;
mod validate;
mod value;

// Public API re-exports
pub use decode::{RuleDecoder, parse_rule_bson, parse_rule_json};
pub use encode::{encode_bson, encode_json};
pub use operator::{LogicOperator, Operator};
pub use pipeline::{QueryPipeline, WireFormat};
pub use rule::{AtomRule, CombinedRule, Rule};
pub use types::{
    AND_KEY, ColumnType, DEFAULT_MAX_DECODE_DEPTH, DEFAULT_MAX_IN_LIMIT, DEFAULT_MAX_NOT_IN_LIMIT,
    DEFAULT_MAX_RULES_LIMIT, ExprOption, FILTER_ARRAY_ELEMENT, OR_KEY, RuleOption, RuleType,
};
pub use value::{Value, parse_datetime};
