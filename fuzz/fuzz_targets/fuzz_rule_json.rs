#![no_main]
use filterkit::filter::{ExprOption, RuleDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 8192 { return; }
    // Decode must never panic or recurse past its ceiling; whatever decodes must validate and compile without panicking.
    if let Ok(rule) = RuleDecoder::new(16).from_json_slice(data) {
        let _ = rule.validate(&ExprOption::default());
        let _ = rule.compile(None);
    }
});
