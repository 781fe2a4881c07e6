#![no_main]
use filterkit::filter::{ExprOption, RuleDecoder};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(rule) = RuleDecoder::new(16).from_bson_slice(data) {
        let _ = rule.validate(&ExprOption::default());
        if let Ok(bytes) = rule.to_bson_bytes() {
            // re-encoding a decoded rule must decode again
            assert!(RuleDecoder::new(16).from_bson_slice(&bytes).is_ok());
        }
    }
});
