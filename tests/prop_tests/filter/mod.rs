#[path = "prop_roundtrip.rs"]
mod roundtrip_props;
#[path = "prop_validate.rs"]
mod validate_props;
