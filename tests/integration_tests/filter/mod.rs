#[path = "mod_compile.rs"]
mod compile_tests;
#[path = "mod_decode.rs"]
mod decode_tests;
#[path = "mod_encode.rs"]
mod encode_tests;
#[path = "mod_pipeline.rs"]
mod pipeline_tests;
#[path = "mod_validate.rs"]
mod validate_tests;
