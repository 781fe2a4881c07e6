mod filter;
mod utils;

#[path = "mod_lib.rs"]
mod lib_tests;
