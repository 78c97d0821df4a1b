//! Integration tests for the `validate` command.
use episim::cli::handle_validate_command;
use episim::settings::Settings;
use std::path::PathBuf;

/// An integration test for the `validate` command.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("EPISIM_LOG_LEVEL", "off") };

    // Also checks that the initial population file is valid
    handle_validate_command(&PathBuf::from("demos/town"), Some(Settings::default())).unwrap();
}
