//! Integration tests for the `example run` command.
use episim::cli::RunOpts;
use episim::cli::example::handle_example_run_command;
use episim::settings::Settings;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("EPISIM_LOG_LEVEL", "off") };

    let output_dir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(output_dir.path().to_path_buf()),
        ..RunOpts::default()
    };
    handle_example_run_command("town", &opts, Some(Settings::default())).unwrap();

    let stats = std::fs::read_to_string(output_dir.path().join("daily_stats.csv")).unwrap();
    assert_eq!(stats.lines().count(), 1 + 31);
    assert!(!output_dir.path().join("debug_agents.csv").exists());
}
