use tempfile::tempdir;

// One test owns the global logger so reconfiguration cannot race.
#[test]
fn configure_logging_writes_app_audit_and_dev_files() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("proc_logs");
    filterkit::logger::configure_logging(Some(&base), Some("debug"), Some(3)).unwrap();
    log::info!("hello app");
    log::info!(target: filterkit::logger::AUDIT_TARGET, "audit event");
    assert!(base.join("app.log").exists());
    assert!(base.join("audit.log").exists());
    assert!(!base.join("dev.log").exists());

    let dev_base = dir.path().join("dev_logs");
    filterkit::logger::configure_logging_with_dev(Some(&dev_base), Some("trace"), None, true).unwrap();
    filterkit::devlog!("dev line {}", 1);
    assert!(dev_base.join("app.log").exists());
    assert!(dev_base.join("dev.log").exists());
}

#[test]
fn missing_log_config_file_is_a_config_error() {
    let dir = tempdir().unwrap();
    let err = filterkit::logger::init_path(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, filterkit::errors::FilterError::Config(msg) if msg.contains("absent.yaml")));
}
