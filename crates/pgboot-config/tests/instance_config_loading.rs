//! Behavioural coverage for loading instance configurations from TOML files.

use std::fs;

use camino::Utf8PathBuf;
use rstest::{fixture, rstest};
use tempfile::TempDir;

use pgboot_config::{
    ConfigError, DirSpec, InstanceConfig, LogFormat, SettingValue, defaults,
};

struct Harness {
    temp_dir: TempDir,
}

impl Harness {
    fn new() -> Self {
        let temp_dir = match TempDir::new() {
            Ok(dir) => dir,
            Err(error) => panic!("failed to create temporary directory: {error}"),
        };
        Self { temp_dir }
    }

    fn write_config(&self, text: &str) -> Utf8PathBuf {
        let path = self.temp_dir.path().join("pgboot.toml");
        if let Err(error) = fs::write(&path, text) {
            panic!("failed to write configuration: {error}");
        }
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => panic!("temporary path is not UTF-8: {}", path.display()),
        }
    }

    fn missing_path(&self) -> Utf8PathBuf {
        let path = self.temp_dir.path().join("absent.toml");
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => path,
            Err(path) => panic!("temporary path is not UTF-8: {}", path.display()),
        }
    }
}

#[fixture]
fn harness() -> Harness {
    Harness::new()
}

#[rstest]
fn loads_a_complete_document(harness: Harness) {
    let path = harness.write_config(
        r#"
        superuser = "admin"
        port = 5544
        data_dir = { env = "PGDATA" }
        socket_dir = "/run/pgboot"
        init_args = ["--encoding=UTF8", "--no-sync"]
        create_default_database = false
        bin_dir = "/opt/pg/bin"
        start_timeout_secs = 90
        stop_timeout_secs = 15

        [settings]
        shared_buffers = "128MB"
        fsync = false

        [logging]
        filter = "debug"
        format = "compact"

        [scripts]
        before = "CREATE ROLE app_owner;"
        after = "GRANT app TO app_owner;"

        [[database]]
        name = "app"
        schemas = ["/srv/schema/app.sql", "/srv/schema/app.d"]

        [[database]]
        name = "audit"
        "#,
    );

    let config = InstanceConfig::from_toml_file(&path).expect("configuration should load");

    assert_eq!(config.superuser.as_deref(), Some("admin"));
    assert_eq!(config.port, 5544);
    assert_eq!(config.data_dir, DirSpec::environment("PGDATA"));
    assert_eq!(config.socket_dir, DirSpec::literal("/run/pgboot"));
    assert_eq!(config.init_args, ["--encoding=UTF8", "--no-sync"]);
    assert!(!config.create_default_database);
    assert_eq!(config.bin_dir.as_deref().map(|p| p.as_str()), Some("/opt/pg/bin"));
    assert_eq!(config.start_timeout_secs, 90);
    assert_eq!(config.stop_timeout_secs, 15);
    assert_eq!(config.logging.filter, "debug");
    assert_eq!(config.logging.format, LogFormat::Compact);
    assert_eq!(
        config.scripts.before.as_deref(),
        Some("CREATE ROLE app_owner;")
    );
    assert_eq!(config.scripts.after.as_deref(), Some("GRANT app TO app_owner;"));

    let names: Vec<&str> = config
        .databases
        .iter()
        .map(|database| database.name.as_str())
        .collect();
    assert_eq!(names, ["app", "audit"]);
    assert_eq!(config.databases[0].schemas.len(), 2);
    assert!(config.databases[1].schemas.is_empty());
}

#[rstest]
fn minimal_document_applies_defaults(harness: Harness) {
    let path = harness.write_config("data_dir = \"/var/lib/pg/data\"\n");

    let config = InstanceConfig::from_toml_file(&path).expect("configuration should load");

    assert_eq!(config.port, defaults::DEFAULT_PORT);
    assert_eq!(
        config.socket_dir,
        DirSpec::literal(defaults::DEFAULT_SOCKET_DIR)
    );
    assert!(config.superuser.is_none());
    assert!(config.create_default_database);
    assert!(config.databases.is_empty());
    assert!(config.scripts.is_empty());
    assert_eq!(config.logging.filter, defaults::DEFAULT_LOG_FILTER);
    assert_eq!(config.logging.format, LogFormat::Json);
    assert_eq!(
        config.default_settings.get("listen_addresses"),
        Some(&SettingValue::Text(String::from("localhost")))
    );
}

#[rstest]
fn settings_overrides_keep_document_order(harness: Harness) {
    let path = harness.write_config(
        r#"
        data_dir = "/var/lib/pg/data"

        [settings]
        work_mem = "64MB"
        fsync = false
        max_connections = 50
        "#,
    );

    let config = InstanceConfig::from_toml_file(&path).expect("configuration should load");

    let keys: Vec<&str> = config.settings.iter().map(|(key, _)| key).collect();
    assert_eq!(keys, ["work_mem", "fsync", "max_connections"]);
}

#[rstest]
fn missing_data_dir_is_a_parse_error(harness: Harness) {
    let path = harness.write_config("port = 5432\n");

    let error = InstanceConfig::from_toml_file(&path).expect_err("load should fail");

    assert!(matches!(error, ConfigError::Parse { .. }));
}

#[rstest]
fn invalid_database_name_is_a_parse_error(harness: Harness) {
    let path = harness.write_config(
        r#"
        data_dir = "/var/lib/pg/data"

        [[database]]
        name = "9starts-with-digit"
        "#,
    );

    let error = InstanceConfig::from_toml_file(&path).expect_err("load should fail");

    assert!(matches!(error, ConfigError::Parse { .. }));
}

#[rstest]
fn unreadable_file_reports_the_path(harness: Harness) {
    let path = harness.missing_path();

    let error = InstanceConfig::from_toml_file(&path).expect_err("load should fail");

    match error {
        ConfigError::Read { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected a read error, got: {other}"),
    }
}
