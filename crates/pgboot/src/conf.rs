//! Rendering and persisting the server settings file.

use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use pgboot_config::Settings;
use tempfile::Builder;
use tracing::debug;

use crate::errors::BootstrapError;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Tracing target for settings persistence.
const CONF_TARGET: &str = "pgboot::conf";

/// File name the server reads its settings from.
const CONFIG_FILE: &str = "postgresql.conf";

/// Renders the merged settings and writes them into the data directory.
///
/// The file is replaced atomically: settings are flushed and fsync'd to a
/// temporary file in the data directory before being renamed into place, so
/// the server never observes a partially written document. The freshly
/// initialised file is overwritten wholesale; every value the server needs
/// beyond its compiled-in defaults must come through the merged settings.
///
/// # Errors
///
/// Returns [`BootstrapError::SettingsWrite`] when the file cannot be
/// written.
pub(crate) fn write_server_config(
    data_dir: &Utf8Path,
    settings: &Settings,
) -> Result<Utf8PathBuf, BootstrapError> {
    let path = data_dir.join(CONFIG_FILE);
    let rendered = settings.render();
    atomic_write(&path, rendered.as_bytes()).map_err(|source| BootstrapError::SettingsWrite {
        path: path.clone(),
        source,
    })?;
    debug!(
        target: CONF_TARGET,
        path = %path,
        entries = settings.len(),
        "wrote server settings"
    );
    Ok(path)
}

/// Writes the provided bytes to the path using an atomic persist step.
fn atomic_write(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let directory = path.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            "target path did not have a parent directory",
        )
    })?;

    let mut builder = Builder::new();
    builder.prefix(path.file_name().unwrap_or("pgboot"));
    #[cfg(unix)]
    {
        use std::fs::Permissions;
        builder.permissions(Permissions::from_mode(0o600));
    }

    let mut file = builder.tempfile_in(directory)?;
    file.write_all(contents)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|error| error.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use pgboot_config::{SettingValue, Settings};
    use tempfile::TempDir;

    use super::*;

    fn utf8_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir should be UTF-8")
    }

    #[test]
    fn writes_rendered_settings_into_the_data_directory() {
        let root = TempDir::new().expect("tempdir should create");
        let data_dir = utf8_path(&root);
        let mut settings = Settings::new();
        settings.set("port", SettingValue::Int(5433));
        settings.set("listen_addresses", SettingValue::Text(String::new()));

        let path =
            write_server_config(&data_dir, &settings).expect("settings should write");

        assert_eq!(path, data_dir.join("postgresql.conf"));
        let contents = fs::read_to_string(&path).expect("settings file should read");
        assert_eq!(contents, "port = 5433\nlisten_addresses = ''\n");
    }

    #[test]
    fn replaces_an_existing_settings_file() {
        let root = TempDir::new().expect("tempdir should create");
        let data_dir = utf8_path(&root);
        let path = data_dir.join("postgresql.conf");
        fs::write(&path, "stale = yes\n").expect("seed file should write");

        let mut settings = Settings::new();
        settings.set("fsync", SettingValue::Bool(false));
        write_server_config(&data_dir, &settings).expect("settings should write");

        let contents = fs::read_to_string(&path).expect("settings file should read");
        assert_eq!(contents, "fsync = no\n");
    }

    #[test]
    fn missing_data_directory_reports_the_settings_path() {
        let root = TempDir::new().expect("tempdir should create");
        let data_dir = utf8_path(&root).join("absent");

        let error = write_server_config(&data_dir, &Settings::new())
            .expect_err("write should fail without a data directory");

        assert!(matches!(
            error,
            BootstrapError::SettingsWrite { ref path, .. }
                if path.ends_with("postgresql.conf")
        ));
    }
}
