//! Idempotent database provisioning with ordered schema application.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use pgboot_config::{DatabaseName, InitialDatabase, InstanceConfig, SchemaSource};
use pgboot_engine::sql;
use pgboot_engine::{ClusterEngine, SqlSession};
use tracing::{debug, info};

use crate::errors::BootstrapError;
use crate::interrupt::InterruptFlag;

/// Tracing target for database provisioning.
const PROVISION_TARGET: &str = "pgboot::provision";

/// Provisions every configured database, creating only the absent ones.
///
/// With no databases configured the behaviour depends on the default-database
/// switch: either a single database named after the invoking user is ensured,
/// or provisioning is a logged no-op.
pub(crate) fn provision_databases<E: ClusterEngine>(
    engine: &E,
    config: &InstanceConfig,
    admin: &SqlSession,
    interrupt: &InterruptFlag,
) -> Result<(), BootstrapError> {
    if config.databases.is_empty() {
        if config.create_default_database {
            let fallback = InitialDatabase::new(invoking_user_database()?, Vec::new());
            return ensure_database(engine, admin, &fallback);
        }
        info!(
            target: PROVISION_TARGET,
            "no databases configured; nothing to provision"
        );
        return Ok(());
    }
    for database in &config.databases {
        interrupt.ensure_clear()?;
        ensure_database(engine, admin, database)?;
    }
    Ok(())
}

/// Creates one database and applies its schema files unless it already
/// exists.
fn ensure_database<E: ClusterEngine>(
    engine: &E,
    admin: &SqlSession,
    database: &InitialDatabase,
) -> Result<(), BootstrapError> {
    let name = &database.name;
    let exists = engine
        .database_exists(admin, name)
        .map_err(|source| BootstrapError::ExistenceProbe {
            name: name.clone(),
            source,
        })?;
    if exists {
        info!(
            target: PROVISION_TARGET,
            database = name.as_str(),
            "database already present; skipping"
        );
        return Ok(());
    }

    // Classify every schema source before touching the catalogue so a
    // misconfigured path cannot leave a half-provisioned database behind.
    let mut files = Vec::new();
    for schema in &database.schemas {
        files.extend(resolve_schema(schema)?);
    }

    let statement = format!("CREATE DATABASE {}", sql::quote_identifier(name.as_str()));
    engine
        .execute_sql(admin, &statement)
        .map_err(|source| BootstrapError::CreateDatabase {
            name: name.clone(),
            source,
        })?;
    info!(target: PROVISION_TARGET, database = name.as_str(), "created database");

    let session = admin.with_database(name.clone());
    for file in &files {
        apply_schema_file(engine, &session, file)?;
    }
    Ok(())
}

/// Expands one schema source into the ordered list of files to apply.
fn resolve_schema(source: &SchemaSource) -> Result<Vec<Utf8PathBuf>, BootstrapError> {
    let path = source.as_path();
    if path.is_file() {
        return Ok(vec![path.to_owned()]);
    }
    if path.is_dir() {
        return enumerate_sql_files(path);
    }
    Err(BootstrapError::SchemaSourceUnresolvable {
        path: path.to_owned(),
    })
}

/// Lists the `.sql` files directly inside `dir` in lexicographic order.
fn enumerate_sql_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, BootstrapError> {
    let entries = dir
        .read_dir_utf8()
        .map_err(|source| BootstrapError::SchemaEnumeration {
            path: dir.to_owned(),
            source,
        })?;
    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BootstrapError::SchemaEnumeration {
            path: dir.to_owned(),
            source,
        })?;
        let path = entry.path();
        if path.extension() == Some("sql") && path.is_file() {
            files.push(path.to_owned());
        }
    }
    files.sort();
    Ok(files)
}

/// Submits one schema file as an independent batch.
fn apply_schema_file<E: ClusterEngine>(
    engine: &E,
    session: &SqlSession,
    path: &Utf8Path,
) -> Result<(), BootstrapError> {
    let raw = fs::read_to_string(path).map_err(|source| BootstrapError::SchemaRead {
        path: path.to_owned(),
        source,
    })?;
    let batch = sql::strip_blank_lines(&raw);
    if batch.is_empty() {
        debug!(
            target: PROVISION_TARGET,
            file = %path,
            "schema file holds no statements; skipping"
        );
        return Ok(());
    }
    info!(
        target: PROVISION_TARGET,
        database = session.database.as_str(),
        file = %path,
        "applying schema file"
    );
    engine
        .execute_sql(session, &batch)
        .map_err(|source| BootstrapError::SchemaApplication {
            database: session.database.clone(),
            path: path.to_owned(),
            source,
        })
}

/// Derives the fallback database name from the invoking user.
fn invoking_user_database() -> Result<DatabaseName, BootstrapError> {
    let uid = nix::unistd::geteuid();
    let user = nix::unistd::User::from_uid(uid)
        .map_err(|errno| BootstrapError::DefaultDatabaseUser {
            message: format!("failed to look up uid {uid}: {errno}"),
        })?
        .ok_or_else(|| BootstrapError::DefaultDatabaseUser {
            message: format!("uid {uid} has no passwd entry"),
        })?;
    DatabaseName::new(user.name.as_str()).map_err(|error| BootstrapError::DefaultDatabaseUser {
        message: format!(
            "user name '{}' is not usable as a database name: {error}",
            user.name
        ),
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use camino::Utf8PathBuf;
    use pgboot_config::DirSpec;
    use pgboot_engine::EngineError;
    use tempfile::TempDir;

    use super::*;
    use crate::test_support::MockEngine;

    fn admin() -> SqlSession {
        SqlSession::admin(Utf8PathBuf::from("/tmp/sock"), 5432)
    }

    fn utf8_path(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("tempdir should be UTF-8")
    }

    fn named(name: &str) -> DatabaseName {
        DatabaseName::new(name).expect("name should validate")
    }

    #[test]
    fn existing_databases_are_skipped_without_creation() {
        let mut engine = MockEngine::new();
        engine
            .expect_database_exists()
            .withf(|_, name| name.as_str() == "app")
            .times(1)
            .returning(|_, _| Ok(true));
        engine.expect_execute_sql().times(0);

        let database = InitialDatabase::new(named("app"), Vec::new());
        ensure_database(&engine, &admin(), &database).expect("present database should be skipped");
    }

    #[test]
    fn absent_databases_are_created_with_a_quoted_identifier() {
        let mut engine = MockEngine::new();
        engine
            .expect_database_exists()
            .returning(|_, _| Ok(false));
        engine
            .expect_execute_sql()
            .withf(|session, sql| {
                session.database.as_str() == "postgres" && sql == "CREATE DATABASE \"app\""
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let database = InitialDatabase::new(named("app"), Vec::new());
        ensure_database(&engine, &admin(), &database).expect("absent database should be created");
    }

    #[test]
    fn unresolvable_schema_sources_block_creation() {
        let mut engine = MockEngine::new();
        engine
            .expect_database_exists()
            .returning(|_, _| Ok(false));
        engine.expect_execute_sql().times(0);

        let database = InitialDatabase::new(
            named("app"),
            vec![SchemaSource::new("/definitely/not/here.sql")],
        );
        let error = ensure_database(&engine, &admin(), &database)
            .expect_err("missing schema source should fail");

        assert!(matches!(
            error,
            BootstrapError::SchemaSourceUnresolvable { ref path }
                if path.as_str() == "/definitely/not/here.sql"
        ));
    }

    #[test]
    fn directory_sources_apply_sql_files_in_name_order() {
        let root = TempDir::new().expect("tempdir should create");
        let dir = utf8_path(&root);
        fs::write(dir.join("010-later.sql"), "SELECT 10;\n").expect("schema should write");
        fs::write(dir.join("001-first.sql"), "SELECT 1;\n").expect("schema should write");
        fs::write(dir.join("notes.txt"), "ignored\n").expect("note should write");

        let files = enumerate_sql_files(&dir).expect("directory should enumerate");

        let names: Vec<_> = files
            .iter()
            .map(|path| path.file_name().unwrap_or_default())
            .collect();
        assert_eq!(names, ["001-first.sql", "010-later.sql"]);
    }

    #[test]
    fn blank_only_schema_files_are_skipped() {
        let root = TempDir::new().expect("tempdir should create");
        let dir = utf8_path(&root);
        let file = dir.join("empty.sql");
        fs::write(&file, "\n   \n\t\n").expect("schema should write");

        let mut engine = MockEngine::new();
        engine.expect_execute_sql().times(0);

        let session = admin().with_database(named("app"));
        apply_schema_file(&engine, &session, &file).expect("blank file should be skipped");
    }

    #[test]
    fn schema_failures_carry_database_and_file() {
        let root = TempDir::new().expect("tempdir should create");
        let dir = utf8_path(&root);
        let file = dir.join("broken.sql");
        fs::write(&file, "SELECT broken;\n").expect("schema should write");

        let mut engine = MockEngine::new();
        engine.expect_execute_sql().returning(|_, _| {
            Err(EngineError::Failed {
                binary: "psql".into(),
                status: 3,
                stderr: "syntax error".into(),
            })
        });

        let session = admin().with_database(named("app"));
        let error =
            apply_schema_file(&engine, &session, &file).expect_err("broken schema should fail");

        assert!(matches!(
            error,
            BootstrapError::SchemaApplication { ref database, .. }
                if database.as_str() == "app"
        ));
    }

    #[test]
    fn no_databases_and_no_default_is_a_quiet_no_op() {
        let mut engine = MockEngine::new();
        engine.expect_database_exists().times(0);
        engine.expect_execute_sql().times(0);

        let mut config = InstanceConfig::new(DirSpec::literal("/srv/pg/data"));
        config.create_default_database = false;

        provision_databases(&engine, &config, &admin(), &InterruptFlag::inert())
            .expect("empty provisioning should succeed");
    }

    #[test]
    fn interruption_between_databases_stops_the_run() {
        let mut engine = MockEngine::new();
        engine.expect_database_exists().times(0);
        engine.expect_execute_sql().times(0);

        let mut config = InstanceConfig::new(DirSpec::literal("/srv/pg/data"));
        config.databases = vec![InitialDatabase::new(named("app"), Vec::new())];
        let interrupt = InterruptFlag::inert();
        interrupt.trigger();

        let error = provision_databases(&engine, &config, &admin(), &interrupt)
            .expect_err("interrupted provisioning should fail");

        assert!(matches!(error, BootstrapError::Interrupted));
    }
}
