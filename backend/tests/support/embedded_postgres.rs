//! Migrated throwaway databases on the embedded cluster.
//!
//! Every test context gets its own cluster and database, brought up to date
//! with the embedded Diesel migrations. Dropping the context stops the
//! cluster.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;
use super::pg_embed::test_cluster;

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// A migrated database together with the cluster hosting it.
pub struct MigratedDatabase {
    url: String,
    _cluster: TestCluster,
}

impl MigratedDatabase {
    /// Connection URL of the database.
    pub fn url(&self) -> &str {
        self.url.as_str()
    }
}

/// Run all pending Diesel migrations against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err:?}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err:?}"))?;
    Ok(())
}

/// Start a cluster and create a migrated database on it.
pub fn migrated_database() -> Result<MigratedDatabase, String> {
    let cluster = test_cluster()?;
    let connection = cluster.connection();
    let name = format!("yamda_{}", Uuid::new_v4().simple());

    let mut admin = Client::connect(connection.database_url("postgres").as_str(), NoTls)
        .map_err(|err| format_postgres_error(&err))?;
    admin
        .batch_execute(format!(r#"CREATE DATABASE "{name}""#).as_str())
        .map_err(|err| format_postgres_error(&err))?;

    let url = connection.database_url(name.as_str());
    migrate_schema(url.as_str())?;
    Ok(MigratedDatabase {
        url,
        _cluster: cluster,
    })
}
