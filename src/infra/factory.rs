use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::services::booking::BookingService;
use crate::infra::repositories::{
    postgres_appointment_repo::PostgresAppointmentRepo,
    postgres_notification_repo::PostgresNotificationRepo,
    postgres_rule_repo::PostgresRuleRepo, postgres_service_repo::PostgresServiceRepo,
    postgres_tenant_repo::PostgresTenantRepo,
    sqlite_appointment_repo::SqliteAppointmentRepo,
    sqlite_notification_repo::SqliteNotificationRepo,
    sqlite_rule_repo::SqliteRuleRepo, sqlite_service_repo::SqliteServiceRepo,
    sqlite_tenant_repo::SqliteTenantRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;

        let appointment_repo = Arc::new(PostgresAppointmentRepo::new(pool.clone()));
        let service_repo = Arc::new(PostgresServiceRepo::new(pool.clone()));
        let notification_repo = Arc::new(PostgresNotificationRepo::new(pool.clone()));
        let booking_service = Arc::new(BookingService::new(
            appointment_repo.clone(),
            service_repo.clone(),
            notification_repo.clone(),
            config.timezone,
        ));

        AppState {
            config: config.clone(),
            tenant_repo: Arc::new(PostgresTenantRepo::new(pool.clone())),
            service_repo,
            rule_repo: Arc::new(PostgresRuleRepo::new(pool.clone())),
            appointment_repo,
            notification_repo,
            booking_service,
        }
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;

        let appointment_repo = Arc::new(SqliteAppointmentRepo::new(pool.clone()));
        let service_repo = Arc::new(SqliteServiceRepo::new(pool.clone()));
        let notification_repo = Arc::new(SqliteNotificationRepo::new(pool.clone()));
        let booking_service = Arc::new(BookingService::new(
            appointment_repo.clone(),
            service_repo.clone(),
            notification_repo.clone(),
            config.timezone,
        ));

        AppState {
            config: config.clone(),
            tenant_repo: Arc::new(SqliteTenantRepo::new(pool.clone())),
            service_repo,
            rule_repo: Arc::new(SqliteRuleRepo::new(pool.clone())),
            appointment_repo,
            notification_repo,
            booking_service,
        }
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
