use aula::core::{AppState, Config};
use aula::monitoring::{CpuMonitorConfig, start_cpu_monitoring};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Configurazione da .env / variabili d'ambiente
    let config = Config::from_env()?;
    config.print_info();

    // Pool SQLite + migrations incorporate nel binario
    let pool = prepare_database(&config).await?;
    sqlx::migrate!().run(&pool).await?;
    info!("Database ready");

    let state = Arc::new(AppState::new(
        pool,
        config.jwt_secret.clone(),
        config.media_root.clone(),
    ));

    // Monitoraggio CPU/memoria del processo, se abilitato
    if config.cpu_monitor_enabled {
        tokio::spawn(start_cpu_monitoring(CpuMonitorConfig {
            interval_secs: config.cpu_monitor_interval_secs,
            ..CpuMonitorConfig::default()
        }));
    }

    let app = aula::create_router(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Apre il pool SQLite creando file e directory se mancanti,
/// con i PRAGMA di rito (foreign keys, WAL, busy timeout).
async fn prepare_database(config: &Config) -> Result<SqlitePool, Box<dyn std::error::Error>> {
    ensure_sqlite_path(&config.database_url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    Ok(pool)
}

/// SQLite non crea da solo il file del database: lo facciamo qui
async fn ensure_sqlite_path(url: &str) -> Result<(), std::io::Error> {
    let Some(sqlite_path) = url.strip_prefix("sqlite://") else {
        return Ok(());
    };

    if sqlite_path == ":memory:" {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await?;
    }

    Ok(())
}
