//! Monitoraggio CPU/memoria del processo server
//!
//! Campiona l'utilizzo del processo corrente a intervalli configurabili
//! tramite `sysinfo` e lo scrive su file di log. Utile per osservare il
//! costo del fanout WebSocket sotto carico senza strumenti esterni.

use std::fs::OpenOptions;
use std::io::Write;
use std::time::Duration;
use sysinfo::{Pid, ProcessesToUpdate, System};
use tokio::time;
use tracing::{error, info};

/// Configurazione per il monitoraggio della CPU
pub struct CpuMonitorConfig {
    /// Intervallo di campionamento in secondi
    pub interval_secs: u64,
    /// Path del file di log (opzionale)
    pub log_file_path: Option<String>,
    /// Abilita logging in tempo reale tramite tracing
    pub enable_realtime_logging: bool,
}

impl Default for CpuMonitorConfig {
    fn default() -> Self {
        Self {
            interval_secs: 120,
            log_file_path: Some("cpu_stats.log".to_string()),
            enable_realtime_logging: false,
        }
    }
}

/// Statistiche del processo raccolte in un dato momento
#[derive(Debug, Clone)]
pub struct CpuStats {
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub cpu_percentage: f32,
    pub memory_usage_mb: f64,
}

impl CpuStats {
    /// Formatta le statistiche come stringa per il logging
    pub fn format_for_log(&self) -> String {
        format!(
            "[{}] CPU Usage: {:.2}% | Memory: {:.2} MB",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.cpu_percentage,
            self.memory_usage_mb
        )
    }
}

/// Task in background: campiona il processo corrente ogni `interval_secs`
/// secondi e scrive le statistiche su file e/o su tracing.
pub async fn start_cpu_monitoring(config: CpuMonitorConfig) {
    info!(
        "Starting process monitoring with interval: {} seconds",
        config.interval_secs
    );

    if let Some(ref path) = config.log_file_path {
        if let Err(e) = initialize_log_file(path, config.interval_secs) {
            error!("Failed to initialize CPU log file: {}", e);
        }
    }

    let mut sys = System::new_all();
    let current_pid = Pid::from_u32(std::process::id());

    let mut interval = time::interval(Duration::from_secs(config.interval_secs));
    // il primo tick scatta subito, lo consumiamo
    interval.tick().await;

    loop {
        interval.tick().await;

        sys.refresh_processes(ProcessesToUpdate::Some(&[current_pid]), true);
        let Some(process) = sys.process(current_pid) else {
            error!("Current process not found by sysinfo");
            continue;
        };

        let stats = CpuStats {
            timestamp: chrono::Utc::now(),
            cpu_percentage: process.cpu_usage(),
            memory_usage_mb: process.memory() as f64 / (1024.0 * 1024.0),
        };

        if let Some(ref path) = config.log_file_path {
            if let Err(e) = log_to_file(path, &stats) {
                error!("Failed to write CPU stats to file: {}", e);
            }
        }

        if config.enable_realtime_logging {
            info!(
                "CPU Stats - Usage: {:.2}% | Memory: {:.2} MB",
                stats.cpu_percentage, stats.memory_usage_mb
            );
        }
    }
}

/// Inizializza il file di log con un header (truncate ad ogni avvio)
fn initialize_log_file(path: &str, interval_secs: u64) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    writeln!(file, "=== Process Usage Log ===")?;
    writeln!(
        file,
        "Started: {} (UTC Time)",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file, "Logging Interval: {} seconds", interval_secs)?;
    writeln!(file, "=========================\n")?;
    file.flush()?;

    Ok(())
}

/// Scrive le statistiche su file
fn log_to_file(path: &str, stats: &CpuStats) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "{}", stats.format_for_log())?;
    file.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_stats_format() {
        let stats = CpuStats {
            timestamp: chrono::Utc::now(),
            cpu_percentage: 2.05,
            memory_usage_mb: 256.78,
        };

        let formatted = stats.format_for_log();
        assert!(formatted.contains("2.05%"));
        assert!(formatted.contains("256.78 MB"));
    }

    #[test]
    fn test_default_config() {
        let config = CpuMonitorConfig::default();
        assert_eq!(config.interval_secs, 120);
        assert_eq!(config.log_file_path, Some("cpu_stats.log".to_string()));
        assert!(!config.enable_realtime_logging);
    }
}
