// [apps/gateway/src/services/janitor.rs]
/**
 * =================================================================
 * APARATO: STATISTICS JANITOR SERVICE (V6.1 - RETENTION SWEEP)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: PURGA POR EDAD DEL LEDGER ESTADÍSTICO
 *
 * # Logic:
 * Barrido en la ignición y cada 'cleanup_interval_minutes'. El daemon
 * jamás propaga pánico: un fallo de purga se registra y el ciclo
 * continúa en el siguiente tick. Se detiene ante la señal de drenado.
 * =================================================================
 */

use crate::state::AppState;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

pub fn spawn_statistics_janitor(application_state: AppState, mut shutdown_signal: watch::Receiver<bool>) {
    if !application_state.config.stats.auto_cleanup {
        info!("🧹 [JANITOR]: auto_cleanup disabled; retention sweep daemon not spawned.");
        return;
    }

    let cleanup_interval_minutes = application_state.config.stats.cleanup_interval_minutes.max(1);
    let retention_days = application_state.config.stats.retention_days;

    tokio::spawn(async move {
        info!(
            "🧹 [JANITOR_ACTIVE]: Retention sweep daemon initiated (every {}m, window {}d).",
            cleanup_interval_minutes, retention_days
        );

        // El primer tick es inmediato: barrido de ignición garantizado.
        let mut sweep_ticker = interval(Duration::from_secs(cleanup_interval_minutes * 60));

        loop {
            tokio::select! {
                _ = sweep_ticker.tick() => {
                    match application_state.stats_repository.delete_older_than(retention_days).await {
                        Ok(purged_count) => {
                            info!("🧹 [JANITOR_SWEEP]: {} statistic rows purged.", purged_count);
                        }
                        Err(sweep_fault) => {
                            warn!("⚠️ [JANITOR_FAULT]: Retention sweep incomplete: {}", sweep_fault);
                        }
                    }
                }
                _ = shutdown_signal.changed() => {
                    info!("🧹 [JANITOR]: Drain signal received. Standing down.");
                    break;
                }
            }
        }
    });
}
