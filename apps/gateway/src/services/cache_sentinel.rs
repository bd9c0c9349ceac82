// [apps/gateway/src/services/cache_sentinel.rs]
/**
 * =================================================================
 * APARATO: HOT CACHE SENTINEL (V3.0 - WARM SNAPSHOTS)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: REFRESCO PERIÓDICO DE LOS SNAPSHOTS CALIENTES
 *
 * # Logic:
 * Garantiza el contrato "refresh al menos cada max(S, 60s)" incluso
 * con el camino de lectura ocioso, manteniendo al endpoint de salud
 * alimentado con edades de caché reales.
 * =================================================================
 */

use crate::state::AppState;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{info, warn};

pub fn spawn_cache_sentinel(application_state: AppState, mut shutdown_signal: watch::Receiver<bool>) {
    let refresh_interval = application_state.hot_cache.refresh_interval();

    tokio::spawn(async move {
        info!("♻️ [CACHE_SENTINEL]: Snapshot refresh daemon initiated (every {:?}).", refresh_interval);

        let mut refresh_ticker = interval(refresh_interval);

        loop {
            tokio::select! {
                _ = refresh_ticker.tick() => {
                    if let Err(refresh_fault) = application_state.hot_cache.refresh_available().await {
                        warn!("⚠️ [CACHE_SENTINEL]: Availability refresh incomplete: {}", refresh_fault);
                    }
                    if let Err(refresh_fault) = application_state.hot_cache.refresh_stats().await {
                        warn!("⚠️ [CACHE_SENTINEL]: Statistics refresh incomplete: {}", refresh_fault);
                    }
                }
                _ = shutdown_signal.changed() => {
                    info!("♻️ [CACHE_SENTINEL]: Drain signal received. Standing down.");
                    break;
                }
            }
        }
    });
}
