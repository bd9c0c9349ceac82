// INICIO DEL ARCHIVO [apps/gateway/src/handlers/health.rs]
/*!
 * =================================================================
 * APARATO: HEALTH PROBE HANDLER (V4.0 - TRIAGE JSON)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: DIAGNÓSTICO DE POOL, CACHÉ Y UPTIME
 *
 * # Logic:
 * 'initializing' mientras la caché caliente no ha construido su primer
 * snapshot; 'degraded' con snapshot construido pero pool disponible
 * vacío; 'healthy' en el resto de los casos.
 * =================================================================
 */

use crate::state::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

pub async fn handle_health_probe(State(application_state): State<AppState>) -> impl IntoResponse {
    let cache_diagnostics = application_state.hot_cache.cache_status();

    let total_pool_count = application_state
        .credential_repository
        .count()
        .await
        .unwrap_or(0);

    let triage_status = if !cache_diagnostics.keys_cached {
        "initializing"
    } else if cache_diagnostics.key_count == 0 {
        "degraded"
    } else {
        "healthy"
    };

    Json(json!({
        "status": triage_status,
        "uptime_seconds": application_state.uptime_seconds(),
        "provider": application_state.provider.as_ref().map(|provider| provider.name.clone()),
        "pool": {
            "total": total_pool_count,
            "available": cache_diagnostics.key_count,
        },
        "cache": {
            "keys_cached": cache_diagnostics.keys_cached,
            "keys_age_seconds": cache_diagnostics.keys_age_seconds,
            "stats_cached": cache_diagnostics.stats_cached,
            "stats_age_seconds": cache_diagnostics.stats_age_seconds,
            "stats_count": cache_diagnostics.stats_count,
        },
    }))
}
// FIN DEL ARCHIVO [apps/gateway/src/handlers/health.rs]
