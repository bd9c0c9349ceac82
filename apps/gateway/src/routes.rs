// INICIO DEL ARCHIVO [apps/gateway/src/routes.rs]
/*!
 * =================================================================
 * APARATO: COMMUNE ROUTING MATRIX (V5.0 - RELAY TOPOLOGY)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: TOPOLOGÍA DE RED DEL GATEWAY
 *
 * VISION HIPER-HOLÍSTICA:
 * Topología mínima y deliberada: la landing visual, la sonda de salud
 * y un fallback universal que absorbe todo método y todo path hacia
 * el pipeline de admisión.
 * =================================================================
 */

use crate::handlers::{health, relay, visual};
use crate::state::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn create_commune_router(application_shared_state: AppState) -> Router {
    Router::new()
        // Estado público (HTML)
        .route("/", get(visual::handle_visual_landing))
        // Sonda de salud (JSON)
        .route("/health", get(health::handle_health_probe))
        // Todo lo demás se releva hacia el proveedor
        .fallback(relay::handle_commune_relay)
        .layer(TraceLayer::new_for_http())
        .with_state(application_shared_state)
}
// FIN DEL ARCHIVO [apps/gateway/src/routes.rs]
