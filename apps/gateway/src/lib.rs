// [apps/gateway/src/lib.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY LIBRARY ROOT (V4.0 - SOVEREIGN AUTHORITY)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN SUPREMA DEL ÁRBOL DE MÓDULOS
 * =================================================================
 */

// --- ESTRATO DE CONFIGURACIÓN Y ARRANQUE ---
/// Hidratación y resolución de la configuración TOML.
pub mod config;
/// Núcleo de mando para la ignición de servicios y transporte.
pub mod kernel;

// --- ESTRATO DE DATOS Y ESTADO (L1-APP) ---
/// Gestor del sistema nervioso central del gateway.
pub mod state;

// --- ESTRATO DE TRANSPORTE Y ACCIÓN ---
/// Taxonomía de fallos de admisión y su mapeo HTTP.
pub mod errors;
/// Adaptadores de entrada para ráfagas HTTP.
pub mod handlers;
/// Definición de rutas y topología de red.
pub mod routes;

// --- ESTRATO DE SOPORTE ---
/// Daemons de fondo y caché de lecturas idempotentes.
pub mod services;

/**
 * PRELUDIO DEL GATEWAY
 *
 * Re-exportación estratégica de los componentes necesarios para la
 * ignición mínima desde 'main.rs' y los utilitarios.
 */
pub mod prelude {
    pub use crate::config::GatewayConfig;
    pub use crate::kernel::CommuneKernel;
    pub use crate::state::AppState;
}
