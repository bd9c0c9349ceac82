// [apps/gateway/src/handlers/mod.rs]
/*!
 * =================================================================
 * APARATO: HANDLER ACCESS MATRIX (V4.0)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ADAPTADORES DE ENTRADA PARA RÁFAGAS HTTP
 * =================================================================
 */

/// Sonda de salud JSON para monitoreo y orquestadores.
pub mod health;
/// Pipeline de admisión y relevo (todo método, todo path).
pub mod relay;
/// Landing de estado público (HTML estático).
pub mod visual;
