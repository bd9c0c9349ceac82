// [libs/infra/db/src/repositories/mod.rs]
/*!
 * =================================================================
 * APARATO: REPOSITORY ACCESS MATRIX (V5.0 - COMMUNE TOPOLOGY)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: ORQUESTACIÓN DE SUBSISTEMAS DE PERSISTENCIA
 * =================================================================
 */

/// Gestión del Ledger de credenciales y su ciclo de vida persistente.
pub mod credential;
/// Registro SQL de autoridad única (placeholders parametrizados).
pub mod queries;
/// Ledger estadístico diario por credencial.
pub mod stats;

// --- RE-EXPORTACIONES SOBERANAS (NOMINAL ACCESS API) ---

pub use credential::{CredentialRepository, EnrollmentVerdict};
pub use stats::StatsRepository;
