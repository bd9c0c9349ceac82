// [libs/infra/db/src/lib.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE LIBRARY ROOT (V3.0 - COMMUNE LEDGER)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L3)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DE PERSISTENCIA
 * =================================================================
 */

/// Cliente de conexión al motor libSQL (archivo local o RAM compartida).
pub mod client;
/// Gobernanza estructural del esquema (tablas, índices, idempotencia).
pub mod schema;
/// Catálogo semántico de fallos de persistencia.
pub mod errors;
/// Caché caliente de credenciales disponibles y estadísticas del día.
pub mod cache;
/// Repositorios de autoridad única sobre el Ledger.
pub mod repositories;

pub use cache::{CacheStatus, HotCache, StoreWriteObserver};
pub use client::StoreClient;
pub use errors::StoreError;
pub use repositories::{CredentialRepository, EnrollmentVerdict, StatsRepository};
