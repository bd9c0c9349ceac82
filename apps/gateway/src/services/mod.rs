// [apps/gateway/src/services/mod.rs]
/*!
 * =================================================================
 * APARATO: BACKGROUND SERVICES MATRIX (V4.0)
 * CLASIFICACIÓN: BACKGROUND INFRASTRUCTURE (ESTRATO L4)
 * RESPONSABILIDAD: DAEMONS DE MANTENIMIENTO DEL GATEWAY
 * =================================================================
 */

/// Refresco periódico de los snapshots de la caché caliente.
pub mod cache_sentinel;
/// Purga por edad del Ledger estadístico.
pub mod janitor;
/// Caché LRU+TTL de respuestas para GETs idempotentes configurados.
pub mod read_cache;

pub use cache_sentinel::spawn_cache_sentinel;
pub use janitor::spawn_statistics_janitor;
