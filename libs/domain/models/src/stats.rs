// INICIO DEL ARCHIVO [libs/domain/models/src/stats.rs]
/*!
 * =================================================================
 * APARATO: DAILY STATISTICS MODELS (V5.2 - LEDGER DTO)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: CONTADORES DIARIOS POR CREDENCIAL (UTC)
 * =================================================================
 */

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Contadores diarios de una credencial, únicos por (credencial, fecha civil).
///
/// La fila se crea de forma perezosa en el primer incremento y se destruye
/// en cascada al eliminar la credencial, o por edad vía el Janitor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DailyStatsRecord {
    pub credential_id: i64,
    /// Fecha civil UTC en formato `YYYY-MM-DD`.
    pub civil_date: String,
    /// Llamadas reenviadas portando esta credencial.
    pub call_count: u64,
    /// Estrangulamientos 429 observados portando esta credencial.
    pub throttle_count: u64,
    /// Última subred de cliente observada (atribución limitada a /24).
    pub last_client_subnet: Option<String>,
}

/// Fecha civil UTC del día en curso, la única autoridad temporal del
/// estrato estadístico.
#[must_use]
pub fn utc_civil_date_today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
// FIN DEL ARCHIVO [libs/domain/models/src/stats.rs]
