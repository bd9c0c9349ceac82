// INICIO DEL ARCHIVO [libs/domain/models/src/outcome.rs]
/*!
 * =================================================================
 * APARATO: LIFECYCLE VERDICT MODELS (V4.0)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: VEREDICTO ESTRUCTURADO DE LA MÁQUINA DE ESTADOS
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Acción resultante de alimentar un código upstream a la máquina de estados.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    /// 2xx: contadores reseteados o credencial enrolada.
    Success,
    /// Cuarentena aplicada (401 o backoff de 429).
    Blocked,
    /// Umbral de expulsión alcanzado; la credencial abandonó el pool.
    Deleted,
    /// Reenvío sin mutación de estado (pass-through).
    Proxied,
}

/// Veredicto del gestor de ciclo de vida. El pipeline lo registra en el
/// rastro; la corrección del relevo no depende de inspeccionarlo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleOutcome {
    pub action: LifecycleAction,
    /// Mensaje humano para el rastro forense.
    pub message: String,
}

impl LifecycleOutcome {
    #[must_use]
    pub fn new(action: LifecycleAction, message: impl Into<String>) -> Self {
        Self { action, message: message.into() }
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/outcome.rs]
