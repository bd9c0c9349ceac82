// INICIO DEL ARCHIVO [libs/domain/models/src/credential.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL DOMAIN MODELS (V9.0 - COMMUNE DTO)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: DEFINICIÓN DE REGISTROS DE CREDENCIAL Y SELECCIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * El registro persistido viaja en RAM con el material ya descifrado;
 * la variante 'Transient' modela credenciales presentadas que aún no
 * pertenecen al pool, erradicando el centinela id = -1.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Registro soberano de una credencial residente en el pool.
///
/// El campo `material` contiene el secreto en claro únicamente en RAM;
/// la capa de persistencia lo cristaliza cifrado bajo AES-256-GCM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// Identidad estable asignada por el Ledger en la primera persistencia.
    pub id: i64,
    /// Huella SHA-256 (hex) del material crudo. Única en todo el Ledger.
    pub fingerprint: String,
    /// Material crudo de la credencial, descifrado en memoria.
    pub material: String,
    /// Abreviación no sensible para el rastro forense (`sk-a..f9Qz`).
    pub display_label: String,
    /// Instante absoluto (epoch segundos) hasta el cual la credencial
    /// permanece en cuarentena. Ausente = saludable.
    pub blocked_until: Option<i64>,
    /// Fallos de autenticación consecutivos contra el proveedor.
    pub consecutive_auth_failures: u32,
    /// Estrangulamientos (429) consecutivos contra el proveedor.
    pub consecutive_throttles: u32,
    /// Último instante de éxito 2xx observado.
    pub last_success_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl CredentialRecord {
    /// Evalúa la cuarentena contra el reloj actual; los deadlines nunca
    /// se limpian por un job de fondo, cada lectura re-evalúa.
    #[must_use]
    pub fn is_blocked(&self, now_epoch_seconds: i64) -> bool {
        matches!(self.blocked_until, Some(deadline) if deadline > now_epoch_seconds)
    }

    /// Segundos restantes de cuarentena (0 si ya expiró o no existe).
    #[must_use]
    pub fn remaining_block_seconds(&self, now_epoch_seconds: i64) -> i64 {
        self.blocked_until
            .map(|deadline| (deadline - now_epoch_seconds).max(0))
            .unwrap_or(0)
    }
}

/// Credencial presentada que todavía no reside en el pool.
#[derive(Debug, Clone)]
pub struct TransientCredential {
    pub fingerprint: String,
    pub material: String,
    pub display_label: String,
}

/// Resultado de la decisión de pool del pipeline de admisión.
///
/// Sustituye al centinela id = -1: el compilador garantiza que ningún
/// estrato confunda una credencial transitoria con una residente.
#[derive(Debug, Clone)]
pub enum SelectedCredential {
    /// Credencial persistida en el Ledger (propia del presentador o
    /// elegida por el balanceador).
    Resident(CredentialRecord),
    /// Credencial presentada aún no enrolada; candidata a auto-enrolamiento.
    Transient(TransientCredential),
}

impl SelectedCredential {
    /// Material crudo que viajará en la cabecera de autenticación saliente.
    #[must_use]
    pub fn material(&self) -> &str {
        match self {
            SelectedCredential::Resident(record) => &record.material,
            SelectedCredential::Transient(transient) => &transient.material,
        }
    }

    /// Etiqueta no sensible para el rastro.
    #[must_use]
    pub fn display_label(&self) -> &str {
        match self {
            SelectedCredential::Resident(record) => &record.display_label,
            SelectedCredential::Transient(transient) => &transient.display_label,
        }
    }

    #[must_use]
    pub fn is_resident(&self) -> bool {
        matches!(self, SelectedCredential::Resident(_))
    }
}
// FIN DEL ARCHIVO [libs/domain/models/src/credential.rs]
