// [libs/domain/lifecycle/src/errors.rs]
/*!
 * =================================================================
 * APARATO: POLICY ERROR CATALOG (V3.0 - COMMUNE)
 * CLASIFICACIÓN: DOMAIN CORE (ESTRATO L2)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE POLÍTICA
 * =================================================================
 */

use thiserror::Error;

/// Fallos del selector de credenciales.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectionError {
    /// La secuencia disponible está vacía; el pipeline responde 503.
    #[error("[L2_BALANCER_FAULT]: NO_AVAILABLE_CREDENTIALS")]
    NoAvailable,
}

/// Rechazos del validador de admisión. El pipeline los mapea a HTTP 400.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// La credencial presentada mide menos de 16 o más de 256 caracteres.
    #[error("credential length out of range (expected 16-256 characters)")]
    CredentialLengthInvalid,

    /// Una regla exige una clave que la petición no transporta.
    #[error("required key '{0}' is missing from the request")]
    MissingKey(String),

    /// El valor presente no coincide con la expresión configurada.
    #[error("value for '{0}' does not match the configured pattern")]
    PatternMismatch(String),

    /// La expresión configurada no compila; se rechaza con diagnóstico.
    #[error("invalid validation pattern '{0}': {1}")]
    InvalidPattern(String, String),
}
