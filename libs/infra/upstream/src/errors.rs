// [libs/infra/upstream/src/errors.rs]
/*!
 * =================================================================
 * APARATO: UPSTREAM ERROR CATALOG (V3.0 - COMMUNE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE RELEVO
 * =================================================================
 */

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    /// El deadline por petición expiró; la llamada saliente fue cancelada.
    #[error("[L3_UPSTREAM_FAULT]: DEADLINE_EXCEEDED")]
    Timeout,

    /// Fallo de I/O distinto al deadline (DNS, conexión rechazada, TLS).
    #[error("[L3_UPSTREAM_FAULT]: UPLINK_UNREACHABLE -> {0}")]
    Unreachable(String),

    /// La composición base_url + path entrante no produce una URL válida.
    #[error("[L3_UPSTREAM_FAULT]: TARGET_URL_MALFORMED -> {0}")]
    MalformedUrl(String),

    /// El método entrante no es un token HTTP válido.
    #[error("[L3_UPSTREAM_FAULT]: METHOD_REJECTED -> {0}")]
    MethodRejected(String),
}
