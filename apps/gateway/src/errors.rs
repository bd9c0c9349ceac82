// INICIO DEL ARCHIVO [apps/gateway/src/errors.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY ERROR TAXONOMY (V6.0 - WIRE MAPPING)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: MAPEO DE FALLOS DE ADMISIÓN A ESTADOS HTTP
 *
 * # Logic:
 * Cada fallo del pipeline emite un cuerpo JSON `{error, message}` con
 * el estado de la taxonomía. Las respuestas no-2xx del upstream NO son
 * errores del gateway: pasan verbatim y alimentan la máquina de estados.
 * =================================================================
 */

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use commune_domain_lifecycle::{SelectionError, ValidationError};
use commune_infra_db::StoreError;
use commune_infra_upstream::UpstreamError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum GatewayError {
    /// Sin cabecera Authorization => 401.
    #[error("no credential presented: send 'Authorization: Bearer <credential>'")]
    MissingCredential,

    /// Puerta de ritmo del presentador => 429 con hint de espera.
    #[error("presenter rate limited: retry in {wait_seconds} second(s)")]
    PresenterRateLimited { wait_seconds: u64 },

    /// Longitud o reglas de contenido => 400.
    #[error(transparent)]
    ValidationRejected(#[from] ValidationError),

    /// Cabecera proxy-host en desacuerdo con el proveedor => 400.
    #[error("proxy host disagreement: {0}")]
    ProviderMisconfigured(String),

    /// Proceso sin proveedor configurado => 404.
    #[error("no upstream provider configured")]
    ProviderMissing,

    /// Pool disponible vacío en el camino balanceado => 503.
    #[error("credential commune exhausted: no available credential")]
    PoolEmpty,

    /// Deadline saliente excedido (camino autenticado) => 502.
    #[error("upstream deadline exceeded")]
    UpstreamTimeout,

    /// Fallo de I/O hacia el proveedor => 502.
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(String),

    /// Cualquier falta no capturada => 500.
    #[error("internal fault: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Etiqueta estable de la taxonomía para el cuerpo JSON.
    #[must_use]
    pub fn taxonomy_label(&self) -> &'static str {
        match self {
            GatewayError::MissingCredential => "missing_credential",
            GatewayError::PresenterRateLimited { .. } => "presenter_rate_limited",
            GatewayError::ValidationRejected(ValidationError::CredentialLengthInvalid) => {
                "credential_length_invalid"
            }
            GatewayError::ValidationRejected(_) => "validation_failed",
            GatewayError::ProviderMisconfigured(_) => "provider_misconfigured",
            GatewayError::ProviderMissing => "provider_misconfigured",
            GatewayError::PoolEmpty => "pool_empty",
            GatewayError::UpstreamTimeout => "upstream_timeout",
            GatewayError::UpstreamUnreachable(_) => "upstream_unreachable",
            GatewayError::Internal(_) => "internal",
        }
    }

    #[must_use]
    pub fn outbound_status(&self) -> StatusCode {
        match self {
            GatewayError::MissingCredential => StatusCode::UNAUTHORIZED,
            GatewayError::PresenterRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::ValidationRejected(_) => StatusCode::BAD_REQUEST,
            GatewayError::ProviderMisconfigured(_) => StatusCode::BAD_REQUEST,
            GatewayError::ProviderMissing => StatusCode::NOT_FOUND,
            GatewayError::PoolEmpty => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::UpstreamTimeout => StatusCode::BAD_GATEWAY,
            GatewayError::UpstreamUnreachable(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        if matches!(self, GatewayError::Internal(_)) {
            error!("💀 [PIPELINE_FAULT]: {}", self);
        }

        let response_body = Json(json!({
            "error": self.taxonomy_label(),
            "message": self.to_string(),
        }));

        (self.outbound_status(), response_body).into_response()
    }
}

impl From<StoreError> for GatewayError {
    fn from(store_fault: StoreError) -> Self {
        GatewayError::Internal(store_fault.to_string())
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(upstream_fault: UpstreamError) -> Self {
        match upstream_fault {
            UpstreamError::Timeout => GatewayError::UpstreamTimeout,
            UpstreamError::Unreachable(detail) => GatewayError::UpstreamUnreachable(detail),
            other => GatewayError::Internal(other.to_string()),
        }
    }
}

impl From<SelectionError> for GatewayError {
    fn from(selection_fault: SelectionError) -> Self {
        match selection_fault {
            SelectionError::NoAvailable => GatewayError::PoolEmpty,
        }
    }
}
// FIN DEL ARCHIVO [apps/gateway/src/errors.rs]
