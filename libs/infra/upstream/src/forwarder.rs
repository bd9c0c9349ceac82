// INICIO DEL ARCHIVO [libs/infra/upstream/src/forwarder.rs]
/*!
 * =================================================================
 * APARATO: UPSTREAM RELAY TUNNEL (V8.0 - PURE SIDE-EFFECT)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: LLAMADA SALIENTE CON SANEADO Y REESCRITURA DE AUTH
 *
 * VISION HIPER-HOLÍSTICA:
 * El túnel no ejerce política alguna: compone la URL por semántica de
 * join (no concatenación), sanea cabeceras hop-by-hop en ambos
 * sentidos, reescribe la cabecera de autenticación cuando el pipeline
 * lo ordena y aplica el deadline del proveedor con cancelación.
 * =================================================================
 */

use crate::errors::UpstreamError;
use commune_domain_models::ProviderConfig;
use reqwest::{Client, Method, Url};
use std::time::Duration;
use tracing::{debug, instrument};

/// Cabeceras hop-by-hop que jamás cruzan el túnel (RFC 7230 §6.1).
const HOP_BY_HOP_HEADERS: &[&str] = &[
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// Cabeceras portadoras de autenticación, purgadas antes de sellar la propia.
const AUTH_BEARING_HEADERS: &[&str] = &[
    "authorization",
    "x-api-key",
    "api-key",
    "apikey",
    "proxy-authorization",
];

/// Disciplina de autenticación saliente.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Purga toda cabecera de auth entrante y sella `Bearer <material>`
    /// en la cabecera configurada del proveedor.
    Rewrite(String),
    /// Conserva las cabeceras del llamador intactas (camino cacheable).
    Passthrough,
}

/// Respuesta relevada en tipos planos: el transporte entrante decide
/// cómo re-materializarla (evita acoplar versiones de la crate `http`).
#[derive(Debug, Clone)]
pub struct RelayedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Túnel de relevo hacia el único proveedor configurado del proceso.
pub struct UpstreamForwarder {
    network_session_client: Client,
    provider: ProviderConfig,
    provider_base_url: Url,
}

impl UpstreamForwarder {
    pub fn new(provider: ProviderConfig) -> Result<Self, UpstreamError> {
        let provider_base_url = Url::parse(&provider.base_url)
            .map_err(|fault| UpstreamError::MalformedUrl(format!("{}: {fault}", provider.base_url)))?;

        let network_session_client = Client::builder()
            .user_agent("Commune-Gateway/0.4")
            .build()
            .map_err(|fault| UpstreamError::Unreachable(fault.to_string()))?;

        Ok(Self {
            network_session_client,
            provider,
            provider_base_url,
        })
    }

    #[must_use]
    pub fn provider(&self) -> &ProviderConfig {
        &self.provider
    }

    /// Host nominal del proveedor, para el acuerdo de cabecera proxy-host.
    #[must_use]
    pub fn provider_host(&self) -> Option<&str> {
        self.provider_base_url.host_str()
    }

    /**
     * Ejecuta la llamada saliente y releva la respuesta en tipos planos.
     *
     * # Errors:
     * - `UpstreamError::Timeout`: Deadline del proveedor excedido (cancelación).
     * - `UpstreamError::Unreachable`: Cualquier otro fallo de I/O.
     */
    #[instrument(skip(self, inbound_headers, body_payload), fields(method = %request_method, path = %path_and_query))]
    pub async fn forward(
        &self,
        request_method: &str,
        path_and_query: &str,
        inbound_headers: &[(String, String)],
        body_payload: Option<Vec<u8>>,
        auth_mode: AuthMode,
    ) -> Result<RelayedResponse, UpstreamError> {
        // Semántica de join: el path entrante se resuelve contra la URL
        // base del proveedor, jamás por concatenación de strings.
        let target_url = self
            .provider_base_url
            .join(path_and_query)
            .map_err(|fault| UpstreamError::MalformedUrl(format!("{path_and_query}: {fault}")))?;

        let outbound_method = Method::from_bytes(request_method.as_bytes())
            .map_err(|_| UpstreamError::MethodRejected(request_method.to_string()))?;

        let rewriting_auth = matches!(auth_mode, AuthMode::Rewrite(_));
        let mut request_builder = self
            .network_session_client
            .request(outbound_method, target_url)
            .timeout(Duration::from_millis(self.provider.timeout_ms));

        for (header_name, header_value) in inbound_headers {
            if is_stripped_on_egress(header_name) {
                continue;
            }
            if rewriting_auth && is_auth_bearing(header_name) {
                continue;
            }
            request_builder = request_builder.header(header_name, header_value);
        }

        if let AuthMode::Rewrite(credential_material) = &auth_mode {
            request_builder = request_builder.header(
                self.provider.auth_header.as_str(),
                format!("Bearer {credential_material}"),
            );
        }

        if let Some(payload_bytes) = body_payload {
            // Un cuerpo que parsea como JSON se re-serializa normalizado;
            // cualquier otro contenido viaja intacto.
            match serde_json::from_slice::<serde_json::Value>(&payload_bytes) {
                Ok(json_payload) => {
                    let normalized = serde_json::to_vec(&json_payload)
                        .map_err(|fault| UpstreamError::Unreachable(fault.to_string()))?;
                    request_builder = request_builder.body(normalized);
                }
                Err(_) => {
                    request_builder = request_builder.body(payload_bytes);
                }
            }
        }

        let upstream_response = request_builder.send().await.map_err(|network_fault| {
            if network_fault.is_timeout() {
                UpstreamError::Timeout
            } else {
                UpstreamError::Unreachable(network_fault.to_string())
            }
        })?;

        let relayed_status = upstream_response.status().as_u16();

        // Eco de cabeceras menos hop-by-hop y codificación: CORS y caché
        // del upstream se preservan. Content-Length se recalcula aguas abajo.
        let relayed_headers: Vec<(String, String)> = upstream_response
            .headers()
            .iter()
            .filter(|(header_name, _)| !is_stripped_on_ingress(header_name.as_str()))
            .map(|(header_name, header_value)| {
                (
                    header_name.to_string(),
                    String::from_utf8_lossy(header_value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let relayed_body = upstream_response
            .bytes()
            .await
            .map_err(|body_fault| {
                if body_fault.is_timeout() {
                    UpstreamError::Timeout
                } else {
                    UpstreamError::Unreachable(body_fault.to_string())
                }
            })?
            .to_vec();

        debug!("🌊 [RELAY]: Upstream answered {} ({} bytes).", relayed_status, relayed_body.len());

        Ok(RelayedResponse {
            status: relayed_status,
            headers: relayed_headers,
            body: relayed_body,
        })
    }
}

fn is_hop_by_hop(header_name: &str) -> bool {
    HOP_BY_HOP_HEADERS
        .iter()
        .any(|hop_header| header_name.eq_ignore_ascii_case(hop_header))
}

fn is_auth_bearing(header_name: &str) -> bool {
    AUTH_BEARING_HEADERS
        .iter()
        .any(|auth_header| header_name.eq_ignore_ascii_case(auth_header))
}

/// Purga de egreso: hop-by-hop, Host (lo fija reqwest hacia el proveedor),
/// Content-Encoding y Content-Length (el cuerpo puede re-serializarse).
fn is_stripped_on_egress(header_name: &str) -> bool {
    is_hop_by_hop(header_name)
        || header_name.eq_ignore_ascii_case("host")
        || header_name.eq_ignore_ascii_case("content-encoding")
        || header_name.eq_ignore_ascii_case("content-length")
}

/// Purga de ingreso (eco al cliente): hop-by-hop más la codificación y
/// longitud originales (reqwest ya descomprimió el cuerpo).
fn is_stripped_on_ingress(header_name: &str) -> bool {
    is_hop_by_hop(header_name)
        || header_name.eq_ignore_ascii_case("content-encoding")
        || header_name.eq_ignore_ascii_case("content-length")
}
// FIN DEL ARCHIVO [libs/infra/upstream/src/forwarder.rs]
