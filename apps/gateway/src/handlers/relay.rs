// INICIO DEL ARCHIVO [apps/gateway/src/handlers/relay.rs]
/*!
 * =================================================================
 * APARATO: ADMISSION PIPELINE HANDLER (V12.0 - COMMUNE RELAY)
 * CLASIFICACIÓN: API ADAPTER LAYER (ESTRATO L3)
 * RESPONSABILIDAD: EXTRACCIÓN, ADMISIÓN, SELECCIÓN Y RELEVO
 *
 * VISION HIPER-HOLÍSTICA:
 * El orden del pipeline es esencial: el modo aislamiento cortocircuita
 * el balanceo para que un presentador bloqueado sólo regrese al pool
 * cuando SU credencial demuestre salud; el paso 11 convierte ese 2xx
 * en reset de contadores. El balanceo sólo opera para llamadores con
 * al menos un registro saludable en el pool (incluido el propio).
 * =================================================================
 */

use crate::errors::GatewayError;
use crate::services::read_cache::CachedRelay;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use commune_core_vault::{derive_display_label, fingerprint_hex};
use commune_domain_lifecycle::{client_subnet, validator, RateGate};
use commune_domain_models::{CacheablePathRule, SelectedCredential, TransientCredential};
use commune_infra_upstream::{AuthMode, RelayedResponse, UpstreamError, UpstreamForwarder};
use regex::Regex;
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Frontera de captura del cuerpo entrante (32 MiB).
const BODY_CAPTURE_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Cabecera de acuerdo proxy-host: si viaja, debe resolver al host del
/// proveedor configurado.
const PROXY_HOST_HEADER: &str = "x-proxy-host";

/**
 * Punto de entrada único: todo método, todo path (fallback del router).
 */
pub async fn handle_commune_relay(
    State(application_state): State<AppState>,
    peer_address: Option<ConnectInfo<SocketAddr>>,
    inbound_request: Request,
) -> Response {
    match execute_admission_pipeline(application_state, peer_address, inbound_request).await {
        Ok(relayed_response) => relayed_response,
        Err(admission_fault) => admission_fault.into_response(),
    }
}

#[instrument(skip_all, fields(method, path))]
async fn execute_admission_pipeline(
    application_state: AppState,
    peer_address: Option<ConnectInfo<SocketAddr>>,
    inbound_request: Request,
) -> Result<Response, GatewayError> {
    // --- 1. RESOLUCIÓN DEL PROVEEDOR ÚNICO ---
    let forwarder = application_state
        .forwarder
        .clone()
        .ok_or(GatewayError::ProviderMissing)?;
    let provider = forwarder.provider().clone();

    let (request_parts, request_body) = inbound_request.into_parts();
    let request_method = request_parts.method.clone();
    let request_path = request_parts.uri.path().to_string();
    let path_and_query = request_parts
        .uri
        .path_and_query()
        .map(|composite| composite.as_str().to_string())
        .unwrap_or_else(|| request_path.clone());

    tracing::Span::current().record("method", request_method.as_str());
    tracing::Span::current().record("path", request_path.as_str());

    let inbound_headers = flatten_headers(&request_parts.headers);

    // --- 2. ACUERDO DE CABECERA PROXY-HOST ---
    if let Some(claimed_host) = header_text(&request_parts.headers, PROXY_HOST_HEADER) {
        let provider_host = forwarder.provider_host().unwrap_or_default();
        if !claimed_host.eq_ignore_ascii_case(provider_host) {
            return Err(GatewayError::ProviderMisconfigured(format!(
                "'{claimed_host}' does not resolve to provider host '{provider_host}'"
            )));
        }
    }

    // --- 3. CAMINO CACHEABLE (GETs idempotentes configurados) ---
    if request_method == Method::GET {
        if let Some(matched_rule) = match_cacheable_rule(&provider.cacheable_paths, &request_path) {
            return serve_cacheable_read(
                &application_state,
                &forwarder,
                &path_and_query,
                &inbound_headers,
                &matched_rule,
            )
            .await;
        }
    }

    // --- 4. EXTRACCIÓN DE CREDENCIAL PRESENTADA ---
    let presented_material = extract_presented_credential(&request_parts.headers)
        .ok_or(GatewayError::MissingCredential)?;
    let presenter_fingerprint = fingerprint_hex(&presented_material);

    // --- 5. PUERTA DE RITMO DEL PRESENTADOR ---
    if let RateGate::Deny { wait_seconds } = application_state
        .lifecycle_manager
        .check_presenter_rate_limit(&presenter_fingerprint)
    {
        return Err(GatewayError::PresenterRateLimited { wait_seconds });
    }

    // --- 6. LONGITUD Y REGLAS DE CONTENIDO ---
    validator::validate_credential_length(&presented_material)?;

    let body_bytes = axum::body::to_bytes(request_body, BODY_CAPTURE_LIMIT_BYTES)
        .await
        .map_err(|capture_fault| GatewayError::Internal(format!("body capture: {capture_fault}")))?;

    let body_json = if body_bytes.is_empty() {
        None
    } else {
        serde_json::from_slice::<serde_json::Value>(&body_bytes).ok()
    };

    let query_parameters = flatten_query(request_parts.uri.query());
    validator::validate_request(&provider, body_json.as_ref(), &request_path, &query_parameters)?;

    // --- 7. SUBRED DEL CLIENTE (atribución limitada a /24) ---
    let client_address = resolve_client_address(&request_parts.headers, peer_address);
    let attributed_subnet = client_subnet(&client_address);

    // --- 8. DECISIÓN DE POOL ---
    let now_epoch = Utc::now().timestamp();
    let selected = match application_state
        .credential_repository
        .find_by_fingerprint(&presenter_fingerprint)
        .await?
    {
        // Presentador desconocido: transitoria, candidata a enrolamiento.
        None => SelectedCredential::Transient(TransientCredential {
            fingerprint: presenter_fingerprint.clone(),
            material: presented_material.clone(),
            display_label: derive_display_label(&presented_material),
        }),

        // MODO AISLAMIENTO: el presentador está en cuarentena; porta su
        // propia credencial, jamás una del pool.
        Some(resident_record) if resident_record.is_blocked(now_epoch) => {
            info!(
                "🔒 [ISOLATION]: Presenter {} quarantined ({}s remaining). Serving with own credential.",
                resident_record.display_label,
                resident_record.remaining_block_seconds(now_epoch)
            );
            SelectedCredential::Resident(resident_record)
        }

        // MODO BALANCEADO: snapshot permutado + power-of-two.
        Some(_healthy_record) => {
            let available_sequence = application_state.hot_cache.available_credentials().await?;
            if available_sequence.is_empty() {
                return Err(GatewayError::PoolEmpty);
            }
            let statistics_map = application_state.hot_cache.todays_statistics().await?;
            let dispatched = application_state.load_balancer.select(
                &available_sequence,
                &statistics_map,
                &presenter_fingerprint,
            )?;
            SelectedCredential::Resident(dispatched)
        }
    };

    // --- 9. LEDGER DE LLAMADAS (sólo selecciones residentes) ---
    if let SelectedCredential::Resident(dispatched_record) = &selected {
        if let Err(ledger_fault) = application_state
            .stats_repository
            .increment_call_count(dispatched_record.id, &attributed_subnet)
            .await
        {
            warn!("⚠️ [STATS_FAULT]: Call attribution incomplete: {}", ledger_fault);
        }
    }

    // --- 10. RELEVO HACIA EL UPSTREAM ---
    let outbound_body = if body_bytes.is_empty() {
        None
    } else {
        Some(body_bytes.to_vec())
    };

    let relayed = forwarder
        .forward(
            request_method.as_str(),
            &path_and_query,
            &inbound_headers,
            outbound_body,
            AuthMode::Rewrite(selected.material().to_string()),
        )
        .await?;

    // --- 11. RETROALIMENTACIÓN A LA MÁQUINA DE ESTADOS ---
    match application_state
        .lifecycle_manager
        .handle_response(&selected, relayed.status)
        .await
    {
        Ok(verdict) => {
            debug!("⚖️ [LIFECYCLE]: {:?} -> {}", verdict.action, verdict.message);
        }
        Err(lifecycle_fault) => {
            warn!("⚠️ [LIFECYCLE_FAULT]: State feedback incomplete: {}", lifecycle_fault);
        }
    }

    // --- 12. RELEVO VERBATIM AL CLIENTE ---
    Ok(materialize_response(&relayed))
}

/**
 * Camino cacheable: cabeceras del llamador intactas, sin balanceo y sin
 * retroalimentación de ciclo de vida. Deadline excedido => 504.
 */
async fn serve_cacheable_read(
    application_state: &AppState,
    forwarder: &Arc<UpstreamForwarder>,
    path_and_query: &str,
    inbound_headers: &[(String, String)],
    matched_rule: &CacheablePathRule,
) -> Result<Response, GatewayError> {
    let cache_key = format!("GET {}{}", forwarder.provider().base_url, path_and_query);

    if let Some(cache_hit) = application_state.read_cache.lookup(&cache_key) {
        return Ok(materialize_response(&RelayedResponse {
            status: cache_hit.status,
            headers: cache_hit.headers.clone(),
            body: cache_hit.body.clone(),
        }));
    }

    let relayed = match forwarder
        .forward("GET", path_and_query, inbound_headers, None, AuthMode::Passthrough)
        .await
    {
        Ok(relayed) => relayed,
        Err(UpstreamError::Timeout) => {
            return Ok((
                StatusCode::GATEWAY_TIMEOUT,
                Json(json!({
                    "error": "upstream_timeout",
                    "message": "upstream deadline exceeded on cacheable path",
                })),
            )
                .into_response());
        }
        Err(other_fault) => return Err(other_fault.into()),
    };

    if relayed.status == 200 {
        application_state.read_cache.store(
            cache_key,
            CachedRelay {
                status: relayed.status,
                headers: relayed.headers.clone(),
                body: relayed.body.clone(),
                time_to_live: std::time::Duration::from_secs(matched_rule.ttl_seconds),
            },
        );
    }

    Ok(materialize_response(&relayed))
}

/// Credencial presentada: `Bearer X` o valor crudo de Authorization.
fn extract_presented_credential(headers: &HeaderMap) -> Option<String> {
    let authorization_text = header_text(headers, "authorization")?;
    let material = authorization_text
        .strip_prefix("Bearer ")
        .unwrap_or(&authorization_text)
        .trim()
        .to_string();

    if material.is_empty() {
        None
    } else {
        Some(material)
    }
}

/// Primera regla cacheable cuyo patrón coincide con el path entrante.
/// Un patrón que no compila se ignora (el path sigue el camino autenticado).
fn match_cacheable_rule(rules: &[CacheablePathRule], request_path: &str) -> Option<CacheablePathRule> {
    rules
        .iter()
        .find(|rule| {
            Regex::new(&rule.pattern)
                .map(|compiled| compiled.is_match(request_path))
                .unwrap_or(false)
        })
        .cloned()
}

/// Atribución de origen: X-Forwarded-For (extremo izquierdo), X-Real-IP
/// o la dirección del socket, en ese orden.
fn resolve_client_address(headers: &HeaderMap, peer_address: Option<ConnectInfo<SocketAddr>>) -> String {
    if let Some(forwarded_chain) = header_text(headers, "x-forwarded-for") {
        if let Some(leftmost_hop) = forwarded_chain.split(',').next() {
            let candidate = leftmost_hop.trim();
            if !candidate.is_empty() {
                return candidate.to_string();
            }
        }
    }

    if let Some(real_ip) = header_text(headers, "x-real-ip") {
        let candidate = real_ip.trim().to_string();
        if !candidate.is_empty() {
            return candidate;
        }
    }

    peer_address
        .map(|ConnectInfo(socket_address)| socket_address.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

fn header_text(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}

fn flatten_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

fn flatten_query(raw_query: Option<&str>) -> HashMap<String, String> {
    raw_query
        .map(|query_text| {
            url::form_urlencoded::parse(query_text.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default()
}

/// Re-materializa la respuesta relevada en el transporte entrante.
fn materialize_response(relayed: &RelayedResponse) -> Response {
    let mut response_builder = Response::builder().status(
        StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::BAD_GATEWAY),
    );

    for (header_name, header_value) in &relayed.headers {
        response_builder = response_builder.header(header_name.as_str(), header_value.as_str());
    }

    response_builder
        .body(Body::from(relayed.body.clone()))
        .unwrap_or_else(|materialization_fault| {
            warn!("⚠️ [RELAY_FAULT]: Response materialization failed: {}", materialization_fault);
            StatusCode::BAD_GATEWAY.into_response()
        })
}
// FIN DEL ARCHIVO [apps/gateway/src/handlers/relay.rs]
