// INICIO DEL ARCHIVO [libs/domain/models/src/provider.rs]
/*!
 * =================================================================
 * APARATO: PROVIDER CONTRACT MODELS (V7.0 - SINGLE UPSTREAM)
 * CLASIFICACIÓN: DOMAIN ENTITIES (L2)
 * RESPONSABILIDAD: CONTRATO DEL PROVEEDOR UPSTREAM Y SUS REGLAS
 *
 * VISION HIPER-HOLÍSTICA:
 * Un proceso sirve exactamente un proveedor; el contrato transporta
 * las reglas de validación de contenido y los patrones cacheables
 * declarados en la configuración.
 * =================================================================
 */

use serde::{Deserialize, Serialize};

/// Contrato de un proveedor upstream declarado en la configuración.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Nombre nominal referenciado por `server.provider`.
    pub name: String,
    /// URL raíz del proveedor (`https://api.example.com/v1`).
    pub base_url: String,
    /// Cabecera de autenticación saliente (normalmente `Authorization`).
    #[serde(default = "default_auth_header")]
    pub auth_header: String,
    /// Deadline por petición hacia el upstream, en milisegundos.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Reglas de contenido aplicadas por el validador de admisión.
    #[serde(default)]
    pub validation: Vec<ValidationRule>,
    /// Patrones GET idempotentes servibles desde la caché de lectura.
    #[serde(default)]
    pub cacheable_paths: Vec<CacheablePathRule>,
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_timeout_ms() -> u64 {
    60_000
}

/// Tipo de regla de validación de contenido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleKind {
    /// Navega el cuerpo JSON mediante la ruta punteada de `key`.
    BodyJson,
    /// Evalúa la expresión contra el path entrante (`key` se ignora).
    Path,
    /// Evalúa la expresión contra el parámetro de query nombrado por `key`.
    Query,
}

/// Regla individual: clave ausente o patrón sin coincidencia => rechazo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(rename = "type")]
    pub kind: RuleKind,
    #[serde(default)]
    pub key: String,
    pub pattern: String,
}

/// Patrón de path GET cacheable con su TTL propio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheablePathRule {
    /// Expresión regular evaluada contra el path entrante.
    pub pattern: String,
    /// Vida útil de la respuesta 200 cacheada, en segundos.
    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,
}

fn default_cache_ttl_seconds() -> u64 {
    60
}
// FIN DEL ARCHIVO [libs/domain/models/src/provider.rs]
