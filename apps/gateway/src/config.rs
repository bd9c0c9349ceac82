// INICIO DEL ARCHIVO [apps/gateway/src/config.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY CONFIGURATION STRATA (V7.0 - TOML SOBERANO)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: HIDRATACIÓN Y RESOLUCIÓN DE LA CONFIGURACIÓN
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. DEFAULTS NIVELADOS: Toda omisión cae a los valores nominales del
 *    despliegue de referencia (puerto 3000, cupo 200, bloqueo 1440m).
 * 2. PROVIDER RESOLUTION: 'server.provider' selecciona por nombre; un
 *    nombre sin proveedor declarado es fallo de ignición, jamás un
 *    fallback silencioso.
 * 3. KEY PRECEDENCE: La llave maestra se resuelve entorno > config >
 *    archivo persistido junto al Ledger.
 * =================================================================
 */

use commune_domain_lifecycle::BlockingPolicy;
use commune_domain_models::ProviderConfig;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Variable de entorno que apunta al archivo de configuración.
pub const CONFIG_PATH_ENV: &str = "COMMUNE_CONFIG";
/// Variable de entorno con la llave maestra (precedencia suprema).
pub const ENCRYPTION_KEY_ENV: &str = "COMMUNE_ENCRYPTION_KEY";
/// Ruta nominal del archivo de configuración.
const DEFAULT_CONFIG_PATH: &str = "commune.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("[L3_CONFIG_FAULT]: FILE_UNREADABLE [{path}] -> {fault}")]
    Unreadable { path: String, fault: std::io::Error },

    #[error("[L3_CONFIG_FAULT]: TOML_REJECTED -> {0}")]
    Malformed(#[from] toml::de::Error),

    #[error("[L3_CONFIG_FAULT]: PROVIDER_UNRESOLVED -> '{0}' is not a configured provider")]
    ProviderUnresolved(String),
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
    #[serde(default)]
    pub stats: StatsConfig,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
    #[serde(default)]
    pub ssl: SslConfig,
    /// Llave maestra en hex (64 chars). El entorno tiene precedencia.
    #[serde(default)]
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Nombre del proveedor activo dentro de `providers[]`.
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
    /// Puerta de capacidad del auto-enrolamiento.
    #[serde(default = "default_max_keys")]
    pub max_keys: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockingConfig {
    #[serde(default = "default_rate_limit_seconds")]
    pub presented_key_rate_limit_seconds: u64,
    #[serde(default = "default_auth_block_minutes")]
    pub auth_failure_block_minutes: i64,
    #[serde(default = "default_auth_delete_threshold")]
    pub auth_failure_delete_threshold: u32,
    #[serde(default = "default_throttle_base_minutes")]
    pub throttle_backoff_base_minutes: i64,
    #[serde(default = "default_throttle_delete_threshold")]
    pub throttle_delete_threshold: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,
    #[serde(default = "default_cleanup_interval_minutes")]
    pub cleanup_interval_minutes: u64,
    #[serde(default = "default_auto_cleanup")]
    pub auto_cleanup: bool,
    /// Intervalo S de la caché caliente (piso interno de 60s).
    #[serde(default = "default_cache_expiry_seconds")]
    pub cache_expiry_seconds: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SslConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub cert_path: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

fn default_port() -> u16 { 3000 }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_database_path() -> String { "commune.db".to_string() }
fn default_max_keys() -> u64 { 200 }
fn default_rate_limit_seconds() -> u64 { 1 }
fn default_auth_block_minutes() -> i64 { 1440 }
fn default_auth_delete_threshold() -> u32 { 3 }
fn default_throttle_base_minutes() -> i64 { 1 }
fn default_throttle_delete_threshold() -> u32 { 10 }
fn default_retention_days() -> i64 { 30 }
fn default_cleanup_interval_minutes() -> u64 { 60 }
fn default_auto_cleanup() -> bool { true }
fn default_cache_expiry_seconds() -> u64 { 60 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: default_port(), host: default_host(), provider: None }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: default_database_path(), max_keys: default_max_keys() }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            presented_key_rate_limit_seconds: default_rate_limit_seconds(),
            auth_failure_block_minutes: default_auth_block_minutes(),
            auth_failure_delete_threshold: default_auth_delete_threshold(),
            throttle_backoff_base_minutes: default_throttle_base_minutes(),
            throttle_delete_threshold: default_throttle_delete_threshold(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            retention_days: default_retention_days(),
            cleanup_interval_minutes: default_cleanup_interval_minutes(),
            auto_cleanup: default_auto_cleanup(),
            cache_expiry_seconds: default_cache_expiry_seconds(),
        }
    }
}

impl GatewayConfig {
    /// Hidrata la configuración desde `COMMUNE_CONFIG` o la ruta nominal.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from_path(Path::new(&config_path))
    }

    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            // Sin archivo: ignición con defaults puros (pool vacío, sin proveedor).
            return Ok(Self::default());
        }

        let raw_document = std::fs::read_to_string(config_path).map_err(|fault| {
            ConfigError::Unreadable { path: config_path.display().to_string(), fault }
        })?;

        Ok(toml::from_str(&raw_document)?)
    }

    pub fn parse_toml(raw_document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw_document)?)
    }

    /**
     * Resuelve el proveedor activo del proceso.
     *
     * - `server.provider` nombrado pero ausente => fallo de ignición.
     * - Sin nombre => primer proveedor declarado, si existe.
     */
    pub fn resolve_provider(&self) -> Result<Option<ProviderConfig>, ConfigError> {
        match &self.server.provider {
            Some(nominated_name) => self
                .providers
                .iter()
                .find(|provider| &provider.name == nominated_name)
                .cloned()
                .map(Some)
                .ok_or_else(|| ConfigError::ProviderUnresolved(nominated_name.clone())),
            None => Ok(self.providers.first().cloned()),
        }
    }

    /// Política de bloqueo hidratada para el gestor de ciclo de vida.
    #[must_use]
    pub fn blocking_policy(&self) -> BlockingPolicy {
        BlockingPolicy {
            presented_key_rate_limit_seconds: self.blocking.presented_key_rate_limit_seconds,
            auth_failure_block_minutes: self.blocking.auth_failure_block_minutes,
            auth_failure_delete_threshold: self.blocking.auth_failure_delete_threshold,
            throttle_backoff_base_minutes: self.blocking.throttle_backoff_base_minutes,
            throttle_delete_threshold: self.blocking.throttle_delete_threshold,
            max_pool_size: self.database.max_keys,
        }
    }

    /// Archivo de llave maestra persistido junto al Ledger (modo 0600).
    #[must_use]
    pub fn master_key_file_path(&self) -> PathBuf {
        PathBuf::from(format!("{}.key", self.database.path))
    }
}
// FIN DEL ARCHIVO [apps/gateway/src/config.rs]
