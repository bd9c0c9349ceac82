// [apps/gateway/src/state/mod.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY STATE ORCHESTRATOR (V8.0 - COMPOSITION ROOT)
 * CLASIFICACIÓN: APPLICATION STATE (ESTRATO L1-APP)
 * RESPONSABILIDAD: ORQUESTACIÓN DE REPOSITORIOS, CACHÉ Y POLÍTICA
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. COMPOSITION ROOT: Aquí (y sólo aquí) se registra la caché caliente
 *    como observadora de write-through de ambos repositorios: el Ledger
 *    no es dueño de la caché ni la caché del Ledger.
 * 2. SHARED IMMUTABILITY: Todo estrato viaja en 'Arc<T>'; el estado se
 *    clona por handler sin contención.
 * =================================================================
 */

use crate::config::{GatewayConfig, ENCRYPTION_KEY_ENV};
use crate::services::read_cache::ReadPathCache;
use anyhow::Context;
use commune_core_vault::{load_or_forge_master_key, CommuneVault};
use commune_domain_lifecycle::{CommuneLoadBalancer, LifecycleManager};
use commune_domain_models::ProviderConfig;
use commune_infra_db::{
    CredentialRepository, HotCache, StatsRepository, StoreClient, StoreWriteObserver,
};
use commune_infra_upstream::UpstreamForwarder;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Capacidad nominal de la caché de lecturas idempotentes.
const READ_CACHE_CAPACITY: u64 = 100;

/**
 * Contenedor de estado compartido (Thread-Safe) del Gateway.
 * Actúa como la placa base donde se conectan todos los estratos.
 */
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    /// Proveedor activo; ausente => el pipeline responde 404.
    pub provider: Option<Arc<ProviderConfig>>,
    pub database_client: StoreClient,
    pub credential_repository: Arc<CredentialRepository>,
    pub stats_repository: Arc<StatsRepository>,
    pub hot_cache: Arc<HotCache>,
    pub lifecycle_manager: Arc<LifecycleManager>,
    pub load_balancer: Arc<CommuneLoadBalancer>,
    /// Túnel de relevo; ausente junto con el proveedor.
    pub forwarder: Option<Arc<UpstreamForwarder>>,
    pub read_cache: Arc<ReadPathCache>,
    pub ignition_instant: Instant,
}

impl AppState {
    /**
     * Forja el Estado Maestro inyectando todas las dependencias.
     *
     * Un fallo aquí (llave maestra ilegible, Ledger inaccesible,
     * proveedor nominado ausente) es fatal de ignición: el binario
     * termina con código distinto de cero.
     */
    pub async fn ignite(config: GatewayConfig) -> anyhow::Result<Self> {
        debug!("🧬 [APP_STATE]: Executing ignition sequence V8.0...");

        let active_provider = config
            .resolve_provider()
            .context("provider resolution collapsed")?;

        // 1. BÓVEDA: entorno > config > archivo 0600 junto al Ledger.
        let master_key_bytes = load_or_forge_master_key(
            ENCRYPTION_KEY_ENV,
            config.encryption_key.as_deref(),
            &config.master_key_file_path(),
        )
        .context("master key resolution collapsed")?;
        let vault_engine = Arc::new(CommuneVault::new(master_key_bytes));

        // 2. LEDGER: conexión, WAL y esquema.
        let database_client = StoreClient::connect(&config.database.path)
            .await
            .context("ledger uplink collapsed")?;

        // 3. REPOSITORIOS Y CACHÉ CALIENTE (pub/sub de write-through).
        let credential_repository = Arc::new(CredentialRepository::new(
            database_client.clone(),
            vault_engine.clone(),
        ));
        let stats_repository = Arc::new(StatsRepository::new(database_client.clone()));

        let hot_cache = Arc::new(HotCache::new(
            database_client.clone(),
            vault_engine.clone(),
            config.stats.cache_expiry_seconds,
        ));

        let cache_as_observer: Arc<dyn StoreWriteObserver> = hot_cache.clone();
        credential_repository.register_observer(cache_as_observer.clone());
        stats_repository.register_observer(cache_as_observer);

        // 4. POLÍTICA: máquina de estados, puerta de ritmo y balanceador.
        let lifecycle_manager = Arc::new(LifecycleManager::new(
            credential_repository.clone(),
            stats_repository.clone(),
            config.blocking_policy(),
        ));
        let load_balancer = Arc::new(CommuneLoadBalancer::new());

        // 5. TÚNEL DE RELEVO hacia el proveedor activo.
        let forwarder = match &active_provider {
            Some(provider) => Some(Arc::new(
                UpstreamForwarder::new(provider.clone()).context("forwarder ignition collapsed")?,
            )),
            None => None,
        };

        if let Some(provider) = &active_provider {
            info!("🛰️ [APP_STATE]: Active provider [{}] -> {}", provider.name, provider.base_url);
        }

        Ok(Self {
            config: Arc::new(config),
            provider: active_provider.map(Arc::new),
            database_client,
            credential_repository,
            stats_repository,
            hot_cache,
            lifecycle_manager,
            load_balancer,
            forwarder,
            read_cache: Arc::new(ReadPathCache::new(READ_CACHE_CAPACITY)),
            ignition_instant: Instant::now(),
        })
    }

    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.ignition_instant.elapsed().as_secs()
    }
}
