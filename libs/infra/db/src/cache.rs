// INICIO DEL ARCHIVO [libs/infra/db/src/cache.rs]
/*!
 * =================================================================
 * APARATO: HOT CACHE STRATA (V11.0 - SELECTION INVARIANT)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: SNAPSHOTS DE SELECCIÓN SIN TOCAR EL LEDGER
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. WRITE-THROUGH: Bloqueos y expulsiones se propagan eager; la
 *    expiración natural de un deadline sólo reaparece en el próximo
 *    refresh completo (trade-off deliberado).
 * 2. SHUFFLE SOBERANO: El refresh permuta la secuencia disponible
 *    (Fisher-Yates); el orden es estable entre refreshes y constituye
 *    la fuente primaria de aleatoriedad del selector.
 * 3. REENTRANCY SHIELD: Un gate asíncrono garantiza que lectores
 *    concurrentes sobre un snapshot rancio disparen un único escaneo.
 * 4. DATE ROLLOVER: El snapshot estadístico detecta el cambio de día
 *    civil UTC y se reconstruye en la primera lectura del día nuevo.
 * =================================================================
 */

use crate::client::StoreClient;
use crate::errors::StoreError;
use crate::repositories::credential::hydrate_credential_row;
use crate::repositories::queries as sql_registry;
use chrono::Utc;
use commune_core_vault::CommuneVault;
use commune_domain_models::{utc_civil_date_today, CredentialRecord, DailyStatsRecord};
use libsql::params;
use rand::seq::SliceRandom;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Piso duro del intervalo de refresh. No estrecharlo sin auditar los
/// caminos de write-through de des-bloqueo.
const MINIMUM_REFRESH_INTERVAL_SECONDS: u64 = 60;

/// Contrato pub/sub de write-through: el Ledger publica cada mutación y
/// la caché la aplica antes de que el repositorio retorne.
pub trait StoreWriteObserver: Send + Sync {
    /// Registro recién creado (enrolamiento o import): inserción eager.
    fn credential_created(&self, record: &CredentialRecord);
    /// Cuarentena sellada: remoción eager de la secuencia disponible.
    fn credential_blocked(&self, credential_id: i64, blocked_until_epoch: i64);
    /// Contadores mutados sin cambio de disponibilidad: mutación in situ.
    fn credential_counters_changed(&self, credential_id: i64, auth_failures: u32, throttles: u32);
    /// Reset tras 2xx: el registro vuelve disponible de forma eager.
    fn credential_reset(&self, record: &CredentialRecord);
    /// Expulsión: remoción eager de ambos snapshots.
    fn credential_deleted(&self, credential_id: i64);
    /// Llamada registrada en el ledger diario.
    fn call_recorded(&self, record: &DailyStatsRecord);
    /// Estrangulamiento registrado en el ledger diario.
    fn throttle_recorded(&self, record: &DailyStatsRecord);
}

/// Diagnóstico de la caché para el endpoint de salud y monitoreo.
#[derive(Debug, Clone, serde::Serialize)]
pub struct CacheStatus {
    pub keys_cached: bool,
    pub keys_age_seconds: u64,
    pub key_count: usize,
    pub stats_cached: bool,
    pub stats_age_seconds: u64,
    pub stats_count: usize,
}

struct KeysSnapshot {
    records: Vec<CredentialRecord>,
    refreshed_at: Instant,
}

struct StatsSnapshot {
    by_credential: HashMap<i64, DailyStatsRecord>,
    civil_date: String,
    refreshed_at: Instant,
}

/// Caché caliente del Commune: sirve la secuencia disponible permutada y
/// las estadísticas del día sin tocar el Ledger en el camino caliente.
pub struct HotCache {
    database_client: StoreClient,
    vault: Arc<CommuneVault>,
    refresh_interval: Duration,
    keys_snapshot: RwLock<Option<KeysSnapshot>>,
    stats_snapshot: RwLock<Option<StatsSnapshot>>,
    keys_refresh_gate: tokio::sync::Mutex<()>,
    stats_refresh_gate: tokio::sync::Mutex<()>,
}

impl HotCache {
    #[must_use]
    pub fn new(database_client: StoreClient, vault: Arc<CommuneVault>, configured_refresh_seconds: u64) -> Self {
        let effective_refresh_seconds = configured_refresh_seconds.max(MINIMUM_REFRESH_INTERVAL_SECONDS);
        if effective_refresh_seconds != configured_refresh_seconds {
            warn!(
                "⚠️ [HOT_CACHE]: Refresh interval floored from {}s to {}s.",
                configured_refresh_seconds, effective_refresh_seconds
            );
        }

        Self {
            database_client,
            vault,
            refresh_interval: Duration::from_secs(effective_refresh_seconds),
            keys_snapshot: RwLock::new(None),
            stats_snapshot: RwLock::new(None),
            keys_refresh_gate: tokio::sync::Mutex::new(()),
            stats_refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval
    }

    /**
     * Secuencia disponible, nunca más rancia que el intervalo de refresh.
     * Un snapshot rancio o ausente dispara un refresh síncrono.
     */
    pub async fn available_credentials(&self) -> Result<Vec<CredentialRecord>, StoreError> {
        if let Some(records) = self.clone_fresh_keys() {
            return Ok(records);
        }
        self.refresh_available().await?;
        self.clone_fresh_keys()
            .ok_or_else(|| StoreError::MappingError("KEYS_SNAPSHOT_VOID_POST_REFRESH".into()))
    }

    /**
     * Estadísticas del día civil UTC en curso. Detecta el rollover de
     * fecha y reconstruye en la primera lectura del día nuevo.
     */
    pub async fn todays_statistics(&self) -> Result<HashMap<i64, DailyStatsRecord>, StoreError> {
        if let Some(statistics_map) = self.clone_fresh_stats() {
            return Ok(statistics_map);
        }
        self.refresh_stats().await?;
        self.clone_fresh_stats()
            .ok_or_else(|| StoreError::MappingError("STATS_SNAPSHOT_VOID_POST_REFRESH".into()))
    }

    fn clone_fresh_keys(&self) -> Option<Vec<CredentialRecord>> {
        let snapshot_guard = self.keys_snapshot.read().ok()?;
        snapshot_guard
            .as_ref()
            .filter(|snapshot| snapshot.refreshed_at.elapsed() < self.refresh_interval)
            .map(|snapshot| snapshot.records.clone())
    }

    fn clone_fresh_stats(&self) -> Option<HashMap<i64, DailyStatsRecord>> {
        let snapshot_guard = self.stats_snapshot.read().ok()?;
        snapshot_guard
            .as_ref()
            .filter(|snapshot| {
                snapshot.refreshed_at.elapsed() < self.refresh_interval
                    && snapshot.civil_date == utc_civil_date_today()
            })
            .map(|snapshot| snapshot.by_credential.clone())
    }

    /**
     * Escaneo completo del Ledger y permutación uniforme de la secuencia.
     * El gate garantiza un único escaneo bajo lectores concurrentes.
     */
    #[instrument(skip(self))]
    pub async fn refresh_available(&self) -> Result<(), StoreError> {
        let _reentrancy_shield = self.keys_refresh_gate.lock().await;

        // Doble chequeo: otro lector pudo completar el refresh mientras
        // esperábamos el gate.
        if self.clone_fresh_keys().is_some() {
            return Ok(());
        }

        let now_epoch = Utc::now().timestamp();
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(sql_registry::SELECT_AVAILABLE_CREDENTIALS, params![now_epoch])
            .await?;

        let mut available_records = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            available_records.push(hydrate_credential_row(&data_row, &self.vault)?);
        }

        available_records.shuffle(&mut rand::thread_rng());
        let record_count = available_records.len();

        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            *snapshot_guard = Some(KeysSnapshot {
                records: available_records,
                refreshed_at: Instant::now(),
            });
        }

        debug!("♻️ [HOT_CACHE]: Availability snapshot rebuilt ({} credentials).", record_count);
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn refresh_stats(&self) -> Result<(), StoreError> {
        let _reentrancy_shield = self.stats_refresh_gate.lock().await;

        if self.clone_fresh_stats().is_some() {
            return Ok(());
        }

        let civil_date = utc_civil_date_today();
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(sql_registry::SELECT_ALL_STATS_FOR_DATE, params![civil_date.clone()])
            .await?;

        let mut statistics_map = HashMap::new();
        while let Some(data_row) = query_results.next().await? {
            let record = DailyStatsRecord {
                credential_id: data_row.get::<i64>(0)?,
                civil_date: data_row.get(1)?,
                call_count: data_row.get::<i64>(2)? as u64,
                throttle_count: data_row.get::<i64>(3)? as u64,
                last_client_subnet: data_row.get::<Option<String>>(4)?,
            };
            statistics_map.insert(record.credential_id, record);
        }

        let entry_count = statistics_map.len();
        if let Ok(mut snapshot_guard) = self.stats_snapshot.write() {
            *snapshot_guard = Some(StatsSnapshot {
                by_credential: statistics_map,
                civil_date: civil_date.clone(),
                refreshed_at: Instant::now(),
            });
        }

        debug!("♻️ [HOT_CACHE]: Statistics snapshot rebuilt for {} ({} entries).", civil_date, entry_count);
        Ok(())
    }

    /// Diagnóstico para `/health` y monitoreo.
    #[must_use]
    pub fn cache_status(&self) -> CacheStatus {
        let (keys_cached, keys_age_seconds, key_count) = self
            .keys_snapshot
            .read()
            .ok()
            .and_then(|guard| {
                guard
                    .as_ref()
                    .map(|snapshot| (true, snapshot.refreshed_at.elapsed().as_secs(), snapshot.records.len()))
            })
            .unwrap_or((false, 0, 0));

        let (stats_cached, stats_age_seconds, stats_count) = self
            .stats_snapshot
            .read()
            .ok()
            .and_then(|guard| {
                guard
                    .as_ref()
                    .map(|snapshot| (true, snapshot.refreshed_at.elapsed().as_secs(), snapshot.by_credential.len()))
            })
            .unwrap_or((false, 0, 0));

        CacheStatus {
            keys_cached,
            keys_age_seconds,
            key_count,
            stats_cached,
            stats_age_seconds,
            stats_count,
        }
    }
}

impl StoreWriteObserver for HotCache {
    fn credential_created(&self, record: &CredentialRecord) {
        let now_epoch = Utc::now().timestamp();
        if record.is_blocked(now_epoch) {
            return;
        }
        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                if !snapshot.records.iter().any(|resident| resident.id == record.id) {
                    snapshot.records.push(record.clone());
                    info!("➕ [HOT_CACHE]: Credential {} joined the availability snapshot.", record.display_label);
                }
            }
        }
    }

    fn credential_blocked(&self, credential_id: i64, blocked_until_epoch: i64) {
        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                let before = snapshot.records.len();
                snapshot.records.retain(|resident| resident.id != credential_id);
                if snapshot.records.len() < before {
                    debug!(
                        "⛔ [HOT_CACHE]: Credential id {} evicted from snapshot (sealed until {}).",
                        credential_id, blocked_until_epoch
                    );
                }
            }
        }
    }

    fn credential_counters_changed(&self, credential_id: i64, auth_failures: u32, throttles: u32) {
        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                if let Some(resident) = snapshot
                    .records
                    .iter_mut()
                    .find(|resident| resident.id == credential_id)
                {
                    resident.consecutive_auth_failures = auth_failures;
                    resident.consecutive_throttles = throttles;
                }
            }
        }
    }

    fn credential_reset(&self, record: &CredentialRecord) {
        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                snapshot.records.retain(|resident| resident.id != record.id);
                snapshot.records.push(record.clone());
            }
        }
    }

    fn credential_deleted(&self, credential_id: i64) {
        if let Ok(mut snapshot_guard) = self.keys_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                snapshot.records.retain(|resident| resident.id != credential_id);
            }
        }
        if let Ok(mut snapshot_guard) = self.stats_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                snapshot.by_credential.remove(&credential_id);
            }
        }
    }

    fn call_recorded(&self, record: &DailyStatsRecord) {
        if let Ok(mut snapshot_guard) = self.stats_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                if snapshot.civil_date == record.civil_date {
                    snapshot.by_credential.insert(record.credential_id, record.clone());
                }
            }
        }
    }

    fn throttle_recorded(&self, record: &DailyStatsRecord) {
        if let Ok(mut snapshot_guard) = self.stats_snapshot.write() {
            if let Some(snapshot) = snapshot_guard.as_mut() {
                if snapshot.civil_date == record.civil_date {
                    snapshot.by_credential.insert(record.credential_id, record.clone());
                }
            }
        }
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/cache.rs]
