// INICIO DEL ARCHIVO [libs/infra/db/src/repositories/credential.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL LEDGER REPOSITORY (V9.0 - WRITE-THROUGH)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN ATÓMICA DEL CICLO DE VIDA PERSISTENTE
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. ATOMIC COUNTERS: Incrementos mediante 'UPDATE...RETURNING' para
 *    que dos respuestas concurrentes contra la misma credencial
 *    serialicen bajo el escritor único de libSQL.
 * 2. FUSED ENROLLMENT: El chequeo de capacidad del pool y la inserción
 *    viajan en una sola transacción, sellando la puerta contra
 *    enrolamientos concurrentes que rebasen el cupo.
 * 3. WRITE-THROUGH: Cada mutación notifica a los observadores
 *    registrados (caché caliente) antes de retornar, garantizando
 *    happens-before frente a cualquier lectura posterior de snapshot.
 * =================================================================
 */

use crate::cache::StoreWriteObserver;
use crate::client::StoreClient;
use crate::errors::StoreError;
use crate::repositories::queries as sql_registry;
use chrono::Utc;
use commune_core_vault::{derive_display_label, fingerprint_hex, CommuneVault};
use commune_domain_models::CredentialRecord;
use libsql::{params, Row};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument, warn};

/// Veredicto del protocolo de auto-enrolamiento.
#[derive(Debug)]
pub enum EnrollmentVerdict {
    /// La credencial cruzó la puerta de capacidad y ahora reside en el pool.
    Enrolled(CredentialRecord),
    /// Otra ráfaga concurrente ya la había enrolado; se retorna la residente.
    AlreadyEnrolled(CredentialRecord),
    /// El pool está al cupo máximo; se sirve sin enrolar.
    PoolSaturated,
}

/// Repositorio de autoridad única sobre el Ledger de credenciales.
pub struct CredentialRepository {
    database_client: StoreClient,
    vault: Arc<CommuneVault>,
    write_observers: RwLock<Vec<Arc<dyn StoreWriteObserver>>>,
}

impl CredentialRepository {
    #[must_use]
    pub fn new(database_client: StoreClient, vault: Arc<CommuneVault>) -> Self {
        Self {
            database_client,
            vault,
            write_observers: RwLock::new(Vec::new()),
        }
    }

    /// Suscribe un observador de write-through (pub/sub: el Ledger no es
    /// dueño de la caché ni la caché del Ledger).
    pub fn register_observer(&self, observer: Arc<dyn StoreWriteObserver>) {
        if let Ok(mut observers_guard) = self.write_observers.write() {
            observers_guard.push(observer);
        }
    }

    fn observers(&self) -> Vec<Arc<dyn StoreWriteObserver>> {
        self.write_observers
            .read()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /**
     * Cristaliza una credencial nueva en el Ledger, cifrando el material.
     *
     * # Errors:
     * - `StoreError::DuplicateFingerprint`: Dos registros jamás comparten huella.
     */
    #[instrument(skip(self, raw_material))]
    pub async fn create(&self, raw_material: &str) -> Result<CredentialRecord, StoreError> {
        let fingerprint = fingerprint_hex(raw_material);
        let database_connection = self.database_client.get_connection()?;
        let enrollment_transaction = database_connection.transaction().await?;

        let mut existing_rows = enrollment_transaction
            .query(sql_registry::SELECT_CREDENTIAL_ID_BY_FINGERPRINT, params![fingerprint.clone()])
            .await?;
        if existing_rows.next().await?.is_some() {
            return Err(StoreError::DuplicateFingerprint);
        }

        let record = self
            .insert_within(&enrollment_transaction, raw_material, &fingerprint)
            .await?;
        enrollment_transaction.commit().await?;

        info!("🔐 [LEDGER_SYNC]: Credential {} crystallized (id {}).", record.display_label, record.id);
        for observer in self.observers() {
            observer.credential_created(&record);
        }
        Ok(record)
    }

    /**
     * Protocolo de auto-enrolamiento: chequeo de cupo fusionado con la
     * inserción bajo una transacción única.
     *
     * Dos respuestas 2xx concurrentes que observen pool = cupo - 1 jamás
     * enrolan ambas: el escritor único serializa las transacciones.
     */
    #[instrument(skip(self, raw_material))]
    pub async fn create_if_below_capacity(
        &self,
        raw_material: &str,
        max_pool_size: u64,
    ) -> Result<EnrollmentVerdict, StoreError> {
        let fingerprint = fingerprint_hex(raw_material);
        let database_connection = self.database_client.get_connection()?;
        let enrollment_transaction = database_connection.transaction().await?;

        let mut existing_rows = enrollment_transaction
            .query(sql_registry::SELECT_CREDENTIAL_BY_FINGERPRINT, params![fingerprint.clone()])
            .await?;
        if let Some(existing_row) = existing_rows.next().await? {
            let resident = hydrate_credential_row(&existing_row, &self.vault)?;
            return Ok(EnrollmentVerdict::AlreadyEnrolled(resident));
        }

        let mut count_rows = enrollment_transaction
            .query(sql_registry::COUNT_CREDENTIALS, ())
            .await?;
        let current_pool_size = count_rows
            .next()
            .await?
            .ok_or_else(|| StoreError::MappingError("COUNT_PROJECTION_VOID".into()))?
            .get::<i64>(0)? as u64;

        if current_pool_size >= max_pool_size {
            warn!("⚠️ [POOL_GATE]: Commune at capacity ({}/{}). Enrollment vetoed.", current_pool_size, max_pool_size);
            return Ok(EnrollmentVerdict::PoolSaturated);
        }

        let record = self
            .insert_within(&enrollment_transaction, raw_material, &fingerprint)
            .await?;
        enrollment_transaction.commit().await?;

        info!("🤝 [POOL_GATE]: Credential {} enrolled into the commune ({}/{}).",
            record.display_label, current_pool_size + 1, max_pool_size);
        for observer in self.observers() {
            observer.credential_created(&record);
        }
        Ok(EnrollmentVerdict::Enrolled(record))
    }

    async fn insert_within(
        &self,
        transaction: &libsql::Transaction,
        raw_material: &str,
        fingerprint: &str,
    ) -> Result<CredentialRecord, StoreError> {
        let now_epoch = Utc::now().timestamp();
        let material_ciphertext = self.vault.encrypt_material(raw_material)?;
        let display_label = derive_display_label(raw_material);

        let mut inserted_rows = transaction
            .query(
                sql_registry::INSERT_CREDENTIAL,
                params![
                    fingerprint.to_string(),
                    material_ciphertext,
                    display_label.clone(),
                    now_epoch
                ],
            )
            .await?;

        let assigned_identifier = inserted_rows
            .next()
            .await?
            .ok_or_else(|| StoreError::MappingError("INSERT_RETURNING_VOID".into()))?
            .get::<i64>(0)?;

        Ok(CredentialRecord {
            id: assigned_identifier,
            fingerprint: fingerprint.to_string(),
            material: raw_material.to_string(),
            display_label,
            blocked_until: None,
            consecutive_auth_failures: 0,
            consecutive_throttles: 0,
            last_success_at: None,
            created_at: now_epoch,
            updated_at: now_epoch,
        })
    }

    pub async fn find_by_id(&self, credential_id: i64) -> Result<Option<CredentialRecord>, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(sql_registry::SELECT_CREDENTIAL_BY_ID, params![credential_id])
            .await?;

        match query_results.next().await? {
            Some(data_row) => Ok(Some(hydrate_credential_row(&data_row, &self.vault)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<Option<CredentialRecord>, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(sql_registry::SELECT_CREDENTIAL_BY_FINGERPRINT, params![fingerprint.to_string()])
            .await?;

        match query_results.next().await? {
            Some(data_row) => Ok(Some(hydrate_credential_row(&data_row, &self.vault)?)),
            None => Ok(None),
        }
    }

    /// Credenciales cuyo deadline está ausente o ya expiró frente a `now`.
    pub async fn find_all_available(&self, now_epoch_seconds: i64) -> Result<Vec<CredentialRecord>, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(sql_registry::SELECT_AVAILABLE_CREDENTIALS, params![now_epoch_seconds])
            .await?;

        let mut available_collection = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            available_collection.push(hydrate_credential_row(&data_row, &self.vault)?);
        }
        Ok(available_collection)
    }

    pub async fn count(&self) -> Result<u64, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let mut count_rows = database_connection.query(sql_registry::COUNT_CREDENTIALS, ()).await?;
        let total = count_rows
            .next()
            .await?
            .ok_or_else(|| StoreError::MappingError("COUNT_PROJECTION_VOID".into()))?
            .get::<i64>(0)?;
        Ok(total as u64)
    }

    /**
     * Sella o disuelve la cuarentena de una credencial.
     *
     * El sellado notifica remoción eager del snapshot; la disolución
     * reincorpora el registro re-leído.
     */
    #[instrument(skip(self))]
    pub async fn set_block_deadline(
        &self,
        credential_id: i64,
        deadline_epoch_seconds: Option<i64>,
    ) -> Result<(), StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let now_epoch = Utc::now().timestamp();

        let affected_rows = match deadline_epoch_seconds {
            Some(deadline) => {
                database_connection
                    .execute(sql_registry::SET_BLOCK_DEADLINE, params![credential_id, deadline, now_epoch])
                    .await?
            }
            None => {
                database_connection
                    .execute(sql_registry::CLEAR_BLOCK_DEADLINE, params![credential_id, now_epoch])
                    .await?
            }
        };

        if affected_rows == 0 {
            return Err(StoreError::CredentialNotFound);
        }

        match deadline_epoch_seconds {
            Some(deadline) => {
                debug!("⛔ [QUARANTINE]: Credential id {} sealed until epoch {}.", credential_id, deadline);
                for observer in self.observers() {
                    observer.credential_blocked(credential_id, deadline);
                }
            }
            None => {
                if let Some(record) = self.find_by_id(credential_id).await? {
                    for observer in self.observers() {
                        observer.credential_reset(&record);
                    }
                }
            }
        }
        Ok(())
    }

    /// Incrementa el contador de fallos de autenticación y retorna el nuevo valor.
    pub async fn increment_auth_failures(&self, credential_id: i64) -> Result<u32, StoreError> {
        self.increment_counter(credential_id, sql_registry::INCREMENT_AUTH_FAILURES, 0).await
    }

    /// Incrementa el contador de estrangulamientos y retorna el nuevo valor.
    pub async fn increment_throttles(&self, credential_id: i64) -> Result<u32, StoreError> {
        self.increment_counter(credential_id, sql_registry::INCREMENT_THROTTLES, 1).await
    }

    async fn increment_counter(
        &self,
        credential_id: i64,
        increment_statement: &str,
        returned_index: i32,
    ) -> Result<u32, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let now_epoch = Utc::now().timestamp();

        let mut updated_rows = database_connection
            .query(increment_statement, params![credential_id, now_epoch])
            .await?;

        let counters_row = updated_rows
            .next()
            .await?
            .ok_or(StoreError::CredentialNotFound)?;

        let auth_failures = counters_row.get::<i64>(0)? as u32;
        let throttles = counters_row.get::<i64>(1)? as u32;

        for observer in self.observers() {
            observer.credential_counters_changed(credential_id, auth_failures, throttles);
        }

        Ok(if returned_index == 0 { auth_failures } else { throttles })
    }

    /**
     * Reset integral tras un 2xx: contadores a cero, cuarentena disuelta,
     * sello de último éxito. Retorna el registro resultante.
     */
    #[instrument(skip(self))]
    pub async fn reset_counters(&self, credential_id: i64) -> Result<CredentialRecord, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let now_epoch = Utc::now().timestamp();

        let mut updated_rows = database_connection
            .query(sql_registry::RESET_COUNTERS, params![credential_id, now_epoch])
            .await?;

        let record_row = updated_rows
            .next()
            .await?
            .ok_or(StoreError::CredentialNotFound)?;
        let record = hydrate_credential_row(&record_row, &self.vault)?;

        debug!("✅ [LIFECYCLE]: Counters leveled for {}.", record.display_label);
        for observer in self.observers() {
            observer.credential_reset(&record);
        }
        Ok(record)
    }

    /**
     * Expulsión definitiva: purga transaccional del rastro estadístico
     * y del registro. La cascada declarada en el esquema cubre motores
     * con foreign_keys activo; la purga explícita lo garantiza siempre.
     */
    #[instrument(skip(self))]
    pub async fn delete(&self, credential_id: i64) -> Result<bool, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let purge_transaction = database_connection.transaction().await?;

        purge_transaction
            .execute(sql_registry::DELETE_STATS_FOR_CREDENTIAL, params![credential_id])
            .await?;
        let affected_rows = purge_transaction
            .execute(sql_registry::DELETE_CREDENTIAL, params![credential_id])
            .await?;
        purge_transaction.commit().await?;

        if affected_rows > 0 {
            info!("🗑️ [LEDGER_PURGE]: Credential id {} expelled from the commune.", credential_id);
            for observer in self.observers() {
                observer.credential_deleted(credential_id);
            }
        }
        Ok(affected_rows > 0)
    }

    pub async fn delete_by_fingerprint(&self, fingerprint: &str) -> Result<bool, StoreError> {
        match self.find_by_fingerprint(fingerprint).await? {
            Some(record) => self.delete(record.id).await,
            None => Ok(false),
        }
    }
}

/// Hidrata una fila del Ledger al contrato de dominio, descifrando el
/// material. Compartido con el escáner de la caché caliente.
pub(crate) fn hydrate_credential_row(
    data_row: &Row,
    vault: &CommuneVault,
) -> Result<CredentialRecord, StoreError> {
    let material_ciphertext: String = data_row.get(2)?;
    let decrypted_material = vault.decrypt_material(&material_ciphertext)?;

    Ok(CredentialRecord {
        id: data_row.get::<i64>(0)?,
        fingerprint: data_row.get(1)?,
        material: decrypted_material,
        display_label: data_row.get(3)?,
        blocked_until: data_row.get::<Option<i64>>(4)?,
        consecutive_auth_failures: data_row.get::<i64>(5)? as u32,
        consecutive_throttles: data_row.get::<i64>(6)? as u32,
        last_success_at: data_row.get::<Option<i64>>(7)?,
        created_at: data_row.get::<i64>(8)?,
        updated_at: data_row.get::<i64>(9)?,
    })
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/credential.rs]
