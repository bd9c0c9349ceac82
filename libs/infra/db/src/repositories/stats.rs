// INICIO DEL ARCHIVO [libs/infra/db/src/repositories/stats.rs]
/*!
 * =================================================================
 * APARATO: DAILY STATISTICS REPOSITORY (V6.0 - COMMUTATIVE LEDGER)
 * CLASIFICACIÓN: INFRASTRUCTURE ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: CONTADORES DIARIOS POR CREDENCIAL (UTC)
 *
 * VISION HIPER-HOLÍSTICA:
 * Los incrementos viajan como upserts `ON CONFLICT ... count + 1`:
 * conmutativos y sin updates perdidos bajo ráfagas concurrentes.
 * La fila nace de forma perezosa en el primer incremento del día.
 * =================================================================
 */

use crate::cache::StoreWriteObserver;
use crate::client::StoreClient;
use crate::errors::StoreError;
use crate::repositories::queries as sql_registry;
use chrono::{Duration as ChronoDuration, Utc};
use commune_domain_models::{utc_civil_date_today, DailyStatsRecord};
use libsql::{params, Row};
use std::sync::{Arc, RwLock};
use tracing::{debug, info, instrument};

/// Repositorio de autoridad única sobre el Ledger estadístico diario.
pub struct StatsRepository {
    database_client: StoreClient,
    write_observers: RwLock<Vec<Arc<dyn StoreWriteObserver>>>,
}

impl StatsRepository {
    #[must_use]
    pub fn new(database_client: StoreClient) -> Self {
        Self {
            database_client,
            write_observers: RwLock::new(Vec::new()),
        }
    }

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
     * Registra una llamada reenviada portando la credencial, creando la
     * fila del día si aún no existe.
     */
    #[instrument(skip(self, client_subnet))]
    pub async fn increment_call_count(
        &self,
        credential_id: i64,
        client_subnet: &str,
    ) -> Result<DailyStatsRecord, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let civil_date = utc_civil_date_today();

        let mut updated_rows = database_connection
            .query(
                sql_registry::UPSERT_CALL_COUNT,
                params![credential_id, civil_date, client_subnet.to_string()],
            )
            .await?;

        let record = hydrate_stats_row(
            &updated_rows
                .next()
                .await?
                .ok_or_else(|| StoreError::MappingError("CALL_UPSERT_RETURNING_VOID".into()))?,
        )?;

        for observer in self.observers() {
            observer.call_recorded(&record);
        }
        Ok(record)
    }

    /// Registra un estrangulamiento 429 observado portando la credencial.
    #[instrument(skip(self))]
    pub async fn increment_throttle_count(&self, credential_id: i64) -> Result<DailyStatsRecord, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let civil_date = utc_civil_date_today();

        let mut updated_rows = database_connection
            .query(sql_registry::UPSERT_THROTTLE_COUNT, params![credential_id, civil_date])
            .await?;

        let record = hydrate_stats_row(
            &updated_rows
                .next()
                .await?
                .ok_or_else(|| StoreError::MappingError("THROTTLE_UPSERT_RETURNING_VOID".into()))?,
        )?;

        for observer in self.observers() {
            observer.throttle_recorded(&record);
        }
        Ok(record)
    }

    pub async fn get_today(&self, credential_id: i64) -> Result<Option<DailyStatsRecord>, StoreError> {
        self.get_for_date(credential_id, &utc_civil_date_today()).await
    }

    pub async fn get_for_date(
        &self,
        credential_id: i64,
        civil_date: &str,
    ) -> Result<Option<DailyStatsRecord>, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let mut query_results = database_connection
            .query(
                sql_registry::SELECT_STATS_FOR_CREDENTIAL_DATE,
                params![credential_id, civil_date.to_string()],
            )
            .await?;

        match query_results.next().await? {
            Some(data_row) => Ok(Some(hydrate_stats_row(&data_row)?)),
            None => Ok(None),
        }
    }

    pub async fn get_all_for_today(&self) -> Result<Vec<DailyStatsRecord>, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let civil_date = utc_civil_date_today();

        let mut query_results = database_connection
            .query(sql_registry::SELECT_ALL_STATS_FOR_DATE, params![civil_date])
            .await?;

        let mut statistics_collection = Vec::new();
        while let Some(data_row) = query_results.next().await? {
            statistics_collection.push(hydrate_stats_row(&data_row)?);
        }
        Ok(statistics_collection)
    }

    /**
     * Purga por edad del Janitor: elimina filas cuya fecha civil es
     * anterior a la ventana de retención. Retorna el conteo purgado.
     */
    #[instrument(skip(self))]
    pub async fn delete_older_than(&self, retention_days: i64) -> Result<u64, StoreError> {
        let database_connection = self.database_client.get_connection()?;
        let retention_threshold = (Utc::now() - ChronoDuration::days(retention_days))
            .format("%Y-%m-%d")
            .to_string();

        let purged_rows = database_connection
            .execute(sql_registry::DELETE_STATS_OLDER_THAN, params![retention_threshold.clone()])
            .await?;

        if purged_rows > 0 {
            info!("🧹 [STATS_RETENTION]: Purged {} stale statistic rows (older than {}).",
                purged_rows, retention_threshold);
        } else {
            debug!("🧹 [STATS_RETENTION]: No statistic rows beyond the retention window.");
        }
        Ok(purged_rows)
    }
}

fn hydrate_stats_row(data_row: &Row) -> Result<DailyStatsRecord, StoreError> {
    Ok(DailyStatsRecord {
        credential_id: data_row.get::<i64>(0)?,
        civil_date: data_row.get(1)?,
        call_count: data_row.get::<i64>(2)? as u64,
        throttle_count: data_row.get::<i64>(3)? as u64,
        last_client_subnet: data_row.get::<Option<String>>(4)?,
    })
}
// FIN DEL ARCHIVO [libs/infra/db/src/repositories/stats.rs]
