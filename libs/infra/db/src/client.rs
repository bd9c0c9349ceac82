// INICIO DEL ARCHIVO [libs/infra/db/src/client.rs]
/*!
 * =================================================================
 * APARATO: LEDGER CONNECTION CLIENT (V6.2 - WAL HARDENED)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GESTIÓN DE ENLACES AL MOTOR libSQL Y DURABILIDAD
 *
 * VISION HIPER-HOLÍSTICA:
 * El proceso es el único escritor del Ledger. En modo archivo se
 * activa el journal WAL para que la durabilidad sobreviva reinicios;
 * en modo RAM (tests) el ancla de persistencia evita que SQLite
 * purgue el esquema compartido entre hilos.
 * =================================================================
 */

use crate::errors::StoreError;
use crate::schema::apply_commune_schema;
use libsql::{Builder, Connection, Database};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct StoreClient {
    internal_database_driver: Arc<Database>,
    /// Mantiene la base en RAM viva evitando que SQLite la purgue.
    _memory_persistence_anchor: Option<Arc<Connection>>,
}

impl StoreClient {
    pub async fn connect(database_path: &str) -> Result<Self, StoreError> {
        if database_path.is_empty() {
            return Err(StoreError::ConfigurationError("DATABASE_PATH_UNDEFINED".into()));
        }

        info!("🔌 [LEDGER]: Initiating link synchronization to [{}]", database_path);

        let is_memory = database_path.contains(":memory:") || database_path.contains("mode=memory");

        let database_driver = Builder::new_local(database_path)
            .build()
            .await
            .map_err(|fault| StoreError::ConnectionError(format!("DRIVER_IGNITION_FAILURE: {fault}")))?;

        let shared_driver = Arc::new(database_driver);
        let mut anchor = None;

        if is_memory {
            // En modo memoria el ancla se abre ANTES de cualquier otra
            // operación para que el esquema resida en el segmento compartido.
            let anchor_connection = shared_driver
                .connect()
                .map_err(|fault| StoreError::ConnectionError(format!("ANCHOR_FAULT: {fault}")))?;

            apply_commune_schema(&anchor_connection)
                .await
                .map_err(|fault| StoreError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {fault}")))?;

            anchor = Some(Arc::new(anchor_connection));
            info!("⚓ [LEDGER]: Memory strata solidified and anchored.");
        } else {
            let bootstrap_connection = shared_driver
                .connect()
                .map_err(|fault| StoreError::ConnectionError(format!("BOOTSTRAP_LINK_FAULT: {fault}")))?;

            // Durabilidad WAL: el journal sobrevive a terminaciones abruptas.
            bootstrap_connection
                .query("PRAGMA journal_mode=WAL", ())
                .await
                .map_err(|fault| StoreError::ConnectionError(format!("WAL_IGNITION_FAULT: {fault}")))?;

            bootstrap_connection
                .execute("PRAGMA foreign_keys=ON", ())
                .await
                .map_err(|fault| StoreError::ConnectionError(format!("FK_PRAGMA_FAULT: {fault}")))?;

            apply_commune_schema(&bootstrap_connection)
                .await
                .map_err(|fault| StoreError::ConnectionError(format!("SCHEMA_SYNC_FAULT: {fault}")))?;
        }

        Ok(Self {
            internal_database_driver: shared_driver,
            _memory_persistence_anchor: anchor,
        })
    }

    pub fn get_connection(&self) -> Result<Connection, StoreError> {
        self.internal_database_driver.connect().map_err(|fault| {
            error!("⚠️ [POOL_FAULT]: Connection allocation failed: {}", fault);
            StoreError::ConnectionError(fault.to_string())
        })
    }
}
// FIN DEL ARCHIVO [libs/infra/db/src/client.rs]
