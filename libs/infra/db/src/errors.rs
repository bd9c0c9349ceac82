// [libs/infra/db/src/errors.rs]
/*!
 * =================================================================
 * APARATO: PERSISTENCE ERROR CATALOG (V3.1 - COMMUNE)
 * CLASIFICACIÓN: INFRASTRUCTURE CORE (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN SEMÁNTICA DE FALLOS DE PERSISTENCIA
 * =================================================================
 */

use commune_core_vault::VaultError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Error de enlace físico con el motor libSQL.
    #[error("[L3_DB_NET_FAULT]: LEDGER_UPLINK_SEVERED -> {0}")]
    ConnectionError(String),

    /// Fallo en la configuración del entorno (rutas vacías o malformadas).
    #[error("[L3_DB_CONFIG_FAULT]: STRATEGIC_ENV_VOID -> {0}")]
    ConfigurationError(String),

    /// Error de sintaxis o ejecución devuelto por el motor libSQL.
    #[error("[L3_DB_QUERY_FAULT]: SQL_QUERY_REJECTED -> {0}")]
    QueryError(#[from] libsql::Error),

    /// Fallo en la transformación de tipos entre SQLite y el Dominio.
    #[error("[L3_DB_MAPPING_FAULT]: DATA_MAPPING_VIOLATION -> {0}")]
    MappingError(String),

    // --- ESTRATO DE GOBERNANZA DEL POOL ---

    /// Dos registros jamás comparten huella: el fingerprint ya existe.
    #[error("[L3_POOL_FAULT]: FINGERPRINT_ALREADY_ENROLLED")]
    DuplicateFingerprint,

    /// La credencial solicitada no reside en el Ledger.
    #[error("[L3_POOL_FAULT]: CREDENTIAL_NOT_FOUND")]
    CredentialNotFound,

    // --- ESTRATO CRIPTOGRÁFICO (L1) ---

    /// Fallo de la bóveda al cifrar o descifrar material.
    #[error("[L3_DB_CRYPTO_FAULT]: {0}")]
    CryptoFault(#[from] VaultError),
}
