// [libs/infra/db/src/schema.rs]
/**
 * =================================================================
 * APARATO: COMMUNE DATABASE SCHEMA (V8.0 - LEDGER STRATA)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: GOBERNANZA ESTRUCTURAL E IDEMPOTENCIA TOTAL
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. CREDENTIAL LEDGER: Huella única, material cifrado y contadores
 *    consecutivos del ciclo de vida.
 * 2. DAILY STATS: Contadores por (credencial, fecha civil UTC) con
 *    cascada declarada hacia el Ledger.
 * 3. IDEMPOTENCIA: Re-ejecutable en caliente en cada ignición.
 * =================================================================
 */

use anyhow::{Context, Result};
use libsql::Connection;
use tracing::{debug, info, instrument};

/**
 * ESTRATO 1: SOLIDIFICACIÓN (Génesis de Tablas)
 */
const TACTICAL_TABLES: &[(&str, &str)] = &[
    ("TABLE_CREDENTIALS", r#"
        CREATE TABLE IF NOT EXISTS credentials (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            fingerprint TEXT NOT NULL UNIQUE,
            material_ciphertext TEXT NOT NULL,
            display_label TEXT NOT NULL,
            blocked_until INTEGER,
            consecutive_auth_failures INTEGER NOT NULL DEFAULT 0,
            consecutive_throttles INTEGER NOT NULL DEFAULT 0,
            last_success_at INTEGER,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );
    "#),
    ("TABLE_CREDENTIAL_STATS_DAILY", r#"
        CREATE TABLE IF NOT EXISTS credential_stats_daily (
            credential_id INTEGER NOT NULL REFERENCES credentials(id) ON DELETE CASCADE,
            civil_date TEXT NOT NULL,
            call_count INTEGER NOT NULL DEFAULT 0,
            throttle_count INTEGER NOT NULL DEFAULT 0,
            last_client_subnet TEXT,
            PRIMARY KEY (credential_id, civil_date)
        );
    "#),
];

/**
 * ESTRATO 2: ENDURECIMIENTO (Índices de Aceleración)
 */
const ACCELERATION_INDEXES: &[(&str, &str)] = &[
    ("IDX_CREDENTIALS_AVAILABILITY", "CREATE INDEX IF NOT EXISTS idx_credentials_blocked ON credentials(blocked_until);"),
    ("IDX_STATS_CIVIL_DATE", "CREATE INDEX IF NOT EXISTS idx_stats_civil_date ON credential_stats_daily(civil_date);"),
];

/**
 * Ejecuta la secuencia maestra de sincronización del esquema estructural.
 *
 * # Errors:
 * Retorna error si alguna tabla base falla en solidificarse, indicando
 * un colapso en el enlace con el motor libSQL.
 */
#[instrument(skip(database_connection))]
pub async fn apply_commune_schema(database_connection: &Connection) -> Result<()> {
    info!("🏗️ [SCHEMA_ENGINE]: Initiating structural synchronization V8.0...");

    solidify_base_strata(database_connection).await?;
    harden_access_layer(database_connection).await?;

    info!("✅ [SCHEMA_ENGINE]: Commune Ledger V8.0 level and certified.");
    Ok(())
}

async fn solidify_base_strata(db: &Connection) -> Result<()> {
    for (identifier, sql) in TACTICAL_TABLES {
        debug!("  ↳ Solidifying: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_SOLIDIFICATION_FAULT: {identifier}"))?;
    }
    Ok(())
}

async fn harden_access_layer(db: &Connection) -> Result<()> {
    for (identifier, sql) in ACCELERATION_INDEXES {
        debug!("  ↳ Hardening: {}", identifier);
        db.execute(*sql, ())
            .await
            .with_context(|| format!("CRITICAL_HARDENING_FAULT: {identifier}"))?;
    }
    Ok(())
}
