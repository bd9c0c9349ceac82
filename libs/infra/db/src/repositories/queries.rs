// [libs/infra/db/src/repositories/queries.rs]
/*!
 * =================================================================
 * APARATO: SQL QUERY REGISTRY (V5.1 - SINGLE SOURCE OF TRUTH)
 * CLASIFICACIÓN: INFRASTRUCTURE LAYER (ESTRATO L3)
 * RESPONSABILIDAD: CATALOGACIÓN DE SENTENCIAS PARAMETRIZADAS
 *
 * # Logic:
 * Los contadores mutan mediante `UPDATE ... RETURNING` para que el
 * incremento y la lectura del nuevo valor sean una sola ráfaga atómica
 * bajo el escritor único de libSQL.
 * =================================================================
 */

/// Proyección nominal completa del registro de credencial.
pub const CREDENTIAL_PROJECTION: &str = "id, fingerprint, material_ciphertext, display_label, \
     blocked_until, consecutive_auth_failures, consecutive_throttles, \
     last_success_at, created_at, updated_at";

pub const INSERT_CREDENTIAL: &str = "\
    INSERT INTO credentials (fingerprint, material_ciphertext, display_label, created_at, updated_at) \
    VALUES (?1, ?2, ?3, ?4, ?4) \
    RETURNING id";

pub const SELECT_CREDENTIAL_BY_ID: &str = "\
    SELECT id, fingerprint, material_ciphertext, display_label, \
           blocked_until, consecutive_auth_failures, consecutive_throttles, \
           last_success_at, created_at, updated_at \
    FROM credentials WHERE id = ?1";

pub const SELECT_CREDENTIAL_BY_FINGERPRINT: &str = "\
    SELECT id, fingerprint, material_ciphertext, display_label, \
           blocked_until, consecutive_auth_failures, consecutive_throttles, \
           last_success_at, created_at, updated_at \
    FROM credentials WHERE fingerprint = ?1";

/// Una credencial está disponible cuando carece de deadline o éste ya expiró.
pub const SELECT_AVAILABLE_CREDENTIALS: &str = "\
    SELECT id, fingerprint, material_ciphertext, display_label, \
           blocked_until, consecutive_auth_failures, consecutive_throttles, \
           last_success_at, created_at, updated_at \
    FROM credentials \
    WHERE blocked_until IS NULL OR blocked_until <= ?1";

pub const COUNT_CREDENTIALS: &str = "SELECT COUNT(*) FROM credentials";

pub const SELECT_CREDENTIAL_ID_BY_FINGERPRINT: &str =
    "SELECT id FROM credentials WHERE fingerprint = ?1";

pub const SET_BLOCK_DEADLINE: &str =
    "UPDATE credentials SET blocked_until = ?2, updated_at = ?3 WHERE id = ?1";

pub const CLEAR_BLOCK_DEADLINE: &str =
    "UPDATE credentials SET blocked_until = NULL, updated_at = ?2 WHERE id = ?1";

pub const INCREMENT_AUTH_FAILURES: &str = "\
    UPDATE credentials \
    SET consecutive_auth_failures = consecutive_auth_failures + 1, updated_at = ?2 \
    WHERE id = ?1 \
    RETURNING consecutive_auth_failures, consecutive_throttles";

pub const INCREMENT_THROTTLES: &str = "\
    UPDATE credentials \
    SET consecutive_throttles = consecutive_throttles + 1, updated_at = ?2 \
    WHERE id = ?1 \
    RETURNING consecutive_auth_failures, consecutive_throttles";

/// Reset integral en una ráfaga: contadores a cero, cuarentena disuelta
/// y sello de último éxito.
pub const RESET_COUNTERS: &str = "\
    UPDATE credentials \
    SET consecutive_auth_failures = 0, consecutive_throttles = 0, \
        blocked_until = NULL, last_success_at = ?2, updated_at = ?2 \
    WHERE id = ?1 \
    RETURNING id, fingerprint, material_ciphertext, display_label, \
              blocked_until, consecutive_auth_failures, consecutive_throttles, \
              last_success_at, created_at, updated_at";

pub const DELETE_STATS_FOR_CREDENTIAL: &str =
    "DELETE FROM credential_stats_daily WHERE credential_id = ?1";

pub const DELETE_CREDENTIAL: &str = "DELETE FROM credentials WHERE id = ?1";

// --- ESTRATO ESTADÍSTICO (LEDGER DIARIO) ---

pub const UPSERT_CALL_COUNT: &str = "\
    INSERT INTO credential_stats_daily (credential_id, civil_date, call_count, throttle_count, last_client_subnet) \
    VALUES (?1, ?2, 1, 0, ?3) \
    ON CONFLICT(credential_id, civil_date) DO UPDATE SET \
        call_count = call_count + 1, \
        last_client_subnet = excluded.last_client_subnet \
    RETURNING credential_id, civil_date, call_count, throttle_count, last_client_subnet";

pub const UPSERT_THROTTLE_COUNT: &str = "\
    INSERT INTO credential_stats_daily (credential_id, civil_date, call_count, throttle_count) \
    VALUES (?1, ?2, 0, 1) \
    ON CONFLICT(credential_id, civil_date) DO UPDATE SET \
        throttle_count = throttle_count + 1 \
    RETURNING credential_id, civil_date, call_count, throttle_count, last_client_subnet";

pub const SELECT_STATS_FOR_CREDENTIAL_DATE: &str = "\
    SELECT credential_id, civil_date, call_count, throttle_count, last_client_subnet \
    FROM credential_stats_daily \
    WHERE credential_id = ?1 AND civil_date = ?2";

pub const SELECT_ALL_STATS_FOR_DATE: &str = "\
    SELECT credential_id, civil_date, call_count, throttle_count, last_client_subnet \
    FROM credential_stats_daily \
    WHERE civil_date = ?1";

pub const DELETE_STATS_OLDER_THAN: &str =
    "DELETE FROM credential_stats_daily WHERE civil_date < ?1";
