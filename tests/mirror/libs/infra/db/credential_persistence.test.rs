// [tests/mirror/libs/infra/db/credential_persistence.test.rs]
/**
 * =================================================================
 * APARATO: CREDENTIAL PERSISTENCE TEST (V7.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL CICLO PERSISTENTE DEL LEDGER
 * =================================================================
 */

use commune_core_vault::{fingerprint_hex, CommuneVault};
use commune_infra_db::{CredentialRepository, EnrollmentVerdict, StatsRepository, StoreClient, StoreError};
use chrono::Utc;
use std::sync::Arc;

async fn forge_repositories(memory_tag: &str) -> (Arc<CredentialRepository>, Arc<StatsRepository>) {
    let database_client =
        StoreClient::connect(&format!("file:{memory_tag}?mode=memory&cache=shared"))
            .await
            .expect("Fallo en ignición del Ledger de pruebas");

    let vault = Arc::new(CommuneVault::new([1u8; 32]));
    (
        Arc::new(CredentialRepository::new(database_client.clone(), vault)),
        Arc::new(StatsRepository::new(database_client)),
    )
}

#[tokio::test]
async fn certify_create_and_lookup_roundtrip() {
    println!("\n🔐 [PROVING_GROUNDS]: Auditing Ledger persistence V7.0...");

    let (credentials, _stats) = forge_repositories("mem_ledger_v7a").await;
    let raw_material = "sk-commune-ledger-alpha-001";

    let created = credentials.create(raw_material).await.expect("Fallo en create");
    assert!(created.id >= 1);
    assert_eq!(created.fingerprint, fingerprint_hex(raw_material));
    assert_eq!(created.display_label, "sk-c..-001");
    assert_eq!(created.consecutive_auth_failures, 0);

    // Recuperación por huella: el material regresa descifrado bit-perfecto.
    let by_fingerprint = credentials
        .find_by_fingerprint(&created.fingerprint)
        .await
        .unwrap()
        .expect("huella no resuelve");
    assert_eq!(by_fingerprint.material, raw_material, "L1_DATA_CORRUPTION");
    assert_eq!(by_fingerprint.id, created.id);

    let by_id = credentials.find_by_id(created.id).await.unwrap().expect("id no resuelve");
    assert_eq!(by_id.fingerprint, created.fingerprint);

    assert_eq!(credentials.count().await.unwrap(), 1);
    println!("   ✅ [SUCCESS]: Create/lookup parity certified.");
}

#[tokio::test]
async fn certify_duplicate_fingerprint_is_rejected() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7b").await;

    credentials.create("sk-commune-ledger-dup-001").await.unwrap();
    match credentials.create("sk-commune-ledger-dup-001").await {
        Err(StoreError::DuplicateFingerprint) => {}
        other => panic!("INTEGRITY_COLLAPSE: expected DuplicateFingerprint, got {other:?}"),
    }
    assert_eq!(credentials.count().await.unwrap(), 1);
}

#[tokio::test]
async fn certify_counter_increments_return_new_value() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7c").await;
    let created = credentials.create("sk-commune-ledger-ctr-001").await.unwrap();

    assert_eq!(credentials.increment_auth_failures(created.id).await.unwrap(), 1);
    assert_eq!(credentials.increment_auth_failures(created.id).await.unwrap(), 2);
    assert_eq!(credentials.increment_throttles(created.id).await.unwrap(), 1);

    let reloaded = credentials.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(reloaded.consecutive_auth_failures, 2);
    assert_eq!(reloaded.consecutive_throttles, 1);

    // Identidad inexistente: fallo nominal, jamás silencio.
    assert!(matches!(
        credentials.increment_auth_failures(99_999).await,
        Err(StoreError::CredentialNotFound)
    ));
}

#[tokio::test]
async fn certify_reset_counters_levels_everything() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7d").await;
    let created = credentials.create("sk-commune-ledger-rst-001").await.unwrap();

    credentials.increment_auth_failures(created.id).await.unwrap();
    credentials.increment_throttles(created.id).await.unwrap();
    credentials
        .set_block_deadline(created.id, Some(Utc::now().timestamp() + 600))
        .await
        .unwrap();

    let leveled = credentials.reset_counters(created.id).await.unwrap();
    assert_eq!(leveled.consecutive_auth_failures, 0);
    assert_eq!(leveled.consecutive_throttles, 0);
    assert!(leveled.blocked_until.is_none());
    assert!(leveled.last_success_at.is_some());
}

#[tokio::test]
async fn certify_availability_scan_re_evaluates_deadlines() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7e").await;
    let now_epoch = Utc::now().timestamp();

    let healthy = credentials.create("sk-commune-ledger-avl-001").await.unwrap();
    let sealed = credentials.create("sk-commune-ledger-avl-002").await.unwrap();
    let expired = credentials.create("sk-commune-ledger-avl-003").await.unwrap();

    // Cuarentena futura excluye; deadline ya vencido vuelve a incluir.
    credentials.set_block_deadline(sealed.id, Some(now_epoch + 3_600)).await.unwrap();
    credentials.set_block_deadline(expired.id, Some(now_epoch - 10)).await.unwrap();

    let available = credentials.find_all_available(now_epoch).await.unwrap();
    let available_ids: Vec<i64> = available.iter().map(|record| record.id).collect();

    assert!(available_ids.contains(&healthy.id));
    assert!(!available_ids.contains(&sealed.id), "SELECTION_VIOLATION: sealed leaked");
    assert!(available_ids.contains(&expired.id), "SELECTION_VIOLATION: expired deadline must re-admit");
}

#[tokio::test]
async fn certify_delete_cascades_into_daily_stats() {
    let (credentials, stats) = forge_repositories("mem_ledger_v7f").await;
    let created = credentials.create("sk-commune-ledger-del-001").await.unwrap();

    stats.increment_call_count(created.id, "10.1.2.0/24").await.unwrap();
    assert!(stats.get_today(created.id).await.unwrap().is_some());

    assert!(credentials.delete(created.id).await.unwrap());
    assert!(credentials.find_by_id(created.id).await.unwrap().is_none());
    assert!(
        stats.get_today(created.id).await.unwrap().is_none(),
        "CASCADE_VIOLATION: orphan daily stats survived expulsion"
    );

    // Expulsión idempotente: el segundo intento reporta ausencia.
    assert!(!credentials.delete(created.id).await.unwrap());
}

#[tokio::test]
async fn certify_delete_by_fingerprint() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7g").await;
    let raw_material = "sk-commune-ledger-fpd-001";
    credentials.create(raw_material).await.unwrap();

    assert!(credentials.delete_by_fingerprint(&fingerprint_hex(raw_material)).await.unwrap());
    assert!(!credentials.delete_by_fingerprint(&fingerprint_hex(raw_material)).await.unwrap());
}

#[tokio::test]
async fn certify_capacity_fused_enrollment_verdicts() {
    let (credentials, _stats) = forge_repositories("mem_ledger_v7h").await;

    // Cupo 1: la primera entra, la segunda es vetada, la repetida se reconoce.
    let first = credentials
        .create_if_below_capacity("sk-commune-ledger-cap-001", 1)
        .await
        .unwrap();
    assert!(matches!(first, EnrollmentVerdict::Enrolled(_)));

    let vetoed = credentials
        .create_if_below_capacity("sk-commune-ledger-cap-002", 1)
        .await
        .unwrap();
    assert!(matches!(vetoed, EnrollmentVerdict::PoolSaturated));

    let recognized = credentials
        .create_if_below_capacity("sk-commune-ledger-cap-001", 1)
        .await
        .unwrap();
    match recognized {
        EnrollmentVerdict::AlreadyEnrolled(record) => {
            assert_eq!(record.fingerprint, fingerprint_hex("sk-commune-ledger-cap-001"));
        }
        other => panic!("INTEGRITY_COLLAPSE: expected AlreadyEnrolled, got {other:?}"),
    }
}
