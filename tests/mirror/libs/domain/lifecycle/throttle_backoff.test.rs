// [tests/mirror/libs/domain/lifecycle/throttle_backoff.test.rs]
/**
 * =================================================================
 * APARATO: THROTTLE BACKOFF TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL BACKOFF 2^(n-1) Y SU LEDGER
 * =================================================================
 */

use commune_core_vault::CommuneVault;
use commune_domain_lifecycle::{BlockingPolicy, LifecycleManager};
use commune_domain_models::{LifecycleAction, SelectedCredential};
use commune_infra_db::{CredentialRepository, StatsRepository, StoreClient};
use chrono::Utc;
use std::sync::Arc;

async fn forge_test_strata(
    memory_tag: &str,
    throttle_delete_threshold: u32,
) -> (Arc<CredentialRepository>, Arc<StatsRepository>, LifecycleManager) {
    let database_client =
        StoreClient::connect(&format!("file:{memory_tag}?mode=memory&cache=shared"))
            .await
            .expect("Fallo en ignición del Ledger de pruebas");

    let vault = Arc::new(CommuneVault::new([3u8; 32]));
    let credential_repository =
        Arc::new(CredentialRepository::new(database_client.clone(), vault));
    let stats_repository = Arc::new(StatsRepository::new(database_client));

    let policy = BlockingPolicy {
        throttle_backoff_base_minutes: 1,
        throttle_delete_threshold,
        ..BlockingPolicy::default()
    };

    let manager = LifecycleManager::new(credential_repository.clone(), stats_repository.clone(), policy);
    (credential_repository, stats_repository, manager)
}

#[tokio::test]
async fn certify_backoff_monotonicity_base_then_double() {
    println!("\n⏳ [PROVING_GROUNDS]: Auditing exponential backoff V5.0...");

    let (credentials, stats, manager) = forge_test_strata("mem_backoff_v5a", 10).await;
    let resident = credentials.create("sk-commune-b1-0123456789").await.unwrap();
    let selected = SelectedCredential::Resident(resident.clone());

    // Primer 429: deadline ≈ now + B (B = 1 minuto), contador = 1.
    let first_verdict = manager.handle_response(&selected, 429).await.unwrap();
    assert_eq!(first_verdict.action, LifecycleAction::Blocked);

    let after_first = credentials.find_by_id(resident.id).await.unwrap().unwrap();
    assert_eq!(after_first.consecutive_throttles, 1);
    let first_deadline = after_first.blocked_until.expect("deadline ausente");
    let expected_first = Utc::now().timestamp() + 60;
    assert!((first_deadline - expected_first).abs() <= 2, "BACKOFF_DRIFT_N1");

    // El ledger diario registró el estrangulamiento.
    let daily = stats.get_today(resident.id).await.unwrap().expect("fila diaria ausente");
    assert_eq!(daily.throttle_count, 1);

    // Segundo 429 (el cliente aislado repite): deadline ≈ now + 2B.
    let second_verdict = manager.handle_response(&selected, 429).await.unwrap();
    assert_eq!(second_verdict.action, LifecycleAction::Blocked);

    let after_second = credentials.find_by_id(resident.id).await.unwrap().unwrap();
    assert_eq!(after_second.consecutive_throttles, 2);
    let second_deadline = after_second.blocked_until.unwrap();
    let expected_second = Utc::now().timestamp() + 120;
    assert!((second_deadline - expected_second).abs() <= 2, "BACKOFF_DRIFT_N2");

    assert_eq!(stats.get_today(resident.id).await.unwrap().unwrap().throttle_count, 2);

    println!("   ✅ [SUCCESS]: Backoff B then 2B certified within tolerance.");
}

#[tokio::test]
async fn certify_throttle_delete_threshold_is_config_driven() {
    // Umbral reducido a 3 para esta instancia: el valor jamás se asume.
    let (credentials, _stats, manager) = forge_test_strata("mem_backoff_v5b", 3).await;
    let resident = credentials.create("sk-commune-b2-0123456789").await.unwrap();
    let selected = SelectedCredential::Resident(resident.clone());

    manager.handle_response(&selected, 429).await.unwrap();
    manager.handle_response(&selected, 429).await.unwrap();
    assert!(credentials.find_by_id(resident.id).await.unwrap().is_some());

    let final_verdict = manager.handle_response(&selected, 429).await.unwrap();
    assert_eq!(final_verdict.action, LifecycleAction::Deleted);
    assert!(credentials.find_by_id(resident.id).await.unwrap().is_none());
}

#[tokio::test]
async fn certify_success_dissolves_throttle_streak() {
    let (credentials, _stats, manager) = forge_test_strata("mem_backoff_v5c", 10).await;
    let resident = credentials.create("sk-commune-b3-0123456789").await.unwrap();
    let selected = SelectedCredential::Resident(resident.clone());

    manager.handle_response(&selected, 429).await.unwrap();
    manager.handle_response(&selected, 429).await.unwrap();

    // Un 2xx restaura la salud: la siguiente racha 429 reinicia en B.
    manager.handle_response(&selected, 200).await.unwrap();

    let healed = credentials.find_by_id(resident.id).await.unwrap().unwrap();
    assert_eq!(healed.consecutive_throttles, 0);
    assert!(healed.blocked_until.is_none());

    manager.handle_response(&selected, 429).await.unwrap();
    let relapsed = credentials.find_by_id(resident.id).await.unwrap().unwrap();
    assert_eq!(relapsed.consecutive_throttles, 1, "STREAK_NOT_REARMED");

    let relapse_deadline = relapsed.blocked_until.unwrap();
    let expected_relapse = Utc::now().timestamp() + 60;
    assert!((relapse_deadline - expected_relapse).abs() <= 2, "BACKOFF_NOT_REARMED");
}
