// [tests/mirror/libs/domain/lifecycle/enrollment_gate.test.rs]
/**
 * =================================================================
 * APARATO: ENROLLMENT GATE TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA PUERTA DE CAPACIDAD DEL POOL
 * =================================================================
 */

use commune_core_vault::{derive_display_label, fingerprint_hex, CommuneVault};
use commune_domain_lifecycle::{BlockingPolicy, LifecycleManager};
use commune_domain_models::{LifecycleAction, SelectedCredential, TransientCredential};
use commune_infra_db::{CredentialRepository, StatsRepository, StoreClient};
use futures::future::join_all;
use std::sync::Arc;

async fn forge_test_strata(
    memory_tag: &str,
    max_pool_size: u64,
) -> (Arc<CredentialRepository>, Arc<LifecycleManager>) {
    let database_client =
        StoreClient::connect(&format!("file:{memory_tag}?mode=memory&cache=shared"))
            .await
            .expect("Fallo en ignición del Ledger de pruebas");

    let vault = Arc::new(CommuneVault::new([5u8; 32]));
    let credential_repository =
        Arc::new(CredentialRepository::new(database_client.clone(), vault));
    let stats_repository = Arc::new(StatsRepository::new(database_client));

    let policy = BlockingPolicy { max_pool_size, ..BlockingPolicy::default() };
    let manager = Arc::new(LifecycleManager::new(
        credential_repository.clone(),
        stats_repository,
        policy,
    ));
    (credential_repository, manager)
}

fn forge_transient(raw_material: &str) -> SelectedCredential {
    SelectedCredential::Transient(TransientCredential {
        fingerprint: fingerprint_hex(raw_material),
        material: raw_material.to_string(),
        display_label: derive_display_label(raw_material),
    })
}

#[tokio::test]
async fn certify_enrollment_stops_exactly_at_capacity() {
    println!("\n🤝 [PROVING_GROUNDS]: Auditing pool capacity gate V5.0...");

    let (credentials, manager) = forge_test_strata("mem_gate_v5a", 2).await;

    // Dos credenciales cruzan la puerta.
    for index in 0..2 {
        let verdict = manager
            .handle_response(&forge_transient(&format!("sk-commune-gate-{index:04}-xyz")), 200)
            .await
            .unwrap();
        assert_eq!(verdict.action, LifecycleAction::Success);
    }

    // La tercera se sirve igual, pero sin enrolarse.
    let saturated_verdict = manager
        .handle_response(&forge_transient("sk-commune-gate-9999-xyz"), 200)
        .await
        .unwrap();
    assert_eq!(saturated_verdict.action, LifecycleAction::Proxied);

    assert_eq!(credentials.count().await.unwrap(), 2, "CAPACITY_BREACH");
    println!("   ✅ [SUCCESS]: Pool sealed at cap = 2.");
}

#[tokio::test]
async fn certify_concurrent_enrollment_respects_cap() {
    // Propiedad: P + M candidatas con cupo K => tamaño final min(P + M, K).
    let (credentials, manager) = forge_test_strata("mem_gate_v5b", 5).await;

    let enrollment_bursts = (0..8).map(|index| {
        let manager = manager.clone();
        async move {
            manager
                .handle_response(&forge_transient(&format!("sk-commune-burst-{index:04}")), 200)
                .await
                .unwrap()
        }
    });

    let verdicts = join_all(enrollment_bursts).await;

    let enrolled_count = verdicts
        .iter()
        .filter(|verdict| verdict.action == LifecycleAction::Success)
        .count();
    let saturated_count = verdicts
        .iter()
        .filter(|verdict| verdict.action == LifecycleAction::Proxied)
        .count();

    assert_eq!(enrolled_count, 5, "GATE_DRIFT: exactly K enrollments expected");
    assert_eq!(saturated_count, 3);
    assert_eq!(credentials.count().await.unwrap(), 5, "CAPACITY_BREACH");
}

#[tokio::test]
async fn certify_duplicate_material_enrolls_once() {
    let (credentials, manager) = forge_test_strata("mem_gate_v5c", 10).await;

    let shared_material = "sk-commune-shared-material-77";

    // Dos ráfagas del mismo material: ambas exitosas, un solo registro.
    let first = manager.handle_response(&forge_transient(shared_material), 200).await.unwrap();
    let second = manager.handle_response(&forge_transient(shared_material), 200).await.unwrap();

    assert_eq!(first.action, LifecycleAction::Success);
    assert_eq!(second.action, LifecycleAction::Success);
    assert_eq!(credentials.count().await.unwrap(), 1, "FINGERPRINT_DUPLICATION");
}
