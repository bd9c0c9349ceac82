// [tests/mirror/libs/infra/db/hot_cache_synchrony.test.rs]
/**
 * =================================================================
 * APARATO: HOT CACHE SYNCHRONY TEST (V8.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DEL WRITE-THROUGH Y EL INVARIANTE
 *                  DE SELECCIÓN DEL SNAPSHOT
 * =================================================================
 */

use commune_core_vault::CommuneVault;
use commune_infra_db::{
    CredentialRepository, HotCache, StatsRepository, StoreClient, StoreWriteObserver,
};
use chrono::Utc;
use std::sync::Arc;

struct TestStrata {
    credentials: Arc<CredentialRepository>,
    stats: Arc<StatsRepository>,
    hot_cache: Arc<HotCache>,
}

async fn forge_wired_strata(memory_tag: &str) -> TestStrata {
    let database_client =
        StoreClient::connect(&format!("file:{memory_tag}?mode=memory&cache=shared"))
            .await
            .expect("Fallo en ignición del Ledger de pruebas");

    let vault = Arc::new(CommuneVault::new([4u8; 32]));
    let credentials = Arc::new(CredentialRepository::new(database_client.clone(), vault.clone()));
    let stats = Arc::new(StatsRepository::new(database_client.clone()));

    let hot_cache = Arc::new(HotCache::new(database_client, vault, 60));

    // Cableado pub/sub idéntico al composition root del gateway.
    let observer: Arc<dyn StoreWriteObserver> = hot_cache.clone();
    credentials.register_observer(observer.clone());
    stats.register_observer(observer);

    TestStrata { credentials, stats, hot_cache }
}

#[tokio::test]
async fn certify_snapshot_construction_and_status() {
    println!("\n♻️ [PROVING_GROUNDS]: Auditing hot cache synchrony V8.0...");

    let strata = forge_wired_strata("mem_cache_v8a").await;

    // Antes de la primera lectura: caché fría.
    assert!(!strata.hot_cache.cache_status().keys_cached);

    strata.credentials.create("sk-commune-cache-001-xyz").await.unwrap();
    strata.credentials.create("sk-commune-cache-002-xyz").await.unwrap();

    // La primera lectura dispara el refresh síncrono.
    let available = strata.hot_cache.available_credentials().await.unwrap();
    assert_eq!(available.len(), 2);

    let diagnostics = strata.hot_cache.cache_status();
    assert!(diagnostics.keys_cached);
    assert_eq!(diagnostics.key_count, 2);
    assert!(diagnostics.keys_age_seconds <= 2);

    println!("   ✅ [SUCCESS]: Snapshot built and status leveled.");
}

#[tokio::test]
async fn certify_eager_create_and_eager_block() {
    let strata = forge_wired_strata("mem_cache_v8b").await;

    let alpha = strata.credentials.create("sk-commune-cache-011-xyz").await.unwrap();
    strata.hot_cache.available_credentials().await.unwrap();

    // Creación posterior al snapshot: inserción eager, sin refresh.
    let beta = strata.credentials.create("sk-commune-cache-012-xyz").await.unwrap();
    let after_create = strata.hot_cache.available_credentials().await.unwrap();
    assert!(after_create.iter().any(|record| record.id == beta.id), "EAGER_CREATE_VIOLATION");

    // Cuarentena: remoción eager, jamás espera al intervalo.
    strata
        .credentials
        .set_block_deadline(alpha.id, Some(Utc::now().timestamp() + 3_600))
        .await
        .unwrap();
    let after_block = strata.hot_cache.available_credentials().await.unwrap();
    assert!(
        !after_block.iter().any(|record| record.id == alpha.id),
        "NO_BLOCKED_SELECTION_VIOLATION: sealed credential still in snapshot"
    );

    // El reset disuelve la cuarentena y reincorpora de forma eager.
    strata.credentials.reset_counters(alpha.id).await.unwrap();
    let after_reset = strata.hot_cache.available_credentials().await.unwrap();
    assert!(after_reset.iter().any(|record| record.id == alpha.id), "EAGER_RESET_VIOLATION");
}

#[tokio::test]
async fn certify_eager_delete_and_in_place_counters() {
    let strata = forge_wired_strata("mem_cache_v8c").await;

    let alpha = strata.credentials.create("sk-commune-cache-021-xyz").await.unwrap();
    let beta = strata.credentials.create("sk-commune-cache-022-xyz").await.unwrap();
    strata.hot_cache.available_credentials().await.unwrap();

    // Expulsión: remoción eager de la secuencia.
    strata.credentials.delete(beta.id).await.unwrap();
    let after_delete = strata.hot_cache.available_credentials().await.unwrap();
    assert!(!after_delete.iter().any(|record| record.id == beta.id), "EAGER_DELETE_VIOLATION");

    // Incremento de contadores sin cambio de disponibilidad: mutación in situ.
    strata.credentials.increment_auth_failures(alpha.id).await.unwrap();
    let after_increment = strata.hot_cache.available_credentials().await.unwrap();
    let mutated = after_increment
        .iter()
        .find(|record| record.id == alpha.id)
        .expect("residente ausente");
    assert_eq!(mutated.consecutive_auth_failures, 1, "IN_PLACE_MUTATION_VIOLATION");
}

#[tokio::test]
async fn certify_stats_snapshot_write_through() {
    let strata = forge_wired_strata("mem_cache_v8d").await;

    let alpha = strata.credentials.create("sk-commune-cache-031-xyz").await.unwrap();

    // Snapshot estadístico inicial: vacío pero construido para hoy.
    let initial_map = strata.hot_cache.todays_statistics().await.unwrap();
    assert!(initial_map.is_empty());

    // Write-through de llamada y estrangulamiento sin refresh intermedio.
    strata.stats.increment_call_count(alpha.id, "99.88.77.0/24").await.unwrap();
    strata.stats.increment_throttle_count(alpha.id).await.unwrap();

    let synced_map = strata.hot_cache.todays_statistics().await.unwrap();
    let entry = synced_map.get(&alpha.id).expect("entrada diaria ausente del snapshot");
    assert_eq!(entry.call_count, 1);
    assert_eq!(entry.throttle_count, 1);
    assert_eq!(entry.last_client_subnet.as_deref(), Some("99.88.77.0/24"));

    // La expulsión purga también el estrato estadístico del snapshot.
    strata.credentials.delete(alpha.id).await.unwrap();
    let purged_map = strata.hot_cache.todays_statistics().await.unwrap();
    assert!(!purged_map.contains_key(&alpha.id), "STATS_GHOST_DETECTED");
}

#[tokio::test]
async fn certify_snapshot_order_is_stable_between_reads() {
    let strata = forge_wired_strata("mem_cache_v8e").await;

    for index in 0..6 {
        strata
            .credentials
            .create(&format!("sk-commune-cache-04{index}-xyz"))
            .await
            .unwrap();
    }

    // El orden permutado es estable dentro de la vida del snapshot: es
    // la fuente de aleatoriedad del selector entre refreshes.
    let first_read: Vec<i64> = strata
        .hot_cache
        .available_credentials()
        .await
        .unwrap()
        .iter()
        .map(|record| record.id)
        .collect();
    let second_read: Vec<i64> = strata
        .hot_cache
        .available_credentials()
        .await
        .unwrap()
        .iter()
        .map(|record| record.id)
        .collect();

    assert_eq!(first_read, second_read, "ORDER_DRIFT_WITHIN_SNAPSHOT");
    assert_eq!(first_read.len(), 6);
}
