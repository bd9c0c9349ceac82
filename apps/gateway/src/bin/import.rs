// INICIO DEL ARCHIVO [apps/gateway/src/bin/import.rs]
//! =================================================================
//! APARATO: BULK IMPORT FORGE (V4.0 - POOL SEEDER)
//! CLASIFICACIÓN: INFRASTRUCTURE UTILITY (ESTRATO L3)
//! RESPONSABILIDAD: INGESTA MASIVA DE CREDENCIALES AL LEDGER
//! =================================================================

use commune_core_vault::{load_or_forge_master_key, CommuneVault};
use commune_domain_lifecycle::validator::validate_for_import;
use commune_gateway::config::{GatewayConfig, ENCRYPTION_KEY_ENV};
use commune_infra_db::{CredentialRepository, StoreClient, StoreError};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter("info,commune_infra_db=debug")
        .with_target(false)
        .init();

    info!("💠 [IMPORT_FORGE]: Initiating bulk credential hydration...");

    let import_file_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("COMMUNE_IMPORT_FILE").ok())
        .unwrap_or_else(|| {
            error!("❌ [FORGE_FAULT]: Usage: import <credentials-file> (one credential per line).");
            std::process::exit(2);
        });

    let configuration = GatewayConfig::load()?;

    let master_key_bytes = load_or_forge_master_key(
        ENCRYPTION_KEY_ENV,
        configuration.encryption_key.as_deref(),
        &configuration.master_key_file_path(),
    )?;
    let vault_engine = Arc::new(CommuneVault::new(master_key_bytes));

    let database_client = StoreClient::connect(&configuration.database.path).await?;
    let credential_repository = CredentialRepository::new(database_client, vault_engine);

    let raw_manifest = std::fs::read_to_string(&import_file_path)?;

    let mut imported_count: u64 = 0;
    let mut duplicate_count: u64 = 0;
    let mut invalid_count: u64 = 0;

    for manifest_line in raw_manifest.lines() {
        let candidate_material = manifest_line.trim();
        if candidate_material.is_empty() || candidate_material.starts_with('#') {
            continue;
        }

        if validate_for_import(candidate_material).is_err() {
            warn!("⚠️ [FORGE]: Candidate rejected (length out of 16-256 range).");
            invalid_count += 1;
            continue;
        }

        match credential_repository.create(candidate_material).await {
            Ok(record) => {
                info!("🔐 [FORGE]: Credential {} crystallized.", record.display_label);
                imported_count += 1;
            }
            Err(StoreError::DuplicateFingerprint) => {
                duplicate_count += 1;
            }
            Err(ingestion_fault) => {
                error!("❌ [FORGE_FAULT]: Ingestion collapsed: {}", ingestion_fault);
                return Err(ingestion_fault.into());
            }
        }
    }

    let final_pool_size = credential_repository.count().await?;
    if final_pool_size > configuration.database.max_keys {
        warn!(
            "⚠️ [FORGE]: Pool size {} exceeds configured cap {}; auto-enrollment will stay gated.",
            final_pool_size, configuration.database.max_keys
        );
    }

    info!(
        "✅ [IMPORT_COMPLETE]: {} imported, {} duplicates skipped, {} invalid. Pool size: {}.",
        imported_count, duplicate_count, invalid_count, final_pool_size
    );
    Ok(())
}
// FIN DEL ARCHIVO [apps/gateway/src/bin/import.rs]
