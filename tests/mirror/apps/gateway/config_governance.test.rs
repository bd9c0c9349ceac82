// [tests/mirror/apps/gateway/config_governance.test.rs]
/**
 * =================================================================
 * APARATO: CONFIG GOVERNANCE TEST (V5.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L3-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE DEFAULTS Y RESOLUCIÓN DE PROVEEDOR
 * =================================================================
 */

use commune_domain_models::RuleKind;
use commune_gateway::config::{ConfigError, GatewayConfig};
use std::path::Path;

const FULL_DOCUMENT: &str = r#"
encryption_key = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef"

[server]
port = 8088
host = "127.0.0.1"
provider = "openai-mock"

[database]
path = "/var/lib/commune/commune.db"
max_keys = 500

[blocking]
presented_key_rate_limit_seconds = 2
auth_failure_block_minutes = 720
auth_failure_delete_threshold = 4
throttle_backoff_base_minutes = 3
throttle_delete_threshold = 15

[stats]
retention_days = 14
cleanup_interval_minutes = 30
auto_cleanup = false
cache_expiry_seconds = 120

[ssl]
enabled = true
cert_path = "/etc/commune/cert.pem"
key_path = "/etc/commune/key.pem"

[[providers]]
name = "openai-mock"
base_url = "https://api.openai-mock.example/v1"
auth_header = "Authorization"
timeout_ms = 30000

[[providers.validation]]
type = "body-json"
key = "model"
pattern = "^gpt-"

[[providers.cacheable_paths]]
pattern = "^/models"
ttl_seconds = 300

[[providers]]
name = "secondary"
base_url = "https://api.secondary.example"
"#;

#[test]
fn certify_full_document_hydration() {
    println!("\n📜 [PROVING_GROUNDS]: Auditing config hydration V5.0...");

    let configuration = GatewayConfig::parse_toml(FULL_DOCUMENT).expect("documento rechazado");

    assert_eq!(configuration.server.port, 8088);
    assert_eq!(configuration.server.host, "127.0.0.1");
    assert_eq!(configuration.database.max_keys, 500);
    assert_eq!(configuration.blocking.auth_failure_block_minutes, 720);
    assert_eq!(configuration.blocking.throttle_delete_threshold, 15);
    assert_eq!(configuration.stats.retention_days, 14);
    assert!(!configuration.stats.auto_cleanup);
    assert!(configuration.ssl.enabled);
    assert_eq!(
        configuration.encryption_key.as_deref(),
        Some("deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef")
    );

    let provider = configuration.resolve_provider().unwrap().expect("proveedor ausente");
    assert_eq!(provider.name, "openai-mock");
    assert_eq!(provider.timeout_ms, 30_000);
    assert_eq!(provider.validation.len(), 1);
    assert_eq!(provider.validation[0].kind, RuleKind::BodyJson);
    assert_eq!(provider.validation[0].key, "model");
    assert_eq!(provider.cacheable_paths.len(), 1);
    assert_eq!(provider.cacheable_paths[0].ttl_seconds, 300);

    println!("   ✅ [SUCCESS]: Full document hydrated bit-perfect.");
}

#[test]
fn certify_empty_document_falls_to_nominal_defaults() {
    let configuration = GatewayConfig::parse_toml("").expect("documento vacío rechazado");

    assert_eq!(configuration.server.port, 3000);
    assert_eq!(configuration.server.host, "0.0.0.0");
    assert_eq!(configuration.database.path, "commune.db");
    assert_eq!(configuration.database.max_keys, 200);
    assert_eq!(configuration.blocking.presented_key_rate_limit_seconds, 1);
    assert_eq!(configuration.blocking.auth_failure_block_minutes, 1440);
    assert_eq!(configuration.blocking.auth_failure_delete_threshold, 3);
    assert_eq!(configuration.blocking.throttle_backoff_base_minutes, 1);
    assert_eq!(configuration.blocking.throttle_delete_threshold, 10);
    assert_eq!(configuration.stats.retention_days, 30);
    assert_eq!(configuration.stats.cache_expiry_seconds, 60);
    assert!(configuration.stats.auto_cleanup);
    assert!(!configuration.ssl.enabled);
    assert!(configuration.encryption_key.is_none());
    assert!(configuration.providers.is_empty());

    // Sin proveedores: el pipeline responderá 404, no es fallo de config.
    assert!(configuration.resolve_provider().unwrap().is_none());
}

#[test]
fn certify_missing_file_boots_with_defaults() {
    let configuration =
        GatewayConfig::load_from_path(Path::new("/nonexistent/commune-void.toml")).unwrap();
    assert_eq!(configuration.server.port, 3000);
}

#[test]
fn certify_nominated_provider_must_exist() {
    let document = r#"
[server]
provider = "phantom"

[[providers]]
name = "real"
base_url = "https://api.real.example"
"#;

    let configuration = GatewayConfig::parse_toml(document).unwrap();
    match configuration.resolve_provider() {
        Err(ConfigError::ProviderUnresolved(name)) => assert_eq!(name, "phantom"),
        other => panic!("INTEGRITY_COLLAPSE: expected ProviderUnresolved, got {other:?}"),
    }
}

#[test]
fn certify_unnamed_selection_takes_first_provider() {
    let document = r#"
[[providers]]
name = "alpha"
base_url = "https://api.alpha.example"

[[providers]]
name = "beta"
base_url = "https://api.beta.example"
"#;

    let configuration = GatewayConfig::parse_toml(document).unwrap();
    let provider = configuration.resolve_provider().unwrap().unwrap();
    assert_eq!(provider.name, "alpha");
}

#[test]
fn certify_blocking_policy_projection() {
    let configuration = GatewayConfig::parse_toml(FULL_DOCUMENT).unwrap();
    let policy = configuration.blocking_policy();

    assert_eq!(policy.presented_key_rate_limit_seconds, 2);
    assert_eq!(policy.auth_failure_block_minutes, 720);
    assert_eq!(policy.auth_failure_delete_threshold, 4);
    assert_eq!(policy.throttle_backoff_base_minutes, 3);
    assert_eq!(policy.throttle_delete_threshold, 15);
    assert_eq!(policy.max_pool_size, 500);
}

#[test]
fn certify_master_key_file_lives_next_to_ledger() {
    let configuration = GatewayConfig::parse_toml(FULL_DOCUMENT).unwrap();
    assert_eq!(
        configuration.master_key_file_path(),
        std::path::PathBuf::from("/var/lib/commune/commune.db.key")
    );
}

#[test]
fn certify_malformed_document_is_rejected() {
    assert!(matches!(
        GatewayConfig::parse_toml("server = 'not-a-table"),
        Err(ConfigError::Malformed(_))
    ));
}
