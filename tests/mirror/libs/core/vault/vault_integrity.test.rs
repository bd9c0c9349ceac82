// [tests/mirror/libs/core/vault/vault_integrity.test.rs]
/**
 * =================================================================
 * APARATO: VAULT INTEGRITY TEST (V4.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L1-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE CIFRADO, HUELLAS Y LLAVE MAESTRA
 * =================================================================
 */

use commune_core_vault::{
    derive_display_label, fingerprint_hex, load_or_forge_master_key, parse_master_key_hex,
    CommuneVault, VaultError,
};

const TEST_MASTER_KEY: [u8; 32] = [7u8; 32];

#[test]
fn certify_encrypt_decrypt_roundtrip() {
    println!("\n🔐 [PROVING_GROUNDS]: Auditing Vault roundtrip V4.0...");

    let vault = CommuneVault::new(TEST_MASTER_KEY);
    let raw_material = "sk-commune-alpha-0123456789abcdef";

    let sealed_envelope = vault.encrypt_material(raw_material).expect("Fallo en cifrado");

    // Sobre de tres segmentos: base64(iv):base64(tag):base64(ct)
    let segments: Vec<&str> = sealed_envelope.split(':').collect();
    assert_eq!(segments.len(), 3, "ENVELOPE_SHAPE_VIOLATION");

    let recovered = vault.decrypt_material(&sealed_envelope).expect("Fallo en descifrado");
    assert_eq!(recovered, raw_material, "L1_DATA_CORRUPTION: roundtrip mismatch");

    // IV aleatorio: dos cifrados del mismo material jamás comparten sobre.
    let second_envelope = vault.encrypt_material(raw_material).unwrap();
    assert_ne!(sealed_envelope, second_envelope, "IV_REUSE_DETECTED");

    println!("   ✅ [SUCCESS]: Envelope shape and roundtrip certified.");
}

#[test]
fn certify_wrong_master_key_is_rejected() {
    let vault_alpha = CommuneVault::new(TEST_MASTER_KEY);
    let vault_beta = CommuneVault::new([8u8; 32]);

    let sealed = vault_alpha.encrypt_material("sk-commune-beta-material-001").unwrap();

    match vault_beta.decrypt_material(&sealed) {
        Err(VaultError::DecryptionError) => {}
        other => panic!("INTEGRITY_COLLAPSE: expected DecryptionError, got {other:?}"),
    }
}

#[test]
fn certify_malformed_envelope_is_rejected() {
    let vault = CommuneVault::new(TEST_MASTER_KEY);

    assert!(matches!(
        vault.decrypt_material("solo-un-segmento"),
        Err(VaultError::MalformedEnvelope)
    ));
    assert!(matches!(
        vault.decrypt_material("a:b"),
        Err(VaultError::MalformedEnvelope)
    ));
}

#[test]
fn certify_fingerprint_stability() {
    // Vector conocido: SHA-256("abc")
    assert_eq!(
        fingerprint_hex("abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );

    // Estabilidad entre invocaciones (identidad del Ledger).
    let material = "sk-commune-stability-probe-42";
    assert_eq!(fingerprint_hex(material), fingerprint_hex(material));
    assert_ne!(fingerprint_hex(material), fingerprint_hex("sk-commune-stability-probe-43"));
}

#[test]
fn certify_display_label_derivation() {
    // <= 8 caracteres: first4..
    assert_eq!(derive_display_label("12345678"), "1234..");
    assert_eq!(derive_display_label("abc"), "abc..");

    // > 8 caracteres: first4..last4
    assert_eq!(derive_display_label("sk-test-credential-0001"), "sk-t..0001");
}

#[test]
fn certify_master_key_hex_parsing() {
    let valid_hex = "aa".repeat(32);
    let parsed = parse_master_key_hex(&valid_hex).expect("64 hex chars deben parsear");
    assert_eq!(parsed, [0xaau8; 32]);

    assert!(matches!(
        parse_master_key_hex("abcd"),
        Err(VaultError::KeyMaterialInvalid(_))
    ));
    assert!(matches!(
        parse_master_key_hex(&"zz".repeat(32)),
        Err(VaultError::KeyMaterialInvalid(_))
    ));
}

#[test]
fn certify_master_key_forge_and_rehydration() {
    println!("\n🔐 [PROVING_GROUNDS]: Auditing master key forge...");

    let staging_directory = tempfile::tempdir().expect("tempdir");
    let key_file_path = staging_directory.path().join("commune.db.key");

    // Sin entorno, sin config, sin archivo: se forja y persiste en 0600.
    let forged_key =
        load_or_forge_master_key("COMMUNE_TEST_KEY_VOID_A", None, &key_file_path).expect("forge");
    assert!(key_file_path.exists(), "KEY_FILE_NOT_PERSISTED");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&key_file_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600, "KEY_FILE_MODE_VIOLATION");
    }

    // Rehidratación: el archivo persistido reproduce la misma llave.
    let rehydrated_key =
        load_or_forge_master_key("COMMUNE_TEST_KEY_VOID_A", None, &key_file_path).expect("reload");
    assert_eq!(forged_key, rehydrated_key, "KEY_DRIFT_DETECTED");

    println!("   ✅ [SUCCESS]: Forge, 0600 mode and rehydration certified.");
}

#[test]
fn certify_master_key_precedence_config_over_file() {
    let staging_directory = tempfile::tempdir().expect("tempdir");
    let key_file_path = staging_directory.path().join("commune.db.key");

    std::fs::write(&key_file_path, "bb".repeat(32)).unwrap();

    // La configuración tiene precedencia sobre el archivo persistido.
    let configured_hex = "cc".repeat(32);
    let resolved = load_or_forge_master_key(
        "COMMUNE_TEST_KEY_VOID_B",
        Some(&configured_hex),
        &key_file_path,
    )
    .expect("config key");

    assert_eq!(resolved, [0xccu8; 32], "PRECEDENCE_VIOLATION: config must outrank key file");
}
