// INICIO DEL ARCHIVO [libs/core/vault/src/lib.rs]
/*!
 * =================================================================
 * APARATO: CRYPTOGRAPHIC VAULT ENGINE (COMMUNE EDITION V4.2)
 * CLASIFICACIÓN: CORE SECURITY (ESTRATO L1)
 * RESPONSABILIDAD: CIFRADO EN REPOSO AES-256-GCM Y HUELLAS SHA-256
 *
 * VISION HIPER-HOLÍSTICA:
 * Implementa la bóveda simétrica del pool de credenciales. El material
 * crudo jamás toca el disco: se cristaliza como
 * `base64(iv):base64(tag):base64(ciphertext)` bajo una llave maestra
 * de 32 bytes leída del entorno, de la configuración o forjada y
 * persistida en un archivo modo 0600.
 * =================================================================
 */

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng as AeadOsRng},
    AeadCore, Aes256Gcm, Key, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Longitud del tag de autenticación GCM en bytes.
const GCM_TAG_LENGTH_BYTES: usize = 16;
/// Longitud de la llave maestra AES-256 en bytes.
const MASTER_KEY_LENGTH_BYTES: usize = 32;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("[L1_VAULT_FAULT]: BASE64_DECODE_FAULT -> {0}")]
    EncodingError(#[from] base64::DecodeError),

    #[error("[L1_VAULT_FAULT]: ENVELOPE_MALFORMED -> expected iv:tag:ciphertext")]
    MalformedEnvelope,

    #[error("[L1_VAULT_FAULT]: ENCRYPTION_MALFUNCTION")]
    EncryptionError,

    #[error("[L1_VAULT_FAULT]: DECRYPTION_MALFUNCTION -> integrity compromised or wrong master key")]
    DecryptionError,

    #[error("[L1_VAULT_FAULT]: MASTER_KEY_INVALID -> {0}")]
    KeyMaterialInvalid(String),

    #[error("[L1_VAULT_FAULT]: KEY_FILE_IO_FAULT -> {0}")]
    KeyFileFault(#[from] std::io::Error),
}

/// Bóveda simétrica del Commune. Una instancia por proceso, compartida
/// entre el Ledger y la caché caliente.
pub struct CommuneVault {
    master_key_bytes: [u8; MASTER_KEY_LENGTH_BYTES],
}

impl CommuneVault {
    #[must_use]
    pub fn new(master_key_bytes: [u8; MASTER_KEY_LENGTH_BYTES]) -> Self {
        Self { master_key_bytes }
    }

    /**
     * Cristaliza material crudo en un sobre `base64(iv):base64(tag):base64(ct)`.
     *
     * El IV de 12 bytes se forja con el CSPRNG del sistema en cada llamada;
     * dos cifrados del mismo material nunca comparten sobre.
     */
    pub fn encrypt_material(&self, raw_material: &str) -> Result<String, VaultError> {
        let cipher_engine = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.master_key_bytes));
        let initialization_vector = Aes256Gcm::generate_nonce(&mut AeadOsRng);

        // La salida del AEAD llega como ciphertext || tag; el sobre los separa.
        let mut sealed_payload = cipher_engine
            .encrypt(&initialization_vector, raw_material.as_bytes())
            .map_err(|_| VaultError::EncryptionError)?;

        if sealed_payload.len() < GCM_TAG_LENGTH_BYTES {
            return Err(VaultError::EncryptionError);
        }
        let authentication_tag = sealed_payload.split_off(sealed_payload.len() - GCM_TAG_LENGTH_BYTES);

        Ok(format!(
            "{}:{}:{}",
            BASE64.encode(initialization_vector),
            BASE64.encode(authentication_tag),
            BASE64.encode(sealed_payload)
        ))
    }

    /**
     * Recupera el material crudo desde un sobre cifrado.
     *
     * # Errors:
     * - `MalformedEnvelope`: Si el sobre no presenta los tres segmentos.
     * - `DecryptionError`: Si el tag no verifica (llave incorrecta o corrupción).
     */
    pub fn decrypt_material(&self, sealed_envelope: &str) -> Result<String, VaultError> {
        let envelope_segments: Vec<&str> = sealed_envelope.split(':').collect();
        if envelope_segments.len() != 3 {
            return Err(VaultError::MalformedEnvelope);
        }

        let initialization_vector = BASE64.decode(envelope_segments[0])?;
        let authentication_tag = BASE64.decode(envelope_segments[1])?;
        let mut ciphertext_payload = BASE64.decode(envelope_segments[2])?;

        if authentication_tag.len() != GCM_TAG_LENGTH_BYTES {
            return Err(VaultError::MalformedEnvelope);
        }

        // Reconstrucción del layout nativo del AEAD: ciphertext || tag.
        ciphertext_payload.extend_from_slice(&authentication_tag);

        let cipher_engine = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&self.master_key_bytes));
        let recovered_bytes = cipher_engine
            .decrypt(Nonce::from_slice(&initialization_vector), ciphertext_payload.as_ref())
            .map_err(|_| VaultError::DecryptionError)?;

        String::from_utf8(recovered_bytes).map_err(|_| VaultError::DecryptionError)
    }
}

/// Huella SHA-256 (hex) del material crudo: la única identidad indexada
/// usada para resolver credenciales presentadas.
#[must_use]
pub fn fingerprint_hex(raw_material: &str) -> String {
    let mut hashing_engine = Sha256::new();
    hashing_engine.update(raw_material.as_bytes());
    hex::encode(hashing_engine.finalize())
}

/// Abreviación no sensible para el rastro: `first4..` si el material mide
/// 8 caracteres o menos, `first4..last4` en caso contrario.
#[must_use]
pub fn derive_display_label(raw_material: &str) -> String {
    let material_characters: Vec<char> = raw_material.chars().collect();
    let leading: String = material_characters.iter().take(4).collect();

    if material_characters.len() <= 8 {
        format!("{leading}..")
    } else {
        let trailing: String = material_characters[material_characters.len() - 4..].iter().collect();
        format!("{leading}..{trailing}")
    }
}

/// Decodifica una llave maestra expresada como 64 caracteres hexadecimales.
pub fn parse_master_key_hex(hex_material: &str) -> Result<[u8; MASTER_KEY_LENGTH_BYTES], VaultError> {
    let decoded_bytes = hex::decode(hex_material.trim())
        .map_err(|fault| VaultError::KeyMaterialInvalid(format!("HEX_DECODE: {fault}")))?;

    decoded_bytes
        .try_into()
        .map_err(|_| VaultError::KeyMaterialInvalid("expected exactly 32 bytes (64 hex chars)".into()))
}

/**
 * Resuelve la llave maestra del proceso con precedencia soberana:
 *
 * 1. Variable de entorno (`env_variable`).
 * 2. Valor inyectado por configuración.
 * 3. Archivo de llave persistido junto al Ledger.
 * 4. Forja de una llave fresca, persistida en modo 0600.
 *
 * La llave jamás se emite al rastro ni a las respuestas.
 */
pub fn load_or_forge_master_key(
    env_variable: &str,
    configured_key_hex: Option<&str>,
    key_file_path: &Path,
) -> Result<[u8; MASTER_KEY_LENGTH_BYTES], VaultError> {
    if let Ok(environment_key_hex) = std::env::var(env_variable) {
        if !environment_key_hex.trim().is_empty() {
            info!("🔐 [VAULT_KEY]: Master key sourced from environment [{}].", env_variable);
            return parse_master_key_hex(&environment_key_hex);
        }
    }

    if let Some(key_hex) = configured_key_hex {
        if !key_hex.trim().is_empty() {
            info!("🔐 [VAULT_KEY]: Master key sourced from configuration strata.");
            return parse_master_key_hex(key_hex);
        }
    }

    if key_file_path.exists() {
        let persisted_key_hex = std::fs::read_to_string(key_file_path)?;
        info!("🔐 [VAULT_KEY]: Master key rehydrated from [{}].", key_file_path.display());
        return parse_master_key_hex(&persisted_key_hex);
    }

    // Forja de llave fresca con CSPRNG del sistema.
    warn!(
        "⚠️ [VAULT_KEY]: No master key found. Forging a fresh one at [{}].",
        key_file_path.display()
    );

    let mut forged_key_bytes = [0u8; MASTER_KEY_LENGTH_BYTES];
    rand::rngs::OsRng.fill_bytes(&mut forged_key_bytes);

    std::fs::write(key_file_path, hex::encode(forged_key_bytes))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(key_file_path, std::fs::Permissions::from_mode(0o600))?;
    }

    Ok(forged_key_bytes)
}
// FIN DEL ARCHIVO [libs/core/vault/src/lib.rs]
