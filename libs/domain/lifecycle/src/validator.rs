// INICIO DEL ARCHIVO [libs/domain/lifecycle/src/validator.rs]
/*!
 * =================================================================
 * APARATO: ADMISSION VALIDATOR (V5.0 - PROVIDER RULES)
 * CLASIFICACIÓN: DOMAIN POLICY (ESTRATO L2)
 * RESPONSABILIDAD: LONGITUD DE CREDENCIAL Y REGLAS DE CONTENIDO
 *
 * # Logic:
 * Las reglas del proveedor se iteran en orden de configuración. Clave
 * ausente => rechazo; patrón sin coincidencia => rechazo; expresión
 * inválida => rechazo con diagnóstico. Conjunto vacío => aceptación.
 * =================================================================
 */

use crate::errors::ValidationError;
use commune_domain_models::{ProviderConfig, RuleKind};
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// Frontera inferior de longitud de una credencial presentada.
const CREDENTIAL_MIN_LENGTH: usize = 16;
/// Frontera superior de longitud de una credencial presentada.
const CREDENTIAL_MAX_LENGTH: usize = 256;

/// Puerta de longitud para credenciales presentadas en caliente.
pub fn validate_credential_length(raw_material: &str) -> Result<(), ValidationError> {
    let character_count = raw_material.chars().count();
    if !(CREDENTIAL_MIN_LENGTH..=CREDENTIAL_MAX_LENGTH).contains(&character_count) {
        return Err(ValidationError::CredentialLengthInvalid);
    }
    Ok(())
}

/// Puerta de longitud para el utilitario de importación masiva.
pub fn validate_for_import(raw_material: &str) -> Result<(), ValidationError> {
    validate_credential_length(raw_material)
}

/**
 * Ejecuta las reglas de contenido del proveedor contra la petición.
 *
 * Cada regla compila su expresión en el momento de uso: una expresión
 * inválida rechaza la petición con diagnóstico en vez de tumbar el boot.
 */
pub fn validate_request(
    provider: &ProviderConfig,
    body_json: Option<&Value>,
    request_path: &str,
    query_parameters: &HashMap<String, String>,
) -> Result<(), ValidationError> {
    for rule in &provider.validation {
        let compiled_pattern = Regex::new(&rule.pattern).map_err(|compile_fault| {
            ValidationError::InvalidPattern(rule.pattern.clone(), compile_fault.to_string())
        })?;

        match rule.kind {
            RuleKind::Path => {
                if !compiled_pattern.is_match(request_path) {
                    return Err(ValidationError::PatternMismatch("path".to_string()));
                }
            }
            RuleKind::Query => {
                let parameter_value = query_parameters
                    .get(&rule.key)
                    .ok_or_else(|| ValidationError::MissingKey(rule.key.clone()))?;
                if !compiled_pattern.is_match(parameter_value) {
                    return Err(ValidationError::PatternMismatch(rule.key.clone()));
                }
            }
            RuleKind::BodyJson => {
                let target_value = body_json
                    .and_then(|root| navigate_dot_path(root, &rule.key))
                    .ok_or_else(|| ValidationError::MissingKey(rule.key.clone()))?;

                // Los escalares se comparan por su forma textual plana;
                // estructuras compuestas por su serialización JSON.
                let textual_form = match target_value {
                    Value::String(text) => text.clone(),
                    other => other.to_string(),
                };

                if !compiled_pattern.is_match(&textual_form) {
                    return Err(ValidationError::PatternMismatch(rule.key.clone()));
                }
            }
        }
    }
    Ok(())
}

/// Navegación por ruta punteada (`model.name`) dentro del cuerpo JSON.
fn navigate_dot_path<'a>(root: &'a Value, dotted_key: &str) -> Option<&'a Value> {
    let mut current_value = root;
    for path_segment in dotted_key.split('.') {
        current_value = current_value.get(path_segment)?;
    }
    Some(current_value)
}
// FIN DEL ARCHIVO [libs/domain/lifecycle/src/validator.rs]
