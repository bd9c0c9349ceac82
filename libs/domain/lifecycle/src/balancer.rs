// INICIO DEL ARCHIVO [libs/domain/lifecycle/src/balancer.rs]
/*!
 * =================================================================
 * APARATO: COMMUNE LOAD BALANCER (V6.0 - POWER OF TWO)
 * CLASIFICACIÓN: DOMAIN POLICY (ESTRATO L2)
 * RESPONSABILIDAD: SELECCIÓN ESTADÍSTICA SOBRE EL SNAPSHOT PERMUTADO
 *
 * # Logic:
 * Power-of-two-choices sobre la secuencia ya permutada por la caché:
 * un cursor atómico avanza de dos en dos y extrae dos candidatos por
 * ronda. Menos estrangulamientos gana; empate => menos llamadas;
 * empate => C1. El presentador sólo desplaza al ganador con
 * estadísticas estrictamente mejores, amortizando a los llamadores
 * pesados sobre el resto del pool.
 * =================================================================
 */

use crate::errors::SelectionError;
use commune_domain_models::{CredentialRecord, DailyStatsRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::trace;

/// Selector sin estado persistente; el cursor interno sólo aporta
/// rotación round-robin entre refreshes del snapshot.
#[derive(Default)]
pub struct CommuneLoadBalancer {
    rotation_cursor: AtomicUsize,
}

impl CommuneLoadBalancer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /**
     * Elige la credencial que portará la petición saliente.
     *
     * # Errors:
     * - `SelectionError::NoAvailable`: Secuencia vacía (el pipeline responde 503).
     */
    pub fn select(
        &self,
        available_sequence: &[CredentialRecord],
        statistics_map: &HashMap<i64, DailyStatsRecord>,
        presenter_fingerprint: &str,
    ) -> Result<CredentialRecord, SelectionError> {
        if available_sequence.is_empty() {
            return Err(SelectionError::NoAvailable);
        }
        if available_sequence.len() == 1 {
            return Ok(available_sequence[0].clone());
        }

        // Cursor avanzando de dos en dos: rotación sobre el orden ya
        // permutado por el refresh de la caché.
        let rotation_base = self.rotation_cursor.fetch_add(2, Ordering::Relaxed);
        let first_candidate = &available_sequence[rotation_base % available_sequence.len()];
        let second_candidate = &available_sequence[(rotation_base + 1) % available_sequence.len()];

        let mut running_winner = first_candidate;
        if strictly_better(second_candidate, running_winner, statistics_map) {
            running_winner = second_candidate;
        }

        // El presentador sólo entra con estadísticas estrictamente mejores.
        if let Some(presenter_record) = available_sequence
            .iter()
            .find(|resident| resident.fingerprint == presenter_fingerprint)
        {
            if presenter_record.id != running_winner.id
                && strictly_better(presenter_record, running_winner, statistics_map)
            {
                running_winner = presenter_record;
            }
        }

        trace!(
            "⚖️ [BALANCER]: Dispatch winner {} (candidates {} / {}).",
            running_winner.display_label,
            first_candidate.display_label,
            second_candidate.display_label
        );
        Ok(running_winner.clone())
    }
}

/// Estadísticas efectivas del día (ausencia = cero).
fn daily_load(credential_id: i64, statistics_map: &HashMap<i64, DailyStatsRecord>) -> (u64, u64) {
    statistics_map
        .get(&credential_id)
        .map(|record| (record.throttle_count, record.call_count))
        .unwrap_or((0, 0))
}

/// Regla de comparación: menos estrangulamientos, luego menos llamadas.
/// Igualdad exacta retorna false (el incumbente retiene la victoria).
fn strictly_better(
    challenger: &CredentialRecord,
    incumbent: &CredentialRecord,
    statistics_map: &HashMap<i64, DailyStatsRecord>,
) -> bool {
    let (challenger_throttles, challenger_calls) = daily_load(challenger.id, statistics_map);
    let (incumbent_throttles, incumbent_calls) = daily_load(incumbent.id, statistics_map);

    (challenger_throttles, challenger_calls) < (incumbent_throttles, incumbent_calls)
}
// FIN DEL ARCHIVO [libs/domain/lifecycle/src/balancer.rs]
