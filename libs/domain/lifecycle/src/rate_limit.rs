// INICIO DEL ARCHIVO [libs/domain/lifecycle/src/rate_limit.rs]
/*!
 * =================================================================
 * APARATO: PRESENTER RATE GATE (V4.1 - COARSE THROTTLE)
 * CLASIFICACIÓN: DOMAIN POLICY (ESTRATO L2)
 * RESPONSABILIDAD: RITMO MÍNIMO ENTRE ADMISIONES POR PRESENTADOR
 *
 * # Logic:
 * LRU acotada (capacidad = cupo del pool) con TTL = 2R respaldada por
 * moka. Una LRU llena desaloja al más antiguo, jamás deniega. Dos
 * ráfagas simultáneas del mismo presentador dentro de la ventana pueden
 * colarse ambas: R es un estrangulador grueso, no un límite criptográfico.
 * =================================================================
 */

use moka::sync::Cache;
use std::time::{Duration, Instant};
use tracing::debug;

/// Veredicto de la puerta de ritmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateGate {
    Allow,
    /// Denegado: segundos sugeridos de espera para el hint humano.
    Deny { wait_seconds: u64 },
}

/// Puerta de ritmo por huella presentada. No persistida.
pub struct PresenterRateLimiter {
    admission_ledger: Cache<String, Instant>,
    minimum_interval: Duration,
}

impl PresenterRateLimiter {
    #[must_use]
    pub fn new(interval_seconds: u64, pool_capacity: u64) -> Self {
        let time_to_live_seconds = (interval_seconds * 2).max(1);

        Self {
            admission_ledger: Cache::builder()
                .max_capacity(pool_capacity.max(1))
                .time_to_live(Duration::from_secs(time_to_live_seconds))
                .build(),
            minimum_interval: Duration::from_secs(interval_seconds),
        }
    }

    /**
     * Evalúa y registra la admisión del presentador.
     *
     * Permite si la última admisión ocurrió hace R segundos o más (o si
     * jamás se observó); registra el instante actual al permitir.
     */
    pub fn check(&self, presenter_fingerprint: &str) -> RateGate {
        if self.minimum_interval.is_zero() {
            return RateGate::Allow;
        }

        let current_instant = Instant::now();

        if let Some(last_admission) = self.admission_ledger.get(presenter_fingerprint) {
            let elapsed = current_instant.duration_since(last_admission);
            if elapsed < self.minimum_interval {
                let remaining = self.minimum_interval - elapsed;
                // Redondeo hacia arriba: un hint de 0 segundos no guía a nadie.
                let wait_seconds = remaining.as_secs().max(1);
                debug!("🚦 [RATE_GATE]: Presenter pacing veto ({}s remaining).", wait_seconds);
                return RateGate::Deny { wait_seconds };
            }
        }

        self.admission_ledger
            .insert(presenter_fingerprint.to_string(), current_instant);
        RateGate::Allow
    }
}
// FIN DEL ARCHIVO [libs/domain/lifecycle/src/rate_limit.rs]
