// INICIO DEL ARCHIVO [libs/domain/lifecycle/src/manager.rs]
/*!
 * =================================================================
 * APARATO: CREDENTIAL LIFECYCLE MANAGER (V10.0 - STATE MACHINE)
 * CLASIFICACIÓN: DOMAIN POLICY (ESTRATO L2)
 * RESPONSABILIDAD: MUTACIÓN DE ESTADO ANTE CÓDIGOS UPSTREAM
 *
 * VISION HIPER-HOLÍSTICA:
 * 1. STATE MACHINE: 2xx resetea contadores o enrola; 401 escala hacia
 *    cuarentena fija y expulsión; 429 escala backoff exponencial
 *    2^(n-1) x base hacia expulsión; el resto pasa sin mutación.
 * 2. SELF-ENROLLMENT: Una credencial transitoria que demuestra salud
 *    (2xx) cruza la puerta de capacidad y se une al pool con
 *    contadores en cero.
 * 3. PRESENTER PACING: La puerta de ritmo por huella vive aquí, no en
 *    el transporte, porque es política de la comuna.
 * =================================================================
 */

use crate::rate_limit::{PresenterRateLimiter, RateGate};
use commune_domain_models::{
    CredentialRecord, LifecycleAction, LifecycleOutcome, SelectedCredential,
};
use commune_infra_db::{CredentialRepository, EnrollmentVerdict, StatsRepository, StoreError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Política de bloqueo y expulsión, hidratada desde la configuración.
/// Los umbrales jamás se codifican en duro: `throttle_delete_threshold`
/// varía entre despliegues (10-15).
#[derive(Debug, Clone)]
pub struct BlockingPolicy {
    pub presented_key_rate_limit_seconds: u64,
    pub auth_failure_block_minutes: i64,
    pub auth_failure_delete_threshold: u32,
    pub throttle_backoff_base_minutes: i64,
    pub throttle_delete_threshold: u32,
    pub max_pool_size: u64,
}

impl Default for BlockingPolicy {
    fn default() -> Self {
        Self {
            presented_key_rate_limit_seconds: 1,
            auth_failure_block_minutes: 1440,
            auth_failure_delete_threshold: 3,
            throttle_backoff_base_minutes: 1,
            throttle_delete_threshold: 10,
            max_pool_size: 200,
        }
    }
}

/// Gestor del ciclo de vida: aplica la máquina de estados contra el
/// Ledger y gobierna la puerta de ritmo del presentador.
pub struct LifecycleManager {
    credential_repository: Arc<CredentialRepository>,
    stats_repository: Arc<StatsRepository>,
    presenter_gate: PresenterRateLimiter,
    policy: BlockingPolicy,
}

impl LifecycleManager {
    #[must_use]
    pub fn new(
        credential_repository: Arc<CredentialRepository>,
        stats_repository: Arc<StatsRepository>,
        policy: BlockingPolicy,
    ) -> Self {
        let presenter_gate = PresenterRateLimiter::new(
            policy.presented_key_rate_limit_seconds,
            policy.max_pool_size,
        );

        Self {
            credential_repository,
            stats_repository,
            presenter_gate,
            policy,
        }
    }

    /// Puerta de ritmo por huella presentada (veredicto con hint de espera).
    pub fn check_presenter_rate_limit(&self, presenter_fingerprint: &str) -> RateGate {
        self.presenter_gate.check(presenter_fingerprint)
    }

    #[must_use]
    pub fn policy(&self) -> &BlockingPolicy {
        &self.policy
    }

    /**
     * Alimenta el código de estado upstream a la máquina de estados.
     *
     * El veredicto se registra en el rastro; la corrección del relevo al
     * cliente no depende de inspeccionarlo.
     */
    #[instrument(skip(self, selected), fields(credential = %selected.display_label(), status = upstream_status))]
    pub async fn handle_response(
        &self,
        selected: &SelectedCredential,
        upstream_status: u16,
    ) -> Result<LifecycleOutcome, StoreError> {
        match selected {
            SelectedCredential::Resident(record) => {
                self.handle_resident_response(record, upstream_status).await
            }
            SelectedCredential::Transient(transient) => match upstream_status {
                200..=299 => self.enroll_transient(&transient.material).await,
                _ => Ok(LifecycleOutcome::new(
                    LifecycleAction::Proxied,
                    format!("status {upstream_status} passed through (untracked credential)"),
                )),
            },
        }
    }

    async fn handle_resident_response(
        &self,
        record: &CredentialRecord,
        upstream_status: u16,
    ) -> Result<LifecycleOutcome, StoreError> {
        match upstream_status {
            200..=299 => {
                self.credential_repository.reset_counters(record.id).await?;
                Ok(LifecycleOutcome::new(
                    LifecycleAction::Success,
                    format!("call succeeded; counters leveled for {}", record.display_label),
                ))
            }

            401 => {
                let failure_streak = self
                    .credential_repository
                    .increment_auth_failures(record.id)
                    .await?;

                if failure_streak >= self.policy.auth_failure_delete_threshold {
                    self.credential_repository.delete(record.id).await?;
                    warn!("💀 [LIFECYCLE]: Credential {} expelled after {} consecutive auth failures.",
                        record.display_label, failure_streak);
                    return Ok(LifecycleOutcome::new(
                        LifecycleAction::Deleted,
                        format!(
                            "credential {} expelled after {} consecutive auth failures",
                            record.display_label, failure_streak
                        ),
                    ));
                }

                let quarantine_deadline =
                    Utc::now().timestamp() + self.policy.auth_failure_block_minutes * 60;
                self.credential_repository
                    .set_block_deadline(record.id, Some(quarantine_deadline))
                    .await?;

                Ok(LifecycleOutcome::new(
                    LifecycleAction::Blocked,
                    format!(
                        "credential {} quarantined for {} minutes (auth failure {}/{})",
                        record.display_label,
                        self.policy.auth_failure_block_minutes,
                        failure_streak,
                        self.policy.auth_failure_delete_threshold
                    ),
                ))
            }

            429 => {
                let throttle_streak = self
                    .credential_repository
                    .increment_throttles(record.id)
                    .await?;
                self.stats_repository
                    .increment_throttle_count(record.id)
                    .await?;

                if throttle_streak >= self.policy.throttle_delete_threshold {
                    self.credential_repository.delete(record.id).await?;
                    warn!("💀 [LIFECYCLE]: Credential {} expelled after {} consecutive throttles.",
                        record.display_label, throttle_streak);
                    return Ok(LifecycleOutcome::new(
                        LifecycleAction::Deleted,
                        format!(
                            "credential {} expelled after {} consecutive throttles",
                            record.display_label, throttle_streak
                        ),
                    ));
                }

                // Backoff multiplicativo: 2^(n-1) x base. El exponente se
                // acota para que el shift jamás desborde i64.
                let backoff_exponent = throttle_streak.saturating_sub(1).min(30);
                let backoff_minutes = self
                    .policy
                    .throttle_backoff_base_minutes
                    .saturating_mul(1i64 << backoff_exponent);
                let quarantine_deadline = Utc::now().timestamp() + backoff_minutes * 60;

                self.credential_repository
                    .set_block_deadline(record.id, Some(quarantine_deadline))
                    .await?;

                Ok(LifecycleOutcome::new(
                    LifecycleAction::Blocked,
                    format!(
                        "credential {} backing off {} minutes (throttle {}/{})",
                        record.display_label,
                        backoff_minutes,
                        throttle_streak,
                        self.policy.throttle_delete_threshold
                    ),
                ))
            }

            // 403, 5xx y el resto pasan sin mutar el estado del pool.
            other_status => Ok(LifecycleOutcome::new(
                LifecycleAction::Proxied,
                format!("status {other_status} passed through"),
            )),
        }
    }

    /// Protocolo de auto-enrolamiento tras un 2xx de credencial transitoria.
    async fn enroll_transient(&self, raw_material: &str) -> Result<LifecycleOutcome, StoreError> {
        match self
            .credential_repository
            .create_if_below_capacity(raw_material, self.policy.max_pool_size)
            .await?
        {
            EnrollmentVerdict::Enrolled(record) => {
                info!("🤝 [LIFECYCLE]: Credential {} joined the commune.", record.display_label);
                Ok(LifecycleOutcome::new(
                    LifecycleAction::Success,
                    format!("credential {} enrolled into the commune", record.display_label),
                ))
            }
            EnrollmentVerdict::AlreadyEnrolled(record) => Ok(LifecycleOutcome::new(
                LifecycleAction::Success,
                format!("credential {} already resident", record.display_label),
            )),
            EnrollmentVerdict::PoolSaturated => Ok(LifecycleOutcome::new(
                LifecycleAction::Proxied,
                "proxied with caller credential; commune at capacity".to_string(),
            )),
        }
    }
}

/// Atribución de cliente limitada por privacidad: IPv4 colapsa a su /24;
/// cualquier otra forma retorna intacta.
#[must_use]
pub fn client_subnet(ip_literal: &str) -> String {
    match ip_literal.parse::<std::net::Ipv4Addr>() {
        Ok(address) => {
            let octets = address.octets();
            format!("{}.{}.{}.0/24", octets[0], octets[1], octets[2])
        }
        Err(_) => ip_literal.to_string(),
    }
}
// FIN DEL ARCHIVO [libs/domain/lifecycle/src/manager.rs]
