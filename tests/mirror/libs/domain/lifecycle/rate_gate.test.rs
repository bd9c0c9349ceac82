// [tests/mirror/libs/domain/lifecycle/rate_gate.test.rs]
/**
 * =================================================================
 * APARATO: PRESENTER RATE GATE TEST (V3.0)
 * CLASIFICACIÓN: TRINITY EVIDENCE // ESTRATO L2-MIRROR
 * RESPONSABILIDAD: CERTIFICACIÓN DE LA PUERTA DE RITMO POR HUELLA
 * =================================================================
 */

use commune_domain_lifecycle::{PresenterRateLimiter, RateGate};
use std::time::Duration;

#[test]
fn certify_first_admission_is_allowed_and_recorded() {
    let gate = PresenterRateLimiter::new(1, 100);

    assert_eq!(gate.check("fp-alpha"), RateGate::Allow);

    // Segunda ráfaga inmediata: denegada con hint >= 1 segundo.
    match gate.check("fp-alpha") {
        RateGate::Deny { wait_seconds } => assert!(wait_seconds >= 1, "WAIT_HINT_VOID"),
        RateGate::Allow => panic!("PACING_VIOLATION: immediate retry must be denied"),
    }
}

#[test]
fn certify_presenters_are_isolated() {
    let gate = PresenterRateLimiter::new(1, 100);

    assert_eq!(gate.check("fp-alpha"), RateGate::Allow);
    // Otro presentador no hereda el veto del primero.
    assert_eq!(gate.check("fp-beta"), RateGate::Allow);
}

#[test]
fn certify_window_elapses_and_readmits() {
    let gate = PresenterRateLimiter::new(1, 100);

    assert_eq!(gate.check("fp-gamma"), RateGate::Allow);
    assert!(matches!(gate.check("fp-gamma"), RateGate::Deny { .. }));

    // Tras agotar la ventana R, el presentador vuelve a ser admitido.
    std::thread::sleep(Duration::from_millis(1_100));
    assert_eq!(gate.check("fp-gamma"), RateGate::Allow);
}

#[test]
fn certify_zero_interval_disables_the_gate() {
    let gate = PresenterRateLimiter::new(0, 100);

    assert_eq!(gate.check("fp-delta"), RateGate::Allow);
    assert_eq!(gate.check("fp-delta"), RateGate::Allow);
}
