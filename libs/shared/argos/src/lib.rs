// [libs/shared/argos/src/lib.rs]
/*!
 * =================================================================
 * APARATO: ARGOS NEURAL OBSERVER (V3.1 - COMMUNE EDITION)
 * CLASIFICACIÓN: SHARED UTILITY (ESTRATO L4/L6)
 * RESPONSABILIDAD: GESTIÓN DE TELEMETRÍA, TRAZADO Y CAPTURA DE PÁNICOS
 *
 * VISION HIPER-HOLÍSTICA 2026:
 * 1. DUAL MODE: Tramas JSON planas en producción para ingesta externa,
 *    salida compacta y cromática durante el desarrollo.
 * 2. SILENCE ENFORCEMENT: Filtra el ruido de infraestructura (Tower,
 *    Hyper, libSQL) para preservar la legibilidad del rastro táctico.
 * 3. PANIC SHIELD: Hook global que captura colapsos en hilos de relevo
 *    antes de la defunción del proceso.
 * =================================================================
 */

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt as formatting_layer, EnvFilter};
use std::panic;

/// Inicializa el sistema de trazas Argos con blindaje de pánicos.
///
/// # Comportamiento:
/// - Desarrollo: Logs interactivos con resaltado de color.
/// - Producción: Estructura JSON plana para la ingesta de observabilidad.
///
/// # Errors:
/// Provoca pánico si otro suscriptor global ya fue inicializado en el runtime.
pub fn init_tracing(service_nominal_identifier: &str) {
    // 1. FILTRO DINÁMICO: Prioriza el dominio propio y silencia infraestructura.
    let environmental_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "{}={level},tower_http=warn,hyper=warn,libsql=error,reqwest=warn",
            service_nominal_identifier,
            level = if cfg!(debug_assertions) { "debug" } else { "info" }
        )
        .into()
    });

    let is_production_strata = !cfg!(debug_assertions);

    // 2. ARQUITECTURA DE SUSCRIPCIÓN (Dual Mode)
    if is_production_strata {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().json().flatten_event(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(environmental_filter)
            .with(formatting_layer::layer().compact().with_target(false))
            .init();
    }

    // 3. ESCUDO DE PÁNICOS GLOBAL
    // Captura colapsos en daemons de fondo y los vuelca al rastro antes
    // de que el runtime pierda el hilo.
    let service_id_snapshot = service_nominal_identifier.to_string();

    panic::set_hook(Box::new(move |panic_metadata| {
        let panic_location = panic_metadata
            .location()
            .map(|location| format!("{}:{}:{}", location.file(), location.line(), location.column()))
            .unwrap_or_else(|| "UNKNOWN_STRATA_COORDINATES".to_string());

        let panic_payload_message = panic_metadata
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| panic_metadata.payload().downcast_ref::<String>().map(|s| s.as_str()))
            .unwrap_or("UNDEFINED_COLLAPSE_PAYLOAD");

        error!(
            target: "panic_monitor",
            service = %service_id_snapshot,
            estrato = %panic_location,
            "🔥 [CRITICAL_PANIC]: Thread terminated abruptly. Analysis: {}",
            panic_payload_message
        );
    }));

    info!(
        "👁️  [ARGOS_ONLINE]: Observability strata levelized for [{}]. Panic Shield ACTIVE.",
        service_nominal_identifier
    );
}
