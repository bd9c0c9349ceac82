// INICIO DEL ARCHIVO [apps/gateway/src/kernel.rs]
/**
 * =================================================================
 * APARATO: GATEWAY SOVEREIGN KERNEL (V9.0 - DRAIN AWARE)
 * CLASIFICACIÓN: COMPOSITION ROOT (ESTRATO L1-APP)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * VISION HIPER-HOLÍSTICA:
 * Actúa como la placa base donde se conectan todos los servicios:
 * estado neural, daemons de mantenimiento y transporte Axum con
 * drenado acotado ante SIGINT/SIGTERM.
 * =================================================================
 */

use crate::config::GatewayConfig;
use crate::routes::create_commune_router;
use crate::services::{spawn_cache_sentinel, spawn_statistics_janitor};
use crate::state::AppState;
use anyhow::Context;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Ventana máxima de drenado tras la señal de apagado.
const DRAIN_WINDOW_SECONDS: u64 = 30;

pub struct CommuneKernel {
    configuration: GatewayConfig,
}

impl CommuneKernel {
    #[must_use]
    pub fn new(configuration: GatewayConfig) -> Self {
        Self { configuration }
    }

    /**
     * Realiza la ignición completa y bloquea sirviendo tráfico.
     *
     * # Errors:
     * Fallo de configuración, de enlace al Ledger o de bind de puerto:
     * el llamador traduce a código de salida distinto de cero.
     */
    pub async fn ignite_and_serve(self) -> anyhow::Result<()> {
        let bind_address: SocketAddr = format!(
            "{}:{}",
            self.configuration.server.host, self.configuration.server.port
        )
        .parse()
        .context("bind address malformed")?;

        if self.configuration.ssl.enabled {
            // La terminación TLS vive en el perímetro externo.
            warn!("⚠️ [KERNEL]: ssl.enabled is set; TLS termination is external. Serving plain HTTP.");
        }

        // 1. ESTADO MAESTRO (Ledger, bóveda, caché, política)
        let application_shared_state = AppState::ignite(self.configuration).await?;

        // 2. PRE-CALENTAMIENTO DE SNAPSHOTS (no fatal)
        if let Err(warmup_fault) = application_shared_state.hot_cache.refresh_available().await {
            warn!("⚠️ [KERNEL]: Availability warmup incomplete: {}", warmup_fault);
        }
        if let Err(warmup_fault) = application_shared_state.hot_cache.refresh_stats().await {
            warn!("⚠️ [KERNEL]: Statistics warmup incomplete: {}", warmup_fault);
        }

        // 3. DAEMONS DE MANTENIMIENTO (Janitor + Cache Sentinel)
        let (shutdown_transmitter, shutdown_receiver) = watch::channel(false);
        spawn_statistics_janitor(application_shared_state.clone(), shutdown_receiver.clone());
        spawn_cache_sentinel(application_shared_state.clone(), shutdown_receiver);

        // 4. TRANSPORTE HTTP (AXUM)
        let commune_router = create_commune_router(application_shared_state);

        let tcp_listener = tokio::net::TcpListener::bind(bind_address)
            .await
            .with_context(|| format!("failed to bind network port at {bind_address}"))?;

        info!("🚀 [KERNEL_ONLINE]: Commune Gateway listening at {}", bind_address);

        axum::serve(
            tcp_listener,
            commune_router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(await_shutdown_signal(shutdown_transmitter))
        .await
        .context("runtime transport failure")?;

        info!("🛑 [KERNEL_OFFLINE]: Clean shutdown complete.");
        Ok(())
    }
}

/// Espera SIGINT/SIGTERM, difunde el drenado a los daemons y arma el
/// perro guardián de la ventana acotada.
async fn await_shutdown_signal(shutdown_transmitter: watch::Sender<bool>) {
    let interrupt_signal = async {
        tokio::signal::ctrl_c()
            .await
            .expect("CRITICAL_FAULT: SIGINT handler installation failed.");
    };

    #[cfg(unix)]
    let terminate_signal = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("CRITICAL_FAULT: SIGTERM handler installation failed.")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate_signal = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt_signal => {},
        _ = terminate_signal => {},
    }

    info!("🛑 [KERNEL]: Shutdown signal received. Draining in-flight requests (max {}s).", DRAIN_WINDOW_SECONDS);
    let _ = shutdown_transmitter.send(true);

    // Perro guardián: si el drenado excede la ventana, terminación limpia forzada.
    tokio::spawn(async {
        tokio::time::sleep(Duration::from_secs(DRAIN_WINDOW_SECONDS)).await;
        warn!("⚠️ [KERNEL]: Drain window exceeded. Forcing exit.");
        std::process::exit(0);
    });
}
// FIN DEL ARCHIVO [apps/gateway/src/kernel.rs]
