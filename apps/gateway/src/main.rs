// [apps/gateway/src/main.rs]
/*!
 * =================================================================
 * APARATO: GATEWAY MAIN ENTRY POINT (V9.0 - GOLD MASTER)
 * CLASIFICACIÓN: APPLICATION SHELL (ESTRATO L3)
 * RESPONSABILIDAD: BOOTSTRAP DE INFRAESTRUCTURA E IGNICIÓN SEGURA
 *
 * # Exit codes:
 * 0 => apagado limpio; 2 => configuración rechazada; 1 => fallo fatal
 * de ignición (bind de puerto o Ledger inaccesible).
 * =================================================================
 */

use commune_gateway::prelude::*;

use commune_shared_argos::init_tracing;
use dotenvy::dotenv;
use tracing::{error, info};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. CARGA DE ENTORNO
    dotenv().ok();

    // 2. OBSERVABILIDAD (ARGOS)
    init_tracing("commune_gateway");

    // 3. RUNTIME MULTIHILO
    let runtime_gateway = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime_gateway.block_on(async {
        info!("🛰️  [COMMUNE]: Gateway ignition sequence starting...");

        // 4. CONFIGURACIÓN SOBERANA
        let configuration = match GatewayConfig::load() {
            Ok(configuration) => configuration,
            Err(configuration_fault) => {
                error!("❌ [CONFIG_REJECTED]: {}", configuration_fault);
                std::process::exit(2);
            }
        };

        // 5. IGNICIÓN DEL KERNEL Y SERVICIO PERPETUO
        let kernel_instance = CommuneKernel::new(configuration);
        if let Err(ignition_fault) = kernel_instance.ignite_and_serve().await {
            error!("💀 [KERNEL_COLLAPSE]: {:#}", ignition_fault);
            std::process::exit(1);
        }
    });

    Ok(())
}
