// INICIO DEL ARCHIVO [apps/gateway/src/handlers/visual.rs]
/**
 * =================================================================
 * APARATO: VISUAL TERMINAL GATEWAY (V3.0 - RAW STATIC)
 * CLASIFICACIÓN: API ADAPTER (ESTRATO L3)
 * RESPONSABILIDAD: RENDERIZADO DE INTERFAZ DE ESTADO PÚBLICO
 *
 * VISION HIPER-HOLÍSTICA:
 * Landing de diagnóstico con strings crudos de Rust: cero dependencia
 * de motores de plantillas y compilación instantánea del binario.
 * =================================================================
 */

use axum::response::{Html, IntoResponse};

pub async fn handle_visual_landing() -> impl IntoResponse {
    // Renderizado atómico sin overhead de templating engine
    Html(r#"
    <!DOCTYPE html>
    <html lang="en">
    <head>
        <meta charset="UTF-8">
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <title>COMMUNE // GATEWAY</title>
        <script src="https://cdn.tailwindcss.com"></script>
        <link href="https://fonts.googleapis.com/css2?family=JetBrains+Mono:wght@400;800&display=swap" rel="stylesheet">
        <style>
            body { font-family: 'JetBrains Mono', monospace; background-color: #050505; color: #38bdf8; }
            .glitch { text-shadow: 2px 0 #f43f5e, -2px 0 #22d3ee; animation: scan 4s infinite linear; }
            @keyframes scan { 0% { opacity: 1; } 50% { opacity: 0.82; } 100% { opacity: 1; } }
        </style>
    </head>
    <body class="flex flex-col items-center justify-center min-h-screen p-6 border-4 border-[#38bdf8]/10">
        <div class="max-w-2xl w-full space-y-8 bg-black/50 p-10 rounded-3xl border border-[#38bdf8]/20 shadow-[0_0_50px_rgba(56,189,248,0.1)]">

            <header class="border-b border-[#38bdf8]/20 pb-6 flex justify-between items-start">
                <div>
                    <h1 class="text-3xl font-black tracking-tighter uppercase italic glitch">Commune_Gateway</h1>
                    <p class="text-[10px] uppercase tracking-[0.5em] text-zinc-500 mt-2">Credential_Multiplexer // V0.4</p>
                </div>
                <div class="px-3 py-1 bg-[#38bdf8]/10 rounded-full border border-[#38bdf8]/30">
                    <span class="text-[9px] font-bold animate-pulse">● RELAY_ACTIVE</span>
                </div>
            </header>

            <div class="grid grid-cols-1 md:grid-cols-2 gap-6 py-6">
                <div class="p-4 bg-zinc-900/30 rounded-xl border border-white/5">
                    <p class="text-[9px] text-zinc-600 uppercase font-black">Pool_Strata</p>
                    <p class="text-white font-bold mt-1">SHARED_WHEN_HEALTHY</p>
                </div>
                <div class="p-4 bg-zinc-900/30 rounded-xl border border-white/5">
                    <p class="text-[9px] text-zinc-600 uppercase font-black">Vault_Protocol</p>
                    <p class="text-white font-bold mt-1">AES_256_GCM_AT_REST</p>
                </div>
            </div>

            <div class="space-y-4">
                <div class="bg-black p-4 rounded-lg font-mono text-[11px] leading-relaxed border border-white/5">
                    <p class="text-zinc-500">> systemctl status commune-gateway</p>
                    <p class="text-sky-400">● [RELAY] Admission pipeline armed</p>
                    <p class="text-sky-400">● [POOL] Misbehaving credentials quarantined to presenter</p>
                    <p class="text-amber-500">! [NOTICE] Present your own credential. Healthy keys are shared.</p>
                </div>
            </div>

            <footer class="pt-6 border-t border-white/5 flex justify-center">
                <a href="/health" class="text-[10px] font-black uppercase tracking-widest bg-[#38bdf8] text-black px-6 py-3 rounded-lg hover:bg-white transition-all shadow-[0_0_20px_rgba(56,189,248,0.3)]">
                    Probe_Health_Endpoint
                </a>
            </footer>
        </div>
        <p class="mt-10 text-[8px] text-zinc-800 uppercase tracking-[1em]">Cooperative_of_Credentials // 2026</p>
    </body>
    </html>
    "#)
}
// FIN DEL ARCHIVO [apps/gateway/src/handlers/visual.rs]
