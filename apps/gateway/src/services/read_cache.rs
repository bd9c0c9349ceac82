// INICIO DEL ARCHIVO [apps/gateway/src/services/read_cache.rs]
/*!
 * =================================================================
 * APARATO: READ-PATH RESPONSE CACHE (V5.0 - LRU+TTL)
 * CLASIFICACIÓN: APPLICATION SERVICE (ESTRATO L4)
 * RESPONSABILIDAD: CACHÉ DE RESPUESTAS 200 PARA GETS IDEMPOTENTES
 *
 * # Logic:
 * Claves (método, URL completa con query); capacidad acotada (~100);
 * cada entrada porta el TTL de su regla cacheable y expira de forma
 * perezosa en el acceso. Sólo se cachean respuestas 200; el camino
 * cacheable jamás reescribe auth ni alimenta la máquina de estados.
 * =================================================================
 */

use moka::{sync::Cache, Expiry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Respuesta relevada lista para re-materializar desde la caché.
#[derive(Debug, Clone)]
pub struct CachedRelay {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    /// TTL heredado de la regla cacheable que activó este camino.
    pub time_to_live: Duration,
}

/// Expiración por entrada: cada relevo cacheado porta su propio TTL.
struct PerEntryExpiry;

impl Expiry<String, Arc<CachedRelay>> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _cache_key: &String,
        cached_relay: &Arc<CachedRelay>,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(cached_relay.time_to_live)
    }
}

pub struct ReadPathCache {
    entries: Cache<String, Arc<CachedRelay>>,
}

impl ReadPathCache {
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(capacity)
                .expire_after(PerEntryExpiry)
                .build(),
        }
    }

    pub fn lookup(&self, cache_key: &str) -> Option<Arc<CachedRelay>> {
        let cache_hit = self.entries.get(cache_key);
        if cache_hit.is_some() {
            debug!("📦 [READ_CACHE]: Hit for [{}].", cache_key);
        }
        cache_hit
    }

    pub fn store(&self, cache_key: String, relay: CachedRelay) {
        debug!("📦 [READ_CACHE]: Stored [{}] (ttl {:?}).", cache_key, relay.time_to_live);
        self.entries.insert(cache_key, Arc::new(relay));
    }

    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
// FIN DEL ARCHIVO [apps/gateway/src/services/read_cache.rs]
