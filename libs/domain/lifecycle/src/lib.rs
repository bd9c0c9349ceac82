// [libs/domain/lifecycle/src/lib.rs]
/*!
 * =================================================================
 * APARATO: LIFECYCLE LIBRARY ROOT (V4.0 - COMMUNE BRAIN)
 * CLASIFICACIÓN: CRATE ROOT (ESTRATO L2)
 * RESPONSABILIDAD: DEFINICIÓN DEL ÁRBOL DE MÓDULOS DE POLÍTICA
 * =================================================================
 */

/// Selector power-of-two sobre la secuencia disponible permutada.
pub mod balancer;
/// Catálogo de fallos de selección y validación.
pub mod errors;
/// Máquina de estados del ciclo de vida y protocolo de enrolamiento.
pub mod manager;
/// Puerta de ritmo por credencial presentada (LRU acotada con TTL).
pub mod rate_limit;
/// Validador de longitud y reglas de contenido por proveedor.
pub mod validator;

pub use balancer::CommuneLoadBalancer;
pub use errors::{SelectionError, ValidationError};
pub use manager::{client_subnet, BlockingPolicy, LifecycleManager};
pub use rate_limit::{PresenterRateLimiter, RateGate};
