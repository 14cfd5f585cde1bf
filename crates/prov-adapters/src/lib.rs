//! prov-adapters: capa entre el motor y el sistema anfitrión.
//!
//! Este crate provee:
//! - Traits de capacidad del anfitrión (`host`): descargas, gestor de
//!   paquetes, conectividad, ajustes seguros, instalador y acciones opacas.
//! - Sondas de entorno (`probes`).
//! - Los pasos concretos: descarga, verificación, instalación y acciones.
//! - `build_provisioning_tasks`, que arma la lista ordenada según la acción.
//! - Fakes en memoria (`host::memory`) para tests y demos.

pub mod factory;
pub mod host;
pub mod probes;
pub mod tasks;

pub use factory::build_provisioning_tasks;
pub use host::{HostActions, HostError, HostServices};
