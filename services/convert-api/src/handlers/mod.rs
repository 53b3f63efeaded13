//! HTTP request handlers.

pub mod convert;
pub mod health;
pub mod reference_systems;

pub use convert::{convert_handler, strip_z_handler};
pub use health::{health_handler, metrics_handler, ready_handler};
pub use reference_systems::reference_systems_handler;
