//! Channel definitions and the registry that resolves device ids

pub mod presets;
pub mod registry;

pub use registry::{ChannelDef, ChannelRegistry, ResolvedChannel};
