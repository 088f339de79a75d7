pub mod backends;
pub mod cleanup_registry;
pub mod cluster;
pub mod framework;
pub mod namespace;
pub(crate) mod panics;
