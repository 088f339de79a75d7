#[cfg(test)]
mod tests;

pub mod client_factory;
pub mod kubeconfig_loader;
pub mod namespace_dumper;
pub mod namespace_strategy;
pub mod service_account_waiter;
