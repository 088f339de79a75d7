
pub mod framework_options;
pub mod kube_config_settings;
pub mod suite_settings;
