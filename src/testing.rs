use kube::Client;

pub mod fake_client_factory;
pub mod fake_cluster;
pub mod recording_collaborators;
pub mod recording_namespace_strategy;

/// Kubeconfig command for the local kind cluster used by the live tests.
pub const KIND_KUBECONFIG_COMMAND: &str = "kind get kubeconfig --name kind";

/// Routes `log` output through the test harness. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A client that never reaches a cluster: every request fails with `NotConnected`.
/// Must be created inside a tokio runtime.
pub fn offline_client() -> Client {
    let service = tower::service_fn(|_request: http::Request<kube::client::Body>| async {
        Err::<http::Response<kube::client::Body>, _>(std::io::Error::new(
            std::io::ErrorKind::NotConnected,
            "offline test client",
        ))
    });
    Client::new(service, "default")
}
