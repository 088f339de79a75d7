
use crate::services::backends::kubernetes::namespace_strategy::{KubeNamespaceStrategy, RUN_LABEL};
use crate::services::backends::kubernetes::service_account_waiter::KubeServiceAccountWaiter;
use crate::services::cluster::{NamespaceStrategy, ServiceAccountWaiter};
use crate::services::namespace::deletion_error::DeletionErrorKind;
use fixtures::KindClusterContext;
use maplit::btreemap;
use std::time::Duration;
use test_context::test_context;

const DEFAULT_TEST_TIMEOUT: Duration = Duration::from_secs(120);

#[test_context(KindClusterContext)]
#[tokio::test]
#[ignore = "requires a kind cluster"]
async fn test_create_and_delete_namespace(ctx: &mut KindClusterContext) {
    // Arrange
    let strategy = KubeNamespaceStrategy::new().with_poll_interval(Duration::from_millis(500));
    let labels = btreemap! {
        "e2e-framework".to_string() => "kube-strategy".to_string(),
    };

    // Act
    let namespace = strategy
        .create_testing_namespace(&ctx.client, "kube-strategy", &labels)
        .await
        .unwrap();
    let deletion = strategy
        .delete_namespace(&ctx.client, &namespace.name, DEFAULT_TEST_TIMEOUT)
        .await;

    // Assert
    assert!(namespace.name.starts_with("kube-strategy-"));
    assert_eq!(namespace.labels.get(RUN_LABEL), Some(&strategy.run_id().to_string()));
    assert!(namespace.creation_timestamp.is_some());
    assert!(deletion.is_ok());
}

#[test_context(KindClusterContext)]
#[tokio::test]
#[ignore = "requires a kind cluster"]
async fn test_delete_missing_namespace_is_not_found(ctx: &mut KindClusterContext) {
    let strategy = KubeNamespaceStrategy::new();

    let error = strategy
        .delete_namespace(&ctx.client, "e2e-framework-does-not-exist", DEFAULT_TEST_TIMEOUT)
        .await
        .unwrap_err();

    assert_eq!(error.kind, DeletionErrorKind::NotFound);
}

#[test_context(KindClusterContext)]
#[tokio::test]
#[ignore = "requires a kind cluster"]
async fn test_default_service_account_is_provisioned(ctx: &mut KindClusterContext) {
    // Arrange
    let strategy = KubeNamespaceStrategy::new();
    let namespace = strategy
        .create_testing_namespace(&ctx.client, "service-account", &Default::default())
        .await
        .unwrap();
    let waiter = KubeServiceAccountWaiter::new(DEFAULT_TEST_TIMEOUT);

    // Act
    let result = waiter.wait_for_default_service_account(&ctx.client, &namespace.name).await;

    // Assert
    assert!(result.is_ok());
    let _ = strategy
        .delete_namespace(&ctx.client, &namespace.name, DEFAULT_TEST_TIMEOUT)
        .await;
}
