use serde::Deserialize;

/// Where the framework takes its cluster connection settings from.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "source", content = "value")]
pub enum KubeConfigSettings {
    /// Shell command printing a kubeconfig document, e.g. `kind get kubeconfig --name kind`.
    Command(String),

    /// Path to a kubeconfig file.
    File(String),

    /// `KUBECONFIG`, `~/.kube/config` or the in-cluster service account, whichever is found first.
    #[default]
    Environment,
}
