use thiserror::Error;

/// The in-cluster endpoint could not be determined
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "unable to load in-cluster configuration, KUBERNETES_SERVICE_HOST and KUBERNETES_SERVICE_PORT must be defined"
    )]
    MissingClusterEndpoint,
}

/// A client could not be built from a [`ClusterConfig`](crate::ClusterConfig).
#[derive(Debug, Error)]
pub enum ClientError {
    /// The generated kubeconfig was rejected, usually an unreadable or invalid
    /// trust anchor file.
    #[error("unable to load cluster configuration: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),
    /// The HTTP or TLS stack could not be constructed.
    #[error("unable to create cluster client: {0}")]
    Kube(#[from] kube::Error),
}

/// A list call against the API server failed.
#[derive(Debug, Error)]
pub enum K8sError {
    /// The API server answered with an error status, e.g. 403 Forbidden.
    #[error("{message}")]
    Api {
        code: u16,
        reason: String,
        message: String,
    },
    /// Transport or decoding failure.
    #[error("{0}")]
    Kube(kube::Error),
}

impl From<kube::Error> for K8sError {
    fn from(err: kube::Error) -> Self {
        match err {
            kube::Error::Api(response) => Self::Api {
                code: response.code,
                reason: response.reason,
                message: response.message,
            },
            other => Self::Kube(other),
        }
    }
}
