use std::path::{Path, PathBuf};
use std::time::Duration;

use kube::config::{AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext};
use tracing::debug;

use kubepeek_types::Credential;

use crate::env::EnvSource;
use crate::error::ConfigError;

pub const SERVICE_HOST_VAR: &str = "KUBERNETES_SERVICE_HOST";
pub const SERVICE_PORT_VAR: &str = "KUBERNETES_SERVICE_PORT";
pub const ROOT_CA_VAR: &str = "MINIKUBE_ROOT_CA";
pub const DEFAULT_ROOT_CA: &str = "/var/run/secrets/kubernetes.io/serviceaccount/ca.crt";

/// Name used for the single cluster, user and context of the generated kubeconfig
const CONTEXT_NAME: &str = "in-cluster";

/// Connection settings for one request: where the API server is, which CA to
/// trust, and which bearer token to present.
#[derive(Debug)]
pub struct ClusterConfig {
    host: String,
    port: String,
    root_ca: PathBuf,
    credential: Credential,
    timeout: Option<Duration>,
}

impl ClusterConfig {
    /// `https://host:port`, with IPv6 literals bracketed
    pub fn endpoint(&self) -> String {
        if self.host.contains(':') && !self.host.starts_with('[') {
            format!("https://[{}]:{}", self.host, self.port)
        } else {
            format!("https://{}:{}", self.host, self.port)
        }
    }

    pub fn root_ca(&self) -> &Path {
        &self.root_ca
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Express this config as a single-context kubeconfig with token auth
    pub fn to_kubeconfig(&self) -> Kubeconfig {
        let token = if self.credential.is_anonymous() {
            None
        } else {
            Some(self.credential.expose().to_string().into())
        };

        Kubeconfig {
            clusters: vec![NamedCluster {
                name: CONTEXT_NAME.to_string(),
                cluster: Some(Cluster {
                    server: Some(self.endpoint()),
                    certificate_authority: Some(self.root_ca.to_string_lossy().into_owned()),
                    ..Default::default()
                }),
            }],
            auth_infos: vec![NamedAuthInfo {
                name: CONTEXT_NAME.to_string(),
                auth_info: Some(AuthInfo {
                    token,
                    ..Default::default()
                }),
            }],
            contexts: vec![NamedContext {
                name: CONTEXT_NAME.to_string(),
                context: Some(Context {
                    cluster: CONTEXT_NAME.to_string(),
                    user: Some(CONTEXT_NAME.to_string()),
                    ..Default::default()
                }),
            }],
            current_context: Some(CONTEXT_NAME.to_string()),
            ..Default::default()
        }
    }
}

/// Builds a [`ClusterConfig`] from the in-cluster service environment
pub struct ClusterConfigBuilder<'a> {
    env: &'a dyn EnvSource,
    timeout: Option<Duration>,
}

impl<'a> ClusterConfigBuilder<'a> {
    pub fn new(env: &'a dyn EnvSource) -> Self {
        Self { env, timeout: None }
    }

    /// Bound applied to each API call made with the resulting config
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve the endpoint and trust anchor, and bind `credential`.
    ///
    /// Fails when either the service host or port is unset or empty.
    pub fn build(&self, credential: Credential) -> Result<ClusterConfig, ConfigError> {
        let host = self.env.var(SERVICE_HOST_VAR).unwrap_or_default();
        let port = self.env.var(SERVICE_PORT_VAR).unwrap_or_default();
        if host.is_empty() || port.is_empty() {
            return Err(ConfigError::MissingClusterEndpoint);
        }

        // A set-but-empty override is taken as given
        let root_ca = self
            .env
            .var(ROOT_CA_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT_CA));

        debug!(
            host = %host,
            port = %port,
            root_ca = %root_ca.display(),
            credential = credential.source().as_str(),
            "Built cluster config"
        );

        Ok(ClusterConfig {
            host,
            port,
            root_ca,
            credential,
            timeout: self.timeout,
        })
    }
}
