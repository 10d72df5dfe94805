//! Kubernetes client for kubepeek
//!
//! This crate builds a per-request cluster configuration from the in-cluster
//! environment and lists namespaced resources with the caller's credential.

mod client;
mod config;
mod env;
mod error;

pub use client::{ClusterClientFactory, KubeClientFactory, KubeLister, ResourceLister};
pub use config::{
    ClusterConfig, ClusterConfigBuilder, DEFAULT_ROOT_CA, ROOT_CA_VAR, SERVICE_HOST_VAR,
    SERVICE_PORT_VAR,
};
pub use env::{EnvSource, ProcessEnv};
pub use error::{ClientError, ConfigError, K8sError};

// Re-export types that are used in our public API
pub use kubepeek_types::{Credential, ResourceKind};
