use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use k8s_openapi::api::core::v1::{ConfigMap, Pod, Secret};
use kube::api::ListParams;
use kube::config::KubeConfigOptions;
use kube::{Api, Resource};
use serde::de::DeserializeOwned;
use tracing::debug;

use kubepeek_types::ResourceKind;

use crate::config::ClusterConfig;
use crate::error::{ClientError, K8sError};

/// Lists resource names in a namespace.
///
/// Implementations perform a single unfiltered, unpaginated list call per
/// invocation and return names in the order the server sent them.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list(&self, namespace: &str, kind: ResourceKind) -> Result<Vec<String>, K8sError>;
}

/// Creates a fresh [`ResourceLister`] bound to a [`ClusterConfig`].
///
/// One lister is created per request; nothing is pooled between requests.
#[async_trait]
pub trait ClusterClientFactory: Send + Sync {
    async fn create(&self, config: &ClusterConfig) -> Result<Box<dyn ResourceLister>, ClientError>;
}

/// Factory producing [`KubeLister`]s backed by `kube::Client`
#[derive(Clone, Copy, Debug, Default)]
pub struct KubeClientFactory;

#[async_trait]
impl ClusterClientFactory for KubeClientFactory {
    async fn create(&self, config: &ClusterConfig) -> Result<Box<dyn ResourceLister>, ClientError> {
        let mut kube_config =
            kube::Config::from_custom_kubeconfig(config.to_kubeconfig(), &KubeConfigOptions::default())
                .await?;

        if let Some(timeout) = config.timeout() {
            kube_config.connect_timeout = Some(timeout);
            kube_config.read_timeout = Some(timeout);
        }

        let client = kube::Client::try_from(kube_config)?;
        debug!(endpoint = %config.endpoint(), "Created cluster client");

        Ok(Box::new(KubeLister::new(client)))
    }
}

/// [`ResourceLister`] over a live API server
#[derive(Clone)]
pub struct KubeLister {
    client: kube::Client,
}

impl KubeLister {
    pub fn new(client: kube::Client) -> Self {
        Self { client }
    }

    async fn names<K>(&self, namespace: &str) -> Result<Vec<String>, K8sError>
    where
        K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>
            + Clone
            + DeserializeOwned
            + Debug
            + Send
            + Sync
            + 'static,
    {
        let api: Api<K> = Api::namespaced(self.client.clone(), namespace);
        let list = api.list(&ListParams::default()).await?;

        Ok(list
            .items
            .into_iter()
            .map(|item| item.meta().name.clone().unwrap_or_default())
            .collect())
    }
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list(&self, namespace: &str, kind: ResourceKind) -> Result<Vec<String>, K8sError> {
        debug!(namespace, kind = %kind, "Listing resources");

        match kind {
            ResourceKind::ConfigMap => self.names::<ConfigMap>(namespace).await,
            ResourceKind::Secret => self.names::<Secret>(namespace).await,
            ResourceKind::Pod => self.names::<Pod>(namespace).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClusterConfigBuilder, ROOT_CA_VAR, SERVICE_HOST_VAR, SERVICE_PORT_VAR};
    use kubepeek_types::{Credential, CredentialSource};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_unreadable_trust_anchor_is_a_client_error() {
        let env: HashMap<String, String> = [
            (SERVICE_HOST_VAR, "10.0.0.1"),
            (SERVICE_PORT_VAR, "443"),
            (ROOT_CA_VAR, "/nonexistent/kubepeek/ca.crt"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = ClusterConfigBuilder::new(&env)
            .build(Credential::bearer("abc", CredentialSource::Parameter))
            .unwrap();

        let result = KubeClientFactory.create(&config).await;
        assert!(matches!(result, Err(ClientError::Kubeconfig(_))));
    }
}
