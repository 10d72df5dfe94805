use futures::future::join_all;
use tracing::{debug, warn};

use kubepeek_k8s::ResourceLister;
use kubepeek_types::{NamespaceQuery, ResourceListResult};

/// List every kind in `query` and collect one result per kind.
///
/// Lookups run concurrently. Results come back in the query's kind order no
/// matter which lookup finishes first, and a failing kind is recorded as a
/// failed result without affecting its siblings.
pub async fn aggregate(
    lister: &dyn ResourceLister,
    query: &NamespaceQuery,
) -> Vec<ResourceListResult> {
    let namespace = query.namespace.as_str();

    let lookups = query.kinds().iter().map(|&kind| async move {
        match lister.list(namespace, kind).await {
            Ok(names) => {
                debug!(namespace, kind = %kind, count = names.len(), "Listed resources");
                ResourceListResult::listed(kind, names)
            }
            Err(e) => {
                warn!(namespace, kind = %kind, error = %e, "Failed to list resources");
                ResourceListResult::failed(kind, e.to_string())
            }
        }
    });

    join_all(lookups).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use kubepeek_k8s::K8sError;
    use kubepeek_types::{ListOutcome, ResourceKind};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Lister answering from a fixed table, optionally after a delay
    #[derive(Default)]
    struct FakeLister {
        names: HashMap<ResourceKind, Vec<&'static str>>,
        forbidden: Vec<ResourceKind>,
        delays: HashMap<ResourceKind, Duration>,
        calls: AtomicUsize,
    }

    impl FakeLister {
        fn with(mut self, kind: ResourceKind, names: &[&'static str]) -> Self {
            self.names.insert(kind, names.to_vec());
            self
        }

        fn forbid(mut self, kind: ResourceKind) -> Self {
            self.forbidden.push(kind);
            self
        }

        fn delay(mut self, kind: ResourceKind, millis: u64) -> Self {
            self.delays.insert(kind, Duration::from_millis(millis));
            self
        }
    }

    #[async_trait]
    impl ResourceLister for FakeLister {
        async fn list(&self, namespace: &str, kind: ResourceKind) -> Result<Vec<String>, K8sError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delays.get(&kind) {
                tokio::time::sleep(*delay).await;
            }

            if self.forbidden.contains(&kind) {
                return Err(K8sError::Api {
                    code: 403,
                    reason: "Forbidden".to_string(),
                    message: format!(
                        "{} is forbidden: cannot list resource in the namespace \"{}\"",
                        kind, namespace
                    ),
                });
            }

            Ok(self
                .names
                .get(&kind)
                .map(|names| names.iter().map(|n| n.to_string()).collect())
                .unwrap_or_default())
        }
    }

    fn kinds(results: &[ResourceListResult]) -> Vec<ResourceKind> {
        results.iter().map(|r| r.kind).collect()
    }

    #[tokio::test]
    async fn test_one_result_per_kind_in_fixed_order() {
        let lister = FakeLister::default()
            .with(ResourceKind::ConfigMap, &["kube-root-ca.crt"])
            .with(ResourceKind::Secret, &["default-token"])
            .with(ResourceKind::Pod, &["web-0", "web-1"]);

        let results = aggregate(&lister, &NamespaceQuery::all("che")).await;

        assert_eq!(kinds(&results), ResourceKind::ALL.to_vec());
        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(lister.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_secret_failure_is_isolated() {
        let lister = FakeLister::default()
            .with(ResourceKind::ConfigMap, &["settings"])
            .with(ResourceKind::Pod, &["web-0"])
            .forbid(ResourceKind::Secret);

        let results = aggregate(&lister, &NamespaceQuery::all("che")).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].names(), Some(&["settings".to_string()][..]));
        assert!(
            results[1]
                .error()
                .is_some_and(|e| e.starts_with("secrets is forbidden"))
        );
        assert_eq!(results[2].names(), Some(&["web-0".to_string()][..]));
    }

    #[tokio::test]
    async fn test_slow_first_kind_keeps_order() {
        let lister = FakeLister::default()
            .with(ResourceKind::ConfigMap, &["slow"])
            .with(ResourceKind::Secret, &["fast"])
            .with(ResourceKind::Pod, &["faster"])
            .delay(ResourceKind::ConfigMap, 50)
            .delay(ResourceKind::Secret, 10);

        let results = aggregate(&lister, &NamespaceQuery::all("default")).await;

        assert_eq!(kinds(&results), ResourceKind::ALL.to_vec());
        assert_eq!(results[0].names(), Some(&["slow".to_string()][..]));
    }

    #[tokio::test]
    async fn test_names_keep_server_order() {
        let lister =
            FakeLister::default().with(ResourceKind::Pod, &["zeta", "alpha", "mid"]);

        let results =
            aggregate(&lister, &NamespaceQuery::new("default", [ResourceKind::Pod])).await;

        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].outcome,
            ListOutcome::Listed(vec![
                "zeta".to_string(),
                "alpha".to_string(),
                "mid".to_string()
            ])
        );
    }

    #[tokio::test]
    async fn test_all_kinds_failing_still_reports_each() {
        let lister = FakeLister::default()
            .forbid(ResourceKind::ConfigMap)
            .forbid(ResourceKind::Secret)
            .forbid(ResourceKind::Pod);

        let results = aggregate(&lister, &NamespaceQuery::all("che")).await;

        assert_eq!(kinds(&results), ResourceKind::ALL.to_vec());
        assert!(results.iter().all(|r| !r.is_ok()));
    }
}
