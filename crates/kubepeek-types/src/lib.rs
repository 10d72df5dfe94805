//! Shared types for kubepeek
//!
//! This crate contains the request-scoped data structures passed between the
//! credential, cluster and report layers.

use std::fmt;
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// Credentials
// ============================================================================

const BEARER_PREFIX: &str = "Bearer ";

/// Where the credential of a request came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialSource {
    /// Explicit `token` query or form parameter
    Parameter,
    /// `Authorization: Bearer <token>` header
    AuthorizationHeader,
    /// No usable token was supplied
    Anonymous,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Parameter => "parameter",
            Self::AuthorizationHeader => "authorization-header",
            Self::Anonymous => "anonymous",
        }
    }
}

/// Bearer token used to talk to the control plane on behalf of a caller.
///
/// The token is never printed; `Debug` only shows where it came from.
pub struct Credential {
    token: Option<SecretString>,
    source: CredentialSource,
}

impl Credential {
    pub fn anonymous() -> Self {
        Self {
            token: None,
            source: CredentialSource::Anonymous,
        }
    }

    /// Wrap a token; an empty token yields an anonymous credential
    pub fn bearer(token: &str, source: CredentialSource) -> Self {
        if token.is_empty() {
            return Self::anonymous();
        }
        Self {
            token: Some(SecretString::from(token.to_string())),
            source,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.token.is_none()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    /// The raw token, empty for anonymous requests
    pub fn expose(&self) -> &str {
        self.token
            .as_ref()
            .map(|t| t.expose_secret())
            .unwrap_or_default()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("source", &self.source)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Why a bearer token could not be read from an `Authorization` header
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no Authorization header found")]
    MissingHeader,
    #[error("no Authorization Bearer token found")]
    NotBearer,
}

/// Extract the token from an `Authorization` header value.
///
/// The scheme must be exactly `Bearer ` (case-sensitive, one space).
pub fn bearer_token_from_header(value: Option<&str>) -> Result<&str, CredentialError> {
    let value = match value {
        Some(v) if !v.is_empty() => v,
        _ => return Err(CredentialError::MissingHeader),
    };

    value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(CredentialError::NotBearer)
}

/// Resolve the credential for a request.
///
/// An explicit non-empty `token` parameter wins, then a well-formed bearer
/// header, then the anonymous credential. This never fails.
pub fn resolve_credential(explicit: Option<&str>, authorization: Option<&str>) -> Credential {
    if let Some(token) = explicit.filter(|t| !t.is_empty()) {
        return Credential::bearer(token, CredentialSource::Parameter);
    }

    match bearer_token_from_header(authorization) {
        Ok(token) if !token.is_empty() => {
            Credential::bearer(token, CredentialSource::AuthorizationHeader)
        }
        _ => Credential::anonymous(),
    }
}

// ============================================================================
// Resource Kinds
// ============================================================================

/// A category of namespaced cluster object that can be listed.
///
/// The declaration order is the order sections appear in a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
pub enum ResourceKind {
    ConfigMap,
    Secret,
    Pod,
}

impl ResourceKind {
    /// Every kind, in report order
    pub const ALL: [ResourceKind; 3] = [Self::ConfigMap, Self::Secret, Self::Pod];

    /// Section heading
    pub fn title(&self) -> &'static str {
        match self {
            Self::ConfigMap => "ConfigMaps",
            Self::Secret => "Secrets",
            Self::Pod => "Pods",
        }
    }

    /// Name used inside diagnostic lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::ConfigMap => "configMaps",
            Self::Secret => "secrets",
            Self::Pod => "pods",
        }
    }

    /// Resource plural as used by the API server
    pub fn plural(&self) -> &'static str {
        match self {
            Self::ConfigMap => "configmaps",
            Self::Secret => "secrets",
            Self::Pod => "pods",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.plural())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown resource kind '{0}' (expected configmaps, secrets or pods)")]
pub struct UnknownKind(pub String);

impl FromStr for ResourceKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "configmap" | "configmaps" | "cm" => Ok(Self::ConfigMap),
            "secret" | "secrets" => Ok(Self::Secret),
            "pod" | "pods" | "po" => Ok(Self::Pod),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

impl TryFrom<String> for ResourceKind {
    type Error = UnknownKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Namespace plus the kinds to list in it
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamespaceQuery {
    pub namespace: String,
    kinds: Vec<ResourceKind>,
}

impl NamespaceQuery {
    /// Kinds are put in report order and de-duplicated
    pub fn new(namespace: impl Into<String>, kinds: impl IntoIterator<Item = ResourceKind>) -> Self {
        let mut kinds: Vec<_> = kinds.into_iter().collect();
        kinds.sort();
        kinds.dedup();
        Self {
            namespace: namespace.into(),
            kinds,
        }
    }

    /// Query every known kind
    pub fn all(namespace: impl Into<String>) -> Self {
        Self::new(namespace, ResourceKind::ALL)
    }

    pub fn kinds(&self) -> &[ResourceKind] {
        &self.kinds
    }
}

// ============================================================================
// Results
// ============================================================================

/// Outcome of listing one kind
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListOutcome {
    /// Names in the order the control plane returned them
    Listed(Vec<String>),
    /// Why the list call failed
    Failed(String),
}

/// Result of listing a single kind in a namespace
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceListResult {
    pub kind: ResourceKind,
    pub outcome: ListOutcome,
}

impl ResourceListResult {
    pub fn listed(kind: ResourceKind, names: Vec<String>) -> Self {
        Self {
            kind,
            outcome: ListOutcome::Listed(names),
        }
    }

    pub fn failed(kind: ResourceKind, cause: impl Into<String>) -> Self {
        Self {
            kind,
            outcome: ListOutcome::Failed(cause.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ListOutcome::Listed(_))
    }

    pub fn names(&self) -> Option<&[String]> {
        match &self.outcome {
            ListOutcome::Listed(names) => Some(names),
            ListOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            ListOutcome::Listed(_) => None,
            ListOutcome::Failed(cause) => Some(cause),
        }
    }
}

// ============================================================================
// Report
// ============================================================================

/// Request and server details shown alongside the listings
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportMeta {
    pub namespace: String,
    pub path: String,
    /// Token typed into the form, echoed back so the page can be resubmitted
    pub form_token: String,
    pub pod_name: Option<String>,
    pub pod_namespace: Option<String>,
    pub bind: String,
}

/// Everything known about one request, rendered once then dropped.
///
/// Results can only be appended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    meta: ReportMeta,
    results: Vec<ResourceListResult>,
    headers: Vec<(String, String)>,
}

impl Report {
    pub fn new(meta: ReportMeta) -> Self {
        Self {
            meta,
            results: Vec::new(),
            headers: Vec::new(),
        }
    }

    /// Attach the request header dump
    pub fn with_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.headers = headers;
        self
    }

    pub fn push(&mut self, result: ResourceListResult) {
        self.results.push(result);
    }

    pub fn extend(&mut self, results: impl IntoIterator<Item = ResourceListResult>) {
        self.results.extend(results);
    }

    pub fn meta(&self) -> &ReportMeta {
        &self.meta
    }

    pub fn results(&self) -> &[ResourceListResult] {
        &self.results
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }
}
