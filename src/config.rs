//! Startup configuration: command line, optional TOML file, pod identity.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use kubepeek_k8s::EnvSource;
use kubepeek_report::TemplateSource;
use kubepeek_types::ResourceKind;

const DEFAULT_BIND: &str = ":8080";
const DEFAULT_NAMESPACE: &str = "default";

/// kubepeek - list the ConfigMaps, Secrets and Pods of a namespace over HTTP
#[derive(Parser, Debug, Default)]
#[command(name = "kubepeek")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to listen on (`:8080` listens on all interfaces)
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// TOML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Namespace queried when a request does not name one
    #[arg(long, value_name = "NAMESPACE")]
    pub default_namespace: Option<String>,

    /// HTML template file, re-read on every request (built-in template if omitted)
    #[arg(long, value_name = "FILE")]
    pub template: Option<PathBuf>,

    /// Timeout in seconds for each call to the API server
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Resource kinds to list, comma separated
    #[arg(long, value_delimiter = ',', value_name = "KINDS")]
    pub kinds: Option<Vec<ResourceKind>>,
}

/// Keys accepted in the configuration file
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub bind: Option<String>,
    pub default_namespace: Option<String>,
    pub template: Option<PathBuf>,
    pub request_timeout_secs: Option<u64>,
    pub kinds: Option<Vec<ResourceKind>>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("at least one resource kind must be listed")]
    NoKinds,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Process-wide server settings, fixed at startup
#[derive(Clone, Debug)]
pub struct ServerSettings {
    /// Bind address as configured, shown in reports
    pub bind: String,
    /// Address handed to the listener
    pub listen_addr: String,
    pub default_namespace: String,
    pub template: TemplateSource,
    pub request_timeout: Option<Duration>,
    pub kinds: Vec<ResourceKind>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            listen_addr: listen_addr(DEFAULT_BIND),
            default_namespace: DEFAULT_NAMESPACE.to_string(),
            template: TemplateSource::Builtin,
            request_timeout: None,
            kinds: ResourceKind::ALL.to_vec(),
        }
    }
}

impl ServerSettings {
    /// Read the config file named by `args`, if any, and apply flags on top
    pub fn load(args: &Args) -> Result<Self, SettingsError> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Flags win over the file, the file wins over built-in defaults
    pub fn merge(args: &Args, file: FileConfig) -> Result<Self, SettingsError> {
        let defaults = Self::default();

        let bind = args.bind.clone().or(file.bind).unwrap_or(defaults.bind);
        let kinds = args.kinds.clone().or(file.kinds).unwrap_or(defaults.kinds);
        if kinds.is_empty() {
            return Err(SettingsError::NoKinds);
        }

        Ok(Self {
            listen_addr: listen_addr(&bind),
            bind,
            default_namespace: args
                .default_namespace
                .clone()
                .or(file.default_namespace)
                .filter(|ns| !ns.is_empty())
                .unwrap_or(defaults.default_namespace),
            template: args
                .template
                .clone()
                .or(file.template)
                .map(TemplateSource::File)
                .unwrap_or(defaults.template),
            request_timeout: args
                .request_timeout
                .or(file.request_timeout_secs)
                .map(Duration::from_secs),
            kinds,
        })
    }
}

/// Turn a Go-style `:port` address into one a listener accepts
fn listen_addr(bind: &str) -> String {
    if bind.starts_with(':') {
        format!("0.0.0.0{}", bind)
    } else {
        bind.to_string()
    }
}

/// Identity of the pod this server runs in, for display only
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServerIdentity {
    pub pod_name: Option<String>,
    pub pod_namespace: Option<String>,
}

impl ServerIdentity {
    pub fn from_env(env: &dyn EnvSource) -> Self {
        let non_empty = |name: &str| env.var(name).filter(|v| !v.is_empty());
        Self {
            pod_name: non_empty("POD_NAME"),
            pod_namespace: non_empty("POD_NAMESPACE"),
        }
    }
}
