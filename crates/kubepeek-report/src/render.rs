use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

use kubepeek_types::Report;

use crate::sections::report_text;
use crate::template::{TemplateContext, TemplateError, render_template};

const BUILTIN_TEMPLATE: &str = include_str!("../templates/index.html");

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("template: {0}")]
    Template(#[from] TemplateError),
}

/// Output format of a report
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// HTML page built from the template
    Templated,
    /// Section text only
    Raw,
}

impl RenderMode {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Templated => "text/html; charset=utf-8",
            Self::Raw => "text/plain; charset=utf-8",
        }
    }
}

/// Where the HTML template comes from
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TemplateSource {
    /// Template compiled into the binary
    #[default]
    Builtin,
    /// Template file, re-read on every render so edits apply without a restart
    File(PathBuf),
}

/// Turns a finished [`Report`] into a response body
#[derive(Clone, Debug, Default)]
pub struct Renderer {
    source: TemplateSource,
}

impl Renderer {
    pub fn new(source: TemplateSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }

    /// Render the whole document, or fail without producing any of it
    pub async fn render(&self, report: &Report, mode: RenderMode) -> Result<Vec<u8>, RenderError> {
        let output = report_text(report);

        match mode {
            RenderMode::Raw => Ok(output.into_bytes()),
            RenderMode::Templated => {
                let source = self.load_template().await?;
                let html = render_template(
                    &source,
                    &TemplateContext {
                        report,
                        output: &output,
                    },
                )?;
                Ok(html.into_bytes())
            }
        }
    }

    async fn load_template(&self) -> Result<String, RenderError> {
        match &self.source {
            TemplateSource::Builtin => Ok(BUILTIN_TEMPLATE.to_string()),
            TemplateSource::File(path) => {
                debug!(path = %path.display(), "Loading template");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| RenderError::Io {
                        path: path.clone(),
                        source,
                    })
            }
        }
    }
}
