//! Report building for kubepeek
//!
//! This crate fans list queries out over resource kinds, folds per-kind
//! failures into the report, and renders the result as HTML or plain text.

mod aggregate;
mod render;
mod sections;
mod template;

pub use aggregate::aggregate;
pub use render::{RenderError, RenderMode, Renderer, TemplateSource};
pub use sections::{SECTION_RULE, report_text, write_section};
pub use template::{TemplateContext, TemplateError, check_template, render_template};

// Re-export types used in our public API
pub use kubepeek_types::{ListOutcome, NamespaceQuery, Report, ReportMeta, ResourceListResult};
