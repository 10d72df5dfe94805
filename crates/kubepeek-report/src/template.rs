//! HTML templates.
//!
//! Templates use minijinja syntax. Every value is HTML-escaped and a
//! reference to an unknown variable fails the render.

use minijinja::{AutoEscape, Environment, UndefinedBehavior, context};

use kubepeek_types::Report;

pub use minijinja::Error as TemplateError;

/// Values available to a template
pub struct TemplateContext<'a> {
    pub report: &'a Report,
    /// Section text produced from the report's results
    pub output: &'a str,
}

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

/// Check that `source` is a well-formed template
pub fn check_template(source: &str) -> Result<(), TemplateError> {
    environment().template_from_str(source).map(|_| ())
}

/// Render `source` against the report
pub fn render_template(source: &str, ctx: &TemplateContext<'_>) -> Result<String, TemplateError> {
    let meta = ctx.report.meta();
    environment().render_str(
        source,
        context! {
            token => &meta.form_token,
            namespace => &meta.namespace,
            output => ctx.output,
            path => &meta.path,
            pod_name => meta.pod_name.clone().unwrap_or_default(),
            pod_namespace => meta.pod_namespace.clone().unwrap_or_default(),
            bind => &meta.bind,
            headers => ctx.report.headers(),
        },
    )
}
