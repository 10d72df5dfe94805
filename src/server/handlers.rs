use std::sync::Arc;

use axum::extract::rejection::RawFormRejection;
use axum::extract::{RawForm, State};
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderMap, Uri};
use axum::response::{IntoResponse, Response};
use tracing::{debug, info};

use kubepeek_k8s::ClusterConfigBuilder;
use kubepeek_report::{RenderMode, aggregate};
use kubepeek_types::{CredentialSource, NamespaceQuery, Report, ReportMeta, resolve_credential};

use super::AppState;
use super::error::AppError;
use super::params::{RequestParams, header_dump};

/// `GET|POST /`: the HTML report
pub async fn report_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    form: Result<RawForm, RawFormRejection>,
) -> Result<Response, AppError> {
    let params = RequestParams::from_parts(uri.query(), form)?;
    handle(&state, RenderMode::Templated, uri.path(), &headers, params).await
}

/// `GET|POST /query`: the same report as plain text
pub async fn report_raw(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
    form: Result<RawForm, RawFormRejection>,
) -> Result<Response, AppError> {
    let params = RequestParams::from_parts(uri.query(), form)?;
    handle(&state, RenderMode::Raw, uri.path(), &headers, params).await
}

/// Resolve the credential, build a client, list every kind and render.
///
/// Config and client failures end the request before any list call is made.
/// List failures are part of the report.
async fn handle(
    state: &AppState,
    mode: RenderMode,
    path: &str,
    headers: &HeaderMap,
    params: RequestParams,
) -> Result<Response, AppError> {
    let settings = &state.settings;
    let namespace = params
        .namespace
        .unwrap_or_else(|| settings.default_namespace.clone());

    let authorization = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let credential = resolve_credential(params.token.as_deref(), authorization);
    if credential.source() == CredentialSource::AuthorizationHeader {
        info!("Using bearer token from the authorization header.");
    }
    debug!(
        namespace = %namespace,
        credential = credential.source().as_str(),
        "Resolved credential"
    );

    // Only echo tokens the caller typed into the form
    let form_token = match credential.source() {
        CredentialSource::Parameter => credential.expose().to_string(),
        _ => String::new(),
    };

    let config = ClusterConfigBuilder::new(state.env.as_ref())
        .timeout(settings.request_timeout)
        .build(credential)?;
    let lister = state.clients.create(&config).await?;

    let query = NamespaceQuery::new(namespace, settings.kinds.iter().copied());
    let results = aggregate(lister.as_ref(), &query).await;
    drop(lister);

    let mut report = Report::new(ReportMeta {
        namespace: query.namespace,
        path: path.to_string(),
        form_token,
        pod_name: state.identity.pod_name.clone(),
        pod_namespace: state.identity.pod_namespace.clone(),
        bind: settings.bind.clone(),
    })
    .with_headers(header_dump(headers));
    report.extend(results);

    let body = state.renderer.render(&report, mode).await?;
    Ok(([(CONTENT_TYPE, mode.content_type())], body).into_response())
}
