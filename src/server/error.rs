use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use kubepeek_k8s::{ClientError, ConfigError};
use kubepeek_report::RenderError;

use super::params::ParamsError;

/// Errors that abort a request before a report can be written
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Params(#[from] ParamsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, format!("{}\n", self)).into_response()
    }
}
