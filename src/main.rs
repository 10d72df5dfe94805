mod config;
mod server;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use kubepeek_k8s::{KubeClientFactory, ProcessEnv};

use config::{Args, ServerIdentity, ServerSettings};
use server::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run(args: Args) -> Result<()> {
    let settings = ServerSettings::load(&args)?;
    let identity = ServerIdentity::from_env(&ProcessEnv);

    info!(
        default_namespace = %settings.default_namespace,
        kinds = ?settings.kinds,
        template = ?settings.template,
        pod = identity.pod_name.as_deref().unwrap_or("-"),
        "Starting kubepeek"
    );

    let state = AppState::new(
        settings,
        identity,
        Arc::new(ProcessEnv),
        Arc::new(KubeClientFactory),
    );

    server::serve(Arc::new(state)).await
}
