//! Pipeline binary.
//!
//! Reads a phase request from a JSON file and streams the resulting
//! chunks to stdout as JSON lines. Also hosts the hidden render-worker
//! entry that [`reel_media::render_isolated`] re-invokes.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reel_genai::{GenerationClient, HttpFetcher};
use reel_media::RENDER_WORKER_ARG;
use reel_pipeline::{
    run_film_phase, run_video_phase, ChunkSender, IsolatedRenderer, PipelineConfig,
    PipelineRequest,
};
use reel_storage::ArtifactStore;

#[tokio::main]
async fn main() -> ExitCode {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    // Hidden re-invocation: run the isolated render step and exit
    if args.get(1).map(String::as_str) == Some(RENDER_WORKER_ARG) {
        let Some(manifest_path) = args.get(2) else {
            error!("render-worker requires a manifest path");
            return ExitCode::FAILURE;
        };
        return match reel_media::worker_entry(Path::new(manifest_path)).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!("Render worker failed: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let Some(request_path) = args.get(1) else {
        eprintln!("usage: reel-pipeline <request.json>");
        return ExitCode::FAILURE;
    };

    match run(request_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("reel=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(request_path: &str) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(request_path)
        .await
        .with_context(|| format!("reading request file {}", request_path))?;
    let request: PipelineRequest = serde_json::from_str(&raw).context("parsing request")?;

    let config = PipelineConfig::from_env();

    let (sender, mut rx) = reel_pipeline::channel(32);

    // Render chunks as JSON lines while the phase runs
    let printer = tokio::spawn(async move {
        while let Some(chunk) = rx.recv().await {
            match serde_json::to_string(&chunk) {
                Ok(line) => println!("{}", line),
                Err(e) => error!("Failed to serialize chunk: {}", e),
            }
        }
    });

    let outcome = drive(request, &config, &sender).await;
    if let Err(e) = &outcome {
        sender.error(e.to_string()).await.ok();
    }

    drop(sender);
    printer.await.ok();

    outcome.map_err(Into::into)
}

async fn drive(
    request: PipelineRequest,
    config: &PipelineConfig,
    sender: &ChunkSender,
) -> reel_pipeline::PipelineResult<()> {
    let jobs = GenerationClient::from_env()?;

    match request {
        PipelineRequest::Video(req) => {
            info!(scenes = req.descriptions.len(), "Starting video phase");
            run_video_phase(&jobs, config, req, sender).await?;
        }
        PipelineRequest::Film(req) => {
            info!(scenes = req.tones.len(), run_id = %req.run_id, "Starting film phase");
            let fetcher = HttpFetcher::with_defaults()?;
            let store = ArtifactStore::from_env().await?;
            run_film_phase(
                &jobs,
                &fetcher,
                &store,
                &IsolatedRenderer,
                config,
                req,
                sender,
            )
            .await?;
        }
    }

    Ok(())
}
