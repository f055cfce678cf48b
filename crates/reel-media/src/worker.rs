//! Isolated render worker.
//!
//! The encode/mux step runs in a throwaway child process so that any
//! memory retained by the codec tooling is reclaimed when the process
//! exits, whatever the outcome. The parent blocks on the child and
//! learns the result only through a file written next to the manifest;
//! no other state crosses the boundary.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};
use crate::render::{render_film, RenderManifest, RenderReport};

/// Argument that routes a process into [`worker_entry`].
pub const RENDER_WORKER_ARG: &str = "render-worker";

const MANIFEST_FILE: &str = "render_manifest.json";
const RESULT_FILE: &str = "render_result.json";

/// Outcome written by the worker for the parent to read.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
enum WorkerOutcome {
    Success { report: RenderReport },
    NoValidClips,
    Failure { message: String },
}

fn result_path(work_dir: &Path) -> PathBuf {
    work_dir.join(RESULT_FILE)
}

/// Run the render step in an isolated child process.
///
/// Serializes the manifest into the scoped work dir, re-invokes the
/// current executable with the worker argument, waits for it, then
/// reads the outcome file.
pub async fn render_isolated(manifest: &RenderManifest) -> MediaResult<RenderReport> {
    let manifest_path = manifest.work_dir.join(MANIFEST_FILE);
    tokio::fs::write(&manifest_path, serde_json::to_vec(manifest)?).await?;

    let exe = std::env::current_exe()?;
    debug!(
        worker = %exe.display(),
        manifest = %manifest_path.display(),
        "Spawning isolated render worker"
    );

    let output = Command::new(exe)
        .arg(RENDER_WORKER_ARG)
        .arg(&manifest_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let outcome_bytes = match tokio::fs::read(result_path(&manifest.work_dir)).await {
        Ok(bytes) => bytes,
        Err(_) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Render worker left no result file: {}", stderr.trim());
            return Err(MediaError::worker_failed(format!(
                "worker exited with {:?} and no result",
                output.status.code()
            )));
        }
    };

    match serde_json::from_slice::<WorkerOutcome>(&outcome_bytes)? {
        WorkerOutcome::Success { report } => Ok(report),
        WorkerOutcome::NoValidClips => Err(MediaError::NoValidClips),
        WorkerOutcome::Failure { message } => Err(MediaError::worker_failed(message)),
    }
}

/// Child-process entry point.
///
/// Reads the manifest, renders, and writes the outcome file. Always
/// exits cleanly when the outcome could be recorded; render failures
/// travel through the outcome, not the exit code.
pub async fn worker_entry(manifest_path: &Path) -> MediaResult<()> {
    let manifest: RenderManifest =
        serde_json::from_slice(&tokio::fs::read(manifest_path).await?)?;

    let outcome = match render_film(&manifest).await {
        Ok(report) => WorkerOutcome::Success { report },
        Err(MediaError::NoValidClips) => WorkerOutcome::NoValidClips,
        Err(e) => WorkerOutcome::Failure {
            message: e.to_string(),
        },
    };

    tokio::fs::write(
        result_path(&manifest.work_dir),
        serde_json::to_vec(&outcome)?,
    )
    .await?;

    Ok(())
}
