//! Toolchain discovery.
//!
//! Candidates are probed in order and the first available one wins. A
//! candidate is available when its program resolves and its version probe
//! exits 0.

use crate::config::ToolCandidate;
use crate::error::{HarnessError, HarnessResult};
use crate::registry::descriptor_for;
use async_trait::async_trait;
use nc_protocol::Language;
use std::process::Stdio;
use tokio::process::Command;

/// Decides whether a toolchain candidate can be used.
#[async_trait]
pub trait ToolProbe: Send + Sync {
    async fn is_available(&self, candidate: &ToolCandidate) -> bool;
}

/// Probes the real system: PATH lookup followed by a version command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

#[async_trait]
impl ToolProbe for SystemProbe {
    async fn is_available(&self, candidate: &ToolCandidate) -> bool {
        // which also accepts absolute paths such as /usr/bin/Rscript
        let Ok(program) = which::which(&candidate.program) else {
            return false;
        };

        match Command::new(program)
            .args(&candidate.probe_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
        {
            Ok(status) => status.success(),
            Err(_) => false,
        }
    }
}

/// Select the first available candidate.
///
/// # Errors
///
/// Returns `HarnessError::ToolNotFound`, carrying the install guidance of
/// `language`, when no candidate is available.
pub async fn resolve_toolchain(
    language: Language,
    candidates: &[ToolCandidate],
    probe: &dyn ToolProbe,
) -> HarnessResult<ToolCandidate> {
    for candidate in candidates {
        if probe.is_available(candidate).await {
            tracing::info!(
                language = %language,
                toolchain = %candidate,
                "selected toolchain"
            );
            return Ok(candidate.clone());
        }
        tracing::debug!(language = %language, toolchain = %candidate, "toolchain unavailable");
    }

    Err(HarnessError::ToolNotFound {
        language,
        tried: candidates.iter().map(ToString::to_string).collect(),
        guidance: descriptor_for(language).install_guidance,
    })
}
