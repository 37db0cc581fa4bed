use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::client::DocumentSource;
use crate::config::Config;
use crate::errors::UpdateError;
use crate::models::{PatchOutcome, RunReport, StageOutcome};
use crate::services::{generate_token, patch_document, persist_document, CookiePattern};
use crate::staging::{stage_if_dirty, Vcs};


pub const EXIT_STAGING_UNAVAILABLE: u8 = 8;

/// Fetch, patch, persist, stage. The first fatal error ends the run; staging problems never do.
pub async fn run_update(
    config: &Config,
    source: &dyn DocumentSource,
    vcs: &dyn Vcs,
    now: u64,
) -> Result<RunReport, UpdateError> {
    config.validate()?;
    let pattern = CookiePattern::new(&config.cookie_field)?;

    info!("Connecting to: {}", source.url());
    let mut document = source.fetch().await?;

    let token = generate_token(now, config.token_ttl_secs, &config.signature);
    let cookie = token.cookie_value(config.cookie_name.as_deref());
    let patch = patch_document(&mut document, &config.target_key, &pattern, &cookie)?;
    match patch {
        PatchOutcome::Replaced => info!(
            "Success: New cookie generated (Expires: {})",
            format_expiry(token.expires_at)
        ),
        PatchOutcome::NoMatch => warn!(
            "No \"{}\" field found inside '{}'; value left unchanged",
            config.cookie_field, config.target_key
        ),
    }

    persist_document(&document, &config.output_path)?;
    info!("File updated: {}", display_name(&config.output_path));

    let output_path = config
        .output_path
        .canonicalize()
        .unwrap_or_else(|_| config.output_path.clone());
    let stage = stage_if_dirty(vcs, &output_path).await;
    match &stage {
        StageOutcome::Staged => info!("Changes detected and staged for commit."),
        StageOutcome::Skipped => info!("No changes in data. Skipping Git staging."),
        StageOutcome::Unavailable(reason) => warn!("Git status check skipped: {}", reason),
    }

    Ok(RunReport {
        token,
        patch,
        output_path,
        stage,
    })
}

fn format_expiry(expires_at: u64) -> String {
    i64::try_from(expires_at)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map(|at| at.to_rfc3339())
        .unwrap_or_else(|| expires_at.to_string())
}

/// Process exit status for a fatal error. Zero is reserved for completed runs.
pub fn exit_code_for(err: &UpdateError) -> u8 {
    match err {
        UpdateError::Config(_) => 2,
        UpdateError::InvalidUri(_) | UpdateError::Network(_) | UpdateError::Timeout(_) => 3,
        UpdateError::Http { .. } => 4,
        UpdateError::Parse(_) => 5,
        UpdateError::MissingKey { .. } | UpdateError::NotAString { .. } => 6,
        UpdateError::Io { .. } => 7,
    }
}

pub fn exit_code_for_report(report: &RunReport, strict_staging: bool) -> u8 {
    match report.stage {
        StageOutcome::Unavailable(_) if strict_staging => EXIT_STAGING_UNAVAILABLE,
        _ => 0,
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
