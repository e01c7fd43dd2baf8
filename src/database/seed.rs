use std::path::Path;

use tracing::instrument;

use crate::error::QuizError;

use super::{
    connection::{ReloadSummary, ReloadVocabulary},
    vocabulary::SeedEntry,
};

/// Parses a seed document: a JSON array of `{"latin": .., "translation": ..}` records.
pub fn parse_seed(raw: &str) -> Result<Vec<SeedEntry>, QuizError> {
    serde_json::from_str(raw).map_err(|e| QuizError::MalformedSeed(e.to_string()))
}

#[instrument(level = "debug")]
pub async fn load_seed(path: &Path) -> Result<Vec<SeedEntry>, QuizError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| QuizError::MalformedSeed(format!("{}: {}", path.display(), e)))?;

    let entries = parse_seed(&raw)?;
    tracing::debug!("Read {} seed entries from {}", entries.len(), path.display());

    Ok(entries)
}

/// Rebuilds the store from the seed file. An unreadable or malformed seed is
/// logged and leaves the store empty; only store failures are returned.
#[instrument(level = "info", skip(store))]
pub async fn reload_from_seed_file<Store: ReloadVocabulary>(
    store: &Store,
    path: &Path,
) -> Result<ReloadSummary, QuizError> {
    let seed = match load_seed(path).await {
        Ok(seed) => seed,
        Err(e) => {
            tracing::error!("Failed to load the seed: {}", e);
            Vec::new()
        }
    };

    let summary = store.reload(&seed).await?;
    tracing::info!(
        "Loaded {} words, skipped {} duplicates",
        summary.inserted,
        summary.skipped
    );

    Ok(summary)
}
