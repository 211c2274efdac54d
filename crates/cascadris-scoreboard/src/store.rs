use std::{
    collections::BTreeSet,
    fs, io,
    path::{Path, PathBuf},
};

use cascadris_engine::{NewScore, RankedScore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum StoreError {
    #[display("failed to access score file {path}")]
    Io { path: String, source: io::Error },
    #[display("malformed score file {path}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
}

/// One submitted score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i32,
    pub submitted_at: DateTime<Utc>,
}

/// All submitted scores, optionally mirrored to a JSON file.
#[derive(Debug, Default)]
pub struct ScoreStore {
    entries: Vec<ScoreEntry>,
    data_file: Option<PathBuf>,
}

impl ScoreStore {
    /// A store that forgets everything when dropped.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a store backed by `path`, loading it if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries: Vec<ScoreEntry> = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|source| StoreError::Json {
                path: path.display().to_string(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => vec![],
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                });
            }
        };
        log::info!("loaded {} scores from {}", entries.len(), path.display());
        Ok(Self {
            entries,
            data_file: Some(path),
        })
    }

    #[must_use]
    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a score submitted now.
    pub fn insert(&mut self, score: NewScore) -> Result<(), StoreError> {
        self.insert_at(score, Utc::now())
    }

    pub fn insert_at(&mut self, score: NewScore, at: DateTime<Utc>) -> Result<(), StoreError> {
        self.entries.push(ScoreEntry {
            name: score.name,
            score: score.score,
            submitted_at: at,
        });
        self.save()
    }

    /// The ranking shown to players.
    ///
    /// Entries whose score is among the `limit` highest distinct scores, best
    /// first, ties in submission order. An entry's rank is one more than the
    /// number of entries scoring strictly higher, so tied entries share a
    /// rank and the next rank is skipped. At most `limit` rows are returned.
    #[must_use]
    pub fn top_scores(&self, limit: usize) -> Vec<RankedScore> {
        let distinct = self
            .entries
            .iter()
            .map(|e| e.score)
            .collect::<BTreeSet<_>>();
        let Some(&cutoff) = distinct.iter().rev().take(limit).last() else {
            return vec![];
        };

        let mut ranked = self
            .entries
            .iter()
            .filter(|e| e.score >= cutoff)
            .collect::<Vec<_>>();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });

        let mut rows = Vec::with_capacity(ranked.len().min(limit));
        for (i, entry) in ranked.iter().enumerate().take(limit) {
            let rank = match rows.last() {
                Some(RankedScore { score, rank, .. }) if *score == entry.score => *rank,
                _ => u32::try_from(i + 1).unwrap_or(u32::MAX),
            };
            rows.push(RankedScore {
                name: entry.name.clone(),
                score: entry.score,
                rank,
            });
        }
        rows
    }

    fn save(&self) -> Result<(), StoreError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        let json = serde_json::to_vec_pretty(&self.entries).map_err(|source| StoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
