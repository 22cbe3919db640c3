use std::{collections::BTreeSet, fs, io, path::PathBuf};

use thiserror::Error;

use crate::types::SignReference;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode learned letters: {0}")]
    Encode(#[from] serde_json::Error),
}

pub fn default_store_path() -> PathBuf {
    PathBuf::from("learned.json")
}

/// Letters the user has produced at least once, persisted as a JSON array
/// of labels. Insert-only; the file is rewritten wholesale on change.
#[derive(Debug)]
pub struct LearnedStore {
    path: PathBuf,
    labels: BTreeSet<String>,
}

impl LearnedStore {
    /// Read the store once at startup. A missing file is a fresh start; a
    /// corrupt one is treated as empty rather than failing the session.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let labels = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Vec<String>>(&text) {
                Ok(labels) => labels.into_iter().collect(),
                Err(err) => {
                    log::warn!(
                        "ignoring corrupt learned file {}: {err}",
                        path.display()
                    );
                    BTreeSet::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeSet::new(),
            Err(err) => {
                log::warn!("could not read learned file {}: {err}", path.display());
                BTreeSet::new()
            }
        };

        if !labels.is_empty() {
            log::info!(
                "loaded {} learned letter(s) from {}",
                labels.len(),
                path.display()
            );
        }

        Self { path, labels }
    }

    /// Keep only labels that appear in the reference table. The file can
    /// hold anything; the learned set only ever carries known letters.
    pub fn retain_known(&mut self, references: &[SignReference]) {
        let before = self.labels.len();
        self.labels
            .retain(|label| references.iter().any(|reference| reference.label == *label));
        let dropped = before - self.labels.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} unknown label(s) from the learned file");
        }
    }

    /// Record a success. Returns true only the first time a label is seen;
    /// the caller decides when to [`save`](Self::save).
    pub fn insert(&mut self, label: &str) -> bool {
        self.labels.insert(label.to_string())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    pub fn labels(&self) -> Vec<String> {
        self.labels.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Overwrite the file with the current labels, via a temp file renamed
    /// into place so a crash mid-write cannot corrupt the store.
    pub fn save(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string(&self.labels)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }
}
