//! Recording storage on the local filesystem
//!
//! Files land under `<root>/audio/recordings/` and are served back at
//! `/audio/recordings/<name>`.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Path, PathBuf};

/// URL prefix the audio directory is mounted at
pub const AUDIO_URL_PREFIX: &str = "/audio";

const RECORDINGS_DIR: &str = "recordings";

#[derive(Debug, Clone)]
pub struct AudioStore {
    root: PathBuf,
}

impl AudioStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `recordings/<unix_ms>-<7 random chars>.webm`
    fn new_recording_key() -> String {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(7)
            .map(|c| char::from(c).to_ascii_lowercase())
            .collect();
        format!(
            "{}/{}-{}.webm",
            RECORDINGS_DIR,
            admit_common::time::now_millis(),
            suffix
        )
    }

    /// Write a recording and return its public URL
    pub async fn save_recording(&self, bytes: &[u8]) -> std::io::Result<String> {
        let key = Self::new_recording_key();
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Stored recording");

        Ok(format!("{}/{}", AUDIO_URL_PREFIX, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_key_shape() {
        let key = AudioStore::new_recording_key();
        let name = key.strip_prefix("recordings/").unwrap();
        let stem = name.strip_suffix(".webm").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();

        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), 7);
        assert!(suffix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[tokio::test]
    async fn test_save_recording() {
        let dir = tempfile::tempdir().unwrap();
        let store = AudioStore::new(dir.path());

        let url = store.save_recording(b"webm-data").await.unwrap();
        assert!(url.starts_with("/audio/recordings/"));

        let relative = url.strip_prefix("/audio/").unwrap();
        let stored = std::fs::read(dir.path().join(relative)).unwrap();
        assert_eq!(stored, b"webm-data");
    }

    #[tokio::test]
    async fn test_save_into_unwritable_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let store = AudioStore::new(&file);
        assert!(store.save_recording(b"webm").await.is_err());
    }
}
