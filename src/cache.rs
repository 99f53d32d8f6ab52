//! On-disk cache of parsed documents.
//!
//! Entries live under a cache directory, one JSON file per (options, text) pair, named by
//! a SHA-256 of the parser options fingerprint and the source text. The file content is
//! the segment record format, so a hit decodes through the same path as any other
//! persisted document. Cache IO never fails a load: problems are logged and treated as a
//! miss.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::opts::Opts;
use crate::segments::ScriptDocument;

pub const DEFAULT_CACHE_DIR: &str = ".cache/prompter";

#[derive(Debug, Clone)]
pub struct DocumentCache {
    dir: PathBuf,
}

impl DocumentCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hex SHA-256 identifying a parse of `text` under `opts`.
    pub fn key(text: &str, opts: &Opts) -> String {
        let mut hasher = Sha256::new();
        hasher.update(opts.fingerprint().as_bytes());
        hasher.update([0u8]);
        hasher.update(text.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn load(&self, text: &str, opts: &Opts) -> Option<ScriptDocument> {
        let path = self.entry_path(&Self::key(text, opts));
        let data = fs::read_to_string(&path).ok()?;
        match ScriptDocument::from_json_str(&data) {
            Ok(doc) => {
                debug!(path = %path.display(), "document cache hit");
                Some(doc)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring unreadable cache entry");
                None
            }
        }
    }

    pub fn store(&self, text: &str, opts: &Opts, doc: &ScriptDocument) {
        let path = self.entry_path(&Self::key(text, opts));
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %err, "failed to create cache dir");
            return;
        }
        match serde_json::to_string(doc) {
            Ok(contents) => {
                if let Err(err) = fs::write(&path, contents) {
                    warn!(path = %path.display(), error = %err, "failed to write cache entry");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize document for cache"),
        }
    }
}

impl Default for DocumentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}
