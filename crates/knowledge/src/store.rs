//! Knowledge base ownership and persistence.
//!
//! A [`KnowledgeBase`] pairs a [`FlatIndex`] with the chunk texts its rows
//! point at. The [`KnowledgeStore`] keeps the current generation in memory and
//! persists it as two co-located files, `faiss.index` and `chunks.json`, which
//! are always written and read as a pair.

use crate::types::KnowledgeStatus;
use crate::vector_index::{ChunkDigest, FlatIndex};
use docqa_core::{AppError, AppResult};
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// Binary vector index artifact.
pub const INDEX_FILE_NAME: &str = "faiss.index";

/// JSON array of chunk texts, in index order.
pub const CHUNKS_FILE_NAME: &str = "chunks.json";

/// An index and its chunk sequence, one immutable unit.
///
/// Row `i` of the index is the embedding of `chunks[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBase {
    index: FlatIndex,
    chunks: Vec<String>,
}

impl KnowledgeBase {
    /// Pair an index with its chunks, rejecting a count mismatch.
    pub fn new(index: FlatIndex, chunks: Vec<String>) -> AppResult<Self> {
        if index.len() != chunks.len() {
            return Err(AppError::Knowledge(format!(
                "Index holds {} vectors but there are {} chunks",
                index.len(),
                chunks.len()
            )));
        }
        Ok(Self { index, chunks })
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Owner of the storage directory and the in-memory generation.
#[derive(Debug)]
pub struct KnowledgeStore {
    dir: PathBuf,
    current: RwLock<Option<Arc<KnowledgeBase>>>,
    /// Serializes writers so the on-disk pair and `current` move together.
    persist_lock: Mutex<()>,
}

impl KnowledgeStore {
    /// Open a store, loading any persisted pair.
    ///
    /// Inconsistent or corrupt artifacts are logged and leave the store empty.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();

        let current = match Self::load(&dir) {
            Ok(Some(kb)) => {
                tracing::info!(
                    "Loaded knowledge base from {:?} ({} chunks)",
                    dir,
                    kb.len()
                );
                Some(Arc::new(kb))
            }
            Ok(None) => {
                tracing::info!("No persisted knowledge base in {:?}", dir);
                None
            }
            Err(e) => {
                tracing::warn!("Ignoring persisted knowledge base in {:?}: {}", dir, e);
                None
            }
        };

        Self {
            dir,
            current: RwLock::new(current),
            persist_lock: Mutex::new(()),
        }
    }

    /// Read the persisted pair from `dir`.
    ///
    /// Returns `Ok(None)` unless both files exist. Fails when the index does
    /// not decode, its header checksum does not match the chunk file, or the
    /// vector and chunk counts differ.
    pub fn load(dir: &Path) -> AppResult<Option<KnowledgeBase>> {
        let index_path = dir.join(INDEX_FILE_NAME);
        let chunks_path = dir.join(CHUNKS_FILE_NAME);

        match (index_path.exists(), chunks_path.exists()) {
            (true, true) => {}
            (false, false) => return Ok(None),
            (index_exists, _) => {
                tracing::warn!(
                    "Found only {} in {:?}; ignoring it",
                    if index_exists { INDEX_FILE_NAME } else { CHUNKS_FILE_NAME },
                    dir
                );
                return Ok(None);
            }
        }

        let index_bytes = fs::read(&index_path)?;
        let chunk_bytes = fs::read(&chunks_path)?;

        let (index, expected_digest) = FlatIndex::from_bytes(&index_bytes)?;
        if digest(&chunk_bytes) != expected_digest {
            return Err(AppError::Knowledge(format!(
                "{} does not match the checksum recorded in {}",
                CHUNKS_FILE_NAME, INDEX_FILE_NAME
            )));
        }

        let chunks: Vec<String> = serde_json::from_slice(&chunk_bytes)?;
        KnowledgeBase::new(index, chunks).map(Some)
    }

    /// Persist a knowledge base into `dir`.
    ///
    /// Both files are written under unique temporary names, flushed, then
    /// renamed over the final names (index first). The index header carries
    /// the SHA-256 of the chunk file, so a pair torn by a crash between the
    /// renames fails verification on load.
    pub fn save(dir: &Path, kb: &KnowledgeBase) -> AppResult<()> {
        fs::create_dir_all(dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to create storage directory {:?}: {}", dir, e))
        })?;

        let chunk_bytes = serde_json::to_vec(kb.chunks())?;
        let index_bytes = kb.index().to_bytes(&digest(&chunk_bytes));

        let index_tmp = write_temp(dir, INDEX_FILE_NAME, &index_bytes)?;
        let chunks_tmp = match write_temp(dir, CHUNKS_FILE_NAME, &chunk_bytes) {
            Ok(path) => path,
            Err(e) => {
                remove_quietly(&index_tmp);
                return Err(e);
            }
        };

        let renamed = fs::rename(&index_tmp, dir.join(INDEX_FILE_NAME))
            .and_then(|_| fs::rename(&chunks_tmp, dir.join(CHUNKS_FILE_NAME)));

        if let Err(e) = renamed {
            remove_quietly(&index_tmp);
            remove_quietly(&chunks_tmp);
            return Err(AppError::Knowledge(format!(
                "Failed to persist knowledge base in {:?}: {}",
                dir, e
            )));
        }

        tracing::debug!(
            "Persisted knowledge base to {:?} ({} chunks, {} index bytes)",
            dir,
            kb.len(),
            index_bytes.len()
        );

        Ok(())
    }

    /// Persist `kb`, then make it the current generation.
    ///
    /// A failed save leaves the current generation untouched. Concurrent
    /// replaces run one at a time; readers only wait for the pointer swap.
    pub fn replace(&self, kb: KnowledgeBase) -> AppResult<Arc<KnowledgeBase>> {
        let _writer = self.persist_lock.lock().map_err(|_| {
            AppError::Knowledge("Knowledge store writer lock poisoned".to_string())
        })?;

        Self::save(&self.dir, &kb)?;

        let kb = Arc::new(kb);
        let mut current = self
            .current
            .write()
            .map_err(|_| AppError::Knowledge("Knowledge store lock poisoned".to_string()))?;
        *current = Some(Arc::clone(&kb));
        drop(current);

        Ok(kb)
    }

    /// The current generation, if any.
    pub fn snapshot(&self) -> AppResult<Option<Arc<KnowledgeBase>>> {
        let current = self
            .current
            .read()
            .map_err(|_| AppError::Knowledge("Knowledge store lock poisoned".to_string()))?;
        Ok(current.clone())
    }

    pub fn status(&self) -> AppResult<KnowledgeStatus> {
        Ok(match self.snapshot()? {
            Some(kb) => KnowledgeStatus {
                has_index: true,
                chunks: kb.len(),
                dimensions: Some(kb.index().dimensions()),
            },
            None => KnowledgeStatus::default(),
        })
    }
}

fn digest(bytes: &[u8]) -> ChunkDigest {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(bytes));
    out
}

/// Write `bytes` to a uniquely named, flushed temporary file next to `final_name`.
fn write_temp(dir: &Path, final_name: &str, bytes: &[u8]) -> AppResult<PathBuf> {
    let path = dir.join(format!(".{}.{}.tmp", final_name, uuid::Uuid::new_v4()));

    let result = fs::File::create(&path).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });

    if let Err(e) = result {
        remove_quietly(&path);
        return Err(AppError::Knowledge(format!(
            "Failed to write {:?}: {}",
            path, e
        )));
    }

    Ok(path)
}

fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove temporary file {:?}: {}", path, e);
        }
    }
}
