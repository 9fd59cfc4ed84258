//! Persistent state (spec §4.B): `current_term`, `voted_for`, and the
//! log, behind a durability contract the core enforces by always
//! calling `save` before any of the three durability-gated actions
//! (grant a vote, ack an `AppendEntries` success, bump `current_term`)
//! — never by the storage medium itself, which is a collaborator
//! (spec §1).
//!
//! The core only depends on the `PersistentStore` trait; the two
//! implementations here (`InMemoryStore`, `FileStore`) are reference
//! collaborators, not part of the protocol.

use std::path::{Path, PathBuf};

use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::log::{LogEntry, Term};
use crate::common::NodeId;
use crate::error::{RaftError, Result};

/// Everything that must be durable before the corresponding reply or
/// term bump is visible externally (spec §3, P1–P3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistentRecord<C> {
    pub current_term: Term,
    pub voted_for: Option<NodeId>,
    pub log: Vec<LogEntry<C>>,
}

impl<C> Default for PersistentRecord<C> {
    fn default() -> Self {
        Self {
            current_term: 0,
            voted_for: None,
            log: Vec::new(),
        }
    }
}

/// Durability contract consumed by `Node`. `save` must complete (i.e.
/// return) before the caller relies on the change; implementations
/// may batch internally as long as that ordering holds.
pub trait PersistentStore<C>: std::fmt::Debug + Send + Sync {
    fn save(&mut self, record: &PersistentRecord<C>) -> Result<()>;
    fn load(&mut self) -> Result<Option<PersistentRecord<C>>>;
}

/// Default store: durable only for the lifetime of the process. Used
/// when a real storage collaborator hasn't been wired in (e.g. tests,
/// the single-node demo).
#[derive(Debug, Default)]
pub struct InMemoryStore<C> {
    record: Option<PersistentRecord<C>>,
}

impl<C: Clone + std::fmt::Debug + Send + Sync> PersistentStore<C> for InMemoryStore<C> {
    fn save(&mut self, record: &PersistentRecord<C>) -> Result<()> {
        self.record = Some(record.clone());
        Ok(())
    }

    fn load(&mut self) -> Result<Option<PersistentRecord<C>>> {
        Ok(self.record.clone())
    }
}

/// JSON-on-disk store with atomic-rename writes: encode the whole
/// record to a sibling temp file, then rename it over the real path so
/// a crash mid-write never leaves a half-written record behind.
#[derive(Debug)]
pub struct FileStore<C> {
    path: PathBuf,
    _marker: std::marker::PhantomData<C>,
}

impl<C> FileStore<C> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _marker: std::marker::PhantomData,
        }
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone();
        tmp.set_extension("tmp");
        tmp
    }
}

impl<C> PersistentStore<C> for FileStore<C>
where
    C: Clone + std::fmt::Debug + Send + Sync + Serialize + DeserializeOwned,
{
    fn save(&mut self, record: &PersistentRecord<C>) -> Result<()> {
        let tmp = self.tmp_path();
        let bytes = serde_json::to_vec(record)
            .map_err(|e| RaftError::Persistence(format!("encode failed: {e}")))?;
        std::fs::write(&tmp, bytes)
            .map_err(|e| RaftError::Persistence(format!("write failed: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| RaftError::Persistence(format!("rename failed: {e}")))?;
        Ok(())
    }

    fn load(&mut self) -> Result<Option<PersistentRecord<C>>> {
        if !Path::new(&self.path).exists() {
            return Ok(None);
        }
        let bytes = std::fs::read(&self.path)
            .map_err(|e| RaftError::Persistence(format!("read failed: {e}")))?;
        let record = serde_json::from_slice(&bytes)
            .map_err(|e| RaftError::Persistence(format!("decode failed: {e}")))?;
        Ok(Some(record))
    }
}

/// A store that fails every `save` call, for exercising the
/// persistence-failure error path (spec §7).
#[derive(Debug, Default)]
pub struct AlwaysFailStore;

impl<C: std::fmt::Debug + Send + Sync> PersistentStore<C> for AlwaysFailStore {
    fn save(&mut self, _record: &PersistentRecord<C>) -> Result<()> {
        Err(RaftError::Persistence("simulated durability failure".into()))
    }

    fn load(&mut self) -> Result<Option<PersistentRecord<C>>> {
        Ok(None)
    }
}
