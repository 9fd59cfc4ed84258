//! Replicated log (spec §4.A). Append-only, 1-based indexing, with
//! index 0 treated as a sentinel of term 0 that is never materialized
//! (following `rusty_db`'s `RaftLog::term_at`, which special-cases
//! index 0 rather than storing a real entry for it).
//!
//! Snapshotting/compaction is an explicit non-goal (spec §1), so
//! unlike `rusty_db`'s `RaftLog` this type carries no `Snapshot` and no
//! `first_index` offset — the whole log lives in memory from index 1.

use serde::{Deserialize, Serialize};

use crate::error::{RaftError, Result};

pub type Term = u64;
pub type LogIndex = u64;

/// One entry in the replicated log. `term`/`index` are assigned by the
/// leader at append time and never change afterwards (§3, L3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry<C> {
    pub term: Term,
    pub index: LogIndex,
    pub command: C,
}

impl<C> LogEntry<C> {
    pub fn new(term: Term, index: LogIndex, command: C) -> Self {
        Self {
            term,
            index,
            command,
        }
    }
}

/// The replicated log itself. Guarantees L1–L4 (spec §3) by
/// construction: every public mutator either preserves contiguity and
/// term-monotonicity or returns an error before touching storage.
#[derive(Debug, Clone, Default)]
pub struct Log<C> {
    /// `entries[k]` holds the entry at index `k + 1`; there is no
    /// stored entry for the sentinel index 0.
    entries: Vec<LogEntry<C>>,
}

impl<C: Clone> Log<C> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn last_index(&self) -> LogIndex {
        self.entries.last().map(|e| e.index).unwrap_or(0)
    }

    pub fn last_term(&self) -> Term {
        self.entries.last().map(|e| e.term).unwrap_or(0)
    }

    /// `Some(0)` for the sentinel, `Some(term)` for a real entry,
    /// `None` if `index` is beyond `last_index()` (spec: "fails if `i
    /// > last_index`" — represented as `None` rather than panicking,
    /// since callers use the absence to drive the consistency check).
    pub fn term_at(&self, index: LogIndex) -> Option<Term> {
        if index == 0 {
            return Some(0);
        }
        self.get(index).map(|e| e.term)
    }

    pub fn get(&self, index: LogIndex) -> Option<&LogEntry<C>> {
        if index == 0 || index > self.last_index() {
            return None;
        }
        self.entries.get((index - 1) as usize)
    }

    /// Appends one entry at `last_index() + 1`. Errors (does not
    /// panic) on a non-contiguous index — this is an internal
    /// programming error in the caller, not a value a remote peer can
    /// trigger directly, so it surfaces as `RaftError::Log` for the
    /// caller to turn into a safety halt.
    pub fn append(&mut self, entry: LogEntry<C>) -> Result<()> {
        let expected = self.last_index() + 1;
        if entry.index != expected {
            return Err(RaftError::Log(format!(
                "non-contiguous append: expected index {expected}, got {}",
                entry.index
            )));
        }
        if entry.term < self.last_term() {
            return Err(RaftError::Log(format!(
                "term regression on append: last term {}, new entry term {}",
                self.last_term(),
                entry.term
            )));
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn append_all(&mut self, entries: impl IntoIterator<Item = LogEntry<C>>) -> Result<()> {
        for entry in entries {
            self.append(entry)?;
        }
        Ok(())
    }

    /// Removes entries with index `>= from`. Callers MUST check
    /// `from > commit_index` themselves (spec §4.F rule 5, §3); this
    /// type has no notion of `commit_index` so it cannot enforce that
    /// invariant on its own, but it refuses nonsensical indices.
    pub fn truncate_from(&mut self, from: LogIndex) -> Result<()> {
        if from == 0 {
            return Err(RaftError::Log("cannot truncate the sentinel".into()));
        }
        if from <= self.last_index() {
            self.entries.truncate((from - 1) as usize);
        }
        Ok(())
    }

    /// Entries with index `>= from_inclusive`, cloned for handoff to a
    /// transport collaborator.
    pub fn slice(&self, from_inclusive: LogIndex) -> Vec<LogEntry<C>> {
        if from_inclusive == 0 || from_inclusive > self.last_index() {
            return Vec::new();
        }
        self.entries[(from_inclusive - 1) as usize..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
