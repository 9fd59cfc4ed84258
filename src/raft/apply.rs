//! Applying committed entries (spec §4.H). Deliberately the smallest
//! module in the core: the state machine itself is a non-goal, so all
//! this does is walk `last_applied` up to `commit_index` and hand each
//! entry to whatever callback the embedder registered.

use super::node::Node;

impl<C: Clone + std::fmt::Debug + Send + Sync> Node<C> {
    /// Advance-and-log policy (SPEC_FULL.md §11.5): `last_applied`
    /// always moves forward to `commit_index`, even when the
    /// callback errors on some entry. Skipping or retrying an index
    /// would let the state machine and the log disagree about what
    /// "applied" means; the failure is recorded (`status().last_apply_error`)
    /// and logged instead.
    pub(crate) fn run_applier(&mut self) {
        while self.volatile.last_applied < self.volatile.commit_index {
            let next = self.volatile.last_applied + 1;
            let entry = match self.log.get(next) {
                Some(e) => e.clone(),
                None => break,
            };

            if let Some(callback) = self.apply_callback.as_mut() {
                if let Err(err) = callback(&entry) {
                    tracing::error!(
                        node_id = %self.node_id,
                        index = next,
                        error = %err,
                        "apply callback failed; advancing anyway"
                    );
                    self.last_apply_error = Some(err);
                }
            }

            self.volatile.last_applied = next;
        }
    }
}
