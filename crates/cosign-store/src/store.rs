//! Authoritative in-memory collection of proposals.
//!
//! Proposals are keyed explicitly by sequence number. Each entry sits behind
//! its own lock so mutations of one sequence number serialize against each
//! other without blocking the rest of the store:
//!
//! - creation and reset take the map's write guard;
//! - mutations hold the map's read guard while taking the entry's write guard;
//! - reads clone a snapshot under the entry's read guard.
//!
//! Lock order is always map, then entry.

use cosign_errors::{Error, Result};
use cosign_log::{debug, warn};
use cosign_types::{Proposal, ProposalDraft, ProposalState, SequenceNumber, StoreConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

type Slot = Arc<RwLock<Proposal>>;

/// Limits enforced by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreLimits {
    /// Signatures a single proposal may accumulate
    pub max_signatures_per_proposal: usize,
}

impl Default for StoreLimits {
    fn default() -> Self {
        Self {
            max_signatures_per_proposal: 256,
        }
    }
}

impl From<&StoreConfig> for StoreLimits {
    fn from(config: &StoreConfig) -> Self {
        Self {
            max_signatures_per_proposal: config.max_signatures_per_proposal,
        }
    }
}

/// Count of stored proposals per lifecycle state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub open: usize,
    pub executed: usize,
}

/// Keyed proposal collection shared by all request handlers
#[derive(Debug)]
pub struct ProposalStore {
    proposals: RwLock<BTreeMap<SequenceNumber, Slot>>,
    pub(crate) limits: StoreLimits,
}

impl Default for ProposalStore {
    fn default() -> Self {
        Self::new(StoreLimits::default())
    }
}

impl ProposalStore {
    pub fn new(limits: StoreLimits) -> Self {
        Self {
            proposals: RwLock::new(BTreeMap::new()),
            limits,
        }
    }

    pub fn limits(&self) -> StoreLimits {
        self.limits
    }

    /// Validate `draft` and store it as a new open proposal carrying the
    /// creator's signature.
    ///
    /// An existing open proposal at the same sequence number is a conflict and
    /// is left untouched. An executed one is never replaced.
    pub async fn create(&self, draft: ProposalDraft) -> Result<Proposal> {
        let proposal = draft.validate()?;
        let sequence_number = proposal.sequence_number;

        let mut proposals = self.proposals.write().await;
        if let Some(existing) = proposals.get(&sequence_number) {
            let state = existing.read().await.state;
            debug!(%sequence_number, %state, "rejected duplicate proposal");
            return Err(match state {
                ProposalState::Open => Error::conflict(format!(
                    "an open proposal already exists for sequence number {sequence_number}"
                )),
                ProposalState::Executed => Error::state(format!(
                    "sequence number {sequence_number} has already been executed"
                )),
            });
        }

        proposals.insert(sequence_number, Arc::new(RwLock::new(proposal.clone())));
        debug!(%sequence_number, creator = %proposal.creator, "proposal created");

        Ok(proposal)
    }

    /// Snapshot of the proposal stored under `sequence_number`
    pub async fn get(&self, sequence_number: SequenceNumber) -> Result<Proposal> {
        let proposals = self.proposals.read().await;
        let slot = proposals
            .get(&sequence_number)
            .ok_or(Error::NotFound(sequence_number.value()))?;
        let proposal = slot.read().await.clone();
        Ok(proposal)
    }

    /// Snapshots of all proposals, ordered by sequence number
    pub async fn list(&self) -> Vec<Proposal> {
        let proposals = self.proposals.read().await;
        let mut out = Vec::with_capacity(proposals.len());
        for slot in proposals.values() {
            out.push(slot.read().await.clone());
        }
        out
    }

    pub async fn summary(&self) -> StoreSummary {
        let proposals = self.proposals.read().await;
        let mut summary = StoreSummary::default();
        for slot in proposals.values() {
            match slot.read().await.state {
                ProposalState::Open => summary.open += 1,
                ProposalState::Executed => summary.executed += 1,
            }
        }
        summary
    }

    pub async fn len(&self) -> usize {
        self.proposals.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.proposals.read().await.is_empty()
    }

    /// Drop every proposal. Administrative only; returns how many were dropped.
    pub async fn reset(&self) -> usize {
        let mut proposals = self.proposals.write().await;
        let cleared = proposals.len();
        proposals.clear();
        warn!(cleared, "proposal store reset");
        cleared
    }

    /// The single path through which stored proposals change.
    ///
    /// `apply` runs on a copy while the entry is write-locked; the copy
    /// replaces the stored proposal only if `apply` succeeds, so a rejected
    /// mutation leaves no trace.
    pub(crate) async fn mutate<F>(&self, sequence_number: SequenceNumber, apply: F) -> Result<Proposal>
    where
        F: FnOnce(&mut Proposal) -> Result<()>,
    {
        let proposals = self.proposals.read().await;
        let slot = proposals
            .get(&sequence_number)
            .ok_or(Error::NotFound(sequence_number.value()))?;

        let mut stored = slot.write().await;
        let mut next = stored.clone();
        if let Err(err) = apply(&mut next) {
            debug!(%sequence_number, kind = %err.kind(), "mutation rejected");
            return Err(err);
        }
        *stored = next;

        Ok(stored.clone())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use cosign_errors::ErrorKind;

    pub(crate) fn draft(seq: u64, signature: &str) -> ProposalDraft {
        ProposalDraft {
            sequence_number: SequenceNumber::new(seq),
            creator: "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA".to_string(),
            target: "0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB".to_string(),
            human_readable_call: "addSigner(address)".to_string(),
            call_data_selector: "0x7065cb48000000000000000000000000cccccccc".to_string(),
            value: Some("0".to_string()),
            signature: signature.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = ProposalStore::default();
        let created = store.create(draft(0, "sigA")).await.unwrap();
        assert_eq!(created.state, ProposalState::Open);
        assert_eq!(created.signatures.len(), 1);

        let fetched = store.get(SequenceNumber::new(0)).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_unknown_is_not_found() {
        let store = ProposalStore::default();
        let err = store.get(SequenceNumber::new(42)).await.unwrap_err();
        assert_eq!(err, Error::NotFound(42));
    }

    #[tokio::test]
    async fn test_create_validates_before_storing() {
        let store = ProposalStore::default();
        let mut bad = draft(0, "sigA");
        bad.creator = "0x".to_string();
        let err = store.create(bad).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_duplicate_open_proposal_conflicts() {
        let store = ProposalStore::default();
        let original = store.create(draft(3, "sigA")).await.unwrap();

        let mut other = draft(3, "sigZ");
        other.human_readable_call = "removeSigner(address)".to_string();
        let err = store.create(other).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert_eq!(store.get(SequenceNumber::new(3)).await.unwrap(), original);
    }

    #[tokio::test]
    async fn test_keys_are_explicit_not_positional() {
        let store = ProposalStore::default();
        store.create(draft(7, "sigA")).await.unwrap();
        store.create(draft(2, "sigB")).await.unwrap();

        assert!(store.get(SequenceNumber::new(0)).await.is_err());
        let listed: Vec<u64> = store
            .list()
            .await
            .iter()
            .map(|p| p.sequence_number.value())
            .collect();
        assert_eq!(listed, vec![2, 7]);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let store = ProposalStore::default();
        for seq in 0..4 {
            store.create(draft(seq, "sigA")).await.unwrap();
        }
        assert_eq!(store.reset().await, 4);
        for seq in 0..4 {
            assert_eq!(
                store.get(SequenceNumber::new(seq)).await.unwrap_err(),
                Error::NotFound(seq)
            );
        }
        assert_eq!(store.summary().await, StoreSummary::default());

        // sequence numbers are free again after a reset
        assert!(store.create(draft(0, "sigA")).await.is_ok());
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_no_trace() {
        let store = ProposalStore::default();
        let before = store.create(draft(0, "sigA")).await.unwrap();

        let err = store
            .mutate(SequenceNumber::new(0), |p| {
                p.signatures.clear();
                Err(Error::state("refused"))
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::State);
        assert_eq!(store.get(SequenceNumber::new(0)).await.unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_create_has_single_winner() {
        let store = Arc::new(ProposalStore::default());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(draft(5, &format!("sig-{i}"))).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::Conflict),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}
