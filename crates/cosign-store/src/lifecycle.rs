//! Lifecycle gate: proposals move from open to executed exactly once.

use crate::store::ProposalStore;
use cosign_errors::{Error, Result};
use cosign_log::info;
use cosign_types::{Proposal, ProposalState, SequenceNumber};

/// Check that a proposal in `from` may move to `to`.
///
/// `Executed` is terminal; the only legal edge is `Open -> Executed`.
pub fn transition(from: ProposalState, to: ProposalState) -> Result<ProposalState> {
    match (from, to) {
        (ProposalState::Open, ProposalState::Executed) => Ok(to),
        (ProposalState::Executed, _) => Err(Error::state("proposal has already been executed")),
        (ProposalState::Open, ProposalState::Open) => Err(Error::state("proposal is already open")),
    }
}

impl ProposalStore {
    /// Record that the proposal at `sequence_number` was executed on chain.
    ///
    /// Signature count is not checked here; quorum is the contract's concern.
    pub async fn mark_executed(&self, sequence_number: SequenceNumber) -> Result<Proposal> {
        let proposal = self
            .mutate(sequence_number, |proposal| {
                proposal.state = transition(proposal.state, ProposalState::Executed)?;
                Ok(())
            })
            .await?;

        info!(
            %sequence_number,
            signatures = proposal.signature_count(),
            "proposal marked executed"
        );
        Ok(proposal)
    }
}
