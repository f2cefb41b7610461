//! Signature collection for open proposals.

use crate::store::ProposalStore;
use cosign_errors::{Error, Result};
use cosign_log::debug;
use cosign_types::{Proposal, SequenceNumber, Signature};

/// Prefix of the conflict message returned once a proposal is full
pub const SIGNATURE_LIMIT_REACHED: &str = "signature limit reached";

impl ProposalStore {
    /// Append `signature` to the open proposal at `sequence_number`.
    ///
    /// Signatures keep arrival order. The same signature twice is a conflict.
    /// A proposal already holding the configured cap is also a conflict, told
    /// apart by a "signature limit reached" message. Executed proposals accept
    /// nothing.
    pub async fn append_signature(
        &self,
        sequence_number: SequenceNumber,
        signature: &str,
    ) -> Result<Proposal> {
        let signature = Signature::parse(signature)?;
        let cap = self.limits.max_signatures_per_proposal;

        let proposal = self
            .mutate(sequence_number, |proposal| accept(proposal, signature, cap))
            .await?;

        debug!(
            %sequence_number,
            collected = proposal.signature_count(),
            "signature appended"
        );
        Ok(proposal)
    }
}

fn accept(proposal: &mut Proposal, signature: Signature, cap: usize) -> Result<()> {
    if proposal.state.is_terminal() {
        return Err(Error::state(format!(
            "proposal {} is {} and accepts no more signatures",
            proposal.sequence_number, proposal.state
        )));
    }
    if proposal.has_signature(&signature) {
        return Err(Error::conflict(format!(
            "signature already collected for proposal {}",
            proposal.sequence_number
        )));
    }
    if proposal.signatures.len() >= cap {
        return Err(Error::conflict(format!(
            "{SIGNATURE_LIMIT_REACHED}: proposal {} already holds {cap} signatures",
            proposal.sequence_number
        )));
    }

    proposal.signatures.push(signature);
    Ok(())
}
