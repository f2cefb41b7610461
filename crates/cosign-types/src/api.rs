//! Request and response records of the Coordination API.
//!
//! Shared by the server and the client so both sides agree on the wire shape.

use crate::proposal::{Proposal, QuorumHint};
use cosign_errors::{Error, ErrorKind};
use serde::{Deserialize, Serialize};

/// Body of an append-signature request
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppendSignatureRequest {
    pub signature: String,
}

/// Query string of a get-proposal request
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetProposalQuery {
    /// Threshold read from the contract, used only for the quorum hint
    pub required_signatures: Option<u32>,
}

/// A proposal, optionally annotated with a quorum hint
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    #[serde(flatten)]
    pub proposal: Proposal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum: Option<QuorumHint>,
}

impl From<Proposal> for ProposalResponse {
    fn from(proposal: Proposal) -> Self {
        Self {
            proposal,
            quorum: None,
        }
    }
}

/// All stored proposals, ordered by sequence number
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProposalsResponse {
    pub proposals: Vec<Proposal>,
    pub open: usize,
    pub executed: usize,
}

/// Confirmation of an administrative reset
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetResponse {
    pub reset: bool,
    /// Number of proposals dropped
    pub cleared: usize,
}

/// Error body returned with every non-2xx response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: ErrorKind,
    pub code: u16,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind(),
            code: err.code(),
        }
    }
}

/// Liveness response
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

/// Service status with store occupancy
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub open: usize,
    pub executed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proposal::{ProposalDraft, SequenceNumber};

    fn proposal() -> Proposal {
        ProposalDraft {
            sequence_number: SequenceNumber::new(0),
            creator: "0xAAAAAAAAAA".to_string(),
            target: "0xBBBBBBBBBB".to_string(),
            human_readable_call: "addSigner(address)".to_string(),
            call_data_selector: "0x7065cb48".to_string(),
            value: None,
            signature: "sigA".to_string(),
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_proposal_response_flattens() {
        let mut response = ProposalResponse::from(proposal());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["sequenceNumber"], 0);
        assert!(json.get("quorum").is_none());

        response.quorum = Some(response.proposal.quorum_hint(2));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["quorum"]["required"], 2);
        assert_eq!(json["quorum"]["collected"], 1);
        assert_eq!(json["quorum"]["reached"], false);

        let back: ProposalResponse = serde_json::from_value(json).unwrap();
        assert_eq!(back, response);
    }

    #[test]
    fn test_error_response_from_error() {
        let body = ErrorResponse::from(&Error::NotFound(9));
        assert_eq!(body.code, 404);
        assert_eq!(body.kind, ErrorKind::NotFound);
        assert!(body.error.contains('9'));
    }

    #[test]
    fn test_query_camel_case() {
        let q: GetProposalQuery =
            serde_json::from_value(serde_json::json!({ "requiredSignatures": 3 })).unwrap();
        assert_eq!(q.required_signatures, Some(3));
    }
}
