//! Proposal data model

use crate::amount::Amount;
use crate::field::{Address, CallData, CallDescription, Signature};
use cosign_errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position of a proposal in the multisig contract's execution counter.
///
/// Supplied by the caller, who reads it from the contract; the service never
/// derives it from how many proposals it happens to hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SequenceNumber(u64);

impl SequenceNumber {
    pub const fn new(n: u64) -> Self {
        Self(n)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for SequenceNumber {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<SequenceNumber> for u64 {
    fn from(n: SequenceNumber) -> Self {
        n.0
    }
}

impl fmt::Display for SequenceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SequenceNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::validation(format!(
                "sequenceNumber must be a non-negative integer, got {s:?}"
            )));
        }
        s.parse::<u64>()
            .map(Self)
            .map_err(|_| Error::validation(format!("sequenceNumber out of range: {s}")))
    }
}

// Wallet front ends send the counter either as a JSON number or as a
// stringified number, so both are accepted.
impl<'de> Deserialize<'de> for SequenceNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer).map_err(|_| {
            serde::de::Error::custom("sequenceNumber must be a non-negative integer")
        })? {
            Repr::Number(n) => Ok(Self(n)),
            Repr::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Lifecycle state. `Open` is initial, `Executed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalState {
    Open,
    Executed,
}

impl ProposalState {
    pub fn is_terminal(self) -> bool {
        self == ProposalState::Executed
    }
}

impl fmt::Display for ProposalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalState::Open => f.write_str("open"),
            ProposalState::Executed => f.write_str("executed"),
        }
    }
}

/// A proposed on-chain call and the signatures collected for it so far.
///
/// `signatures` is kept in arrival order. Ordering by recovered signer, as
/// the contract requires, is done by whoever submits the transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub sequence_number: SequenceNumber,
    pub creator: Address,
    pub target: Address,
    pub human_readable_call: CallDescription,
    pub encoded_call_data: CallData,
    pub value: Amount,
    pub signatures: Vec<Signature>,
    pub state: ProposalState,
}

impl Proposal {
    /// Number of distinct signatures collected
    pub fn signature_count(&self) -> usize {
        self.signatures.len()
    }

    pub fn has_signature(&self, signature: &Signature) -> bool {
        self.signatures.iter().any(|s| s == signature)
    }

    /// Advisory comparison against a caller-supplied threshold
    pub fn quorum_hint(&self, required: u32) -> QuorumHint {
        QuorumHint::evaluate(required, self.signature_count())
    }
}

/// Unvalidated "propose" input, exactly as received from a client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProposalDraft {
    pub sequence_number: SequenceNumber,
    pub creator: String,
    pub target: String,
    pub human_readable_call: String,
    #[serde(alias = "encodedCallData")]
    pub call_data_selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    pub signature: String,
}

impl ProposalDraft {
    /// Check every field and build the open proposal carrying the creator's
    /// signature. A missing `value` means zero.
    pub fn validate(self) -> Result<Proposal, Error> {
        let creator = Address::parse_as("creator", self.creator)?;
        let target = Address::parse_as("target", self.target)?;
        let human_readable_call = CallDescription::parse(self.human_readable_call)?;
        let encoded_call_data = CallData::parse_as("callDataSelector", self.call_data_selector)?;
        let value = match self.value {
            Some(raw) => Amount::parse(&raw).map_err(|e| Error::validation(format!("value: {e}")))?,
            None => Amount::zero(),
        };
        let signature = Signature::parse(self.signature)?;

        Ok(Proposal {
            sequence_number: self.sequence_number,
            creator,
            target,
            human_readable_call,
            encoded_call_data,
            value,
            signatures: vec![signature],
            state: ProposalState::Open,
        })
    }
}

/// Comparison of collected signatures against a threshold the caller read
/// from the contract. Never used to gate anything inside the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuorumHint {
    pub required: u32,
    pub collected: usize,
    pub reached: bool,
}

impl QuorumHint {
    pub fn evaluate(required: u32, collected: usize) -> Self {
        Self {
            required,
            collected,
            reached: collected >= required as usize,
        }
    }
}
