//! Core types for the cosign coordination service.
//!
//! Proposals, their validated fields, the JSON records exchanged with
//! clients, and service configuration.

pub mod amount;
pub mod api;
pub mod config;
pub mod field;
pub mod proposal;

pub use amount::{Amount, AmountError};
pub use config::{Config, ConfigError, LogConfig, ServerConfig, StoreConfig};
pub use field::{Address, CallData, CallDescription, Signature, MIN_FIELD_LEN};
pub use proposal::{Proposal, ProposalDraft, ProposalState, QuorumHint, SequenceNumber};
