//! In-memory coordination core.
//!
//! [`ProposalStore`] owns every proposal. Signature collection and the
//! open/executed lifecycle are implemented on the store in [`collector`] and
//! [`lifecycle`], and all of them funnel mutations through one per-proposal
//! critical section.

pub mod collector;
pub mod lifecycle;
pub mod store;

pub use collector::SIGNATURE_LIMIT_REACHED;
pub use lifecycle::transition;
pub use store::{ProposalStore, StoreLimits, StoreSummary};
