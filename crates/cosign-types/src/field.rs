//! Validated string fields of a proposal.
//!
//! The coordination core never decodes addresses, call data or signatures;
//! it only checks their shape and compares them byte for byte.

use cosign_errors::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum length of address-like and call data fields
pub const MIN_FIELD_LEN: usize = 5;

fn check_token(field: &str, value: &str, min_len: usize) -> Result<(), Error> {
    if value.is_empty() {
        return Err(Error::validation(format!("{field} is required")));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(Error::validation(format!(
            "{field} must not contain whitespace"
        )));
    }
    if value.chars().count() < min_len {
        return Err(Error::validation(format!(
            "{field} must be at least {min_len} characters long"
        )));
    }
    Ok(())
}

macro_rules! opaque_field {
    ($(#[$meta:meta])* $name:ident, $label:literal, $min_len:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate and wrap a raw value
            pub fn parse(value: impl Into<String>) -> Result<Self, Error> {
                Self::parse_as($label, value)
            }

            /// Like [`Self::parse`], reporting failures under `field`
            pub fn parse_as(field: &str, value: impl Into<String>) -> Result<Self, Error> {
                let value = value.into();
                check_token(field, &value, $min_len)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

opaque_field!(
    /// Account or contract address, kept exactly as the client sent it
    Address,
    "address",
    MIN_FIELD_LEN
);

opaque_field!(
    /// Signer-provided signature over the proposal digest. Opaque, so any
    /// non-empty token is accepted.
    Signature,
    "signature",
    1
);

opaque_field!(
    /// Hex encoded call data for the eventual on-chain call
    CallData,
    "callDataSelector",
    MIN_FIELD_LEN
);

/// Informational description of the call, e.g. `addSigner(address)`
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CallDescription(String);

impl CallDescription {
    pub fn parse(value: impl Into<String>) -> Result<Self, Error> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(Error::validation("humanReadableCall is required"));
        }
        if value.chars().count() < MIN_FIELD_LEN {
            return Err(Error::validation(format!(
                "humanReadableCall must be at least {MIN_FIELD_LEN} characters long"
            )));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CallDescription {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CallDescription> for String {
    fn from(value: CallDescription) -> Self {
        value.0
    }
}

impl fmt::Display for CallDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
