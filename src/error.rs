use std::fmt::{Display, Formatter, Result as FmtResult};

use pest::error::{Error as PestError, LineColLocation};

use crate::utils::policy::pest::human::Rule;

/// Crate wide error type.
///
/// `PolicyNotSatisfied` is deliberately a unit variant: a failed decryption
/// must not reveal whether keys were missing, revoked or issued for another
/// time period.
#[derive(Clone, PartialEq, Debug)]
pub enum AbeError {
    /// Malformed policy string.
    PolicyParse(String),
    /// The supplied keys cannot reconstruct the encrypted value.
    PolicyNotSatisfied,
    /// Internal invariant violation, e.g. a malformed ciphertext or an
    /// attribute outside of every authority namespace. A bug signal, not a
    /// normal control flow outcome.
    SchemeProtocol(String),
    /// Operation invoked before the required setup step.
    Uninitialized(&'static str),
    /// `central_setup` invoked on an already initialized central authority.
    AlreadyInitialized,
    /// AES-GCM failure in the hybrid layer.
    SymmetricCrypto(String),
    /// Byte codec failure.
    Serialization(String),
}

impl Display for AbeError {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            AbeError::PolicyParse(msg) => write!(f, "policy parse error: {}", msg),
            AbeError::PolicyNotSatisfied => write!(f, "policy not satisfied"),
            AbeError::SchemeProtocol(msg) => write!(f, "scheme protocol error: {}", msg),
            AbeError::Uninitialized(what) => write!(f, "{} has not been set up", what),
            AbeError::AlreadyInitialized => write!(f, "central authority is already set up"),
            AbeError::SymmetricCrypto(msg) => write!(f, "symmetric encryption error: {}", msg),
            AbeError::Serialization(msg) => write!(f, "serialization error: {}", msg),
        }
    }
}

impl std::error::Error for AbeError {}

impl From<PestError<Rule>> for AbeError {
    fn from(error: PestError<Rule>) -> Self {
        let line = match error.line_col {
            LineColLocation::Pos((line, _)) => line,
            LineColLocation::Span((start, _), (end, _)) => std::cmp::max(start, end),
        };
        AbeError::PolicyParse(format!("invalid boolean formula in line {}", line))
    }
}

impl From<rabe_bn::FieldError> for AbeError {
    fn from(error: rabe_bn::FieldError) -> Self {
        match error {
            rabe_bn::FieldError::InvalidSliceLength => {
                AbeError::SchemeProtocol("FieldError::InvalidSliceLength".to_string())
            }
            rabe_bn::FieldError::InvalidU512Encoding => {
                AbeError::SchemeProtocol("FieldError::InvalidU512Encoding".to_string())
            }
            rabe_bn::FieldError::NotMember => {
                AbeError::SchemeProtocol("FieldError::NotMember".to_string())
            }
        }
    }
}

impl From<aes_gcm::Error> for AbeError {
    fn from(_error: aes_gcm::Error) -> Self {
        // aead errors are intentionally opaque, there is no more information in here
        AbeError::SymmetricCrypto("aead failure".to_string())
    }
}

impl From<serde_json::Error> for AbeError {
    fn from(error: serde_json::Error) -> Self {
        AbeError::Serialization(error.to_string())
    }
}
