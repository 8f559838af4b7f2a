//! Time period embedding.
//!
//! Schemes without a dedicated revocation protocol scope keys to a period by
//! treating `"{period}%{attribute}"` as a distinct attribute: a key issued
//! for period 1 never satisfies a policy encrypted for period 2.
use crate::error::AbeError;
use crate::utils::policy::pest::{map_leaves, parse, serialize_policy};

/// `embed_attribute("STUDENT@UT", 2)` is `"2%STUDENT@UT"`.
pub fn embed_attribute(attribute: &str, period: u64) -> String {
    format!("{}%{}", period, attribute)
}

/// Splits a time embedded attribute back into `(period, attribute)`.
pub fn strip_attribute(timed: &str) -> Result<(u64, String), AbeError> {
    match timed.split_once('%') {
        Some((period, attribute)) if !attribute.is_empty() => match period.parse::<u64>() {
            Ok(period) => Ok((period, attribute.to_string())),
            Err(_) => Err(AbeError::SchemeProtocol(format!(
                "attribute {} carries no numeric time period",
                timed
            ))),
        },
        _ => Err(AbeError::SchemeProtocol(format!(
            "attribute {} carries no time period",
            timed
        ))),
    }
}

/// Embeds the period into every attribute of a policy, preserving the
/// boolean structure.
pub fn embed_policy(policy: &str, period: u64) -> Result<String, AbeError> {
    let parsed = parse(policy)?;
    let embedded = map_leaves(&parsed, &|name| embed_attribute(name, period));
    Ok(serialize_policy(&embedded))
}
