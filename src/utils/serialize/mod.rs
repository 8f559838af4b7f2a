//! Byte codecs for everything that crosses a process boundary.
//!
//! Group elements only ever leave the process through these functions;
//! ciphertexts additionally compact their attribute names into `#index`
//! aliases with the name table travelling alongside, which keeps long
//! time-embedded attribute strings out of every component.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::AbeError;
use crate::utils::policy::pest::{map_leaves, parse, serialize_policy};

/// Opaque-bytes encoding for parameters, key bundles and registrations.
pub fn to_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, AbeError> {
    serde_json::to_vec(value).map_err(Into::into)
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, AbeError> {
    serde_json::from_slice(bytes).map_err(Into::into)
}

/// Implemented by ciphertexts whose attribute names can be substituted.
///
/// `attributes` reports every name in order of first occurrence (component
/// labels, conjunction lists and policy tokens alike); `rename` applies a
/// substitution to all of them, leaving the algebraic components untouched.
pub trait AttributeRename: Sized {
    fn attributes(&self) -> Vec<String>;
    fn rename<F: Fn(&str) -> String>(&self, f: &F) -> Self;
}

/// A ciphertext with its attribute names replaced by `#index` aliases and
/// the reverse table stored alongside.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct CiphertextEnvelope<C> {
    pub scheme: String,
    pub attributes: Vec<String>,
    pub body: C,
}

pub fn serialize_ciphertext<C>(scheme: &str, ciphertext: &C) -> Result<Vec<u8>, AbeError>
where
    C: AttributeRename + Serialize,
{
    let attributes = ciphertext.attributes();
    let index: HashMap<&str, usize> = attributes
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let body = ciphertext.rename(&|name| match index.get(name) {
        Some(i) => format!("#{}", i),
        None => name.to_string(),
    });
    to_bytes(&CiphertextEnvelope {
        scheme: scheme.to_string(),
        attributes,
        body,
    })
}

pub fn deserialize_ciphertext<C>(scheme: &str, bytes: &[u8]) -> Result<C, AbeError>
where
    C: AttributeRename + DeserializeOwned,
{
    let envelope: CiphertextEnvelope<C> = from_bytes(bytes)?;
    if envelope.scheme != scheme {
        return Err(AbeError::SchemeProtocol(format!(
            "expected a {} ciphertext, found {}",
            scheme, envelope.scheme
        )));
    }
    let table = envelope.attributes;
    Ok(envelope.body.rename(&|alias| resolve(alias, &table)))
}

fn resolve(alias: &str, table: &[String]) -> String {
    alias
        .strip_prefix('#')
        .and_then(|i| i.parse::<usize>().ok())
        .and_then(|i| table.get(i))
        .cloned()
        .unwrap_or_else(|| alias.to_string())
}

/// Applies an attribute substitution to the tokens of a policy string.
/// Policies stored in ciphertexts are well formed, so the fallback of
/// returning the input unchanged is never taken on the round-trip path.
pub fn rename_policy<F: Fn(&str) -> String>(policy: &str, f: &F) -> String {
    match parse(policy) {
        Ok(parsed) => serialize_policy(&map_leaves(&parsed, f)),
        Err(_) => policy.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    struct DemoCiphertext {
        policy: String,
        labels: Vec<String>,
    }

    impl AttributeRename for DemoCiphertext {
        fn attributes(&self) -> Vec<String> {
            self.labels.clone()
        }
        fn rename<F: Fn(&str) -> String>(&self, f: &F) -> Self {
            DemoCiphertext {
                policy: rename_policy(&self.policy, f),
                labels: self.labels.iter().map(|l| f(l)).collect(),
            }
        }
    }

    #[test]
    fn test_envelope_round_trip() {
        let ct = DemoCiphertext {
            policy: "1%A@X and 1%B@Y".to_string(),
            labels: vec!["1%A@X".to_string(), "1%B@Y".to_string()],
        };
        let bytes = serialize_ciphertext("demo", &ct).unwrap();
        let restored: DemoCiphertext = deserialize_ciphertext("demo", &bytes).unwrap();
        assert_eq!(restored, ct);
        // the alias table actually replaced the embedded names
        let envelope: CiphertextEnvelope<DemoCiphertext> = from_bytes(&bytes).unwrap();
        assert_eq!(envelope.body.labels, vec!["#0", "#1"]);
        assert_eq!(envelope.body.policy, "#0 and #1");
    }

    #[test]
    fn test_scheme_tag_is_checked() {
        let ct = DemoCiphertext {
            policy: "A@X".to_string(),
            labels: vec!["A@X".to_string()],
        };
        let bytes = serialize_ciphertext("demo", &ct).unwrap();
        let result: Result<DemoCiphertext, _> = deserialize_ciphertext("other", &bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_bytes_round_trip() {
        let value = vec!["x".to_string(), "y".to_string()];
        let restored: Vec<String> = from_bytes(&to_bytes(&value).unwrap()).unwrap();
        assert_eq!(restored, value);
    }
}
