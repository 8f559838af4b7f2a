use rabe_bn::Fr;
use sha3::{Digest, Sha3_256};
use std::ops::Mul;

use crate::error::AbeError;

/// Hashes a string onto G1 or G2 using base `g`.
pub fn sha3_hash<T: Mul<Fr, Output = T>>(g: T, data: &str) -> Result<T, AbeError> {
    let mut hasher = Sha3_256::new();
    hasher.update(data.as_bytes());
    match Fr::from_slice(&hasher.finalize()) {
        Ok(fr) => Ok(g * fr),
        Err(e) => Err(e.into()),
    }
}

/// Hashes a string onto the scalar field.
pub fn sha3_hash_fr(data: &str) -> Result<Fr, AbeError> {
    let mut hasher = Sha3_256::new();
    hasher.update(data.as_bytes());
    match Fr::from_slice(&hasher.finalize()) {
        Ok(fr) => Ok(fr),
        Err(e) => Err(e.into()),
    }
}
