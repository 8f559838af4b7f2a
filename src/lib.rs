//! Multi-authority attribute based encryption with time-period scoped keys
//! and attribute revocation.
//!
//! The crate provides four ciphertext-policy schemes behind one contract
//! ([`schemes::AbeScheme`]):
//! * [`schemes::rw15`] - large universe multi-authority CP-ABE
//! * [`schemes::mke08`] - decentralized DNF CP-ABE with period-bound attribute keys
//! * [`schemes::taac`] - temporal access control with binary-tree update keys
//! * [`schemes::ghw11`] - outsourced decryption on top of the rw15 core
//!
//! Policies are boolean formulas over `ATTRIBUTE@AUTHORITY` terms, e.g.
//! `"DOCTOR@HOSPITAL and (PATIENT@CLINIC or INSURER@FUND)"`. Every scheme
//! embeds the encryption time period into the attribute names of the policy,
//! so a key issued for one period never satisfies a policy encrypted for
//! another.
pub mod error;
pub mod schemes;
pub mod utils;

pub use crate::error::AbeError;
