//! Large universe multi-authority CP-ABE.
//!
//! * Rouselakis, Waters, "Efficient Statically-Secure Large-Universe
//!   Multi-Authority Attribute-Based Encryption"
//! * Published in Financial Cryptography and Data Security 2015
//! * Available from <https://eprint.iacr.org/2015/016>
//! * Type: encryption (attribute-based)
//! * Setting: bilinear groups (asymmetric)
//!
//! Attributes are large-universe: an authority fixes one `(alpha, y)` pair
//! at setup and issues keys for any `ATTR@NAME` string in its namespace,
//! hashed into the group on demand. Time periods are embedded into the
//! attribute names of keys and policies, so revocation is enforced by
//! simply not re-issuing a key in the next period.
//!
//! # Examples
//!
//! ```
//! use trabe::schemes::rw15::*;
//! use trabe::schemes::AbeScheme;
//!
//! let mut central = Rw15CentralAuthority::new();
//! central.central_setup().unwrap();
//! let gp = central.global_parameters().unwrap().clone();
//! let authority = Rw15Authority::setup(&central, "UT", vec!["STUDENT@UT".to_string()]).unwrap();
//! let registration = central.register_user("alice").unwrap();
//! let mut key = Rw15UserKey::new("alice");
//! key.update(authority.keygen("alice", &["STUDENT@UT".to_string()], 1).unwrap()).unwrap();
//! let pks = Rw15::merge_public_keys(&[authority.public_keys(1)], 1).unwrap();
//! let (ct, sym) = Rw15::encrypt_wrapped(&gp, &pks, b"ehr record", "STUDENT@UT", 1).unwrap();
//! let dk = Rw15::decryption_keys(&gp, &[&authority], &key, &registration, &ct, 1).unwrap();
//! assert_eq!(Rw15::decrypt_wrapped(&gp, &dk, "alice", &ct, &sym, &registration).unwrap(), b"ehr record");
//! ```
use rabe_bn::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::AbeError;
use crate::schemes::{AbeScheme, SchemeId};
use crate::utils::hash::sha3_hash;
use crate::utils::period::{embed_attribute, embed_policy, strip_attribute};
use crate::utils::policy::pest::{list_attributes, parse};
use crate::utils::revocation::RevocationList;
use crate::utils::secretsharing::{calc_coefficients, calc_pruned, gen_shares_policy};
use crate::utils::serialize::{rename_policy, AttributeRename};
use crate::utils::tools::authority_of;

/// Scheme marker, see [`crate::schemes::AbeScheme`].
pub struct Rw15;

/// Global parameters shared by all authorities of one deployment.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15GlobalParameters {
    pub g1: G1,
    pub g2: G2,
    pub e_gg: Gt,
}

/// Runs the one-time global setup and registers users.
pub struct Rw15CentralAuthority {
    params: Option<Rw15GlobalParameters>,
}

/// Per-user output of registration. rw15 needs no per-user binding data
/// beyond the gid itself.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15Registration {
    pub gid: String,
}

/// An authority's public key bundle, valid for every time period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15AuthorityPublicKey {
    pub name: String,
    pub attributes: Vec<String>,
    pub e_gg_alpha: Gt,
    pub g1_y: G1,
}

/// An authority's master secret.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15AuthoritySecretKey {
    pub alpha: Fr,
    pub y: Fr,
}

/// An attribute authority owning a disjoint attribute namespace.
///
/// Key material is eager: `(alpha, y)` is fixed at setup and
/// `public_keys(period)` is the same bundle for every period. Time enters
/// only through the attribute names hashed at keygen and encryption.
pub struct Rw15Authority {
    name: String,
    attributes: Vec<String>,
    gp: Rw15GlobalParameters,
    pk: Rw15AuthorityPublicKey,
    sk: Rw15AuthoritySecretKey,
    revocations: RevocationList,
}

/// Per-attribute key components issued to one user.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15AttributeKey {
    pub k: G2,
    pub k_prime: G1,
}

/// A user's merged secret key store, keyed by time embedded attribute name.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15UserKey {
    pub gid: String,
    pub keys: HashMap<String, Rw15AttributeKey>,
}

impl Rw15UserKey {
    pub fn new(gid: &str) -> Rw15UserKey {
        Rw15UserKey {
            gid: gid.to_string(),
            keys: HashMap::new(),
        }
    }

    /// Merges another authority's keygen output into this store. Additive:
    /// existing entries are kept, a partial key for another gid is refused.
    pub fn update(&mut self, partial: Rw15UserKey) -> Result<(), AbeError> {
        if partial.gid != self.gid {
            return Err(AbeError::SchemeProtocol(format!(
                "cannot merge keys of {} into key store of {}",
                partial.gid, self.gid
            )));
        }
        for (attribute, key) in partial.keys {
            self.keys.entry(attribute).or_insert(key);
        }
        Ok(())
    }

    pub fn attributes(&self) -> Vec<String> {
        self.keys.keys().cloned().collect()
    }
}

/// Merged encryption keys of all involved authorities, keyed by name.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15PublicKeys {
    pub authorities: HashMap<String, Rw15AuthorityPublicKey>,
}

/// Components bound to one leaf of the encryption policy.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15CiphertextAttribute {
    pub attribute: String,
    pub c1: Gt,
    pub c2: G1,
    pub c3: G1,
    pub c4: G2,
}

/// An rw15 ciphertext. `attributes` is ordered by the leaf pre-order of the
/// embedded policy; decryption pairs components with reconstruction
/// coefficients positionally.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Rw15Ciphertext {
    pub policy: String,
    pub period: u64,
    pub c0: Gt,
    pub attributes: Vec<Rw15CiphertextAttribute>,
}

impl Rw15CentralAuthority {
    pub fn new() -> Rw15CentralAuthority {
        Rw15CentralAuthority { params: None }
    }

    /// Samples the global parameters. A second call fails with
    /// [`AbeError::AlreadyInitialized`].
    pub fn central_setup(&mut self) -> Result<(), AbeError> {
        if self.params.is_some() {
            return Err(AbeError::AlreadyInitialized);
        }
        let mut rng = rand::thread_rng();
        let g1: G1 = rng.gen();
        let g2: G2 = rng.gen();
        self.params = Some(Rw15GlobalParameters {
            g1,
            g2,
            e_gg: pairing(g1, g2),
        });
        Ok(())
    }

    pub fn global_parameters(&self) -> Result<&Rw15GlobalParameters, AbeError> {
        self.params
            .as_ref()
            .ok_or(AbeError::Uninitialized("rw15 central authority"))
    }

    pub fn register_user(&self, gid: &str) -> Result<Rw15Registration, AbeError> {
        self.global_parameters()?;
        Ok(Rw15Registration {
            gid: gid.to_string(),
        })
    }
}

impl Default for Rw15CentralAuthority {
    fn default() -> Self {
        Rw15CentralAuthority::new()
    }
}

impl Rw15Authority {
    /// Binds the authority to the global parameters and its namespace and
    /// fixes its master key pair.
    pub fn setup(
        central: &Rw15CentralAuthority,
        name: &str,
        attributes: Vec<String>,
    ) -> Result<Rw15Authority, AbeError> {
        let gp = central.global_parameters()?.clone();
        validate_namespace(name, &attributes)?;
        let mut rng = rand::thread_rng();
        let alpha: Fr = rng.gen();
        let y: Fr = rng.gen();
        let pk = Rw15AuthorityPublicKey {
            name: name.to_string(),
            attributes: attributes.clone(),
            e_gg_alpha: gp.e_gg.pow(alpha),
            g1_y: gp.g1 * y,
        };
        Ok(Rw15Authority {
            name: name.to_string(),
            attributes,
            gp,
            pk,
            sk: Rw15AuthoritySecretKey { alpha, y },
            revocations: RevocationList::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_keys(&self, _period: u64) -> Rw15AuthorityPublicKey {
        self.pk.clone()
    }

    pub fn secret_keys(&self, _period: u64) -> Rw15AuthoritySecretKey {
        self.sk.clone()
    }

    /// Issues per-attribute keys for `gid` scoped to `period`. Attributes
    /// revoked for `(gid, period)` are filtered out before any derivation.
    pub fn keygen(
        &self,
        gid: &str,
        attributes: &[String],
        period: u64,
    ) -> Result<Rw15UserKey, AbeError> {
        for attribute in attributes {
            if !self.attributes.contains(attribute) {
                return Err(AbeError::SchemeProtocol(format!(
                    "attribute {} is not handled by authority {}",
                    attribute, self.name
                )));
            }
        }
        let granted = self.revocations.filter(gid, attributes, period);
        let mut rng = rand::thread_rng();
        let h_gid = sha3_hash(self.gp.g2, gid)?;
        let mut keys = HashMap::new();
        for attribute in granted {
            let timed = embed_attribute(&attribute, period);
            let f = sha3_hash(self.gp.g2, &timed)?;
            let r: Fr = rng.gen();
            keys.insert(
                timed,
                Rw15AttributeKey {
                    k: (self.gp.g2 * self.sk.alpha) + (h_gid * self.sk.y) + (f * r),
                    k_prime: self.gp.g1 * r,
                },
            );
        }
        Ok(Rw15UserKey {
            gid: gid.to_string(),
            keys,
        })
    }

    pub fn revoke(&self, gid: &str, attribute: &str, period: u64) {
        self.revocations.revoke(gid, attribute, period);
    }

    pub fn is_revoked(&self, gid: &str, attribute: &str, period: u64) -> bool {
        self.revocations.is_revoked(gid, attribute, period)
    }
}

pub(crate) fn validate_namespace(name: &str, attributes: &[String]) -> Result<(), AbeError> {
    for attribute in attributes {
        if attribute.contains('%') {
            return Err(AbeError::SchemeProtocol(format!(
                "attribute {} must not contain the period marker %",
                attribute
            )));
        }
        if authority_of(attribute)? != name {
            return Err(AbeError::SchemeProtocol(format!(
                "attribute {} does not belong to authority {}",
                attribute, name
            )));
        }
    }
    Ok(())
}

/// Encrypts a group element under `policy` for `period`.
pub fn encrypt(
    gp: &Rw15GlobalParameters,
    pks: &Rw15PublicKeys,
    msg: &Gt,
    policy: &str,
    period: u64,
) -> Result<Rw15Ciphertext, AbeError> {
    let timed_policy = embed_policy(policy, period)?;
    let pol = parse(&timed_policy)?;
    let mut rng = rand::thread_rng();
    let s: Fr = rng.gen();
    let s_shares = gen_shares_policy(s, &pol);
    let w_shares = gen_shares_policy(Fr::zero(), &pol);
    let mut attributes = Vec::with_capacity(s_shares.len());
    for (i, (timed, lambda)) in s_shares.iter().enumerate() {
        let (_, untimed) = strip_attribute(timed)?;
        let authority = authority_of(&untimed)?;
        let pk = pks.authorities.get(&authority).ok_or_else(|| {
            AbeError::SchemeProtocol(format!("no public keys for authority {}", authority))
        })?;
        let f = sha3_hash(gp.g2, timed)?;
        let t: Fr = rng.gen();
        attributes.push(Rw15CiphertextAttribute {
            attribute: timed.clone(),
            c1: gp.e_gg.pow(*lambda) * pk.e_gg_alpha.pow(t),
            c2: gp.g1 * (Fr::zero() - t),
            c3: (pk.g1_y * t) + (gp.g1 * w_shares[i].1),
            c4: f * t,
        });
    }
    Ok(Rw15Ciphertext {
        policy: timed_policy,
        period,
        c0: *msg * gp.e_gg.pow(s),
        attributes,
    })
}

/// Reconstructs the encrypted group element, or fails with
/// [`AbeError::PolicyNotSatisfied`].
pub fn decrypt(
    gp: &Rw15GlobalParameters,
    dk: &Rw15UserKey,
    gid: &str,
    ct: &Rw15Ciphertext,
) -> Result<Gt, AbeError> {
    if dk.gid != gid {
        return Err(AbeError::PolicyNotSatisfied);
    }
    let pol = parse(&ct.policy)?;
    let pruned = calc_pruned(&pol, &dk.attributes())?;
    let coefficients = calc_coefficients(&pol);
    let h_gid = sha3_hash(gp.g2, gid)?;
    let mut e_gg_s = Gt::one();
    for (timed, index) in &pruned {
        let component = ct.attributes.get(*index).ok_or_else(|| {
            AbeError::SchemeProtocol(format!("ciphertext misses component {}", index))
        })?;
        if component.attribute != *timed {
            return Err(AbeError::SchemeProtocol(format!(
                "ciphertext component {} does not match policy leaf {}",
                component.attribute, timed
            )));
        }
        let key = dk.keys.get(timed).ok_or(AbeError::PolicyNotSatisfied)?;
        let share = component.c1
            * pairing(component.c2, key.k)
            * pairing(component.c3, h_gid)
            * pairing(key.k_prime, component.c4);
        e_gg_s = e_gg_s * share.pow(coefficients[*index].1);
    }
    Ok(ct.c0 * e_gg_s.inverse())
}

impl AttributeRename for Rw15Ciphertext {
    fn attributes(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for component in &self.attributes {
            if !names.contains(&component.attribute) {
                names.push(component.attribute.clone());
            }
        }
        if let Ok(pol) = parse(&self.policy) {
            for name in list_attributes(&pol) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        names
    }

    fn rename<F: Fn(&str) -> String>(&self, f: &F) -> Self {
        Rw15Ciphertext {
            policy: rename_policy(&self.policy, f),
            period: self.period,
            c0: self.c0,
            attributes: self
                .attributes
                .iter()
                .map(|component| Rw15CiphertextAttribute {
                    attribute: f(&component.attribute),
                    c1: component.c1,
                    c2: component.c2,
                    c3: component.c3,
                    c4: component.c4,
                })
                .collect(),
        }
    }
}

impl AbeScheme for Rw15 {
    type GlobalParameters = Rw15GlobalParameters;
    type Registration = Rw15Registration;
    type Authority = Rw15Authority;
    type AuthorityPublicKey = Rw15AuthorityPublicKey;
    type PublicKeys = Rw15PublicKeys;
    type UserKey = Rw15UserKey;
    type DecryptionKey = Rw15UserKey;
    type Ciphertext = Rw15Ciphertext;

    const ID: SchemeId = SchemeId::Rw15;

    /// Plain union: attribute namespaces are disjoint, so a name collision
    /// is a deployment error.
    fn merge_public_keys(
        bundles: &[Rw15AuthorityPublicKey],
        _period: u64,
    ) -> Result<Rw15PublicKeys, AbeError> {
        let mut authorities = HashMap::new();
        for bundle in bundles {
            if authorities
                .insert(bundle.name.clone(), bundle.clone())
                .is_some()
            {
                return Err(AbeError::SchemeProtocol(format!(
                    "duplicate public keys for authority {}",
                    bundle.name
                )));
            }
        }
        Ok(Rw15PublicKeys { authorities })
    }

    fn encrypt(
        gp: &Rw15GlobalParameters,
        pks: &Rw15PublicKeys,
        msg: &Gt,
        policy: &str,
        period: u64,
    ) -> Result<Rw15Ciphertext, AbeError> {
        encrypt(gp, pks, msg, policy, period)
    }

    /// The raw held keys suffice; no authority interaction at decrypt time.
    fn decryption_keys(
        _gp: &Rw15GlobalParameters,
        _authorities: &[&Rw15Authority],
        user_key: &Rw15UserKey,
        _registration: &Rw15Registration,
        _ciphertext: &Rw15Ciphertext,
        _period: u64,
    ) -> Result<Rw15UserKey, AbeError> {
        Ok(user_key.clone())
    }

    fn decrypt(
        gp: &Rw15GlobalParameters,
        dk: &Rw15UserKey,
        gid: &str,
        ciphertext: &Rw15Ciphertext,
        _registration: &Rw15Registration,
    ) -> Result<Gt, AbeError> {
        decrypt(gp, dk, gid, ciphertext)
    }
}
