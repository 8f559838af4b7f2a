//! Temporal access control with binary-tree update keys.
//!
//! * Temporal attribute based access control for multi-authority storage,
//!   after Yang, Liu, Cao, Jia, Wong, Ren, "TAAC: Temporal Attribute-based
//!   Access Control for Multi-Authority Cloud Storage Systems"
//! * Available from <https://eprint.iacr.org/2012/651>
//! * Revocation state: complete subtree method over a binary tree
//! * Type: encryption (attribute-based)
//! * Setting: bilinear groups (asymmetric)
//!
//! Users hold long-term key fragments for every node on their leaf-to-root
//! path; each period, every authority publishes update keys for a subtree
//! cover of its non-revoked users. Only a non-revoked user finds a node in
//! both sets and can combine fragment and update key into a decryption key
//! for the time embedded attribute. Fetching update keys is an online,
//! per-decryption step ([`Taac::decryption_keys`]), not part of key
//! issuance: that is what makes per-period revocation work without
//! re-issuing long-term keys.
use rabe_bn::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

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
use crate::utils::tree::BinaryTree;

use super::rw15::validate_namespace;

/// Scheme marker, see [`crate::schemes::AbeScheme`].
pub struct Taac;

/// Global parameters; the tree height bounds the number of users.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacGlobalParameters {
    pub g1: G1,
    pub g2: G2,
    pub e_gg: Gt,
    pub tree: BinaryTree,
}

pub struct TaacCentralAuthority {
    height: u32,
    params: Option<TaacGlobalParameters>,
    next_leaf: Mutex<u64>,
}

/// Registration output: the user's assigned leaf in the key distribution
/// tree.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacRegistration {
    pub gid: String,
    pub leaf: u64,
}

/// An authority's public key bundle; period independent, update keys carry
/// the temporal part.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacAuthorityPublicKey {
    pub name: String,
    pub attributes: Vec<String>,
    pub e_gg_alpha: Gt,
    pub g1_y: G1,
}

/// An authority's long-term master secret.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacAuthoritySecretKey {
    pub alpha: Fr,
    pub y: Fr,
}

/// Long-term key fragment for one node on the user's path.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacPathKey {
    pub node: u64,
    pub d: G2,
}

/// A user's long-term key store: per untimed attribute, one fragment per
/// path node.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacUserKey {
    pub gid: String,
    pub leaf: u64,
    pub keys: HashMap<String, Vec<TaacPathKey>>,
}

impl TaacUserKey {
    pub fn new(registration: &TaacRegistration) -> TaacUserKey {
        TaacUserKey {
            gid: registration.gid.clone(),
            leaf: registration.leaf,
            keys: HashMap::new(),
        }
    }

    /// Additive merge of another authority's keygen output.
    pub fn update(&mut self, partial: TaacUserKey) -> Result<(), AbeError> {
        if partial.gid != self.gid || partial.leaf != self.leaf {
            return Err(AbeError::SchemeProtocol(format!(
                "cannot merge keys of {} into key store of {}",
                partial.gid, self.gid
            )));
        }
        for (attribute, fragments) in partial.keys {
            self.keys.entry(attribute).or_insert(fragments);
        }
        Ok(())
    }
}

/// Update key for one cover node of one attribute in one period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacUpdateKey {
    pub node: u64,
    pub u1: G2,
    pub u2: G1,
}

/// All update keys of one authority for one period, computed against the
/// revocation list as of first generation for that period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacUpdateKeyBundle {
    pub name: String,
    pub period: u64,
    pub attributes: HashMap<String, Vec<TaacUpdateKey>>,
}

/// Combined per-period decryption key for one time embedded attribute.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacCombinedKey {
    pub k: G2,
    pub k_prime: G1,
}

/// Output of [`Taac::decryption_keys`]: the revocation-filtered combination
/// of long-term fragments and freshly fetched update keys.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacDecryptionKey {
    pub gid: String,
    pub period: u64,
    pub keys: HashMap<String, TaacCombinedKey>,
}

/// Merged encryption keys of all involved authorities, keyed by name.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacPublicKeys {
    pub authorities: HashMap<String, TaacAuthorityPublicKey>,
}

/// Components bound to one leaf of the encryption policy; same shape and
/// reconstruction as in the rw15 core.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacCiphertextAttribute {
    pub attribute: String,
    pub c1: Gt,
    pub c2: G1,
    pub c3: G1,
    pub c4: G2,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct TaacCiphertext {
    pub policy: String,
    pub period: u64,
    pub c0: Gt,
    pub attributes: Vec<TaacCiphertextAttribute>,
}

/// An attribute authority with binary-tree key distribution state.
///
/// `(alpha, y)` is eager; the per-(attribute, node) scalars and the
/// per-period update key bundles are generated lazily and cached, each
/// behind a lock so concurrent requests observe one generation.
pub struct TaacAuthority {
    name: String,
    attributes: Vec<String>,
    gp: TaacGlobalParameters,
    alpha: Fr,
    y: Fr,
    pk: TaacAuthorityPublicKey,
    node_scalars: Mutex<HashMap<(String, u64), Fr>>,
    update_keys: Mutex<HashMap<u64, TaacUpdateKeyBundle>>,
    leaves: Mutex<HashMap<String, u64>>,
    revocations: RevocationList,
}

impl TaacCentralAuthority {
    /// `height` fixes the key distribution tree: at most `2^height` users
    /// can register.
    pub fn new(height: u32) -> TaacCentralAuthority {
        TaacCentralAuthority {
            height,
            params: None,
            next_leaf: Mutex::new(0),
        }
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
        self.params = Some(TaacGlobalParameters {
            g1,
            g2,
            e_gg: pairing(g1, g2),
            tree: BinaryTree::new(self.height),
        });
        Ok(())
    }

    pub fn global_parameters(&self) -> Result<&TaacGlobalParameters, AbeError> {
        self.params
            .as_ref()
            .ok_or(AbeError::Uninitialized("taac central authority"))
    }

    /// Assigns the next free leaf to `gid`.
    pub fn register_user(&self, gid: &str) -> Result<TaacRegistration, AbeError> {
        let gp = self.global_parameters()?;
        let mut next = self.next_leaf.lock().unwrap();
        if *next >= gp.tree.capacity() {
            return Err(AbeError::SchemeProtocol(format!(
                "user capacity of {} leaves exhausted",
                gp.tree.capacity()
            )));
        }
        let leaf = *next;
        *next += 1;
        Ok(TaacRegistration {
            gid: gid.to_string(),
            leaf,
        })
    }
}

impl TaacAuthority {
    pub fn setup(
        central: &TaacCentralAuthority,
        name: &str,
        attributes: Vec<String>,
    ) -> Result<TaacAuthority, AbeError> {
        let gp = central.global_parameters()?.clone();
        validate_namespace(name, &attributes)?;
        let mut rng = rand::thread_rng();
        let alpha: Fr = rng.gen();
        let y: Fr = rng.gen();
        let pk = TaacAuthorityPublicKey {
            name: name.to_string(),
            attributes: attributes.clone(),
            e_gg_alpha: gp.e_gg.pow(alpha),
            g1_y: gp.g1 * y,
        };
        Ok(TaacAuthority {
            name: name.to_string(),
            attributes,
            gp,
            alpha,
            y,
            pk,
            node_scalars: Mutex::new(HashMap::new()),
            update_keys: Mutex::new(HashMap::new()),
            leaves: Mutex::new(HashMap::new()),
            revocations: RevocationList::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn public_keys(&self, _period: u64) -> TaacAuthorityPublicKey {
        self.pk.clone()
    }

    pub fn secret_keys(&self, _period: u64) -> TaacAuthoritySecretKey {
        TaacAuthoritySecretKey {
            alpha: self.alpha,
            y: self.y,
        }
    }

    fn node_scalar(&self, attribute: &str, node: u64) -> Fr {
        let mut scalars = self.node_scalars.lock().unwrap();
        *scalars
            .entry((attribute.to_string(), node))
            .or_insert_with(|| {
                let mut rng = rand::thread_rng();
                rng.gen()
            })
    }

    /// Issues long-term path fragments for `gid` at its registered leaf.
    /// Attributes revoked for `(gid, period)` are filtered out first.
    pub fn keygen(
        &self,
        gid: &str,
        registration: &TaacRegistration,
        attributes: &[String],
        period: u64,
    ) -> Result<TaacUserKey, AbeError> {
        if registration.gid != gid {
            return Err(AbeError::SchemeProtocol(format!(
                "registration of {} presented for {}",
                registration.gid, gid
            )));
        }
        for attribute in attributes {
            if !self.attributes.contains(attribute) {
                return Err(AbeError::SchemeProtocol(format!(
                    "attribute {} is not handled by authority {}",
                    attribute, self.name
                )));
            }
        }
        let granted = self.revocations.filter(gid, attributes, period);
        self.leaves
            .lock()
            .unwrap()
            .insert(gid.to_string(), registration.leaf);
        let h_gid = sha3_hash(self.gp.g2, gid)?;
        let mut keys = HashMap::new();
        for attribute in granted {
            let fragments = self
                .gp
                .tree
                .path(registration.leaf)
                .into_iter()
                .map(|node| TaacPathKey {
                    node,
                    d: (self.gp.g2 * self.node_scalar(&attribute, node)) + (h_gid * self.y),
                })
                .collect();
            keys.insert(attribute, fragments);
        }
        Ok(TaacUserKey {
            gid: gid.to_string(),
            leaf: registration.leaf,
            keys,
        })
    }

    /// Update keys for `period`, computed once per period against the
    /// revocation list and cached. A user revoked for an attribute in this
    /// period has no cover node on its path and cannot combine a key.
    pub fn generate_update_keys(&self, period: u64) -> Result<TaacUpdateKeyBundle, AbeError> {
        let mut cache = self.update_keys.lock().unwrap();
        if let Some(bundle) = cache.get(&period) {
            return Ok(bundle.clone());
        }
        let assignments = self.leaves.lock().unwrap().clone();
        let mut rng = rand::thread_rng();
        let mut attributes = HashMap::new();
        for attribute in &self.attributes {
            let revoked_gids = self.revocations.revoked_gids(attribute, period);
            let revoked_leaves: HashSet<u64> = assignments
                .iter()
                .filter(|(gid, _)| revoked_gids.contains(gid.as_str()))
                .map(|(_, leaf)| *leaf)
                .collect();
            let timed = embed_attribute(attribute, period);
            let f = sha3_hash(self.gp.g2, &timed)?;
            let mut keys = Vec::new();
            for node in self.gp.tree.cover(&revoked_leaves) {
                let r_node = self.node_scalar(attribute, node);
                let rho: Fr = rng.gen();
                keys.push(TaacUpdateKey {
                    node,
                    u1: (self.gp.g2 * (self.alpha - r_node)) + (f * rho),
                    u2: self.gp.g1 * rho,
                });
            }
            attributes.insert(attribute.clone(), keys);
        }
        let bundle = TaacUpdateKeyBundle {
            name: self.name.clone(),
            period,
            attributes,
        };
        cache.insert(period, bundle.clone());
        Ok(bundle)
    }

    pub fn revoke(&self, gid: &str, attribute: &str, period: u64) {
        self.revocations.revoke(gid, attribute, period);
    }

    pub fn is_revoked(&self, gid: &str, attribute: &str, period: u64) -> bool {
        self.revocations.is_revoked(gid, attribute, period)
    }
}

/// Encrypts a group element under `policy` for `period`; the rw15 core over
/// the time embedded policy.
pub fn encrypt(
    gp: &TaacGlobalParameters,
    pks: &TaacPublicKeys,
    msg: &Gt,
    policy: &str,
    period: u64,
) -> Result<TaacCiphertext, AbeError> {
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
        attributes.push(TaacCiphertextAttribute {
            attribute: timed.clone(),
            c1: gp.e_gg.pow(*lambda) * pk.e_gg_alpha.pow(t),
            c2: gp.g1 * (Fr::zero() - t),
            c3: (pk.g1_y * t) + (gp.g1 * w_shares[i].1),
            c4: f * t,
        });
    }
    Ok(TaacCiphertext {
        policy: timed_policy,
        period,
        c0: *msg * gp.e_gg.pow(s),
        attributes,
    })
}

/// Combines long-term fragments with per-period update keys for every
/// policy attribute the user holds. Attributes for which no path/cover
/// overlap exists (the user is revoked, or the period does not match) are
/// silently absent; the failure surfaces uniformly at decryption.
pub fn decryption_keys(
    gp: &TaacGlobalParameters,
    authorities: &[&TaacAuthority],
    user_key: &TaacUserKey,
    ct: &TaacCiphertext,
    period: u64,
) -> Result<TaacDecryptionKey, AbeError> {
    let pol = parse(&ct.policy)?;
    let path: HashSet<u64> = gp.tree.path(user_key.leaf).into_iter().collect();
    let mut bundles: HashMap<String, TaacUpdateKeyBundle> = HashMap::new();
    let mut keys = HashMap::new();
    for timed in list_attributes(&pol) {
        let (embedded_period, untimed) = strip_attribute(&timed)?;
        if embedded_period != period {
            continue;
        }
        let fragments = match user_key.keys.get(&untimed) {
            Some(fragments) => fragments,
            None => continue,
        };
        let name = authority_of(&untimed)?;
        if !bundles.contains_key(&name) {
            let authority = match authorities.iter().find(|a| a.name() == name) {
                Some(authority) => authority,
                None => continue,
            };
            bundles.insert(name.clone(), authority.generate_update_keys(period)?);
        }
        let update_keys = match bundles.get(&name).and_then(|b| b.attributes.get(&untimed)) {
            Some(update_keys) => update_keys,
            None => continue,
        };
        for update_key in update_keys {
            if !path.contains(&update_key.node) {
                continue;
            }
            if let Some(fragment) = fragments.iter().find(|f| f.node == update_key.node) {
                keys.insert(
                    timed.clone(),
                    TaacCombinedKey {
                        k: fragment.d + update_key.u1,
                        k_prime: update_key.u2,
                    },
                );
                break;
            }
        }
    }
    Ok(TaacDecryptionKey {
        gid: user_key.gid.clone(),
        period,
        keys,
    })
}

/// Reconstructs the encrypted group element, or fails with
/// [`AbeError::PolicyNotSatisfied`].
pub fn decrypt(
    gp: &TaacGlobalParameters,
    dk: &TaacDecryptionKey,
    gid: &str,
    ct: &TaacCiphertext,
) -> Result<Gt, AbeError> {
    if dk.gid != gid {
        return Err(AbeError::PolicyNotSatisfied);
    }
    let pol = parse(&ct.policy)?;
    let held: Vec<String> = dk.keys.keys().cloned().collect();
    let pruned = calc_pruned(&pol, &held)?;
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

impl AttributeRename for TaacCiphertext {
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
        TaacCiphertext {
            policy: rename_policy(&self.policy, f),
            period: self.period,
            c0: self.c0,
            attributes: self
                .attributes
                .iter()
                .map(|component| TaacCiphertextAttribute {
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

impl AbeScheme for Taac {
    type GlobalParameters = TaacGlobalParameters;
    type Registration = TaacRegistration;
    type Authority = TaacAuthority;
    type AuthorityPublicKey = TaacAuthorityPublicKey;
    type PublicKeys = TaacPublicKeys;
    type UserKey = TaacUserKey;
    type DecryptionKey = TaacDecryptionKey;
    type Ciphertext = TaacCiphertext;

    const ID: SchemeId = SchemeId::Taac;

    fn merge_public_keys(
        bundles: &[TaacAuthorityPublicKey],
        _period: u64,
    ) -> Result<TaacPublicKeys, AbeError> {
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
        Ok(TaacPublicKeys { authorities })
    }

    fn encrypt(
        gp: &TaacGlobalParameters,
        pks: &TaacPublicKeys,
        msg: &Gt,
        policy: &str,
        period: u64,
    ) -> Result<TaacCiphertext, AbeError> {
        encrypt(gp, pks, msg, policy, period)
    }

    /// The online per-decryption step: fetches every relevant authority's
    /// update keys for `period` and combines them with the held fragments.
    fn decryption_keys(
        gp: &TaacGlobalParameters,
        authorities: &[&TaacAuthority],
        user_key: &TaacUserKey,
        _registration: &TaacRegistration,
        ciphertext: &TaacCiphertext,
        period: u64,
    ) -> Result<TaacDecryptionKey, AbeError> {
        decryption_keys(gp, authorities, user_key, ciphertext, period)
    }

    fn decrypt(
        gp: &TaacGlobalParameters,
        dk: &TaacDecryptionKey,
        gid: &str,
        ciphertext: &TaacCiphertext,
        _registration: &TaacRegistration,
    ) -> Result<Gt, AbeError> {
        decrypt(gp, dk, gid, ciphertext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment() -> (
        TaacCentralAuthority,
        TaacGlobalParameters,
        TaacAuthority,
        TaacAuthority,
    ) {
        let mut central = TaacCentralAuthority::new(4);
        central.central_setup().unwrap();
        let gp = central.global_parameters().unwrap().clone();
        let a1 = TaacAuthority::setup(
            &central,
            "A1",
            vec!["ONE@A1".to_string(), "TWO@A1".to_string()],
        )
        .unwrap();
        let a2 = TaacAuthority::setup(
            &central,
            "A2",
            vec!["THREE@A2".to_string(), "FOUR@A2".to_string()],
        )
        .unwrap();
        (central, gp, a1, a2)
    }

    fn user_key(
        central: &TaacCentralAuthority,
        gid: &str,
        issued: &[(&TaacAuthority, &[&str])],
        period: u64,
    ) -> (TaacRegistration, TaacUserKey) {
        let registration = central.register_user(gid).unwrap();
        let mut key = TaacUserKey::new(&registration);
        for (authority, attributes) in issued {
            let attributes: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
            key.update(
                authority
                    .keygen(gid, &registration, &attributes, period)
                    .unwrap(),
            )
            .unwrap();
        }
        (registration, key)
    }

    fn merged(a1: &TaacAuthority, a2: &TaacAuthority, period: u64) -> TaacPublicKeys {
        Taac::merge_public_keys(&[a1.public_keys(period), a2.public_keys(period)], period).unwrap()
    }

    #[test]
    fn test_capacity_is_bounded() {
        let mut central = TaacCentralAuthority::new(1);
        central.central_setup().unwrap();
        central.register_user("u0").unwrap();
        central.register_user("u1").unwrap();
        assert!(central.register_user("u2").is_err());
    }

    #[test]
    fn test_and_across_authorities() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let pks = merged(&a1, &a2, 1);
        let plaintext = b"dance like no one's watching, encrypt like everyone is!".to_vec();
        let (ct, sym) =
            Taac::encrypt_wrapped(&gp, &pks, &plaintext, "ONE@A1 and THREE@A2", 1).unwrap();
        let dk = Taac::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, 1).unwrap();
        assert_eq!(
            Taac::decrypt_wrapped(&gp, &dk, "alice", &ct, &sym, &registration).unwrap(),
            plaintext
        );
    }

    #[test]
    fn test_long_term_keys_work_across_periods() {
        // fragments are issued once; only update keys are per period
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        for period in [1u64, 2, 7] {
            let ct = Taac::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", period).unwrap();
            let dk =
                Taac::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, period).unwrap();
            assert_eq!(Taac::decrypt(&gp, &dk, "alice", &ct, &registration).unwrap(), msg);
        }
    }

    #[test]
    fn test_insufficient_attributes() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(&central, "bob", &[(&a1, &["TWO@A1"])], 1);
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Taac::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        let dk = Taac::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, 1).unwrap();
        assert_eq!(
            Taac::decrypt(&gp, &dk, "bob", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_update_keys_are_cached_per_period() {
        let (central, _, a1, a2) = deployment();
        let _ = user_key(&central, "alice", &[(&a1, &["ONE@A1"])], 1);
        let first = a1.generate_update_keys(3).unwrap();
        assert_eq!(first, a1.generate_update_keys(3).unwrap());
        assert_ne!(first, a1.generate_update_keys(4).unwrap());
        drop(a2);
    }

    #[test]
    fn test_revocation_blocks_update_keys() {
        let (central, gp, a1, a2) = deployment();
        let (reg_alice, key_alice) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let (reg_bob, key_bob) = user_key(
            &central,
            "bob",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        // alice loses ONE@A1 in period 2, before the period 2 update keys
        // are generated
        a1.revoke("alice", "ONE@A1", 2);
        let pks = merged(&a1, &a2, 2);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Taac::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 2).unwrap();
        let dk_alice =
            Taac::decryption_keys(&gp, &[&a1, &a2], &key_alice, &reg_alice, &ct, 2).unwrap();
        assert_eq!(
            Taac::decrypt(&gp, &dk_alice, "alice", &ct, &reg_alice),
            Err(AbeError::PolicyNotSatisfied)
        );
        // bob is unaffected in period 2, alice still decrypts period 1
        let dk_bob = Taac::decryption_keys(&gp, &[&a1, &a2], &key_bob, &reg_bob, &ct, 2).unwrap();
        assert_eq!(Taac::decrypt(&gp, &dk_bob, "bob", &ct, &reg_bob).unwrap(), msg);
        let ct1 = Taac::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        let dk1 =
            Taac::decryption_keys(&gp, &[&a1, &a2], &key_alice, &reg_alice, &ct1, 1).unwrap();
        assert_eq!(
            Taac::decrypt(&gp, &dk1, "alice", &ct1, &reg_alice).unwrap(),
            msg
        );
    }

    #[test]
    fn test_period_mismatch_yields_no_keys() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Taac::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        // update keys requested for period 2 against a period 1 ciphertext
        let dk = Taac::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, 2).unwrap();
        assert!(dk.keys.is_empty());
        assert_eq!(
            Taac::decrypt(&gp, &dk, "alice", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_serialization_round_trip() {
        let (_, gp, a1, a2) = deployment();
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Taac::encrypt(&gp, &pks, &msg, "(ONE@A1 and THREE@A2) or TWO@A1", 1).unwrap();
        let bytes = Taac::serialize_ciphertext(&ct).unwrap();
        assert_eq!(Taac::deserialize_ciphertext(&bytes).unwrap(), ct);
    }
}
