//! Decentralized DNF CP-ABE with time-period-bound attribute keys.
//!
//! * Based on S Mueller, S Katzenbeisser, C Eckert, "Distributed
//!   Attribute-based Encryption"
//! * Published in International Conference on Information Security and
//!   Cryptology, Heidelberg, 2008
//! * Type: encryption (attribute-based)
//! * Setting: bilinear groups (asymmetric)
//!
//! Encryption expands the policy into its access structure and embeds one
//! component set per minterm; a user holding every attribute of one minterm
//! decrypts with a flat product of pairings, without reconstruction
//! coefficients. Authority attribute keys carry no period-independent
//! secret: each authority samples a fresh scalar per time period on first
//! use, so attribute keys of different periods are unlinkable and a key of
//! period 1 never opens a period 2 ciphertext.
use rabe_bn::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Mutex;

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::AbeError;
use crate::schemes::{AbeScheme, SchemeId};
use crate::utils::hash::sha3_hash_fr;
use crate::utils::period::{embed_attribute, embed_policy};
use crate::utils::policy::dnf::{access_structure, to_dnf};
use crate::utils::policy::pest::{list_attributes, parse};
use crate::utils::revocation::RevocationList;
use crate::utils::serialize::{rename_policy, AttributeRename};
use crate::utils::tools::is_subset;

use super::rw15::validate_namespace;

/// Scheme marker, see [`crate::schemes::AbeScheme`].
pub struct Mke08;

/// Global parameters shared by all authorities of one deployment.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08GlobalParameters {
    pub g1: G1,
    pub g2: G2,
    pub p1: G1,
    pub p2: G2,
    pub e_gg_y1: Gt,
    pub e_gg_y2: Gt,
}

/// The central master key; only ever used to derive user base keys.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08MasterKey {
    pub g1_y1: G1,
    pub g2_y2: G2,
}

pub struct Mke08CentralAuthority {
    state: Option<(Mke08GlobalParameters, Mke08MasterKey)>,
}

/// A user's public base key; attribute authorities derive secret attribute
/// keys against it.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08PublicUserKey {
    pub gid: String,
    pub g1: G1,
    pub g2: G2,
}

/// A user's secret base key, bound to the central master secret.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08SecretUserKey {
    pub g1: G1,
    pub g2: G2,
}

/// Registration output: the user base key pair issued by the central
/// authority.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08Registration {
    pub pk: Mke08PublicUserKey,
    pub sk: Mke08SecretUserKey,
}

/// Public key of one time embedded attribute for one period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08PublicAttributeKey {
    pub attribute: String,
    pub g1: G1,
    pub g2: G2,
    pub gt1: Gt,
    pub gt2: Gt,
}

/// Secret key of one time embedded attribute, bound to one user.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08SecretAttributeKey {
    pub attribute: String,
    pub g1: G1,
    pub g2: G2,
}

/// An authority's public attribute keys for one period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08AuthorityPublicKey {
    pub name: String,
    pub period: u64,
    pub attributes: Vec<Mke08PublicAttributeKey>,
}

/// An authority's secret scalar for one period.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08AuthoritySecretKey {
    pub name: String,
    pub period: u64,
    pub r: Fr,
}

/// An attribute authority. Key material is lazy: the per-period scalar is
/// sampled on the first request for that period and cached, under a lock,
/// so every caller observes the same material.
pub struct Mke08Authority {
    name: String,
    attributes: Vec<String>,
    gp: Mke08GlobalParameters,
    period_scalars: Mutex<HashMap<u64, Fr>>,
    revocations: RevocationList,
}

/// A user's merged secret key store across authorities.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08UserKey {
    pub gid: String,
    pub keys: Vec<Mke08SecretAttributeKey>,
}

impl Mke08UserKey {
    pub fn new(gid: &str) -> Mke08UserKey {
        Mke08UserKey {
            gid: gid.to_string(),
            keys: Vec::new(),
        }
    }

    /// Additive merge of another authority's keygen output.
    pub fn update(&mut self, partial: Mke08UserKey) -> Result<(), AbeError> {
        if partial.gid != self.gid {
            return Err(AbeError::SchemeProtocol(format!(
                "cannot merge keys of {} into key store of {}",
                partial.gid, self.gid
            )));
        }
        for key in partial.keys {
            if !self.keys.iter().any(|k| k.attribute == key.attribute) {
                self.keys.push(key);
            }
        }
        Ok(())
    }

    pub fn attributes(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.attribute.clone()).collect()
    }
}

/// Merged public attribute keys, keyed by time embedded attribute name.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08PublicKeys {
    pub period: u64,
    pub attributes: HashMap<String, Mke08PublicAttributeKey>,
}

/// Ciphertext components of one conjunction of the access structure.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08CiphertextConjunction {
    pub attributes: Vec<String>,
    pub j1: Gt,
    pub j2: Gt,
    pub j3: G1,
    pub j4: G2,
    pub j5: G1,
    pub j6: G2,
}

#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Mke08Ciphertext {
    pub policy: String,
    pub period: u64,
    pub conjunctions: Vec<Mke08CiphertextConjunction>,
}

impl Mke08CentralAuthority {
    pub fn new() -> Mke08CentralAuthority {
        Mke08CentralAuthority { state: None }
    }

    /// Samples the global parameters and the central master key. A second
    /// call fails with [`AbeError::AlreadyInitialized`].
    pub fn central_setup(&mut self) -> Result<(), AbeError> {
        if self.state.is_some() {
            return Err(AbeError::AlreadyInitialized);
        }
        let mut rng = rand::thread_rng();
        let g1: G1 = rng.gen();
        let g2: G2 = rng.gen();
        let p1: G1 = rng.gen();
        let p2: G2 = rng.gen();
        let y1: Fr = rng.gen();
        let y2: Fr = rng.gen();
        self.state = Some((
            Mke08GlobalParameters {
                g1,
                g2,
                p1,
                p2,
                e_gg_y1: pairing(g1, g2).pow(y1),
                e_gg_y2: pairing(g1, g2).pow(y2),
            },
            Mke08MasterKey {
                g1_y1: g1 * y1,
                g2_y2: g2 * y2,
            },
        ));
        Ok(())
    }

    pub fn global_parameters(&self) -> Result<&Mke08GlobalParameters, AbeError> {
        self.state
            .as_ref()
            .map(|(gp, _)| gp)
            .ok_or(AbeError::Uninitialized("mke08 central authority"))
    }

    /// Issues the user base key pair binding `gid` to the master secret.
    pub fn register_user(&self, gid: &str) -> Result<Mke08Registration, AbeError> {
        let (gp, mk) = self
            .state
            .as_ref()
            .ok_or(AbeError::Uninitialized("mke08 central authority"))?;
        let mut rng = rand::thread_rng();
        let m_u: Fr = rng.gen();
        Ok(Mke08Registration {
            sk: Mke08SecretUserKey {
                g1: mk.g1_y1 + (gp.p1 * m_u),
                g2: mk.g2_y2 + (gp.p2 * m_u),
            },
            pk: Mke08PublicUserKey {
                gid: gid.to_string(),
                g1: gp.g1 * m_u,
                g2: gp.g2 * m_u,
            },
        })
    }
}

impl Default for Mke08CentralAuthority {
    fn default() -> Self {
        Mke08CentralAuthority::new()
    }
}

impl Mke08Authority {
    /// Binds the authority to the global parameters and its namespace. No
    /// key material exists yet; scalars are sampled per period on demand.
    pub fn setup(
        central: &Mke08CentralAuthority,
        name: &str,
        attributes: Vec<String>,
    ) -> Result<Mke08Authority, AbeError> {
        let gp = central.global_parameters()?.clone();
        validate_namespace(name, &attributes)?;
        Ok(Mke08Authority {
            name: name.to_string(),
            attributes,
            gp,
            period_scalars: Mutex::new(HashMap::new()),
            revocations: RevocationList::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn period_scalar(&self, period: u64) -> Fr {
        let mut scalars = self.period_scalars.lock().unwrap();
        *scalars.entry(period).or_insert_with(|| {
            let mut rng = rand::thread_rng();
            rng.gen()
        })
    }

    fn attribute_exponent(&self, timed: &str, period: u64) -> Result<Fr, AbeError> {
        Ok(sha3_hash_fr(timed)? * sha3_hash_fr(&self.name)? * self.period_scalar(period))
    }

    /// Generates (or returns the cached) public attribute keys for `period`.
    pub fn public_keys(&self, period: u64) -> Result<Mke08AuthorityPublicKey, AbeError> {
        let mut attributes = Vec::with_capacity(self.attributes.len());
        for attribute in &self.attributes {
            let timed = embed_attribute(attribute, period);
            let exp = self.attribute_exponent(&timed, period)?;
            attributes.push(Mke08PublicAttributeKey {
                attribute: timed,
                g1: self.gp.g1 * exp,
                g2: self.gp.g2 * exp,
                gt1: self.gp.e_gg_y1.pow(exp),
                gt2: self.gp.e_gg_y2.pow(exp),
            });
        }
        Ok(Mke08AuthorityPublicKey {
            name: self.name.clone(),
            period,
            attributes,
        })
    }

    pub fn secret_keys(&self, period: u64) -> Mke08AuthoritySecretKey {
        Mke08AuthoritySecretKey {
            name: self.name.clone(),
            period,
            r: self.period_scalar(period),
        }
    }

    /// Issues secret attribute keys for the user behind `registration`,
    /// scoped to `period`. Revoked attributes are filtered out first.
    pub fn keygen(
        &self,
        gid: &str,
        registration: &Mke08Registration,
        attributes: &[String],
        period: u64,
    ) -> Result<Mke08UserKey, AbeError> {
        if registration.pk.gid != gid {
            return Err(AbeError::SchemeProtocol(format!(
                "registration of {} presented for {}",
                registration.pk.gid, gid
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
        let mut keys = Vec::with_capacity(granted.len());
        for attribute in granted {
            let timed = embed_attribute(&attribute, period);
            let exp = self.attribute_exponent(&timed, period)?;
            keys.push(Mke08SecretAttributeKey {
                attribute: timed,
                g1: registration.pk.g1 * exp,
                g2: registration.pk.g2 * exp,
            });
        }
        Ok(Mke08UserKey {
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

/// Encrypts a group element under `policy` for `period`. The policy is
/// converted to DNF; one conjunction component set is embedded per minterm
/// of the access structure.
pub fn encrypt(
    gp: &Mke08GlobalParameters,
    pks: &Mke08PublicKeys,
    msg: &Gt,
    policy: &str,
    period: u64,
) -> Result<Mke08Ciphertext, AbeError> {
    let timed_policy = embed_policy(policy, period)?;
    let pol = parse(&timed_policy)?;
    let minterms = access_structure(&to_dnf(&pol));
    let mut rng = rand::thread_rng();
    // random split of the message over both master components
    let m1: Gt = pairing(rng.gen(), rng.gen());
    let m2 = *msg * m1.inverse();
    let mut conjunctions = Vec::with_capacity(minterms.len());
    for minterm in minterms {
        let mut gt1 = Gt::one();
        let mut gt2 = Gt::one();
        let mut sum_g1: Option<G1> = None;
        let mut sum_g2: Option<G2> = None;
        for attribute in &minterm {
            let pk = pks.attributes.get(attribute).ok_or_else(|| {
                AbeError::SchemeProtocol(format!("no public key for attribute {}", attribute))
            })?;
            gt1 = gt1 * pk.gt1;
            gt2 = gt2 * pk.gt2;
            sum_g1 = Some(match sum_g1 {
                Some(sum) => sum + pk.g1,
                None => pk.g1,
            });
            sum_g2 = Some(match sum_g2 {
                Some(sum) => sum + pk.g2,
                None => pk.g2,
            });
        }
        let (sum_g1, sum_g2) = match (sum_g1, sum_g2) {
            (Some(sum_g1), Some(sum_g2)) => (sum_g1, sum_g2),
            _ => {
                return Err(AbeError::SchemeProtocol(
                    "policy expands to an empty conjunction".to_string(),
                ))
            }
        };
        let r_j: Fr = rng.gen();
        conjunctions.push(Mke08CiphertextConjunction {
            attributes: minterm,
            j1: gt1.pow(r_j) * m1,
            j2: gt2.pow(r_j) * m2,
            j3: gp.p1 * r_j,
            j4: gp.p2 * r_j,
            j5: sum_g1 * r_j,
            j6: sum_g2 * r_j,
        });
    }
    Ok(Mke08Ciphertext {
        policy: timed_policy,
        period,
        conjunctions,
    })
}

/// Reconstructs the encrypted group element from the first conjunction whose
/// attributes the user fully holds, or fails with
/// [`AbeError::PolicyNotSatisfied`].
pub fn decrypt(
    dk: &Mke08UserKey,
    gid: &str,
    ct: &Mke08Ciphertext,
    registration: &Mke08Registration,
) -> Result<Gt, AbeError> {
    if dk.gid != gid || registration.pk.gid != gid {
        return Err(AbeError::PolicyNotSatisfied);
    }
    let held = dk.attributes();
    for conjunction in &ct.conjunctions {
        if !is_subset(&conjunction.attributes, &held) {
            continue;
        }
        let mut sum_g1: Option<G1> = None;
        let mut sum_g2: Option<G2> = None;
        for attribute in &conjunction.attributes {
            let key = dk
                .keys
                .iter()
                .find(|k| &k.attribute == attribute)
                .ok_or(AbeError::PolicyNotSatisfied)?;
            sum_g1 = Some(match sum_g1 {
                Some(sum) => sum + key.g1,
                None => key.g1,
            });
            sum_g2 = Some(match sum_g2 {
                Some(sum) => sum + key.g2,
                None => key.g2,
            });
        }
        let (sum_g1, sum_g2) = match (sum_g1, sum_g2) {
            (Some(sum_g1), Some(sum_g2)) => (sum_g1, sum_g2),
            _ => continue,
        };
        let msg = conjunction.j1
            * conjunction.j2
            * pairing(conjunction.j3, sum_g2)
            * pairing(sum_g1, conjunction.j4)
            * (pairing(conjunction.j5, registration.sk.g2)
                * pairing(registration.sk.g1, conjunction.j6))
            .inverse();
        return Ok(msg);
    }
    Err(AbeError::PolicyNotSatisfied)
}

impl AttributeRename for Mke08Ciphertext {
    fn attributes(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for conjunction in &self.conjunctions {
            for attribute in &conjunction.attributes {
                if !names.contains(attribute) {
                    names.push(attribute.clone());
                }
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
        Mke08Ciphertext {
            policy: rename_policy(&self.policy, f),
            period: self.period,
            conjunctions: self
                .conjunctions
                .iter()
                .map(|conjunction| Mke08CiphertextConjunction {
                    attributes: conjunction.attributes.iter().map(|a| f(a)).collect(),
                    j1: conjunction.j1,
                    j2: conjunction.j2,
                    j3: conjunction.j3,
                    j4: conjunction.j4,
                    j5: conjunction.j5,
                    j6: conjunction.j6,
                })
                .collect(),
        }
    }
}

impl AbeScheme for Mke08 {
    type GlobalParameters = Mke08GlobalParameters;
    type Registration = Mke08Registration;
    type Authority = Mke08Authority;
    type AuthorityPublicKey = Mke08AuthorityPublicKey;
    type PublicKeys = Mke08PublicKeys;
    type UserKey = Mke08UserKey;
    type DecryptionKey = Mke08UserKey;
    type Ciphertext = Mke08Ciphertext;

    const ID: SchemeId = SchemeId::Mke08;

    /// Union of the per-authority attribute key lists. Every bundle must
    /// have been generated for the requested period.
    fn merge_public_keys(
        bundles: &[Mke08AuthorityPublicKey],
        period: u64,
    ) -> Result<Mke08PublicKeys, AbeError> {
        let mut attributes = HashMap::new();
        for bundle in bundles {
            if bundle.period != period {
                return Err(AbeError::SchemeProtocol(format!(
                    "public keys of authority {} are for period {}, not {}",
                    bundle.name, bundle.period, period
                )));
            }
            for pk in &bundle.attributes {
                if attributes.insert(pk.attribute.clone(), pk.clone()).is_some() {
                    return Err(AbeError::SchemeProtocol(format!(
                        "duplicate public key for attribute {}",
                        pk.attribute
                    )));
                }
            }
        }
        Ok(Mke08PublicKeys { period, attributes })
    }

    fn encrypt(
        gp: &Mke08GlobalParameters,
        pks: &Mke08PublicKeys,
        msg: &Gt,
        policy: &str,
        period: u64,
    ) -> Result<Mke08Ciphertext, AbeError> {
        encrypt(gp, pks, msg, policy, period)
    }

    /// The raw held keys suffice; no authority interaction at decrypt time.
    fn decryption_keys(
        _gp: &Mke08GlobalParameters,
        _authorities: &[&Mke08Authority],
        user_key: &Mke08UserKey,
        _registration: &Mke08Registration,
        _ciphertext: &Mke08Ciphertext,
        _period: u64,
    ) -> Result<Mke08UserKey, AbeError> {
        Ok(user_key.clone())
    }

    fn decrypt(
        _gp: &Mke08GlobalParameters,
        dk: &Mke08UserKey,
        gid: &str,
        ciphertext: &Mke08Ciphertext,
        registration: &Mke08Registration,
    ) -> Result<Gt, AbeError> {
        decrypt(dk, gid, ciphertext, registration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment() -> (
        Mke08CentralAuthority,
        Mke08GlobalParameters,
        Mke08Authority,
        Mke08Authority,
    ) {
        let mut central = Mke08CentralAuthority::new();
        central.central_setup().unwrap();
        let gp = central.global_parameters().unwrap().clone();
        let a1 = Mke08Authority::setup(
            &central,
            "A1",
            vec!["ONE@A1".to_string(), "TWO@A1".to_string()],
        )
        .unwrap();
        let a2 = Mke08Authority::setup(
            &central,
            "A2",
            vec!["THREE@A2".to_string(), "FOUR@A2".to_string()],
        )
        .unwrap();
        (central, gp, a1, a2)
    }

    fn user_key(
        central: &Mke08CentralAuthority,
        gid: &str,
        issued: &[(&Mke08Authority, &[&str])],
        period: u64,
    ) -> (Mke08Registration, Mke08UserKey) {
        let registration = central.register_user(gid).unwrap();
        let mut key = Mke08UserKey::new(gid);
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

    fn merged(a1: &Mke08Authority, a2: &Mke08Authority, period: u64) -> Mke08PublicKeys {
        Mke08::merge_public_keys(
            &[
                a1.public_keys(period).unwrap(),
                a2.public_keys(period).unwrap(),
            ],
            period,
        )
        .unwrap()
    }

    #[test]
    fn test_setup_exactly_once() {
        let mut central = Mke08CentralAuthority::new();
        assert!(central.register_user("alice").is_err());
        central.central_setup().unwrap();
        assert_eq!(central.central_setup(), Err(AbeError::AlreadyInitialized));
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
            Mke08::encrypt_wrapped(&gp, &pks, &plaintext, "ONE@A1 and THREE@A2", 1).unwrap();
        let dk = Mke08::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, 1).unwrap();
        assert_eq!(
            Mke08::decrypt_wrapped(&gp, &dk, "alice", &ct, &sym, &registration).unwrap(),
            plaintext
        );
    }

    #[test]
    fn test_non_dnf_policy_is_expanded() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["FOUR@A2"])],
            1,
        );
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        // and-of-ors input, multiplied out at encryption time
        let ct = Mke08::encrypt(
            &gp,
            &pks,
            &msg,
            "(ONE@A1 or TWO@A1) and (THREE@A2 or FOUR@A2)",
            1,
        )
        .unwrap();
        assert_eq!(ct.conjunctions.len(), 4);
        assert_eq!(decrypt(&key, "alice", &ct, &registration).unwrap(), msg);
    }

    #[test]
    fn test_insufficient_attributes() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(&central, "bob", &[(&a1, &["TWO@A1"])], 1);
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Mke08::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        assert_eq!(
            decrypt(&key, "bob", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_period_isolation() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            2,
        );
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Mke08::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        assert_eq!(
            decrypt(&key, "alice", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_period_scalar_is_stable() {
        let (_, _, a1, _) = deployment();
        // lazy generation must hand out the same material on every request
        assert_eq!(a1.public_keys(5).unwrap(), a1.public_keys(5).unwrap());
        assert_ne!(
            a1.public_keys(5).unwrap().attributes[0],
            a1.public_keys(6).unwrap().attributes[0]
        );
        assert_eq!(a1.secret_keys(5), a1.secret_keys(5));
    }

    #[test]
    fn test_revocation_filters_keygen() {
        let (central, gp, a1, a2) = deployment();
        a1.revoke("carol", "ONE@A1", 1);
        let (registration, key) = user_key(
            &central,
            "carol",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        assert_eq!(key.keys.len(), 1);
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Mke08::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        assert_eq!(
            decrypt(&key, "carol", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_merge_rejects_period_mismatch() {
        let (_, _, a1, a2) = deployment();
        assert!(Mke08::merge_public_keys(
            &[a1.public_keys(1).unwrap(), a2.public_keys(2).unwrap()],
            1,
        )
        .is_err());
    }

    #[test]
    fn test_serialization_round_trip() {
        let (_, gp, a1, a2) = deployment();
        let pks = merged(&a1, &a2, 1);
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Mke08::encrypt(&gp, &pks, &msg, "(ONE@A1 and THREE@A2) or TWO@A1", 1).unwrap();
        let bytes = Mke08::serialize_ciphertext(&ct).unwrap();
        assert_eq!(Mke08::deserialize_ciphertext(&bytes).unwrap(), ct);
    }
}
