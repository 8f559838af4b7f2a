//! Outsourced decryption over the rw15 core.
//!
//! * Key blinding transform by Green, Hohenberger, Waters, "Outsourcing
//!   Decryption of ABE Ciphertexts"
//! * Published in USENIX Security 2011
//! * Available from <https://www.usenix.org/legacy/event/sec11/tech/full_papers/Green.pdf>
//!
//! Registration hands the user a retrieval scalar `z`; `decryption_keys`
//! blinds the held rw15 keys with `1/z` into a transformation key that can
//! be given to an untrusted proxy. The proxy runs [`transform`] - all the
//! pairings - and returns a partial decryption from which the user recovers
//! the message with a single exponentiation by `z`. The proxy learns
//! nothing: every value it handles is blinded by `1/z`.
use rabe_bn::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "borsh")]
use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::AbeError;
use crate::schemes::{AbeScheme, SchemeId};
use crate::utils::hash::sha3_hash;
use crate::utils::policy::pest::parse;
use crate::utils::secretsharing::{calc_coefficients, calc_pruned};

use super::rw15;
use super::rw15::{
    Rw15Authority, Rw15AuthorityPublicKey, Rw15CentralAuthority, Rw15Ciphertext,
    Rw15GlobalParameters, Rw15PublicKeys, Rw15UserKey,
};

/// Scheme marker, see [`crate::schemes::AbeScheme`].
pub struct Ghw11;

/// Registration output: the user's secret retrieval scalar. Never leaves
/// the user; the proxy only ever sees keys blinded by its inverse.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Ghw11Registration {
    pub gid: String,
    pub z: Fr,
}

/// Runs the rw15 global setup and additionally samples retrieval scalars at
/// registration.
pub struct Ghw11CentralAuthority {
    inner: Rw15CentralAuthority,
}

/// One blinded attribute key, `K^(1/z)` and `K'^(1/z)`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Ghw11BlindedAttributeKey {
    pub k: G2,
    pub k_prime: G1,
}

/// The transformation key handed to the decryption proxy.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Ghw11TransformationKey {
    pub gid: String,
    pub h_gid: G2,
    pub keys: HashMap<String, Ghw11BlindedAttributeKey>,
}

/// The proxy's output: `b = (e(g,g)^s / x)^(1/z)` plus the public share
/// factor `x` and the message component `c0`.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "borsh", derive(BorshSerialize, BorshDeserialize))]
pub struct Ghw11PartialDecryption {
    pub b: Gt,
    pub x: Gt,
    pub c0: Gt,
}

impl Ghw11CentralAuthority {
    pub fn new() -> Ghw11CentralAuthority {
        Ghw11CentralAuthority {
            inner: Rw15CentralAuthority::new(),
        }
    }

    pub fn central_setup(&mut self) -> Result<(), AbeError> {
        self.inner.central_setup()
    }

    pub fn global_parameters(&self) -> Result<&Rw15GlobalParameters, AbeError> {
        self.inner.global_parameters()
    }

    pub fn register_user(&self, gid: &str) -> Result<Ghw11Registration, AbeError> {
        self.inner.register_user(gid)?;
        let mut rng = rand::thread_rng();
        Ok(Ghw11Registration {
            gid: gid.to_string(),
            z: rng.gen(),
        })
    }

    /// The underlying rw15 central authority; attribute authorities bind to
    /// it via [`Rw15Authority::setup`].
    pub fn rw15(&self) -> &Rw15CentralAuthority {
        &self.inner
    }
}

impl Default for Ghw11CentralAuthority {
    fn default() -> Self {
        Ghw11CentralAuthority::new()
    }
}

/// Blinds the held keys with `1/z` into the transformation key for the
/// proxy.
pub fn transformation_keys(
    gp: &Rw15GlobalParameters,
    user_key: &Rw15UserKey,
    registration: &Ghw11Registration,
) -> Result<Ghw11TransformationKey, AbeError> {
    if user_key.gid != registration.gid {
        return Err(AbeError::SchemeProtocol(format!(
            "registration of {} presented for key store of {}",
            registration.gid, user_key.gid
        )));
    }
    let z_inv = registration
        .z
        .inverse()
        .ok_or_else(|| AbeError::SchemeProtocol("retrieval scalar is not invertible".to_string()))?;
    let h_gid = sha3_hash(gp.g2, &user_key.gid)?;
    let mut keys = HashMap::new();
    for (attribute, key) in &user_key.keys {
        keys.insert(
            attribute.clone(),
            Ghw11BlindedAttributeKey {
                k: key.k * z_inv,
                k_prime: key.k_prime * z_inv,
            },
        );
    }
    Ok(Ghw11TransformationKey {
        gid: user_key.gid.clone(),
        h_gid: h_gid * z_inv,
        keys,
    })
}

/// The proxy step: computes every pairing of the rw15 reconstruction with
/// the blinded keys. Fails with [`AbeError::PolicyNotSatisfied`] when the
/// transformation key does not cover the policy.
pub fn transform(
    tk: &Ghw11TransformationKey,
    ct: &Rw15Ciphertext,
) -> Result<Ghw11PartialDecryption, AbeError> {
    let pol = parse(&ct.policy)?;
    let held: Vec<String> = tk.keys.keys().cloned().collect();
    let pruned = calc_pruned(&pol, &held)?;
    let coefficients = calc_coefficients(&pol);
    let mut b = Gt::one();
    let mut x = Gt::one();
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
        let key = tk.keys.get(timed).ok_or(AbeError::PolicyNotSatisfied)?;
        let coefficient = coefficients[*index].1;
        let paired = pairing(component.c2, key.k)
            * pairing(component.c3, tk.h_gid)
            * pairing(key.k_prime, component.c4);
        b = b * paired.pow(coefficient);
        x = x * component.c1.pow(coefficient);
    }
    Ok(Ghw11PartialDecryption { b, x, c0: ct.c0 })
}

/// The client step: one exponentiation by `z` recovers the message from the
/// proxy's output.
pub fn decrypt_out(partial: &Ghw11PartialDecryption, registration: &Ghw11Registration) -> Gt {
    partial.c0 * (partial.b.pow(registration.z) * partial.x).inverse()
}

impl AbeScheme for Ghw11 {
    type GlobalParameters = Rw15GlobalParameters;
    type Registration = Ghw11Registration;
    type Authority = Rw15Authority;
    type AuthorityPublicKey = Rw15AuthorityPublicKey;
    type PublicKeys = Rw15PublicKeys;
    type UserKey = Rw15UserKey;
    type DecryptionKey = Ghw11TransformationKey;
    type Ciphertext = Rw15Ciphertext;

    const ID: SchemeId = SchemeId::Ghw11;

    fn merge_public_keys(
        bundles: &[Rw15AuthorityPublicKey],
        period: u64,
    ) -> Result<Rw15PublicKeys, AbeError> {
        rw15::Rw15::merge_public_keys(bundles, period)
    }

    fn encrypt(
        gp: &Rw15GlobalParameters,
        pks: &Rw15PublicKeys,
        msg: &Gt,
        policy: &str,
        period: u64,
    ) -> Result<Rw15Ciphertext, AbeError> {
        rw15::encrypt(gp, pks, msg, policy, period)
    }

    /// The key blinding transform: the returned material is safe to hand to
    /// an untrusted proxy.
    fn decryption_keys(
        gp: &Rw15GlobalParameters,
        _authorities: &[&Rw15Authority],
        user_key: &Rw15UserKey,
        registration: &Ghw11Registration,
        _ciphertext: &Rw15Ciphertext,
        _period: u64,
    ) -> Result<Ghw11TransformationKey, AbeError> {
        transformation_keys(gp, user_key, registration)
    }

    fn decrypt(
        _gp: &Rw15GlobalParameters,
        dk: &Ghw11TransformationKey,
        gid: &str,
        ciphertext: &Rw15Ciphertext,
        registration: &Ghw11Registration,
    ) -> Result<Gt, AbeError> {
        if dk.gid != gid || registration.gid != gid {
            return Err(AbeError::PolicyNotSatisfied);
        }
        let partial = transform(dk, ciphertext)?;
        Ok(decrypt_out(&partial, registration))
    }
}

/// Byte encoding of the transformation key, e.g. for shipping it to the
/// proxy.
pub fn serialize_transformation_key(tk: &Ghw11TransformationKey) -> Result<Vec<u8>, AbeError> {
    crate::utils::serialize::to_bytes(tk)
}

pub fn deserialize_transformation_key(bytes: &[u8]) -> Result<Ghw11TransformationKey, AbeError> {
    crate::utils::serialize::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deployment() -> (
        Ghw11CentralAuthority,
        Rw15GlobalParameters,
        Rw15Authority,
        Rw15Authority,
    ) {
        let mut central = Ghw11CentralAuthority::new();
        central.central_setup().unwrap();
        let gp = central.global_parameters().unwrap().clone();
        let a1 = Rw15Authority::setup(
            central.rw15(),
            "A1",
            vec!["ONE@A1".to_string(), "TWO@A1".to_string()],
        )
        .unwrap();
        let a2 = Rw15Authority::setup(
            central.rw15(),
            "A2",
            vec!["THREE@A2".to_string(), "FOUR@A2".to_string()],
        )
        .unwrap();
        (central, gp, a1, a2)
    }

    fn user_key(
        central: &Ghw11CentralAuthority,
        gid: &str,
        issued: &[(&Rw15Authority, &[&str])],
        period: u64,
    ) -> (Ghw11Registration, Rw15UserKey) {
        let registration = central.register_user(gid).unwrap();
        let mut key = Rw15UserKey::new(gid);
        for (authority, attributes) in issued {
            let attributes: Vec<String> = attributes.iter().map(|a| a.to_string()).collect();
            key.update(authority.keygen(gid, &attributes, period).unwrap())
                .unwrap();
        }
        (registration, key)
    }

    #[test]
    fn test_outsourced_round_trip() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let pks = Ghw11::merge_public_keys(&[a1.public_keys(1), a2.public_keys(1)], 1).unwrap();
        let plaintext = b"dance like no one's watching, encrypt like everyone is!".to_vec();
        let (ct, sym) =
            Ghw11::encrypt_wrapped(&gp, &pks, &plaintext, "ONE@A1 and THREE@A2", 1).unwrap();
        let tk = Ghw11::decryption_keys(&gp, &[&a1, &a2], &key, &registration, &ct, 1).unwrap();
        assert_eq!(
            Ghw11::decrypt_wrapped(&gp, &tk, "alice", &ct, &sym, &registration).unwrap(),
            plaintext
        );
    }

    #[test]
    fn test_proxy_split() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(
            &central,
            "alice",
            &[(&a1, &["ONE@A1"]), (&a2, &["THREE@A2"])],
            1,
        );
        let pks = Ghw11::merge_public_keys(&[a1.public_keys(1), a2.public_keys(1)], 1).unwrap();
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Ghw11::encrypt(&gp, &pks, &msg, "ONE@A1 or THREE@A2", 1).unwrap();
        // the transformation key travels to the proxy as bytes
        let tk = transformation_keys(&gp, &key, &registration).unwrap();
        let tk_bytes = serialize_transformation_key(&tk).unwrap();
        let proxy_tk = deserialize_transformation_key(&tk_bytes).unwrap();
        let partial = transform(&proxy_tk, &ct).unwrap();
        // the proxy's output alone does not reveal the message
        assert_ne!(partial.b * partial.x, msg);
        assert_eq!(decrypt_out(&partial, &registration), msg);
    }

    #[test]
    fn test_insufficient_attributes() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(&central, "bob", &[(&a1, &["TWO@A1"])], 1);
        let pks = Ghw11::merge_public_keys(&[a1.public_keys(1), a2.public_keys(1)], 1).unwrap();
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Ghw11::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        let tk = transformation_keys(&gp, &key, &registration).unwrap();
        assert_eq!(transform(&tk, &ct), Err(AbeError::PolicyNotSatisfied));
        assert_eq!(
            Ghw11::decrypt(&gp, &tk, "bob", &ct, &registration),
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
        let pks = Ghw11::merge_public_keys(&[a1.public_keys(1), a2.public_keys(1)], 1).unwrap();
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Ghw11::encrypt(&gp, &pks, &msg, "ONE@A1 and THREE@A2", 1).unwrap();
        let tk = transformation_keys(&gp, &key, &registration).unwrap();
        assert_eq!(
            Ghw11::decrypt(&gp, &tk, "alice", &ct, &registration),
            Err(AbeError::PolicyNotSatisfied)
        );
    }

    #[test]
    fn test_wrong_retrieval_key_garbles() {
        let (central, gp, a1, a2) = deployment();
        let (registration, key) = user_key(&central, "alice", &[(&a1, &["ONE@A1"])], 1);
        let pks = Ghw11::merge_public_keys(&[a1.public_keys(1), a2.public_keys(1)], 1).unwrap();
        let mut rng = rand::thread_rng();
        let msg: Gt = pairing(rng.gen(), rng.gen());
        let ct = Ghw11::encrypt(&gp, &pks, &msg, "ONE@A1", 1).unwrap();
        let tk = transformation_keys(&gp, &key, &registration).unwrap();
        let partial = transform(&tk, &ct).unwrap();
        let wrong = Ghw11Registration {
            gid: "alice".to_string(),
            z: rng.gen(),
        };
        assert_ne!(decrypt_out(&partial, &wrong), msg);
        assert_eq!(decrypt_out(&partial, &registration), msg);
    }
}
