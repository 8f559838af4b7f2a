use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce};
use rand::Rng;
use sha3::{Digest, Sha3_256};

use crate::error::AbeError;

/// Key encapsulation mechanism (encryption function).
///
/// Derives an AES-256-GCM key from `msg` (a group element produced by one of
/// the ABE schemes) and encrypts `plaintext` under it. The 12 byte nonce is
/// prefixed to the returned ciphertext.
pub fn encrypt_symmetric<T: std::fmt::Debug>(
    msg: &T,
    plaintext: &[u8],
) -> Result<Vec<u8>, AbeError> {
    let mut rng = rand::thread_rng();
    let nonce_bytes: [u8; 12] = rng.gen();
    let key = kdf(msg);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    match cipher.encrypt(Nonce::from_slice(&nonce_bytes), plaintext) {
        Ok(ct) => Ok([nonce_bytes.to_vec(), ct].concat()),
        Err(e) => Err(e.into()),
    }
}

/// Key encapsulation mechanism (decryption function).
///
/// Re-derives the key from `msg` exactly as [`encrypt_symmetric`] did; the
/// key itself is never transmitted.
pub fn decrypt_symmetric<T: std::fmt::Debug>(
    msg: &T,
    nonce_ct: &[u8],
) -> Result<Vec<u8>, AbeError> {
    if nonce_ct.len() < 12 {
        return Err(AbeError::SymmetricCrypto(
            "ciphertext too short for nonce".to_string(),
        ));
    }
    let (nonce_bytes, ct) = nonce_ct.split_at(12);
    let key = kdf(msg);
    let cipher = Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(&key));
    match cipher.decrypt(Nonce::from_slice(nonce_bytes), ct) {
        Ok(data) => Ok(data),
        Err(e) => Err(e.into()),
    }
}

// 256 bit key from the canonical rendering of the group element, identical
// on the encrypt and decrypt paths.
fn kdf<T: std::fmt::Debug>(data: &T) -> Vec<u8> {
    let mut hasher = Sha3_256::new();
    hasher.update(format!("{:?}", data).as_bytes());
    hasher.finalize().to_vec()
}
