//! Signature and hashing primitives
//!
//! Signatures are secp256k1 ECDSA over the SHA-256 digest of a message,
//! DER-encoded. Identifiers are double SHA-256 of a canonical encoding.

use crate::error::{LedgerError, Result};
use crate::types::*;
use bitcoin_hashes::{sha256d, Hash as BitcoinHash, HashEngine};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// VerifySignature: public key × message × signature → {true, false}
///
/// Malformed keys or signatures are indistinguishable from a failed check.
pub fn verify_signature(public_key: &[u8], message: &[u8], signature: &[u8]) -> bool {
    let pubkey = match PublicKey::from_slice(public_key) {
        Ok(pk) => pk,
        Err(_) => return false,
    };

    let signature = match Signature::from_der(signature) {
        Ok(sig) => sig,
        Err(_) => return false,
    };

    let message = Message::from_digest(sha256_hash(message));

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &pubkey).is_ok()
}

/// Sign `message` with a raw 32-byte secret key, returning a DER signature
pub fn sign_message(secret_key: &[u8], message: &[u8]) -> Result<ByteString> {
    let secret = parse_secret_key(secret_key)?;
    let message = Message::from_digest(sha256_hash(message));

    let secp = Secp256k1::signing_only();
    Ok(secp.sign_ecdsa(&message, &secret).serialize_der().to_vec())
}

/// Compressed public key belonging to a raw 32-byte secret key
pub fn public_key_from_secret(secret_key: &[u8]) -> Result<ByteString> {
    let secret = parse_secret_key(secret_key)?;
    let secp = Secp256k1::signing_only();
    Ok(PublicKey::from_secret_key(&secp, &secret).serialize().to_vec())
}

fn parse_secret_key(secret_key: &[u8]) -> Result<SecretKey> {
    SecretKey::from_slice(secret_key).map_err(|e| LedgerError::InvalidSecretKey(e.to_string()))
}

/// Single SHA-256, used as the signing digest
pub fn sha256_hash(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Double SHA-256, used for transaction and block identifiers
pub fn sha256d_hash(data: &[u8]) -> Hash {
    let mut engine = sha256d::Hash::engine();
    engine.input(data);
    sha256d::Hash::from_engine(engine).into_inner()
}

/// Short hex rendering of a hash for log lines
pub(crate) fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..8])
}
