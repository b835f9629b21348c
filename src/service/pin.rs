use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Hex SHA-256 of the PIN; this is what the `pin_hash` column stores.
pub fn hash_pin(pin: &str) -> String {
    hex::encode(Sha256::digest(pin.as_bytes()))
}

pub fn verify_pin(pin: &str, stored_hash: &str) -> bool {
    let computed = hash_pin(pin);
    bool::from(computed.as_bytes().ct_eq(stored_hash.as_bytes()))
}
