use ace_core::errors::{AceError, ErrorInfo};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, AceError> {
    let bytes = serde_json::to_vec(value).map_err(|err| {
        AceError::Serde(ErrorInfo::new("hash-encode", err.to_string()))
    })?;
    let digest = Sha256::digest(bytes);
    Ok(format!("{:x}", digest))
}
