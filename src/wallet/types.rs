//! Credential type and wallet error definitions.

use alloy::primitives::{hex, Address};
use alloy::signers::local::PrivateKeySigner;
use thiserror::Error;

/// Errors that can occur in the wallet subsystem.
#[derive(Debug, Error)]
pub enum WalletError {
    /// No usable private key from the wallet file or the fallback.
    #[error("no credentials available: {0}")]
    NoCredentials(String),

    /// Private key failed to parse as a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Signature hex string failed to decode.
    #[error("invalid signature encoding: {0}")]
    SignatureHex(String),

    /// Decoded signature was not exactly 65 bytes.
    #[error("invalid signature length: expected 65 bytes, got {0}")]
    SignatureLength(usize),

    /// Wire recovery byte was outside the Ethereum `{27, 28}` range.
    #[error("invalid recovery byte: {0} (expected 27 or 28)")]
    RecoveryId(u8),

    /// Public key recovery from the signature failed.
    #[error("failed to recover public key: {0}")]
    Recovery(String),

    /// Signing the digest failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// Expected address string failed to parse.
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
}

/// Result type for wallet operations.
pub type WalletResult<T> = Result<T, WalletError>;

/// One account identity: a private key with its derived address and
/// compressed public key.
///
/// Derivations happen once at construction; the credential is immutable
/// afterwards and shared read-only across workers.
#[derive(Clone)]
pub struct Credential {
    signer: PrivateKeySigner,
    address: Address,
    compressed_public_key: [u8; 33],
}

impl Credential {
    /// Build a credential from a hex-encoded private key (with or without
    /// a `0x` prefix).
    ///
    /// Rejects keys that are not a valid non-zero scalar below the curve
    /// order.
    pub fn from_hex(private_key_hex: &str) -> WalletResult<Self> {
        let key_hex = private_key_hex
            .strip_prefix("0x")
            .unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| WalletError::InvalidKey(format!("{e}")))?;

        let address = signer.address();
        let point = signer.credential().verifying_key().to_encoded_point(true);
        let mut compressed_public_key = [0u8; 33];
        compressed_public_key.copy_from_slice(point.as_bytes());

        Ok(Self {
            signer,
            address,
            compressed_public_key,
        })
    }

    /// The 20-byte address derived from the key.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The 33-byte SEC1 compressed public key.
    pub fn compressed_public_key(&self) -> &[u8; 33] {
        &self.compressed_public_key
    }

    /// Hex rendering of the compressed public key.
    pub fn compressed_public_key_hex(&self) -> String {
        hex::encode(self.compressed_public_key)
    }

    /// The underlying signer.
    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.debug_struct("Credential")
            .field("address", &self.address)
            .field("compressed_public_key", &self.compressed_public_key_hex())
            .finish()
    }
}
