//! Personal-sign signatures and recovery-based verification.
//!
//! # Responsibilities
//! - Hash messages under the Ethereum personal-sign convention
//! - Produce 65-byte recoverable signatures, hex-encoded
//! - Recover the signer address from a signature and compare it
//!
//! # Wire Format
//! A signature is `r(32) ‖ s(32) ‖ v(1)` where the hex encoding carries
//! `v ∈ {27, 28}` (Electrum convention) while the recovery primitive wants
//! the raw parity bit. The `+27` on sign and `-27` on verify are part of
//! the contract; dropping either silently breaks every verification.

use alloy::primitives::{hex, keccak256, Address, Signature, B256, U256};
use alloy::signers::SignerSync;

use crate::wallet::types::{Credential, WalletError, WalletResult};

const PERSONAL_SIGN_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

/// Keccak digest of the personal-sign envelope:
/// `0x19 ‖ "Ethereum Signed Message:\n" ‖ decimal length ‖ message`.
fn personal_digest(message: &[u8]) -> B256 {
    let length = message.len().to_string();
    let mut data = Vec::with_capacity(PERSONAL_SIGN_PREFIX.len() + length.len() + message.len());
    data.extend_from_slice(PERSONAL_SIGN_PREFIX);
    data.extend_from_slice(length.as_bytes());
    data.extend_from_slice(message);
    keccak256(data)
}

/// Sign `message` with the credential's key under the personal-sign
/// convention.
///
/// Returns the 0x-prefixed hex encoding of the 65-byte signature.
pub fn sign_message(credential: &Credential, message: &[u8]) -> WalletResult<String> {
    let digest = personal_digest(message);
    let signature = credential
        .signer()
        .sign_hash_sync(&digest)
        .map_err(|e| WalletError::Signing(e.to_string()))?;

    let mut raw = [0u8; 65];
    raw[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
    raw[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
    // Recovery id shifted into the {27, 28} wire range
    raw[64] = 27 + signature.v() as u8;

    Ok(hex::encode_prefixed(raw))
}

/// Verify a hex-encoded personal-sign signature over `message`.
///
/// Returns `Ok(true)` when the recovered signer equals `expected_address`
/// (case-insensitive hex comparison), `Ok(false)` on a mismatch, and an
/// error when the signature is malformed or recovery fails.
pub fn verify_message(
    signature_hex: &str,
    message: &[u8],
    expected_address: &str,
) -> WalletResult<bool> {
    let bytes =
        hex::decode(signature_hex).map_err(|e| WalletError::SignatureHex(e.to_string()))?;
    if bytes.len() != 65 {
        return Err(WalletError::SignatureLength(bytes.len()));
    }

    let parity = match bytes[64] {
        27 => false,
        28 => true,
        other => return Err(WalletError::RecoveryId(other)),
    };

    let r = U256::from_be_slice(&bytes[..32]);
    let s = U256::from_be_slice(&bytes[32..64]);
    let signature = Signature::new(r, s, parity);

    let digest = personal_digest(message);
    let recovered = signature
        .recover_address_from_prehash(&digest)
        .map_err(|e| WalletError::Recovery(e.to_string()))?;

    let expected: Address = expected_address
        .parse()
        .map_err(|_| WalletError::InvalidAddress(expected_address.to_string()))?;

    Ok(recovered == expected)
}
