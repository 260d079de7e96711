//! Credential loading with a load-once cache.
//!
//! # Responsibilities
//! - Read the newline-delimited wallet file (blank lines ignored)
//! - Fall back to the single `PRIVATE_KEY` environment key
//! - Derive every credential once; skip (and log) malformed keys
//! - Cache the result for the process lifetime
//!
//! # Design Decisions
//! - The store is an explicit object the supervisor constructs once and
//!   hands to consumers; the once-only guard lives inside the store, not
//!   in ambient static state
//! - A second `load` never re-reads the file, even if it changed on disk

use std::fs;
use std::path::PathBuf;

use tokio::sync::OnceCell;

use crate::config::AppConfig;
use crate::wallet::types::{Credential, WalletError, WalletResult};

/// Load-once source of account credentials.
pub struct CredentialStore {
    wallet_path: PathBuf,
    fallback_key: Option<String>,
    cache: OnceCell<Vec<Credential>>,
}

impl CredentialStore {
    /// Create a store bound to the configured wallet file and fallback key.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            wallet_path: PathBuf::from(&config.wallet_file),
            fallback_key: config.fallback_private_key.clone(),
            cache: OnceCell::new(),
        }
    }

    /// Load and cache all credentials.
    ///
    /// The first successful call reads the wallet file (or the fallback
    /// key); every later call returns the same cached slice.
    pub async fn load(&self) -> WalletResult<&[Credential]> {
        self.cache
            .get_or_try_init(|| async { self.read_credentials() })
            .await
            .map(Vec::as_slice)
    }

    fn read_credentials(&self) -> WalletResult<Vec<Credential>> {
        let keys = self.read_key_lines()?;

        let mut credentials = Vec::with_capacity(keys.len());
        for (index, key) in keys.iter().enumerate() {
            match Credential::from_hex(key) {
                Ok(credential) => credentials.push(credential),
                Err(error) => {
                    // Batch derivation skips bad keys; single-key paths
                    // (Credential::from_hex) propagate instead.
                    tracing::warn!(line = index + 1, %error, "skipping invalid private key");
                }
            }
        }

        if credentials.is_empty() {
            return Err(WalletError::NoCredentials(
                "wallet file contained no valid private keys".to_string(),
            ));
        }

        Ok(credentials)
    }

    /// Raw key lines: wallet file first, `PRIVATE_KEY` fallback when the
    /// file is absent or empty.
    fn read_key_lines(&self) -> WalletResult<Vec<String>> {
        let lines = match fs::read_to_string(&self.wallet_path) {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>(),
            Err(error) => {
                tracing::debug!(
                    path = %self.wallet_path.display(),
                    %error,
                    "wallet file unreadable; trying fallback key"
                );
                Vec::new()
            }
        };

        if !lines.is_empty() {
            return Ok(lines);
        }

        match &self.fallback_key {
            Some(key) if !key.trim().is_empty() => Ok(vec![key.trim().to_string()]),
            _ => Err(WalletError::NoCredentials(format!(
                "'{}' is missing or empty and no fallback PRIVATE_KEY is set",
                self.wallet_path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KEY_A: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const KEY_B: &str = "59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

    fn temp_wallet(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "fleet-node-wallet-{}-{}.txt",
            name,
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    fn store_for(path: &PathBuf, fallback: Option<&str>) -> CredentialStore {
        let mut config = AppConfig::default();
        config.wallet_file = path.display().to_string();
        config.fallback_private_key = fallback.map(str::to_string);
        CredentialStore::new(&config)
    }

    #[tokio::test]
    async fn test_loads_all_keys_skipping_blanks() {
        let path = temp_wallet("blanks", &format!("{}\n\n  \n{}\n", KEY_A, KEY_B));
        let store = store_for(&path, None);
        let creds = store.load().await.unwrap();
        assert_eq!(creds.len(), 2);
        fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_invalid_key_is_skipped_not_fatal() {
        let path = temp_wallet("invalid", &format!("{}\nnot-a-key\n{}\n", KEY_A, KEY_B));
        let store = store_for(&path, None);
        let creds = store.load().await.unwrap();
        assert_eq!(creds.len(), 2);
        fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_fallback_key_when_file_missing() {
        let path = std::env::temp_dir().join("fleet-node-wallet-nonexistent.txt");
        let store = store_for(&path, Some(KEY_A));
        let creds = store.load().await.unwrap();
        assert_eq!(creds.len(), 1);
        assert_eq!(
            creds[0].address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[tokio::test]
    async fn test_no_keys_anywhere_is_an_error() {
        let path = std::env::temp_dir().join("fleet-node-wallet-nonexistent2.txt");
        let store = store_for(&path, None);
        assert!(matches!(
            store.load().await,
            Err(WalletError::NoCredentials(_))
        ));
    }

    #[tokio::test]
    async fn test_second_load_ignores_file_mutation() {
        let path = temp_wallet("cache", &format!("{}\n", KEY_A));
        let store = store_for(&path, None);

        let first = store.load().await.unwrap();
        assert_eq!(first.len(), 1);
        let first_addr = first[0].address();

        // Mutate the backing file; the cache must not observe it.
        fs::write(&path, format!("{}\n{}\n", KEY_A, KEY_B)).unwrap();

        let second = store.load().await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].address(), first_addr);
        fs::remove_file(&path).ok();
    }
}
