//! Encrypted key storage boundary.
//!
//! Keys live in Web3 secret-storage JSON files; the file's `address` field
//! locates the entry without decrypting it.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::signer::SignerError;

/// Unlocks the key of one account for the duration of a signing call.
pub trait Keystore: Send + Sync {
    fn unlock(&self, address: Address, passphrase: &str) -> Result<PrivateKeySigner, SignerError>;
}

#[derive(Deserialize)]
struct KeyFileHeader {
    #[serde(default)]
    address: Option<String>,
}

/// A directory tree of keystore files.
#[derive(Debug, Clone)]
pub struct KeystoreDir {
    root: PathBuf,
}

impl KeystoreDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every keystore file with its declared address.
    pub fn entries(&self) -> Result<Vec<(Address, PathBuf)>, SignerError> {
        let mut entries = Vec::new();
        collect_entries(&self.root, &mut entries)?;
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        Ok(entries)
    }

    /// The file holding `address`'s key.
    pub fn find(&self, address: Address) -> Result<PathBuf, SignerError> {
        self.entries()?
            .into_iter()
            .find(|(candidate, _)| *candidate == address)
            .map(|(_, path)| path)
            .ok_or_else(|| SignerError::UnknownAccount(address.to_string()))
    }
}

fn collect_entries(dir: &Path, out: &mut Vec<(Address, PathBuf)>) -> Result<(), SignerError> {
    let listing = fs::read_dir(dir)
        .map_err(|e| SignerError::Keystore(format!("cannot read {}: {}", dir.display(), e)))?;
    for entry in listing.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_entries(&path, out)?;
            continue;
        }
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        let Ok(header) = serde_json::from_str::<KeyFileHeader>(&content) else {
            tracing::trace!(path = %path.display(), "Skipping non-keystore file");
            continue;
        };
        let Some(raw) = header.address else {
            continue;
        };
        let hex = raw.strip_prefix("0x").unwrap_or(&raw);
        if let Ok(address) = hex.parse::<Address>() {
            out.push((address, path));
        }
    }
    Ok(())
}

impl Keystore for KeystoreDir {
    fn unlock(&self, address: Address, passphrase: &str) -> Result<PrivateKeySigner, SignerError> {
        let path = self.find(address)?;
        let signer = PrivateKeySigner::decrypt_keystore(&path, passphrase)
            .map_err(|e| SignerError::Keystore(format!("cannot unlock {}: {}", address, e)))?;
        if signer.address() != address {
            return Err(SignerError::Keystore(format!(
                "{} decrypts to {}, not {}",
                path.display(),
                signer.address(),
                address
            )));
        }
        tracing::debug!(%address, "Keystore entry unlocked");
        Ok(signer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const FIXTURE: &str = include_str!("../../tests/fixtures/keystore.json");
    const FIXTURE_ADDRESS: Address = address!("70997970c51812dc3a010c7d01b50e0d17dc79c8");

    fn keystore_with_fixture() -> (tempfile::TempDir, KeystoreDir) {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("accounts");
        fs::create_dir(&nested).unwrap();
        fs::write(nested.join("UTC--fixture"), FIXTURE).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a key").unwrap();
        let keystore = KeystoreDir::new(dir.path());
        (dir, keystore)
    }

    #[test]
    fn test_entries_scan_nested_dirs() {
        let (_dir, keystore) = keystore_with_fixture();
        let entries = keystore.entries().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0, FIXTURE_ADDRESS);
    }

    #[test]
    fn test_unlock_with_passphrase() {
        let (_dir, keystore) = keystore_with_fixture();
        let signer = keystore.unlock(FIXTURE_ADDRESS, "hunter2").unwrap();
        assert_eq!(signer.address(), FIXTURE_ADDRESS);
    }

    #[test]
    fn test_wrong_passphrase() {
        let (_dir, keystore) = keystore_with_fixture();
        let err = keystore.unlock(FIXTURE_ADDRESS, "wrong").unwrap_err();
        assert!(matches!(err, SignerError::Keystore(_)));
    }

    #[test]
    fn test_unknown_account() {
        let (_dir, keystore) = keystore_with_fixture();
        let err = keystore.unlock(Address::ZERO, "hunter2").unwrap_err();
        assert!(matches!(err, SignerError::UnknownAccount(_)));
    }
}
