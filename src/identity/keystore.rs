use std::collections::HashMap;

use thiserror::Error;

/// Keystore access errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("no entry for alias '{0}'")]
    NoSuchAlias(String),

    #[error("entry '{0}' is not a key entry")]
    NotAKeyEntry(String),

    #[error("wrong passphrase for key entry '{0}'")]
    BadPassphrase(String),
}

/// A certificate attached to a keystore entry.
///
/// Only X.509 certificates carry a subject distinguished name the relay can
/// derive a username from; anything else is opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Certificate {
    X509 { subject_dn: String },
    Opaque { kind: String },
}

/// A private-key entry together with its certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyEntry {
    pub certificate: Certificate,
}

/// A single keystore entry, as returned by [`Keystore::entry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    PrivateKey(PrivateKeyEntry),
    SecretKey,
    TrustedCertificate(Certificate),
}

impl Entry {
    /// Key entries require a passphrase to retrieve; trusted certificates do not.
    pub fn is_key(&self) -> bool {
        matches!(self, Entry::PrivateKey(_) | Entry::SecretKey)
    }
}

/// An already-opened, already-loaded certificate keystore.
///
/// Opening and parsing keystore files is the embedding application's job;
/// the relay only enumerates aliases and retrieves entries. An absent
/// passphrase is treated as the empty passphrase.
pub trait Keystore {
    /// All entry aliases, in no particular order.
    fn aliases(&self) -> Vec<String>;

    /// Whether the alias names a key entry (private or secret key).
    fn is_key_entry(&self, alias: &str) -> bool;

    /// Retrieves the entry for `alias`, unlocking it with `passphrase` if it
    /// is a key entry.
    fn entry(&self, alias: &str, passphrase: Option<&str>) -> Result<Entry, KeystoreError>;
}

/// An in-memory [`Keystore`] implementation.
///
/// Used by the tests and by embeddings that assemble their entries from
/// sources other than a keystore file.
#[derive(Debug, Default)]
pub struct MemoryKeystore {
    entries: HashMap<String, StoredEntry>,
}

#[derive(Debug)]
struct StoredEntry {
    passphrase: String,
    entry: Entry,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a private-key entry holding an X.509 certificate with the given
    /// subject DN, unlocked by `passphrase` (empty string = no passphrase).
    pub fn with_private_key(mut self, alias: &str, subject_dn: &str, passphrase: &str) -> Self {
        self.entries.insert(
            alias.to_string(),
            StoredEntry {
                passphrase: passphrase.to_string(),
                entry: Entry::PrivateKey(PrivateKeyEntry {
                    certificate: Certificate::X509 {
                        subject_dn: subject_dn.to_string(),
                    },
                }),
            },
        );
        self
    }

    /// Adds an arbitrary entry, unlocked by `passphrase` when it is a key entry.
    pub fn with_entry(mut self, alias: &str, entry: Entry, passphrase: &str) -> Self {
        self.entries.insert(
            alias.to_string(),
            StoredEntry {
                passphrase: passphrase.to_string(),
                entry,
            },
        );
        self
    }
}

impl Keystore for MemoryKeystore {
    fn aliases(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn is_key_entry(&self, alias: &str) -> bool {
        self.entries
            .get(alias)
            .is_some_and(|stored| stored.entry.is_key())
    }

    fn entry(&self, alias: &str, passphrase: Option<&str>) -> Result<Entry, KeystoreError> {
        let stored = self
            .entries
            .get(alias)
            .ok_or_else(|| KeystoreError::NoSuchAlias(alias.to_string()))?;
        if stored.entry.is_key() && passphrase.unwrap_or("") != stored.passphrase {
            return Err(KeystoreError::BadPassphrase(alias.to_string()));
        }
        Ok(stored.entry.clone())
    }
}
