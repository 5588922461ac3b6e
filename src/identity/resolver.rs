use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::identity::keystore::{Certificate, Entry, Keystore, KeystoreError, PrivateKeyEntry};

/// Errors raised while deriving a username from a keystore.
///
/// `Keystore` covers an unusable store (unknown alias, wrong passphrase);
/// the other variants mean the store loaded fine but holds no usable
/// identity. All of them fail relay construction closed, so a
/// misconfigured keystore is never masked by an empty username.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("keystore unusable: {0}")]
    Keystore(#[from] KeystoreError),

    #[error("no private key entry in the keystore")]
    NoPrivateKey,

    #[error("certificate of key entry '{alias}' is not X.509")]
    NotX509 { alias: String },

    #[error("no CN in subject DN '{dn}' of key entry '{alias}'")]
    NoCommonName { alias: String, dn: String },
}

/// Matches the first `CN=` component of a comma-separated subject DN and
/// captures its value. The value itself never contains a comma.
static SUBJECT_CN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:|.+?,)CN=([^,]+).*$").expect("subject CN pattern"));

/// Derives a display identity from the subject common name of the keystore's
/// private-key certificate.
///
/// Aliases are scanned in lexicographic order and the last private-key entry
/// wins; an absent `key_passphrase` is treated as the empty passphrase. Pure
/// and deterministic, no I/O.
pub fn resolve_identity(
    keystore: &dyn Keystore,
    key_passphrase: Option<&str>,
) -> Result<String, IdentityError> {
    let mut aliases = keystore.aliases();
    aliases.sort();

    let mut private_key: Option<(String, PrivateKeyEntry)> = None;
    for alias in aliases {
        if !keystore.is_key_entry(&alias) {
            continue;
        }
        if let Entry::PrivateKey(entry) = keystore.entry(&alias, key_passphrase)? {
            private_key = Some((alias, entry));
        }
    }

    let (alias, entry) = private_key.ok_or(IdentityError::NoPrivateKey)?;
    let Certificate::X509 { subject_dn } = entry.certificate else {
        return Err(IdentityError::NotX509 { alias });
    };

    debug!("deriving username from subject DN '{subject_dn}' of key entry '{alias}'");
    let captures = SUBJECT_CN
        .captures(&subject_dn)
        .ok_or_else(|| IdentityError::NoCommonName {
            alias,
            dn: subject_dn.clone(),
        })?;
    Ok(captures[1].to_string())
}
