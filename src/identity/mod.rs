//! The `identity` module derives the chat username from a TLS client
//! certificate when one is configured.
//!
//! It consumes an already-loaded [`Keystore`] (file parsing is the embedding
//! application's concern), finds the private-key entry and extracts the
//! subject common name of its X.509 certificate. A missing keystore simply
//! means no certificate identity; a present but unusable one is an error,
//! so misconfiguration never degrades silently into interactive login.

pub mod keystore;
pub mod resolver;

pub use keystore::{Certificate, Entry, Keystore, KeystoreError, MemoryKeystore, PrivateKeyEntry};
pub use resolver::{IdentityError, resolve_identity};
