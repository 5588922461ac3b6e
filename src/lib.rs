//! # chatrelay
//!
//! `chatrelay` is a minimalist multi-room chat relay that sits in front of a
//! message broker. Messages sent by a user are published to the broker topic
//! of the selected room; records delivered back by the broker (including the
//! sender's own, echoed) are fanned out to every registered listener. When a
//! TLS client certificate is configured, the chat username is derived from
//! the certificate subject's common name instead of being asked for
//! interactively.
//!
//! ## Core Modules
//!
//! The library is structured into several modules, each with a distinct responsibility:
//!
//! - `relay`: The central component that owns the listener registry and fans inbound records out to listeners.
//! - `broker`: The publish/subscribe contract towards the broker, plus an in-process loopback broker.
//! - `identity`: Derives the chat username from a loaded certificate keystore.
//! - `config`: Handles loading and managing the relay configuration.
//! - `utils`: Contains shared utilities, such as logging setup.

pub mod broker;
pub mod config;
pub mod identity;
pub mod relay;
pub mod utils;
