#![deny(clippy::unwrap_used)]

//! SSH login with OpenSSH-style credential fallback.
//!
//! See [`ssh`] for the module layout and [`ssh::client::connect`] for the
//! usual entry point.

pub mod ssh;
