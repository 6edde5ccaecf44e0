//! # identity-gateway
//!
//! A thin client for the Google Identity Platform REST API. It covers four calls:
//!
//! - `accounts:signUp` (email/password or anonymous)
//! - `accounts:signInWithPassword`
//! - `accounts:signInWithCustomToken`
//! - `accounts:lookup` (ID token validation)
//!
//! Every call goes through the same pipeline: resolve the API key, serialize the
//! payload, `POST` it to `<endpoint>?key=<API key>`, read the whole body, then branch
//! on the status code. Password based flows attach key material for the returned ID
//! token through a [`identity::KeyMaterialExtractor`].
//!
//! The `identity-gateway` binary wraps the same client for use from a shell.

pub mod cli;
pub mod identity;
