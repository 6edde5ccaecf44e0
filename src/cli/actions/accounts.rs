use crate::identity::{Credentials, IdentityClient};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use tracing::info;

fn print_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;

    Ok(())
}

/// Validate an ID token and print the account data.
/// # Errors
/// Returns an error if the lookup fails or the output cannot be written.
pub async fn lookup<W: Write>(client: &IdentityClient, id_token: &str, out: &mut W) -> Result<()> {
    let account = client
        .validate_id_token(id_token)
        .await
        .context("ID token lookup failed")?;

    print_json(out, &account)
}

/// Sign in with email and password and print the session.
/// # Errors
/// Returns an error if the sign-in fails or the output cannot be written.
pub async fn sign_in<W: Write>(
    client: &IdentityClient,
    credentials: &Credentials,
    out: &mut W,
) -> Result<()> {
    let session = client
        .authenticate(credentials)
        .await
        .context("sign-in failed")?;

    info!("signed in {}", session.local_id);

    print_json(out, &session)
}

/// Create an account and print the session.
/// # Errors
/// Returns an error if the sign-up fails or the output cannot be written.
pub async fn sign_up<W: Write>(
    client: &IdentityClient,
    credentials: &Credentials,
    out: &mut W,
) -> Result<()> {
    let session = client
        .sign_up(credentials)
        .await
        .context("sign-up failed")?;

    info!("created account {}", session.local_id);

    print_json(out, &session)
}

/// Exchange a custom token and print the provider response.
/// # Errors
/// Returns an error if the exchange fails or the output cannot be written.
pub async fn sign_in_custom<W: Write>(
    client: &IdentityClient,
    token: &str,
    out: &mut W,
) -> Result<()> {
    let response = client
        .sign_in_with_custom_token(token)
        .await
        .context("custom token sign-in failed")?;

    print_json(out, &response)
}
