use crate::cli::actions::{accounts, Action};
use anyhow::Result;
use std::io::stdout;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let mut out = stdout();

    match action {
        Action::Lookup { globals, id_token } => {
            accounts::lookup(&globals.client()?, &id_token, &mut out).await
        }
        Action::SignIn {
            globals,
            credentials,
        } => accounts::sign_in(&globals.client()?, &credentials, &mut out).await,
        Action::SignUp {
            globals,
            credentials,
        } => accounts::sign_up(&globals.client()?, &credentials, &mut out).await,
        Action::SignInCustom { globals, token } => {
            accounts::sign_in_custom(&globals.client()?, &token, &mut out).await
        }
    }
}
