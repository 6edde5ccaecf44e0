pub mod accounts;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::cli::globals::GlobalArgs;
use crate::identity::Credentials;

#[derive(Debug)]
pub enum Action {
    Lookup {
        globals: GlobalArgs,
        id_token: String,
    },
    SignIn {
        globals: GlobalArgs,
        credentials: Credentials,
    },
    SignUp {
        globals: GlobalArgs,
        credentials: Credentials,
    },
    SignInCustom {
        globals: GlobalArgs,
        token: String,
    },
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
