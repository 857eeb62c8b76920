pub mod browse;
pub mod session;

mod run;

use crate::{auth::types::Role, cli::globals::GlobalArgs};

#[derive(Debug)]
pub enum Action {
    Login(session::LoginArgs),
    Register(session::RegisterArgs),
    Logout,
    Whoami,
    SetRole(Role),
    Open { path: String },
    Experiences(browse::ExperiencesArgs),
    Bookings(browse::BookingsArgs),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self, globals: &GlobalArgs) -> anyhow::Result<()> {
        run::execute(self, globals).await
    }
}
