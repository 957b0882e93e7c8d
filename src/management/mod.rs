mod auth;
mod run;

pub use auth::TokenManager;
pub use run::RunState;
pub use run::RunStateManager;
