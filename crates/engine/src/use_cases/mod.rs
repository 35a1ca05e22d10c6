//! Use cases - one struct per player or GM action.
//!
//! Each module groups the use cases for one area of a session's life.
//! Every write goes through the session's mailbox; reads go straight to the
//! store.

pub mod dice;
pub mod gameplay;
pub mod lobby;
pub mod maintenance;
pub mod query;
pub mod setup;

mod error;

pub use error::SessionError;
pub use gameplay::GameplayUseCases;
pub use lobby::LobbyUseCases;
pub use maintenance::MaintenanceUseCases;
pub use query::QueryUseCases;
pub use setup::SetupUseCases;
