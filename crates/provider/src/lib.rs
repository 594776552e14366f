pub mod acknowledger;
pub mod credential;
pub mod dispatcher;
pub mod error;
pub mod log;

pub use acknowledger::MessageAcknowledger;
pub use credential::CredentialProvider;
pub use dispatcher::{ActionDispatcher, DynActionDispatcher};
pub use error::{AckError, CredentialError};
pub use log::LogDispatcher;
