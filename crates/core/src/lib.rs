pub mod credential;
pub mod dispatch;
pub mod message;
pub mod record;
pub mod types;

pub use credential::Credential;
pub use dispatch::{DispatchRequest, DispatchResult};
pub use message::{InboundMessage, RECEIVE_COUNT_ATTRIBUTE};
pub use record::ProcessedRecord;
pub use types::{AckToken, MessageId};
