//! Idempotent processing of provisioning-queue messages.
//!
//! The [`Orchestrator`] drives one message at a time through
//! deduplication, credential fetch, workflow dispatch, durable recording and
//! acknowledgment. A message is recorded only after the dispatch is accepted
//! and acknowledged only after the record exists, so every failure leaves
//! the message on the queue for redelivery.

pub mod builder;
pub mod error;
pub mod event;
pub mod metrics;
pub mod processor;
pub mod state;
pub mod template;
pub mod testing;

pub use builder::{BuildError, OrchestratorBuilder};
pub use error::{ProcessingError, ProcessingFailure};
pub use event::{SqsEvent, SqsRecord};
pub use metrics::{ConsumerMetrics, MetricsSnapshot};
pub use processor::{Orchestrator, ProcessingOutcome, ProcessingReport};
pub use state::ProcessingState;
pub use template::RequestTemplate;
