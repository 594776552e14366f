use std::fmt;

use serde::{Deserialize, Serialize};

/// States a message passes through while being processed.
///
/// ```text
/// Received -> Deduplicating -> AlreadyProcessed -----------------------> Acknowledging -> Done
///                          \-> FetchingCredential -> Dispatching -> Dispatched -> Recording -/
///                                                              \-> DispatchFailed -> Failed
/// ```
///
/// Any state may move to `Failed`. `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingState {
    Received,
    Deduplicating,
    AlreadyProcessed,
    FetchingCredential,
    Dispatching,
    Dispatched,
    DispatchFailed,
    Recording,
    Acknowledging,
    Done,
    Failed,
}

impl ProcessingState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Deduplicating => "deduplicating",
            Self::AlreadyProcessed => "already_processed",
            Self::FetchingCredential => "fetching_credential",
            Self::Dispatching => "dispatching",
            Self::Dispatched => "dispatched",
            Self::DispatchFailed => "dispatch_failed",
            Self::Recording => "recording",
            Self::Acknowledging => "acknowledging",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl fmt::Display for ProcessingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states() {
        assert!(ProcessingState::Done.is_terminal());
        assert!(ProcessingState::Failed.is_terminal());
        assert!(!ProcessingState::AlreadyProcessed.is_terminal());
        assert!(!ProcessingState::Acknowledging.is_terminal());
    }

    #[test]
    fn display_matches_serde() {
        let json = serde_json::to_string(&ProcessingState::FetchingCredential).unwrap();
        assert_eq!(json, "\"fetching_credential\"");
        assert_eq!(
            ProcessingState::FetchingCredential.to_string(),
            "fetching_credential"
        );
    }
}
