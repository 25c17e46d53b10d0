//! Delivery plans for generated documents.

use std::fmt;
use std::path::PathBuf;

/// Where generated documents go, decided before any I/O happens.
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    pub targets: Vec<DeliveryTarget>,
}

impl OutputPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: DeliveryTarget) -> Self {
        self.targets.push(target);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryTarget {
    WriteFile { path: PathBuf, content: String },
    CopyToClipboard { content: String },
    PrintToStdout { content: String },
}

impl DeliveryTarget {
    pub fn content(&self) -> &str {
        match self {
            Self::WriteFile { content, .. }
            | Self::CopyToClipboard { content }
            | Self::PrintToStdout { content } => content,
        }
    }
}

impl fmt::Display for DeliveryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteFile { path, .. } => write!(f, "file {}", path.display()),
            Self::CopyToClipboard { .. } => write!(f, "clipboard"),
            Self::PrintToStdout { .. } => write!(f, "stdout"),
        }
    }
}

/// What happened to each target of a plan.
#[derive(Debug, Clone, Default)]
pub struct OutputReport {
    pub completed: Vec<CompletedDelivery>,
    pub failed: Vec<FailedDelivery>,
    pub bytes_written: usize,
    pub total_duration_ms: u64,
}

impl OutputReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_completed(mut self, delivery: CompletedDelivery) -> Self {
        self.bytes_written += delivery.bytes_written;
        self.completed.push(delivery);
        self
    }

    pub fn with_failed(mut self, delivery: FailedDelivery) -> Self {
        self.failed.push(delivery);
        self
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Human-readable failure list, e.g. for [`crate::AppError::DeliveryFailed`].
    pub fn failure_messages(&self) -> Vec<String> {
        self.failed
            .iter()
            .map(|f| format!("{}: {}", f.target, f.error))
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct CompletedDelivery {
    pub target: DeliveryTarget,
    pub bytes_written: usize,
}

#[derive(Debug, Clone)]
pub struct FailedDelivery {
    pub target: DeliveryTarget,
    pub error: String,
}
