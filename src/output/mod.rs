//! Output handling with planning separated from execution.
//!
//! Callers build an [`OutputPlan`] (pure), then [`deliver`] performs the I/O.

mod clipboard;
mod types;
mod writer;

pub use clipboard::copy_to_clipboard;
pub use types::{CompletedDelivery, DeliveryTarget, FailedDelivery, OutputPlan, OutputReport};
pub use writer::{deliver, deliver_all};
