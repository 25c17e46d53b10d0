//! Page navigation over cursor-based and locally sliced result sequences.

mod navigator;
mod token;

pub use navigator::{
    ApplyOutcome, NavigationOutcome, NavigationPlan, PageNavigator, PageRequest, RequestId,
    Transition, UnreachablePage,
};
pub use token::{Cursor, LocalPageMarker, PageToken};
