//! Per-screen view state.
//!
//! Each screen is a plain serializable value with pure update functions;
//! handlers load data, fold it into one of these and render it.

pub mod dashboard;
pub mod forms;
pub mod gate;

pub use dashboard::{DashboardSnapshot, DashboardView, Tab};
pub use forms::{NewAdminUserForm, QuoteEditor, QuoteEditorFields};
pub use gate::{AuthGate, GateDecision};
