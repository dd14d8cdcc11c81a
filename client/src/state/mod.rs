//! Editor state and drafting helpers.
//!
//! `editor` holds the one state container the UI renders from; `draft`
//! builds edge additions against the open plan.

pub mod draft;
pub mod editor;
