//! Whole-document passes that run after parsing.

pub mod numbering;

pub use numbering::{Label, LabelKind, Numbering, number_document};
