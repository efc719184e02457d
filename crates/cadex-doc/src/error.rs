//! Error types for document operations.

use crate::Label;
use thiserror::Error;

/// Errors that can occur while mutating or validating an exchange document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocError {
    /// The label is not alive in this document.
    #[error("label {0:?} is not alive in this document")]
    DeadLabel(Label),

    /// A component entry references a label that is not alive.
    #[error("component of {parent:?} references dead label {child:?}")]
    DanglingComponent {
        /// Label whose component list holds the bad reference.
        parent: Label,
        /// The dead label being referenced.
        child: Label,
    },
}
