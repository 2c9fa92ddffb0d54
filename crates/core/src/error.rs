//! Error types for the cut planner.

use thiserror::Error;

/// Result alias used across the u-cutplan crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the planner.
///
/// Pieces that cannot be placed are never errors; they are reported in the
/// unplaced list of a sheet result. Errors cover invalid input and misuse of
/// the tree editing API.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A piece or inventory entry has invalid dimensions or quantity.
    #[error("invalid piece: {0}")]
    InvalidPiece(String),

    /// The sheet has no usable area.
    #[error("invalid sheet: {0}")]
    InvalidSheet(String),

    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A node identifier does not refer to a live node of the tree.
    #[error("node {0} not found")]
    NodeNotFound(usize),

    /// No node of the required axis exists at or above the reference node.
    #[error("no {axis} ancestor found for node {node}")]
    MissingAncestor {
        /// Reference node index.
        node: usize,
        /// Axis name of the parent that was required.
        axis: &'static str,
    },

    /// The root node spans the whole sheet and cannot be removed.
    #[error("the root node cannot be deleted")]
    CannotDeleteRoot,

    /// Internal invariant violation.
    #[error("internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::MissingAncestor {
            node: 7,
            axis: "Y",
        };
        assert_eq!(err.to_string(), "no Y ancestor found for node 7");
        assert_eq!(
            Error::InvalidPiece("quantity must be at least 1".into()).to_string(),
            "invalid piece: quantity must be at least 1"
        );
    }
}
