//! Error types for observable sources and filtered views.

use thiserror::Error;

use crate::change::ChangeKind;

/// Errors raised by sources and views.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
	/// An index was outside the valid range of a sequence.
	#[error("index {index} out of range for length {len}")]
	OutOfRange {
		/// The requested index.
		index: usize,
		/// Length of the sequence at the time of the request.
		len: usize,
	},

	/// The source reported a change the view cannot apply incrementally.
	///
	/// The view is left exactly as it was before the notification. It stays
	/// out of step with the source until the source reports a reset.
	#[error("unsupported source change: {0}")]
	UnsupportedChange(ChangeKind),

	/// The projection and its index map disagree after a transition.
	#[error("view invariant violated: {0}")]
	InvariantViolation(String),
}

/// Result type for source and view operations.
pub type Result<T> = std::result::Result<T, Error>;
