use std::fmt;
use std::ops::Range;

/// A structural change reported by an observable source.
///
/// Notifications are delivered after the source has been mutated, so indices
/// in `Insert` refer to the new layout and indices in `Remove` to the old one.
#[derive(Debug)]
pub enum SourceChange<'a, T> {
	/// `items` now occupy `start..start + items.len()` in the source.
	Insert {
		/// Source index of the first inserted element.
		start: usize,
		/// The inserted elements, in source order.
		items: &'a [T],
	},
	/// The elements previously at `start..start + count` were removed.
	Remove {
		/// Source index of the first removed element.
		start: usize,
		/// Number of consecutive elements removed.
		count: usize,
	},
	/// The element at `index` was replaced in place.
	Replace {
		/// Source index of the replaced element.
		index: usize,
		/// The new element.
		item: &'a T,
	},
	/// The element at `from` was moved to `to`.
	Move {
		/// Source index before the move.
		from: usize,
		/// Source index after the move.
		to: usize,
	},
	/// The source changed in a way that cannot be described locally.
	Reset,
}

impl<T> Clone for SourceChange<'_, T> {
	fn clone(&self) -> Self {
		*self
	}
}

impl<T> Copy for SourceChange<'_, T> {}

impl<T> SourceChange<'_, T> {
	/// Returns the kind tag of this change.
	pub fn kind(&self) -> ChangeKind {
		match self {
			Self::Insert { .. } => ChangeKind::Insert,
			Self::Remove { .. } => ChangeKind::Remove,
			Self::Replace { .. } => ChangeKind::Replace,
			Self::Move { .. } => ChangeKind::Move,
			Self::Reset => ChangeKind::Reset,
		}
	}

	/// Source indices vacated by a removal, or an empty range for other kinds.
	pub fn removed_indices(&self) -> Range<usize> {
		match *self {
			Self::Remove { start, count } => start..start + count,
			_ => 0..0,
		}
	}
}

/// Discriminant of a [`SourceChange`], used in events and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
	/// See [`SourceChange::Insert`].
	Insert,
	/// See [`SourceChange::Remove`].
	Remove,
	/// See [`SourceChange::Replace`].
	Replace,
	/// See [`SourceChange::Move`].
	Move,
	/// See [`SourceChange::Reset`].
	Reset,
}

impl fmt::Display for ChangeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Insert => "insert",
			Self::Remove => "remove",
			Self::Replace => "replace",
			Self::Move => "move",
			Self::Reset => "reset",
		})
	}
}
