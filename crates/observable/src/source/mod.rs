//! Observable sources.
//!
//! A source owns its elements and tells its subscribers about every structural
//! mutation, synchronously and in mutation order. The [`ObservableSequence`]
//! trait is the seam views subscribe through; [`ObservableVec`] is the
//! concrete `Vec`-backed source.
//!
//! ```text
//! ObservableVec                        SourceObserver (FilteredView implements)
//! ┌──────────────────┐  &dyn Sequence  ┌───────────────────────────┐
//! │ items            │ ──────────────► │ on_source_changed()       │
//! │ observers (weak) │  SourceChange   │   insert / remove / reset │
//! └──────────────────┘                 └───────────────────────────┘
//! ```

use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::change::SourceChange;
use crate::error::{Error, Result};
use crate::sequence::Sequence;


/// Receives change notifications from an [`ObservableSequence`].
pub trait SourceObserver<T> {
	/// Called after `source` has been mutated as described by `change`.
	///
	/// Must finish all bookkeeping before returning. An error is propagated to
	/// whoever performed the mutation.
	fn on_source_changed(&self, source: &dyn Sequence<T>, change: SourceChange<'_, T>) -> Result<()>;
}

/// Handle for an active subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl fmt::Display for SubscriptionId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "sub#{}", self.0)
	}
}

/// A sequence that reports structural changes to subscribers.
pub trait ObservableSequence<T>: Sequence<T> {
	/// Registers `observer` for change notifications.
	///
	/// The source keeps only a weak reference; delivery ends once the last
	/// strong reference to the observer is dropped.
	fn subscribe(&mut self, observer: Rc<dyn SourceObserver<T>>) -> SubscriptionId;

	/// Removes a subscription. Returns false if `id` was not subscribed.
	fn unsubscribe(&mut self, id: SubscriptionId) -> bool;

	/// Returns this source as a plain read-only sequence.
	fn as_sequence(&self) -> &dyn Sequence<T>;
}

/// A `Vec`-backed observable source.
///
/// Every mutating method validates its arguments first, then mutates, then
/// notifies all live observers. An observer error does not undo the mutation;
/// it is returned to the caller after the remaining observers have been
/// notified.
pub struct ObservableVec<T> {
	items: Vec<T>,
	observers: Vec<(SubscriptionId, Weak<dyn SourceObserver<T>>)>,
	next_id: u64,
}

impl<T> ObservableVec<T> {
	/// Creates an empty source.
	pub fn new() -> Self {
		Self::from(Vec::new())
	}

	/// Number of elements.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if the source has no elements.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Element at `index`, or [`None`] past the end.
	pub fn get(&self, index: usize) -> Option<&T> {
		self.items.get(index)
	}

	/// Iterates elements in order.
	pub fn iter(&self) -> std::slice::Iter<'_, T> {
		self.items.iter()
	}

	/// Returns the elements as a slice.
	pub fn as_slice(&self) -> &[T] {
		&self.items
	}

	/// Number of live subscriptions.
	pub fn observer_count(&self) -> usize {
		self.observers.iter().filter(|(_, o)| o.strong_count() > 0).count()
	}

	/// Appends `item` at the end.
	pub fn push(&mut self, item: T) -> Result<()> {
		let start = self.items.len();
		self.items.push(item);
		self.notify_inserted(start, 1)
	}

	/// Inserts `item` at `index`, shifting later elements up.
	pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
		self.check_insert_index(index)?;
		self.items.insert(index, item);
		self.notify_inserted(index, 1)
	}

	/// Inserts all of `items` starting at `index` as a single change.
	pub fn insert_range<I>(&mut self, index: usize, items: I) -> Result<()>
	where
		I: IntoIterator<Item = T>,
	{
		self.check_insert_index(index)?;
		let before = self.items.len();
		self.items.splice(index..index, items);
		let count = self.items.len() - before;
		if count == 0 {
			return Ok(());
		}
		self.notify_inserted(index, count)
	}

	/// Appends all of `items` as a single change.
	pub fn extend<I>(&mut self, items: I) -> Result<()>
	where
		I: IntoIterator<Item = T>,
	{
		let start = self.items.len();
		self.insert_range(start, items)
	}

	/// Removes the element at `index`.
	pub fn remove(&mut self, index: usize) -> Result<()> {
		self.remove_range(index..=index)
	}

	/// Removes the elements in `range` as a single change.
	pub fn remove_range<R>(&mut self, range: R) -> Result<()>
	where
		R: RangeBounds<usize>,
	{
		let Range { start, end } = self.resolve_range(range)?;
		if start == end {
			return Ok(());
		}
		self.items.drain(start..end);
		self.dispatch(SourceChange::Remove {
			start,
			count: end - start,
		})
	}

	/// Removes every element and reports a reset.
	pub fn clear(&mut self) -> Result<()> {
		self.items.clear();
		self.notify_reset()
	}

	/// Replaces the whole contents and reports a reset.
	pub fn replace_all<I>(&mut self, items: I) -> Result<()>
	where
		I: IntoIterator<Item = T>,
	{
		self.items = items.into_iter().collect();
		self.notify_reset()
	}

	/// Replaces the element at `index` in place and reports a replace.
	pub fn set(&mut self, index: usize, item: T) -> Result<()> {
		let len = self.items.len();
		let slot = self.items.get_mut(index).ok_or(Error::OutOfRange { index, len })?;
		*slot = item;
		let item = &self.items[index];
		Self::deliver(&mut self.observers, &self.items, SourceChange::Replace { index, item })
	}

	/// Moves the element at `from` so that it ends up at `to`.
	pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
		let len = self.items.len();
		for index in [from, to] {
			if index >= len {
				return Err(Error::OutOfRange { index, len });
			}
		}
		if from == to {
			return Ok(());
		}
		let item = self.items.remove(from);
		self.items.insert(to, item);
		self.dispatch(SourceChange::Move { from, to })
	}

	/// Reports a reset without mutating.
	///
	/// Used to resynchronize observers after they rejected a change.
	pub fn notify_reset(&mut self) -> Result<()> {
		self.dispatch(SourceChange::Reset)
	}

	/// Runs `edit` on the backing vector and reports a reset.
	///
	/// For bulk rewrites that cannot be described as one insert or remove.
	pub fn update<R>(&mut self, edit: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
		let out = edit(&mut self.items);
		self.notify_reset()?;
		Ok(out)
	}

	fn check_insert_index(&self, index: usize) -> Result<()> {
		let len = self.items.len();
		if index > len {
			return Err(Error::OutOfRange { index, len });
		}
		Ok(())
	}

	fn resolve_range<R: RangeBounds<usize>>(&self, range: R) -> Result<Range<usize>> {
		let len = self.items.len();
		let start = match range.start_bound() {
			Bound::Included(&s) => s,
			Bound::Excluded(&s) => s.saturating_add(1),
			Bound::Unbounded => 0,
		};
		let end = match range.end_bound() {
			Bound::Included(&e) => e.saturating_add(1),
			Bound::Excluded(&e) => e,
			Bound::Unbounded => len,
		};
		if end > len {
			return Err(Error::OutOfRange {
				index: end.saturating_sub(1),
				len,
			});
		}
		if start > end {
			return Err(Error::OutOfRange { index: start, len });
		}
		Ok(start..end)
	}

	fn notify_inserted(&mut self, start: usize, count: usize) -> Result<()> {
		let items = &self.items[start..start + count];
		Self::deliver(&mut self.observers, &self.items, SourceChange::Insert { start, items })
	}

	fn dispatch(&mut self, change: SourceChange<'_, T>) -> Result<()> {
		Self::deliver(&mut self.observers, &self.items, change)
	}

	/// Delivers `change` to every live observer, pruning dead ones, and
	/// returns the first observer error.
	fn deliver(
		observers: &mut Vec<(SubscriptionId, Weak<dyn SourceObserver<T>>)>,
		items: &dyn Sequence<T>,
		change: SourceChange<'_, T>,
	) -> Result<()> {
		observers.retain(|(_, o)| o.strong_count() > 0);

		let mut first_err = None;
		for (id, observer) in observers.iter() {
			let Some(observer) = observer.upgrade() else {
				continue;
			};
			if let Err(error) = observer.on_source_changed(items, change) {
				warn!(subscription = %id, kind = %change.kind(), %error, "observer rejected change");
				first_err.get_or_insert(error);
			}
		}

		match first_err {
			Some(error) => Err(error),
			None => Ok(()),
		}
	}
}

impl<T> ObservableSequence<T> for ObservableVec<T> {
	fn subscribe(&mut self, observer: Rc<dyn SourceObserver<T>>) -> SubscriptionId {
		let id = SubscriptionId(self.next_id);
		self.next_id += 1;
		self.observers.push((id, Rc::downgrade(&observer)));
		debug!(subscription = %id, observers = self.observers.len(), "observer subscribed");
		id
	}

	fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
		let before = self.observers.len();
		self.observers.retain(|(sub, _)| *sub != id);
		let removed = self.observers.len() != before;
		if removed {
			debug!(subscription = %id, observers = self.observers.len(), "observer unsubscribed");
		}
		removed
	}

	fn as_sequence(&self) -> &dyn Sequence<T> {
		&self.items
	}
}

impl<T> Sequence<T> for ObservableVec<T> {
	fn len(&self) -> usize {
		self.items.len()
	}

	fn get(&self, index: usize) -> Option<&T> {
		self.items.get(index)
	}
}

impl<T> Default for ObservableVec<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> From<Vec<T>> for ObservableVec<T> {
	fn from(items: Vec<T>) -> Self {
		Self {
			items,
			observers: Vec::new(),
			next_id: 0,
		}
	}
}

impl<T> FromIterator<T> for ObservableVec<T> {
	fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
		Self::from(iter.into_iter().collect::<Vec<_>>())
	}
}

impl<T: fmt::Debug> fmt::Debug for ObservableVec<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ObservableVec")
			.field("items", &self.items)
			.field("observers", &self.observers.len())
			.finish()
	}
}
