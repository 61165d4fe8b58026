//! Filtered views over observable sources.
//!
//! A [`FilteredView`] presents the elements of a source that narrow to `U`
//! (see [`Narrow`]) and pass a caller predicate, in source order. It is kept
//! current by three transitions driven by the source's notifications:
//!
//! * insert: shift mapped indices at or after the insertion point, splice the
//!   accepted new elements in;
//! * remove: drop entries mapped into the removed range, then shift the rest;
//! * reset: rescan the whole source.
//!
//! Only reset costs time proportional to the source. Any other kind of
//! change is refused with [`Error::UnsupportedChange`] and leaves the view
//! untouched.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::mem;
use std::rc::Rc;

use tracing::{debug, error, trace, warn};

use crate::change::{ChangeKind, SourceChange};
use crate::error::{Error, Result};
use crate::narrow::Narrow;
use crate::options::ViewOptions;
use crate::sequence::Sequence;
use crate::source::{ObservableSequence, SourceObserver, SubscriptionId};

mod projection;

#[cfg(test)]
mod invariants;

pub use projection::Projection;

/// Emitted once per source change the view has processed.
///
/// Deltas of one change are coalesced; listeners learn that the view changed
/// and by how much, not which positions moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewChanged {
	/// Kind of the source change that triggered this event.
	pub cause: ChangeKind,
	/// Number of elements added to the view.
	pub inserted: usize,
	/// Number of elements dropped from the view.
	pub removed: usize,
	/// Length of the view after the change.
	pub len: usize,
}

impl ViewChanged {
	/// Returns true if the view's contents may differ from before.
	pub fn is_structural(&self) -> bool {
		self.cause == ChangeKind::Reset || self.inserted > 0 || self.removed > 0
	}
}

/// Handle for a registered [`ViewChanged`] listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&ViewChanged)>;

#[derive(Default)]
struct Listeners {
	next_id: u64,
	entries: Vec<(ListenerId, Listener)>,
	/// Listeners taken out of `entries` for the running dispatch.
	in_flight: Vec<ListenerId>,
	/// Removals requested while the entries were out for dispatch.
	removed_during_dispatch: Vec<ListenerId>,
	/// Events raised by changes processed while a dispatch was running.
	queued: VecDeque<ViewChanged>,
	dispatching: bool,
}

/// Listeners taken out for one dispatch. Dropping it hands them back, also
/// when a listener unwinds.
struct Dispatch<'a> {
	listeners: &'a RefCell<Listeners>,
	running: Vec<(ListenerId, Listener)>,
}

impl Dispatch<'_> {
	/// Folds removals and registrations made by listeners into the running set.
	fn sync(&mut self) {
		let mut listeners = self.listeners.borrow_mut();
		let removed = mem::take(&mut listeners.removed_during_dispatch);
		self.running.retain(|(id, _)| !removed.contains(id));
		self.running.append(&mut listeners.entries);
		listeners.in_flight = self.running.iter().map(|(id, _)| *id).collect();
	}
}

impl Drop for Dispatch<'_> {
	fn drop(&mut self) {
		self.sync();
		let mut listeners = self.listeners.borrow_mut();
		listeners.entries = mem::take(&mut self.running);
		listeners.in_flight.clear();
		listeners.queued.clear();
		listeners.dispatching = false;
	}
}

/// State shared between the view handle and the source's subscription.
struct Shared<T, U> {
	projection: RefCell<Projection<U>>,
	predicate: Box<dyn Fn(&T) -> bool>,
	options: ViewOptions,
	listeners: RefCell<Listeners>,
}

impl<T, U: Narrow<T>> Shared<T, U> {
	fn accept(&self, item: &T) -> Option<U> {
		U::narrow(item).filter(|_| (self.predicate)(item))
	}

	fn audit(&self, projection: &Projection<U>, cause: ChangeKind) -> Result<()> {
		if !self.options.invariant_checks.enabled() {
			return Ok(());
		}
		projection.check_invariants().inspect_err(|e| {
			error!(kind = %cause, error = %e, "filtered view invariant violated");
		})
	}

	fn emit(&self, event: ViewChanged) {
		let running = {
			let mut listeners = self.listeners.borrow_mut();
			if listeners.dispatching {
				// Raised by a change a listener caused; delivered once the
				// current event has reached every listener.
				listeners.queued.push_back(event);
				return;
			}
			listeners.dispatching = true;
			let running = mem::take(&mut listeners.entries);
			listeners.in_flight = running.iter().map(|(id, _)| *id).collect();
			running
		};

		let mut dispatch = Dispatch {
			listeners: &self.listeners,
			running,
		};
		let mut next = Some(event);
		while let Some(event) = next {
			for (id, listener) in &mut dispatch.running {
				if self.listeners.borrow().removed_during_dispatch.contains(id) {
					continue;
				}
				listener(&event);
			}
			dispatch.sync();
			next = self.listeners.borrow_mut().queued.pop_front();
		}
	}
}

impl<T, U: Narrow<T>> SourceObserver<T> for Shared<T, U> {
	fn on_source_changed(&self, source: &dyn Sequence<T>, change: SourceChange<'_, T>) -> Result<()> {
		let cause = change.kind();
		let event = {
			let mut projection = self.projection.borrow_mut();
			let before = projection.len();
			let (inserted, removed) = match change {
				SourceChange::Insert { start, items } => {
					debug_assert!(start + items.len() <= source.len());
					let accepted = projection.insert(start, items, |item| self.accept(item));
					trace!(start, count = items.len(), accepted, len = projection.len(), "view insert");
					(accepted, 0)
				}
				SourceChange::Remove { start, count } => {
					debug_assert!(start <= source.len());
					let dropped = projection.remove(start, count);
					trace!(start, count, dropped, len = projection.len(), "view remove");
					(0, dropped)
				}
				SourceChange::Reset => {
					let accepted = projection.reset(source, |item| self.accept(item));
					debug!(source_len = source.len(), accepted, "view rescanned");
					(accepted, before)
				}
				SourceChange::Replace { .. } | SourceChange::Move { .. } => {
					warn!(kind = %cause, len = before, "filtered view cannot apply change");
					return Err(Error::UnsupportedChange(cause));
				}
			};
			self.audit(&projection, cause)?;
			ViewChanged {
				cause,
				inserted,
				removed,
				len: projection.len(),
			}
		};

		self.emit(event);
		Ok(())
	}
}

/// An ordered projection of the source elements that narrow to `U` and pass
/// a predicate, kept current from the source's change notifications.
///
/// The view is bound to one source for its whole life. It stops receiving
/// notifications when dropped or when [`detach`](Self::detach)ed.
///
/// ```
/// use xeno_observable::{Error, FilteredView, ObservableVec};
///
/// let mut source = ObservableVec::from(vec!["a", "bb", "ccc"]);
/// let long = FilteredView::<&str, &str>::with_predicate(&mut source, |s| s.len() > 1);
/// assert_eq!(long.to_vec(), vec!["bb", "ccc"]);
///
/// source.remove(1).unwrap();
/// assert_eq!(long.to_vec(), vec!["ccc"]);
/// assert_eq!(long.index_map(), vec![1]);
/// assert!(matches!(long.item(1), Err(Error::OutOfRange { index: 1, len: 1 })));
/// ```
pub struct FilteredView<T: 'static, U: 'static> {
	shared: Rc<Shared<T, U>>,
	subscription: SubscriptionId,
}

impl<T: 'static, U: Narrow<T> + 'static> FilteredView<T, U> {
	/// Creates a view of every element of `source` that narrows to `U`.
	pub fn new<S>(source: &mut S) -> Self
	where
		S: ObservableSequence<T> + ?Sized,
	{
		Self::with_options(source, |_| true, ViewOptions::default())
	}

	/// Creates a view of the elements that narrow to `U` and satisfy `predicate`.
	pub fn with_predicate<S, P>(source: &mut S, predicate: P) -> Self
	where
		S: ObservableSequence<T> + ?Sized,
		P: Fn(&T) -> bool + 'static,
	{
		Self::with_options(source, predicate, ViewOptions::default())
	}

	/// Creates a view with explicit [`ViewOptions`].
	pub fn with_options<S, P>(source: &mut S, predicate: P, options: ViewOptions) -> Self
	where
		S: ObservableSequence<T> + ?Sized,
		P: Fn(&T) -> bool + 'static,
	{
		let shared = Rc::new(Shared {
			projection: RefCell::new(Projection::new()),
			predicate: Box::new(predicate),
			options,
			listeners: RefCell::new(Listeners::default()),
		});

		let accepted = shared
			.projection
			.borrow_mut()
			.reset(source.as_sequence(), |item| shared.accept(item));

		let observer: Rc<dyn SourceObserver<T>> = shared.clone();
		let subscription = source.subscribe(observer);
		debug!(subscription = %subscription, source_len = source.len(), accepted, "filtered view attached");

		Self { shared, subscription }
	}

	/// Number of elements in the view.
	pub fn len(&self) -> usize {
		self.shared.projection.borrow().len()
	}

	/// Returns true if the view is empty.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Element at `index`.
	///
	/// Returns an owned handle, so holding it does not block later source
	/// changes. Use [`with_items`](Self::with_items) for borrowed access.
	///
	/// # Errors
	/// [`Error::OutOfRange`] if `index >= len()`.
	pub fn item(&self, index: usize) -> Result<U>
	where
		U: Clone,
	{
		let projection = self.shared.projection.borrow();
		projection.get(index).cloned().ok_or(Error::OutOfRange {
			index,
			len: projection.len(),
		})
	}

	/// Element at `index`, or [`None`] past the end.
	pub fn get(&self, index: usize) -> Option<U>
	where
		U: Clone,
	{
		self.shared.projection.borrow().get(index).cloned()
	}

	/// Source index of the element at view position `index`.
	pub fn source_index(&self, index: usize) -> Option<usize> {
		self.shared.projection.borrow().source_index(index)
	}

	/// Copy of the view-position to source-index map.
	pub fn index_map(&self) -> Vec<usize> {
		self.shared.projection.borrow().index_map().to_vec()
	}

	/// Runs `f` over the projected elements.
	///
	/// `f` must not mutate the source; doing so panics on the inner borrow.
	pub fn with_items<R>(&self, f: impl FnOnce(&[U]) -> R) -> R {
		f(self.shared.projection.borrow().items())
	}

	/// Clones the projected elements into a vector.
	pub fn to_vec(&self) -> Vec<U>
	where
		U: Clone,
	{
		self.with_items(<[U]>::to_vec)
	}

	/// Snapshot of the projection together with its index map.
	pub fn snapshot(&self) -> Projection<U>
	where
		U: Clone,
	{
		self.shared.projection.borrow().clone()
	}

	/// Options the view was created with.
	pub fn options(&self) -> &ViewOptions {
		&self.shared.options
	}

	/// Subscription the view holds on its source.
	pub fn subscription(&self) -> SubscriptionId {
		self.subscription
	}

	/// Registers `listener` to run after each processed source change.
	///
	/// Listeners run after the view is consistent and may read it. Changes
	/// processed while listeners run are reported in order once the current
	/// event has reached every listener.
	pub fn on_changed(&self, listener: impl FnMut(&ViewChanged) + 'static) -> ListenerId {
		let mut listeners = self.shared.listeners.borrow_mut();
		let id = ListenerId(listeners.next_id);
		listeners.next_id += 1;
		listeners.entries.push((id, Box::new(listener)));
		id
	}

	/// Removes a listener. Returns false if `id` was not registered.
	pub fn remove_listener(&self, id: ListenerId) -> bool {
		let mut listeners = self.shared.listeners.borrow_mut();
		let before = listeners.entries.len();
		listeners.entries.retain(|(entry, _)| *entry != id);
		if listeners.entries.len() != before {
			return true;
		}
		if listeners.in_flight.contains(&id) && !listeners.removed_during_dispatch.contains(&id) {
			listeners.removed_during_dispatch.push(id);
			return true;
		}
		false
	}

	/// Unsubscribes from `source`, which must be the source the view was
	/// created on. The view keeps its last state.
	pub fn detach<S>(self, source: &mut S) -> bool
	where
		S: ObservableSequence<T> + ?Sized,
	{
		let removed = source.unsubscribe(self.subscription);
		debug!(subscription = %self.subscription, removed, "filtered view detached");
		removed
	}

	/// Audits the view against `source`.
	///
	/// Checks the structural invariants, that every entry maps to an element
	/// that is accepted and equal to the projected one, and that no accepted
	/// source element is missing.
	pub fn verify(&self, source: &dyn Sequence<T>) -> Result<()>
	where
		U: PartialEq,
	{
		let projection = self.shared.projection.borrow();
		projection.check_invariants()?;

		for (pos, (item, &index)) in projection.items().iter().zip(projection.index_map()).enumerate() {
			let Some(src) = source.get(index) else {
				return Err(Error::InvariantViolation(format!(
					"view position {pos} maps to source index {index} past source length {}",
					source.len()
				)));
			};
			if self.shared.accept(src).as_ref() != Some(item) {
				return Err(Error::InvariantViolation(format!(
					"view position {pos} disagrees with source index {index}"
				)));
			}
		}

		let expected = (0..source.len())
			.filter_map(|i| source.get(i))
			.filter(|src| self.shared.accept(src).is_some())
			.count();
		if expected != projection.len() {
			return Err(Error::InvariantViolation(format!(
				"view holds {} elements but source has {expected} accepted",
				projection.len()
			)));
		}
		Ok(())
	}
}

impl<T: 'static, U: fmt::Debug + 'static> fmt::Debug for FilteredView<T, U> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let projection = self.shared.projection.borrow();
		f.debug_struct("FilteredView")
			.field("subscription", &self.subscription)
			.field("items", &projection.items())
			.field("index_map", &projection.index_map())
			.finish()
	}
}
