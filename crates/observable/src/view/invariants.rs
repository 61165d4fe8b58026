use super::*;
use crate::source::ObservableVec;

fn evens(values: Vec<u32>) -> (ObservableVec<u32>, FilteredView<u32, u32>) {
	let mut source = ObservableVec::from(values);
	let view = FilteredView::with_options(&mut source, |n: &u32| n % 2 == 0, ViewOptions::strict());
	(source, view)
}

/// Must keep the index map strictly increasing and exactly as long as the
/// projection after every transition.
///
/// * Enforced in: `Projection::insert`, `Projection::remove`, `Projection::reset`,
///   audited by `Projection::check_invariants`
/// * Failure symptom: binary searches pick the wrong splice point and later
///   changes land at the wrong view position.
#[cfg_attr(test, test)]
pub(crate) fn test_index_map_strictly_increasing() {
	let (mut source, view) = evens(vec![0, 1, 2, 3, 4]);
	source.insert_range(2, [6, 8, 9]).unwrap();
	source.remove_range(0..2).unwrap();
	source.insert(0, 10).unwrap();

	let map = view.index_map();
	assert_eq!(map.len(), view.len());
	assert!(map.windows(2).all(|w| w[0] < w[1]), "{map:?}");
	view.verify(source.as_sequence()).unwrap();
}

/// Must match removals against the unshifted source range before shifting
/// survivors.
///
/// * Enforced in: `Projection::remove`
/// * Failure symptom: a batch removal drops survivors that slid into the
///   removed range, or keeps entries it should drop.
#[cfg_attr(test, test)]
pub(crate) fn test_remove_matches_before_shifting() {
	let (mut source, view) = evens(vec![0, 2, 4, 6, 8, 10]);
	source.remove_range(1..4).unwrap();

	assert_eq!(view.to_vec(), vec![0, 8, 10]);
	assert_eq!(view.index_map(), vec![0, 1, 2]);
}

/// Must never hold two entries for the same source index, so a removal batch
/// matches each removed position at most once.
///
/// * Enforced in: `Projection::insert` (new entries take distinct
///   `start + offset` indices after existing ones are shifted past them)
/// * Failure symptom: one removed source element drops two view entries.
#[cfg_attr(test, test)]
pub(crate) fn test_no_duplicate_entries_within_removal_batch() {
	let (mut source, view) = evens(vec![2, 4]);
	source.insert_range(1, [6, 8]).unwrap();
	source.insert_range(1, [12, 14]).unwrap();

	let map = view.index_map();
	let mut dedup = map.clone();
	dedup.dedup();
	assert_eq!(dedup, map);

	let events = std::rc::Rc::new(std::cell::Cell::new(0));
	let removed = events.clone();
	view.on_changed(move |e| removed.set(e.removed));
	source.remove_range(1..5).unwrap();
	assert_eq!(events.get(), 4);
	assert_eq!(view.to_vec(), vec![2, 4]);
}

/// Must leave the view untouched when refusing a change kind.
///
/// * Enforced in: `SourceObserver::on_source_changed` for the view, which
///   returns `Error::UnsupportedChange` before editing the projection
/// * Failure symptom: a partially applied move leaves a map that silently
///   disagrees with the source.
#[cfg_attr(test, test)]
pub(crate) fn test_unsupported_change_is_atomic() {
	let (mut source, view) = evens(vec![1, 2, 3, 4]);
	let before = view.snapshot();

	assert_eq!(source.move_item(3, 0), Err(Error::UnsupportedChange(ChangeKind::Move)));
	assert_eq!(view.snapshot(), before);
}

/// Must finish a transition before the source's mutating call returns.
///
/// * Enforced in: `ObservableVec::deliver`, which calls observers inline
/// * Failure symptom: code running right after a mutation reads a stale view.
#[cfg_attr(test, test)]
pub(crate) fn test_transitions_are_synchronous() {
	let (mut source, view) = evens(vec![]);
	for n in 0..6 {
		source.push(n).unwrap();
		assert_eq!(view.len() as u32, n / 2 + 1);
	}
}

/// Must report corrupt state through `Error::InvariantViolation`.
///
/// * Enforced in: `Projection::check_invariants`, `FilteredView::verify`
/// * Failure symptom: corruption goes unnoticed until an out-of-bounds panic.
#[cfg_attr(test, test)]
pub(crate) fn test_audit_detects_corruption() {
	let corrupt = Projection::from_raw_parts(vec![1, 2, 3], vec![0, 2, 1]);
	assert!(matches!(corrupt.check_invariants(), Err(Error::InvariantViolation(_))));

	let (mut source, view) = evens(vec![2, 4]);
	assert!(source.unsubscribe(view.subscription()));
	source.push(6).unwrap();
	assert!(matches!(
		view.verify(source.as_sequence()),
		Err(Error::InvariantViolation(_))
	));
}
