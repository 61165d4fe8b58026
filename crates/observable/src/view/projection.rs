use crate::error::{Error, Result};
use crate::sequence::Sequence;

/// Ordered projection of accepted source elements plus the source index of
/// each one.
///
/// `index_map[i]` is the source index of `items[i]`. The map is strictly
/// increasing and always as long as `items`; every transition below keeps
/// both true, which is what lets insert and remove locate their splice
/// point with a binary search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection<U> {
	items: Vec<U>,
	index_map: Vec<usize>,
}

impl<U> Projection<U> {
	/// Creates an empty projection.
	pub fn new() -> Self {
		Self {
			items: Vec::new(),
			index_map: Vec::new(),
		}
	}

	/// Number of projected elements.
	pub fn len(&self) -> usize {
		self.items.len()
	}

	/// Returns true if nothing is projected.
	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Projected elements in source order.
	pub fn items(&self) -> &[U] {
		&self.items
	}

	/// Source index of every projected element.
	pub fn index_map(&self) -> &[usize] {
		&self.index_map
	}

	/// Projected element at `index`.
	pub fn get(&self, index: usize) -> Option<&U> {
		self.items.get(index)
	}

	/// Source index of the projected element at `index`.
	pub fn source_index(&self, index: usize) -> Option<usize> {
		self.index_map.get(index).copied()
	}

	/// First projection position whose source index is `>= source_index`, or
	/// `len()` if there is none.
	pub fn position_at_or_after(&self, source_index: usize) -> usize {
		self.index_map.partition_point(|&i| i < source_index)
	}

	/// Discards everything and rescans `source` from index 0.
	///
	/// Returns the number of accepted elements.
	pub fn reset<T>(&mut self, source: &dyn Sequence<T>, mut accept: impl FnMut(&T) -> Option<U>) -> usize {
		self.items.clear();
		self.index_map.clear();
		for index in 0..source.len() {
			let Some(item) = source.get(index) else {
				break;
			};
			if let Some(projected) = accept(item) {
				self.items.push(projected);
				self.index_map.push(index);
			}
		}
		self.items.len()
	}

	/// Applies an insertion of `inserted` at source index `start`.
	///
	/// Entries at or after `start` move up by `inserted.len()`, then accepted
	/// inserted elements are spliced in before them, in source order, mapped
	/// to `start + offset`. Returns the number of accepted elements.
	pub fn insert<T>(&mut self, start: usize, inserted: &[T], mut accept: impl FnMut(&T) -> Option<U>) -> usize {
		let at = self.position_at_or_after(start);
		let shift = inserted.len();
		for index in &mut self.index_map[at..] {
			*index += shift;
		}

		let mut new_items = Vec::new();
		let mut new_indices = Vec::new();
		for (offset, item) in inserted.iter().enumerate() {
			if let Some(projected) = accept(item) {
				new_items.push(projected);
				new_indices.push(start + offset);
			}
		}

		let accepted = new_items.len();
		if accepted > 0 {
			self.items.splice(at..at, new_items);
			self.index_map.splice(at..at, new_indices);
		}
		accepted
	}

	/// Applies a removal of `count` source elements starting at `start`.
	///
	/// Entries are matched against the original, unshifted range
	/// `start..start + count` and dropped; only then do the survivors at or
	/// after `start` move down by `count`. Returns the number of projected
	/// elements dropped.
	pub fn remove(&mut self, start: usize, count: usize) -> usize {
		let end = start.saturating_add(count);
		let lo = self.position_at_or_after(start);
		let hi = self.position_at_or_after(end);
		self.items.drain(lo..hi);
		self.index_map.drain(lo..hi);

		// Survivors from `lo` on all sat at or past `end`.
		for index in &mut self.index_map[lo..] {
			*index -= count;
		}
		hi - lo
	}

	/// Checks that the index map is strictly increasing and as long as the
	/// projection.
	pub fn check_invariants(&self) -> Result<()> {
		if self.items.len() != self.index_map.len() {
			return Err(Error::InvariantViolation(format!(
				"projection holds {} items but index map holds {}",
				self.items.len(),
				self.index_map.len()
			)));
		}
		if let Some(pos) = self.index_map.windows(2).position(|pair| pair[0] >= pair[1]) {
			return Err(Error::InvariantViolation(format!(
				"index map not strictly increasing at {pos}: {} then {}",
				self.index_map[pos],
				self.index_map[pos + 1]
			)));
		}
		Ok(())
	}

	/// Rebuilds a projection from raw parts without checking them.
	#[cfg(test)]
	pub(crate) fn from_raw_parts(items: Vec<U>, index_map: Vec<usize>) -> Self {
		Self { items, index_map }
	}
}

impl<U> Default for Projection<U> {
	fn default() -> Self {
		Self::new()
	}
}

impl<U> Sequence<U> for Projection<U> {
	fn len(&self) -> usize {
		self.items.len()
	}

	fn get(&self, index: usize) -> Option<&U> {
		self.items.get(index)
	}
}
