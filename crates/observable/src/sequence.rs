/// Read-only, ordered, index-addressable access to a sequence of elements.
///
/// This is the shape views read their source through. Observers only ever see
/// a source as `&dyn Sequence<T>`, which keeps them from mutating it while a
/// notification is being delivered.
pub trait Sequence<T> {
	/// Number of elements.
	fn len(&self) -> usize;

	/// Element at `index`, or [`None`] past the end.
	fn get(&self, index: usize) -> Option<&T>;

	/// Returns true if the sequence has no elements.
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl<T> Sequence<T> for [T] {
	fn len(&self) -> usize {
		<[T]>::len(self)
	}

	fn get(&self, index: usize) -> Option<&T> {
		<[T]>::get(self, index)
	}
}

impl<T> Sequence<T> for Vec<T> {
	fn len(&self) -> usize {
		Vec::len(self)
	}

	fn get(&self, index: usize) -> Option<&T> {
		self.as_slice().get(index)
	}
}
