//! Observable sequences and incrementally maintained filtered views.
//!
//! An [`ObservableVec`] reports every structural mutation to its subscribers as
//! a [`SourceChange`]. A [`FilteredView`] subscribes to such a source and keeps
//! an ordered projection of the elements that narrow to the view's element type
//! and pass a caller predicate, patching the projection per change instead of
//! rescanning the source.
//!
//! ```
//! use xeno_observable::{FilteredView, ObservableVec};
//!
//! let mut source = ObservableVec::from(vec![1, 2, 3, 4]);
//! let evens = FilteredView::<i32, i32>::with_predicate(&mut source, |n| n % 2 == 0);
//! assert_eq!(evens.to_vec(), vec![2, 4]);
//!
//! source.insert(0, 10).unwrap();
//! assert_eq!(evens.to_vec(), vec![10, 2, 4]);
//! assert_eq!(evens.index_map(), vec![0, 2, 4]);
//! ```

/// Source change notifications.
pub mod change;
/// Error types.
pub mod error;
/// Capability test used to admit source elements into a view.
pub mod narrow;
/// View configuration.
pub mod options;
/// Read-only ordered sequence access.
pub mod sequence;
/// Observable sources and the subscription seam.
pub mod source;
/// Filtered projections over observable sources.
pub mod view;

pub use change::{ChangeKind, SourceChange};
pub use error::{Error, Result};
pub use narrow::Narrow;
pub use options::{InvariantChecks, ViewOptions};
pub use sequence::Sequence;
pub use source::{ObservableSequence, ObservableVec, SourceObserver, SubscriptionId};
pub use view::{FilteredView, ListenerId, Projection, ViewChanged};
