//! Configuration for filtered views.
//!
//! With the `serde` feature enabled both types deserialize from a host's own
//! configuration format, using lowercase names for [`InvariantChecks`].

/// When a view audits its projection against its index map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InvariantChecks {
	/// Never audit.
	Never,
	/// Audit after every transition in builds with debug assertions.
	#[default]
	DebugOnly,
	/// Audit after every transition.
	Always,
}

impl InvariantChecks {
	/// Returns true if audits run in the current build.
	pub fn enabled(self) -> bool {
		match self {
			Self::Never => false,
			Self::DebugOnly => cfg!(debug_assertions),
			Self::Always => true,
		}
	}
}

/// Options fixed for the lifetime of a filtered view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewOptions {
	/// Structural audit policy, see [`InvariantChecks`].
	pub invariant_checks: InvariantChecks,
}

impl ViewOptions {
	/// Options that audit after every transition regardless of build profile.
	pub fn strict() -> Self {
		Self {
			invariant_checks: InvariantChecks::Always,
		}
	}
}
