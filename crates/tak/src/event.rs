//! Notifications about structural changes of variables.

use crate::VarRef;

#[derive(Debug, Clone, Copy, PartialEq)]
/// A structural change of a variable, delivered to the
/// [`crate::actions::EventSink`] of a [`crate::Problem`].
///
/// Bound events carry the bound before and after the change.
pub enum VarEvent {
	/// The variable was fixed, aggregated, multi-aggregated or otherwise left
	/// the set of active variables.
	VarFixed {
		/// The affected variable.
		var: VarRef,
	},
	/// The number of rounding locks of the variable in some direction dropped
	/// to at most one.
	VarUnlocked {
		/// The affected variable.
		var: VarRef,
	},
	/// The variable was marked for deletion.
	VarDeleted {
		/// The affected variable.
		var: VarRef,
	},
	/// The objective coefficient changed.
	ObjChanged {
		/// The affected variable.
		var: VarRef,
		/// The coefficient before the change.
		old: f64,
		/// The coefficient after the change.
		new: f64,
	},
	/// The global lower bound changed.
	GlbChanged {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// The global upper bound changed.
	GubChanged {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// The local lower bound increased.
	LbTightened {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// The local lower bound decreased.
	LbRelaxed {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// The local upper bound decreased.
	UbTightened {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// The local upper bound increased.
	UbRelaxed {
		/// The affected variable.
		var: VarRef,
		/// The bound before the change.
		old: f64,
		/// The bound after the change.
		new: f64,
	},
	/// A hole was added to the global domain.
	GholeAdded {
		/// The affected variable.
		var: VarRef,
		/// The left end point of the hole.
		left: f64,
		/// The right end point of the hole.
		right: f64,
	},
	/// A hole was added to the local domain.
	LholeAdded {
		/// The affected variable.
		var: VarRef,
		/// The left end point of the hole.
		left: f64,
		/// The right end point of the hole.
		right: f64,
	},
	/// An implication was added to the variable.
	ImplAdded {
		/// The affected variable.
		var: VarRef,
	},
}

impl VarEvent {
	/// The variable affected by the event.
	pub fn var(&self) -> VarRef {
		match *self {
			VarEvent::VarFixed { var }
			| VarEvent::VarUnlocked { var }
			| VarEvent::VarDeleted { var }
			| VarEvent::ObjChanged { var, .. }
			| VarEvent::GlbChanged { var, .. }
			| VarEvent::GubChanged { var, .. }
			| VarEvent::LbTightened { var, .. }
			| VarEvent::LbRelaxed { var, .. }
			| VarEvent::UbTightened { var, .. }
			| VarEvent::UbRelaxed { var, .. }
			| VarEvent::GholeAdded { var, .. }
			| VarEvent::LholeAdded { var, .. }
			| VarEvent::ImplAdded { var } => var,
		}
	}

	/// Create the local bound event for a change of the lower bound from `old`
	/// to `new`.
	pub(crate) fn local_lb(var: VarRef, old: f64, new: f64) -> Self {
		if new > old {
			VarEvent::LbTightened { var, old, new }
		} else {
			VarEvent::LbRelaxed { var, old, new }
		}
	}

	/// Create the local bound event for a change of the upper bound from `old`
	/// to `new`.
	pub(crate) fn local_ub(var: VarRef, old: f64, new: f64) -> Self {
		if new < old {
			VarEvent::UbTightened { var, old, new }
		} else {
			VarEvent::UbRelaxed { var, old, new }
		}
	}
}
