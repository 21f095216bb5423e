//! Traits for the collaborators of a [`crate::Problem`] that are managed
//! outside of this crate: the receiver of structural change notifications and
//! the linear relaxation that holds the columns of variables.

use std::fmt::Debug;

use crate::{event::VarEvent, var::Column, VarRef};

/// Receiver of the structural change events of variables.
pub trait EventSink: Debug {
	/// Deliver an event.
	fn notify(&mut self, event: VarEvent);
}

/// Actions that keep the linear relaxation synchronised with the columns of
/// variables.
pub trait ColumnActions: Debug {
	/// A column was created for the variable.
	fn column_created(&mut self, var: VarRef, column: &Column);

	/// The column of the variable was removed.
	fn column_removed(&mut self, var: VarRef);

	/// The bounds of the column of the variable changed.
	fn column_bounds_changed(&mut self, var: VarRef, lb: f64, ub: f64);

	/// The objective coefficient of the column of the variable changed.
	fn column_obj_changed(&mut self, var: VarRef, obj: f64);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// An [`EventSink`] that discards all events.
pub struct NoEvents;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// A [`ColumnActions`] implementation for problems without a linear
/// relaxation.
pub struct NoColumns;

impl EventSink for NoEvents {
	fn notify(&mut self, _: VarEvent) {}
}

impl ColumnActions for NoColumns {
	fn column_created(&mut self, _: VarRef, _: &Column) {}

	fn column_removed(&mut self, _: VarRef) {}

	fn column_bounds_changed(&mut self, _: VarRef, _: f64, _: f64) {}

	fn column_obj_changed(&mut self, _: VarRef, _: f64) {}
}
