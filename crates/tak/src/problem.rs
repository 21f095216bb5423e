//! The [`Problem`] context that owns all variables, and the operations that
//! create, reference count and annotate them.
//!
//! The operations that change the domains of variables, their status, and the
//! relations between them are implemented in the submodules of this module.

pub(crate) mod bounds;
pub(crate) mod branching;
pub(crate) mod graph;
pub(crate) mod resolve;
pub(crate) mod transition;

use std::mem;

use index_vec::IndexVec;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
	actions::{ColumnActions, EventSink, NoColumns, NoEvents},
	clique::CliqueTable,
	config::Config,
	event::VarEvent,
	helpers::linear_transform::LinearTransform,
	statistics::Statistics,
	var::{Column, VarStatus, Variable},
	BranchDirection, LockType, Status, VarRef, VarType,
};

#[derive(Debug)]
/// The collection of all variables of an optimization problem, both of its
/// original formulation and of its transformed (presolved) form, together with
/// the relations between them.
///
/// Variables are addressed through [`VarRef`] handles that stay valid for the
/// lifetime of the problem.
pub struct Problem {
	/// Storage of all variables that were ever created.
	pub(crate) vars: IndexVec<VarRef, Variable>,
	/// Storage of all cliques.
	pub(crate) cliques: CliqueTable,
	/// The active variables of the transformed problem.
	pub(crate) active: Vec<VarRef>,
	/// Constant offset of the objective function, collected from fixed and
	/// aggregated variables.
	pub(crate) obj_offset: f64,
	/// Numerical settings.
	pub(crate) config: Config,
	/// Statistics of the solving process.
	pub(crate) stats: Statistics,
	/// Receiver of structural change events.
	pub(crate) events: Box<dyn EventSink>,
	/// The linear relaxation that holds the columns of variables.
	pub(crate) columns: Box<dyn ColumnActions>,
	/// The depth of the search-tree node at which local changes are made.
	pub(crate) depth: u32,
	/// Whether the linear relaxation is in diving mode.
	pub(crate) diving: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type used when an operation is requested that violates the contract
/// of the operation, e.g. fixing a variable that has a column.
///
/// Note that the infeasibility of a problem is not an error, it is reported as
/// part of the result of the operations that detect it.
pub enum VarError {
	#[error("variable <{name}> has status {status}, which does not support {operation}")]
	/// The status of the variable does not support the requested operation.
	InvalidStatus {
		/// The name of the variable.
		name: String,
		/// The status of the variable.
		status: Status,
		/// The requested operation.
		operation: &'static str,
	},
	#[error("variable <{0}> cannot be aggregated with a zero scalar")]
	/// An aggregation with a zero scalar was requested.
	ZeroScalar(String),
	#[error("variable <{0}> cannot be aggregated onto itself")]
	/// An aggregation of a variable onto itself was requested.
	SelfAggregation(String),
	#[error("variable <{0}> has an infinite bound and cannot be negated")]
	/// A negation was requested of a variable with an infinite bound.
	Unbounded(String),
	#[error("variable <{0}> is not binary")]
	/// A literal was requested of a variable that is not binary.
	NotBinary(String),
	#[error("variable <{0}> was already freed")]
	/// The variable was used after its last reference was released.
	Released(String),
	#[error("diving bounds can only be changed while diving")]
	/// A diving bound change was requested outside of diving mode.
	NotDiving,
	#[error("more rounding locks were removed from variable <{0}> than were added")]
	/// More locks were removed than were added.
	LockUnderflow(String),
	#[error("the undone bound change of variable <{0}> does not match its history")]
	/// A bound change was undone that was not the latest change of the
	/// variable.
	HistoryMismatch(String),
}

impl Problem {
	/// Create a new problem with the given configuration, without event sink or
	/// linear relaxation.
	pub fn new(config: Config) -> Self {
		Self {
			vars: IndexVec::new(),
			cliques: CliqueTable::default(),
			active: Vec::new(),
			obj_offset: 0.0,
			config,
			stats: Statistics::default(),
			events: Box::new(NoEvents),
			columns: Box::new(NoColumns),
			depth: 0,
			diving: false,
		}
	}

	/// Replace the receiver of structural change events.
	pub fn with_event_sink(mut self, sink: Box<dyn EventSink>) -> Self {
		self.events = sink;
		self
	}

	/// Replace the linear relaxation that is notified about column changes.
	pub fn with_column_actions(mut self, columns: Box<dyn ColumnActions>) -> Self {
		self.columns = columns;
		self
	}

	/// The numerical settings of the problem.
	pub fn config(&self) -> &Config {
		&self.config
	}

	/// The statistics collected for the problem.
	pub fn statistics(&self) -> &Statistics {
		&self.stats
	}

	/// The constant offset of the objective function.
	pub fn obj_offset(&self) -> f64 {
		self.obj_offset
	}

	/// Access a variable.
	pub fn var(&self, var: VarRef) -> &Variable {
		&self.vars[var]
	}

	/// Iterate over all variables that were ever created, including freed ones.
	pub fn vars(&self) -> impl Iterator<Item = (VarRef, &Variable)> + '_ {
		self.vars.iter_enumerated()
	}

	/// The number of variables that were ever created.
	pub fn n_vars(&self) -> usize {
		self.vars.len()
	}

	/// The active variables of the transformed problem, indexed by their
	/// probindex.
	pub fn active_vars(&self) -> &[VarRef] {
		&self.active
	}

	/// The depth of the search-tree node at which local changes are recorded.
	pub fn depth(&self) -> u32 {
		self.depth
	}

	/// Set the depth of the search-tree node at which local changes are
	/// recorded.
	pub fn set_depth(&mut self, depth: u32) {
		self.depth = depth;
	}

	/// Add a variable of the original problem formulation.
	///
	/// The bounds of binary variables are restricted to `[0, 1]`, and the bounds
	/// of integral variables are rounded. The problem holds one reference to the
	/// variable.
	pub fn add_original(
		&mut self,
		name: impl Into<String>,
		var_type: VarType,
		lb: f64,
		ub: f64,
		obj: f64,
	) -> VarRef {
		let var = self.create_var(
			name.into(),
			var_type,
			lb,
			ub,
			obj,
			VarStatus::Original { transformed: None },
		);
		self.vars[var].uses = 1;
		var
	}

	/// Add an active variable of the transformed problem.
	///
	/// The bounds are adjusted in the same way as [`Self::add_original`]. The
	/// problem holds one reference to the variable.
	pub fn add_var(
		&mut self,
		name: impl Into<String>,
		var_type: VarType,
		lb: f64,
		ub: f64,
		obj: f64,
	) -> VarRef {
		let var = self.create_var(name.into(), var_type, lb, ub, obj, VarStatus::Loose);
		self.vars[var].uses = 1;
		self.push_active(var);
		var
	}

	/// Create (or return the existing) transformed counterpart of a variable of
	/// the original problem.
	///
	/// The transformed variable is active, and it is referenced both by the
	/// problem and by the original variable. The negation of an original variable is transformed
	/// into the negation of the transformed partner. Variables that are already
	/// transformed are returned unchanged.
	pub fn transform(&mut self, var: VarRef) -> Result<VarRef, VarError> {
		self.check_alive(var)?;
		match self.vars[var].status {
			VarStatus::Original {
				transformed: Some(t),
			} => Ok(t),
			VarStatus::Original { transformed: None } => {
				let orig = &self.vars[var];
				let mut trans = Variable::new(
					format!("t_{}", orig.name),
					0,
					orig.var_type,
					orig.glb_dom.lb,
					orig.glb_dom.ub,
					orig.obj,
					VarStatus::Loose,
				);
				trans.glb_dom = orig.glb_dom.clone();
				trans.loc_dom = orig.glb_dom.clone();
				trans.branch_factor = orig.branch_factor;
				trans.branch_priority = orig.branch_priority;
				trans.branch_direction = orig.branch_direction;
				trans.initial = orig.initial;
				trans.removable = orig.removable;
				trans.deletable = orig.deletable;
				trans.locks = mem::take(&mut self.vars[var].locks);
				trans.index = self.vars.len();
				trans.uses = 2;
				trans.parents.push(var);
				let t = self.vars.push(trans);
				self.vars[var].status = VarStatus::Original {
					transformed: Some(t),
				};
				self.push_active(t);
				trace!(var = %self.vars[var].name, "transformed variable");
				Ok(t)
			}
			VarStatus::Negated { var: partner, .. }
				if matches!(self.vars[partner].status, VarStatus::Original { .. }) =>
			{
				let t = self.transform(partner)?;
				self.negate(t)
			}
			_ => Ok(var),
		}
	}

	/// Add a reference to the variable.
	pub fn capture(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		self.vars[var].uses += 1;
		Ok(())
	}

	/// Remove a reference to the variable.
	///
	/// A variable whose last reference is released and that is not active is
	/// freed: it releases the variables referenced by its status, leaves the
	/// relations between variables, and can no longer be used.
	pub fn release(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		let mut stack = vec![var];
		while let Some(v) = stack.pop() {
			let x = &mut self.vars[v];
			if x.freed {
				continue;
			}
			if x.uses == 0 {
				return Err(VarError::Released(x.name.clone()));
			}
			x.uses -= 1;
			if x.uses > 0 || x.probindex.is_some() {
				continue;
			}
			trace!(var = %x.name, "free variable");
			self.remove_from_graph(v);
			let x = &mut self.vars[v];
			x.freed = true;
			x.history.clear();
			let referenced: Vec<VarRef> = match mem::replace(&mut x.status, VarStatus::Fixed) {
				VarStatus::Original { transformed } => transformed.into_iter().collect(),
				VarStatus::Aggregated { var, .. } => vec![var],
				VarStatus::MultiAggregated { vars, .. } => vars,
				VarStatus::Negated { var, .. } => vec![var],
				status => {
					x.status = status;
					Vec::new()
				}
			};
			if let Some(neg) = x.negated.take() {
				if self.vars[neg].negated == Some(v) {
					self.vars[neg].negated = None;
				}
			}
			for r in referenced {
				self.vars[r].parents.retain(|&p| p != v);
				stack.push(r);
			}
		}
		Ok(())
	}

	/// Allow the variable to be deleted from the problem.
	pub fn mark_deletable(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		self.vars[var].deletable = true;
		Ok(())
	}

	/// Mark a deletable variable for deletion.
	pub fn mark_deleted(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		if !self.vars[var].deletable {
			return Err(self.invalid_status(var, "deletion of non-deletable variables"));
		}
		self.vars[var].deleted = true;
		self.notify(VarEvent::VarDeleted { var });
		Ok(())
	}

	/// Return a deactivated LOOSE or COLUMN variable to the active variables.
	pub fn activate(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		match self.vars[var].status {
			VarStatus::Loose | VarStatus::Column(_) => {
				if self.vars[var].probindex.is_none() {
					self.push_active(var);
					trace!(var = %self.vars[var].name, "activated variable");
				}
				Ok(())
			}
			_ => Err(self.invalid_status(var, "activation")),
		}
	}

	/// Remove a LOOSE or COLUMN variable from the active variables.
	///
	/// The variable leaves the relations between variables. It is freed once
	/// its last reference is released.
	pub fn deactivate(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		match self.vars[var].status {
			VarStatus::Loose | VarStatus::Column(_) => {
				if self.vars[var].probindex.is_some() {
					self.remove_from_graph(var);
					self.remove_active(var);
					trace!(var = %self.vars[var].name, "deactivated variable");
				}
				Ok(())
			}
			_ => Err(self.invalid_status(var, "deactivation")),
		}
	}

	/// Set whether the column of the variable belongs to the initial linear
	/// relaxation, and whether it may be removed from it.
	pub fn set_column_flags(
		&mut self,
		var: VarRef,
		initial: bool,
		removable: bool,
	) -> Result<(), VarError> {
		self.check_alive(var)?;
		let x = &mut self.vars[var];
		x.initial = initial;
		x.removable = removable;
		Ok(())
	}

	/// Give a LOOSE variable a column in the linear relaxation.
	pub fn create_column(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		if !matches!(self.vars[var].status, VarStatus::Loose) {
			return Err(self.invalid_status(var, "column creation"));
		}
		let x = &mut self.vars[var];
		let col = Column {
			lb: x.loc_dom.lb,
			ub: x.loc_dom.ub,
			obj: x.obj,
		};
		self.columns.column_created(var, &col);
		x.status = VarStatus::Column(col);
		trace!(var = %x.name, "created column");
		Ok(())
	}

	/// Remove the column of a COLUMN variable, turning it back into a LOOSE
	/// variable.
	pub fn remove_column(&mut self, var: VarRef) -> Result<(), VarError> {
		self.check_alive(var)?;
		if !matches!(self.vars[var].status, VarStatus::Column(_)) {
			return Err(self.invalid_status(var, "column removal"));
		}
		self.vars[var].status = VarStatus::Loose;
		self.columns.column_removed(var);
		trace!(var = %self.vars[var].name, "removed column");
		Ok(())
	}

	/// Add (or, with negative numbers, remove) rounding locks.
	///
	/// Locks of aggregated, multi-aggregated and negated variables are
	/// forwarded to the variables they are expressed in, exchanging the lock
	/// directions for negative coefficients. Locks of original variables are
	/// forwarded to their transformed counterpart once it exists.
	pub fn add_locks(&mut self, var: VarRef, down: i32, up: i32) -> Result<(), VarError> {
		self.check_alive(var)?;
		for (v, scalar) in self.terminal_vars(var) {
			let (d, u) = if scalar > 0.0 { (down, up) } else { (up, down) };
			let x = &mut self.vars[v];
			let new_down = i64::from(x.locks[0]) + i64::from(d);
			let new_up = i64::from(x.locks[1]) + i64::from(u);
			if new_down < 0 || new_up < 0 {
				return Err(VarError::LockUnderflow(x.name.clone()));
			}
			let old = x.locks;
			x.locks = [new_down as u32, new_up as u32];
			if (old[0] > 1 && x.locks[0] <= 1) || (old[1] > 1 && x.locks[1] <= 1) {
				self.notify(VarEvent::VarUnlocked { var: v });
			}
		}
		Ok(())
	}

	/// The effective number of rounding locks of the variable in the given
	/// direction.
	pub fn n_locks(&self, var: VarRef, lock_type: LockType) -> u32 {
		self.terminal_vars(var)
			.into_iter()
			.map(|(v, scalar)| {
				let lt = if scalar > 0.0 { lock_type } else { !lock_type };
				self.vars[v].locks[lt.index()]
			})
			.sum()
	}

	/// Returns whether rounding the variable down cannot violate any constraint.
	pub fn may_round_down(&self, var: VarRef) -> bool {
		self.n_locks(var, LockType::Down) == 0
	}

	/// Returns whether rounding the variable up cannot violate any constraint.
	pub fn may_round_up(&self, var: VarRef) -> bool {
		self.n_locks(var, LockType::Up) == 0
	}

	/// Change the objective coefficient of an original or active variable.
	pub fn chg_obj(&mut self, var: VarRef, obj: f64) -> Result<(), VarError> {
		self.check_alive(var)?;
		match self.vars[var].status {
			VarStatus::Original { .. } | VarStatus::Loose | VarStatus::Column(_) => {
				self.set_obj(var, obj);
				Ok(())
			}
			_ => Err(self.invalid_status(var, "objective changes")),
		}
	}

	/// Add to the objective coefficient of a variable.
	///
	/// The change is distributed over the variables that the variable is
	/// expressed in, and the objective offset. Changes of original variables
	/// are also applied to their transformed counterpart.
	pub fn add_obj(&mut self, var: VarRef, delta: f64) -> Result<(), VarError> {
		self.check_alive(var)?;
		let mut stack = vec![(var, delta)];
		while let Some((v, delta)) = stack.pop() {
			match &self.vars[v].status {
				VarStatus::Original { transformed } => {
					let transformed = *transformed;
					let obj = self.vars[v].obj + delta;
					self.set_obj(v, obj);
					if let Some(t) = transformed {
						stack.push((t, delta));
					}
				}
				VarStatus::Loose | VarStatus::Column(_) => {
					let obj = self.vars[v].obj + delta;
					self.set_obj(v, obj);
				}
				VarStatus::Fixed => {
					self.obj_offset += delta * self.vars[v].glb_dom.lb;
				}
				VarStatus::Aggregated { var, transform } => {
					self.obj_offset += delta * transform.offset;
					stack.push((*var, delta * transform.scale));
				}
				VarStatus::MultiAggregated {
					vars,
					scalars,
					constant,
				} => {
					self.obj_offset += delta * constant;
					stack.extend(vars.iter().zip(scalars).map(|(&y, &a)| (y, delta * a)));
				}
				VarStatus::Negated { var, constant } => {
					self.obj_offset += delta * constant;
					stack.push((*var, -delta));
				}
			}
		}
		Ok(())
	}

	/// Change the branching factor of the variable (or of the variables it is
	/// expressed in).
	pub fn chg_branch_factor(&mut self, var: VarRef, factor: f64) -> Result<(), VarError> {
		self.check_alive(var)?;
		debug_assert!(factor >= 0.0);
		for (v, _) in self.terminal_vars(var) {
			self.vars[v].branch_factor = factor;
		}
		Ok(())
	}

	/// Change the branching priority of the variable (or of the variables it is
	/// expressed in).
	pub fn chg_branch_priority(&mut self, var: VarRef, priority: i32) -> Result<(), VarError> {
		self.check_alive(var)?;
		for (v, _) in self.terminal_vars(var) {
			self.vars[v].branch_priority = priority;
		}
		Ok(())
	}

	/// Change the preferred branching direction of the variable (or of the
	/// variables it is expressed in, exchanging the direction for negative
	/// coefficients).
	pub fn chg_branch_direction(
		&mut self,
		var: VarRef,
		dir: BranchDirection,
	) -> Result<(), VarError> {
		self.check_alive(var)?;
		for (v, scalar) in self.terminal_vars(var) {
			self.vars[v].branch_direction = if scalar > 0.0 { dir } else { !dir };
		}
		Ok(())
	}

	/// Evaluate the value of a variable, given the values of the variables at
	/// the end of its resolution.
	pub fn value_of(&self, var: VarRef, value: impl Fn(VarRef) -> f64) -> f64 {
		let (terms, constant) = self.flatten_linear_sum(&[(var, 1.0)], 0.0);
		terms
			.into_iter()
			.map(|(v, a)| a * value(v))
			.sum::<f64>()
			+ constant
	}

	/// Internal method to create a variable and store it in the arena.
	fn create_var(
		&mut self,
		name: String,
		var_type: VarType,
		lb: f64,
		ub: f64,
		obj: f64,
		status: VarStatus,
	) -> VarRef {
		let (mut lb, mut ub) = (self.config.normalize(lb), self.config.normalize(ub));
		if var_type == VarType::Binary {
			lb = lb.max(0.0);
			ub = ub.min(1.0);
		}
		if var_type.is_integral() {
			lb = self.config.feas_ceil(lb);
			ub = self.config.feas_floor(ub);
		}
		debug_assert!(lb <= ub, "variable {name} created with empty domain [{lb},{ub}]");
		let index = self.vars.len();
		debug!(%name, %var_type, lb, ub, obj, "create variable");
		self.vars
			.push(Variable::new(name, index, var_type, lb, ub, obj, status))
	}

	/// Internal method to add a variable to the active variable array.
	pub(crate) fn push_active(&mut self, var: VarRef) {
		debug_assert!(self.vars[var].probindex.is_none());
		self.vars[var].probindex = Some(self.active.len());
		self.active.push(var);
	}

	/// Internal method to remove a variable from the active variable array.
	pub(crate) fn remove_active(&mut self, var: VarRef) {
		if let Some(i) = self.vars[var].probindex.take() {
			let _ = self.active.swap_remove(i);
			if let Some(&moved) = self.active.get(i) {
				self.vars[moved].probindex = Some(i);
			}
		}
	}

	/// Internal method to change the objective coefficient and notify the event
	/// sink and linear relaxation.
	pub(crate) fn set_obj(&mut self, var: VarRef, obj: f64) {
		let x = &mut self.vars[var];
		let old = mem::replace(&mut x.obj, obj);
		if old == obj {
			return;
		}
		if let VarStatus::Column(col) = &mut x.status {
			col.obj = obj;
			self.columns.column_obj_changed(var, obj);
		}
		self.notify(VarEvent::ObjChanged { var, old, new: obj });
	}

	/// Internal method to collect the variables at the end of the resolution of
	/// a variable (expanding multi-aggregations), together with the accumulated
	/// scalar.
	pub(crate) fn terminal_vars(&self, var: VarRef) -> Vec<(VarRef, f64)> {
		let mut result = Vec::new();
		let mut stack = vec![(var, 1.0)];
		while let Some((v, scalar)) = stack.pop() {
			match &self.vars[v].status {
				VarStatus::Original {
					transformed: Some(t),
				} => stack.push((*t, scalar)),
				VarStatus::Aggregated { var, transform } => {
					stack.push((*var, scalar * transform.scale));
				}
				VarStatus::Negated { var, .. } => stack.push((*var, -scalar)),
				VarStatus::MultiAggregated { vars, scalars, .. } => {
					stack.extend(vars.iter().zip(scalars).map(|(&y, &a)| (y, scalar * a)));
				}
				VarStatus::Original { transformed: None }
				| VarStatus::Loose
				| VarStatus::Column(_)
				| VarStatus::Fixed => result.push((v, scalar)),
			}
		}
		result
	}

	/// Internal method to deliver an event to the event sink.
	pub(crate) fn notify(&mut self, event: VarEvent) {
		self.events.notify(event);
	}

	/// Internal method that returns an error if the variable has been freed.
	pub(crate) fn check_alive(&self, var: VarRef) -> Result<(), VarError> {
		if self.vars[var].freed {
			Err(VarError::Released(self.vars[var].name.clone()))
		} else {
			Ok(())
		}
	}

	/// Internal method to create an [`VarError::InvalidStatus`] error.
	pub(crate) fn invalid_status(&self, var: VarRef, operation: &'static str) -> VarError {
		let x = &self.vars[var];
		VarError::InvalidStatus {
			name: x.name.clone(),
			status: x.status(),
			operation,
		}
	}

	/// Internal method to access the affine map of an aggregated or negated
	/// variable.
	pub(crate) fn link(&self, var: VarRef) -> Option<(VarRef, LinearTransform)> {
		match self.vars[var].status {
			VarStatus::Aggregated { var, transform } => Some((var, transform)),
			VarStatus::Negated { var, constant } => Some((var, LinearTransform::negation(constant))),
			_ => None,
		}
	}
}

impl Default for Problem {
	fn default() -> Self {
		Self::new(Config::default())
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;
	use tracing_test::traced_test;

	use crate::{
		tests::EventLog, BranchDirection, LockType, Problem, Status, VarError, VarEvent, VarType,
	};

	#[test]
	#[traced_test]
	fn test_create_adjusts_bounds() {
		let mut prb = Problem::default();
		let b = prb.add_var("b", VarType::Binary, -3.0, 7.0, 1.0);
		let i = prb.add_var("i", VarType::Integer, -2.5, 3.7, 0.0);
		let c = prb.add_var("c", VarType::Continuous, -1e25, 1e20, 0.0);
		expect!["<b>: binary, loose, obj=1, global [0,1], local [0,1]"]
			.assert_eq(&prb.var(b).to_string());
		expect!["<i>: integer, loose, obj=0, global [-2,3], local [-2,3]"]
			.assert_eq(&prb.var(i).to_string());
		expect!["<c>: continuous, loose, obj=0, global [-inf,inf], local [-inf,inf]"]
			.assert_eq(&prb.var(c).to_string());
		assert_eq!(prb.active_vars(), &[b, i, c]);
		assert_eq!(prb.var(i).probindex(), Some(1));
	}

	#[test]
	#[traced_test]
	fn test_transform_and_release() {
		let mut prb = Problem::default();
		let x = prb.add_original("x", VarType::Integer, 0.0, 5.0, 2.0);
		prb.add_locks(x, 1, 0).unwrap();
		let t = prb.transform(x).unwrap();
		assert_eq!(prb.transform(x).unwrap(), t);
		assert_eq!(prb.var(t).status(), Status::Loose);
		assert_eq!(prb.var(t).parents(), &[x]);
		assert_eq!(prb.var(x).transformed(), Some(t));
		// locks are moved, and forwarded from then on
		assert_eq!(prb.var(t).locks(LockType::Down), 1);
		prb.add_locks(x, 0, 2).unwrap();
		assert_eq!(prb.n_locks(x, LockType::Up), 2);
		assert_eq!(prb.var(x).locks(LockType::Up), 0);

		prb.release(x).unwrap();
		assert!(prb.var(x).freed);
		// the transformed variable is still active
		assert!(!prb.var(t).freed);
		assert_eq!(prb.var(t).n_uses(), 1);
		assert!(matches!(prb.capture(x), Err(VarError::Released(_))));
	}

	#[test]
	fn test_locks_through_negation() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let nx = prb.negate(x).unwrap();
		prb.add_locks(nx, 1, 3).unwrap();
		assert_eq!(prb.var(x).locks(LockType::Down), 3);
		assert_eq!(prb.var(x).locks(LockType::Up), 1);
		assert_eq!(prb.n_locks(nx, LockType::Down), 1);
		assert!(!prb.may_round_up(nx));
		assert!(matches!(
			prb.add_locks(x, -4, 0),
			Err(VarError::LockUnderflow(_))
		));
	}

	#[test]
	fn test_unlock_event() {
		let log = EventLog::default();
		let mut prb = Problem::default().with_event_sink(Box::new(log.clone()));
		let x = prb.add_var("x", VarType::Continuous, 0.0, 1.0, 0.0);
		prb.add_locks(x, 2, 0).unwrap();
		prb.add_locks(x, -1, 0).unwrap();
		assert_eq!(log.events(), vec![VarEvent::VarUnlocked { var: x }]);
	}

	#[test]
	fn test_objective_and_branching_metadata() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 1.0);
		let nx = prb.negate(x).unwrap();
		prb.add_obj(nx, 2.0).unwrap();
		// nx = 10 - x
		assert_eq!(prb.var(x).obj(), -1.0);
		assert_eq!(prb.obj_offset(), 20.0);
		assert!(prb.chg_obj(nx, 1.0).is_err());

		prb.chg_branch_direction(nx, BranchDirection::Upwards)
			.unwrap();
		assert_eq!(prb.var(x).branch_direction(), BranchDirection::Downwards);
		prb.chg_branch_priority(nx, 3).unwrap();
		assert_eq!(prb.var(x).branch_priority(), 3);
		assert_eq!(prb.value_of(nx, |_| 4.0), 6.0);
	}

	#[test]
	fn test_column_transitions() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 3.0, 2.0);
		prb.create_column(x).unwrap();
		assert_eq!(prb.var(x).status(), Status::Column);
		assert_eq!(prb.var(x).column().map(|c| c.ub()), Some(3.0));
		assert!(prb.create_column(x).is_err());
		prb.remove_column(x).unwrap();
		assert_eq!(prb.var(x).status(), Status::Loose);
	}

	#[test]
	fn test_deletion_marks() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 3.0, 2.0);
		assert!(prb.mark_deleted(x).is_err());
		prb.mark_deletable(x).unwrap();
		prb.mark_deleted(x).unwrap();
		assert!(prb.var(x).is_deleted());
	}

	#[test]
	fn test_activation() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let z = prb.add_var("z", VarType::Binary, 0.0, 1.0, 0.0);
		let _ = prb.add_clique(&[(x, true), (y, true), (z, true)]).unwrap();

		prb.deactivate(x).unwrap();
		assert_eq!(prb.active_vars(), &[z, y]);
		assert_eq!(prb.var(y).probindex(), Some(1));
		assert!(prb.var(x).cliques(true).is_empty());
		assert!(!prb.have_common_clique(x, true, y, true, false));
		assert!(prb.have_common_clique(z, true, y, true, false));

		prb.activate(x).unwrap();
		assert_eq!(prb.var(x).probindex(), Some(2));

		prb.deactivate(z).unwrap();
		prb.release(z).unwrap();
		assert!(prb.var(z).freed);
		assert!(matches!(prb.activate(z), Err(VarError::Released(_))));
	}
}
