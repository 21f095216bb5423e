//! The central [`Variable`] entity and the small value types that describe
//! it.

use std::{
	fmt::{self, Display},
	ops::Not,
};

use delegate::delegate;

use crate::{
	clique::CliqueRef,
	domain::{Domain, Holelist},
	helpers::linear_transform::LinearTransform,
	history::{BoundChangeInfo, BoundHistory},
	implication::{Implications, VarBounds},
	statistics::BranchHistory,
};

index_vec::define_index_type! {
	/// Identifies a variable in a [`crate::Problem`].
	pub struct VarRef = u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// The type of values that a variable may take.
pub enum VarType {
	/// Integer variable with values in `{0, 1}`.
	Binary,
	/// Integer variable.
	Integer,
	/// Variable that takes integral values in every feasible solution, without
	/// this being enforced by the problem formulation.
	ImplicitInteger,
	/// Continuous variable.
	Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Distinguishes between the lower and upper bound of a variable.
pub enum BoundType {
	/// The lower bound.
	Lower,
	/// The upper bound.
	Upper,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
/// The preferred direction in which to branch on a variable.
pub enum BranchDirection {
	/// Prefer the child in which the upper bound is decreased.
	Downwards,
	/// Prefer the child in which the lower bound is increased.
	Upwards,
	/// No preference.
	#[default]
	Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The direction of a rounding lock.
pub enum LockType {
	/// Rounding the variable down may violate a constraint.
	Down,
	/// Rounding the variable up may violate a constraint.
	Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The status of a variable, without the data associated with it.
pub enum Status {
	/// Variable of the original problem formulation.
	Original,
	/// Active variable of the transformed problem without column.
	Loose,
	/// Active variable of the transformed problem with a column in the linear
	/// relaxation.
	Column,
	/// Variable fixed to a single value.
	Fixed,
	/// Variable expressed as an affine function of another variable.
	Aggregated,
	/// Variable expressed as an affine function of several other variables.
	MultiAggregated,
	/// Variable expressed as a constant minus another variable.
	Negated,
}

#[derive(Debug, Clone, PartialEq)]
/// The column of a variable in the linear relaxation.
pub struct Column {
	/// The lower bound of the column, which may deviate from the local bound
	/// of the variable while diving.
	pub(crate) lb: f64,
	/// The upper bound of the column, which may deviate from the local bound
	/// of the variable while diving.
	pub(crate) ub: f64,
	/// The objective coefficient of the column.
	pub(crate) obj: f64,
}

#[derive(Debug, Clone, PartialEq)]
#[allow(
	variant_size_differences,
	reason = "the status payload varies from nothing to a full linear sum"
)]
/// The status of a variable together with its status-specific data.
pub(crate) enum VarStatus {
	/// Variable of the original problem, possibly linked to its transformed
	/// counterpart.
	Original {
		/// The transformed variable, once it is created.
		transformed: Option<VarRef>,
	},
	/// Active variable without column.
	Loose,
	/// Active variable with a column.
	Column(Column),
	/// Variable fixed to the (equal) bounds of its global domain.
	Fixed,
	/// `x = scale * var + offset`.
	Aggregated {
		/// The variable onto which this variable is aggregated.
		var: VarRef,
		/// The affine map from `var` to this variable.
		transform: LinearTransform,
	},
	/// `x = sum(scalars[i] * vars[i]) + constant`.
	MultiAggregated {
		/// The variables of the aggregation.
		vars: Vec<VarRef>,
		/// The coefficients of the variables.
		scalars: Vec<f64>,
		/// The constant of the aggregation.
		constant: f64,
	},
	/// `x = constant - var`.
	Negated {
		/// The negation partner.
		var: VarRef,
		/// The constant of the negation.
		constant: f64,
	},
}

#[derive(Debug, Clone, PartialEq)]
/// A decision variable.
pub struct Variable {
	/// The name of the variable.
	pub(crate) name: String,
	/// Unique creation index, increasing with every created variable.
	pub(crate) index: usize,
	/// The objective coefficient.
	pub(crate) obj: f64,
	/// The type of the variable.
	pub(crate) var_type: VarType,
	/// The status and its data.
	pub(crate) status: VarStatus,
	/// The globally valid domain.
	pub(crate) glb_dom: Domain,
	/// The domain at the current search-tree node.
	pub(crate) loc_dom: Domain,
	/// The number of references to this variable.
	pub(crate) uses: u32,
	/// The position in the active variable array, if the variable is active.
	pub(crate) probindex: Option<usize>,
	/// The number of down and up rounding locks.
	pub(crate) locks: [u32; 2],
	/// Factor used to weigh the branching score of the variable.
	pub(crate) branch_factor: f64,
	/// Priority of the variable when selecting a branching candidate.
	pub(crate) branch_priority: i32,
	/// Preferred branching direction.
	pub(crate) branch_direction: BranchDirection,
	/// Variables whose resolution passes through this variable.
	pub(crate) parents: Vec<VarRef>,
	/// The negation partner, once created.
	pub(crate) negated: Option<VarRef>,
	/// Record of the local bound changes of the variable.
	pub(crate) history: BoundHistory,
	/// Variable lower bounds `x >= b * z + d`.
	pub(crate) vlbs: VarBounds,
	/// Variable upper bounds `x <= b * z + d`.
	pub(crate) vubs: VarBounds,
	/// Implications triggered by fixing this (binary) variable.
	pub(crate) implics: Implications,
	/// Variables that hold an implication on this variable (one entry per
	/// implication).
	pub(crate) implied_by: Vec<VarRef>,
	/// The cliques that contain this variable with value `false` (index 0) or
	/// `true` (index 1).
	pub(crate) cliques: [Vec<CliqueRef>; 2],
	/// Whether the column of the variable should be part of the initial linear
	/// relaxation.
	pub(crate) initial: bool,
	/// Whether the column of the variable may be removed from the linear
	/// relaxation when it becomes obsolete.
	pub(crate) removable: bool,
	/// Whether the variable may be deleted from the problem.
	pub(crate) deletable: bool,
	/// Whether the variable is marked for deletion.
	pub(crate) deleted: bool,
	/// Whether the variable has been freed after its last use was released.
	pub(crate) freed: bool,
	/// Branching statistics over all runs.
	pub(crate) branching: BranchHistory,
	/// Branching statistics of the current run.
	pub(crate) branching_run: BranchHistory,
}

impl VarType {
	/// Returns whether variables of this type only take integral values.
	pub fn is_integral(self) -> bool {
		!matches!(self, VarType::Continuous)
	}
}

impl Display for VarType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			VarType::Binary => write!(f, "binary"),
			VarType::Integer => write!(f, "integer"),
			VarType::ImplicitInteger => write!(f, "implicit"),
			VarType::Continuous => write!(f, "continuous"),
		}
	}
}

impl BoundType {
	/// The index used to address per-bound-type arrays.
	pub(crate) fn index(self) -> usize {
		match self {
			BoundType::Lower => 0,
			BoundType::Upper => 1,
		}
	}
}

impl Not for BoundType {
	type Output = Self;

	fn not(self) -> Self::Output {
		match self {
			BoundType::Lower => BoundType::Upper,
			BoundType::Upper => BoundType::Lower,
		}
	}
}

impl Not for BranchDirection {
	type Output = Self;

	fn not(self) -> Self::Output {
		match self {
			BranchDirection::Downwards => BranchDirection::Upwards,
			BranchDirection::Upwards => BranchDirection::Downwards,
			BranchDirection::Auto => BranchDirection::Auto,
		}
	}
}

impl LockType {
	/// The index used to address per-lock-type arrays.
	pub(crate) fn index(self) -> usize {
		match self {
			LockType::Down => 0,
			LockType::Up => 1,
		}
	}
}

impl Not for LockType {
	type Output = Self;

	fn not(self) -> Self::Output {
		match self {
			LockType::Down => LockType::Up,
			LockType::Up => LockType::Down,
		}
	}
}

impl Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Original => write!(f, "original"),
			Status::Loose => write!(f, "loose"),
			Status::Column => write!(f, "column"),
			Status::Fixed => write!(f, "fixed"),
			Status::Aggregated => write!(f, "aggregated"),
			Status::MultiAggregated => write!(f, "multi-aggregated"),
			Status::Negated => write!(f, "negated"),
		}
	}
}

impl Column {
	/// The lower bound of the column.
	pub fn lb(&self) -> f64 {
		self.lb
	}

	/// The upper bound of the column.
	pub fn ub(&self) -> f64 {
		self.ub
	}

	/// The objective coefficient of the column.
	pub fn obj(&self) -> f64 {
		self.obj
	}
}

impl VarStatus {
	/// The status tag.
	pub(crate) fn tag(&self) -> Status {
		match self {
			VarStatus::Original { .. } => Status::Original,
			VarStatus::Loose => Status::Loose,
			VarStatus::Column(_) => Status::Column,
			VarStatus::Fixed => Status::Fixed,
			VarStatus::Aggregated { .. } => Status::Aggregated,
			VarStatus::MultiAggregated { .. } => Status::MultiAggregated,
			VarStatus::Negated { .. } => Status::Negated,
		}
	}
}

impl Variable {
	/// Create a new variable in the given status.
	pub(crate) fn new(
		name: String,
		index: usize,
		var_type: VarType,
		lb: f64,
		ub: f64,
		obj: f64,
		status: VarStatus,
	) -> Self {
		Self {
			name,
			index,
			obj,
			var_type,
			status,
			glb_dom: Domain::new(lb, ub),
			loc_dom: Domain::new(lb, ub),
			uses: 0,
			probindex: None,
			locks: [0, 0],
			branch_factor: 1.0,
			branch_priority: 0,
			branch_direction: BranchDirection::Auto,
			parents: Vec::new(),
			negated: None,
			history: BoundHistory::default(),
			vlbs: VarBounds::default(),
			vubs: VarBounds::default(),
			implics: Implications::default(),
			implied_by: Vec::new(),
			cliques: [Vec::new(), Vec::new()],
			initial: true,
			removable: false,
			deletable: false,
			deleted: false,
			freed: false,
			branching: BranchHistory::default(),
			branching_run: BranchHistory::default(),
		}
	}

	/// The name of the variable.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// The unique creation index of the variable.
	pub fn index(&self) -> usize {
		self.index
	}

	/// The objective coefficient of the variable.
	pub fn obj(&self) -> f64 {
		self.obj
	}

	/// The type of the variable.
	pub fn var_type(&self) -> VarType {
		self.var_type
	}

	/// The status of the variable.
	pub fn status(&self) -> Status {
		self.status.tag()
	}

	/// Returns whether the variable is binary: an integral variable with global
	/// bounds within `[0, 1]`.
	pub fn is_binary(&self) -> bool {
		self.var_type == VarType::Binary
			|| (self.var_type.is_integral() && self.glb_dom.lb >= 0.0 && self.glb_dom.ub <= 1.0)
	}

	/// Returns whether the variable only takes integral values.
	pub fn is_integral(&self) -> bool {
		self.var_type.is_integral()
	}

	/// Returns whether the variable belongs to the transformed problem.
	pub fn is_transformed(&self) -> bool {
		!matches!(self.status, VarStatus::Original { .. })
	}

	/// Returns whether the variable is part of the active variable array.
	pub fn is_active(&self) -> bool {
		self.probindex.is_some()
	}

	/// The position of the variable in the active variable array.
	pub fn probindex(&self) -> Option<usize> {
		self.probindex
	}

	/// The number of references to the variable.
	pub fn n_uses(&self) -> u32 {
		self.uses
	}

	/// The globally valid domain.
	pub fn global_domain(&self) -> &Domain {
		&self.glb_dom
	}

	/// The domain at the current search-tree node.
	pub fn local_domain(&self) -> &Domain {
		&self.loc_dom
	}

	delegate! {
		to self.glb_dom {
			/// The global lower bound as stored in the variable.
			#[call(lb)]
			pub fn lb_global(&self) -> f64;
			/// The global upper bound as stored in the variable.
			#[call(ub)]
			pub fn ub_global(&self) -> f64;
			/// The global holes of the variable.
			#[call(holes)]
			pub fn holes_global(&self) -> &Holelist;
		}
		to self.loc_dom {
			/// The local lower bound as stored in the variable.
			#[call(lb)]
			pub fn lb_local(&self) -> f64;
			/// The local upper bound as stored in the variable.
			#[call(ub)]
			pub fn ub_local(&self) -> f64;
			/// The local holes of the variable.
			#[call(holes)]
			pub fn holes_local(&self) -> &Holelist;
		}
	}

	/// The column of the variable, if it has one.
	pub fn column(&self) -> Option<&Column> {
		match &self.status {
			VarStatus::Column(col) => Some(col),
			_ => None,
		}
	}

	/// The number of rounding locks stored on the variable itself.
	///
	/// Note that locks of aggregated, multi-aggregated and negated variables
	/// are forwarded to the variables they are expressed in, use
	/// [`crate::Problem::n_locks`] to query the effective locks.
	pub fn locks(&self, lock_type: LockType) -> u32 {
		self.locks[lock_type.index()]
	}

	/// The branching factor of the variable.
	pub fn branch_factor(&self) -> f64 {
		self.branch_factor
	}

	/// The branching priority of the variable.
	pub fn branch_priority(&self) -> i32 {
		self.branch_priority
	}

	/// The preferred branching direction of the variable.
	pub fn branch_direction(&self) -> BranchDirection {
		self.branch_direction
	}

	/// The variables whose resolution passes through this variable.
	pub fn parents(&self) -> &[VarRef] {
		&self.parents
	}

	/// The negation partner of the variable, if it was created.
	pub fn negated_var(&self) -> Option<VarRef> {
		self.negated
	}

	/// The variable onto which this variable is aggregated, together with the
	/// scalar and constant of the aggregation.
	pub fn aggregation(&self) -> Option<(VarRef, f64, f64)> {
		match self.status {
			VarStatus::Aggregated { var, transform } => {
				Some((var, transform.scale, transform.offset))
			}
			_ => None,
		}
	}

	/// The variables, scalars and constant of a multi-aggregated variable.
	pub fn multi_aggregation(&self) -> Option<(&[VarRef], &[f64], f64)> {
		match &self.status {
			VarStatus::MultiAggregated {
				vars,
				scalars,
				constant,
			} => Some((vars, scalars, *constant)),
			_ => None,
		}
	}

	/// The negation partner and constant of a negated variable.
	pub fn negation(&self) -> Option<(VarRef, f64)> {
		match self.status {
			VarStatus::Negated { var, constant } => Some((var, constant)),
			_ => None,
		}
	}

	/// The transformed counterpart of an original variable.
	pub fn transformed(&self) -> Option<VarRef> {
		match self.status {
			VarStatus::Original { transformed } => transformed,
			_ => None,
		}
	}

	/// The recorded local bound changes of the given bound type.
	pub fn bound_changes(&self, bound_type: BoundType) -> &[BoundChangeInfo] {
		self.history.changes(bound_type)
	}

	/// The variable lower bounds of the variable.
	pub fn vlbs(&self) -> &VarBounds {
		&self.vlbs
	}

	/// The variable upper bounds of the variable.
	pub fn vubs(&self) -> &VarBounds {
		&self.vubs
	}

	/// The variable bounds of the given type.
	pub fn var_bounds(&self, bound_type: BoundType) -> &VarBounds {
		match bound_type {
			BoundType::Lower => &self.vlbs,
			BoundType::Upper => &self.vubs,
		}
	}

	/// Mutable access to the variable bounds of the given type.
	pub(crate) fn var_bounds_mut(&mut self, bound_type: BoundType) -> &mut VarBounds {
		match bound_type {
			BoundType::Lower => &mut self.vlbs,
			BoundType::Upper => &mut self.vubs,
		}
	}

	/// The implications of the variable.
	pub fn implications(&self) -> &Implications {
		&self.implics
	}

	/// The cliques that contain the variable with the given value.
	pub fn cliques(&self, value: bool) -> &[CliqueRef] {
		&self.cliques[usize::from(value)]
	}

	/// Whether the column of the variable belongs to the initial relaxation.
	pub fn is_initial(&self) -> bool {
		self.initial
	}

	/// Whether the column of the variable may be removed from the relaxation.
	pub fn is_removable(&self) -> bool {
		self.removable
	}

	/// Whether the variable may be deleted.
	pub fn is_deletable(&self) -> bool {
		self.deletable
	}

	/// Whether the variable is marked for deletion.
	pub fn is_deleted(&self) -> bool {
		self.deleted
	}

	/// Branching statistics of the variable over all runs.
	pub fn branching_history(&self) -> &BranchHistory {
		&self.branching
	}

	/// Branching statistics of the variable in the current run.
	pub fn branching_history_run(&self) -> &BranchHistory {
		&self.branching_run
	}
}

impl Display for Variable {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"<{}>: {}, {}, obj={}, global {}, local {}",
			self.name,
			self.var_type,
			self.status(),
			self.obj,
			self.glb_dom,
			self.loc_dom
		)
	}
}

#[cfg(test)]
mod tests {
	use expect_test::expect;

	use crate::{
		var::{VarStatus, Variable},
		BoundType, BranchDirection, LockType, VarType,
	};

	#[test]
	fn test_display() {
		let var = Variable::new("x".to_owned(), 0, VarType::Integer, 0.0, 4.0, 2.5, VarStatus::Loose);
		expect!["<x>: integer, loose, obj=2.5, global [0,4], local [0,4]"].assert_eq(&var.to_string());

		let var = Variable::new(
			"y".to_owned(),
			1,
			VarType::Continuous,
			f64::NEG_INFINITY,
			f64::INFINITY,
			0.0,
			VarStatus::Original { transformed: None },
		);
		expect!["<y>: continuous, original, obj=0, global [-inf,inf], local [-inf,inf]"]
			.assert_eq(&var.to_string());
	}

	#[test]
	fn test_binary_detection() {
		let var = Variable::new("b".to_owned(), 0, VarType::Integer, 0.0, 1.0, 0.0, VarStatus::Loose);
		assert!(var.is_binary());
		let var = Variable::new("c".to_owned(), 1, VarType::Continuous, 0.0, 1.0, 0.0, VarStatus::Loose);
		assert!(!var.is_binary());
		let var = Variable::new("i".to_owned(), 2, VarType::Integer, 0.0, 2.0, 0.0, VarStatus::Loose);
		assert!(!var.is_binary());
	}

	#[test]
	fn test_flips() {
		assert_eq!(!BoundType::Lower, BoundType::Upper);
		assert_eq!(!LockType::Up, LockType::Down);
		assert_eq!(!BranchDirection::Downwards, BranchDirection::Upwards);
		assert_eq!(!BranchDirection::Auto, BranchDirection::Auto);
	}
}
