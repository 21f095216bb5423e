//! The history of local bound changes of a variable, together with the
//! information required to explain each change during conflict analysis.
//!
//! Every committed local bound change of an active variable is recorded as a
//! [`BoundChangeInfo`], stored in the order in which the changes were made.
//! Because the changes are made in the order of their [`BdChgIdx`], the
//! records can be searched using binary search to reconstruct the bound of a
//! variable at any earlier point of the search.

use std::fmt::{self, Display};

use crate::{BoundType, VarRef};

index_vec::define_index_type! {
	/// Handle for a constraint that is managed outside of this crate, used to
	/// justify a bound change.
	pub struct ConsRef = u32;
}

index_vec::define_index_type! {
	/// Handle for a propagator that is managed outside of this crate, used to
	/// justify a bound change.
	pub struct PropRef = u32;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Position of a bound change in the search: the depth of the node in the
/// search tree, and the position of the change within the node's
/// [`crate::DomChg`].
///
/// Indices are ordered lexicographically, which matches the order in which
/// changes are applied along a path of the search tree.
pub struct BdChgIdx {
	/// The depth of the search-tree node in which the change was made.
	depth: u32,
	/// The position of the change in the node's domain change log.
	pos: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The kind of event that caused a bound change.
pub enum BoundChangeKind {
	/// The bound change was a branching decision.
	Branching,
	/// The bound change was inferred by a constraint.
	ConsInfer,
	/// The bound change was inferred by a propagator (or an anonymous
	/// inference without propagator).
	PropInfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The justification of a bound change.
pub enum BoundReason {
	/// The bound change was a branching decision.
	Branching,
	/// The bound change was inferred by a constraint.
	Constraint {
		/// The constraint responsible for the change.
		cons: ConsRef,
		/// Opaque information stored by the constraint to reconstruct its
		/// reasoning.
		info: i32,
	},
	/// The bound change was inferred by a propagator.
	Propagator {
		/// The propagator responsible for the change, if any.
		prop: Option<PropRef>,
		/// Opaque information stored by the propagator to reconstruct its
		/// reasoning.
		info: i32,
	},
}

#[derive(Debug, Clone, PartialEq)]
/// Record of a single committed local bound change.
pub struct BoundChangeInfo {
	/// The bound before the change.
	pub(crate) old_bound: f64,
	/// The bound after the change.
	pub(crate) new_bound: f64,
	/// The position of the change in the search.
	pub(crate) index: BdChgIdx,
	/// Whether the lower or the upper bound was changed.
	pub(crate) bound_type: BoundType,
	/// The justification of the change.
	pub(crate) reason: BoundReason,
	/// The variable on which the change was requested, before it was resolved
	/// to the active variable that holds this record.
	pub(crate) infer_var: VarRef,
	/// The bound type of the requested change on [`Self::infer_var`].
	pub(crate) infer_bound_type: BoundType,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// Per-variable history of local bound changes.
pub(crate) struct BoundHistory {
	/// The changes of the lower bound in order of their index.
	lb: Vec<BoundChangeInfo>,
	/// The changes of the upper bound in order of their index.
	ub: Vec<BoundChangeInfo>,
}

impl BdChgIdx {
	/// Create a new bound change index.
	pub fn new(depth: u32, pos: u32) -> Self {
		Self { depth, pos }
	}

	/// The depth of the search-tree node in which the change was made.
	pub fn depth(&self) -> u32 {
		self.depth
	}

	/// The position of the change within its node.
	pub fn pos(&self) -> u32 {
		self.pos
	}
}

impl Display for BdChgIdx {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.depth, self.pos)
	}
}

impl BoundReason {
	/// The kind of bound change this justification belongs to.
	pub fn kind(&self) -> BoundChangeKind {
		match self {
			BoundReason::Branching => BoundChangeKind::Branching,
			BoundReason::Constraint { .. } => BoundChangeKind::ConsInfer,
			BoundReason::Propagator { .. } => BoundChangeKind::PropInfer,
		}
	}
}

impl BoundChangeInfo {
	/// The bound before the change.
	pub fn old_bound(&self) -> f64 {
		self.old_bound
	}

	/// The bound after the change.
	pub fn new_bound(&self) -> f64 {
		self.new_bound
	}

	/// The position of the change in the search.
	pub fn index(&self) -> BdChgIdx {
		self.index
	}

	/// The depth of the node in which the change was made.
	pub fn depth(&self) -> u32 {
		self.index.depth
	}

	/// Whether the lower or upper bound was changed.
	pub fn bound_type(&self) -> BoundType {
		self.bound_type
	}

	/// The kind of the change.
	pub fn kind(&self) -> BoundChangeKind {
		self.reason.kind()
	}

	/// The justification of the change.
	pub fn reason(&self) -> &BoundReason {
		&self.reason
	}

	/// The variable on which the change was originally requested.
	pub fn infer_var(&self) -> VarRef {
		self.infer_var
	}

	/// The bound type of the originally requested change.
	pub fn infer_bound_type(&self) -> BoundType {
		self.infer_bound_type
	}
}

impl BoundHistory {
	/// Record a new change.
	pub(crate) fn push(&mut self, info: BoundChangeInfo) {
		let list = self.list_mut(info.bound_type);
		debug_assert!(
			list.last().map_or(true, |last| last.index < info.index),
			"bound changes must be recorded in increasing index order"
		);
		list.push(info);
	}

	/// Remove and return the latest change of the given bound type.
	pub(crate) fn pop(&mut self, bound_type: BoundType) -> Option<BoundChangeInfo> {
		self.list_mut(bound_type).pop()
	}

	/// All recorded changes of the given bound type, in order.
	pub(crate) fn changes(&self, bound_type: BoundType) -> &[BoundChangeInfo] {
		match bound_type {
			BoundType::Lower => &self.lb,
			BoundType::Upper => &self.ub,
		}
	}

	/// The latest change of the given bound type made before (or, when `after`
	/// is set, at or before) the given index.
	pub(crate) fn latest_before(
		&self,
		bound_type: BoundType,
		idx: BdChgIdx,
		after: bool,
	) -> Option<&BoundChangeInfo> {
		let list = self.changes(bound_type);
		// Find the first change that does not precede the index and take the one
		// before it
		let i = list.partition_point(|info| {
			if after {
				info.index <= idx
			} else {
				info.index < idx
			}
		});
		i.checked_sub(1).map(|i| &list[i])
	}

	/// The index of the latest change of either bound.
	pub(crate) fn last_index(&self) -> Option<BdChgIdx> {
		let lb = self.lb.last().map(|info| info.index);
		let ub = self.ub.last().map(|info| info.index);
		lb.max(ub)
	}

	/// Remove all records.
	pub(crate) fn clear(&mut self) {
		self.lb.clear();
		self.ub.clear();
	}

	/// Internal method to access the list for the given bound type.
	fn list_mut(&mut self, bound_type: BoundType) -> &mut Vec<BoundChangeInfo> {
		match bound_type {
			BoundType::Lower => &mut self.lb,
			BoundType::Upper => &mut self.ub,
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		history::{BdChgIdx, BoundChangeInfo, BoundHistory, BoundReason},
		BoundChangeKind, BoundType, ConsRef, VarRef,
	};

	fn info(bound_type: BoundType, depth: u32, pos: u32, old: f64, new: f64) -> BoundChangeInfo {
		BoundChangeInfo {
			old_bound: old,
			new_bound: new,
			index: BdChgIdx::new(depth, pos),
			bound_type,
			reason: BoundReason::Constraint {
				cons: ConsRef::new(0),
				info: 0,
			},
			infer_var: VarRef::new(0),
			infer_bound_type: bound_type,
		}
	}

	#[test]
	fn test_index_order() {
		assert!(BdChgIdx::new(0, 5) < BdChgIdx::new(1, 0));
		assert!(BdChgIdx::new(2, 1) < BdChgIdx::new(2, 3));
		assert_eq!(BdChgIdx::new(3, 4).to_string(), "3:4");
	}

	#[test]
	fn test_latest_before() {
		let mut hist = BoundHistory::default();
		hist.push(info(BoundType::Lower, 1, 0, 0.0, 1.0));
		hist.push(info(BoundType::Lower, 1, 3, 1.0, 4.0));
		hist.push(info(BoundType::Lower, 3, 0, 4.0, 6.0));
		hist.push(info(BoundType::Upper, 2, 1, 10.0, 8.0));

		let before = |idx, after| {
			hist.latest_before(BoundType::Lower, idx, after)
				.map(|i| i.new_bound)
		};
		assert_eq!(before(BdChgIdx::new(1, 0), false), None);
		assert_eq!(before(BdChgIdx::new(1, 0), true), Some(1.0));
		assert_eq!(before(BdChgIdx::new(1, 3), false), Some(1.0));
		assert_eq!(before(BdChgIdx::new(2, 0), false), Some(4.0));
		assert_eq!(before(BdChgIdx::new(9, 9), true), Some(6.0));

		assert_eq!(hist.last_index(), Some(BdChgIdx::new(3, 0)));
		assert_eq!(
			hist.changes(BoundType::Upper)[0].kind(),
			BoundChangeKind::ConsInfer
		);

		let popped = hist.pop(BoundType::Lower).map(|i| i.old_bound);
		assert_eq!(popped, Some(4.0));
		assert_eq!(hist.last_index(), Some(BdChgIdx::new(2, 1)));
	}
}
