//! The log of the domain changes made at a node of the search tree.
//!
//! A [`DomChg`] records every local bound change (and hole change) that was
//! made while a node was processed, so that the changes can be undone when the
//! search leaves the node, and applied again when it returns to it. A log starts
//! out growable and is compacted into an exactly sized, read-only form once the
//! node is finished.

use std::mem;

use tracing::trace;

use crate::{
	domain::Holelist,
	history::{BdChgIdx, BoundReason},
	problem::bounds::Applied,
	BoundChangeKind, BoundType, Problem, Tightening, VarError, VarRef,
};

#[derive(Debug, Clone, Default, PartialEq)]
#[allow(
	variant_size_differences,
	reason = "the empty log should not allocate, the dynamic log keeps capacity"
)]
/// Log of the domain changes of a search-tree node.
pub enum DomChg {
	#[default]
	/// No changes.
	Empty,
	/// Exactly sized bound changes.
	BoundOnly(Box<[BoundChg]>),
	/// Exactly sized bound and hole changes.
	BoundAndHole(Box<[BoundChg]>, Box<[HoleChg]>),
	/// Growable log, used while the node is being processed.
	Dynamic {
		/// The bound changes.
		bounds: Vec<BoundChg>,
		/// The hole changes.
		holes: Vec<HoleChg>,
	},
}

#[derive(Debug, Clone, PartialEq)]
/// A single recorded bound change of an active variable.
pub struct BoundChg {
	/// The active variable whose bound changes.
	pub(crate) var: VarRef,
	/// The new bound.
	pub(crate) new_bound: f64,
	/// Whether the lower or upper bound changes.
	pub(crate) bound_type: BoundType,
	/// The justification of the change.
	pub(crate) reason: BoundReason,
	/// The variable on which the change was requested.
	pub(crate) infer_var: VarRef,
	/// The bound type of the requested change on [`Self::infer_var`].
	pub(crate) infer_bound_type: BoundType,
}

#[derive(Debug, Clone, PartialEq)]
/// A single recorded change of the local holes of a variable.
pub struct HoleChg {
	/// The variable whose holes change.
	pub(crate) var: VarRef,
	/// The holes before the change.
	pub(crate) old: Holelist,
	/// The holes after the change.
	pub(crate) new: Holelist,
}

impl BoundChg {
	/// The active variable whose bound changes.
	pub fn var(&self) -> VarRef {
		self.var
	}

	/// The new bound.
	pub fn new_bound(&self) -> f64 {
		self.new_bound
	}

	/// Whether the lower or upper bound changes.
	pub fn bound_type(&self) -> BoundType {
		self.bound_type
	}

	/// The justification of the change.
	pub fn reason(&self) -> &BoundReason {
		&self.reason
	}

	/// The kind of the change.
	pub fn kind(&self) -> BoundChangeKind {
		self.reason.kind()
	}

	/// The variable on which the change was requested.
	pub fn infer_var(&self) -> VarRef {
		self.infer_var
	}
}

impl HoleChg {
	/// The variable whose holes change.
	pub fn var(&self) -> VarRef {
		self.var
	}
}

impl DomChg {
	/// The recorded bound changes.
	pub fn bound_changes(&self) -> &[BoundChg] {
		match self {
			DomChg::Empty => &[],
			DomChg::BoundOnly(bounds) | DomChg::BoundAndHole(bounds, _) => bounds,
			DomChg::Dynamic { bounds, .. } => bounds,
		}
	}

	/// The recorded hole changes.
	pub fn hole_changes(&self) -> &[HoleChg] {
		match self {
			DomChg::Empty | DomChg::BoundOnly(_) => &[],
			DomChg::BoundAndHole(_, holes) => holes,
			DomChg::Dynamic { holes, .. } => holes,
		}
	}

	/// Returns whether no changes are recorded.
	pub fn is_empty(&self) -> bool {
		self.bound_changes().is_empty() && self.hole_changes().is_empty()
	}

	/// Record a bound change, returning its position in the log.
	pub(crate) fn push_bound(&mut self, chg: BoundChg) -> u32 {
		let (bounds, _) = self.make_dynamic();
		bounds.push(chg);
		(bounds.len() - 1) as u32
	}

	/// Record a hole change.
	pub(crate) fn push_hole(&mut self, chg: HoleChg) {
		let (_, holes) = self.make_dynamic();
		holes.push(chg);
	}

	/// Apply the recorded changes when entering the node at the given depth.
	///
	/// Changes that turn out to be redundant are removed from the log while
	/// walking it, so that every committed change is recorded under its final
	/// position in the log.
	///
	/// Returns whether the node was found to be infeasible (cut off). In that
	/// case, the failing change and all changes after it are removed from the
	/// log as well.
	pub fn apply(&mut self, problem: &mut Problem, depth: u32) -> Result<bool, VarError> {
		problem.set_depth(depth);
		let (bounds, holes) = self.make_dynamic();
		let mut kept = 0;
		for pos in 0..bounds.len() {
			match problem.apply_bound_change(&bounds[pos], BdChgIdx::new(depth, kept as u32)) {
				Applied::Applied => {
					bounds.swap(kept, pos);
					kept += 1;
				}
				Applied::Redundant => trace!(depth, pos, "drop redundant bound change"),
				Applied::Infeasible => {
					trace!(depth, pos, "domain change log cut off");
					bounds.truncate(kept);
					return Ok(true);
				}
			}
		}
		bounds.truncate(kept);
		for chg in holes.iter() {
			let x = &mut problem.vars[chg.var];
			x.loc_dom.holes = chg.new.clone();
		}
		self.compact();
		Ok(false)
	}

	/// Undo the recorded changes when leaving the node.
	///
	/// Changes are undone in reverse order: first the hole changes, then the
	/// bound changes.
	pub fn undo(&self, problem: &mut Problem) -> Result<(), VarError> {
		for chg in self.hole_changes().iter().rev() {
			problem.vars[chg.var].loc_dom.holes = chg.old.clone();
		}
		for chg in self.bound_changes().iter().rev() {
			problem.undo_bound_change(chg)?;
		}
		Ok(())
	}

	/// Apply the recorded bound changes as global bound changes.
	///
	/// Returns whether the problem was found to be infeasible.
	pub fn apply_global(&self, problem: &mut Problem) -> Result<bool, VarError> {
		for chg in self.bound_changes() {
			let res = problem.tighten_global(chg.var, chg.bound_type, chg.new_bound)?;
			if res == Tightening::Infeasible {
				return Ok(true);
			}
		}
		Ok(false)
	}

	/// Convert the log into its exactly sized form.
	pub fn compact(&mut self) {
		let (bounds, holes) = match mem::take(self) {
			DomChg::Empty => return,
			DomChg::BoundOnly(bounds) => (bounds.into_vec(), Vec::new()),
			DomChg::BoundAndHole(bounds, holes) => (bounds.into_vec(), holes.into_vec()),
			DomChg::Dynamic { bounds, holes } => (bounds, holes),
		};
		*self = match (bounds.is_empty(), holes.is_empty()) {
			(true, true) => DomChg::Empty,
			(_, true) => DomChg::BoundOnly(bounds.into_boxed_slice()),
			_ => DomChg::BoundAndHole(bounds.into_boxed_slice(), holes.into_boxed_slice()),
		};
	}

	/// Internal method to convert the log into its growable form.
	fn make_dynamic(&mut self) -> (&mut Vec<BoundChg>, &mut Vec<HoleChg>) {
		if !matches!(self, DomChg::Dynamic { .. }) {
			let (bounds, holes) = match mem::take(self) {
				DomChg::BoundOnly(bounds) => (bounds.into_vec(), Vec::new()),
				DomChg::BoundAndHole(bounds, holes) => (bounds.into_vec(), holes.into_vec()),
				_ => (Vec::new(), Vec::new()),
			};
			*self = DomChg::Dynamic { bounds, holes };
		}
		match self {
			DomChg::Dynamic { bounds, holes } => (bounds, holes),
			_ => unreachable!(),
		}
	}
}

#[cfg(test)]
mod tests {
	use tracing_test::traced_test;

	use crate::{
		history::{BdChgIdx, BoundReason},
		BoundType, DomChg, Problem, Tightening, VarType,
	};

	#[test]
	#[traced_test]
	fn test_undo_and_reapply() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let y = prb.add_var("y", VarType::Continuous, 0.0, 5.0, 0.0);
		let r = BoundReason::Branching;
		prb.set_depth(1);
		let mut dc = DomChg::default();
		let _ = prb.tighten_lb_local(&mut dc, x, 3.0, r).unwrap();
		let _ = prb.tighten_ub_local(&mut dc, y, 4.0, r).unwrap();
		let _ = prb.tighten_lb_local(&mut dc, x, 5.0, r).unwrap();
		let _ = prb.add_hole_local(&mut dc, y, 1.0, 2.0).unwrap();
		assert!(matches!(dc, DomChg::Dynamic { .. }));

		dc.undo(&mut prb).unwrap();
		assert_eq!((prb.lb_local(x), prb.ub_local(y)), (0.0, 5.0));
		assert!(prb.var(y).holes_local().is_empty());
		assert!(prb.var(x).bound_changes(BoundType::Lower).is_empty());

		assert!(!dc.apply(&mut prb, 1).unwrap());
		assert!(matches!(dc, DomChg::BoundAndHole(..)));
		assert_eq!((prb.lb_local(x), prb.ub_local(y)), (5.0, 4.0));
		assert!(prb.var(y).holes_local().contains(1.5));
		dc.undo(&mut prb).unwrap();
		assert_eq!(prb.lb_local(x), 0.0);
	}

	#[test]
	fn test_apply_cut_off() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let r = BoundReason::Branching;
		let mut dc = DomChg::default();
		prb.set_depth(1);
		let _ = prb.tighten_lb_local(&mut dc, x, 3.0, r).unwrap();
		let _ = prb.tighten_lb_local(&mut dc, x, 6.0, r).unwrap();
		dc.undo(&mut prb).unwrap();

		// a sibling tightened the global bound in the meantime
		assert_eq!(prb.tighten_ub_global(x, 4.0), Ok(Tightening::Tightened));
		assert!(dc.apply(&mut prb, 1).unwrap());
		assert_eq!(dc.bound_changes().len(), 1);
		assert_eq!(prb.lb_local(x), 3.0);
	}

	#[test]
	fn test_redundant_changes_are_compacted() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let r = BoundReason::Branching;
		let mut dc = DomChg::default();
		prb.set_depth(1);
		let _ = prb.tighten_lb_local(&mut dc, x, 3.0, r).unwrap();
		dc.undo(&mut prb).unwrap();
		assert_eq!(prb.tighten_lb_global(x, 5.0), Ok(Tightening::Tightened));
		assert!(!dc.apply(&mut prb, 1).unwrap());
		assert!(dc.is_empty());
		assert_eq!(dc, DomChg::Empty);
		dc.undo(&mut prb).unwrap();
		assert_eq!(prb.lb_local(x), 5.0);
	}

	#[test]
	fn test_tighten_after_dropping_redundant_change() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let y = prb.add_var("y", VarType::Integer, 0.0, 10.0, 0.0);
		let r = BoundReason::Branching;
		prb.set_depth(1);
		let mut dc = DomChg::default();
		let _ = prb.tighten_lb_local(&mut dc, y, 3.0, r).unwrap();
		let _ = prb.tighten_lb_local(&mut dc, x, 3.0, r).unwrap();
		dc.undo(&mut prb).unwrap();

		// the leading change becomes redundant
		assert_eq!(prb.tighten_lb_global(y, 5.0), Ok(Tightening::Tightened));
		assert!(!dc.apply(&mut prb, 1).unwrap());
		assert_eq!(dc.bound_changes().len(), 1);
		assert_eq!(dc.bound_changes()[0].var(), x);
		let info = prb.var(x).bound_changes(BoundType::Lower);
		assert_eq!(info.len(), 1);
		assert_eq!(info[0].index(), BdChgIdx::new(1, 0));

		assert_eq!(
			prb.tighten_lb_local(&mut dc, x, 4.0, r),
			Ok(Tightening::Tightened)
		);
		let info = prb.var(x).bound_changes(BoundType::Lower);
		assert_eq!(info[1].index(), BdChgIdx::new(1, 1));
		assert_eq!(dc.bound_changes().len(), 2);
		assert_eq!(
			prb.bdchg_info(x, BoundType::Lower, BdChgIdx::new(1, 0), true)
				.map(|i| i.new_bound()),
			Some(3.0)
		);

		dc.undo(&mut prb).unwrap();
		assert_eq!((prb.lb_local(x), prb.lb_local(y)), (0.0, 5.0));
		assert!(prb.var(x).bound_changes(BoundType::Lower).is_empty());
	}

	#[test]
	fn test_apply_global() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let mut dc = DomChg::default();
		let _ = prb
			.tighten_ub_local(&mut dc, x, 2.5, BoundReason::Branching)
			.unwrap();
		assert!(!dc.apply_global(&mut prb).unwrap());
		assert_eq!(prb.ub_global(x), 2.5);
	}
}
