//! Queries and changes of the bounds of variables: global bounds, local bounds
//! at the current search-tree node, diving bounds of columns, holes, and the
//! reconstruction of bounds from the history of local changes.
//!
//! Bound changes are always made on the active variable that represents a
//! variable, and are then pushed to the variables whose resolution passes
//! through it (its parents). This is done using an explicit worklist, so that
//! long chains of aggregations do not grow the call stack.

use std::{collections::VecDeque, mem};

use tracing::{debug, trace, warn};

use crate::{
	domchg::{BoundChg, DomChg, HoleChg},
	event::VarEvent,
	history::{BdChgIdx, BoundChangeInfo, BoundReason},
	var::VarStatus,
	BoundType, Problem, VarError, VarRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The outcome of a bound tightening.
pub enum Tightening {
	/// The bound was tightened.
	Tightened,
	/// The bound was not tighter than the current bound, nothing changed.
	Unchanged,
	/// The new bound would leave the variable without feasible values, nothing
	/// changed.
	Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Internal classification of a requested bound against the current domain.
enum Prepared {
	/// The (rounded) bound is tighter than the current bound.
	Tighter(f64),
	/// The bound is not tighter than the current bound.
	NotTighter,
	/// The bound crosses the opposite bound.
	Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The outcome of applying a recorded bound change.
pub(crate) enum Applied {
	/// The change was committed.
	Applied,
	/// The change did not tighten the domain and was skipped.
	Redundant,
	/// The change would empty the domain and was skipped.
	Infeasible,
}

impl Tightening {
	/// Returns whether the tightening detected infeasibility.
	pub fn is_infeasible(self) -> bool {
		self == Tightening::Infeasible
	}
}

impl Problem {
	/// The global lower bound of the variable.
	pub fn lb_global(&self, var: VarRef) -> f64 {
		self.stored_bound(var, BoundType::Lower, true)
	}

	/// The global upper bound of the variable.
	pub fn ub_global(&self, var: VarRef) -> f64 {
		self.stored_bound(var, BoundType::Upper, true)
	}

	/// The lower bound of the variable at the current search-tree node.
	pub fn lb_local(&self, var: VarRef) -> f64 {
		self.stored_bound(var, BoundType::Lower, false)
	}

	/// The upper bound of the variable at the current search-tree node.
	pub fn ub_local(&self, var: VarRef) -> f64 {
		self.stored_bound(var, BoundType::Upper, false)
	}

	/// The lower bound of the variable in the linear relaxation, which deviates
	/// from the local bound while diving.
	pub fn lb_lp(&self, var: VarRef) -> f64 {
		self.lp_bound(var, BoundType::Lower)
	}

	/// The upper bound of the variable in the linear relaxation, which deviates
	/// from the local bound while diving.
	pub fn ub_lp(&self, var: VarRef) -> f64 {
		self.lp_bound(var, BoundType::Upper)
	}

	/// Tighten the local lower bound of a variable, recording the change in the
	/// domain change log of the current node.
	pub fn tighten_lb_local(
		&mut self,
		domchg: &mut DomChg,
		var: VarRef,
		bound: f64,
		reason: BoundReason,
	) -> Result<Tightening, VarError> {
		self.tighten_local(domchg, var, BoundType::Lower, bound, reason)
	}

	/// Tighten the local upper bound of a variable, recording the change in the
	/// domain change log of the current node.
	pub fn tighten_ub_local(
		&mut self,
		domchg: &mut DomChg,
		var: VarRef,
		bound: f64,
		reason: BoundReason,
	) -> Result<Tightening, VarError> {
		self.tighten_local(domchg, var, BoundType::Upper, bound, reason)
	}

	/// Tighten the global lower bound of a variable.
	pub fn tighten_lb_global(&mut self, var: VarRef, bound: f64) -> Result<Tightening, VarError> {
		self.tighten_global(var, BoundType::Lower, bound)
	}

	/// Tighten the global upper bound of a variable.
	pub fn tighten_ub_global(&mut self, var: VarRef, bound: f64) -> Result<Tightening, VarError> {
		self.tighten_global(var, BoundType::Upper, bound)
	}

	/// Tighten a local bound of a variable.
	///
	/// The bound is resolved to the active representative of the variable and
	/// rounded for integral variables. A bound that crosses the opposite local
	/// bound is reported as infeasible, and a bound that is not tighter than the
	/// current one leaves everything unchanged.
	#[tracing::instrument(level = "trace", skip(self, domchg, reason))]
	pub fn tighten_local(
		&mut self,
		domchg: &mut DomChg,
		var: VarRef,
		bound_type: BoundType,
		bound: f64,
		reason: BoundReason,
	) -> Result<Tightening, VarError> {
		self.check_alive(var)?;
		let (y, b, bt) = self.probvar_bound(var, bound, bound_type);
		match self.vars[y].status {
			VarStatus::Loose | VarStatus::Column(_) => {}
			VarStatus::Fixed => return Ok(self.check_fixed(y, b, bt)),
			_ => return Err(self.invalid_status(y, "local bound changes")),
		}
		match self.prepare_bound(y, b, bt, false) {
			Prepared::Infeasible => Ok(Tightening::Infeasible),
			Prepared::NotTighter => Ok(Tightening::Unchanged),
			Prepared::Tighter(b) => {
				let chg = BoundChg {
					var: y,
					new_bound: b,
					bound_type: bt,
					reason,
					infer_var: var,
					infer_bound_type: bound_type,
				};
				let pos = domchg.push_bound(chg.clone());
				self.commit_local(&chg, BdChgIdx::new(self.depth, pos));
				Ok(Tightening::Tightened)
			}
		}
	}

	/// Tighten a global bound of a variable.
	///
	/// Infeasibility is only reported when the bound contradicts the opposite
	/// global bound. The local bound is tightened along with the global bound,
	/// without recording the change in the history. When the new global bound
	/// crosses the opposite local bound, the local domain of the current node
	/// is left empty (see [`Self::is_locally_infeasible`]) until the node is
	/// left. Relations between variables that become redundant are removed.
	#[tracing::instrument(level = "trace", skip(self))]
	pub fn tighten_global(
		&mut self,
		var: VarRef,
		bound_type: BoundType,
		bound: f64,
	) -> Result<Tightening, VarError> {
		self.check_alive(var)?;
		let (y, b, bt) = self.probvar_bound(var, bound, bound_type);
		match self.vars[y].status {
			VarStatus::Loose | VarStatus::Column(_) | VarStatus::Original { transformed: None } => {}
			VarStatus::Fixed => return Ok(self.check_fixed(y, b, bt)),
			_ => return Err(self.invalid_status(y, "global bound changes")),
		}
		match self.prepare_bound(y, b, bt, true) {
			Prepared::Infeasible => Ok(Tightening::Infeasible),
			Prepared::NotTighter => Ok(Tightening::Unchanged),
			Prepared::Tighter(b) => {
				debug!(var = %self.vars[y].name, ?bt, bound = b, "tighten global bound");
				self.set_global_bound(y, bt, b);
				self.remove_redundant_relations(y);
				Ok(Tightening::Tightened)
			}
		}
	}

	/// Returns whether the local domain of the variable at the current node is
	/// empty, which happens when a global bound change excludes it.
	pub fn is_locally_infeasible(&self, var: VarRef) -> bool {
		self.config
			.is_feas_gt(self.lb_local(var), self.ub_local(var))
	}

	/// Add the hole `(left, right)` to the global domain of a variable (and its
	/// local domain). Returns whether the domain of the variable changed.
	pub fn add_hole_global(&mut self, var: VarRef, left: f64, right: f64) -> Result<bool, VarError> {
		self.add_hole(None, var, left, right)
	}

	/// Add the hole `(left, right)` to the local domain of a variable, recording
	/// the change in the domain change log of the current node. Returns whether
	/// the domain of the variable changed.
	pub fn add_hole_local(
		&mut self,
		domchg: &mut DomChg,
		var: VarRef,
		left: f64,
		right: f64,
	) -> Result<bool, VarError> {
		self.add_hole(Some(domchg), var, left, right)
	}

	/// Returns whether the linear relaxation is in diving mode.
	pub fn is_diving(&self) -> bool {
		self.diving
	}

	/// Enter diving mode, in which the bounds of columns may be changed without
	/// changing the local bounds of the variables.
	pub fn start_dive(&mut self) {
		trace!("start dive");
		self.diving = true;
	}

	/// Leave diving mode, resetting the bounds of all columns to the local
	/// bounds of their variables.
	pub fn end_dive(&mut self) {
		trace!("end dive");
		self.diving = false;
		for (var, x) in self.vars.iter_mut_enumerated() {
			if let VarStatus::Column(col) = &mut x.status {
				if col.lb != x.loc_dom.lb || col.ub != x.loc_dom.ub {
					col.lb = x.loc_dom.lb;
					col.ub = x.loc_dom.ub;
					self.columns.column_bounds_changed(var, col.lb, col.ub);
				}
			}
		}
	}

	/// Change the lower bound of the column of a variable while diving.
	pub fn chg_lb_dive(&mut self, var: VarRef, bound: f64) -> Result<(), VarError> {
		self.chg_dive(var, BoundType::Lower, bound)
	}

	/// Change the upper bound of the column of a variable while diving.
	pub fn chg_ub_dive(&mut self, var: VarRef, bound: f64) -> Result<(), VarError> {
		self.chg_dive(var, BoundType::Upper, bound)
	}

	/// The bound of the variable directly after (when `after` is set) or before
	/// the bound change with the given index.
	///
	/// When no index is given, the current local bound is returned. When no
	/// recorded change precedes the index, the global bound is returned.
	pub fn bound_at_index(
		&self,
		var: VarRef,
		bound_type: BoundType,
		idx: Option<BdChgIdx>,
		after: bool,
	) -> f64 {
		let Some(idx) = idx else {
			return self.stored_bound(var, bound_type, false);
		};
		let x = &self.vars[var];
		match &x.status {
			VarStatus::Original {
				transformed: Some(t),
			} => self.bound_at_index(*t, bound_type, Some(idx), after),
			VarStatus::Original { transformed: None } | VarStatus::Fixed => {
				self.stored_bound(var, bound_type, true)
			}
			VarStatus::Loose | VarStatus::Column(_) => x
				.history
				.latest_before(bound_type, idx, after)
				.map_or_else(|| self.stored_bound(var, bound_type, true), |info| info.new_bound),
			VarStatus::Aggregated { var: y, transform } => {
				let (_, bt) = transform.rev_transform_bound(0.0, bound_type);
				transform.transform(self.bound_at_index(*y, bt, Some(idx), after))
			}
			VarStatus::Negated { var: y, constant } => {
				constant - self.bound_at_index(*y, !bound_type, Some(idx), after)
			}
			VarStatus::MultiAggregated {
				vars,
				scalars,
				constant,
			} => {
				vars.iter()
					.zip(scalars)
					.map(|(&y, &a)| {
						let bt = if a > 0.0 { bound_type } else { !bound_type };
						a * self.bound_at_index(y, bt, Some(idx), after)
					})
					.sum::<f64>() + constant
			}
		}
	}

	/// The lower bound of the variable before (or after) the bound change with
	/// the given index.
	pub fn lb_at_index(&self, var: VarRef, idx: Option<BdChgIdx>, after: bool) -> f64 {
		self.bound_at_index(var, BoundType::Lower, idx, after)
	}

	/// The upper bound of the variable before (or after) the bound change with
	/// the given index.
	pub fn ub_at_index(&self, var: VarRef, idx: Option<BdChgIdx>, after: bool) -> f64 {
		self.bound_at_index(var, BoundType::Upper, idx, after)
	}

	/// Returns whether the variable was fixed before (or after) the bound
	/// change with the given index.
	pub fn was_fixed_at_index(&self, var: VarRef, idx: Option<BdChgIdx>, after: bool) -> bool {
		self.config.is_eq(
			self.lb_at_index(var, idx, after),
			self.ub_at_index(var, idx, after),
		)
	}

	/// The record of the latest change of the given bound of the variable made
	/// before (or, when `after` is set, at) the given index.
	///
	/// The record belongs to the active representative of the variable, the
	/// bound type is exchanged when the representative appears with a negative
	/// scalar.
	pub fn bdchg_info(
		&self,
		var: VarRef,
		bound_type: BoundType,
		idx: BdChgIdx,
		after: bool,
	) -> Option<&BoundChangeInfo> {
		let (y, t) = self.resolve(var);
		let (_, bt) = t.rev_transform_bound(0.0, bound_type);
		let x = &self.vars[y];
		match x.status {
			VarStatus::Loose | VarStatus::Column(_) => x.history.latest_before(bt, idx, after),
			_ => None,
		}
	}

	/// The index of the latest recorded bound change of (the variables that
	/// represent) the variable.
	pub fn last_bdchg_index(&self, var: VarRef) -> Option<BdChgIdx> {
		self.terminal_vars(var)
			.into_iter()
			.filter_map(|(v, _)| self.vars[v].history.last_index())
			.max()
	}

	/// The depth of the latest recorded bound change of (the variables that
	/// represent) the variable.
	pub fn last_bdchg_depth(&self, var: VarRef) -> Option<u32> {
		self.last_bdchg_index(var).map(|idx| idx.depth())
	}

	/// Internal method to apply a recorded bound change when a node is entered.
	pub(crate) fn apply_bound_change(&mut self, chg: &BoundChg, index: BdChgIdx) -> Applied {
		let x = &self.vars[chg.var];
		match x.status {
			VarStatus::Loose | VarStatus::Column(_) => {}
			VarStatus::Fixed => {
				return match self.check_fixed(chg.var, chg.new_bound, chg.bound_type) {
					Tightening::Infeasible => Applied::Infeasible,
					_ => Applied::Redundant,
				};
			}
			_ => {
				warn!(var = %x.name, status = %x.status(), "skipping bound change of inactive variable");
				return Applied::Redundant;
			}
		}
		let (cur, opp) = match chg.bound_type {
			BoundType::Lower => (x.loc_dom.lb, x.loc_dom.ub),
			BoundType::Upper => (x.loc_dom.ub, x.loc_dom.lb),
		};
		let (infeasible, tighter) = match chg.bound_type {
			BoundType::Lower => (
				self.config.is_feas_gt(chg.new_bound, opp),
				self.config.is_gt(chg.new_bound, cur),
			),
			BoundType::Upper => (
				self.config.is_feas_lt(chg.new_bound, opp),
				self.config.is_lt(chg.new_bound, cur),
			),
		};
		if infeasible {
			Applied::Infeasible
		} else if !tighter {
			Applied::Redundant
		} else {
			self.commit_local(chg, index);
			Applied::Applied
		}
	}

	/// Internal method to undo a committed bound change, restoring the previous
	/// bound (restricted to the current global domain).
	pub(crate) fn undo_bound_change(&mut self, chg: &BoundChg) -> Result<(), VarError> {
		let x = &mut self.vars[chg.var];
		let info = match x.history.pop(chg.bound_type) {
			Some(info) if info.new_bound == chg.new_bound => info,
			_ => return Err(VarError::HistoryMismatch(x.name.clone())),
		};
		let restored = match chg.bound_type {
			BoundType::Lower => info.old_bound.max(x.glb_dom.lb),
			BoundType::Upper => info.old_bound.min(x.glb_dom.ub),
		};
		trace!(var = %x.name, bt = ?chg.bound_type, restored, "undo bound change");
		self.set_local_bound(chg.var, chg.bound_type, restored);
		Ok(())
	}

	/// Internal method to record and commit a local bound change of an active
	/// variable.
	pub(crate) fn commit_local(&mut self, chg: &BoundChg, index: BdChgIdx) {
		let x = &mut self.vars[chg.var];
		let old_bound = match chg.bound_type {
			BoundType::Lower => x.loc_dom.lb,
			BoundType::Upper => x.loc_dom.ub,
		};
		trace!(var = %x.name, bt = ?chg.bound_type, old_bound, new_bound = chg.new_bound, %index, "commit local bound change");
		x.history.push(BoundChangeInfo {
			old_bound,
			new_bound: chg.new_bound,
			index,
			bound_type: chg.bound_type,
			reason: chg.reason,
			infer_var: chg.infer_var,
			infer_bound_type: chg.infer_bound_type,
		});
		self.stats.n_local_bound_changes += 1;
		self.set_local_bound(chg.var, chg.bound_type, chg.new_bound);
	}

	/// Internal method to set a local bound of a variable and push the change to
	/// its parents.
	pub(crate) fn set_local_bound(&mut self, var: VarRef, bound_type: BoundType, bound: f64) {
		let mut queue = VecDeque::from([(var, bound_type, bound)]);
		while let Some((v, bt, new)) = queue.pop_front() {
			let x = &mut self.vars[v];
			let old = match bt {
				BoundType::Lower => mem::replace(&mut x.loc_dom.lb, new),
				BoundType::Upper => mem::replace(&mut x.loc_dom.ub, new),
			};
			if old == new {
				continue;
			}
			if let VarStatus::Column(col) = &mut x.status {
				match bt {
					BoundType::Lower => col.lb = new,
					BoundType::Upper => col.ub = new,
				}
				self.columns.column_bounds_changed(v, col.lb, col.ub);
			}
			let event = match bt {
				BoundType::Lower => VarEvent::local_lb(v, old, new),
				BoundType::Upper => VarEvent::local_ub(v, old, new),
			};
			self.notify(event);
			self.push_to_parents(&mut queue, v, bt, new);
		}
	}

	/// Internal method to set a global bound of a variable, restricting its
	/// local domain accordingly, and push the change to its parents.
	pub(crate) fn set_global_bound(&mut self, var: VarRef, bound_type: BoundType, bound: f64) {
		let mut queue = VecDeque::from([(var, bound_type, bound)]);
		while let Some((v, bt, new)) = queue.pop_front() {
			let x = &mut self.vars[v];
			let old = match bt {
				BoundType::Lower => mem::replace(&mut x.glb_dom.lb, new),
				BoundType::Upper => mem::replace(&mut x.glb_dom.ub, new),
			};
			if old == new {
				continue;
			}
			let (lb, ub) = (x.glb_dom.lb, x.glb_dom.ub);
			x.glb_dom.holes.restrict(lb, ub);
			let restrict_local = match bt {
				BoundType::Lower => x.loc_dom.lb < new,
				BoundType::Upper => x.loc_dom.ub > new,
			};
			self.stats.n_global_bound_changes += 1;
			self.notify(match bt {
				BoundType::Lower => VarEvent::GlbChanged { var: v, old, new },
				BoundType::Upper => VarEvent::GubChanged { var: v, old, new },
			});
			if restrict_local {
				self.set_local_bound(v, bt, new);
			}
			self.push_to_parents(&mut queue, v, bt, new);
		}
	}

	/// Internal method to enqueue the bound changes of the parents of a variable
	/// that follow from a bound change of the variable.
	fn push_to_parents(
		&self,
		queue: &mut VecDeque<(VarRef, BoundType, f64)>,
		var: VarRef,
		bound_type: BoundType,
		bound: f64,
	) {
		for &p in &self.vars[var].parents {
			let Some((y, t)) = self.link(p) else {
				continue;
			};
			debug_assert_eq!(y, var);
			let (b, bt) = t.transform_bound(bound, bound_type);
			let b = if self.vars[p].is_integral() {
				match bt {
					BoundType::Lower => self.config.feas_ceil(b),
					BoundType::Upper => self.config.feas_floor(b),
				}
			} else {
				b
			};
			queue.push_back((p, bt, self.config.normalize(b)));
		}
	}

	/// Internal method to round a requested bound and classify it against the
	/// current domain of an active variable.
	///
	/// Global bounds are judged against the global domain only, local bounds
	/// against the local domain.
	fn prepare_bound(&self, var: VarRef, bound: f64, bound_type: BoundType, global: bool) -> Prepared {
		let x = &self.vars[var];
		let bound = match (x.is_integral(), bound_type) {
			(true, BoundType::Lower) => self.config.feas_ceil(bound),
			(true, BoundType::Upper) => self.config.feas_floor(bound),
			(false, _) => bound,
		};
		let dom = if global { &x.glb_dom } else { &x.loc_dom };
		match bound_type {
			BoundType::Lower => {
				if self.config.is_feas_gt(bound, dom.ub) {
					return Prepared::Infeasible;
				}
				let bound = if self.config.is_feas_eq(bound, x.glb_dom.ub) {
					x.glb_dom.ub
				} else {
					bound.min(dom.ub)
				};
				if self.config.is_gt(bound, dom.lb) {
					Prepared::Tighter(bound)
				} else {
					Prepared::NotTighter
				}
			}
			BoundType::Upper => {
				if self.config.is_feas_lt(bound, dom.lb) {
					return Prepared::Infeasible;
				}
				let bound = if self.config.is_feas_eq(bound, x.glb_dom.lb) {
					x.glb_dom.lb
				} else {
					bound.max(dom.lb)
				};
				if self.config.is_lt(bound, dom.ub) {
					Prepared::Tighter(bound)
				} else {
					Prepared::NotTighter
				}
			}
		}
	}

	/// Internal method to check a bound against the value of a fixed variable.
	fn check_fixed(&self, var: VarRef, bound: f64, bound_type: BoundType) -> Tightening {
		let val = self.vars[var].glb_dom.lb;
		let infeasible = match bound_type {
			BoundType::Lower => self.config.is_feas_gt(bound, val),
			BoundType::Upper => self.config.is_feas_lt(bound, val),
		};
		if infeasible {
			Tightening::Infeasible
		} else {
			Tightening::Unchanged
		}
	}

	/// Internal method to retrieve the stored global or local bound of a
	/// variable, computing the bounds of multi-aggregated variables from their
	/// terms.
	fn stored_bound(&self, var: VarRef, bound_type: BoundType, global: bool) -> f64 {
		let x = &self.vars[var];
		if let VarStatus::MultiAggregated {
			vars,
			scalars,
			constant,
		} = &x.status
		{
			return vars
				.iter()
				.zip(scalars)
				.map(|(&y, &a)| {
					let bt = if a > 0.0 { bound_type } else { !bound_type };
					a * self.stored_bound(y, bt, global)
				})
				.sum::<f64>()
				+ constant;
		}
		let dom = if global { &x.glb_dom } else { &x.loc_dom };
		match bound_type {
			BoundType::Lower => dom.lb,
			BoundType::Upper => dom.ub,
		}
	}

	/// Internal method to compute the bound of a variable in the linear
	/// relaxation.
	fn lp_bound(&self, var: VarRef, bound_type: BoundType) -> f64 {
		let (y, t) = self.resolve(var);
		let (_, bt) = t.rev_transform_bound(0.0, bound_type);
		let x = &self.vars[y];
		let b = match &x.status {
			VarStatus::Column(col) => match bt {
				BoundType::Lower => col.lb,
				BoundType::Upper => col.ub,
			},
			VarStatus::MultiAggregated {
				vars,
				scalars,
				constant,
			} => {
				vars.iter()
					.zip(scalars)
					.map(|(&z, &a)| {
						let bt = if a > 0.0 { bt } else { !bt };
						a * self.lp_bound(z, bt)
					})
					.sum::<f64>() + constant
			}
			_ => self.stored_bound(y, bt, false),
		};
		t.transform(b)
	}

	/// Internal method to change a diving bound of a column.
	fn chg_dive(&mut self, var: VarRef, bound_type: BoundType, bound: f64) -> Result<(), VarError> {
		self.check_alive(var)?;
		if !self.diving {
			return Err(VarError::NotDiving);
		}
		let (y, b, bt) = self.probvar_bound(var, bound, bound_type);
		if !matches!(self.vars[y].status, VarStatus::Column(_)) {
			return Err(self.invalid_status(y, "diving bound changes"));
		}
		if let VarStatus::Column(col) = &mut self.vars[y].status {
			match bt {
				BoundType::Lower => col.lb = b,
				BoundType::Upper => col.ub = b,
			}
			trace!(?bt, bound = b, "change diving bound");
			self.columns.column_bounds_changed(y, col.lb, col.ub);
		}
		Ok(())
	}

	/// Internal method to add a hole to the global (when no domain change log is
	/// given) or local domain of a variable and its parents.
	fn add_hole(
		&mut self,
		mut domchg: Option<&mut DomChg>,
		var: VarRef,
		left: f64,
		right: f64,
	) -> Result<bool, VarError> {
		self.check_alive(var)?;
		debug_assert!(left < right, "empty hole ({left}, {right})");
		let (y, t) = self.resolve(var);
		match self.vars[y].status {
			VarStatus::Loose | VarStatus::Column(_) | VarStatus::Original { transformed: None } => {}
			VarStatus::Fixed => return Ok(false),
			_ => return Err(self.invalid_status(y, "hole additions")),
		}
		let (l, r) = t.rev_transform_interval(left, right);
		let mut added = false;
		let mut stack = vec![(y, l, r)];
		while let Some((v, l, r)) = stack.pop() {
			let x = &mut self.vars[v];
			let changed = if let Some(domchg) = domchg.as_deref_mut() {
				let old = x.loc_dom.holes.clone();
				let changed = x.loc_dom.holes.add(l, r);
				if changed {
					domchg.push_hole(HoleChg {
						var: v,
						old,
						new: x.loc_dom.holes.clone(),
					});
				}
				changed
			} else {
				let changed = x.glb_dom.holes.add(l, r);
				if changed && x.loc_dom.holes.add(l, r) {
					self.notify(VarEvent::LholeAdded {
						var: v,
						left: l,
						right: r,
					});
				}
				if changed {
					self.notify(VarEvent::GholeAdded {
						var: v,
						left: l,
						right: r,
					});
				}
				changed
			};
			if !changed {
				continue;
			}
			if domchg.is_some() {
				self.notify(VarEvent::LholeAdded {
					var: v,
					left: l,
					right: r,
				});
			}
			added |= v == y;
			for &p in &self.vars[v].parents {
				if let Some((_, t)) = self.link(p) {
					let (pl, pr) = t.transform_interval(l, r);
					stack.push((p, pl, pr));
				}
			}
		}
		Ok(added)
	}
}

#[cfg(test)]
mod tests {
	use tracing_test::traced_test;

	use crate::{
		history::{BdChgIdx, BoundReason},
		tests::EventLog,
		BoundType, DomChg, Problem, Tightening, VarError, VarEvent, VarType,
	};

	#[test]
	#[traced_test]
	fn test_local_tightening() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let mut dc = DomChg::default();
		let r = BoundReason::Branching;
		assert_eq!(
			prb.tighten_lb_local(&mut dc, x, 2.3, r),
			Ok(Tightening::Tightened)
		);
		assert_eq!(prb.lb_local(x), 3.0);
		assert_eq!(prb.lb_global(x), 0.0);
		assert_eq!(
			prb.tighten_lb_local(&mut dc, x, 1.0, r),
			Ok(Tightening::Unchanged)
		);
		assert_eq!(
			prb.tighten_ub_local(&mut dc, x, 2.0, r),
			Ok(Tightening::Infeasible)
		);
		assert_eq!(prb.ub_local(x), 10.0);
		assert_eq!(dc.bound_changes().len(), 1);

		let info = prb.var(x).bound_changes(BoundType::Lower);
		assert_eq!(info.len(), 1);
		assert_eq!(info[0].old_bound(), 0.0);
		assert_eq!(info[0].new_bound(), 3.0);
		assert_eq!(info[0].index(), BdChgIdx::new(0, 0));
	}

	#[test]
	fn test_tightening_snaps_to_global_bound() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 1.0, 0.0);
		let mut dc = DomChg::default();
		assert_eq!(
			prb.tighten_lb_local(&mut dc, x, 1.0 + 1e-7, BoundReason::Branching),
			Ok(Tightening::Tightened)
		);
		assert_eq!(prb.lb_local(x), 1.0);
	}

	#[test]
	fn test_global_tightening_restricts_local() {
		let log = EventLog::default();
		let mut prb = Problem::default().with_event_sink(Box::new(log.clone()));
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let nx = prb.negate(x).unwrap();
		assert_eq!(prb.tighten_ub_global(nx, 4.0), Ok(Tightening::Tightened));
		// nx = 10 - x <= 4  <=>  x >= 6
		assert_eq!(prb.lb_global(x), 6.0);
		assert_eq!(prb.lb_local(x), 6.0);
		assert_eq!(prb.ub_global(nx), 4.0);
		assert_eq!(prb.ub_local(nx), 4.0);
		assert!(prb.var(x).bound_changes(BoundType::Lower).is_empty());
		assert!(log.events().contains(&VarEvent::GlbChanged {
			var: x,
			old: 0.0,
			new: 6.0
		}));
		assert!(log.events().contains(&VarEvent::LbTightened {
			var: x,
			old: 0.0,
			new: 6.0
		}));
		assert_eq!(prb.statistics().n_global_bound_changes(), 2);
	}

	#[test]
	fn test_global_tightening_past_local_bound() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let nx = prb.negate(x).unwrap();
		prb.set_depth(1);
		let mut dc = DomChg::default();
		let _ = prb
			.tighten_ub_local(&mut dc, x, 5.0, BoundReason::Branching)
			.unwrap();
		assert!(!prb.is_locally_infeasible(x));

		assert_eq!(prb.tighten_lb_global(x, 7.0), Ok(Tightening::Tightened));
		assert_eq!(prb.lb_global(x), 7.0);
		assert_eq!(prb.ub_global(nx), 3.0);
		assert_eq!(prb.lb_local(x), 7.0);
		assert_eq!(prb.ub_local(x), 5.0);
		assert!(prb.is_locally_infeasible(x));
		assert!(prb.is_locally_infeasible(nx));
		// only the opposite global bound makes a global change infeasible
		assert_eq!(prb.tighten_ub_global(x, 6.0), Ok(Tightening::Infeasible));
		assert_eq!(prb.ub_global(x), 10.0);

		// leaving the node restores a feasible local domain
		dc.undo(&mut prb).unwrap();
		assert_eq!((prb.lb_local(x), prb.ub_local(x)), (7.0, 10.0));
		assert!(!prb.is_locally_infeasible(x));
		// entering it again detects the cutoff
		assert!(dc.apply(&mut prb, 1).unwrap());
	}

	#[test]
	fn test_aggregated_bounds_follow_representative() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, -100.0, 100.0, 0.0);
		let y = prb.add_var("y", VarType::Continuous, 0.0, 10.0, 0.0);
		let _ = prb.aggregate(x, y, -2.0, 1.0).unwrap();
		assert_eq!((prb.lb_global(x), prb.ub_global(x)), (-19.0, 1.0));

		let mut dc = DomChg::default();
		// x <= -3  <=>  y >= 2
		assert_eq!(
			prb.tighten_ub_local(&mut dc, x, -3.0, BoundReason::Branching),
			Ok(Tightening::Tightened)
		);
		assert_eq!(prb.lb_local(y), 2.0);
		assert_eq!(prb.ub_local(x), -3.0);
		let chg = &dc.bound_changes()[0];
		assert_eq!(chg.var(), y);
		assert_eq!(chg.bound_type(), BoundType::Lower);
		assert_eq!(chg.infer_var(), x);

		let info = prb.bdchg_info(x, BoundType::Upper, BdChgIdx::new(0, 0), true);
		assert_eq!(info.map(|i| i.new_bound()), Some(2.0));
		assert!(prb
			.bdchg_info(x, BoundType::Upper, BdChgIdx::new(0, 0), false)
			.is_none());
	}

	#[test]
	fn test_multi_aggregated_bounds() {
		let mut prb = Problem::default();
		let m = prb.add_var("m", VarType::Continuous, -100.0, 100.0, 0.0);
		let x = prb.add_var("x", VarType::Continuous, 0.0, 2.0, 0.0);
		let y = prb.add_var("y", VarType::Continuous, 1.0, 3.0, 0.0);
		let _ = prb.multi_aggregate(m, &[(x, 2.0), (y, -1.0)], 1.0).unwrap();
		assert_eq!(prb.lb_global(m), -2.0);
		assert_eq!(prb.ub_global(m), 4.0);
		assert!(matches!(
			prb.tighten_lb_global(m, 0.0),
			Err(VarError::InvalidStatus { .. })
		));
	}

	#[test]
	fn test_history_queries() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let r = BoundReason::Branching;
		let mut root = DomChg::default();
		let _ = prb.tighten_lb_local(&mut root, x, 2.0, r).unwrap();
		prb.set_depth(1);
		let mut child = DomChg::default();
		let _ = prb.tighten_ub_local(&mut child, x, 7.0, r).unwrap();
		let _ = prb.tighten_lb_local(&mut child, x, 4.0, r).unwrap();

		assert_eq!(prb.lb_at_index(x, Some(BdChgIdx::new(0, 0)), false), 0.0);
		assert_eq!(prb.lb_at_index(x, Some(BdChgIdx::new(0, 0)), true), 2.0);
		assert_eq!(prb.lb_at_index(x, Some(BdChgIdx::new(1, 1)), false), 2.0);
		assert_eq!(prb.ub_at_index(x, Some(BdChgIdx::new(1, 1)), false), 7.0);
		assert_eq!(prb.lb_at_index(x, None, false), 4.0);
		assert_eq!(prb.last_bdchg_index(x), Some(BdChgIdx::new(1, 1)));
		assert_eq!(prb.last_bdchg_depth(x), Some(1));
		assert!(!prb.was_fixed_at_index(x, None, false));

		let nx = prb.negate(x).unwrap();
		// nx = 10 - x
		assert_eq!(prb.ub_at_index(nx, Some(BdChgIdx::new(1, 1)), true), 6.0);
	}

	#[test]
	fn test_diving() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		prb.create_column(x).unwrap();
		assert_eq!(prb.chg_lb_dive(x, 3.0), Err(VarError::NotDiving));
		prb.start_dive();
		prb.chg_lb_dive(x, 3.0).unwrap();
		assert_eq!(prb.lb_lp(x), 3.0);
		assert_eq!(prb.lb_local(x), 0.0);
		prb.end_dive();
		assert_eq!(prb.lb_lp(x), 0.0);

		let y = prb.add_var("y", VarType::Continuous, 0.0, 10.0, 0.0);
		prb.start_dive();
		assert!(matches!(
			prb.chg_ub_dive(y, 3.0),
			Err(VarError::InvalidStatus { .. })
		));
	}

	#[test]
	fn test_holes() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let nx = prb.negate(x).unwrap();
		assert_eq!(prb.add_hole_global(x, 2.0, 3.0), Ok(true));
		assert_eq!(prb.add_hole_global(x, 2.5, 3.0), Ok(false));
		assert!(prb.var(nx).global_domain().holes().contains(7.5));
		assert!(prb.var(x).local_domain().holes().contains(2.5));

		let mut dc = DomChg::default();
		assert_eq!(prb.add_hole_local(&mut dc, nx, 1.0, 2.0), Ok(true));
		// (1, 2) on nx is (8, 9) on x
		assert!(prb.var(x).local_domain().holes().contains(8.5));
		assert!(!prb.var(x).global_domain().holes().contains(8.5));
		// one record for x, and one for its negation
		assert_eq!(dc.hole_changes().len(), 2);
	}
}
