//! Permanent status transitions of variables: fixing, (multi-)aggregation and
//! negation.

use std::mem;

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
	event::VarEvent,
	helpers::linear_transform::LinearTransform,
	implication::{Implication, VarBound},
	problem::graph::Derivation,
	var::VarStatus,
	BoundType, BranchDirection, Problem, Tightening, VarError, VarRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The outcome of fixing a variable.
pub enum FixOutcome {
	/// The variable was fixed to the value.
	Fixed,
	/// The variable was already fixed to the value.
	Unchanged,
	/// The value lies outside of the domain of the variable, nothing changed.
	Infeasible,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The outcome of an aggregation request.
pub enum AggregationOutcome {
	/// The variable was (multi-)aggregated.
	Aggregated,
	/// The relation determined the value of the variables, which were fixed
	/// instead.
	Fixed,
	/// The relation holds for all values of the variables.
	Redundant,
	/// No aggregation exists that respects the integrality of the variables.
	Declined,
	/// The relation cannot be satisfied within the domains of the variables.
	///
	/// Bound tightenings made before infeasibility was detected remain valid.
	Infeasible,
}

impl From<FixOutcome> for AggregationOutcome {
	fn from(value: FixOutcome) -> Self {
		match value {
			FixOutcome::Fixed => AggregationOutcome::Fixed,
			FixOutcome::Unchanged => AggregationOutcome::Redundant,
			FixOutcome::Infeasible => AggregationOutcome::Infeasible,
		}
	}
}

impl Problem {
	/// Fix a variable to a value.
	///
	/// The request is forwarded through transformed, aggregated and negated
	/// variables to the variable that represents them. A fixed variable leaves
	/// the set of active variables and all relations with other variables; its
	/// objective contribution is moved into the objective offset. An original
	/// variable that has not been transformed only has its bounds fixed.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn fix(&mut self, var: VarRef, value: f64) -> Result<FixOutcome, VarError> {
		self.check_alive(var)?;
		let (mut var, mut value) = (var, value);
		loop {
			match &self.vars[var].status {
				VarStatus::Original {
					transformed: Some(t),
				} => var = *t,
				VarStatus::Original { transformed: None } | VarStatus::Loose => {
					return Ok(self.fix_active(var, value));
				}
				VarStatus::Fixed => {
					let val = self.vars[var].glb_dom.lb;
					return Ok(if self.config.is_feas_eq(val, value) {
						FixOutcome::Unchanged
					} else {
						FixOutcome::Infeasible
					});
				}
				VarStatus::Aggregated { var: y, transform } => {
					value = transform.rev_transform(value);
					var = *y;
				}
				VarStatus::Negated { var: y, constant } => {
					value = constant - value;
					var = *y;
				}
				VarStatus::Column(_) | VarStatus::MultiAggregated { .. } => {
					return Err(self.invalid_status(var, "fixing"));
				}
			}
		}
	}

	/// Aggregate a LOOSE variable `var` onto a LOOSE or COLUMN variable
	/// `target`, such that `var = scalar * target + constant`.
	///
	/// The global bounds of both variables are first tightened through the
	/// relation until they agree. When this determines their values, both
	/// variables are fixed instead. Otherwise, the rounding locks, objective
	/// coefficient, branching data and relations of `var` are moved to
	/// `target`.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn aggregate(
		&mut self,
		var: VarRef,
		target: VarRef,
		scalar: f64,
		constant: f64,
	) -> Result<AggregationOutcome, VarError> {
		self.check_alive(var)?;
		self.check_alive(target)?;
		if self.config.is_zero(scalar) {
			return Err(VarError::ZeroScalar(self.vars[var].name.clone()));
		}
		if var == target {
			return Err(VarError::SelfAggregation(self.vars[var].name.clone()));
		}
		if !matches!(self.vars[var].status, VarStatus::Loose) {
			return Err(self.invalid_status(var, "aggregation"));
		}
		if !matches!(
			self.vars[target].status,
			VarStatus::Loose | VarStatus::Column(_)
		) {
			return Err(self.invalid_status(target, "aggregation targets"));
		}
		let (x, y) = (var, target);
		let t = LinearTransform::new(scalar, constant);

		// Tighten the bounds of both variables through the relation
		for _ in 0..self.config.max_aggregation_rounds() {
			let (ly, uy) = t.transform_interval(self.vars[y].glb_dom.lb, self.vars[y].glb_dom.ub);
			let Some(x_changed) = self.tighten_to_interval(x, ly, uy)? else {
				return Ok(AggregationOutcome::Infeasible);
			};
			let (lx, ux) =
				t.rev_transform_interval(self.vars[x].glb_dom.lb, self.vars[x].glb_dom.ub);
			let Some(y_changed) = self.tighten_to_interval(y, lx, ux)? else {
				return Ok(AggregationOutcome::Infeasible);
			};
			if !x_changed && !y_changed {
				break;
			}
		}
		let (lx, ux) = (self.vars[x].glb_dom.lb, self.vars[x].glb_dom.ub);
		let (ly, uy) = (self.vars[y].glb_dom.lb, self.vars[y].glb_dom.ub);
		if self.config.is_feas_eq(ly, uy) || self.config.is_feas_eq(lx, ux) {
			let val = if self.config.is_feas_eq(ly, uy) {
				ly
			} else {
				t.rev_transform(lx)
			};
			debug!(var = %self.vars[x].name, target = %self.vars[y].name, val, "aggregation determines values");
			let fy = self.fix(y, val)?;
			let fx = self.fix(x, t.transform(val))?;
			return Ok(
				if fx == FixOutcome::Infeasible || fy == FixOutcome::Infeasible {
					AggregationOutcome::Infeasible
				} else {
					AggregationOutcome::Fixed
				},
			);
		}

		debug!(var = %self.vars[x].name, target = %self.vars[y].name, scalar, constant, "aggregate variable");
		let relations = self.detach_relations(x);

		// Change the status and link both variables
		let obj = self.vars[x].obj;
		self.set_obj(x, 0.0);
		let [down, up] = mem::take(&mut self.vars[x].locks);
		let (lb, ub) = t.transform_interval(self.vars[y].loc_dom.lb, self.vars[y].loc_dom.ub);
		let (lb, ub) = (self.config.normalize(lb), self.config.normalize(ub));
		let xv = &mut self.vars[x];
		xv.status = VarStatus::Aggregated {
			var: y,
			transform: t,
		};
		xv.loc_dom.lb = lb.max(xv.glb_dom.lb);
		xv.loc_dom.ub = ub.min(xv.glb_dom.ub);
		let (factor, priority) = (xv.branch_factor, xv.branch_priority);
		let (dir, hist, hist_run) = if scalar > 0.0 {
			(
				xv.branch_direction,
				xv.branching.clone(),
				xv.branching_run.clone(),
			)
		} else {
			(
				!xv.branch_direction,
				xv.branching.flipped(),
				xv.branching_run.flipped(),
			)
		};
		let yv = &mut self.vars[y];
		yv.branch_factor = yv.branch_factor.max(factor);
		yv.branch_priority = yv.branch_priority.max(priority);
		if yv.branch_direction == BranchDirection::Auto {
			yv.branch_direction = dir;
		}
		yv.branching.merge(&hist);
		yv.branching_run.merge(&hist_run);
		yv.parents.push(x);
		yv.uses += 1;
		self.remove_active(x);

		// Forwarded to the target through the new status
		self.add_locks(x, lock_delta(down), lock_delta(up))?;
		self.add_obj(x, obj)?;
		self.notify(VarEvent::VarFixed { var: x });
		self.stats.n_aggregations += 1;

		let out = self.reattach_relations(x, relations)?;
		Ok(if out.infeasible {
			AggregationOutcome::Infeasible
		} else {
			AggregationOutcome::Aggregated
		})
	}

	/// Aggregate two arbitrary variables using the relation `ax * x + ay * y =
	/// rhs`.
	///
	/// Both variables are resolved to their representatives, and the variable
	/// to eliminate is chosen such that integrality is preserved: a continuous
	/// variable is eliminated first, and an integral variable is only eliminated
	/// when it remains integral for all integral values of the other variable.
	/// When no such choice exists, the request is declined.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn aggregate_vars(
		&mut self,
		ax: f64,
		x: VarRef,
		ay: f64,
		y: VarRef,
		rhs: f64,
	) -> Result<AggregationOutcome, VarError> {
		self.check_alive(x)?;
		self.check_alive(y)?;
		let (vx, tx) = self.resolve(x);
		let (vy, ty) = self.resolve(y);
		let mut rhs = rhs - ax * tx.offset - ay * ty.offset;
		let (mut ax, mut ay) = (ax * tx.scale, ay * ty.scale);
		if matches!(self.vars[vx].status, VarStatus::Fixed) {
			rhs -= ax * self.vars[vx].glb_dom.lb;
			ax = 0.0;
		}
		if matches!(self.vars[vy].status, VarStatus::Fixed) {
			rhs -= ay * self.vars[vy].glb_dom.lb;
			ay = 0.0;
		}
		if vx == vy {
			ax += ay;
			ay = 0.0;
		}
		match (self.config.is_zero(ax), self.config.is_zero(ay)) {
			(true, true) => {
				return Ok(if self.config.is_feas_eq(rhs, 0.0) {
					AggregationOutcome::Redundant
				} else {
					AggregationOutcome::Infeasible
				});
			}
			(false, true) => return Ok(self.fix(vx, rhs / ax)?.into()),
			(true, false) => return Ok(self.fix(vy, rhs / ay)?.into()),
			(false, false) => {}
		}

		let eliminable = |prb: &Self, v: VarRef, av: f64, w: VarRef, aw: f64| {
			let (xv, wv) = (&prb.vars[v], &prb.vars[w]);
			if !matches!(xv.status, VarStatus::Loose)
				|| !matches!(wv.status, VarStatus::Loose | VarStatus::Column(_))
			{
				return None;
			}
			if !xv.is_integral() {
				Some(0)
			} else if wv.is_integral()
				&& prb.config.is_feas_integral(aw / av)
				&& prb.config.is_feas_integral(rhs / av)
			{
				Some(1)
			} else {
				None
			}
		};
		let choice = [(vx, ax, vy, ay), (vy, ay, vx, ax)]
			.into_iter()
			.filter_map(|(v, av, w, aw)| eliminable(self, v, av, w, aw).map(|rank| (rank, v, av, w, aw)))
			.min_by_key(|&(rank, ..)| rank);
		let Some((_, v, av, w, aw)) = choice else {
			trace!(x = %self.vars[vx].name, y = %self.vars[vy].name, "aggregation declined");
			return Ok(AggregationOutcome::Declined);
		};
		// av * v + aw * w = rhs  =>  v = -aw / av * w + rhs / av
		self.aggregate(v, w, -aw / av, rhs / av)
	}

	/// Multi-aggregate a LOOSE variable: `var = sum(scalar * term) + constant`.
	///
	/// The sum is first expressed in terms of active variables. A reference to
	/// `var` itself is eliminated. Sums without terms fix the variable, and sums
	/// with a single term aggregate it. Otherwise the rounding locks and the
	/// objective coefficient are moved onto the terms; no relations between the
	/// variables are derived.
	#[tracing::instrument(level = "debug", skip(self, terms))]
	pub fn multi_aggregate(
		&mut self,
		var: VarRef,
		terms: &[(VarRef, f64)],
		constant: f64,
	) -> Result<AggregationOutcome, VarError> {
		self.check_alive(var)?;
		for &(v, _) in terms {
			self.check_alive(v)?;
		}
		if !matches!(self.vars[var].status, VarStatus::Loose) {
			return Err(self.invalid_status(var, "multi-aggregation"));
		}
		let (mut terms, mut constant) = self.flatten_linear_sum(terms, constant);
		if let Some(i) = terms.iter().position(|&(v, _)| v == var) {
			let (_, a) = terms.remove(i);
			if self.config.is_eq(a, 1.0) {
				return Ok(match (terms.is_empty(), self.config.is_feas_eq(constant, 0.0)) {
					(true, true) => AggregationOutcome::Redundant,
					(true, false) => AggregationOutcome::Infeasible,
					(false, _) => AggregationOutcome::Declined,
				});
			}
			// var = a * var + rest  =>  var = rest / (1 - a)
			let div = 1.0 - a;
			for (_, s) in &mut terms {
				*s /= div;
			}
			constant /= div;
		}
		match terms.as_slice() {
			[] => return Ok(self.fix(var, constant)?.into()),
			&[(y, a)] => return self.aggregate(var, y, a, constant),
			_ => {}
		}
		if let Some(&(v, _)) = terms
			.iter()
			.find(|&&(v, _)| !matches!(self.vars[v].status, VarStatus::Loose | VarStatus::Column(_)))
		{
			return Err(self.invalid_status(v, "multi-aggregation targets"));
		}

		debug!(var = %self.vars[var].name, n_terms = terms.len(), constant, "multi-aggregate variable");
		self.remove_from_graph(var);
		let obj = self.vars[var].obj;
		self.set_obj(var, 0.0);
		let [down, up] = mem::take(&mut self.vars[var].locks);
		let (vars, scalars): (Vec<VarRef>, Vec<f64>) = terms.into_iter().unzip();
		for &v in &vars {
			let y = &mut self.vars[v];
			y.parents.push(var);
			y.uses += 1;
		}
		self.vars[var].status = VarStatus::MultiAggregated {
			vars,
			scalars,
			constant,
		};
		self.remove_active(var);
		self.add_locks(var, lock_delta(down), lock_delta(up))?;
		self.add_obj(var, obj)?;
		self.notify(VarEvent::VarFixed { var });
		self.stats.n_multi_aggregations += 1;
		Ok(AggregationOutcome::Aggregated)
	}

	/// Return the negation of a variable, creating it on the first request.
	///
	/// The negation of a binary variable `x` is `1 - x`; other variables are
	/// negated as `lb + ub - x` using their global bounds, which must be finite.
	/// The negation of a negated variable is its partner.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn negate(&mut self, var: VarRef) -> Result<VarRef, VarError> {
		self.check_alive(var)?;
		let x = &self.vars[var];
		match x.status {
			VarStatus::Negated { var: partner, .. } => return Ok(partner),
			VarStatus::MultiAggregated { .. } => return Err(self.invalid_status(var, "negation")),
			_ => {}
		}
		if let Some(n) = x.negated {
			return Ok(n);
		}
		let constant = if x.is_binary() {
			1.0
		} else {
			x.glb_dom.lb + x.glb_dom.ub
		};
		if !self.config.is_finite(constant) {
			return Err(VarError::Unbounded(x.name.clone()));
		}

		let (name, var_type) = (format!("~{}", x.name), x.var_type);
		let (glb, loc) = (x.glb_dom.clone(), x.loc_dom.clone());
		let (factor, priority, dir) = (x.branch_factor, x.branch_priority, !x.branch_direction);
		let neg = self.create_var(
			name,
			var_type,
			constant - glb.ub,
			constant - glb.lb,
			0.0,
			VarStatus::Negated { var, constant },
		);
		let n = &mut self.vars[neg];
		n.loc_dom.lb = constant - loc.ub;
		n.loc_dom.ub = constant - loc.lb;
		for (holes, target) in [(&glb.holes, &mut n.glb_dom.holes), (&loc.holes, &mut n.loc_dom.holes)] {
			for h in holes.iter() {
				let _ = target.add(constant - h.right, constant - h.left);
			}
		}
		n.branch_factor = factor;
		n.branch_priority = priority;
		n.branch_direction = dir;
		n.negated = Some(var);
		let x = &mut self.vars[var];
		x.negated = Some(neg);
		x.parents.push(neg);
		x.uses += 1;
		self.stats.n_negations += 1;
		debug!(var = %self.vars[var].name, constant, "negate variable");
		Ok(neg)
	}

	/// Internal method to fix an active variable (or an original variable
	/// without transformed counterpart) after its value has been resolved.
	fn fix_active(&mut self, var: VarRef, value: f64) -> FixOutcome {
		let x = &self.vars[var];
		let (lb, ub) = (x.loc_dom.lb, x.loc_dom.ub);
		if self.config.is_feas_lt(value, lb)
			|| self.config.is_feas_gt(value, ub)
			|| (x.is_integral() && !self.config.is_feas_integral(value))
		{
			debug!(var = %x.name, value, lb, ub, "fixing value outside of domain");
			return FixOutcome::Infeasible;
		}
		let value = if x.is_integral() { value.round() } else { value };
		let value = value.max(lb).min(ub);
		let original = matches!(x.status, VarStatus::Original { .. });
		debug!(var = %x.name, value, "fix variable");

		if !original {
			self.remove_from_graph(var);
			self.obj_offset += self.vars[var].obj * value;
			self.set_obj(var, 0.0);
		}
		self.set_global_bound(var, BoundType::Lower, value);
		self.set_global_bound(var, BoundType::Upper, value);
		if !original {
			self.vars[var].status = VarStatus::Fixed;
			self.remove_active(var);
			self.notify(VarEvent::VarFixed { var });
			self.stats.n_fixings += 1;
		}
		FixOutcome::Fixed
	}

	/// Internal method to tighten the global bounds of a variable to an
	/// interval. Returns whether a bound changed, or `None` when the interval
	/// does not intersect the domain.
	fn tighten_to_interval(&mut self, var: VarRef, lb: f64, ub: f64) -> Result<Option<bool>, VarError> {
		let mut changed = false;
		for (bt, b) in [(BoundType::Lower, lb), (BoundType::Upper, ub)] {
			match self.tighten_global(var, bt, b)? {
				Tightening::Tightened => changed = true,
				Tightening::Unchanged => {}
				Tightening::Infeasible => return Ok(None),
			}
		}
		Ok(Some(changed))
	}

	/// Internal method to remove all relations of a variable from the graph,
	/// returning them so that they can be added again once the variable is
	/// expressed in terms of another variable.
	fn detach_relations(&mut self, var: VarRef) -> DetachedRelations {
		let x = &self.vars[var];
		let mut rel = DetachedRelations::default();
		for bt in [BoundType::Lower, BoundType::Upper] {
			rel.var_bounds
				.extend(x.var_bounds(bt).iter().map(|&vb| (bt, vb)));
		}
		for value in [false, true] {
			rel.implications
				.extend(x.implics.get(value).iter().map(|&imp| (value, imp)));
		}
		for h in x.implied_by.iter().copied().unique() {
			for value in [false, true] {
				rel.held.extend(
					self.vars[h]
						.implics
						.get(value)
						.iter()
						.filter(|imp| imp.var == var)
						.map(|imp| (h, value, imp.bound_type, imp.bound)),
				);
			}
		}
		let crefs: Vec<_> = x.cliques[0].iter().chain(&x.cliques[1]).copied().collect();
		for cref in crefs {
			if let Some(c) = self.cliques.get(cref) {
				rel.cliques.push(c.literals().to_vec());
			}
			self.delete_clique(cref);
		}
		self.remove_from_graph(var);
		rel
	}

	/// Internal method to add the relations of an aggregated variable again,
	/// which now resolves them onto its target.
	fn reattach_relations(&mut self, var: VarRef, rel: DetachedRelations) -> Result<Derivation, VarError> {
		let mut out = Derivation::default();
		for (bt, vb) in rel.var_bounds {
			out.merge(self.add_var_bound(var, bt, vb.var, vb.coef, vb.constant)?);
		}
		for (value, imp) in rel.implications {
			out.merge(self.add_implication(var, value, imp.var, imp.bound_type, imp.bound, false)?);
		}
		for (h, value, bt, bound) in rel.held {
			out.merge(self.add_implication(h, value, var, bt, bound, false)?);
		}
		for lits in rel.cliques {
			// literals whose representative is no longer binary are dropped with
			// the clique
			if lits.iter().all(|&(v, w)| self.literal(v, w).is_some()) {
				let (_, d) = self.add_clique(&lits)?;
				out.merge(d);
			}
		}
		Ok(out)
	}
}

#[derive(Debug, Default)]
/// The relations of a variable, removed from the graph while its status
/// changes.
struct DetachedRelations {
	/// Variable bounds on the variable and their type.
	var_bounds: Vec<(BoundType, VarBound)>,
	/// Implications triggered by the variable.
	implications: Vec<(bool, Implication)>,
	/// Implications on the variable: holder, value, bound type and bound.
	held: Vec<(VarRef, bool, BoundType, f64)>,
	/// The literals of the cliques that contained the variable.
	cliques: Vec<Vec<(VarRef, bool)>>,
}

/// Convert a lock count into a (saturated) lock change.
fn lock_delta(n: u32) -> i32 {
	i32::try_from(n).unwrap_or(i32::MAX)
}

#[cfg(test)]
mod tests {
	use tracing_test::traced_test;

	use crate::{
		history::BoundReason, tests::EventLog, AggregationOutcome, BoundType, BranchDirection,
		DomChg, FixOutcome, LockType, Problem, Status, VarError, VarEvent, VarType,
	};

	#[test]
	#[traced_test]
	fn test_fix_outside_bounds() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let mut dc = DomChg::default();
		let r = BoundReason::Branching;
		let _ = prb.tighten_lb_local(&mut dc, x, 2.0, r).unwrap();
		let _ = prb.tighten_ub_local(&mut dc, x, 5.0, r).unwrap();
		assert_eq!(prb.fix(x, 7.0), Ok(FixOutcome::Infeasible));
		assert_eq!(prb.fix(x, 2.5), Ok(FixOutcome::Infeasible));
		assert_eq!(prb.var(x).status(), Status::Loose);
		assert_eq!((prb.lb_local(x), prb.ub_local(x)), (2.0, 5.0));
		assert_eq!((prb.lb_global(x), prb.ub_global(x)), (0.0, 10.0));
	}

	#[test]
	fn test_fix_moves_objective_and_leaves_graph() {
		let log = EventLog::default();
		let mut prb = Problem::default().with_event_sink(Box::new(log.clone()));
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 3.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let z = prb.add_var("z", VarType::Binary, 0.0, 1.0, 0.0);
		let _ = prb.add_clique(&[(x, true), (y, true), (z, true)]).unwrap();
		let _ = prb
			.add_implication(y, true, x, BoundType::Upper, 0.0, false)
			.unwrap();

		assert_eq!(prb.fix(x, 1.0), Ok(FixOutcome::Fixed));
		assert_eq!(prb.var(x).status(), Status::Fixed);
		assert_eq!(prb.obj_offset(), 3.0);
		assert_eq!(prb.var(x).obj(), 0.0);
		assert!(!prb.var(x).is_active());
		assert_eq!(prb.active_vars().len(), 2);
		assert!(prb.var(x).cliques(true).is_empty());
		assert!(prb.var(y).implications().is_empty());
		assert_eq!(prb.n_cliques(), 1);
		assert!(log.events().contains(&VarEvent::VarFixed { var: x }));
		assert_eq!(prb.fix(x, 1.0), Ok(FixOutcome::Unchanged));
		assert_eq!(prb.fix(x, 0.0), Ok(FixOutcome::Infeasible));
		assert_eq!(prb.statistics().n_fixings(), 1);
	}

	#[test]
	fn test_fix_routes_to_representative() {
		let mut prb = Problem::default();
		let x = prb.add_original("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let t = prb.transform(x).unwrap();
		let nx = prb.negate(x).unwrap();
		// ~x = 10 - x
		assert_eq!(prb.fix(nx, 3.0), Ok(FixOutcome::Fixed));
		assert_eq!(prb.var(t).status(), Status::Fixed);
		assert_eq!(prb.lb_global(t), 7.0);
		// the original formulation keeps its bounds
		assert_eq!(prb.lb_global(x), 0.0);

		let c = prb.add_var("c", VarType::Continuous, 0.0, 10.0, 0.0);
		prb.create_column(c).unwrap();
		assert!(matches!(prb.fix(c, 1.0), Err(VarError::InvalidStatus { .. })));

		let o = prb.add_original("o", VarType::Integer, 0.0, 10.0, 0.0);
		assert_eq!(prb.fix(o, 4.0), Ok(FixOutcome::Fixed));
		assert_eq!(prb.var(o).status(), Status::Original);
		assert_eq!((prb.lb_global(o), prb.ub_global(o)), (4.0, 4.0));
	}

	#[test]
	#[traced_test]
	fn test_aggregation_keeps_bounds_affine() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 12.0, 2.0);
		let y = prb.add_var("y", VarType::Continuous, 1.0, 10.0, 1.0);
		prb.add_locks(x, 1, 2).unwrap();
		// x = 2y + 1
		assert_eq!(prb.aggregate(x, y, 2.0, 1.0), Ok(AggregationOutcome::Aggregated));
		assert_eq!(prb.var(x).status(), Status::Aggregated);
		assert_eq!((prb.lb_global(x), prb.ub_global(x)), (3.0, 12.0));
		assert_eq!((prb.lb_global(y), prb.ub_global(y)), (1.0, 5.5));
		assert_eq!(prb.var(y).locks(LockType::Down), 1);
		assert_eq!(prb.var(y).locks(LockType::Up), 2);
		assert_eq!(prb.var(y).obj(), 5.0);
		assert_eq!(prb.obj_offset(), 2.0);
		assert_eq!(prb.var(y).parents(), &[x]);
		assert_eq!(prb.active_vars(), &[y]);

		let mut dc = DomChg::default();
		let _ = prb
			.tighten_lb_local(&mut dc, x, 7.0, BoundReason::Branching)
			.unwrap();
		assert_eq!(prb.lb_local(y), 3.0);
		assert_eq!(prb.lb_local(x), 7.0);
		let _ = prb.tighten_ub_global(y, 4.0).unwrap();
		assert_eq!(prb.ub_global(x), 9.0);
		assert_eq!(prb.ub_local(x), 9.0);
	}

	#[test]
	fn test_aggregation_collapses_to_fixing() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 3.0, 0.0);
		let y = prb.add_var("y", VarType::Integer, 0.0, 10.0, 0.0);
		let z = prb.add_var("z", VarType::Integer, 0.0, 1.0, 0.0);
		let w = prb.add_var("w", VarType::Integer, 1.0, 1.0, 0.0);
		assert_eq!(prb.aggregate(z, w, 1.0, -1.0), Ok(AggregationOutcome::Fixed));
		assert_eq!(prb.var(z).status(), Status::Fixed);
		assert_eq!(prb.lb_global(z), 0.0);
		// x = y + 4 leaves no room for x
		assert_eq!(prb.aggregate(x, y, 1.0, 4.0), Ok(AggregationOutcome::Infeasible));
	}

	#[test]
	fn test_aggregation_errors() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Continuous, 0.0, 1.0, 0.0);
		assert!(matches!(prb.aggregate(x, y, 0.0, 1.0), Err(VarError::ZeroScalar(_))));
		assert!(matches!(prb.aggregate(x, x, 1.0, 0.0), Err(VarError::SelfAggregation(_))));
		prb.create_column(x).unwrap();
		assert!(matches!(prb.aggregate(x, y, 1.0, 0.0), Err(VarError::InvalidStatus { .. })));
		// a COLUMN variable can be an aggregation target
		assert_eq!(prb.aggregate(y, x, 1.0, 0.0), Ok(AggregationOutcome::Aggregated));
		assert!(matches!(prb.aggregate(y, x, 1.0, 0.0), Err(VarError::InvalidStatus { .. })));
	}

	#[test]
	fn test_aggregation_moves_relations() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let z = prb.add_var("z", VarType::Binary, 0.0, 1.0, 0.0);
		let c = prb.add_var("c", VarType::Continuous, 0.0, 10.0, 0.0);
		let _ = prb.add_clique(&[(x, true), (z, true)]).unwrap();
		let _ = prb
			.add_implication(x, true, c, BoundType::Upper, 4.0, false)
			.unwrap();
		prb.chg_branch_priority(x, 5).unwrap();
		prb.chg_branch_direction(x, BranchDirection::Upwards).unwrap();

		// x = 1 - y
		assert_eq!(prb.aggregate(x, y, -1.0, 1.0), Ok(AggregationOutcome::Aggregated));
		assert!(prb.have_common_clique(y, false, z, true, false));
		assert_eq!(prb.var(y).cliques(false).len(), 1);
		let imp = prb
			.var(y)
			.implications()
			.find(false, c, BoundType::Upper)
			.map(|imp| imp.bound());
		assert_eq!(imp, Some(4.0));
		assert_eq!(prb.var(y).branch_priority(), 5);
		assert_eq!(prb.var(y).branch_direction(), BranchDirection::Downwards);
	}

	#[test]
	fn test_aggregate_vars_respects_integrality() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Integer, 0.0, 10.0, 0.0);
		let y = prb.add_var("y", VarType::Integer, 0.0, 10.0, 0.0);
		// 2x + 3y = 12 has no integral aggregation
		assert_eq!(prb.aggregate_vars(2.0, x, 3.0, y, 12.0), Ok(AggregationOutcome::Declined));
		// x + 2y = 8 eliminates x
		assert_eq!(prb.aggregate_vars(1.0, x, 2.0, y, 8.0), Ok(AggregationOutcome::Aggregated));
		assert_eq!(prb.probvar_sum(x), (y, -2.0, 8.0));
		assert_eq!(prb.ub_global(y), 4.0);

		// the continuous variable is eliminated
		let c = prb.add_var("c", VarType::Continuous, -100.0, 100.0, 0.0);
		assert_eq!(prb.aggregate_vars(4.0, y, 2.0, c, 2.0), Ok(AggregationOutcome::Aggregated));
		assert_eq!(prb.var(c).status(), Status::Aggregated);
		// x and y share a representative: 1x + 2y = 8 holds for all values
		assert_eq!(prb.aggregate_vars(1.0, x, 2.0, y, 8.0), Ok(AggregationOutcome::Redundant));
	}

	#[test]
	fn test_multi_aggregation() {
		let mut prb = Problem::default();
		let m = prb.add_var("m", VarType::Continuous, -100.0, 100.0, 3.0);
		let x = prb.add_var("x", VarType::Continuous, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Continuous, 0.0, 1.0, 0.0);
		prb.add_locks(m, 1, 0).unwrap();
		// m = 0.5m + x - y + 1  =>  m = 2x - 2y + 2
		assert_eq!(
			prb.multi_aggregate(m, &[(m, 0.5), (x, 1.0), (y, -1.0)], 1.0),
			Ok(AggregationOutcome::Aggregated)
		);
		assert_eq!(prb.var(m).status(), Status::MultiAggregated);
		assert_eq!((prb.lb_global(m), prb.ub_global(m)), (0.0, 4.0));
		assert_eq!(prb.var(x).obj(), 6.0);
		assert_eq!(prb.var(y).obj(), -6.0);
		assert_eq!(prb.obj_offset(), 6.0);
		assert_eq!(prb.var(x).locks(LockType::Down), 1);
		assert_eq!(prb.var(y).locks(LockType::Up), 1);
		assert_eq!(prb.value_of(m, |_| 0.5), 2.0);

		let f = prb.add_var("f", VarType::Continuous, 0.0, 10.0, 0.0);
		assert_eq!(prb.multi_aggregate(f, &[], 4.0), Ok(AggregationOutcome::Fixed));
		let g = prb.add_var("g", VarType::Continuous, 0.0, 10.0, 0.0);
		assert_eq!(prb.multi_aggregate(g, &[(g, 1.0)], 0.0), Ok(AggregationOutcome::Redundant));
	}

	#[test]
	fn test_negation() {
		let mut prb = Problem::default();
		let b = prb.add_var("b", VarType::Binary, 0.0, 1.0, 0.0);
		let nb = prb.negate(b).unwrap();
		assert_eq!(prb.negate(b).unwrap(), nb);
		assert_eq!(prb.negate(nb).unwrap(), b);
		assert_eq!(prb.var(nb).name(), "~b");
		assert_eq!(prb.var(nb).negation(), Some((b, 1.0)));
		assert_eq!(prb.var(nb).n_uses(), 0);
		assert_eq!(prb.var(b).n_uses(), 2);
		assert_eq!(prb.var(b).negated_var(), Some(nb));

		let x = prb.add_var("x", VarType::Integer, 2.0, 5.0, 0.0);
		let nx = prb.negate(x).unwrap();
		assert_eq!((prb.lb_global(nx), prb.ub_global(nx)), (2.0, 5.0));
		assert_eq!(prb.var(nx).negation(), Some((x, 7.0)));

		let u = prb.add_var("u", VarType::Continuous, 0.0, f64::INFINITY, 0.0);
		assert!(matches!(prb.negate(u), Err(VarError::Unbounded(_))));
		assert_eq!(prb.statistics().n_negations(), 2);
	}
}
