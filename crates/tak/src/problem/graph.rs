//! The implication graph: variable bounds, implications between binary
//! variables and bounds, and cliques of binary literals.
//!
//! All relations are stored on active variables. Relations that are requested
//! on other variables are first resolved, and relations that turn out to be
//! redundant, or that contradict the known bounds, are not stored but turned
//! into global bound changes instead.
//!
//! Each variable bound `x >= b * z + d` is stored twice: as a variable lower
//! bound of `x`, and as the equivalent variable bound `z <= (x - d) / b` (or
//! `>=` for negative `b`) of `z`. Each implication is registered on the implied
//! variable, so that all relations of a variable can be found when it leaves
//! the set of active variables.

use std::{collections::VecDeque, mem};

use itertools::Itertools;
use tracing::{debug, trace};

use crate::{
	clique::{Clique, CliqueRef},
	event::VarEvent,
	implication::{Implication, VarBound},
	problem::resolve::Literal,
	var::VarStatus,
	BoundType, Problem, Tightening, VarError, VarRef,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Summary of the global bound changes that were derived while adding a
/// relation between variables.
pub struct Derivation {
	/// Whether the problem was found to be infeasible.
	pub infeasible: bool,
	/// The number of derived global bound changes.
	pub n_bound_changes: usize,
}

impl Derivation {
	/// Internal method to account for the outcome of a derived tightening.
	fn record(&mut self, res: Tightening) {
		match res {
			Tightening::Tightened => self.n_bound_changes += 1,
			Tightening::Unchanged => {}
			Tightening::Infeasible => self.infeasible = true,
		}
	}

	/// Internal method to account for the outcome of a nested derivation.
	pub(crate) fn merge(&mut self, other: Derivation) {
		self.infeasible |= other.infeasible;
		self.n_bound_changes += other.n_bound_changes;
	}
}

impl Problem {
	/// Add the variable lower bound `var >= coef * bounding + constant`.
	pub fn add_vlb(
		&mut self,
		var: VarRef,
		bounding: VarRef,
		coef: f64,
		constant: f64,
	) -> Result<Derivation, VarError> {
		self.add_var_bound(var, BoundType::Lower, bounding, coef, constant)
	}

	/// Add the variable upper bound `var <= coef * bounding + constant`.
	pub fn add_vub(
		&mut self,
		var: VarRef,
		bounding: VarRef,
		coef: f64,
		constant: f64,
	) -> Result<Derivation, VarError> {
		self.add_var_bound(var, BoundType::Upper, bounding, coef, constant)
	}

	/// Add a variable bound on `var` in terms of `bounding`.
	///
	/// Both variables are resolved to their active representatives. The global
	/// bounds of both variables are tightened using the relation. A bounding
	/// variable that is binary turns the variable bound into implications, and
	/// a relation that is implied by the global bounds is not stored. When the
	/// variables already have a variable bound of this type, the one that is
	/// tighter over the whole domain of the bounding variable is kept.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn add_var_bound(
		&mut self,
		var: VarRef,
		bound_type: BoundType,
		bounding: VarRef,
		coef: f64,
		constant: f64,
	) -> Result<Derivation, VarError> {
		self.check_alive(var)?;
		self.check_alive(bounding)?;
		let mut out = Derivation::default();

		// Express the relation on the representatives: x (>=|<=) c * z + d
		let (x, tx) = self.resolve(var);
		let bt = if tx.positive_scale() {
			bound_type
		} else {
			!bound_type
		};
		let (z, tz) = self.resolve(bounding);
		let c = coef / tx.scale * tz.scale;
		let d = (constant - tx.offset + coef * tz.offset) / tx.scale;

		match self.vars[x].status {
			VarStatus::Loose | VarStatus::Column(_) => {}
			VarStatus::Fixed => {
				// c * z (<=|>=) val - d
				let rhs = self.vars[x].glb_dom.lb - d;
				self.tighten_linear(z, c, rhs, bt == BoundType::Lower, &mut out)?;
				return Ok(out);
			}
			VarStatus::MultiAggregated { .. } => return Ok(out),
			_ => return Err(self.invalid_status(x, "variable bounds")),
		}
		match self.vars[z].status {
			VarStatus::Loose | VarStatus::Column(_) if !self.config.is_zero(c) => {}
			VarStatus::Loose | VarStatus::Column(_) => {
				out.record(self.tighten_global(x, bt, d)?);
				return Ok(out);
			}
			VarStatus::Fixed => {
				let b = c * self.vars[z].glb_dom.lb + d;
				out.record(self.tighten_global(x, bt, b)?);
				return Ok(out);
			}
			VarStatus::MultiAggregated { .. } => return Ok(out),
			_ => return Err(self.invalid_status(z, "variable bounds")),
		}
		if x == z {
			// (1 - c) * x (>=|<=) d
			self.tighten_linear(x, 1.0 - c, d, bt == BoundType::Upper, &mut out)?;
			return Ok(out);
		}

		// Tighten the bounds of both variables using the relation
		let (lz, uz) = (self.vars[z].glb_dom.lb, self.vars[z].glb_dom.ub);
		let (lx, ux) = (self.vars[x].glb_dom.lb, self.vars[x].glb_dom.ub);
		match bt {
			BoundType::Lower => {
				let b = if c > 0.0 { c * lz + d } else { c * uz + d };
				out.record(self.tighten_global(x, BoundType::Lower, b)?);
				self.tighten_linear(z, c, ux - d, true, &mut out)?;
			}
			BoundType::Upper => {
				let b = if c > 0.0 { c * uz + d } else { c * lz + d };
				out.record(self.tighten_global(x, BoundType::Upper, b)?);
				self.tighten_linear(z, c, lx - d, false, &mut out)?;
			}
		}
		if out.infeasible || self.is_globally_fixed(x) || self.is_globally_fixed(z) {
			return Ok(out);
		}

		if self.vars[z].is_binary() {
			// x >= c * z + d  is  (z = 1 => x >= c + d) and (z = 0 => x >= d)
			let (val, b) = match (bt, c > 0.0) {
				(BoundType::Lower, true) | (BoundType::Upper, false) => (true, c + d),
				(BoundType::Lower, false) | (BoundType::Upper, true) => (false, d),
			};
			out.merge(self.add_implication(z, val, x, bt, b, true)?);
			return Ok(out);
		}
		if self.var_bound_redundant(x, bt, z, c, d) {
			trace!(x = %self.vars[x].name, z = %self.vars[z].name, "redundant variable bound");
			return Ok(out);
		}
		let vb = VarBound {
			var: z,
			coef: c,
			constant: d,
		};
		if let Some(old) = self.vars[x].var_bounds(bt).find(z) {
			if !self.var_bound_dominates(bt, z, &vb, old) {
				return Ok(out);
			}
		}
		debug!(x = %self.vars[x].name, ?bt, z = %self.vars[z].name, c, d, "add variable bound");
		self.insert_var_bound_pair(x, bt, vb);
		Ok(out)
	}

	/// Add the implication `var = value => implied (>=|<=) bound`.
	///
	/// The implication is resolved to active variables. Implications that are
	/// implied by the global bounds are not stored; implications that
	/// contradict the global bounds (or another implication of the same
	/// literal) fix `var` to the opposite value. When the implied variable is
	/// binary, the contrapositive implication is stored as well.
	///
	/// When `transitive` is set, the implications that follow from the new
	/// implication and the known relations of the implied variable are added as
	/// well, up to the configured closure depth and number of edges.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn add_implication(
		&mut self,
		var: VarRef,
		value: bool,
		implied: VarRef,
		bound_type: BoundType,
		bound: f64,
		transitive: bool,
	) -> Result<Derivation, VarError> {
		self.check_alive(var)?;
		self.check_alive(implied)?;
		let mut out = Derivation::default();
		let mut queue = VecDeque::from([(var, value, implied, bound_type, bound, 0)]);
		let mut n_derived = 0;
		while let Some((x, v, y, bt, b, depth)) = queue.pop_front() {
			let added = self.add_single_implication(x, v, y, bt, b, &mut out)?;
			if out.infeasible {
				break;
			}
			let Some((ax, av, ay, abt, ab)) = added else {
				continue;
			};
			if !transitive || depth >= self.config.max_closure_depth() {
				continue;
			}
			for (z, zbt, zb) in self.consequences(ay, abt, ab) {
				if z == ax || n_derived >= self.config.max_closure_edges() {
					continue;
				}
				n_derived += 1;
				queue.push_back((ax, av, z, zbt, zb, depth + 1));
			}
		}
		Ok(out)
	}

	/// Add a clique: a set of binary literals of which at most one may hold.
	///
	/// Literals are resolved to active variables. A literal that appears twice
	/// must be false; a variable that appears with both values forces all other
	/// literals to be false; a literal that is already true forces all others to
	/// be false. Literals that are already false are dropped. Returns the handle
	/// of the stored clique, unless it became trivial.
	#[tracing::instrument(level = "debug", skip(self))]
	pub fn add_clique(
		&mut self,
		literals: &[(VarRef, bool)],
	) -> Result<(Option<CliqueRef>, Derivation), VarError> {
		let mut out = Derivation::default();
		let mut lits = Vec::with_capacity(literals.len());
		let mut true_lits = 0;
		for &(var, value) in literals {
			self.check_alive(var)?;
			match self.literal(var, value) {
				None => return Err(VarError::NotBinary(self.vars[var].name.clone())),
				Some(Literal::Fixed(false)) => {}
				Some(Literal::Fixed(true)) => true_lits += 1,
				Some(Literal::Var(x, v)) => lits.push((x, v)),
			}
		}
		if true_lits > 1 {
			out.infeasible = true;
			return Ok((None, out));
		}
		if true_lits == 1 {
			for (x, v) in lits {
				self.fix_literal(x, !v, &mut out)?;
			}
			return Ok((None, out));
		}

		lits.sort_unstable();
		let mut unique = Vec::with_capacity(lits.len());
		for (n, (x, v)) in lits.into_iter().dedup_with_count() {
			if n > 1 {
				self.fix_literal(x, !v, &mut out)?;
			}
			unique.push((x, v));
		}
		let both: Vec<VarRef> = unique
			.iter()
			.tuple_windows()
			.filter(|((x, _), (y, _))| x == y)
			.map(|((x, _), _)| *x)
			.collect();
		match both.as_slice() {
			[] => {}
			[x] => {
				for &(y, v) in unique.iter().filter(|(y, _)| y != x) {
					self.fix_literal(y, !v, &mut out)?;
				}
				return Ok((None, out));
			}
			_ => {
				out.infeasible = true;
				return Ok((None, out));
			}
		}
		if out.infeasible {
			return Ok((None, out));
		}
		// drop literals that were falsified by the fixings above
		unique.retain(|&(x, v)| self.literal(x, v) == Some(Literal::Var(x, v)));
		if unique.len() < 2 {
			return Ok((None, out));
		}

		let cref = self.cliques.push(Clique::new(unique.clone()));
		for (x, v) in unique {
			self.vars[x].cliques[usize::from(v)].push(cref);
		}
		self.stats.n_cliques += 1;
		debug!(clique = cref.index(), "add clique");
		Ok((Some(cref), out))
	}

	/// Add a literal to an existing clique.
	///
	/// A literal that is already part of the clique must be false. When the
	/// opposite literal is part of the clique, all other literals must be
	/// false.
	pub fn add_to_clique(
		&mut self,
		cref: CliqueRef,
		var: VarRef,
		value: bool,
	) -> Result<Derivation, VarError> {
		self.check_alive(var)?;
		let mut out = Derivation::default();
		let Some(lits) = self.cliques.get(cref).map(|c| c.literals().to_vec()) else {
			return Ok(out);
		};
		match self.literal(var, value) {
			None => return Err(VarError::NotBinary(self.vars[var].name.clone())),
			Some(Literal::Fixed(false)) => {}
			Some(Literal::Fixed(true)) => {
				for (x, v) in lits {
					self.fix_literal(x, !v, &mut out)?;
				}
			}
			Some(Literal::Var(x, v)) => {
				if lits.contains(&(x, v)) {
					self.fix_literal(x, !v, &mut out)?;
				} else if lits.contains(&(x, !v)) {
					for &(y, w) in lits.iter().filter(|(y, _)| *y != x) {
						self.fix_literal(y, !w, &mut out)?;
					}
				} else if let Some(clique) = self.cliques.get_mut(cref) {
					let _ = clique.insert(x, v);
					self.vars[x].cliques[usize::from(v)].push(cref);
				}
			}
		}
		self.cleanup_clique(cref, &mut out)?;
		Ok(out)
	}

	/// Remove fixed literals from all cliques, and remove cliques that have
	/// become trivial.
	pub fn cleanup_cliques(&mut self) -> Result<Derivation, VarError> {
		let mut out = Derivation::default();
		let crefs: Vec<CliqueRef> = self.cliques.iter().map(|(c, _)| c).collect();
		for cref in crefs {
			self.cleanup_clique(cref, &mut out)?;
			if out.infeasible {
				break;
			}
		}
		Ok(out)
	}

	/// Returns whether the literals `x = xval` and `y = yval` cannot both hold
	/// because of a common clique (or, when `regard_implications` is set,
	/// because of an implication between them).
	pub fn have_common_clique(
		&self,
		x: VarRef,
		xval: bool,
		y: VarRef,
		yval: bool,
		regard_implications: bool,
	) -> bool {
		let (Some(Literal::Var(a, av)), Some(Literal::Var(b, bv))) =
			(self.literal(x, xval), self.literal(y, yval))
		else {
			return false;
		};
		if a == b {
			return av != bv;
		}
		if regard_implications {
			let implied = if bv {
				self.vars[a]
					.implics
					.find(av, b, BoundType::Upper)
					.is_some_and(|imp| imp.bound < 0.5)
			} else {
				self.vars[a]
					.implics
					.find(av, b, BoundType::Lower)
					.is_some_and(|imp| imp.bound > 0.5)
			};
			if implied {
				return true;
			}
		}
		self.vars[a].cliques[usize::from(av)]
			.iter()
			.any(|&c| self.cliques.get(c).is_some_and(|c| c.contains(b, bv)))
	}

	/// Returns whether an implication is stored that derives a bound of the
	/// given type on `implied` from `var = value`.
	pub fn has_implication(
		&self,
		var: VarRef,
		value: bool,
		implied: VarRef,
		bound_type: BoundType,
	) -> bool {
		let Some(Literal::Var(x, xval)) = self.literal(var, value) else {
			return false;
		};
		let (y, t) = self.resolve(implied);
		let bt = if t.positive_scale() {
			bound_type
		} else {
			!bound_type
		};
		self.vars[x].implics.find(xval, y, bt).is_some()
	}

	/// The literals that share a clique with `var = value`, each listed once.
	pub fn clique_members(&self, var: VarRef, value: bool) -> Vec<(VarRef, bool)> {
		let Some(Literal::Var(x, xval)) = self.literal(var, value) else {
			return Vec::new();
		};
		self.vars[x].cliques[usize::from(xval)]
			.iter()
			.filter_map(|&c| self.cliques.get(c))
			.flat_map(|c| c.literals().iter().copied())
			.filter(|&lit| lit != (x, xval))
			.unique()
			.collect()
	}

	/// Access a clique.
	pub fn clique(&self, cref: CliqueRef) -> Option<&Clique> {
		self.cliques.get(cref)
	}

	/// The number of stored cliques.
	pub fn n_cliques(&self) -> usize {
		self.cliques.len()
	}

	/// Internal method to remove all relations of a variable from the graph.
	pub(crate) fn remove_from_graph(&mut self, var: VarRef) {
		for value in [false, true] {
			for imp in self.vars[var].implics.take(value) {
				self.unlink_implied_by(imp.var, var);
			}
		}
		let holders = mem::take(&mut self.vars[var].implied_by);
		for x in holders.into_iter().unique() {
			for value in [false, true] {
				for bt in [BoundType::Lower, BoundType::Upper] {
					let _ = self.vars[x].implics.remove(value, var, bt);
				}
			}
		}
		for bt in [BoundType::Lower, BoundType::Upper] {
			for vb in self.vars[var].var_bounds_mut(bt).take() {
				self.remove_mirror(var, bt, &vb);
			}
		}
		for value in [false, true] {
			for cref in mem::take(&mut self.vars[var].cliques[usize::from(value)]) {
				let Some(clique) = self.cliques.get_mut(cref) else {
					continue;
				};
				let _ = clique.remove(var, value);
				if clique.len() < 2 {
					self.delete_clique(cref);
				}
			}
		}
	}

	/// Internal method to remove the relations of a variable that have become
	/// redundant after its global bounds changed.
	///
	/// A binary variable that is fixed by its global bounds is removed from the
	/// graph completely.
	pub(crate) fn remove_redundant_relations(&mut self, var: VarRef) {
		let x = &self.vars[var];
		if x.is_binary() && x.glb_dom.lb == x.glb_dom.ub {
			self.remove_from_graph(var);
			return;
		}
		let partners: Vec<VarRef> = x
			.vlbs
			.iter()
			.chain(x.vubs.iter())
			.map(|vb| vb.var)
			.unique()
			.collect();
		self.clean_var_bounds(var);
		for z in partners {
			self.clean_var_bounds(z);
		}
		let holders: Vec<VarRef> = self.vars[var].implied_by.iter().copied().unique().collect();
		let (lb, ub) = (self.vars[var].glb_dom.lb, self.vars[var].glb_dom.ub);
		for x in holders {
			for value in [false, true] {
				for bt in [BoundType::Lower, BoundType::Upper] {
					let redundant = self.vars[x]
						.implics
						.find(value, var, bt)
						.is_some_and(|imp| match bt {
							BoundType::Lower => self.config.is_le(imp.bound, lb),
							BoundType::Upper => self.config.is_ge(imp.bound, ub),
						});
					if redundant {
						self.remove_implication(x, value, var, bt);
					}
				}
			}
		}
	}

	/// Internal method to add a single (non-transitive) implication.
	///
	/// Returns the implication as it was stored on active variables, if it was
	/// stored.
	fn add_single_implication(
		&mut self,
		var: VarRef,
		value: bool,
		implied: VarRef,
		bound_type: BoundType,
		bound: f64,
		out: &mut Derivation,
	) -> Result<Option<(VarRef, bool, VarRef, BoundType, f64)>, VarError> {
		let (x, v) = match self.literal(var, value) {
			Some(Literal::Var(x, v)) => (x, v),
			Some(Literal::Fixed(true)) => {
				out.record(self.tighten_global(implied, bound_type, bound)?);
				return Ok(None);
			}
			Some(Literal::Fixed(false)) => return Ok(None),
			None if !self.vars[var].is_binary() => {
				return Err(VarError::NotBinary(self.vars[var].name.clone()));
			}
			None => {
				// The representative is not binary: express the implication as a
				// variable bound on `var`
				let (coef, constant) = match bound_type {
					BoundType::Lower => {
						let l = self.lb_global(implied);
						if value { (bound - l, l) } else { (l - bound, bound) }
					}
					BoundType::Upper => {
						let u = self.ub_global(implied);
						if value { (bound - u, u) } else { (u - bound, bound) }
					}
				};
				if coef.is_finite() && constant.is_finite() {
					out.merge(self.add_var_bound(implied, bound_type, var, coef, constant)?);
				}
				return Ok(None);
			}
		};

		let (y, b, bt) = self.probvar_bound(implied, bound, bound_type);
		match self.vars[y].status {
			VarStatus::Loose | VarStatus::Column(_) => {}
			VarStatus::Fixed => {
				let val = self.vars[y].glb_dom.lb;
				let violated = match bt {
					BoundType::Lower => self.config.is_feas_gt(b, val),
					BoundType::Upper => self.config.is_feas_lt(b, val),
				};
				if violated {
					self.fix_literal(x, !v, out)?;
				}
				return Ok(None);
			}
			VarStatus::MultiAggregated { .. } => return Ok(None),
			_ => return Err(self.invalid_status(y, "implications")),
		}
		let b = match (self.vars[y].is_integral(), bt) {
			(true, BoundType::Lower) => self.config.feas_ceil(b),
			(true, BoundType::Upper) => self.config.feas_floor(b),
			(false, _) => b,
		};

		if x == y {
			// x = v implies a bound on x itself
			let val = if v { 1.0 } else { 0.0 };
			let contradicting = match bt {
				BoundType::Lower => self.config.is_feas_gt(b, val),
				BoundType::Upper => self.config.is_feas_lt(b, val),
			};
			if contradicting {
				self.fix_literal(x, !v, out)?;
			}
			return Ok(None);
		}

		let (lb, ub) = (self.vars[y].glb_dom.lb, self.vars[y].glb_dom.ub);
		let (redundant, contradicting) = match bt {
			BoundType::Lower => (self.config.is_le(b, lb), self.config.is_feas_gt(b, ub)),
			BoundType::Upper => (self.config.is_ge(b, ub), self.config.is_feas_lt(b, lb)),
		};
		if contradicting {
			self.fix_literal(x, !v, out)?;
			return Ok(None);
		}
		if redundant {
			return Ok(None);
		}
		let implics = &self.vars[x].implics;
		if let Some(old) = implics.find(v, y, bt) {
			let tighter = match bt {
				BoundType::Lower => self.config.is_gt(b, old.bound),
				BoundType::Upper => self.config.is_lt(b, old.bound),
			};
			if !tighter {
				return Ok(None);
			}
		}
		if let Some(opp) = implics.find(v, y, !bt) {
			let crossing = match bt {
				BoundType::Lower => self.config.is_feas_gt(b, opp.bound),
				BoundType::Upper => self.config.is_feas_lt(b, opp.bound),
			};
			if crossing {
				self.fix_literal(x, !v, out)?;
				return Ok(None);
			}
		}

		trace!(x = %self.vars[x].name, v, y = %self.vars[y].name, ?bt, b, "add implication");
		self.insert_implication(
			x,
			v,
			Implication {
				var: y,
				bound_type: bt,
				bound: b,
			},
		);
		if self.vars[y].is_binary() {
			// x = v => y = w  implies  y = !w => x = !v
			let w = bt == BoundType::Lower;
			let inverse = if v {
				Implication {
					var: x,
					bound_type: BoundType::Upper,
					bound: 0.0,
				}
			} else {
				Implication {
					var: x,
					bound_type: BoundType::Lower,
					bound: 1.0,
				}
			};
			self.insert_implication(y, !w, inverse);
		}
		self.stats.n_implications += 1;
		self.notify(VarEvent::ImplAdded { var: x });
		Ok(Some((x, v, y, bt, b)))
	}

	/// Internal method to list the bounds that follow from `var (>=|<=) bound`
	/// through the implications and variable bounds of `var`.
	fn consequences(&self, var: VarRef, bound_type: BoundType, bound: f64) -> Vec<(VarRef, BoundType, f64)> {
		let x = &self.vars[var];
		let mut res = Vec::new();
		if x.is_binary() {
			let w = bound_type == BoundType::Lower;
			res.extend(
				x.implics
					.get(w)
					.iter()
					.map(|imp| (imp.var, imp.bound_type, imp.bound)),
			);
		}
		// var >= bound and var <= c * z + d give c * z >= bound - d (and vice
		// versa for upper bounds)
		for vb in x.var_bounds(!bound_type).iter() {
			let b = (bound - vb.constant) / vb.coef;
			let bt = if vb.coef > 0.0 { bound_type } else { !bound_type };
			res.push((vb.var, bt, b));
		}
		res
	}

	/// Internal method to derive a global bound from `coef * var <= rhs` (or
	/// `>=` when `le` is not set).
	fn tighten_linear(
		&mut self,
		var: VarRef,
		coef: f64,
		rhs: f64,
		le: bool,
		out: &mut Derivation,
	) -> Result<(), VarError> {
		if self.config.is_zero(coef) {
			let violated = if le {
				self.config.is_feas_lt(rhs, 0.0)
			} else {
				self.config.is_feas_gt(rhs, 0.0)
			};
			out.infeasible |= violated;
			return Ok(());
		}
		if matches!(self.vars[self.probvar(var)].status, VarStatus::MultiAggregated { .. }) {
			return Ok(());
		}
		let bt = if le == (coef > 0.0) {
			BoundType::Upper
		} else {
			BoundType::Lower
		};
		out.record(self.tighten_global(var, bt, rhs / coef)?);
		Ok(())
	}

	/// Internal method to fix a binary variable globally.
	fn fix_literal(&mut self, var: VarRef, value: bool, out: &mut Derivation) -> Result<(), VarError> {
		let res = if value {
			self.tighten_global(var, BoundType::Lower, 1.0)?
		} else {
			self.tighten_global(var, BoundType::Upper, 0.0)?
		};
		out.record(res);
		Ok(())
	}

	/// Internal method to check whether the global bounds of a variable are
	/// equal.
	fn is_globally_fixed(&self, var: VarRef) -> bool {
		let x = &self.vars[var];
		self.config.is_feas_eq(x.glb_dom.lb, x.glb_dom.ub)
	}

	/// Internal method to check whether a variable bound is implied by the
	/// global bounds of the variables.
	fn var_bound_redundant(&self, x: VarRef, bound_type: BoundType, z: VarRef, c: f64, d: f64) -> bool {
		let (lz, uz) = (self.vars[z].glb_dom.lb, self.vars[z].glb_dom.ub);
		match bound_type {
			BoundType::Lower => {
				let best = if c > 0.0 { c * uz + d } else { c * lz + d };
				self.config.is_le(best, self.vars[x].glb_dom.lb)
			}
			BoundType::Upper => {
				let best = if c > 0.0 { c * lz + d } else { c * uz + d };
				self.config.is_ge(best, self.vars[x].glb_dom.ub)
			}
		}
	}

	/// Internal method to check whether the variable bound `new` is at least as
	/// tight as `old` over the whole global domain of the bounding variable.
	fn var_bound_dominates(&self, bound_type: BoundType, z: VarRef, new: &VarBound, old: &VarBound) -> bool {
		let (lz, uz) = (self.vars[z].glb_dom.lb, self.vars[z].glb_dom.ub);
		[lz, uz].into_iter().all(|at| {
			let (a, b) = if self.config.is_finite(at) {
				(new.coef * at + new.constant, old.coef * at + old.constant)
			} else if self.config.is_eq(new.coef, old.coef) {
				(new.constant, old.constant)
			} else {
				// the term with the steeper slope dominates towards infinity
				(at.signum() * new.coef, at.signum() * old.coef)
			};
			match bound_type {
				BoundType::Lower => self.config.is_ge(a, b),
				BoundType::Upper => self.config.is_le(a, b),
			}
		})
	}

	/// Internal method to remove the variable bounds of a variable that are
	/// implied by the global bounds.
	fn clean_var_bounds(&mut self, x: VarRef) {
		for bt in [BoundType::Lower, BoundType::Upper] {
			let redundant: Vec<VarRef> = self.vars[x]
				.var_bounds(bt)
				.iter()
				.filter(|vb| self.var_bound_redundant(x, bt, vb.var, vb.coef, vb.constant))
				.map(|vb| vb.var)
				.collect();
			for z in redundant {
				self.remove_var_bound(x, bt, z);
			}
		}
	}

	/// Internal method to store a variable bound together with its mirror on
	/// the bounding variable.
	fn insert_var_bound_pair(&mut self, x: VarRef, bound_type: BoundType, vb: VarBound) {
		let z = vb.var;
		let mbt = Self::mirror_type(bound_type, &vb);
		self.remove_var_bound(x, bound_type, z);
		self.remove_var_bound(z, mbt, x);
		let mirror = VarBound {
			var: x,
			coef: 1.0 / vb.coef,
			constant: -vb.constant / vb.coef,
		};
		let _ = self.vars[x].var_bounds_mut(bound_type).insert(vb);
		let _ = self.vars[z].var_bounds_mut(mbt).insert(mirror);
	}

	/// Internal method to remove a variable bound together with its mirror.
	fn remove_var_bound(&mut self, x: VarRef, bound_type: BoundType, z: VarRef) {
		if let Some(vb) = self.vars[x].var_bounds_mut(bound_type).remove(z) {
			self.remove_mirror(x, bound_type, &vb);
		}
	}

	/// Internal method to remove the mirror of a variable bound of `x`.
	fn remove_mirror(&mut self, x: VarRef, bound_type: BoundType, vb: &VarBound) {
		let mbt = Self::mirror_type(bound_type, vb);
		let _ = self.vars[vb.var].var_bounds_mut(mbt).remove(x);
	}

	/// The type of the mirror of a variable bound: `x >= c * z + d` is an upper
	/// bound on `z` for positive `c`, and a lower bound otherwise.
	fn mirror_type(bound_type: BoundType, vb: &VarBound) -> BoundType {
		if vb.coef > 0.0 {
			!bound_type
		} else {
			bound_type
		}
	}

	/// Internal method to store an implication and register it on the implied
	/// variable.
	fn insert_implication(&mut self, x: VarRef, value: bool, imp: Implication) {
		if self.vars[x].implics.insert(value, imp).is_none() {
			self.vars[imp.var].implied_by.push(x);
		}
	}

	/// Internal method to remove an implication (and its contrapositive).
	fn remove_implication(&mut self, x: VarRef, value: bool, y: VarRef, bound_type: BoundType) {
		if self.vars[x].implics.remove(value, y, bound_type).is_none() {
			return;
		}
		self.unlink_implied_by(y, x);
		if self.vars[y].is_binary() {
			let w = bound_type == BoundType::Upper;
			let inv_bt = if value {
				BoundType::Upper
			} else {
				BoundType::Lower
			};
			if self.vars[y].implics.remove(w, x, inv_bt).is_some() {
				self.unlink_implied_by(x, y);
			}
		}
	}

	/// Internal method to remove one registration of `holder` from the
	/// variables that imply a bound on `var`.
	fn unlink_implied_by(&mut self, var: VarRef, holder: VarRef) {
		let list = &mut self.vars[var].implied_by;
		if let Some(i) = list.iter().position(|&h| h == holder) {
			let _ = list.swap_remove(i);
		}
	}

	/// Internal method to remove a clique from the table and from the lists of
	/// its variables.
	pub(crate) fn delete_clique(&mut self, cref: CliqueRef) {
		if let Some(clique) = self.cliques.remove(cref) {
			for &(x, v) in clique.literals() {
				self.vars[x].cliques[usize::from(v)].retain(|&c| c != cref);
			}
			trace!(clique = cref.index(), "delete clique");
		}
	}

	/// Internal method to remove fixed literals from a clique, deleting it when
	/// it becomes trivial.
	fn cleanup_clique(&mut self, cref: CliqueRef, out: &mut Derivation) -> Result<(), VarError> {
		let Some(lits) = self.cliques.get(cref).map(|c| c.literals().to_vec()) else {
			return Ok(());
		};
		let (true_lits, false_lits): (Vec<_>, Vec<_>) = lits
			.iter()
			.copied()
			.filter_map(|(x, v)| match self.literal(x, v) {
				Some(Literal::Fixed(b)) => Some(((x, v), b)),
				_ => None,
			})
			.partition(|&(_, b)| b);
		match true_lits.as_slice() {
			[] => {}
			[((t, tv), _)] => {
				for &(x, v) in lits.iter().filter(|&&lit| lit != (*t, *tv)) {
					if matches!(self.literal(x, v), Some(Literal::Var(..))) {
						self.fix_literal(x, !v, out)?;
					}
				}
				self.delete_clique(cref);
				return Ok(());
			}
			_ => {
				out.infeasible = true;
				return Ok(());
			}
		}
		for ((x, v), _) in false_lits {
			if let Some(clique) = self.cliques.get_mut(cref) {
				let _ = clique.remove(x, v);
			}
			self.vars[x].cliques[usize::from(v)].retain(|&c| c != cref);
		}
		if self.cliques.get(cref).is_some_and(|c| c.len() < 2) {
			self.delete_clique(cref);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use tracing_test::traced_test;

	use crate::{BoundType, Problem, Tightening, VarError, VarType};

	#[test]
	#[traced_test]
	fn test_clique_scenarios() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let (c, out) = prb.add_clique(&[(x, true), (y, true)]).unwrap();
		let c = c.unwrap();
		assert_eq!(out.n_bound_changes, 0);
		assert!(prb.have_common_clique(y, true, x, true, false));
		assert!(!prb.have_common_clique(y, false, x, true, false));
		assert_eq!(prb.clique_members(x, true), vec![(y, true)]);
		assert!(prb.clique_members(x, false).is_empty());

		// the opposite literal forces the other members to false
		let out = prb.add_to_clique(c, x, false).unwrap();
		assert!(!out.infeasible);
		assert_eq!(prb.ub_global(y), 0.0);
		assert_eq!(prb.ub_global(x), 1.0);
		assert!(prb.clique(c).is_none());

		// a literal added a second time must be false
		let z = prb.add_var("z", VarType::Binary, 0.0, 1.0, 0.0);
		let w = prb.add_var("w", VarType::Binary, 0.0, 1.0, 0.0);
		let (c, _) = prb.add_clique(&[(z, true), (w, true)]).unwrap();
		let out = prb.add_to_clique(c.unwrap(), z, true).unwrap();
		assert_eq!(out.n_bound_changes, 1);
		assert_eq!(prb.ub_global(z), 0.0);
		assert_eq!(prb.n_cliques(), 0);
	}

	#[test]
	fn test_clique_with_negated_literals() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let z = prb.add_var("z", VarType::Binary, 0.0, 1.0, 0.0);
		let nx = prb.negate(x).unwrap();
		// nx = 1 is x = 0; together with x = 1 this forces y and z to 0
		let (c, out) = prb
			.add_clique(&[(nx, true), (x, true), (y, true), (z, true)])
			.unwrap();
		assert!(c.is_none());
		assert_eq!(out.n_bound_changes, 2);
		assert_eq!((prb.ub_global(y), prb.ub_global(z)), (0.0, 0.0));

		let c = prb.add_var("c", VarType::Continuous, 0.0, 1.0, 0.0);
		assert!(matches!(
			prb.add_clique(&[(c, true), (x, true)]),
			Err(VarError::NotBinary(_))
		));
	}

	#[test]
	fn test_implication_implied_by_global_bound() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Integer, 0.0, 10.0, 0.0);
		assert_eq!(prb.tighten_lb_global(y, 5.0), Ok(Tightening::Tightened));

		let out = prb
			.add_implication(x, true, y, BoundType::Lower, 3.0, true)
			.unwrap();
		assert!(!out.infeasible);
		assert_eq!(out.n_bound_changes, 0);
		assert!(prb.var(x).implications().is_empty());
		assert!(prb.var(x).implications().get(true).is_empty());
		assert!(!prb.has_implication(x, true, y, BoundType::Lower));
		assert!(prb.var(y).implied_by.is_empty());
		assert_eq!(prb.statistics().n_implications(), 0);
		assert_eq!((prb.lb_global(x), prb.ub_global(x)), (0.0, 1.0));
		assert_eq!(prb.lb_global(y), 5.0);
	}

	#[test]
	fn test_implication_redundancy() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Integer, 0.0, 10.0, 0.0);
		let out = prb
			.add_implication(x, true, y, BoundType::Upper, 5.0, false)
			.unwrap();
		assert_eq!(out.n_bound_changes, 0);
		assert_eq!(prb.var(x).implications().len(), 1);

		// no longer tighter than the global bound
		assert!(prb.tighten_ub_global(y, 4.0).is_ok());
		assert!(prb.var(x).implications().is_empty());
		assert!(prb.var(y).implied_by.is_empty());

		// contradicting the global bounds fixes the literal
		let out = prb
			.add_implication(x, true, y, BoundType::Lower, 7.0, false)
			.unwrap();
		assert_eq!(out.n_bound_changes, 1);
		assert_eq!(prb.ub_global(x), 0.0);
	}

	#[test]
	fn test_binary_implication_stores_contrapositive() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let _ = prb
			.add_implication(x, true, y, BoundType::Lower, 1.0, false)
			.unwrap();
		let inv = prb
			.var(y)
			.implications()
			.find(false, x, BoundType::Upper)
			.map(|imp| imp.bound());
		assert_eq!(inv, Some(0.0));
		assert!(prb.has_implication(x, true, y, BoundType::Lower));
		let ny = prb.negate(y).unwrap();
		assert!(prb.has_implication(x, true, ny, BoundType::Upper));
		assert!(!prb.has_implication(x, false, y, BoundType::Lower));
		assert!(prb.have_common_clique(x, true, y, false, true));
		assert!(!prb.have_common_clique(x, true, y, false, false));

		// opposite implications of the same literal fix it
		let out = prb
			.add_implication(x, true, y, BoundType::Upper, 0.0, false)
			.unwrap();
		assert_eq!(out.n_bound_changes, 1);
		assert_eq!(prb.ub_global(x), 0.0);
		assert!(prb.var(y).implications().is_empty());
	}

	#[test]
	fn test_transitive_implications() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Binary, 0.0, 1.0, 0.0);
		let y = prb.add_var("y", VarType::Binary, 0.0, 1.0, 0.0);
		let z = prb.add_var("z", VarType::Continuous, 0.0, 10.0, 0.0);
		let _ = prb
			.add_implication(y, true, z, BoundType::Upper, 3.0, false)
			.unwrap();
		let _ = prb
			.add_implication(x, true, y, BoundType::Lower, 1.0, true)
			.unwrap();
		let derived = prb
			.var(x)
			.implications()
			.find(true, z, BoundType::Upper)
			.map(|imp| imp.bound());
		assert_eq!(derived, Some(3.0));
	}

	#[test]
	fn test_variable_bounds() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let z = prb.add_var("z", VarType::Continuous, 0.0, 4.0, 0.0);
		// x <= 2 z + 1
		let out = prb.add_vub(x, z, 2.0, 1.0).unwrap();
		assert!(!out.infeasible);
		assert_eq!(prb.ub_global(x), 9.0);
		let vub = prb.var(x).vubs().find(z).map(|vb| (vb.coef(), vb.constant()));
		assert_eq!(vub, Some((2.0, 1.0)));
		// mirrored as z >= 0.5 x - 0.5
		let mirror = prb.var(z).vlbs().find(x).map(|vb| (vb.coef(), vb.constant()));
		assert_eq!(mirror, Some((0.5, -0.5)));

		// a weaker bound is ignored, a dominating one replaces it
		let _ = prb.add_vub(x, z, 2.0, 2.0).unwrap();
		assert_eq!(prb.var(x).vubs().find(z).map(|vb| vb.constant()), Some(1.0));
		let _ = prb.add_vub(x, z, 2.0, 0.5).unwrap();
		assert_eq!(prb.var(x).vubs().find(z).map(|vb| vb.constant()), Some(0.5));

		// raising the bounding variable makes the relation redundant
		assert!(prb.tighten_lb_global(z, 4.0).is_ok());
		assert!(prb.var(x).vubs().is_empty());
		assert!(prb.var(z).vlbs().is_empty());
	}

	#[test]
	fn test_binary_bounding_variable_becomes_implication() {
		let mut prb = Problem::default();
		let x = prb.add_var("x", VarType::Continuous, 0.0, 10.0, 0.0);
		let b = prb.add_var("b", VarType::Binary, 0.0, 1.0, 0.0);
		// x <= 10 b
		let _ = prb.add_vub(x, b, 10.0, 0.0).unwrap();
		assert!(prb.var(x).vubs().is_empty());
		let imp = prb
			.var(b)
			.implications()
			.find(false, x, BoundType::Upper)
			.map(|imp| imp.bound());
		assert_eq!(imp, Some(0.0));
	}
}
