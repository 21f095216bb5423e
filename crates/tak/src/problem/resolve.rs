//! Resolution of variables to the variables that represent them in the
//! transformed problem.

use itertools::Itertools;

use crate::{
	helpers::linear_transform::LinearTransform, var::VarStatus, BoundType, Problem, VarRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The binary literal that a `(variable, value)` pair resolves to.
pub enum Literal {
	/// The pair is equivalent to an active binary variable taking the given
	/// value.
	Var(VarRef, bool),
	/// The pair is known to be true or false, because the variable is fixed.
	Fixed(bool),
}

impl Problem {
	/// Internal method to follow the chain of transformed, aggregated and negated
	/// variables, returning the variable at its end and the affine map from that
	/// variable to `var`.
	///
	/// The chain ends at an active, fixed or multi-aggregated variable, or at an
	/// original variable that has not been transformed.
	pub(crate) fn resolve(&self, var: VarRef) -> (VarRef, LinearTransform) {
		let mut var = var;
		let mut transform = LinearTransform::default();
		let mut steps = 0;
		loop {
			match &self.vars[var].status {
				VarStatus::Original {
					transformed: Some(t),
				} => var = *t,
				VarStatus::Aggregated { var: y, transform: t } => {
					transform = transform.after(t);
					var = *y;
				}
				VarStatus::Negated { var: y, constant } => {
					transform = transform.after(&LinearTransform::negation(*constant));
					var = *y;
				}
				_ => return (var, transform),
			}
			steps += 1;
			debug_assert!(steps <= self.vars.len(), "cyclic variable resolution");
		}
	}

	/// Resolve a variable to the variable that represents it, returning the
	/// representative together with the scalar and constant such that `var =
	/// scalar * representative + constant`.
	///
	/// Fixed and multi-aggregated variables are returned as they are; their
	/// value is not folded into the constant.
	pub fn probvar_sum(&self, var: VarRef) -> (VarRef, f64, f64) {
		let (y, t) = self.resolve(var);
		(y, t.scale, t.offset)
	}

	/// Resolve a variable to its representative, ignoring the affine map between
	/// them.
	pub fn probvar(&self, var: VarRef) -> VarRef {
		self.resolve(var).0
	}

	/// Resolve a bound on a variable to the equivalent bound on its
	/// representative. The bound type is exchanged when the representative
	/// appears with a negative scalar.
	pub fn probvar_bound(
		&self,
		var: VarRef,
		bound: f64,
		bound_type: BoundType,
	) -> (VarRef, f64, BoundType) {
		let (y, t) = self.resolve(var);
		let (b, bt) = t.rev_transform_bound(bound, bound_type);
		(y, self.config.normalize(b), bt)
	}

	/// Resolve a binary variable to its representative, returning whether `var`
	/// is the negation of the representative.
	///
	/// Returns `None` when `var` is not equivalent to a binary representative or
	/// to its negation.
	pub fn probvar_binary(&self, var: VarRef) -> Option<(VarRef, bool)> {
		let (y, t) = self.resolve(var);
		if !self.vars[y].is_binary() {
			return None;
		}
		if self.config.is_eq(t.scale, 1.0) && self.config.is_zero(t.offset) {
			Some((y, false))
		} else if self.config.is_eq(t.scale, -1.0) && self.config.is_eq(t.offset, 1.0) {
			Some((y, true))
		} else {
			None
		}
	}

	/// Resolve the statement `var = value` for a binary variable to a literal on
	/// an active binary variable, or to a constant when the variable is fixed.
	///
	/// Returns `None` when the representative is not binary.
	pub fn literal(&self, var: VarRef, value: bool) -> Option<Literal> {
		let (y, t) = self.resolve(var);
		let target = t.rev_transform(if value { 1.0 } else { 0.0 });
		let x = &self.vars[y];
		match x.status {
			VarStatus::Fixed => Some(Literal::Fixed(
				self.config.is_feas_eq(x.glb_dom.lb, target),
			)),
			VarStatus::MultiAggregated { .. } => None,
			_ if !x.is_binary() => None,
			_ if self.config.is_feas_eq(x.glb_dom.lb, x.glb_dom.ub) => Some(Literal::Fixed(
				self.config.is_feas_eq(x.glb_dom.lb, target),
			)),
			_ if self.config.is_feas_eq(target, 1.0) => Some(Literal::Var(y, true)),
			_ if self.config.is_feas_eq(target, 0.0) => Some(Literal::Var(y, false)),
			_ => None,
		}
	}

	/// Express the linear sum `sum(terms) + constant` in terms of active
	/// variables only.
	///
	/// Multi-aggregated variables are expanded, fixed variables are folded into
	/// the constant, duplicate variables are merged, and terms with a zero
	/// coefficient are removed. The returned terms are sorted by variable.
	pub fn flatten_linear_sum(&self, terms: &[(VarRef, f64)], constant: f64) -> (Vec<(VarRef, f64)>, f64) {
		let mut constant = constant;
		let mut collected = Vec::with_capacity(terms.len());
		let mut stack = terms.to_vec();
		while let Some((var, scalar)) = stack.pop() {
			let (y, t) = self.resolve(var);
			constant += scalar * t.offset;
			let scalar = scalar * t.scale;
			match &self.vars[y].status {
				VarStatus::Fixed => constant += scalar * self.vars[y].glb_dom.lb,
				VarStatus::MultiAggregated {
					vars,
					scalars,
					constant: c,
				} => {
					constant += scalar * c;
					stack.extend(vars.iter().zip(scalars).map(|(&v, &a)| (v, scalar * a)));
				}
				_ => collected.push((y, scalar)),
			}
		}
		let terms = collected
			.into_iter()
			.sorted_by_key(|&(v, _)| v)
			.coalesce(|(v, a), (w, b)| if v == w { Ok((v, a + b)) } else { Err(((v, a), (w, b))) })
			.filter(|&(_, a)| !self.config.is_zero(a))
			.collect();
		(terms, constant)
	}
}
