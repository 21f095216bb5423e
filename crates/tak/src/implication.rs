//! Storage of the derived relations between variables: variable bounds and
//! implications.
//!
//! The lists in this module only store and look up entries. Deciding whether
//! an entry is redundant or contradicts the known bounds is the
//! responsibility of [`crate::Problem`], which has access to the domains of
//! all variables involved.

use crate::{BoundType, VarRef};

#[derive(Debug, Clone, Copy, PartialEq)]
/// A variable bound `x >= coef * var + constant` (when stored as a variable
/// lower bound of `x`) or `x <= coef * var + constant` (when stored as a
/// variable upper bound of `x`).
pub struct VarBound {
	/// The bounding variable.
	pub(crate) var: VarRef,
	/// The coefficient of the bounding variable.
	pub(crate) coef: f64,
	/// The constant of the bound.
	pub(crate) constant: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// A list of variable bounds, sorted by bounding variable, with at most one
/// entry per bounding variable.
pub struct VarBounds {
	/// The entries in the list.
	entries: Vec<VarBound>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// An implication `x = value => var <= bound` or `x = value => var >= bound`,
/// stored as part of the [`Implications`] of `x`.
pub struct Implication {
	/// The implied variable.
	pub(crate) var: VarRef,
	/// Whether a lower or an upper bound is implied.
	pub(crate) bound_type: BoundType,
	/// The implied bound.
	pub(crate) bound: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
/// The implications of a binary variable for both of its values, each sorted
/// by implied variable and bound type.
pub struct Implications {
	/// The implications when the variable is fixed to `false` (index 0) or
	/// `true` (index 1).
	entries: [Vec<Implication>; 2],
}

impl VarBound {
	/// The bounding variable.
	pub fn var(&self) -> VarRef {
		self.var
	}

	/// The coefficient of the bounding variable.
	pub fn coef(&self) -> f64 {
		self.coef
	}

	/// The constant of the bound.
	pub fn constant(&self) -> f64 {
		self.constant
	}
}

impl VarBounds {
	/// Find the entry for the given bounding variable.
	pub fn find(&self, var: VarRef) -> Option<&VarBound> {
		self.entries
			.binary_search_by_key(&var, |vb| vb.var)
			.ok()
			.map(|i| &self.entries[i])
	}

	/// Insert a new entry, replacing and returning any existing entry for the
	/// same bounding variable.
	pub(crate) fn insert(&mut self, vb: VarBound) -> Option<VarBound> {
		match self.entries.binary_search_by_key(&vb.var, |e| e.var) {
			Ok(i) => Some(std::mem::replace(&mut self.entries[i], vb)),
			Err(i) => {
				self.entries.insert(i, vb);
				None
			}
		}
	}

	/// Remove the entry for the given bounding variable.
	pub(crate) fn remove(&mut self, var: VarRef) -> Option<VarBound> {
		self.entries
			.binary_search_by_key(&var, |vb| vb.var)
			.ok()
			.map(|i| self.entries.remove(i))
	}

	/// Remove and return all entries.
	pub(crate) fn take(&mut self) -> Vec<VarBound> {
		std::mem::take(&mut self.entries)
	}

	/// Iterate over the entries in order of bounding variable.
	pub fn iter(&self) -> impl Iterator<Item = &VarBound> + '_ {
		self.entries.iter()
	}

	/// The number of entries.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	/// Returns whether the list contains no entries.
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}

impl Implication {
	/// The implied variable.
	pub fn var(&self) -> VarRef {
		self.var
	}

	/// Whether a lower or upper bound is implied.
	pub fn bound_type(&self) -> BoundType {
		self.bound_type
	}

	/// The implied bound.
	pub fn bound(&self) -> f64 {
		self.bound
	}

	/// Ordering key used to sort the implications of a variable.
	fn key(&self) -> (VarRef, usize) {
		(self.var, self.bound_type.index())
	}
}

impl Implications {
	/// The implications triggered when the variable takes the given value.
	pub fn get(&self, value: bool) -> &[Implication] {
		&self.entries[usize::from(value)]
	}

	/// Find the implication on `var` of the given bound type triggered by the
	/// given value.
	pub fn find(&self, value: bool, var: VarRef, bound_type: BoundType) -> Option<&Implication> {
		let list = self.get(value);
		Self::position(list, var, bound_type)
			.ok()
			.map(|i| &list[i])
	}

	/// Insert an implication, replacing and returning an existing implication on
	/// the same variable and bound type.
	pub(crate) fn insert(&mut self, value: bool, imp: Implication) -> Option<Implication> {
		let list = &mut self.entries[usize::from(value)];
		match Self::position(list, imp.var, imp.bound_type) {
			Ok(i) => Some(std::mem::replace(&mut list[i], imp)),
			Err(i) => {
				list.insert(i, imp);
				None
			}
		}
	}

	/// Remove the implication on `var` of the given bound type triggered by the
	/// given value.
	pub(crate) fn remove(
		&mut self,
		value: bool,
		var: VarRef,
		bound_type: BoundType,
	) -> Option<Implication> {
		let list = &mut self.entries[usize::from(value)];
		Self::position(list, var, bound_type)
			.ok()
			.map(|i| list.remove(i))
	}

	/// Remove and return all implications triggered by the given value.
	pub(crate) fn take(&mut self, value: bool) -> Vec<Implication> {
		std::mem::take(&mut self.entries[usize::from(value)])
	}

	/// The total number of implications for both values.
	pub fn len(&self) -> usize {
		self.entries[0].len() + self.entries[1].len()
	}

	/// Returns whether there are no implications.
	pub fn is_empty(&self) -> bool {
		self.entries.iter().all(Vec::is_empty)
	}

	/// Internal method to locate an implication using binary search.
	fn position(list: &[Implication], var: VarRef, bound_type: BoundType) -> Result<usize, usize> {
		let key = (var, bound_type.index());
		list.binary_search_by(|imp| imp.key().cmp(&key))
	}
}
