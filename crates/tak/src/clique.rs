//! Cliques: sets of binary literals of which at most one may hold.

use index_vec::IndexVec;

use crate::VarRef;

index_vec::define_index_type! {
	/// Identifies a clique in the clique table of a [`crate::Problem`].
	pub struct CliqueRef = u32;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// A set of (binary variable, value) literals, of which at most one holds in
/// any feasible solution.
pub struct Clique {
	/// The literals, sorted by variable and value.
	literals: Vec<(VarRef, bool)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Storage of all cliques. Removed cliques leave an empty slot, so that
/// [`CliqueRef`] handles stay valid.
pub(crate) struct CliqueTable {
	/// The cliques, `None` once removed.
	cliques: IndexVec<CliqueRef, Option<Clique>>,
}

impl Clique {
	/// Create a clique from a list of literals.
	pub(crate) fn new(mut literals: Vec<(VarRef, bool)>) -> Self {
		literals.sort_unstable();
		literals.dedup();
		Self { literals }
	}

	/// The literals of the clique.
	pub fn literals(&self) -> &[(VarRef, bool)] {
		&self.literals
	}

	/// Returns whether the clique contains the literal.
	pub fn contains(&self, var: VarRef, value: bool) -> bool {
		self.literals.binary_search(&(var, value)).is_ok()
	}

	/// The number of literals in the clique.
	pub fn len(&self) -> usize {
		self.literals.len()
	}

	/// Returns whether the clique contains no literals.
	pub fn is_empty(&self) -> bool {
		self.literals.is_empty()
	}

	/// Add a literal to the clique. Returns whether it was not yet contained.
	pub(crate) fn insert(&mut self, var: VarRef, value: bool) -> bool {
		match self.literals.binary_search(&(var, value)) {
			Ok(_) => false,
			Err(i) => {
				self.literals.insert(i, (var, value));
				true
			}
		}
	}

	/// Remove a literal from the clique. Returns whether it was contained.
	pub(crate) fn remove(&mut self, var: VarRef, value: bool) -> bool {
		match self.literals.binary_search(&(var, value)) {
			Ok(i) => {
				let _ = self.literals.remove(i);
				true
			}
			Err(_) => false,
		}
	}
}

impl CliqueTable {
	/// Store a new clique.
	pub(crate) fn push(&mut self, clique: Clique) -> CliqueRef {
		self.cliques.push(Some(clique))
	}

	/// Access a clique that has not been removed.
	pub(crate) fn get(&self, cref: CliqueRef) -> Option<&Clique> {
		self.cliques.get(cref).and_then(Option::as_ref)
	}

	/// Mutably access a clique that has not been removed.
	pub(crate) fn get_mut(&mut self, cref: CliqueRef) -> Option<&mut Clique> {
		self.cliques.get_mut(cref).and_then(Option::as_mut)
	}

	/// Remove a clique from the table.
	pub(crate) fn remove(&mut self, cref: CliqueRef) -> Option<Clique> {
		self.cliques.get_mut(cref).and_then(Option::take)
	}

	/// Iterate over the cliques that have not been removed.
	pub(crate) fn iter(&self) -> impl Iterator<Item = (CliqueRef, &Clique)> + '_ {
		self.cliques
			.iter_enumerated()
			.filter_map(|(cref, c)| c.as_ref().map(|c| (cref, c)))
	}

	/// The number of cliques that have not been removed.
	pub(crate) fn len(&self) -> usize {
		self.cliques.iter().filter(|c| c.is_some()).count()
	}
}

#[cfg(test)]
mod tests {
	use crate::{
		clique::{Clique, CliqueTable},
		VarRef,
	};

	#[test]
	fn test_clique_literals() {
		let x = VarRef::new(0);
		let y = VarRef::new(1);
		let mut clique = Clique::new(vec![(y, true), (x, true), (y, true)]);
		assert_eq!(clique.literals(), &[(x, true), (y, true)]);
		assert!(clique.insert(x, false));
		assert!(!clique.insert(x, false));
		assert_eq!(clique.literals(), &[(x, false), (x, true), (y, true)]);
		assert!(clique.remove(y, true));
		assert!(!clique.contains(y, true));
		assert_eq!(clique.len(), 2);
	}

	#[test]
	fn test_table_handles_stay_valid() {
		let mut table = CliqueTable::default();
		let a = table.push(Clique::new(vec![(VarRef::new(0), true)]));
		let b = table.push(Clique::new(vec![(VarRef::new(1), true)]));
		assert!(table.remove(a).is_some());
		assert!(table.remove(a).is_none());
		assert!(table.get(b).is_some());
		assert_eq!(table.len(), 1);
		assert_eq!(table.iter().map(|(c, _)| c).collect::<Vec<_>>(), vec![b]);
	}
}
