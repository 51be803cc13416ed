//! Declaration storage and the lazy fold.
//!
//! # Role
//!
//! The registry owns every declared class entry: its base factory, its
//! ordered layer list, its merge parents, and the memoized compiled class.
//! Layer lists are read live at compile time, so everything registered
//! between declaration and first compile is folded.
//!
//! # Invariants
//!
//! - Entries are never removed; a [`ClassId`] stays valid for the registry's
//!   lifetime.
//! - Once an entry's chain has been folded, the entry (and every entry whose
//!   chain the fold consumed) is frozen: later layer registrations fail with
//!   [`ComposeError::Frozen`] instead of becoming silently inert.
//! - The fold runs with no lock held; base factories may re-enter the
//!   registry (a derived base compiling the class it builds on). The publish
//!   step re-checks the cache so the first published class keeps its
//!   identity even if a fold raced.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::class::{CompiledClass, OpSet};
use crate::definition::{BaseFactory, BaseIdentity, Definition};
use crate::error::ComposeError;

/// Dense identifier of one registered class entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassId(pub(crate) u32);

impl ClassId {
	fn index(self) -> usize {
		self.0 as usize
	}
}

/// One mixin layer: receives the previous stage's operation set, returns the
/// next stage's.
pub(crate) type Layer = Arc<dyn Fn(OpSet) -> OpSet + Send + Sync>;

struct ClassEntry {
	name: Option<&'static str>,
	base: BaseFactory,
	/// Chains folded before this entry's own layers (merge sources).
	parents: Vec<ClassId>,
	layers: Vec<Layer>,
	compiled: Option<Arc<CompiledClass>>,
	frozen: bool,
}

#[derive(Default)]
struct RegistryInner {
	entries: Vec<ClassEntry>,
	by_name: FxHashMap<&'static str, ClassId>,
}

impl RegistryInner {
	fn push_entry(&mut self, entry: ClassEntry) -> ClassId {
		let id = ClassId(self.entries.len() as u32);
		self.entries.push(entry);
		id
	}

	fn display_name(&self, id: ClassId) -> String {
		match self.entries[id.index()].name {
			Some(name) => name.to_string(),
			None => format!("#{}", id.0),
		}
	}

	/// Flattens the chain rooted at `id`: parent chains first, own layers
	/// last. `visited` doubles as the set of entries the fold consumes; an
	/// ancestor reachable through both merge parents is folded once, at its
	/// first position.
	fn collect_chain(&self, id: ClassId, visited: &mut Vec<ClassId>, out: &mut Vec<Layer>) {
		if visited.contains(&id) {
			return;
		}
		visited.push(id);
		let entry = &self.entries[id.index()];
		for &parent in &entry.parents {
			self.collect_chain(parent, visited, out);
		}
		out.extend(entry.layers.iter().cloned());
	}
}

/// Storage of class declarations and their pending layer chains.
///
/// An explicit context object rather than ambient process state: cheap to
/// clone (clones share storage), so tests build isolated registries and the
/// application threads one through its registration modules.
///
/// All mutation is expected on one logical thread of control during a
/// registration phase that finishes before the first compile; the locks keep
/// the structure consistent, the freeze flags make violations of that
/// discipline observable.
#[derive(Clone, Default)]
pub struct Registry {
	inner: Arc<RwLock<RegistryInner>>,
}

impl Registry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a new class under `name`.
	pub fn declare(&self, name: &'static str, base: BaseFactory) -> Result<Definition, ComposeError> {
		let mut inner = self.inner.write();
		if inner.by_name.contains_key(name) {
			return Err(ComposeError::DuplicateClass { name });
		}
		let id = inner.push_entry(ClassEntry {
			name: Some(name),
			base,
			parents: Vec::new(),
			layers: Vec::new(),
			compiled: None,
			frozen: false,
		});
		inner.by_name.insert(name, id);
		tracing::debug!(class = name, id = id.0, "class declared");
		Ok(Definition::new(self.clone(), id))
	}

	/// Declares a new class identified only by its handle.
	pub fn declare_unnamed(&self, base: BaseFactory) -> Definition {
		let mut inner = self.inner.write();
		let id = inner.push_entry(ClassEntry {
			name: None,
			base,
			parents: Vec::new(),
			layers: Vec::new(),
			compiled: None,
			frozen: false,
		});
		tracing::debug!(id = id.0, "unnamed class declared");
		Definition::new(self.clone(), id)
	}

	/// Returns the definition declared under `name`, if any.
	pub fn lookup(&self, name: &str) -> Option<Definition> {
		let id = *self.inner.read().by_name.get(name)?;
		Some(Definition::new(self.clone(), id))
	}

	/// Appends a layer to the class declared under `name`.
	///
	/// Name-based and handle-based registration are two views over the same
	/// entry; the returned definition is the one the declarer holds. Fails
	/// with [`ComposeError::UnknownClass`] when no declaration exists; an
	/// implicit empty base is never created.
	pub fn extend(
		&self,
		name: &str,
		layer: impl Fn(OpSet) -> OpSet + Send + Sync + 'static,
	) -> Result<Definition, ComposeError> {
		let Some(id) = self.inner.read().by_name.get(name).copied() else {
			return Err(ComposeError::UnknownClass { name: name.to_string() });
		};
		self.append_layer(id, Arc::new(layer))?;
		Ok(Definition::new(self.clone(), id))
	}

	pub(crate) fn append_layer(&self, id: ClassId, layer: Layer) -> Result<(), ComposeError> {
		let mut inner = self.inner.write();
		let class = inner.display_name(id);
		let entry = &mut inner.entries[id.index()];
		if entry.frozen {
			tracing::warn!(class = %class, "layer registered after compile; chain is frozen");
			return Err(ComposeError::Frozen { class });
		}
		entry.layers.push(layer);
		Ok(())
	}

	/// Creates the merged entry for two chains sharing a base. Preconditions
	/// (same registry, same base identity) are checked by
	/// [`Definition::merge`].
	pub(crate) fn merge_entries(&self, left: ClassId, right: ClassId) -> Definition {
		let mut inner = self.inner.write();
		let base = inner.entries[left.index()].base.clone();
		let id = inner.push_entry(ClassEntry {
			name: None,
			base,
			parents: vec![left, right],
			layers: Vec::new(),
			compiled: None,
			frozen: false,
		});
		tracing::debug!(left = left.0, right = right.0, id = id.0, "chains merged");
		Definition::new(self.clone(), id)
	}

	/// Folds the chain rooted at `id` into its compiled class, memoizing the
	/// result. The first call freezes every entry whose chain the fold
	/// consumed.
	pub(crate) fn compile(&self, id: ClassId) -> Arc<CompiledClass> {
		{
			let inner = self.inner.read();
			if let Some(compiled) = &inner.entries[id.index()].compiled {
				return compiled.clone();
			}
		}

		let (name, base, layers, consumed) = {
			let inner = self.inner.read();
			let mut consumed = Vec::new();
			let mut layers = Vec::new();
			inner.collect_chain(id, &mut consumed, &mut layers);
			(
				inner.display_name(id),
				inner.entries[id.index()].base.clone(),
				layers,
				consumed,
			)
		};

		// User code runs here, unlocked: base factories may compile other
		// definitions (derived bases), layers may capture the registry.
		let mut set = base.produce();
		for layer in &layers {
			set = layer(set);
		}
		let compiled = Arc::new(CompiledClass::from_set(name, set));

		let mut inner = self.inner.write();
		if let Some(existing) = &inner.entries[id.index()].compiled {
			return existing.clone();
		}
		inner.entries[id.index()].compiled = Some(compiled.clone());
		for entry in consumed {
			inner.entries[entry.index()].frozen = true;
		}
		tracing::debug!(class = %compiled.name(), layers = layers.len(), "class compiled");
		compiled
	}

	pub(crate) fn entry_name(&self, id: ClassId) -> Option<&'static str> {
		self.inner.read().entries[id.index()].name
	}

	pub(crate) fn display_name(&self, id: ClassId) -> String {
		self.inner.read().display_name(id)
	}

	pub(crate) fn base_identity(&self, id: ClassId) -> BaseIdentity {
		self.inner.read().entries[id.index()].base.identity()
	}

	pub(crate) fn same_context(&self, other: &Registry) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let inner = self.inner.read();
		f.debug_struct("Registry")
			.field("entries", &inner.entries.len())
			.field("named", &inner.by_name.len())
			.finish()
	}
}
