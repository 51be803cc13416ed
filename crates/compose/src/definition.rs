use std::fmt;
use std::sync::Arc;

use crate::class::{CompiledClass, OpSet};
use crate::error::ComposeError;
use crate::instance::Instance;
use crate::registry::{ClassId, Registry};
use crate::value::Value;

/// Zero-argument producer of a canonical, unextended implementation.
///
/// Clones share identity. Identity, not name, is the authority for merge
/// validation: two definitions may be merged exactly when they were declared
/// from clones of the same factory.
///
/// Structure-pure: every invocation must yield an independent but
/// behaviorally-identical operation set. Mutable state belongs to instances,
/// never to the factory.
#[derive(Clone)]
pub struct BaseFactory {
	inner: Arc<dyn Fn() -> OpSet + Send + Sync>,
}

impl BaseFactory {
	/// Wraps a factory closure.
	pub fn new(f: impl Fn() -> OpSet + Send + Sync + 'static) -> Self {
		Self { inner: Arc::new(f) }
	}

	pub(crate) fn produce(&self) -> OpSet {
		(self.inner)()
	}

	/// Returns the opaque identity token of this factory.
	pub fn identity(&self) -> BaseIdentity {
		BaseIdentity(Arc::as_ptr(&self.inner) as *const () as usize)
	}
}

impl fmt::Debug for BaseFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "BaseFactory({:#x})", self.identity().0)
	}
}

/// Opaque identity token of a base factory allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BaseIdentity(usize);

/// Handle to one registered class: the facade a consumer holds to compile,
/// instantiate, identity-check, extend, or merge.
///
/// Exactly one underlying entry exists per identifier. [`Definition::extend`]
/// returns a handle to the *same* entry (extension never creates a new
/// identifier), and two handles compare equal exactly when they refer to one
/// entry.
#[derive(Clone)]
pub struct Definition {
	registry: Registry,
	id: ClassId,
}

impl Definition {
	pub(crate) fn new(registry: Registry, id: ClassId) -> Self {
		Self { registry, id }
	}

	/// Returns the declared name, if the identifier was a name.
	pub fn name(&self) -> Option<&'static str> {
		self.registry.entry_name(self.id)
	}

	/// Returns the identity token of this definition's base factory.
	pub fn identity(&self) -> BaseIdentity {
		self.registry.base_identity(self.id)
	}

	/// Returns the registry this definition lives in.
	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	/// Folds the pending chain into the compiled class, memoizing the
	/// result.
	///
	/// Identity-stable: repeated calls return the same `Arc`. The first call
	/// freezes this chain (and, for a merged chain, the parent chains it
	/// consumed) for the rest of the process lifetime.
	pub fn compile(&self) -> Arc<CompiledClass> {
		self.registry.compile(self.id)
	}

	/// Allocates a bare instance of the compiled class, then runs its
	/// initializer with `args`.
	///
	/// Allocation and initialization always happen together here, so callers
	/// never observe an allocated-but-uninitialized instance; the
	/// initializer is the single customization point layers override.
	pub fn instantiate(&self, args: &[Value]) -> Result<Instance, ComposeError> {
		let class = self.compile();
		let instance = Instance::allocate(class.clone());
		(class.init())(&instance, args)?;
		Ok(instance)
	}

	/// Returns true if `value` holds an instance of this definition's
	/// compiled class, or of a class derived from it.
	///
	/// Evaluated against the *current* compiled result; compiles (and
	/// freezes) on demand, so calling this before any instantiation works.
	pub fn is_instance(&self, value: &Value) -> bool {
		// Compile before matching: the freeze side effect applies even when
		// the value cannot possibly be an instance.
		let class = self.compile();
		match value {
			Value::Object(instance) => instance.class().lineage_contains(&class),
			_ => false,
		}
	}

	/// Instance form of [`Definition::is_instance`].
	pub fn has_instance(&self, instance: &Instance) -> bool {
		instance.class().lineage_contains(&self.compile())
	}

	/// Appends one mixin layer to this definition's chain.
	///
	/// Returns a handle to the same entry, now also understood to satisfy
	/// whatever the layer added. Fails with [`ComposeError::Frozen`] once
	/// the chain has compiled.
	pub fn extend(
		&self,
		layer: impl Fn(OpSet) -> OpSet + Send + Sync + 'static,
	) -> Result<Definition, ComposeError> {
		self.registry.append_layer(self.id, Arc::new(layer))?;
		Ok(self.clone())
	}

	/// Combines this chain with a sibling chain built on the identical base.
	///
	/// The merged definition folds the base, then this chain, then `other`'s
	/// (swap receiver and argument for the opposite order), then its own
	/// layers; both parent chains are read live until the merged chain
	/// compiles, which freezes them. Layers appended to the merged
	/// definition stay on it; they never leak into either parent.
	pub fn merge(&self, other: &Definition) -> Result<Definition, ComposeError> {
		if !self.registry.same_context(&other.registry) {
			return Err(ComposeError::ForeignDefinition {
				left: self.display_name(),
				right: other.display_name(),
			});
		}
		if self.identity() != other.identity() {
			return Err(ComposeError::IncompatibleBase {
				left: self.display_name(),
				right: other.display_name(),
			});
		}
		Ok(self.registry.merge_entries(self.id, other.id))
	}

	fn display_name(&self) -> String {
		self.registry.display_name(self.id)
	}
}

impl PartialEq for Definition {
	fn eq(&self, other: &Self) -> bool {
		self.registry.same_context(&other.registry) && self.id == other.id
	}
}

impl Eq for Definition {}

impl fmt::Debug for Definition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Definition")
			.field("name", &self.name())
			.field("id", &self.id)
			.finish()
	}
}
