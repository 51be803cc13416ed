//! Operation sets and compiled classes.
//!
//! An [`OpSet`] is one stage of an implementation: an initializer plus a
//! name-keyed table of operations. Layers transform an `OpSet` into the next
//! stage; the fold's final stage is published as an immutable
//! [`CompiledClass`]. The contract a class satisfies is exactly its
//! operation names: layers may add operations and may override existing
//! ones, but are expected never to remove any.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::ComposeError;
use crate::instance::Instance;
use crate::value::Value;

/// Operation body: receives the instance and the call arguments.
pub type OpFn = dyn Fn(&Instance, &[Value]) -> Result<Value, ComposeError> + Send + Sync;

/// Initializer body: populates freshly-allocated state from construction
/// arguments.
pub type InitFn = dyn Fn(&Instance, &[Value]) -> Result<(), ComposeError> + Send + Sync;

/// Shared handle to one operation implementation.
pub type Op = Arc<OpFn>;

/// Shared handle to one initializer implementation.
pub type Init = Arc<InitFn>;

/// The operation set of one implementation stage.
///
/// A layer receives the previous stage's set, overrides or adds operations,
/// and returns the new set. Overriding an operation while keeping the
/// previous behavior reachable is the override-and-delegate pattern:
/// [`OpSet::wrap`] hands the replacement the previous implementation as a
/// delegate.
#[derive(Clone)]
pub struct OpSet {
	init: Init,
	ops: FxHashMap<&'static str, Op>,
	derived_from: Option<Arc<CompiledClass>>,
}

impl OpSet {
	/// Creates an empty set with a no-op initializer.
	pub fn new() -> Self {
		Self {
			init: Arc::new(|_, _| Ok(())),
			ops: FxHashMap::default(),
			derived_from: None,
		}
	}

	/// Seeds a set from an already-compiled class, recording the derivation.
	///
	/// Instances of the resulting class also satisfy identity checks against
	/// the class it derives from.
	pub fn extending(class: &Arc<CompiledClass>) -> Self {
		Self {
			init: class.init.clone(),
			ops: class.ops.clone(),
			derived_from: Some(class.clone()),
		}
	}

	/// Returns the current implementation of `name`, if any.
	pub fn op(&self, name: &str) -> Option<Op> {
		self.ops.get(name).cloned()
	}

	/// Adds or overrides an operation.
	pub fn define(
		&mut self,
		name: &'static str,
		f: impl Fn(&Instance, &[Value]) -> Result<Value, ComposeError> + Send + Sync + 'static,
	) {
		self.ops.insert(name, Arc::new(f));
	}

	/// Overrides `name`, handing the replacement the previous implementation
	/// as a delegate.
	///
	/// When no previous implementation exists the delegate reports
	/// [`ComposeError::UnknownOp`], so a layer may wrap optimistically.
	pub fn wrap(
		&mut self,
		name: &'static str,
		f: impl Fn(&Op, &Instance, &[Value]) -> Result<Value, ComposeError> + Send + Sync + 'static,
	) {
		let prev = self.op(name).unwrap_or_else(|| missing_op(name));
		self.define(name, move |instance, args| f(&prev, instance, args));
	}

	/// Returns the current initializer.
	pub fn init(&self) -> Init {
		self.init.clone()
	}

	/// Replaces the initializer.
	pub fn set_init(
		&mut self,
		f: impl Fn(&Instance, &[Value]) -> Result<(), ComposeError> + Send + Sync + 'static,
	) {
		self.init = Arc::new(f);
	}

	/// Replaces the initializer, handing the replacement the previous one as
	/// a delegate. Wrapping at every layer forms the delegation chain that
	/// mirrors extension order.
	pub fn wrap_init(
		&mut self,
		f: impl Fn(&Init, &Instance, &[Value]) -> Result<(), ComposeError> + Send + Sync + 'static,
	) {
		let prev = self.init();
		self.init = Arc::new(move |instance, args| f(&prev, instance, args));
	}

	/// Returns true if `name` is defined.
	pub fn has_op(&self, name: &str) -> bool {
		self.ops.contains_key(name)
	}

	/// Returns the defined operation names, sorted.
	pub fn op_names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.ops.keys().copied().collect();
		names.sort_unstable();
		names
	}
}

impl Default for OpSet {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for OpSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OpSet")
			.field("ops", &self.op_names())
			.field("derived_from", &self.derived_from.as_ref().map(|c| c.name()))
			.finish()
	}
}

fn missing_op(name: &'static str) -> Op {
	Arc::new(move |instance, _| {
		Err(ComposeError::UnknownOp {
			class: instance.class().name().to_string(),
			op: name.to_string(),
		})
	})
}

/// The memoized product of folding a definition's layers over its base.
///
/// Published behind an `Arc`; the pointer is the identity that instance
/// checks compare against.
pub struct CompiledClass {
	name: String,
	init: Init,
	ops: FxHashMap<&'static str, Op>,
	parent: Option<Arc<CompiledClass>>,
}

impl CompiledClass {
	pub(crate) fn from_set(name: String, set: OpSet) -> Self {
		Self {
			name,
			init: set.init,
			ops: set.ops,
			parent: set.derived_from,
		}
	}

	/// Returns the display name of this class.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the implementation of `name`, if defined.
	pub fn op(&self, name: &str) -> Option<Op> {
		self.ops.get(name).cloned()
	}

	/// Returns true if `name` is defined.
	pub fn has_op(&self, name: &str) -> bool {
		self.ops.contains_key(name)
	}

	/// Returns the defined operation names, sorted.
	pub fn op_names(&self) -> Vec<&'static str> {
		let mut names: Vec<_> = self.ops.keys().copied().collect();
		names.sort_unstable();
		names
	}

	/// Returns the initializer.
	pub fn init(&self) -> Init {
		self.init.clone()
	}

	/// Returns true if `target` is this class or appears in its derivation
	/// chain.
	pub fn lineage_contains(self: &Arc<Self>, target: &Arc<CompiledClass>) -> bool {
		let mut current = Arc::clone(self);
		loop {
			if Arc::ptr_eq(&current, target) {
				return true;
			}
			let Some(parent) = current.parent.clone() else {
				return false;
			};
			current = parent;
		}
	}
}

impl fmt::Debug for CompiledClass {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("CompiledClass")
			.field("name", &self.name)
			.field("ops", &self.op_names())
			.field("parent", &self.parent.as_ref().map(|c| c.name()))
			.finish()
	}
}
