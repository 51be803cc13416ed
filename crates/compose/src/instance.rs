use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::class::CompiledClass;
use crate::error::ComposeError;
use crate::value::Value;

/// One live object created from a compiled class.
///
/// Cheap to clone; clones share the same identity and state. Lifecycle is
/// allocated, then initialized exactly once by [`Definition::instantiate`]
/// before the caller ever observes the value; there is no way to run the
/// initializer a second time through this type.
///
/// [`Definition::instantiate`]: crate::definition::Definition::instantiate
#[derive(Clone)]
pub struct Instance {
	inner: Arc<InstanceInner>,
}

struct InstanceInner {
	class: Arc<CompiledClass>,
	state: Mutex<FxHashMap<&'static str, Value>>,
}

impl Instance {
	pub(crate) fn allocate(class: Arc<CompiledClass>) -> Self {
		Self {
			inner: Arc::new(InstanceInner {
				class,
				state: Mutex::new(FxHashMap::default()),
			}),
		}
	}

	/// Returns the compiled class this instance was created from.
	pub fn class(&self) -> &Arc<CompiledClass> {
		&self.inner.class
	}

	/// Dispatches `op` through the compiled operation table.
	pub fn call(&self, op: &str, args: &[Value]) -> Result<Value, ComposeError> {
		let Some(f) = self.inner.class.op(op) else {
			return Err(ComposeError::UnknownOp {
				class: self.inner.class.name().to_string(),
				op: op.to_string(),
			});
		};
		f(self, args)
	}

	/// Returns a copy of one state field.
	///
	/// The state lock is released before returning, so operation bodies may
	/// freely call back into this instance or into others.
	pub fn get(&self, key: &str) -> Option<Value> {
		self.inner.state.lock().get(key).cloned()
	}

	/// Stores one state field.
	pub fn set(&self, key: &'static str, value: impl Into<Value>) {
		self.inner.state.lock().insert(key, value.into());
	}

	/// Returns one state field as a boolean.
	pub fn get_bool(&self, key: &str) -> Option<bool> {
		self.get(key).and_then(|v| v.as_bool())
	}

	/// Returns one state field as an integer.
	pub fn get_int(&self, key: &str) -> Option<i64> {
		self.get(key).and_then(|v| v.as_int())
	}

	/// Returns one state field as a number.
	pub fn get_f64(&self, key: &str) -> Option<f64> {
		self.get(key).and_then(|v| v.as_f64())
	}

	/// Returns one state field as an owned string.
	pub fn get_str(&self, key: &str) -> Option<String> {
		self.get(key).and_then(|v| v.as_str().map(str::to_owned))
	}

	/// Returns one state field as an owned list.
	pub fn get_list(&self, key: &str) -> Option<Vec<Value>> {
		self.get(key).and_then(|v| v.as_list().map(<[Value]>::to_vec))
	}

	/// Returns one state field as an instance reference.
	pub fn get_object(&self, key: &str) -> Option<Instance> {
		self.get(key).and_then(|v| v.as_object().cloned())
	}
}

impl PartialEq for Instance {
	fn eq(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl Eq for Instance {}

impl fmt::Debug for Instance {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut keys: Vec<&'static str> = self.inner.state.lock().keys().copied().collect();
		keys.sort_unstable();
		f.debug_struct("Instance")
			.field("class", &self.inner.class.name())
			.field("state", &keys)
			.finish()
	}
}
