use crate::error::ComposeError;
use crate::instance::Instance;

/// A dynamic value passed between operations and stored in instance state.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
	/// Absent value.
	Null,
	/// Boolean value.
	Bool(bool),
	/// Integer value.
	Int(i64),
	/// Floating-point value.
	Float(f64),
	/// String value.
	Str(String),
	/// Ordered list of values.
	List(Vec<Value>),
	/// Reference to a live instance. Equality is instance identity.
	Object(Instance),
}

impl Value {
	/// Returns the boolean value if this is a `Bool` variant.
	pub fn as_bool(&self) -> Option<bool> {
		match self {
			Value::Bool(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the integer value if this is an `Int` variant.
	pub fn as_int(&self) -> Option<i64> {
		match self {
			Value::Int(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the numeric value of an `Int` or `Float` variant.
	pub fn as_f64(&self) -> Option<f64> {
		match self {
			Value::Int(v) => Some(*v as f64),
			Value::Float(v) => Some(*v),
			_ => None,
		}
	}

	/// Returns the string slice if this is a `Str` variant.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Value::Str(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the element slice if this is a `List` variant.
	pub fn as_list(&self) -> Option<&[Value]> {
		match self {
			Value::List(v) => Some(v),
			_ => None,
		}
	}

	/// Returns the instance if this is an `Object` variant.
	pub fn as_object(&self) -> Option<&Instance> {
		match self {
			Value::Object(v) => Some(v),
			_ => None,
		}
	}

	/// Returns true for the `Null` variant.
	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null)
	}

	/// Returns the type name of this value.
	pub fn type_name(&self) -> &'static str {
		match self {
			Value::Null => "null",
			Value::Bool(_) => "bool",
			Value::Int(_) => "int",
			Value::Float(_) => "float",
			Value::Str(_) => "str",
			Value::List(_) => "list",
			Value::Object(_) => "object",
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::Str(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::Str(v.to_string())
	}
}

impl From<Vec<Value>> for Value {
	fn from(v: Vec<Value>) -> Self {
		Value::List(v)
	}
}

impl From<Instance> for Value {
	fn from(v: Instance) -> Self {
		Value::Object(v)
	}
}

/// Returns argument `index` of an operation call.
pub fn arg<'a>(op: &'static str, args: &'a [Value], index: usize) -> Result<&'a Value, ComposeError> {
	args.get(index).ok_or(ComposeError::MissingArg { op, index })
}

fn arg_type(op: &'static str, index: usize, expected: &'static str, found: &Value) -> ComposeError {
	ComposeError::ArgType {
		op,
		index,
		expected,
		found: found.type_name(),
	}
}

/// Returns argument `index` as a string.
pub fn arg_str(op: &'static str, args: &[Value], index: usize) -> Result<String, ComposeError> {
	let value = arg(op, args, index)?;
	value
		.as_str()
		.map(str::to_owned)
		.ok_or_else(|| arg_type(op, index, "str", value))
}

/// Returns argument `index` as an integer.
pub fn arg_int(op: &'static str, args: &[Value], index: usize) -> Result<i64, ComposeError> {
	let value = arg(op, args, index)?;
	value.as_int().ok_or_else(|| arg_type(op, index, "int", value))
}

/// Returns argument `index` as a number, accepting `Int` or `Float`.
pub fn arg_f64(op: &'static str, args: &[Value], index: usize) -> Result<f64, ComposeError> {
	let value = arg(op, args, index)?;
	value
		.as_f64()
		.ok_or_else(|| arg_type(op, index, "float", value))
}

/// Returns argument `index` as an instance reference.
pub fn arg_object(op: &'static str, args: &[Value], index: usize) -> Result<Instance, ComposeError> {
	let value = arg(op, args, index)?;
	value
		.as_object()
		.cloned()
		.ok_or_else(|| arg_type(op, index, "object", value))
}

/// Returns argument `index` as a list of values.
pub fn arg_list(op: &'static str, args: &[Value], index: usize) -> Result<Vec<Value>, ComposeError> {
	let value = arg(op, args, index)?;
	value
		.as_list()
		.map(<[Value]>::to_vec)
		.ok_or_else(|| arg_type(op, index, "list", value))
}
