/// Errors reported by the composition engine.
///
/// Every variant marks a programming or ordering error at the violating call
/// site. None are transient; nothing here should be retried.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ComposeError {
	/// Extension registered against a name with no prior declaration.
	#[error("unknown class: {name:?} was never declared")]
	UnknownClass { name: String },

	/// Second declaration under an already-taken name.
	#[error("duplicate class: {name:?} is already declared")]
	DuplicateClass { name: &'static str },

	/// Merge attempted across definitions with different base factories.
	#[error("incompatible bases: {left} and {right} do not share a base factory")]
	IncompatibleBase { left: String, right: String },

	/// Layer registered after the chain compiled. The compiled class never
	/// changes, so the layer could not take effect.
	#[error("class {class} is frozen: its chain compiled before this registration")]
	Frozen { class: String },

	/// Merge attempted across definitions owned by different registries.
	#[error("foreign definition: {left} and {right} live in different registries")]
	ForeignDefinition { left: String, right: String },

	/// Dispatch of an operation the compiled class does not provide.
	#[error("class {class} has no operation {op:?}")]
	UnknownOp { class: String, op: String },

	/// Operation argument had the wrong type.
	#[error("{op}: argument {index} expected {expected}, found {found}")]
	ArgType {
		op: &'static str,
		index: usize,
		expected: &'static str,
		found: &'static str,
	},

	/// Operation argument was missing.
	#[error("{op}: missing argument {index}")]
	MissingArg { op: &'static str, index: usize },
}
