use pretty_assertions::assert_eq;

use super::{plus_one, tally_base};
use crate::class::OpSet;
use crate::definition::BaseFactory;
use crate::error::ComposeError;
use crate::registry::Registry;
use crate::value::Value;

#[test]
fn extend_before_declare_is_rejected() {
	let registry = Registry::new();
	let err = registry.extend("Ghost", |set| set).unwrap_err();
	assert!(matches!(err, ComposeError::UnknownClass { ref name } if name == "Ghost"));
	// No implicit empty base was created.
	assert!(registry.lookup("Ghost").is_none());
}

#[test]
fn duplicate_declaration_is_rejected() {
	let registry = Registry::new();
	registry.declare("Tally", tally_base()).unwrap();
	let err = registry.declare("Tally", tally_base()).unwrap_err();
	assert!(matches!(err, ComposeError::DuplicateClass { name: "Tally" }));
}

#[test]
fn late_layer_fails_hard_after_compile() {
	let registry = Registry::new();
	let def = registry.declare("Tally", tally_base()).unwrap();
	def.extend(plus_one).unwrap();
	def.compile();

	let err = def.extend(plus_one).unwrap_err();
	assert!(matches!(err, ComposeError::Frozen { ref class } if class == "Tally"));
	let err = registry.extend("Tally", plus_one).unwrap_err();
	assert!(matches!(err, ComposeError::Frozen { .. }));

	// The compiled behavior is unchanged by the rejected registrations.
	let instance = def.instantiate(&[]).unwrap();
	assert_eq!(instance.call("result", &[]).unwrap(), Value::Int(2));
}

#[test]
fn identity_check_freezes_the_chain() {
	let registry = Registry::new();
	let def = registry.declare("Tally", tally_base()).unwrap();
	// Never instantiated; the identity check alone compiles the chain.
	assert!(!def.is_instance(&Value::Null));
	let err = def.extend(plus_one).unwrap_err();
	assert!(matches!(err, ComposeError::Frozen { .. }));
}

#[test]
fn initializer_argument_errors_are_reported() {
	let registry = Registry::new();
	let base = BaseFactory::new(|| {
		let mut set = OpSet::new();
		set.set_init(|instance, args| {
			instance.set("name", crate::value::arg_str("Named::initialize", args, 0)?);
			Ok(())
		});
		set
	});
	let def = registry.declare("Named", base).unwrap();

	let err = def.instantiate(&[]).unwrap_err();
	assert!(matches!(
		err,
		ComposeError::MissingArg { op: "Named::initialize", index: 0 }
	));

	let err = def.instantiate(&[Value::Int(7)]).unwrap_err();
	assert!(matches!(
		err,
		ComposeError::ArgType {
			op: "Named::initialize",
			index: 0,
			expected: "str",
			found: "int",
		}
	));
}

#[test]
fn unknown_operation_dispatch_is_reported() {
	let registry = Registry::new();
	let def = registry.declare("Tally", tally_base()).unwrap();
	let instance = def.instantiate(&[]).unwrap();
	let err = instance.call("missing", &[]).unwrap_err();
	assert!(matches!(
		err,
		ComposeError::UnknownOp { ref class, ref op } if class == "Tally" && op == "missing"
	));
}

#[test]
fn optimistic_wrap_of_missing_operation_reports_on_dispatch() {
	let registry = Registry::new();
	let def = registry.declare("Bare", BaseFactory::new(OpSet::new)).unwrap();
	def.extend(|mut set| {
		set.wrap("poke", |prev, instance, args| prev(instance, args));
		set
	})
	.unwrap();

	let instance = def.instantiate(&[]).unwrap();
	let err = instance.call("poke", &[]).unwrap_err();
	assert!(matches!(err, ComposeError::UnknownOp { ref op, .. } if op == "poke"));
}
