//! Scenario tests for the composition engine.

mod errors;
mod storefront;

use crate::class::OpSet;
use crate::definition::BaseFactory;
use crate::value::Value;

/// Base producing `result = 1`, with a `result` accessor operation.
fn tally_base() -> BaseFactory {
	BaseFactory::new(|| {
		let mut set = OpSet::new();
		set.set_init(|instance, _| {
			instance.set("result", 1i64);
			Ok(())
		});
		set.define("result", |instance, _| {
			Ok(Value::Int(instance.get_int("result").unwrap_or(0)))
		});
		set
	})
}

/// Layer adding one to `result` after the earlier initializers ran.
fn plus_one(mut set: OpSet) -> OpSet {
	set.wrap_init(|prev, instance, args| {
		prev(instance, args)?;
		let value = instance.get_int("result").unwrap_or(0);
		instance.set("result", value + 1);
		Ok(())
	});
	set
}

/// Layer doubling `result` after the earlier initializers ran.
fn times_two(mut set: OpSet) -> OpSet {
	set.wrap_init(|prev, instance, args| {
		prev(instance, args)?;
		let value = instance.get_int("result").unwrap_or(0);
		instance.set("result", value * 2);
		Ok(())
	});
	set
}
