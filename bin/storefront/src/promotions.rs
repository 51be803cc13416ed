//! Layers registered against the order classes by name, the way an
//! independently-loaded module would: this file knows the class names and
//! their contracts, nothing about how the bases are implemented.

use lamina_compose::{ComposeError, Registry, Value, value};

pub fn register(registry: &Registry) -> Result<(), ComposeError> {
	// Guard: recalled products never reach the order.
	registry.extend("Order", |mut set| {
		set.define("accepts_product", |_, args| {
			let product = value::arg_object("Order::accepts_product", args, 0)?;
			Ok(Value::Bool(product.get_str("name").as_deref() != Some("recalled")))
		});
		set.wrap("add_product", |prev, instance, args| {
			if instance.call("accepts_product", args)?.as_bool().unwrap_or(false) {
				prev(instance, args)
			} else {
				Ok(Value::Null)
			}
		});
		set
	})?;

	// Taxes: each orderline carries percentage rates applied to its total.
	registry.extend("Orderline", |mut set| {
		set.wrap_init(|prev, instance, args| {
			prev(instance, args)?;
			instance.set("taxes", Vec::<Value>::new());
			Ok(())
		});
		set.define("add_taxes", |instance, args| {
			let rates = value::arg_list("Orderline::add_taxes", args, 0)?;
			let mut taxes = instance.get_list("taxes").unwrap_or_default();
			taxes.extend(rates);
			instance.set("taxes", taxes);
			Ok(Value::Null)
		});
		set.define("taxes", |instance, _| {
			Ok(Value::List(instance.get_list("taxes").unwrap_or_default()))
		});
		set.wrap("total", |prev, instance, args| {
			let subtotal = prev(instance, args)?.as_f64().unwrap_or(0.0);
			// Late-bound on purpose: a later layer may narrow which rates
			// count without touching this one.
			let rates = instance.call("taxes", &[])?;
			let rate_sum: f64 = rates
				.as_list()
				.unwrap_or(&[])
				.iter()
				.filter_map(Value::as_f64)
				.sum();
			Ok(Value::Float(subtotal * (rate_sum / 100.0 + 1.0)))
		});
		set
	})?;

	// Tax hygiene: rates above 100% are data errors and never applied.
	registry.extend("Orderline", |mut set| {
		set.define("valid_taxes", |instance, _| {
			let rates = instance.get_list("taxes").unwrap_or_default();
			Ok(Value::List(
				rates
					.into_iter()
					.filter(|rate| rate.as_f64().is_some_and(|r| r <= 100.0))
					.collect(),
			))
		});
		set.define("taxes", |instance, _| instance.call("valid_taxes", &[]));
		set
	})?;
	Ok(())
}
