//! Catalog classes: the plain product and a derived discounted variant.

use lamina_compose::{BaseFactory, ComposeError, OpSet, Registry, Value, value};

pub fn register(registry: &Registry) -> Result<(), ComposeError> {
	let product = registry.declare(
		"Product",
		BaseFactory::new(|| {
			let mut set = OpSet::new();
			set.set_init(|instance, args| {
				instance.set("name", value::arg_str("Product::initialize", args, 0)?);
				instance.set("unit_price", value::arg_f64("Product::initialize", args, 1)?);
				Ok(())
			});
			set.define("describe", |instance, _| {
				let name = instance.get_str("name").unwrap_or_default();
				let unit_price = instance.get_f64("unit_price").unwrap_or(0.0);
				Ok(Value::Str(format!("{name} @ {unit_price:.2}")))
			});
			set
		}),
	)?;

	// A base built on the compiled product: instances satisfy the catalog's
	// identity check while carrying their own construction step.
	registry.declare(
		"DiscountedProduct",
		BaseFactory::new(move || {
			let mut set = OpSet::extending(&product.compile());
			set.wrap_init(|prev, instance, args| {
				prev(instance, args)?;
				let rate = value::arg_f64("DiscountedProduct::initialize", args, 2)?;
				let unit_price = instance.get_f64("unit_price").unwrap_or(0.0);
				instance.set("discount", rate);
				instance.set("unit_price", unit_price * (1.0 - rate));
				Ok(())
			});
			set
		}),
	)?;
	Ok(())
}
