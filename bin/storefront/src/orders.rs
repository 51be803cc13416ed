//! Order classes: orderlines and the order aggregate.

use lamina_compose::{BaseFactory, ComposeError, OpSet, Registry, Value, value};

pub fn register(registry: &Registry) -> Result<(), ComposeError> {
	registry.declare(
		"Orderline",
		BaseFactory::new(|| {
			let mut set = OpSet::new();
			set.set_init(|instance, args| {
				instance.set("product", value::arg_object("Orderline::initialize", args, 0)?);
				instance.set("quantity", value::arg_int("Orderline::initialize", args, 1)?);
				Ok(())
			});
			set.define("total", |instance, _| {
				let unit_price = instance
					.get_object("product")
					.and_then(|product| product.get_f64("unit_price"))
					.unwrap_or(0.0);
				let quantity = instance.get_int("quantity").unwrap_or(0);
				Ok(Value::Float(unit_price * quantity as f64))
			});
			set
		}),
	)?;

	let lines_registry = registry.clone();
	registry.declare(
		"Order",
		BaseFactory::new(move || {
			let registry = lines_registry.clone();
			let mut set = OpSet::new();
			set.set_init(|instance, _| {
				instance.set("lines", Vec::<Value>::new());
				Ok(())
			});
			set.define("add_product", move |instance, args| {
				let product = value::arg_object("Order::add_product", args, 0)?;
				let mut lines = instance.get_list("lines").unwrap_or_default();
				// Adding a product already on the order bumps its line.
				for line in &lines {
					let Some(line) = line.as_object() else { continue };
					if line.get_object("product").as_ref() == Some(&product) {
						let quantity = line.get_int("quantity").unwrap_or(0);
						line.set("quantity", quantity + 1);
						return Ok(Value::Null);
					}
				}
				let orderline = registry
					.lookup("Orderline")
					.ok_or_else(|| ComposeError::UnknownClass { name: "Orderline".to_string() })?;
				let line = orderline.instantiate(&[Value::Object(product), Value::Int(1)])?;
				lines.push(Value::Object(line));
				instance.set("lines", lines);
				Ok(Value::Null)
			});
			set.define("total", |instance, _| {
				let mut total = 0.0;
				for line in instance.get_list("lines").unwrap_or_default() {
					if let Some(line) = line.as_object() {
						total += line.call("total", &[])?.as_f64().unwrap_or(0.0);
					}
				}
				Ok(Value::Float(total))
			});
			set
		}),
	)?;
	Ok(())
}
