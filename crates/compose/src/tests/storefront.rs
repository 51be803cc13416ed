//! End-to-end scenario: an order aggregate composed from lazily-extended
//! class definitions, with a guard layer registered by an independent
//! module.

use pretty_assertions::assert_eq;

use crate::class::OpSet;
use crate::definition::BaseFactory;
use crate::error::ComposeError;
use crate::registry::Registry;
use crate::value::{self, Value};

fn declare_shop(registry: &Registry) {
	let product = BaseFactory::new(|| {
		let mut set = OpSet::new();
		set.set_init(|instance, args| {
			instance.set("name", value::arg_str("Product::initialize", args, 0)?);
			instance.set("unit_price", value::arg_f64("Product::initialize", args, 1)?);
			Ok(())
		});
		set
	});
	registry.declare("Product", product).unwrap();

	let orderline = BaseFactory::new(|| {
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
	});
	registry.declare("Orderline", orderline).unwrap();

	let lines_registry = registry.clone();
	let order = BaseFactory::new(move || {
		let registry = lines_registry.clone();
		let mut set = OpSet::new();
		set.set_init(|instance, _| {
			instance.set("lines", Vec::<Value>::new());
			Ok(())
		});
		set.define("add_item", move |instance, args| {
			let product = value::arg_object("Order::add_item", args, 0)?;
			let mut lines = instance.get_list("lines").unwrap_or_default();
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
	});
	registry.declare("Order", order).unwrap();
}

/// Guard layer from an independent module: rejects blocked items before
/// delegating to the original `add_item`.
fn register_guard(registry: &Registry) {
	registry
		.extend("Order", |mut set| {
			set.define("accepts_item", |_, args| {
				let product = value::arg_object("Order::accepts_item", args, 0)?;
				Ok(Value::Bool(product.get_str("name").as_deref() != Some("forbidden")))
			});
			set.wrap("add_item", |prev, instance, args| {
				if instance.call("accepts_item", args)?.as_bool().unwrap_or(false) {
					prev(instance, args)
				} else {
					Ok(Value::Null)
				}
			});
			set
		})
		.unwrap();
}

#[test]
fn order_totals_across_lines() {
	let registry = Registry::new();
	declare_shop(&registry);

	let product = registry.lookup("Product").unwrap();
	let order = registry.lookup("Order").unwrap();

	let water = product.instantiate(&[Value::from("water"), Value::from(1.0)]).unwrap();
	let burger = product.instantiate(&[Value::from("burger"), Value::from(2.0)]).unwrap();

	let cart = order.instantiate(&[]).unwrap();
	cart.call("add_item", &[Value::Object(water)]).unwrap();
	cart.call("add_item", &[Value::Object(burger.clone())]).unwrap();
	cart.call("add_item", &[Value::Object(burger)]).unwrap();

	// 1 * 1.0 + 2 * 2.0
	assert_eq!(cart.call("total", &[]).unwrap(), Value::Float(5.0));
}

#[test]
fn guard_layer_rejects_blocked_items() {
	let registry = Registry::new();
	declare_shop(&registry);
	register_guard(&registry);

	let product = registry.lookup("Product").unwrap();
	let order = registry.lookup("Order").unwrap();

	let water = product.instantiate(&[Value::from("water"), Value::from(1.0)]).unwrap();
	let burger = product.instantiate(&[Value::from("burger"), Value::from(2.0)]).unwrap();
	let blocked = product
		.instantiate(&[Value::from("forbidden"), Value::from(99.0)])
		.unwrap();

	let cart = order.instantiate(&[]).unwrap();
	cart.call("add_item", &[Value::Object(water)]).unwrap();
	cart.call("add_item", &[Value::Object(burger.clone())]).unwrap();
	cart.call("add_item", &[Value::Object(burger)]).unwrap();
	assert_eq!(cart.call("total", &[]).unwrap(), Value::Float(5.0));

	cart.call("add_item", &[Value::Object(blocked)]).unwrap();
	assert_eq!(cart.call("total", &[]).unwrap(), Value::Float(5.0));
}
