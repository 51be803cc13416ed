//! Storefront demo: domain classes declared by some modules, layered by
//! others, and composed lazily on first use once the host is ready.

mod app;
mod boot;
mod catalog;
mod orders;
mod promotions;

use lamina_compose::{ComposeError, Definition, Registry, Value};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	let registry = Registry::new();
	catalog::register(&registry)?;
	orders::register(&registry)?;
	let app = app::register(&registry)?;
	promotions::register(&registry)?;

	// Every module has registered; compilation happens on first use inside.
	boot::on_host_ready(|| async move {
		let instance = app.instantiate(&[Value::from("welcome")])?;
		instance.call("configure", &[])?;
		instance.call("run", &[])?;
		run_shop(&registry)
	})??;
	Ok(())
}

fn lookup(registry: &Registry, name: &str) -> Result<Definition, ComposeError> {
	registry
		.lookup(name)
		.ok_or_else(|| ComposeError::UnknownClass { name: name.to_string() })
}

fn run_shop(registry: &Registry) -> Result<(), ComposeError> {
	let product = lookup(registry, "Product")?;
	let discounted = lookup(registry, "DiscountedProduct")?;
	let order = lookup(registry, "Order")?;

	let water = product.instantiate(&[Value::from("water"), Value::from(1.2)])?;
	let burger = product.instantiate(&[Value::from("burger"), Value::from(6.5)])?;
	let cake = discounted.instantiate(&[Value::from("day-old cake"), Value::from(4.0), Value::from(0.5)])?;
	let recalled = product.instantiate(&[Value::from("recalled"), Value::from(9.9)])?;

	let cart = order.instantiate(&[])?;
	for item in [&water, &burger, &burger, &cake, &recalled] {
		cart.call("add_product", &[Value::Object(item.clone())])?;
	}

	for line in cart.get_list("lines").unwrap_or_default() {
		if let Some(line) = line.as_object() {
			line.call(
				"add_taxes",
				&[Value::List(vec![Value::from(10.0), Value::from(250.0)])],
			)?;
		}
	}

	let total = cart.call("total", &[])?.as_f64().unwrap_or(0.0);
	tracing::info!(
		cake_is_product = product.has_instance(&cake),
		total,
		"cart totalled"
	);
	Ok(())
}
