//! Top-level application class and its extension layers.

use lamina_compose::{BaseFactory, ComposeError, Definition, OpSet, Registry, Value, value};

pub fn register(registry: &Registry) -> Result<Definition, ComposeError> {
	let app = registry.declare(
		"App",
		BaseFactory::new(|| {
			let mut set = OpSet::new();
			set.set_init(|instance, args| {
				instance.set("message", value::arg_str("App::initialize", args, 0)?);
				Ok(())
			});
			set.define("run", |instance, _| {
				tracing::info!(message = %instance.get_str("message").unwrap_or_default(), "app started");
				Ok(Value::Null)
			});
			set.define("configure", |_, _| Ok(Value::Null));
			set
		}),
	)?;

	// First layer: announce the storefront after the base run.
	let app = app.extend(|mut set| {
		set.define("announce", |_, _| {
			tracing::info!("storefront open");
			Ok(Value::Null)
		});
		set.wrap("run", |prev, instance, args| {
			prev(instance, args)?;
			instance.call("announce", &[])
		});
		set
	})?;

	// Second layer builds on the first one's announcement.
	app.extend(|mut set| {
		set.wrap("announce", |prev, instance, args| {
			prev(instance, args)?;
			tracing::info!("today's catalog is loaded");
			Ok(Value::Null)
		});
		set
	})
}

#[cfg(test)]
mod tests {
	use lamina_compose::{Registry, Value};

	#[test]
	fn run_walks_the_announcement_chain() {
		let registry = Registry::new();
		let app = super::register(&registry).unwrap();
		let instance = app.instantiate(&[Value::from("hello")]).unwrap();
		instance.call("configure", &[]).unwrap();
		instance.call("run", &[]).unwrap();
		assert_eq!(instance.get_str("message").as_deref(), Some("hello"));
	}
}
