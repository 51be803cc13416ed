//! Host bootstrap glue.

use std::future::Future;
use std::io;

/// Invokes `ready` exactly once on a current-thread runtime, standing in for
/// the host environment's readiness signal.
///
/// The composition engine never depends on this hook; consumers use it to
/// sequence "load every extension module, then instantiate".
pub fn on_host_ready<F, Fut>(ready: F) -> io::Result<Fut::Output>
where
	F: FnOnce() -> Fut,
	Fut: Future,
{
	let runtime = tokio::runtime::Builder::new_current_thread().build()?;
	Ok(runtime.block_on(ready()))
}
