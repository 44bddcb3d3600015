//! Handler trait for request processing.
//!
//! A route resolves to a [`Chain`], an ordered list of handlers run by
//! [`Context::next`]. Middleware and endpoints share the same trait: a
//! handler that wants to wrap the rest of the chain calls `ctx.next()`
//! itself.

use std::sync::Arc;

use crate::{Context, TrellisResult};

/// A unit of request processing.
///
/// Any `Fn(&mut Context) -> TrellisResult<()>` closure is a handler.
///
/// # Example
///
/// ```
/// use trellis_core::{Context, Handler, TrellisResult};
///
/// struct Hello;
///
/// impl Handler for Hello {
///     fn handle(&self, ctx: &mut Context) -> TrellisResult<()> {
///         ctx.write("hello");
///         Ok(())
///     }
/// }
/// ```
pub trait Handler: Send + Sync + 'static {
    /// Processes the request.
    ///
    /// Returning `Err` stops the chain; the remaining handlers do not run.
    fn handle(&self, ctx: &mut Context) -> TrellisResult<()>;
}

impl<F> Handler for F
where
    F: Fn(&mut Context) -> TrellisResult<()> + Send + Sync + 'static,
{
    fn handle(&self, ctx: &mut Context) -> TrellisResult<()> {
        self(ctx)
    }
}

/// A shared, type-erased handler.
pub type BoxedHandler = Arc<dyn Handler>;

/// An immutable handler chain shared by every request that matches it.
pub type Chain = Arc<[BoxedHandler]>;

/// Boxes a closure as a [`BoxedHandler`].
///
/// Lets the closure's argument type be inferred.
///
/// ```
/// use trellis_core::handler;
///
/// let h = handler(|ctx| {
///     ctx.write("ok");
///     Ok(())
/// });
/// # let _ = h;
/// ```
pub fn handler<F>(f: F) -> BoxedHandler
where
    F: Fn(&mut Context) -> TrellisResult<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Concatenates two handler lists into a new chain.
#[must_use]
pub fn combine(first: &[BoxedHandler], second: &[BoxedHandler]) -> Chain {
    first.iter().chain(second).cloned().collect()
}
