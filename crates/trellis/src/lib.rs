//! # Trellis
//!
//! A pattern router and middleware chain executor over the `http` crate's
//! request and response types.
//!
//! - [`Router`] - registration, groups, named routes, reverse URLs, dispatch
//! - [`Context`] - per-request state handed to every handler
//! - [`slash::remover`] - trailing-slash redirects
//!
//! ## Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use http::StatusCode;
//! use trellis::prelude::*;
//!
//! let mut router = Router::new();
//!
//! router.use_handlers(vec![handler(|ctx| {
//!     ctx.write("[");
//!     ctx.next()?;
//!     ctx.write("]");
//!     Ok(())
//! })]);
//!
//! let mut api = router.group("/api");
//! api.get(r"/users/<id:\d+>", vec![handler(|ctx| {
//!     let id = ctx.param("id").to_string();
//!     ctx.write(format!("user {id}"));
//!     Ok(())
//! })])
//! .name("user");
//!
//! let request = http::Request::get("/api/users/42").body(Bytes::new()).unwrap();
//! let ctx = router.dispatch(request);
//! assert_eq!(ctx.status(), StatusCode::OK);
//! assert_eq!(ctx.body(), b"[user 42]");
//!
//! assert_eq!(router.url("user", &[("id", &7)]), "/api/users/7");
//! ```
//!
//! ## Dispatch
//!
//! ```text
//! Request → normalize path → match (method, path)
//!                               │
//!               ┌───────────────┴───────────────┐
//!             match                          no match
//!               │                               │
//!       scope handlers ++               scope handlers ++
//!       route handlers                  not-found handlers
//!               │                               │
//!               └───────────┬───────────────────┘
//!                           ↓
//!                  Context::next() → error hook → Response
//! ```

#![doc(html_root_url = "https://docs.rs/trellis/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

/// Generates the per-verb registration methods of a scope.
///
/// The scope must provide `try_to`.
macro_rules! verb_methods {
    ($($verb:ident => $method:ident),* $(,)?) => {
        $(
            #[doc = concat!("Registers `handlers` for `", stringify!($method), "` requests to `path`.")]
            ///
            /// # Panics
            ///
            /// Panics if `path` is not a valid pattern.
            #[track_caller]
            pub fn $verb(&mut self, path: &str, handlers: Vec<BoxedHandler>) -> Route<'_> {
                self.to(&[Method::$method], path, handlers)
            }
        )*

        /// Registers `handlers` for every supported method.
        ///
        /// # Panics
        ///
        /// Panics if `path` is not a valid pattern.
        #[track_caller]
        pub fn any(&mut self, path: &str, handlers: Vec<BoxedHandler>) -> Route<'_> {
            self.to(&crate::METHODS, path, handlers)
        }

        /// Registers `handlers` for each of `methods`.
        ///
        /// # Panics
        ///
        /// Panics if `path` is not a valid pattern or `methods` is empty.
        #[track_caller]
        pub fn to(&mut self, methods: &[Method], path: &str, handlers: Vec<BoxedHandler>) -> Route<'_> {
            match self.try_to(methods, path, handlers) {
                Ok(route) => route,
                Err(err) => panic!("cannot register route `{path}`: {err}"),
            }
        }
    };
}

pub mod defaults;
mod error;
mod group;
mod normalize;
mod route;
mod router;
pub mod slash;

pub use error::RouteError;
pub use group::RouteGroup;
pub use normalize::normalize_request_path;
pub use route::{Route, RouteInfo};
pub use router::{ErrorHandler, Router};

pub use trellis_config::{RouterConfig, TrellisConfig};
pub use trellis_core::{
    combine, handler, BoxedHandler, Chain, Context, Error, Handler, HttpError, Request, Response,
    TrellisResult, UrlResolver,
};
pub use trellis_router::{Params, Pattern, PatternError, WILDCARD_PARAM};

use http::Method;

/// Every method [`Router::any`] registers, in the order they are registered.
pub const METHODS: [Method; 9] = [
    Method::CONNECT,
    Method::DELETE,
    Method::GET,
    Method::HEAD,
    Method::OPTIONS,
    Method::PATCH,
    Method::POST,
    Method::PUT,
    Method::TRACE,
];

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        handler, BoxedHandler, Context, Error, Handler, HttpError, Route, RouteGroup, Router,
        TrellisResult,
    };
}
