//! Pattern trie for Trellis.
//!
//! This crate maps an HTTP method and a request path to a registered value
//! and the path parameters the pattern captured. It knows nothing about
//! handlers; the `trellis` crate stores handler chains as the values.
//!
//! # Pattern Syntax
//!
//! - `/users` literal segments
//! - `/users/<id>` a parameter matching one non-empty segment
//! - `/users/<id:\d+>` a parameter constrained by a regular expression
//! - `/files/*` a wildcard binding the rest of the path under `*`
//!
//! # Example
//!
//! ```rust
//! use trellis_router::{Matcher, Params};
//! use http::Method;
//!
//! let mut matcher = Matcher::new();
//! matcher.insert(Method::GET, "/users", "listUsers").unwrap();
//! matcher.insert(Method::GET, "/users/<id>", "getUser").unwrap();
//! matcher.insert(Method::GET, "/files/*", "serveFile").unwrap();
//!
//! let mut params = Params::new();
//! let value = matcher.find(&Method::GET, "/files/images/logo.png", &mut params);
//! assert_eq!(value, Some(&"serveFile"));
//! assert_eq!(params.get("*"), Some("images/logo.png"));
//! ```
//!
//! # Architecture
//!
//! One tree per method. Every node holds a single segment:
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!              │               │
//!            "users"        "files"
//!              │               │
//!        ┌─────┴─────┐        "*"
//!        │           │
//!      (leaf)  "<id:\d+>"
//!                    │
//!                 (leaf)
//! ```

mod matcher;
mod node;
mod params;
mod pattern;

pub use matcher::Matcher;
pub use node::{Leaf, Node};
pub use params::{Params, INLINE_PARAMS};
pub use pattern::{Pattern, PatternError, Segment, WILDCARD_PARAM};
