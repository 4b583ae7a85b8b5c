//! Redirect handler system.
//!
//! Handler variants are registered in a [`HandlerRegistry`] under the key the
//! configuration references via `handler:`. Instances are constructed once at
//! startup from their [`MappingDefinition`](crate::config::MappingDefinition)
//! and shared across requests.
//!
//! ## Key Components
//!
//! - [`RedirectHandler`] - the per-request capability trait
//! - [`PlainRedirect`] - unconditional redirect
//! - [`WolRedirect`] - wake the target host, then redirect
//! - [`HandlerRegistry`] - key → factory table, populated at startup

mod plain;
mod registry;
mod traits;
mod wol;

pub use plain::PlainRedirect;
pub use registry::{HandlerEntry, HandlerFactory, HandlerRegistry, RegistryError};
pub use traits::{HandlerSpec, RedirectAction, RedirectHandler, require_options};
pub use wol::WolRedirect;
