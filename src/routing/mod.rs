//! Request routing: path grouping and hostname dispatch.

mod group;
mod router;

pub use group::{RouteEntry, RouteGroup, RoutePattern, method_filter, normalize_host};
pub use router::RedirectRouter;
