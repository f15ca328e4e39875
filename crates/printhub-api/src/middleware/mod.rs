//! Tower layers applied to every route.

pub mod cors;

pub use cors::build_cors_layer;
