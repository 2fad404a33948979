//! Resource services: one generic CRUD implementation, bound per resource.

pub mod binding;
mod error;
mod resource;

pub use binding::{CachePolicy, DeleteReply, ResourceBinding, Shape};
pub use error::ServiceError;
pub use resource::{ListLimits, ResourceService};
