//! Immutable request, response and configuration types.

mod options;
mod payload;
mod request;

pub use options::{ClientOptions, DEFAULT_BASE_URL};
pub use payload::Payload;
pub use request::{FetchRequest, ItemId};
