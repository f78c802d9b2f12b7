//! Pure transformations: URL templating and retry timing.

mod retry;
mod template;

pub use self::retry::backoff_delay;
pub use self::template::{build_url, parse_base_url};
