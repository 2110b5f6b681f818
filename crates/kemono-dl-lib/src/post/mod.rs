pub mod api;
mod filename;
mod post_url;
mod resolver;

pub use filename::{FileName, disambiguate};
pub use post_url::PostUrl;
pub use resolver::{PostResolutionError, PostResolver};
