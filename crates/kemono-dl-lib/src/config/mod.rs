mod loader;
mod model;

pub use loader::{ENV_PREFIX, load_config, validate_config};
pub use model::{Config, ExistingFilePolicy, HttpConfig, RetryConfig};
