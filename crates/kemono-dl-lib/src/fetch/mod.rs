mod error;
mod fetcher;
mod retry;

pub use error::FetchError;
pub use fetcher::Fetcher;
pub use retry::RetryPolicy;
