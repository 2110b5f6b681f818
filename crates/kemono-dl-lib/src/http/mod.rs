mod http_url;
mod reqwest_transport;
mod transport;

pub use http_url::{HttpUrl, InvalidUrl};
pub use reqwest_transport::ReqwestTransport;
pub use transport::{HttpResponse, HttpTransport, TransportError};
