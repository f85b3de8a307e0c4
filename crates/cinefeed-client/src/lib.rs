pub mod client;
pub mod decode;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod transport;

pub use client::TmdbClient;
pub use decode::decode;
pub use error::ApiError;
pub use request::{build_url, QueryParams, LANGUAGE};
pub use transport::{ReqwestTransport, Transport};

#[cfg(any(test, feature = "test-util"))]
pub use transport::stub::{StubResponse, StubTransport};
