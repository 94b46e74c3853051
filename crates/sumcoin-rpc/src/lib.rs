pub mod client;
pub mod config;
pub mod error;
mod executor;
mod methods;
pub mod reporter;
pub mod response;
pub mod rpc;
#[cfg(test)]
mod test_util;
pub mod units;

pub use client::{Callbacks, Client, Dispatched};
pub use config::{split_url, Config, UrlParts};
pub use error::ClientError;
pub use executor::Promise;
pub use reporter::ErrorReporter;
pub use response::{FromResponse, RemoteError, Response};
pub use rpc::{HttpTransport, Transport};
