//! Talks to the DZFP e-invoice service: transports and the protocol driver.

pub mod client;
pub mod mock;
pub mod transport;

pub use client::InvoiceClient;
pub use config::DEFAULT_ENDPOINT;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
