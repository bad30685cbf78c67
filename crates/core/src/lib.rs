//! Secure envelope layer for the DZFP e-invoice interface.
//!
//! An outbound request is an inner business document, patched with the
//! schema's `class` attributes, encrypted with 3DES-ECB, base64-encoded and
//! wrapped in an `<interface>` envelope. Replies go through the same steps
//! in reverse.

pub mod crypto;
pub mod documents;
pub mod envelope;
pub mod error;
pub mod ids;
pub mod models;
pub mod parsing;
pub mod password;
pub mod schema;

pub use crypto::CipherKey;
pub use documents::{
    DownloadRequest, InvoiceHeader, InvoiceResult, IssueRequest, LineItem, OrderInfo,
    RequestContent,
};
pub use envelope::{InboundEnvelope, InboundShape, OutboundEnvelope, RequestData};
pub use error::{Error, Result, TransportError};
pub use models::{Action, DataDescription, GlobalInfo, ReturnStateInfo, SUCCESS_CODE};
