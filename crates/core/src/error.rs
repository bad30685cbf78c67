use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures raised while talking to the remote invoice service.
#[derive(Debug, Error)]
pub enum Error {
    #[error("transport failure: {0}")]
    Transport(#[from] TransportError),

    #[error("failed to encode {what}: {reason}")]
    Encode { what: &'static str, reason: String },

    #[error("failed to decode {what}: {reason}")]
    Decode { what: &'static str, reason: String },

    /// Key material has the wrong length for the cipher.
    #[error("cipher key must be {expected} bytes, got {actual}")]
    Key { expected: usize, actual: usize },

    /// Ciphertext length or padding was rejected. Usually a wrong key or a
    /// corrupted response.
    #[error("failed to decrypt content: {0}")]
    Decrypt(String),

    /// The service answered with a non-success return code on a
    /// content-bearing request.
    #[error("service returned {code}: {message}")]
    Protocol { code: String, message: String },
}

impl Error {
    pub(crate) fn encode(what: &'static str, reason: impl ToString) -> Self {
        Error::Encode {
            what,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn decode(what: &'static str, reason: impl ToString) -> Self {
        Error::Decode {
            what,
            reason: reason.to_string(),
        }
    }

    /// Return code carried by a [`Error::Protocol`] failure.
    pub fn return_code(&self) -> Option<&str> {
        match self {
            Error::Protocol { code, .. } => Some(code),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    /// The request did not complete before the transport's deadline.
    #[error("request timed out")]
    Timeout,

    #[error("request failed: {0}")]
    Request(String),

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },
}
