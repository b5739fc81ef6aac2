use thiserror::Error;

/// Failure of a single read against the chain
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReadError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("RPC call `{call}` failed: {message}")]
    Rpc { call: &'static str, message: String },

    #[error("Malformed response from `{call}`: {message}")]
    Decode { call: &'static str, message: String },
}

impl ReadError {
    pub fn rpc(call: &'static str, error: impl std::fmt::Display) -> Self {
        Self::Rpc {
            call,
            message: error.to_string(),
        }
    }

    pub fn decode(call: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            call,
            message: message.into(),
        }
    }
}
