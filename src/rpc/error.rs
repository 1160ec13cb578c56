//! RPC error taxonomy.

use thiserror::Error;

/// Known JSON-RPC error codes reported by ledger nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcErrorCode {
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    ParseError,
    Misc,
    Type,
    InvalidAddressOrKey,
    InvalidParameter,
    Database,
    Deserialization,
    Verify,
    VerifyRejected,
    InWarmup,
    MethodDeprecated,
    /// Code outside the known list.
    Unknown(i64),
}

impl RpcErrorCode {
    /// Map a numeric node error code onto the taxonomy.
    pub fn from_code(code: i64) -> Self {
        match code {
            -32600 => Self::InvalidRequest,
            -32601 => Self::MethodNotFound,
            -32602 => Self::InvalidParams,
            -32603 => Self::InternalError,
            -32700 => Self::ParseError,
            -1 => Self::Misc,
            -3 => Self::Type,
            -5 => Self::InvalidAddressOrKey,
            -8 => Self::InvalidParameter,
            -20 => Self::Database,
            -22 => Self::Deserialization,
            -25 => Self::Verify,
            -26 => Self::VerifyRejected,
            -28 => Self::InWarmup,
            -32 => Self::MethodDeprecated,
            other => Self::Unknown(other),
        }
    }

    /// The numeric code as sent on the wire.
    pub fn code(&self) -> i64 {
        match self {
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
            Self::ParseError => -32700,
            Self::Misc => -1,
            Self::Type => -3,
            Self::InvalidAddressOrKey => -5,
            Self::InvalidParameter => -8,
            Self::Database => -20,
            Self::Deserialization => -22,
            Self::Verify => -25,
            Self::VerifyRejected => -26,
            Self::InWarmup => -28,
            Self::MethodDeprecated => -32,
            Self::Unknown(code) => *code,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

/// Errors that can occur while talking to a node.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RpcError {
    /// The request never produced a JSON-RPC reply (connect, timeout, HTTP status).
    #[error("RPC transport error calling {method} at {endpoint}: {message}")]
    Transport {
        method: String,
        endpoint: String,
        message: String,
    },

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {} ({code:?}) from {method}: {message}", .code.code())]
    Node {
        method: String,
        code: RpcErrorCode,
        message: String,
    },

    /// The reply was not the shape the caller expected.
    #[error("malformed reply to {method}: {reason}")]
    MalformedReply { method: String, reason: String },
}

impl RpcError {
    pub fn malformed(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedReply {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Node-reported error code, if any.
    pub fn code(&self) -> Option<RpcErrorCode> {
        match self {
            Self::Node { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes_roundtrip() {
        for code in [-32600, -32601, -32602, -32603, -32700, -1, -3, -5, -8, -20, -22, -25, -26, -28, -32] {
            let mapped = RpcErrorCode::from_code(code);
            assert!(mapped.is_known(), "code {code} should be known");
            assert_eq!(mapped.code(), code);
        }
    }

    #[test]
    fn test_unknown_code_is_generic() {
        let mapped = RpcErrorCode::from_code(-42000);
        assert_eq!(mapped, RpcErrorCode::Unknown(-42000));
        assert!(!mapped.is_known());
    }

    #[test]
    fn test_error_display() {
        let err = RpcError::Node {
            method: "hmy_sendRawTransaction".into(),
            code: RpcErrorCode::VerifyRejected,
            message: "nonce too low".into(),
        };
        let text = err.to_string();
        assert!(text.contains("-26"));
        assert!(text.contains("nonce too low"));
        assert_eq!(err.code(), Some(RpcErrorCode::VerifyRejected));
    }
}
