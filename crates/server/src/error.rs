//! Structured errors for the vidshell host.

use rmcp::model::{ErrorCode, ErrorData as McpError};

/// Errors raised by the host itself rather than by the worker.
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// Invalid tool parameters.
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Tool output could not be serialized.
    #[error("SERIALIZE_FAILED: {0}")]
    Serialize(String),
}

impl From<HostError> for McpError {
    fn from(err: HostError) -> Self {
        let (code, message) = match &err {
            HostError::InvalidInput(msg) => (-32602, msg.clone()),
            HostError::Serialize(msg) => (-32603, msg.clone()),
        };

        McpError { code: ErrorCode(code), message: message.into(), data: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_error_codes() {
        let err: McpError = HostError::InvalidInput("bad method".into()).into();
        assert_eq!(err.code.0, -32602);
        assert_eq!(err.message, "bad method");

        let err: McpError = HostError::Serialize("oops".into()).into();
        assert_eq!(err.code.0, -32603);
    }
}
