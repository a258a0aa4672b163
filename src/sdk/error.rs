//! Access API error definitions.

use thiserror::Error;

/// Boxed error used for causes carried across the access boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by an [`AccessApi`](crate::sdk::AccessApi) call.
///
/// This is the error arm of every access call; the success arm is the
/// `Ok` value of [`AccessResult`].
#[derive(Debug, Error)]
pub enum AccessError {
    /// Transport level failure (connection refused, TLS, DNS).
    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The access node answered with a non-success status.
    #[error("access node returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// The response could not be decoded into the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// The request did not complete in time.
    #[error("access request timed out after {0} seconds")]
    Timeout(u64),

    /// The streaming endpoint failed or closed unexpectedly.
    #[error("subscription error: {0}")]
    Stream(String),

    /// The operation is not available on this access binding.
    #[error("operation not supported: {0}")]
    Unsupported(&'static str),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

impl AccessError {
    /// Wrap a transport failure with a message and cause.
    pub fn transport(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Execution error code embedded in the node's message, if any.
    pub fn error_code(&self) -> Option<FlowErrorCode> {
        parse_error_code(&self.to_string()).and_then(FlowErrorCode::from_code)
    }
}

/// Result type for access calls.
pub type AccessResult<T> = Result<T, AccessError>;

/// Extract the numeric code from a message containing `[Error Code: NNNN]`.
pub fn parse_error_code(message: &str) -> Option<u32> {
    const MARKER: &str = "[Error Code: ";
    let start = message.find(MARKER)? + MARKER.len();
    let rest = &message[start..];
    let end = rest.find(']')?;
    rest[..end].trim().parse().ok()
}

/// Execution error codes reported by the Flow virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowErrorCode {
    InvalidTxByteSize,
    InvalidReferenceBlock,
    ExpiredTransaction,
    InvalidScript,
    InvalidGasLimit,
    InvalidProposalSignature,
    InvalidProposalSeqNumber,
    InvalidPayloadSignature,
    InvalidEnvelopeSignature,
    FvmInternal,
    Value,
    InvalidArgument,
    InvalidAddress,
    InvalidLocation,
    AccountAuthorization,
    OperationAuthorization,
    OperationNotSupported,
    BlockHeightOutOfRange,
    CadenceRuntime,
    EncodingUnsupportedValue,
    StorageCapacityExceeded,
    GasLimitExceeded,
    EventLimitExceeded,
    LedgerInteractionLimitExceeded,
    StateKeySizeLimit,
    StateValueSizeLimit,
    TransactionFeeDeductionFailed,
    ComputationLimitExceeded,
    MemoryLimitExceeded,
    CouldNotDecodeExecutionParameterFromState,
    ScriptExecutionTimedOut,
    ScriptExecutionCancelled,
    EventEncoding,
    InvalidInternalStateAccess,
    InsufficientPayerBalance,
    AccountNotFound,
    AccountPublicKeyNotFound,
    AccountAlreadyExists,
    FrozenAccount,
    AccountStorageNotInitialized,
    AccountPublicKeyLimit,
    ContractNotFound,
    ContractNamesNotFound,
}

impl FlowErrorCode {
    const TABLE: &'static [(u32, FlowErrorCode)] = &[
        (1001, Self::InvalidTxByteSize),
        (1002, Self::InvalidReferenceBlock),
        (1003, Self::ExpiredTransaction),
        (1004, Self::InvalidScript),
        (1005, Self::InvalidGasLimit),
        (1006, Self::InvalidProposalSignature),
        (1007, Self::InvalidProposalSeqNumber),
        (1008, Self::InvalidPayloadSignature),
        (1009, Self::InvalidEnvelopeSignature),
        (1050, Self::FvmInternal),
        (1051, Self::Value),
        (1052, Self::InvalidArgument),
        (1053, Self::InvalidAddress),
        (1054, Self::InvalidLocation),
        (1055, Self::AccountAuthorization),
        (1056, Self::OperationAuthorization),
        (1057, Self::OperationNotSupported),
        (1058, Self::BlockHeightOutOfRange),
        (1101, Self::CadenceRuntime),
        (1102, Self::EncodingUnsupportedValue),
        (1103, Self::StorageCapacityExceeded),
        (1104, Self::GasLimitExceeded),
        (1105, Self::EventLimitExceeded),
        (1106, Self::LedgerInteractionLimitExceeded),
        (1107, Self::StateKeySizeLimit),
        (1108, Self::StateValueSizeLimit),
        (1109, Self::TransactionFeeDeductionFailed),
        (1110, Self::ComputationLimitExceeded),
        (1111, Self::MemoryLimitExceeded),
        (1112, Self::CouldNotDecodeExecutionParameterFromState),
        (1113, Self::ScriptExecutionTimedOut),
        (1114, Self::ScriptExecutionCancelled),
        (1115, Self::EventEncoding),
        (1116, Self::InvalidInternalStateAccess),
        (1118, Self::InsufficientPayerBalance),
        (1201, Self::AccountNotFound),
        (1202, Self::AccountPublicKeyNotFound),
        (1203, Self::AccountAlreadyExists),
        (1204, Self::FrozenAccount),
        (1205, Self::AccountStorageNotInitialized),
        (1206, Self::AccountPublicKeyLimit),
        (1251, Self::ContractNotFound),
        (1252, Self::ContractNamesNotFound),
    ];

    /// Look up a code; unknown codes yield `None`.
    pub fn from_code(code: u32) -> Option<Self> {
        Self::TABLE
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, e)| *e)
    }

    /// Numeric code of this error.
    pub fn code(self) -> u32 {
        Self::TABLE
            .iter()
            .find(|(_, e)| *e == self)
            .map(|(c, _)| *c)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_code() {
        let msg = "execution error code 1101: [Error Code: 1101] error caused by: panic";
        assert_eq!(parse_error_code(msg), Some(1101));
        assert_eq!(parse_error_code("no code here"), None);
        assert_eq!(parse_error_code("[Error Code: abc]"), None);
    }

    #[test]
    fn test_error_code_lookup() {
        assert_eq!(FlowErrorCode::from_code(1007), Some(FlowErrorCode::InvalidProposalSeqNumber));
        assert_eq!(FlowErrorCode::from_code(1117), None);
        assert_eq!(FlowErrorCode::CadenceRuntime.code(), 1101);
    }

    #[test]
    fn test_access_error_code() {
        let err = AccessError::Status {
            status: 400,
            message: "[Error Code: 1201] account not found".to_string(),
        };
        assert_eq!(err.error_code(), Some(FlowErrorCode::AccountNotFound));
        assert!(err.to_string().contains("status 400"));
    }
}
