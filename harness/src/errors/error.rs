use std::fmt;

use thiserror;

pub mod prelude {
    pub use super::{err_msg, HarnessError, HarnessErrorKind, HarnessResult};
}

/// Failure taxonomy of a conformance scenario. Every kind aborts the
/// running scenario; a scenario reports exactly one verdict.
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum HarnessErrorKind {
    #[error("Received message does not match what the current protocol step expects")]
    ProtocolViolation,
    #[error("Thread id of the reply does not match any outstanding request")]
    CorrelationError,
    #[error("No matching message arrived within the configured bound")]
    Timeout,
    #[error("Expected event was not recorded")]
    Assertion,
    #[error("Message could not be delivered over the connection")]
    Transport,
    #[error("Backchannel command to the agent under test failed")]
    Backchannel,
    #[error("Object is in invalid state for requested operation")]
    InvalidState,
    #[error("Unable to serialize or deserialize a value")]
    SerializationError,
}

#[derive(thiserror::Error)]
pub struct HarnessError {
    msg: String,
    kind: HarnessErrorKind,
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Error: {}", self.msg())
    }
}

impl fmt::Debug for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HarnessError {{ kind: {:?}, msg: {} }}", self.kind, self.msg)
    }
}

impl HarnessError {
    fn new(kind: HarnessErrorKind, msg: String) -> Self {
        HarnessError { msg, kind }
    }

    pub fn from_msg<D>(kind: HarnessErrorKind, msg: D) -> HarnessError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(kind, msg.to_string())
    }

    pub fn kind(&self) -> HarnessErrorKind {
        self.kind
    }

    pub fn msg(&self) -> &str {
        &self.msg
    }

    pub fn extend<D>(self, msg: D) -> HarnessError
    where
        D: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        Self::new(self.kind, format!("{}\n{}", self.msg, msg))
    }
}

pub fn err_msg<D>(kind: HarnessErrorKind, msg: D) -> HarnessError
where
    D: fmt::Display + fmt::Debug + Send + Sync + 'static,
{
    HarnessError::from_msg(kind, msg)
}

pub type HarnessResult<T> = Result<T, HarnessError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extend_keeps_kind_and_appends_context() {
        let err = err_msg(HarnessErrorKind::Backchannel, "command rejected")
            .extend("send-cred-offer command failed");
        assert_eq!(err.kind(), HarnessErrorKind::Backchannel);
        assert!(err.msg().contains("command rejected"));
        assert!(err.msg().contains("send-cred-offer"));
    }
}
