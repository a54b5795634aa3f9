use thiserror::Error;

pub type MsgTypeResult<T> = Result<T, MsgTypeError>;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum MsgTypeError {
    #[error("malformed message type uri: {0}")]
    InvalidTypeUri(String),
    #[error("unsupported protocol: {0}")]
    UnknownProtocol(String),
    #[error("unsupported protocol version: {0}")]
    UnknownVersion(String),
    #[error("unknown message kind: {0}")]
    UnknownKind(String),
}
