//! Messages of the `issue credential` 1.0 protocol, as defined in the [RFC](<https://github.com/hyperledger/aries-rfcs/blob/main/features/0036-issue-credential/README.md>).

pub mod ack;
pub mod common;
pub mod issue_credential;
pub mod offer_credential;
pub mod propose_credential;
pub mod request_credential;
