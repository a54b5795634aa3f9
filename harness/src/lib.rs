//! Conformance test harness for the aries issue-credential 1.0 protocol.
//!
//! The harness plays the role complementary to the agent under test: as
//! holder when the agent is tested in the issuer role, as issuer when the
//! agent is tested in the holder role. It drives the issuance flow over a
//! [`connection::Connection`], commands the agent under test through a
//! [`backchannel::Backchannel`] and records lifecycle events that the
//! scenario asserts at the end.

#[macro_use]
extern crate log;

pub use messages;

pub mod backchannel;
pub mod connection;
pub mod credentials;
pub mod errors;
pub mod events;
pub mod protocols;
