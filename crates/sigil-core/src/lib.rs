//! Sigil Core — credential model, canonical hashing, and the anchoring
//! status state machine.

pub mod anchor_state;
pub mod credential;
pub mod error;
pub mod hash;
pub mod memo;
pub mod types;

pub use anchor_state::{AnchorEvent, AnchorStateMachine, AnchorStatus};
pub use credential::{Credential, CredentialKind};
pub use error::CoreError;
pub use types::{Digest, TxRef};
