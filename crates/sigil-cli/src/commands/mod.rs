pub mod balance;
pub mod get;
pub mod hash;
pub mod issue;
pub mod issuers;
pub mod keygen;
pub mod register;
pub mod retry;
pub mod revoke;
pub mod status;
pub mod verify;

/// Default API endpoint of a locally running node.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8790";
