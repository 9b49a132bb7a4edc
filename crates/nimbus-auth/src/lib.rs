//! Session and identity handling for Nimbus.
//!
//! Credential verification belongs to the managed identity backend; this
//! crate only talks to it and keeps track of who is signed in.

pub mod credentials;
pub mod error;
pub mod provider;
pub mod session;
pub mod storage;

pub use credentials::{Credentials, RegistrationForm};
pub use error::AuthError;
pub use provider::{Authenticator, RestAuthenticator};
pub use session::{IdentityId, Session, SessionContext, SessionProvider};
pub use storage::SessionStorage;
