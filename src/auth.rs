//! Credentials and bearer tokens.
//!
//! Passwords are stored as salted PBKDF2-HMAC-SHA256 hashes and sessions are
//! stateless HS256 JSON Web Tokens, both built on `ring`. Logging out revokes a
//! token by marking its id in the record store until the token would have
//! expired anyway.

mod errors;
pub mod password;
pub mod token;

pub use errors::{PasswordError, TokenError};
pub use password::PasswordHasher;
pub use token::{Claims, TokenService};
