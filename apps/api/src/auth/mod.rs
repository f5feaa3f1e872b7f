//! Identity: JWT issuing/verification, password hashing, and the request
//! extractors that gate handlers by role or agency API key.

pub mod extract;
pub mod password;
pub mod token;

pub use extract::{AgencyAuth, AuthUser};
pub use token::{Claims, TokenIssuer};
