//! Authentication and access control
//!
//! - `password`: Argon2id hashing and strength rules
//! - `jwt`: access/refresh token issue and validation
//! - `middleware`: Bearer token extraction and the request [`middleware::AuthContext`]
//! - `ownership`: board/column/task ownership checks

pub mod jwt;
pub mod middleware;
pub mod ownership;
pub mod password;

pub use jwt::{Claims, JwtError, TokenPair, TokenType};
pub use middleware::{AuthContext, AuthError};
pub use ownership::AccessError;
pub use password::PasswordError;
