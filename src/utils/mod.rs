pub mod jwt;
pub mod random;
pub mod signature;

pub use jwt::*;
pub use random::{OsRandomSource, RandomSource};
pub use signature::{sign_body, verify_signature};
