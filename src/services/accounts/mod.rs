pub mod resolver;
pub mod token;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use resolver::{AccountStore, ResolveError, TokenResolver};
pub use token::{LOGIN_TOKEN_HEADER, TokenExpirationPolicy, hash_login_token};
pub use types::{Identity, LoginTokenRecord, Resolution, UserAccount};
