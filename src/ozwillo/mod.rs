//! Ozwillo OpenID Connect provider

pub mod provider;
pub mod user;

pub use provider::Ozwillo;
pub use user::OzwilloUser;
