//! Adapters for everything outside the library core: configuration, the
//! credential and token capabilities, the catalog client, and logging.

pub mod catalog_client;
pub mod config;
pub mod credentials;
pub mod telemetry;
pub mod tokens;

pub use catalog_client::{CatalogClient, GoogleBooksClient};
pub use config::Config;
pub use credentials::{BcryptHasher, CredentialHasher};
pub use tokens::{SignedTokenCodec, TokenCodec};
