pub mod auth;
pub mod identity;
pub mod ledger;
pub mod normalizer;
pub mod reviews;
pub mod session;
pub mod stats;

pub use auth::AuthService;
pub use identity::IdentityStore;
pub use ledger::{BookRef, LibraryLedger};
pub use normalizer::CatalogNormalizer;
pub use session::SessionGuard;
pub use stats::StatsReporter;
