pub mod app;
pub mod domain;
pub mod infra;
pub mod storage;
pub mod transport;

// Convenience re-exports (keeps call-sites clean)
pub use app::{AuthService, CatalogNormalizer, IdentityStore, LibraryLedger, SessionGuard, StatsReporter};
pub use domain::{LedgerError, LedgerResult, ReadingStatus};
pub use infra::Config;
pub use storage::{Store, StoreConfig};
