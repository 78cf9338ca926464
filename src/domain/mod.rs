//! Domain types for the reading tracker: identifiers, enumerations, catalog
//! normalization and the error taxonomy.

pub mod catalog;
pub mod error;
pub mod status;
pub mod views;

pub use catalog::{BookSummary, CatalogPayload, NormalizedBook};
pub use error::{LedgerError, LedgerResult};
pub use status::{AgeRating, ReadingStatus};
pub use views::{
    AuthSession, BookId, CollectionId, CollectionView, LibraryView, ReviewId, ReviewView,
    StatsView, UserId, UserProfile,
};
