//! Closed enumerations stored as text columns.

use crate::domain::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Reading status of a book in a user's library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReadingStatus {
    #[default]
    Planned,
    Reading,
    Finished,
    Dropped,
}

impl ReadingStatus {
    pub const ALL: [ReadingStatus; 4] = [
        ReadingStatus::Planned,
        ReadingStatus::Reading,
        ReadingStatus::Finished,
        ReadingStatus::Dropped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::Planned => "planned",
            ReadingStatus::Reading => "reading",
            ReadingStatus::Finished => "finished",
            ReadingStatus::Dropped => "dropped",
        }
    }

    /// Parses an optional wire value. Absent and empty both mean "not supplied".
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, LedgerError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some),
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReadingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| LedgerError::validation("invalid status"))
    }
}

/// Age rating derived from the catalog's maturity tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeRating {
    #[default]
    Unrestricted,
    Adult,
}

impl AgeRating {
    pub fn from_maturity_tag(tag: &str) -> Self {
        if tag == "MATURE" {
            AgeRating::Adult
        } else {
            AgeRating::Unrestricted
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRating::Unrestricted => "",
            AgeRating::Adult => "18+",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_only_known_values() {
        assert_eq!("finished".parse::<ReadingStatus>().unwrap(), ReadingStatus::Finished);
        assert!("Finished".parse::<ReadingStatus>().is_err());
        assert!("done".parse::<ReadingStatus>().is_err());
    }

    #[test]
    fn optional_status_treats_empty_as_absent() {
        assert_eq!(ReadingStatus::parse_optional(None).unwrap(), None);
        assert_eq!(ReadingStatus::parse_optional(Some("  ")).unwrap(), None);
        assert_eq!(
            ReadingStatus::parse_optional(Some("reading")).unwrap(),
            Some(ReadingStatus::Reading)
        );
        assert!(matches!(
            ReadingStatus::parse_optional(Some("later")),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ReadingStatus::Dropped).unwrap(), "\"dropped\"");
    }

    #[test]
    fn only_the_mature_tag_is_adult() {
        assert_eq!(AgeRating::from_maturity_tag("MATURE").as_str(), "18+");
        assert_eq!(AgeRating::from_maturity_tag("NOT_MATURE").as_str(), "");
        assert_eq!(AgeRating::from_maturity_tag("mature").as_str(), "");
        assert_eq!(AgeRating::from_maturity_tag("").as_str(), "");
    }
}
