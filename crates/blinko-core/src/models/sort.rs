//! Note list sort presets

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Server-side list ordering requested when fetching notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteSortConfig {
    pub sort_by: SortField,
    pub direction: SortDirection,
}

impl NoteSortConfig {
    /// The six presets offered to users, in menu order.
    pub const PRESETS: [Self; 6] = [
        Self::new(SortField::CreatedAt, SortDirection::Desc),
        Self::new(SortField::CreatedAt, SortDirection::Asc),
        Self::new(SortField::UpdatedAt, SortDirection::Desc),
        Self::new(SortField::UpdatedAt, SortDirection::Asc),
        Self::new(SortField::Content, SortDirection::Asc),
        Self::new(SortField::Content, SortDirection::Desc),
    ];

    #[must_use]
    pub const fn new(sort_by: SortField, direction: SortDirection) -> Self {
        Self { sort_by, direction }
    }
}

impl Default for NoteSortConfig {
    fn default() -> Self {
        Self::new(SortField::CreatedAt, SortDirection::Desc)
    }
}

impl fmt::Display for NoteSortConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = match self.sort_by {
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
            SortField::Content => "content",
        };
        let direction = match self.direction {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        };
        write!(f, "{field}-{direction}")
    }
}

impl FromStr for NoteSortConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.to_string() == value)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown sort preset: {value}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_round_trip_through_strings() {
        for preset in NoteSortConfig::PRESETS {
            let parsed: NoteSortConfig = preset.to_string().parse().unwrap();
            assert_eq!(parsed, preset);
        }
    }

    #[test]
    fn default_is_newest_created_first() {
        assert_eq!(NoteSortConfig::default().to_string(), "createdAt-desc");
    }

    #[test]
    fn unknown_preset_is_rejected() {
        assert!("sortOrder-asc".parse::<NoteSortConfig>().is_err());
    }
}
