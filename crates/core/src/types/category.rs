//! Product category type.

use serde::{Deserialize, Serialize};

/// Error returned when parsing an unknown category.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown product category: {0}")]
pub struct CategoryError(pub String);

/// The fixed set of catalog categories.
///
/// Stored as lowercase text in the database and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Jackets,
    Wallets,
    Bags,
    Accessories,
}

impl ProductCategory {
    /// All categories, in display order.
    pub const ALL: [Self; 4] = [Self::Jackets, Self::Wallets, Self::Bags, Self::Accessories];

    /// The lowercase text form used in storage and query strings.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Jackets => "jackets",
            Self::Wallets => "wallets",
            Self::Bags => "bags",
            Self::Accessories => "accessories",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductCategory {
    type Err = CategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "jackets" => Ok(Self::Jackets),
            "wallets" => Ok(Self::Wallets),
            "bags" => Ok(Self::Bags),
            "accessories" => Ok(Self::Accessories),
            other => Err(CategoryError(other.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_known_category() {
        for category in ProductCategory::ALL {
            assert_eq!(category.as_str().parse::<ProductCategory>().unwrap(), category);
        }
    }

    #[test]
    fn rejects_unknown_category() {
        assert!("hats".parse::<ProductCategory>().is_err());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&ProductCategory::Wallets).unwrap();
        assert_eq!(json, "\"wallets\"");
    }
}
