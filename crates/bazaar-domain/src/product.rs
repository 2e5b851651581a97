//! Catalog listing options.

use serde::{Deserialize, Serialize};

use crate::pagination::Sort;

/// Sort order for `GET /products`.
///
/// Wire format is a single hyphenated string such as `"price-asc"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSortBy {
    CreatedAt(Sort),
    Price(Sort),
}

impl Default for ProductSortBy {
    fn default() -> Self {
        Self::CreatedAt(Sort::Desc)
    }
}

impl ProductSortBy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CreatedAt(Sort::Desc) => "created-at-desc",
            Self::CreatedAt(Sort::Asc) => "created-at-asc",
            Self::Price(Sort::Desc) => "price-desc",
            Self::Price(Sort::Asc) => "price-asc",
        }
    }
}

impl<'de> Deserialize<'de> for ProductSortBy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "created-at-desc" => Ok(Self::CreatedAt(Sort::Desc)),
            "created-at-asc" => Ok(Self::CreatedAt(Sort::Asc)),
            "price-desc" => Ok(Self::Price(Sort::Desc)),
            "price-asc" => Ok(Self::Price(Sort::Asc)),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["created-at-desc", "created-at-asc", "price-desc", "price-asc"],
            )),
        }
    }
}

impl Serialize for ProductSortBy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
