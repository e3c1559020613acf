//! Product listing sort orders.

use serde::{Deserialize, Serialize};

/// Error returned when a sort order name is not recognized.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid sort order: {0} (expected price_asc, price_desc, rating or newest)")]
pub struct ProductSortError(pub String);

/// Sort order understood by the `GET /products` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductSort {
    /// Cheapest first.
    PriceAsc,
    /// Most expensive first.
    PriceDesc,
    /// Best rated first.
    Rating,
    /// Most recently added first.
    Newest,
}

impl ProductSort {
    /// Every sort order, in the order the backend documents them.
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::Rating, Self::Newest];

    /// The wire value used in the `sort` query parameter.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }
}

impl std::fmt::Display for ProductSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ProductSort {
    type Err = ProductSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s)
            .ok_or_else(|| ProductSortError(s.to_owned()))
    }
}
