//! Asset versions and scan filters.

use std::fmt;
use tabledger_codec::Value;

/// One immutable version of an asset.
///
/// Ages start at 0 and increase by one with every write to the same id.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    id: String,
    age: u64,
    data: Value,
    hash: [u8; 32],
}

impl Asset {
    /// Creates an asset version.
    pub fn new(id: impl Into<String>, age: u64, data: Value, hash: [u8; 32]) -> Self {
        Self {
            id: id.into(),
            age,
            data,
            hash,
        }
    }

    /// Returns the asset id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the version number.
    #[must_use]
    pub fn age(&self) -> u64 {
        self.age
    }

    /// Returns the document stored in this version.
    #[must_use]
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Consumes the asset and returns its document.
    #[must_use]
    pub fn into_data(self) -> Value {
        self.data
    }

    /// Returns the chained hash of this version.
    #[must_use]
    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }
}

/// Order in which a scan returns versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgeOrder {
    /// Oldest version first.
    #[default]
    Asc,
    /// Newest version first.
    Desc,
}

impl fmt::Display for AgeOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgeOrder::Asc => f.write_str("ASC"),
            AgeOrder::Desc => f.write_str("DESC"),
        }
    }
}

/// Selects versions of one asset.
///
/// Age bounds are inclusive. The limit is applied after ordering, so a
/// descending scan with `limit(1)` returns the latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFilter {
    /// The asset to scan.
    pub asset_id: String,
    /// Lowest age to include.
    pub start_age: Option<u64>,
    /// Highest age to include.
    pub end_age: Option<u64>,
    /// Result ordering.
    pub age_order: AgeOrder,
    /// Maximum number of versions returned.
    pub limit: Option<usize>,
}

impl AssetFilter {
    /// Creates a filter selecting every version in ascending order.
    pub fn new(asset_id: impl Into<String>) -> Self {
        Self {
            asset_id: asset_id.into(),
            start_age: None,
            end_age: None,
            age_order: AgeOrder::Asc,
            limit: None,
        }
    }

    /// Sets the result ordering.
    #[must_use]
    pub fn with_age_order(mut self, order: AgeOrder) -> Self {
        self.age_order = order;
        self
    }

    /// Sets the maximum number of versions returned.
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the lowest age to include.
    #[must_use]
    pub fn with_start_age(mut self, age: u64) -> Self {
        self.start_age = Some(age);
        self
    }

    /// Sets the highest age to include.
    #[must_use]
    pub fn with_end_age(mut self, age: u64) -> Self {
        self.end_age = Some(age);
        self
    }

    /// Returns true if `age` falls inside the bounds.
    #[must_use]
    pub fn contains_age(&self, age: u64) -> bool {
        self.start_age.map_or(true, |start| age >= start)
            && self.end_age.map_or(true, |end| age <= end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults() {
        let filter = AssetFilter::new("record:t:k:1");
        assert_eq!(filter.age_order, AgeOrder::Asc);
        assert_eq!(filter.limit, None);
        assert!(filter.contains_age(0));
        assert!(filter.contains_age(u64::MAX));
    }

    #[test]
    fn filter_bounds_are_inclusive() {
        let filter = AssetFilter::new("a").with_start_age(2).with_end_age(4);
        assert!(!filter.contains_age(1));
        assert!(filter.contains_age(2));
        assert!(filter.contains_age(4));
        assert!(!filter.contains_age(5));
    }

    #[test]
    fn age_order_display() {
        assert_eq!(AgeOrder::Desc.to_string(), "DESC");
    }
}
