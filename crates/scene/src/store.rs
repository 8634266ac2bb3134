use foundation::{GeoBounds, LonLat, planar_mean};

use crate::feature::FeatureCollection;

/// Aggregates were requested over a collection with no point features.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct EmptyDatasetError;

impl std::fmt::Display for EmptyDatasetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cannot aggregate an empty feature collection")
    }
}

impl std::error::Error for EmptyDatasetError {}

/// Framing geometry derived from a feature collection.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aggregate {
    /// Planar mean of all point positions.
    pub center: LonLat,
    pub bounds: GeoBounds,
}

impl Aggregate {
    pub fn compute(collection: &FeatureCollection) -> Result<Self, EmptyDatasetError> {
        let center = planar_mean(collection.positions()).ok_or(EmptyDatasetError)?;
        let bounds = GeoBounds::covering(collection.positions()).ok_or(EmptyDatasetError)?;
        Ok(Self { center, bounds })
    }
}

/// Holds the current feature collection and its aggregates.
///
/// `set_data` is the only mutation path; aggregates are recomputed
/// synchronously on every call so they never lag the data.
#[derive(Debug, Clone)]
pub struct GeoDataStore {
    data: FeatureCollection,
    aggregate: Result<Aggregate, EmptyDatasetError>,
    revision: u64,
}

impl Default for GeoDataStore {
    fn default() -> Self {
        Self {
            data: FeatureCollection::default(),
            aggregate: Err(EmptyDatasetError),
            revision: 0,
        }
    }
}

impl GeoDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_data(&mut self, collection: FeatureCollection) {
        self.aggregate = Aggregate::compute(&collection);
        self.data = collection;
        self.revision += 1;
    }

    pub fn data(&self) -> &FeatureCollection {
        &self.data
    }

    pub fn center(&self) -> Result<LonLat, EmptyDatasetError> {
        self.aggregate.map(|a| a.center)
    }

    pub fn bounds(&self) -> Result<GeoBounds, EmptyDatasetError> {
        self.aggregate.map(|a| a.bounds)
    }

    /// Number of `set_data` calls so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }
}
