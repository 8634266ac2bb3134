/// Geodetic position in WGS84 decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn as_array(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }
}

impl From<[f64; 2]> for LonLat {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// Component-wise arithmetic mean of a set of positions.
///
/// This is a planar average of longitudes and latitudes, not a geodesic
/// centroid. Sets straddling the antimeridian average toward lon 0.
///
/// Returns `None` for an empty input.
pub fn planar_mean<I>(positions: I) -> Option<LonLat>
where
    I: IntoIterator<Item = LonLat>,
{
    let mut sum_lon = 0.0;
    let mut sum_lat = 0.0;
    let mut count = 0usize;
    for p in positions {
        sum_lon += p.lon;
        sum_lat += p.lat;
        count += 1;
    }
    if count == 0 {
        return None;
    }
    let n = count as f64;
    Some(LonLat::new(sum_lon / n, sum_lat / n))
}

#[cfg(test)]
mod tests {
    use super::{LonLat, planar_mean};

    #[test]
    fn mean_of_three_points() {
        let c = planar_mean([
            LonLat::new(0.0, 0.0),
            LonLat::new(10.0, 10.0),
            LonLat::new(20.0, 0.0),
        ])
        .expect("non-empty");
        assert_eq!(c.lon, 10.0);
        assert!((c.lat - 10.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert!(planar_mean(std::iter::empty()).is_none());
    }

    #[test]
    fn mean_is_planar_across_antimeridian() {
        let c = planar_mean([LonLat::new(179.0, 0.0), LonLat::new(-179.0, 0.0)]).unwrap();
        assert_eq!(c.lon, 0.0);
    }
}
