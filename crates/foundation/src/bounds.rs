use crate::geo::LonLat;

/// Axis-aligned longitude/latitude rectangle.
///
/// `min` and `max` are `[lon, lat]` pairs. A rectangle with zero extent on
/// either axis is valid (a single point covers itself).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GeoBounds {
    pub min: [f64; 2],
    pub max: [f64; 2],
}

impl GeoBounds {
    pub fn new(min: [f64; 2], max: [f64; 2]) -> Self {
        GeoBounds { min, max }
    }

    /// Rectangle collapsed onto a single position.
    pub fn from_point(p: LonLat) -> Self {
        GeoBounds {
            min: [p.lon, p.lat],
            max: [p.lon, p.lat],
        }
    }

    /// Grow the rectangle so that it covers `p`.
    pub fn extend(&mut self, p: LonLat) {
        self.min[0] = self.min[0].min(p.lon);
        self.min[1] = self.min[1].min(p.lat);
        self.max[0] = self.max[0].max(p.lon);
        self.max[1] = self.max[1].max(p.lat);
    }

    /// Tight bounds of a set of positions, extended from the first one.
    pub fn covering<I>(positions: I) -> Option<Self>
    where
        I: IntoIterator<Item = LonLat>,
    {
        let mut iter = positions.into_iter().peekable();
        let first = *iter.peek()?;
        let mut bounds = Self::from_point(first);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: LonLat) -> bool {
        p.lon >= self.min[0] && p.lon <= self.max[0] && p.lat >= self.min[1] && p.lat <= self.max[1]
    }

    pub fn width(&self) -> f64 {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> f64 {
        self.max[1] - self.min[1]
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::geo::LonLat;

    #[test]
    fn covering_extends_from_first_point() {
        let b = GeoBounds::covering([
            LonLat::new(0.0, 0.0),
            LonLat::new(10.0, 10.0),
            LonLat::new(20.0, 0.0),
        ])
        .expect("bounds");
        assert_eq!(b, GeoBounds::new([0.0, 0.0], [20.0, 10.0]));
    }

    #[test]
    fn single_point_is_degenerate_rectangle() {
        let b = GeoBounds::covering([LonLat::new(5.0, -3.0)]).unwrap();
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert!(b.contains(LonLat::new(5.0, -3.0)));
    }

    #[test]
    fn empty_input_has_no_bounds() {
        assert!(GeoBounds::covering(Vec::new()).is_none());
    }
}
