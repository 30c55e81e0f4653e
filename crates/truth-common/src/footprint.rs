//! Ground-footprint polygon computation.

use serde::{Deserialize, Serialize};

use crate::error::{TruthError, TruthResult};

/// Meters covered by one minute of arc in the fixed approximation used
/// throughout the pipeline.
pub const METERS_PER_ARC_MINUTE: f64 = 1602.0;

/// A rectangular ground footprint as a closed polygon ring.
///
/// Always exactly 5 (longitude, latitude) pairs, first equal to last,
/// wound counter-clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Footprint {
    ring: [[f64; 2]; 5],
}

impl Footprint {
    /// Compute the footprint centered on (lon, lat) with the given physical
    /// width and height in meters.
    ///
    /// Meters convert to degrees with the fixed arc-minute approximation:
    /// `degrees = (meters / 2) / (60 * 1602)`.
    pub fn compute(lon: f64, lat: f64, width_m: u32, height_m: u32) -> TruthResult<Self> {
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(TruthError::InvalidArgument(format!(
                "longitude out of range: {}",
                lon
            )));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(TruthError::InvalidArgument(format!(
                "latitude out of range: {}",
                lat
            )));
        }
        if width_m == 0 || height_m == 0 {
            return Err(TruthError::InvalidArgument(format!(
                "dimensions must be positive: {}x{} m",
                width_m, height_m
            )));
        }

        let half_w = degree_offset(width_m);
        let half_h = degree_offset(height_m);

        let west = lon - half_w;
        let east = lon + half_w;
        let south = lat - half_h;
        let north = lat + half_h;

        // Counter-clockwise from the southwest corner.
        Ok(Self {
            ring: [
                [west, south],
                [east, south],
                [east, north],
                [west, north],
                [west, south],
            ],
        })
    }

    /// The closed ring as (longitude, latitude) pairs.
    pub fn ring(&self) -> &[[f64; 2]; 5] {
        &self.ring
    }

    /// Westmost longitude of the footprint.
    pub fn west(&self) -> f64 {
        self.ring[0][0]
    }

    /// Eastmost longitude of the footprint.
    pub fn east(&self) -> f64 {
        self.ring[1][0]
    }

    /// Southmost latitude of the footprint.
    pub fn south(&self) -> f64 {
        self.ring[0][1]
    }

    /// Northmost latitude of the footprint.
    pub fn north(&self) -> f64 {
        self.ring[2][1]
    }

    /// Width of the footprint in degrees of longitude.
    pub fn width_degrees(&self) -> f64 {
        self.east() - self.west()
    }

    /// Height of the footprint in degrees of latitude.
    pub fn height_degrees(&self) -> f64 {
        self.north() - self.south()
    }
}

fn degree_offset(meters: u32) -> f64 {
    (meters as f64 / 2.0) / (60.0 * METERS_PER_ARC_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ring_is_closed_with_five_points() {
        let fp = Footprint::compute(101.1, 1.5, 500, 500).unwrap();
        assert_eq!(fp.ring().len(), 5);
        assert_eq!(fp.ring()[0], fp.ring()[4]);
    }

    #[test]
    fn test_ring_winds_counter_clockwise() {
        let fp = Footprint::compute(0.0, 0.0, 1000, 1000).unwrap();

        // Shoelace formula over the closed ring; positive area means CCW.
        let mut area = 0.0;
        for pair in fp.ring().windows(2) {
            area += pair[0][0] * pair[1][1] - pair[1][0] * pair[0][1];
        }
        assert!(area > 0.0, "ring must wind counter-clockwise");
    }

    #[test]
    fn test_dimensions_match_arc_minute_approximation() {
        let fp = Footprint::compute(101.1, 1.5, 500, 800).unwrap();

        let expected_w = 500.0 / (60.0 * METERS_PER_ARC_MINUTE);
        let expected_h = 800.0 / (60.0 * METERS_PER_ARC_MINUTE);
        assert!((fp.width_degrees() - expected_w).abs() < 1e-12);
        assert!((fp.height_degrees() - expected_h).abs() < 1e-12);
    }

    #[test]
    fn test_centered_on_input_point() {
        let fp = Footprint::compute(-60.25, 10.5, 400, 400).unwrap();
        let center_lon = (fp.west() + fp.east()) / 2.0;
        let center_lat = (fp.south() + fp.north()) / 2.0;
        assert!((center_lon - -60.25).abs() < 1e-12);
        assert!((center_lat - 10.5).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert!(Footprint::compute(181.0, 0.0, 500, 500).is_err());
        assert!(Footprint::compute(0.0, 95.0, 500, 500).is_err());
        assert!(Footprint::compute(f64::NAN, 0.0, 500, 500).is_err());
        assert!(Footprint::compute(0.0, 0.0, 0, 500).is_err());
    }
}
