//! Validated geographic coordinates.

use thiserror::Error;

/// Errors raised when a latitude/longitude pair fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is out of range [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} is out of range [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A latitude/longitude pair in degrees.
///
/// Construction through [`Coordinate::new`] is the validation gate: a value
/// of this type always satisfies latitude ∈ [-90, 90] and
/// longitude ∈ [-180, 180]. Non-finite components are rejected as well.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Validate a degree pair and build a coordinate.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordinateError> {
        // RangeInclusive::contains is false for NaN, so non-finite values
        // fall out here without a separate check.
        if !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::LatitudeOutOfRange(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(CoordinateError::LongitudeOutOfRange(lon));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}
