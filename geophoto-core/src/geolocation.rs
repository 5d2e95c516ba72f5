use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::Coordinates;

/// How long a position request may take before it counts as timed out.
pub const GEOLOCATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Why the current position couldn't be determined. Each variant carries its
/// own user-facing message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("Geolocation is not supported on this device.")]
    Unsupported,

    #[error("Permission to access your location was denied.")]
    PermissionDenied,

    #[error("Your location could not be determined.")]
    PositionUnavailable,

    #[error("Timed out while getting your location.")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// Oldest cached position that may be returned, zero forces a fresh fix.
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: GEOLOCATION_TIMEOUT,
            maximum_age: Duration::ZERO,
        }
    }
}

/// Source of the device's current position.
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn current_position(
        &self,
        options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError>;
}

/// Geolocator with a predetermined answer, for hosts that know their
/// position up front (or know they can't provide one).
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    answer: Result<Coordinates, GeolocationError>,
}

impl FixedGeolocator {
    pub fn at(coordinates: Coordinates) -> Self {
        Self {
            answer: Ok(coordinates),
        }
    }

    pub fn failing(error: GeolocationError) -> Self {
        Self { answer: Err(error) }
    }

    pub fn unsupported() -> Self {
        Self::failing(GeolocationError::Unsupported)
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(
        &self,
        _options: &PositionOptions,
    ) -> Result<Coordinates, GeolocationError> {
        self.answer
    }
}
