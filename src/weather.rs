//! Weather overlay
//!
//! Weather is fetched independently of the ride loop and only merged into the
//! published ride state for display, it never feeds back into the tracking.

use geo::geometry::Point;

use crate::Result;

/// Current conditions at the rider's position
#[derive(Clone, Debug, PartialEq)]
pub struct Weather {
    pub temperature_c: f64,
    /// Relative humidity, percent
    pub humidity: u8,
    pub wind_kph: f64,
    /// Direction the wind blows from, degrees
    pub wind_degree: u16,
    pub condition: String,
}

/// Weather service client
pub trait WeatherSource: Send {
    /// Fetch the current conditions at the coordinates
    fn fetch(&mut self, coordinates: Point) -> Result<Weather>;
}

/// Compass sector (0 = n, 1 = ne ... 7 = nw) of a direction in degrees
pub fn compass_sector(degrees: u16) -> u8 {
    ((u32::from(degrees) * 10 + 225) / 450 % 8) as u8
}

/// Wind sector relative to the rider's bearing sector
pub fn relative_sector(wind: u8, bearing: u8) -> u8 {
    let (wind, bearing) = (wind % 8, bearing % 8);
    if wind < bearing {
        8 + wind - bearing
    } else {
        wind - bearing
    }
}
