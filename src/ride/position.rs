//! Position definition

use geo::geometry::Point;
use geo::HaversineDistance;
use time::OffsetDateTime;

/// Raw version of a position, as delivered by the location provider
#[derive(Clone, Debug, PartialEq)]
pub struct RawPosition {
    pub coordinates: Point,
    pub time: OffsetDateTime,
    /// Reported speed in m/s, if the provider has one
    pub speed: Option<f64>,
    pub precision: Option<f32>,
    pub altitude: Option<f32>,
}

impl RawPosition {
    pub fn basic(coordinates: Point, time: OffsetDateTime) -> Self {
        Self {
            coordinates,
            time,
            speed: None,
            precision: None,
            altitude: None,
        }
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);

        self
    }
}

/// Position sample with a resolved speed
#[derive(Clone, Debug, PartialEq)]
pub struct Position {
    pub coordinates: Point,
    /// m/s
    pub speed: f64,
    pub time: OffsetDateTime,
}

impl Position {
    /// Resolve the raw sample, deriving the speed from the displacement
    /// since `previous` when the provider didn't report a usable one
    pub fn resolve(raw: &RawPosition, previous: Option<&Position>) -> Self {
        let speed = match raw.speed {
            Some(s) if s.is_finite() => s.max(0.0),
            _ => match previous {
                Some(prev) => {
                    let elapsed = (raw.time - prev.time).as_seconds_f64();
                    if elapsed > 0.0 {
                        raw.coordinates.haversine_distance(&prev.coordinates) / elapsed
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            },
        };

        Self {
            coordinates: raw.coordinates,
            speed,
            time: raw.time,
        }
    }

    /// Great-circle distance in meters
    pub fn distance_to(&self, other: &Position) -> f64 {
        self.coordinates.haversine_distance(&other.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn reported_speed_wins() {
        let raw = RawPosition::basic(Point::new(-93.0913, 44.9544), datetime!(2023-05-01 10:00 UTC))
            .with_speed(4.2);
        let pos = Position::resolve(&raw, None);
        assert_eq!(4.2, pos.speed);

        let raw = raw.with_speed(-1.0);
        assert_eq!(0.0, Position::resolve(&raw, None).speed);
    }

    #[test]
    fn derived_speed() {
        let p1 = Position::resolve(
            &RawPosition::basic(Point::new(-93.0913, 44.9544), datetime!(2023-05-01 10:00:00 UTC)),
            None,
        );
        assert_eq!(0.0, p1.speed);

        // ~111m north in 10s
        let raw = RawPosition::basic(
            Point::new(-93.0913, 44.9554),
            datetime!(2023-05-01 10:00:10 UTC),
        );
        let p2 = Position::resolve(&raw, Some(&p1));
        assert!((p2.speed - 11.1).abs() < 0.1, "speed {}", p2.speed);
        assert!((p2.distance_to(&p1) - 111.2).abs() < 0.5);

        let same_time = RawPosition::basic(
            Point::new(-93.0913, 44.9564),
            datetime!(2023-05-01 10:00:00 UTC),
        );
        assert_eq!(0.0, Position::resolve(&same_time, Some(&p1)).speed);
    }
}
