//! Display units

use serde::Deserialize;

pub const M_PER_MI: f64 = 1_609.344;
pub const M_PER_KM: f64 = 1_000.0;
pub const MPS_TO_MIPH: f64 = 2.2369362921;
pub const MPS_TO_KPH: f64 = 3.6;
pub const S_PER_HR: i64 = 60 * 60;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    #[default]
    Mi,
    Km,
}

impl DistanceUnit {
    /// Meters per unit
    pub fn factor(&self) -> f64 {
        match self {
            DistanceUnit::Mi => M_PER_MI,
            DistanceUnit::Km => M_PER_KM,
        }
    }
}

/// Converts the tracker's SI values (meters, seconds) to the display unit
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Conversion {
    pub unit: DistanceUnit,
}

impl Conversion {
    pub fn new(unit: DistanceUnit) -> Self {
        Self { unit }
    }

    pub fn speed(&self, meters_per_second: f64) -> f64 {
        match self.unit {
            DistanceUnit::Mi => meters_per_second * MPS_TO_MIPH,
            DistanceUnit::Km => meters_per_second * MPS_TO_KPH,
        }
    }

    pub fn distance(&self, meters: f64) -> f64 {
        meters / self.unit.factor()
    }

    pub fn hours(&self, seconds: i64) -> i64 {
        seconds / S_PER_HR
    }

    pub fn minutes(&self, seconds: i64) -> i64 {
        seconds / 60 % 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_units() {
        let mi = Conversion::new(DistanceUnit::Mi);
        assert!((mi.distance(M_PER_MI * 2.0) - 2.0).abs() < 1e-9);
        assert!((mi.speed(10.0) - 22.369362921).abs() < 1e-9);

        let km = Conversion::new(DistanceUnit::Km);
        assert!((km.distance(10_460.0) - 10.46).abs() < 1e-9);
        assert!((km.speed(10.0) - 36.0).abs() < 1e-9);

        assert_eq!(2, km.hours(2 * 3600 + 59 * 60));
        assert_eq!(59, km.minutes(2 * 3600 + 59 * 60 + 30));
    }

    #[test]
    fn parse_unit() -> Result<(), String> {
        let unit: DistanceUnit = serde_yaml::from_str("km").map_err(|e| e.to_string())?;
        assert_eq!(DistanceUnit::Km, unit);
        Ok(())
    }
}
