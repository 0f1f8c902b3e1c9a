//! CSV location log source

use std::io::Read;

use csv::{Reader, StringRecord};
use geo::geometry::Point;
use log::debug;
use serde::Deserialize;
use time::format_description::well_known;
use time::OffsetDateTime;

use super::LocationSource;
use crate::{RawPosition, Result, TouringError};

/// Column names of the location log
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FieldsConfiguration {
    pub time: String,
    pub coordinates: String,
    pub speed: String,
    pub elevation: String,
    /// Coordinates are `lat,lng` instead of `lng,lat`
    pub flip_coordinates: bool,
}

impl Default for FieldsConfiguration {
    fn default() -> Self {
        Self {
            time: "time".to_string(),
            coordinates: "coordinates".to_string(),
            speed: "speed".to_string(),
            elevation: "elevation".to_string(),
            flip_coordinates: false,
        }
    }
}

/// Location log in CSV
pub struct CsvSource<T>
where
    T: Read,
{
    rdr: Reader<T>,
    fields: FieldsConfiguration,
}

impl<T> CsvSource<T>
where
    T: Read,
{
    pub fn new(rdr: Reader<T>, fields: Option<FieldsConfiguration>) -> Self {
        Self {
            rdr,
            fields: fields.unwrap_or_default(),
        }
    }
}

impl<T> LocationSource for CsvSource<T>
where
    T: Read,
{
    fn fetch(&mut self) -> Result<Vec<RawPosition>> {
        let mut pos = vec![];

        let mut header = self.rdr.headers()?.clone();
        let header_idx = parse_header(&self.fields, &mut header)?;

        for row in self.rdr.records() {
            let mut rec = row?;

            if rec.len() < 2 {
                continue;
            }

            match parse_row(&header_idx, &self.fields, &mut rec) {
                Ok(Some(raw)) => pos.push(raw),
                Ok(None) => debug!("Skipping row without coordinates: {:?}", rec),
                Err(e) => {
                    return Err(TouringError::InvalidRecord(format!(
                        "row {:?}: {}",
                        rec, e
                    )))
                }
            }
        }

        pos.sort_by_key(|p| p.time);

        Ok(pos)
    }
}

/// Field to index map
#[derive(Debug)]
struct FieldsIndex {
    coordinates: usize,
    time: usize,
    speed: Option<usize>,
    elevation: Option<usize>,
}

fn parse_header(
    fields: &FieldsConfiguration,
    header: &mut StringRecord,
) -> Result<FieldsIndex> {
    header.trim();

    let find = |name: &str| header.iter().position(|h| h.to_lowercase() == name);

    let coordinates = find(fields.coordinates.as_str())
        .ok_or_else(|| TouringError::InvalidRecord("Coordinates header not found".to_string()))?;
    let time = find(fields.time.as_str())
        .ok_or_else(|| TouringError::InvalidRecord("Time header not found".to_string()))?;

    Ok(FieldsIndex {
        coordinates,
        time,
        speed: find(fields.speed.as_str()),
        elevation: find(fields.elevation.as_str()),
    })
}

fn parse_row(
    header: &FieldsIndex,
    fields: &FieldsConfiguration,
    row: &mut StringRecord,
) -> std::result::Result<Option<RawPosition>, String> {
    row.trim();

    let raw_coordinates = row
        .get(header.coordinates)
        .ok_or("Coordinates field not found")?;
    let separator = match raw_coordinates {
        s if s.contains(',') => ',',
        s if s.contains(';') => ';',
        _ => ' ',
    };
    let scoordinates: Vec<&str> = raw_coordinates
        .split(separator)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    if scoordinates.len() != 2 {
        return Ok(None);
    }

    let (ilat, ilng) = if fields.flip_coordinates { (0, 1) } else { (1, 0) };

    let lat = scoordinates[ilat]
        .parse::<f64>()
        .map_err(|e| format!("Invalid latitude format: {}", e))?;
    let lng = scoordinates[ilng]
        .parse::<f64>()
        .map_err(|e| format!("Invalid longitude format: {}", e))?;

    let time = match row.get(header.time) {
        Some(d) => OffsetDateTime::parse(d, &well_known::Rfc3339)
            .map_err(|e| format!("Failed on parse the time: {}", e)),
        None => Err("Time field not found".to_string()),
    }?;

    let mut raw = RawPosition::basic(Point::new(lng, lat), time);

    if let Some(ispeed) = header.speed {
        raw.speed = row.get(ispeed).and_then(|d| d.parse::<f64>().ok());
    }

    if let Some(ielevation) = header.elevation {
        raw.altitude = row.get(ielevation).and_then(|d| d.parse::<f32>().ok());
    }

    Ok(Some(raw))
}

#[cfg(test)]
pub mod tests {
    use csv::ReaderBuilder;
    use geo::geometry::Point;
    use time::macros::datetime;

    use super::{CsvSource, FieldsConfiguration};
    use crate::sources::LocationSource;
    use crate::TouringError;

    #[test]
    fn location_log() -> Result<(), String> {
        let data = concat!(
            "time,coordinates,speed\n",
            "2023-05-01T10:00:02Z,\"-93.0913, 44.9554\",2.5\n",
            "2023-05-01T10:00:00Z,\"-93.0913 44.9544\",\n",
            "2023-05-01T10:00:04Z,\"-93.0913;44.9564\",3.1\n",
        );
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());

        let mut source = CsvSource::new(rdr, None);
        let positions = source.fetch().map_err(|e| e.to_string())?;
        assert_eq!(3, positions.len());

        assert_eq!(Point::new(-93.0913, 44.9544), positions[0].coordinates);
        assert_eq!(datetime!(2023-05-01 10:00:00 UTC), positions[0].time);
        assert_eq!(None, positions[0].speed);
        assert_eq!(Some(2.5), positions[1].speed);
        assert_eq!(Point::new(-93.0913, 44.9564), positions[2].coordinates);

        Ok(())
    }

    #[test]
    fn location_log_custom_fields() -> Result<(), String> {
        let data = concat!(
            "When,LatLng,alt\n",
            "2023-05-01T10:00:00Z,\"44.9544,-93.0913\",250\n",
            "2023-05-01T10:00:01Z,bogus,251\n",
        );
        let rdr = ReaderBuilder::new()
            .flexible(true)
            .from_reader(data.as_bytes());

        let fields = FieldsConfiguration {
            time: "when".to_string(),
            coordinates: "latlng".to_string(),
            elevation: "alt".to_string(),
            flip_coordinates: true,
            ..Default::default()
        };
        let mut source = CsvSource::new(rdr, Some(fields));
        let positions = source.fetch().map_err(|e| e.to_string())?;
        assert_eq!(1, positions.len());
        assert_eq!(Point::new(-93.0913, 44.9544), positions[0].coordinates);
        assert_eq!(Some(250.0), positions[0].altitude);

        Ok(())
    }

    #[test]
    fn location_log_errors() {
        let rdr = ReaderBuilder::new().from_reader("coordinates,speed\n\"1,2\",3\n".as_bytes());
        let mut source = CsvSource::new(rdr, None);
        assert!(matches!(source.fetch(), Err(TouringError::InvalidRecord(_))));

        let rdr = ReaderBuilder::new()
            .from_reader("time,coordinates\nyesterday,\"1,2\"\n".as_bytes());
        let mut source = CsvSource::new(rdr, None);
        assert!(matches!(source.fetch(), Err(TouringError::InvalidRecord(_))));
    }
}
