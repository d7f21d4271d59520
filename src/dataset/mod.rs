//! Transit dataset collaborator.
//!
//! Reads tabular astrological transit rows from a CSV file. Expected column
//! order: body, date, time, motion, sign lord, star lord, sub lord, sign,
//! nakshatra, pada, position, declination; the first row is a header.
//! Malformed rows are skipped with a warning; only failing to open the file
//! is an error.

use std::path::Path;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::warn;

use crate::domain::CelestialBody;
use crate::error::DatasetError;

/// Direction of apparent motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Direct,
    Retrograde,
}

/// One transit table row.
#[derive(Debug, Clone)]
pub struct TransitRow {
    pub body: CelestialBody,
    pub at: DateTime<Utc>,
    pub motion: Motion,
    pub sign_lord: String,
    pub star_lord: String,
    pub sub_lord: String,
    pub sign: String,
    pub nakshatra: String,
    /// Nakshatra quarter, 1 through 4.
    pub pada: u8,
    /// Absolute ecliptic longitude derived from the sign and position columns.
    pub longitude: f64,
    pub declination: f64,
}

/// Load all well-formed rows from a transit table.
///
/// `offset` is the timezone the date and time columns are expressed in.
pub fn load_transits(
    path: impl AsRef<Path>,
    offset: FixedOffset,
) -> Result<Vec<TransitRow>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path.as_ref())?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                warn!(error = %error, "Skipping unreadable dataset record");
                continue;
            }
        };
        match parse_row(&record, offset) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                let line = record.position().map_or(0, |p| p.line());
                warn!(line, reason = %reason, "Skipping malformed dataset row");
            }
        }
    }
    Ok(rows)
}

fn parse_row(record: &csv::StringRecord, offset: FixedOffset) -> Result<TransitRow, String> {
    if record.len() < 12 {
        return Err(format!("expected 12 columns, found {}", record.len()));
    }

    let body: CelestialBody = record[0].parse().map_err(|e| format!("{e}"))?;

    let date = NaiveDate::parse_from_str(&record[1], "%Y-%m-%d")
        .map_err(|e| format!("bad date: {e}"))?;
    let time = NaiveTime::parse_from_str(&record[2], "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(&record[2], "%H:%M"))
        .map_err(|e| format!("bad time: {e}"))?;
    let at = offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .ok_or("ambiguous local timestamp")?
        .with_timezone(&Utc);

    let motion = parse_motion(&record[3])?;
    let sign = record[7].to_string();
    let sign_base = zodiac_base(&sign)?;

    let pada: u8 = record[9]
        .parse()
        .map_err(|_| format!("bad pada: {}", &record[9]))?;
    if !(1..=4).contains(&pada) {
        return Err(format!("pada out of range: {pada}"));
    }

    let within_sign = parse_dms(&record[10])?;
    let declination: f64 = record[11]
        .parse()
        .map_err(|_| format!("bad declination: {}", &record[11]))?;

    Ok(TransitRow {
        body,
        at,
        motion,
        sign_lord: record[4].to_string(),
        star_lord: record[5].to_string(),
        sub_lord: record[6].to_string(),
        sign,
        nakshatra: record[8].to_string(),
        pada,
        longitude: sign_base + within_sign,
        declination,
    })
}

fn parse_motion(field: &str) -> Result<Motion, String> {
    match field.chars().next().map(|c| c.to_ascii_uppercase()) {
        Some('D') => Ok(Motion::Direct),
        Some('R') => Ok(Motion::Retrograde),
        _ => Err(format!("bad motion flag: {field}")),
    }
}

/// Longitude at which a zodiac sign begins.
fn zodiac_base(sign: &str) -> Result<f64, String> {
    const SIGNS: [&str; 12] = [
        "Aries",
        "Taurus",
        "Gemini",
        "Cancer",
        "Leo",
        "Virgo",
        "Libra",
        "Scorpio",
        "Sagittarius",
        "Capricorn",
        "Aquarius",
        "Pisces",
    ];
    SIGNS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(sign.trim()))
        .map(|index| index as f64 * 30.0)
        .ok_or_else(|| format!("unknown zodiac sign: {sign}"))
}

/// Parse a degrees-minutes-seconds position like `12°34'56"` (seconds
/// optional) into fractional degrees within the sign.
fn parse_dms(field: &str) -> Result<f64, String> {
    let parts: Vec<u32> = field
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<u32>().map_err(|_| format!("bad position: {field}")))
        .collect::<Result<_, _>>()?;

    match parts.as_slice() {
        [d] => Ok(f64::from(*d)),
        [d, m] => Ok(f64::from(*d) + f64::from(*m) / 60.0),
        [d, m, s] => Ok(f64::from(*d) + f64::from(*m) / 60.0 + f64::from(*s) / 3600.0),
        _ => Err(format!("bad position: {field}")),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const HEADER: &str =
        "body,date,time,motion,sign_lord,star_lord,sub_lord,sign,nakshatra,pada,position,declination\n";

    fn ist() -> FixedOffset {
        FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap()
    }

    fn write_dataset(rows: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(HEADER.as_bytes()).unwrap();
        file.write_all(rows.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parses_well_formed_rows() {
        let file = write_dataset(
            "Jupiter,2026-03-02,09:15,D,Mars,Venus,Saturn,Aries,Bharani,2,10°30'00\",22.5\n\
             Moon,2026-03-02,09:15:30,R,Venus,Sun,Mercury,Taurus,Krittika,4,0°15'30\",-4.25\n",
        );

        let rows = load_transits(file.path(), ist()).unwrap();
        assert_eq!(rows.len(), 2);

        let jupiter = &rows[0];
        assert_eq!(jupiter.body, CelestialBody::Jupiter);
        assert_eq!(jupiter.motion, Motion::Direct);
        assert_eq!(jupiter.sign, "Aries");
        assert_eq!(jupiter.pada, 2);
        assert!((jupiter.longitude - 10.5).abs() < 1e-9);
        assert!((jupiter.declination - 22.5).abs() < 1e-9);

        let moon = &rows[1];
        assert_eq!(moon.motion, Motion::Retrograde);
        // Taurus starts at 30°.
        assert!((moon.longitude - (30.0 + 0.25 + 30.0 / 3600.0)).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let file = write_dataset(
            "Pluto,2026-03-02,09:15,D,Mars,Venus,Saturn,Aries,Bharani,2,10°30'00\",22.5\n\
             Jupiter,2026-03-02,09:15,D,Mars,Venus,Saturn,Aries,Bharani,9,10°30'00\",22.5\n\
             Jupiter,not-a-date,09:15,D,Mars,Venus,Saturn,Aries,Bharani,2,10°30'00\",22.5\n\
             Sun,2026-03-02,10:00,D,Mars,Venus,Saturn,Leo,Magha,1,5°00'00\",12.0\n",
        );

        let rows = load_transits(file.path(), ist()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].body, CelestialBody::Sun);
        // Leo starts at 120°.
        assert!((rows[0].longitude - 125.0).abs() < 1e-9);
    }

    #[test]
    fn test_timestamps_converted_from_market_offset() {
        let file = write_dataset(
            "Sun,2026-03-02,09:15,D,Mars,Venus,Saturn,Leo,Magha,1,5°00'00\",12.0\n",
        );

        let rows = load_transits(file.path(), ist()).unwrap();
        // 09:15 IST is 03:45 UTC.
        assert_eq!(rows[0].at.format("%H:%M").to_string(), "03:45");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_transits("/nonexistent/transits.csv", ist());
        assert!(result.is_err());
    }
}
