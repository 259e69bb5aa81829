use crate::daily_points::DailyPricePoint;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer, de};
use std::path::Path;
use std::str::FromStr;
use tokio::fs;

// Timestamp format for results (e.g. "2019-10-22T00:00:00").
const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Same,
    Na,
}

/// Day-over-day price difference. The first record has no previous day to
/// compare against and carries the literal "na" instead of a number.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Change {
    Delta(Decimal),
    Na,
}

impl Serialize for Change {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Change::Delta(delta) => Serialize::serialize(delta, serializer),
            Change::Na => serializer.serialize_str("na"),
        }
    }
}

impl<'de> Deserialize<'de> for Change {
    fn deserialize<D: de::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "na" {
            Ok(Change::Na)
        } else {
            Decimal::from_str(&raw)
                .map(Change::Delta)
                .map_err(de::Error::custom)
        }
    }
}

// The extremum flags are the strings "true"/"false" on the wire.
mod flag {
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "true" } else { "false" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match String::deserialize(deserializer)?.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(de::Error::custom(format!("expected true/false, got {}", other))),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ExportRecord {
    pub date: String,
    pub price: String,
    pub direction: Direction,
    pub change: Change,
    #[serde(rename = "dayOfWeek")]
    pub day_of_week: String,
    #[serde(rename = "highSinceStart", with = "flag")]
    pub high_since_start: bool,
    #[serde(rename = "lowSinceStart", with = "flag")]
    pub low_since_start: bool,
}

fn parse_price(price: &str) -> Result<Decimal> {
    Decimal::from_str(price).with_context(|| format!("unparseable price {:?}", price))
}

/// Annotates the daily series with direction, day-over-day change and
/// since-start extremum flags, in a single left-to-right pass.
///
/// The series must be non-empty; the running min/max/previous scalars are
/// seeded from the first day's price. Ties count as a new extremum.
pub fn build_records(series: &[DailyPricePoint]) -> Result<Vec<ExportRecord>> {
    let first = series
        .first()
        .context("no daily points to export, series is empty")?;
    let first_price = parse_price(&first.price)?;

    let mut min = first_price;
    let mut max = first_price;
    let mut prev = first_price;

    let mut results = Vec::with_capacity(series.len());

    for point in series {
        let cur = parse_price(&point.price)?;

        let direction = if cur < prev {
            Direction::Down
        } else if cur > prev {
            Direction::Up
        } else {
            Direction::Same
        };

        let low_since_start = cur <= min;
        if low_since_start {
            min = cur;
        }

        let high_since_start = cur >= max;
        if high_since_start {
            max = cur;
        }

        results.push(ExportRecord {
            date: point.timestamp.format(DATE_FORMAT).to_string(),
            // The upstream string form is carried verbatim, only the math
            // runs on the parsed decimal.
            price: point.price.clone(),
            direction,
            change: Change::Delta(cur - prev),
            day_of_week: point.timestamp.format("%A").to_string(),
            high_since_start,
            low_since_start,
        });

        prev = cur;
    }

    // The first day has nothing to compare against.
    results[0].direction = Direction::Na;
    results[0].change = Change::Na;

    Ok(results)
}

/// Builds the annotated records and writes them to `destination` as a JSON
/// array, 4-space indented when `pretty` is set.
pub async fn export(series: &[DailyPricePoint], destination: &Path, pretty: bool) -> Result<()> {
    let records = build_records(series)?;

    let json_bytes = if pretty {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        records.serialize(&mut ser)?;
        buf
    } else {
        serde_json::to_vec(&records)?
    };

    let file_name = destination
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("invalid destination path {:?}", destination))?;

    // Write to a .tmp file first, then rename over the final name, so a crash
    // mid-write never leaves a truncated results file behind.
    let tmp_path = destination.with_file_name(format!("{}.tmp", file_name));
    fs::write(&tmp_path, &json_bytes).await?;
    fs::rename(&tmp_path, destination).await?;

    Ok(())
}
