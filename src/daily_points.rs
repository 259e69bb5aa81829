use anyhow::Result;
use chrono::{DateTime, Local, TimeZone, Timelike};
use serde_json::Value;

/// One retained sample: a history entry whose local time-of-day is exactly
/// midnight. Source order is preserved, the series is never re-sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyPricePoint {
    pub timestamp: DateTime<Local>,
    pub price: String,
}

/// Decodes the raw API payload and keeps one data point per day (00:00:00).
///
/// A body that is not JSON at all fails the whole run. A payload missing the
/// `data.history` array degrades to an empty series, and a single malformed
/// entry is skipped; both recovered cases leave a diagnostic on stderr.
pub fn extract(raw: &str) -> Result<Vec<DailyPricePoint>> {
    let parsed: Value = serde_json::from_str(raw)?;

    let history = match parsed
        .get("data")
        .and_then(|d| d.get("history"))
        .and_then(Value::as_array)
    {
        Some(arr) => arr,
        None => {
            eprintln!("Data not in expected format: missing data.history");
            return Ok(Vec::new());
        }
    };

    let mut result = Vec::new();

    for entry in history {
        let fields = entry
            .get("timestamp")
            .and_then(Value::as_i64)
            .zip(entry.get("price").and_then(Value::as_str));

        let Some((millis, price)) = fields else {
            eprintln!("Improperly formatted datapoint: {}", entry);
            continue;
        };

        // A millisecond value chrono cannot place on the calendar is treated
        // like any other malformed entry.
        let Some(time) = Local.timestamp_millis_opt(millis).single() else {
            eprintln!("Improperly formatted datapoint: {}", entry);
            continue;
        };

        if time.hour() == 0 && time.minute() == 0 && time.second() == 0 {
            result.push(DailyPricePoint {
                timestamp: time,
                price: price.to_string(),
            });
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn local_millis(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, mo, d, h, mi, s)
            .unwrap()
            .timestamp_millis()
    }

    fn payload(history: Value) -> String {
        json!({ "data": { "history": history } }).to_string()
    }

    #[test]
    fn keeps_only_midnight_entries_in_order() {
        let raw = payload(json!([
            { "timestamp": local_millis(2019, 10, 20, 0, 0, 0), "price": "100" },
            { "timestamp": local_millis(2019, 10, 20, 12, 0, 0), "price": "150" },
            { "timestamp": local_millis(2019, 10, 21, 0, 0, 0), "price": "90" },
            { "timestamp": local_millis(2019, 10, 22, 0, 0, 0), "price": "90" },
        ]));

        let points = extract(&raw).unwrap();
        let prices: Vec<&str> = points.iter().map(|p| p.price.as_str()).collect();
        assert_eq!(prices, ["100", "90", "90"]);
        assert!(points.iter().all(|p| p.timestamp.hour() == 0));
    }

    #[test]
    fn skips_entries_missing_fields() {
        let raw = payload(json!([
            { "timestamp": local_millis(2019, 10, 20, 0, 0, 0), "price": "100" },
            { "price": "42" },
            { "timestamp": local_millis(2019, 10, 21, 0, 0, 0) },
            { "timestamp": local_millis(2019, 10, 22, 0, 0, 0), "price": "90" },
        ]));

        let points = extract(&raw).unwrap();
        let prices: Vec<&str> = points.iter().map(|p| p.price.as_str()).collect();
        assert_eq!(prices, ["100", "90"]);
    }

    #[test]
    fn skips_entries_with_mistyped_fields() {
        let raw = payload(json!([
            { "timestamp": "not-a-number", "price": "100" },
            { "timestamp": local_millis(2019, 10, 20, 0, 0, 0), "price": 100 },
            { "timestamp": local_millis(2019, 10, 21, 0, 0, 0), "price": "90" },
        ]));

        let points = extract(&raw).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, "90");
    }

    #[test]
    fn missing_history_path_yields_empty_series() {
        let raw = json!({ "data": { "prices": [] } }).to_string();
        assert!(extract(&raw).unwrap().is_empty());

        let raw = json!({ "status": "ok" }).to_string();
        assert!(extract(&raw).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_is_fatal() {
        assert!(extract("not json").is_err());
        assert!(extract("").is_err());
    }
}
