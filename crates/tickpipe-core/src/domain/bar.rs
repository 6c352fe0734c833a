use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::{Interval, Symbol, ValidationError};

/// Start of a sampled interval, in the timezone the provider reported it in.
///
/// Renders as ISO-8601 with whole seconds. The UTC offset is appended only
/// when the provider supplied one, so a naive provider timestamp stays naive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalStart {
    local: PrimitiveDateTime,
    offset: Option<UtcOffset>,
}

impl IntervalStart {
    pub const fn naive(local: PrimitiveDateTime) -> Self {
        Self {
            local,
            offset: None,
        }
    }

    pub fn zoned(value: OffsetDateTime) -> Self {
        Self {
            local: PrimitiveDateTime::new(value.date(), value.time()),
            offset: Some(value.offset()),
        }
    }

    /// Unix seconds shifted into the exchange's local offset.
    pub fn from_unix(seconds: i64, offset: UtcOffset) -> Result<Self, ValidationError> {
        let utc = OffsetDateTime::from_unix_timestamp(seconds).map_err(|_| {
            ValidationError::InvalidTimestamp {
                value: seconds.to_string(),
            }
        })?;
        Ok(Self::zoned(utc.to_offset(offset)))
    }

    /// Accepts RFC 3339 (`2024-01-02T09:30:00-05:00`) or a naive
    /// `YYYY-MM-DDTHH:MM:SS` timestamp.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if let Ok(zoned) = OffsetDateTime::parse(trimmed, &Rfc3339) {
            return Ok(Self::zoned(zoned));
        }

        PrimitiveDateTime::parse(
            trimmed,
            format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
        )
        .map(Self::naive)
        .map_err(|_| ValidationError::InvalidTimestamp {
            value: input.to_owned(),
        })
    }

    pub const fn offset(&self) -> Option<UtcOffset> {
        self.offset
    }

    pub fn isoformat(&self) -> String {
        self.to_string()
    }
}

impl Display for IntervalStart {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let date = self.local.date();
        let time = self.local.time();
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            date.year(),
            u8::from(date.month()),
            date.day(),
            time.hour(),
            time.minute(),
            time.second()
        )?;

        if let Some(offset) = self.offset {
            let (hours, minutes, _) = offset.as_hms();
            let sign = if offset.is_negative() { '-' } else { '+' };
            write!(f, "{sign}{:02}:{:02}", hours.unsigned_abs(), minutes.unsigned_abs())?;
        }

        Ok(())
    }
}

impl Serialize for IntervalStart {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IntervalStart {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}

/// One OHLCV sample for a fixed time bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntervalBar {
    pub start: IntervalStart,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl IntervalBar {
    /// Prices must be finite and non-negative. The high/low envelope is not
    /// checked; provider values are passed through as reported.
    pub fn new(
        start: IntervalStart,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_price("open", open)?;
        validate_price("high", high)?;
        validate_price("low", low)?;
        validate_price("close", close)?;

        Ok(Self {
            start,
            open,
            high,
            low,
            close,
            volume,
        })
    }
}

/// Bars for one symbol at one granularity, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    pub symbol: Symbol,
    pub interval: Interval,
    pub bars: Vec<IntervalBar>,
}

impl BarSeries {
    pub fn new(symbol: Symbol, interval: Interval, bars: Vec<IntervalBar>) -> Self {
        Self {
            symbol,
            interval,
            bars,
        }
    }

    pub fn latest(&self) -> Option<&IntervalBar> {
        self.bars.last()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

fn validate_price(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn naive_start_renders_without_offset() {
        let start = IntervalStart::naive(datetime!(2024-01-02 09:00:00));
        assert_eq!(start.isoformat(), "2024-01-02T09:00:00");
    }

    #[test]
    fn unix_start_is_shifted_into_exchange_offset() {
        // 2024-01-02T14:30:00Z
        let start = IntervalStart::from_unix(1_704_205_800, offset!(-5)).expect("valid");
        assert_eq!(start.isoformat(), "2024-01-02T09:30:00-05:00");
    }

    #[test]
    fn utc_offset_renders_as_plus_zero() {
        let start = IntervalStart::from_unix(0, UtcOffset::UTC).expect("valid");
        assert_eq!(start.isoformat(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn parses_both_naive_and_zoned_forms() {
        let naive = IntervalStart::parse("2024-01-02T09:00:00").expect("naive");
        assert_eq!(naive.offset(), None);

        let zoned = IntervalStart::parse("2024-01-02T09:30:00+05:30").expect("zoned");
        assert_eq!(zoned.isoformat(), "2024-01-02T09:30:00+05:30");

        assert!(IntervalStart::parse("yesterday").is_err());
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let start = IntervalStart::naive(datetime!(2024-01-02 09:00:00));
        assert_eq!(
            IntervalBar::new(start, -1.0, 1.0, 1.0, 1.0, 0),
            Err(ValidationError::NegativeValue { field: "open" })
        );
        assert_eq!(
            IntervalBar::new(start, 1.0, f64::NAN, 1.0, 1.0, 0),
            Err(ValidationError::NonFiniteValue { field: "high" })
        );
    }

    #[test]
    fn latest_is_last_bar() {
        let symbol = Symbol::parse("AAPL").expect("valid");
        let early = IntervalBar::new(
            IntervalStart::naive(datetime!(2024-01-02 09:00:00)),
            1.0,
            2.0,
            0.5,
            1.5,
            10,
        )
        .expect("valid");
        let late = IntervalBar::new(
            IntervalStart::naive(datetime!(2024-01-02 10:00:00)),
            1.5,
            2.5,
            1.0,
            2.0,
            20,
        )
        .expect("valid");

        let series = BarSeries::new(symbol.clone(), Interval::OneHour, vec![early, late.clone()]);
        assert_eq!(series.latest(), Some(&late));

        let empty = BarSeries::new(symbol, Interval::OneHour, Vec::new());
        assert!(empty.is_empty());
        assert_eq!(empty.latest(), None);
    }
}
