//! Sample intervals and update periods.
//!
//! Interval strings are `<n><unit>` with a case-insensitive unit: none for
//! minutes, `H` hours, `D` days, `W` weeks, `M` months (30 days).

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// Granularities the market data source can serve directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Minute,
    Hour,
    Day,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub num: u32,
    pub unit: Unit,
}

impl Interval {
    pub fn seconds(&self) -> u64 {
        let factor: u64 = match self.unit {
            Unit::Minute => 60,
            Unit::Hour => 60 * 60,
            Unit::Day => 60 * 60 * 24,
            Unit::Week => 60 * 60 * 24 * 7,
            Unit::Month => 60 * 60 * 24 * 30,
        };
        self.num as u64 * factor
    }

    /// The fetch resolution and aggregation factor for this interval.
    pub fn resolution(&self) -> (Resolution, u32) {
        match self.unit {
            Unit::Minute if self.num < 60 => (Resolution::Minute, self.num),
            Unit::Minute => (Resolution::Hour, self.num / 60),
            Unit::Hour => (Resolution::Hour, self.num),
            Unit::Day => (Resolution::Day, self.num),
            Unit::Week => (Resolution::Day, self.num.saturating_mul(7)),
            Unit::Month => (Resolution::Day, self.num.saturating_mul(30)),
        }
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let (digits, rest) = trimmed.split_at(digits_end);

        let num = if digits.is_empty() {
            1
        } else {
            digits
                .parse::<u32>()
                .map_err(|e| format!("invalid interval count '{}': {}", digits, e))?
        };
        if num == 0 {
            return Err("interval count must be positive".to_string());
        }

        let unit = match rest.trim().to_ascii_uppercase().as_str() {
            "" => Unit::Minute,
            "H" => Unit::Hour,
            "D" => Unit::Day,
            "W" => Unit::Week,
            "M" => Unit::Month,
            other => return Err(format!("unknown interval unit '{}'", other)),
        };

        Ok(Interval { num, unit })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = match self.unit {
            Unit::Minute => "",
            Unit::Hour => "H",
            Unit::Day => "D",
            Unit::Week => "W",
            Unit::Month => "M",
        };
        write!(f, "{}{}", self.num, unit)
    }
}

/// Parses an update period such as `30s`, `15m`, `1h` or `1h30m`.
pub fn parse_period(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty period".to_string());
    }

    let mut total = 0u64;
    let mut digits = String::new();
    for ch in s.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let factor = match ch {
            's' => 1,
            'm' => 60,
            'h' => 60 * 60,
            _ => return Err(format!("unknown period unit '{}' in '{}'", ch, s)),
        };
        let n: u64 = digits
            .parse()
            .map_err(|_| format!("missing number before '{}' in '{}'", ch, s))?;
        total += n * factor;
        digits.clear();
    }
    if !digits.is_empty() {
        return Err(format!("missing unit after '{}' in '{}'", digits, s));
    }
    if total == 0 {
        return Err("period must be positive".to_string());
    }
    Ok(Duration::from_secs(total))
}
