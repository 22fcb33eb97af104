//! Angle and sky-coordinate normalization for astroquery request values.
//!
//! Request parameters arrive as free text (`"5 arcmin"`, `"10.5 41.2"`,
//! `"10h20m30s"`). They are parsed into [`Angle`]s and written back as
//! canonical strings in degrees or arcminutes.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AstroError, AstroResult};

static RE_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)\s*([A-Za-z'"]+)?$"#).unwrap()
});

static RE_HMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+(?:\.\d*)?)h(?:(\d+(?:\.\d*)?)m(?:(\d+(?:\.\d*)?)s?)?)?$").unwrap()
});

static RE_DMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+(?:\.\d*)?)d(?:(\d+(?:\.\d*)?)m(?:(\d+(?:\.\d*)?)s?)?)?$").unwrap()
});

static RE_COLON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-])?(\d+(?:\.\d*)?):(\d+(?:\.\d*)?)(?::(\d+(?:\.\d*)?))?$").unwrap()
});

/// Angular units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AngleUnit {
    Degree,
    Arcminute,
    Arcsecond,
    HourAngle,
    Radian,
}

impl AngleUnit {
    /// Size of one unit in arcseconds. Integral for the sexagesimal units so
    /// conversions between them use exact ratios.
    fn arcsec(self) -> f64 {
        match self {
            Self::Degree => 3600.0,
            Self::Arcminute => 60.0,
            Self::Arcsecond => 1.0,
            Self::HourAngle => 54000.0,
            Self::Radian => 648000.0 / std::f64::consts::PI,
        }
    }

    fn from_suffix(suffix: &str) -> Option<Self> {
        Some(match suffix {
            "deg" | "degree" | "degrees" | "d" => Self::Degree,
            "arcmin" | "'" => Self::Arcminute,
            "arcsec" | "\"" => Self::Arcsecond,
            "rad" | "radian" | "radians" => Self::Radian,
            "hourangle" | "h" | "hour" | "hours" => Self::HourAngle,
            _ => return None,
        })
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Degree => "deg",
            Self::Arcminute => "arcmin",
            Self::Arcsecond => "arcsec",
            Self::HourAngle => "hourangle",
            Self::Radian => "rad",
        })
    }
}

/// An angle, kept in the unit it was written in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    value: f64,
    unit: AngleUnit,
}

impl Angle {
    pub fn new(value: f64, unit: AngleUnit) -> Self {
        Self { value, unit }
    }

    /// Parse `text`. Bare numbers and the `1:2:3` form take `default_unit`
    /// and fail with [`AstroError::MissingUnit`] without one.
    pub fn parse(text: &str, default_unit: Option<AngleUnit>) -> AstroResult<Self> {
        let input = text.trim();
        let invalid = || AstroError::InvalidAngle {
            input: text.to_string(),
        };

        if let Some(caps) = RE_DECIMAL.captures(input) {
            let value: f64 = caps[1].parse().map_err(|_| invalid())?;
            let unit = match caps.get(2) {
                Some(suffix) => AngleUnit::from_suffix(suffix.as_str()).ok_or_else(invalid)?,
                None => default_unit.ok_or_else(|| AstroError::MissingUnit {
                    input: text.to_string(),
                })?,
            };
            return Ok(Self::new(value, unit));
        }

        let sexagesimal = |caps: regex::Captures<'_>, unit: AngleUnit| -> AstroResult<Self> {
            let part = |i: usize| -> AstroResult<f64> {
                caps.get(i)
                    .map_or(Ok(0.0), |m| m.as_str().parse().map_err(|_| invalid()))
            };
            let magnitude = part(2)? + part(3)? / 60.0 + part(4)? / 3600.0;
            let sign = if caps.get(1).is_some_and(|m| m.as_str() == "-") {
                -1.0
            } else {
                1.0
            };
            Ok(Self::new(sign * magnitude, unit))
        };

        if let Some(caps) = RE_HMS.captures(input) {
            return sexagesimal(caps, AngleUnit::HourAngle);
        }
        if let Some(caps) = RE_DMS.captures(input) {
            return sexagesimal(caps, AngleUnit::Degree);
        }
        if let Some(caps) = RE_COLON.captures(input) {
            let unit = default_unit.ok_or_else(|| AstroError::MissingUnit {
                input: text.to_string(),
            })?;
            return sexagesimal(caps, unit);
        }
        Err(invalid())
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// The angle expressed in `unit`.
    pub fn to(&self, unit: AngleUnit) -> f64 {
        if unit == self.unit {
            return self.value;
        }
        self.value * (self.unit.arcsec() / unit.arcsec())
    }

    pub fn degrees(&self) -> f64 {
        self.to(AngleUnit::Degree)
    }

    pub fn arcmin(&self) -> f64 {
        self.to(AngleUnit::Arcminute)
    }
}

/// An equatorial position in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyCoord {
    ra: f64,
    dec: f64,
}

impl SkyCoord {
    /// Right ascension and declination, degrees unless a unit is written.
    /// RA wraps into [0, 360); declination must lie within [-90, 90].
    pub fn from_pair(ra: &str, dec: &str) -> AstroResult<Self> {
        let ra = Angle::parse(ra, Some(AngleUnit::Degree))?.degrees();
        let dec = Angle::parse(dec, Some(AngleUnit::Degree))?.degrees();
        if !(-90.0..=90.0).contains(&dec) {
            return Err(AstroError::DeclinationOutOfRange { degrees: dec });
        }
        Ok(Self {
            ra: ra.rem_euclid(360.0),
            dec,
        })
    }

    /// Parse `"<ra> <dec>"`. Tokens after the first two are ignored.
    pub fn parse(text: &str) -> AstroResult<Self> {
        let mut tokens = text.split_whitespace();
        match (tokens.next(), tokens.next()) {
            (Some(ra), Some(dec)) => Self::from_pair(ra, dec),
            _ => Err(AstroError::CoordinateArity {
                input: text.to_string(),
            }),
        }
    }

    pub fn ra_deg(&self) -> f64 {
        self.ra
    }

    pub fn dec_deg(&self) -> f64 {
        self.dec
    }
}

/// Shortest round-trip rendering of `x`, always with a fractional part or an
/// exponent: `5.0`, `10.5`, `1e-05`, `1.5e+16`.
pub fn format_float(x: f64) -> String {
    if x.is_nan() {
        return "nan".into();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let magnitude = x.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{x:e}");
        let (mantissa, exponent) = formatted.split_once('e').unwrap_or((&formatted, "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let formatted = format!("{x}");
    if formatted.contains('.') {
        formatted
    } else {
        format!("{formatted}.0")
    }
}
