// Temperature units and conversions
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    #[serde(rename = "C")]
    Celsius,
    #[serde(rename = "F")]
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}

impl Default for TemperatureUnit {
    fn default() -> Self {
        TemperatureUnit::Fahrenheit
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemperatureUnit::Celsius => write!(f, "C"),
            TemperatureUnit::Fahrenheit => write!(f, "F"),
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "C" | "c" => Ok(TemperatureUnit::Celsius),
            "F" | "f" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit: {}", other)),
        }
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

pub fn fahrenheit_to_celsius(fahrenheit: f64) -> f64 {
    (fahrenheit - 32.0) * 5.0 / 9.0
}

pub fn convert(temp: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => celsius_to_fahrenheit(temp),
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => fahrenheit_to_celsius(temp),
        _ => temp,
    }
}

/// Source telemetry is always Celsius.
pub fn for_display(celsius: f64, unit: TemperatureUnit) -> f64 {
    convert(celsius, TemperatureUnit::Celsius, unit)
}

const THRESHOLD_MIN_F: f64 = 60.0;
const THRESHOLD_MAX_F: f64 = 100.0;

/// "Hot" temperature band drawn on the temperature chart. The value and its
/// input bounds are expressed in `unit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HotThreshold {
    pub enabled: bool,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub unit: TemperatureUnit,
}

impl HotThreshold {
    /// Threshold given in Fahrenheit, expressed in `unit`.
    pub fn new(enabled: bool, value_f: f64, unit: TemperatureUnit) -> Self {
        Self {
            enabled,
            value: value_f,
            min: THRESHOLD_MIN_F,
            max: THRESHOLD_MAX_F,
            unit: TemperatureUnit::Fahrenheit,
        }
        .rescaled(unit)
    }

    /// Re-expresses value and bounds in `unit`, rounding to whole degrees.
    pub fn rescaled(self, unit: TemperatureUnit) -> Self {
        if unit == self.unit {
            return self;
        }
        Self {
            enabled: self.enabled,
            value: convert(self.value, self.unit, unit).round(),
            min: convert(THRESHOLD_MIN_F, TemperatureUnit::Fahrenheit, unit).round(),
            max: convert(THRESHOLD_MAX_F, TemperatureUnit::Fahrenheit, unit).round(),
            unit,
        }
    }

    pub fn with_value(self, value: f64) -> Self {
        Self {
            value: value.clamp(self.min, self.max),
            ..self
        }
    }

    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}

impl Default for HotThreshold {
    fn default() -> Self {
        Self::new(false, 75.0, TemperatureUnit::Fahrenheit)
    }
}
