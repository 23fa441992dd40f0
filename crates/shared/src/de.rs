//! Serde helpers for numeric fields that may be sent as text.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            Self::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    fn as_i32(&self) -> Option<i32> {
        let value = self.as_f64()?;
        if value.fract() != 0.0 || value < i32::MIN as f64 || value > i32::MAX as f64 {
            return None;
        }
        Some(value as i32)
    }

    fn into_text(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s,
        }
    }
}

/// An integer given as a JSON number or a numeric string.
pub fn i32_lenient<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    raw.as_i32()
        .ok_or_else(|| serde::de::Error::custom("expected an integer"))
}

pub fn option_i32_lenient<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(raw) => raw
            .as_i32()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected an integer")),
        None => Ok(None),
    }
}

pub fn option_f64_lenient<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(raw) => raw
            .as_f64()
            .filter(|v| v.is_finite())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("expected a number")),
        None => Ok(None),
    }
}

/// A string field that also accepts a bare JSON number, keeping its text form.
pub fn text_lenient<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    NumberOrText::deserialize(deserializer).map(NumberOrText::into_text)
}
