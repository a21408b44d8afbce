use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The recognized color tags of a favorite place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Color {
    Blue,
    Green,
    Red,
    Yellow,
}

impl Color {
    /// All recognized tags, in wire form.
    pub const ALL: [Color; 4] = [Color::Blue, Color::Green, Color::Red, Color::Yellow];

    /// The wire form of the tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Color::Blue => "BLUE",
            Color::Green => "GREEN",
            Color::Red => "RED",
            Color::Yellow => "YELLOW",
        }
    }
}

/// Returned when a string names no recognized color tag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown color '{0}'")]
pub struct UnknownColor(pub String);

impl FromStr for Color {
    type Err = UnknownColor;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::ALL
            .into_iter()
            .find(|color| color.as_str() == s)
            .ok_or_else(|| UnknownColor(s.to_string()))
    }
}

/// A persisted favorite place.
#[derive(Debug, Clone, Serialize)]
pub struct FavoritePlace {
    /// The unique identifier for the place.
    pub id: i64,
    /// The session that created the place.
    #[serde(skip_serializing)]
    pub session_id: Uuid,
    /// The title of the place.
    pub title: String,
    /// The latitude in decimal degrees.
    pub lat: f64,
    /// The longitude in decimal degrees.
    pub lon: f64,
    /// The color tag, `null` when none was given.
    pub color: Option<Color>,
    /// The timestamp when the place was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_tags_exactly() {
        for color in Color::ALL {
            assert_eq!(color.as_str().parse::<Color>(), Ok(color));
        }
        assert_eq!(
            "Red".parse::<Color>(),
            Err(UnknownColor("Red".to_string()))
        );
    }

    #[test]
    fn unknown_color_message_names_the_value() {
        let err = "BLACK".parse::<Color>().unwrap_err();
        assert_eq!(err.to_string(), "unknown color 'BLACK'");
    }
}
