use garde::Validate;
use serde::Deserialize;
use unicode_general_category::{GeneralCategory, get_general_category};

use crate::error::{AppError, Result};
use crate::models::place::Color;

/// Titles of this many characters or more are rejected.
pub const TITLE_MAX_CHARS: usize = 999;

/// The raw, form-encoded creation request. Every field arrives as text.
#[derive(Deserialize, Debug, Default, Clone)]
pub struct PlaceForm {
    pub title: Option<String>,
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub color: Option<String>,
}

/// A decoded creation request, ready for validation.
#[derive(Debug, Clone, PartialEq, Validate)]
pub struct NewPlace {
    #[garde(length(chars, min = 1, max = TITLE_MAX_CHARS), custom(title_text))]
    pub title: String,
    #[garde(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[garde(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    #[garde(skip)]
    pub color: Option<Color>,
}

/// Letters and digits, the combining marks that attach to them, and spaces.
fn is_title_char(c: char) -> bool {
    c == ' '
        || c.is_alphanumeric()
        || matches!(
            get_general_category(c),
            GeneralCategory::NonspacingMark
                | GeneralCategory::SpacingMark
                | GeneralCategory::EnclosingMark
        )
}

fn title_text(value: &str, _: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    if let Some(c) = value.chars().find(|c| !is_title_char(*c)) {
        return Err(garde::Error::new(format!(
            "may only contain letters, digits and spaces, found '{}'",
            c
        )));
    }
    Ok(())
}

/// Parses a coordinate. Non-finite values never decode.
fn parse_coordinate(name: &str, raw: &str) -> std::result::Result<f64, String> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(format!("{}: '{}' is not a decimal number", name, raw)),
    }
}

/// Decodes the raw form into typed fields.
///
/// Reports every missing or malformed field at once as `AppError::Decode`.
pub fn decode(form: PlaceForm) -> Result<NewPlace> {
    let mut problems = Vec::new();

    let title = form.title;
    if title.is_none() {
        problems.push("title: is required".to_string());
    }

    let mut coordinate = |name: &str, raw: Option<String>| match raw {
        Some(raw) => parse_coordinate(name, &raw)
            .map_err(|problem| problems.push(problem))
            .ok(),
        None => {
            problems.push(format!("{}: is required", name));
            None
        }
    };
    let lat = coordinate("lat", form.lat);
    let lon = coordinate("lon", form.lon);

    let color = match form.color.as_deref() {
        None | Some("") => None,
        Some(raw) => match raw.parse::<Color>() {
            Ok(color) => Some(color),
            Err(e) => {
                let allowed: Vec<&str> = Color::ALL.iter().map(Color::as_str).collect();
                problems.push(format!("color: {}, expected one of {}", e, allowed.join(", ")));
                None
            }
        },
    };

    match (title, lat, lon) {
        (Some(title), Some(lat), Some(lon)) if problems.is_empty() => Ok(NewPlace {
            title,
            lat,
            lon,
            color,
        }),
        _ => Err(AppError::Decode(problems.join("; "))),
    }
}

/// Checks every field constraint of a decoded place.
pub fn validate(place: &NewPlace) -> Result<()> {
    place.validate().map_err(|report| {
        let message = report
            .iter()
            .map(|(path, error)| format!("{}: {}", path, error))
            .collect::<Vec<_>>()
            .join("; ");
        AppError::Validation(message)
    })
}

/// Decodes and validates a raw form in one step.
pub fn decode_and_validate(form: PlaceForm) -> Result<NewPlace> {
    let place = decode(form)?;
    validate(&place)?;
    Ok(place)
}
