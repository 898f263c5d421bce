//! Media Query Parser and Evaluator
//!
//! Parses raw media query text into a small query model and evaluates it
//! against an [`Environment`](crate::Environment). Values are resolved to
//! CSS pixels (lengths) or dppx (resolutions) at parse time.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{MediaError, MediaResult};
use crate::Environment;

/// Root em size used to resolve em/rem lengths in media queries
const ROOT_FONT_SIZE: f32 = 16.0;

/// A comma-separated list of media queries (OR semantics)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaQueryList {
    /// The alternative queries
    pub queries: Vec<MediaQuery>,
}

/// One media query: optional modifier, optional type, and-joined conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaQuery {
    /// Whether the query is negated with `not`
    pub negated: bool,
    /// Media type, if stated
    pub media_type: Option<MediaType>,
    /// Parenthesized feature conditions
    pub conditions: Vec<MediaCondition>,
}

/// Media type keyword
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    All,
    Screen,
    Print,
    Speech,
    Other(String),
}

/// Range prefix on a feature name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangePrefix {
    Min,
    Max,
    Exact,
}

/// A single parenthesized feature condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MediaCondition {
    /// width against the viewport, in px
    Width(RangePrefix, f32),
    /// height against the viewport, in px
    Height(RangePrefix, f32),
    /// device-width, in px
    DeviceWidth(RangePrefix, f32),
    /// device-height, in px
    DeviceHeight(RangePrefix, f32),
    /// viewport aspect ratio (width / height)
    AspectRatio(RangePrefix, f32),
    /// resolution, in dppx
    Resolution(RangePrefix, f32),
    /// orientation keyword
    Orientation(Orientation),
    /// a feature this evaluator does not know; never matches
    Unknown(String),
}

/// Orientation keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl MediaQueryList {
    /// Parse a media query list from raw text
    pub fn parse(text: &str) -> MediaResult<Self> {
        let queries = split_top_level_commas(text)?
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .map(MediaQuery::parse)
            .collect::<MediaResult<Vec<_>>>()?;
        Ok(Self { queries })
    }

    /// Evaluate the list: true when any query matches (or the list is empty)
    pub fn evaluate(&self, env: &Environment) -> bool {
        if self.queries.is_empty() {
            return true;
        }
        self.queries.iter().any(|query| query.evaluate(env))
    }
}

impl MediaQuery {
    /// Parse a single query (no top-level commas)
    pub fn parse(text: &str) -> MediaResult<Self> {
        let tokens = tokenize_query(text)?;
        let mut negated = false;
        let mut media_type = None;
        let mut conditions = Vec::new();

        for token in tokens {
            match token {
                QueryToken::Word(word) => match word.to_ascii_lowercase().as_str() {
                    "not" => negated = true,
                    "only" | "and" => {}
                    other => media_type = Some(MediaType::from_keyword(other)),
                },
                QueryToken::Group(inner) => conditions.push(parse_condition(&inner)?),
            }
        }

        Ok(Self {
            negated,
            media_type,
            conditions,
        })
    }

    /// Evaluate the query against an environment
    pub fn evaluate(&self, env: &Environment) -> bool {
        // an unknown feature poisons the whole query, negated or not
        if self
            .conditions
            .iter()
            .any(|condition| matches!(condition, MediaCondition::Unknown(_)))
        {
            return false;
        }

        let type_matches = self
            .media_type
            .as_ref()
            .map_or(true, MediaType::is_active_medium);
        let features_match = self
            .conditions
            .iter()
            .all(|condition| condition.evaluate(env));

        let matches = type_matches && features_match;
        if self.negated {
            !matches
        } else {
            matches
        }
    }
}

impl MediaType {
    fn from_keyword(word: &str) -> Self {
        match word {
            "all" => Self::All,
            "screen" => Self::Screen,
            "print" => Self::Print,
            "speech" => Self::Speech,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether this medium describes the inspected (screen) context
    fn is_active_medium(&self) -> bool {
        matches!(self, Self::All | Self::Screen)
    }
}

impl MediaCondition {
    /// Evaluate the condition against an environment
    pub fn evaluate(&self, env: &Environment) -> bool {
        match self {
            Self::Width(prefix, value) => compare(*prefix, env.viewport_width, *value),
            Self::Height(prefix, value) => compare(*prefix, env.viewport_height, *value),
            Self::DeviceWidth(prefix, value) => compare(*prefix, env.device_width, *value),
            Self::DeviceHeight(prefix, value) => compare(*prefix, env.device_height, *value),
            Self::AspectRatio(prefix, value) => {
                let actual = if env.viewport_height > 0.0 {
                    env.viewport_width / env.viewport_height
                } else {
                    0.0
                };
                compare(*prefix, actual, *value)
            }
            Self::Resolution(prefix, value) => compare(*prefix, env.device_pixel_ratio, *value),
            Self::Orientation(orientation) => {
                let actual = if env.viewport_height >= env.viewport_width {
                    Orientation::Portrait
                } else {
                    Orientation::Landscape
                };
                actual == *orientation
            }
            Self::Unknown(_) => false,
        }
    }
}

/// Compare an actual metric against a threshold under a range prefix
fn compare(prefix: RangePrefix, actual: f32, value: f32) -> bool {
    match prefix {
        RangePrefix::Min => actual >= value,
        RangePrefix::Max => actual <= value,
        RangePrefix::Exact => (actual - value).abs() < f32::EPSILON * 8.0,
    }
}

/// Token in a single media query
enum QueryToken {
    /// A bare word (not, only, and, or a media type)
    Word(String),
    /// The inside of a parenthesized group
    Group(String),
}

/// Split query text into words and parenthesized groups
fn tokenize_query(text: &str) -> MediaResult<Vec<QueryToken>> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some((index, character)) = chars.next() {
        match character {
            character if character.is_whitespace() => {}
            '(' => {
                let mut depth = 1;
                let mut end = None;
                for (inner_index, inner) in chars.by_ref() {
                    match inner {
                        '(' => depth += 1,
                        ')' => {
                            depth -= 1;
                            if depth == 0 {
                                end = Some(inner_index);
                                break;
                            }
                        }
                        _ => {}
                    }
                }
                let Some(end) = end else {
                    return Err(MediaError::UnbalancedParen {
                        query: text.to_string(),
                    });
                };
                tokens.push(QueryToken::Group(text[index + 1..end].to_string()));
            }
            _ => {
                let start = index;
                let mut end = text.len();
                while let Some(&(next_index, next)) = chars.peek() {
                    if next.is_whitespace() || next == '(' {
                        end = next_index;
                        break;
                    }
                    chars.next();
                }
                tokens.push(QueryToken::Word(text[start..end].to_string()));
            }
        }
    }

    Ok(tokens)
}

/// Split on commas outside parentheses
fn split_top_level_commas(text: &str) -> MediaResult<SmallVec<[&str; 4]>> {
    let mut parts: SmallVec<[&str; 4]> = SmallVec::new();
    let mut depth: i32 = 0;
    let mut start = 0;
    for (index, character) in text.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(MediaError::UnbalancedParen {
            query: text.to_string(),
        });
    }
    parts.push(&text[start..]);
    Ok(parts)
}

/// Parse the inside of a parenthesized feature condition
fn parse_condition(inner: &str) -> MediaResult<MediaCondition> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(MediaError::EmptyFeature);
    }

    let (raw_name, raw_value) = match inner.split_once(':') {
        Some((name, value)) => (name.trim(), Some(value.trim())),
        None => (inner, None),
    };
    let name = raw_name.to_ascii_lowercase();

    let (prefix, base) = if let Some(base) = name.strip_prefix("min-") {
        (RangePrefix::Min, base)
    } else if let Some(base) = name.strip_prefix("max-") {
        (RangePrefix::Max, base)
    } else {
        (RangePrefix::Exact, name.as_str())
    };

    let condition = match (base, raw_value) {
        ("width", Some(value)) => MediaCondition::Width(prefix, parse_length(value)?),
        ("height", Some(value)) => MediaCondition::Height(prefix, parse_length(value)?),
        ("device-width", Some(value)) => MediaCondition::DeviceWidth(prefix, parse_length(value)?),
        ("device-height", Some(value)) => {
            MediaCondition::DeviceHeight(prefix, parse_length(value)?)
        }
        ("aspect-ratio", Some(value)) => MediaCondition::AspectRatio(prefix, parse_ratio(value)?),
        ("resolution", Some(value)) => MediaCondition::Resolution(prefix, parse_resolution(value)?),
        ("orientation", Some("portrait")) => MediaCondition::Orientation(Orientation::Portrait),
        ("orientation", Some("landscape")) => MediaCondition::Orientation(Orientation::Landscape),
        _ => {
            log::debug!("unknown media feature: {:?}", inner);
            MediaCondition::Unknown(inner.to_string())
        }
    };
    Ok(condition)
}

/// Parse a length value to CSS pixels (px, em, rem)
fn parse_length(value: &str) -> MediaResult<f32> {
    let value = value.trim();
    let (number, factor) = if let Some(number) = value.strip_suffix("px") {
        (number, 1.0)
    } else if let Some(number) = value.strip_suffix("rem") {
        (number, ROOT_FONT_SIZE)
    } else if let Some(number) = value.strip_suffix("em") {
        (number, ROOT_FONT_SIZE)
    } else {
        (value, 1.0)
    };
    number
        .trim()
        .parse::<f32>()
        .map(|parsed| parsed * factor)
        .map_err(|_| MediaError::InvalidValue {
            value: value.to_string(),
        })
}

/// Parse a resolution value to dppx (dppx, x, dpi)
fn parse_resolution(value: &str) -> MediaResult<f32> {
    let value = value.trim();
    let (number, factor) = if let Some(number) = value.strip_suffix("dppx") {
        (number, 1.0)
    } else if let Some(number) = value.strip_suffix("dpi") {
        (number, 1.0 / 96.0)
    } else if let Some(number) = value.strip_suffix('x') {
        (number, 1.0)
    } else {
        (value, 1.0)
    };
    number
        .trim()
        .parse::<f32>()
        .map(|parsed| parsed * factor)
        .map_err(|_| MediaError::InvalidValue {
            value: value.to_string(),
        })
}

/// Parse an aspect ratio: `16/9` or a bare number
fn parse_ratio(value: &str) -> MediaResult<f32> {
    let value = value.trim();
    if let Some((width, height)) = value.split_once('/') {
        let width: f32 = width.trim().parse().map_err(|_| MediaError::InvalidRatio {
            value: value.to_string(),
        })?;
        let height: f32 = height.trim().parse().map_err(|_| MediaError::InvalidRatio {
            value: value.to_string(),
        })?;
        if height == 0.0 {
            return Err(MediaError::InvalidRatio {
                value: value.to_string(),
            });
        }
        Ok(width / height)
    } else {
        value.parse().map_err(|_| MediaError::InvalidRatio {
            value: value.to_string(),
        })
    }
}
