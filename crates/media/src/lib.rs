//! Stylelens Media Queries
//!
//! Media-query parsing and evaluation against a viewport/device snapshot.

pub mod error;
pub mod query;

pub use error::MediaError;
pub use query::{MediaCondition, MediaQuery, MediaQueryList, MediaType};

use serde::{Deserialize, Serialize};

/// Viewport/device metrics used to evaluate `@media` activation
///
/// Treated as an immutable snapshot per inspection; every computation that
/// needs media evaluation receives one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Viewport width in CSS pixels
    pub viewport_width: f32,
    /// Viewport height in CSS pixels
    pub viewport_height: f32,
    /// Device (screen) width in CSS pixels
    pub device_width: f32,
    /// Device (screen) height in CSS pixels
    pub device_height: f32,
    /// Device pixel ratio
    pub device_pixel_ratio: f32,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            viewport_width: 1024.0,
            viewport_height: 768.0,
            device_width: 1024.0,
            device_height: 768.0,
            device_pixel_ratio: 1.0,
        }
    }
}

impl Environment {
    /// Create an environment with equal viewport and device metrics
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            device_width: width,
            device_height: height,
            device_pixel_ratio: 1.0,
        }
    }

    /// Set the device metrics
    pub fn with_device(mut self, width: f32, height: f32, pixel_ratio: f32) -> Self {
        self.device_width = width;
        self.device_height = height;
        self.device_pixel_ratio = pixel_ratio;
        self
    }
}

/// Parse and evaluate a media query text against an environment.
///
/// Empty text means "no condition" and matches. Unparseable text logs a
/// warning and reports non-matching.
pub fn media_matches(text: &str, env: &Environment) -> bool {
    if text.trim().is_empty() {
        return true;
    }
    match MediaQueryList::parse(text) {
        Ok(list) => list.evaluate(env),
        Err(error) => {
            log::warn!("unparseable media query {:?}: {}", text, error);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches() {
        assert!(media_matches("", &Environment::default()));
        assert!(media_matches("   ", &Environment::default()));
    }

    #[test]
    fn test_min_width() {
        let env = Environment::new(800.0, 600.0);
        assert!(media_matches("(min-width: 600px)", &env));
        assert!(!media_matches("(min-width: 900px)", &env));
    }

    #[test]
    fn test_unparseable_query_does_not_match() {
        assert!(!media_matches("(min-width: 600px", &Environment::default()));
    }
}
