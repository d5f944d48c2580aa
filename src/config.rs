//! Widget configuration - timing windows and gesture thresholds.
//!
//! Every field has a default matching the site's original behavior, so a
//! partial JSON document only overrides what it names:
//!
//! ```ignore
//! let config = WidgetConfig::from_json(r#"{ "autoplay_interval_ms": 8000 }"#)?;
//! assert_eq!(config.carousel_settle_ms, 500);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Timing and threshold settings shared by all widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Delay between a modal becoming visible and focus moving into it.
    pub modal_focus_delay_ms: u64,
    /// Delay between the nav menu expanding and its first link taking focus.
    pub nav_focus_delay_ms: u64,
    /// Busy window after each carousel transition.
    pub carousel_settle_ms: u64,
    /// Carousel autoplay period. Zero disables autoplay.
    pub autoplay_interval_ms: u64,
    /// Minimum horizontal swipe distance, in pixels, that changes slides.
    pub swipe_threshold_px: f64,
    /// How long a live-region announcement stays in the document.
    pub announcement_ttl_ms: u64,
    /// Simulated latency of a form submission.
    pub submit_latency_ms: u64,
    /// How long the form success message stays visible.
    pub success_message_ttl_ms: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            modal_focus_delay_ms: 100,
            nav_focus_delay_ms: 100,
            carousel_settle_ms: 500,
            autoplay_interval_ms: 5000,
            swipe_threshold_px: 50.0,
            announcement_ttl_ms: 1000,
            submit_latency_ms: 2000,
            success_message_ttl_ms: 5000,
        }
    }
}

impl WidgetConfig {
    /// Parse a (possibly partial) JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
