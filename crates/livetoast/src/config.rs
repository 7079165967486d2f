#![forbid(unsafe_code)]

//! Container configuration and attribute parsing.
//!
//! The container exposes exactly two data attributes: `position` and an
//! optional visible-toast cap (`maxToasts`). Each toast carries its own
//! `duration`. Strict parsers return [`ConfigError`]; the lenient helpers
//! used by the engine log a warning and fall back to the defaults below.
//!
//! | Attribute    | Missing      | Invalid              | Special        |
//! |--------------|--------------|----------------------|----------------|
//! | `position`   | bottom-right | bottom-right         |                |
//! | `maxToasts`  | unlimited    | unlimited            | `0` unlimited  |
//! | `duration`   | 6000 ms      | 6000 ms              | `<= 0` never   |

use core::fmt;
use core::str::FromStr;
use core::time::Duration;
use std::num::NonZeroUsize;

use livetoast_core::warn;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Auto-dismiss duration used when a toast has no usable `duration`.
pub const DEFAULT_DURATION: Duration = Duration::from_millis(6000);
/// Timer length after the pointer leaves a toast.
pub const RESUME_AFTER_HOVER: Duration = Duration::from_millis(2000);
/// Delay between measurement and re-enabling transitions.
pub const SETTLE_DELAY: Duration = Duration::from_millis(10);
/// Hide-animation length; evicted toasts are removed after this.
pub const HIDE_DELAY: Duration = Duration::from_millis(300);
/// Flash exit animation length.
pub const FLASH_EXIT_DELAY: Duration = Duration::from_millis(300);
/// Height assumed for a toast until it is measured.
pub const DEFAULT_HEIGHT: f64 = 80.0;
/// Vertical spacing between expanded toasts.
pub const DEFAULT_GAP: f64 = 15.0;

/// Screen corner (or edge center) the stack is anchored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToastPosition {
    /// Top-left corner.
    TopLeft,
    /// Top center.
    TopCenter,
    /// Top-right corner.
    TopRight,
    /// Bottom-left corner.
    BottomLeft,
    /// Bottom center.
    BottomCenter,
    /// Bottom-right corner.
    #[default]
    BottomRight,
}

impl ToastPosition {
    /// Every position, in attribute order.
    pub const ALL: [Self; 6] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    /// Attribute spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }

    /// Whether the stack hangs from the top edge.
    #[must_use]
    pub const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopCenter | Self::TopRight)
    }
}

impl fmt::Display for ToastPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToastPosition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|position| position.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::InvalidPosition {
                value: s.to_string(),
            })
    }
}

/// Auto-dismiss policy for one toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoDismiss {
    /// Stays until closed or removed by the server.
    Never,
    /// Removal is requested after this long without interaction.
    After(Duration),
}

impl AutoDismiss {
    /// Map a millisecond count; anything `<= 0` means never.
    #[must_use]
    pub fn from_millis(ms: i64) -> Self {
        match u64::try_from(ms) {
            Ok(0) | Err(_) => Self::Never,
            Ok(ms) => Self::After(Duration::from_millis(ms)),
        }
    }

    /// Timer length, if any.
    #[must_use]
    pub const fn duration(self) -> Option<Duration> {
        match self {
            Self::Never => None,
            Self::After(duration) => Some(duration),
        }
    }

    fn normalized(self) -> Self {
        match self {
            Self::After(duration) if duration.is_zero() => Self::Never,
            other => other,
        }
    }
}

/// Parse a toast `duration` attribute.
pub fn parse_duration(raw: &str) -> Result<AutoDismiss, ConfigError> {
    raw.trim()
        .parse::<i64>()
        .map(AutoDismiss::from_millis)
        .map_err(|_| ConfigError::InvalidDuration {
            value: raw.to_string(),
        })
}

/// Parse the container's visible-toast cap. `0` means unlimited.
pub fn parse_max_visible(raw: &str) -> Result<Option<NonZeroUsize>, ConfigError> {
    let value = raw
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidCap {
            value: raw.to_string(),
        })?;
    let value = usize::try_from(value).unwrap_or(usize::MAX);
    Ok(NonZeroUsize::new(value))
}

/// Lenient `duration` lookup used during reconciliation.
#[must_use]
#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
pub fn duration_or_default(raw: Option<&str>, default: Duration) -> AutoDismiss {
    let Some(raw) = raw else {
        return AutoDismiss::After(default).normalized();
    };
    match parse_duration(raw) {
        Ok(policy) => policy,
        Err(error) => {
            warn!(%error, "falling back to default toast duration");
            AutoDismiss::After(default).normalized()
        }
    }
}

/// Fixed delays and durations the engine schedules with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Auto-dismiss duration for toasts without a usable `duration`.
    #[serde(rename = "default_duration_ms", with = "millis")]
    pub default_duration: Duration,
    /// Timer armed when the pointer leaves a single toast.
    #[serde(rename = "resume_after_hover_ms", with = "millis")]
    pub resume_after_hover: Duration,
    /// Delay between measurement and the interactive state.
    #[serde(rename = "settle_delay_ms", with = "millis")]
    pub settle_delay: Duration,
    /// Delay between hiding an over-cap toast and requesting its removal.
    #[serde(rename = "hide_delay_ms", with = "millis")]
    pub hide_delay: Duration,
    /// Flash exit animation length.
    #[serde(rename = "flash_exit_delay_ms", with = "millis")]
    pub flash_exit_delay: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION,
            resume_after_hover: RESUME_AFTER_HOVER,
            settle_delay: SETTLE_DELAY,
            hide_delay: HIDE_DELAY,
            flash_exit_delay: FLASH_EXIT_DELAY,
        }
    }
}

mod millis {
    use core::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// The container's raw data attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDataset {
    /// `data-position`.
    #[serde(default)]
    pub position: Option<String>,
    /// `data-max-toasts`.
    #[serde(default)]
    pub max_toasts: Option<String>,
}

/// Configuration for one toast stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// Anchor position; decides the exit slide direction.
    pub position: ToastPosition,
    /// Maximum number of visible toasts. `None` is unlimited.
    pub max_visible: Option<NonZeroUsize>,
    /// Spacing between expanded toasts, in pixels.
    pub gap: f64,
    /// Height estimate used before measurement, in pixels.
    pub default_height: f64,
    /// Scheduling constants.
    pub timings: Timings,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            position: ToastPosition::default(),
            max_visible: None,
            gap: DEFAULT_GAP,
            default_height: DEFAULT_HEIGHT,
            timings: Timings::default(),
        }
    }
}

impl ContainerConfig {
    /// Create a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the container's data attributes, falling back per field.
    #[must_use]
    pub fn from_dataset(dataset: &ContainerDataset) -> Self {
        let mut config = Self::default();
        config.apply_dataset(dataset);
        config
    }

    /// Re-read the data attributes. Invalid values fall back to defaults.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn apply_dataset(&mut self, dataset: &ContainerDataset) {
        self.position = match dataset.position.as_deref() {
            None => ToastPosition::default(),
            Some(raw) => raw.parse().unwrap_or_else(|error: ConfigError| {
                warn!(%error, "falling back to default position");
                ToastPosition::default()
            }),
        };
        self.max_visible = match dataset.max_toasts.as_deref() {
            None => None,
            Some(raw) => parse_max_visible(raw).unwrap_or_else(|error| {
                warn!(%error, "ignoring visible-toast cap");
                None
            }),
        };
    }

    /// Set the anchor position.
    #[must_use]
    pub fn position(mut self, position: ToastPosition) -> Self {
        self.position = position;
        self
    }

    /// Set the visible-toast cap. `0` means unlimited.
    #[must_use]
    pub fn max_visible(mut self, max: usize) -> Self {
        self.max_visible = NonZeroUsize::new(max);
        self
    }

    /// Set the expanded-mode gap.
    #[must_use]
    pub fn gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    /// Set the pre-measurement height estimate.
    #[must_use]
    pub fn default_height(mut self, height: f64) -> Self {
        self.default_height = height;
        self
    }

    /// Replace the scheduling constants.
    #[must_use]
    pub fn timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }
}
