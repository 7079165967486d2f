#![forbid(unsafe_code)]

//! JSON message schema for the web host.
//!
//! The page (JS/TS) serializes everything it observes into [`HostMessage`]s:
//! stream updates, pointer input, animation frames with measured heights,
//! elapsed time and server flash events. Messages are `type`-tagged:
//!
//! ```json
//! {"type":"sync","wrappers":[{"id":"toasts-1","toast":{"toastId":"t1","duration":"4000"}}]}
//! {"type":"pointer","event":{"type":"container_enter"}}
//! {"type":"frame","heights":{"toasts-1":72.5}}
//! {"type":"advance","ms":16}
//! ```

use std::collections::BTreeMap;

use livetoast::{ContainerConfig, ContainerDataset, PointerEvent, WrapperElement, WrapperId};
use serde::{Deserialize, Serialize};

use crate::WebHostError;

/// One message from the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Create (or recreate) the stack.
    Init {
        #[serde(default)]
        config: ContainerConfig,
        /// Container data attributes, applied over `config`.
        #[serde(default)]
        dataset: Option<ContainerDataset>,
    },
    /// The wrapper list changed.
    Sync {
        wrappers: Vec<WrapperElement>,
        #[serde(default)]
        dataset: Option<ContainerDataset>,
    },
    /// Pointer input.
    Pointer { event: PointerEvent },
    /// Animation frame; `heights` are the rendered heights of toasts the page
    /// laid out since the last frame.
    Frame {
        #[serde(default)]
        heights: BTreeMap<WrapperId, f64>,
    },
    /// Elapsed time in milliseconds.
    Advance { ms: u64 },
    /// The server cleared a flash.
    ClearFlash { key: String },
    /// A flash element was rendered.
    FlashPresent { key: String },
    /// The container is going away.
    Destroy,
}

impl HostMessage {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Init { .. } => "init",
            Self::Sync { .. } => "sync",
            Self::Pointer { .. } => "pointer",
            Self::Frame { .. } => "frame",
            Self::Advance { .. } => "advance",
            Self::ClearFlash { .. } => "clear_flash",
            Self::FlashPresent { .. } => "flash_present",
            Self::Destroy => "destroy",
        }
    }
}

/// Parse one JSON message.
pub fn parse_message(json: &str) -> Result<HostMessage, WebHostError> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use livetoast::ToastPosition;

    #[test]
    fn parses_sync_with_dataset() {
        let message = parse_message(
            r#"{"type":"sync","wrappers":[{"id":"toasts-1","toast":{"toastId":"t1"}}],"dataset":{"maxToasts":"2"}}"#,
        )
        .expect("sync");
        let HostMessage::Sync { wrappers, dataset } = message else {
            panic!("expected sync");
        };
        assert_eq!(wrappers.len(), 1);
        assert_eq!(dataset.and_then(|d| d.max_toasts).as_deref(), Some("2"));
    }

    #[test]
    fn parses_init_with_defaults() {
        let message = parse_message(r#"{"type":"init"}"#).expect("init");
        assert_eq!(
            message,
            HostMessage::Init {
                config: ContainerConfig::default(),
                dataset: None
            }
        );

        let message =
            parse_message(r#"{"type":"init","config":{"position":"top-center"}}"#).expect("init");
        let HostMessage::Init { config, .. } = message else {
            panic!("expected init");
        };
        assert_eq!(config.position, ToastPosition::TopCenter);
    }

    #[test]
    fn parses_nested_pointer_event() {
        let message =
            parse_message(r#"{"type":"pointer","event":{"type":"close_click","wrapper":"w"}}"#)
                .expect("pointer");
        assert_eq!(message.kind(), "pointer");
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(matches!(
            parse_message(r#"{"type":"teleport"}"#),
            Err(WebHostError::Json(_))
        ));
    }
}
