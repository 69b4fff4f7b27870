//! Contract with the hosting framework.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// How the host opened the form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    New,
    Edit,
    View,
    Disabled,
}

impl DisplayMode {
    /// Modes that read an existing record
    pub fn reads_record(&self) -> bool {
        matches!(self, DisplayMode::Edit | DisplayMode::View)
    }

    /// Modes that may write
    pub fn is_writable(&self) -> bool {
        matches!(self, DisplayMode::New | DisplayMode::Edit)
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayMode::New => "new",
            DisplayMode::Edit => "edit",
            DisplayMode::View => "view",
            DisplayMode::Disabled => "disabled",
        };
        f.write_str(s)
    }
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "new" => Ok(DisplayMode::New),
            "edit" => Ok(DisplayMode::Edit),
            "view" => Ok(DisplayMode::View),
            "disabled" => Ok(DisplayMode::Disabled),
            other => Err(format!("unknown display mode: {}", other)),
        }
    }
}

/// Callbacks into the hosting framework.
///
/// `form_closed` is invoked exactly once per session; `form_saved` at most once
/// and always before it.
pub trait FormHost: Send + Sync {
    /// Informational message (e.g. save succeeded)
    fn notify(&self, message: &str);

    /// User-facing error
    fn alert(&self, message: &str);

    /// The record was written
    fn form_saved(&self);

    /// The session is over
    fn form_closed(&self, was_saved: bool);
}

/// Event captured by [`RecordingHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Notify(String),
    Alert(String),
    Saved,
    Closed { was_saved: bool },
}

/// Host that records every callback, for embedding in tests and tools.
#[derive(Debug, Default)]
pub struct RecordingHost {
    events: Mutex<Vec<HostEvent>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events so far, oldest first
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Alerts so far
    pub fn alerts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HostEvent::Alert(m) => Some(m),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: HostEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl FormHost for RecordingHost {
    fn notify(&self, message: &str) {
        self.push(HostEvent::Notify(message.to_string()));
    }

    fn alert(&self, message: &str) {
        self.push(HostEvent::Alert(message.to_string()));
    }

    fn form_saved(&self) {
        self.push(HostEvent::Saved);
    }

    fn form_closed(&self, was_saved: bool) {
        self.push(HostEvent::Closed { was_saved });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mode_parse() {
        assert_eq!("Edit".parse::<DisplayMode>().unwrap(), DisplayMode::Edit);
        assert_eq!(DisplayMode::New.to_string(), "new");
        assert!("create".parse::<DisplayMode>().is_err());
    }

    #[test]
    fn test_display_mode_capabilities() {
        assert!(!DisplayMode::New.reads_record());
        assert!(DisplayMode::View.reads_record());
        assert!(!DisplayMode::View.is_writable());
        assert!(DisplayMode::Edit.is_writable());
    }

    #[test]
    fn test_recording_host() {
        let host = RecordingHost::new();
        host.alert("boom");
        host.form_closed(false);
        assert_eq!(host.alerts(), vec!["boom".to_string()]);
        assert_eq!(host.events().last(), Some(&HostEvent::Closed { was_saved: false }));
    }
}
