use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fixed vocabulary of outbound device actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CustomAction {
    Wake,
    Refresh,
    ScreenWake,
    Alarm,
    Play,
    Pause,
    Stop,
    PlayMedia,
    SetVolume,
    ToastMessage,
}

impl CustomAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wake => "wake",
            Self::Refresh => "refresh",
            Self::ScreenWake => "screen-wake",
            Self::Alarm => "alarm",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::PlayMedia => "play-media",
            Self::SetVolume => "set-volume",
            Self::ToastMessage => "toast-message",
        }
    }
}

impl std::fmt::Display for CustomAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One outbound action with its optional flat payload. Fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub action: CustomAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Map<String, Value>>,
}

impl Command {
    pub fn new(action: CustomAction, payload: Option<Map<String, Value>>) -> Self {
        Self { action, payload }
    }

    pub fn bare(action: CustomAction) -> Self {
        Self::new(action, None)
    }
}
