use serde::{Deserialize, Serialize};
use std::sync::Mutex;

use super::Conversation;
use crate::snapshot::DiffPayload;

/// Changes reported by a [`Conversation`] to its observer.
///
/// Every state-changing mutation emits its specific event first and then
/// `ConversationChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ConversationEvent {
    /// Some part of the conversation changed and should be persisted.
    ConversationChanged,
    /// App release and/or SDK changed; payload keyed by `appRelease` / `sdk`.
    AppReleaseOrSdkChanged(DiffPayload),
    DeviceChanged(DiffPayload),
    PersonChanged(DiffPayload),
    UserInfoChanged,
    EngagementChanged,
}

impl ConversationEvent {
    /// Stable snake_case name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConversationChanged => "conversation_changed",
            Self::AppReleaseOrSdkChanged(_) => "app_release_or_sdk_changed",
            Self::DeviceChanged(_) => "device_changed",
            Self::PersonChanged(_) => "person_changed",
            Self::UserInfoChanged => "user_info_changed",
            Self::EngagementChanged => "engagement_changed",
        }
    }

    /// The diff carried by the event, if any.
    pub fn diff(&self) -> Option<&DiffPayload> {
        match self {
            Self::AppReleaseOrSdkChanged(diff)
            | Self::DeviceChanged(diff)
            | Self::PersonChanged(diff) => Some(diff),
            _ => None,
        }
    }
}

/// Receives conversation events synchronously, before the mutating call returns.
///
/// Events a handler does not care about are simply ignored by its `match`.
/// The conversation passed in already reflects the change.
pub trait ConversationObserver: Send + Sync {
    fn on_event(&self, conversation: &Conversation, event: &ConversationEvent);
}

impl<F> ConversationObserver for F
where
    F: Fn(&Conversation, &ConversationEvent) + Send + Sync,
{
    fn on_event(&self, conversation: &Conversation, event: &ConversationEvent) {
        self(conversation, event)
    }
}

/// Observer that keeps every event it receives, in order.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Mutex<Vec<ConversationEvent>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded events.
    pub fn events(&self) -> Vec<ConversationEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Removes and returns the recorded events.
    pub fn drain(&self) -> Vec<ConversationEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }

    /// Number of recorded events of the given kind.
    pub fn count(&self, kind: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| event.kind() == kind)
            .count()
    }
}

impl ConversationObserver for EventRecorder {
    fn on_event(&self, _conversation: &Conversation, event: &ConversationEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
