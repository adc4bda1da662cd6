//! The live conversation aggregate.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use super::event::{ConversationEvent, ConversationObserver};
use super::legacy::LegacyConversation;
use super::model::{ConversationState, ConversationStatus, Identity};
use crate::engagement::{Engagement, EngagementNamespace};
use crate::environment::Environment;
use crate::error::{EngageError, Result};
use crate::snapshot::{
    AppRelease, AttributeMap, AttributeValue, Device, DiffPayload, Person, Sdk, Snapshot,
};

/// All locally known state for one user/device engagement session.
///
/// A conversation is constructed in one of three ways:
///
/// - [`Conversation::new`] for a fresh install (no identity yet)
/// - [`Conversation::migrate`] from a [`LegacyConversation`]
/// - [`Conversation::restore`] from a previously persisted [`ConversationState`]
///
/// Mutations are synchronous. Snapshot updates work on a copy which is diffed
/// against the retained snapshot; only an actual difference replaces the
/// snapshot, marks the conversation dirty and notifies the observer. The swap
/// is committed before the observer runs.
///
/// The type is not internally synchronized and expects a single logical caller.
pub struct Conversation {
    state: ConversationState,
    environment: Arc<dyn Environment>,
    observer: Option<Arc<dyn ConversationObserver>>,
    dirty: bool,
}

impl fmt::Debug for Conversation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Conversation")
            .field("state", &self.state)
            .field("environment", &"<dyn Environment>")
            .field("observer", &self.observer.as_ref().map(|_| "<dyn ConversationObserver>"))
            .field("dirty", &self.dirty)
            .finish()
    }
}

impl Conversation {
    // ============================================================================
    // Construction
    // ============================================================================

    /// Creates a conversation for a fresh install.
    ///
    /// Snapshots are taken from the environment; the person is empty, the
    /// engagement history is empty and no identity is set.
    pub fn new(api_key: impl Into<String>, environment: Arc<dyn Environment>) -> Self {
        let state = Self::initial_state(api_key.into(), None, environment.as_ref());
        Self {
            state,
            environment,
            observer: None,
            dirty: true,
        }
    }

    /// Creates a conversation seeded from a legacy record.
    ///
    /// The identity comes from `legacy`; every snapshot is at its
    /// environment-derived default and the engagement history is empty.
    ///
    /// # Errors
    ///
    /// Returns `EngageError::Migration` if the legacy record is malformed. The
    /// caller should fall back to [`Conversation::new`].
    pub fn migrate(
        legacy: LegacyConversation,
        api_key: impl Into<String>,
        environment: Arc<dyn Environment>,
    ) -> Result<Self> {
        let identity = legacy.into_identity()?;
        tracing::info!(
            "Migrating legacy conversation (person: {}, device: {})",
            identity.person_id,
            identity.device_id
        );

        let state = Self::initial_state(api_key.into(), Some(identity), environment.as_ref());
        Ok(Self {
            state,
            environment,
            observer: None,
            dirty: true,
        })
    }

    /// Wraps previously persisted state. The restored conversation is clean.
    pub fn restore(state: ConversationState, environment: Arc<dyn Environment>) -> Self {
        Self {
            state,
            environment,
            observer: None,
            dirty: false,
        }
    }

    fn initial_state(
        api_key: String,
        identity: Option<Identity>,
        environment: &dyn Environment,
    ) -> ConversationState {
        ConversationState {
            local_id: Uuid::new_v4().to_string(),
            api_key,
            identity,
            app_release: environment.app_release(),
            sdk: environment.sdk(),
            person: Person::default(),
            device: environment.device(),
            engagement: Engagement::new(),
            last_message_id: None,
            user_info: AttributeMap::new(),
            device_overrides: BTreeSet::new(),
        }
    }

    /// Installs the observer that receives change events.
    pub fn set_observer(&mut self, observer: Arc<dyn ConversationObserver>) {
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    // ============================================================================
    // Accessors
    // ============================================================================

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn into_state(self) -> ConversationState {
        self.state
    }

    pub fn local_id(&self) -> &str {
        &self.state.local_id
    }

    pub fn api_key(&self) -> &str {
        &self.state.api_key
    }

    pub fn app_release(&self) -> &AppRelease {
        &self.state.app_release
    }

    pub fn sdk(&self) -> &Sdk {
        &self.state.sdk
    }

    pub fn person(&self) -> &Person {
        &self.state.person
    }

    pub fn device(&self) -> &Device {
        &self.state.device
    }

    pub fn engagement(&self) -> &Engagement {
        &self.state.engagement
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.state.identity.as_ref()
    }

    pub fn token(&self) -> Option<&str> {
        self.identity().map(|identity| identity.token.as_str())
    }

    /// Server identifier of the conversation.
    pub fn identifier(&self) -> Option<&str> {
        self.state.conversation_id()
    }

    pub fn person_id(&self) -> Option<&str> {
        self.identity().map(|identity| identity.person_id.as_str())
    }

    pub fn device_id(&self) -> Option<&str> {
        self.identity().map(|identity| identity.device_id.as_str())
    }

    pub fn last_message_id(&self) -> Option<&str> {
        self.state.last_message_id.as_deref()
    }

    pub fn user_info(&self) -> &AttributeMap {
        &self.state.user_info
    }

    pub fn status(&self) -> ConversationStatus {
        self.state.status()
    }

    pub fn is_identified(&self) -> bool {
        self.state.identity.is_some()
    }

    pub fn current_time(&self) -> DateTime<Utc> {
        self.environment.now()
    }

    /// Whether there are changes that have not been persisted yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clears the dirty flag after the caller has persisted the state.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    // ============================================================================
    // Identity
    // ============================================================================

    /// Assigns the server-issued identity.
    ///
    /// # Errors
    ///
    /// Returns `EngageError::AlreadyIdentified` if an identity is already set,
    /// or `EngageError::InvalidIdentity` if any value is blank. On error the
    /// conversation is unchanged. Identity is assigned exactly once.
    pub fn set_token(
        &mut self,
        token: impl Into<String>,
        conversation_id: impl Into<String>,
        person_id: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Result<()> {
        if let Some(identity) = &self.state.identity {
            return Err(EngageError::AlreadyIdentified {
                conversation_id: identity.conversation_id.clone(),
            });
        }

        let identity = Identity::new(token, conversation_id, person_id, device_id)?;
        tracing::info!(
            "Conversation {} identified as {:?}",
            self.state.local_id,
            identity.conversation_id
        );
        self.state.identity = Some(identity);
        self.commit(Vec::new());
        Ok(())
    }

    // ============================================================================
    // Snapshot updates
    // ============================================================================

    /// Applies `update` to a copy of the person and commits the result.
    ///
    /// Returns the diff if anything changed.
    pub fn update_person<F>(&mut self, update: F) -> Option<DiffPayload>
    where
        F: FnOnce(Person) -> Person,
    {
        let updated = update(self.state.person.clone());
        self.commit_person(updated)
    }

    /// Replaces the person with `updated` if it differs from the retained one.
    pub fn commit_person(&mut self, updated: Person) -> Option<DiffPayload> {
        let diff = updated.diff_from(&self.state.person);
        if diff.is_empty() {
            return None;
        }

        tracing::debug!("Person changed: {:?}", diff);
        self.state.person = updated;
        self.commit(vec![ConversationEvent::PersonChanged(diff.clone())]);
        Some(diff)
    }

    /// Applies `update` to a copy of the device and commits the result.
    ///
    /// Returns the diff if anything changed.
    pub fn update_device<F>(&mut self, update: F) -> Option<DiffPayload>
    where
        F: FnOnce(Device) -> Device,
    {
        let updated = update(self.state.device.clone());
        self.commit_device(updated)
    }

    /// Replaces the device with `updated` if it differs from the retained one.
    ///
    /// Environment-derived attributes changed here become overrides and are
    /// kept by later `check_for_diffs` refreshes.
    pub fn commit_device(&mut self, updated: Device) -> Option<DiffPayload> {
        let diff = updated.diff_from(&self.state.device);
        if diff.is_empty() {
            return None;
        }

        tracing::debug!("Device changed: {:?}", diff);
        self.state.device_overrides.extend(
            diff.keys()
                .filter(|key| !Device::CALLER_OWNED.contains(&key.as_str()))
                .cloned(),
        );
        self.state.device = updated;
        self.commit(vec![ConversationEvent::DeviceChanged(diff.clone())]);
        Some(diff)
    }

    /// Compares app release, SDK and device facts against the environment.
    ///
    /// App release and SDK differences are reported together in a single
    /// `AppReleaseOrSdkChanged` event. Device differences (custom data is kept)
    /// are reported as `DeviceChanged`. Invocation counts are reset when the
    /// app version or build changed since the last check.
    pub fn check_for_diffs(&mut self) {
        let stored_release = &self.state.app_release;
        let current_release = stored_release.refreshed_from(self.environment.app_release());
        let current_sdk = self.environment.sdk();

        self.state.engagement.reset_on_version_change(
            current_release.version.as_deref(),
            current_release.build.as_deref(),
            stored_release.version.as_deref(),
            stored_release.build.as_deref(),
        );

        let mut events = Vec::new();

        let release_diff = current_release.diff_from(&self.state.app_release);
        let sdk_diff = current_sdk.diff_from(&self.state.sdk);
        if !release_diff.is_empty() || !sdk_diff.is_empty() {
            tracing::debug!(
                "App release or SDK changed: {:?} / {:?}",
                release_diff,
                sdk_diff
            );
            self.state.app_release = current_release;
            self.state.sdk = current_sdk;
            events.push(ConversationEvent::AppReleaseOrSdkChanged(
                app_release_or_sdk_payload(release_diff, sdk_diff),
            ));
        }

        let current_device = self
            .state
            .device
            .refreshed_from(self.environment.device(), &self.state.device_overrides);
        let device_diff = current_device.diff_from(&self.state.device);
        if !device_diff.is_empty() {
            tracing::debug!("Device changed: {:?}", device_diff);
            self.state.device = current_device;
            events.push(ConversationEvent::DeviceChanged(device_diff));
        }

        if !events.is_empty() {
            self.commit(events);
        }
    }

    /// Records that the host app customized the SDK's styling.
    pub fn did_override_styles(&mut self) {
        if self.state.app_release.overriding_styles {
            return;
        }

        let mut updated = self.state.app_release.clone();
        updated.overriding_styles = true;
        let diff = updated.diff_from(&self.state.app_release);
        self.state.app_release = updated;
        self.commit(vec![ConversationEvent::AppReleaseOrSdkChanged(
            app_release_or_sdk_payload(diff, DiffPayload::new()),
        )]);
    }

    /// Tracks the identifier of the last downloaded message.
    pub fn did_download_messages_up_to(&mut self, last_message_id: impl Into<String>) {
        let last_message_id = last_message_id.into();
        if self.state.last_message_id.as_deref() == Some(last_message_id.as_str()) {
            return;
        }
        self.state.last_message_id = Some(last_message_id);
        self.commit(Vec::new());
    }

    // ============================================================================
    // Engagement
    // ============================================================================

    /// Registers a code point with zero invocations.
    pub fn warm_code_point(&mut self, code_point: &str) {
        self.warm(code_point, EngagementNamespace::CodePoint);
    }

    /// Records one invocation of a code point.
    pub fn engage_code_point(&mut self, code_point: &str) {
        self.engage(code_point, EngagementNamespace::CodePoint);
    }

    /// Registers an interaction with zero invocations.
    pub fn warm_interaction(&mut self, interaction_id: &str) {
        self.warm(interaction_id, EngagementNamespace::Interaction);
    }

    /// Records one invocation of an interaction.
    pub fn engage_interaction(&mut self, interaction_id: &str) {
        self.engage(interaction_id, EngagementNamespace::Interaction);
    }

    /// Warming only persists a newly registered key; it is not reported as
    /// engagement.
    pub fn warm(&mut self, key: &str, namespace: EngagementNamespace) {
        if self.state.engagement.warm(key, namespace) {
            tracing::debug!("Warmed {} '{}'", namespace, key);
            self.commit(Vec::new());
        }
    }

    /// Engagement is always reported, even for a key that was never warmed.
    pub fn engage(&mut self, key: &str, namespace: EngagementNamespace) {
        let now = self.current_time();
        let count = self
            .state
            .engagement
            .engage(key, namespace, now)
            .invocation_count;
        tracing::debug!("Engaged {} '{}' (count: {})", namespace, key, count);
        self.commit(vec![ConversationEvent::EngagementChanged]);
    }

    // ============================================================================
    // User info
    // ============================================================================

    pub fn set_user_info(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        self.state.user_info.insert(key.into(), value.into());
        self.commit(vec![ConversationEvent::UserInfoChanged]);
    }

    pub fn remove_user_info(&mut self, key: &str) {
        self.state.user_info.remove(key);
        self.commit(vec![ConversationEvent::UserInfoChanged]);
    }

    // ============================================================================
    // Notification
    // ============================================================================

    /// Marks the conversation dirty and delivers `events` followed by
    /// `ConversationChanged`.
    fn commit(&mut self, mut events: Vec<ConversationEvent>) {
        self.dirty = true;
        events.push(ConversationEvent::ConversationChanged);

        if let Some(observer) = &self.observer {
            for event in &events {
                observer.on_event(self, event);
            }
        }
    }
}

/// Combines app release and SDK diffs, keeping only the sections that changed.
fn app_release_or_sdk_payload(release_diff: DiffPayload, sdk_diff: DiffPayload) -> DiffPayload {
    let mut payload = Map::new();
    if !release_diff.is_empty() {
        payload.insert(AppRelease::KEY.to_string(), Value::Object(release_diff));
    }
    if !sdk_diff.is_empty() {
        payload.insert(Sdk::KEY.to_string(), Value::Object(sdk_diff));
    }
    payload
}
