/// Debounced optimistic autosave
///
/// An [`Autosave`] owns one editable record (a note, a video project) and
/// keeps the editor responsive: edits apply locally at once and reach the
/// server in a single call after a quiet period.
///
/// # States
///
/// ```text
///            edit                 debounce / flush
///  Clean ──────────> Dirty ─────────────────────────> Saving
///    ^                 ^                                 │
///    │                 └──────── failure (revert) ───────┤
///    └─────────────────────────── success ───────────────┘
/// ```
///
/// - Every edit restarts the debounce timer; the old timer is cancelled first
/// - Only the merged pending fields are sent
/// - One save in flight per editor. Edits made while saving are queued and
///   go out in the next cycle
/// - On failure the display reverts to the last server row (plus queued
///   edits) and the error is kept for the view
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use studioplan_client::api::{HttpPlannerClient, PlannerApi};
/// use studioplan_client::autosave::{Autosave, AutosaveConfig};
/// use studioplan_shared::models::note::UpdateNote;
///
/// # async fn example() -> Result<(), studioplan_client::ClientError> {
/// let api: Arc<dyn PlannerApi> = Arc::new(HttpPlannerClient::new("http://localhost:8080", "jwt")?);
/// let note = api.list_notes().await?.remove(0);
///
/// let editor = Autosave::new(api, note, AutosaveConfig::default());
/// editor.edit(UpdateNote { content: Some("Draft".into()), ..Default::default() });
/// editor.flush().await?;
/// # Ok(())
/// # }
/// ```

use crate::api::PlannerApi;
use crate::error::ClientResult;
use futures::future::BoxFuture;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;
use studioplan_shared::models::note::{Note, UpdateNote};
use studioplan_shared::models::video_project::{UpdateVideoProject, VideoProject};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Quiet period before pending edits are sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

/// A record the autosave machine can edit and persist
pub trait Editable: Clone + Send + Sync + 'static {
    type Patch: Clone + Default + fmt::Debug + Send + Sync + 'static;

    fn id(&self) -> Uuid;

    fn apply(&mut self, patch: &Self::Patch);

    /// Field-level merge, newer wins
    fn merge(pending: &mut Self::Patch, newer: Self::Patch);

    fn is_empty(patch: &Self::Patch) -> bool;

    fn save(
        api: Arc<dyn PlannerApi>,
        id: Uuid,
        patch: Self::Patch,
    ) -> BoxFuture<'static, ClientResult<Self>>;
}

impl Editable for Note {
    type Patch = UpdateNote;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: &UpdateNote) {
        patch.apply_to(self);
    }

    fn merge(pending: &mut UpdateNote, newer: UpdateNote) {
        pending.merge(newer);
    }

    fn is_empty(patch: &UpdateNote) -> bool {
        patch.is_empty()
    }

    fn save(
        api: Arc<dyn PlannerApi>,
        id: Uuid,
        patch: UpdateNote,
    ) -> BoxFuture<'static, ClientResult<Note>> {
        Box::pin(async move { api.update_note(id, patch).await })
    }
}

impl Editable for VideoProject {
    type Patch = UpdateVideoProject;

    fn id(&self) -> Uuid {
        self.id
    }

    fn apply(&mut self, patch: &UpdateVideoProject) {
        patch.apply_to(self);
    }

    fn merge(pending: &mut UpdateVideoProject, newer: UpdateVideoProject) {
        pending.merge(newer);
    }

    fn is_empty(patch: &UpdateVideoProject) -> bool {
        patch.is_empty()
    }

    fn save(
        api: Arc<dyn PlannerApi>,
        id: Uuid,
        patch: UpdateVideoProject,
    ) -> BoxFuture<'static, ClientResult<VideoProject>> {
        Box::pin(async move { api.update_project(id, patch).await })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    /// Displayed record matches the last server row
    Clean,
    /// Local edits not yet sent
    Dirty,
    /// A save is in flight
    Saving,
}

#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    pub debounce: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

struct EditorState<R: Editable> {
    /// Last known-good server row
    server: R,
    displayed: R,
    pending: R::Patch,
    state: SaveState,
    last_error: Option<String>,
    timer: Option<CancellationToken>,
}

struct Shared<R: Editable> {
    api: Arc<dyn PlannerApi>,
    config: AutosaveConfig,
    editor: Mutex<EditorState<R>>,
    /// Held for the duration of a save
    save_turn: tokio::sync::Mutex<()>,
    shutdown: CancellationToken,
}

impl<R: Editable> Drop for Shared<R> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

/// Autosave handle; clones share the same editor
pub struct Autosave<R: Editable> {
    shared: Arc<Shared<R>>,
}

impl<R: Editable> Clone for Autosave<R> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<R: Editable> Autosave<R> {
    pub fn new(api: Arc<dyn PlannerApi>, record: R, config: AutosaveConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                api,
                config,
                editor: Mutex::new(EditorState {
                    server: record.clone(),
                    displayed: record,
                    pending: R::Patch::default(),
                    state: SaveState::Clean,
                    last_error: None,
                    timer: None,
                }),
                save_turn: tokio::sync::Mutex::new(()),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, EditorState<R>> {
        self.shared
            .editor
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn id(&self) -> Uuid {
        self.lock().server.id()
    }

    pub fn state(&self) -> SaveState {
        self.lock().state
    }

    /// Record as the view should show it
    pub fn displayed(&self) -> R {
        self.lock().displayed.clone()
    }

    pub fn server(&self) -> R {
        self.lock().server.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    pub fn has_pending(&self) -> bool {
        !R::is_empty(&self.lock().pending)
    }

    /// Applies an edit locally and (re)starts the debounce timer
    pub fn edit(&self, patch: R::Patch) {
        let mut guard = self.lock();
        let editor = &mut *guard;

        editor.displayed.apply(&patch);
        R::merge(&mut editor.pending, patch);

        // Queued edits wait for the in-flight save to finish
        if editor.state != SaveState::Saving {
            editor.state = SaveState::Dirty;
            self.arm_timer(editor);
        }
    }

    /// Saves pending edits now, skipping the debounce
    ///
    /// Waits for an in-flight save first. Returns the server row, or `None`
    /// when nothing was pending. With nothing pending the editor settles on
    /// `Clean`, keeping any earlier error.
    pub async fn flush(&self) -> ClientResult<Option<R>> {
        self.save_pending().await
    }

    /// Cancels the pending timer; unsent edits stay pending
    pub fn shutdown(&self) {
        let mut editor = self.lock();
        if let Some(timer) = editor.timer.take() {
            timer.cancel();
        }
        self.shared.shutdown.cancel();
    }

    fn arm_timer(&self, editor: &mut EditorState<R>) {
        if let Some(old) = editor.timer.take() {
            old.cancel();
        }
        if self.shared.shutdown.is_cancelled() {
            return;
        }

        let token = self.shared.shutdown.child_token();
        editor.timer = Some(token.clone());

        let weak: Weak<Shared<R>> = Arc::downgrade(&self.shared);
        let delay = self.shared.config.debounce;

        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(shared) = weak.upgrade() {
                        let editor = Autosave { shared };
                        if let Err(e) = editor.save_pending().await {
                            warn!(id = %editor.id(), error = %e, "Autosave failed");
                        }
                    }
                }
            }
        });
    }

    async fn save_pending(&self) -> ClientResult<Option<R>> {
        let _turn = self.shared.save_turn.lock().await;

        let (id, patch) = {
            let mut guard = self.lock();
            let editor = &mut *guard;

            if let Some(timer) = editor.timer.take() {
                timer.cancel();
            }
            if R::is_empty(&editor.pending) {
                // Left over from a failed save; the display already shows
                // the server row and `last_error` still reports the failure
                if editor.state == SaveState::Dirty {
                    editor.state = SaveState::Clean;
                }
                return Ok(None);
            }

            editor.state = SaveState::Saving;
            (editor.server.id(), std::mem::take(&mut editor.pending))
        };

        debug!(id = %id, patch = ?patch, "Saving pending edits");
        let result = R::save(self.shared.api.clone(), id, patch).await;

        let mut guard = self.lock();
        let editor = &mut *guard;

        // Queued edits are re-applied over whichever row wins
        let base = match &result {
            Ok(row) => row.clone(),
            Err(_) => editor.server.clone(),
        };
        editor.displayed = base;
        editor.displayed.apply(&editor.pending);

        let queued = !R::is_empty(&editor.pending);
        match result {
            Ok(row) => {
                editor.server = row.clone();
                editor.last_error = None;
                editor.state = if queued {
                    SaveState::Dirty
                } else {
                    SaveState::Clean
                };
                if queued {
                    self.arm_timer(editor);
                }
                Ok(Some(row))
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Save failed, reverted to last saved state");
                editor.state = SaveState::Dirty;
                editor.last_error = Some(e.to_string());
                if queued {
                    self.arm_timer(editor);
                }
                Err(e)
            }
        }
    }
}

/// Editor for whichever record is currently selected
///
/// Selecting a different record flushes the outgoing one first; if that
/// save fails the selection does not change.
pub struct EditorSession<R: Editable> {
    api: Arc<dyn PlannerApi>,
    config: AutosaveConfig,
    current: Option<Autosave<R>>,
}

impl<R: Editable> EditorSession<R> {
    pub fn new(api: Arc<dyn PlannerApi>, config: AutosaveConfig) -> Self {
        Self {
            api,
            config,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&Autosave<R>> {
        self.current.as_ref()
    }

    pub async fn select(&mut self, record: R) -> ClientResult<()> {
        if let Some(outgoing) = &self.current {
            if outgoing.id() == record.id() {
                return Ok(());
            }
            outgoing.flush().await?;
            outgoing.shutdown();
        }

        self.current = Some(Autosave::new(self.api.clone(), record, self.config.clone()));
        Ok(())
    }

    /// Flushes and releases the current editor
    pub async fn close(&mut self) -> ClientResult<()> {
        if let Some(current) = &self.current {
            current.flush().await?;
            current.shutdown();
        }
        self.current = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockPlanner;
    use tokio::time::sleep;

    fn title(text: &str) -> UpdateNote {
        UpdateNote {
            title: Some(text.to_string()),
            ..Default::default()
        }
    }

    async fn editor_for_note(mock: &Arc<MockPlanner>) -> Autosave<Note> {
        let note = mock.seed_note("Original").await;
        Autosave::new(mock.clone(), note, AutosaveConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_of_edits_sends_one_call_with_final_value() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;

        for i in 1..=5 {
            editor.edit(title(&format!("v{}", i)));
            assert_eq!(editor.state(), SaveState::Dirty);
            sleep(Duration::from_millis(200)).await;
        }
        assert!(mock.calls_to("update_note").is_empty());

        sleep(Duration::from_millis(1500)).await;

        let calls = mock.calls_to("update_note");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["title"], "v5");
        assert_eq!(editor.state(), SaveState::Clean);
        assert_eq!(editor.server().title, "v5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_changed_fields_are_sent() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;

        editor.edit(UpdateNote {
            content: Some("Body".into()),
            ..Default::default()
        });
        sleep(Duration::from_millis(1100)).await;

        let calls = mock.calls_to("update_note");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], serde_json::json!({"content": "Body"}));
        assert_eq!(editor.displayed().title, "Original");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_bypasses_debounce() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;

        editor.edit(title("Now"));
        let saved = editor.flush().await.unwrap().unwrap();
        assert_eq!(saved.title, "Now");
        assert_eq!(editor.state(), SaveState::Clean);

        // The cancelled timer never fires a second save
        sleep(Duration::from_secs(3)).await;
        assert_eq!(mock.calls_to("update_note").len(), 1);

        assert!(editor.flush().await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reverts_to_server_row() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;
        mock.fail("update_note");

        editor.edit(title("Broken"));
        assert_eq!(editor.displayed().title, "Broken");

        assert!(editor.flush().await.is_err());
        assert_eq!(editor.state(), SaveState::Dirty);
        assert_eq!(editor.displayed().title, "Original");
        assert!(editor.last_error().is_some());

        mock.recover("update_note");
        editor.edit(title("Fixed"));
        editor.flush().await.unwrap();
        assert_eq!(editor.state(), SaveState::Clean);
        assert_eq!(editor.last_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_flush_after_failure_settles_clean() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;
        mock.fail("update_note");

        editor.edit(title("Lost"));
        assert!(editor.flush().await.is_err());
        assert_eq!(editor.state(), SaveState::Dirty);
        assert!(!editor.has_pending());

        assert_eq!(editor.flush().await.unwrap(), None);
        assert_eq!(editor.state(), SaveState::Clean);
        assert!(editor.last_error().is_some());
        assert_eq!(mock.calls_to("update_note").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_save_is_queued() {
        let mock = Arc::new(MockPlanner::new());
        let editor = editor_for_note(&mock).await;
        mock.set_latency(Duration::from_millis(500));

        editor.edit(title("first"));
        let in_flight = {
            let editor = editor.clone();
            tokio::spawn(async move { editor.flush().await })
        };

        sleep(Duration::from_millis(100)).await;
        assert_eq!(editor.state(), SaveState::Saving);

        editor.edit(title("second"));
        assert_eq!(editor.state(), SaveState::Saving);
        assert_eq!(editor.displayed().title, "second");
        assert_eq!(mock.calls_to("update_note").len(), 1);

        in_flight.await.unwrap().unwrap();
        assert_eq!(editor.state(), SaveState::Dirty);
        assert_eq!(editor.server().title, "first");
        assert_eq!(editor.displayed().title, "second");

        sleep(Duration::from_millis(2000)).await;
        let calls = mock.calls_to("update_note");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1]["title"], "second");
        assert_eq!(editor.state(), SaveState::Clean);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_and_drop_cancel_the_timer() {
        let mock = Arc::new(MockPlanner::new());

        let editor = editor_for_note(&mock).await;
        editor.edit(title("never sent"));
        editor.shutdown();

        let dropped = editor_for_note(&mock).await;
        dropped.edit(title("also never sent"));
        drop(dropped);

        sleep(Duration::from_secs(5)).await;
        assert!(mock.calls_to("update_note").is_empty());
        assert!(editor.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_switching_selection_flushes_outgoing_item() {
        let mock = Arc::new(MockPlanner::new());
        let first = mock.seed_note("First").await;
        let second = mock.seed_note("Second").await;

        let mut session = EditorSession::new(mock.clone(), AutosaveConfig::default());
        session.select(first.clone()).await.unwrap();
        session
            .current()
            .unwrap()
            .edit(title("First, edited"));

        session.select(second.clone()).await.unwrap();

        let calls = mock.calls_to("update_note");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["title"], "First, edited");
        assert_eq!(session.current().unwrap().id(), second.id);

        let stored = mock.get_note(first.id).await.unwrap();
        assert_eq!(stored.title, "First, edited");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_switch_keeps_outgoing_selected() {
        let mock = Arc::new(MockPlanner::new());
        let first = mock.seed_note("First").await;
        let second = mock.seed_note("Second").await;
        mock.fail("update_note");

        let mut session = EditorSession::new(mock.clone(), AutosaveConfig::default());
        session.select(first.clone()).await.unwrap();
        session.current().unwrap().edit(title("Unsaved"));

        assert!(session.select(second).await.is_err());
        assert_eq!(session.current().unwrap().id(), first.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_project_fields_autosave() {
        let mock = Arc::new(MockPlanner::new());
        let project = mock.seed_project("Desk tour").await;
        let editor = Autosave::new(mock.clone(), project, AutosaveConfig::default());

        editor.edit(UpdateVideoProject {
            hook: Some(Some("Wait for it".into())),
            ..Default::default()
        });
        editor.edit(UpdateVideoProject {
            progress: Some(30),
            ..Default::default()
        });
        sleep(Duration::from_millis(1200)).await;

        let calls = mock.calls_to("update_project");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0]["hook"], "Wait for it");
        assert_eq!(calls[0]["progress"], 30);
        assert!(calls[0].get("title").is_none());
        assert_eq!(editor.server().title, "Desk tour");
    }
}
