/// Concept generation trigger and poller
///
/// Creating a project never waits for its script. A viewing client that
/// sees a project without a concept:
///
/// 1. Waits briefly, then posts the trigger (failures are logged only)
/// 2. Polls the project on a bounded schedule until a concept shows up
///
/// ```text
/// t=0.5s  POST /video-projects/generate-concept
/// t=3s    GET  /video-projects/:id   (attempt 1)
/// t=7s    GET  /video-projects/:id   (attempt 2)
/// ...     every 4s, at most 10 attempts, or until cancelled
/// ```

use crate::api::PlannerApi;
use std::sync::Arc;
use std::time::Duration;
use studioplan_shared::models::envelopes::GenerateConceptRequest;
use studioplan_shared::models::video_project::VideoProject;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct ConceptPollConfig {
    /// Delay before the trigger is posted
    pub trigger_delay: Duration,
    /// Delay before the first poll
    pub initial_delay: Duration,
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for ConceptPollConfig {
    fn default() -> Self {
        Self {
            trigger_delay: Duration::from_millis(500),
            initial_delay: Duration::from_secs(3),
            interval: Duration::from_secs(4),
            max_attempts: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Project as first seen with a concept
    Ready(VideoProject),
    /// Gave up after this many attempts
    Exhausted(u32),
    Cancelled,
}

/// True once the project carries a non-empty concept
pub fn has_concept(project: &VideoProject) -> bool {
    project
        .generated_concept
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty())
}

pub fn request_for(project: &VideoProject) -> GenerateConceptRequest {
    GenerateConceptRequest {
        video_project_id: Some(project.id),
        title: project.title.clone(),
        hook: project.hook.clone(),
        rough_sketch: project.rough_sketch.clone(),
    }
}

/// Posts the trigger after `delay`; returns whether the server accepted it
pub async fn trigger_generation(
    api: &dyn PlannerApi,
    project: &VideoProject,
    delay: Duration,
) -> bool {
    tokio::time::sleep(delay).await;

    match api.generate_concept(request_for(project)).await {
        Ok(response) => {
            info!(
                project_id = %project.id,
                saved = response.project.is_some(),
                "Concept generation finished"
            );
            true
        }
        Err(e) => {
            warn!(project_id = %project.id, error = %e, "Concept generation failed");
            false
        }
    }
}

/// Polls until the project has a concept, the cap is hit, or `token` fires
///
/// Fetch errors count as attempts and are otherwise ignored.
pub async fn poll_for_concept(
    api: &dyn PlannerApi,
    project_id: Uuid,
    config: &ConceptPollConfig,
    token: &CancellationToken,
) -> PollOutcome {
    let mut delay = config.initial_delay;

    for attempt in 1..=config.max_attempts {
        tokio::select! {
            _ = token.cancelled() => return PollOutcome::Cancelled,
            _ = tokio::time::sleep(delay) => {}
        }
        delay = config.interval;

        match api.get_project(project_id).await {
            Ok(project) if has_concept(&project) => {
                debug!(project_id = %project_id, attempt, "Concept arrived");
                return PollOutcome::Ready(project);
            }
            Ok(_) => debug!(project_id = %project_id, attempt, "No concept yet"),
            Err(e) => debug!(project_id = %project_id, attempt, error = %e, "Poll failed"),
        }
    }

    PollOutcome::Exhausted(config.max_attempts)
}

/// Trigger plus poll for one viewed project
///
/// Dropping the watcher (navigating away) cancels both.
pub struct ConceptWatcher {
    token: CancellationToken,
    handle: Option<JoinHandle<PollOutcome>>,
}

impl ConceptWatcher {
    /// Starts watching; a project that already has a concept is ready at once
    pub fn spawn(api: Arc<dyn PlannerApi>, project: VideoProject, config: ConceptPollConfig) -> Self {
        let token = CancellationToken::new();
        let child = token.clone();

        let handle = tokio::spawn(async move {
            if has_concept(&project) {
                return PollOutcome::Ready(project);
            }

            {
                let api = api.clone();
                let project = project.clone();
                let child = child.clone();
                let delay = config.trigger_delay;
                tokio::spawn(async move {
                    tokio::select! {
                        _ = child.cancelled() => {}
                        _ = trigger_generation(api.as_ref(), &project, delay) => {}
                    }
                });
            }

            poll_for_concept(api.as_ref(), project.id, &config, &child).await
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Waits for the poll to finish
    pub async fn outcome(mut self) -> PollOutcome {
        match self.handle.take() {
            Some(handle) => handle.await.unwrap_or(PollOutcome::Cancelled),
            None => PollOutcome::Cancelled,
        }
    }
}

impl Drop for ConceptWatcher {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
