/// Production/release schedule
///
/// Every video project contributes up to two calendar events:
///
/// ```text
/// production_date = 2025-11-15  ──>  production:<id>  on 2025-11-15 10:00
/// release_date    = 2025-11-20  ──>  release:<id>     on 2025-11-20 14:00
/// ```
///
/// Day cells are keyed by naive local dates (`YYYY-MM-DD`), so a drop lands
/// on the cell the user picked whatever time the event displays. Dropping an
/// event changes only the matching date field; the time of day stays.
///
/// Drops are applied locally first. If the save fails the whole event set is
/// reloaded from the server instead of being reconciled locally.

use crate::api::PlannerApi;
use crate::error::{ClientError, ClientResult};
use chrono::{Datelike, Duration as DateDuration, NaiveDate, NaiveDateTime, NaiveTime};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use studioplan_shared::models::video_project::{UpdateVideoProject, VideoProject, VideoStatus};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Background refresh period
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// Cells in a month grid (six weeks)
pub const MONTH_GRID_CELLS: usize = 42;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Production,
    Release,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Production => "production",
            EventKind::Release => "release",
        }
    }

    /// Display time of day for this track
    pub fn time_of_day(&self) -> NaiveTime {
        match self {
            EventKind::Production => NaiveTime::from_hms_opt(10, 0, 0).unwrap_or_default(),
            EventKind::Release => NaiveTime::from_hms_opt(14, 0, 0).unwrap_or_default(),
        }
    }

    fn date_of(&self, project: &VideoProject) -> Option<NaiveDate> {
        match self {
            EventKind::Production => project.production_date,
            EventKind::Release => project.release_date,
        }
    }

    /// Patch that moves this track's date and nothing else
    pub fn move_to(&self, day: NaiveDate) -> UpdateVideoProject {
        match self {
            EventKind::Production => UpdateVideoProject {
                production_date: Some(Some(day)),
                ..Default::default()
            },
            EventKind::Release => UpdateVideoProject {
                release_date: Some(Some(day)),
                ..Default::default()
            },
        }
    }
}

/// Stable event identity, rendered `production:<uuid>` / `release:<uuid>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey {
    pub project_id: Uuid,
    pub kind: EventKind,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.project_id)
    }
}

impl FromStr for EventKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .ok_or_else(|| format!("invalid event key '{}'", s))?;
        let kind = match kind {
            "production" => EventKind::Production,
            "release" => EventKind::Release,
            other => return Err(format!("unknown event kind '{}'", other)),
        };
        let project_id = Uuid::parse_str(id).map_err(|e| e.to_string())?;
        Ok(EventKey { project_id, kind })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEvent {
    pub key: EventKey,
    pub title: String,
    pub status: VideoStatus,
    pub starts_at: NaiveDateTime,
}

impl ScheduleEvent {
    pub fn day(&self) -> NaiveDate {
        self.starts_at.date()
    }
}

/// Maps projects to events, production before release per project
pub fn events_for(projects: &[VideoProject]) -> Vec<ScheduleEvent> {
    projects
        .iter()
        .flat_map(|project| {
            [EventKind::Production, EventKind::Release]
                .into_iter()
                .filter_map(move |kind| {
                    kind.date_of(project).map(|date| ScheduleEvent {
                        key: EventKey {
                            project_id: project.id,
                            kind,
                        },
                        title: project.title.clone(),
                        status: project.status,
                        starts_at: date.and_time(kind.time_of_day()),
                    })
                })
        })
        .collect()
}

/// Cell key for a calendar day
pub fn day_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Six weeks of days covering `day`'s month, starting on a Sunday
pub fn month_grid(day: NaiveDate) -> Vec<NaiveDate> {
    let first = day.with_day(1).unwrap_or(day);
    let start = first - DateDuration::days(i64::from(first.weekday().num_days_from_sunday()));
    start.iter_days().take(MONTH_GRID_CELLS).collect()
}

/// Sunday-to-Saturday week containing `day`
pub fn week_days(day: NaiveDate) -> Vec<NaiveDate> {
    let start = day - DateDuration::days(i64::from(day.weekday().num_days_from_sunday()));
    start.iter_days().take(7).collect()
}

/// Loaded schedule view state
pub struct Schedule {
    api: Arc<dyn PlannerApi>,
    projects: Vec<VideoProject>,
    events: Vec<ScheduleEvent>,
}

impl Schedule {
    pub fn new(api: Arc<dyn PlannerApi>) -> Self {
        Self {
            api,
            projects: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn events(&self) -> &[ScheduleEvent] {
        &self.events
    }

    /// Events on `day`, optionally limited to one track
    pub fn events_on(&self, day: NaiveDate, kind: Option<EventKind>) -> Vec<&ScheduleEvent> {
        self.events
            .iter()
            .filter(|e| e.day() == day && kind.map_or(true, |k| e.key.kind == k))
            .collect()
    }

    pub fn event(&self, key: &EventKey) -> Option<&ScheduleEvent> {
        self.events.iter().find(|e| e.key == *key)
    }

    /// Replaces local state with the server's projects
    pub async fn reload(&mut self) -> ClientResult<()> {
        let projects = self.api.list_projects().await?;
        self.set_projects(projects);
        debug!(events = self.events.len(), "Schedule loaded");
        Ok(())
    }

    fn set_projects(&mut self, projects: Vec<VideoProject>) {
        self.events = events_for(&projects);
        self.projects = projects;
    }

    /// Moves an event to the cell keyed `day_key`
    pub async fn drop_on(&mut self, key: &EventKey, day_key: &str) -> ClientResult<()> {
        let day = parse_day_key(day_key)
            .ok_or_else(|| ClientError::Invalid(format!("day key '{}'", day_key)))?;
        self.drop_event(key, day).await
    }

    /// Moves an event to `day`: optimistic apply, persist, reload on failure
    pub async fn drop_event(&mut self, key: &EventKey, day: NaiveDate) -> ClientResult<()> {
        let event = self
            .event(key)
            .ok_or_else(|| ClientError::NotLoaded(format!("Event {}", key)))?;
        if event.day() == day {
            return Ok(());
        }

        let patch = key.kind.move_to(day);
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == key.project_id) {
            patch.apply_to(project);
        }
        self.events = events_for(&self.projects);

        match self.api.update_project(key.project_id, patch).await {
            Ok(saved) => {
                if let Some(project) = self.projects.iter_mut().find(|p| p.id == saved.id) {
                    *project = saved;
                }
                self.events = events_for(&self.projects);
                Ok(())
            }
            Err(e) => {
                warn!(event = %key, error = %e, "Failed to move event, reloading schedule");
                if let Err(reload_err) = self.reload().await {
                    warn!(error = %reload_err, "Schedule reload failed");
                }
                Err(e)
            }
        }
    }
}

/// Reloads `schedule` every `period` until `token` is cancelled
///
/// The first reload happens one period after the call; load the schedule
/// yourself before starting the loop.
pub fn spawn_refresh(
    schedule: Arc<Mutex<Schedule>>,
    period: Duration,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Schedule refresh stopped");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = schedule.lock().await.reload().await {
                        warn!(error = %e, "Schedule refresh failed");
                    }
                }
            }
        }
    })
}
