//! Poll loop: concurrent refresh of the six resource collections.
//!
//! All six requests are joined, not raced. A failure only affects its own
//! collection and shows up as a notice; the others still apply. Nothing is
//! retried: the next tick is the retry.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use chrono::Local;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::api::{ClientError, DashboardApi};

use super::state::{AppState, NoticeLevel};

/// One polled collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Volumes,
    Backups,
    Schedules,
    ServerSnapshots,
    VolumeSnapshots,
    Servers,
}

impl Resource {
    pub const ALL: [Resource; 6] = [
        Resource::Volumes,
        Resource::Backups,
        Resource::Schedules,
        Resource::ServerSnapshots,
        Resource::VolumeSnapshots,
        Resource::Servers,
    ];

    /// Endpoint path polled for this resource.
    pub fn path(&self) -> &'static str {
        match self {
            Resource::Volumes => "/api/volumes",
            Resource::Backups => "/api/backups",
            Resource::Schedules => "/api/schedules",
            Resource::ServerSnapshots => "/api/server-snapshots",
            Resource::VolumeSnapshots => "/api/volume-snapshots",
            Resource::Servers => "/api/servers",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Resource::Volumes => "volumes",
            Resource::Backups => "backups",
            Resource::Schedules => "schedules",
            Resource::ServerSnapshots => "server snapshots",
            Resource::VolumeSnapshots => "volume snapshots",
            Resource::Servers => "servers",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a refresh pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefreshReport {
    pub refreshed: Vec<Resource>,
    pub failed: Vec<(Resource, String)>,
    /// The group was cancelled; state was left untouched.
    pub cancelled: bool,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }
}

/// Run `future` unless `cancel` fires first.
pub async fn guarded<T, F>(cancel: &CancellationToken, future: F) -> Result<T, ClientError>
where
    F: Future<Output = Result<T, ClientError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ClientError::Cancelled),
        result = future => result,
    }
}

/// Fetch all six collections concurrently and apply each success to `state`.
pub async fn refresh_all<A>(api: &A, state: &mut AppState, cancel: &CancellationToken) -> RefreshReport
where
    A: DashboardApi + ?Sized,
{
    let (volumes, backups, schedules, server_snapshots, volume_snapshots, servers) = tokio::join!(
        guarded(cancel, api.volumes()),
        guarded(cancel, api.backups()),
        guarded(cancel, api.schedules()),
        guarded(cancel, api.server_snapshots()),
        guarded(cancel, api.volume_snapshots()),
        guarded(cancel, api.servers()),
    );

    let mut report = RefreshReport::default();
    if cancel.is_cancelled() {
        debug!("Refresh cancelled before completion");
        report.cancelled = true;
        return report;
    }

    apply(state, &mut report, Resource::Volumes, volumes, |s, v| {
        s.volumes = v;
        s.prune_selection();
    });
    apply(state, &mut report, Resource::Backups, backups, |s, v| {
        s.backups = v.into_backups();
    });
    apply(state, &mut report, Resource::Schedules, schedules, |s, v| {
        s.schedules = v;
    });
    apply(state, &mut report, Resource::ServerSnapshots, server_snapshots, |s, v| {
        s.server_snapshots = v;
    });
    apply(state, &mut report, Resource::VolumeSnapshots, volume_snapshots, |s, v| {
        s.volume_snapshots = v;
    });
    apply(state, &mut report, Resource::Servers, servers, |s, v| {
        s.servers = v;
    });

    if !report.refreshed.is_empty() {
        state.last_refresh = Some(Local::now());
    }
    debug!(
        refreshed = report.refreshed.len(),
        failed = report.failed.len(),
        "Refresh finished"
    );
    report
}

fn apply<T>(
    state: &mut AppState,
    report: &mut RefreshReport,
    resource: Resource,
    result: Result<T, ClientError>,
    replace: impl FnOnce(&mut AppState, T),
) {
    match result {
        Ok(value) => {
            replace(state, value);
            report.refreshed.push(resource);
        }
        Err(e) => {
            warn!(resource = %resource, path = resource.path(), error = %e, "Failed to load resource");
            let text = format!("Failed to load {}: {}", resource, e);
            state.notify(NoticeLevel::Error, "Error", text.clone());
            report.failed.push((resource, text));
        }
    }
}

/// When the next refresh (and optional health check) is due.
///
/// A settle refresh requested after a command runs at its own deadline and
/// also resets the regular interval.
#[derive(Debug, Clone)]
pub struct RefreshSchedule {
    interval: Duration,
    next_poll: Instant,
    settle_at: Option<Instant>,
    health_interval: Option<Duration>,
    next_health: Option<Instant>,
}

impl RefreshSchedule {
    /// A schedule whose first poll is due immediately.
    pub fn new(now: Instant, interval: Duration, health_interval: Option<Duration>) -> Self {
        Self {
            interval,
            next_poll: now,
            settle_at: None,
            health_interval,
            next_health: health_interval.map(|i| now + i),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Request a refresh `delay` from `now`. The earliest pending request wins.
    pub fn settle(&mut self, now: Instant, delay: Duration) {
        let at = now + delay;
        self.settle_at = Some(match self.settle_at {
            Some(existing) if existing <= at => existing,
            _ => at,
        });
    }

    pub fn settle_pending(&self) -> bool {
        self.settle_at.is_some()
    }

    pub fn poll_due(&self, now: Instant) -> bool {
        now >= self.next_poll || self.settle_at.is_some_and(|at| now >= at)
    }

    pub fn health_due(&self, now: Instant) -> bool {
        self.next_health.is_some_and(|at| now >= at)
    }

    /// Record a completed poll.
    pub fn polled(&mut self, now: Instant) {
        self.next_poll = now + self.interval;
        self.settle_at = None;
    }

    /// Record a completed health check.
    pub fn health_checked(&mut self, now: Instant) {
        self.next_health = self.health_interval.map(|i| now + i);
    }

    /// Time until the next deadline of any kind.
    pub fn until_next(&self, now: Instant) -> Duration {
        let mut next = self.next_poll;
        if let Some(at) = self.settle_at {
            next = next.min(at);
        }
        if let Some(at) = self.next_health {
            next = next.min(at);
        }
        next.saturating_duration_since(now)
    }
}
