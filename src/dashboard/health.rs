//! Health check for the status banner.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::api::{ClientError, DashboardApi, HealthReport};

use super::poller::guarded;
use super::state::Banner;

/// Query `/api/health` and turn the outcome into a banner.
///
/// Returns `None` when the check was cancelled, so the previous banner stays.
pub async fn check<A>(api: &A, cancel: &CancellationToken) -> Option<Banner>
where
    A: DashboardApi + ?Sized,
{
    match guarded(cancel, api.health()).await {
        Err(ClientError::Cancelled) => None,
        result => Some(banner_from(result)),
    }
}

/// Map a health result to the banner it produces.
pub fn banner_from(result: Result<HealthReport, ClientError>) -> Banner {
    match result {
        Ok(report) if report.is_healthy() => {
            let volume_count = report.volume_count.unwrap_or(0);
            info!(volume_count, "Service healthy");
            Banner::Healthy {
                volume_count,
                openstack_version: report.openstack_version,
            }
        }
        Ok(report) => {
            let reason = report
                .error
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| "service reported unhealthy".to_string());
            warn!(%reason, "Service unhealthy");
            Banner::Unhealthy { reason }
        }
        Err(e) => {
            warn!(error = %e, "Health check failed");
            Banner::Unhealthy {
                reason: format!("Unable to reach server: {}", e),
            }
        }
    }
}
