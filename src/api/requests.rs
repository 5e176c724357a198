//! Mutating request bodies and the response envelope.
//!
//! Every mutating endpoint answers with `{success, message?, error?}`. Error
//! responses from the backend often carry only `{"error": "..."}` with a 4xx
//! or 5xx status, so a missing `success` field reads as `false`.

use std::collections::BTreeMap;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::models::{BackupKind, ScheduleType};

/// Response envelope shared by all mutating endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the backend accepted the command
    #[serde(default)]
    pub success: bool,
    /// Human-readable result on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable reason on failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }

    /// Error text to show, falling back to `fallback` when the server sent none.
    pub fn error_or(&self, fallback: &str) -> String {
        non_empty(self.error.as_deref()).unwrap_or(fallback).to_string()
    }

    /// Success text to show, falling back to `fallback` when the server sent none.
    pub fn message_or(&self, fallback: &str) -> String {
        non_empty(self.message.as_deref()).unwrap_or(fallback).to_string()
    }
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// A single mutating HTTP call: method, path below the server root, JSON body.
///
/// The path is kept as raw segments so ids are percent-encoded when the URL is
/// built rather than spliced into a string.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub method: Method,
    pub segments: Vec<String>,
    pub body: Option<RequestBody>,
}

impl CommandRequest {
    pub fn new<I, S>(method: Method, segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            segments: segments.into_iter().map(Into::into).collect(),
            body: None,
        }
    }

    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, segments)
    }

    pub fn delete<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::DELETE, segments)
    }

    /// Attach a body. It is serialized when the request is sent.
    pub fn with_body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The body as it goes on the wire.
    pub fn json_body(&self) -> Result<Option<Value>, serde_json::Error> {
        self.body.as_ref().map(serde_json::to_value).transpose()
    }

    /// Unencoded path, for logs and tests.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateBackupBody {
    pub volume_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestoreBackupBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Body of `POST /api/backup/cleanup`: one global threshold or a per-volume map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CleanupBackupsBody {
    Global { retention_days: u32 },
    PerVolume { volume_policies: BTreeMap<String, u32> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateScheduleBody {
    pub volume_ids: Vec<String>,
    pub backup_type: BackupKind,
    pub schedule_type: ScheduleType,
    pub schedule_time: String,
    pub weekdays: Vec<u8>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeIdsBody {
    pub volume_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateServerSnapshotBody {
    pub server_ids: Vec<String>,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateVolumeSnapshotBody {
    pub volume_ids: Vec<String>,
    pub name: String,
    pub description: String,
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetentionBody {
    pub retention_days: u32,
}

/// Body of `POST /api/backup/import`, the record produced by an export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportBackupBody {
    pub backup_service: String,
    pub backup_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Any mutating request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    CreateBackup(CreateBackupBody),
    RestoreBackup(RestoreBackupBody),
    ImportBackup(ImportBackupBody),
    CleanupBackups(CleanupBackupsBody),
    CreateSchedule(CreateScheduleBody),
    VolumeIds(VolumeIdsBody),
    CreateServerSnapshot(CreateServerSnapshotBody),
    CreateVolumeSnapshot(CreateVolumeSnapshotBody),
    Retention(RetentionBody),
}

macro_rules! request_body {
    ($($body:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$body> for RequestBody {
                fn from(body: $body) -> Self {
                    RequestBody::$variant(body)
                }
            }
        )*
    };
}

request_body! {
    CreateBackupBody => CreateBackup,
    RestoreBackupBody => RestoreBackup,
    ImportBackupBody => ImportBackup,
    CleanupBackupsBody => CleanupBackups,
    CreateScheduleBody => CreateSchedule,
    VolumeIdsBody => VolumeIds,
    CreateServerSnapshotBody => CreateServerSnapshot,
    CreateVolumeSnapshotBody => CreateVolumeSnapshot,
    RetentionBody => Retention,
}
