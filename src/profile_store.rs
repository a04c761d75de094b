//! # Profile Store
//!
//! Owns the table of user profiles and its JSON file. The whole table is
//! rewritten after every mutation; a read or parse failure at load time yields
//! an empty table.
//!
//! All mutations run load-mutate-save under a single lock, so two updates
//! finishing at the same time cannot overwrite each other's file write.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::{error_logging, AppResult};
use crate::observability;

/// Persisted per-user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
    pub join_date: JoinDate,
    #[serde(default)]
    pub message_count: u64,
}

impl UserProfile {
    /// Fresh profile for a user seen for the first time
    pub fn new(first_name: &str, username: Option<&str>, join_date: NaiveDateTime) -> Self {
        Self {
            first_name: first_name.to_string(),
            username: username.map(str::to_string),
            join_date: JoinDate::from_datetime(join_date),
            message_count: 0,
        }
    }
}

/// User identifier (decimal string) → profile
pub type ProfileTable = BTreeMap<String, UserProfile>;

/// Join timestamp exactly as stored in the file.
///
/// The text is kept verbatim so a hand-edited value never makes the table
/// unloadable; it is only interpreted when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinDate(String);

impl JoinDate {
    const WRITE_FORMAT: &'static str = "%Y-%m-%dT%H:%M:%S%.f";

    /// Naive local ISO-8601 with fractional seconds
    pub fn from_datetime(date: NaiveDateTime) -> Self {
        Self(date.format(Self::WRITE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret the stored text as a local timestamp.
    ///
    /// Accepts `T` or space separators, optional seconds and fractions, a bare
    /// date (midnight), and a trailing `Z` or UTC offset (wall clock kept).
    pub fn to_datetime(&self) -> Option<NaiveDateTime> {
        let raw = self.0.trim();

        const NAIVE_FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%dT%H:%M",
            "%Y-%m-%d %H:%M",
        ];
        const OFFSET_FORMATS: [&str; 4] = [
            "%Y-%m-%dT%H:%M:%S%.f%:z",
            "%Y-%m-%d %H:%M:%S%.f%:z",
            "%Y-%m-%dT%H:%M%:z",
            "%Y-%m-%d %H:%M%:z",
        ];

        if let Some(date) = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        {
            return Some(date);
        }

        if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
            return Some(date.naive_local());
        }

        if let Some(date) = OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(raw, format).ok())
        {
            return Some(date.naive_local());
        }

        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
    }

    /// `YYYY-MM-DD HH:MM`, or the stored text when it cannot be interpreted
    pub fn display(&self) -> String {
        match self.to_datetime() {
            Some(date) => date.format("%Y-%m-%d %H:%M").to_string(),
            None => self.0.clone(),
        }
    }
}

/// File-backed profile table
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    table: Mutex<ProfileTable>,
}

impl ProfileStore {
    /// Open the store at `path`, loading whatever table is already there
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let table = Self::load(&path);
        info!(path = %path.display(), users = table.len(), "Profile store opened");
        Self {
            path,
            table: Mutex::new(table),
        }
    }

    /// Read the persisted table; any read or parse failure yields an empty table
    pub fn load(path: &Path) -> ProfileTable {
        let span = observability::storage_span("load");
        let _enter = span.enter();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No readable profile file, starting empty");
                return ProfileTable::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(table) => table,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Profile file is malformed, starting empty");
                ProfileTable::new()
            }
        }
    }

    /// Path of the persisted file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the persisted file from the current in-memory table.
    ///
    /// Failures are logged and swallowed; memory is left as is. Returns whether
    /// the write succeeded.
    pub fn save(&self) -> bool {
        let table = self.table.lock();
        self.persist(&table, None)
    }

    /// Create a profile for `id` unless one exists. Returns `true` when created.
    pub fn ensure_user(&self, id: &str, first_name: &str, username: Option<&str>) -> bool {
        let mut table = self.table.lock();
        if table.contains_key(id) {
            return false;
        }

        let profile = UserProfile::new(first_name, username, Local::now().naive_local());
        table.insert(id.to_string(), profile);
        info!(user_id = %id, users = table.len(), "Registered new user profile");
        self.persist(&table, Some(id));
        true
    }

    /// Bump the message counter of a known user; unknown users are ignored.
    ///
    /// Returns the new count when the user exists.
    pub fn increment_message_count(&self, id: &str) -> Option<u64> {
        let mut table = self.table.lock();
        let profile = table.get_mut(id)?;
        profile.message_count = profile.message_count.saturating_add(1);
        let count = profile.message_count;
        self.persist(&table, Some(id));
        Some(count)
    }

    pub fn get(&self, id: &str) -> Option<UserProfile> {
        self.table.lock().get(id).cloned()
    }

    /// Number of known users
    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    /// Copy of the whole table, e.g. for broadcasting
    pub fn snapshot(&self) -> ProfileTable {
        self.table.lock().clone()
    }

    fn persist(&self, table: &ProfileTable, user_id: Option<&str>) -> bool {
        let span = observability::storage_span("save");
        let _enter = span.enter();

        match write_table(&self.path, table) {
            Ok(()) => {
                observability::record_profile_save(true);
                debug!(path = %self.path.display(), users = table.len(), "Profile table saved");
                true
            }
            Err(e) => {
                observability::record_profile_save(false);
                error_logging::log_storage_error(
                    &e,
                    "save_profiles",
                    Some(&self.path.display().to_string()),
                    user_id,
                );
                false
            }
        }
    }
}

fn write_table(path: &Path, table: &ProfileTable) -> AppResult<()> {
    let json = serde_json::to_string_pretty(table)?;
    std::fs::write(path, json)?;
    Ok(())
}
