//! File-backed student profile store
//!
//! One JSON file maps phone numbers to nested profile objects. Every
//! update is a locked load-modify-save over the whole file: a single
//! cross-process lock serializes all writers (and readers), trading
//! throughput for crash consistency and simplicity. No cache is kept
//! between calls.

mod lock;
mod schema;

pub use lock::FileLock;
pub use schema::{completeness, required_schema, section_names, Completeness};

use crate::config::Config;
use crate::error::{Error, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Result of a profile update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub completeness_score: f64,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub missing_fields: Vec<String>,
}

impl UpdateResult {
    fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            completeness_score: 0.0,
            total_fields: 0,
            completed_fields: 0,
            missing_fields: Vec::new(),
        }
    }
}

/// Result of a profile read
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadResult {
    pub success: bool,
    pub user_exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Value>,
    pub completeness_score: f64,
    pub total_fields: usize,
    pub completed_fields: usize,
    pub missing_fields: Vec<String>,
}

/// Concurrency-safe profile store keyed by phone number
#[derive(Debug, Clone)]
pub struct ProfileStore {
    data_file: PathBuf,
    lock_file: PathBuf,
    lock_timeout: Duration,
}

impl ProfileStore {
    /// Open (or create) the store backed by `data_file`
    pub fn new(data_file: PathBuf, lock_timeout: Duration) -> Result<Self> {
        let lock_file = data_file.with_extension("lock");

        if let Some(parent) = data_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !data_file.exists() {
            std::fs::write(&data_file, "{}")?;
        }

        Ok(Self {
            data_file,
            lock_file,
            lock_timeout,
        })
    }

    /// Open the store at the configured location
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.paths.profile_file.clone(),
            Duration::from_secs(config.profile.lock_timeout_secs),
        )
    }

    /// Update a single field by dot-separated path, creating the profile
    /// on first contact. Lock contention and IO failures come back as
    /// `success: false`, never as a panic or raised error.
    pub fn update(
        &self,
        phone_number: &str,
        field_path: &str,
        value: Value,
        agent_id: &str,
    ) -> UpdateResult {
        match self.try_update(phone_number, field_path, value, agent_id) {
            Ok(c) => UpdateResult {
                success: true,
                error: None,
                completeness_score: c.completeness_score,
                total_fields: c.total_fields,
                completed_fields: c.completed_fields,
                missing_fields: c.missing_fields,
            },
            Err(e) => UpdateResult::failure(e.to_string()),
        }
    }

    fn try_update(
        &self,
        phone_number: &str,
        field_path: &str,
        value: Value,
        agent_id: &str,
    ) -> Result<Completeness> {
        if field_path.is_empty() {
            return Err(Error::Profile("Empty field path".to_string()));
        }

        // Lock guards the entire load-modify-save cycle; released on drop
        let _lock = FileLock::acquire(&self.lock_file, self.lock_timeout)?;

        let mut all_data = self.load_all()?;

        let profile = all_data
            .entry(phone_number.to_string())
            .or_insert_with(|| initialize_profile(phone_number));

        set_nested_value(profile, field_path, value)?;
        bump_metadata(profile, agent_id);

        debug!(
            "Updated {} for {} (agent {})",
            field_path, phone_number, agent_id
        );

        let result = completeness(profile);
        self.save_all(&all_data)?;

        Ok(result)
    }

    /// Read a profile with its completeness accounting. A never-seen phone
    /// number reports `user_exists: false` without creating a record.
    pub fn read(&self, phone_number: &str) -> ReadResult {
        match self.try_read(phone_number) {
            Ok(result) => result,
            Err(e) => ReadResult {
                success: false,
                user_exists: false,
                error: Some(e.to_string()),
                user_data: None,
                completeness_score: 0.0,
                total_fields: 0,
                completed_fields: 0,
                missing_fields: Vec::new(),
            },
        }
    }

    fn try_read(&self, phone_number: &str) -> Result<ReadResult> {
        let _lock = FileLock::acquire(&self.lock_file, self.lock_timeout)?;

        let all_data = self.load_all()?;

        let Some(profile) = all_data.get(phone_number) else {
            return Ok(ReadResult {
                success: true,
                user_exists: false,
                error: None,
                user_data: None,
                completeness_score: 0.0,
                total_fields: 0,
                completed_fields: 0,
                missing_fields: section_names(),
            });
        };

        let c = completeness(profile);
        Ok(ReadResult {
            success: true,
            user_exists: true,
            error: None,
            user_data: Some(profile.clone()),
            completeness_score: c.completeness_score,
            total_fields: c.total_fields,
            completed_fields: c.completed_fields,
            missing_fields: c.missing_fields,
        })
    }

    fn load_all(&self) -> Result<Map<String, Value>> {
        let content = match std::fs::read_to_string(&self.data_file) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&content) {
            Ok(Value::Object(map)) => Ok(map),
            // Corrupt or non-object content starts the store over rather
            // than wedging every caller
            _ => Ok(Map::new()),
        }
    }

    fn save_all(&self, data: &Map<String, Value>) -> Result<()> {
        let content = serde_json::to_string_pretty(&Value::Object(data.clone()))?;
        std::fs::write(&self.data_file, content)?;
        Ok(())
    }

    /// Path to the backing data file
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }
}

/// Fresh profile from the required schema with the phone number pre-filled.
///
/// Version starts at 0 so that the metadata bump applied by every
/// successful update (including the initializing one) yields version N
/// after N updates.
fn initialize_profile(phone_number: &str) -> Value {
    let mut profile = required_schema();
    profile["personal_info"]["phone_number"] = json!(phone_number);

    let now = Utc::now().to_rfc3339();
    profile["_metadata"] = json!({
        "created_at": now,
        "last_updated": now,
        "version": 0,
        "last_updated_by": "system"
    });

    info!("Initialized profile for {}", phone_number);
    profile
}

/// Set a value by dot-separated path, creating intermediate objects as
/// needed. Writes outside the declared schema are allowed; a path that
/// runs through a non-object value is an error.
fn set_nested_value(data: &mut Value, field_path: &str, value: Value) -> Result<()> {
    let keys: Vec<&str> = field_path.split('.').collect();
    let mut current = data;

    for key in &keys[..keys.len() - 1] {
        let obj = current.as_object_mut().ok_or_else(|| {
            Error::Profile(format!(
                "Field path '{}' conflicts with an existing non-object value",
                field_path
            ))
        })?;
        current = obj
            .entry(key.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let last = keys[keys.len() - 1];
    let obj = current.as_object_mut().ok_or_else(|| {
        Error::Profile(format!(
            "Field path '{}' conflicts with an existing non-object value",
            field_path
        ))
    })?;
    obj.insert(last.to_string(), value);
    Ok(())
}

fn bump_metadata(profile: &mut Value, agent_id: &str) {
    if !profile["_metadata"].is_object() {
        profile["_metadata"] = json!({ "version": 0 });
    }

    let version = profile["_metadata"]["version"].as_u64().unwrap_or(0);
    profile["_metadata"]["version"] = json!(version + 1);
    profile["_metadata"]["last_updated"] = json!(Utc::now().to_rfc3339());
    profile["_metadata"]["last_updated_by"] = json!(agent_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(dir: &tempfile::TempDir) -> ProfileStore {
        ProfileStore::new(dir.path().join("user_data.json"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_first_update_initializes_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let before = store.read("0123456789");
        assert!(!before.user_exists);

        let result = store.update(
            "0123456789",
            "personal_info.full_name",
            json!("Jane Doe"),
            "agentX",
        );
        assert!(result.success);
        assert!(result.completeness_score > before.completeness_score);

        let after = store.read("0123456789");
        assert!(after.user_exists);
        let profile = after.user_data.unwrap();
        assert_eq!(profile["personal_info"]["full_name"], "Jane Doe");
        assert_eq!(profile["personal_info"]["phone_number"], "0123456789");
        assert_eq!(profile["_metadata"]["version"], 1);
        assert_eq!(profile["_metadata"]["last_updated_by"], "agentX");
        assert!(profile["_metadata"]["created_at"].is_string());
    }

    #[test]
    fn test_version_counts_successful_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        for i in 0..5 {
            let result = store.update(
                "0123456789",
                "academic_background.graduation_year",
                json!(2020 + i),
                "agentY",
            );
            assert!(result.success);
        }

        let profile = store.read("0123456789").user_data.unwrap();
        assert_eq!(profile["_metadata"]["version"], 5);
    }

    #[test]
    fn test_read_unknown_phone_reports_missing_sections() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let result = store.read("9999999999");
        assert!(result.success);
        assert!(!result.user_exists);
        assert!(result.user_data.is_none());
        assert_eq!(result.completeness_score, 0.0);
        assert_eq!(result.missing_fields.len(), 5);
        assert!(result.missing_fields.contains(&"personal_info".to_string()));

        // Reading must not create the record
        let again = store.read("9999999999");
        assert!(!again.user_exists);
    }

    #[test]
    fn test_completeness_after_first_update() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let result = store.update(
            "0123456789",
            "personal_info.full_name",
            json!("Jane Doe"),
            "agentX",
        );

        // phone + full_name + the four seeded defaults out of 20 leaves
        assert_eq!(result.total_fields, 20);
        assert_eq!(result.completed_fields, 6);
        assert_eq!(result.completeness_score, 0.3);
        assert!(result
            .missing_fields
            .contains(&"personal_info.email".to_string()));
    }

    #[test]
    fn test_permissive_write_beyond_schema() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let result = store.update(
            "0123456789",
            "program_preferences.counselor.notes",
            json!("prefers evening classes"),
            "agentZ",
        );
        assert!(result.success);

        let profile = store.read("0123456789").user_data.unwrap();
        assert_eq!(
            profile["program_preferences"]["counselor"]["notes"],
            "prefers evening classes"
        );
        // Off-schema fields never count toward completeness
        assert_eq!(completeness(&profile).total_fields, 20);
    }

    #[test]
    fn test_path_through_scalar_fails_cleanly() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.update(
            "0123456789",
            "personal_info.full_name",
            json!("Jane Doe"),
            "agentX",
        );
        let result = store.update(
            "0123456789",
            "personal_info.full_name.first",
            json!("Jane"),
            "agentX",
        );

        assert!(!result.success);
        assert!(result.error.unwrap().contains("non-object"));

        // The failed update still bumped nothing
        let profile = store.read("0123456789").user_data.unwrap();
        assert_eq!(profile["_metadata"]["version"], 1);
    }

    #[test]
    fn test_updates_to_different_phones_share_one_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        store.update("1111111111", "personal_info.email", json!("a@x.com"), "a");
        store.update("2222222222", "personal_info.email", json!("b@x.com"), "b");

        assert!(store.read("1111111111").user_exists);
        assert!(store.read("2222222222").user_exists);
    }

    #[test]
    fn test_concurrent_updates_never_lose_writes() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir);

        let mut handles = Vec::new();
        for t in 0..4 {
            let store = store.clone();
            handles.push(std::thread::spawn(move || {
                for i in 0..5 {
                    let result = store.update(
                        "0123456789",
                        "academic_background.percentage_cgpa",
                        json!(format!("{}.{}", t, i)),
                        "agent",
                    );
                    assert!(result.success, "update failed: {:?}", result.error);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let profile = store.read("0123456789").user_data.unwrap();
        assert_eq!(profile["_metadata"]["version"], 20);
    }

    #[test]
    fn test_lock_contention_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("user_data.json");
        let store = ProfileStore::new(data_file.clone(), Duration::from_millis(300)).unwrap();

        let _held = FileLock::acquire(
            &data_file.with_extension("lock"),
            Duration::from_secs(1),
        )
        .unwrap();

        let result = store.update("0123456789", "personal_info.email", json!("x"), "a");
        assert!(!result.success);
        assert!(result.error.unwrap().to_lowercase().contains("lock"));
    }

    #[test]
    fn test_corrupt_data_file_starts_over() {
        let dir = tempfile::tempdir().unwrap();
        let data_file = dir.path().join("user_data.json");
        std::fs::write(&data_file, "not json at all").unwrap();

        let store = ProfileStore::new(data_file, Duration::from_secs(1)).unwrap();
        let result = store.update("0123456789", "personal_info.email", json!("x"), "a");
        assert!(result.success);
    }
}
