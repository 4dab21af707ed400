//! Visitor registration store
//!
//! The whole collection lives in one JSON array file that is read and
//! rewritten in full on every registration. Registrations on a store are
//! serialized, so the duplicate-email check and id assignment cannot race.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Name and Email are required")]
    MissingField,
    #[error("Email already registered")]
    DuplicateEmail,
    #[error("Backing file {path} is corrupt: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A persisted registration entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorRecord {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "created_at", alias = "registeredAt")]
    pub registered_at: DateTime<Utc>,
}

/// Registration as submitted; any field may be missing.
///
/// Field values of any JSON type are accepted and kept as text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVisitor {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub phone: Option<String>,
}

/// `null` and `false` count as absent; other non-strings keep their JSON text
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

/// Present means not absent and not blank; the value itself is kept verbatim
fn present(field: Option<String>) -> Option<String> {
    field.filter(|v| !v.trim().is_empty())
}

struct Writer {
    last_id: u64,
}

/// Thread-safe handle to the backing file
#[derive(Clone)]
pub struct RegistrationStore {
    path: Arc<PathBuf>,
    writer: Arc<Mutex<Writer>>,
}

impl RegistrationStore {
    /// Open the store, creating the file as an empty array if absent.
    ///
    /// Content that does not parse is reported rather than silently replaced.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            load(&path)?
        } else {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, "[]")?;
            Vec::new()
        };

        let last_id = records.iter().map(|r| r.id).max().unwrap_or(0);
        tracing::info!(path = %path.display(), records = records.len(), "Registration store opened");

        Ok(Self {
            path: Arc::new(path),
            writer: Arc::new(Mutex::new(Writer { last_id })),
        })
    }

    /// Full record collection. A missing, unreadable or invalid file reads as empty.
    #[allow(dead_code)] // Registration itself reads strictly
    pub fn read_all(&self) -> Vec<VisitorRecord> {
        load(&self.path).unwrap_or_else(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "Backing file unusable, treating as empty");
            Vec::new()
        })
    }

    /// Append a visitor and rewrite the file. Returns the stored record.
    pub fn register(&self, visitor: NewVisitor) -> StoreResult<VisitorRecord> {
        let (Some(name), Some(email)) = (present(visitor.name), present(visitor.email)) else {
            return Err(StoreError::MissingField);
        };

        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);

        // Strict read: a damaged file fails the registration instead of being overwritten
        let mut records = load(&self.path)?;
        if records.iter().any(|r| r.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let id = next_id(writer.last_id, now);
        let record = VisitorRecord {
            id,
            name,
            email,
            phone: visitor.phone,
            registered_at: now,
        };
        records.push(record.clone());

        self.write_all(&records)?;
        writer.last_id = id;
        drop(writer);

        tracing::info!(user_id = record.id, total = records.len(), "Visitor registered");
        Ok(record)
    }

    /// Write to a sibling temp file, then rename over the backing file
    fn write_all(&self, records: &[VisitorRecord]) -> StoreResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path.as_ref())?;
        Ok(())
    }
}

/// Parse the backing file. A missing file is an empty collection.
fn load(path: &Path) -> StoreResult<Vec<VisitorRecord>> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    serde_json::from_str(&data).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Millisecond clock id, forced strictly above the last id handed out
fn next_id(last_id: u64, now: DateTime<Utc>) -> u64 {
    let millis = u64::try_from(now.timestamp_millis()).unwrap_or(0);
    millis.max(last_id + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn visitor(name: Option<&str>, email: Option<&str>, phone: Option<&str>) -> NewVisitor {
        NewVisitor {
            name: name.map(String::from),
            email: email.map(String::from),
            phone: phone.map(String::from),
        }
    }

    fn temp_store() -> (TempDir, RegistrationStore) {
        let temp = TempDir::new().unwrap();
        let store = RegistrationStore::open(temp.path().join("users.json")).unwrap();
        (temp, store)
    }

    #[test]
    fn test_open_creates_empty_array() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("users.json");
        let store = RegistrationStore::open(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_open_rejects_corrupt_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.json");
        fs::write(&path, "{not json").unwrap();

        let err = RegistrationStore::open(&path).err().unwrap();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // Left untouched for the operator
        assert_eq!(fs::read_to_string(&path).unwrap(), "{not json");
    }

    #[test]
    fn test_register_preserves_fields() {
        let (_temp, store) = temp_store();
        let before = store.read_all().len();

        let record = store
            .register(visitor(Some(" Sita "), Some("sita@example.com"), Some("+977-1")))
            .unwrap();

        let all = store.read_all();
        assert_eq!(all.len(), before + 1);
        assert_eq!(all[0], record);
        assert_eq!(record.name, " Sita ");
        assert_eq!(record.email, "sita@example.com");
        assert_eq!(record.phone.as_deref(), Some("+977-1"));
        assert!(record.id > 0);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (_temp, store) = temp_store();
        store.register(visitor(Some("A"), Some("a@x.com"), None)).unwrap();

        let err = store
            .register(visitor(Some("B"), Some("a@x.com"), None))
            .unwrap_err();

        assert!(matches!(err, StoreError::DuplicateEmail));
        assert_eq!(store.read_all().len(), 1);
        assert_eq!(store.read_all()[0].name, "A");
    }

    #[test]
    fn test_missing_fields_rejected() {
        let (_temp, store) = temp_store();

        for input in [
            visitor(None, Some("a@x.com"), None),
            visitor(Some("A"), None, None),
            visitor(Some("   "), Some("a@x.com"), None),
            visitor(Some("A"), Some(""), Some("123")),
        ] {
            let err = store.register(input).unwrap_err();
            assert!(matches!(err, StoreError::MissingField));
        }
        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_sequential_registrations_get_distinct_ids() {
        let (_temp, store) = temp_store();

        for i in 0..25 {
            store
                .register(visitor(Some("V"), Some(&format!("v{i}@x.com")), None))
                .unwrap();
        }

        let all = store.read_all();
        assert_eq!(all.len(), 25);
        let ids: HashSet<_> = all.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 25);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn test_concurrent_same_email_registers_once() {
        let (_temp, store) = temp_store();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store.register(visitor(Some(&format!("V{i}")), Some("same@x.com"), None))
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(store.read_all().len(), 1);
    }

    #[test]
    fn test_file_layout_matches_records() {
        let (temp, store) = temp_store();
        store.register(visitor(Some("A"), Some("a@x.com"), None)).unwrap();

        let raw = fs::read_to_string(temp.path().join("users.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let entry = &value[0];

        assert!(raw.contains("\n  "), "expected pretty-printed output");
        assert_eq!(entry["name"], "A");
        assert!(entry["created_at"].is_string());
        assert!(entry.get("phone").is_none());
        assert!(!temp.path().join("users.json.tmp").exists());
    }

    #[test]
    fn test_corrupt_at_runtime_reads_empty() {
        let (temp, store) = temp_store();
        store.register(visitor(Some("A"), Some("a@x.com"), None)).unwrap();
        fs::write(temp.path().join("users.json"), "garbage").unwrap();

        assert!(store.read_all().is_empty());
    }

    #[test]
    fn test_register_refuses_to_overwrite_corrupt_file() {
        let (temp, store) = temp_store();
        let path = temp.path().join("users.json");
        store.register(visitor(Some("A"), Some("a@x.com"), None)).unwrap();
        fs::write(&path, "garbage").unwrap();

        let err = store
            .register(visitor(Some("B"), Some("b@x.com"), None))
            .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "garbage");
    }

    #[test]
    fn test_register_recreates_deleted_file() {
        let (temp, store) = temp_store();
        let path = temp.path().join("users.json");
        fs::remove_file(&path).unwrap();

        store.register(visitor(Some("A"), Some("a@x.com"), None)).unwrap();
        assert_eq!(store.read_all().len(), 1);
    }

    #[test]
    fn test_new_visitor_accepts_non_string_fields() {
        let visitor: NewVisitor = serde_json::from_str(
            r#"{"name": "Sita", "email": "sita@example.com", "phone": 9841000000}"#,
        )
        .unwrap();
        assert_eq!(visitor.phone.as_deref(), Some("9841000000"));

        let visitor: NewVisitor =
            serde_json::from_str(r#"{"name": null, "email": false}"#).unwrap();
        assert!(visitor.name.is_none());
        assert!(visitor.email.is_none());
        assert!(visitor.phone.is_none());
    }

    #[test]
    fn test_ids_continue_after_reopen() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("users.json");
        let first = RegistrationStore::open(&path)
            .unwrap()
            .register(visitor(Some("A"), Some("a@x.com"), None))
            .unwrap();

        let reopened = RegistrationStore::open(&path).unwrap();
        let second = reopened
            .register(visitor(Some("B"), Some("b@x.com"), None))
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(reopened.read_all().len(), 2);
    }

    #[test]
    fn test_unwritable_backing_file_is_io_error() {
        let (temp, store) = temp_store();
        let path = temp.path().join("users.json");
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();

        let err = store
            .register(visitor(Some("A"), Some("a@x.com"), None))
            .unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }

    #[test]
    fn test_next_id_never_repeats() {
        let now = Utc::now();
        let millis = u64::try_from(now.timestamp_millis()).unwrap();
        assert_eq!(next_id(0, now), millis);
        assert_eq!(next_id(millis, now), millis + 1);
        assert_eq!(next_id(millis + 10, now), millis + 11);
    }
}
