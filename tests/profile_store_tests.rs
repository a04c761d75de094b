//! # Profile Store Tests
//!
//! File-level behaviour of the profile table: creation, persistence,
//! recovery from unreadable files and counter updates.

use std::fs;

use profile_bot::profile_store::{ProfileStore, ProfileTable};
use tempfile::TempDir;

use test_helpers::temp_store;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_starts_empty() {
        let (_dir, store) = temp_store();
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_ensure_user_creates_and_persists() {
        let (_dir, store) = temp_store();

        assert!(store.ensure_user("42", "Ava", Some("ava")));

        let profile = store.get("42").expect("profile should exist");
        assert_eq!(profile.first_name, "Ava");
        assert_eq!(profile.username.as_deref(), Some("ava"));
        assert_eq!(profile.message_count, 0);

        let on_disk = ProfileStore::load(store.path());
        assert_eq!(on_disk.get("42"), Some(&profile));
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let (_dir, store) = temp_store();

        assert!(store.ensure_user("42", "Ava", None));
        let first = store.get("42").unwrap();
        let written = fs::read_to_string(store.path()).unwrap();

        // Remove the file: a second call must not write it again
        fs::remove_file(store.path()).unwrap();
        assert!(!store.ensure_user("42", "Someone Else", Some("other")));

        assert_eq!(store.get("42"), Some(first));
        assert_eq!(store.len(), 1);
        assert!(!store.path().exists());
        assert!(written.contains("\"Ava\""));
    }

    #[test]
    fn test_username_absent_is_written_as_null() {
        let (_dir, store) = temp_store();
        store.ensure_user("7", "Bo", None);

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert!(value["7"]["username"].is_null());
        assert_eq!(value["7"]["message_count"], 0);
        assert!(value["7"]["join_date"].is_string());
    }

    #[test]
    fn test_file_is_pretty_printed() {
        let (_dir, store) = temp_store();
        store.ensure_user("7", "Bo", None);

        let content = fs::read_to_string(store.path()).unwrap();
        assert!(content.contains('\n'));
        assert!(content.contains("  \"7\""));
    }

    #[test]
    fn test_reopen_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot_data.json");

        {
            let store = ProfileStore::open(&path);
            store.ensure_user("1", "Ann", Some("ann"));
            store.ensure_user("2", "Ben", None);
            store.increment_message_count("2");
            store.increment_message_count("2");
        }

        let reopened = ProfileStore::open(&path);
        assert_eq!(reopened.len(), 2);
        assert_eq!(reopened.get("1").unwrap().message_count, 0);
        assert_eq!(reopened.get("2").unwrap().message_count, 2);
        assert_eq!(reopened.get("2").unwrap().first_name, "Ben");
    }

    #[test]
    fn test_invalid_file_yields_empty_table() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot_data.json");
        fs::write(&path, "{ this is not json").unwrap();

        let store = ProfileStore::open(&path);
        assert!(store.is_empty());

        // The store keeps working and overwrites the broken file
        assert!(store.ensure_user("42", "Ava", None));
        let table: ProfileTable = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_existing_file_with_offset_timestamps_loads() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot_data.json");
        fs::write(
            &path,
            r#"{
  "5": {
    "first_name": "Cy",
    "username": null,
    "join_date": "2024-03-10T08:15:00.000123",
    "message_count": 3
  },
  "6": {
    "first_name": "Di",
    "username": "di",
    "join_date": "2024-03-11T09:00:00+01:00",
    "message_count": 0
  }
}"#,
        )
        .unwrap();

        let store = ProfileStore::open(&path);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("5").unwrap().message_count, 3);
        assert_eq!(
            store.get("6").unwrap().join_date.display(),
            "2024-03-11 09:00"
        );
    }

    #[test]
    fn test_increment_is_monotonic() {
        let (_dir, store) = temp_store();
        store.ensure_user("42", "Ava", None);

        let counts: Vec<u64> = (0..5)
            .map(|_| store.increment_message_count("42").unwrap())
            .collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 5]);
        assert_eq!(ProfileStore::load(store.path())["42"].message_count, 5);
    }

    #[test]
    fn test_increment_unknown_user_is_noop() {
        let (_dir, store) = temp_store();

        assert_eq!(store.increment_message_count("99"), None);
        assert!(store.is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_failure_keeps_memory() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes every write fail
        let path = dir.path().join("bot_data.json");
        fs::create_dir(&path).unwrap();

        let store = ProfileStore::open(&path);
        assert!(store.ensure_user("42", "Ava", None));
        assert_eq!(store.increment_message_count("42"), Some(1));
        assert_eq!(store.get("42").unwrap().message_count, 1);
        assert!(path.is_dir());
    }

    #[test]
    fn test_concurrent_increments_are_not_lost() {
        let (_dir, store) = temp_store();
        store.ensure_user("42", "Ava", None);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..10 {
                        store.increment_message_count("42");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.get("42").unwrap().message_count, 80);
        assert_eq!(ProfileStore::load(store.path())["42"].message_count, 80);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let (_dir, store) = temp_store();
        store.ensure_user("1", "Ann", None);

        let snapshot = store.snapshot();
        store.ensure_user("2", "Ben", None);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_hand_edited_timestamps_do_not_empty_the_table() {
        for edited in [
            "2024-05-01 12:30:00",
            "2024-05-01T12:30",
            "2024-05-01",
            "sometime in May",
        ] {
            let dir = TempDir::new().unwrap();
            let path = dir.path().join("bot_data.json");
            let content = serde_json::json!({
                "1": {
                    "first_name": "Ann",
                    "username": null,
                    "join_date": "2024-04-01T08:00:00.000001",
                    "message_count": 4
                },
                "2": {
                    "first_name": "Ben",
                    "username": "ben",
                    "join_date": edited,
                    "message_count": 1
                }
            });
            fs::write(&path, serde_json::to_string_pretty(&content).unwrap()).unwrap();

            let store = ProfileStore::open(&path);
            assert_eq!(store.len(), 2, "table emptied by {:?}", edited);

            // A later rewrite keeps every existing profile and the edited text
            store.ensure_user("3", "Cy", None);
            let reloaded = ProfileStore::load(&path);
            assert_eq!(reloaded.len(), 3);
            assert_eq!(reloaded["1"].message_count, 4);
            assert_eq!(reloaded["2"].join_date.as_str(), edited);
        }
    }

    #[test]
    fn test_save_rewrites_file_from_memory() {
        let (_dir, store) = temp_store();
        store.ensure_user("1", "Ann", None);
        store.increment_message_count("1");
        fs::remove_file(store.path()).unwrap();

        assert!(store.save());

        let on_disk = ProfileStore::load(store.path());
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk["1"].message_count, 1);
    }

    #[test]
    fn test_save_failure_is_reported_and_memory_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot_data.json");
        let store = ProfileStore::open(&path);
        store.ensure_user("1", "Ann", None);

        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();

        assert!(!store.save());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("1").unwrap().first_name, "Ann");
        assert!(path.is_dir());
    }

    #[test]
    fn test_increment_saturates_at_max() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bot_data.json");
        fs::write(
            &path,
            format!(
                r#"{{"9": {{"first_name": "Max", "username": null, "join_date": "2024-01-01T00:00:00", "message_count": {}}}}}"#,
                u64::MAX
            ),
        )
        .unwrap();

        let store = ProfileStore::open(&path);
        assert_eq!(store.increment_message_count("9"), Some(u64::MAX));
        assert_eq!(ProfileStore::load(&path)["9"].message_count, u64::MAX);
    }
}
