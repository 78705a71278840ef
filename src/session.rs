//! In-memory editing sessions.
//!
//! A [`Session`] is a mutable copy of one file's text that accumulates edits
//! until an explicit [`SessionStore::save`]. The store is an ordinary value
//! owned by the server and shared behind an `Arc`; every operation is atomic
//! with respect to the others because each one runs under the map's
//! per-entry lock.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{SurgeonError, SurgeonResult};
use crate::util::atomic::atomic_write;

/// A named, in-memory, editable buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub file_path: Option<PathBuf>,
    pub content: String,
    pub is_dirty: bool,
    pub last_modified: DateTime<Utc>,
}

impl Session {
    fn touch(&mut self, content: String) {
        self.content = content;
        self.is_dirty = true;
        self.last_modified = Utc::now();
    }
}

/// Concurrency-safe registry of live sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new session, loading `path` when it exists.
    ///
    /// A path that does not exist yet is still remembered so a later save
    /// creates the file.
    pub fn create(&self, path: Option<&Path>) -> SurgeonResult<Session> {
        let content = match path {
            Some(p) if p.exists() => {
                std::fs::read_to_string(p).map_err(|e| SurgeonError::io(p, e))?
            }
            _ => String::new(),
        };

        let session = Session {
            id: uuid::Uuid::new_v4().to_string(),
            file_path: path.map(Path::to_path_buf),
            content,
            is_dirty: false,
            last_modified: Utc::now(),
        };

        info!(
            session = %session.id,
            path = ?session.file_path,
            bytes = session.content.len(),
            "session created"
        );
        self.sessions.insert(session.id.clone(), session.clone());
        Ok(session)
    }

    /// Snapshot of one session.
    pub fn get(&self, id: &str) -> SurgeonResult<Session> {
        self.sessions
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| not_found(id))
    }

    pub fn update_content(&self, id: &str, content: String) -> SurgeonResult<()> {
        let mut entry = self.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        entry.touch(content);
        debug!(session = id, bytes = entry.content.len(), "session content replaced");
        Ok(())
    }

    /// Transform the session's content while holding its lock, then store
    /// the result as [`SessionStore::update_content`] would.
    ///
    /// Returns the content before and after the edit. If `edit` fails the
    /// session is left untouched.
    pub fn edit<F>(&self, id: &str, edit: F) -> SurgeonResult<(String, String)>
    where
        F: FnOnce(&str) -> SurgeonResult<String>,
    {
        let mut entry = self.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        let updated = edit(&entry.content)?;
        let before = std::mem::take(&mut entry.content);
        entry.touch(updated.clone());
        debug!(session = id, "session edited");
        Ok((before, updated))
    }

    /// Write the session's content to its file and clear the dirty flag.
    pub fn save(&self, id: &str) -> SurgeonResult<PathBuf> {
        let mut entry = self.sessions.get_mut(id).ok_or_else(|| not_found(id))?;
        let path = entry
            .file_path
            .clone()
            .ok_or_else(|| SurgeonError::SessionWithoutPath { id: id.to_owned() })?;

        atomic_write(&path, &entry.content)?;
        entry.is_dirty = false;
        info!(session = id, path = %path.display(), "session saved");
        Ok(path)
    }

    /// Drop a session; unknown ids are ignored.
    pub fn close(&self, id: &str) {
        if self.sessions.remove(id).is_some() {
            info!(session = id, "session closed");
        }
    }

    /// Point-in-time copy of every session, ordered by id.
    pub fn list(&self) -> Vec<Session> {
        let mut sessions: Vec<Session> = self
            .sessions
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        sessions.sort_by(|a, b| a.id.cmp(&b.id));
        sessions
    }
}

fn not_found(id: &str) -> SurgeonError {
    SurgeonError::SessionNotFound { id: id.to_owned() }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn lifecycle() {
        let store = SessionStore::new();
        let session = store.create(None).expect("create");
        assert_eq!(session.content, "");
        assert!(!session.is_dirty);

        store
            .update_content(&session.id, "public class Foo {}".to_owned())
            .expect("update");
        let current = store.get(&session.id).expect("get");
        assert_eq!(current.content, "public class Foo {}");
        assert!(current.is_dirty);
        assert!(current.last_modified >= session.last_modified);

        store.close(&session.id);
        let err = store.get(&session.id).expect_err("closed");
        assert_eq!(err.kind(), ErrorKind::NotFound);

        // Closing twice is a no-op.
        store.close(&session.id);
    }

    #[test]
    fn ids_are_unique() {
        let store = SessionStore::new();
        let a = store.create(None).expect("a");
        let b = store.create(None).expect("b");
        assert_ne!(a.id, b.id);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn loads_and_saves_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A {}").expect("write");

        let store = SessionStore::new();
        let session = store.create(Some(&path)).expect("create");
        assert_eq!(session.content, "class A {}");

        store
            .update_content(&session.id, "class B {}".to_owned())
            .expect("update");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class A {}");

        store.save(&session.id).expect("save");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class B {}");
        assert!(!store.get(&session.id).expect("get").is_dirty);
    }

    #[test]
    fn missing_path_is_created_on_save() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("New/B.cs");
        let store = SessionStore::new();
        let session = store.create(Some(&path)).expect("create");
        assert_eq!(session.file_path.as_deref(), Some(path.as_path()));
        store.update_content(&session.id, "class B {}".to_owned()).expect("update");
        store.save(&session.id).expect("save");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class B {}");
    }

    #[test]
    fn save_without_path_is_invalid_state() {
        let store = SessionStore::new();
        let session = store.create(None).expect("create");
        let err = store.save(&session.id).expect_err("no path");
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        let err = store.save("unknown").expect_err("unknown");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn failed_edit_leaves_session_untouched() {
        let store = SessionStore::new();
        let session = store.create(None).expect("create");
        store.update_content(&session.id, "x".to_owned()).expect("update");
        let before = store.get(&session.id).expect("get");

        let err = store
            .edit(&session.id, |_| Err(SurgeonError::argument("nope")))
            .expect_err("edit fails");
        assert_eq!(err.kind(), ErrorKind::ArgumentError);
        assert_eq!(store.get(&session.id).expect("get"), before);
    }

    #[test]
    fn list_is_a_snapshot() {
        let store = SessionStore::new();
        let session = store.create(None).expect("create");
        let snapshot = store.list();
        store.update_content(&session.id, "changed".to_owned()).expect("update");
        assert_eq!(snapshot[0].content, "");
    }

    #[test]
    fn concurrent_edits_are_not_lost() {
        let store = Arc::new(SessionStore::new());
        let id = store.create(None).expect("create").id;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let id = id.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store
                            .edit(&id, |text| Ok(format!("{text}x")))
                            .expect("edit");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("join");
        }

        assert_eq!(store.get(&id).expect("get").content.len(), 400);
    }
}
