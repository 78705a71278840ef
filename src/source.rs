//! Where an operation's text comes from and where its result goes.

use std::path::PathBuf;

use crate::error::{SurgeonError, SurgeonResult};
use crate::session::SessionStore;
use crate::util::atomic::atomic_write;

/// Exactly one of a live session or a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    Session(String),
    File(PathBuf),
}

/// Text before and after an edit applied through a [`SourceRef`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub before: String,
    pub after: String,
}

impl EditOutcome {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }
}

impl SourceRef {
    /// Build from optional arguments; exactly one must be present.
    pub fn from_parts(session_id: Option<String>, path: Option<PathBuf>) -> SurgeonResult<Self> {
        match (session_id, path) {
            (Some(id), None) if !id.trim().is_empty() => Ok(Self::Session(id)),
            (None, Some(path)) => Ok(Self::File(path)),
            (Some(_), Some(_)) => Err(SurgeonError::argument(
                "pass either 'sessionId' or 'path', not both",
            )),
            _ => Err(SurgeonError::argument(
                "either 'sessionId' or 'path' must be provided",
            )),
        }
    }

    pub fn read(&self, sessions: &SessionStore) -> SurgeonResult<String> {
        match self {
            Self::Session(id) => sessions.get(id).map(|s| s.content),
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| SurgeonError::io(path, e)),
        }
    }

    /// Run `edit` on the current text and store the result: back into the
    /// session buffer (marking it dirty) or atomically onto disk.
    pub fn apply<F>(&self, sessions: &SessionStore, edit: F) -> SurgeonResult<EditOutcome>
    where
        F: FnOnce(&str) -> SurgeonResult<String>,
    {
        match self {
            Self::Session(id) => {
                let (before, after) = sessions.edit(id, edit)?;
                Ok(EditOutcome { before, after })
            }
            Self::File(path) => {
                let before = self.read(sessions)?;
                let outcome = EditOutcome {
                    after: edit(&before)?,
                    before,
                };
                if outcome.changed() {
                    atomic_write(path, &outcome.after)?;
                }
                Ok(outcome)
            }
        }
    }

    /// Label for diff headers and log lines: the file path, or
    /// `session:<id>`.
    pub fn label(&self) -> String {
        match self {
            Self::Session(id) => format!("session:{id}"),
            Self::File(path) => path.display().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn exactly_one_source() {
        assert_eq!(
            SourceRef::from_parts(Some("abc".into()), None).expect("session"),
            SourceRef::Session("abc".into())
        );
        let file = SourceRef::from_parts(None, Some(PathBuf::from("A.cs"))).expect("file");
        assert_eq!(file.label(), "A.cs");
        assert_eq!(SourceRef::Session("abc".into()).label(), "session:abc");
        for (id, path) in [
            (None, None),
            (Some("abc".to_owned()), Some(PathBuf::from("A.cs"))),
            (Some("  ".to_owned()), None),
        ] {
            let err = SourceRef::from_parts(id, path).expect_err("invalid");
            assert_eq!(err.kind(), ErrorKind::ArgumentError);
        }
    }

    #[test]
    fn session_edits_stay_in_memory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A {}").expect("write");

        let store = SessionStore::new();
        let session = store.create(Some(&path)).expect("create");
        let source = SourceRef::Session(session.id.clone());

        let outcome = source
            .apply(&store, |text| Ok(text.replace('A', "B")))
            .expect("apply");
        assert!(outcome.changed());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class A {}");
        let current = store.get(&session.id).expect("get");
        assert_eq!(current.content, "class B {}");
        assert!(current.is_dirty);
    }

    #[test]
    fn file_edits_go_to_disk() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A {}").expect("write");

        let store = SessionStore::new();
        let outcome = SourceRef::File(path.clone())
            .apply(&store, |text| Ok(text.replace('A', "C")))
            .expect("apply");
        assert_eq!(outcome.before, "class A {}");
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class C {}");
    }

    #[test]
    fn no_op_file_edit_reports_unchanged() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("A.cs");
        std::fs::write(&path, "class A {}").expect("write");

        let outcome = SourceRef::File(path.clone())
            .apply(&SessionStore::new(), |text| Ok(text.to_owned()))
            .expect("apply");
        assert!(!outcome.changed());
        assert_eq!(std::fs::read_to_string(&path).expect("read"), "class A {}");
    }

    #[test]
    fn missing_file_is_not_found() {
        let store = SessionStore::new();
        let err = SourceRef::File(PathBuf::from("/no/such/File.cs"))
            .read(&store)
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
