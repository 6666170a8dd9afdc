use std::{
    io,
    path::{Path, PathBuf},
};

use crate::codec;

use super::result::PresentationReason;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    name: String,
    payload: Result<Payload, Rejection>,
}

/// The canonical base64 token of a case and the size it decodes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub token: String,
    pub original_size: usize,
}

/// A case whose own data violates the payload contract. The program is never run for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub original_size: Option<usize>,
    pub reason: PresentationReason,
}

#[derive(Debug, thiserror::Error)]
pub enum DiscoverError {
    #[error("No testcase matched '{pattern}' in '{}'", .dir.to_string_lossy())]
    NoTestcase { dir: PathBuf, pattern: String },

    #[error(transparent)]
    Fs(#[from] fsutil::Error),
}

impl TestCase {
    /// The label (first token) is ignored; the second whitespace-separated token is the payload.
    pub fn from_contents(name: impl Into<String>, contents: &str) -> Self {
        let payload = match contents.split_whitespace().nth(1) {
            Some(token) => Self::validate(token),
            None => Err(Rejection {
                original_size: None,
                reason: PresentationReason::MissingPayload,
            }),
        };
        Self {
            name: name.into(),
            payload,
        }
    }

    /// Never fails: an unreadable file becomes a rejected case.
    pub fn load(filepath: impl AsRef<Path>) -> Self {
        let filepath = filepath.as_ref();
        let name = filepath.to_string_lossy().into_owned();
        match fsutil::read_to_string(filepath) {
            Ok(contents) => Self::from_contents(name, &contents),
            Err(e) => {
                log::warn!("{}", e);
                Self {
                    name,
                    payload: Err(Rejection {
                        original_size: None,
                        reason: PresentationReason::UnreadableFile(e.to_string()),
                    }),
                }
            }
        }
    }

    fn validate(token: &str) -> Result<Payload, Rejection> {
        let original_size = codec::decode_size(token).map_err(|_| Rejection {
            original_size: None,
            reason: PresentationReason::InvalidBase64,
        })?;
        if !codec::within_limit(original_size) {
            return Err(Rejection {
                original_size: Some(original_size),
                reason: PresentationReason::TooLarge(original_size),
            });
        }
        Ok(Payload {
            token: token.to_owned(),
            original_size,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn payload(&self) -> Result<&Payload, &Rejection> {
        self.payload.as_ref()
    }

    pub fn original_size(&self) -> Option<usize> {
        match &self.payload {
            Ok(p) => Some(p.original_size),
            Err(r) => r.original_size,
        }
    }
}

/// Loads every file in `dir` matching `pattern`, in lexicographic path order.
/// That order is the canonical case order of a run.
/// A missing `dir` matches nothing, like a shell glob.
pub fn discover(dir: impl AsRef<Path>, pattern: &str) -> Result<Vec<TestCase>, DiscoverError> {
    let dir = dir.as_ref();
    let files = match fsutil::list_files_matching(dir, pattern) {
        Err(fsutil::Error::SingleIO(_, _, e)) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} does not exist", dir.to_string_lossy());
            Vec::new()
        }
        res => res?,
    };
    if files.is_empty() {
        return Err(DiscoverError::NoTestcase {
            dir: dir.to_owned(),
            pattern: pattern.to_owned(),
        });
    }
    log::info!("Found {} testcases in {}", files.len(), dir.to_string_lossy());
    Ok(files.iter().map(TestCase::load).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codec::{encode, MAX_PAYLOAD_SIZE};

    #[test]
    fn second_token_is_the_payload() {
        let t = TestCase::from_contents("cases/a.txt", "label  QUJD\n trailing junk\n");
        let p = t.payload().unwrap();
        assert_eq!(p.token, "QUJD");
        assert_eq!(p.original_size, 3);
        assert_eq!(t.original_size(), Some(3));
        assert_eq!(t.name(), "cases/a.txt");
    }

    #[test]
    fn missing_or_invalid_payload_is_rejected() {
        let t = TestCase::from_contents("x", "only-a-label\n");
        assert_eq!(
            t.payload().unwrap_err().reason,
            PresentationReason::MissingPayload
        );

        let t = TestCase::from_contents("x", "label not-base64!!");
        let r = t.payload().unwrap_err();
        assert_eq!(r.reason, PresentationReason::InvalidBase64);
        assert_eq!(r.original_size, None);
    }

    #[test]
    fn size_limit_boundary() {
        let exact = encode(&vec![0u8; MAX_PAYLOAD_SIZE]);
        let t = TestCase::from_contents("exact", &format!("label {}", exact));
        assert_eq!(t.payload().unwrap().original_size, MAX_PAYLOAD_SIZE);

        let over = encode(&vec![0u8; MAX_PAYLOAD_SIZE + 1]);
        let t = TestCase::from_contents("over", &format!("label {}", over));
        let r = t.payload().unwrap_err();
        assert_eq!(r.reason, PresentationReason::TooLarge(MAX_PAYLOAD_SIZE + 1));
        assert_eq!(t.original_size(), Some(MAX_PAYLOAD_SIZE + 1));
    }

    #[test]
    fn discover_sorts_by_path() {
        let dir = tempfile::tempdir().unwrap();
        for (name, token) in [("b.txt", "QUI="), ("a.txt", "QQ=="), ("c.txt", "QUJD")] {
            fsutil::write(dir.path().join(name), format!("{} {}\n", name, token)).unwrap();
        }
        fsutil::write(dir.path().join("ignored.json"), "{}").unwrap();

        let cases = discover(dir.path(), "*.txt").unwrap();
        let names: Vec<_> = cases.iter().map(|t| t.name().to_owned()).collect();
        let want: Vec<_> = ["a.txt", "b.txt", "c.txt"]
            .iter()
            .map(|f| dir.path().join(f).to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, want);

        let sizes: Vec<_> = cases.iter().map(TestCase::original_size).collect();
        assert_eq!(sizes, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn discover_without_cases_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fsutil::write(dir.path().join("note.md"), "hi").unwrap();
        let res = discover(dir.path(), "*.txt");
        assert!(matches!(res, Err(DiscoverError::NoTestcase { .. })));
    }

    #[test]
    fn missing_cases_dir_is_no_testcase() {
        let dir = tempfile::tempdir().unwrap();
        let res = discover(dir.path().join("cases"), "*.txt");
        assert!(matches!(res, Err(DiscoverError::NoTestcase { .. })));
    }

    #[test]
    fn cases_path_that_is_a_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cases");
        fsutil::write(&path, "not a dir").unwrap();
        let res = discover(&path, "*.txt");
        assert!(matches!(res, Err(DiscoverError::Fs(fsutil::Error::SingleIO(..)))));
    }
}
