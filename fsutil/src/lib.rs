use serde::Serialize;
use std::{
    fs::{self, ReadDir},
    path::{Path, PathBuf},
};

pub mod error {
    use std::{io, path::PathBuf};

    pub type Result<T> = std::result::Result<T, self::Error>;

    type Msg = &'static str;

    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        #[error("{0} ({1}): {2}")]
        SingleIO(Msg, PathBuf, #[source] io::Error),

        #[error("Invalid glob pattern '{0}': {1}")]
        InvalidGlob(String, #[source] ::glob::PatternError),

        #[error("Cannot serialize to JSON (dest='{0}'): {1}")]
        SerializeToJson(PathBuf, #[source] serde_json::Error),
    }
}
pub use error::{Error, Result};

#[must_use]
pub fn mkdir_all(path: impl AsRef<Path>) -> Result<()> {
    let dir = path.as_ref();
    fs::create_dir_all(dir).map_err(|e| Error::SingleIO("Cannot create dir", dir.to_owned(), e))
}

#[must_use]
pub fn write<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    fs::write(&filepath, contents)
        .map_err(|e| Error::SingleIO("Cannot write file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_with_mkdir<P, C>(filepath: P, contents: C) -> Result<()>
where
    P: AsRef<Path>,
    C: AsRef<[u8]>,
{
    if let Some(dir) = filepath.as_ref().parent() {
        if !dir.as_os_str().is_empty() {
            self::mkdir_all(dir)?;
        }
    }
    self::write(filepath, contents)
}

#[must_use]
pub fn read_to_string(filepath: impl AsRef<Path>) -> Result<String> {
    fs::read_to_string(&filepath)
        .map_err(|e| Error::SingleIO("Cannot read file", filepath.as_ref().to_owned(), e))
}

#[must_use]
pub fn write_json_with_mkdir<P, T>(filepath: P, data: &T) -> Result<()>
where
    P: AsRef<Path>,
    T: Serialize,
{
    let s = serde_json::to_string_pretty(data)
        .map_err(|e| Error::SerializeToJson(filepath.as_ref().to_owned(), e))?;
    write_with_mkdir(filepath, &s)
}

#[must_use]
pub fn read_dir(dir: impl AsRef<Path>) -> Result<ReadDir> {
    fs::read_dir(&dir).map_err(|e| Error::SingleIO("Cannot read dir", dir.as_ref().to_owned(), e))
}

/// Lists non-directory entries of `dir` whose file name matches `filename_pattern`,
/// sorted by path. Hidden files only match when the pattern itself starts with a dot.
///
/// ```
/// let dir = tempfile::tempdir().unwrap();
/// fsutil::write(dir.path().join("b.txt"), "").unwrap();
/// fsutil::write(dir.path().join("a.txt"), "").unwrap();
/// fsutil::write(dir.path().join("c.json"), "").unwrap();
///
/// let files = fsutil::list_files_matching(dir.path(), "*.txt").unwrap();
/// assert_eq!(files, vec![dir.path().join("a.txt"), dir.path().join("b.txt")]);
/// ```
pub fn list_files_matching(dir: impl AsRef<Path>, filename_pattern: &str) -> Result<Vec<PathBuf>> {
    let pattern = ::glob::Pattern::new(filename_pattern)
        .map_err(|e| Error::InvalidGlob(filename_pattern.to_owned(), e))?;
    let opts = ::glob::MatchOptions {
        require_literal_leading_dot: true,
        ..Default::default()
    };

    let dir = dir.as_ref();
    let mut res = Vec::new();
    for entry in self::read_dir(dir)?.filter_map(std::result::Result::ok) {
        let Ok(file_type) = entry.file_type() else {
            continue
        };
        if file_type.is_dir() {
            continue;
        }
        let filename = entry.file_name();
        if pattern.matches_with(filename.to_string_lossy().as_ref(), opts) {
            res.push(dir.join(filename));
        }
    }
    res.sort();
    Ok(res)
}
