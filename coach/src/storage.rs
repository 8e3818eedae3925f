//! Checkpoint directory layout.
//!
//! ```text
//! <dir>/checkpoint_{i}.json           parameters promoted in iteration i
//! <dir>/checkpoint_{i}.json.examples  history saved before training iteration i+1
//! <dir>/best.json                     latest promoted parameters
//! <dir>/temp.json                     parameters before the current retrain
//! <dir>/coach_stats.json              running statistics
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::CoachError;

pub const BEST_FILE: &str = "best.json";
pub const TEMP_FILE: &str = "temp.json";
pub const STATS_FILE: &str = "coach_stats.json";
pub const EXAMPLES_SUFFIX: &str = ".examples";

/// Where an interrupted run should pick up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResumePoint {
    pub model: PathBuf,
    pub examples: PathBuf,
    /// First iteration to run after resuming.
    pub iteration: u32,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
}

impl CheckpointStore {
    /// Open `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoachError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| CoachError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn checkpoint_path(&self, iteration: u32) -> PathBuf {
        self.dir.join(format!("checkpoint_{iteration}.json"))
    }

    pub fn examples_path(&self, iteration: u32) -> PathBuf {
        examples_path_for(&self.checkpoint_path(iteration))
    }

    pub fn best_path(&self) -> PathBuf {
        self.dir.join(BEST_FILE)
    }

    pub fn temp_path(&self) -> PathBuf {
        self.dir.join(TEMP_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    /// Iteration numbers of every `checkpoint_{i}.json{suffix}` file, ascending.
    fn indices(&self, suffix: &str) -> Result<Vec<u32>, CoachError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| CoachError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let mut found: Vec<u32> = entries
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                let rest = name.strip_prefix("checkpoint_")?;
                let number = rest.strip_suffix(&format!(".json{suffix}"))?;
                number.parse().ok()
            })
            .collect();
        found.sort_unstable();
        Ok(found)
    }

    /// Highest promoted checkpoint, if any.
    pub fn latest_checkpoint(&self) -> Result<Option<u32>, CoachError> {
        Ok(self.indices("")?.last().copied())
    }

    /// Highest saved examples file, if any.
    pub fn latest_examples(&self) -> Result<Option<u32>, CoachError> {
        Ok(self.indices(EXAMPLES_SUFFIX)?.last().copied())
    }

    /// Locate the parameters and history of an earlier run.
    ///
    /// The model is `best.json` when present, else the highest checkpoint.
    /// The history is the newest examples file; examples saved as `k` were
    /// gathered in iteration `k + 1`, which is where the run resumes. Without
    /// any examples file the model's own `.examples` path is reported.
    pub fn resume_point(&self) -> Result<Option<ResumePoint>, CoachError> {
        let best = self.best_path();
        let latest = self.latest_checkpoint()?;
        let model = match latest {
            _ if best.exists() => best,
            Some(i) => self.checkpoint_path(i),
            None => return Ok(None),
        };
        let point = match self.latest_examples()? {
            Some(k) => ResumePoint {
                model,
                examples: self.examples_path(k),
                iteration: k + 1,
            },
            None => ResumePoint {
                examples: examples_path_for(&model),
                model,
                iteration: latest.map_or(1, |i| i + 1),
            },
        };
        debug!(?point, "Found resume point");
        Ok(Some(point))
    }
}

/// `<model>.examples`
pub fn examples_path_for(model: &Path) -> PathBuf {
    let mut path = model.as_os_str().to_owned();
    path.push(EXAMPLES_SUFFIX);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::write(path, b"{}").unwrap();
    }

    #[test]
    fn test_layout() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::open(dir.path().join("ckpt")).unwrap();
        assert!(store.dir().is_dir());
        assert!(store.checkpoint_path(3).ends_with("checkpoint_3.json"));
        assert!(store.examples_path(2).ends_with("checkpoint_2.json.examples"));
        assert!(store.best_path().ends_with("best.json"));
        assert!(store.temp_path().ends_with("temp.json"));
    }

    #[test]
    fn test_empty_dir_has_no_resume_point() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        assert_eq!(store.latest_checkpoint().unwrap(), None);
        assert_eq!(store.resume_point().unwrap(), None);
    }

    #[test]
    fn test_latest_checkpoint_is_numeric_not_lexical() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        for i in [2, 10, 9] {
            touch(&store.checkpoint_path(i));
        }
        touch(&store.examples_path(10));
        touch(&dir.path().join("checkpoint_x.json"));
        assert_eq!(store.latest_checkpoint().unwrap(), Some(10));
        assert_eq!(store.latest_examples().unwrap(), Some(10));
    }

    #[test]
    fn test_resume_prefers_best() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        touch(&store.checkpoint_path(4));
        touch(&store.examples_path(5));
        touch(&store.best_path());

        let point = store.resume_point().unwrap().unwrap();
        assert_eq!(point.model, store.best_path());
        assert_eq!(point.examples, store.examples_path(5));
        assert_eq!(point.iteration, 6);
    }

    #[test]
    fn test_resume_without_examples() {
        let dir = tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        touch(&store.checkpoint_path(1));

        let point = store.resume_point().unwrap().unwrap();
        assert_eq!(point.model, store.checkpoint_path(1));
        assert_eq!(point.examples, examples_path_for(&store.checkpoint_path(1)));
        assert!(!point.examples.exists());
        assert_eq!(point.iteration, 2);
    }
}
