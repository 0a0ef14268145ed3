use std::fs;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LabelerError, Result};
use crate::reporter::TestSet;

/// File holding the train partition, a JSON array of emails.
pub const TRAIN_DOCS_FILE: &str = "train_docs.json";
/// File holding the held-out test partition, one labeled example line per email.
pub const TEST_DOCS_FILE: &str = "test_docs.txt";

/// Source content of an email. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub content: String,
}

impl Email {
    pub fn new(subject: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            content: content.into(),
        }
    }
}

/// The train partition, addressed by position.
#[derive(Debug, Clone, Default)]
pub struct EmailCorpus {
    emails: Vec<Email>,
}

impl EmailCorpus {
    pub fn new(emails: Vec<Email>) -> Self {
        Self { emails }
    }

    /// Returns the email with the given id.
    ///
    /// # Errors
    /// `NotFound` if `id` is past the end of the partition.
    pub fn get(&self, id: usize) -> Result<&Email> {
        self.emails.get(id).ok_or(LabelerError::NotFound { id })
    }

    /// Draws `k` distinct ids uniformly from the partition.
    ///
    /// # Errors
    /// `InvalidArgument` if `k` exceeds the number of emails.
    pub fn sample(&self, k: usize) -> Result<Vec<usize>> {
        self.sample_with(&mut rand::thread_rng(), k)
    }

    /// [`sample`](Self::sample) with a caller-provided random source.
    pub fn sample_with<R: Rng + ?Sized>(&self, rng: &mut R, k: usize) -> Result<Vec<usize>> {
        if k > self.emails.len() {
            return Err(LabelerError::InvalidArgument(format!(
                "cannot sample {} emails from a partition of {}",
                k,
                self.emails.len()
            )));
        }
        Ok(index::sample(rng, self.emails.len(), k).into_vec())
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// The fixed train/test partition produced by the ingestion step.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub train: EmailCorpus,
    pub test: TestSet,
}

impl Dataset {
    /// Reads [`TRAIN_DOCS_FILE`] and [`TEST_DOCS_FILE`] from `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        log::info!("Loading datasets from {:?}...", dir);
        let start_time = Instant::now();

        let train_path = dir.join(TRAIN_DOCS_FILE);
        let bytes = fs::read(&train_path)
            .map_err(|e| LabelerError::Dataset(format!("{}: {}", train_path.display(), e)))?;
        let emails: Vec<Email> = serde_json::from_slice(&bytes)
            .map_err(|e| LabelerError::Dataset(format!("{}: {}", train_path.display(), e)))?;

        let test_path = dir.join(TEST_DOCS_FILE);
        let test = match fs::File::open(&test_path) {
            Ok(file) => TestSet::from_reader(BufReader::new(file))
                .map_err(|e| LabelerError::Dataset(format!("{}: {}", test_path.display(), e)))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::warn!("No test set at {:?}, reports will be empty", test_path);
                TestSet::default()
            }
            Err(e) => {
                return Err(LabelerError::Dataset(format!("{}: {}", test_path.display(), e)));
            }
        };

        log::info!(
            "Loaded {} train and {} test emails in {:.3?}",
            emails.len(),
            test.len(),
            start_time.elapsed()
        );
        Ok(Self {
            train: EmailCorpus::new(emails),
            test,
        })
    }
}

/// Reads non-empty lines, keeping their 1-based line numbers.
pub(crate) fn numbered_lines<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, io::Result<String>)> {
    reader
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line))
        .filter(|(_, line)| line.as_ref().map_or(true, |l| !l.trim().is_empty()))
}
