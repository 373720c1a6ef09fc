//! Throughput harness comparing the three trees against `std::collections::BTreeMap`.
//!
//! One dataset (plus one random priority per element for the treap) is generated up front. Each
//! container then gets the same treatment: for every batch of `step` elements, time inserting the
//! batch and then finding it, and once everything is in, time erasing it batch by batch. Every
//! measurement is an `(offset, elapsed_ms)` sample and each series is written to its own
//! two-column text file.
//!
//! # Examples
//!
//! ```no_run
//! use balanced_bst::harness::{self, Config};
//!
//! let config = Config {
//!     step: 1_000,
//!     iterations: 10,
//!     seed: Some(7),
//!     ..Config::default()
//! };
//! let written = harness::run(&config, |line| println!("{line}")).unwrap();
//! assert_eq!(written.len(), 12);
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::hint::black_box;
use std::io::{self, BufWriter, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{avl, splay, treap};

/// Everything that can stop a harness run.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    /// The configuration cannot produce a dataset.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A series file could not be created or written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// The file being written.
        path: PathBuf,
        /// The underlying I/O error.
        source: io::Error,
    },
}

/// The kind of keys (and values, which equal the keys) fed to the containers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyKind {
    /// Distinct integers drawn uniformly from `[1, 2 * step * iterations)`.
    #[default]
    Integers,
    /// Alphanumeric strings of 1 to 99 characters. Repeats are possible.
    Strings,
}

/// Harness parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Number of elements per timed batch.
    pub step: usize,
    /// Number of batches. The dataset holds `step * iterations` elements.
    pub iterations: usize,
    /// Directory the series files are written to. It must exist.
    pub out_dir: PathBuf,
    /// What the keys look like.
    pub keys: KeyKind,
    /// Seed for the dataset and priority generator, random when `None`.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            step: 10_000,
            iterations: 200,
            out_dir: PathBuf::from("."),
            keys: KeyKind::Integers,
            seed: None,
        }
    }
}

impl Config {
    /// The number of elements in the dataset.
    pub fn total(&self) -> Result<usize, HarnessError> {
        if self.step == 0 || self.iterations == 0 {
            return Err(HarnessError::InvalidConfig(
                "step and iterations must both be positive".to_string(),
            ));
        }
        self.step.checked_mul(self.iterations).ok_or_else(|| {
            HarnessError::InvalidConfig("step * iterations overflows".to_string())
        })
    }
}

/// One timing measurement: where the batch sits in the dataset and how long it took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// For inserts and finds, the index of the first element of the batch. For erases, the number
    /// of elements still stored when the batch started.
    pub offset: usize,
    /// Wall-clock duration of the batch in whole milliseconds.
    pub elapsed_ms: u128,
}

/// The three series measured for one container.
#[derive(Clone, Debug, Default)]
pub struct Report {
    /// Insert timings, one sample per batch.
    pub insert: Vec<Sample>,
    /// Find timings, one sample per batch.
    pub find: Vec<Sample>,
    /// Erase timings, one sample per batch.
    pub erase: Vec<Sample>,
    /// How many finds hit, which should be every element of the dataset.
    pub found: usize,
}

impl Report {
    /// Writes `times_{insert,find,erase}_{name}.txt` into `dir` and returns their paths.
    pub fn write(&self, dir: &Path, name: &str) -> Result<Vec<PathBuf>, HarnessError> {
        [("insert", &self.insert), ("find", &self.find), ("erase", &self.erase)]
            .into_iter()
            .map(|(operation, samples)| {
                let path = dir.join(format!("times_{operation}_{name}.txt"));
                write_series(&path, samples)?;
                Ok(path)
            })
            .collect()
    }
}

/// A container under test. Values always equal their keys.
pub enum Engine<K> {
    /// The standard library's B-tree, used as the baseline.
    Map(BTreeMap<K, K>),
    /// [`avl::Tree`]
    Avl(avl::Tree<K, K>),
    /// [`splay::Tree`]
    Splay(splay::Tree<K, K>),
    /// [`treap::Tree`]
    Treap(treap::Tree<K, u32, K>),
}

impl<K> Engine<K>
where
    K: Ord + Clone,
{
    /// One empty instance of every container, baseline first.
    pub fn all() -> [Self; 4] {
        [
            Self::Map(BTreeMap::new()),
            Self::Avl(avl::Tree::new()),
            Self::Splay(splay::Tree::new()),
            Self::Treap(treap::Tree::new()),
        ]
    }

    /// Short name used in file names and progress output.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Map(_) => "map",
            Self::Avl(_) => "avl",
            Self::Splay(_) => "splay",
            Self::Treap(_) => "treap",
        }
    }

    /// Inserts `key` mapped to itself. Only the treap uses `priority`.
    pub fn insert(&mut self, key: K, priority: u32) {
        let value = key.clone();
        match self {
            Self::Map(m) => {
                m.insert(key, value);
            }
            Self::Avl(t) => t.insert(key, value),
            Self::Splay(t) => t.insert(key, value),
            Self::Treap(t) => t.insert(key, priority, value),
        }
    }

    /// Whether `key` is present.
    pub fn find(&mut self, key: &K) -> bool {
        match self {
            Self::Map(m) => m.contains_key(key),
            Self::Avl(t) => t.find(key).is_some(),
            Self::Splay(t) => t.find(key).is_some(),
            Self::Treap(t) => t.find(key).is_some(),
        }
    }

    /// Erases `key`, returning whether it was present.
    pub fn erase(&mut self, key: &K) -> bool {
        match self {
            Self::Map(m) => m.remove(key).is_some(),
            Self::Avl(t) => t.erase(key).is_some(),
            Self::Splay(t) => t.erase(key).is_some(),
            Self::Treap(t) => t.erase(key).is_some(),
        }
    }

    /// The number of keys stored.
    pub fn len(&self) -> usize {
        match self {
            Self::Map(m) => m.len(),
            Self::Avl(t) => t.len(),
            Self::Splay(t) => t.len(),
            Self::Treap(t) => t.len(),
        }
    }

    /// Whether no keys are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Draws `count` distinct integers uniformly from `range` by rejection.
pub fn unique_integers<R: Rng>(
    rng: &mut R,
    count: usize,
    range: Range<u64>,
) -> Result<Vec<u64>, HarnessError> {
    let width = usize::try_from(range.end.saturating_sub(range.start)).map_err(|_| {
        HarnessError::InvalidConfig(format!("range {range:?} is too wide to track"))
    })?;
    if width < count {
        return Err(HarnessError::InvalidConfig(format!(
            "cannot draw {count} distinct integers from {range:?}"
        )));
    }

    let mut taken = vec![false; width];
    let mut out = Vec::with_capacity(count);
    while out.len() < count {
        let candidate = rng.gen_range(range.clone());
        let slot = &mut taken[(candidate - range.start) as usize];
        if !*slot {
            *slot = true;
            out.push(candidate);
        }
    }
    Ok(out)
}

/// Generates `count` alphanumeric strings whose lengths are drawn uniformly from `lengths`.
pub fn random_strings<R: Rng>(rng: &mut R, count: usize, lengths: Range<usize>) -> Vec<String> {
    (0..count)
        .map(|_| {
            let len = rng.gen_range(lengths.clone());
            (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
        })
        .collect()
}

/// Writes one `offset elapsed_ms` pair per line.
pub fn write_series(path: &Path, samples: &[Sample]) -> Result<(), HarnessError> {
    let to_error = |source| HarnessError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut out = BufWriter::new(File::create(path).map_err(to_error)?);
    for sample in samples {
        writeln!(out, "{} {}", sample.offset, sample.elapsed_ms).map_err(to_error)?;
    }
    out.flush().map_err(to_error)
}

/// Runs the insert/find batches and then the erase batches on `engine`.
///
/// ## Panics
///
/// When `data` or `priorities` hold fewer than `step * iterations` elements.
pub fn measure<K>(
    engine: &mut Engine<K>,
    data: &[K],
    priorities: &[u32],
    step: usize,
    iterations: usize,
) -> Report
where
    K: Ord + Clone,
{
    let mut report = Report::default();

    for batch in 0..iterations {
        let offset = batch * step;
        let range = offset..offset + step;

        let start = Instant::now();
        for i in range.clone() {
            engine.insert(data[i].clone(), priorities[i]);
        }
        report.insert.push(Sample {
            offset,
            elapsed_ms: start.elapsed().as_millis(),
        });

        let start = Instant::now();
        for key in &data[range] {
            if black_box(engine.find(key)) {
                report.found += 1;
            }
        }
        report.find.push(Sample {
            offset,
            elapsed_ms: start.elapsed().as_millis(),
        });
    }

    // Erase samples are keyed by how many elements were left before the batch.
    let total = step * iterations;
    for batch in 0..iterations {
        let offset = batch * step;
        let start = Instant::now();
        for key in &data[offset..offset + step] {
            black_box(engine.erase(key));
        }
        report.erase.push(Sample {
            offset: total - offset,
            elapsed_ms: start.elapsed().as_millis(),
        });
    }

    report
}

/// Generates the dataset described by `config`, measures every container on it and writes all
/// twelve series files. Progress lines are handed to `progress`.
pub fn run(
    config: &Config,
    mut progress: impl FnMut(&str),
) -> Result<Vec<PathBuf>, HarnessError> {
    let total = config.total()?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    progress("Generating data...");
    match config.keys {
        KeyKind::Integers => {
            let end = (total as u64).checked_mul(2).ok_or_else(|| {
                HarnessError::InvalidConfig("integer key range overflows".to_string())
            })?;
            let data = unique_integers(&mut rng, total, 1..end)?;
            let priorities = random_priorities(&mut rng, total);
            run_all(config, &data, &priorities, progress)
        }
        KeyKind::Strings => {
            let data = random_strings(&mut rng, total, 1..100);
            let priorities = random_priorities(&mut rng, total);
            run_all(config, &data, &priorities, progress)
        }
    }
}

/// One independent, uniformly drawn priority per element.
fn random_priorities<R: Rng>(rng: &mut R, count: usize) -> Vec<u32> {
    (0..count).map(|_| rng.gen()).collect()
}

fn run_all<K>(
    config: &Config,
    data: &[K],
    priorities: &[u32],
    mut progress: impl FnMut(&str),
) -> Result<Vec<PathBuf>, HarnessError>
where
    K: Ord + Clone,
{
    progress("Running operations...");
    let mut written = Vec::new();
    for mut engine in Engine::all() {
        let report = measure(&mut engine, data, priorities, config.step, config.iterations);
        progress(&format!(
            "{}: {} of {} finds hit",
            engine.name(),
            report.found,
            data.len()
        ));
        written.extend(report.write(&config.out_dir, engine.name())?);
    }
    Ok(written)
}
