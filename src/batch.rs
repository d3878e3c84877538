//! Batch annotation of files on disk.
//!
//! Used by the `annotate` command. Inputs are files or directories; each
//! directory is walked for annotatable files:
//!
//! | Extension | Treated as | Rendered with |
//! |-----------|------------|---------------|
//! | `.txt`, `.md` | free-form devotional text | [`Annotator::render_plain_text`] |
//! | `.json` | array of `{"number", "text"}` verses | [`Annotator::render_verses`] |
//!
//! Each input produces `<stem>.html` under the output directory, mirroring
//! the input's position relative to the directory it was found in. A file
//! reached twice (named directly and found in a walked directory) is planned
//! once; two different inputs mapping to the same output (`day.txt` and
//! `day.json`) are rejected before anything is written.
//!
//! ## Incremental runs
//!
//! An existing output whose version marker matches the engine's ruleset is
//! left alone, so re-running over an unchanged corpus is cheap. A changed
//! gazetteer or ruleset name changes the marker and every file is redone.
//! `force` ignores existing outputs.
//!
//! ## Parallelism
//!
//! Files are annotated in parallel with [rayon](https://docs.rs/rayon); the
//! [`Annotator`] is shared by reference. Progress events go to an optional
//! channel in completion order.

use crate::engine::Annotator;
use crate::render::extract_annotations;
use crate::types::Verse;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid verse file {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
    #[error("{} would be written by several inputs: {}", .output.display(), join_paths(.sources))]
    OutputCollision {
        output: PathBuf,
        sources: Vec<PathBuf>,
    },
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// How an input file is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    PlainText,
    Verses,
}

impl InputKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "txt" | "md" => Some(InputKind::PlainText),
            "json" => Some(InputKind::Verses),
            _ => None,
        }
    }
}

/// One input file and where its annotation goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: InputKind,
}

/// Progress event emitted as each file finishes.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Annotated {
        source: PathBuf,
        output: PathBuf,
        annotations: usize,
    },
    Skipped {
        source: PathBuf,
    },
}

/// Totals for a batch run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub annotated: usize,
    pub skipped: usize,
    pub annotations: usize,
}

/// Expand `inputs` into jobs writing under `output_dir`.
///
/// Files named directly are taken if their extension is recognized;
/// directories are walked recursively. Jobs are sorted by source path and
/// identical jobs collapse into one. Fails if two different sources would
/// share an output file.
pub fn plan(inputs: &[PathBuf], output_dir: &Path) -> Result<Vec<BatchJob>, BatchError> {
    let mut jobs = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(|source| BatchError::Walk {
                    path: input.clone(),
                    source,
                })?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let Some(kind) = InputKind::from_path(entry.path()) else {
                    continue;
                };
                let relative = entry.path().strip_prefix(input).unwrap_or(entry.path());
                jobs.push(BatchJob {
                    source: entry.path().to_path_buf(),
                    output: output_dir.join(relative).with_extension("html"),
                    kind,
                });
            }
        } else if let Some(kind) = InputKind::from_path(input) {
            let name = input.file_name().map(PathBuf::from).unwrap_or_default();
            jobs.push(BatchJob {
                source: input.clone(),
                output: output_dir.join(name).with_extension("html"),
                kind,
            });
        } else {
            tracing::warn!(path = %input.display(), "skipping input with unrecognized extension");
        }
    }
    jobs.sort_by(|a, b| {
        a.source
            .cmp(&b.source)
            .then_with(|| a.output.cmp(&b.output))
    });
    jobs.dedup();

    let mut by_output: BTreeMap<&Path, Vec<&Path>> = BTreeMap::new();
    for job in &jobs {
        by_output.entry(&job.output).or_default().push(&job.source);
    }
    if let Some((output, sources)) = by_output.into_iter().find(|(_, s)| s.len() > 1) {
        return Err(BatchError::OutputCollision {
            output: output.to_path_buf(),
            sources: sources.into_iter().map(Path::to_path_buf).collect(),
        });
    }
    Ok(jobs)
}

/// Annotate every job in parallel.
pub fn run(
    annotator: &Annotator,
    jobs: &[BatchJob],
    force: bool,
    events: Option<Sender<BatchEvent>>,
) -> Result<BatchSummary, BatchError> {
    let events = events.as_ref();
    let outcomes = jobs
        .par_iter()
        .map(|job| {
            let event = annotate_job(annotator, job, force)?;
            if let Some(tx) = events {
                // Receiver gone means nobody is listening; keep working.
                let _ = tx.send(event.clone());
            }
            Ok(event)
        })
        .collect::<Result<Vec<_>, BatchError>>()?;

    let mut summary = BatchSummary::default();
    for outcome in outcomes {
        match outcome {
            BatchEvent::Annotated { annotations, .. } => {
                summary.annotated += 1;
                summary.annotations += annotations;
            }
            BatchEvent::Skipped { .. } => summary.skipped += 1,
        }
    }
    Ok(summary)
}

fn annotate_job(
    annotator: &Annotator,
    job: &BatchJob,
    force: bool,
) -> Result<BatchEvent, BatchError> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| BatchError::Io { path, source }
    };

    if !force
        && let Ok(existing) = fs::read_to_string(&job.output)
        && annotator.is_current(&existing)
    {
        tracing::debug!(source = %job.source.display(), "output is current, skipping");
        return Ok(BatchEvent::Skipped {
            source: job.source.clone(),
        });
    }

    let content = fs::read_to_string(&job.source).map_err(io_err(&job.source))?;
    let html = match job.kind {
        InputKind::PlainText => annotator.render_plain_text(&content).html,
        InputKind::Verses => {
            let verses: Vec<Verse> =
                serde_json::from_str(&content).map_err(|source| BatchError::Json {
                    path: job.source.clone(),
                    source,
                })?;
            annotator.render_verses(&verses)
        }
    };

    if let Some(parent) = job.output.parent() {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    fs::write(&job.output, &html).map_err(io_err(&job.output))?;

    Ok(BatchEvent::Annotated {
        source: job.source.clone(),
        output: job.output.clone(),
        annotations: extract_annotations(&html).len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn input_kind_from_extension() {
        assert_eq!(InputKind::from_path(Path::new("a.txt")), Some(InputKind::PlainText));
        assert_eq!(InputKind::from_path(Path::new("a.md")), Some(InputKind::PlainText));
        assert_eq!(InputKind::from_path(Path::new("john.json")), Some(InputKind::Verses));
        assert_eq!(InputKind::from_path(Path::new("a.html")), None);
        assert_eq!(InputKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn plan_walks_directories_and_mirrors_layout() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, "day1.txt", "x");
        write(&src, "gospels/john-1.json", "[]");
        write(&src, "notes.html", "ignored");
        let out = tmp.path().join("out");

        let jobs = plan(&[src.clone()], &out).unwrap();
        let outputs: Vec<&Path> = jobs.iter().map(|j| j.output.as_path()).collect();
        assert_eq!(
            outputs,
            vec![out.join("day1.html").as_path(), out.join("gospels/john-1.html").as_path()]
        );
        assert_eq!(jobs[1].kind, InputKind::Verses);
    }

    #[test]
    fn plan_takes_single_files() {
        let tmp = TempDir::new().unwrap();
        let file = write(tmp.path(), "day2.md", "x");
        let jobs = plan(&[file], &tmp.path().join("out")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output, tmp.path().join("out/day2.html"));
    }

    #[test]
    fn plan_collapses_file_reached_twice() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let file = write(&src, "day1.txt", "Moses");
        let jobs = plan(&[src, file], &tmp.path().join("out")).unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].output, tmp.path().join("out/day1.html"));
    }

    #[test]
    fn plan_rejects_inputs_sharing_an_output() {
        let tmp = TempDir::new().unwrap();
        let text = write(tmp.path(), "a/day.txt", "Moses");
        let verses = write(tmp.path(), "b/day.json", "[]");
        let out = tmp.path().join("out");

        let err = plan(&[text.clone(), verses.clone()], &out).unwrap_err();
        match err {
            BatchError::OutputCollision { output, sources } => {
                assert_eq!(output, out.join("day.html"));
                assert_eq!(sources, vec![text, verses]);
            }
            other => panic!("expected OutputCollision, got {other:?}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn plan_rejects_same_stem_in_one_directory() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, "day.txt", "Moses");
        write(&src, "day.md", "Egypt");
        let err = plan(&[src], &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, BatchError::OutputCollision { ref sources, .. } if sources.len() == 2));
        assert!(err.to_string().contains("day.html"));
    }

    #[test]
    fn run_annotates_and_reports() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, "day1.txt", "Moses went to Egypt.\n\nHe broke bread.");
        write(
            &src,
            "exodus.json",
            r#"[{"number": 1, "text": "Moses crossed the Red Sea"}]"#,
        );
        let out = tmp.path().join("out");
        let a = annotator(sample_gazetteer());

        let jobs = plan(&[src], &out).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        let summary = run(&a, &jobs, false, Some(tx)).unwrap();
        assert_eq!(summary.annotated, 2);
        assert_eq!(summary.skipped, 0);
        assert_eq!(summary.annotations, 5);
        assert_eq!(rx.iter().count(), 2);

        let html = fs::read_to_string(out.join("exodus.html")).unwrap();
        assert!(a.is_current(&html));
        assert!(html.contains("data-verse=\"1\""));
    }

    #[test]
    fn second_run_skips_current_outputs() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        write(&src, "day1.txt", "Moses");
        let out = tmp.path().join("out");
        let a = annotator(sample_gazetteer());
        let jobs = plan(&[src], &out).unwrap();

        run(&a, &jobs, false, None).unwrap();
        let again = run(&a, &jobs, false, None).unwrap();
        assert_eq!(again.skipped, 1);
        let forced = run(&a, &jobs, true, None).unwrap();
        assert_eq!(forced.annotated, 1);
    }

    #[test]
    fn invalid_verse_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = write(tmp.path(), "bad.json", "{\"number\": 1}");
        let jobs = plan(&[file], &tmp.path().join("out")).unwrap();
        let err = run(&annotator(sample_gazetteer()), &jobs, false, None).unwrap_err();
        assert!(matches!(err, BatchError::Json { .. }));
    }
}
