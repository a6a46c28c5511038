//! Merging per-file scalar series into a collection keyed by metric name.

use crate::tfevents::{self, ScalarPoint};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One run's observations for one metric. The three sequences are parallel
/// and never empty.
#[derive(Debug, Clone)]
pub struct SeriesRecord {
    pub steps: Vec<i64>,
    pub values: Vec<f64>,
    pub wall_times: Vec<f64>,
    pub run_name: String,
    pub file_path: PathBuf,
}

/// Metric name to per-run series, in file-scan order within each metric.
/// Built once by [`load_series`] and read-only afterwards.
pub type MetricCollection = BTreeMap<String, Vec<SeriesRecord>>;

/// A file that could not be read; the batch continues without it.
#[derive(Debug)]
pub struct LoadFailure {
    pub file: PathBuf,
    pub error: tfevents::ReadError,
}

/// Everything the load phase produced.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub metrics: MetricCollection,
    pub failures: Vec<LoadFailure>,
}

/// Load every discovered file and merge its scalar series by metric name.
///
/// `max_step` drops observations past the bound; a tag left empty by the
/// filter is omitted for that file. Unreadable files end up in
/// `LoadReport::failures` and never abort the batch.
pub fn load_series(files: &[PathBuf], roots: &[PathBuf], max_step: Option<i64>) -> LoadReport {
    let mut report = LoadReport::default();

    for file in files {
        info!("loading {}", file.display());
        let run = run_name(file, roots);
        match tfevents::read_scalars(file) {
            Ok(tags) => {
                for (tag, points) in tags {
                    if let Some(record) = build_record(&points, &run, file, max_step) {
                        debug!(
                            "{}: {} points from {}",
                            tag,
                            record.steps.len(),
                            record.file_path.display()
                        );
                        report.metrics.entry(tag).or_default().push(record);
                    }
                }
            }
            Err(error) => report.failures.push(LoadFailure {
                file: file.clone(),
                error,
            }),
        }
    }

    report
}

/// Run label for an event file: its parent directory relative to the first
/// root that contains it, or the absolute parent path when none does. A
/// file sitting directly in a root yields ".".
pub fn run_name(file: &Path, roots: &[PathBuf]) -> String {
    let file = canonical(file);
    let parent = match file.parent() {
        Some(parent) => parent.to_path_buf(),
        None => return file.display().to_string(),
    };

    for root in roots {
        if let Ok(rel) = parent.strip_prefix(canonical(root)) {
            return if rel.as_os_str().is_empty() {
                ".".to_string()
            } else {
                rel.display().to_string()
            };
        }
    }
    parent.display().to_string()
}

fn canonical(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

fn build_record(
    points: &[ScalarPoint],
    run: &str,
    file: &Path,
    max_step: Option<i64>,
) -> Option<SeriesRecord> {
    let kept: Vec<&ScalarPoint> = match max_step {
        Some(bound) => points.iter().filter(|p| p.step <= bound).collect(),
        None => points.iter().collect(),
    };
    if kept.is_empty() {
        return None;
    }

    Some(SeriesRecord {
        steps: kept.iter().map(|p| p.step).collect(),
        values: kept.iter().map(|p| p.value).collect(),
        wall_times: kept.iter().map(|p| p.wall_time).collect(),
        run_name: run.to_string(),
        file_path: file.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tfevents::testdata::{scalar_event, write_event_file};
    use tempfile::TempDir;

    #[test]
    fn merges_same_tag_across_runs() {
        let dir = TempDir::new().unwrap();
        let run1 = dir.path().join("run1");
        let run2 = dir.path().join("run2");
        std::fs::create_dir_all(&run1).unwrap();
        std::fs::create_dir_all(&run2).unwrap();
        write_event_file(
            &run1.join("events.out.tfevents.1"),
            &[
                scalar_event("loss", 0, 1.0, 10.0),
                scalar_event("loss", 1, 0.5, 20.0),
                scalar_event("loss", 2, 0.25, 30.0),
            ],
        );
        write_event_file(
            &run2.join("events.out.tfevents.2"),
            &[
                scalar_event("loss", 0, 2.0, 10.0),
                scalar_event("loss", 1, 1.5, 20.0),
                scalar_event("loss", 2, 1.0, 30.0),
            ],
        );

        let files = vec![
            run1.join("events.out.tfevents.1"),
            run2.join("events.out.tfevents.2"),
        ];
        let report = load_series(&files, &[run1.clone(), run2.clone()], None);

        assert!(report.failures.is_empty());
        assert_eq!(report.metrics.len(), 1);
        let records = &report.metrics["loss"];
        assert_eq!(records.len(), 2);
        // Each file sits directly in its matched root.
        assert_eq!(records[0].run_name, ".");
        assert_eq!(records[1].run_name, ".");
        assert_eq!(records[0].steps, vec![0, 1, 2]);
        assert_eq!(records[1].values, vec![2.0, 1.5, 1.0]);
    }

    #[test]
    fn run_name_is_relative_to_first_matching_root() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("sweep/lr0.1");
        std::fs::create_dir_all(&nested).unwrap();
        let file = nested.join("events.out.tfevents.1");
        std::fs::write(&file, b"").unwrap();

        let name = run_name(&file, &[dir.path().to_path_buf()]);
        assert_eq!(name, format!("sweep{}lr0.1", std::path::MAIN_SEPARATOR));
    }

    #[test]
    fn run_name_falls_back_to_absolute_parent() {
        let dir = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        let file = dir.path().join("events.out.tfevents.1");
        std::fs::write(&file, b"").unwrap();

        let name = run_name(&file, &[elsewhere.path().to_path_buf()]);
        assert_eq!(name, canonical(dir.path()).display().to_string());
    }

    #[test]
    fn same_parent_files_share_a_run_name() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("events.out.tfevents.a");
        let b = dir.path().join("events.out.tfevents.b");
        std::fs::write(&a, b"").unwrap();
        std::fs::write(&b, b"").unwrap();

        let roots = vec![dir.path().to_path_buf()];
        assert_eq!(run_name(&a, &roots), run_name(&b, &roots));
    }

    #[test]
    fn max_step_filters_and_drops_emptied_tags() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("events.out.tfevents.1");
        write_event_file(
            &file,
            &[
                scalar_event("loss", 0, 4.0, 10.0),
                scalar_event("loss", 3, 3.0, 20.0),
                scalar_event("loss", 6, 2.0, 30.0),
                scalar_event("loss", 9, 1.0, 40.0),
                scalar_event("late_metric", 8, 7.0, 35.0),
            ],
        );

        let report = load_series(
            &[file],
            &[dir.path().to_path_buf()],
            Some(5),
        );

        let records = &report.metrics["loss"];
        assert_eq!(records[0].steps, vec![0, 3]);
        assert_eq!(records[0].values, vec![4.0, 3.0]);
        assert!(records[0].steps.iter().all(|&s| s <= 5));
        // All of late_metric's steps exceed the bound: tag absent entirely.
        assert!(!report.metrics.contains_key("late_metric"));
    }

    #[test]
    fn unreadable_file_is_reported_and_batch_continues() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("events.out.tfevents.good");
        let bad = dir.path().join("events.out.tfevents.bad");
        write_event_file(&good, &[scalar_event("loss", 0, 1.0, 10.0)]);
        std::fs::write(&bad, b"not a tfrecord stream at all").unwrap();

        let report = load_series(
            &[bad.clone(), good],
            &[dir.path().to_path_buf()],
            None,
        );

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].file, bad);
        assert_eq!(report.metrics["loss"].len(), 1);
    }
}
