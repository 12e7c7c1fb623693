//! The skip branch of the conflict policy reports through the `log` facade
//! with a fixed message. This file installs its own logger, so it holds a
//! single test.

use std::{fs, sync::Mutex};

use log::{Level, LevelFilter, Log, Metadata, Record};
use tempfile::tempdir;

use shelve::{Materialized, Payload, Target, TargetKind, materialize, policy::ConflictPolicy};

struct CaptureLogger {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records
            .lock()
            .unwrap()
            .push((record.level(), record.args().to_string()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger {
    records: Mutex::new(Vec::new()),
};

#[test]
fn test_skip_emits_exactly_one_diagnostic() {
    log::set_logger(&LOGGER).expect("no other logger installed");
    log::set_max_level(LevelFilter::Trace);

    let dir = tempdir().unwrap();
    let destination = dir.path().join("rest").join("run-2.nii.gz");
    fs::create_dir(dir.path().join("rest")).unwrap();
    fs::write(&destination, "original").unwrap();

    let target = Target::new(&destination, TargetKind::File);
    let outcome = materialize(&target, Payload::Contents(b"new"), ConflictPolicy::Skip).unwrap();

    assert_eq!(outcome, Materialized::Skipped(destination.clone()));
    assert_eq!(fs::read_to_string(&destination).unwrap(), "original");

    let expected = format!(
        "A file at path {} already exists, skipping writing file.",
        destination.display()
    );
    let records = LOGGER.records.lock().unwrap();
    let mentions: Vec<_> = records
        .iter()
        .filter(|(_, message)| message.contains(&*dir.path().to_string_lossy()))
        .collect();

    assert_eq!(mentions.len(), 1, "captured: {records:?}");
    assert_eq!(mentions[0], &(Level::Warn, expected));
}
