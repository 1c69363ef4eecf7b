//! Removal of per-trial intermediate files.
//!
//! Every trial writes the same fixed file names into the working directory,
//! so they must be gone before the next trial starts. Each file is handled
//! by its own [`CleanupAction`]; one failing action never stops the others.
//! A file that is already absent counts as cleaned.
//!
//! [`TrialCleanup`] runs the actions at the end of a trial and again from
//! `Drop` if the trial exits early through `?` or a panic.

use crate::config::{HarnessConfig, TargetBitrate};

use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A single isolated cleanup step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupAction {
    Remove(PathBuf),
    /// Rename `from` to `to`, keeping the file.
    Archive { from: PathBuf, to: PathBuf },
}

impl CleanupAction {
    /// Runs the action. A missing source file is success.
    pub fn execute(&self) -> io::Result<()> {
        let result = match self {
            CleanupAction::Remove(path) => fs::remove_file(path),
            CleanupAction::Archive { from, to } => fs::rename(from, to),
        };
        match result {
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    fn target(&self) -> &Path {
        match self {
            CleanupAction::Remove(path) => path,
            CleanupAction::Archive { from, .. } => from,
        }
    }
}

/// Failures collected while running cleanup actions.
#[derive(Debug, Default)]
pub struct CleanupReport {
    pub failures: Vec<(CleanupAction, io::Error)>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Builds the cleanup list for one trial.
///
/// The re-encoded video is archived as `<bitrate>_recoded.mp4` when
/// `keep_recoded` is set and removed otherwise.
pub fn trial_actions(config: &HarnessConfig, bitrate: &TargetBitrate) -> Vec<CleanupAction> {
    let dir = &config.work_dir;
    let artifacts = &config.artifacts;

    let mut actions = vec![
        CleanupAction::Remove(dir.join(&artifacts.rate_control_log)),
        CleanupAction::Remove(dir.join(&artifacts.rate_control_cutree)),
        CleanupAction::Remove(dir.join(&artifacts.bitstream)),
    ];

    let recoded = dir.join(&artifacts.recoded_video);
    if config.keep_recoded {
        actions.push(CleanupAction::Archive {
            from: recoded,
            to: dir.join(artifacts.archived_video(bitrate)),
        });
    } else {
        actions.push(CleanupAction::Remove(recoded));
    }

    actions
}

/// Runs every action and collects failures. Failures are logged at warn.
pub fn run_actions(actions: &[CleanupAction]) -> CleanupReport {
    let mut report = CleanupReport::default();
    for action in actions {
        match action.execute() {
            Ok(()) => debug!("Cleaned up {}", action.target().display()),
            Err(e) => {
                warn!("Failed to clean up {}: {}", action.target().display(), e);
                report.failures.push((action.clone(), e));
            }
        }
    }
    report
}

/// Scope guard running a trial's cleanup actions.
#[derive(Debug)]
pub struct TrialCleanup {
    actions: Vec<CleanupAction>,
    completed: bool,
}

impl TrialCleanup {
    pub fn new(actions: Vec<CleanupAction>) -> Self {
        Self {
            actions,
            completed: false,
        }
    }

    pub fn for_trial(config: &HarnessConfig, bitrate: &TargetBitrate) -> Self {
        Self::new(trial_actions(config, bitrate))
    }

    /// Runs the actions now. Safe to call more than once.
    pub fn run(&mut self) -> CleanupReport {
        self.completed = true;
        run_actions(&self.actions)
    }
}

impl Drop for TrialCleanup {
    fn drop(&mut self) {
        if !self.completed {
            debug!("Trial ended early, running cleanup");
            run_actions(&self.actions);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HarnessConfigBuilder;
    use tempfile::tempdir;

    const ARTIFACTS: [&str; 4] = [
        "recoded.mp4",
        "recoded.h265",
        "x265_2pass.log",
        "x265_2pass.log.cutree",
    ];

    fn touch_all(dir: &Path) {
        for name in ARTIFACTS {
            fs::write(dir.join(name), b"data").unwrap();
        }
    }

    fn config(dir: &Path, keep: bool) -> HarnessConfig {
        HarnessConfigBuilder::new()
            .work_dir(dir)
            .keep_recoded(keep)
            .build()
    }

    #[test]
    fn removes_every_fixed_artifact() {
        let dir = tempdir().unwrap();
        touch_all(dir.path());
        let bitrate = TargetBitrate::parse("500k").unwrap();

        let report = TrialCleanup::for_trial(&config(dir.path(), false), &bitrate).run();

        assert!(report.is_clean());
        for name in ARTIFACTS {
            assert!(!dir.path().join(name).exists(), "{name} survived");
        }
        assert!(!dir.path().join("500k_recoded.mp4").exists());
    }

    #[test]
    fn archives_recoded_video_when_kept() {
        let dir = tempdir().unwrap();
        touch_all(dir.path());
        let bitrate = TargetBitrate::parse("500k").unwrap();

        let report = TrialCleanup::for_trial(&config(dir.path(), true), &bitrate).run();

        assert!(report.is_clean());
        assert!(!dir.path().join("recoded.mp4").exists());
        assert!(dir.path().join("500k_recoded.mp4").exists());
        assert!(!dir.path().join("recoded.h265").exists());
    }

    #[test]
    fn running_twice_is_harmless() {
        let dir = tempdir().unwrap();
        touch_all(dir.path());
        let bitrate = TargetBitrate::parse("1000k").unwrap();
        let mut cleanup = TrialCleanup::for_trial(&config(dir.path(), false), &bitrate);

        assert!(cleanup.run().is_clean());
        assert!(cleanup.run().is_clean());
    }

    #[test]
    fn missing_files_count_as_clean() {
        let dir = tempdir().unwrap();
        let bitrate = TargetBitrate::parse("250k").unwrap();
        let report = TrialCleanup::for_trial(&config(dir.path(), true), &bitrate).run();
        assert!(report.is_clean());
    }

    #[test]
    fn one_failure_does_not_stop_the_rest() {
        let dir = tempdir().unwrap();
        touch_all(dir.path());
        // A directory cannot be removed with remove_file.
        let blocker = dir.path().join("blocker");
        fs::create_dir(&blocker).unwrap();

        let actions = vec![
            CleanupAction::Remove(blocker.clone()),
            CleanupAction::Remove(dir.path().join("recoded.h265")),
        ];
        let report = run_actions(&actions);

        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, CleanupAction::Remove(blocker));
        assert!(!dir.path().join("recoded.h265").exists());
    }

    #[test]
    fn drop_cleans_up_when_not_run() {
        let dir = tempdir().unwrap();
        touch_all(dir.path());
        let bitrate = TargetBitrate::parse("500k").unwrap();
        {
            let _guard = TrialCleanup::for_trial(&config(dir.path(), false), &bitrate);
        }
        for name in ARTIFACTS {
            assert!(!dir.path().join(name).exists());
        }
    }
}
