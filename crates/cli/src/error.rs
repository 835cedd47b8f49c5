//! CLI failures and the process exit code each one maps to.
//!
//! - 10: the visualization rejected the run (unknown name, params, time step)
//! - 11: a file or the rendering surface was unavailable
//! - 12: the command line, seed file, or event script could not be understood
//! - 13: output could not be encoded as JSON
//!
//! clap exits with 2 on argument errors before any of these apply.

use crate::script::EventProblem;
use particle_sphere_core::EngineError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// Construction, parameter checking, or a tick failed.
    #[error(transparent)]
    Engine(EngineError),

    #[error("cannot read seed file {}: {source}", path.display())]
    ReadSeedFile {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The PNG snapshot could not be written.
    #[error("snapshot failed: {0}")]
    Snapshot(String),

    #[error("rendering surface is not attached")]
    Detached,

    #[error("a visualization name or --seed-file is required")]
    MissingVisualization,

    #[error("invalid --params JSON: {0}")]
    Params(serde_json::Error),

    #[error("invalid seed file {}: {source}", path.display())]
    SeedFile {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid --background: {0}")]
    Background(EngineError),

    /// One entry of an `--events` script, verbatim, and what is wrong with it.
    #[error("event '{entry}' {problem}")]
    Event { entry: String, problem: EventProblem },

    #[error("cannot encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Engine(_) => 10,
            CliError::ReadSeedFile { .. } | CliError::Snapshot(_) | CliError::Detached => 11,
            CliError::MissingVisualization
            | CliError::Params(_)
            | CliError::SeedFile { .. }
            | CliError::Background(_)
            | CliError::Event { .. } => 12,
            CliError::Output(_) => 13,
        }
    }
}

impl From<EngineError> for CliError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Io(msg) => CliError::Snapshot(msg),
            other => CliError::Engine(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_failures_exit_with_10() {
        let err = CliError::from(EngineError::UnknownVisualization("torus".into()));
        assert_eq!(err.exit_code(), 10);
        assert_eq!(err.to_string(), "unknown visualization: torus");
    }

    #[test]
    fn engine_io_becomes_a_snapshot_failure() {
        let err = CliError::from(EngineError::Io("disk full".into()));
        assert!(matches!(err, CliError::Snapshot(_)));
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn unreadable_seed_file_names_the_path() {
        let err = CliError::ReadSeedFile {
            path: PathBuf::from("runs/hover.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.exit_code(), 11);
        assert!(err.to_string().contains("runs/hover.json"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn bad_event_names_the_entry() {
        let err = CliError::Event {
            entry: "hover@3".into(),
            problem: EventProblem::UnknownKind("hover".into()),
        };
        assert_eq!(err.exit_code(), 12);
        assert_eq!(err.to_string(), "event 'hover@3' has unknown kind 'hover'");
    }

    #[test]
    fn bad_background_is_an_input_error() {
        let err = CliError::Background(EngineError::InvalidColor("short".into()));
        assert_eq!(err.exit_code(), 12);
        assert!(err.to_string().starts_with("invalid --background"));
    }

    #[test]
    fn json_encoding_failures_exit_with_13() {
        let bad = serde_json::from_str::<serde_json::Value>("{invalid").unwrap_err();
        let err = CliError::from(bad);
        assert!(matches!(err, CliError::Output(_)));
        assert_eq!(err.exit_code(), 13);
    }
}
