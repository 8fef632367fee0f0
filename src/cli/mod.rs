//! CLI support for clause-lang
//!
//! Programmatic access to the `clause` commands, so other tools can embed
//! them without shelling out.

mod check;
mod docs;
mod inspect;

pub use check::{CheckOptions, CheckResult, execute_check};
pub use docs::{DocTopic, get_doc_topic, get_docs_overview};
pub use inspect::{InspectFormat, render_tokens, render_tree};

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::facts::FactError;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Invalid facts: {0}")]
    Facts(#[from] FactError),

    #[error("Could not read facts file '{}': {source}", .path.display())]
    FactsFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Condition is empty")]
    EmptyCondition,

    #[error("Unknown topic: '{0}'\nRun 'clause docs' to see available topics.")]
    UnknownTopic(String),
}
