//! Canned responses loaded from a JSON file
//!
//! The file is an object keyed by method name. A value of the exact form
//! `{"error": "<message>"}` makes the method fail with that message, anything
//! else is returned verbatim as the result.

use std::{collections::BTreeMap, fs, path::Path};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::registry::HandlerRegistry;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixtures from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("fixtures must be a JSON object keyed by method name: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FailureFixture {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Fixture {
    Failure(FailureFixture),
    Result(Value),
}

pub type Fixtures = BTreeMap<String, Fixture>;

pub fn parse_fixtures(text: &str) -> Result<Fixtures, FixtureError> {
    Ok(serde_json::from_str(text)?)
}

pub fn load_fixtures(path: &Path) -> Result<Fixtures, FixtureError> {
    let text = fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_fixtures(&text)
}

/// Registers one handler per fixture, replacing existing ones for the same method.
pub fn install_fixtures(registry: &HandlerRegistry, fixtures: Fixtures) {
    for (method, fixture) in fixtures {
        match fixture {
            Fixture::Result(result) => {
                registry.set_handler(method, move |_| Ok::<_, String>(result.clone()))
            }
            Fixture::Failure(FailureFixture { error }) => {
                registry.set_handler(method, move |_| Err::<Value, _>(error.clone()))
            }
        }
    }
}
