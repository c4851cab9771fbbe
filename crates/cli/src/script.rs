//! Event scripts replayed against a page

use crate::error::{Error, Result};
use report_tables_core::Event;
use serde::Deserialize;
use std::path::Path;

/// A script is either a bare list of events or an object with an `events` list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Events(Vec<Event>),
    Wrapped { events: Vec<Event> },
}

/// Parse an event script
pub fn parse_script(json: &str) -> Result<Vec<Event>> {
    let script: ScriptFile =
        serde_json::from_str(json).map_err(|e| Error::Script(e.to_string()))?;

    Ok(match script {
        ScriptFile::Events(events) | ScriptFile::Wrapped { events } => events,
    })
}

/// Load an event script from a JSON file
pub fn load_script(path: &Path) -> Result<Vec<Event>> {
    let content = std::fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_script(&content)
}
