//! The script model and parser: a line-oriented DSL describing the
//! messages a stub expects to receive and the canned responses it sends.

mod error;
mod matching;
mod model;
mod parser;

pub use error::{ScriptError, ScriptResult};
pub use matching::{auto_reply, fields_match, json_to_wire, wire_to_json};
pub use model::{Line, Script};
pub use parser::parse;

use std::path::Path;

/// Load and parse a script from disk.
pub fn load(path: impl AsRef<Path>) -> ScriptResult<Script> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)?;
    let filename = path.to_string_lossy().to_string();
    parse(&source, &filename)
}
