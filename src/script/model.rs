//! The script data model: lines, metadata, and the script as a whole.

use crate::bolt::BoltVersion;

/// One line of a script, carrying its source line number for diagnostics.
#[derive(Debug, Clone)]
pub enum Line {
    ClientMessage {
        name: String,
        fields: Vec<serde_json::Value>,
        line_no: usize,
    },
    ServerMessage {
        name: String,
        fields: Vec<serde_json::Value>,
        line_no: usize,
    },
    ServerRawBytes {
        data: Vec<u8>,
        line_no: usize,
    },
    ServerSleep {
        seconds: f64,
        line_no: usize,
    },
    ServerExit {
        line_no: usize,
    },
}

impl Line {
    pub fn line_no(&self) -> usize {
        match self {
            Line::ClientMessage { line_no, .. }
            | Line::ServerMessage { line_no, .. }
            | Line::ServerRawBytes { line_no, .. }
            | Line::ServerSleep { line_no, .. }
            | Line::ServerExit { line_no } => *line_no,
        }
    }

    pub fn is_client_message(&self) -> bool {
        matches!(self, Line::ClientMessage { .. })
    }

    /// Render for diagnostics: `C: RUN ["RETURN 1"]`-style text.
    pub fn describe(&self) -> String {
        match self {
            Line::ClientMessage { name, fields, .. } => format!("C: {name} {}", render_fields(fields)),
            Line::ServerMessage { name, fields, .. } => format!("S: {name} {}", render_fields(fields)),
            Line::ServerRawBytes { data, .. } => format!("S: <RAW> {}", hex::encode_upper(data)),
            Line::ServerSleep { seconds, .. } => format!("S: <SLEEP> {seconds}"),
            Line::ServerExit { .. } => "S: <EXIT>".to_string(),
        }
    }
}

fn render_fields(fields: &[serde_json::Value]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// A parsed script: metadata plus an ordered sequence of lines.
#[derive(Debug, Clone)]
pub struct Script {
    pub version: BoltVersion,
    pub auto: Vec<String>,
    pub handshake_data: Option<Vec<u8>>,
    pub port: Option<u16>,
    pub filename: String,
    pub lines: Vec<Line>,
}

impl Script {
    pub fn is_auto(&self, name: &str) -> bool {
        self.auto.iter().any(|n| n == name)
    }
}
