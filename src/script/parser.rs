//! Line-oriented script parser.
//!
//! Grammar (see module docs for the full grammar table):
//! `!:`/`C:`/`S:` lines, with role inheritance on continuation lines and
//! JSON-token field parsing.

use crate::bolt::{self, BoltVersion};

use super::error::{ScriptError, ScriptResult};
use super::model::{Line, Script};

/// Split `s` on the first run of whitespace, returning `(first, rest)`.
fn split_first(s: &str) -> (String, String) {
    match s.split_once(char::is_whitespace) {
        Some((a, b)) => (a.to_string(), b.trim_start().to_string()),
        None => (s.to_string(), String::new()),
    }
}

struct RawLine {
    role: Option<String>,
    tag: String,
    data: String,
}

fn parse_raw_line(line: &str) -> Option<RawLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with("//") {
        return None;
    }
    let (mut tag, mut data) = split_first(trimmed);
    let mut role = None;
    if let Some(stripped) = tag.strip_suffix(':') {
        role = Some(stripped.to_string());
        let (t2, d2) = split_first(&data);
        tag = t2;
        data = d2;
    }
    if tag.is_empty() {
        return None;
    }
    Some(RawLine { role, tag, data })
}

/// Parse a whitespace-separated sequence of JSON tokens, attaching any
/// trailing non-JSON text as a single opaque string field.
fn parse_fields(data: &str) -> Vec<serde_json::Value> {
    let mut fields = Vec::new();
    let mut rest = data.trim_start();
    while !rest.is_empty() {
        let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<serde_json::Value>();
        match stream.next() {
            Some(Ok(value)) => {
                let consumed = stream.byte_offset();
                fields.push(value);
                rest = rest[consumed..].trim_start();
            }
            _ => {
                fields.push(serde_json::Value::String(rest.to_string()));
                break;
            }
        }
    }
    fields
}

fn parse_hex_bytes(file: &str, line_no: usize, data: &str) -> ScriptResult<Vec<u8>> {
    let compact: String = data.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.len() % 2 != 0 {
        return Err(ScriptError::parse(
            file,
            line_no,
            format!("hex byte sequence {compact:?} has an odd number of digits"),
        ));
    }
    hex::decode(&compact)
        .map_err(|e| ScriptError::parse(file, line_no, format!("invalid hex bytes {compact:?}: {e}")))
}

fn parse_version(file: &str, line_no: usize, token: &str) -> ScriptResult<BoltVersion> {
    let mut parts = token.split('.');
    let major: u8 = parts
        .next()
        .unwrap_or("")
        .parse()
        .map_err(|_| ScriptError::parse(file, line_no, format!("invalid BOLT version {token:?}")))?;
    let minor: u8 = match parts.next() {
        Some(m) => m
            .parse()
            .map_err(|_| ScriptError::parse(file, line_no, format!("invalid BOLT version {token:?}")))?,
        None => 0,
    };
    Ok(BoltVersion::new(major, minor))
}

struct Metadata {
    auto: Vec<String>,
    version: Option<BoltVersion>,
    handshake_data: Option<Vec<u8>>,
    port: Option<u16>,
}

/// Parse an entire script from its source text.
pub fn parse(source: &str, filename: &str) -> ScriptResult<Script> {
    let mut meta = Metadata {
        auto: Vec::new(),
        version: None,
        handshake_data: None,
        port: None,
    };
    let mut lines = Vec::new();
    let mut last_role = String::new();

    for (idx, raw) in source.lines().enumerate() {
        let line_no = idx + 1;
        let Some(parsed) = parse_raw_line(raw) else {
            continue;
        };
        let role = match parsed.role {
            Some(r) => {
                last_role = r.clone();
                r
            }
            None => last_role.clone(),
        };

        match role.as_str() {
            "!" => parse_meta_line(filename, line_no, &parsed.tag, &parsed.data, &mut meta)?,
            "C" => {
                let fields = parse_fields(&parsed.data);
                lines.push(Line::ClientMessage {
                    name: parsed.tag,
                    fields,
                    line_no,
                });
            }
            "S" => lines.push(parse_server_line(filename, line_no, &parsed.tag, &parsed.data)?),
            other => {
                return Err(ScriptError::parse(
                    filename,
                    line_no,
                    format!("unknown role {other:?}"),
                ))
            }
        }
    }

    let version = meta
        .version
        .ok_or_else(|| ScriptError::parse(filename, 0, "script has no !: BOLT version directive"))?;

    for line in &lines {
        match line {
            Line::ClientMessage { name, line_no, .. } => {
                validate_message_name(filename, *line_no, name, version, true)?
            }
            Line::ServerMessage { name, line_no, .. } => {
                validate_message_name(filename, *line_no, name, version, false)?
            }
            _ => {}
        }
    }

    Ok(Script {
        version,
        auto: meta.auto,
        handshake_data: meta.handshake_data,
        port: meta.port,
        filename: filename.to_string(),
        lines,
    })
}

fn validate_message_name(
    file: &str,
    line_no: usize,
    name: &str,
    version: BoltVersion,
    client: bool,
) -> ScriptResult<()> {
    let found = if client {
        bolt::client_tag(version, name).is_some()
    } else {
        bolt::server_tag(version, name).is_some()
    };
    if found {
        return Ok(());
    }
    if client && bolt::is_known_elsewhere(name, version) {
        return Err(ScriptError::unknown_for_version(file, line_no, name, version));
    }
    if client {
        Err(ScriptError::parse(
            file,
            line_no,
            format!("unknown client message {name:?}"),
        ))
    } else {
        Err(ScriptError::parse(
            file,
            line_no,
            format!("unknown server message {name:?}"),
        ))
    }
}

fn parse_meta_line(
    file: &str,
    line_no: usize,
    tag: &str,
    data: &str,
    meta: &mut Metadata,
) -> ScriptResult<()> {
    match tag {
        "AUTO" => {
            let fields = parse_fields(data);
            let name = fields
                .first()
                .and_then(|v| v.as_str().map(str::to_string))
                .ok_or_else(|| ScriptError::parse(file, line_no, "AUTO directive needs a message name"))?;
            meta.auto.push(name);
        }
        "BOLT" | "NEO4J" => {
            meta.version = Some(parse_version(file, line_no, data.trim())?);
        }
        "HANDSHAKE" => {
            meta.handshake_data = Some(parse_hex_bytes(file, line_no, data)?);
        }
        "PORT" => {
            let fields = parse_fields(data);
            let port = fields
                .first()
                .and_then(|v| v.as_u64())
                .ok_or_else(|| ScriptError::parse(file, line_no, "PORT directive needs a u16"))?;
            meta.port = Some(port as u16);
        }
        other => {
            return Err(ScriptError::parse(
                file,
                line_no,
                format!("unknown meta tag {other:?}"),
            ))
        }
    }
    Ok(())
}

fn parse_server_line(file: &str, line_no: usize, tag: &str, data: &str) -> ScriptResult<Line> {
    if tag.starts_with('<') && tag.ends_with('>') {
        match tag {
            "<EXIT>" => Ok(Line::ServerExit { line_no }),
            "<RAW>" => Ok(Line::ServerRawBytes {
                data: parse_hex_bytes(file, line_no, data)?,
                line_no,
            }),
            "<SLEEP>" => {
                let fields = parse_fields(data);
                let seconds = fields
                    .first()
                    .and_then(|v| v.as_f64())
                    .ok_or_else(|| ScriptError::parse(file, line_no, "<SLEEP> needs a duration in seconds"))?;
                Ok(Line::ServerSleep { seconds, line_no })
            }
            other => Err(ScriptError::parse(
                file,
                line_no,
                format!("unknown command {other:?}"),
            )),
        }
    } else {
        let fields = parse_fields(data);
        Ok(Line::ServerMessage {
            name: tag.to_string(),
            fields,
            line_no,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_script() {
        let src = "!: BOLT 3\nC: RUN \"RETURN $x\" {\"x\":1} {}\nS: SUCCESS {\"fields\":[\"x\"]}\nS: RECORD [1]\nS: SUCCESS {}\n";
        let script = parse(src, "test.script").unwrap();
        assert_eq!(script.version, BoltVersion::new(3, 0));
        assert_eq!(script.lines.len(), 4);
        match &script.lines[0] {
            Line::ClientMessage { name, fields, .. } => {
                assert_eq!(name, "RUN");
                assert_eq!(fields.len(), 3);
            }
            other => panic!("unexpected line {other:?}"),
        }
    }

    #[test]
    fn auto_directive_and_init() {
        let src = "!: BOLT 1\n!: AUTO INIT\nC: RUN \"MATCH (n) RETURN n\" {}\nS: SUCCESS {\"fields\":[\"n\"]}\nS: SUCCESS {}\n";
        let script = parse(src, "t").unwrap();
        assert!(script.is_auto("INIT"));
    }

    #[test]
    fn role_inherits_on_continuation_lines() {
        let src = "!: BOLT 3\nC: RUN \"X\" {}\n{}\n";
        let script = parse(src, "t").unwrap();
        assert_eq!(script.lines.len(), 2);
        assert!(script.lines[1].is_client_message());
    }

    #[test]
    fn raw_bytes_directive() {
        let src = "!: BOLT 3\nS: <RAW> DE AD BE EF\nS: <EXIT>\n";
        let script = parse(src, "t").unwrap();
        match &script.lines[0] {
            Line::ServerRawBytes { data, .. } => assert_eq!(data, &vec![0xDE, 0xAD, 0xBE, 0xEF]),
            other => panic!("unexpected line {other:?}"),
        }
        assert!(matches!(script.lines[1], Line::ServerExit { .. }));
    }

    #[test]
    fn rejects_message_not_in_negotiated_version() {
        let src = "!: BOLT 4\nC: PULL_ALL {}\n";
        let err = parse(src, "t").unwrap_err();
        assert!(matches!(err, ScriptError::UnknownForVersion { .. }));
    }

    #[test]
    fn rejects_completely_unknown_message() {
        let src = "!: BOLT 4\nC: FROBNICATE {}\n";
        let err = parse(src, "t").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { .. }));
    }

    #[test]
    fn missing_version_directive_is_an_error() {
        let src = "C: RUN \"X\" {}\n";
        let err = parse(src, "t").unwrap_err();
        assert!(matches!(err, ScriptError::Parse { .. }));
    }
}
