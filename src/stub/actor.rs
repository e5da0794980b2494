//! The per-connection script interpreter.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::bolt::{self, BoltError};
use crate::framing;
use crate::packstream::{self, Value as WireValue};
use crate::script::{self, Line, Script, ScriptError};

use super::error::{StubError, StubResult};

/// What happened after playing a script to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The peer disconnected cleanly with nothing left unaccounted for.
    Continue,
    /// A `<EXIT>` line closed the connection deliberately.
    Exit,
}

enum MatchOutcome {
    Matched,
    Eof,
}

struct DecodedMessage {
    name: String,
    fields: Vec<WireValue>,
}

/// Owns one accepted socket and plays a script against it.
pub struct Actor<S> {
    stream: S,
    script: Arc<Script>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Actor<S> {
    pub fn new(stream: S, script: Arc<Script>) -> Self {
        Actor { stream, script }
    }

    /// Perform the handshake using the script's declared version, or its
    /// explicit `!: HANDSHAKE` override if present.
    pub async fn handshake(&mut self) -> StubResult<()> {
        let _proposed = bolt::read_preamble(&mut self.stream).await?;
        let reply = self
            .script
            .handshake_data
            .clone()
            .unwrap_or_else(|| self.script.version.to_wire_bytes().to_vec());
        self.stream.write_all(&reply).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Play the script to completion.
    pub async fn play(&mut self) -> StubResult<StepOutcome> {
        let mut idx = 0;
        let script = Arc::clone(&self.script);
        let lines = &script.lines;
        while idx < lines.len() {
            match &lines[idx] {
                Line::ClientMessage { .. } => {
                    match self.await_client_match(Some(&lines[idx])).await? {
                        MatchOutcome::Matched => idx += 1,
                        MatchOutcome::Eof => {
                            return Err(ScriptError::mismatch(
                                &self.script.filename,
                                lines[idx].line_no(),
                                lines[idx].describe(),
                                "<connection closed>",
                            )
                            .into())
                        }
                    }
                }
                Line::ServerMessage { name, fields, .. } => {
                    self.send_server_message(name, fields).await?;
                    idx += 1;
                }
                Line::ServerRawBytes { data, .. } => {
                    self.stream.write_all(data).await?;
                    self.stream.flush().await?;
                    idx += 1;
                }
                Line::ServerSleep { seconds, .. } => {
                    tokio::time::sleep(Duration::from_secs_f64(*seconds)).await;
                    idx += 1;
                }
                Line::ServerExit { .. } => return Ok(StepOutcome::Exit),
            }
        }

        // Mirror the trailing default_action pass from the original stub:
        // any further client traffic after the script ends must either be
        // silence (clean EOF) or an AUTO-listed message.
        match self.await_client_match(None).await? {
            MatchOutcome::Eof => Ok(StepOutcome::Continue),
            MatchOutcome::Matched => unreachable!("no expected line means Matched cannot occur"),
        }
    }

    async fn await_client_match(&mut self, expected: Option<&Line>) -> StubResult<MatchOutcome> {
        loop {
            let payload = match framing::read_message(&mut self.stream).await? {
                None => return Ok(MatchOutcome::Eof),
                Some(p) => p,
            };
            let message = self.decode_message(&payload)?;

            if self.script.is_auto(&message.name) {
                self.send_wire(script::auto_reply(self.script.version)).await?;
                continue;
            }

            return match expected {
                Some(Line::ClientMessage { name, fields, line_no }) => {
                    if &message.name == name && script::fields_match(&message.fields, fields) {
                        Ok(MatchOutcome::Matched)
                    } else {
                        Err(ScriptError::mismatch(
                            &self.script.filename,
                            *line_no,
                            expected.unwrap().describe(),
                            describe_received(&message),
                        )
                        .into())
                    }
                }
                _ => Err(ScriptError::mismatch(
                    &self.script.filename,
                    0,
                    "<end of script>",
                    describe_received(&message),
                )
                .into()),
            };
        }
    }

    fn decode_message(&self, payload: &[u8]) -> StubResult<DecodedMessage> {
        let (value, _) = packstream::unpack(payload)?;
        match value {
            WireValue::Struct { tag, fields } => {
                let name = bolt::client_name(self.script.version, tag)
                    .ok_or(BoltError::UnknownMessage(tag))?
                    .to_string();
                Ok(DecodedMessage { name, fields })
            }
            _ => Err(BoltError::UnknownMessage(0).into()),
        }
    }

    async fn send_server_message(&mut self, name: &str, fields: &[serde_json::Value]) -> StubResult<()> {
        let tag = bolt::server_tag(self.script.version, name).ok_or(BoltError::UnknownMessage(0))?;
        let wire_fields: Vec<WireValue> = fields.iter().map(script::json_to_wire).collect();
        self.send_wire(WireValue::Struct {
            tag,
            fields: wire_fields,
        })
        .await
    }

    async fn send_wire(&mut self, value: WireValue) -> StubResult<()> {
        let payload = packstream::pack(&value)?;
        framing::write_message(&mut self.stream, &payload).await?;
        Ok(())
    }
}

fn describe_received(message: &DecodedMessage) -> String {
    let fields: Vec<String> = message.fields.iter().map(|f| format!("{f:?}")).collect();
    format!("C: {} {}", message.name, fields.join(" "))
}
