//! Implements InputPort over stdin/stdout, one JSON object per line.
//!
//! Requests run in their own tasks so a long download does not block listing
//! calls. Every outgoing line goes through a single writer task.

use crate::domain::{DomainError, DownloadProgress, IncomingMessage};
use crate::ports::InputPort;
use crate::usecases::{Command, CommandHandler, Response, WatcherService};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Unsolicited messages pushed to the front-end.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    NewMessage {
        payload: IncomingMessage,
    },
    Progress {
        request_id: Option<u64>,
        payload: DownloadProgress,
    },
}

/// One output line: a reply to a request or an event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outgoing {
    Reply {
        id: Option<u64>,
        #[serde(flatten)]
        response: Response,
    },
    Event(Event),
}

/// Decode one request line. On failure the error carries whatever id could be
/// recovered, so the front-end can still match the reply.
pub fn parse_line(line: &str) -> Result<(Option<u64>, Command), (Option<u64>, DomainError)> {
    let value: Value = serde_json::from_str(line)
        .map_err(|e| (None, DomainError::Protocol(format!("invalid JSON: {}", e))))?;
    let id = value.get("id").and_then(Value::as_u64);
    let command = serde_json::from_value::<Command>(value)
        .map_err(|e| (id, DomainError::Protocol(e.to_string())))?;
    Ok((id, command))
}

pub struct StdioServer {
    handler: Arc<CommandHandler>,
    watcher: Arc<WatcherService>,
}

impl StdioServer {
    pub fn new(handler: Arc<CommandHandler>, watcher: Arc<WatcherService>) -> Self {
        Self { handler, watcher }
    }

    /// Serve requests from `reader` until EOF, then wait for in-flight requests.
    pub async fn serve<R, W>(
        &self,
        reader: R,
        writer: W,
        mut events: broadcast::Receiver<IncomingMessage>,
    ) -> Result<(), DomainError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (out_tx, out_rx) = mpsc::unbounded_channel::<Outgoing>();
        let writer_task = tokio::spawn(write_lines(writer, out_rx));

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let event_tx = out_tx.clone();
        let forwarder = tokio::spawn(async move {
            loop {
                tokio::select! {
                    // buffered events go out before shutdown is noticed
                    biased;
                    received = events.recv() => match received {
                        Ok(msg) => {
                            if event_tx.send(Outgoing::Event(Event::NewMessage { payload: msg })).is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => warn!(skipped, "dropped new-message events"),
                        Err(RecvError::Closed) => break,
                    },
                    _ = &mut stop_rx => break,
                }
            }
        });

        let mut in_flight = JoinSet::new();
        let mut lines = reader.lines();
        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| DomainError::Protocol(format!("read stdin: {}", e)))?
        {
            if line.trim().is_empty() {
                continue;
            }
            match parse_line(&line) {
                Ok((id, command)) => {
                    debug!(id, command = command.name(), "request");
                    in_flight.spawn(run_request(
                        Arc::clone(&self.handler),
                        id,
                        command,
                        out_tx.clone(),
                    ));
                }
                Err((id, e)) => {
                    warn!(error = %e, "rejected request line");
                    let _ = out_tx.send(Outgoing::Reply {
                        id,
                        response: Response::failure(&e),
                    });
                }
            }
        }

        while in_flight.join_next().await.is_some() {}
        let _ = stop_tx.send(());
        let _ = forwarder.await;
        drop(out_tx);
        let _ = writer_task.await;
        info!("input closed, server stopped");
        Ok(())
    }
}

async fn run_request(
    handler: Arc<CommandHandler>,
    id: Option<u64>,
    command: Command,
    out: mpsc::UnboundedSender<Outgoing>,
) {
    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<DownloadProgress>();
    let progress_out = out.clone();
    let progress = tokio::spawn(async move {
        while let Some(payload) = progress_rx.recv().await {
            let _ = progress_out.send(Outgoing::Event(Event::Progress {
                request_id: id,
                payload,
            }));
        }
    });

    let response = handler.handle(command, Some(&progress_tx)).await;
    drop(progress_tx);
    // all progress lines precede the reply
    let _ = progress.await;
    let _ = out.send(Outgoing::Reply { id, response });
}

async fn write_lines<W>(mut writer: W, mut rx: mpsc::UnboundedReceiver<Outgoing>)
where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = rx.recv().await {
        let mut line = match serde_json::to_string(&msg) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "unserializable output dropped");
                continue;
            }
        };
        line.push('\n');
        if let Err(e) = writer.write_all(line.as_bytes()).await {
            warn!(error = %e, "stdout closed");
            break;
        }
        let _ = writer.flush().await;
    }
}

#[async_trait]
impl InputPort for StdioServer {
    async fn run(&self) -> Result<(), DomainError> {
        info!("serving JSON lines on stdin/stdout");
        let events = self.watcher.subscribe();
        self.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout(), events)
            .await
    }
}
