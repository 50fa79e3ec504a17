use log::{debug, error, warn};
use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinHandle;

use std::path::{Path, PathBuf};

/// What a sink managed to write once its channel closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SinkReport {
    pub name: String,
    pub path: PathBuf,
    pub records_written: usize,
    /// First I/O failure seen by the sink, if any
    pub error: Option<String>,
}

impl SinkReport {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Cheap, cloneable producer side of a sink.
#[derive(Debug, Clone)]
pub struct SinkHandle {
    name: String,
    sender: UnboundedSender<String>,
}

impl SinkHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue one record; the writer appends a newline.
    pub fn send(&self, record: impl Into<String>) {
        if self.sender.send(record.into()).is_err() {
            debug!("Sink '{}' is closed, dropping record", self.name);
        }
    }
}

/// Consumer side: a task that owns the output file and appends records in
/// the order they arrive.
#[derive(Debug)]
pub struct Sink {
    name: String,
    path: PathBuf,
    writer: JoinHandle<SinkReport>,
}

impl Sink {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Wait for the writer to drain and flush.
    ///
    /// Completes only after every [`SinkHandle`] for this sink has been dropped.
    pub async fn finish(self) -> SinkReport {
        match self.writer.await {
            Ok(report) => report,
            Err(e) => {
                error!("Sink '{}' writer did not complete: {e}", self.name);
                SinkReport {
                    name: self.name,
                    path: self.path,
                    records_written: 0,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Create (or truncate) `path` and start a writer task for it.
///
/// Must be called from within a tokio runtime.
pub fn spawn_sink(name: impl Into<String>, path: impl Into<PathBuf>) -> (SinkHandle, Sink) {
    let name = name.into();
    let path = path.into();
    let (sender, receiver) = unbounded_channel();

    let writer = tokio::spawn(write_records(name.clone(), path.clone(), receiver));

    (
        SinkHandle {
            name: name.clone(),
            sender,
        },
        Sink { name, path, writer },
    )
}

async fn write_records(
    name: String,
    path: PathBuf,
    mut receiver: UnboundedReceiver<String>,
) -> SinkReport {
    let mut report = SinkReport {
        name,
        path,
        records_written: 0,
        error: None,
    };

    let mut writer = match File::create(&report.path).await {
        Ok(file) => Some(BufWriter::new(file)),
        Err(e) => {
            error!(
                "Cannot open {} for sink '{}': {e}",
                report.path.display(),
                report.name
            );
            report.error = Some(e.to_string());
            None
        }
    };

    while let Some(record) = receiver.recv().await {
        let Some(out) = writer.as_mut() else {
            continue;
        };

        let written = match out.write_all(record.as_bytes()).await {
            Ok(()) => out.write_all(b"\n").await,
            Err(e) => Err(e),
        };

        match written {
            Ok(()) => report.records_written += 1,
            Err(e) => {
                warn!(
                    "Write to {} failed, sink '{}' stops writing: {e}",
                    report.path.display(),
                    report.name
                );
                report.error = Some(e.to_string());
                writer = None;
            }
        }
    }

    if let Some(mut out) = writer
        && let Err(e) = out.flush().await
    {
        error!("Flush of {} failed: {e}", report.path.display());
        report.error = Some(e.to_string());
    }

    debug!(
        "Sink '{}' closed after {} record(s)",
        report.name, report.records_written
    );
    report
}
