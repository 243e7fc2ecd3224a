use std::io::{Stdout, Write};

use anyhow::Result;
use serde::Serialize;

use super::{alerts::WellbeingAlert, tracker::WellbeingSummary};

/// Messages the service sends back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostMessage {
    /// Limit or break advisory. The host decides between a system notification and a toast.
    Alert {
        title: String,
        message: String,
        #[serde(flatten)]
        alert: WellbeingAlert,
    },
    Summary {
        summary: WellbeingSummary,
    },
    Error {
        message: String,
    },
}

impl From<WellbeingAlert> for HostMessage {
    fn from(alert: WellbeingAlert) -> Self {
        HostMessage::Alert {
            title: alert.title().into(),
            message: alert.message(),
            alert,
        }
    }
}

/// Receiver of everything the service reports to the host.
#[cfg_attr(test, mockall::automock)]
pub trait HostSink {
    fn send(&mut self, message: HostMessage) -> Result<()>;
}

/// Writes one JSON document per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> HostSink for JsonLinesSink<W> {
    fn send(&mut self, message: HostMessage) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &message)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
