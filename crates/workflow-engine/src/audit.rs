//! An optional CSV audit sink for successful account creations. This is
//! one concrete subscriber implementation; it is attached to the Event Bus
//! like any other subscriber and has no special access to the executor.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::sync::mpsc;

use crate::events::{Event, EventType};

/// Drains a workflow's event stream on its own task and appends one row
/// per successful `open_account` it observes, until the stream ends.
pub struct CsvAuditSink {
    path: PathBuf,
}

impl CsvAuditSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Spawns a background task that writes rows as
    /// `timestamp,client_id,account_type,account_number,workflow_id`.
    pub fn spawn(self, mut receiver: mpsc::Receiver<Event>) -> tokio::task::JoinHandle<anyhow::Result<()>> {
        tokio::spawn(async move {
            let needs_header = !Path::new(&self.path).exists();
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(
                std::fs::OpenOptions::new().create(true).append(true).open(&self.path)?,
            );
            if needs_header {
                writer.write_record(["timestamp", "client_id", "account_type", "account_number", "workflow_id"])?;
            }

            while let Some(event) = receiver.recv().await {
                if event.event_type != EventType::TaskUpdate {
                    continue;
                }
                if let Some(row) = account_opened_row(&event) {
                    writer.write_record(&row)?;
                    writer.flush()?;
                }
            }
            Ok(())
        })
    }
}

fn account_opened_row(event: &Event) -> Option<[String; 5]> {
    let status = event.payload.get("status")?.as_str()?;
    if status != "completed" {
        return None;
    }
    let result = event.payload.get("result").and_then(Value::as_str)?;
    let account_number = result.split("opened account ").nth(1)?.trim().to_string();
    let account_type = account_number.split('-').next().unwrap_or_default().to_string();
    let client_id = event.payload.get("client_id").and_then(Value::as_str)?.to_string();
    Some([
        event.timestamp_ms.to_string(),
        client_id,
        account_type,
        account_number,
        event.workflow_id.to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn extracts_account_number_from_a_completed_task_update() {
        let event = Event::new(
            Uuid::new_v4(),
            EventType::TaskUpdate,
            Some("operations_agent".to_string()),
            json!({
                "task_id": "task_4",
                "status": "completed",
                "description": "Open ROTH_IRA account for the client",
                "result": "open_account succeeded: opened account ROTH_IRA-1000",
                "client_id": "C1",
            }),
        );
        let row = account_opened_row(&event).unwrap();
        assert_eq!(row[1], "C1");
        assert_eq!(row[2], "ROTH_IRA");
        assert_eq!(row[3], "ROTH_IRA-1000");
    }

    #[test]
    fn non_completed_updates_are_skipped() {
        let event = Event::new(
            Uuid::new_v4(),
            EventType::TaskUpdate,
            None,
            json!({"status": "in_progress", "result": Value::Null}),
        );
        assert!(account_opened_row(&event).is_none());
    }
}
