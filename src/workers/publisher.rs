use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::models::EngineMessage;

/// Worker that writes engine messages as JSON lines
pub struct MessagePublisherWorker<W> {
    message_rx: mpsc::Receiver<EngineMessage>,
    out: W,
}

impl<W: AsyncWrite + Unpin> MessagePublisherWorker<W> {
    pub fn new(message_rx: mpsc::Receiver<EngineMessage>, out: W) -> Self {
        Self { message_rx, out }
    }

    /// Run until every sender is dropped; hands the writer back
    pub async fn run(mut self) -> W {
        info!("Message publisher started");

        while let Some(message) = self.message_rx.recv().await {
            self.publish(&message).await;
        }

        warn!("Message publisher channel closed");
        self.out
    }

    async fn publish(&mut self, message: &EngineMessage) {
        let mut line = message.to_json_line();
        line.push('\n');

        if let Err(e) = self.out.write_all(line.as_bytes()).await {
            error!("Failed to write message: {}", e);
            return;
        }
        if let Err(e) = self.out.flush().await {
            error!("Failed to flush message output: {}", e);
        }

        debug!("Published {} bytes", line.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_writes_one_line_per_message() {
        let (tx, rx) = mpsc::channel(4);
        let worker = MessagePublisherWorker::new(rx, Vec::new());

        tx.send(EngineMessage::opportunities(Vec::new())).await.unwrap();
        tx.send(EngineMessage::failure("kalshi feed failed")).await.unwrap();
        drop(tx);

        let out = worker.run().await;
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(first["type"], "opportunities_detected");
        assert_eq!(second["type"], "pass_failed");
    }
}
