//! Explicit two-party request/response link.
//!
//! The demo client used to fake its socket with a fixed-delay timer; this
//! replaces it with a channel pair so tests control timing
//! deterministically. A request into a dropped serving half reports a
//! closed link instead of delivering into a torn-down session.

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("connection closed")]
    Closed,
}

pub struct Link<Req, Resp> {
    tx: mpsc::UnboundedSender<(Req, oneshot::Sender<Resp>)>,
}

impl<Req, Resp> Clone for Link<Req, Resp> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone() }
    }
}

pub struct LinkServer<Req, Resp> {
    rx: mpsc::UnboundedReceiver<(Req, oneshot::Sender<Resp>)>,
}

pub fn link<Req, Resp>() -> (Link<Req, Resp>, LinkServer<Req, Resp>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Link { tx }, LinkServer { rx })
}

impl<Req, Resp> Link<Req, Resp> {
    pub async fn request(&self, req: Req) -> Result<Resp, LinkError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((req, reply_tx))
            .map_err(|_| LinkError::Closed)?;
        reply_rx.await.map_err(|_| LinkError::Closed)
    }
}

impl<Req, Resp> LinkServer<Req, Resp> {
    /// Answers one pending request; `None` once every client handle is
    /// gone.
    pub async fn serve_one(&mut self, answer: impl FnOnce(Req) -> Resp) -> Option<()> {
        let (req, reply) = self.rx.recv().await?;
        let _ = reply.send(answer(req));
        Some(())
    }

    /// Answers requests until every client handle is gone.
    pub async fn serve(mut self, mut answer: impl FnMut(Req) -> Resp) {
        while let Some((req, reply)) = self.rx.recv().await {
            let _ = reply.send(answer(req));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let (client, mut server) = link::<u32, u32>();
        let (reply, served) =
            tokio::join!(client.request(20), server.serve_one(|n| n + 1));
        assert_eq!(reply, Ok(21));
        assert_eq!(served, Some(()));
    }

    #[tokio::test]
    async fn request_after_server_drop_reports_closed() {
        let (client, server) = link::<u32, u32>();
        drop(server);
        assert_eq!(client.request(1).await, Err(LinkError::Closed));
    }

    #[tokio::test]
    async fn server_sees_disconnect_when_clients_drop() {
        let (client, mut server) = link::<u32, u32>();
        drop(client);
        assert_eq!(server.serve_one(|n| n).await, None);
    }
}
