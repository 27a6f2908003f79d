//! Request/reply messages into the engine's run loop.
//!
//! A [`JobReq`] carries a query together with a single-use reply channel. The
//! run loop answers it in between ticks; the caller awaits the [`JobRes`].

use tokio::sync::{mpsc, oneshot};

use crate::error::EngineError;

#[derive(Debug)]
pub struct JobQueue<Q, A> {
  job_in: mpsc::Receiver<JobReq<Q, A>>,
}

impl<Q, A> JobQueue<Q, A> {
  pub fn new(job_in: mpsc::Receiver<JobReq<Q, A>>) -> Self {
    Self { job_in }
  }

  pub async fn recv(&mut self) -> Option<JobReq<Q, A>> {
    self.job_in.recv().await
  }

  pub fn try_recv(&mut self) -> Option<JobReq<Q, A>> {
    self.job_in.try_recv().ok()
  }
}

#[derive(Debug)]
pub struct JobReq<Q, A> {
  req: Q,
  callback: oneshot::Sender<A>,
}

impl<Q, A> JobReq<Q, A> {
  /// Queues `req`, waiting for room in the queue if it is full.
  pub async fn send(
    req: Q,
    sender: &mpsc::Sender<Self>,
  ) -> Result<JobRes<A>, EngineError> {
    let (callback, receiver) = oneshot::channel();

    sender
      .send(Self { req, callback })
      .await
      .map_err(|_| EngineError::Stopped)?;

    Ok(JobRes { receiver })
  }

  /// Answers the request. Returns false if the caller has stopped waiting.
  pub fn reply(self, res: A) -> bool {
    self.callback.send(res).is_ok()
  }

  pub fn req(&self) -> &Q {
    &self.req
  }
}

#[derive(Debug)]
pub struct JobRes<A> {
  receiver: oneshot::Receiver<A>,
}

impl<A> JobRes<A> {
  pub async fn recv(self) -> Result<A, EngineError> {
    self.receiver.await.map_err(|_| EngineError::Stopped)
  }
}
