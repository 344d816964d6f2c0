use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::error;

use super::PipelineError;

/// Process-local counters folded from events, one at a time, by a single owner.
pub trait Tally: Default + Send + 'static {
    type Event: Send + 'static;

    fn record(&mut self, event: Self::Event);
}

/// Owns a `Tally` inside its own task; everybody else reaches it through
/// `Recorder`s.
pub struct Accumulator<T: Tally> {
    sender: UnboundedSender<T::Event>,
    handle: JoinHandle<T>,
}

impl<T: Tally> Accumulator<T> {
    pub fn start() -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel();

        let handle = tokio::spawn(async move {
            let mut tally = T::default();

            while let Some(event) = receiver.recv().await {
                tally.record(event);
            }

            tally
        });

        Self { sender, handle }
    }

    pub fn recorder(&self) -> Recorder<T::Event> {
        Recorder {
            sender: self.sender.clone(),
        }
    }

    /// Resolves once every `Recorder` handed out has been dropped.
    pub async fn finish(self) -> Result<T, PipelineError> {
        drop(self.sender);

        self.handle.await.map_err(|e| PipelineError::AccumulatorLost(e.to_string()))
    }
}

pub struct Recorder<E> {
    sender: UnboundedSender<E>,
}

impl<E> Clone for Recorder<E> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<E: Send + 'static> Recorder<E> {
    pub fn record(&self, event: E) {
        if self.sender.send(event).is_err() {
            error!("accumulator stopped before all events were recorded");
        }
    }
}
