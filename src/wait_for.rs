use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::FutureExt;

use crate::EventPayload;

/// Future returned by [`wait_for`](crate::EventHandler::wait_for).
///
/// Resolves with the payload of the next emission after it was created. It has no
/// error path: if the emitter is dropped or the event's listeners are cleared before
/// that emission happens, it stays pending forever. Race it against a timer to bound
/// the wait.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct WaitFor<P> {
    receiver: Option<oneshot::Receiver<EventPayload<P>>>,
}

impl<P> WaitFor<P> {
    pub(crate) fn new(receiver: oneshot::Receiver<EventPayload<P>>) -> Self {
        Self { receiver: Some(receiver) }
    }
}

impl<P> Future for WaitFor<P> {
    type Output = EventPayload<P>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        let Some(receiver) = this.receiver.as_mut() else {
            return Poll::Pending;
        };
        match receiver.poll_unpin(cx) {
            Poll::Ready(Ok(payload)) => {
                this.receiver = None;
                Poll::Ready(payload)
            }
            // The sender went away without firing: nothing can resolve us anymore.
            Poll::Ready(Err(oneshot::Canceled)) => {
                this.receiver = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<P> Debug for WaitFor<P> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WaitFor")
            .field("armed", &self.receiver.is_some())
            .finish()
    }
}
