//! Callback delivery for client futures.
//!
//! Every client operation is a single future. [`CallbackExt::with_callback`]
//! wraps it so an optional callback observes the same settlement as the
//! awaiting caller, exactly once.

use futures::ready;
use pin_project_lite::pin_project;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::errors::{SegViewError, SegViewResult};

pin_project! {
    /// Future returned by [`CallbackExt::with_callback`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct WithCallback<Fut, C> {
        #[pin]
        future: Fut,
        callback: Option<C>,
    }
}

impl<Fut, T, C> Future for WithCallback<Fut, C>
where
    Fut: Future<Output = SegViewResult<T>>,
    C: FnOnce(Option<&T>, Option<&SegViewError>),
{
    type Output = SegViewResult<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let result = ready!(this.future.poll(cx));

        // Arguments are result-first: (Some(result), None) or (None, Some(error)).
        if let Some(callback) = this.callback.take() {
            match &result {
                Ok(value) => callback(Some(value), None),
                Err(error) => callback(None, Some(error)),
            }
        }

        Poll::Ready(result)
    }
}

/// Adds callback delivery to client futures.
pub trait CallbackExt<T>: Future<Output = SegViewResult<T>> + Sized {
    /// Invokes `callback` once when the future settles, then yields the result.
    fn with_callback<C>(self, callback: C) -> WithCallback<Self, C>
    where
        C: FnOnce(Option<&T>, Option<&SegViewError>),
    {
        WithCallback {
            future: self,
            callback: Some(callback),
        }
    }
}

impl<F, T> CallbackExt<T> for F where F: Future<Output = SegViewResult<T>> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_callback_receives_success_first() {
        let calls = AtomicUsize::new(0);

        let result = async { Ok::<_, SegViewError>(7u32) }
            .with_callback(|value, error| {
                calls.fetch_add(1, Ordering::SeqCst);
                assert_eq!(value, Some(&7));
                assert!(error.is_none());
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_callback_receives_error_second() {
        let calls = AtomicUsize::new(0);

        let result = async { Err::<u32, _>(SegViewError::service("boom", 502)) }
            .with_callback(|value, error| {
                calls.fetch_add(1, Ordering::SeqCst);
                assert!(value.is_none());
                assert_eq!(error.map(SegViewError::status), Some(502));
            })
            .await;

        assert_eq!(result.unwrap_err().status(), 502);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
