//! Per-pairing notification handlers.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerResult;

/// Produces the payload pushed to one subscriber of `command`.
///
/// Receives a copy of the pairing's associated data as it stood when the
/// notification started.
#[async_trait]
pub trait Notifier<D>: Send + Sync {
    async fn notify(&self, command: &str, data: D) -> HandlerResult;
}

/// [`Notifier`] built from an async closure. See [`notifier_fn`].
pub struct FnNotifier<F, Fut> {
    f: F,
    _fut: PhantomData<fn() -> Fut>,
}

/// Wrap `f(command, data)` as a shared notifier.
///
/// ```
/// use bytes::Bytes;
/// use command_hub::subscription::notifier_fn;
///
/// let double = notifier_fn(|_command: String, n: i64| async move {
///     Ok(Bytes::from((n * 2).to_string()))
/// });
/// # let _ = double;
/// ```
pub fn notifier_fn<D, F, Fut>(f: F) -> Arc<dyn Notifier<D>>
where
    D: Send + 'static,
    F: Fn(String, D) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnNotifier {
        f,
        _fut: PhantomData,
    })
}

#[async_trait]
impl<D, F, Fut> Notifier<D> for FnNotifier<F, Fut>
where
    D: Send + 'static,
    F: Fn(String, D) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn notify(&self, command: &str, data: D) -> HandlerResult {
        (self.f)(command.to_string(), data).await
    }
}
