// std
use std::task::{Context, Poll};
// crates.io
use tokio::{runtime::Handle, sync::oneshot};
use tokio_util::sync::CancellationToken;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Handle to one in-flight call.
///
/// Await it for the outcome, or hand a callback to [`CallHandle::on_complete`]. Dropping
/// the handle detaches the call; only [`CallHandle::cancel`] stops it.
pub struct CallHandle<T> {
	cancel: CancellationToken,
	outcome: oneshot::Receiver<Result<T>>,
	runtime: Option<Handle>,
}
impl<T> CallHandle<T>
where
	T: 'static + Send,
{
	/// Wraps an outcome that is already known; no task is spawned.
	pub fn ready(result: Result<T>) -> Self {
		let (tx, outcome) = oneshot::channel();
		let _ = tx.send(result);

		Self { cancel: CancellationToken::new(), outcome, runtime: None }
	}

	/// Cancels the call. Awaiting the handle afterwards yields [`Error::Cancelled`] unless
	/// the call had already finished.
	pub fn cancel(&self) {
		self.cancel.cancel();
	}

	/// Returns `true` once [`Self::cancel`] was called on this handle or its token.
	pub fn is_cancelled(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Token that cancels this call; clones may be moved to other tasks.
	pub fn cancellation_token(&self) -> CancellationToken {
		self.cancel.clone()
	}

	/// Delivers the outcome to `callback` on the runtime instead of awaiting it.
	///
	/// Returns the call's cancellation token. A cancelled call delivers
	/// [`Error::Cancelled`] to the callback.
	pub fn on_complete<F>(self, callback: F) -> CancellationToken
	where
		F: 'static + Send + FnOnce(Result<T>),
	{
		let token = self.cancel.clone();

		match self.runtime.clone().or_else(|| Handle::try_current().ok()) {
			Some(runtime) => {
				runtime.spawn(async move { callback(self.await) });
			},
			None => {
				let mut outcome = self.outcome;

				callback(
					outcome.try_recv().unwrap_or_else(|_| Err(ConfigError::MissingRuntime.into())),
				);
			},
		}

		token
	}
}
impl<T> Future for CallHandle<T> {
	type Output = Result<T>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let cancelled = self.cancel.is_cancelled();

		Pin::new(&mut self.outcome).poll(cx).map(|received| {
			received.unwrap_or_else(|_| {
				if cancelled {
					Err(Error::Cancelled)
				} else {
					Err(Error::Aborted { reason: "call task was dropped before finishing".into() })
				}
			})
		})
	}
}
impl<T> Debug for CallHandle<T> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CallHandle").field("cancelled", &self.cancel.is_cancelled()).finish()
	}
}

/// Runs `work` on `runtime` under a fresh cancellation token.
///
/// Cancellation wins over a result that becomes ready at the same poll and aborts the
/// work task. A panic inside `work` resolves the handle with [`Error::Aborted`].
pub(crate) fn spawn_call<T, Fut>(
	runtime: Option<Handle>,
	kind: FlowKind,
	stage: &'static str,
	work: Fut,
) -> CallHandle<T>
where
	T: 'static + Send,
	Fut: 'static + Send + Future<Output = Result<T>>,
{
	let Some(runtime) = runtime else {
		return CallHandle::ready(Err(ConfigError::MissingRuntime.into()));
	};
	let cancel = CancellationToken::new();
	let (tx, outcome) = oneshot::channel();
	let token = cancel.clone();
	let span = FlowSpan::new(kind, stage);

	obs::record_flow_outcome(kind, FlowOutcome::Attempt);

	let task = runtime.spawn(work);

	runtime.spawn(span.instrument(async move {
		let abort = task.abort_handle();
		let result = tokio::select! {
			biased;
			_ = token.cancelled() => {
				abort.abort();

				Err(Error::Cancelled)
			},
			joined = task => joined.unwrap_or_else(|e| Err(e.into())),
		};

		obs::record_flow_outcome(kind, FlowOutcome::of(&result));

		let _ = tx.send(result);
	}));

	CallHandle { cancel, outcome, runtime: Some(runtime) }
}
