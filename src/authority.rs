//! Token authority: owns the signed-in state and coordinates sign-in, sign-out, and refresh.
//!
//! Every token exchange goes through the [`TokenAuthority`], which persists results in the
//! configured [`TokenStore`]. Refreshes are single-flight: callers queue on one async
//! guard, and a caller that waited while another caller rotated the tokens reuses the new
//! credentials instead of sending a second `refresh_token` grant.

mod metrics;
mod observer;
mod session;

pub use metrics::RefreshMetrics;
pub use observer::SignInObserver;
pub use session::AuthorizationSession;

// crates.io
use tokio::runtime::Handle;
// self
use crate::{
	_prelude::*,
	auth::{CredentialRecord, Credentials, Secret},
	client::{CallHandle, spawn_call},
	config::ClientConfig,
	error::ConfigError,
	http::HttpTransport,
	oauth::TokenFacade,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::TokenStore,
};

/// Grant used to obtain the first set of credentials.
#[derive(Clone, Debug)]
pub enum SignInGrant {
	/// Authorization code returned through the redirect URI.
	AuthorizationCode {
		/// One-time code taken from the redirect query.
		code: String,
	},
	/// Resource owner password credentials.
	Password {
		/// Account e-mail or user name.
		username: String,
		/// Account password.
		password: Secret,
	},
}
impl SignInGrant {
	fn flow_kind(&self) -> FlowKind {
		match self {
			SignInGrant::AuthorizationCode { .. } => FlowKind::AuthorizationCode,
			SignInGrant::Password { .. } => FlowKind::Password,
		}
	}
}

/// Sole owner of token exchanges for one client.
///
/// Cloning is cheap; clones share the store, the refresh guard, the metrics, and the
/// registered observers.
#[derive(Clone)]
pub struct TokenAuthority {
	config: Arc<ClientConfig>,
	store: Arc<dyn TokenStore>,
	facade: Arc<TokenFacade>,
	refresh_guard: Arc<AsyncMutex<()>>,
	refresh_metrics: Arc<RefreshMetrics>,
	observers: Arc<RwLock<Vec<Arc<dyn SignInObserver>>>>,
	runtime: Option<Handle>,
}
impl TokenAuthority {
	/// Creates an authority over `store`, sending token grants through `transport`.
	///
	/// Captures the current tokio runtime when one is entered; see [`Self::with_runtime`].
	pub fn new(
		config: Arc<ClientConfig>,
		store: Arc<dyn TokenStore>,
		transport: Arc<dyn HttpTransport>,
	) -> Self {
		let facade = Arc::new(TokenFacade::new(&config, transport));

		Self {
			config,
			store,
			facade,
			refresh_guard: Default::default(),
			refresh_metrics: Default::default(),
			observers: Default::default(),
			runtime: Handle::try_current().ok(),
		}
	}

	/// Uses `runtime` for detached refreshes and continuations.
	pub fn with_runtime(mut self, runtime: Handle) -> Self {
		self.runtime = Some(runtime);

		self
	}

	/// Refresh counters shared by every clone of this authority.
	pub fn metrics(&self) -> &RefreshMetrics {
		&self.refresh_metrics
	}

	/// Registers an observer notified after every sign-in attempt.
	pub fn observe(&self, observer: Arc<dyn SignInObserver>) {
		self.observers.write().push(observer);
	}

	/// Returns `true` when the store holds an access token.
	///
	/// A failing store reads as signed out.
	pub async fn is_signed_in(&self) -> bool {
		matches!(self.signed_in_record().await, Ok(Some(_)))
	}

	/// Returns `true` when the access token must be refreshed before use.
	///
	/// See [`CredentialRecord::will_expire_soon_at`]; a failing store reads as expiring.
	pub async fn will_expire_soon(&self) -> bool {
		match self.store.load().await {
			Ok(Some(record)) =>
				record.will_expire_soon_at(OffsetDateTime::now_utc(), self.config.policy.expiry_margin),
			_ => true,
		}
	}

	/// Returns the stored credentials, or `None` when signed out.
	pub async fn credentials(&self) -> Result<Option<Credentials>> {
		match self.signed_in_record().await? {
			Some(record) => Ok(Some(Credentials::try_from(&record).map_err(ConfigError::from)?)),
			None => Ok(None),
		}
	}

	/// Performs the first token exchange and stores the result.
	///
	/// The store is written only when the grant succeeds; on failure the previous
	/// credentials (if any) stay untouched.
	pub async fn sign_in(&self, grant: SignInGrant) -> Result<Credentials> {
		let kind = grant.flow_kind();
		let span = FlowSpan::new(kind, "sign_in");

		obs::record_flow_outcome(kind, FlowOutcome::Attempt);

		let result = span
			.instrument(async {
				let credentials = match &grant {
					SignInGrant::AuthorizationCode { code } =>
						self.facade.exchange_code(code).await?,
					SignInGrant::Password { username, password } =>
						self.facade.exchange_password(username, password).await?,
				};
				let _singleflight = self.refresh_guard.lock().await;

				self.persist(&credentials).await?;

				Ok(credentials)
			})
			.await;

		obs::record_flow_outcome(kind, FlowOutcome::of(&result));

		match &result {
			Ok(credentials) => self.notify(|observer| observer.on_signed_in(credentials)),
			Err(e) => self.notify(|observer| observer.on_sign_in_failed(e)),
		}

		result
	}

	/// Signs in with the resource owner password grant.
	pub async fn sign_in_with_password(
		&self,
		username: impl Into<String>,
		password: impl Into<Secret>,
	) -> Result<Credentials> {
		self.sign_in(SignInGrant::Password { username: username.into(), password: password.into() })
			.await
	}

	/// Starts an authorization code sign-in and returns the URL to open in a browser.
	pub fn start_authorization(&self) -> AuthorizationSession {
		AuthorizationSession::new(&self.config)
	}

	/// Finishes an authorization code sign-in from the redirect the browser landed on.
	pub async fn complete_authorization(
		&self,
		session: &AuthorizationSession,
		redirect: &Url,
	) -> Result<Credentials> {
		match session.extract_code(redirect) {
			Ok(code) => self.sign_in(SignInGrant::AuthorizationCode { code }).await,
			Err(e) => {
				self.notify(|observer| observer.on_sign_in_failed(&e));

				Err(e)
			},
		}
	}

	/// Clears the stored credentials. Signing out twice succeeds.
	///
	/// Waits for an in-flight refresh so it cannot write the tokens back afterwards.
	pub async fn sign_out(&self) -> Result<()> {
		let _singleflight = self.refresh_guard.lock().await;

		self.store.clear().await.map_err(Into::into)
	}

	/// Exchanges the stored refresh token for new credentials, even if the current ones
	/// are still valid.
	pub async fn refresh_token(&self) -> Result<Credentials> {
		self.refresh_after(None).await
	}

	/// Refreshes on a detached task, then runs `continuation` with the refresh outcome.
	///
	/// The continuation runs whether or not the refresh succeeded. Cancelling the returned
	/// handle guarantees the continuation never starts; the refresh itself keeps running
	/// and still stores its result.
	pub fn refresh_then<T, F, Fut>(&self, continuation: F) -> CallHandle<T>
	where
		T: 'static + Send,
		F: 'static + Send + FnOnce(Result<Credentials>) -> Fut,
		Fut: 'static + Send + Future<Output = Result<T>>,
	{
		let authority = self.clone();

		spawn_call(self.runtime(), FlowKind::Api, "refresh_then", async move {
			let refreshed = authority.refresh_detached(None).await;

			if let Err(e) = &refreshed {
				obs::note_refresh_failure(e);
			}

			continuation(refreshed).await
		})
	}

	pub(crate) fn runtime(&self) -> Option<Handle> {
		self.runtime.clone().or_else(|| Handle::try_current().ok())
	}

	pub(crate) async fn signed_in_record(&self) -> Result<Option<CredentialRecord>> {
		Ok(self.store.load().await?.filter(CredentialRecord::is_signed_in))
	}

	/// Refreshes unless the stored access token already differs from `stale` and is fresh.
	///
	/// `None` forces a refresh grant.
	pub(crate) async fn refresh_after(&self, stale: Option<&str>) -> Result<Credentials> {
		const KIND: FlowKind = FlowKind::Refresh;

		let span = FlowSpan::new(KIND, "refresh_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let result = span
			.instrument(async move {
				let _singleflight = self.refresh_guard.lock().await;
				let record = self.signed_in_record().await?.ok_or(Error::NotSignedIn)?;
				let now = OffsetDateTime::now_utc();

				if let Some(stale) = stale
					&& record.access_token.as_deref() != Some(stale)
					&& !record.will_expire_soon_at(now, self.config.policy.expiry_margin)
				{
					self.refresh_metrics.record_coalesced();

					return Credentials::try_from(&record)
						.map_err(|e| ConfigError::from(e).into());
				}

				let refresh_token = record
					.refresh_token
					.as_deref()
					.filter(|token| !token.is_empty())
					.ok_or(ConfigError::MissingRefreshToken)?;

				self.refresh_metrics.record_exchange();

				let credentials = self.facade.refresh(refresh_token).await?;

				self.persist(&credentials).await?;

				Ok(credentials)
			})
			.await;

		match &result {
			Ok(_) => self.refresh_metrics.record_success(),
			Err(_) => self.refresh_metrics.record_failure(),
		}

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}

	/// Runs [`Self::refresh_after`] on its own task so dropping the caller's future does
	/// not abort the token exchange. A panic in that task surfaces as [`Error::Aborted`].
	pub(crate) async fn refresh_detached(&self, stale: Option<String>) -> Result<Credentials> {
		let runtime = self.runtime().ok_or(ConfigError::MissingRuntime)?;
		let authority = self.clone();
		let task = runtime.spawn(async move { authority.refresh_after(stale.as_deref()).await });

		task.await.unwrap_or_else(|e| Err(e.into()))
	}

	async fn persist(&self, credentials: &Credentials) -> Result<()> {
		let record = credentials.to_record().map_err(ConfigError::from)?;

		self.store.save(record).await.map_err(Into::into)
	}

	fn notify(&self, f: impl Fn(&dyn SignInObserver)) {
		let observers = self.observers.read().clone();

		for observer in &observers {
			f(observer.as_ref());
		}
	}
}
impl Debug for TokenAuthority {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenAuthority")
			.field("scope", &self.config.scope)
			.field("token_endpoint", &self.config.endpoints.token.as_str())
			.field("refresh_metrics", &self.refresh_metrics)
			.finish()
	}
}
