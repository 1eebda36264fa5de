//! Typed async client for the Mendeley reference-management API: OAuth 2.0 sign-in with
//! single-flight token refresh, an authenticated request pipeline, and `Link`-header
//! pagination.
//!
//! Build a [`config::ClientConfig`], pick a [`store::TokenStore`], create a [`Client`], sign
//! in through [`Client::authority`], then issue calls. Every call returns a [`CallHandle`]
//! that can be awaited or cancelled.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod auth;
pub mod authority;
pub mod blocking;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod oauth;
pub mod obs;
pub mod page;
pub mod procedure;
pub mod store;

mod _prelude {
	pub use std::{
		collections::BTreeMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use client::{CallHandle, Client};
pub use error::{Error, ErrorKind, Result};

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _};
