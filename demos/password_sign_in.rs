//! Signs in with the resource-owner password grant, persists the tokens to a JSON file, and
//! walks the first pages of the user's library.
//!
//! Reads `MENDELEY_CLIENT_ID`, `MENDELEY_CLIENT_SECRET`, `MENDELEY_REDIRECT_URI`,
//! `MENDELEY_USERNAME`, and `MENDELEY_PASSWORD` from the environment.

// std
use std::{env, sync::Arc};
// crates.io
use color_eyre::{Result, eyre::WrapErr};
use url::Url;
// self
use mendeley_client::{
	Client,
	api::{DocumentQuery, DocumentSort, SortOrder},
	auth::ClientCredentials,
	config::ClientConfig,
	store::FileStore,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let credentials = ClientCredentials::new(
		env::var("MENDELEY_CLIENT_ID").wrap_err("MENDELEY_CLIENT_ID is not set")?,
		env::var("MENDELEY_CLIENT_SECRET").wrap_err("MENDELEY_CLIENT_SECRET is not set")?,
		Url::parse(&env::var("MENDELEY_REDIRECT_URI").wrap_err("MENDELEY_REDIRECT_URI is not set")?)?,
	);
	let config = ClientConfig::builder(credentials).build()?;
	let store = Arc::new(FileStore::open("mendeley-tokens.json")?);
	let client = Client::new(config, store)?;

	if !client.authority().is_signed_in().await {
		let signed_in = client
			.authority()
			.sign_in_with_password(env::var("MENDELEY_USERNAME")?, env::var("MENDELEY_PASSWORD")?)
			.await?;

		println!("Signed in; token expires at {:?}.", signed_in.expires_at);
	}

	let profile = client.profiles().me().await?;

	println!("Library of {}.", profile.payload.display_name.as_deref().unwrap_or("unknown user"));

	let query = DocumentQuery::default().limit(20).sort(DocumentSort::LastModified, SortOrder::Desc);
	let mut page = client.documents().list(&query).await?;

	for _ in 0..3 {
		for document in &page.items {
			println!("- {}", document.title.as_deref().unwrap_or("(untitled)"));
		}

		if !page.has_next() {
			break;
		}

		page = client.next_page(&page).await?;
	}

	Ok(())
}
