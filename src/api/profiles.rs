// self
use crate::{
	api::{self, media_type},
	client::{CallHandle, Client},
	codec,
	model::Profile,
	procedure::{RequestDescriptor, Response},
};

/// Caller for `/profiles`.
#[derive(Clone, Copy, Debug)]
pub struct Profiles<'a> {
	client: &'a Client,
}
impl<'a> Profiles<'a> {
	pub(crate) fn new(client: &'a Client) -> Self {
		Self { client }
	}

	/// Profile of the signed-in user.
	pub fn me(&self) -> CallHandle<Response<Profile>> {
		let request = self
			.client
			.api_url("profiles/me")
			.map(|url| RequestDescriptor::get(url).accept(media_type::PROFILE));

		api::call(self.client, request, codec::json)
	}
}
