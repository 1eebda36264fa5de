//! Body codecs plugged into the request procedure.
//!
//! A [`Decoder`] is a plain function pointer so call descriptions stay `Copy` and can be
//! replayed after a token refresh without capturing any state.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::_prelude::*;

/// Decoding failure carrying the JSON path where it happened.
pub type DecodeFailure = serde_path_to_error::Error<serde_json::Error>;
/// Converts a response body into the caller's payload type.
pub type Decoder<T> = fn(&[u8]) -> Result<T, DecodeFailure>;

/// Decodes a JSON body into `T`, tracking the path of any mismatch.
pub fn json<T>(body: &[u8]) -> Result<T, DecodeFailure>
where
	T: DeserializeOwned,
{
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer)
}

/// Ignores the body; used for 204 answers.
pub fn empty(_body: &[u8]) -> Result<(), DecodeFailure> {
	Ok(())
}

/// Returns the raw body bytes; used for file downloads.
pub fn bytes(body: &[u8]) -> Result<Vec<u8>, DecodeFailure> {
	Ok(body.to_vec())
}

/// Serializes a request payload as JSON.
pub fn encode_json<T>(value: &T) -> Result<Vec<u8>>
where
	T: ?Sized + Serialize,
{
	serde_json::to_vec(value).map_err(Error::Encode)
}
