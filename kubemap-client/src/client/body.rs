//! Bodies of discovery requests and responses.
//!
//! Discovery only ever sends small, fully buffered `GET` bodies,
//! and reads every response to the end before parsing it.
use bytes::Bytes;
use http_body_util::{combinators::UnsyncBoxBody, BodyExt, Full};
use tower::BoxError;

use super::is_timeout;
use crate::{Error, Result};

/// Body sent with a discovery request
pub type RequestBody = Full<Bytes>;

/// Type erased body of an apiserver response
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

pub(crate) fn boxed<B>(body: B) -> ResponseBody
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    body.map_err(Into::into).boxed_unsync()
}

/// Reads a response body to the end as utf-8 text.
///
/// A body that stalls past the read timeout fails with [`Error::ReadTimeout`].
pub(crate) async fn read_text(body: ResponseBody) -> Result<String> {
    let bytes = body
        .collect()
        .await
        .map_err(|err| {
            if is_timeout(&*err) {
                Error::ReadTimeout(err)
            } else {
                Error::Service(err)
            }
        })?
        .to_bytes();
    String::from_utf8(bytes.to_vec()).map_err(Error::FromUtf8)
}
