//! Browser implementation of the HTTP transport over `gloo-net`.

use gloo_net::http::{Request, RequestBuilder};
use js_sys::{Array, Uint8Array};
use percent_encoding::percent_decode_str;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, File, FormData, HtmlDocument};

use crate::config::{XSRF_COOKIE, XSRF_HEADER};
use crate::core::error::SyncError;
use crate::core::remote::{HttpRequest, HttpResponse, HttpTransport, Method, RequestBody};
use crate::models::UploadFile;

/// Sends requests with the page's fetch API. Same-origin cookies are sent
/// by the browser; mutating requests also echo the XSRF token.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchTransport;

impl HttpTransport for FetchTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, SyncError> {
        let HttpRequest { method, url, body } = request;
        let mut builder = builder(method, &url);
        if method != Method::Get
            && let Some(token) = xsrf_token()
        {
            builder = builder.header(XSRF_HEADER, &token);
        }

        let prepared = match body {
            RequestBody::Empty => builder.build(),
            RequestBody::Json(value) => builder.json(&value),
            RequestBody::Upload(file) => builder.body(upload_form(&file)?),
        }
        .map_err(|err| SyncError::transport(err.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|err| SyncError::transport(err.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SyncError::transport(err.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

fn builder(method: Method, url: &str) -> RequestBuilder {
    match method {
        Method::Get => Request::get(url),
        Method::Post => Request::post(url),
        Method::Put => Request::put(url),
        Method::Patch => Request::patch(url),
        Method::Delete => Request::delete(url),
    }
}

fn upload_form(file: &UploadFile) -> Result<FormData, SyncError> {
    let bytes = Uint8Array::from(file.contents.as_slice());
    let blob = Blob::new_with_u8_array_sequence(&Array::of1(&bytes)).map_err(js_error)?;
    let form = FormData::new().map_err(js_error)?;
    form.append_with_blob_and_filename("file", &blob, &file.name)
        .map_err(js_error)?;
    Ok(form)
}

/// Read a file picked in an `<input type="file">` into memory.
pub async fn read_upload(file: File) -> Result<UploadFile, SyncError> {
    let buffer = JsFuture::from(file.array_buffer())
        .await
        .map_err(js_error)?;
    Ok(UploadFile {
        name: file.name(),
        contents: Uint8Array::new(&buffer).to_vec(),
    })
}

fn xsrf_token() -> Option<String> {
    let cookies = web_sys::window()?
        .document()?
        .dyn_into::<HtmlDocument>()
        .ok()?
        .cookie()
        .ok()?;
    cookie_value(&cookies, XSRF_COOKIE)
}

/// Value of cookie `name` in a `document.cookie` string.
pub fn cookie_value(cookies: &str, name: &str) -> Option<String> {
    cookies
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

fn js_error(err: JsValue) -> SyncError {
    SyncError::transport(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_value() {
        let cookies = "theme=dark; XSRF-TOKEN=a1b2%3Dc3; session=xyz";
        assert_eq!(cookie_value(cookies, "XSRF-TOKEN").as_deref(), Some("a1b2=c3"));
        assert_eq!(cookie_value(cookies, "session").as_deref(), Some("xyz"));
        assert_eq!(cookie_value(cookies, "missing"), None);
        assert_eq!(cookie_value("", "XSRF-TOKEN"), None);
    }
}
