use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::BodyExt;
use http_body_util::combinators::{BoxBody, UnsyncBoxBody};
use hyper::Request;
use serde::de::DeserializeOwned;

/// Body type handlers receive. Connections hand over `Incoming`; tests hand
/// over in-memory bodies.
pub type RequestBody = UnsyncBoxBody<Bytes, hyper::Error>;

pub type ResponseBody = BoxBody<Bytes, Infallible>;

pub type HttpResult = Result<hyper::Response<ResponseBody>>;

/// Read the whole request body.
pub async fn collect_body(req: Request<RequestBody>) -> Result<Bytes> {
    let body = req
        .into_body()
        .collect()
        .await
        .context("Failed to read request body")?
        .to_bytes();
    Ok(body)
}

/// Read the request body and parse it as JSON.
pub async fn parse_json_body<T: DeserializeOwned>(req: Request<RequestBody>) -> Result<T> {
    let body = collect_body(req).await?;
    serde_json::from_slice(&body).context("Request body is not valid JSON")
}
