//! Pooled HTTP transport with early response heads.
//!
//! [`NetworkStreamExecutor`] translates an abstract [`HttpRequest`]
//! into the transport's request type, submits it with a deadline, and
//! awaits **only the response head**. The body is handed to a detached
//! task that pumps transport chunks into the caller's sink — this
//! head/body decoupling is what lets scripts consume a response before
//! the full body lands.
//!
//! Automatic redirect following is disabled at transport construction;
//! redirect policy belongs to a higher layer. No mid-stream
//! cancellation reaches a detached pump: it runs to completion or
//! error, and a sink that was closed early simply drops the late
//! chunks (no upstream stop signal — documented limitation).

use std::sync::Arc;

use futures_util::StreamExt;
use sluice_stream::{
    HeaderMap, HttpRequest, HttpVersion, RequestBody, ResponseHead, StreamError, StreamSink,
};

use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::upload::{upload_stream, PullSource};

/// HTTP request executor over a pooled transport client.
pub struct NetworkStreamExecutor {
    client: reqwest::Client,
    default_timeout: std::time::Duration,
}

impl NetworkStreamExecutor {
    /// Build the pooled client. Redirects are disabled here, once, for
    /// every request this executor will ever issue.
    pub fn new(config: &HostConfig) -> HostResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build()
            .map_err(|e| HostError::Transport(format!("client construction failed: {e}")))?;
        Ok(Self {
            client,
            default_timeout: config.default_timeout,
        })
    }

    /// Issue a request with a fixed (or empty) body.
    ///
    /// Returns the head as soon as it arrives; body chunks flow into
    /// `sink` from a detached task, ending in `close()` on natural
    /// completion or `error()` on mid-body failure.
    pub async fn execute(
        &self,
        request: HttpRequest,
        sink: Arc<dyn StreamSink>,
    ) -> HostResult<ResponseHead> {
        let builder = self.translate(request, None)?;
        self.dispatch(builder, sink).await
    }

    /// Upload variant: the body is a lazily produced, unknown-length
    /// chunk sequence pulled from the script side.
    ///
    /// The request must not also carry a fixed body — a request with
    /// both is rejected rather than having one silently discarded.
    pub async fn execute_upload(
        &self,
        request: HttpRequest,
        source: impl PullSource,
        sink: Arc<dyn StreamSink>,
    ) -> HostResult<ResponseHead> {
        if !request.body().is_empty() {
            return Err(HostError::UploadProtocol(
                "streaming upload cannot also carry a fixed request body".to_string(),
            ));
        }
        let body = reqwest::Body::wrap_stream(upload_stream(source));
        let builder = self.translate(request, Some(body))?;
        self.dispatch(builder, sink).await
    }

    /// Translate the abstract request. URL validation happens first,
    /// before any native call.
    fn translate(
        &self,
        request: HttpRequest,
        upload: Option<reqwest::Body>,
    ) -> HostResult<reqwest::RequestBuilder> {
        let (method, url, headers, timeout, body) = request.into_parts();

        let url = reqwest::Url::parse(&url).map_err(|e| HostError::InvalidUrl(format!("{url}: {e}")))?;
        let method = reqwest::Method::from_bytes(method.as_bytes())
            .map_err(|e| HostError::Transport(format!("invalid method {method}: {e}")))?;

        let mut builder = self
            .client
            .request(method, url)
            .timeout(timeout.unwrap_or(self.default_timeout));
        for header in headers.iter() {
            builder = builder.header(header.name.as_str(), header.value.as_str());
        }

        builder = match (upload, body) {
            (Some(upload_body), _) => builder.body(upload_body),
            (None, RequestBody::Fixed(bytes)) => builder.body(bytes),
            (None, RequestBody::Empty) => builder,
        };
        Ok(builder)
    }

    /// Submit, await the head, detach the body pump.
    async fn dispatch(
        &self,
        builder: reqwest::RequestBuilder,
        sink: Arc<dyn StreamSink>,
    ) -> HostResult<ResponseHead> {
        let response = builder.send().await.map_err(transport_failure)?;
        let head = response_head(&response);
        tracing::debug!(status = head.status(), "response head received; detaching body pump");

        tokio::spawn(pump_body(response, sink));
        Ok(head)
    }
}

/// Forward body chunks into the sink until the transport is done.
///
/// Zero-length transport chunks are skipped so that "empty chunk"
/// never reaches a consumer mid-stream — network completion is always
/// the explicit terminal event.
async fn pump_body(response: reqwest::Response, sink: Arc<dyn StreamSink>) {
    let mut body = Box::pin(response.bytes_stream());
    while let Some(next) = body.next().await {
        match next {
            Ok(chunk) => {
                if chunk.is_empty() {
                    continue;
                }
                if sink.is_closed() {
                    tracing::debug!(dropped = chunk.len(), "sink closed; dropping body chunk");
                }
                sink.enqueue(chunk);
            }
            Err(e) => {
                tracing::debug!(error = %e, "body stream failed mid-pump");
                sink.error(StreamError::new(format!("body stream failed: {e}")));
                return;
            }
        }
    }
    sink.close();
}

fn transport_failure(e: reqwest::Error) -> HostError {
    if e.is_timeout() {
        HostError::Transport(format!("deadline exceeded: {e}"))
    } else {
        HostError::Transport(e.to_string())
    }
}

fn response_head(response: &reqwest::Response) -> ResponseHead {
    let mut headers = HeaderMap::new();
    for (name, value) in response.headers() {
        headers.insert(
            name.as_str(),
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        );
    }
    ResponseHead::new(
        response.status().as_u16(),
        map_version(response.version()),
        headers,
    )
}

fn map_version(version: reqwest::Version) -> HttpVersion {
    if version == reqwest::Version::HTTP_09 {
        HttpVersion::Http09
    } else if version == reqwest::Version::HTTP_10 {
        HttpVersion::Http10
    } else if version == reqwest::Version::HTTP_2 {
        HttpVersion::H2
    } else if version == reqwest::Version::HTTP_3 {
        HttpVersion::H3
    } else {
        HttpVersion::Http11
    }
}
