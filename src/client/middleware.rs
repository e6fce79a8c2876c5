// File: ./src/client/middleware.rs
//! Tower middleware that stamps fixed headers (User-Agent, bearer token) on every request.
use http::header::{HeaderName, HeaderValue};
use http::Request;
use std::task::{Context, Poll};
use tower_layer::Layer;
use tower_service::Service;

#[derive(Clone, Debug, Default)]
pub struct DefaultHeadersLayer {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl DefaultHeadersLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header. Values that are not valid header text are dropped with a warning.
    pub fn with(mut self, name: HeaderName, value: &str) -> Self {
        match HeaderValue::from_str(value) {
            Ok(mut val) => {
                if name == http::header::AUTHORIZATION {
                    val.set_sensitive(true);
                }
                self.headers.push((name, val));
            }
            Err(_) => log::warn!("Dropping invalid value for header {}", name),
        }
        self
    }
}

impl<S> Layer<S> for DefaultHeadersLayer {
    type Service = DefaultHeadersService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DefaultHeadersService {
            inner,
            headers: self.headers.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DefaultHeadersService<S> {
    inner: S,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl<S, ReqBody> Service<Request<ReqBody>> for DefaultHeadersService<S>
where
    S: Service<Request<ReqBody>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        for (name, value) in &self.headers {
            // Headers set by the caller take precedence.
            if !req.headers().contains_key(name) {
                req.headers_mut().insert(name.clone(), value.clone());
            }
        }
        self.inner.call(req)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::header::{AUTHORIZATION, USER_AGENT};
    use std::convert::Infallible;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_headers_are_added_unless_present() {
        let layer = DefaultHeadersLayer::new()
            .with(USER_AGENT, "todoist-caldav/test")
            .with(AUTHORIZATION, "Bearer abc");
        let svc = layer.layer(tower::service_fn(|req: Request<String>| async move {
            Ok::<_, Infallible>(req.headers().clone())
        }));

        let req = Request::builder()
            .uri("http://example.com/")
            .header(USER_AGENT, "custom")
            .body(String::new())
            .unwrap();
        let headers = svc.oneshot(req).await.unwrap();

        assert_eq!(headers[USER_AGENT], "custom");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn test_invalid_value_is_dropped() {
        let layer = DefaultHeadersLayer::new().with(USER_AGENT, "bad\nvalue");
        assert!(layer.headers.is_empty());
    }
}
