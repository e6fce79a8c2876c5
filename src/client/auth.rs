// Implements HTTP authentication for the CalDAV client: Basic first, Digest on challenge.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use digest_auth::{AuthContext, HttpMethod};
use http::{HeaderValue, Request, Response, StatusCode};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tower_service::Service;

/// `Authorization` value for Basic auth.
pub fn basic_header(user: &str, pass: &str) -> Option<HeaderValue> {
    let mut val =
        HeaderValue::from_str(&format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass))))
            .ok()?;
    val.set_sensitive(true);
    Some(val)
}

/// `Authorization` value answering a `WWW-Authenticate: Digest ...` challenge.
/// Returns `None` for non-Digest or unparseable challenges.
pub fn digest_header(
    challenge: &str,
    user: &str,
    pass: &str,
    method: &str,
    path: &str,
) -> Option<HeaderValue> {
    if !challenge.to_lowercase().starts_with("digest") {
        return None;
    }
    // auth-int is rare for CalDAV; the body is not hashed.
    let body_bytes: Option<&[u8]> = None;
    let context =
        AuthContext::new_with_method(user, pass, path, body_bytes, HttpMethod::from(method));
    let mut prompt = digest_auth::parse(challenge).ok()?;
    let answer = prompt.respond(&context).ok()?;
    let mut val = HeaderValue::from_str(&answer.to_string()).ok()?;
    val.set_sensitive(true);
    Some(val)
}

#[derive(Clone, Debug)]
pub struct DynamicAuthLayer {
    pub user: String,
    pub pass: String,
}

impl DynamicAuthLayer {
    pub fn new(user: String, pass: String) -> Self {
        Self { user, pass }
    }
}

impl<S> tower_layer::Layer<S> for DynamicAuthLayer {
    type Service = DynamicAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        DynamicAuthService {
            inner,
            user: self.user.clone(),
            pass: self.pass.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DynamicAuthService<S> {
    inner: S,
    user: String,
    pass: String,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for DynamicAuthService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: std::error::Error + Send + Sync + 'static,
    ReqBody: Clone + Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        if let Some(val) = basic_header(&self.user, &self.pass) {
            req.headers_mut().insert(http::header::AUTHORIZATION, val);
        }

        let retry = req.clone();
        let mut inner = self.inner.clone();
        let user = self.user.clone();
        let pass = self.pass.clone();

        Box::pin(async move {
            let response = inner.call(req).await?;
            if response.status() != StatusCode::UNAUTHORIZED {
                return Ok(response);
            }

            let challenge = response
                .headers()
                .get(http::header::WWW_AUTHENTICATE)
                .and_then(|h| h.to_str().ok());
            let Some(val) = challenge.and_then(|c| {
                digest_header(
                    c,
                    &user,
                    &pass,
                    retry.method().as_str(),
                    retry.uri().path(),
                )
            }) else {
                return Ok(response);
            };

            log::debug!("Retrying {} with Digest auth", retry.uri().path());
            let mut retry = retry;
            retry
                .headers_mut()
                .insert(http::header::AUTHORIZATION, val);
            inner.call(retry).await
        })
    }
}
