// File: ./src/client/transport.rs
// HTTPS client construction shared by the task service and CalDAV clients.
use crate::client::cert::NoVerifier;
use http::Uri;
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use std::sync::Arc;

pub type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, String>;

pub fn user_agent() -> String {
    format!("todoist-caldav/{}", env!("CARGO_PKG_VERSION"))
}

/// Builds the HTTP(S) client for `uri`.
///
/// System roots are only required when the target actually speaks https.
pub fn build_https_client(uri: &Uri, insecure: bool) -> Result<HttpsClient, String> {
    let tls_config_builder = rustls::ClientConfig::builder();

    let tls_config = if insecure {
        tls_config_builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(NoVerifier))
            .with_no_client_auth()
    } else {
        let mut root_store = rustls::RootCertStore::empty();
        let result = rustls_native_certs::load_native_certs();
        for err in &result.errors {
            log::debug!("Skipping native certificate: {}", err);
        }
        root_store.add_parsable_certificates(result.certs);
        if root_store.is_empty() && uri.scheme_str() == Some("https") {
            return Err("No valid system certificates found.".to_string());
        }
        tls_config_builder
            .with_root_certificates(root_store)
            .with_no_client_auth()
    };

    let https_connector = HttpsConnectorBuilder::new()
        .with_tls_config(tls_config)
        .https_or_http()
        .enable_http1()
        .build();

    Ok(Client::builder(TokioExecutor::new()).build(https_connector))
}
