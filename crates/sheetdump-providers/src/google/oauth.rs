//! OAuth 2.0 installed-app flow for Google APIs.
//!
//! This module implements the Authorization Code flow with PKCE (Proof Key for
//! Code Exchange), using a loopback redirect as recommended for desktop tools.
//!
//! # Flow Overview
//!
//! 1. Generate a code verifier and its SHA-256 challenge
//! 2. Start a local HTTP listener on an ephemeral port
//! 3. Open the user's browser to the consent page
//! 4. The consent page redirects to the listener with an authorization code
//! 5. Exchange the code (with verifier) for access and refresh tokens
//!
//! The token endpoint is also used to renew an expired access token with the
//! stored refresh token.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng as _;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::{GoogleConfig, OAuthCredentials};
use super::credential::Credential;

/// The PKCE code verifier length (in bytes, before base64 encoding).
const CODE_VERIFIER_LENGTH: usize = 32;

/// Path the loopback listener expects the redirect on.
const CALLBACK_PATH: &str = "/callback";

/// OAuth client for Google APIs.
///
/// Handles the consent flow and refreshing of access tokens.
#[derive(Debug)]
pub struct OAuthClient {
    credentials: OAuthCredentials,
    http_client: reqwest::Client,
    auth_url: String,
    token_url: String,
}

/// Token endpoint answer to a refresh request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedToken {
    /// The new access token.
    pub access_token: String,
    /// Lifetime of the new access token, in seconds.
    pub expires_in: Option<i64>,
    /// A replacement refresh token, when the server rotates it.
    pub refresh_token: Option<String>,
}

impl OAuthClient {
    /// Creates a new OAuth client using the endpoints from `config`.
    pub fn new(credentials: OAuthCredentials, config: &GoogleConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("failed to create HTTP client");

        Self {
            credentials,
            http_client,
            auth_url: config.auth_url.clone(),
            token_url: config.token_url.clone(),
        }
    }

    /// Runs the browser consent flow and returns a fresh credential.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No port is available in the specified range
    /// - The user denies authorization or never completes it within
    ///   `callback_timeout`
    /// - The redirect does not carry the expected state
    /// - Token exchange fails
    pub async fn authorize(
        &self,
        scopes: &[String],
        port_range: (u16, u16),
        callback_timeout: Duration,
    ) -> ProviderResult<Credential> {
        let pkce = PkceFlow::new();

        let (listener, port) = bind_loopback_server(port_range)?;
        let redirect_uri = format!("http://127.0.0.1:{}{}", port, CALLBACK_PATH);

        let auth_url = pkce.build_auth_url(
            &self.auth_url,
            &self.credentials.client_id,
            &redirect_uri,
            scopes,
        );

        info!("starting OAuth flow, opening browser...");
        debug!("authorization URL: {}", auth_url);

        if let Err(e) = open::that(&auth_url) {
            warn!("failed to open browser: {}", e);
        }
        // Print URL for manual copy
        eprintln!("\nIf the browser did not open, visit this URL:\n\n{}\n", auth_url);

        let (code, received_state) = wait_for_callback(listener, callback_timeout)?;

        if received_state != pkce.state {
            return Err(ProviderError::authentication(
                "OAuth state mismatch, refusing authorization code",
            ));
        }

        info!("received authorization code, exchanging for tokens...");
        self.exchange_code(&code, &pkce.verifier, &redirect_uri, scopes)
            .await
    }

    /// Obtains a new access token using `refresh_token`.
    ///
    /// # Errors
    ///
    /// A `400`/`401` answer means the refresh token was revoked or expired and
    /// is reported as an authentication error. Connection problems are network
    /// errors and leave the refresh token usable.
    pub async fn refresh_token(&self, refresh_token: &str) -> ProviderResult<RefreshedToken> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        let token_response = self.post_token_request(&params, "token refresh").await?;

        info!("successfully refreshed access token");
        Ok(RefreshedToken {
            access_token: token_response.access_token,
            expires_in: token_response.expires_in,
            refresh_token: token_response.refresh_token,
        })
    }

    /// Exchanges an authorization code for tokens.
    async fn exchange_code(
        &self,
        code: &str,
        verifier: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> ProviderResult<Credential> {
        let params = [
            ("client_id", self.credentials.client_id.as_str()),
            ("client_secret", self.credentials.client_secret.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
        ];

        let token_response = self.post_token_request(&params, "token exchange").await?;

        // Google returns the granted scopes; fall back to what was requested.
        let granted = token_response
            .scope
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_else(|| scopes.to_vec());

        info!("successfully obtained tokens");
        Ok(Credential::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
            granted,
        ))
    }

    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
        what: &str,
    ) -> ProviderResult<TokenResponse> {
        let response = self
            .http_client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| {
                ProviderError::network(format!("{} request failed: {}", what, e))
                    .with_provider("google")
                    .with_source(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            ProviderError::network(format!("failed to read response: {}", e))
                .with_provider("google")
        })?;

        if !status.is_success() {
            let message = format!("{} failed ({}): {}", what, status, body);
            let err = match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                    ProviderError::authentication(message)
                }
                _ => ProviderError::server(message),
            };
            return Err(err.with_provider("google"));
        }

        serde_json::from_str(&body).map_err(|e| {
            ProviderError::invalid_response(format!("invalid token response: {}", e))
                .with_provider("google")
        })
    }
}

/// Binds a TCP listener on loopback.
///
/// A `(0, 0)` range asks the OS for an ephemeral port; otherwise each port in
/// the range is tried in turn.
fn bind_loopback_server(port_range: (u16, u16)) -> ProviderResult<(TcpListener, u16)> {
    for port in port_range.0..=port_range.1 {
        let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) else {
            continue;
        };
        let bound = listener
            .local_addr()
            .map_err(|e| ProviderError::internal(format!("failed to read local address: {}", e)))?
            .port();
        debug!("bound loopback server on port {}", bound);
        return Ok((listener, bound));
    }
    Err(ProviderError::configuration(format!(
        "no available port in range {}-{}",
        port_range.0, port_range.1
    )))
}

/// Waits for the OAuth redirect and extracts the authorization code and state.
fn wait_for_callback(
    listener: TcpListener,
    timeout: Duration,
) -> ProviderResult<(String, String)> {
    listener
        .set_nonblocking(false)
        .map_err(|e| ProviderError::internal(format!("failed to set blocking: {}", e)))?;

    let (tx, rx) = mpsc::channel();

    // The accept loop blocks, so it runs on its own thread and the timeout is
    // enforced on the receiving side.
    let _handle = thread::spawn(move || {
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => {
                    if let Some(result) = handle_callback(stream) {
                        let _ = tx.send(result);
                        return;
                    }
                }
                Err(e) => {
                    error!("failed to accept connection: {}", e);
                }
            }
        }
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(mpsc::RecvTimeoutError::Timeout) => Err(ProviderError::authentication(format!(
            "no authorization received within {} seconds",
            timeout.as_secs()
        ))),
        Err(mpsc::RecvTimeoutError::Disconnected) => {
            Err(ProviderError::internal("callback channel disconnected"))
        }
    }
}

/// Handles one HTTP request on the loopback listener.
///
/// Returns `None` for requests that are not the redirect (favicon and the
/// like), so the listener keeps waiting.
fn handle_callback(mut stream: TcpStream) -> Option<ProviderResult<(String, String)>> {
    let mut reader = BufReader::new(&stream);
    let mut request_line = String::new();

    if reader.read_line(&mut request_line).is_err() {
        return None;
    }

    let target = parse_request_target(&request_line)?;
    let params = parse_callback_query(target);

    let response = if params.error.is_some() || params.code.is_none() {
        "HTTP/1.1 400 Bad Request\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>Authorization Failed</h1>\
        <p>You can close this window.</p></body></html>"
    } else {
        "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nConnection: close\r\n\r\n\
        <html><body><h1>Authorization Successful</h1>\
        <p>You can close this window and return to the terminal.</p></body></html>"
    };

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();

    Some(params.into_result())
}

/// Returns the target of a `GET /callback...` request line.
fn parse_request_target(request_line: &str) -> Option<&str> {
    let mut parts = request_line.split_whitespace();
    if parts.next()? != "GET" {
        return None;
    }
    let target = parts.next()?;
    let path = target.split('?').next().unwrap_or_default();
    (path == CALLBACK_PATH).then_some(target)
}

#[derive(Debug, Default, PartialEq, Eq)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

impl CallbackParams {
    fn into_result(self) -> ProviderResult<(String, String)> {
        if let Some(error) = self.error {
            let message = match self.error_description {
                Some(description) => format!("authorization denied: {} ({})", error, description),
                None => format!("authorization denied: {}", error),
            };
            return Err(ProviderError::authentication(message));
        }

        match self.code {
            Some(code) => Ok((code, self.state.unwrap_or_default())),
            None => Err(ProviderError::authentication(
                "missing authorization code in callback",
            )),
        }
    }
}

fn parse_callback_query(target: &str) -> CallbackParams {
    let query = target.split_once('?').map(|(_, q)| q).unwrap_or_default();
    let mut params = CallbackParams::default();

    for param in query.split('&') {
        let Some((key, value)) = param.split_once('=') else {
            continue;
        };
        // Form encoding: '+' is a space
        let value = value.replace('+', " ");
        let value = urlencoding::decode(&value).unwrap_or_default().into_owned();
        match key {
            "code" => params.code = Some(value),
            "state" => params.state = Some(value),
            "error" => params.error = Some(value),
            "error_description" => params.error_description = Some(value),
            _ => {}
        }
    }
    params
}

/// PKCE flow state and utilities.
///
/// Implements RFC 7636 (Proof Key for Code Exchange).
#[derive(Debug)]
pub struct PkceFlow {
    /// The code verifier (high-entropy random string).
    pub verifier: String,
    /// The code challenge (SHA-256 hash of verifier, base64url encoded).
    pub challenge: String,
    /// Random state echoed back by the redirect.
    pub state: String,
}

impl PkceFlow {
    /// Creates a new PKCE flow with random verifier and state.
    pub fn new() -> Self {
        let verifier = Self::generate_verifier();
        let challenge = Self::compute_challenge(&verifier);
        let state = Self::generate_state();

        Self {
            verifier,
            challenge,
            state,
        }
    }

    fn generate_verifier() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..CODE_VERIFIER_LENGTH).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    fn compute_challenge(verifier: &str) -> String {
        let digest = Sha256::digest(verifier.as_bytes());
        URL_SAFE_NO_PAD.encode(digest)
    }

    fn generate_state() -> String {
        let mut rng = rand::rng();
        let bytes: Vec<u8> = (0..16).map(|_| rng.random()).collect();
        URL_SAFE_NO_PAD.encode(&bytes)
    }

    /// Builds the consent page URL.
    ///
    /// `access_type=offline` with `prompt=consent` makes Google return a
    /// refresh token even if the user granted access before.
    pub fn build_auth_url(
        &self,
        auth_endpoint: &str,
        client_id: &str,
        redirect_uri: &str,
        scopes: &[String],
    ) -> String {
        let scope = scopes.join(" ");

        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&\
            code_challenge={}&code_challenge_method=S256&state={}&\
            access_type=offline&prompt=consent",
            auth_endpoint,
            urlencoding::encode(client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(&scope),
            urlencoding::encode(&self.challenge),
            urlencoding::encode(&self.state),
        )
    }
}

impl Default for PkceFlow {
    fn default() -> Self {
        Self::new()
    }
}

/// Response from the token endpoint.
#[derive(Debug, serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    scope: Option<String>,
}
