//! Interactive halves of the OAuth flows: a one-shot local redirect
//! listener and a copy/paste prompt.

use std::io::Write as _;

use async_trait::async_trait;
use qcloud_client::{ClientError, OauthFlow};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

const CALLBACK_PATH: &str = "/callback";
const SUCCESS_PAGE: &str = "<html><body><p>Login complete. You can close this tab and return to the terminal.</p></body></html>";

/// Listens on an ephemeral localhost port for the authorization redirect.
///
/// The listener is bound at construction so the redirect URI is known before
/// the authorization URL is built.
pub struct RedirectFlow {
    listener: Mutex<Option<TcpListener>>,
    redirect_uri: String,
}

impl RedirectFlow {
    pub async fn bind() -> Result<Self, ClientError> {
        let listener = TcpListener::bind(("127.0.0.1", 0))
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("cannot bind callback listener: {e}")))?;
        let addr = listener
            .local_addr()
            .map_err(|e| ClientError::InvalidResponse(format!("cannot bind callback listener: {e}")))?;
        Ok(Self {
            listener: Mutex::new(Some(listener)),
            redirect_uri: format!("http://{addr}{CALLBACK_PATH}"),
        })
    }
}

#[async_trait]
impl OauthFlow for RedirectFlow {
    fn redirect_uri(&self) -> String {
        self.redirect_uri.clone()
    }

    async fn run_redirect_flow(
        &self,
        authorize_url: &str,
        state: &str,
    ) -> Result<String, ClientError> {
        let listener = self
            .listener
            .lock()
            .await
            .take()
            .ok_or_else(|| ClientError::InvalidResponse("redirect flow already consumed".into()))?;

        println!("Visit this URL to authorize:\n\n  {authorize_url}\n");
        println!("Waiting for the authorization redirect...");

        let (mut stream, _) = listener
            .accept()
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("callback listener: {e}")))?;

        let mut request = vec![0u8; 4096];
        let n = stream
            .read(&mut request)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("callback listener: {e}")))?;
        let (code, received_state) = parse_callback(&String::from_utf8_lossy(&request[..n]))?;

        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{SUCCESS_PAGE}",
            SUCCESS_PAGE.len()
        );
        // The user already sees the outcome in the terminal; a failed write
        // to the browser is not worth failing the login over.
        let _ = stream.write_all(response.as_bytes()).await;

        if received_state != state {
            return Err(ClientError::RemoteRejected {
                reason: "authorization response state mismatch".into(),
            });
        }
        Ok(code)
    }

    async fn run_oob_flow(&self, authorize_url: &str) -> Result<String, ClientError> {
        println!("Visit this URL to authorize:\n\n  {authorize_url}\n");
        print!("Authorization code: ");
        std::io::stdout()
            .flush()
            .map_err(|e| ClientError::InvalidResponse(format!("terminal: {e}")))?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await
            .map_err(|e| ClientError::InvalidResponse(format!("terminal: {e}")))?;
        let code = line.trim();
        if code.is_empty() {
            return Err(ClientError::Precondition {
                reason: "no authorization code entered".into(),
            });
        }
        Ok(code.to_string())
    }
}

/// Pull `code` and `state` out of the first request line of the redirect.
fn parse_callback(request: &str) -> Result<(String, String), ClientError> {
    let malformed = || ClientError::InvalidResponse("malformed authorization redirect".into());

    let path = request
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .ok_or_else(malformed)?;
    let url = Url::parse(&format!("http://localhost{path}")).map_err(|_| malformed())?;

    let mut code = None;
    let mut state = None;
    let mut error = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            "error" => error = Some(value.into_owned()),
            _ => {}
        }
    }
    if let Some(error) = error {
        return Err(ClientError::RemoteRejected {
            reason: format!("authorization denied: {error}"),
        });
    }
    match (code, state) {
        (Some(code), Some(state)) => Ok((code, state)),
        _ => Err(malformed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_and_state_from_the_request_line() {
        let request = "GET /callback?code=abc&state=xyz HTTP/1.1\r\nHost: localhost\r\n\r\n";
        let (code, state) = parse_callback(request).unwrap();
        assert_eq!(code, "abc");
        assert_eq!(state, "xyz");
    }

    #[test]
    fn denial_surfaces_the_error_parameter() {
        let request = "GET /callback?error=access_denied&state=xyz HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_callback(request),
            Err(ClientError::RemoteRejected { .. })
        ));
    }

    #[test]
    fn missing_code_is_malformed() {
        let request = "GET /callback?state=xyz HTTP/1.1\r\n\r\n";
        assert!(matches!(
            parse_callback(request),
            Err(ClientError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn redirect_uri_is_known_before_the_flow_runs() {
        let flow = RedirectFlow::bind().await.unwrap();
        let uri = flow.redirect_uri();
        assert!(uri.starts_with("http://127.0.0.1:"));
        assert!(uri.ends_with("/callback"));
    }
}
