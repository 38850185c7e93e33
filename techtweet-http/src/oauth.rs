//! OAuth 1.0a request signing (HMAC-SHA1), as required by X/Twitter user-context endpoints.
//!
//! Only query-string parameters and caller-supplied form parameters take part in the
//! signature. JSON and multipart bodies are never signed.

use std::fmt;

use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::{Method, Url};
use sha1::Sha1;

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const NONCE_LEN: usize = 32;

/// The four secrets of a user-context OAuth 1.0a session.
#[derive(Clone, Default)]
pub struct OAuth1Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub token: String,
    pub token_secret: String,
}

impl fmt::Debug for OAuth1Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuth1Credentials")
            .field("consumer_key", &"<redacted>")
            .field("consumer_secret", &"<redacted>")
            .field("token", &"<redacted>")
            .field("token_secret", &"<redacted>")
            .finish()
    }
}

impl OAuth1Credentials {
    pub fn new(
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            token: token.into(),
            token_secret: token_secret.into(),
        }
    }

    /// Name of the first blank field, if any.
    pub fn first_missing(&self) -> Option<&'static str> {
        [
            ("consumer_key", &self.consumer_key),
            ("consumer_secret", &self.consumer_secret),
            ("token", &self.token),
            ("token_secret", &self.token_secret),
        ]
        .into_iter()
        .find(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
    }
}

/// Build an `Authorization` header value with a fresh nonce and the current time.
pub fn authorization_header(
    creds: &OAuth1Credentials,
    method: &Method,
    url: &Url,
    extra_params: &[(&str, &str)],
) -> String {
    let nonce: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    authorization_header_with(creds, method, url, extra_params, &nonce, timestamp)
}

/// Deterministic variant of [`authorization_header`].
pub fn authorization_header_with(
    creds: &OAuth1Credentials,
    method: &Method,
    url: &Url,
    extra_params: &[(&str, &str)],
    nonce: &str,
    timestamp: u64,
) -> String {
    let timestamp = timestamp.to_string();
    let oauth_params: Vec<(&str, &str)> = vec![
        ("oauth_consumer_key", creds.consumer_key.trim()),
        ("oauth_nonce", nonce),
        ("oauth_signature_method", "HMAC-SHA1"),
        ("oauth_timestamp", timestamp.as_str()),
        ("oauth_token", creds.token.trim()),
        ("oauth_version", "1.0"),
    ];

    let mut all: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    all.extend(
        oauth_params
            .iter()
            .chain(extra_params.iter())
            .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
    );

    let base = signature_base_string(method, url, &all);
    let signature = sign(&base, creds);

    let mut header = String::from("OAuth ");
    let rendered: Vec<String> = oauth_params
        .iter()
        .map(|(k, v)| (*k, *v))
        .chain(std::iter::once(("oauth_signature", signature.as_str())))
        .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
        .collect();
    header.push_str(&rendered.join(", "));
    header
}

/// `METHOD&encoded(base_url)&encoded(sorted_params)`.
pub fn signature_base_string(method: &Method, url: &Url, params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (encode(k), encode(v)))
        .collect();
    encoded.sort();
    let param_string = encoded
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.as_str().to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&param_string)
    )
}

fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

fn sign(base: &str, creds: &OAuth1Credentials) -> String {
    let key = format!(
        "{}&{}",
        encode(creds.consumer_secret.trim()),
        encode(creds.token_secret.trim())
    );
    // HMAC accepts keys of any length.
    let mut mac = match Hmac::<Sha1>::new_from_slice(key.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(base.as_bytes());
    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference request from X's "Creating a signature" guide.
    fn reference() -> (OAuth1Credentials, Url) {
        let creds = OAuth1Credentials::new(
            "xvz1evFS4wEEPTGEFPHBog",
            "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw",
            "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb",
            "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE",
        );
        let url =
            Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
                .unwrap();
        (creds, url)
    }

    const STATUS: &str = "Hello Ladies + Gentlemen, a signed OAuth request!";
    const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
    const TS: u64 = 1318622958;

    #[test]
    fn base_string_matches_reference() {
        let (creds, url) = reference();
        let params: Vec<(String, String)> = vec![
            ("include_entities".into(), "true".into()),
            ("oauth_consumer_key".into(), creds.consumer_key.clone()),
            ("oauth_nonce".into(), NONCE.into()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), TS.to_string()),
            ("oauth_token".into(), creds.token.clone()),
            ("oauth_version".into(), "1.0".into()),
            ("status".into(), STATUS.into()),
        ];
        let base = signature_base_string(&Method::POST, &url, &params);
        assert_eq!(
            base,
            "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520a%2520signed%2520OAuth%2520request%2521"
        );
        assert_eq!(sign(&base, &creds), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn header_carries_encoded_signature() {
        let (creds, url) = reference();
        let header =
            authorization_header_with(&creds, &Method::POST, &url, &[("status", STATUS)], NONCE, TS);
        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(!header.contains(&creds.consumer_secret));
    }

    #[test]
    fn fresh_nonce_changes_header() {
        let (creds, url) = reference();
        let a = authorization_header(&creds, &Method::GET, &url, &[]);
        let b = authorization_header(&creds, &Method::GET, &url, &[]);
        assert_ne!(a, b);
    }

    #[test]
    fn reports_first_missing_field() {
        let creds = OAuth1Credentials::new("k", "s", " ", "");
        assert_eq!(creds.first_missing(), Some("token"));
        assert_eq!(reference().0.first_missing(), None);
    }

    #[test]
    fn debug_does_not_leak() {
        let (creds, _) = reference();
        let dbg = format!("{creds:?}");
        assert!(!dbg.contains("xvz1evFS4wEEPTGEFPHBog"));
    }
}
