//! AWS Signature Version 4.
//!
//! Two flavours are needed: header signing for the SNS `Publish` call and
//! query-string presigning for the Transcribe streaming websocket URL.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use url::Url;

use super::AwsCredentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// Hex SHA-256 of an empty body
pub const EMPTY_PAYLOAD_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

/// Signs requests for one service in one region.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

impl SigV4Signer {
    pub fn new(credentials: AwsCredentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Headers to attach so that the request is authenticated.
    ///
    /// `headers` are the extra headers the caller sends (they are all signed);
    /// `host` is derived from `url`. Returns `x-amz-date`, the optional
    /// `x-amz-security-token` and `authorization`.
    pub fn sign_headers(
        &self,
        method: &str,
        url: &Url,
        headers: &[(&str, &str)],
        payload: &[u8],
        now: DateTime<Utc>,
    ) -> Vec<(String, String)> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut signed: Vec<(String, String)> = headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), normalize_header_value(value)))
            .collect();
        signed.push(("host".to_string(), host_header(url)));
        signed.push(("x-amz-date".to_string(), amz_date.clone()));
        if let Some(token) = &self.credentials.session_token {
            signed.push(("x-amz-security-token".to_string(), token.clone()));
        }
        signed.sort();

        let signed_header_names = signed
            .iter()
            .map(|(name, _)| name.as_str())
            .collect::<Vec<_>>()
            .join(";");
        let canonical_headers: String = signed
            .iter()
            .map(|(name, value)| format!("{}:{}\n", name, value))
            .collect();

        let query: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        let canonical_request = format!(
            "{}\n{}\n{}\n{}\n{}\n{}",
            method,
            canonical_uri(url),
            canonical_query(&query),
            canonical_headers,
            signed_header_names,
            hex_sha256(payload)
        );

        let scope = self.scope(&date);
        let signature = self.signature(&canonical_request, &amz_date, &date, &scope);

        let mut result = vec![("x-amz-date".to_string(), amz_date)];
        if let Some(token) = &self.credentials.session_token {
            result.push(("x-amz-security-token".to_string(), token.clone()));
        }
        result.push((
            "authorization".to_string(),
            format!(
                "{} Credential={}/{}, SignedHeaders={}, Signature={}",
                ALGORITHM, self.credentials.access_key_id, scope, signed_header_names, signature
            ),
        ));
        result
    }

    /// Presigned copy of `url`, valid for `expires_secs` seconds.
    ///
    /// Only `host` is signed. `payload_hash` is the hex SHA-256 the service
    /// expects for the body; streaming endpoints use the empty-body hash.
    pub fn presign_url(
        &self,
        method: &str,
        url: &Url,
        expires_secs: u64,
        payload_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Url> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();
        let scope = self.scope(&date);

        let mut query: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        query.push(("X-Amz-Algorithm".to_string(), ALGORITHM.to_string()));
        query.push((
            "X-Amz-Credential".to_string(),
            format!("{}/{}", self.credentials.access_key_id, scope),
        ));
        query.push(("X-Amz-Date".to_string(), amz_date.clone()));
        query.push(("X-Amz-Expires".to_string(), expires_secs.to_string()));
        if let Some(token) = &self.credentials.session_token {
            query.push(("X-Amz-Security-Token".to_string(), token.clone()));
        }
        query.push(("X-Amz-SignedHeaders".to_string(), "host".to_string()));

        let canonical_query_string = canonical_query(&query);
        let canonical_request = format!(
            "{}\n{}\n{}\nhost:{}\n\nhost\n{}",
            method,
            canonical_uri(url),
            canonical_query_string,
            host_header(url),
            payload_hash
        );
        let signature = self.signature(&canonical_request, &amz_date, &date, &scope);

        let presigned = format!(
            "{}://{}{}?{}&X-Amz-Signature={}",
            url.scheme(),
            host_header(url),
            url.path(),
            canonical_query_string,
            signature
        );
        Url::parse(&presigned).with_context(|| format!("Failed to build presigned URL for {}", url))
    }

    /// Derived signing key for `date` (`YYYYMMDD`)
    pub fn signing_key(&self, date: &str) -> Vec<u8> {
        let secret = format!("AWS4{}", self.credentials.secret_access_key);
        let k_date = hmac_sha256(secret.as_bytes(), date.as_bytes());
        let k_region = hmac_sha256(&k_date, self.region.as_bytes());
        let k_service = hmac_sha256(&k_region, self.service.as_bytes());
        hmac_sha256(&k_service, b"aws4_request")
    }

    fn scope(&self, date: &str) -> String {
        format!("{}/{}/{}/aws4_request", date, self.region, self.service)
    }

    fn signature(&self, canonical_request: &str, amz_date: &str, date: &str, scope: &str) -> String {
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            amz_date,
            scope,
            hex_sha256(canonical_request.as_bytes())
        );
        hex::encode(hmac_sha256(&self.signing_key(date), string_to_sign.as_bytes()))
    }
}

pub fn hex_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    // Keys of any length are accepted
    HmacSha256::new_from_slice(key)
        .map(|mut mac| {
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        })
        .unwrap_or_default()
}

/// `host[:port]`, with the port only when it is not the scheme default
fn host_header(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

fn canonical_uri(url: &Url) -> String {
    let path = url.path();
    if path.is_empty() || path == "/" {
        return "/".to_string();
    }
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn canonical_query(params: &[(String, String)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (urlencoding::encode(k).into_owned(), urlencoding::encode(v).into_owned()))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
