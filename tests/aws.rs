use chrono::{TimeZone, Utc};
use url::Url;

use taskdeck::aws::sigv4::{hex_sha256, EMPTY_PAYLOAD_SHA256};
use taskdeck::aws::{regional_host, AwsCredentials, SigV4Signer};
use taskdeck::config::AwsConfig;

const ACCESS_KEY: &str = "AKIDEXAMPLE";
const SECRET_KEY: &str = "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY";

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
}

#[test]
fn test_signing_key_derivation() {
    let signer = SigV4Signer::new(AwsCredentials::new(ACCESS_KEY, SECRET_KEY), "us-east-1", "iam");
    assert_eq!(
        hex::encode(signer.signing_key("20150830")),
        "c4afb1cc5771d871763a393e44b703571b55cc28424d1a5e86da6ed3c154a4b9"
    );
}

#[test]
fn test_get_vanilla_signature() {
    let signer = SigV4Signer::new(AwsCredentials::new(ACCESS_KEY, SECRET_KEY), "us-east-1", "service");
    let url = Url::parse("https://example.amazonaws.com/").unwrap();
    let now = Utc.with_ymd_and_hms(2015, 8, 30, 12, 36, 0).unwrap();

    let headers = signer.sign_headers("GET", &url, &[], b"", now);

    assert_eq!(header(&headers, "x-amz-date"), Some("20150830T123600Z"));
    assert_eq!(
        header(&headers, "authorization"),
        Some(
            "AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/20150830/us-east-1/service/aws4_request, \
             SignedHeaders=host;x-amz-date, \
             Signature=5fa00fa31553b73ebf1942676e86291e8372ff2a2260956d9b8aae1d763fbf31"
        )
    );
    assert_eq!(header(&headers, "x-amz-security-token"), None);
}

#[test]
fn test_session_token_is_signed_and_sent() {
    let credentials = AwsCredentials::new(ACCESS_KEY, SECRET_KEY).with_session_token("token/with+chars");
    let signer = SigV4Signer::new(credentials, "eu-west-1", "sns");
    let url = Url::parse("https://sns.eu-west-1.amazonaws.com/").unwrap();

    let headers = signer.sign_headers(
        "POST",
        &url,
        &[("Content-Type", "application/x-www-form-urlencoded")],
        b"Action=Publish",
        Utc::now(),
    );

    assert_eq!(header(&headers, "x-amz-security-token"), Some("token/with+chars"));
    let authorization = header(&headers, "authorization").unwrap();
    assert!(authorization.contains("SignedHeaders=content-type;host;x-amz-date;x-amz-security-token"));
    assert!(authorization.contains("/eu-west-1/sns/aws4_request"));
}

#[test]
fn test_presigned_url_carries_signature_parameters() {
    let signer = SigV4Signer::new(AwsCredentials::new(ACCESS_KEY, SECRET_KEY), "us-east-1", "transcribe");
    let url = Url::parse(
        "wss://transcribestreaming.us-east-1.amazonaws.com:8443/stream-transcription-websocket?language-code=en-US&media-encoding=pcm&sample-rate=44100",
    )
    .unwrap();
    let now = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();

    let presigned = signer.presign_url("GET", &url, 300, EMPTY_PAYLOAD_SHA256, now).unwrap();
    let params: Vec<(String, String)> = presigned.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
    let param = |name: &str| params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

    assert_eq!(presigned.port(), Some(8443));
    assert_eq!(presigned.path(), "/stream-transcription-websocket");
    assert_eq!(param("X-Amz-Algorithm"), Some("AWS4-HMAC-SHA256"));
    assert_eq!(
        param("X-Amz-Credential"),
        Some("AKIDEXAMPLE/20240501/us-east-1/transcribe/aws4_request")
    );
    assert_eq!(param("X-Amz-Date"), Some("20240501T093000Z"));
    assert_eq!(param("X-Amz-Expires"), Some("300"));
    assert_eq!(param("X-Amz-SignedHeaders"), Some("host"));
    assert_eq!(param("sample-rate"), Some("44100"));
    assert_eq!(param("X-Amz-Signature").map(str::len), Some(64));

    // Signing is deterministic for a fixed clock
    let again = signer.presign_url("GET", &url, 300, EMPTY_PAYLOAD_SHA256, now).unwrap();
    assert_eq!(presigned, again);
}

#[test]
fn test_empty_payload_hash() {
    assert_eq!(hex_sha256(b""), EMPTY_PAYLOAD_SHA256);
}

#[test]
fn test_regional_host() {
    assert_eq!(regional_host("cognito-idp", "eu-central-1"), "cognito-idp.eu-central-1.amazonaws.com");
}

#[test]
fn test_credentials_from_environment() {
    let config = AwsConfig {
        access_key_env: "TASKDECK_TEST_ACCESS_KEY".to_string(),
        secret_key_env: "TASKDECK_TEST_SECRET_KEY".to_string(),
        session_token_env: "TASKDECK_TEST_SESSION_TOKEN".to_string(),
    };

    assert!(AwsCredentials::from_env(&config).is_err());

    std::env::set_var("TASKDECK_TEST_ACCESS_KEY", ACCESS_KEY);
    std::env::set_var("TASKDECK_TEST_SECRET_KEY", SECRET_KEY);
    let credentials = AwsCredentials::from_env(&config).unwrap();

    assert_eq!(credentials.access_key_id, ACCESS_KEY);
    assert_eq!(credentials.session_token, None);
    assert!(!format!("{:?}", credentials).contains(SECRET_KEY));
}
