//! AK/SK 请求签名（SDK-HMAC-SHA256）
//!
//! 华为云 API 网关的签名流程：规范请求 -> 待签字符串 -> HMAC 签名。
//! 规范头固定签 content-type、host、x-sdk-date 三个。

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::FetchError;

const ALGORITHM: &str = "SDK-HMAC-SHA256";
const SIGNED_HEADERS: &str = "content-type;host;x-sdk-date";

type HmacSha256 = Hmac<Sha256>;

/// 待签名请求的要素
#[derive(Debug)]
pub struct SigningInput<'a> {
    pub method: &'a str,
    pub host: &'a str,
    /// 规范 URI，必须以 '/' 结尾
    pub path: &'a str,
    /// 已排序、已编码的查询串（无则为空串）
    pub query: &'a str,
    pub content_type: &'a str,
    pub body: &'a [u8],
    pub timestamp: DateTime<Utc>,
}

/// 签名产物：随请求发送的 X-Sdk-Date 和 Authorization 头
#[derive(Debug, Clone)]
pub struct Signature {
    pub sdk_date: String,
    pub authorization: String,
}

/// 计算请求签名
pub fn sign(
    input: &SigningInput<'_>,
    access_key: &str,
    secret_key: &str,
) -> Result<Signature, FetchError> {
    let sdk_date = input.timestamp.format("%Y%m%dT%H%M%SZ").to_string();

    let canonical_path = if input.path.ends_with('/') {
        input.path.to_string()
    } else {
        format!("{}/", input.path)
    };

    let canonical_headers = format!(
        "content-type:{}\nhost:{}\nx-sdk-date:{}\n",
        input.content_type, input.host, sdk_date
    );

    let canonical_request = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        input.method,
        canonical_path,
        input.query,
        canonical_headers,
        SIGNED_HEADERS,
        hex_sha256(input.body)
    );

    let string_to_sign = format!(
        "{}\n{}\n{}",
        ALGORITHM,
        sdk_date,
        hex_sha256(canonical_request.as_bytes())
    );

    let mut mac = HmacSha256::new_from_slice(secret_key.as_bytes())
        .map_err(|e| FetchError::Transport(format!("hmac init failed: {e}")))?;
    mac.update(string_to_sign.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let authorization = format!(
        "{ALGORITHM} Access={access_key}, SignedHeaders={SIGNED_HEADERS}, Signature={signature}"
    );

    Ok(Signature {
        sdk_date,
        authorization,
    })
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
