// SPDX-FileCopyrightText: 2026 Rekindle Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Twilio webhook signature validation.
//!
//! Twilio signs each webhook with HMAC-SHA1 over the full request URL
//! followed by every POST parameter's name and value, sorted by name, keyed
//! with the account's auth token and base64-encoded into the
//! `X-Twilio-Signature` header.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Compute the expected signature for a webhook request.
pub fn compute_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut payload = String::from(url);
    for (name, value) in sorted {
        payload.push_str(name);
        payload.push_str(value);
    }

    let mut mac = HmacSha1::new_from_slice(auth_token.as_bytes())
        .expect("hmac accepts keys of any length");
    mac.update(payload.as_bytes());
    BASE64.encode(mac.finalize().into_bytes())
}

/// Check a received `X-Twilio-Signature` header against the request.
pub fn validate_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    compute_signature(auth_token, url, params) == signature
}
