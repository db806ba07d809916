//! Ordered decode strategies.
//!
//! Scanned text is sniffed by trying each strategy in turn; the first to
//! return a payload wins. The order is the precedence:
//! URL → whole-input base64 → prefixed/embedded JSON → plain identifier.

use pointpulse_core::payload::ActionPayload;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::codec::PayloadCodec;

/// Trimmed, non-empty input plus its URL parse, computed once per decode.
#[derive(Debug)]
pub struct Candidate<'a> {
    pub text: &'a str,
    pub url: Option<Url>,
}

impl<'a> Candidate<'a> {
    pub fn new(text: &'a str) -> Self {
        // Only hierarchical URLs with a host count; "abc:def" is an identifier.
        let url = Url::parse(text).ok().filter(|url| url.has_host());
        Self { text, url }
    }

    pub fn is_url(&self) -> bool {
        self.url.is_some()
    }
}

pub type ParseFn = fn(&PayloadCodec, &Candidate<'_>) -> Option<ActionPayload>;

pub struct Strategy {
    pub name: &'static str,
    pub parse: ParseFn,
}

pub const STRATEGIES: &[Strategy] = &[
    Strategy {
        name: "url",
        parse: from_url,
    },
    Strategy {
        name: "base64_json",
        parse: from_base64_json,
    },
    Strategy {
        name: "embedded_json",
        parse: from_embedded_json,
    },
    Strategy {
        name: "plain_identifier",
        parse: from_plain_identifier,
    },
];

/// `?data=<token>` first, then a bare `?redemptionId=<n>`.
fn from_url(codec: &PayloadCodec, candidate: &Candidate<'_>) -> Option<ActionPayload> {
    let url = candidate.url.as_ref()?;
    let config = codec.config();

    for (key, value) in url.query_pairs() {
        if key == config.data_key.as_str() {
            // form decoding turned any unescaped '+' into a space
            if let Some(payload) = codec.decode_token(&value.replace(' ', "+")) {
                return Some(payload);
            }
        }
    }

    let redemption = url
        .query_pairs()
        .filter(|(key, _)| key == config.redemption_key.as_str())
        .find_map(|(_, value)| value.trim().parse::<u64>().ok())
        .map(ActionPayload::redemption);
    if redemption.is_none() {
        debug!(host = ?url.host_str(), path = url.path(), "Link carries no decodable payload");
    }
    redemption
}

fn from_base64_json(codec: &PayloadCodec, candidate: &Candidate<'_>) -> Option<ActionPayload> {
    if candidate.is_url() || candidate.text.contains('{') {
        return None;
    }
    codec.decode_token(candidate.text)
}

/// `abc123{...}`: the prefix is the identifier and the JSON is only logged.
/// `{...}`: a tagged object is classified, anything else stays a literal
/// identifier so the lookup fails downstream.
fn from_embedded_json(codec: &PayloadCodec, candidate: &Candidate<'_>) -> Option<ActionPayload> {
    if candidate.is_url() {
        return None;
    }
    let brace = candidate.text.find('{')?;

    let prefix = candidate.text[..brace].trim();
    if !prefix.is_empty() {
        let suffix = &candidate.text[brace..];
        match serde_json::from_str::<Value>(suffix) {
            Ok(embedded) => debug!(
                prefix,
                embedded = %embedded,
                "Identifier followed by JSON, keeping prefix"
            ),
            Err(e) => debug!(prefix, error = %e, "Identifier followed by unparsable JSON"),
        }
        return codec.plain_identifier(prefix);
    }

    let literal = ActionPayload::user_lookup(candidate.text);
    match serde_json::from_str::<Value>(candidate.text) {
        Ok(value) if codec.is_tagged(&value) => codec.classify(&value).or(literal),
        _ => literal,
    }
}

fn from_plain_identifier(codec: &PayloadCodec, candidate: &Candidate<'_>) -> Option<ActionPayload> {
    if candidate.is_url() {
        return None;
    }
    codec.plain_identifier(candidate.text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_order() {
        let names: Vec<&str> = STRATEGIES.iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec!["url", "base64_json", "embedded_json", "plain_identifier"]
        );
    }

    #[test]
    fn test_candidate_url_requires_host() {
        assert!(Candidate::new("https://pointpulse.example/transfer?data=x").is_url());
        assert!(!Candidate::new("alice99").is_url());
        assert!(!Candidate::new("abc:def").is_url());
        assert!(!Candidate::new(r#"{"type":"pointpulse"}"#).is_url());
    }

    #[test]
    fn test_url_strategy_skips_plain_text() {
        let codec = PayloadCodec::default();
        assert_eq!(from_url(&codec, &Candidate::new("alice99")), None);
    }

    #[test]
    fn test_url_strategy_bare_redemption_param() {
        let codec = PayloadCodec::default();
        let candidate = Candidate::new("https://pointpulse.example/redeem?redemptionId=31");
        assert_eq!(from_url(&codec, &candidate), Some(ActionPayload::redemption(31)));
    }

    #[test]
    fn test_url_strategy_bad_data_falls_back_to_redemption_param() {
        let codec = PayloadCodec::default();
        let candidate =
            Candidate::new("https://pointpulse.example/redeem?data=%%%&redemptionId=9");
        assert_eq!(from_url(&codec, &candidate), Some(ActionPayload::redemption(9)));
    }

    #[test]
    fn test_embedded_json_untagged_object_is_literal() {
        let codec = PayloadCodec::default();
        let text = r#"{"utorid":"zzz000"}"#;
        assert_eq!(
            from_embedded_json(&codec, &Candidate::new(text)),
            ActionPayload::user_lookup(text)
        );
    }

    #[test]
    fn test_embedded_json_malformed_object_is_literal() {
        let codec = PayloadCodec::default();
        let text = r#"{"type":"pointpulse","utorid":"#;
        assert_eq!(
            from_embedded_json(&codec, &Candidate::new(text)),
            ActionPayload::user_lookup(text)
        );
    }

    #[test]
    fn test_base64_strategy_ignores_braces() {
        let codec = PayloadCodec::default();
        assert_eq!(from_base64_json(&codec, &Candidate::new("ab{cd}")), None);
    }
}
