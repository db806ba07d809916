use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use pointpulse_core::config::PayloadConfig;
use pointpulse_core::error::{PointPulseError, PointPulseResult};
use pointpulse_core::payload::{ActionPayload, PayloadContext};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::strategy::{Candidate, STRATEGIES};

/// JSON field holding the redemption id inside an encoded payload.
const REDEMPTION_FIELD: &str = "redemptionId";

const LENIENT_CONFIG: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

/// Accepts tokens with or without padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT_CONFIG);
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT_CONFIG);

// ─── Encoded Token ──────────────────────────────────────────────────────────

/// A `base64(JSON)` payload token, as printed into a QR code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    /// Wrap a token received from elsewhere (e.g. a stored QR value).
    pub fn from_token(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Percent-encoded form for use as a query string value.
    pub fn to_query_value(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

impl std::fmt::Display for EncodedPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Field order matches the token layout: `type`, `context`, then fields.
#[derive(Serialize)]
struct WirePayload<'a> {
    #[serde(rename = "type")]
    type_tag: &'a str,
    context: PayloadContext,
    #[serde(skip_serializing_if = "Option::is_none")]
    utorid: Option<&'a str>,
    #[serde(rename = "redemptionId", skip_serializing_if = "Option::is_none")]
    redemption_id: Option<u64>,
}

// ─── Codec ──────────────────────────────────────────────────────────────────

/// Encodes action payloads into link/QR tokens and recovers them from
/// whatever text a scanner or a browser hands back.
#[derive(Debug, Clone, Default)]
pub struct PayloadCodec {
    config: PayloadConfig,
}

impl PayloadCodec {
    pub fn new(config: &PayloadConfig) -> Self {
        debug!(
            type_tag = %config.type_tag,
            data_key = %config.data_key,
            "Payload codec initialized"
        );
        Self {
            config: config.clone(),
        }
    }

    pub fn config(&self) -> &PayloadConfig {
        &self.config
    }

    /// Decode arbitrary scanned, typed or linked text.
    ///
    /// Strategies run in the order of [`STRATEGIES`]; the first one to
    /// produce a payload wins. Never fails: text nothing recognizes is
    /// `Unknown`.
    pub fn decode(&self, input: &str) -> ActionPayload {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return ActionPayload::Unknown;
        }

        let candidate = Candidate::new(trimmed);
        for strategy in STRATEGIES {
            if let Some(payload) = (strategy.parse)(self, &candidate) {
                debug!(
                    strategy = strategy.name,
                    kind = ?payload.kind(),
                    "Payload decoded"
                );
                metrics::counter!("pointpulse.payload.decoded", "strategy" => strategy.name)
                    .increment(1);
                return payload;
            }
        }

        debug!(len = trimmed.len(), "No decode strategy matched input");
        metrics::counter!("pointpulse.payload.unknown").increment(1);
        ActionPayload::Unknown
    }

    /// Serialize a payload into its token. `Unknown` has no encoding.
    pub fn encode(&self, payload: &ActionPayload) -> PointPulseResult<EncodedPayload> {
        let context = payload
            .context()
            .ok_or(PointPulseError::Unencodable(payload.kind()))?;
        let wire = WirePayload {
            type_tag: &self.config.type_tag,
            context,
            utorid: payload.utorid(),
            redemption_id: payload.redemption_id(),
        };
        let json = serde_json::to_string(&wire)?;
        Ok(EncodedPayload(STANDARD.encode(json.as_bytes())))
    }

    /// Build a shareable link: `base_url` with the token under the data key.
    pub fn link(&self, base_url: &str, payload: &ActionPayload) -> PointPulseResult<Url> {
        let token = self.encode(payload)?;
        let mut url = Url::parse(base_url)?;
        url.query_pairs_mut()
            .append_pair(&self.config.data_key, token.as_str());
        info!(kind = ?payload.kind(), link = %url, "Payload link generated");
        Ok(url)
    }

    /// Percent-decode, base64-decode and classify a token. `None` on any
    /// failure along the way.
    pub(crate) fn decode_token(&self, token: &str) -> Option<ActionPayload> {
        let unescaped = urlencoding::decode(token).ok()?;
        let compact: String = unescaped
            .chars()
            .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
            .map(|c| if c == ' ' { '+' } else { c })
            .collect();
        if compact.is_empty() {
            return None;
        }

        let bytes = LENIENT_STANDARD
            .decode(compact.as_bytes())
            .or_else(|_| LENIENT_URL_SAFE.decode(compact.as_bytes()))
            .ok()?;
        let text = String::from_utf8(bytes).ok()?;
        let value: Value = serde_json::from_str(&text).ok()?;
        self.classify(&value)
    }

    /// Whether a JSON object carries this codec's type tag.
    pub(crate) fn is_tagged(&self, value: &Value) -> bool {
        value.get("type").and_then(Value::as_str) == Some(self.config.type_tag.as_str())
    }

    /// Map a decoded JSON object to a payload by its `context`.
    ///
    /// A missing `type` is tolerated; a foreign `type` keeps only the
    /// generic `utorid` lookup.
    pub(crate) fn classify(&self, value: &Value) -> Option<ActionPayload> {
        let object = value.as_object()?;
        let trusted = match object.get("type") {
            None => true,
            Some(_) => self.is_tagged(value),
        };
        let context = if trusted {
            object
                .get("context")
                .and_then(Value::as_str)
                .and_then(PayloadContext::parse)
        } else {
            None
        };
        let utorid = object.get("utorid").and_then(Value::as_str);

        match context {
            Some(PayloadContext::Redemption) => object
                .get(REDEMPTION_FIELD)
                .and_then(redemption_id)
                .map(ActionPayload::redemption),
            Some(PayloadContext::Transfer) => ActionPayload::transfer(utorid?),
            Some(PayloadContext::User) | None => ActionPayload::user_lookup(utorid?),
        }
    }

    /// Treat raw text as an identifier: all digits is a redemption id,
    /// anything else a utorid.
    pub(crate) fn plain_identifier(&self, text: &str) -> Option<ActionPayload> {
        let text = text.trim();
        if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = text.parse::<u64>() {
                return Some(ActionPayload::redemption(id));
            }
        }
        ActionPayload::user_lookup(&text.to_lowercase())
    }
}

fn redemption_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
