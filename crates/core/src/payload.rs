//! Action payload domain types: the decoded intent behind a scanned QR code
//! or a shared link (who or what an action targets).

use serde::{Deserialize, Serialize};

// ─── Decoded Payload ────────────────────────────────────────────────────────

/// Discriminant of an [`ActionPayload`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    UserLookup,
    Transfer,
    RedemptionProcess,
    Unknown,
}

/// A decoded action request.
///
/// Every variant other than `Unknown` carries a non-empty, trimmed
/// identifier. Use the checked constructors to uphold that when building
/// payloads from untrusted text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    UserLookup { utorid: String },
    Transfer { utorid: String },
    RedemptionProcess { redemption_id: u64 },
    Unknown,
}

impl ActionPayload {
    pub fn user_lookup(utorid: &str) -> Option<Self> {
        non_empty(utorid).map(|utorid| ActionPayload::UserLookup { utorid })
    }

    pub fn transfer(utorid: &str) -> Option<Self> {
        non_empty(utorid).map(|utorid| ActionPayload::Transfer { utorid })
    }

    pub fn redemption(redemption_id: u64) -> Self {
        ActionPayload::RedemptionProcess { redemption_id }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionPayload::UserLookup { .. } => ActionKind::UserLookup,
            ActionPayload::Transfer { .. } => ActionKind::Transfer,
            ActionPayload::RedemptionProcess { .. } => ActionKind::RedemptionProcess,
            ActionPayload::Unknown => ActionKind::Unknown,
        }
    }

    /// Whether the payload names something a page can act on.
    /// `Unknown` is never a success.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, ActionPayload::Unknown)
    }

    /// The utorid for user-targeted payloads.
    pub fn utorid(&self) -> Option<&str> {
        match self {
            ActionPayload::UserLookup { utorid } | ActionPayload::Transfer { utorid } => {
                Some(utorid)
            }
            _ => None,
        }
    }

    pub fn redemption_id(&self) -> Option<u64> {
        match self {
            ActionPayload::RedemptionProcess { redemption_id } => Some(*redemption_id),
            _ => None,
        }
    }

    /// Wire context this payload is encoded under, if it can be encoded.
    pub fn context(&self) -> Option<PayloadContext> {
        match self {
            ActionPayload::UserLookup { .. } => Some(PayloadContext::User),
            ActionPayload::Transfer { .. } => Some(PayloadContext::Transfer),
            ActionPayload::RedemptionProcess { .. } => Some(PayloadContext::Redemption),
            ActionPayload::Unknown => None,
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ─── Wire Context ───────────────────────────────────────────────────────────

/// The `context` field of an encoded payload.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PayloadContext {
    User,
    Transfer,
    Redemption,
}

impl PayloadContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadContext::User => "user",
            PayloadContext::Transfer => "transfer",
            PayloadContext::Redemption => "redemption",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "user" => Some(PayloadContext::User),
            "transfer" => Some(PayloadContext::Transfer),
            "redemption" => Some(PayloadContext::Redemption),
            _ => None,
        }
    }
}

impl std::fmt::Display for PayloadContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
