//! PointPulse action payloads: the compact `base64(JSON)` tokens carried by
//! transfer links, redemption links and QR codes.
//!
//! Decoding is total: any text, however mangled by a camera or a chat client,
//! resolves to an [`ActionPayload`], falling back to `Unknown`.

pub mod codec;
pub mod strategy;

pub use codec::{EncodedPayload, PayloadCodec};
pub use pointpulse_core::payload::{ActionKind, ActionPayload, PayloadContext};
