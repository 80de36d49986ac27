//! Response-tree translation
//!
//! Responses are composed and cached in English; this adapter translates the
//! human-readable leaves of a JSON response tree between languages. It runs
//! in both directions: forward from the English canonical form into the
//! requested language, and backward from a non-English model answer into
//! English before caching. Keys are never translated, and machine-facing
//! values (identifiers, postal codes, phone numbers, status tags) pass
//! through verbatim.

use futures::future::BoxFuture;
use referral_agent_core::{Language, ResponseEnvelope, Translator};
use serde_json::{Map, Value};

/// Object keys whose values stay untranslated regardless of target language
pub const TECHNICAL_KEYS: &[&str] = &[
    "id",
    "referral_id",
    "service_area_zip_code",
    "zipcode",
    "postal_code",
    "phone",
    "status",
    "language",
];

/// Translate every human-readable string leaf of `value` from `from` into
/// `to`, returning a new tree with the same shape
///
/// Numbers, booleans, nulls, empty strings, and the `"-"` placeholder pass
/// through unchanged. A failed translation of one leaf keeps that leaf's
/// source text and never fails the tree.
pub async fn translate_tree(
    translator: &dyn Translator,
    value: &Value,
    from: Language,
    to: Language,
) -> Value {
    if from == to {
        return value.clone();
    }
    walk(translator, value, from, to).await
}

/// Translate a whole response envelope via its JSON form
///
/// Falls back to the untranslated envelope if the translated tree no longer
/// deserializes (which would mean a leaf type changed shape).
pub async fn translate_envelope(
    translator: &dyn Translator,
    envelope: &ResponseEnvelope,
    from: Language,
    to: Language,
) -> ResponseEnvelope {
    if from == to {
        return envelope.clone();
    }
    let tree = match serde_json::to_value(envelope) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize envelope for translation");
            return envelope.clone();
        }
    };
    let translated = translate_tree(translator, &tree, from, to).await;
    match serde_json::from_value(translated) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!(error = %e, "Translated envelope no longer deserializes, keeping source");
            envelope.clone()
        }
    }
}

fn walk<'a>(
    translator: &'a dyn Translator,
    value: &'a Value,
    from: Language,
    to: Language,
) -> BoxFuture<'a, Value> {
    Box::pin(async move {
        match value {
            Value::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, child) in map {
                    if TECHNICAL_KEYS.contains(&key.as_str()) {
                        out.insert(key.clone(), child.clone());
                    } else {
                        out.insert(key.clone(), walk(translator, child, from, to).await);
                    }
                }
                Value::Object(out)
            }
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(walk(translator, item, from, to).await);
                }
                Value::Array(out)
            }
            Value::String(text) => {
                Value::String(translate_leaf(translator, text, from, to).await)
            }
            other => other.clone(),
        }
    })
}

async fn translate_leaf(
    translator: &dyn Translator,
    text: &str,
    from: Language,
    to: Language,
) -> String {
    if text.trim().is_empty() || text == "-" {
        return text.to_string();
    }
    match translator.translate(text, from, to).await {
        Ok(translated) => translated,
        Err(e) => {
            tracing::warn!(error = %e, "Leaf translation failed, keeping source text");
            text.to_string()
        }
    }
}
