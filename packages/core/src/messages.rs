//! Messages the wallet is asked to sign.
//!
//! Two kinds of signature reach the hub:
//!
//! - **File confirmation**: every uploaded file carries a signature over
//!   its JCS canonical form (RFC 8785) with the `signature` field removed.
//! - **Account link**: proof that an additional identity is controlled by
//!   the owner of the session.

use serde_json::Value;
use thiserror::Error;

/// Name of the field that holds a file's signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// Errors returned by [`file_sign_message`].
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("file must be a JSON object")]
    NotAnObject,
    #[error("file has no string 'id'")]
    MissingId,
    #[error("canonicalization failed: {0}")]
    Canonicalization(String),
}

/// The message that links `platform`/`identity` to the `owner` file.
pub fn link_message(owner: &str, platform: &str, identity: &str) -> String {
    format!("[RSS3] I am adding account {platform}-{identity} to my RSS3 file {owner}")
}

/// The message that confirms the current content of `file`.
///
/// `file` must be an object with a string `id`. Any existing signature is
/// ignored, so re-signing an already signed file produces the same message.
pub fn file_sign_message(file: &Value) -> Result<String, MessageError> {
    let id = file
        .get("id")
        .and_then(Value::as_str)
        .ok_or(MessageError::MissingId)?;
    let payload = canonical_unsigned(file)?;
    Ok(format!(
        "[RSS3] I am confirming the results of changes to my file {id}: {payload}"
    ))
}

/// JCS canonical string of `file` with the signature field removed.
pub fn canonical_unsigned(file: &Value) -> Result<String, MessageError> {
    let mut without_sig = file.as_object().ok_or(MessageError::NotAnObject)?.clone();
    without_sig.remove(SIGNATURE_FIELD);

    serde_jcs::to_string(&Value::Object(without_sig))
        .map_err(|e| MessageError::Canonicalization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn link_message_names_both_parties() {
        let msg = link_message("0xOwner", "Ethereum", "0xExtra");
        assert_eq!(
            msg,
            "[RSS3] I am adding account Ethereum-0xExtra to my RSS3 file 0xOwner"
        );
    }

    #[test]
    fn canonical_form_sorts_keys_and_drops_signature() {
        let file = json!({ "version": "v1", "id": "0xA", "signature": "0xdead" });
        assert_eq!(
            canonical_unsigned(&file).unwrap(),
            r#"{"id":"0xA","version":"v1"}"#
        );
    }

    #[test]
    fn signing_is_stable_across_resigning() {
        let unsigned = json!({ "id": "0xA", "profile": { "name": "alice" } });
        let mut signed = unsigned.clone();
        signed["signature"] = json!("0xbeef");
        assert_eq!(
            file_sign_message(&unsigned).unwrap(),
            file_sign_message(&signed).unwrap()
        );
    }

    #[test]
    fn file_without_id_is_rejected() {
        let result = file_sign_message(&json!({ "profile": {} }));
        assert!(matches!(result, Err(MessageError::MissingId)));
    }

    #[test]
    fn non_object_is_rejected() {
        let result = canonical_unsigned(&json!(["0xA"]));
        assert!(matches!(result, Err(MessageError::NotAnObject)));
    }
}
