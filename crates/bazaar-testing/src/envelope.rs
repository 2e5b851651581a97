//! Assertions over `{ success, message, data, error }` bodies.

use serde_json::Value;

/// Assert a failure envelope and return its `error` message.
pub fn expect_error(body: &Value) -> &str {
    assert_eq!(body["success"], false, "expected failure envelope, got {body}");
    assert!(body.get("data").is_none(), "failure envelope carries data: {body}");
    body["error"]
        .as_str()
        .unwrap_or_else(|| panic!("failure envelope without error message: {body}"))
}
