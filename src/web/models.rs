//! The uniform JSON envelope every endpoint returns.

use serde_json::{json, Value};

/// `{success: true, data}`
pub fn success(data: Value) -> Value {
    json!({
        "success": true,
        "data": data,
    })
}

/// `{success: false, error: {code, message, details?}}`
pub fn error_body(code: u16, message: &str, details: Option<Value>) -> Value {
    let mut error = json!({
        "code": code,
        "message": message,
    });
    if let Some(details) = details {
        error["details"] = details;
    }
    json!({
        "success": false,
        "error": error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_wraps_data() {
        assert_eq!(
            success(json!({"stat": "ok"})),
            json!({"success": true, "data": {"stat": "ok"}})
        );
    }

    #[test]
    fn error_body_omits_missing_details() {
        let body = error_body(404, "The requested resource has not been found.", None);
        assert_eq!(body["success"], json!(false));
        assert_eq!(body["error"]["code"], json!(404));
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn error_body_carries_upstream_details() {
        let body = error_body(500, "Failed to fetch monitors", Some(json!({"stat": "fail"})));
        assert_eq!(body["error"]["details"], json!({"stat": "fail"}));
    }
}
