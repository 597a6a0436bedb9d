//! Custom assertion macros and utilities
//!
//! Provides assertion macros with more descriptive failure output.

/// Assert that a result is ok and return the value
///
/// This macro unwraps a Result, providing a better error message
/// if the result is an error.
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
    ($result:expr, $message:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $message, e),
        }
    };
}

/// Assert that an HTTP response carries the JSON error body for `$status`
///
/// Error bodies look like `{"error": "...", "status": 404}`.
#[macro_export]
macro_rules! assert_error_body {
    ($response:expr, $status:expr, $message:expr) => {{
        let response = $response;
        response.assert_status($status);
        let body = response.json::<serde_json::Value>();
        assert_eq!(body["status"], $status.as_u16(), "unexpected body: {}", body);
        assert_eq!(body["error"], $message, "unexpected body: {}", body);
    }};
}
