/// Uniform outcome of a single notification send.
///
/// This is the whole contract with the notifier boundary: provider errors
/// are folded into `success == false` and never raised to the caller.
/// Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationResult {
    pub success: bool,
    pub message: String,
    pub error: Option<String>,
}

impl NotificationResult {
    pub fn ok(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            error: None,
        }
    }

    pub fn failed(message: &str, error: String) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            error: Some(error),
        }
    }
}
