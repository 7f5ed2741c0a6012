use serde::Serialize;

pub const SUCCESS: &str = "SUCCESS";

/// Success body shared by every endpoint: `{"message": "SUCCESS", "result": ...}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn with_result(result: T) -> Self {
        Self {
            message: SUCCESS,
            result: Some(result),
        }
    }
}

impl Envelope<()> {
    pub fn success() -> Self {
        Self {
            message: SUCCESS,
            result: None,
        }
    }
}
