//! Route handlers organized by resource

pub mod health;
pub mod insects;
pub mod joined;
pub mod trees;

use serde::Serialize;

/// Acknowledgment envelope for mutations
#[derive(Debug, Serialize)]
pub struct Ack<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Ack<T> {
    pub fn new(status: &'static str, message: impl Into<String>, data: T) -> Self {
        Self {
            status,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl Ack<()> {
    /// Envelope with no data payload, as returned by deletes.
    pub fn message_only(status: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_data() {
        let ack = Ack::new("success", "Successfully updated insect", 7);
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"], 7);
    }

    #[test]
    fn message_only_omits_data() {
        let ack = Ack::message_only("success", "Successfully removed insect 7");
        let json = serde_json::to_value(&ack).unwrap();
        assert!(json.get("data").is_none());
    }
}
