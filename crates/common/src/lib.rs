use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod slots;

/// An existing reservation on a court, as reported by the booking backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BookingInterval {
    /// Start of the interval projected onto the daily grid, in minutes since midnight.
    pub fn start_minute(&self) -> u16 {
        minute_of_day(self.start)
    }

    /// End of the interval projected onto the daily grid, in minutes since midnight.
    pub fn end_minute(&self) -> u16 {
        minute_of_day(self.end)
    }
}

fn minute_of_day(at: DateTime<Utc>) -> u16 {
    (at.hour() * 60 + at.minute()) as u16
}

/// A booking submission. Field names and value shapes (YYYY-MM-DD dates,
/// HH:MM times) are dictated by the backend, which expects camelCase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub court: String,
    pub start_date: String,
    pub start_time: String,
    pub end_date: String,
    pub end_time: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub staff: String,
}

impl BookingRequest {
    /// Check the request before any network call: every field populated, and
    /// the end of the booking strictly after its start.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let required: [(&'static str, &str); 8] = [
            ("court", &self.court),
            ("startDate", &self.start_date),
            ("startTime", &self.start_time),
            ("endDate", &self.end_date),
            ("endTime", &self.end_time),
            ("customerName", &self.customer_name),
            ("customerPhone", &self.customer_phone),
            ("staff", &self.staff),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }

        let start = slots::parse_datetime(&self.start_date, &self.start_time)?;
        let end = slots::parse_datetime(&self.end_date, &self.end_time)?;
        slots::validate_interval(start, end)
    }
}

/// The backend's answer to a booking submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitReceipt {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Availability queries answer with either the interval list or an error
/// object; the two shapes share no fields, so untagged decoding is unambiguous.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AvailabilityReply {
    Failure { error: String },
    Bookings(Vec<BookingInterval>),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    #[error("end time must be after start time")]
    InvalidInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_request() -> BookingRequest {
        BookingRequest {
            court: "Court 1".to_string(),
            start_date: "2026-08-06".to_string(),
            start_time: "09:00".to_string(),
            end_date: "2026-08-06".to_string(),
            end_time: "10:00".to_string(),
            customer_name: "Dana Cole".to_string(),
            customer_phone: "0400 000 000".to_string(),
            staff: "Sam".to_string(),
        }
    }

    #[test]
    fn complete_request_validates() {
        assert_eq!(filled_request().validate(), Ok(()));
    }

    #[test]
    fn blank_phone_is_reported_by_wire_name() {
        let mut request = filled_request();
        request.customer_phone = "  ".to_string();
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("customerPhone"))
        );
    }

    #[test]
    fn first_blank_field_wins() {
        let mut request = filled_request();
        request.court = String::new();
        request.customer_phone = String::new();
        assert_eq!(
            request.validate(),
            Err(ValidationError::MissingField("court"))
        );
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let mut request = filled_request();
        request.start_time = "10:00".to_string();
        request.end_time = "09:30".to_string();
        assert_eq!(request.validate(), Err(ValidationError::InvalidInterval));
    }

    #[test]
    fn request_serializes_with_backend_field_names() {
        let value = serde_json::to_value(filled_request()).unwrap();
        assert_eq!(value["customerName"], "Dana Cole");
        assert_eq!(value["startDate"], "2026-08-06");
        assert!(value.get("customer_name").is_none());
    }

    #[test]
    fn availability_reply_decodes_both_shapes() {
        let bookings: AvailabilityReply = serde_json::from_str(
            r#"[{"start": "2026-08-06T09:00:00Z", "end": "2026-08-06T10:00:00Z"}]"#,
        )
        .unwrap();
        match bookings {
            AvailabilityReply::Bookings(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].start_minute(), 9 * 60);
                assert_eq!(list[0].end_minute(), 10 * 60);
            }
            AvailabilityReply::Failure { .. } => panic!("expected interval list"),
        }

        let failure: AvailabilityReply =
            serde_json::from_str(r#"{"error": "sheet unavailable"}"#).unwrap();
        match failure {
            AvailabilityReply::Failure { error } => assert_eq!(error, "sheet unavailable"),
            AvailabilityReply::Bookings(_) => panic!("expected error object"),
        }
    }

    #[test]
    fn receipt_message_is_optional() {
        let receipt: SubmitReceipt = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(receipt.success);
        assert_eq!(receipt.message, None);
    }
}
