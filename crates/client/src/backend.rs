//! The booking backend and the three transports that reach it.
//!
//! The backend itself is remote and not ours; all three transports speak the
//! same logical protocol (availability query, booking submission) and differ
//! only in how the bytes travel.

use std::sync::atomic::{AtomicU64, Ordering};

use common::{AvailabilityReply, BookingInterval, BookingRequest, SubmitReceipt};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use tracing::debug;

use crate::error::ClientError;

/// One capability, three wire strategies.
#[allow(async_fn_in_trait)]
pub trait BookingBackend {
    /// Fetch the existing reservations for a court on a date.
    async fn query_availability(
        &self,
        court: &str,
        date: &str,
    ) -> Result<Vec<BookingInterval>, ClientError>;

    /// Submit a new booking and return the backend's receipt.
    async fn submit(&self, request: &BookingRequest) -> Result<SubmitReceipt, ClientError>;
}

/// Plain HTTP GET with query parameters for both operations. Submission
/// rides on query parameters too, the shape the backend accepts without a
/// preflight exchange.
pub struct QueryTransport {
    http: Client,
    base_url: String,
}

impl QueryTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl BookingBackend for QueryTransport {
    async fn query_availability(
        &self,
        court: &str,
        date: &str,
    ) -> Result<Vec<BookingInterval>, ClientError> {
        debug!(court, date, "querying availability");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("court", court), ("date", date)])
            .send()
            .await?;
        check_status(&resp)?;
        unwrap_reply(resp.json().await?)
    }

    async fn submit(&self, request: &BookingRequest) -> Result<SubmitReceipt, ClientError> {
        debug!(court = %request.court, "submitting booking");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("action", "book")])
            .query(request)
            .send()
            .await?;
        check_status(&resp)?;
        Ok(resp.json().await?)
    }
}

/// Script-callback variant: every call carries a locally issued callback
/// name, and the body arrives wrapped as `cbN({...})`. The name is checked
/// against the one issued for this call, so a stale or foreign envelope can
/// never be mistaken for the answer; the correlation lives and dies with the
/// call, there is no registry to clean up.
pub struct CallbackTransport {
    http: Client,
    base_url: String,
    next_id: AtomicU64,
}

impl CallbackTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    fn issue_callback(&self) -> String {
        format!("cb{}", self.next_id.fetch_add(1, Ordering::Relaxed))
    }
}

impl BookingBackend for CallbackTransport {
    async fn query_availability(
        &self,
        court: &str,
        date: &str,
    ) -> Result<Vec<BookingInterval>, ClientError> {
        let callback = self.issue_callback();
        debug!(court, date, callback = %callback, "querying availability");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("court", court), ("date", date), ("callback", callback.as_str())])
            .send()
            .await?;
        check_status(&resp)?;
        let body = resp.text().await?;
        let payload = unwrap_envelope(&callback, &body)?;
        unwrap_reply(parse_payload(payload)?)
    }

    async fn submit(&self, request: &BookingRequest) -> Result<SubmitReceipt, ClientError> {
        let callback = self.issue_callback();
        debug!(court = %request.court, callback = %callback, "submitting booking");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("action", "book"), ("callback", callback.as_str())])
            .query(request)
            .send()
            .await?;
        check_status(&resp)?;
        let body = resp.text().await?;
        let payload = unwrap_envelope(&callback, &body)?;
        parse_payload(payload)
    }
}

/// Multipart form POST for submission, one text part per field. Availability
/// queries are GET-shaped regardless of variant.
pub struct FormTransport {
    http: Client,
    base_url: String,
}

impl FormTransport {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl BookingBackend for FormTransport {
    async fn query_availability(
        &self,
        court: &str,
        date: &str,
    ) -> Result<Vec<BookingInterval>, ClientError> {
        debug!(court, date, "querying availability");
        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("court", court), ("date", date)])
            .send()
            .await?;
        check_status(&resp)?;
        unwrap_reply(resp.json().await?)
    }

    async fn submit(&self, request: &BookingRequest) -> Result<SubmitReceipt, ClientError> {
        debug!(court = %request.court, "submitting booking");
        let form = Form::new()
            .text("action", "book")
            .text("court", request.court.clone())
            .text("startDate", request.start_date.clone())
            .text("startTime", request.start_time.clone())
            .text("endDate", request.end_date.clone())
            .text("endTime", request.end_time.clone())
            .text("customerName", request.customer_name.clone())
            .text("customerPhone", request.customer_phone.clone())
            .text("staff", request.staff.clone());
        let resp = self.http.post(&self.base_url).multipart(form).send().await?;
        check_status(&resp)?;
        Ok(resp.json().await?)
    }
}

fn check_status(resp: &Response) -> Result<(), ClientError> {
    if !resp.status().is_success() {
        return Err(ClientError::Backend(format!(
            "unexpected status {}",
            resp.status()
        )));
    }
    Ok(())
}

fn unwrap_reply(reply: AvailabilityReply) -> Result<Vec<BookingInterval>, ClientError> {
    match reply {
        AvailabilityReply::Failure { error } => Err(ClientError::Backend(error)),
        AvailabilityReply::Bookings(bookings) => Ok(bookings),
    }
}

/// Strip the `name(...)` wrapping, insisting the name is the one issued for
/// this call.
fn unwrap_envelope<'a>(callback: &str, body: &'a str) -> Result<&'a str, ClientError> {
    let mismatch = || {
        ClientError::Backend(format!(
            "callback envelope did not match '{callback}'"
        ))
    };
    let body = body.trim();
    let body = body.strip_suffix(';').unwrap_or(body);
    body.strip_prefix(callback)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(mismatch)
}

fn parse_payload<T: serde::de::DeserializeOwned>(payload: &str) -> Result<T, ClientError> {
    serde_json::from_str(payload)
        .map_err(|e| ClientError::Backend(format!("malformed callback payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_unwraps_with_and_without_semicolon() {
        assert_eq!(unwrap_envelope("cb1", "cb1([]);").unwrap(), "[]");
        assert_eq!(
            unwrap_envelope("cb7", r#"cb7({"success":true})"#).unwrap(),
            r#"{"success":true}"#
        );
    }

    #[test]
    fn envelope_rejects_foreign_callback_names() {
        let err = unwrap_envelope("cb2", "cb1([]);").unwrap_err();
        assert!(matches!(err, ClientError::Backend(_)));
    }

    #[test]
    fn envelope_rejects_bare_json() {
        assert!(unwrap_envelope("cb1", "[]").is_err());
    }

    #[test]
    fn issued_callbacks_never_repeat() {
        let transport = CallbackTransport::new("http://localhost");
        assert_ne!(transport.issue_callback(), transport.issue_callback());
    }
}
