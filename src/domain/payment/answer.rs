//! Gateway answer parsing.
//!
//! The `kr-answer` payload reaches the system over the public internet and
//! its shape varies across observed integrations (`client.email` vs
//! `customer.email`, `amount` vs `orderDetails.orderPaidAmount`). The parser
//! validates the structural minimum before any field is trusted, then
//! resolves every optional field once, first-match-wins, so the fallback
//! lookups never leak into business logic.

use serde_json::Value;
use thiserror::Error;

/// Order status string the gateway sends for a completed payment.
pub const STATUS_PAID: &str = "PAID";

/// Errors from parsing an untrusted gateway answer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The payload is not syntactically valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    /// The payload decoded but lacks the minimal expected structure.
    #[error("answer does not have the expected structure")]
    UnexpectedShape,
}

/// A parsed gateway notification answer.
///
/// All fields are optional; absence degrades gracefully downstream (missing
/// amount is treated as zero, missing email means that recipient is not
/// notified).
#[derive(Debug, Clone)]
pub struct GatewayAnswer {
    /// `orderStatus` when present as a string.
    pub order_status: Option<String>,

    /// `orderDetails.orderId`, falling back to top-level `orderId`.
    pub order_reference: Option<String>,

    /// `amount`, falling back to `orderDetails.orderPaidAmount` (minor units).
    pub paid_amount: Option<i64>,

    /// `customer.email`, falling back to `client.email`.
    pub customer_email: Option<String>,

    /// `transactions[0].uuid`.
    pub transaction_id: Option<String>,

    /// The full decoded payload, retained as the audit snapshot.
    pub raw: Value,
}

impl GatewayAnswer {
    /// Parses and structurally validates a raw `kr-answer` string.
    ///
    /// Accepts only a JSON object where at least one of `orderStatus`
    /// (string), `orderId` (string), or `orderDetails` (object) is present.
    /// Extra fields and missing optional fields are not errors.
    ///
    /// # Errors
    ///
    /// - `ParseError::InvalidJson` on a syntax error
    /// - `ParseError::UnexpectedShape` when the structural minimum fails
    pub fn parse(raw_payload: &str) -> Result<Self, ParseError> {
        let value: Value = serde_json::from_str(raw_payload)
            .map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let obj = value.as_object().ok_or(ParseError::UnexpectedShape)?;

        let has_status = obj.get("orderStatus").map_or(false, Value::is_string);
        let has_order_id = obj.get("orderId").map_or(false, Value::is_string);
        let has_details = obj.get("orderDetails").map_or(false, Value::is_object);
        if !has_status && !has_order_id && !has_details {
            return Err(ParseError::UnexpectedShape);
        }

        Ok(Self {
            order_status: string_at(&value, &["orderStatus"]),
            order_reference: string_at(&value, &["orderDetails", "orderId"])
                .or_else(|| string_at(&value, &["orderId"])),
            paid_amount: integer_at(&value, &["amount"])
                .or_else(|| integer_at(&value, &["orderDetails", "orderPaidAmount"])),
            customer_email: string_at(&value, &["customer", "email"])
                .or_else(|| string_at(&value, &["client", "email"])),
            transaction_id: value
                .get("transactions")
                .and_then(Value::as_array)
                .and_then(|txns| txns.first())
                .and_then(|t| t.get("uuid"))
                .and_then(Value::as_str)
                .map(str::to_string),
            raw: value,
        })
    }

    /// Whether the gateway reports the order as paid.
    pub fn is_paid(&self) -> bool {
        self.order_status.as_deref() == Some(STATUS_PAID)
    }

    /// Status for display/acknowledgement, `"UNKNOWN"` when absent.
    pub fn status_label(&self) -> &str {
        self.order_status.as_deref().unwrap_or("UNKNOWN")
    }
}

/// Reads a string at the given path, returning `None` on any type mismatch.
fn string_at(value: &Value, path: &[&str]) -> Option<String> {
    lookup(value, path).and_then(Value::as_str).map(str::to_string)
}

/// Reads an integer at the given path, returning `None` on any type mismatch.
fn integer_at(value: &Value, path: &[&str]) -> Option<i64> {
    lookup(value, path).and_then(Value::as_i64)
}

fn lookup<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |v, key| v.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // Structural Validation Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn parse_rejects_invalid_json() {
        let result = GatewayAnswer::parse("not json at all");
        assert!(matches!(result, Err(ParseError::InvalidJson(_))));
    }

    #[test]
    fn parse_rejects_non_object() {
        let result = GatewayAnswer::parse(r#"["orderStatus"]"#);
        assert_eq!(result.unwrap_err(), ParseError::UnexpectedShape);
    }

    #[test]
    fn parse_rejects_object_without_markers() {
        let result = GatewayAnswer::parse(r#"{"something":"else"}"#);
        assert_eq!(result.unwrap_err(), ParseError::UnexpectedShape);
    }

    #[test]
    fn parse_rejects_non_string_order_status_alone() {
        // orderStatus must be a string to count as a structural marker
        let result = GatewayAnswer::parse(r#"{"orderStatus":42}"#);
        assert_eq!(result.unwrap_err(), ParseError::UnexpectedShape);
    }

    #[test]
    fn parse_accepts_order_status_only() {
        let answer = GatewayAnswer::parse(r#"{"orderStatus":"PAID"}"#).unwrap();
        assert_eq!(answer.order_status.as_deref(), Some("PAID"));
    }

    #[test]
    fn parse_accepts_order_id_only() {
        let answer = GatewayAnswer::parse(r#"{"orderId":"ORD-7"}"#).unwrap();
        assert_eq!(answer.order_reference.as_deref(), Some("ORD-7"));
    }

    #[test]
    fn parse_accepts_order_details_only() {
        let answer = GatewayAnswer::parse(r#"{"orderDetails":{}}"#).unwrap();
        assert!(answer.order_reference.is_none());
    }

    #[test]
    fn parse_tolerates_extra_fields() {
        let answer =
            GatewayAnswer::parse(r#"{"orderStatus":"PAID","shopId":"1","future":{"x":1}}"#)
                .unwrap();
        assert!(answer.is_paid());
    }

    // ══════════════════════════════════════════════════════════════
    // Field Resolution Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn order_reference_prefers_nested_order_id() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","orderId":"TOP","orderDetails":{"orderId":"NESTED"}}"#,
        )
        .unwrap();
        assert_eq!(answer.order_reference.as_deref(), Some("NESTED"));
    }

    #[test]
    fn order_reference_falls_back_to_top_level() {
        let answer =
            GatewayAnswer::parse(r#"{"orderStatus":"PAID","orderId":"TOP"}"#).unwrap();
        assert_eq!(answer.order_reference.as_deref(), Some("TOP"));
    }

    #[test]
    fn amount_prefers_explicit_field() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","amount":5000,"orderDetails":{"orderPaidAmount":9999}}"#,
        )
        .unwrap();
        assert_eq!(answer.paid_amount, Some(5000));
    }

    #[test]
    fn amount_falls_back_to_order_paid_amount() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","orderDetails":{"orderPaidAmount":15000}}"#,
        )
        .unwrap();
        assert_eq!(answer.paid_amount, Some(15000));
    }

    #[test]
    fn email_prefers_customer_over_client() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","customer":{"email":"a@b.com"},"client":{"email":"c@d.com"}}"#,
        )
        .unwrap();
        assert_eq!(answer.customer_email.as_deref(), Some("a@b.com"));
    }

    #[test]
    fn email_falls_back_to_client() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","client":{"email":"c@d.com"}}"#,
        )
        .unwrap();
        assert_eq!(answer.customer_email.as_deref(), Some("c@d.com"));
    }

    #[test]
    fn transaction_id_reads_first_transaction_uuid() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","transactions":[{"uuid":"T-1"},{"uuid":"T-2"}]}"#,
        )
        .unwrap();
        assert_eq!(answer.transaction_id.as_deref(), Some("T-1"));
    }

    #[test]
    fn missing_optional_fields_resolve_to_none() {
        let answer = GatewayAnswer::parse(r#"{"orderStatus":"PENDING"}"#).unwrap();
        assert!(answer.order_reference.is_none());
        assert!(answer.paid_amount.is_none());
        assert!(answer.customer_email.is_none());
        assert!(answer.transaction_id.is_none());
    }

    #[test]
    fn wrong_typed_fields_resolve_to_none() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","amount":"5000","transactions":[{"uuid":42}]}"#,
        )
        .unwrap();
        assert!(answer.paid_amount.is_none());
        assert!(answer.transaction_id.is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Status Helpers
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn is_paid_matches_exact_status() {
        assert!(GatewayAnswer::parse(r#"{"orderStatus":"PAID"}"#)
            .unwrap()
            .is_paid());
        assert!(!GatewayAnswer::parse(r#"{"orderStatus":"PENDING"}"#)
            .unwrap()
            .is_paid());
        assert!(!GatewayAnswer::parse(r#"{"orderStatus":"paid"}"#)
            .unwrap()
            .is_paid());
    }

    #[test]
    fn status_label_defaults_to_unknown() {
        let answer = GatewayAnswer::parse(r#"{"orderId":"ORD-9"}"#).unwrap();
        assert_eq!(answer.status_label(), "UNKNOWN");
    }

    #[test]
    fn raw_snapshot_preserves_full_payload() {
        let answer = GatewayAnswer::parse(
            r#"{"orderStatus":"PAID","vendor":{"code":"xyz"}}"#,
        )
        .unwrap();
        assert_eq!(answer.raw["vendor"]["code"], "xyz");
    }
}
