//! Callback processor - Orchestrates verification, parsing, recording, and
//! notification for gateway payment notifications.
//!
//! ## Flow
//!
//! `Received -> SignatureChecked -> Parsed -> (Paid | NotPaid) -> Recorded
//! -> Notified -> Acknowledged`, with `Rejected` terminal on any
//! verification or parse failure (before any side effect).
//!
//! Both entry channels share this flow; they differ only in which signing
//! key verifies the payload, whether a pending order is promoted, and how
//! the caller renders the acknowledgement.
//!
//! ## Duplicate Delivery
//!
//! The gateway retries notifications and may deliver both channels for one
//! transaction concurrently. The store's atomic upsert by identity key is
//! the only dedup mechanism; the processor itself holds no cross-request
//! state.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::answer::GatewayAnswer;
use super::errors::CallbackError;
use super::signature;
use crate::ports::{NotificationDispatcher, OrderService, PaymentRecordStore};

/// The two delivery channels the gateway uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackChannel {
    /// Browser-redirected POST from the hosted payment page.
    Checkout,
    /// Server-to-server instant payment notification.
    Ipn,
}

impl CallbackChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallbackChannel::Checkout => "checkout",
            CallbackChannel::Ipn => "ipn",
        }
    }
}

/// Result of successfully processing a notification.
///
/// Each channel builds its own acknowledgement from this: the checkout
/// channel a JSON body, the IPN channel the gateway's literal plaintext
/// `OK! OrderStatus is <status>`.
#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    /// Gateway order status, `"UNKNOWN"` when absent.
    pub status: String,

    /// Merchant order reference, when the answer carried one.
    pub order_reference: Option<String>,

    /// Gateway transaction uuid, when the answer carried one.
    pub transaction_id: Option<String>,

    /// Whether a payment record was written (only `PAID` answers persist).
    pub recorded: bool,
}

/// Processes gateway notifications for both channels.
pub struct CallbackProcessor {
    store: Arc<dyn PaymentRecordStore>,
    notifier: Arc<dyn NotificationDispatcher>,
    orders: Option<Arc<dyn OrderService>>,
    callback_key: SecretString,
    ipn_key: SecretString,
    operator_email: String,
}

impl CallbackProcessor {
    /// Creates a processor with the two channel keys and the operator
    /// mailbox that receives a copy of every confirmation.
    pub fn new(
        store: Arc<dyn PaymentRecordStore>,
        notifier: Arc<dyn NotificationDispatcher>,
        callback_key: SecretString,
        ipn_key: SecretString,
        operator_email: impl Into<String>,
    ) -> Self {
        Self {
            store,
            notifier,
            orders: None,
            callback_key,
            ipn_key,
            operator_email: operator_email.into(),
        }
    }

    /// Enables pending-order promotion on the checkout channel.
    pub fn with_order_service(mut self, orders: Arc<dyn OrderService>) -> Self {
        self.orders = Some(orders);
        self
    }

    /// Signing key for the given channel. The verification function is
    /// shared; only the key differs.
    fn key_for(&self, channel: CallbackChannel) -> &str {
        match channel {
            CallbackChannel::Checkout => self.callback_key.expose_secret(),
            CallbackChannel::Ipn => self.ipn_key.expose_secret(),
        }
    }

    /// Processes one raw notification.
    ///
    /// `raw_answer` must be the exact `kr-answer` string as received and
    /// `provided_hash` the `kr-hash` hex digest.
    ///
    /// # Errors
    ///
    /// - `CallbackError::InvalidSignature` before any side effect
    /// - `CallbackError::Parse` before any side effect
    /// - `CallbackError::Storage` after verification, before notification;
    ///   the caller must answer 5xx so the gateway retries
    pub async fn process(
        &self,
        channel: CallbackChannel,
        raw_answer: &str,
        provided_hash: &str,
    ) -> Result<CallbackOutcome, CallbackError> {
        // 1. Verify the signature over the exact received bytes.
        if !signature::verify(raw_answer, provided_hash, self.key_for(channel)) {
            tracing::warn!(channel = channel.as_str(), "rejected notification: bad signature");
            return Err(CallbackError::InvalidSignature);
        }

        // 2. Parse and structurally validate the answer.
        let answer = GatewayAnswer::parse(raw_answer)?;
        let status = answer.status_label().to_string();

        // 3. Non-paid answers acknowledge immediately: no record, no email.
        if !answer.is_paid() {
            tracing::info!(
                channel = channel.as_str(),
                status = %status,
                order_reference = answer.order_reference.as_deref().unwrap_or("-"),
                "notification acknowledged without recording"
            );
            return Ok(CallbackOutcome {
                status,
                order_reference: answer.order_reference.clone(),
                transaction_id: answer.transaction_id.clone(),
                recorded: false,
            });
        }

        // 4. Record the payment; the upsert is the dedup point.
        let outcome = self.store.upsert_from_answer(&answer).await?;
        tracing::info!(
            channel = channel.as_str(),
            transaction_id = answer.transaction_id.as_deref().unwrap_or("-"),
            order_reference = answer.order_reference.as_deref().unwrap_or("-"),
            inserted = outcome.was_inserted(),
            "payment recorded"
        );

        // 5. Checkout variant: promote the pending order, if wired.
        if channel == CallbackChannel::Checkout {
            self.promote_pending_order(&answer).await;
        }

        // 6. Notify payer and operator. Failures are logged, never fatal:
        //    the financial fact is already durable.
        self.send_confirmations(&answer).await;

        Ok(CallbackOutcome {
            status,
            order_reference: answer.order_reference.clone(),
            transaction_id: answer.transaction_id.clone(),
            recorded: true,
        })
    }

    async fn promote_pending_order(&self, answer: &GatewayAnswer) {
        let Some(orders) = &self.orders else { return };
        let Some(reference) = &answer.order_reference else {
            return;
        };

        match orders.find_by_reference(reference).await {
            Ok(Some(pending)) => {
                if let Err(err) = orders.create_confirmed(&pending).await {
                    tracing::error!(
                        order_reference = %reference,
                        error = %err,
                        "failed to create confirmed order"
                    );
                }
            }
            Ok(None) => {
                tracing::warn!(order_reference = %reference, "no pending order for paid notification");
            }
            Err(err) => {
                tracing::error!(
                    order_reference = %reference,
                    error = %err,
                    "pending order lookup failed"
                );
            }
        }
    }

    async fn send_confirmations(&self, answer: &GatewayAnswer) {
        let reference = answer.order_reference.as_deref().unwrap_or("unknown");
        let amount = answer.paid_amount.unwrap_or(0);

        if let Some(email) = &answer.customer_email {
            if let Err(err) = self
                .notifier
                .send_confirmation(email, reference, amount, None, None)
                .await
            {
                tracing::warn!(recipient = %email, error = %err, "customer confirmation failed");
            }
        }

        if let Err(err) = self
            .notifier
            .send_confirmation(
                &self.operator_email,
                reference,
                amount,
                Some("Payment confirmed - operations"),
                Some("Payments"),
            )
            .await
        {
            tracing::warn!(
                recipient = %self.operator_email,
                error = %err,
                "operator confirmation failed"
            );
        }
    }
}
