//! Payment gateway seam
//!
//! Coin purchases clear through an external payment provider. The ledger only
//! cares whether the charge was approved, so the seam is a synchronous
//! boolean-result trait; retries, timeouts and provider protocols live in the
//! gateway implementation. The doubles in this module stand in for the
//! provider in tests.

use parking_lot::Mutex;
use std::collections::VecDeque;

/// A charge the ledger asks the gateway to process
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub user_id: String,
    /// Number of coins being bought
    pub coins: u64,
    /// Opaque payment method identifier (e.g. "upi", "card")
    pub method: String,
}

/// The gateway's verdict on a charge
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub approved: bool,
    /// Provider-side reference for approved charges
    pub reference: Option<String>,
    /// Provider-side reason for declined charges
    pub decline_reason: Option<String>,
}

impl PaymentOutcome {
    pub fn approved(reference: &str) -> Self {
        Self {
            approved: true,
            reference: Some(reference.to_string()),
            decline_reason: None,
        }
    }

    pub fn declined(reason: &str) -> Self {
        Self {
            approved: false,
            reference: None,
            decline_reason: Some(reason.to_string()),
        }
    }
}

/// External payment collaborator. Implementations may block on network I/O;
/// the ledger never calls this while holding a wallet lock.
pub trait PaymentGateway: Send + Sync {
    fn process_payment(&self, request: &PaymentRequest) -> PaymentOutcome;
}

/// Test double that approves every charge
#[derive(Debug, Default)]
pub struct ApprovingGateway;

impl PaymentGateway for ApprovingGateway {
    fn process_payment(&self, request: &PaymentRequest) -> PaymentOutcome {
        PaymentOutcome::approved(&format!("ok-{}-{}", request.user_id, request.coins))
    }
}

/// Test double that declines every charge
#[derive(Debug, Default)]
pub struct DecliningGateway;

impl PaymentGateway for DecliningGateway {
    fn process_payment(&self, _request: &PaymentRequest) -> PaymentOutcome {
        PaymentOutcome::declined("card declined")
    }
}

/// Test double that replays a scripted sequence of outcomes, then declines
pub struct ScriptedGateway {
    outcomes: Mutex<VecDeque<PaymentOutcome>>,
}

impl ScriptedGateway {
    pub fn new(outcomes: impl IntoIterator<Item = PaymentOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
        }
    }
}

impl PaymentGateway for ScriptedGateway {
    fn process_payment(&self, _request: &PaymentRequest) -> PaymentOutcome {
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| PaymentOutcome::declined("script exhausted"))
    }
}
