use crate::domain::payment::PaymentDraft;
use crate::domain::ports::{GatewayVerdict, PaymentGateway};
use crate::error::{PaymentError, Result};
use rand::Rng;

/// Approval probability used when none is configured.
pub const DEFAULT_APPROVAL_RATE: f64 = 0.9;

/// Stand-in for a card issuer: approves each payment with a fixed probability.
#[derive(Debug, Clone, Copy)]
pub struct SimulatedGateway {
    approval_rate: f64,
}

impl SimulatedGateway {
    pub fn new(approval_rate: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&approval_rate) {
            return Err(PaymentError::validation(
                "approvalRate",
                format!("approval rate must be within [0, 1], got {approval_rate}"),
            ));
        }
        Ok(Self { approval_rate })
    }

    pub fn approval_rate(&self) -> f64 {
        self.approval_rate
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self {
            approval_rate: DEFAULT_APPROVAL_RATE,
        }
    }
}

impl PaymentGateway for SimulatedGateway {
    fn authorize(&self, _draft: &PaymentDraft) -> GatewayVerdict {
        if rand::thread_rng().gen_bool(self.approval_rate) {
            GatewayVerdict::Approved
        } else {
            GatewayVerdict::Declined
        }
    }
}

/// Always answers with the same verdict.
#[derive(Debug, Clone, Copy)]
pub struct FixedGateway(pub GatewayVerdict);

impl PaymentGateway for FixedGateway {
    fn authorize(&self, _draft: &PaymentDraft) -> GatewayVerdict {
        self.0
    }
}
