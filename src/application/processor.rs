use super::directory::CompanyDirectory;
use super::ledger::PaymentLedger;
use super::reports::PaymentView;
use super::request::{PaymentRequest, present};
use crate::domain::card::{classify_brand, is_valid_luhn, mask_number};
use crate::domain::company::Company;
use crate::domain::payment::{
    Amount, DECLINED_REASON, Payment, PaymentDraft, PaymentMethod, PaymentStatus,
};
use crate::domain::ports::{GatewayVerdict, PaymentGatewayBox, SharedClock, SharedReportingSink};
use crate::error::{PaymentError, Result};
use chrono::{Datelike, Local};
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-zÀ-ÖØ-öø-ÿ ]{2,50}$").expect("name pattern is valid")
});
static CVV_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{3,4}$").expect("cvv pattern is valid"));
static EXPIRY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(0[1-9]|1[0-2])/([0-9]{2})$").expect("expiry pattern is valid")
});

/// How card data in a submission is trusted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionMode {
    /// The caller declares Visa or Mastercard. A card number, when given, is
    /// only Luhn-checked. Accepted payments are approved immediately.
    #[default]
    DeclaredBrand,
    /// The caller sends card number, CVV and expiry. The brand is derived
    /// from the number and a gateway decides approval.
    DerivedBrand,
}

/// Inclusive bounds on the payment amount, on top of strict positivity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPolicy {
    pub min: Option<Decimal>,
    pub max: Option<Decimal>,
}

impl AmountPolicy {
    pub fn unbounded() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    fn check(&self, amount: Decimal) -> Result<()> {
        let message = match (self.min, self.max) {
            (Some(min), Some(max)) if amount < min || amount > max => {
                format!("amount must be between {min} and {max}")
            }
            (Some(min), None) if amount < min => format!("amount must be at least {min}"),
            (None, Some(max)) if amount > max => format!("amount must be at most {max}"),
            _ => return Ok(()),
        };
        Err(PaymentError::validation("amount", message))
    }
}

impl Default for AmountPolicy {
    fn default() -> Self {
        Self {
            min: Some(dec!(100)),
            max: Some(dec!(100000)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessorSettings {
    pub mode: SubmissionMode,
    pub amounts: AmountPolicy,
}

/// Result of a submission that passed validation. Both variants are persisted
/// and carry the name of the company the payment was recorded against.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Approved(PaymentView),
    Rejected(PaymentView),
}

impl SubmissionOutcome {
    pub fn view(&self) -> &PaymentView {
        match self {
            SubmissionOutcome::Approved(v) | SubmissionOutcome::Rejected(v) => v,
        }
    }

    pub fn payment(&self) -> &Payment {
        &self.view().payment
    }

    pub fn into_view(self) -> PaymentView {
        match self {
            SubmissionOutcome::Approved(v) | SubmissionOutcome::Rejected(v) => v,
        }
    }

    pub fn into_payment(self) -> Payment {
        self.into_view().payment
    }

    pub fn is_approved(&self) -> bool {
        matches!(self, SubmissionOutcome::Approved(_))
    }
}

/// Validates submissions, records them in the ledger and replicates them.
///
/// Validation failures come back as [`PaymentError::Validation`] and are never
/// stored. A declined card is a normal [`SubmissionOutcome::Rejected`].
pub struct PaymentProcessor {
    directory: Arc<CompanyDirectory>,
    ledger: Arc<PaymentLedger>,
    gateway: PaymentGatewayBox,
    clock: SharedClock,
    sink: Option<SharedReportingSink>,
    /// In-flight publications to `sink`.
    replication: Mutex<JoinSet<()>>,
    settings: ProcessorSettings,
}

/// Card-related part of a draft.
struct CardDecision {
    method: PaymentMethod,
    masked: Option<String>,
}

impl PaymentProcessor {
    pub fn new(
        directory: Arc<CompanyDirectory>,
        ledger: Arc<PaymentLedger>,
        gateway: PaymentGatewayBox,
        clock: SharedClock,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            directory,
            ledger,
            gateway,
            clock,
            sink: None,
            replication: Mutex::new(JoinSet::new()),
            settings,
        }
    }

    /// Replicates every recorded payment to `sink`, best effort.
    pub fn with_sink(mut self, sink: SharedReportingSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn settings(&self) -> ProcessorSettings {
        self.settings
    }

    /// Waits for every pending publication to the reporting sink.
    ///
    /// Must be awaited before the runtime shuts down, or rows still in flight
    /// never reach the sink.
    pub async fn drain_replication(&self) {
        let mut pending = std::mem::take(&mut *self.replication.lock().await);
        if pending.is_empty() {
            return;
        }
        info!(pending = pending.len(), "Waiting for payment replication");
        while let Some(joined) = pending.join_next().await {
            if let Err(err) = joined {
                warn!(error = %err, "Replication task did not complete");
            }
        }
    }

    pub async fn submit(&self, request: PaymentRequest) -> Result<SubmissionOutcome> {
        let outcome = self.validate_and_record(request).await;
        if let Err(err) = &outcome {
            match err {
                PaymentError::Validation { field, message } => {
                    debug!(field = *field, message = %message, "Payment submission rejected")
                }
                other => warn!(error = %other, "Payment submission failed"),
            }
        }
        outcome
    }

    async fn validate_and_record(&self, request: PaymentRequest) -> Result<SubmissionOutcome> {
        let first_name = required(request.client_first_name.as_deref(), "clientFirstName")?;
        let last_name = required(request.client_last_name.as_deref(), "clientLastName")?;
        let company_id = required(
            request.company_id.as_ref().map(|v| v.as_str()),
            "companyId",
        )?;
        let amount = required(request.amount.as_ref().map(|v| v.as_str()), "amount")?;
        self.require_card_fields(&request)?;

        check_name(first_name, "clientFirstName")?;
        check_name(last_name, "clientLastName")?;

        let amount = parse_amount(amount)?;
        self.settings.amounts.check(amount.value())?;

        let company = self.resolve_company(company_id).await?;

        let card = match self.settings.mode {
            SubmissionMode::DeclaredBrand => declared_card(&request)?,
            SubmissionMode::DerivedBrand => self.derived_card(&request)?,
        };

        let mut draft = PaymentDraft {
            client_first_name: first_name.to_string(),
            client_last_name: last_name.to_string(),
            company_id: company.id,
            amount,
            payment_method: card.method,
            card_number_masked: card.masked,
            status: PaymentStatus::Pending,
            rejection_reason: None,
        };

        match self.settings.mode {
            SubmissionMode::DeclaredBrand => draft.approve(),
            SubmissionMode::DerivedBrand => match self.gateway.authorize(&draft) {
                GatewayVerdict::Approved => draft.approve(),
                GatewayVerdict::Declined => draft.reject(DECLINED_REASON),
            },
        }

        let payment = self.ledger.append(draft).await?;
        self.replicate(&payment, &company).await;

        let view = PaymentView {
            payment,
            company_name: company.name,
        };
        Ok(match view.payment.status {
            PaymentStatus::Rejected => SubmissionOutcome::Rejected(view),
            _ => SubmissionOutcome::Approved(view),
        })
    }

    fn require_card_fields(&self, request: &PaymentRequest) -> Result<()> {
        match self.settings.mode {
            SubmissionMode::DeclaredBrand => {
                required(request.payment_method.as_deref(), "paymentMethod")?;
            }
            SubmissionMode::DerivedBrand => {
                required(request.card_number.as_deref(), "cardNumber")?;
                required(request.cvv.as_deref(), "cvv")?;
                required(request.expiry_date.as_deref(), "expiryDate")?;
            }
        }
        Ok(())
    }

    /// Only active companies accept new payments.
    async fn resolve_company(&self, raw_id: &str) -> Result<Company> {
        let not_found = || PaymentError::validation("companyId", "company not found");
        let id: u32 = raw_id.parse().map_err(|_| not_found())?;
        match self.directory.get_by_id(id).await {
            Ok(company) if company.active => Ok(company),
            Ok(_) | Err(PaymentError::NotFound(_)) => Err(not_found()),
            Err(other) => Err(other),
        }
    }

    fn derived_card(&self, request: &PaymentRequest) -> Result<CardDecision> {
        let number = required(request.card_number.as_deref(), "cardNumber")?;
        if !is_valid_luhn(number) {
            return Err(PaymentError::validation(
                "cardNumber",
                "invalid card number, please check the digits",
            ));
        }
        let method = PaymentMethod::try_from(classify_brand(number))?;

        let cvv = required(request.cvv.as_deref(), "cvv")?;
        if !CVV_PATTERN.is_match(cvv) {
            return Err(PaymentError::validation("cvv", "invalid CVV"));
        }

        let expiry = required(request.expiry_date.as_deref(), "expiryDate")?;
        self.check_expiry(expiry)?;

        Ok(CardDecision {
            method,
            masked: Some(mask_number(number)),
        })
    }

    /// Expiry is `MM/YY`; a card stays valid through its expiry month.
    fn check_expiry(&self, expiry: &str) -> Result<()> {
        let malformed =
            || PaymentError::validation("expiryDate", "invalid expiry date, use the MM/YY format");
        let captures = EXPIRY_PATTERN.captures(expiry).ok_or_else(malformed)?;
        let month: u32 = captures[1].parse().map_err(|_| malformed())?;
        let year: i32 = captures[2].parse().map_err(|_| malformed())?;

        let today = self.clock.now().with_timezone(&Local);
        let current_year = today.year() % 100;
        let current_month = today.month();

        if year < current_year || (year == current_year && month < current_month) {
            return Err(PaymentError::validation("expiryDate", "the card has expired"));
        }
        Ok(())
    }

    async fn replicate(&self, payment: &Payment, company: &Company) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        let payment = payment.clone();
        let company_name = company.name.clone();
        let mut replication = self.replication.lock().await;
        // Reap finished publications so the set only holds pending ones
        while replication.try_join_next().is_some() {}
        replication.spawn(async move {
            if let Err(err) = sink.publish(&payment, &company_name).await {
                warn!(
                    id = payment.id,
                    receipt = %payment.receipt_number,
                    error = %err,
                    "Failed to replicate payment"
                );
            }
        });
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str> {
    present(value).ok_or_else(|| PaymentError::validation(field, format!("{field} is required")))
}

fn check_name(name: &str, field: &'static str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(PaymentError::validation(
            field,
            format!("{field} must be 2 to 50 letters or spaces"),
        ))
    }
}

fn parse_amount(raw: &str) -> Result<Amount> {
    let value = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|_| PaymentError::validation("amount", "amount must be a positive number"))?;
    Amount::new(value)
}

fn declared_card(request: &PaymentRequest) -> Result<CardDecision> {
    let method = required(request.payment_method.as_deref(), "paymentMethod")?;
    let method = PaymentMethod::from_str(method)?;

    let masked = match present(request.card_number.as_deref()) {
        Some(number) if !is_valid_luhn(number) => {
            return Err(PaymentError::validation(
                "cardNumber",
                "invalid card number, please check the digits",
            ));
        }
        Some(number) => Some(mask_number(number)),
        None => None,
    };

    Ok(CardDecision { method, masked })
}
