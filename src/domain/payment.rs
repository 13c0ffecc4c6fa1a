use super::card::CardBrand;
use crate::error::PaymentError;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Reason recorded on payments declined by the gateway.
pub const DECLINED_REASON: &str = "insufficient funds or issuer problem";

/// Represents a positive monetary amount for payments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Result<Self, PaymentError> {
        if value > Decimal::ZERO {
            Ok(Self(value))
        } else {
            Err(PaymentError::validation(
                "amount",
                "amount must be a positive number",
            ))
        }
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Amount {
    type Error = PaymentError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Card network a payment was charged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMethod {
    Visa,
    Mastercard,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Visa => f.write_str("Visa"),
            PaymentMethod::Mastercard => f.write_str("Mastercard"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Visa" => Ok(PaymentMethod::Visa),
            "Mastercard" => Ok(PaymentMethod::Mastercard),
            other => Err(PaymentError::validation(
                "paymentMethod",
                format!("unsupported payment method '{other}', expected Visa or Mastercard"),
            )),
        }
    }
}

impl TryFrom<CardBrand> for PaymentMethod {
    type Error = PaymentError;

    fn try_from(brand: CardBrand) -> Result<Self, Self::Error> {
        match brand {
            CardBrand::Visa => Ok(PaymentMethod::Visa),
            CardBrand::Mastercard => Ok(PaymentMethod::Mastercard),
            CardBrand::Unknown => Err(PaymentError::validation(
                "cardNumber",
                "unsupported card type, only Visa and Mastercard are accepted",
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => f.write_str("pending"),
            PaymentStatus::Approved => f.write_str("approved"),
            PaymentStatus::Rejected => f.write_str("rejected"),
        }
    }
}

/// Human-presentable token identifying a stored payment.
///
/// Built from the creation date and the ledger id, e.g. `BR-20260315-000042`.
/// Unique because ids are.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReceiptNumber(String);

impl ReceiptNumber {
    pub fn generate(id: u32, created_at: DateTime<Utc>) -> Self {
        Self(format!("BR-{}-{:06}", created_at.format("%Y%m%d"), id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated submission waiting for the ledger to assign identity.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentDraft {
    pub client_first_name: String,
    pub client_last_name: String,
    pub company_id: u32,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    pub card_number_masked: Option<String>,
    pub status: PaymentStatus,
    pub rejection_reason: Option<String>,
}

impl PaymentDraft {
    pub fn approve(&mut self) {
        self.status = PaymentStatus::Approved;
        self.rejection_reason = None;
    }

    pub fn reject(&mut self, reason: impl Into<String>) {
        self.status = PaymentStatus::Rejected;
        self.rejection_reason = Some(reason.into());
    }
}

/// A stored payment. Immutable once appended to the ledger.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: u32,
    pub receipt_number: ReceiptNumber,
    pub client_first_name: String,
    pub client_last_name: String,
    pub company_id: u32,
    pub amount: Amount,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_number_masked: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl Payment {
    pub fn from_draft(
        id: u32,
        receipt_number: ReceiptNumber,
        timestamp: DateTime<Utc>,
        draft: PaymentDraft,
    ) -> Self {
        let rejection_reason = match draft.status {
            PaymentStatus::Rejected => draft.rejection_reason,
            _ => None,
        };
        Self {
            id,
            receipt_number,
            client_first_name: draft.client_first_name,
            client_last_name: draft.client_last_name,
            company_id: draft.company_id,
            amount: draft.amount,
            payment_method: draft.payment_method,
            card_number_masked: draft.card_number_masked,
            timestamp,
            status: draft.status,
            rejection_reason,
        }
    }
}

/// Conjunction of optional constraints. Absent fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentFilter {
    pub company_id: Option<u32>,
    /// Inclusive, compared against the calendar date of the timestamp.
    pub date_from: Option<NaiveDate>,
    /// Inclusive, compared against the calendar date of the timestamp.
    pub date_to: Option<NaiveDate>,
    pub method: Option<PaymentMethod>,
}

impl PaymentFilter {
    /// Matches using the server's local calendar date.
    pub fn matches(&self, payment: &Payment) -> bool {
        self.matches_in(payment, &Local)
    }

    pub fn matches_in<Tz: TimeZone>(&self, payment: &Payment, tz: &Tz) -> bool {
        if self.company_id.is_some_and(|id| id != payment.company_id) {
            return false;
        }
        if self.method.is_some_and(|m| m != payment.payment_method) {
            return false;
        }
        let day = payment.timestamp.with_timezone(tz).date_naive();
        if self.date_from.is_some_and(|from| day < from) {
            return false;
        }
        if self.date_to.is_some_and(|to| day > to) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PaymentSort {
    /// Most recent first; ties broken by descending id.
    #[default]
    NewestFirst,
    /// Order of appending, i.e. ascending id.
    Insertion,
}

impl PaymentSort {
    pub fn apply(self, payments: &mut [Payment]) {
        match self {
            PaymentSort::NewestFirst => payments.sort_by(|a, b| {
                b.timestamp
                    .cmp(&a.timestamp)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            PaymentSort::Insertion => payments.sort_by_key(|p| p.id),
        }
    }
}

/// Aggregates over a set of payments. Every figure is zero for an empty set.
/// A total beyond the range of [`Decimal`] is an [`PaymentError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStats {
    pub count: usize,
    pub total_amount: Decimal,
    pub average_amount: Decimal,
    pub min_amount: Decimal,
    pub max_amount: Decimal,
}

impl PaymentStats {
    pub fn from_payments<'a>(
        payments: impl IntoIterator<Item = &'a Payment>,
    ) -> Result<Self, PaymentError> {
        let mut count = 0usize;
        let mut total = Decimal::ZERO;
        let mut min: Option<Decimal> = None;
        let mut max: Option<Decimal> = None;

        for payment in payments {
            let amount = payment.amount.value();
            count += 1;
            total = total.checked_add(amount).ok_or_else(|| {
                PaymentError::Overflow(format!("total of {count} payments"))
            })?;
            min = Some(min.map_or(amount, |m| m.min(amount)));
            max = Some(max.map_or(amount, |m| m.max(amount)));
        }

        let average_amount = if count == 0 {
            Decimal::ZERO
        } else {
            (total / Decimal::from(count))
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        };

        Ok(Self {
            count,
            total_amount: total,
            average_amount,
            min_amount: min.unwrap_or(Decimal::ZERO),
            max_amount: max.unwrap_or(Decimal::ZERO),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn payment(id: u32, company_id: u32, amount: Decimal, at: DateTime<Utc>) -> Payment {
        let draft = PaymentDraft {
            client_first_name: "Ana".into(),
            client_last_name: "Lopez".into(),
            company_id,
            amount: Amount::new(amount).unwrap(),
            payment_method: PaymentMethod::Visa,
            card_number_masked: None,
            status: PaymentStatus::Approved,
            rejection_reason: None,
        };
        Payment::from_draft(id, ReceiptNumber::generate(id, at), at, draft)
    }

    #[test]
    fn test_amount_validation() {
        assert!(Amount::new(dec!(1.0)).is_ok());
        assert!(matches!(
            Amount::new(dec!(0.0)),
            Err(PaymentError::Validation { field: "amount", .. })
        ));
        assert!(matches!(
            Amount::new(dec!(-1.0)),
            Err(PaymentError::Validation { .. })
        ));
    }

    #[test]
    fn test_amount_deserialization_rejects_non_positive() {
        assert!(serde_json::from_str::<Amount>("\"12.50\"").is_ok());
        assert!(serde_json::from_str::<Amount>("\"0\"").is_err());
    }

    #[test]
    fn test_payment_method_parsing() {
        assert_eq!("Visa".parse::<PaymentMethod>().unwrap(), PaymentMethod::Visa);
        assert_eq!(
            " Mastercard ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Mastercard
        );
        assert!("Amex".parse::<PaymentMethod>().is_err());
        assert!("visa".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_unknown_brand_is_not_a_payment_method() {
        assert!(PaymentMethod::try_from(CardBrand::Unknown).is_err());
        assert_eq!(
            PaymentMethod::try_from(CardBrand::Mastercard).unwrap(),
            PaymentMethod::Mastercard
        );
    }

    #[test]
    fn test_receipt_number_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        assert_eq!(ReceiptNumber::generate(42, at).as_str(), "BR-20260315-000042");
        assert_eq!(
            ReceiptNumber::generate(1_234_567, at).as_str(),
            "BR-20260315-1234567"
        );
    }

    #[test]
    fn test_rejection_reason_only_kept_for_rejected() {
        let at = Utc.with_ymd_and_hms(2026, 3, 15, 10, 0, 0).unwrap();
        let mut p = payment(1, 1, dec!(100), at);
        assert!(p.rejection_reason.is_none());

        let mut draft = PaymentDraft {
            client_first_name: p.client_first_name.clone(),
            client_last_name: p.client_last_name.clone(),
            company_id: 1,
            amount: p.amount,
            payment_method: PaymentMethod::Visa,
            card_number_masked: None,
            status: PaymentStatus::Pending,
            rejection_reason: None,
        };
        draft.reject(DECLINED_REASON);
        p = Payment::from_draft(2, ReceiptNumber::generate(2, at), at, draft);
        assert_eq!(p.status, PaymentStatus::Rejected);
        assert_eq!(p.rejection_reason.as_deref(), Some(DECLINED_REASON));
    }

    #[test]
    fn test_filter_conjunction() {
        let day1 = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let day2 = Utc.with_ymd_and_hms(2026, 3, 12, 12, 0, 0).unwrap();
        let p1 = payment(1, 1, dec!(100), day1);
        let p2 = payment(2, 2, dec!(200), day2);

        let all = PaymentFilter::default();
        assert!(all.matches_in(&p1, &Utc) && all.matches_in(&p2, &Utc));

        let by_company = PaymentFilter {
            company_id: Some(2),
            ..Default::default()
        };
        assert!(!by_company.matches_in(&p1, &Utc));
        assert!(by_company.matches_in(&p2, &Utc));

        let inclusive_day = PaymentFilter {
            date_from: NaiveDate::from_ymd_opt(2026, 3, 12),
            date_to: NaiveDate::from_ymd_opt(2026, 3, 12),
            ..Default::default()
        };
        assert!(!inclusive_day.matches_in(&p1, &Utc));
        assert!(inclusive_day.matches_in(&p2, &Utc));

        let by_method = PaymentFilter {
            method: Some(PaymentMethod::Mastercard),
            ..Default::default()
        };
        assert!(!by_method.matches_in(&p1, &Utc));
    }

    #[test]
    fn test_sorting() {
        let early = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2026, 3, 11, 12, 0, 0).unwrap();
        let mut payments = vec![
            payment(1, 1, dec!(1), early),
            payment(2, 1, dec!(1), late),
            payment(3, 1, dec!(1), early),
        ];

        PaymentSort::NewestFirst.apply(&mut payments);
        let ids: Vec<u32> = payments.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);

        PaymentSort::Insertion.apply(&mut payments);
        let ids: Vec<u32> = payments.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_stats() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let payments = [
            payment(1, 1, dec!(100), at),
            payment(2, 1, dec!(250.50), at),
            payment(3, 1, dec!(150), at),
        ];
        let stats = PaymentStats::from_payments(&payments).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total_amount, dec!(500.50));
        assert_eq!(stats.average_amount, dec!(166.83));
        assert_eq!(stats.min_amount, dec!(100));
        assert_eq!(stats.max_amount, dec!(250.50));
    }

    #[test]
    fn test_stats_of_empty_set_are_zero() {
        let stats = PaymentStats::from_payments(&Vec::<Payment>::new()).unwrap();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_amount, Decimal::ZERO);
        assert_eq!(stats.average_amount, Decimal::ZERO);
        assert_eq!(stats.min_amount, Decimal::ZERO);
        assert_eq!(stats.max_amount, Decimal::ZERO);
    }

    #[test]
    fn test_stats_total_overflow_is_an_error() {
        let at = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        let payments = [payment(1, 1, Decimal::MAX, at), payment(2, 1, Decimal::MAX, at)];
        let err = PaymentStats::from_payments(&payments).unwrap_err();
        assert!(matches!(err, PaymentError::Overflow(_)));
        assert!(err.is_server_side());

        // A single maximal amount still aggregates
        let stats = PaymentStats::from_payments(&payments[..1]).unwrap();
        assert_eq!(stats.total_amount, Decimal::MAX);
        assert_eq!(stats.average_amount, Decimal::MAX);
    }
}
