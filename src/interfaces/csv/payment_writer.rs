use crate::application::reports::PaymentView;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 12] = [
    "id",
    "receipt_number",
    "timestamp",
    "client_first_name",
    "client_last_name",
    "company_id",
    "company_name",
    "amount",
    "payment_method",
    "status",
    "card_number_masked",
    "rejection_reason",
];

#[derive(Serialize)]
struct PaymentRow<'a> {
    id: u32,
    receipt_number: &'a str,
    timestamp: String,
    client_first_name: &'a str,
    client_last_name: &'a str,
    company_id: u32,
    company_name: &'a str,
    amount: String,
    payment_method: String,
    status: String,
    card_number_masked: Option<&'a str>,
    rejection_reason: Option<&'a str>,
}

impl<'a> From<&'a PaymentView> for PaymentRow<'a> {
    fn from(view: &'a PaymentView) -> Self {
        let p = &view.payment;
        Self {
            id: p.id,
            receipt_number: p.receipt_number.as_str(),
            timestamp: p.timestamp.to_rfc3339(),
            client_first_name: &p.client_first_name,
            client_last_name: &p.client_last_name,
            company_id: p.company_id,
            company_name: &view.company_name,
            amount: format!("{:.2}", p.amount.value()),
            payment_method: p.payment_method.to_string(),
            status: p.status.to_string(),
            card_number_masked: p.card_number_masked.as_deref(),
            rejection_reason: p.rejection_reason.as_deref(),
        }
    }
}

/// Writes payments as CSV, one row per payment, header first.
pub struct PaymentWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> PaymentWriter<W> {
    /// Creates the writer and emits the header right away, so an empty
    /// result still produces a well-formed file.
    pub fn new(sink: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(sink);
        writer.write_record(HEADER)?;
        Ok(Self { writer })
    }

    pub fn write(&mut self, view: &PaymentView) -> Result<()> {
        self.writer.serialize(PaymentRow::from(view))?;
        Ok(())
    }

    pub fn write_all<'a>(&mut self, views: impl IntoIterator<Item = &'a PaymentView>) -> Result<()> {
        for view in views {
            self.write(view)?;
        }
        self.flush()
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
