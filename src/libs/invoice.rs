//! Invoices, their settings and the amount-due arithmetic.
//!
//! An invoice freezes the entries of a date range together with the hourly
//! rate in force when it was created. After creation only the two client
//! timestamps may change, and each of them only once.

use crate::libs::error::{Error, Result};
use crate::libs::time_entry::{duration_nanos, total_duration, TimeEntry};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Slot key of the single settings row.
pub const SETTINGS_SLOT: &str = "primary";

const NANOS_PER_HOUR: f64 = 3.6e12;

/// Billing configuration. Exactly one is active at a time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct InvoiceSettings {
    pub id: Option<i64>,
    pub hourly_rate: f64,
    pub recipient: String,
    pub sender: String,
}

impl Default for InvoiceSettings {
    fn default() -> Self {
        InvoiceSettings {
            id: None,
            hourly_rate: 0.0,
            recipient: String::new(),
            sender: String::new(),
        }
    }
}

impl InvoiceSettings {
    pub fn new(hourly_rate: f64, recipient: &str, sender: &str) -> Self {
        InvoiceSettings {
            id: None,
            hourly_rate,
            recipient: recipient.to_string(),
            sender: sender.to_string(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !self.hourly_rate.is_finite() || self.hourly_rate <= 0.0 {
            return Err(Error::InvalidSettings(format!("hourly rate must be positive, got {}", self.hourly_rate)));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Invoice {
    pub id: Option<i64>,
    pub invoice_settings_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "duration_nanos")]
    pub duration: Duration,
    pub amount_due: f64,
    pub sent_to_client: Option<DateTime<Utc>>,
    pub paid_by_client: Option<DateTime<Utc>>,
    pub archived: bool,
    /// Contributing entries in the order they were linked.
    pub time_entries: Vec<TimeEntry>,
}

impl Invoice {
    /// Builds an unsaved invoice for `entries` billed at the settings' rate.
    pub fn calculate(settings: &InvoiceSettings, start_date: NaiveDate, end_date: NaiveDate, entries: Vec<TimeEntry>) -> Result<Self> {
        let invoice_settings_id = settings
            .id
            .ok_or_else(|| Error::InvalidSettings("settings have not been stored".to_string()))?;
        let duration = total_duration(&entries);

        Ok(Invoice {
            id: None,
            invoice_settings_id,
            start_date,
            end_date,
            duration,
            amount_due: amount_due(&duration, settings.hourly_rate),
            sent_to_client: None,
            paid_by_client: None,
            archived: false,
            time_entries: entries,
        })
    }

    /// Applies the requested timestamps, refusing empty requests and
    /// overwrites of fields that are already set.
    pub fn apply(&mut self, update: &InvoiceUpdate) -> Result<()> {
        if update.is_empty() {
            return Err(Error::NoUpdateRequested);
        }
        if update.sent_to_client.is_some() && self.sent_to_client.is_some() {
            return Err(Error::AlreadySet { field: "sent_to_client" });
        }
        if update.paid_by_client.is_some() && self.paid_by_client.is_some() {
            return Err(Error::AlreadySet { field: "paid_by_client" });
        }

        if let Some(sent) = update.sent_to_client {
            self.sent_to_client = Some(sent);
        }
        if let Some(paid) = update.paid_by_client {
            self.paid_by_client = Some(paid);
        }
        Ok(())
    }
}

/// Fields an invoice update may set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InvoiceUpdate {
    pub sent_to_client: Option<DateTime<Utc>>,
    pub paid_by_client: Option<DateTime<Utc>>,
}

impl InvoiceUpdate {
    pub fn is_empty(&self) -> bool {
        self.sent_to_client.is_none() && self.paid_by_client.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub ids: Vec<i64>,
    pub archived: Option<bool>,
}

/// Fractional hours in `duration`.
pub fn total_hours(duration: &Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(nanos) => nanos as f64 / NANOS_PER_HOUR,
        None => duration.num_milliseconds() as f64 / (NANOS_PER_HOUR / 1e6),
    }
}

pub fn amount_due(duration: &Duration, hourly_rate: f64) -> f64 {
    total_hours(duration) * hourly_rate
}
