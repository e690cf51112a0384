//! Derived queries over one tenant's records
//!
//! Everything here is a pure function of the loaded collections and `now`.

use chrono::{DateTime, FixedOffset, Utc};
use lavapro_common::clock::{days_between, period_start};
use lavapro_common::{EntityId, Period};
use serde::Serialize;

use crate::model::{Client, Offer, Service, ServiceRecord};
use crate::money::Money;
use crate::{Result, TenantError};

/// Placeholder shown for a record pointing at a service no longer in the catalog
pub const UNKNOWN_SERVICE: &str = "Serviço desconhecido";

/// Sum of `totalValue` for records at or after the start of `period`
pub fn revenue_for(
    records: &[ServiceRecord],
    period: Period,
    now: DateTime<Utc>,
    offset: FixedOffset,
) -> Money {
    let start = period_start(period, now, offset);
    records
        .iter()
        .filter(|r| r.recorded_at >= start)
        .map(|r| r.total_value)
        .sum()
}

/// Revenue for the current day, week and month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueSummary {
    pub day: Money,
    pub week: Money,
    pub month: Money,
}

impl RevenueSummary {
    pub fn compute(records: &[ServiceRecord], now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self {
            day: revenue_for(records, Period::Day, now, offset),
            week: revenue_for(records, Period::Week, now, offset),
            month: revenue_for(records, Period::Month, now, offset),
        }
    }

    pub fn get(&self, period: Period) -> Money {
        match period {
            Period::Day => self.day,
            Period::Week => self.week,
            Period::Month => self.month,
        }
    }

    /// Two-column metric/value report, amounts rounded for display
    pub fn to_csv(&self) -> Result<String> {
        let mut writer = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Always)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer.write_record(["Métrica", "Valor"]).map_err(export_error)?;
        for period in Period::ALL {
            writer
                .write_record([period_label(period), self.get(period).display().as_str()])
                .map_err(export_error)?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| TenantError::Export(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|e| TenantError::Export(e.to_string()))
    }
}

fn period_label(period: Period) -> &'static str {
    match period {
        Period::Day => "Faturamento do Dia",
        Period::Week => "Faturamento Semanal",
        Period::Month => "Faturamento Mensal",
    }
}

fn export_error(e: csv::Error) -> TenantError {
    TenantError::Export(e.to_string())
}

/// Records of one client, newest first
pub fn records_of(records: &[ServiceRecord], client_id: &EntityId) -> Vec<ServiceRecord> {
    let mut own: Vec<ServiceRecord> = records
        .iter()
        .filter(|r| &r.client_id == client_id)
        .cloned()
        .collect();
    own.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
    own
}

/// Most recent visit of one client
pub fn last_visit(records: &[ServiceRecord], client_id: &EntityId) -> Option<DateTime<Utc>> {
    records
        .iter()
        .filter(|r| &r.client_id == client_id)
        .map(|r| r.recorded_at)
        .max()
}

/// Clients never serviced, or whose last visit is more than `threshold_days` old
pub fn stale_clients(
    clients: &[Client],
    records: &[ServiceRecord],
    threshold_days: u32,
    now: DateTime<Utc>,
) -> Vec<Client> {
    clients
        .iter()
        .filter(|client| match last_visit(records, &client.id) {
            None => true,
            Some(last) => days_between(last, now) > f64::from(threshold_days),
        })
        .cloned()
        .collect()
}

/// Record with catalog references resolved for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordView {
    pub record: ServiceRecord,
    pub service_names: Vec<String>,
    pub offer_name: Option<String>,
}

impl RecordView {
    /// Dangling references resolve to a placeholder instead of failing
    pub fn resolve(record: ServiceRecord, services: &[Service], offers: &[Offer]) -> Self {
        let service_names = record
            .service_ids
            .iter()
            .map(|id| {
                services
                    .iter()
                    .find(|s| &s.id == id)
                    .map_or_else(|| UNKNOWN_SERVICE.to_string(), |s| s.name.clone())
            })
            .collect();
        let offer_name = record
            .offer_id
            .as_ref()
            .and_then(|id| offers.iter().find(|o| &o.id == id))
            .map(|o| o.name.clone());

        Self {
            record,
            service_names,
            offer_name,
        }
    }
}

/// Client page: the client, its history and last visit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientDetail {
    pub client: Client,
    pub records: Vec<RecordView>,
    pub last_visit: Option<DateTime<Utc>>,
}
