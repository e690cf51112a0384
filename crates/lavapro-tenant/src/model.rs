//! Tenant-scoped entities
//!
//! Wire names follow the stored shapes (`phone`, `carModel`, `licensePlate`,
//! `discountPercentage`, `serviceIds`, `offerId`, `date`).

use chrono::{DateTime, Utc};
use lavapro_common::{required, EntityId};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::{Result, TenantError};

/// Customer of the business
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: EntityId,
    pub name: String,
    #[serde(rename = "phone")]
    pub contact: String,
    pub car_model: String,
    pub license_plate: String,
}

/// Client fields as entered; used for both create and edit
#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub name: String,
    pub contact: String,
    pub car_model: String,
    pub license_plate: String,
}

impl ClientInput {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        car_model: impl Into<String>,
        license_plate: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            car_model: car_model.into(),
            license_plate: license_plate.into(),
        }
    }

    pub(crate) fn into_client(self, id: EntityId) -> Result<Client> {
        Ok(Client {
            id,
            name: required("name", &self.name).map_err(TenantError::Validation)?,
            contact: required("contact", &self.contact).map_err(TenantError::Validation)?,
            car_model: required("car model", &self.car_model).map_err(TenantError::Validation)?,
            license_plate: required("license plate", &self.license_plate)
                .map_err(TenantError::Validation)?,
        })
    }
}

/// Catalog entry priced per unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: EntityId,
    pub name: String,
    pub price: Money,
}

impl Service {
    pub(crate) fn create(name: &str, price: Money) -> Result<Self> {
        let name = required("name", name).map_err(TenantError::Validation)?;
        if !price.is_positive() {
            return Err(TenantError::Validation("price must be positive".into()));
        }
        Ok(Self { id: EntityId::new(), name, price })
    }
}

/// Catalog discount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Offer {
    pub id: EntityId,
    pub name: String,
    pub discount_percentage: Decimal,
}

impl Offer {
    pub(crate) fn create(name: &str, discount_percentage: Decimal) -> Result<Self> {
        let name = required("name", name).map_err(TenantError::Validation)?;
        if discount_percentage < Decimal::ZERO || discount_percentage > dec!(100) {
            return Err(TenantError::Validation(
                "discount percentage must be between 0 and 100".into(),
            ));
        }
        Ok(Self {
            id: EntityId::new(),
            name,
            discount_percentage,
        })
    }
}

/// Completed service, with its financial figures frozen at creation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub id: EntityId,
    pub client_id: EntityId,
    pub service_ids: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_id: Option<EntityId>,
    pub subtotal: Money,
    pub discount_amount: Money,
    pub total_value: Money,
    #[serde(rename = "date")]
    pub recorded_at: DateTime<Utc>,
}

impl ServiceRecord {
    /// Price the selection against the current catalog.
    ///
    /// `selected` holds one resolved catalog entry per requested id, in order;
    /// a repeated id is charged once per occurrence.
    pub(crate) fn price(
        client_id: EntityId,
        selected: &[&Service],
        offer: Option<&Offer>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if selected.is_empty() {
            return Err(TenantError::NoServicesSelected);
        }

        let subtotal: Money = selected.iter().map(|s| s.price).sum();
        let percentage = offer.map_or(Decimal::ZERO, |o| o.discount_percentage);
        let discount_amount = subtotal.percent(percentage);

        Ok(Self {
            id: EntityId::new(),
            client_id,
            service_ids: selected.iter().map(|s| s.id.clone()).collect(),
            offer_id: offer.map(|o| o.id.clone()),
            subtotal,
            discount_amount,
            total_value: subtotal - discount_amount,
            recorded_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap()
    }

    #[test]
    fn test_wash_and_wax_with_ten_percent() {
        let wash = Service::create("Lavagem", Money::new(dec!(30.00))).unwrap();
        let wax = Service::create("Cera", Money::new(dec!(20.00))).unwrap();
        let offer = Offer::create("10% OFF", dec!(10)).unwrap();

        let record = ServiceRecord::price(EntityId::new(), &[&wash, &wax], Some(&offer), now()).unwrap();
        assert_eq!(record.subtotal.amount(), dec!(50.00));
        assert_eq!(record.discount_amount.amount(), dec!(5.00));
        assert_eq!(record.total_value.amount(), dec!(45.00));
        assert_eq!(record.service_ids, vec![wash.id, wax.id]);
    }

    #[test]
    fn test_empty_selection_rejected() {
        let err = ServiceRecord::price(EntityId::new(), &[], None, now()).unwrap_err();
        assert!(matches!(err, TenantError::NoServicesSelected));
    }

    #[test]
    fn test_full_discount_is_free_not_negative() {
        let wash = Service::create("Lavagem", Money::new(dec!(30))).unwrap();
        let offer = Offer::create("Cortesia", dec!(100)).unwrap();
        let record = ServiceRecord::price(EntityId::new(), &[&wash], Some(&offer), now()).unwrap();
        assert_eq!(record.total_value, Money::ZERO);
    }

    #[test]
    fn test_catalog_validation() {
        assert!(Service::create("Lavagem", Money::ZERO).is_err());
        assert!(Service::create("  ", Money::new(dec!(1))).is_err());
        assert!(Offer::create("x", dec!(101)).is_err());
        assert!(Offer::create("x", dec!(-1)).is_err());
        assert!(Offer::create("x", dec!(0)).is_ok());
    }

    #[test]
    fn test_record_wire_format() {
        let wash = Service::create("Lavagem", Money::new(dec!(30))).unwrap();
        let record = ServiceRecord::price(EntityId::from_string("c1"), &[&wash], None, now()).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["clientId"], "c1");
        assert!(json.get("offerId").is_none());
        assert!(json.get("date").is_some());
        assert!(json.get("totalValue").is_some());
    }

    #[test]
    fn test_client_input_trims_and_requires() {
        let client = ClientInput::new(" Ana ", "55 11 9", "Gol", "ABC1D23")
            .into_client(EntityId::new())
            .unwrap();
        assert_eq!(client.name, "Ana");
        let err = ClientInput::new("Ana", "", "Gol", "ABC").into_client(EntityId::new()).unwrap_err();
        assert!(matches!(err, TenantError::Validation(_)));
    }
}
