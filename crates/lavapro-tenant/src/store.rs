//! Tenant Data Store
//!
//! Every operation takes a [`TenantContext`] and the caller's `now`, re-runs
//! the entitlement check, and only ever touches the keys namespaced by its
//! account id. Collections are read fresh from the
//! persistence port on each call; writes replace the whole collection.
//! Read-modify-write sequences hold a per-tenant lock.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use dashmap::DashMap;
use lavapro_common::storage::{load_collection, save_collection};
use lavapro_common::{EntityId, KeyValueStore, LavaproConfig, Period, TenantCollection};
use lavapro_identity::TenantContext;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{Client, ClientInput, Offer, Service, ServiceRecord};
use crate::money::Money;
use crate::reports::{self, ClientDetail, RecordView, RevenueSummary};
use crate::{Result, TenantError};

/// Request to register a completed service
#[derive(Debug, Clone)]
pub struct NewServiceRecord {
    pub client_id: EntityId,
    pub service_ids: Vec<EntityId>,
    pub offer_id: Option<EntityId>,
}

/// Per-tenant collections over the persistence port
pub struct TenantDataStore {
    store: Arc<dyn KeyValueStore>,
    offset: FixedOffset,
    locks: DashMap<EntityId, Arc<Mutex<()>>>,
}

impl TenantDataStore {
    pub fn open(store: Arc<dyn KeyValueStore>, config: &LavaproConfig) -> Self {
        Self::with_offset(store, config.local_offset())
    }

    pub fn with_offset(store: Arc<dyn KeyValueStore>, offset: FixedOffset) -> Self {
        Self {
            store,
            offset,
            locks: DashMap::new(),
        }
    }

    // ---- clients ----

    pub fn add_client(&self, ctx: &TenantContext, input: ClientInput, now: DateTime<Utc>) -> Result<Client> {
        ctx.check(now)?;
        let client = input.into_client(EntityId::new())?;
        self.append(ctx, TenantCollection::Clients, client.clone())?;
        info!(account_id = %ctx.account_id(), client_id = %client.id, "client added");
        Ok(client)
    }

    /// Replace a client's editable fields; the id is kept
    pub fn update_client(
        &self,
        ctx: &TenantContext,
        id: &EntityId,
        input: ClientInput,
        now: DateTime<Utc>,
    ) -> Result<Client> {
        ctx.check(now)?;
        let updated = input.into_client(id.clone())?;
        let lock = self.lock_for(ctx);
        let _guard = lock.lock();

        let mut clients: Vec<Client> = self.load(ctx, TenantCollection::Clients)?;
        let slot = clients
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| TenantError::ClientNotFound(id.clone()))?;
        *slot = updated.clone();
        self.save(ctx, TenantCollection::Clients, &clients)?;

        info!(account_id = %ctx.account_id(), client_id = %id, "client updated");
        Ok(updated)
    }

    pub fn clients(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<Client>> {
        ctx.check(now)?;
        self.load(ctx, TenantCollection::Clients)
    }

    // ---- catalogs ----

    pub fn add_service(&self, ctx: &TenantContext, name: &str, price: Money, now: DateTime<Utc>) -> Result<Service> {
        ctx.check(now)?;
        let service = Service::create(name, price)?;
        self.append(ctx, TenantCollection::Services, service.clone())?;
        info!(account_id = %ctx.account_id(), service_id = %service.id, price = %service.price.amount(), "service added");
        Ok(service)
    }

    pub fn services(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<Service>> {
        ctx.check(now)?;
        self.load(ctx, TenantCollection::Services)
    }

    pub fn add_offer(
        &self,
        ctx: &TenantContext,
        name: &str,
        discount_percentage: Decimal,
        now: DateTime<Utc>,
    ) -> Result<Offer> {
        ctx.check(now)?;
        let offer = Offer::create(name, discount_percentage)?;
        self.append(ctx, TenantCollection::Offers, offer.clone())?;
        info!(account_id = %ctx.account_id(), offer_id = %offer.id, "offer added");
        Ok(offer)
    }

    pub fn offers(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<Offer>> {
        ctx.check(now)?;
        self.load(ctx, TenantCollection::Offers)
    }

    // ---- records ----

    /// Price the selection against the current catalog and store the snapshot
    pub fn add_service_record(
        &self,
        ctx: &TenantContext,
        request: NewServiceRecord,
        now: DateTime<Utc>,
    ) -> Result<ServiceRecord> {
        ctx.check(now)?;
        if request.service_ids.is_empty() {
            return Err(TenantError::NoServicesSelected);
        }

        let lock = self.lock_for(ctx);
        let _guard = lock.lock();

        let clients: Vec<Client> = self.load(ctx, TenantCollection::Clients)?;
        if !clients.iter().any(|c| c.id == request.client_id) {
            return Err(TenantError::ClientNotFound(request.client_id));
        }

        let services: Vec<Service> = self.load(ctx, TenantCollection::Services)?;
        let selected = request
            .service_ids
            .iter()
            .map(|id| {
                services
                    .iter()
                    .find(|s| &s.id == id)
                    .ok_or_else(|| TenantError::Validation(format!("unknown service {id}")))
            })
            .collect::<Result<Vec<&Service>>>()?;

        let offers: Vec<Offer> = self.load(ctx, TenantCollection::Offers)?;
        let offer = match &request.offer_id {
            Some(id) => Some(
                offers
                    .iter()
                    .find(|o| &o.id == id)
                    .ok_or_else(|| TenantError::Validation(format!("unknown offer {id}")))?,
            ),
            None => None,
        };

        let record = ServiceRecord::price(request.client_id, &selected, offer, now)?;

        let mut records: Vec<ServiceRecord> = self.load(ctx, TenantCollection::Records)?;
        records.push(record.clone());
        self.save(ctx, TenantCollection::Records, &records)?;

        info!(
            account_id = %ctx.account_id(),
            client_id = %record.client_id,
            total = %record.total_value.amount(),
            "service record added"
        );
        Ok(record)
    }

    pub fn records(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<Vec<ServiceRecord>> {
        ctx.check(now)?;
        self.load(ctx, TenantCollection::Records)
    }

    /// One client's records, newest first
    pub fn client_records(
        &self,
        ctx: &TenantContext,
        client_id: &EntityId,
        now: DateTime<Utc>,
    ) -> Result<Vec<ServiceRecord>> {
        let records = self.records(ctx, now)?;
        Ok(reports::records_of(&records, client_id))
    }

    pub fn client_detail(&self, ctx: &TenantContext, client_id: &EntityId, now: DateTime<Utc>) -> Result<ClientDetail> {
        ctx.check(now)?;
        let client = self
            .load::<Client>(ctx, TenantCollection::Clients)?
            .into_iter()
            .find(|c| &c.id == client_id)
            .ok_or_else(|| TenantError::ClientNotFound(client_id.clone()))?;
        let services: Vec<Service> = self.load(ctx, TenantCollection::Services)?;
        let offers: Vec<Offer> = self.load(ctx, TenantCollection::Offers)?;
        let records: Vec<ServiceRecord> = self.load(ctx, TenantCollection::Records)?;
        let history = reports::records_of(&records, client_id);

        let last_visit = history.first().map(|r| r.recorded_at);
        let records = history
            .into_iter()
            .map(|r| RecordView::resolve(r, &services, &offers))
            .collect();

        Ok(ClientDetail {
            client,
            records,
            last_visit,
        })
    }

    // ---- queries ----

    pub fn revenue_for(&self, ctx: &TenantContext, period: Period, now: DateTime<Utc>) -> Result<Money> {
        let records = self.records(ctx, now)?;
        Ok(reports::revenue_for(&records, period, now, self.offset))
    }

    pub fn revenue_summary(&self, ctx: &TenantContext, now: DateTime<Utc>) -> Result<RevenueSummary> {
        let records = self.records(ctx, now)?;
        Ok(RevenueSummary::compute(&records, now, self.offset))
    }

    pub fn stale_clients(&self, ctx: &TenantContext, threshold_days: u32, now: DateTime<Utc>) -> Result<Vec<Client>> {
        ctx.check(now)?;
        let clients: Vec<Client> = self.load(ctx, TenantCollection::Clients)?;
        let records: Vec<ServiceRecord> = self.load(ctx, TenantCollection::Records)?;
        Ok(reports::stale_clients(&clients, &records, threshold_days, now))
    }

    // ---- persistence ----

    fn lock_for(&self, ctx: &TenantContext) -> Arc<Mutex<()>> {
        self.locks
            .entry(ctx.account_id().clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    fn append<T: Serialize + DeserializeOwned>(
        &self,
        ctx: &TenantContext,
        collection: TenantCollection,
        item: T,
    ) -> Result<()> {
        let lock = self.lock_for(ctx);
        let _guard = lock.lock();
        let mut items: Vec<T> = self.load(ctx, collection)?;
        items.push(item);
        self.save(ctx, collection, &items)
    }

    fn load<T: DeserializeOwned>(&self, ctx: &TenantContext, collection: TenantCollection) -> Result<Vec<T>> {
        let key = collection.key(ctx.account_id());
        let items = load_collection(self.store.as_ref(), &key)?;
        debug!(key = %key, "collection loaded");
        Ok(items)
    }

    fn save<T: Serialize>(&self, ctx: &TenantContext, collection: TenantCollection, items: &[T]) -> Result<()> {
        let key = collection.key(ctx.account_id());
        save_collection(self.store.as_ref(), &key, items)?;
        Ok(())
    }
}
