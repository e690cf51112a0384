use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use lavapro_common::{Clock, JsonFileStore, LavaproConfig, ManualClock, MemoryStore, Period};
use lavapro_identity::{IdentityError, IdentityStore, NewAccount};
use lavapro_tenant::{
    compose_offer_message, offer_link, ClientInput, Money, NewServiceRecord, TenantDataStore,
    TenantError,
};
use rust_decimal_macros::dec;

fn at(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
}

#[test]
fn test_day_revenue_counts_only_today() {
    let clock = ManualClock::new(at("2024-06-08T09:00:00Z"));
    let backend = Arc::new(MemoryStore::new());
    let config = LavaproConfig {
        trial_period_days: 30,
        ..LavaproConfig::default()
    };
    let identity = IdentityStore::open(backend.clone(), &config).unwrap();
    let data = TenantDataStore::open(backend, &config);

    identity
        .register(NewAccount::new("Lava Ana", "5511", "ana@lava.com", "pw"), clock.now())
        .unwrap();
    let session = identity.sign_in("ana@lava.com", "pw", clock.now()).unwrap();
    let ctx = identity.admit(&session, clock.now()).unwrap();

    let client = data
        .add_client(&ctx, ClientInput::new("Ana", "5511999998888", "Gol", "ABC1D23"), clock.now())
        .unwrap();
    let wash = data.add_service(&ctx, "Lavagem", Money::new(dec!(30)), clock.now()).unwrap();
    let record = |when| {
        data.add_service_record(
            &ctx,
            NewServiceRecord {
                client_id: client.id.clone(),
                service_ids: vec![wash.id.clone()],
                offer_id: None,
            },
            when,
        )
        .unwrap()
    };

    record(at("2024-06-09T23:59:59Z"));
    record(at("2024-06-10T00:00:00Z"));
    record(at("2024-06-10T14:30:00Z"));

    let now = at("2024-06-10T15:00:00Z");
    assert_eq!(data.revenue_for(&ctx, Period::Day, now).unwrap().amount(), dec!(60));
    assert_eq!(data.revenue_for(&ctx, Period::Week, now).unwrap().amount(), dec!(90));

    let csv = data.revenue_summary(&ctx, now).unwrap().to_csv().unwrap();
    assert!(csv.contains("\"Faturamento do Dia\",\"R$ 60,00\""));
}

#[test]
fn test_expired_tenant_cannot_reach_data() {
    let clock = ManualClock::new(at("2024-06-01T09:00:00Z"));
    let backend = Arc::new(MemoryStore::new());
    let config = LavaproConfig::default();
    let identity = IdentityStore::open(backend.clone(), &config).unwrap();
    let data = TenantDataStore::open(backend, &config);

    identity
        .register(NewAccount::new("Lava", "5511", "a@x.com", "pw"), clock.now())
        .unwrap();
    let session = identity.sign_in("a@x.com", "pw", clock.now()).unwrap();
    let ctx = identity.admit(&session, clock.now()).unwrap();
    data.add_client(&ctx, ClientInput::new("Ana", "5511", "Gol", "ABC"), clock.now())
        .unwrap();

    clock.advance(Duration::days(5) + Duration::seconds(1));
    assert!(matches!(
        identity.admit(&session, clock.now()),
        Err(IdentityError::Entitlement(_))
    ));
    // a context obtained earlier stops working too
    assert!(matches!(
        data.clients(&ctx, clock.now()),
        Err(TenantError::Entitlement(_))
    ));
    assert!(matches!(
        data.revenue_for(&ctx, Period::Day, clock.now()),
        Err(TenantError::Entitlement(_))
    ));
}

#[test]
fn test_data_survives_reopen_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let now = at("2024-06-10T15:00:00Z");
    let config = LavaproConfig::default();

    let client_id = {
        let backend = Arc::new(JsonFileStore::open(dir.path()).unwrap());
        let identity = IdentityStore::open(backend.clone(), &config).unwrap();
        let data = TenantDataStore::open(backend, &config);
        identity
            .register(NewAccount::new("Lava", "5511", "a@x.com", "pw"), now)
            .unwrap();
        let ctx = identity
            .admit(&identity.sign_in("a@x.com", "pw", now).unwrap(), now)
            .unwrap();
        data.add_client(&ctx, ClientInput::new("Ana", "+55 11 99999-8888", "Gol", "ABC"), now)
            .unwrap()
            .id
    };

    let backend = Arc::new(JsonFileStore::open(dir.path()).unwrap());
    let identity = IdentityStore::open(backend.clone(), &config).unwrap();
    let data = TenantDataStore::open(backend, &config);
    let ctx = identity
        .admit(&identity.sign_in("a@x.com", "pw", now).unwrap(), now)
        .unwrap();

    let detail = data.client_detail(&ctx, &client_id, now).unwrap();
    assert_eq!(detail.last_visit, None);
    let link = offer_link(&detail.client, compose_offer_message(&detail.client, None)).unwrap();
    assert_eq!(link.destination(), "5511999998888");
}
