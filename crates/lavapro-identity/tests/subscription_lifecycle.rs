use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use lavapro_common::{Clock, LavaproConfig, ManualClock, MemoryStore, OperatorSeed};
use lavapro_identity::{
    evaluate, IdentityError, IdentityStore, NewAccount, Session, StandingFilter, SubscriptionStatus,
};
use rust_decimal_macros::dec;

fn config() -> LavaproConfig {
    LavaproConfig {
        operator: Some(OperatorSeed {
            name: "Suporte".into(),
            contact: "558291058510".into(),
            email: "admin@lavapro.app".into(),
            secret: "admin-secret".into(),
        }),
        ..LavaproConfig::default()
    }
}

#[test]
fn test_trial_expires_then_operator_converts_to_paid() {
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap());
    let config = config();
    let store = IdentityStore::open(Arc::new(MemoryStore::new()), &config).unwrap();

    let seed = config.operator.as_ref().unwrap();
    let operator = Session::start(&store.ensure_operator(seed, clock.now()).unwrap(), clock.now());

    let tenant = store
        .register(NewAccount::new("Lava Ana", "+55 11 99999-8888", "ana@lava.com", "pw"), clock.now())
        .unwrap();
    let session = store.sign_in("ANA@lava.com", "pw", clock.now()).unwrap();

    let day_one = evaluate(&store.current(&session).unwrap(), clock.now());
    assert_eq!(day_one.days_remaining, 5);
    assert!(day_one.shows_trial_reminder());
    assert!(store.admit(&session, clock.now()).is_ok());

    clock.advance(Duration::days(6));
    assert!(matches!(
        store.admit(&session, clock.now()),
        Err(IdentityError::Entitlement(_))
    ));
    let lapsed = store
        .tenants_by_standing(&operator, StandingFilter::Expired, clock.now())
        .unwrap();
    assert_eq!(lapsed.len(), 1);

    store
        .set_subscription_status(&operator, &tenant.id, SubscriptionStatus::Monthly)
        .unwrap();
    // status alone does not reopen access
    assert!(store.admit(&session, clock.now()).is_err());

    store.extend_subscription(&operator, &tenant.id, 30).unwrap();
    let ctx = store.admit(&session, clock.now()).unwrap();
    assert_eq!(ctx.account_id(), &tenant.id);

    assert_eq!(
        store.monthly_recurring_revenue(&operator, &config.plan_prices).unwrap(),
        dec!(49.90)
    );
    assert!(store
        .tenants_by_standing(&operator, StandingFilter::Trial, clock.now())
        .unwrap()
        .is_empty());
}
