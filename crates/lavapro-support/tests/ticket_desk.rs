use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use lavapro_common::{LavaproConfig, MemoryStore, OperatorSeed};
use lavapro_identity::{IdentityStore, NewAccount, Session};
use lavapro_support::{Author, TicketDesk, TicketStatus};

#[test]
fn test_ticket_thread_survives_reopen() {
    let now = Utc.with_ymd_and_hms(2024, 6, 10, 15, 0, 0).unwrap();
    let backend = Arc::new(MemoryStore::new());
    let identity = IdentityStore::open(backend.clone(), &LavaproConfig::default()).unwrap();

    let operator = identity
        .ensure_operator(
            &OperatorSeed {
                name: "Suporte".into(),
                contact: "558291058510".into(),
                email: "admin@lavapro.app".into(),
                secret: "admin-secret".into(),
            },
            now,
        )
        .unwrap();
    let operator = identity
        .authorize_operator(&Session::start(&operator, now))
        .unwrap();

    identity
        .register(NewAccount::new("Lava Ana", "5511", "ana@lava.com", "pw"), now)
        .unwrap();
    let session = identity.sign_in("ana@lava.com", "pw", now).unwrap();
    let ana = identity.admit(&session, now).unwrap();

    let desk = TicketDesk::open(backend.clone()).unwrap();
    let ticket = desk
        .open_ticket(&ana, "Relatório", "O CSV veio vazio", now)
        .unwrap();
    assert_eq!(ticket.user_email(), "ana@lava.com");

    desk.operator_reply(&operator, ticket.id(), "Pode tentar de novo?", now + Duration::minutes(10))
        .unwrap();
    desk.set_status(&operator, ticket.id(), TicketStatus::Closed).unwrap();
    desk.tenant_reply(&ana, ticket.id(), "Funcionou", now + Duration::minutes(20))
        .unwrap();

    let reopened = TicketDesk::open(backend).unwrap();
    let all = reopened.list_all(&operator);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status(), TicketStatus::Closed);
    let authors: Vec<Author> = all[0].replies().iter().map(|r| r.author).collect();
    assert_eq!(authors, vec![Author::Operator, Author::User]);
}
