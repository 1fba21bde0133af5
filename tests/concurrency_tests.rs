use paydesk::application::auth::Actor;
use paydesk::application::engine::Engine;
use paydesk::domain::account::{Amount, PayoutProfile, Role};
use paydesk::domain::submission::Document;
use paydesk::infrastructure::in_memory::{
    InMemoryAccountStore, InMemoryAuditLog, InMemoryPayoutStore, InMemorySubmissionStore,
};
use rust_decimal_macros::dec;
use std::sync::Arc;

fn engine() -> Engine {
    Engine::new(
        Box::new(InMemoryAccountStore::new()),
        Box::new(InMemorySubmissionStore::new()),
        Box::new(InMemoryPayoutStore::new()),
        Box::new(InMemoryAuditLog::new()),
    )
}

async fn verified_supplier(engine: &Engine) -> (Actor, Actor) {
    let supplier = engine
        .register_account("acme", Role::Supplier)
        .await
        .unwrap();
    let admin = engine.register_account("dana", Role::Admin).await.unwrap();
    let supplier = Actor::new(supplier.id, Role::Supplier);
    let admin = Actor::new(admin.id, Role::Admin);

    engine
        .set_payout_profile(
            &supplier,
            supplier.id,
            PayoutProfile::new("DE00 1234", "pay@acme.example").unwrap(),
        )
        .await
        .unwrap();
    let submission = engine
        .submit(
            &supplier,
            supplier.id,
            vec![Document::new("registration", "ACME GmbH")],
        )
        .await
        .unwrap();
    engine.claim(&admin, submission.id).await.unwrap();
    engine.verify(&admin, submission.id, None).await.unwrap();
    engine
        .credit_earnings(&admin, supplier.id, Amount::new(dec!(1000)).unwrap())
        .await
        .unwrap();
    (supplier, admin)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overdraw_attempts_admit_at_most_one() {
    let engine = Arc::new(engine());
    let (supplier, _) = verified_supplier(&engine).await;

    let barrier = Arc::new(tokio::sync::Barrier::new(8));
    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine
                .request_payout(&supplier, supplier.id, Amount::new(dec!(600)).unwrap())
                .await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    // 8 x 600 against 1000: exactly one reservation fits.
    assert_eq!(successes, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_claims_admit_one_reviewer() {
    let engine = Arc::new(engine());
    let supplier = engine
        .register_account("acme", Role::Supplier)
        .await
        .unwrap();
    let supplier = Actor::new(supplier.id, Role::Supplier);
    let submission = engine
        .submit(
            &supplier,
            supplier.id,
            vec![Document::new("registration", "ACME GmbH")],
        )
        .await
        .unwrap();

    let mut admins = Vec::new();
    for i in 0..4 {
        let account = engine
            .register_account(&format!("admin-{i}"), Role::Admin)
            .await
            .unwrap();
        admins.push(Actor::new(account.id, Role::Admin));
    }

    let barrier = Arc::new(tokio::sync::Barrier::new(admins.len()));
    let mut handles = Vec::new();
    for admin in admins {
        let engine = engine.clone();
        let barrier = barrier.clone();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            engine.claim(&admin, submission.id).await
        }));
    }

    let mut winners = Vec::new();
    for handle in handles {
        if let Ok(claimed) = handle.await.unwrap() {
            winners.push(claimed.reviewer.unwrap());
        }
    }
    assert_eq!(winners.len(), 1);

    let reviewer = winners[0];
    let current = engine
        .submission(&Actor::new(reviewer, Role::Admin), submission.id)
        .await
        .unwrap();
    assert_eq!(current.reviewer, Some(reviewer));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_unrelated_accounts_proceed_independently() {
    let engine = Arc::new(engine());
    let admin = engine.register_account("dana", Role::Admin).await.unwrap();
    let admin = Actor::new(admin.id, Role::Admin);

    let mut handles = Vec::new();
    for i in 0..16 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            let account = engine
                .register_account(&format!("supplier-{i}"), Role::Supplier)
                .await
                .unwrap();
            let supplier = Actor::new(account.id, Role::Supplier);
            engine
                .submit(
                    &supplier,
                    supplier.id,
                    vec![Document::new("registration", "docs")],
                )
                .await
                .unwrap()
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let queue = engine.review_queue(&admin).await.unwrap();
    assert_eq!(queue.total(), 16);
}
