//! Integration scenarios for the surplus listing lifecycle.
//!
//! These exercise the public service facade and HTTP router end to end: a
//! restaurant posts surplus, farms browse and race to claim it, and every
//! status read is re-derived against an injected clock.

mod common {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use replate::marketplace::{
        Actor, InMemoryMarket, ListingDraft, ListingLifecycleService, Role,
    };

    pub(super) fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid timestamp")
    }

    pub(super) fn hours(n: i64) -> Duration {
        Duration::hours(n)
    }

    pub(super) fn restaurant() -> Actor {
        Actor::new("rest-bistro", Role::Restaurant)
    }

    pub(super) fn farm(suffix: &str) -> Actor {
        Actor::new(format!("farm-{suffix}"), Role::Farm)
    }

    pub(super) fn draft(item_name: &str, expires_at: DateTime<Utc>) -> ListingDraft {
        ListingDraft {
            item_name: item_name.to_string(),
            quantity: "10 units".to_string(),
            description: None,
            image_ref: None,
            expires_at,
        }
    }

    pub(super) fn build_service() -> Arc<ListingLifecycleService<InMemoryMarket, InMemoryMarket>> {
        let market = Arc::new(InMemoryMarket::default());
        Arc::new(ListingLifecycleService::new(market.clone(), market))
    }
}

mod lifecycle {
    use super::common::*;
    use replate::marketplace::{LifecycleError, ValidationError};

    #[test]
    fn listing_surfaces_until_its_window_closes() {
        let service = build_service();

        let view = service
            .create_listing(&restaurant(), draft("Surplus produce", t0() + hours(2)), t0())
            .expect("creation succeeds");
        assert_eq!(view.quantity, "10 units");

        let open = service.available_listings(t0()).expect("query succeeds");
        assert!(open.iter().any(|entry| entry.id == view.id));

        // Three hours later the window has closed.
        let closed = service
            .available_listings(t0() + hours(3))
            .expect("query succeeds");
        assert!(closed.iter().all(|entry| entry.id != view.id));

        let stale = service
            .get_listing(&view.id, t0() + hours(3))
            .expect("read succeeds");
        assert_eq!(stale.status, "expired");
    }

    #[test]
    fn past_expiry_drafts_never_reach_the_store() {
        let service = build_service();

        match service.create_listing(&restaurant(), draft("Too late", t0() - hours(1)), t0()) {
            Err(LifecycleError::Validation(ValidationError::ExpiryNotInFuture { .. })) => {}
            other => panic!("expected validation rejection, got {other:?}"),
        }

        assert!(service
            .available_listings(t0())
            .expect("query succeeds")
            .is_empty());
    }

    #[test]
    fn terminal_states_never_revert() {
        let service = build_service();

        let claimed = service
            .create_listing(&restaurant(), draft("Claimed crate", t0() + hours(2)), t0())
            .expect("creation succeeds");
        service
            .claim_listing(&farm("hillside"), &claimed.id, t0() + hours(1))
            .expect("claim succeeds");

        // Claimed stays claimed arbitrarily far past expiry.
        for offset in [2, 10, 24 * 30] {
            let view = service
                .get_listing(&claimed.id, t0() + hours(offset))
                .expect("read succeeds");
            assert_eq!(view.status, "claimed");
        }

        // And an expired listing cannot be claimed back to life.
        let expired = service
            .create_listing(&restaurant(), draft("Expired crate", t0() + hours(1)), t0())
            .expect("creation succeeds");
        assert!(matches!(
            service.claim_listing(&farm("hillside"), &expired.id, t0() + hours(2)),
            Err(replate::marketplace::LifecycleError::Expired)
        ));
    }
}

mod claiming {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use super::common::*;
    use replate::marketplace::LifecycleError;

    #[test]
    fn two_farms_racing_yield_one_claim_and_one_conflict() {
        let service = build_service();
        let view = service
            .create_listing(&restaurant(), draft("Bread", t0() + hours(2)), t0())
            .expect("creation succeeds");

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = ["f1", "f2"]
            .into_iter()
            .map(|suffix| {
                let service = service.clone();
                let barrier = barrier.clone();
                let listing_id = view.id.clone();
                thread::spawn(move || {
                    barrier.wait();
                    service.claim_listing(&farm(suffix), &listing_id, t0() + hours(1))
                })
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|handle| handle.join().expect("claimant thread panicked"))
            .collect();

        let successes = results.iter().filter(|result| result.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(results
            .iter()
            .filter_map(|result| result.as_ref().err())
            .all(|err| *err == LifecycleError::AlreadyClaimed));

        // The winner owns the listing permanently.
        let winner = results
            .iter()
            .find_map(|result| result.as_ref().ok())
            .expect("one winner");
        let view = service
            .get_listing(&view.id, t0() + hours(5))
            .expect("read succeeds");
        assert_eq!(view.status, "claimed");
        let embedded = view.claim.expect("owner view embeds the claim");
        assert_eq!(embedded.claimant_id, winner.claimant_id);
    }
}

mod routing {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::common::*;
    use replate::marketplace::marketplace_router;

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("read body");
        serde_json::from_slice(&body).expect("json payload")
    }

    #[tokio::test]
    async fn create_browse_claim_flow_over_http() {
        let service = build_service();
        let router = marketplace_router(service);

        let created = router
            .clone()
            .oneshot(
                Request::post("/api/v1/listings")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "actor_id": "rest-bistro",
                            "role": "restaurant",
                            "item_name": "Sourdough loaves",
                            "quantity": "10 units",
                            "expires_at": t0() + hours(2),
                            "now": t0(),
                        }))
                        .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(created.status(), StatusCode::CREATED);
        let listing = read_json(created).await;
        let listing_id = listing
            .get("id")
            .and_then(Value::as_str)
            .expect("listing id")
            .to_string();

        let browse = router
            .clone()
            .oneshot(
                Request::get("/api/v1/listings/available?now=2025-06-01T13:00:00Z")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(browse.status(), StatusCode::OK);
        let open = read_json(browse).await;
        assert_eq!(open.as_array().map(Vec::len), Some(1));

        let claimed = router
            .clone()
            .oneshot(
                Request::post(format!("/api/v1/listings/{listing_id}/claims"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        serde_json::to_vec(&json!({
                            "actor_id": "farm-hillside",
                            "role": "farm",
                            "now": t0() + hours(1),
                        }))
                        .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(claimed.status(), StatusCode::CREATED);
        let claim = read_json(claimed).await;
        assert_eq!(claim.get("claimant_id"), Some(&json!("farm-hillside")));

        // The owner's dashboard now embeds the winning claim.
        let dashboard = router
            .clone()
            .oneshot(
                Request::get(
                    "/api/v1/actors/rest-bistro/listings?role=restaurant&now=2025-06-01T15:00:00Z",
                )
                .body(Body::empty())
                .expect("request"),
            )
            .await
            .expect("route executes");
        assert_eq!(dashboard.status(), StatusCode::OK);
        let entries = read_json(dashboard).await;
        let entry = &entries.as_array().expect("array payload")[0];
        assert_eq!(entry.get("status"), Some(&json!("claimed")));
        assert_eq!(
            entry.pointer("/claim/claimant_id"),
            Some(&json!("farm-hillside"))
        );
    }
}
