//! Integration tests for the plan lifecycle.
//!
//! These tests drive `PlanService` end to end against the in-memory store,
//! including concurrent updates on one plan.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, TimeZone, Utc};
use domain::{
    DomainError, DomainEvent, EventPublisher, LifecyclePolicy, PlanData, PlanError, PlanId,
    PlanService, PlanStatus,
};
use futures_util::future::join_all;
use versioned_store::{InMemoryVersionedStore, StoreError, Version, VersionedId};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<DomainEvent>>>);

impl Recorder {
    fn event_types(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().iter().map(|e| e.event_type()).collect()
    }
}

impl EventPublisher for Recorder {
    fn publish(&self, event: DomainEvent) {
        self.0.lock().unwrap().push(event);
    }
}

type Service = PlanService<InMemoryVersionedStore<PlanData>, Recorder>;

/// Helper to create a test plan service
fn create_service() -> (Service, Recorder) {
    let recorder = Recorder::default();
    (
        PlanService::new(InMemoryVersionedStore::new(), recorder.clone()),
        recorder,
    )
}

fn t1() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
}

fn t2() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap()
}

fn midpoint(a: DateTime<Utc>, b: DateTime<Utc>) -> DateTime<Utc> {
    a + (b - a) / 2
}

mod household_insurance {
    use super::*;

    #[tokio::test]
    async fn active_between_launch_and_retirement() {
        let (service, recorder) = create_service();

        let plan = service.create("household insurance").await.unwrap();
        service.launch(plan.id(), t1()).await.unwrap();
        service.retire(plan.id(), t2()).await.unwrap();

        let during: Vec<PlanId> = service
            .list_active(midpoint(t1(), t2()))
            .await
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(during, vec![plan.id()]);

        let after = service.list_active(t2() + (t2() - t1()) / 2).await;
        assert!(after.is_empty());

        assert_eq!(
            recorder.event_types(),
            vec!["PlanCreated", "PlanLaunched", "PlanRetired"]
        );
    }

    #[tokio::test]
    async fn history_keeps_every_version() {
        let (service, _) = create_service();

        let plan = service.create("household insurance").await.unwrap();
        service.launch(plan.id(), t1()).await.unwrap();
        service.retire(plan.id(), t2()).await.unwrap();

        let versions = service.list_versions(plan.id()).await.unwrap();
        let statuses: Vec<_> = versions.iter().map(|p| p.status()).collect();
        assert_eq!(
            statuses,
            vec![
                PlanStatus::NotLaunched,
                PlanStatus::Launched { at: t1() },
                PlanStatus::Retired {
                    valid_from: t1(),
                    valid_until: t2(),
                },
            ]
        );

        let launched = service
            .get_exact(VersionedId::new(plan.id(), Version::new(2)))
            .await
            .unwrap();
        assert_eq!(launched.status(), PlanStatus::Launched { at: t1() });

        let latest = service.get_latest(plan.id()).await.unwrap();
        assert_eq!(latest.version(), Version::new(3));
        assert!(latest.same_snapshot(versions.last().unwrap()));
    }
}

mod lookups {
    use super::*;

    #[tokio::test]
    async fn exact_lookup_distinguishes_unknown_aggregate_from_missing_version() {
        let (service, _) = create_service();
        let plan = service.create("pet").await.unwrap();

        let missing_version = service
            .get_exact(VersionedId::new(plan.id(), Version::new(7)))
            .await;
        assert_eq!(
            missing_version.unwrap_err(),
            DomainError::Store(StoreError::VersionNotFound {
                aggregate_id: plan.id(),
                version: Version::new(7),
            })
        );

        let stranger = PlanId::new();
        let unknown = service.get_exact(VersionedId::first(stranger)).await;
        assert_eq!(
            unknown.unwrap_err(),
            DomainError::Store(StoreError::UnknownAggregate(stranger))
        );
    }

    #[tokio::test]
    async fn list_versions_of_unknown_plan_is_not_found() {
        let (service, _) = create_service();
        assert!(
            service
                .list_versions(PlanId::new())
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}

mod policies {
    use super::*;

    #[tokio::test]
    async fn lenient_relaunch_of_retired_plan() {
        let (service, _) = create_service();
        let plan = service.create("travel").await.unwrap();
        service.launch(plan.id(), t1()).await.unwrap();
        service.retire(plan.id(), t2()).await.unwrap();

        let later = t2() + Duration::days(30);
        let relaunched = service.launch(plan.id(), later).await.unwrap();
        assert_eq!(relaunched.status(), PlanStatus::Launched { at: later });
    }

    #[tokio::test]
    async fn strict_rejects_relaunch_of_retired_plan() {
        let (service, recorder) = create_service();
        let service = service.with_policy(LifecyclePolicy::Strict);
        let plan = service.create("travel").await.unwrap();
        service.launch(plan.id(), t1()).await.unwrap();
        service.retire(plan.id(), t2()).await.unwrap();

        let result = service.launch(plan.id(), t2() + Duration::days(1)).await;
        assert_eq!(
            result.unwrap_err(),
            DomainError::Plan(PlanError::InvalidTransition {
                current_state: "Retired",
                action: "launch",
            })
        );
        assert_eq!(recorder.event_types().len(), 3);
    }

    #[tokio::test]
    async fn lenient_retire_of_unlaunched_plan_is_never_active() {
        let (service, _) = create_service();
        let plan = service.create("travel").await.unwrap();

        let retired = service.retire(plan.id(), t1()).await.unwrap();
        assert_eq!(
            retired.status(),
            PlanStatus::Retired {
                valid_from: t1(),
                valid_until: t1(),
            }
        );
        assert!(service.list_active(t1() + Duration::seconds(1)).await.is_empty());
    }
}

mod concurrency {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_renames_serialize() {
        let (service, _) = create_service();
        let service = Arc::new(service);
        let plan = service.create("base").await.unwrap();
        let plan_id = plan.id();

        let tasks = (0..32).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.rename(plan_id, format!("name {i}")).await })
        });
        let results = join_all(tasks).await;
        let successes = results
            .into_iter()
            .filter(|r| matches!(r, Ok(Ok(_))))
            .count();
        assert_eq!(successes, 32);

        let versions = service.list_versions(plan.id()).await.unwrap();
        assert_eq!(versions.len(), 33);
        for (index, version) in versions.iter().enumerate() {
            assert_eq!(version.version(), Version::new(index as u64 + 1));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_lifecycle_on_distinct_plans() {
        let (service, recorder) = create_service();
        let service = Arc::new(service);

        let tasks = (0..16).map(|i| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                let plan = service.create(format!("plan {i}")).await?;
                service.launch(plan.id(), t1()).await
            })
        });
        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        assert_eq!(service.list_active(t2()).await.len(), 16);
        assert_eq!(recorder.event_types().len(), 32);
    }
}
