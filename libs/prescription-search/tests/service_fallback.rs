//! Store selection and recovery rules of PrescriptionSearchService

mod support;

use receita_search::{
    Error, LocalStore, PrescriptionSearchService, PrescriptionStatus, RemoteStore,
    RemoteStoreOptions, SearchParams, SearchResults, SortField, SortOrder,
};
use std::sync::Arc;
use std::time::Duration;
use support::{three_status_fixture, Behavior, FakeBackend, Reply, ScriptedStore};

fn local() -> LocalStore {
    LocalStore::sample().unwrap()
}

#[tokio::test]
async fn test_status_filter_scenario() {
    let store = LocalStore::from_prescriptions(three_status_fixture());
    let service = PrescriptionSearchService::new(Arc::new(store));

    let params = SearchParams::new()
        .status([PrescriptionStatus::Pending, PrescriptionStatus::Completed])
        .page(1)
        .page_size(2)
        .sort(SortField::Date, SortOrder::Desc);
    let results = service.search_prescriptions(&params).await;

    let ids: Vec<&str> = results.data.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["RX-C", "RX-A"]);
    assert_eq!(results.count, 2);
    assert_eq!(results.total_pages, 1);
}

#[tokio::test]
async fn test_second_page_of_filtered_fixture() {
    let service = PrescriptionSearchService::local().unwrap();
    let base = SearchParams::new()
        .query("rx-2024")
        .sort(SortField::Date, SortOrder::Asc);

    let all = service
        .search_prescriptions(&base.clone().page_size(12))
        .await;
    assert_eq!(all.count, 12);

    let page = service
        .search_prescriptions(&base.page(2).page_size(5))
        .await;
    assert_eq!(page.data, all.data[5..10].to_vec());
    assert_eq!(page.page, 2);
    assert_eq!(page.total_pages, 3);
}

#[tokio::test]
async fn test_without_primary_matches_local_store() {
    let store = local();
    let service = PrescriptionSearchService::new(Arc::new(store.clone()));

    for params in [
        SearchParams::new(),
        SearchParams::new().query("costa").page_size(3),
        SearchParams::new()
            .status([PrescriptionStatus::Partial])
            .sort(SortField::PatientName, SortOrder::Asc),
        SearchParams::new().page(2).page_size(4),
    ] {
        assert_eq!(
            service.search_prescriptions(&params).await,
            store.search_prescriptions(&params)
        );
    }
}

#[tokio::test]
async fn test_repeated_searches_are_identical() {
    let service = PrescriptionSearchService::local().unwrap();
    let params = SearchParams::new().doctor_name("oliveira").page_size(2);
    let first = service.search_prescriptions(&params).await;
    let second = service.search_prescriptions(&params).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_remote_failure_falls_back_to_local() {
    let backend = FakeBackend::start(|_| Reply::Error {
        status: 500,
        body: r#"{"message":"boom"}"#.to_string(),
    })
    .await;
    let remote = RemoteStore::new(RemoteStoreOptions::new(&backend.base_url, "anon")).unwrap();
    let service = PrescriptionSearchService::local()
        .unwrap()
        .with_primary(Arc::new(remote));
    assert!(service.is_remote());

    let params = SearchParams::new().query("silva");
    assert_eq!(
        service.search_prescriptions(&params).await,
        local().search_prescriptions(&params)
    );
    assert_eq!(
        service.get_prescription_by_id("RX-2024-004").await,
        local().get_prescription_by_id("RX-2024-004")
    );
    assert_eq!(service.get_recent_prescriptions(2).await.len(), 2);
    assert!(!backend.requests().is_empty());
}

#[tokio::test]
async fn test_remote_success_is_not_replaced() {
    let backend = FakeBackend::start(|_| Reply::rows(&[], 0)).await;
    let remote = RemoteStore::new(RemoteStoreOptions::new(&backend.base_url, "anon")).unwrap();
    let service = PrescriptionSearchService::local()
        .unwrap()
        .with_primary(Arc::new(remote));

    let results = service.search_prescriptions(&SearchParams::new()).await;
    assert_eq!(results, SearchResults::empty(10));
}

#[tokio::test]
async fn test_page_past_the_end_keeps_remote_total() {
    let backend = FakeBackend::start(|_| Reply::RangeNotSatisfiable { total: Some(57) }).await;
    let remote = RemoteStore::new(RemoteStoreOptions::new(&backend.base_url, "anon")).unwrap();
    let service = PrescriptionSearchService::local()
        .unwrap()
        .with_primary(Arc::new(remote));

    let results = service
        .try_search_prescriptions(&SearchParams::new().page(21).page_size(10))
        .await
        .unwrap();
    assert!(results.data.is_empty());
    assert_eq!(results.count, 57);
    assert_eq!(results.total_pages, 6);
    assert_eq!(results.page, 21);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_falls_back() {
    let primary = ScriptedStore::sample();
    primary.set_behavior(Behavior::Hang);
    let service = PrescriptionSearchService::local()
        .unwrap()
        .with_primary(primary.clone())
        .with_request_timeout(Duration::from_millis(200));

    let params = SearchParams::new().status([PrescriptionStatus::Completed]);
    let results = service.search_prescriptions(&params).await;
    assert_eq!(results, local().search_prescriptions(&params));
    assert_eq!(primary.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_timeout_is_reported_when_nothing_answers() {
    let hanging = ScriptedStore::sample();
    hanging.set_behavior(Behavior::Hang);
    let service = PrescriptionSearchService::new(hanging)
        .with_request_timeout(Duration::from_millis(200));

    let err = service
        .try_search_prescriptions(&SearchParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Timeout(d) if d == Duration::from_millis(200)));
}

#[tokio::test]
async fn test_double_failure_yields_empty_values() {
    let service = PrescriptionSearchService::new(ScriptedStore::failing())
        .with_primary(ScriptedStore::failing());

    let params = SearchParams::new().page(3).page_size(7);
    let results = service.search_prescriptions(&params).await;
    assert_eq!(results.count, 0);
    assert_eq!(results.total_pages, 0);
    assert_eq!(results.page, 1);
    assert_eq!(results.page_size, 7);
    assert!(results.data.is_empty());

    assert!(service.try_search_prescriptions(&params).await.is_err());
    assert!(service.get_prescription_by_id("RX-2024-001").await.is_none());
    assert!(service.get_search_suggestions("silva").await.is_empty());
    assert!(service.get_recent_prescriptions(3).await.is_empty());
}

#[tokio::test]
async fn test_admin_search_never_falls_back() {
    let fallback = ScriptedStore::sample();
    let admin = ScriptedStore::failing();
    let service = PrescriptionSearchService::new(fallback.clone()).with_admin(admin.clone());

    let params = SearchParams::new().page_size(4);
    let results = service.admin_search(&params).await;
    assert_eq!(results, SearchResults::empty(4));

    let err = service.try_admin_search(&params).await.unwrap_err();
    assert!(matches!(err, Error::Backend { status: 503, .. }));
    assert_eq!(admin.calls(), 2);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_admin_search_without_admin_store_uses_local() {
    let service = PrescriptionSearchService::local()
        .unwrap()
        .with_primary(ScriptedStore::failing());
    let params = SearchParams::new().query("nascimento");
    assert_eq!(
        service.admin_search(&params).await,
        local().admin_search(&params)
    );
}

#[tokio::test]
async fn test_short_suggestion_queries_skip_every_store() {
    let primary = ScriptedStore::sample();
    let fallback = ScriptedStore::sample();
    let service = PrescriptionSearchService::new(fallback.clone()).with_primary(primary.clone());

    assert!(service.get_search_suggestions("a").await.is_empty());
    assert!(service.get_search_suggestions("").await.is_empty());
    assert_eq!(primary.calls(), 0);
    assert_eq!(fallback.calls(), 0);

    let suggestions = service.get_search_suggestions("an").await;
    assert!(!suggestions.is_empty());
    assert!(suggestions.len() <= 10);
    let mut unique = suggestions.clone();
    unique.sort();
    unique.dedup();
    assert_eq!(unique.len(), suggestions.len());
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
}

#[tokio::test]
async fn test_medication_name_is_ignored() {
    let service = PrescriptionSearchService::local().unwrap();
    let mut params = SearchParams::new();
    params.medication_name = Some("does-not-exist".to_string());
    assert_eq!(
        service.search_prescriptions(&params).await,
        service.search_prescriptions(&SearchParams::new()).await
    );
}
