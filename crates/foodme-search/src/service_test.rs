use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use foodme_core::ProviderError;

use super::*;
use crate::random::ThreadRandom;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Location(String, SearchFilters),
    Coordinates(f64, f64, SearchFilters),
}

enum Behaviour {
    Return(Vec<Candidate>),
    Fail,
    Hang,
}

struct FakeProvider {
    behaviour: Behaviour,
    calls: Mutex<Vec<Call>>,
}

impl FakeProvider {
    fn returning(candidates: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self {
            behaviour: Behaviour::Return(candidates),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn with(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            behaviour,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    async fn respond(&self) -> Result<Vec<Candidate>, ProviderError> {
        match &self.behaviour {
            Behaviour::Return(c) => Ok(c.clone()),
            Behaviour::Fail => Err(ProviderError::Request("connection refused".to_owned())),
            Behaviour::Hang => {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl ListingsProvider for FakeProvider {
    async fn find_by_location(
        &self,
        location: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Location(location.to_owned(), filters.clone()));
        self.respond().await
    }

    async fn find_by_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Coordinates(longitude, latitude, filters.clone()));
        self.respond().await
    }
}

/// Always picks the same index.
struct FixedRandom(usize);

impl RandomSource for FixedRandom {
    fn pick(&self, _len: usize) -> usize {
        self.0
    }
}

/// Cycles through indices so consecutive picks differ.
struct CyclingRandom(AtomicUsize);

impl RandomSource for CyclingRandom {
    fn pick(&self, len: usize) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) % len
    }
}

fn candidate(id: &str, distance: f64) -> Candidate {
    Candidate {
        id: id.to_owned(),
        name: format!("Restaurant {id}"),
        distance,
        price: PriceTier::new(1).ok(),
        cuisines: vec!["afghan".to_owned()],
        rating: 4.0,
        review_count: None,
        address: None,
        coordinates: None,
        url: None,
        image_url: None,
    }
}

fn montreal() -> LocationQuery {
    LocationQuery::Place("montreal".to_owned())
}

fn service(provider: Arc<FakeProvider>, random: Arc<dyn RandomSource>) -> SearchService {
    SearchService::new(provider, random, Duration::from_secs(5))
}

fn ids(candidates: &[Candidate]) -> Vec<&str> {
    candidates.iter().map(|c| c.id.as_str()).collect()
}

#[tokio::test]
async fn distance_search_orders_nearest_first() {
    let provider = FakeProvider::returning(vec![
        candidate("c", 900.0),
        candidate("a", 15.5),
        candidate("d", 4000.0),
        candidate("b", 300.0),
    ]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));

    let result = svc.search_by_distance(&montreal(), None).await.unwrap();

    assert_eq!(ids(&result), vec!["a", "b", "c", "d"]);
    assert!(result.windows(2).all(|w| w[0].distance <= w[1].distance));

    let calls = provider.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        Call::Location(place, filters) => {
            assert_eq!(place, "montreal");
            assert_eq!(filters.sort_by, SortBy::Distance);
            assert_eq!(filters.radius_m, None);
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn distance_ties_keep_provider_order() {
    let provider = FakeProvider::returning(vec![
        candidate("second-far", 50.0),
        candidate("tie-1", 10.0),
        candidate("tie-2", 10.0),
        candidate("tie-3", 10.0),
    ]);
    let svc = service(provider, Arc::new(ThreadRandom));

    let result = svc.search_by_distance(&montreal(), Some(1000)).await.unwrap();

    assert_eq!(ids(&result), vec!["tie-1", "tie-2", "tie-3", "second-far"]);
}

#[tokio::test]
async fn distance_search_of_empty_set_is_empty_not_error() {
    let svc = service(FakeProvider::returning(vec![]), Arc::new(ThreadRandom));
    let result = svc.search_by_distance(&montreal(), None).await.unwrap();
    assert!(result.is_empty());
}

#[tokio::test]
async fn blank_location_is_rejected_before_provider_call() {
    let provider = FakeProvider::returning(vec![candidate("a", 1.0)]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));
    let blank = LocationQuery::Place("  ".to_owned());

    assert!(matches!(
        svc.search_by_distance(&blank, None).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(matches!(
        svc.recommend_random(&blank, None).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(matches!(
        svc.search_by_price(&blank, PriceTier::new(1).unwrap()).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(matches!(
        svc.search_by_cuisine(&blank, "afghan").await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(provider.calls().is_empty(), "provider must not be called");
}

#[tokio::test]
async fn out_of_range_coordinates_and_radius_are_rejected() {
    let provider = FakeProvider::returning(vec![]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));
    let bad = LocationQuery::Coordinates {
        longitude: -200.0,
        latitude: 45.0,
    };

    assert!(matches!(
        svc.search_by_distance(&bad, None).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(matches!(
        svc.search_by_distance(&montreal(), Some(0)).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(matches!(
        svc.recommend_random(&montreal(), Some(40_001)).await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn recommendation_from_empty_set_is_no_candidates() {
    let svc = service(FakeProvider::returning(vec![]), Arc::new(ThreadRandom));
    assert_eq!(
        svc.recommend_random(&montreal(), None).await,
        Err(SearchError::NoCandidates)
    );
}

#[tokio::test]
async fn recommendation_from_single_candidate_returns_it() {
    let svc = service(
        FakeProvider::returning(vec![candidate("only", 42.0)]),
        Arc::new(FixedRandom(0)),
    );
    let pick = svc.recommend_random(&montreal(), None).await.unwrap();
    assert_eq!(pick.id, "only");
}

#[tokio::test]
async fn recommendation_uses_injected_random_index() {
    let svc = service(
        FakeProvider::returning(vec![
            candidate("a", 1.0),
            candidate("b", 2.0),
            candidate("c", 3.0),
        ]),
        Arc::new(FixedRandom(2)),
    );
    let pick = svc.recommend_random(&montreal(), None).await.unwrap();
    assert_eq!(pick.id, "c");
}

#[tokio::test]
async fn out_of_range_random_index_is_clamped() {
    let svc = service(
        FakeProvider::returning(vec![candidate("a", 1.0), candidate("b", 2.0)]),
        Arc::new(FixedRandom(99)),
    );
    let pick = svc.recommend_random(&montreal(), None).await.unwrap();
    assert_eq!(pick.id, "b");
}

#[tokio::test]
async fn consecutive_recommendations_can_differ() {
    let candidates: Vec<Candidate> = (0..5).map(|i| candidate(&i.to_string(), 1.0)).collect();
    let svc = service(
        FakeProvider::returning(candidates),
        Arc::new(CyclingRandom(AtomicUsize::new(0))),
    );
    let first = svc.recommend_random(&montreal(), None).await.unwrap();
    let second = svc.recommend_random(&montreal(), None).await.unwrap();
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn thread_random_recommendations_differ_across_trials() {
    let candidates: Vec<Candidate> = (0..10).map(|i| candidate(&i.to_string(), 1.0)).collect();
    let svc = service(FakeProvider::returning(candidates), Arc::new(ThreadRandom));

    let first = svc.recommend_random(&montreal(), None).await.unwrap();
    let mut differed = false;
    for _ in 0..50 {
        if svc.recommend_random(&montreal(), None).await.unwrap().id != first.id {
            differed = true;
            break;
        }
    }
    assert!(differed, "50 uniform draws over 10 candidates should not all match");
}

#[tokio::test]
async fn price_search_is_deterministic_in_provider_order() {
    let provider = FakeProvider::returning(vec![
        candidate("z", 900.0),
        candidate("a", 10.0),
        candidate("m", 300.0),
    ]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));
    let tier = PriceTier::new(1).unwrap();

    let first = svc.search_by_price(&montreal(), tier).await.unwrap();
    let second = svc.search_by_price(&montreal(), tier).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(ids(&first), vec!["z", "a", "m"]);

    for call in provider.calls() {
        match call {
            Call::Location(_, filters) => {
                assert_eq!(filters.price, Some(tier));
                assert_eq!(filters.sort_by, SortBy::BestMatch);
            }
            other => panic!("unexpected call {other:?}"),
        }
    }
}

#[tokio::test]
async fn cuisine_search_by_coordinates_forwards_filters() {
    let provider = FakeProvider::returning(vec![candidate("a", 10.0)]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));
    let coords = LocationQuery::Coordinates {
        longitude: -73.623_419,
        latitude: 45.474_999,
    };

    let first = svc.search_by_cuisine(&coords, " afghan ").await.unwrap();
    let second = svc.search_by_cuisine(&coords, "afghan").await.unwrap();
    assert_eq!(first, second);

    let calls = provider.calls();
    assert_eq!(calls.len(), 2);
    match &calls[0] {
        Call::Coordinates(lon, lat, filters) => {
            assert!((lon + 73.623_419).abs() < 1e-9);
            assert!((lat - 45.474_999).abs() < 1e-9);
            assert_eq!(filters.cuisine.as_deref(), Some("afghan"));
        }
        other => panic!("unexpected call {other:?}"),
    }
}

#[tokio::test]
async fn blank_cuisine_is_rejected() {
    let provider = FakeProvider::returning(vec![]);
    let svc = service(Arc::clone(&provider), Arc::new(ThreadRandom));
    assert!(matches!(
        svc.search_by_cuisine(&montreal(), "   ").await,
        Err(SearchError::InvalidQuery(_))
    ));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn provider_failure_maps_to_unavailable() {
    let svc = service(FakeProvider::with(Behaviour::Fail), Arc::new(ThreadRandom));
    let err = svc
        .search_by_price(&montreal(), PriceTier::new(2).unwrap())
        .await
        .unwrap_err();
    assert!(matches!(err, SearchError::ProviderUnavailable(ref m) if m.contains("connection refused")));
}

#[tokio::test]
async fn provider_deadline_maps_to_unavailable() {
    let svc = SearchService::new(
        FakeProvider::with(Behaviour::Hang),
        Arc::new(ThreadRandom),
        Duration::from_millis(20),
    );
    let err = svc.search_by_distance(&montreal(), None).await.unwrap_err();
    assert!(matches!(err, SearchError::ProviderUnavailable(_)));
}
