//! In-memory collaborators and request helpers for router tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{header::CONTENT_TYPE, request::Builder},
    response::Response,
    Router,
};
use chrono::Utc;
use foodme_core::{
    password::hash_password, AppUser, Candidate, Directory, DirectoryError, ListingsProvider,
    NewUser, Preference, PreferenceInput, PriceTier, ProviderError, Reaction, Restaurant,
    SearchFilters,
};
use foodme_search::{RandomSource, SearchService};
use tower::ServiceExt;

use super::{build_app, AppState};
use crate::middleware::RateLimitState;

#[derive(Default)]
struct Store {
    users: BTreeMap<String, AppUser>,
    preferences: Vec<Preference>,
    next_preference_id: i64,
    restaurants: BTreeMap<String, Restaurant>,
    reactions: Vec<(String, Reaction, String)>,
    sessions: Vec<(String, String)>,
    unavailable: bool,
}

#[derive(Clone, Default)]
pub(crate) struct FakeDirectory {
    store: Arc<Mutex<Store>>,
}

impl FakeDirectory {
    fn store(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().expect("store lock")
    }

    pub(crate) fn set_unavailable(&self, unavailable: bool) {
        self.store().unavailable = unavailable;
    }

    pub(crate) fn sessions_for(&self, username: &str) -> usize {
        self.store()
            .sessions
            .iter()
            .filter(|(_, owner)| owner == username)
            .count()
    }

    pub(crate) fn password_hash(&self, username: &str) -> Option<String> {
        self.store()
            .users
            .get(username)
            .map(|u| u.password_hash.clone())
    }
}

pub(crate) fn seed_user(directory: &FakeDirectory, username: &str, password: &str) {
    directory.store().users.insert(
        username.to_owned(),
        AppUser {
            username: username.to_owned(),
            first_name: "Test".to_owned(),
            last_name: "User".to_owned(),
            email: format!("{username}@example.com"),
            password_hash: hash_password(password),
            default_preference_id: None,
            created_at: Utc::now(),
        },
    );
}

fn to_preference(id: i64, username: &str, input: &PreferenceInput) -> Preference {
    Preference {
        id,
        username: username.to_owned(),
        price: input.price,
        location: input.location.clone(),
        cuisine: input.cuisine.clone(),
        sort_by: input.sort_by,
        created_at: Utc::now(),
    }
}

#[async_trait]
impl Directory for FakeDirectory {
    async fn ping(&self) -> Result<(), DirectoryError> {
        if self.store().unavailable {
            return Err(DirectoryError::Storage("database is down".into()));
        }
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError> {
        Ok(self.store().users.get(username).cloned())
    }

    async fn create_user(&self, user: &NewUser) -> Result<AppUser, DirectoryError> {
        let mut store = self.store();
        if store.users.contains_key(&user.username) {
            return Err(DirectoryError::Conflict("Username already exists".to_owned()));
        }
        let created = AppUser {
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            default_preference_id: None,
            created_at: Utc::now(),
        };
        store.users.insert(user.username.clone(), created.clone());
        Ok(created)
    }

    async fn delete_user(&self, username: &str) -> Result<Option<AppUser>, DirectoryError> {
        let mut store = self.store();
        let removed = store.users.remove(username);
        if removed.is_some() {
            store.preferences.retain(|p| p.username != username);
            store.reactions.retain(|(owner, _, _)| owner != username);
            store.sessions.retain(|(_, owner)| owner != username);
        }
        Ok(removed)
    }

    async fn set_password_hash(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<(), DirectoryError> {
        let mut store = self.store();
        let user = store
            .users
            .get_mut(username)
            .ok_or(DirectoryError::NotFound("user"))?;
        user.password_hash = password_hash.to_owned();
        Ok(())
    }

    async fn create_session(&self, username: &str, token: &str) -> Result<(), DirectoryError> {
        let mut store = self.store();
        if !store.users.contains_key(username) {
            return Err(DirectoryError::NotFound("user"));
        }
        store.sessions.push((token.to_owned(), username.to_owned()));
        Ok(())
    }

    async fn create_preference(
        &self,
        username: &str,
        input: &PreferenceInput,
    ) -> Result<Preference, DirectoryError> {
        let mut store = self.store();
        if !store.users.contains_key(username) {
            return Err(DirectoryError::NotFound("user"));
        }
        store.next_preference_id += 1;
        let preference = to_preference(store.next_preference_id, username, input);
        store.preferences.push(preference.clone());
        Ok(preference)
    }

    async fn list_preferences(&self, username: &str) -> Result<Vec<Preference>, DirectoryError> {
        Ok(self
            .store()
            .preferences
            .iter()
            .filter(|p| p.username == username)
            .cloned()
            .collect())
    }

    async fn update_preference(
        &self,
        username: &str,
        preference_id: i64,
        input: &PreferenceInput,
    ) -> Result<Option<Preference>, DirectoryError> {
        let mut store = self.store();
        let Some(existing) = store
            .preferences
            .iter_mut()
            .find(|p| p.id == preference_id && p.username == username)
        else {
            return Ok(None);
        };
        existing.price = input.price;
        existing.location = input.location.clone();
        existing.cuisine = input.cuisine.clone();
        existing.sort_by = input.sort_by;
        Ok(Some(existing.clone()))
    }

    async fn delete_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<Option<Preference>, DirectoryError> {
        let mut store = self.store();
        let Some(index) = store
            .preferences
            .iter()
            .position(|p| p.id == preference_id && p.username == username)
        else {
            return Ok(None);
        };
        let removed = store.preferences.remove(index);
        if let Some(user) = store.users.get_mut(username) {
            if user.default_preference_id == Some(preference_id) {
                user.default_preference_id = None;
            }
        }
        Ok(Some(removed))
    }

    async fn set_default_preference(
        &self,
        username: &str,
        preference_id: i64,
    ) -> Result<bool, DirectoryError> {
        let mut store = self.store();
        let owned = store
            .preferences
            .iter()
            .any(|p| p.id == preference_id && p.username == username);
        match store.users.get_mut(username) {
            Some(user) if owned => {
                user.default_preference_id = Some(preference_id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_default_preference(
        &self,
        username: &str,
    ) -> Result<Option<Preference>, DirectoryError> {
        let store = self.store();
        let Some(default_id) = store
            .users
            .get(username)
            .and_then(|u| u.default_preference_id)
        else {
            return Ok(None);
        };
        Ok(store.preferences.iter().find(|p| p.id == default_id).cloned())
    }

    async fn create_restaurant(&self, id: &str, name: &str) -> Result<Restaurant, DirectoryError> {
        let mut store = self.store();
        if store.restaurants.contains_key(id) {
            return Err(DirectoryError::Conflict("Restaurant already exists".to_owned()));
        }
        let restaurant = Restaurant {
            id: id.to_owned(),
            name: name.to_owned(),
        };
        store.restaurants.insert(id.to_owned(), restaurant.clone());
        Ok(restaurant)
    }

    async fn add_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant: &Restaurant,
    ) -> Result<Restaurant, DirectoryError> {
        let mut store = self.store();
        if !store.users.contains_key(username) {
            return Err(DirectoryError::NotFound("user"));
        }
        let stored = store
            .restaurants
            .entry(restaurant.id.clone())
            .or_insert_with(|| restaurant.clone())
            .clone();

        let opposite = reaction.opposite();
        store
            .reactions
            .retain(|(owner, r, id)| !(owner == username && *r == opposite && *id == stored.id));
        let already = store
            .reactions
            .iter()
            .any(|(owner, r, id)| owner == username && *r == reaction && *id == stored.id);
        if !already {
            store
                .reactions
                .push((username.to_owned(), reaction, stored.id.clone()));
        }
        Ok(stored)
    }

    async fn remove_reaction(
        &self,
        username: &str,
        reaction: Reaction,
        restaurant_id: &str,
    ) -> Result<bool, DirectoryError> {
        let mut store = self.store();
        let before = store.reactions.len();
        store
            .reactions
            .retain(|(owner, r, id)| !(owner == username && *r == reaction && id == restaurant_id));
        Ok(store.reactions.len() < before)
    }

    async fn list_reactions(
        &self,
        username: &str,
        reaction: Reaction,
    ) -> Result<Vec<Restaurant>, DirectoryError> {
        let store = self.store();
        Ok(store
            .reactions
            .iter()
            .filter(|(owner, r, _)| owner == username && *r == reaction)
            .filter_map(|(_, _, id)| store.restaurants.get(id).cloned())
            .collect())
    }
}

pub(crate) fn candidate(id: &str, distance: f64, price: u8) -> Candidate {
    Candidate {
        id: id.to_owned(),
        name: format!("Restaurant {id}"),
        distance,
        price: PriceTier::new(price).ok(),
        cuisines: vec!["afghan".to_owned()],
        rating: 4.0,
        review_count: None,
        address: None,
        coordinates: None,
        url: None,
        image_url: None,
    }
}

/// Candidates around Montreal in deliberately unsorted provider order.
pub(crate) fn montreal_candidates() -> Vec<Candidate> {
    vec![
        candidate("far", 2_400.0, 1),
        candidate("near", 150.5, 1),
        candidate("middle", 900.0, 2),
        candidate("middle-twin", 900.0, 1),
    ]
}

pub(crate) struct FakeProvider {
    candidates: Vec<Candidate>,
    fail: bool,
    calls: Mutex<Vec<(String, SearchFilters)>>,
}

impl FakeProvider {
    pub(crate) fn returning(candidates: Vec<Candidate>) -> Arc<Self> {
        Arc::new(Self {
            candidates,
            fail: false,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn failing() -> Arc<Self> {
        Arc::new(Self {
            candidates: Vec::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls(&self) -> Vec<(String, SearchFilters)> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn respond(&self, location: String, filters: &SearchFilters) -> Result<Vec<Candidate>, ProviderError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push((location, filters.clone()));
        if self.fail {
            return Err(ProviderError::Request("HTTP 503".to_owned()));
        }
        Ok(self.candidates.clone())
    }
}

#[async_trait]
impl ListingsProvider for FakeProvider {
    async fn find_by_location(
        &self,
        location: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.respond(location.to_owned(), filters)
    }

    async fn find_by_coordinates(
        &self,
        longitude: f64,
        latitude: f64,
        filters: &SearchFilters,
    ) -> Result<Vec<Candidate>, ProviderError> {
        self.respond(format!("{longitude},{latitude}"), filters)
    }
}

/// Always picks the same index.
pub(crate) struct FixedRandom(pub usize);

impl RandomSource for FixedRandom {
    fn pick(&self, _len: usize) -> usize {
        self.0
    }
}

pub(crate) fn test_app_with(
    directory: FakeDirectory,
    provider: Arc<FakeProvider>,
    random: Arc<dyn RandomSource>,
) -> Router {
    let search = SearchService::new(provider, random, Duration::from_secs(2));
    let state = AppState {
        directory: Arc::new(directory),
        search,
    };
    build_app(state, RateLimitState::new(1_000, Duration::from_secs(60)))
}

pub(crate) fn test_app(directory: FakeDirectory) -> Router {
    test_app_with(
        directory,
        FakeProvider::returning(montreal_candidates()),
        Arc::new(FixedRandom(0)),
    )
}

pub(crate) async fn send(app: Router, builder: Builder) -> Response {
    app.oneshot(builder.body(Body::empty()).expect("request"))
        .await
        .expect("response")
}

pub(crate) async fn send_json(app: Router, builder: Builder, body: serde_json::Value) -> Response {
    let request = builder
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    app.oneshot(request).await.expect("response")
}

pub(crate) async fn raw_body(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
}

pub(crate) async fn json_body(response: Response) -> serde_json::Value {
    serde_json::from_slice(&raw_body(response).await).expect("json parse")
}
