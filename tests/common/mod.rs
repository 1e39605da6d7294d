#![allow(dead_code)]

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use chrono::DateTime;
use serde_json::{Value, json};
use tokio::time::Instant;

use discogs_sync::{
    config::Settings,
    discogs::{DiscogsClient, HttpRequest, HttpResponse, HttpTransport},
    error::{StoreError, TransportError},
    management::{CacheKey, CacheStore, ProgressSink, SessionProvider, SyncStateStore},
    types::{
        BasicInformation, CollectionRelease, Credentials, Folder, MasterImage, ReleaseArtist,
        ReleaseFormat, SyncProgress, SyncState, WantlistRelease,
    },
};

pub const BASE_URL: &str = "http://discogs.test";
pub const USERNAME: &str = "crate_digger";
pub const TOKEN: &str = "s3cr3t-token";

pub fn credentials() -> Credentials {
    Credentials::new(USERNAME, TOKEN)
}

pub fn settings() -> Settings {
    Settings {
        api_url: BASE_URL.to_string(),
        user_agent: "DiscogsSyncTests/1.0".to_string(),
        rate_limit: 1000,
        rate_window: Duration::from_secs(60),
        max_attempts: 3,
        backoff_base: Duration::from_secs(2),
        concurrency: 10,
        per_page: 100,
        ..Settings::default()
    }
}

pub fn client(transport: Arc<dyn HttpTransport>, settings: &Settings) -> DiscogsClient {
    DiscogsClient::with_transport(transport, settings)
}

// ---------------------------------------------------------------------------
// responses

pub fn json_response(status: u16, body: &Value) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text(status).to_string(),
        body: serde_json::to_vec(body).unwrap(),
    }
}

pub fn status_response(status: u16) -> HttpResponse {
    json_response(status, &json!({ "message": status_text(status) }))
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "",
    }
}

// ---------------------------------------------------------------------------
// scripted transport

#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub at: Instant,
}

type Handler = dyn Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync;

/// Transport whose responses come from a closure. Records every request.
pub struct FakeTransport {
    handler: Box<Handler>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeTransport {
    pub fn new(
        handler: impl Fn(&HttpRequest) -> Result<HttpResponse, TransportError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    /// Answers the n-th call (zero based) with `responses[n]`, repeating the
    /// last one afterwards.
    pub fn sequence(
        responses: Vec<Result<HttpResponse, TransportError>>,
    ) -> Arc<Self> {
        let counter = AtomicUsize::new(0);
        Self::new(move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let idx = n.min(responses.len() - 1);
            match &responses[idx] {
                Ok(response) => Ok(response.clone()),
                Err(TransportError::Network(msg)) => Err(TransportError::Network(msg.clone())),
            }
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(RecordedCall {
            url: request.url.clone(),
            headers: request.headers.clone(),
            at: Instant::now(),
        });
        (self.handler)(&request)
    }
}

// ---------------------------------------------------------------------------
// simulated Discogs server

#[derive(Default)]
struct ServerData {
    collection: Vec<CollectionRelease>,
    wants: Vec<WantlistRelease>,
    folders: Vec<Folder>,
    masters: HashMap<i64, Value>,
    failing_releases: HashSet<u64>,
    failing_paths: Vec<String>,
}

/// In-process stand-in for the Discogs API. Serves paginated collection and
/// wantlist pages honouring `per_page` and `page`, release details, masters
/// and folders, and can be told to fail specific lookups.
pub struct FakeDiscogs {
    data: Mutex<ServerData>,
    calls: Mutex<Vec<String>>,
    latency: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDiscogs {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::ZERO)
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            data: Mutex::new(ServerData::default()),
            calls: Mutex::new(Vec::new()),
            latency,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub fn set_collection(&self, items: Vec<CollectionRelease>) {
        self.data.lock().unwrap().collection = items;
    }

    /// Adds items as the newest ones.
    pub fn prepend_collection(&self, items: Vec<CollectionRelease>) {
        let mut data = self.data.lock().unwrap();
        let mut all = items;
        all.append(&mut data.collection);
        data.collection = all;
    }

    pub fn set_wants(&self, items: Vec<WantlistRelease>) {
        self.data.lock().unwrap().wants = items;
    }

    pub fn set_folders(&self, folders: Vec<Folder>) {
        self.data.lock().unwrap().folders = folders;
    }

    pub fn add_master(&self, master_id: i64, year: i32, images: Vec<MasterImage>) {
        self.data.lock().unwrap().masters.insert(
            master_id,
            json!({ "id": master_id, "title": format!("Master {}", master_id), "year": year, "images": images }),
        );
    }

    pub fn fail_release(&self, release_id: u64) {
        self.data.lock().unwrap().failing_releases.insert(release_id);
    }

    /// Every request whose path contains `fragment` gets a 500.
    pub fn fail_path(&self, fragment: &str) {
        self.data
            .lock()
            .unwrap()
            .failing_paths
            .push(fragment.to_string());
    }

    pub fn heal(&self) {
        let mut data = self.data.lock().unwrap();
        data.failing_paths.clear();
        data.failing_releases.clear();
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, fragment: &str) -> usize {
        self.calls()
            .iter()
            .filter(|url| path_of(url).contains(fragment))
            .count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn respond(&self, url: &str) -> HttpResponse {
        let path = path_of(url).trim_start_matches(BASE_URL).to_string();
        let data = self.data.lock().unwrap();

        if data.failing_paths.iter().any(|f| path.contains(f.as_str())) {
            return status_response(500);
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        match segments.as_slice() {
            ["oauth", "identity"] => json_response(
                200,
                &json!({
                    "id": 1,
                    "username": USERNAME,
                    "resource_url": format!("{}/users/{}", BASE_URL, USERNAME),
                    "consumer_name": "discogs-sync"
                }),
            ),
            ["users", user, "collection", "folders", "0", "releases"] if *user == USERNAME => {
                let (items, pagination) = paginate(url, &data.collection);
                json_response(200, &json!({ "pagination": pagination, "releases": items }))
            }
            ["users", user, "collection", "folders"] if *user == USERNAME => {
                json_response(200, &json!({ "folders": data.folders }))
            }
            ["users", user, "wants"] if *user == USERNAME => {
                let (items, pagination) = paginate(url, &data.wants);
                json_response(200, &json!({ "pagination": pagination, "wants": items }))
            }
            ["users", user] if *user == USERNAME => json_response(
                200,
                &json!({
                    "id": 1,
                    "username": USERNAME,
                    "avatar_url": "https://img.discogs.test/avatar.jpg",
                    "num_collection": data.collection.len(),
                    "num_wantlist": data.wants.len()
                }),
            ),
            ["releases", id] => match id.parse::<u64>() {
                Ok(id) if data.failing_releases.contains(&id) => status_response(404),
                Ok(id) => json_response(200, &release_details(id)),
                Err(_) => status_response(404),
            },
            ["masters", id] => match id.parse::<i64>().ok().and_then(|id| data.masters.get(&id)) {
                Some(master) => json_response(200, master),
                None => status_response(404),
            },
            _ => status_response(404),
        }
    }
}

#[async_trait]
impl HttpTransport for FakeDiscogs {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request.url.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let response = self.respond(&request.url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(response)
    }
}

fn path_of(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

fn query_param(url: &str, key: &str) -> Option<u32> {
    let query = url.split_once('?')?.1;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .and_then(|(_, v)| v.parse().ok())
}

fn with_page(url: &str, page: u32) -> String {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    let mut params: Vec<String> = query
        .split('&')
        .filter(|p| !p.is_empty() && !p.starts_with("page="))
        .map(str::to_string)
        .collect();
    params.push(format!("page={}", page));
    format!("{}?{}", path, params.join("&"))
}

fn paginate<T: serde::Serialize>(url: &str, items: &[T]) -> (Vec<Value>, Value) {
    let per_page = query_param(url, "per_page").unwrap_or(50).max(1) as usize;
    let page = query_param(url, "page").unwrap_or(1).max(1) as usize;
    let pages = items.len().div_ceil(per_page).max(1);

    let slice: Vec<Value> = items
        .iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .map(|item| serde_json::to_value(item).unwrap())
        .collect();

    let mut urls = serde_json::Map::new();
    if page < pages {
        urls.insert("next".to_string(), json!(with_page(url, page as u32 + 1)));
        urls.insert("last".to_string(), json!(with_page(url, pages as u32)));
    }

    let pagination = json!({
        "page": page,
        "pages": pages,
        "per_page": per_page,
        "items": items.len(),
        "urls": urls,
    });
    (slice, pagination)
}

pub fn release_details(release_id: u64) -> Value {
    json!({
        "id": release_id,
        "title": format!("Release {}", release_id),
        "genres": ["Jazz"],
        "styles": ["Hard Bop"],
        "notes": format!("Notes for {}", release_id),
        "extraartists": [{ "name": "Rudy Van Gelder", "role": "Engineer" }],
        "tracklist": []
    })
}

// ---------------------------------------------------------------------------
// fixtures

/// RFC 3339 timestamp `hours` after a fixed base; larger means newer.
pub fn added(hours: i64) -> String {
    let base = DateTime::parse_from_rfc3339("2024-01-01T00:00:00-08:00").unwrap();
    (base + chrono::Duration::hours(hours)).to_rfc3339()
}

pub fn basic_information(release_id: u64, master_id: i64) -> BasicInformation {
    BasicInformation {
        id: release_id,
        master_id,
        master_url: None,
        resource_url: format!("{}/releases/{}", BASE_URL, release_id),
        thumb: format!("https://img.discogs.test/{}-thumb.jpg", release_id),
        cover_image: format!("https://img.discogs.test/{}.jpg", release_id),
        title: format!("Release {}", release_id),
        year: 1960,
        formats: vec![ReleaseFormat {
            name: "Vinyl".to_string(),
            qty: "1".to_string(),
            text: None,
            descriptions: vec!["LP".to_string()],
        }],
        labels: vec![],
        artists: vec![ReleaseArtist {
            name: format!("Artist {}", release_id % 7),
            anv: String::new(),
            join: String::new(),
            role: String::new(),
            tracks: String::new(),
            id: release_id % 7,
            resource_url: String::new(),
        }],
    }
}

pub fn collection_release(instance_id: u64, release_id: u64, hours: i64) -> CollectionRelease {
    CollectionRelease {
        id: release_id,
        instance_id,
        date_added: added(hours),
        rating: 0,
        basic_information: basic_information(release_id, 0),
        folder_id: 1,
        details: None,
        master_year: None,
    }
}

/// `count` collection items, newest first, with instance ids `first_instance..`.
pub fn collection(first_instance: u64, count: usize, newest_hours: i64) -> Vec<CollectionRelease> {
    (0..count)
        .map(|i| {
            let instance = first_instance + i as u64;
            collection_release(instance, 1000 + instance, newest_hours - i as i64)
        })
        .collect()
}

pub fn want(want_id: u64, release_id: u64, master_id: i64, hours: i64) -> WantlistRelease {
    WantlistRelease {
        id: want_id,
        resource_url: String::new(),
        rating: 0,
        date_added: added(hours),
        basic_information: basic_information(release_id, master_id),
        details: None,
        master_cover_image: None,
        master_year: None,
    }
}

pub fn wants(first_id: u64, count: usize, newest_hours: i64) -> Vec<WantlistRelease> {
    (0..count)
        .map(|i| {
            let id = first_id + i as u64;
            want(id, 5000 + id, 0, newest_hours - i as i64)
        })
        .collect()
}

pub fn image(kind: &str, uri: &str) -> MasterImage {
    MasterImage {
        kind: kind.to_string(),
        uri: uri.to_string(),
        uri150: String::new(),
        resource_url: String::new(),
        width: 600,
        height: 600,
    }
}

pub fn folders() -> Vec<Folder> {
    vec![
        Folder {
            id: 0,
            count: 0,
            name: "All".to_string(),
            resource_url: String::new(),
        },
        Folder {
            id: 1,
            count: 0,
            name: "Uncategorized".to_string(),
            resource_url: String::new(),
        },
    ]
}

// ---------------------------------------------------------------------------
// in-memory stores

#[derive(Default)]
pub struct MemoryStore {
    cache: Mutex<HashMap<(String, CacheKey), Value>>,
    state: Mutex<HashMap<String, SyncState>>,
    progress: Mutex<HashMap<String, SyncProgress>>,
    /// Every progress write in order; `None` marks a clear.
    history: Mutex<Vec<Option<SyncProgress>>>,
    writes: AtomicUsize,
    fail_cache_writes: AtomicBool,
    failing_key: Mutex<Option<CacheKey>>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_cache_writes(&self, fail: bool) {
        self.fail_cache_writes.store(fail, Ordering::SeqCst);
    }

    /// Fails writes of one cached list only.
    pub fn fail_writes_of(&self, key: Option<CacheKey>) {
        *self.failing_key.lock().unwrap() = key;
    }

    pub fn cached(&self, key: CacheKey) -> Option<Value> {
        self.cache
            .lock()
            .unwrap()
            .get(&(USERNAME.to_string(), key))
            .cloned()
    }

    pub fn cached_collection(&self) -> Vec<CollectionRelease> {
        self.cached(CacheKey::Collection)
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap_or_default()
    }

    pub fn cached_wantlist(&self) -> Vec<WantlistRelease> {
        self.cached(CacheKey::Wantlist)
            .map(|v| serde_json::from_value(v).unwrap())
            .unwrap_or_default()
    }

    pub fn sync_state(&self) -> Option<SyncState> {
        self.state.lock().unwrap().get(USERNAME).cloned()
    }

    pub fn put_sync_state(&self, state: SyncState) {
        self.state
            .lock()
            .unwrap()
            .insert(USERNAME.to_string(), state);
    }

    pub fn current_progress(&self) -> Option<SyncProgress> {
        self.progress.lock().unwrap().get(USERNAME).cloned()
    }

    pub fn progress_history(&self) -> Vec<Option<SyncProgress>> {
        self.history.lock().unwrap().clone()
    }

    /// Cache and sync-state writes, progress excluded.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, username: &str, key: CacheKey) -> Result<Option<Value>, StoreError> {
        Ok(self
            .cache
            .lock()
            .unwrap()
            .get(&(username.to_string(), key))
            .cloned())
    }

    async fn set(&self, username: &str, key: CacheKey, value: &Value) -> Result<(), StoreError> {
        if self.fail_cache_writes.load(Ordering::SeqCst)
            || *self.failing_key.lock().unwrap() == Some(key)
        {
            return Err(StoreError::Io(std::io::Error::other("disk full")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.cache
            .lock()
            .unwrap()
            .insert((username.to_string(), key), value.clone());
        Ok(())
    }

    async fn remove(&self, username: &str, key: CacheKey) -> Result<(), StoreError> {
        self.cache
            .lock()
            .unwrap()
            .remove(&(username.to_string(), key));
        Ok(())
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        self.cache.lock().unwrap().retain(|(user, _), _| user != username);
        Ok(())
    }
}

#[async_trait]
impl SyncStateStore for MemoryStore {
    async fn get(&self, username: &str) -> Result<Option<SyncState>, StoreError> {
        Ok(self.state.lock().unwrap().get(username).cloned())
    }

    async fn set(&self, username: &str, state: &SyncState) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.state
            .lock()
            .unwrap()
            .insert(username.to_string(), state.clone());
        Ok(())
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        self.state.lock().unwrap().remove(username);
        Ok(())
    }
}

#[async_trait]
impl ProgressSink for MemoryStore {
    async fn set(&self, username: &str, progress: &SyncProgress) -> Result<(), StoreError> {
        self.history.lock().unwrap().push(Some(progress.clone()));
        self.progress
            .lock()
            .unwrap()
            .insert(username.to_string(), progress.clone());
        Ok(())
    }

    async fn get(&self, username: &str) -> Result<Option<SyncProgress>, StoreError> {
        Ok(self.progress.lock().unwrap().get(username).cloned())
    }

    async fn clear(&self, username: &str) -> Result<(), StoreError> {
        self.history.lock().unwrap().push(None);
        self.progress.lock().unwrap().remove(username);
        Ok(())
    }
}

/// Session provider with fixed credentials.
pub struct StaticSession(pub Option<Credentials>);

#[async_trait]
impl SessionProvider for StaticSession {
    async fn credentials(&self) -> Option<Credentials> {
        self.0.clone()
    }
}
