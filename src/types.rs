use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Username and personal access token of an authenticated caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"REDACTED")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: u64,
    pub username: String,
    pub resource_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub home_page: Option<String>,
    #[serde(default)]
    pub registered: String,
    #[serde(default)]
    pub rank: f64,
    #[serde(default)]
    pub num_collection: u64,
    #[serde(default)]
    pub num_wantlist: u64,
    #[serde(default)]
    pub num_for_sale: u64,
    #[serde(default)]
    pub num_lists: u64,
    #[serde(default)]
    pub releases_contributed: u64,
    #[serde(default)]
    pub releases_rated: u64,
    #[serde(default)]
    pub rating_avg: f64,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default)]
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseArtist {
    pub name: String,
    #[serde(default)]
    pub anv: String,
    #[serde(default)]
    pub join: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub tracks: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub resource_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseLabel {
    pub name: String,
    #[serde(default)]
    pub catno: String,
    #[serde(default)]
    pub entity_type: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub resource_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseFormat {
    pub name: String,
    #[serde(default)]
    pub qty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInformation {
    pub id: u64,
    /// 0 when the release does not belong to a master grouping.
    #[serde(default)]
    pub master_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_url: Option<String>,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub cover_image: String,
    pub title: String,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub formats: Vec<ReleaseFormat>,
    #[serde(default)]
    pub labels: Vec<ReleaseLabel>,
    #[serde(default)]
    pub artists: Vec<ReleaseArtist>,
}

impl BasicInformation {
    pub fn has_master(&self) -> bool {
        self.master_id > 0
    }

    /// Display name of the first credited artist.
    pub fn primary_artist(&self) -> &str {
        self.artists.first().map(|a| a.name.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtraArtist {
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// Per-release data only available from the full release resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extraartists: Option<Vec<ExtraArtist>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<String>>,
}

/// Response of `GET /releases/{id}`, reduced to what the details carry.
#[derive(Debug, Clone, Deserialize)]
pub struct FullRelease {
    pub id: u64,
    #[serde(flatten)]
    pub details: ReleaseDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRelease {
    pub id: u64,
    pub instance_id: u64,
    pub date_added: String,
    #[serde(default)]
    pub rating: u8,
    pub basic_information: BasicInformation,
    #[serde(default)]
    pub folder_id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReleaseDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WantlistRelease {
    pub id: u64,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default)]
    pub rating: u8,
    pub date_added: String,
    pub basic_information: BasicInformation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<ReleaseDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_year: Option<i32>,
}

/// What the collector, enricher and merge step need from a collection or
/// wantlist item.
pub trait Release {
    /// Id of the release itself, used for the details lookup. A wantlist
    /// item's top-level id is the want id, not the release id.
    fn release_id(&self) -> u64;

    fn date_added(&self) -> &str;

    /// Identity of the item within its cached list.
    fn cache_key(&self) -> u64;

    fn basic_information(&self) -> &BasicInformation;

    fn attach_details(&mut self, details: ReleaseDetails);
}

impl Release for CollectionRelease {
    fn release_id(&self) -> u64 {
        self.basic_information.id
    }

    fn date_added(&self) -> &str {
        &self.date_added
    }

    // the same release can be owned more than once
    fn cache_key(&self) -> u64 {
        self.instance_id
    }

    fn basic_information(&self) -> &BasicInformation {
        &self.basic_information
    }

    fn attach_details(&mut self, details: ReleaseDetails) {
        self.details = Some(details);
    }
}

impl Release for WantlistRelease {
    fn release_id(&self) -> u64 {
        self.basic_information.id
    }

    fn date_added(&self) -> &str {
        &self.date_added
    }

    fn cache_key(&self) -> u64 {
        self.id
    }

    fn basic_information(&self) -> &BasicInformation {
        &self.basic_information
    }

    fn attach_details(&mut self, details: ReleaseDetails) {
        self.details = Some(details);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasterImage {
    #[serde(rename = "type")]
    pub kind: String,
    pub uri: String,
    #[serde(default)]
    pub uri150: String,
    #[serde(default)]
    pub resource_url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MasterRelease {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub year: Option<i32>,
    #[serde(default)]
    pub images: Vec<MasterImage>,
}

impl MasterRelease {
    pub fn primary_image(&self) -> Option<&str> {
        self.images
            .iter()
            .find(|img| img.kind == "primary")
            .map(|img| img.uri.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    pub id: u64,
    #[serde(default)]
    pub count: u64,
    pub name: String,
    #[serde(default)]
    pub resource_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FoldersResponse {
    pub folders: Vec<Folder>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaginationUrls {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

/// Position of one page within a paginated remote resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub items: u64,
    #[serde(default)]
    pub urls: PaginationUrls,
}

/// One page of any paginated resource.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

/// Adapts a resource-specific envelope into a [`Page`].
pub trait PagedResponse: serde::de::DeserializeOwned {
    type Item;

    fn into_page(self) -> Page<Self::Item>;
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionPage {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub releases: Vec<CollectionRelease>,
}

impl PagedResponse for CollectionPage {
    type Item = CollectionRelease;

    fn into_page(self) -> Page<CollectionRelease> {
        Page {
            items: self.releases,
            pagination: self.pagination,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WantlistPage {
    #[serde(default)]
    pub pagination: Pagination,
    #[serde(default)]
    pub wants: Vec<WantlistRelease>,
}

impl PagedResponse for WantlistPage {
    type Item = WantlistRelease;

    fn into_page(self) -> Page<WantlistRelease> {
        Page {
            items: self.wants,
            pagination: self.pagination,
        }
    }
}

/// Newest `date_added` seen by the last successful sync, per resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_last_added: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wantlist_last_added: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    Idle,
    Starting,
    Fetching,
    Processing,
    Caching,
    Done,
    Error,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncPhase::Idle => "idle",
            SyncPhase::Starting => "starting",
            SyncPhase::Fetching => "fetching",
            SyncPhase::Processing => "processing",
            SyncPhase::Caching => "caching",
            SyncPhase::Done => "done",
            SyncPhase::Error => "error",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResource {
    Collection,
    Wantlist,
    CollectionDetails,
    WantlistDetails,
    WantlistMasters,
}

impl fmt::Display for SyncResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncResource::Collection => "collection",
            SyncResource::Wantlist => "wantlist",
            SyncResource::CollectionDetails => "collection details",
            SyncResource::WantlistDetails => "wantlist details",
            SyncResource::WantlistMasters => "wantlist masters",
        };
        write!(f, "{}", s)
    }
}

/// Overwrite-in-place status record polled by whoever displays the sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncProgress {
    pub status: SyncPhase,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<SyncResource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SyncProgress {
    pub fn phase(status: SyncPhase, message: impl Into<String>) -> Self {
        Self {
            status,
            resource: None,
            page: None,
            pages: None,
            processed: None,
            total: None,
            message: Some(message.into()),
        }
    }

    pub fn idle() -> Self {
        Self {
            status: SyncPhase::Idle,
            resource: None,
            page: None,
            pages: None,
            processed: None,
            total: None,
            message: None,
        }
    }

    pub fn page(progress: PageProgress) -> Self {
        Self {
            status: SyncPhase::Fetching,
            resource: Some(progress.resource),
            page: Some(progress.page),
            pages: Some(progress.pages),
            processed: None,
            total: None,
            message: None,
        }
    }

    pub fn items(progress: ItemProgress) -> Self {
        Self {
            status: SyncPhase::Processing,
            resource: Some(progress.resource),
            page: None,
            pages: None,
            processed: Some(progress.processed),
            total: Some(progress.total),
            message: None,
        }
    }

    pub fn with_resource(mut self, resource: SyncResource) -> Self {
        self.resource = Some(resource);
        self
    }

    /// One-line human readable description for terminals.
    pub fn describe(&self) -> String {
        let mut line = match (self.resource, self.page, self.pages, self.processed, self.total) {
            (Some(res), Some(page), Some(pages), _, _) => {
                format!("{} {} page {}/{}", self.status, res, page, pages)
            }
            (Some(res), _, _, Some(done), Some(total)) => {
                format!("{} {} {}/{}", self.status, res, done, total)
            }
            (Some(res), ..) => format!("{} {}", self.status, res),
            _ => self.status.to_string(),
        };
        if let Some(message) = &self.message {
            line.push_str(": ");
            line.push_str(message);
        }
        line
    }
}

/// Reported after each fetched page of a paginated walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageProgress {
    pub page: u32,
    pub pages: u32,
    pub resource: SyncResource,
}

/// Reported after each item of an enrichment fan-out completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemProgress {
    pub processed: usize,
    pub total: usize,
    pub resource: SyncResource,
}

#[derive(Tabled)]
pub struct ReleaseTableRow {
    pub added: String,
    pub artist: String,
    pub title: String,
    pub year: String,
    pub format: String,
}

#[derive(Tabled)]
pub struct DuplicateTableRow {
    pub master: i64,
    pub artist: String,
    pub title: String,
    pub copies: usize,
}
