#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use geophoto_core::{Album, ApiClient, BackendConfig, Coordinates, Photo, ResourceId, Timestamp};

pub const TOKEN: &str = "test-token";

/// What the backend saw in one multipart upload.
#[derive(Debug, Clone, Default)]
pub struct UploadRecord {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub description: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

#[derive(Debug, Default)]
pub struct Backend {
    pub token: String,
    /// Token is recognised but no longer allowed (403).
    pub revoked: bool,
    pub photos: Vec<Photo>,
    pub albums: Vec<Album>,
    pub members: HashMap<ResourceId, Vec<ResourceId>>,
    pub uploads: Vec<UploadRecord>,
    pub list_delay: Option<Duration>,
    pub unlink_returns_album: bool,
    /// Single-album reads answer 500.
    pub fail_album_reads: bool,
    next_id: i64,
}

impl Backend {
    fn next_id(&mut self) -> ResourceId {
        self.next_id += 1;
        ResourceId::Number(self.next_id)
    }

    fn summary(&self, album: &Album) -> Album {
        let mut album = album.clone();
        album.photo_count = self.members.get(&album.id).map_or(0, Vec::len) as u32;
        album.photos = None;
        album
    }

    fn detail(&self, album: &Album) -> Album {
        let mut album = self.summary(album);
        let members = self.members.get(&album.id).cloned().unwrap_or_default();
        album.photos = Some(
            members
                .iter()
                .filter_map(|id| self.photos.iter().find(|p| &p.id == id).cloned())
                .collect(),
        );
        album
    }
}

type Shared = Arc<Mutex<Backend>>;

/// In-process stand-in for the photo backend.
pub struct MockBackend {
    state: Shared,
    pub base_url: String,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(Mutex::new(Backend {
            token: TOKEN.to_string(),
            ..Backend::default()
        }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().unwrap();
        let app = router(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(BackendConfig::new(&self.base_url)).unwrap()
    }

    pub fn backend(&self) -> MutexGuard<'_, Backend> {
        self.state.lock().unwrap()
    }

    pub fn seed_photo(&self, latitude: Option<f64>, longitude: Option<f64>) -> Photo {
        let mut backend = self.backend();
        let id = backend.next_id();
        let photo = Photo {
            id: id.clone(),
            file_name: format!("IMG_{id}.jpg"),
            url: format!("/uploads/{id}.jpg"),
            latitude,
            longitude,
            description: None,
            uploaded_at: Some(Timestamp("2024-01-15T14:30:00".to_string())),
        };
        backend.photos.push(photo.clone());
        photo
    }

    pub fn seed_album(&self, name: &str, photos: &[&Photo]) -> Album {
        let mut backend = self.backend();
        let id = backend.next_id();
        let album = Album {
            id: id.clone(),
            name: name.to_string(),
            description: None,
            cover_photo_id: None,
            cover_photo_url: None,
            photo_count: 0,
            photos: None,
            created_at: Some(Timestamp("2024-02-01T09:00:00".to_string())),
        };
        backend
            .members
            .insert(id, photos.iter().map(|p| p.id.clone()).collect());
        backend.albums.push(album.clone());
        album
    }
}

/// A base URL nothing is listening on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/photos", get(list_photos))
        .route("/api/photos/with-gps", get(list_geotagged))
        .route("/api/photos/upload", post(upload_photo))
        .route("/api/photos/:id", get(get_photo).delete(delete_photo))
        .route("/api/photos/:id/location", put(set_location))
        .route("/api/albums", get(list_albums).post(create_album))
        .route(
            "/api/albums/:id",
            get(get_album).put(update_album).delete(delete_album),
        )
        .route(
            "/api/albums/:id/photos/:photo_id",
            post(add_photo).delete(unlink_photo),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_token))
        .layer(DefaultBodyLimit::max(16 * 1024 * 1024))
        .with_state(state)
}

async fn require_token(State(state): State<Shared>, req: Request, next: Next) -> Response {
    let (expected, revoked) = {
        let backend = state.lock().unwrap();
        (format!("Bearer {}", backend.token), backend.revoked)
    };
    let presented = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    if presented != Some(expected.as_str()) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if revoked {
        return StatusCode::FORBIDDEN.into_response();
    }
    next.run(req).await
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "message": format!("{what} not found") })),
    )
        .into_response()
}

async fn list_photos(State(state): State<Shared>) -> Json<Vec<Photo>> {
    let delay = state.lock().unwrap().list_delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    Json(state.lock().unwrap().photos.clone())
}

async fn list_geotagged(State(state): State<Shared>) -> Json<Vec<Photo>> {
    let backend = state.lock().unwrap();
    Json(
        backend
            .photos
            .iter()
            .filter(|p| p.has_location())
            .cloned()
            .collect(),
    )
}

async fn get_photo(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let backend = state.lock().unwrap();
    match backend.photos.iter().find(|p| p.id == ResourceId::Number(id)) {
        Some(photo) => Json(photo.clone()).into_response(),
        None => not_found("Photo"),
    }
}

async fn delete_photo(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    let id = ResourceId::Number(id);
    let before = backend.photos.len();
    backend.photos.retain(|p| p.id != id);
    if backend.photos.len() == before {
        return not_found("Photo");
    }
    for members in backend.members.values_mut() {
        members.retain(|m| m != &id);
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn set_location(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(coords): Json<Coordinates>,
) -> Response {
    let mut backend = state.lock().unwrap();
    match backend
        .photos
        .iter_mut()
        .find(|p| p.id == ResourceId::Number(id))
    {
        Some(photo) => {
            photo.latitude = Some(coords.latitude);
            photo.longitude = Some(coords.longitude);
            Json(photo.clone()).into_response()
        }
        None => not_found("Photo"),
    }
}

async fn upload_photo(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut record = UploadRecord::default();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(_) => return StatusCode::BAD_REQUEST.into_response(),
        };
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                record.file_name = field.file_name().map(str::to_string);
                record.content_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => record.size = bytes.len(),
                    Err(_) => return StatusCode::BAD_REQUEST.into_response(),
                }
            }
            "description" => record.description = field.text().await.ok(),
            "latitude" => record.latitude = field.text().await.ok(),
            "longitude" => record.longitude = field.text().await.ok(),
            _ => {}
        }
    }

    let Some(file_name) = record.file_name.clone() else {
        return (StatusCode::BAD_REQUEST, "File is empty").into_response();
    };

    let mut backend = state.lock().unwrap();
    let id = backend.next_id();
    let photo = Photo {
        id: id.clone(),
        file_name,
        url: format!("/uploads/{id}.jpg"),
        latitude: record.latitude.as_deref().and_then(|v| v.parse().ok()),
        longitude: record.longitude.as_deref().and_then(|v| v.parse().ok()),
        description: record.description.clone(),
        uploaded_at: Some(Timestamp("2024-05-01T10:00:00".to_string())),
    };
    backend.photos.push(photo.clone());
    backend.uploads.push(record);
    Json(photo).into_response()
}

async fn list_albums(State(state): State<Shared>) -> Json<Vec<Album>> {
    let backend = state.lock().unwrap();
    Json(backend.albums.iter().map(|a| backend.summary(a)).collect())
}

async fn get_album(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let backend = state.lock().unwrap();
    if backend.fail_album_reads {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    match backend.albums.iter().find(|a| a.id == ResourceId::Number(id)) {
        Some(album) => Json(backend.detail(album)).into_response(),
        None => not_found("Album"),
    }
}

async fn create_album(State(state): State<Shared>, Json(body): Json<serde_json::Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().trim().to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "message": "Album name is required" })),
        )
            .into_response();
    }

    let mut backend = state.lock().unwrap();
    let id = backend.next_id();
    let album = Album {
        id: id.clone(),
        name,
        description: body["description"].as_str().map(str::to_string),
        cover_photo_id: None,
        cover_photo_url: None,
        photo_count: 0,
        photos: None,
        created_at: Some(Timestamp("2024-05-01T10:00:00".to_string())),
    };
    backend.members.insert(id, Vec::new());
    backend.albums.push(album.clone());
    Json(album).into_response()
}

async fn update_album(
    State(state): State<Shared>,
    Path(id): Path<i64>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let id = ResourceId::Number(id);
    let cover: Option<ResourceId> = serde_json::from_value(body["coverPhotoId"].clone()).ok();
    let cover_url = cover.as_ref().and_then(|c| {
        backend
            .photos
            .iter()
            .find(|p| &p.id == c)
            .map(|p| p.url.clone())
    });

    let Some(album) = backend.albums.iter_mut().find(|a| a.id == id) else {
        return not_found("Album");
    };
    if let Some(name) = body["name"].as_str() {
        album.name = name.to_string();
    }
    if let Some(description) = body["description"].as_str() {
        album.description = Some(description.to_string());
    }
    if cover.is_some() {
        album.cover_photo_id = cover;
        album.cover_photo_url = cover_url;
    }
    let album = album.clone();
    Json(backend.summary(&album)).into_response()
}

async fn delete_album(State(state): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut backend = state.lock().unwrap();
    let id = ResourceId::Number(id);
    let before = backend.albums.len();
    backend.albums.retain(|a| a.id != id);
    if backend.albums.len() == before {
        return not_found("Album");
    }
    backend.members.remove(&id);
    StatusCode::NO_CONTENT.into_response()
}

async fn unlink_photo(
    State(state): State<Shared>,
    Path((album_id, photo_id)): Path<(i64, i64)>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let album_id = ResourceId::Number(album_id);
    let photo_id = ResourceId::Number(photo_id);

    let Some(members) = backend.members.get_mut(&album_id) else {
        return not_found("Album");
    };
    members.retain(|m| m != &photo_id);

    if backend.unlink_returns_album {
        let album = backend
            .albums
            .iter()
            .find(|a| a.id == album_id)
            .cloned();
        if let Some(album) = album {
            return Json(backend.detail(&album)).into_response();
        }
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn add_photo(
    State(state): State<Shared>,
    Path((album_id, photo_id)): Path<(i64, i64)>,
) -> Response {
    let mut backend = state.lock().unwrap();
    let album_id = ResourceId::Number(album_id);
    let photo_id = ResourceId::Number(photo_id);

    let Some(album) = backend.albums.iter().find(|a| a.id == album_id).cloned() else {
        return not_found("Album");
    };
    if !backend.photos.iter().any(|p| p.id == photo_id) {
        return not_found("Photo");
    }
    let members = backend.members.entry(album_id).or_default();
    if !members.contains(&photo_id) {
        members.push(photo_id);
    }
    Json(backend.detail(&album)).into_response()
}
