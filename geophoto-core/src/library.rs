use std::fmt;
use std::str::FromStr;

use crate::scope::ViewScope;
use crate::{ApiClient, Error, Photo, ResourceId, Session};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PhotoFilter {
    #[default]
    All,
    WithGps,
    WithoutGps,
}

impl PhotoFilter {
    pub fn matches(self, photo: &Photo) -> bool {
        match self {
            PhotoFilter::All => true,
            PhotoFilter::WithGps => photo.has_location(),
            PhotoFilter::WithoutGps => !photo.has_location(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PhotoFilter::All => "all",
            PhotoFilter::WithGps => "with-gps",
            PhotoFilter::WithoutGps => "without-gps",
        }
    }
}

impl fmt::Display for PhotoFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhotoFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(PhotoFilter::All),
            "with-gps" => Ok(PhotoFilter::WithGps),
            "without-gps" => Ok(PhotoFilter::WithoutGps),
            other => Err(format!(
                "unknown filter '{other}', expected all, with-gps or without-gps"
            )),
        }
    }
}

/// Photos matching `filter`, in their original order. The input is never
/// reordered or modified.
pub fn filter_photos(photos: &[Photo], filter: PhotoFilter) -> Vec<&Photo> {
    photos.iter().filter(|p| filter.matches(p)).collect()
}

/// Number of photos behind each filter tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCounts {
    pub all: usize,
    pub with_gps: usize,
    pub without_gps: usize,
}

impl FilterCounts {
    pub fn of(photos: &[Photo]) -> Self {
        let with_gps = photos.iter().filter(|p| p.has_location()).count();
        Self {
            all: photos.len(),
            with_gps,
            without_gps: photos.len() - with_gps,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn toggle(self) -> Self {
        match self {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        }
    }
}

impl FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "grid" => Ok(ViewMode::Grid),
            "list" => Ok(ViewMode::List),
            other => Err(format!("unknown view mode '{other}', expected grid or list")),
        }
    }
}

/// Client-side routes the views navigate to.
#[derive(Debug, Clone, PartialEq)]
pub enum MapRoute {
    /// Map centred on a photo, with its marker highlighted.
    Focus {
        latitude: f64,
        longitude: f64,
        photo_id: ResourceId,
    },
    /// Map in "pick a location for this photo" mode.
    AddLocation { photo_id: ResourceId },
}

impl MapRoute {
    pub fn path(&self) -> String {
        match self {
            MapRoute::Focus {
                latitude,
                longitude,
                photo_id,
            } => format!("/?lat={latitude}&lng={longitude}&photoId={photo_id}"),
            MapRoute::AddLocation { photo_id } => format!("/?addGpsTo={photo_id}"),
        }
    }
}

/// What clicking a photo does.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotoAction {
    ShowOnMap(MapRoute),
    Preview(Photo),
}

impl PhotoAction {
    /// Geotagged photos open the map, everything else opens a preview.
    pub fn for_photo(photo: &Photo) -> Self {
        match photo.coordinates() {
            Some(coords) => PhotoAction::ShowOnMap(MapRoute::Focus {
                latitude: coords.latitude,
                longitude: coords.longitude,
                photo_id: photo.id.clone(),
            }),
            None => PhotoAction::Preview(photo.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// Shown with a retry button.
    Failed { message: String },
}

impl LoadState {
    pub fn can_retry(&self) -> bool {
        matches!(self, LoadState::Failed { .. })
    }

    pub(crate) fn failed(err: &Error) -> Self {
        LoadState::Failed {
            message: err.user_message(),
        }
    }
}

/// Every photo the user has uploaded, with filter and layout choices.
#[derive(Debug, Default)]
pub struct LibraryView {
    photos: Vec<Photo>,
    state: LoadState,
    filter: PhotoFilter,
    view_mode: ViewMode,
    alert: Option<String>,
    scope: ViewScope,
}

impl LibraryView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: ViewScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn filter(&self) -> PhotoFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: PhotoFilter) {
        self.filter = filter;
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
    }

    /// Last mutation failure, until [`dismiss_alert`](Self::dismiss_alert).
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Photos under the current filter.
    pub fn visible(&self) -> Vec<&Photo> {
        filter_photos(&self.photos, self.filter)
    }

    pub fn counts(&self) -> FilterCounts {
        FilterCounts::of(&self.photos)
    }

    pub fn click(&self, photo: &Photo) -> PhotoAction {
        PhotoAction::for_photo(photo)
    }

    /// Fetch the full library. On failure the previous snapshot is kept and
    /// the view goes into the retryable failed state.
    pub async fn load(&mut self, api: &ApiClient, session: &Session) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.state, LoadState::Loading);
        match self.scope.guard(api.photos().list_all(session)).await {
            Ok(photos) => {
                tracing::debug!("Library loaded with {} photos", photos.len());
                self.photos = photos;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) => {
                if err.is_cancelled() {
                    self.state = previous;
                } else {
                    tracing::error!("Failed to load library: {:?}", err);
                    self.state = LoadState::failed(&err);
                }
                Err(err)
            }
        }
    }

    /// Delete a photo and, once the server confirms, drop it locally.
    pub async fn delete_photo(
        &mut self,
        api: &ApiClient,
        session: &Session,
        id: &ResourceId,
    ) -> Result<(), Error> {
        let result = self.scope.guard(api.photos().remove(session, id)).await;
        if result.is_ok() {
            self.photos.retain(|p| &p.id != id);
        }
        self.settle_mutation(result)
    }

    /// Give a photo coordinates and replace it with the server's copy.
    pub async fn set_location(
        &mut self,
        api: &ApiClient,
        session: &Session,
        id: &ResourceId,
        latitude: f64,
        longitude: f64,
    ) -> Result<Photo, Error> {
        let result = self
            .scope
            .guard(api.photos().set_location(session, id, latitude, longitude))
            .await;
        if let Ok(updated) = &result {
            if let Some(slot) = self.photos.iter_mut().find(|p| p.id == updated.id) {
                *slot = updated.clone();
            }
        }
        self.settle_mutation(result)
    }

    fn settle_mutation<T>(&mut self, result: Result<T, Error>) -> Result<T, Error> {
        match &result {
            Ok(_) => self.alert = None,
            Err(err) if !err.is_cancelled() => self.alert = Some(err.user_message()),
            Err(_) => {}
        }
        result
    }
}
