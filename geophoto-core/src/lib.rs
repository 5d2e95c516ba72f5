//! Client library for the GeoPhoto backend: typed access to the photo and
//! album endpoints plus the view state the front ends are built from.
//!
//! ```no_run
//! use geophoto_core::{ApiClient, BackendConfig, LibraryView, PhotoFilter, Session};
//!
//! # async fn example() -> Result<(), geophoto_core::Error> {
//! let api = ApiClient::new(BackendConfig::new("http://localhost:8080"))?;
//! let session = Session::with_token("token");
//!
//! let mut library = LibraryView::new();
//! library.load(&api, &session).await?;
//! library.set_filter(PhotoFilter::WithGps);
//! for photo in library.visible() {
//!     println!("{} -> {}", photo.file_name, api.config().photo_url(&photo.url));
//! }
//! # Ok(())
//! # }
//! ```

pub mod albums;
pub mod albums_view;
pub mod api;
pub mod config;
mod error;
pub mod geolocation;
pub mod library;
pub mod models;
pub mod photos;
pub mod scope;
pub mod session;
pub mod upload;

pub use albums_view::{AlbumDetailView, AlbumEdit, AlbumListView};
pub use api::{ApiClient, ApiClientBuilder};
pub use config::BackendConfig;
pub use error::{Error, ValidationError, NETWORK_ERROR_MESSAGE};
pub use geolocation::{FixedGeolocator, GeolocationError, Geolocator, PositionOptions};
pub use library::{
    filter_photos, FilterCounts, LibraryView, LoadState, MapRoute, PhotoAction, PhotoFilter,
    ViewMode,
};
pub use models::{Album, Coordinates, Photo, ResourceId, Timestamp};
pub use scope::ViewScope;
pub use session::{CredentialStore, MemoryCredentialStore, Session, SessionState, SessionStatus};
pub use upload::{
    validate_photo_file, FlowMessage, MessageKind, PhotoFile, UploadFlow, UploadFlowError,
    UploadPhase, UploadRequest, MAX_UPLOAD_BYTES,
};
