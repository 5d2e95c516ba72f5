use std::fmt;
use std::path::Path;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

use crate::geolocation::{GeolocationError, Geolocator, PositionOptions};
use crate::{ApiClient, Coordinates, Error, Photo, Session, ValidationError};

/// Largest accepted upload, 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// How long the success message stays up before the flow resets.
pub const SUCCESS_DISMISS_DELAY: Duration = Duration::from_secs(2);

/// Only `image/*` files up to [`MAX_UPLOAD_BYTES`] are accepted.
pub fn validate_photo_file(mime_type: &str, size: u64) -> Result<(), ValidationError> {
    if !mime_type.starts_with("image/") {
        return Err(ValidationError::UnsupportedType {
            mime: mime_type.to_string(),
        });
    }
    match ValidationError::too_large(size) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// A local file picked for upload.
#[derive(Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl fmt::Debug for PhotoFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoFile")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

impl PhotoFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a file from disk, guessing its MIME type from the extension.
    /// Oversized or non-image files are rejected before their contents are
    /// read.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let size = tokio::fs::metadata(path).await?.len();
        validate_photo_file(&mime_type, size)?;

        let data = tokio::fs::read(path).await?;
        Ok(Self {
            file_name,
            mime_type,
            data,
        })
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_photo_file(&self.mime_type, self.size())
    }

    /// `data:` URL of the file contents, for showing a preview.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }
}

/// Everything sent to the upload endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub file: PhotoFile,
    pub description: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl UploadRequest {
    pub fn new(file: PhotoFile) -> Self {
        Self {
            file,
            description: None,
            coordinates: None,
        }
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    FileSelected,
    /// A file is selected and the device position is attached.
    LocationCaptured,
    Uploading,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FlowMessage {
    fn new(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UploadFlowError {
    #[error("An upload is already in progress")]
    AlreadyUploading,

    #[error("Can't change the upload while it is in progress")]
    Busy,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Upload(#[from] Error),
}

type UploadCallback = Box<dyn FnMut(&Photo) + Send>;

/// Fails the flow's upload if the submitting future is dropped early.
struct InFlight<'a> {
    flow: &'a mut UploadFlow,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flow.abort_upload();
    }
}

/// State of the upload form: file selection, optional position capture,
/// submission and the message shown afterwards.
pub struct UploadFlow {
    phase: UploadPhase,
    file: Option<PhotoFile>,
    preview: Option<String>,
    description: String,
    location: Option<Coordinates>,
    location_error: Option<GeolocationError>,
    message: Option<FlowMessage>,
    on_success: Option<UploadCallback>,
}

impl fmt::Debug for UploadFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFlow")
            .field("phase", &self.phase())
            .field("file", &self.file)
            .field("description", &self.description)
            .field("location", &self.location)
            .field("location_error", &self.location_error)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

impl Default for UploadFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadFlow {
    pub fn new() -> Self {
        Self {
            phase: UploadPhase::Idle,
            file: None,
            preview: None,
            description: String::new(),
            location: None,
            location_error: None,
            message: None,
            on_success: None,
        }
    }

    /// Called with the created photo after every successful upload.
    #[must_use]
    pub fn on_upload_success<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&Photo) + Send + 'static,
    {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn phase(&self) -> UploadPhase {
        match self.phase {
            UploadPhase::FileSelected if self.location.is_some() => UploadPhase::LocationCaptured,
            phase => phase,
        }
    }

    pub fn selected_file(&self) -> Option<&PhotoFile> {
        self.file.as_ref()
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn location_error(&self) -> Option<GeolocationError> {
        self.location_error
    }

    pub fn message(&self) -> Option<&FlowMessage> {
        self.message.as_ref()
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// Pick a file. Invalid files leave the current selection alone and set
    /// an error message.
    pub fn select_file(&mut self, file: PhotoFile) -> Result<(), UploadFlowError> {
        if self.is_uploading() {
            return Err(UploadFlowError::Busy);
        }

        if let Err(err) = file.validate() {
            tracing::warn!("Rejected {}: {}", file.file_name, err);
            self.message = Some(FlowMessage::new(MessageKind::Error, err.to_string()));
            return Err(err.into());
        }

        tracing::debug!("Selected {} ({} bytes)", file.file_name, file.size());
        self.preview = Some(file.data_url());
        self.file = Some(file);
        self.message = None;
        self.phase = UploadPhase::FileSelected;
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// Ask `locator` for the current position and attach it to the pending
    /// upload. Gives up after the options' timeout.
    pub async fn capture_location(
        &mut self,
        locator: &dyn Geolocator,
    ) -> Result<Coordinates, GeolocationError> {
        self.location_error = None;
        let options = PositionOptions::default();

        let result = match tokio::time::timeout(options.timeout, locator.current_position(&options)).await {
            Ok(result) => result,
            Err(_) => Err(GeolocationError::Timeout),
        };

        match result {
            Ok(coordinates) => {
                tracing::debug!(
                    "Got location {}, {}",
                    coordinates.latitude,
                    coordinates.longitude
                );
                self.location = Some(coordinates);
            }
            Err(err) => {
                tracing::warn!("Failed to get location: {}", err);
                self.location_error = Some(err);
            }
        }
        result
    }

    pub fn clear_location(&mut self) {
        self.location = None;
        self.location_error = None;
    }

    /// Move to `Uploading` and hand out the request to send. Refused while
    /// another upload is outstanding or when no file is selected.
    pub fn begin_upload(&mut self) -> Result<UploadRequest, UploadFlowError> {
        if self.is_uploading() {
            return Err(UploadFlowError::AlreadyUploading);
        }

        let Some(file) = self.file.clone() else {
            let err = ValidationError::NoFileSelected;
            self.message = Some(FlowMessage::new(MessageKind::Error, err.to_string()));
            return Err(err.into());
        };

        self.phase = UploadPhase::Uploading;
        self.message = Some(FlowMessage::new(MessageKind::Info, "Uploading..."));

        Ok(UploadRequest {
            file,
            description: Some(self.description.clone()).filter(|d| !d.is_empty()),
            coordinates: self.location,
        })
    }

    /// Record the outcome of the upload started by [`begin_upload`](Self::begin_upload).
    pub fn complete(&mut self, result: &Result<Photo, Error>) {
        if !self.is_uploading() {
            tracing::warn!("Upload result arrived while no upload was in progress");
            return;
        }

        match result {
            Ok(photo) => {
                let gps = if photo.has_location() {
                    "GPS location found."
                } else {
                    "No GPS location found."
                };
                self.message = Some(FlowMessage::new(
                    MessageKind::Success,
                    format!("Upload complete! {gps}"),
                ));
                self.file = None;
                self.preview = None;
                self.description.clear();
                self.phase = UploadPhase::Succeeded;

                if let Some(callback) = self.on_success.as_mut() {
                    callback(photo);
                }
            }
            Err(err) => {
                self.message = Some(FlowMessage::new(
                    MessageKind::Error,
                    format!("Upload failed! {}", err.user_message()),
                ));
                self.phase = UploadPhase::Failed;
            }
        }
    }

    /// Upload the selected file. Dropping the returned future before it
    /// finishes leaves the flow in `Failed`, never stuck in `Uploading`.
    pub async fn submit(
        &mut self,
        api: &ApiClient,
        session: &Session,
    ) -> Result<Photo, UploadFlowError> {
        let request = self.begin_upload()?;
        let guard = InFlight { flow: self };
        let result = api.photos().upload(session, &request).await;
        guard.flow.complete(&result);
        Ok(result?)
    }

    /// Give up on an upload whose result will never arrive. The selection is
    /// kept so it can be retried. Returns false when nothing was in flight.
    pub fn abort_upload(&mut self) -> bool {
        if !self.is_uploading() {
            return false;
        }
        tracing::warn!("Upload abandoned before the backend answered");
        self.message = Some(FlowMessage::new(
            MessageKind::Error,
            "Upload failed! The upload was interrupted.",
        ));
        self.phase = UploadPhase::Failed;
        true
    }

    /// After a success, wait out the message delay and return to `Idle`.
    pub async fn settle(&mut self) {
        if self.phase != UploadPhase::Succeeded {
            return;
        }
        tokio::time::sleep(SUCCESS_DISMISS_DELAY).await;
        if self.phase == UploadPhase::Succeeded {
            self.phase = UploadPhase::Idle;
            self.message = None;
        }
    }

    /// Throw away the selection, description, location and message.
    pub fn cancel(&mut self) -> Result<(), UploadFlowError> {
        if self.is_uploading() {
            return Err(UploadFlowError::Busy);
        }
        self.phase = UploadPhase::Idle;
        self.file = None;
        self.preview = None;
        self.description.clear();
        self.location = None;
        self.location_error = None;
        self.message = None;
        Ok(())
    }
}
