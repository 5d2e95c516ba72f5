use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::upload::UploadRequest;
use crate::{ApiClient, Coordinates, Error, Photo, ResourceId, Session, ValidationError};

/// Photo endpoints under `/api/photos`.
#[derive(Debug, Clone, Copy)]
pub struct PhotoClient<'a> {
    api: &'a ApiClient,
}

impl<'a> PhotoClient<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_all(&self, session: &Session) -> Result<Vec<Photo>, Error> {
        self.api
            .send_json(session, self.api.request(Method::GET, "/photos"))
            .await
    }

    /// Photos the backend knows coordinates for.
    pub async fn list_geotagged(&self, session: &Session) -> Result<Vec<Photo>, Error> {
        self.api
            .send_json(session, self.api.request(Method::GET, "/photos/with-gps"))
            .await
    }

    pub async fn get(&self, session: &Session, id: &ResourceId) -> Result<Photo, Error> {
        self.api
            .send_json(session, self.api.request(Method::GET, &format!("/photos/{id}")))
            .await
    }

    /// Upload a photo as `multipart/form-data`. The file is validated first,
    /// an invalid file never reaches the network.
    pub async fn upload(&self, session: &Session, request: &UploadRequest) -> Result<Photo, Error> {
        request.file.validate()?;
        let form = upload_form(request)?;

        tracing::info!(
            "Uploading {} ({} bytes)",
            request.file.file_name,
            request.file.size()
        );
        let req = self
            .api
            .request(Method::POST, "/photos/upload")
            .multipart(form);
        self.api.send_json(session, req).await
    }

    pub async fn remove(&self, session: &Session, id: &ResourceId) -> Result<(), Error> {
        let req = self.api.request(Method::DELETE, &format!("/photos/{id}"));
        self.api.send(session, req).await?;
        tracing::info!("Deleted photo {}", id);
        Ok(())
    }

    /// Attach coordinates to a photo that was uploaded without them.
    pub async fn set_location(
        &self,
        session: &Session,
        id: &ResourceId,
        latitude: f64,
        longitude: f64,
    ) -> Result<Photo, Error> {
        let req = self
            .api
            .request(Method::PUT, &format!("/photos/{id}/location"))
            .json(&Coordinates::new(latitude, longitude));
        self.api.send_json(session, req).await
    }
}

fn upload_form(request: &UploadRequest) -> Result<Form, Error> {
    let file = &request.file;
    let part = Part::bytes(file.data.clone())
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)
        .map_err(|_| ValidationError::UnsupportedType {
            mime: file.mime_type.clone(),
        })?;

    let mut form = Form::new().part("file", part);

    if let Some(description) = request.description.as_deref().filter(|d| !d.is_empty()) {
        form = form.text("description", description.to_string());
    }

    if let Some(coords) = request.coordinates.filter(Coordinates::is_usable) {
        form = form
            .text("latitude", coords.latitude.to_string())
            .text("longitude", coords.longitude.to_string());
    }

    Ok(form)
}
