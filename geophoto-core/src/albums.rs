use reqwest::Method;
use serde::Serialize;

use crate::{Album, ApiClient, Error, ResourceId, Session, ValidationError};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateAlbumBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateAlbumBody<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    cover_photo_id: Option<&'a ResourceId>,
}

/// Trimmed album name, rejected when nothing is left.
pub fn validate_album_name(name: &str) -> Result<&str, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::EmptyAlbumName)
    } else {
        Ok(name)
    }
}

/// Album endpoints under `/api/albums`.
#[derive(Debug, Clone, Copy)]
pub struct AlbumClient<'a> {
    api: &'a ApiClient,
}

impl<'a> AlbumClient<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// All albums, without their photos.
    pub async fn list_all(&self, session: &Session) -> Result<Vec<Album>, Error> {
        self.api
            .send_json(session, self.api.request(Method::GET, "/albums"))
            .await
    }

    /// A single album including its photos.
    pub async fn get(&self, session: &Session, id: &ResourceId) -> Result<Album, Error> {
        self.api
            .send_json(session, self.api.request(Method::GET, &format!("/albums/{id}")))
            .await
    }

    pub async fn create(
        &self,
        session: &Session,
        name: &str,
        description: Option<&str>,
    ) -> Result<Album, Error> {
        let name = validate_album_name(name)?;
        let req = self
            .api
            .request(Method::POST, "/albums")
            .json(&CreateAlbumBody { name, description });
        let album: Album = self.api.send_json(session, req).await?;
        tracing::info!("Created album {} ({})", album.name, album.id);
        Ok(album)
    }

    /// Rename/describe an album and optionally pick its cover. The cover
    /// photo isn't checked for membership here, the backend owns that rule.
    pub async fn update(
        &self,
        session: &Session,
        id: &ResourceId,
        name: &str,
        description: Option<&str>,
        cover_photo_id: Option<&ResourceId>,
    ) -> Result<Album, Error> {
        let name = validate_album_name(name)?;
        let req = self
            .api
            .request(Method::PUT, &format!("/albums/{id}"))
            .json(&UpdateAlbumBody {
                name,
                description,
                cover_photo_id,
            });
        self.api.send_json(session, req).await
    }

    /// Delete the album. Its photos stay in the library.
    pub async fn remove(&self, session: &Session, id: &ResourceId) -> Result<(), Error> {
        let req = self.api.request(Method::DELETE, &format!("/albums/{id}"));
        self.api.send(session, req).await?;
        tracing::info!("Deleted album {}", id);
        Ok(())
    }

    /// Link a library photo into the album. Returns the updated album when
    /// the backend sends one back.
    pub async fn add_photo(
        &self,
        session: &Session,
        album_id: &ResourceId,
        photo_id: &ResourceId,
    ) -> Result<Option<Album>, Error> {
        let req = self.api.request(
            Method::POST,
            &format!("/albums/{album_id}/photos/{photo_id}"),
        );
        let album = self.api.send_optional_json(session, req).await?;
        tracing::info!("Added photo {} to album {}", photo_id, album_id);
        Ok(album)
    }

    /// Remove a photo from the album without deleting the photo. Returns the
    /// updated album when the backend sends one back.
    pub async fn unlink_photo(
        &self,
        session: &Session,
        album_id: &ResourceId,
        photo_id: &ResourceId,
    ) -> Result<Option<Album>, Error> {
        let req = self.api.request(
            Method::DELETE,
            &format!("/albums/{album_id}/photos/{photo_id}"),
        );
        self.api.send_optional_json(session, req).await
    }
}
