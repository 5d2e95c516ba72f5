use crate::library::{LoadState, PhotoAction};
use crate::scope::ViewScope;
use crate::{Album, ApiClient, Error, Photo, ResourceId, Session};

fn alert_for<T>(alert: &mut Option<String>, result: &Result<T, Error>) {
    match result {
        Ok(_) => *alert = None,
        Err(err) if !err.is_cancelled() => *alert = Some(err.user_message()),
        Err(_) => {}
    }
}

/// Every album of the user, without their photos.
#[derive(Debug, Default)]
pub struct AlbumListView {
    albums: Vec<Album>,
    state: LoadState,
    alert: Option<String>,
    scope: ViewScope,
}

impl AlbumListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: ViewScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub async fn load(&mut self, api: &ApiClient, session: &Session) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.state, LoadState::Loading);
        match self.scope.guard(api.albums().list_all(session)).await {
            Ok(albums) => {
                self.albums = albums;
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) if err.is_cancelled() => {
                self.state = previous;
                Err(err)
            }
            Err(err) => {
                tracing::error!("Failed to load albums: {:?}", err);
                self.state = LoadState::failed(&err);
                Err(err)
            }
        }
    }

    /// Create an album and append the server's copy to the list.
    pub async fn create(
        &mut self,
        api: &ApiClient,
        session: &Session,
        name: &str,
        description: &str,
    ) -> Result<Album, Error> {
        let description = Some(description.trim()).filter(|d| !d.is_empty());
        let result = self
            .scope
            .guard(api.albums().create(session, name, description))
            .await;
        if let Ok(album) = &result {
            self.albums.push(album.clone());
        }
        alert_for(&mut self.alert, &result);
        result
    }

    /// Delete an album. Only the album goes away, its photos stay.
    pub async fn delete(
        &mut self,
        api: &ApiClient,
        session: &Session,
        id: &ResourceId,
    ) -> Result<(), Error> {
        let result = self.scope.guard(api.albums().remove(session, id)).await;
        if result.is_ok() {
            self.albums.retain(|a| &a.id != id);
        }
        alert_for(&mut self.alert, &result);
        result
    }
}

/// Pending edits of the album's name and description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumEdit {
    pub name: String,
    pub description: String,
}

/// One album with its photos.
#[derive(Debug, Default)]
pub struct AlbumDetailView {
    album: Option<Album>,
    state: LoadState,
    edit: Option<AlbumEdit>,
    alert: Option<String>,
    scope: ViewScope,
}

impl AlbumDetailView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scope(scope: ViewScope) -> Self {
        Self {
            scope,
            ..Self::default()
        }
    }

    pub fn album(&self) -> Option<&Album> {
        self.album.as_ref()
    }

    pub fn photos(&self) -> &[Photo] {
        self.album.as_ref().map(Album::photos).unwrap_or_default()
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn scope(&self) -> &ViewScope {
        &self.scope
    }

    pub fn click(&self, photo: &Photo) -> PhotoAction {
        PhotoAction::for_photo(photo)
    }

    pub async fn load(
        &mut self,
        api: &ApiClient,
        session: &Session,
        id: &ResourceId,
    ) -> Result<(), Error> {
        let previous = std::mem::replace(&mut self.state, LoadState::Loading);
        match self.scope.guard(api.albums().get(session, id)).await {
            Ok(album) => {
                self.album = Some(album);
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(err) if err.is_cancelled() => {
                self.state = previous;
                Err(err)
            }
            Err(err) => {
                tracing::error!("Failed to load album {}: {:?}", id, err);
                self.state = LoadState::failed(&err);
                Err(err)
            }
        }
    }

    pub fn editing(&self) -> Option<&AlbumEdit> {
        self.edit.as_ref()
    }

    /// Enter edit mode, seeded from the loaded album.
    pub fn begin_edit(&mut self) -> Option<&mut AlbumEdit> {
        let album = self.album.as_ref()?;
        self.edit = Some(AlbumEdit {
            name: album.name.clone(),
            description: album.description.clone().unwrap_or_default(),
        });
        self.edit.as_mut()
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Send the pending edit. Leaves edit mode only when the server accepted
    /// it.
    pub async fn save_edit(&mut self, api: &ApiClient, session: &Session) -> Result<(), Error> {
        let (Some(album), Some(edit)) = (self.album.as_ref(), self.edit.as_ref()) else {
            return Ok(());
        };

        let id = album.id.clone();
        let name = edit.name.trim().to_string();
        let description = edit.description.trim().to_string();
        let result = self
            .scope
            .guard(api.albums().update(session, &id, &name, Some(&description), None))
            .await;

        if let Ok(updated) = &result {
            self.adopt(updated.clone());
            self.edit = None;
        }
        alert_for(&mut self.alert, &result);
        result.map(|_| ())
    }

    /// Remove a photo from this album. The photo itself isn't deleted; the
    /// local list and count shrink together once the server confirms.
    pub async fn unlink_photo(
        &mut self,
        api: &ApiClient,
        session: &Session,
        photo_id: &ResourceId,
    ) -> Result<(), Error> {
        let Some(album_id) = self.album.as_ref().map(|a| a.id.clone()) else {
            return Ok(());
        };

        let result = self
            .scope
            .guard(api.albums().unlink_photo(session, &album_id, photo_id))
            .await;

        if result.is_ok() {
            if let Some(album) = self.album.as_mut() {
                album.remove_photo(photo_id);
            }
        }
        alert_for(&mut self.alert, &result);
        result.map(|_| ())
    }

    /// Make `photo_id` the cover and refetch so the cover URL is current.
    /// The result reflects the update alone; a failed refetch only shows in
    /// [`state`](Self::state).
    pub async fn set_cover(
        &mut self,
        api: &ApiClient,
        session: &Session,
        photo_id: &ResourceId,
    ) -> Result<(), Error> {
        let Some(album) = self.album.as_ref() else {
            return Ok(());
        };

        let id = album.id.clone();
        let name = album.name.clone();
        let description = album.description.clone();
        let result = self
            .scope
            .guard(api.albums().update(
                session,
                &id,
                &name,
                description.as_deref(),
                Some(photo_id),
            ))
            .await;
        alert_for(&mut self.alert, &result);

        let updated = result?;
        self.adopt(updated);
        if let Err(err) = self.load(api, session, &id).await {
            tracing::warn!("Cover of album {} saved, refresh failed: {}", id, err);
        }
        Ok(())
    }

    /// Take the metadata of an update response. Update responses may omit the
    /// photo list, in which case the loaded one is kept.
    fn adopt(&mut self, mut updated: Album) {
        if updated.photos.is_none() {
            if let Some(current) = self.album.take() {
                updated.photos = current.photos;
                updated.photo_count = current.photo_count;
            }
        }
        self.album = Some(updated);
    }
}
