use anyhow::{Context as _, Result};
use geophoto_core::{Album, AlbumDetailView, AlbumListView, PhotoAction, ResourceId};

use super::Context;

pub async fn list(ctx: &Context) -> Result<()> {
    let mut view = AlbumListView::new();
    view.load(&ctx.api, &ctx.session)
        .await
        .context("Failed to load albums")?;

    if view.albums().is_empty() {
        println!("No albums yet");
        return Ok(());
    }

    for album in view.albums() {
        println!("[{}] {} ({} photos)", album.id, album.name, album.photo_count);
        if let Some(description) = album.description.as_deref().filter(|d| !d.is_empty()) {
            println!("    {description}");
        }
        if let Some(created) = &album.created_at {
            println!("    Created: {}", created.display());
        }
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: ResourceId) -> Result<()> {
    let view = load_detail(ctx, &id).await?;
    let Some(album) = view.album() else {
        anyhow::bail!("Album not found: {id}");
    };

    print_header(ctx, album);
    println!();

    if view.photos().is_empty() {
        println!("This album has no photos");
        return Ok(());
    }
    for photo in view.photos() {
        match view.click(photo) {
            PhotoAction::ShowOnMap(route) => {
                println!("[{}] {}  map: {}", photo.id, photo.file_name, route.path())
            }
            PhotoAction::Preview(_) => println!(
                "[{}] {}  {}",
                photo.id,
                photo.file_name,
                ctx.api.config().photo_url(&photo.url)
            ),
        }
    }
    Ok(())
}

pub async fn create(ctx: &Context, name: String, description: String) -> Result<()> {
    let mut view = AlbumListView::new();
    let album = view
        .create(&ctx.api, &ctx.session, &name, &description)
        .await
        .context("Failed to create album")?;

    println!("✓ Album created: {} ({})", album.name, album.id);
    Ok(())
}

pub async fn update(
    ctx: &Context,
    id: ResourceId,
    name: String,
    description: Option<String>,
) -> Result<()> {
    let mut view = load_detail(ctx, &id).await?;
    if let Some(edit) = view.begin_edit() {
        edit.name = name;
        if let Some(description) = description {
            edit.description = description;
        }
    }
    view.save_edit(&ctx.api, &ctx.session)
        .await
        .with_context(|| format!("Failed to update album {id}"))?;

    if let Some(album) = view.album() {
        println!("✓ Album updated: {} ({})", album.name, album.id);
    }
    Ok(())
}

pub async fn cover(ctx: &Context, id: ResourceId, photo_id: ResourceId) -> Result<()> {
    let mut view = load_detail(ctx, &id).await?;
    if !view.photos().iter().any(|p| p.id == photo_id) {
        anyhow::bail!("Photo {photo_id} is not in album {id}");
    }

    view.set_cover(&ctx.api, &ctx.session, &photo_id)
        .await
        .with_context(|| format!("Failed to set the cover of album {id}"))?;

    println!("✓ Cover set to photo {photo_id}");
    if let Some(url) = view.album().and_then(|a| a.cover_photo_url.as_deref()) {
        println!("Cover: {}", ctx.api.config().photo_url(url));
    }
    Ok(())
}

pub async fn delete(ctx: &Context, id: ResourceId) -> Result<()> {
    let mut view = AlbumListView::new();
    view.delete(&ctx.api, &ctx.session, &id)
        .await
        .with_context(|| format!("Failed to delete album {id}"))?;

    println!("✓ Album deleted: {id}");
    println!("  Its photos are still in the library.");
    Ok(())
}

pub async fn add(ctx: &Context, id: ResourceId, photo_id: ResourceId) -> Result<()> {
    let album = ctx
        .api
        .albums()
        .add_photo(&ctx.session, &id, &photo_id)
        .await
        .with_context(|| format!("Failed to add photo {photo_id} to album {id}"))?;

    let name = album.map_or_else(|| id.to_string(), |a| a.name);
    println!("✓ Photo {photo_id} added to album {name}");
    Ok(())
}

pub async fn unlink(ctx: &Context, id: ResourceId, photo_id: ResourceId) -> Result<()> {
    let mut view = load_detail(ctx, &id).await?;
    view.unlink_photo(&ctx.api, &ctx.session, &photo_id)
        .await
        .with_context(|| format!("Failed to remove photo {photo_id} from album {id}"))?;

    let remaining = view.album().map_or(0, |a| a.photo_count);
    println!("✓ Photo {photo_id} removed from album {id} ({remaining} photos left)");
    Ok(())
}

async fn load_detail(ctx: &Context, id: &ResourceId) -> Result<AlbumDetailView> {
    let mut view = AlbumDetailView::new();
    view.load(&ctx.api, &ctx.session, id)
        .await
        .with_context(|| format!("Failed to load album {id}"))?;
    Ok(view)
}

fn print_header(ctx: &Context, album: &Album) {
    println!("Album: {}", album.name);
    println!("ID: {}", album.id);
    if let Some(description) = album.description.as_deref().filter(|d| !d.is_empty()) {
        println!("Description: {description}");
    }
    println!("Photos: {}", album.photo_count);
    if let Some(url) = album.cover_photo_url.as_deref() {
        println!("Cover: {}", ctx.api.config().photo_url(url));
    }
    if let Some(created) = &album.created_at {
        println!("Created: {}", created.display());
    }
}
