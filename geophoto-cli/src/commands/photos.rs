use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use geophoto_core::{
    Coordinates, FixedGeolocator, LibraryView, Photo, PhotoAction, PhotoFile, PhotoFilter,
    ResourceId, UploadFlow, ViewMode,
};
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use super::Context;

const GRID_COLUMNS: usize = 3;
const GRID_CELL_WIDTH: usize = 30;

pub async fn list(ctx: &Context, filter: PhotoFilter, view: ViewMode) -> Result<()> {
    let mut library = LibraryView::new();
    library
        .load(&ctx.api, &ctx.session)
        .await
        .context("Failed to load photos")?;
    library.set_filter(filter);
    library.set_view_mode(view);

    let counts = library.counts();
    println!(
        "All ({}) | With GPS ({}) | Without GPS ({})\n",
        counts.all, counts.with_gps, counts.without_gps
    );

    let visible = library.visible();
    if visible.is_empty() {
        match library.filter() {
            PhotoFilter::All => println!("No photos yet"),
            _ => println!("No matching photos"),
        }
        return Ok(());
    }

    match library.view_mode() {
        ViewMode::Grid => print_grid(&visible),
        ViewMode::List => {
            for photo in visible {
                print_row(ctx, photo);
            }
        }
    }
    Ok(())
}

pub async fn show(ctx: &Context, id: ResourceId) -> Result<()> {
    let photo = ctx
        .api
        .photos()
        .get(&ctx.session, &id)
        .await
        .with_context(|| format!("Failed to load photo {id}"))?;

    println!("Photo: {}", photo.file_name);
    println!("ID: {}", photo.id);
    println!("URL: {}", ctx.api.config().photo_url(&photo.url));
    println!("Uploaded: {}", uploaded_at(&photo));
    if let Some(description) = photo.description.as_deref().filter(|d| !d.is_empty()) {
        println!("Description: {description}");
    }

    match PhotoAction::for_photo(&photo) {
        PhotoAction::ShowOnMap(route) => {
            println!("Location: {}", location(&photo));
            println!("Map: {}", route.path());
        }
        PhotoAction::Preview(_) => {
            println!("Location: none");
            println!(
                "Add one with: geophoto photos locate {} <LAT> <LNG>",
                photo.id
            );
        }
    }
    Ok(())
}

pub async fn upload(
    ctx: &Context,
    paths: Vec<PathBuf>,
    description: Option<String>,
    location: Option<(f64, f64)>,
) -> Result<()> {
    let files = collect_photo_paths(&paths)?;
    if files.is_empty() {
        anyhow::bail!("No images found in the provided paths");
    }

    let locator =
        location.map(|(latitude, longitude)| FixedGeolocator::at(Coordinates::new(latitude, longitude)));

    println!("Uploading {} photos to {}\n", files.len(), ctx.api.config().origin());

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.green/blue} {pos}/{len} {msg}")?
            .progress_chars("█▓▒░ "),
    );

    let mut flow = UploadFlow::new();
    let mut uploaded = 0;
    let mut with_gps = 0;
    let mut failed = 0;

    for path in &files {
        pb.set_message(format!("Uploading: {}", file_label(path)));

        match upload_one(ctx, &mut flow, path, description.as_deref(), locator.as_ref()).await {
            Ok(photo) => {
                uploaded += 1;
                if photo.has_location() {
                    with_gps += 1;
                }
            }
            Err(err) if super::is_auth_error(&err) => {
                pb.abandon_with_message("Stopped");
                return Err(err);
            }
            Err(err) => {
                failed += 1;
                pb.println(format!("✗ {}: {:#}", path.display(), err));
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Done");
    println!();
    println!(
        "✓ Uploaded {uploaded} of {} photos ({with_gps} with GPS location)",
        files.len()
    );

    if failed > 0 {
        anyhow::bail!("{failed} uploads failed");
    }
    Ok(())
}

async fn upload_one(
    ctx: &Context,
    flow: &mut UploadFlow,
    path: &Path,
    description: Option<&str>,
    locator: Option<&FixedGeolocator>,
) -> Result<Photo> {
    let file = PhotoFile::from_path(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    flow.select_file(file)?;
    flow.set_description(description.unwrap_or_default());
    if let Some(locator) = locator {
        flow.capture_location(locator).await?;
    }

    let photo = flow.submit(&ctx.api, &ctx.session).await?;
    if let Some(message) = flow.message() {
        tracing::info!("{}: {}", path.display(), message.text);
    }
    Ok(photo)
}

pub async fn delete(ctx: &Context, id: ResourceId) -> Result<()> {
    ctx.api
        .photos()
        .remove(&ctx.session, &id)
        .await
        .with_context(|| format!("Failed to delete photo {id}"))?;
    println!("✓ Photo deleted: {id}");
    Ok(())
}

pub async fn locate(ctx: &Context, id: ResourceId, latitude: f64, longitude: f64) -> Result<()> {
    let photo = ctx
        .api
        .photos()
        .set_location(&ctx.session, &id, latitude, longitude)
        .await
        .with_context(|| format!("Failed to set the location of photo {id}"))?;

    println!("✓ Location saved for {}: {}", photo.file_name, location(&photo));
    Ok(())
}

/// Image files among `paths`, with directories walked recursively. Sorted so
/// uploads happen in a stable order.
pub fn collect_photo_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();

    for path in paths {
        if !path.exists() {
            anyhow::bail!("Path does not exist: {}", path.display());
        }

        if path.is_file() {
            // Explicitly named files go through so validation can reject them
            // with a proper message.
            found.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_image_file(entry_path) {
                    found.push(entry_path.to_path_buf());
                }
            }
        }
    }

    found.sort();
    found.dedup();
    Ok(found)
}

fn is_image_file(path: &Path) -> bool {
    mime_guess::from_path(path)
        .first()
        .is_some_and(|mime| mime.type_() == mime_guess::mime::IMAGE)
}

fn print_grid(photos: &[&Photo]) {
    for row in photos.chunks(GRID_COLUMNS) {
        let line: Vec<String> = row
            .iter()
            .map(|photo| {
                let marker = if photo.has_location() { "*" } else { " " };
                let label = format!("{marker} [{}] {}", photo.id, photo.file_name);
                format!("{:<width$}", truncate(&label, GRID_CELL_WIDTH - 2), width = GRID_CELL_WIDTH)
            })
            .collect();
        println!("{}", line.join("").trim_end());
    }
    println!("\n* has GPS location");
}

fn print_row(ctx: &Context, photo: &Photo) {
    println!("[{}] {}", photo.id, photo.file_name);
    println!("    Uploaded: {}", uploaded_at(photo));
    println!("    Location: {}", location(photo));
    if let Some(description) = photo.description.as_deref().filter(|d| !d.is_empty()) {
        println!("    Description: {description}");
    }
    println!("    URL: {}", ctx.api.config().photo_url(&photo.url));
}

fn uploaded_at(photo: &Photo) -> String {
    photo
        .uploaded_at
        .as_ref()
        .map(|t| t.display())
        .unwrap_or_else(|| "Unknown".to_string())
}

fn location(photo: &Photo) -> String {
    match photo.coordinates() {
        Some(c) => format!("{:.6}, {:.6}", c.latitude, c.longitude),
        None => "No GPS".to_string(),
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
