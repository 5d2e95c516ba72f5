mod commands;
mod credentials;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use geophoto_core::{PhotoFilter, ViewMode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Context;

#[derive(Parser)]
#[command(name = "geophoto")]
#[command(about = "Manage geotagged photos and albums on a GeoPhoto backend", long_about = None)]
struct Cli {
    /// Backend origin, without the /api suffix
    #[arg(
        long,
        global = true,
        env = "GEOPHOTO_BACKEND_URL",
        default_value = geophoto_core::config::DEFAULT_BACKEND_URL
    )]
    backend_url: String,

    /// File holding the bearer token
    #[arg(long, global = true, env = "GEOPHOTO_CREDENTIALS")]
    credentials_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a bearer token for later commands
    Login { token: String },

    /// Forget the stored token
    Logout,

    /// Browse, upload and edit photos
    #[command(subcommand)]
    Photos(PhotoCommands),

    /// Browse and edit albums
    #[command(subcommand)]
    Albums(AlbumCommands),
}

#[derive(Subcommand)]
enum PhotoCommands {
    /// List the photo library
    List {
        /// all, with-gps or without-gps
        #[arg(short, long, default_value = "all")]
        filter: PhotoFilter,

        /// grid or list
        #[arg(short, long, default_value = "grid")]
        view: ViewMode,
    },

    /// Show one photo
    Show { id: String },

    /// Upload image files, or every image under the given directories
    Upload {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        #[arg(short, long)]
        description: Option<String>,

        /// Latitude to attach to every uploaded photo
        #[arg(long, requires = "lng", allow_hyphen_values = true)]
        lat: Option<f64>,

        /// Longitude to attach to every uploaded photo
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lng: Option<f64>,
    },

    /// Delete a photo
    Delete { id: String },

    /// Set the location of a photo
    Locate {
        id: String,
        #[arg(allow_hyphen_values = true)]
        latitude: f64,
        #[arg(allow_hyphen_values = true)]
        longitude: f64,
    },
}

#[derive(Subcommand)]
enum AlbumCommands {
    /// List albums
    List,

    /// Show an album and its photos
    Show { id: String },

    /// Create an album
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },

    /// Rename an album or change its description
    Update {
        id: String,
        name: String,
        /// New description, the current one is kept when omitted
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Use a photo of the album as its cover
    Cover { id: String, photo_id: String },

    /// Delete an album. Its photos stay in the library.
    Delete { id: String },

    /// Add a photo of the library to an album
    Add { id: String, photo_id: String },

    /// Remove a photo from an album without deleting it
    Unlink { id: String, photo_id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "geophoto_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let ctx = Context::new(&cli.backend_url, cli.credentials_file)?;

    let result = run(&ctx, cli.command).await;
    if let Err(err) = &result {
        if commands::is_auth_error(err) {
            eprintln!("Your session has expired. Run `geophoto login <TOKEN>` to log in again.");
        }
    }
    result
}

async fn run(ctx: &Context, command: Commands) -> Result<()> {
    match command {
        Commands::Login { token } => commands::auth::login(ctx, token),
        Commands::Logout => commands::auth::logout(ctx),
        Commands::Photos(command) => match command {
            PhotoCommands::List { filter, view } => {
                commands::photos::list(ctx, filter, view).await
            }
            PhotoCommands::Show { id } => commands::photos::show(ctx, id.parse()?).await,
            PhotoCommands::Upload {
                paths,
                description,
                lat,
                lng,
            } => {
                let location = lat.zip(lng);
                commands::photos::upload(ctx, paths, description, location).await
            }
            PhotoCommands::Delete { id } => commands::photos::delete(ctx, id.parse()?).await,
            PhotoCommands::Locate {
                id,
                latitude,
                longitude,
            } => commands::photos::locate(ctx, id.parse()?, latitude, longitude).await,
        },
        Commands::Albums(command) => match command {
            AlbumCommands::List => commands::albums::list(ctx).await,
            AlbumCommands::Show { id } => commands::albums::show(ctx, id.parse()?).await,
            AlbumCommands::Create { name, description } => {
                commands::albums::create(ctx, name, description).await
            }
            AlbumCommands::Update {
                id,
                name,
                description,
            } => commands::albums::update(ctx, id.parse()?, name, description).await,
            AlbumCommands::Cover { id, photo_id } => {
                commands::albums::cover(ctx, id.parse()?, photo_id.parse()?).await
            }
            AlbumCommands::Delete { id } => commands::albums::delete(ctx, id.parse()?).await,
            AlbumCommands::Add { id, photo_id } => {
                commands::albums::add(ctx, id.parse()?, photo_id.parse()?).await
            }
            AlbumCommands::Unlink { id, photo_id } => {
                commands::albums::unlink(ctx, id.parse()?, photo_id.parse()?).await
            }
        },
    }
}
