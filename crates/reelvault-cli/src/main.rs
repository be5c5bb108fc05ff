//! Reelvault CLI: manage owners and videos in a local storage root.
//!
//! Set REELVAULT_STORAGE_ROOT (and optionally REELVAULT_MAX_FILE_SIZE_BYTES,
//! REELVAULT_ALLOWED_EXTENSIONS). Metadata is kept in a JSON catalog file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use reelvault_cli::{
    ensure_outside_root, init_tracing, read_upload, report_error, truncate_chars, JsonCatalog,
};
use reelvault_core::{
    ListQuery, NewVideo, Page, StorageConfig, VideoRecord, VideoResponse, VideoUpdate,
};
use reelvault_media::{Delivery, MediaService};
use reelvault_storage::LocalStorage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "reelvault", about = "Reelvault video storage CLI")]
struct Cli {
    /// Path to the JSON metadata catalog
    #[arg(long, global = true, default_value = "reelvault-catalog.json")]
    catalog: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Owner operations
    Owner {
        #[command(subcommand)]
        sub: OwnerCommands,
    },
    /// Upload a video file
    Upload {
        /// Path to the file to upload
        file: PathBuf,
        /// Owner UUID
        #[arg(long)]
        owner: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Make the video publicly visible
        #[arg(long)]
        public: bool,
    },
    /// Replace the stored file of a video
    Replace {
        /// Video UUID
        id: Uuid,
        /// Path to the new file
        file: PathBuf,
    },
    /// Update title, description or visibility
    Update {
        /// Video UUID
        id: Uuid,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// true or false
        #[arg(long)]
        public: Option<bool>,
    },
    /// Show a single video record
    Show {
        /// Video UUID
        id: Uuid,
    },
    /// List videos with optional filters and pagination
    List {
        #[arg(long)]
        owner: Option<Uuid>,
        /// true or false
        #[arg(long)]
        public: Option<bool>,
        #[arg(long, default_value = "1")]
        page: u32,
        /// Page size (at most 10)
        #[arg(long, default_value = "10")]
        size: u32,
        /// Output format: json or table
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Write a video's content to a local file
    Fetch {
        /// Video UUID
        id: Uuid,
        /// Use the download name and octet-stream content type
        #[arg(long)]
        download: bool,
        /// Output directory
        #[arg(long, default_value = ".")]
        output: PathBuf,
    },
    /// Remove a video and its stored file
    Remove {
        /// Video UUID
        id: Uuid,
    },
}

#[derive(Subcommand)]
enum OwnerCommands {
    /// Register a new owner
    Add {
        username: String,
    },
    /// List registered owners
    List,
}

struct App {
    storage: Arc<LocalStorage>,
    catalog: Arc<JsonCatalog>,
    service: MediaService,
}

impl App {
    fn open(catalog_path: &Path) -> anyhow::Result<Self> {
        let config = StorageConfig::from_env().context(
            "Failed to load storage configuration. Set REELVAULT_STORAGE_ROOT",
        )?;

        let storage = Arc::new(
            LocalStorage::new(Arc::new(config)).context("Failed to prepare storage root")?,
        );
        ensure_outside_root(catalog_path, storage.root())?;

        let catalog = Arc::new(
            JsonCatalog::open(catalog_path)
                .with_context(|| format!("Failed to open catalog {}", catalog_path.display()))?,
        );

        let service = MediaService::new(storage.clone(), catalog.clone(), catalog.clone());

        Ok(Self {
            storage,
            catalog,
            service,
        })
    }
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

fn print_video_table(page: &Page<VideoRecord>) {
    println!(
        "{:<36}  {:<36}  {:<6}  {:<30}",
        "ID", "OWNER", "PUBLIC", "TITLE"
    );
    for video in &page.items {
        println!(
            "{:<36}  {:<36}  {:<6}  {:<30}",
            video.id,
            video.owner_id,
            video.is_public,
            truncate_chars(video.display_title().unwrap_or("-"), 30)
        );
    }
    println!(
        "page {}/{} ({} videos)",
        page.page,
        page.total_pages().max(1),
        page.total
    );
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    run(cli).inspect_err(|err| {
        report_error(err);
    })
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let app = App::open(&cli.catalog)?;

    match cli.command {
        Commands::Owner { sub } => match sub {
            OwnerCommands::Add { username } => {
                let owner = app.catalog.add_owner(&username)?;
                print_json(&owner)?;
            }
            OwnerCommands::List => {
                print_json(&app.catalog.owners()?)?;
            }
        },
        Commands::Upload {
            file,
            owner,
            title,
            description,
            public,
        } => {
            let (content, original_name) = read_upload(app.storage.as_ref(), &file)?;
            let video = app.service.upload(
                NewVideo {
                    owner_id: Some(owner),
                    title,
                    description,
                    is_public: public,
                },
                &content,
                original_name.as_deref(),
            )?;
            print_json(&video)?;
        }
        Commands::Replace { id, file } => {
            let (content, original_name) = read_upload(app.storage.as_ref(), &file)?;
            let video = app
                .service
                .replace_file(id, &content, original_name.as_deref())?;
            print_json(&video)?;
        }
        Commands::Update {
            id,
            title,
            description,
            public,
        } => {
            let video = app.service.update_metadata(
                id,
                VideoUpdate {
                    title,
                    description,
                    is_public: public,
                },
            )?;
            print_json(&video)?;
        }
        Commands::Show { id } => {
            print_json(&app.service.get(id)?)?;
        }
        Commands::List {
            owner,
            public,
            page,
            size,
            format,
        } => {
            let page = app.service.list(ListQuery {
                owner_id: owner,
                is_public: public,
                page,
                size,
            })?;
            match format.as_str() {
                "json" => print_json(&page.map(VideoResponse::from))?,
                _ => print_video_table(&page),
            }
        }
        Commands::Fetch {
            id,
            download,
            output,
        } => {
            let delivery = if download {
                Delivery::Download
            } else {
                Delivery::Inline
            };
            let delivered = app.service.deliver(id, delivery)?;

            let target = output.join(&delivered.filename);
            std::fs::write(&target, &delivered.bytes)
                .with_context(|| format!("Write {}", target.display()))?;

            print_json(&serde_json::json!({
                "path": target,
                "content_type": delivered.content_type,
                "content_disposition": delivered.content_disposition,
                "content_length": delivered.content_length,
            }))?;
        }
        Commands::Remove { id } => {
            app.service.remove(id)?;
            print_json(
                &serde_json::json!({ "success": true, "message": format!("Video {} removed", id) }),
            )?;
        }
    }

    Ok(())
}
