use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use ite_app::{AppController, Collaborators, PageEvent, SurfaceHandle};
use ite_config::Config;
use ite_io::{StaticCapturer, SurfaceCapturer, SystemClipboard};
use ite_ocr::OcrSpaceClient;
use ite_presenter::{CopyState, Notification, NotificationKind};
use ite_types::{DirectReply, ImagePayload, Point};
use tokio::signal;
use tracing_subscriber::EnvFilter;

const COPY_WAIT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(name = "ite", version, about = "Extract text from a screen region or an image")]
struct Args {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,

    /// Print the outcome as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Copy extracted text to the clipboard
    #[arg(long, global = true)]
    copy: bool,

    #[arg(long, global = true)]
    ocr_url: Option<String>,

    #[arg(long, global = true)]
    api_key: Option<String>,

    #[arg(long, global = true)]
    language: Option<String>,

    /// Give up on a pipeline after this many milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the image currently on the clipboard
    Clipboard,
    /// Read an image file
    File { path: PathBuf },
    /// Select a region of the screen and read it
    Region {
        #[arg(long)]
        x: f64,
        #[arg(long)]
        y: f64,
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        /// Device pixel ratio of the screen
        #[arg(long)]
        ratio: Option<f64>,
        /// Use this image as the screen instead of capturing one
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.json_logs);

    let mut config = Config::new();
    apply_overrides(&mut config, &args);

    tokio::select! {
        result = run(config, args) => result,
        _ = signal::ctrl_c() => {
            tracing::info!("Shutdown requested");
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // stdout carries the result
    if json {
        builder.json().init();
    } else {
        builder.with_ansi(atty::is(atty::Stream::Stderr)).init();
    }
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(url) = &args.ocr_url {
        config.ocr.api_url = url.clone();
    }
    if let Some(key) = &args.api_key {
        config.ocr.api_key = key.clone();
    }
    if let Some(language) = &args.language {
        config.ocr.language = language.clone();
    }
    if let Some(timeout_ms) = args.timeout_ms {
        config.pipeline.timeout_ms = Some(timeout_ms);
    }
    if let Command::Region {
        ratio: Some(ratio), ..
    } = &args.command
    {
        config.selection.device_pixel_ratio = *ratio;
    }
}

async fn run(config: Config, args: Args) -> anyhow::Result<()> {
    let capturer: Arc<dyn SurfaceCapturer> = match &args.command {
        Command::Region {
            screenshot: Some(path),
            ..
        } => Arc::new(StaticCapturer::new(read_image(path).await?)),
        _ => ite_io::default_capturer(),
    };
    let extractor = Arc::new(OcrSpaceClient::new(&config.ocr).context("Failed to build OCR client")?);
    let clipboard = Arc::new(SystemClipboard);

    let controller = AppController::new(
        config,
        Collaborators {
            capturer,
            extractor,
            clipboard_source: clipboard.clone(),
            clipboard_sink: clipboard,
        },
    );
    let mut tasks = controller.spawn_tasks();

    let result = match &args.command {
        Command::Clipboard => run_clipboard(&controller, &args).await,
        Command::File { path } => run_file(&controller, path, &args).await,
        Command::Region {
            x, y, width, height, ..
        } => run_region(&controller, (*x, *y, *width, *height), &args).await,
    };

    controller.shutdown();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::error!("Task exited with error: {:#}", e),
            Err(e) => tracing::error!("Task panicked: {}", e),
        }
    }

    result
}

async fn run_clipboard(controller: &AppController, args: &Args) -> anyhow::Result<()> {
    let panel = controller.panel();

    let Some(reply) = panel.extract_clipboard().await? else {
        bail!("No image found in clipboard.");
    };

    if args.json {
        println!("{}", serde_json::to_string(&reply)?);
    }

    match reply {
        DirectReply::Extracted { text: Some(text) } => {
            if !args.json {
                println!("{}", text);
            }
            if args.copy && !panel.copy_text().await {
                tracing::warn!("Failed to copy text");
            }
            Ok(())
        }
        DirectReply::Extracted { text: None } => {
            if !args.json {
                eprintln!("No text found.");
            }
            Ok(())
        }
        DirectReply::Failed { error } => bail!("Error: {}", error),
    }
}

async fn run_file(controller: &AppController, path: &Path, args: &Args) -> anyhow::Result<()> {
    let image = read_image(path).await?;
    let surface = open_surface(controller, &format!("file://{}", path.display())).await?;

    surface.event(PageEvent::ExtractImage(image)).await;
    finish(&surface, args).await
}

async fn run_region(
    controller: &AppController,
    (x, y, width, height): (f64, f64, f64, f64),
    args: &Args,
) -> anyhow::Result<()> {
    let surface = open_surface(controller, "screen://primary").await?;
    controller.panel().start_selection().await?;
    surface.wait_for(|view| view.selecting).await;

    // Replay the drag the user would have made
    surface.event(PageEvent::PointerDown(Point::new(x, y))).await;
    surface
        .event(PageEvent::PointerMove(Point::new(x + width, y + height)))
        .await;
    surface.event(PageEvent::PointerUp).await;

    let view = surface
        .wait_for(|view| !view.selecting)
        .await
        .context("Page controller stopped")?;
    if !view.page.loading && view.page.notification.is_none() {
        bail!("Selection is smaller than the minimum size");
    }

    finish(&surface, args).await
}

async fn open_surface(controller: &AppController, url: &str) -> anyhow::Result<SurfaceHandle> {
    let id = controller.registry().open(url, true).await;
    controller
        .host()
        .inject_controller(id)
        .await
        .context("Surface closed before its controller started")
}

/// Wait for the surface's notification, print it and optionally copy it
async fn finish(surface: &SurfaceHandle, args: &Args) -> anyhow::Result<()> {
    let view = surface
        .wait_for(|view| view.page.notification.is_some())
        .await
        .context("Page controller stopped before a result arrived")?;
    let Some(notification) = view.page.notification else {
        bail!("No result");
    };

    print_notification(&notification, args.json)?;

    match notification.kind {
        NotificationKind::Success if args.copy => {
            surface.event(PageEvent::CopyText).await;
            let copied = surface.wait_for(|view| {
                view.page
                    .notification
                    .as_ref()
                    .is_some_and(|n| n.copy == CopyState::Copied)
            });
            if tokio::time::timeout(COPY_WAIT, copied).await.is_err() {
                tracing::warn!("Failed to copy text");
            }
            Ok(())
        }
        NotificationKind::Error => bail!("{}", notification.text),
        _ => Ok(()),
    }
}

fn print_notification(notification: &Notification, json: bool) -> anyhow::Result<()> {
    if json {
        let value = serde_json::json!({
            "title": notification.title,
            "text": notification.text,
            "success": notification.kind != NotificationKind::Error,
        });
        println!("{}", serde_json::to_string(&value)?);
        return Ok(());
    }

    match notification.kind {
        NotificationKind::Success => println!("{}", notification.text),
        _ => eprintln!("{}: {}", notification.title, notification.text),
    }
    Ok(())
}

async fn read_image(path: &Path) -> anyhow::Result<ImagePayload> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    ite_image::payload_from_encoded(&bytes)
        .with_context(|| format!("{} is not a supported image", path.display()))
}
