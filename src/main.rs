//! MediaGrab - desktop front end for yt-dlp and FFmpeg
//!
//! Runs the GUI by default. `--download URL` performs a single download
//! without a window and exits with the task's outcome.

use anyhow::{bail, Context, Result};
use clap::Parser;
use iced::Application;
use mediagrab::backend::{event_channel, BackendEvent};
use mediagrab::downloader::{Dispatcher, TaskState};
use mediagrab::extractor::{DownloadMode, DownloadRequest, VideoQuality, YtDlpExtractor};
use mediagrab::gui::{AppFlags, MediaGrabApp};
use mediagrab::utils::{self, ConfigStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser)]
#[command(name = "mediagrab", version, about)]
struct Args {
    /// Config file to use instead of the per-user one
    #[arg(long)]
    config: Option<PathBuf>,

    /// Download this URL without opening the window
    #[arg(long)]
    download: Option<String>,

    /// video, audio, cover or metadata
    #[arg(long, default_value = "video")]
    mode: DownloadMode,

    /// best, 4k, 1080 or 720 (defaults to the saved preference)
    #[arg(long)]
    quality: Option<String>,

    /// Record a live stream from its start
    #[arg(long)]
    live: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::fmt::init();

    let config_path = args.config.clone().unwrap_or_else(utils::default_config_path);
    let store = ConfigStore::open_with_finder(&config_path, utils::find_ffmpeg)
        .with_context(|| format!("cannot use config file {}", config_path.display()))?;
    info!("Using config {}", store.path().display());
    let store = Arc::new(store);

    let runtime = Arc::new(Runtime::new()?);

    if let Some(url) = args.download.clone() {
        return run_headless(&runtime, store, &args, url);
    }

    MediaGrabApp::run(iced::Settings {
        window: iced::window::Settings {
            size: iced::Size::new(1000.0, 720.0),
            min_size: Some(iced::Size::new(820.0, 560.0)),
            ..Default::default()
        },
        antialiasing: true,
        ..iced::Settings::with_flags(AppFlags {
            runtime: Arc::clone(&runtime),
            config: store,
        })
    })?;

    Ok(())
}

fn run_headless(
    runtime: &Runtime,
    store: Arc<ConfigStore>,
    args: &Args,
    url: String,
) -> Result<()> {
    let extractor = YtDlpExtractor::new().context("yt-dlp is required for downloads")?;
    let (events, mut rx) = event_channel();
    let dispatcher = Dispatcher::new(
        runtime.handle().clone(),
        Arc::clone(&store),
        Arc::new(extractor),
        events,
    );

    let config = store.snapshot();
    let mut request =
        DownloadRequest::from_preferences(url, args.mode, &config.default_preferences);
    if let Some(quality) = &args.quality {
        request.video_quality = VideoQuality::parse(quality);
    }
    request.live_mode = args.live;

    let handle = match dispatcher.spawn_task(request) {
        Ok(handle) => handle,
        Err(e) => {
            while let Ok(event) = rx.try_recv() {
                print_event(&event);
            }
            return Err(e.into());
        }
    };

    let state = runtime.block_on(async {
        let wait = handle.wait();
        tokio::pin!(wait);
        loop {
            tokio::select! {
                state = &mut wait => break state,
                Some(event) = rx.recv() => print_event(&event),
            }
        }
    });
    while let Ok(event) = rx.try_recv() {
        print_event(&event);
    }

    if state != TaskState::Succeeded {
        bail!("download did not complete");
    }
    Ok(())
}

fn print_event(event: &BackendEvent) {
    match event {
        BackendEvent::Log(entry) => println!(
            "{} [{}] {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.level,
            entry.message
        ),
        BackendEvent::Progress {
            percent, status, ..
        } => println!("{:5.1}% {}", percent, status),
        BackendEvent::TaskState { .. } => {}
    }
}
