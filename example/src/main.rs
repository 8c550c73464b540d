//! Drives the masonry engine through a scripted scroll session.
//!
//! With a directory argument, probes real images from disk via
//! [`mosaic_media::ImageProber`]; without one, measures a synthetic
//! collection of varied aspect ratios.

use std::time::{Duration, Instant};

use tracing::info;

use mosaic_engine::{
    EngineArgs, IntrinsicSize, ItemDescriptor, MasonryEngine, MediaKind, ProbeError, ProbeRequest,
    drive,
};
use mosaic_media::ImageProber;

const VIEWPORT_HEIGHT: f32 = 900.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let items = match std::env::args().nth(1) {
        Some(dir) => scan_directory(&dir)?,
        None => synthetic_collection(200),
    };
    info!(count = items.len(), "collection ready");

    let mut engine = MasonryEngine::new(EngineArgs::default(), items);
    let mut prober = ImageProber::new();
    let mut synthetic = synthetic_prober();

    let uses_disk = std::env::args().nth(1).is_some();
    let mut pump = |engine: &mut MasonryEngine<ItemDescriptor>| {
        if uses_disk {
            drive(engine, &mut prober);
        } else {
            drive(engine, &mut synthetic);
        }
    };

    pump(&mut engine);
    println!("initial fill: {}", engine.status());
    print_columns(&engine);

    // Scroll downward in viewport-sized steps, waiting out the debounce
    // between steps as a real scroll session would.
    let mut now = Instant::now();
    for step in 1..=4 {
        now += Duration::from_millis(600);
        let scroll_top = step as f32 * VIEWPORT_HEIGHT;
        if engine.on_scroll(scroll_top, VIEWPORT_HEIGHT, now) {
            pump(&mut engine);
        }
        println!("after scroll to {scroll_top}px: {}", engine.status());
    }

    // Jump back to the top.
    now += Duration::from_millis(600);
    if engine.on_scroll(0.0, VIEWPORT_HEIGHT, now) {
        pump(&mut engine);
    }
    println!("back at top: {}", engine.status());
    print_columns(&engine);

    Ok(())
}

fn print_columns(engine: &MasonryEngine<ItemDescriptor>) {
    for (index, column) in engine.columns().iter().enumerate() {
        println!(
            "  column {index}: {} items, {:.0}px tall",
            column.items().len(),
            column.height()
        );
    }
}

/// Builds descriptors for every image file directly inside `dir`.
fn scan_directory(dir: &str) -> Result<Vec<ItemDescriptor>, std::io::Error> {
    let mut items = Vec::new();
    let mut entries: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .collect();
    entries.sort();
    for path in entries {
        let is_image = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"));
        if !is_image {
            continue;
        }
        if let Some(uri) = path.to_str() {
            items.push(ItemDescriptor::new(uri, MediaKind::Image, uri));
        }
    }
    Ok(items)
}

/// A collection with no backing files, for running without arguments.
fn synthetic_collection(count: usize) -> Vec<ItemDescriptor> {
    (0..count)
        .map(|i| ItemDescriptor::new(i, MediaKind::Image, format!("synthetic/{i}.png")))
        .collect()
}

/// Resolves synthetic items to a rotation of common aspect ratios.
fn synthetic_prober() -> impl FnMut(&ProbeRequest) -> Result<IntrinsicSize, ProbeError> {
    |request: &ProbeRequest| {
        let size = match request.original_index % 4 {
            0 => IntrinsicSize::new(1600.0, 900.0),
            1 => IntrinsicSize::new(900.0, 1600.0),
            2 => IntrinsicSize::new(1200.0, 1200.0),
            _ => IntrinsicSize::new(2100.0, 900.0),
        };
        Ok(size)
    }
}
