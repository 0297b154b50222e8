// SPDX-License-Identifier: MIT OR Apache-2.0
//! Patchbay - node graph editor.
//!
//! A desktop frontend for the `patchbay_graph` editing model:
//! - Drag nodes by their title bar
//! - Drag from an output port to an input port to connect
//! - Right click empty canvas to add a node, right click a port to cut its wires
//! - Middle drag to pan, scroll to zoom
//! - `G` toggles grid snapping, `Delete` removes the selected node
//! - `Ctrl+S` / `Ctrl+O` save and load `graph.ron`
//!
//! ## Architecture
//!
//! winit owns the window and event loop, egui-wgpu draws. The canvas panel
//! turns egui input into editor events and paints the editor's primitives.

mod app;
mod canvas;

use app::PatchbayApp;
use patchbay_graph::config::{EditorConfig, CONFIG_FILE_NAME};
use std::path::Path;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "patchbay_app=debug,patchbay_graph=debug,wgpu=warn,naga=warn";

fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Patchbay v{}", env!("CARGO_PKG_VERSION"));

    let config = match EditorConfig::load_or_default(Path::new(CONFIG_FILE_NAME)) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("Ignoring {CONFIG_FILE_NAME}: {e}");
            EditorConfig::default()
        }
    };

    if let Err(e) = PatchbayApp::run(config) {
        tracing::error!("Patchbay crashed: {e}");
        std::process::exit(1);
    }
}
