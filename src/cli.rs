// ============================================================================
// ComposeFE CLI: headless compositing via command-line arguments
// ============================================================================
//
// Usage examples:
//   composefe --scene poster.json --output poster.png
//   composefe -i phone.png --text "Apple" --font "160px DejaVu Sans" -o out.png
//   composefe -i "shots/*.png" --align center --rotate 15 --data-url
//   composefe -i https://example.com/logo.png --white-to-transparent -o logo.png
//
// Images are stacked bottom to top in the order given. The --align, --move,
// --resize, --rotate and --white-to-transparent flags target the text item
// when --text is given, otherwise the topmost image.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::editor::{Editor, ImageRequest};
use crate::error::{EditorError, ExportError, RenderError};
use crate::geometry::{Anchor, Direction};
use crate::io::ImageSource;
use crate::item::ItemId;
use crate::ops::text::{FontError, FontSpec};
use crate::scene::{parse_hex_color, Scene, SceneError};
use crate::settings::EditorSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// ComposeFE headless compositor.
///
/// Place images and text on a surface, transform them, and export a PNG.
#[derive(Parser, Debug)]
#[command(
    name = "composefe",
    about = "ComposeFE headless image compositor",
    long_about = "Compose images and text onto a surface without a GUI, apply\n\
                  align/move/resize/rotate/mask operations, and export the\n\
                  result as a PNG file or data URL.\n\n\
                  Example:\n  \
                  composefe --scene poster.json --output poster.png\n  \
                  composefe -i phone.png --text Apple --resize 160 -o out.png"
)]
pub struct CliArgs {
    /// JSON scene description. Other item flags are applied on top of it.
    #[arg(long, value_name = "SCENE.json")]
    pub scene: Option<PathBuf>,

    /// Image file(s) or URLs, bottom to top. Glob patterns accepted.
    #[arg(short, long, num_args = 1..)]
    pub image: Vec<String>,

    /// Text item placed above all images.
    #[arg(short, long)]
    pub text: Option<String>,

    /// Font descriptor for --text, e.g. "48px DejaVu Sans".
    #[arg(long, value_name = "DESCRIPTOR")]
    pub font: Option<FontSpec>,

    /// Extra font file(s) to register under their file stem.
    #[arg(long, value_name = "FILE")]
    pub font_file: Vec<PathBuf>,

    /// Text color as #rrggbb or #rrggbbaa.
    #[arg(long, value_name = "#RRGGBB")]
    pub color: Option<String>,

    /// Align the target: up, down, left, right, up-left, up-right,
    /// down-left, down-right, center.
    #[arg(long, value_name = "ANCHOR")]
    pub align: Option<Anchor>,

    /// Nudge the target one unit, repeatable.
    #[arg(long = "move", value_name = "DIRECTION")]
    pub nudge: Vec<Direction>,

    /// Resize: pixel delta for images, font size for text, 0 resets.
    #[arg(long)]
    pub resize: Option<f64>,

    /// Rotate the target about its center, in degrees.
    #[arg(long, allow_negative_numbers = true)]
    pub rotate: Option<f64>,

    /// Make pure white pixels transparent.
    #[arg(long)]
    pub white_to_transparent: bool,

    /// Surface width; defaults to the first image or the settings.
    #[arg(long)]
    pub width: Option<u32>,

    /// Surface height; defaults to the first image or the settings.
    #[arg(long)]
    pub height: Option<u32>,

    /// Output PNG path. Defaults to the settings' export file name unless
    /// --data-url is given.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print the result as a PNG data URL on stdout.
    #[arg(long)]
    pub data_url: bool,

    /// Settings file; defaults to the per-user location.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Log at debug level and print timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Scene(#[from] SceneError),
    #[error(transparent)]
    Editor(#[from] EditorError),
    #[error(transparent)]
    Font(#[from] FontError),
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl From<RenderError> for CliError {
    fn from(e: RenderError) -> Self {
        CliError::Editor(e.into())
    }
}

impl From<ExportError> for CliError {
    fn from(e: ExportError) -> Self {
        CliError::Editor(e.into())
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run the CLI and return an OS exit code.
pub fn run(args: CliArgs, settings: EditorSettings) -> ExitCode {
    let start = Instant::now();
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: {}", CliError::Runtime(e));
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(compose(&args, settings)) {
        Ok(()) => {
            if args.verbose {
                eprintln!("done in {:.0}ms", start.elapsed().as_secs_f64() * 1000.0);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "composition failed");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn compose(args: &CliArgs, settings: EditorSettings) -> Result<(), CliError> {
    if args.scene.is_none() && args.image.is_empty() && args.text.is_none() {
        return Err(CliError::Usage(
            "nothing to compose: give --scene, --image or --text".to_string(),
        ));
    }

    let mut editor = Editor::new(settings);
    for path in &args.font_file {
        editor.fonts().register_file(path)?;
    }

    let mut top_layer = -1;
    if let Some(path) = &args.scene {
        let scene = Scene::load(path)?;
        top_layer = scene.items.iter().map(|i| i.layer).max().unwrap_or(-1);
        scene.apply(&mut editor).await?;
    }

    let sources = resolve_inputs(&args.image);
    if !args.image.is_empty() && sources.is_empty() {
        return Err(CliError::Usage("no input images matched the given pattern(s)".to_string()));
    }
    let requests: Vec<ImageRequest> = sources
        .into_iter()
        .enumerate()
        .map(|(idx, source)| ImageRequest::new(source, top_layer + 1 + idx as i32))
        .collect();
    top_layer += requests.len() as i32;
    let images = editor.load_images(requests).await?;

    if let (Some(w), Some(h)) = (args.width, args.height) {
        editor.resize_display(w, h)?;
    }

    let mut target: Option<ItemId> = images.last().copied();
    if let Some(text) = &args.text {
        let id = editor.place_text(text, top_layer + 1);
        if let (Some(font), Some(item)) = (&args.font, editor.store_mut().get_mut(id)) {
            item.font = font.clone();
            item.height = font.size_px;
        }
        if let Some(color) = &args.color {
            editor.set_color(id, parse_hex_color(color)?)?;
        }
        target = Some(id);
    }

    if let Some(id) = target {
        apply_flags(&mut editor, id, args)?;
    }
    editor.render_all()?;

    if args.data_url {
        let export = editor.export(None)?;
        println!("{}", export.data_url);
    }
    if args.output.is_some() || !args.data_url {
        let path = args
            .output
            .clone()
            .unwrap_or_else(|| PathBuf::from(&editor.settings().export_file_name));
        editor.save_png(&path)?;
        if args.verbose {
            eprintln!("  → {}", path.display());
        }
    }
    Ok(())
}

fn apply_flags(editor: &mut Editor, id: ItemId, args: &CliArgs) -> Result<(), CliError> {
    if let Some(value) = args.resize {
        editor.resize(id, value)?;
    }
    if let Some(anchor) = args.align {
        editor.align(id, anchor)?;
    }
    for direction in &args.nudge {
        editor.nudge(id, *direction)?;
    }
    if let Some(degrees) = args.rotate {
        editor.rotate(id, degrees)?;
    }
    if args.white_to_transparent {
        editor.white_to_transparent(id)?;
    }
    Ok(())
}

/// Expand glob patterns for local paths; URLs and data URLs pass through.
/// Duplicate paths are dropped, order is preserved.
fn resolve_inputs(patterns: &[String]) -> Vec<ImageSource> {
    let mut sources: Vec<ImageSource> = Vec::new();
    for pattern in patterns {
        let source = ImageSource::parse(pattern);
        if !matches!(source, ImageSource::Path(_)) {
            sources.push(source);
            continue;
        }
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for path in entries.flatten() {
                    if path.is_file() {
                        matched = true;
                        let source = ImageSource::Path(path);
                        if !sources.contains(&source) {
                            sources.push(source);
                        }
                    }
                }
                if !matched {
                    tracing::warn!(pattern = %pattern, "no files matched");
                }
            }
            Err(e) => {
                tracing::warn!(pattern = %pattern, error = %e, "invalid glob pattern");
            }
        }
    }
    sources
}
