//! LayoutWeb command-line application.
//!
//! Loads a saved project file and exports it as static HTML/CSS plus a
//! flattened PNG, or prints a short summary of its contents.

use clap::{Args, Parser, Subcommand};
use kurbo::Size;
use layoutweb_core::{CanvasDocument, ElementKind, ImageFormat, Project, StorageError};
use layoutweb_render::{
    DecodeError, DecodedImage, DefaultImageDecoder, ExportError, FontBook, ImageAsset,
    MarkupExporter, RasterOptions, Rasterizer, encode_png,
};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const HTML_FILE: &str = "index.html";
pub const CSS_FILE: &str = "style.css";
pub const PNG_FILE: &str = "layout-export.png";
pub const IMAGES_DIR: &str = "images";

#[derive(Debug, Clone, Parser)]
#[command(name = "layoutweb")]
#[command(about = "Export LayoutWeb projects to HTML/CSS and PNG")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Write index.html, style.css, layout-export.png and the image files.
    Export(ExportArgs),
    /// Print a summary of a saved project.
    Inspect {
        /// Saved project file (JSON).
        project: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Saved project file (JSON).
    pub project: PathBuf,

    /// Output directory, created if missing.
    #[arg(short, long)]
    pub out: PathBuf,

    /// Viewport width in pixels.
    #[arg(long, default_value = "1280")]
    pub width: f64,

    /// Viewport height in pixels.
    #[arg(long, default_value = "720")]
    pub height: f64,

    /// Skip the flattened PNG.
    #[arg(long)]
    pub no_png: bool,

    /// Extra font file for the PNG, on top of the system fonts. Repeatable.
    #[arg(long = "font", value_name = "FILE")]
    pub fonts: Vec<PathBuf>,
}

impl ExportArgs {
    pub fn viewport(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read {path}: {source}")]
    ReadProject {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot read font {path}: {source}")]
    ReadFont {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project: {0}")]
    Project(#[from] StorageError),
    #[error("export failed: {0}")]
    Export(#[from] ExportError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;

/// Files written by one export run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportSummary {
    pub files: Vec<PathBuf>,
    /// Image assets that could not be written, with the reason.
    pub skipped: Vec<(String, DecodeError)>,
}

/// Read and parse a saved project file.
pub fn read_project(path: &Path) -> AppResult<CanvasDocument> {
    let json = fs::read_to_string(path).map_err(|source| AppError::ReadProject {
        path: path.display().to_string(),
        source,
    })?;
    Ok(Project::from_json(&json)?.into_document())
}

/// Export a saved project into `args.out`.
///
/// Relative image paths resolve against the project file's directory.
pub fn export(args: &ExportArgs) -> AppResult<ExportSummary> {
    let document = read_project(&args.project)?;
    let base_dir = args
        .project
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let fonts = if args.no_png {
        None
    } else {
        Some(font_book(&args.fonts)?)
    };
    export_document(
        &document,
        args.viewport(),
        &args.out,
        &DefaultImageDecoder::with_base_dir(base_dir),
        fonts.as_ref(),
    )
}

/// System fonts plus the given font files.
pub fn font_book(extra: &[PathBuf]) -> AppResult<FontBook> {
    let mut fonts = FontBook::system();
    for path in extra {
        let data = fs::read(path).map_err(|source| AppError::ReadFont {
            path: path.display().to_string(),
            source,
        })?;
        fonts.load_font_data(data);
    }
    Ok(fonts)
}

/// Write the markup and image files for `document`, plus the PNG when
/// `fonts` is given.
pub fn export_document(
    document: &CanvasDocument,
    viewport: Size,
    out: &Path,
    decoder: &DefaultImageDecoder,
    fonts: Option<&FontBook>,
) -> AppResult<ExportSummary> {
    let elements = document.elements();
    let markup = MarkupExporter::new(viewport)?.export(elements);
    fs::create_dir_all(out)?;

    let mut summary = ExportSummary::default();
    summary.files.push(write_file(out, HTML_FILE, markup.html.as_bytes())?);
    summary.files.push(write_file(out, CSS_FILE, markup.css.as_bytes())?);

    if !markup.assets.is_empty() {
        fs::create_dir_all(out.join(IMAGES_DIR))?;
    }
    for asset in &markup.assets {
        match asset_png(decoder, asset) {
            Ok(bytes) => {
                let path = out.join(IMAGES_DIR).join(&asset.file_name);
                fs::write(&path, bytes)?;
                summary.files.push(path);
            }
            Err(e) => {
                log::warn!("skipping {}: {}", asset.file_name, e);
                summary.skipped.push((asset.file_name.clone(), e));
            }
        }
    }

    if let Some(fonts) = fonts {
        let options = RasterOptions::for_viewport(viewport)?;
        let png = Rasterizer::new(fonts, options).render_png_blocking(elements, decoder)?;
        summary.files.push(write_file(out, PNG_FILE, &png)?);
    }

    log::info!(
        "exported {} element(s), {} image file(s) skipped",
        elements.len(),
        summary.skipped.len()
    );
    Ok(summary)
}

fn write_file(dir: &Path, name: &str, contents: &[u8]) -> AppResult<PathBuf> {
    let path = dir.join(name);
    fs::write(&path, contents)?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

/// PNG bytes for an image asset. PNG sources are copied as-is, other
/// formats are decoded and re-encoded.
fn asset_png(decoder: &DefaultImageDecoder, asset: &ImageAsset) -> Result<Vec<u8>, DecodeError> {
    let bytes = decoder.read_bytes(&asset.source)?;
    if ImageFormat::from_magic_bytes(&bytes) == Some(ImageFormat::Png) {
        return Ok(bytes);
    }
    let pixmap = DecodedImage::from_encoded(&bytes)?
        .to_pixmap()
        .ok_or_else(|| DecodeError::Image("empty image".to_string()))?;
    encode_png(&pixmap).map_err(|e| DecodeError::Image(e.to_string()))
}

/// Human-readable summary of a saved project.
pub fn inspect(path: &Path) -> AppResult<String> {
    let json = fs::read_to_string(path).map_err(|source| AppError::ReadProject {
        path: path.display().to_string(),
        source,
    })?;
    let project = Project::from_json(&json)?;
    Ok(summarize(&project))
}

pub fn summarize(project: &Project) -> String {
    let mut kinds: BTreeMap<&'static str, usize> = BTreeMap::new();
    for element in &project.elements {
        *kinds.entry(element.kind().name()).or_default() += 1;
    }
    let locked = project.elements.iter().filter(|e| e.locked).count();

    let mut out = String::new();
    let _ = writeln!(out, "saved:    {}", project.timestamp.to_rfc3339());
    let _ = writeln!(out, "elements: {} ({} locked)", project.elements.len(), locked);
    let _ = writeln!(out, "next id:  {}", project.id_counter);
    for kind in ElementKind::all() {
        if let Some(count) = kinds.get(kind.name()) {
            let _ = writeln!(out, "  {:<18} {}", kind.name(), count);
        }
    }
    let document = project.clone().into_document();
    if let Some(bounds) = document.bounds() {
        let _ = writeln!(
            out,
            "bounds:   {:.0},{:.0} to {:.0},{:.0}",
            bounds.x0, bounds.y0, bounds.x1, bounds.y1
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use kurbo::Point;
    use layoutweb_core::{Canvas, ImageSource};

    fn blue_png() -> Vec<u8> {
        let mut bytes = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut bytes, 4, 4);
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(&[0, 0, 255, 255].repeat(16)).unwrap();
        }
        bytes
    }

    fn write_project(dir: &Path, canvas: &Canvas) -> PathBuf {
        let path = dir.join("project.json");
        let json = Project::from_document(&canvas.document).to_json().unwrap();
        fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_args() {
        let cli = Cli::try_parse_from([
            "layoutweb", "export", "p.json", "--out", "site", "--width", "800", "--no-png",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.viewport(), Size::new(800.0, 720.0));
        assert!(args.no_png);
        assert_eq!(args.out, PathBuf::from("site"));
        assert!(args.fonts.is_empty());

        let cli = Cli::try_parse_from([
            "layoutweb", "export", "p.json", "-o", "site", "--font", "a.ttf", "--font", "b.otf",
        ])
        .unwrap();
        let Command::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.fonts, vec![PathBuf::from("a.ttf"), PathBuf::from("b.otf")]);
    }

    #[test]
    fn test_missing_font_file_fails_export() {
        let dir = tempfile::tempdir().unwrap();
        let project = write_project(dir.path(), &Canvas::new());
        let result = export(&ExportArgs {
            project,
            out: dir.path().join("site"),
            width: 100.0,
            height: 100.0,
            no_png: false,
            fonts: vec![dir.path().join("missing.ttf")],
        });
        assert!(matches!(result, Err(AppError::ReadFont { .. })));
        assert!(!dir.path().join("site").exists());
    }

    #[test]
    fn test_export_writes_markup_and_images() {
        let dir = tempfile::tempdir().unwrap();
        let mut canvas = Canvas::new();
        canvas.create(ElementKind::Star, Some(Point::new(10.0, 10.0)));
        canvas.create_image(
            ImageSource::from_bytes(&blue_png(), ImageFormat::Png),
            Size::new(4.0, 4.0),
        );
        fs::write(dir.path().join("logo.png"), blue_png()).unwrap();
        canvas.create_image(ImageSource::new("logo.png"), Size::new(4.0, 4.0));
        canvas.create_image(ImageSource::new("gone.png"), Size::new(4.0, 4.0));
        let project = write_project(dir.path(), &canvas);

        let out = dir.path().join("site");
        let summary = export(&ExportArgs {
            project,
            out: out.clone(),
            width: 400.0,
            height: 300.0,
            no_png: true,
            fonts: vec![dir.path().join("never-read.ttf")],
        })
        .unwrap();

        let html = fs::read_to_string(out.join(HTML_FILE)).unwrap();
        assert!(html.contains("images/image-3.png"));
        assert!(out.join(CSS_FILE).exists());
        assert_eq!(fs::read(out.join("images/image-1.png")).unwrap(), blue_png());
        assert_eq!(fs::read(out.join("images/image-2.png")).unwrap(), blue_png());
        assert!(!out.join("images/image-3.png").exists());
        assert!(!out.join(PNG_FILE).exists());
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].0, "image-3.png");
    }

    #[test]
    fn test_export_png() {
        let dir = tempfile::tempdir().unwrap();
        let mut canvas = Canvas::new();
        canvas.create(ElementKind::Rectangle, Some(Point::new(0.0, 0.0)));
        let out = dir.path().join("site");

        let summary = export_document(
            &canvas.document,
            Size::new(200.0, 100.0),
            &out,
            &DefaultImageDecoder::new(),
            Some(&FontBook::empty()),
        )
        .unwrap();
        assert!(summary.files.contains(&out.join(PNG_FILE)));
        let bytes = fs::read(out.join(PNG_FILE)).unwrap();
        assert_eq!(ImageFormat::from_magic_bytes(&bytes), Some(ImageFormat::Png));
    }

    #[test]
    fn test_export_rejects_bad_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let result = export_document(
            &CanvasDocument::new(),
            Size::new(0.0, 100.0),
            dir.path(),
            &DefaultImageDecoder::new(),
            None,
        );
        assert!(matches!(result, Err(AppError::Export(_))));
    }

    #[test]
    fn test_missing_and_invalid_project() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(read_project(&missing), Err(AppError::ReadProject { .. })));

        let broken = dir.path().join("broken.json");
        fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(inspect(&broken), Err(AppError::Project(_))));
    }

    #[test]
    fn test_inspect_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut canvas = Canvas::new();
        canvas.create(ElementKind::Circle, Some(Point::new(0.0, 0.0)));
        canvas.create(ElementKind::Circle, Some(Point::new(200.0, 0.0)));
        canvas.create(ElementKind::Text, Some(Point::new(0.0, 200.0)));
        let project = write_project(dir.path(), &canvas);

        let report = inspect(&project).unwrap();
        assert!(report.contains("elements: 3 (0 locked)"));
        assert!(report.contains("next id:  4"));
        assert!(report
            .lines()
            .any(|l| l.split_whitespace().collect::<Vec<_>>() == ["Circle", "2"]));
        assert!(report.lines().any(|l| l.trim_start().starts_with("Text")));
        assert!(report.contains("bounds:   0,0 to"));
    }
}
