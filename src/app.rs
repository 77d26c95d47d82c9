//! # Application Module
//!
//! The viewer shell: one window with a "Load Markdown File" button and a
//! content surface showing the rendered document.
//!
//! File selection sits behind [`FilePicker`] and the load-and-render
//! sequence lives on [`Viewer`], which owns no egui state, so the whole
//! sequence runs in tests without a window.

use std::fs;
use std::path::{Path, PathBuf};

use egui::Context;

use crate::error::{Result, ViewerError};
use crate::html_view::HtmlView;
use crate::markdown::{HtmlDocument, MarkdownRenderer};

/// Title of the main window.
pub const WINDOW_TITLE: &str = "Markdown Viewer with Styles";

/// Label of the single load button.
pub const LOAD_BUTTON_LABEL: &str = "Load Markdown File";

const BASE_FONT_SIZE: f32 = 14.0;

/// Page margin from the stylesheet's `body` rule.
const PAGE_MARGIN: f32 = 20.0;

/// Chooses a Markdown file to open.
pub trait FilePicker {
    /// The chosen path, or `None` when the user cancelled.
    fn pick_markdown_file(&self) -> Option<PathBuf>;
}

/// Native file dialog filtered to Markdown files.
#[derive(Debug, Default)]
pub struct NativeFilePicker;

impl FilePicker for NativeFilePicker {
    fn pick_markdown_file(&self) -> Option<PathBuf> {
        rfd::FileDialog::new()
            .add_filter("Markdown files", &["md", "markdown"])
            .pick_file()
    }
}

/// The area that displays the current document.
///
/// Always holds exactly one document once something was loaded; every
/// load replaces it as a whole.
#[derive(Debug, Default)]
pub struct ContentSurface {
    document: Option<HtmlDocument>,
    view: HtmlView,
}

impl ContentSurface {
    pub fn replace(&mut self, document: HtmlDocument) {
        self.view = HtmlView::new(&document);
        self.document = Some(document);
    }

    pub fn document(&self) -> Option<&HtmlDocument> {
        self.document.as_ref()
    }

    pub fn view(&self) -> &HtmlView {
        &self.view
    }

    fn show(&self, ui: &mut egui::Ui) {
        egui::ScrollArea::vertical()
            .auto_shrink([false; 2])
            .show(ui, |ui| {
                ui.add_space(PAGE_MARGIN);
                ui.horizontal(|ui| {
                    ui.add_space(PAGE_MARGIN);
                    let content_width = ui.available_width() - PAGE_MARGIN;
                    ui.vertical(|ui| {
                        ui.set_max_width(content_width);
                        self.view.show(ui, BASE_FONT_SIZE, content_width);
                    });
                });
                ui.add_space(PAGE_MARGIN);
            });
    }
}

/// Load-and-render state, independent of the window.
#[derive(Default)]
pub struct Viewer {
    renderer: MarkdownRenderer,
    surface: ContentSurface,
    current_file: Option<PathBuf>,
}

impl Viewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn surface(&self) -> &ContentSurface {
        &self.surface
    }

    /// Path of the last successfully loaded file.
    pub fn current_file(&self) -> Option<&Path> {
        self.current_file.as_deref()
    }

    /// Read `path` and render it into a document.
    pub fn render_file(&self, path: &Path) -> Result<HtmlDocument> {
        let markdown = fs::read_to_string(path).map_err(|source| ViewerError::FileLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.renderer.render_document(&markdown))
    }

    /// Open `path` and show it, or show the error panel in its place.
    ///
    /// Returns whether the file was loaded.
    pub fn open(&mut self, path: &Path) -> bool {
        match self.render_file(path) {
            Ok(document) => {
                tracing::info!("Loaded Markdown file: {}", path.display());
                self.surface.replace(document);
                self.current_file = Some(path.to_path_buf());
                true
            }
            Err(e) => {
                tracing::error!("{}", e);
                let reason = match &e {
                    ViewerError::FileLoadFailed { source, .. } => source.to_string(),
                    other => other.to_string(),
                };
                self.surface.replace(HtmlDocument::error_panel(&reason));
                false
            }
        }
    }

    /// One activation of the load button: pick, read, render, display.
    ///
    /// Returns `None` when the picker was cancelled, leaving the surface
    /// untouched.
    pub fn load_and_render(&mut self, picker: &dyn FilePicker) -> Option<bool> {
        let path = picker.pick_markdown_file()?;
        Some(self.open(&path))
    }
}

/// Main application state for the viewer window.
pub struct MarkdownViewerApp {
    viewer: Viewer,
    picker: Box<dyn FilePicker>,
    /// Whether the file open dialog should be shown
    show_open_dialog: bool,
}

impl MarkdownViewerApp {
    /// Creates the app with light visuals matching the page stylesheet.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut visuals = egui::Visuals::light();
        visuals.window_fill = egui::Color32::WHITE;
        visuals.panel_fill = egui::Color32::WHITE;
        visuals.code_bg_color = egui::Color32::from_rgb(0xf0, 0xf0, 0xf0);
        visuals.override_text_color = Some(egui::Color32::BLACK);
        cc.egui_ctx.set_visuals(visuals);

        Self {
            viewer: Viewer::new(),
            picker: Box::new(NativeFilePicker),
            show_open_dialog: false,
        }
    }

    pub fn viewer_mut(&mut self) -> &mut Viewer {
        &mut self.viewer
    }

    fn show_toolbar(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.add_space(10.0);
            ui.vertical_centered(|ui| {
                if ui.button(LOAD_BUTTON_LABEL).clicked() {
                    self.show_open_dialog = true;
                }
            });
            ui.add_space(10.0);
        });
    }

    fn handle_file_dialog(&mut self) {
        if self.show_open_dialog {
            self.viewer.load_and_render(self.picker.as_ref());
            self.show_open_dialog = false;
        }
    }
}

impl eframe::App for MarkdownViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.show_toolbar(ctx);
        self.handle_file_dialog();

        egui::CentralPanel::default().show(ctx, |ui| {
            self.viewer.surface().show(ui);
        });
    }
}

/// Open the main window and run the event loop until it is closed.
///
/// `initial_file` is loaded before the first frame.
pub fn run(initial_file: Option<PathBuf>) -> Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        "mdview",
        options,
        Box::new(move |cc| {
            let mut app = MarkdownViewerApp::new(cc);
            if let Some(path) = &initial_file {
                app.viewer_mut().open(path);
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| ViewerError::UnhandledStartupError {
        message: e.to_string(),
    })
}
