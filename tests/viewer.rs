//! Integration tests for the load-and-render sequence.

use mdview::app::{FilePicker, Viewer};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

struct Picks(Option<PathBuf>);

impl FilePicker for Picks {
    fn pick_markdown_file(&self) -> Option<PathBuf> {
        self.0.clone()
    }
}

#[test]
fn nonexistent_path_shows_error_and_viewer_stays_usable() {
    let temp = TempDir::new().unwrap();
    let mut viewer = Viewer::new();

    let missing = temp.path().join("does-not-exist.md");
    assert_eq!(viewer.load_and_render(&Picks(Some(missing))), Some(false));
    let html = viewer.surface().document().unwrap().as_str();
    assert!(html.contains("Error"));

    let good = temp.path().join("ok.md");
    fs::write(&good, "# Back\n").unwrap();
    assert_eq!(viewer.load_and_render(&Picks(Some(good))), Some(true));
    assert!(viewer
        .surface()
        .document()
        .unwrap()
        .as_str()
        .contains("<h1>Back</h1>"));
}

#[test]
fn cancel_before_any_load_keeps_empty_surface() {
    let mut viewer = Viewer::new();
    assert_eq!(viewer.load_and_render(&Picks(None)), None);
    assert!(viewer.surface().document().is_none());
}

#[test]
fn directory_is_a_load_failure() {
    let temp = TempDir::new().unwrap();
    let mut viewer = Viewer::new();
    assert!(!viewer.open(temp.path()));
    assert!(viewer
        .surface()
        .document()
        .unwrap()
        .as_str()
        .contains("Could not load file: "));
}
