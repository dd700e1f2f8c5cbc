use std::path::{Path, PathBuf};

/// Page extensions used when the project does not configure any.
pub const DEFAULT_PAGE_EXTENSIONS: [&str; 4] = ["tsx", "ts", "jsx", "js"];

/// The pages directory: `pages/`, falling back to `src/pages/`.
pub fn find_pages_dir(root: &Path) -> Option<PathBuf> {
    [root.join("pages"), root.join("src").join("pages")]
        .into_iter()
        .find(|dir| dir.exists())
}

/// The custom app file (`_app.<ext>`), trying extensions in order.
pub fn find_custom_app_file<S: AsRef<str>>(root: &Path, page_extensions: &[S]) -> Option<PathBuf> {
    let pages = find_pages_dir(root)?;

    let found = page_extensions
        .iter()
        .map(|ext| pages.join(format!("_app.{}", ext.as_ref())))
        .find(|candidate| candidate.exists());

    match &found {
        Some(path) => tracing::debug!(path = %path.display(), "found custom app file"),
        None => tracing::trace!(pages = %pages.display(), "no custom app file"),
    }
    found
}
