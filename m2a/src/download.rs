use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::Res;

const FALLBACK_NAME: &str = "download";

/// Fetches `url` into `dir`, keeping the file name of the URL.
pub fn download(url: &str, dir: &Path) -> Res<PathBuf> {
    let output = dir.join(file_name_from_url(url));
    debug!(url, output = %output.display(), "downloading");

    let bytes = reqwest::blocking::get(url)?.error_for_status()?.bytes()?;
    fs::write(&output, bytes)?;
    Ok(output)
}

/// The last path segment of `url`, without query or fragment.
pub fn file_name_from_url(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split_once("://").map_or(path, |(_, rest)| rest);

    path.split_once('/')
        .and_then(|(_, path)| path.rsplit('/').find(|segment| !segment.is_empty()))
        .filter(|name| !matches!(*name, "." | ".."))
        .unwrap_or(FALLBACK_NAME)
        .to_owned()
}
