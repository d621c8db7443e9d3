//! Interpreter and game locations.
//!
//! A location is either an absolute URL, used as-is, or a local path that the
//! static server exposes relative to its root directory.

use crate::error::LocationError;
use path_clean::PathClean;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Where an interpreter page or story file lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// An absolute URL such as `https://example.com/parchment/`.
    Url(Url),
    /// A local file, already joined onto the directory it is relative to.
    Path(PathBuf),
}

impl Location {
    /// Interprets a raw location.
    ///
    /// Relative paths are resolved against `base_dir`: the working directory
    /// for command-line values, the test file's directory for `**`
    /// parameters. Single-letter schemes are treated as Windows drive paths.
    #[must_use]
    pub fn parse(raw: &str, base_dir: &Path) -> Self {
        match Url::parse(raw) {
            Ok(url) if url.scheme().len() > 1 => Location::Url(url),
            _ => Location::Path(base_dir.join(raw).clean()),
        }
    }

    /// The URL a browser should load for this location.
    ///
    /// # Errors
    ///
    /// `OutsideRoot` if a local path is not under `root`.
    pub fn to_url(&self, server: &Url, root: &Path) -> Result<Url, LocationError> {
        match self {
            Location::Url(url) => Ok(url.clone()),
            Location::Path(path) => {
                let path = absolute(path)?;
                let root = absolute(root)?;
                let relative = path
                    .strip_prefix(&root)
                    .map_err(|_| LocationError::OutsideRoot {
                        path: path.clone(),
                        root: root.clone(),
                    })?;
                let segments: Vec<_> = relative
                    .components()
                    .filter_map(|c| match c {
                        Component::Normal(part) => Some(part.to_string_lossy()),
                        _ => None,
                    })
                    .collect();
                Ok(server.join(&segments.join("/"))?)
            }
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf, LocationError> {
    Ok(std::path::absolute(path)?.clean())
}

/// Base URL of the local static server.
///
/// # Errors
///
/// Never in practice; the URL is always well formed.
pub fn server_url(port: u16) -> Result<Url, LocationError> {
    Ok(Url::parse(&format!("http://127.0.0.1:{port}/"))?)
}
