use std::path::PathBuf;

use crate::model::Configuration;

/// Group whose selected value picks the preview image
pub const COLOR_GROUP: &str = "exterior_color";

/// Answers whether an image asset can be served
pub trait AssetResolver: Send + Sync {
    fn exists(&self, path: &str) -> bool;
}

/// Treats every asset as available
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyAsset;

impl AssetResolver for AnyAsset {
    fn exists(&self, _path: &str) -> bool {
        true
    }
}

/// Resolves image paths against a directory on disk
///
/// `prefix` is stripped from the image path before joining onto `root`.
#[derive(Debug, Clone)]
pub struct DirectoryAssets {
    root: PathBuf,
    prefix: String,
}

impl DirectoryAssets {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }
}

impl AssetResolver for DirectoryAssets {
    fn exists(&self, path: &str) -> bool {
        let relative = path
            .strip_prefix(self.prefix.as_str())
            .unwrap_or(path)
            .trim_start_matches('/');
        self.root.join(relative).is_file()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub src: String,
    /// True when the model default image replaced a missing color image
    pub fallback: bool,
}

/// Lower-case and replace every whitespace run with one hyphen, including
/// leading and trailing runs
pub fn slug(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut in_space = false;
    for c in value.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(c.to_lowercase());
            in_space = false;
        }
    }
    slug
}

/// Pick the preview image for a model and its selected color
///
/// Returns `None` when either is missing. A missing color image falls back to
/// the model default exactly once; the default is not checked.
pub fn resolve_preview(
    image_base: &str,
    model: Option<&str>,
    configuration: &Configuration,
    assets: &dyn AssetResolver,
) -> Option<Preview> {
    let model = model?.to_lowercase();
    let color = configuration.selected_value(COLOR_GROUP)?;
    let base = image_base.trim_end_matches('/');

    let src = format!("{}/{}-{}.jpg", base, model, slug(color));
    if assets.exists(&src) {
        return Some(Preview {
            src,
            fallback: false,
        });
    }

    tracing::debug!(missing = %src, "Preview image missing, using model default");
    Some(Preview {
        src: format!("{}/{}-default.jpg", base, model),
        fallback: true,
    })
}

/// Every selected value as a badge label, in key order then sequence order
pub fn feature_highlights(configuration: &Configuration) -> Vec<String> {
    configuration
        .selected_values()
        .map(str::to_string)
        .collect()
}
