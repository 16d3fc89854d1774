//! Image reference errors

use miette::Diagnostic;
use thiserror::Error;

/// Why an image reference was rejected
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image reference '{image}': {reason}")]
    #[diagnostic(code(modulectl::image::invalid_format))]
    InvalidFormat { image: String, reason: String },

    #[error("no tag or digest found in image reference '{image}'")]
    #[diagnostic(
        code(modulectl::image::no_tag_or_digest),
        help("Pin the image with a tag (image:1.2.3) or a digest (image@sha256:...)")
    )]
    NoTagOrDigest { image: String },

    #[error("failed to extract image name from '{image}'")]
    #[diagnostic(code(modulectl::image::name_extraction))]
    ImageNameExtraction { image: String },

    #[error("image '{image}' uses disallowed tag '{tag}'")]
    #[diagnostic(
        code(modulectl::image::disallowed_tag),
        help("Images shipped with a module must use an immutable tag, not 'latest' or 'main'")
    )]
    DisallowedTag { image: String, tag: String },
}
