//! Content-type lookup from a resource name

use std::path::Path;

/// Look up the content type for the last segment of `name`
///
/// Textual types get a `charset=utf-8` parameter so pushed text decodes the
/// same way a regular response would.
pub fn content_type_for(name: &str) -> Option<String> {
    let basename = Path::new(name).file_name()?.to_str()?;
    let mime = mime_guess::from_path(basename).first()?;
    let essence = mime.essence_str();

    if needs_charset(&mime) {
        Some(format!("{}; charset=utf-8", essence))
    } else {
        Some(essence.to_string())
    }
}

fn needs_charset(mime: &mime_guess::Mime) -> bool {
    if mime.type_() == mime_guess::mime::TEXT {
        return true;
    }
    matches!(
        mime.essence_str(),
        "application/javascript" | "application/json" | "application/manifest+json"
    )
}
