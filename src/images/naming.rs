use std::path::{Path, PathBuf};
use url::Url;

/// Extensions kept from the URL's file name (compared lowercase).
pub const ALLOWED_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "webp"];

/// Extension used when the URL does not carry an allowed one.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Turns a SKU into a single safe path component.
///
/// Path separators become `_`; empty, `.` and `..` become `_`.
pub fn sanitize_sku(sku: &str) -> String {
    let cleaned: String = sku
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => "_".to_string(),
        _ => cleaned,
    }
}

/// Picks the file name for an image.
///
/// The last segment of the URL path is used when it has a non-empty stem.
/// If its extension is missing or not in [`ALLOWED_EXTENSIONS`], the stem gets
/// [`DEFAULT_EXTENSION`]. Without a usable segment, the SKU names the file.
///
/// ```
/// use parentsku::images::image_file_name;
/// use url::Url;
///
/// let url = Url::parse("https://cdn.example.com/p/foto.PNG?v=2").unwrap();
/// assert_eq!(image_file_name(&url, "A1"), "foto.PNG");
///
/// let url = Url::parse("https://cdn.example.com/image?id=9").unwrap();
/// assert_eq!(image_file_name(&url, "A1"), "image.jpg");
///
/// let url = Url::parse("https://cdn.example.com/").unwrap();
/// assert_eq!(image_file_name(&url, "A1"), "A1.jpg");
/// ```
pub fn image_file_name(url: &Url, sku: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(sanitize_segment)
        .unwrap_or_default();
    let path = Path::new(&segment);

    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());
    let allowed = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| ALLOWED_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));

    match stem {
        Some(_) if allowed => segment.clone(),
        Some(stem) => format!("{stem}.{DEFAULT_EXTENSION}"),
        None => format!("{}.{DEFAULT_EXTENSION}", sanitize_sku(sku)),
    }
}

fn sanitize_segment(segment: &str) -> String {
    match segment {
        "." | ".." => String::new(),
        s => s.replace('\\', "_"),
    }
}

/// Returns `dir/name`, or the first free `dir/<stem>_<n>.<ext>` (n = 1, 2, …)
/// if that path already exists.
pub fn unique_path(dir: &Path, name: &str) -> PathBuf {
    let candidate = dir.join(name);
    if !candidate.exists() {
        return candidate;
    }

    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path.extension().map(|e| e.to_string_lossy().into_owned());

    let mut n: u64 = 1;
    loop {
        let numbered = match &ext {
            Some(ext) => format!("{stem}_{n}.{ext}"),
            None => format!("{stem}_{n}"),
        };
        let candidate = dir.join(numbered);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}
