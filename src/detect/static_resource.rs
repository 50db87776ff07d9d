//! Static asset detection from the request path.

/// File extensions that identify binary/static assets. Requests for these
/// paths bypass the rendering pipeline entirely.
///
/// This is the single authoritative list. It deliberately includes `.json`,
/// `.webmanifest`, and `.map`: API payloads and build artifacts must never
/// be rewritten as HTML.
pub const STATIC_EXTENSIONS: &[&str] = &[
    // Stylesheets and scripts
    "css", "js", "mjs", "map",
    // Data and manifests
    "json", "webmanifest", "xml", "txt",
    // Images
    "ico", "png", "jpg", "jpeg", "gif", "svg", "webp", "avif", "bmp", "tif", "tiff",
    // Fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // Audio/video
    "mp3", "wav", "ogg", "flac", "mp4", "webm", "mov", "avi",
    // Documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // Archives
    "zip", "gz", "tar", "rar", "7z",
    // Misc
    "wasm",
];

/// Check whether a URL path points at a static asset.
///
/// Case-insensitive suffix match on the final path segment's extension.
/// Paths without an extension are treated as renderable HTML.
pub fn is_static_resource(path: &str) -> bool {
    let segment = path.rsplit('/').next().unwrap_or(path);
    let Some((_, ext)) = segment.rsplit_once('.') else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();
    STATIC_EXTENSIONS.iter().any(|known| *known == ext)
}
