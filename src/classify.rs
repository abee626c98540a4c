use std::ffi::OsStr;
use std::path::Path;

/// Transmission content type from the lowercased file extension.
///
/// Total: every path maps to exactly one type, anything unrecognized to a
/// generic binary type. No content sniffing.
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("html") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js") | Some("mjs") => "text/javascript; charset=utf-8",
        Some("json") => "application/json; charset=utf-8",
        Some("md") => "text/markdown; charset=utf-8",
        Some("txt") => "text/plain; charset=utf-8",
        Some("svg") => "image/svg+xml",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("ico") => "image/x-icon",
        Some("pdf") => "application/pdf",
        Some("xml") => "application/xml; charset=utf-8",
        _ => "application/octet-stream",
    }
}

/// Check if a file is markdown
pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .map(|s| s.eq_ignore_ascii_case("md"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_extensions_map() {
        assert_eq!(content_type_for(Path::new("a/b.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("x.mjs")), "text/javascript; charset=utf-8");
        assert_eq!(content_type_for(Path::new("x.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("x.pdf")), "application/pdf");
        assert_eq!(content_type_for(Path::new("doc.md")), "text/markdown; charset=utf-8");
    }

    #[test]
    fn extension_case_is_ignored() {
        assert_eq!(content_type_for(Path::new("LOGO.PNG")), "image/png");
    }

    #[test]
    fn unknown_and_missing_extensions_are_binary() {
        assert_eq!(content_type_for(Path::new("x.weird")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
    }

    #[test]
    fn markdown_detection() {
        assert!(is_markdown(Path::new("README.md")));
        assert!(is_markdown(Path::new("README.MD")));
        assert!(!is_markdown(Path::new("README.txt")));
        assert!(!is_markdown(Path::new("md")));
    }
}
