use percent_encoding::{AsciiSet, CONTROLS, percent_decode_str, utf8_percent_encode};

/// Characters percent-encoded in generated hrefs. `%` itself is in the set
/// so a decoded href round-trips to the original filename.
const HREF_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'#')
    .add(b'%');

/// Escape HTML special characters
pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Escape HTML attribute values
pub fn escape_attr(input: &str) -> String {
    escape_html(input)
}

/// Percent-encode a URL path for use as a link target. Slashes pass through.
pub fn encode_href(path: &str) -> String {
    utf8_percent_encode(path, HREF_SET).to_string()
}

/// Percent-decode a request path. `None` when the decoded bytes are not
/// valid UTF-8.
pub fn decode_path(raw: &str) -> Option<String> {
    percent_decode_str(raw).decode_utf8().ok().map(|s| s.into_owned())
}

/// True when the query string carries `name=1`.
pub fn query_flag(query: Option<&str>, name: &str) -> bool {
    let Some(query) = query else {
        return false;
    };
    query.split('&').any(|pair| {
        pair.split_once('=')
            .is_some_and(|(key, value)| key == name && value == "1")
    })
}
