use std::path::{Path, PathBuf};

use pulldown_cmark::{Options, Parser, html};

use crate::classify::{content_type_for, is_markdown};
use crate::errors::DocError;
use crate::utils::{encode_href, escape_attr, escape_html};

/// Strategy chosen for producing a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// Send the file's bytes unchanged with the classified content type.
    StreamRaw {
        path: PathBuf,
        content_type: &'static str,
    },
    /// Read the file, render its markdown to HTML, wrap it in the page shell.
    MarkdownPage { path: PathBuf, title: String },
    /// Synthesize a listing page for a directory.
    Listing { dir: PathBuf, url_path: String },
}

enum CandidateKind {
    Markdown,
    RawHtml,
}

/// Fallback chain probed, in order, for directory requests. The first
/// candidate that exists as a regular file wins; when none does, the
/// directory gets a listing page.
const DIR_CANDIDATES: &[(&str, CandidateKind)] = &[
    ("README.md", CandidateKind::Markdown),
    ("readme.md", CandidateKind::Markdown),
    ("Readme.md", CandidateKind::Markdown),
    ("index.html", CandidateKind::RawHtml),
];

/// Pick the rendering strategy for a resolved path that is known to exist.
/// `is_dir` comes from the metadata the dispatcher already queried.
pub async fn decide(
    resolved: &Path,
    url_path: &str,
    is_dir: bool,
    raw: bool,
) -> Result<RenderDecision, DocError> {
    if is_dir {
        return decide_for_dir(resolved, url_path).await;
    }
    if is_markdown(resolved) && !raw {
        let title = resolved
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();
        return Ok(RenderDecision::MarkdownPage {
            path: resolved.to_path_buf(),
            title,
        });
    }
    Ok(RenderDecision::StreamRaw {
        path: resolved.to_path_buf(),
        content_type: content_type_for(resolved),
    })
}

async fn decide_for_dir(dir: &Path, url_path: &str) -> Result<RenderDecision, DocError> {
    for (name, kind) in DIR_CANDIDATES {
        let candidate = dir.join(name);
        let Ok(meta) = tokio::fs::metadata(&candidate).await else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        return Ok(match kind {
            CandidateKind::Markdown => RenderDecision::MarkdownPage {
                path: candidate,
                title: (*name).to_string(),
            },
            CandidateKind::RawHtml => RenderDecision::StreamRaw {
                content_type: content_type_for(&candidate),
                path: candidate,
            },
        });
    }

    let mut url = url_path.to_string();
    if !url.ends_with('/') {
        url.push('/');
    }
    Ok(RenderDecision::Listing {
        dir: dir.to_path_buf(),
        url_path: url,
    })
}

/// Render the listing page for `dir`. `url_path` is the request URL path
/// with a trailing slash; `root` anchors the heading's relative path.
pub async fn directory_listing(root: &Path, dir: &Path, url_path: &str) -> Result<String, DocError> {
    let mut entries: Vec<(String, bool)> = Vec::new();
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
        let name = entry.file_name().to_string_lossy().into_owned();
        entries.push((name, is_dir));
    }
    entries.sort_by(|a, b| a.0.cmp(&b.0));

    let rel = dir
        .strip_prefix(root)
        .ok()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| ".".to_string());

    let mut items = String::new();
    for (name, is_dir) in &entries {
        let display = if *is_dir { format!("{}/", name) } else { name.clone() };
        let href = format!("{}{}", url_path, display);
        items.push_str(&format!(
            "      <li><a href=\"{}\">{}</a></li>\n",
            escape_attr(&encode_href(&href)),
            escape_html(&display),
        ));
    }

    Ok(format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Index of {title}</title>
    <style>
      body {{ font-family: system-ui, sans-serif; padding: 16px; }}
      a {{ color: #0366d6; text-decoration: none; }}
      ul {{ list-style: none; padding-left: 0; }}
      li {{ margin: 6px 0; }}
      .crumbs {{ margin-bottom: 12px; }}
    </style>
  </head>
  <body>
    <div class="crumbs">{crumbs}</div>
    <h1>Index of {title}</h1>
    <ul>
{items}    </ul>
  </body>
</html>
"#,
        title = escape_html(&rel),
        crumbs = breadcrumb(url_path),
        items = items,
    ))
}

/// Breadcrumb trail for a URL path: a root link plus one cumulative link per
/// segment. Backslashes are unified to forward slashes before splitting so
/// the trail stays correct whatever the host separator is.
pub fn breadcrumb(url_path: &str) -> String {
    let unified = url_path.replace('\\', "/");
    let mut crumbs = vec!["<a href=\"/\">/</a>".to_string()];
    let mut acc = String::new();
    for part in unified.split('/').filter(|p| !p.is_empty()) {
        acc.push('/');
        acc.push_str(part);
        crumbs.push(format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(&encode_href(&format!("{}/", acc))),
            escape_html(part),
        ));
    }
    crumbs.join(" &raquo; ")
}

/// Read a markdown file and produce the full HTML page for it.
pub async fn markdown_page(path: &Path, title: &str) -> Result<String, DocError> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(wrap_html(title, &render_markdown(&raw)))
}

/// Markdown to HTML with tables, strikethrough and task lists enabled.
pub fn render_markdown(content: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(content, options));
    out
}

/// Minimal page shell for rendered markdown.
pub fn wrap_html(title: &str, body_html: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <style>
      body {{ font-family: system-ui, sans-serif; margin: 0; }}
      header {{ padding: 12px 16px; background: #0f172a; color: #fff; }}
      main {{ padding: 16px; max-width: 960px; margin: 0 auto; }}
      pre {{ background: #0b1020; color: #e2e8f0; padding: 12px; overflow: auto; }}
      code {{ background: #0b1020; color: #e2e8f0; padding: 2px 4px; border-radius: 4px; }}
      a {{ color: #0366d6; }}
      table {{ border-collapse: collapse; }}
      th, td {{ border: 1px solid #cbd5e1; padding: 6px 8px; }}
    </style>
  </head>
  <body>
    <header><strong>{title}</strong></header>
    <main>
{body}
    </main>
  </body>
</html>
"#,
        title = escape_html(title),
        body = body_html,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn markdown_renders_headings_and_tables() {
        let html = render_markdown("## Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<h2>Title</h2>"));
        assert!(html.contains("<table>"));
        assert!(!html.contains("## "));
    }

    #[test]
    fn wrap_escapes_the_title() {
        let page = wrap_html("<script>", "<p>x</p>");
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("<p>x</p>"));
    }

    #[test]
    fn breadcrumb_has_one_link_per_segment_plus_root() {
        let trail = breadcrumb("/guide/setup/");
        assert_eq!(trail.matches("<a href=").count(), 3);
        assert!(trail.contains("<a href=\"/\">/</a>"));
        assert!(trail.contains("href=\"/guide/\""));
        assert!(trail.contains("href=\"/guide/setup/\""));
    }

    #[test]
    fn breadcrumb_normalizes_backslashes() {
        assert_eq!(breadcrumb("\\a\\b"), breadcrumb("/a/b"));
    }

    #[tokio::test]
    async fn readme_candidates_beat_index_html() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("readme.md"), "# hi").unwrap();
        fs::write(tmp.path().join("index.html"), "<p>idx</p>").unwrap();

        let decision = decide(tmp.path(), "/", true, false).await.unwrap();
        assert_eq!(
            decision,
            RenderDecision::MarkdownPage {
                path: tmp.path().join("readme.md"),
                title: "readme.md".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn index_html_streams_when_no_readme() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("index.html"), "<p>idx</p>").unwrap();

        let decision = decide(tmp.path(), "/", true, false).await.unwrap();
        assert_eq!(
            decision,
            RenderDecision::StreamRaw {
                path: tmp.path().join("index.html"),
                content_type: "text/html; charset=utf-8",
            }
        );
    }

    #[tokio::test]
    async fn empty_directory_falls_back_to_listing() {
        let tmp = tempfile::tempdir().unwrap();
        let decision = decide(tmp.path(), "/sub", true, false).await.unwrap();
        assert_eq!(
            decision,
            RenderDecision::Listing {
                dir: tmp.path().to_path_buf(),
                url_path: "/sub/".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn raw_flag_turns_markdown_into_a_stream() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("doc.md");
        fs::write(&file, "# hi").unwrap();

        let decision = decide(&file, "/doc.md", false, true).await.unwrap();
        assert_eq!(
            decision,
            RenderDecision::StreamRaw {
                path: file,
                content_type: "text/markdown; charset=utf-8",
            }
        );
    }

    #[tokio::test]
    async fn listing_contains_each_child_exactly_once() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::write(tmp.path().join("a name.md"), "a").unwrap();

        let html = directory_listing(tmp.path(), tmp.path(), "/").await.unwrap();
        assert_eq!(html.matches("<li>").count(), 3);
        assert!(html.contains(">a name.md</a>"));
        assert!(html.contains("href=\"/a%20name.md\""));
        assert!(html.contains(">sub/</a>"));
        assert!(html.contains("<h1>Index of .</h1>"));

        // Sorted lexically: "a name.md" < "b.txt" < "sub/"
        let a = html.find("a name.md").unwrap();
        let b = html.find("b.txt").unwrap();
        let s = html.find(">sub/").unwrap();
        assert!(a < b && b < s);
    }

    #[tokio::test]
    async fn listing_heading_is_relative_to_the_root() {
        let tmp = tempfile::tempdir().unwrap();
        let sub = tmp.path().join("guide");
        fs::create_dir(&sub).unwrap();
        let html = directory_listing(tmp.path(), &sub, "/guide/").await.unwrap();
        assert!(html.contains("<h1>Index of guide</h1>"));
    }
}
