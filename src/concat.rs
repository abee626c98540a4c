use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::errors::DocError;

/// Directory names never descended into while discovering markdown.
pub const SKIP_DIRS: &[&str] = &["node_modules", ".git", "build", "target", "releases"];

/// Combines each per-language markdown tree into a single document.
pub struct ConcatJob {
    pub base_dir: PathBuf,
    pub out_dir: PathBuf,
    pub langs: Vec<String>,
}

impl ConcatJob {
    /// Run the job for every configured language. Returns the written files.
    pub fn run(&self) -> Result<Vec<PathBuf>, DocError> {
        fs::create_dir_all(&self.out_dir)?;
        self.langs.iter().map(|lang| self.concat_language(lang)).collect()
    }

    /// Combine every markdown file under `<base>/<lang>` into one document,
    /// root README first, then shallower files before deeper, then lexical.
    fn concat_language(&self, lang: &str) -> Result<PathBuf, DocError> {
        let lang_dir = self.base_dir.join(lang);
        let files = sort_docs(collect_markdown(&lang_dir)?, &lang_dir);
        let out_file = self.out_dir.join(format!("combined-{lang}.md"));

        let mut parts: Vec<String> = Vec::new();
        parts.push(format!("# Combined Documentation ({lang})\n"));
        parts.push("\n".to_string());

        for abs in &files {
            let rel = rel_key(abs, &self.base_dir);
            let content = fs::read_to_string(abs)?;
            parts.push(format!("<!-- File: {rel} -->\n"));
            parts.push(format!("## {rel}\n"));
            parts.push("\n".to_string());
            parts.push(content.trim_end().to_string());
            parts.push("\n\n".to_string());
        }

        fs::write(&out_file, parts.concat())?;
        log::info!("combined {} markdown files into {:?}", files.len(), out_file);
        Ok(out_file)
    }
}

/// All `.md` files under `root`, deny-listed directories skipped.
fn collect_markdown(root: &Path) -> Result<Vec<PathBuf>, DocError> {
    let mut files = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        !(entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| SKIP_DIRS.contains(&name)))
    });
    for entry in walker {
        let entry = entry.map_err(io::Error::from)?;
        let is_md = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".md"));
        if entry.file_type().is_file() && is_md {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn sort_docs(mut files: Vec<PathBuf>, lang_dir: &Path) -> Vec<PathBuf> {
    let root_readme = lang_dir.join("README.md");
    files.sort_by(|a, b| {
        let a_is_root = *a == root_readme;
        let b_is_root = *b == root_readme;
        b_is_root
            .cmp(&a_is_root)
            .then_with(|| depth(a, lang_dir).cmp(&depth(b, lang_dir)))
            .then_with(|| rel_key(a, lang_dir).cmp(&rel_key(b, lang_dir)))
    });
    files
}

/// Relative path with forward slashes, for stable ordering and headings.
fn rel_key(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

fn depth(path: &Path, base: &Path) -> usize {
    rel_key(path, base).split('/').count()
}
