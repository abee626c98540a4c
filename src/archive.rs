use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

use crate::errors::DocError;

/// Names excluded from every archive regardless of `.gitignore`.
const DEFAULT_IGNORES: &[&str] = &[
    "node_modules",
    ".git",
    "docs",
    "build",
    "releases",
    "target",
    ".DS_Store",
    "Thumbs.db",
];
const IGNORED_SUFFIXES: &[&str] = &[".log"];

/// Packages the repository tree into a timestamped release archive.
pub struct PackJob {
    pub base_dir: PathBuf,
    /// Archive name prefix.
    pub name: String,
}

impl PackJob {
    /// Write `<base>/releases/<name>-YYYYMMDD-HHMM.tar.gz` containing the
    /// tree minus ignored entries. Returns the archive path.
    pub fn run(&self) -> Result<PathBuf, DocError> {
        let patterns = gitignore_patterns(&self.base_dir);
        let releases = self.base_dir.join("releases");
        fs::create_dir_all(&releases)?;
        let archive_path = releases.join(format!("{}-{}.tar.gz", self.name, timestamp()?));

        let encoder = GzEncoder::new(File::create(&archive_path)?, Compression::best());
        let mut builder = tar::Builder::new(encoder);
        let mut count = 0usize;

        let walker = WalkDir::new(&self.base_dir).into_iter().filter_entry(|entry| {
            // Never filter the walk root itself.
            entry.depth() == 0 || !is_default_ignored(&entry.file_name().to_string_lossy())
        });
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&self.base_dir)
                .map_err(|e| DocError::Render(e.to_string()))?;
            let rel = rel.to_string_lossy().replace('\\', "/");
            if rel.is_empty() || matches_gitignore(&patterns, &rel) {
                continue;
            }
            builder.append_path_with_name(entry.path(), &rel)?;
            count += 1;
        }

        builder.into_inner()?.finish()?;
        log::info!("packaged {} files into {:?}", count, archive_path);
        Ok(archive_path)
    }
}

/// `YYYYMMDD-HHMM`, UTC.
fn timestamp() -> Result<String, DocError> {
    let format = time::format_description::parse("[year][month][day]-[hour][minute]")
        .map_err(|e| DocError::Render(e.to_string()))?;
    time::OffsetDateTime::now_utc()
        .format(&format)
        .map_err(|e| DocError::Render(e.to_string()))
}

fn is_default_ignored(name: &str) -> bool {
    DEFAULT_IGNORES.contains(&name) || IGNORED_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Non-comment, non-negated `.gitignore` lines kept as literal patterns.
/// Only plain names and `*.suffix` forms are honored; anything fancier falls
/// back to being archived, which errs on the side of including files.
fn gitignore_patterns(base: &Path) -> Vec<String> {
    let Ok(raw) = fs::read_to_string(base.join(".gitignore")) else {
        return Vec::new();
    };
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('!'))
        .map(|line| line.trim_end_matches('/').to_string())
        .collect()
}

fn matches_gitignore(patterns: &[String], rel: &str) -> bool {
    patterns.iter().any(|pattern| {
        if let Some(suffix) = pattern.strip_prefix('*') {
            rel.ends_with(suffix)
        } else {
            rel == pattern
                || rel.starts_with(&format!("{pattern}/"))
                || rel.split('/').any(|segment| segment == pattern)
        }
    })
}
