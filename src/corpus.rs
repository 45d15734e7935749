//! Document source: enumerates the markdown post corpus and parses front
//! matter.
//!
//! A post is a `*.md` file with a `---`-delimited front matter block. Only
//! the fields the pipeline needs are extracted (`title`, `excerpt`,
//! `ready`); the full raw file is kept for fingerprinting so any edit,
//! metadata or body, invalidates cached translations.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{PipelineError, PipelineResult};

/// One source document, immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Document {
    /// Stable identifier derived from the filename (date prefix stripped).
    pub slug: String,
    pub title: String,
    pub excerpt: String,
    pub body: String,
    /// Documents not marked ready are excluded from scheduling.
    pub ready: bool,
    /// Full raw serialized form, used for fingerprinting.
    pub raw: String,
    pub path: PathBuf,
}

/// Counters from corpus loading; parse failures never abort the run.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorpusStats {
    pub parse_errors: usize,
}

/// Extracts the slug from a post filename: strips the `YYYY-MM-DD-` prefix
/// and the `.md` extension.
pub fn post_slug(filename: &str) -> String {
    let name = filename.trim_end_matches(".md");
    let parts: Vec<&str> = name.splitn(4, '-').collect();
    if parts.len() == 4 && parts[..3].iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        parts[3].to_string()
    } else {
        name.to_string()
    }
}

struct FrontMatter {
    title: String,
    excerpt: String,
    ready: bool,
}

/// Splits a raw post into front matter fields and body.
fn parse_front_matter(raw: &str) -> PipelineResult<(FrontMatter, String)> {
    // Non-greedy over the block so a stray `---` in the body is harmless.
    let pattern = Regex::new(r"(?s)\A---\s*\n(.*?)\n---\s*\n")
        .map_err(|e| PipelineError::Corpus(format!("front matter pattern: {}", e)))?;

    let captures = pattern
        .captures(raw)
        .ok_or_else(|| PipelineError::Corpus("no front matter block found".to_string()))?;

    let block = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let body_start = captures.get(0).map(|m| m.end()).unwrap_or(0);
    let body = raw[body_start..].to_string();

    let mut title = String::new();
    let mut excerpt = String::new();
    let mut ready = true;

    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());
        match key.trim() {
            "title" => title = value.to_string(),
            "excerpt" => excerpt = value.to_string(),
            "ready" => ready = !matches!(value, "false" | "no" | "0"),
            _ => {}
        }
    }

    if title.is_empty() {
        return Err(PipelineError::Corpus("front matter has no title".to_string()));
    }

    Ok((FrontMatter { title, excerpt, ready }, body))
}

fn unquote(value: &str) -> &str {
    let v = value.trim();
    if v.len() >= 2
        && ((v.starts_with('"') && v.ends_with('"')) || (v.starts_with('\'') && v.ends_with('\'')))
    {
        &v[1..v.len() - 1]
    } else {
        v
    }
}

/// Loads every post under `dir`, sorted by filename. `readme.md` is skipped.
///
/// With a `filter`, only the post whose filename or slug matches is loaded;
/// no match is an error so a mistyped `--post` fails loudly instead of
/// silently translating nothing.
pub fn load_corpus(
    dir: &Path,
    filter: Option<&str>,
) -> PipelineResult<(Vec<Document>, CorpusStats)> {
    let mut filenames: Vec<String> = Vec::new();
    for entry in fs::read_dir(dir)
        .map_err(|e| PipelineError::Corpus(format!("cannot read {}: {}", dir.display(), e)))?
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.ends_with(".md") || name.eq_ignore_ascii_case("readme.md") {
            continue;
        }
        filenames.push(name);
    }
    filenames.sort();

    if let Some(wanted) = filter {
        filenames.retain(|name| name.contains(wanted) || post_slug(name) == wanted);
        if filenames.is_empty() {
            return Err(PipelineError::PostNotFound(wanted.to_string()));
        }
    }

    let mut documents = Vec::with_capacity(filenames.len());
    let mut stats = CorpusStats::default();

    for name in filenames {
        let path = dir.join(&name);
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(post = %name, error = %e, "failed to read post");
                stats.parse_errors += 1;
                continue;
            }
        };

        match parse_front_matter(&raw) {
            Ok((front, body)) => {
                debug!(post = %name, ready = front.ready, "loaded post");
                documents.push(Document {
                    slug: post_slug(&name),
                    title: front.title,
                    excerpt: front.excerpt,
                    body,
                    ready: front.ready,
                    raw,
                    path,
                });
            }
            Err(e) => {
                warn!(post = %name, error = %e, "failed to parse post");
                stats.parse_errors += 1;
            }
        }
    }

    Ok((documents, stats))
}
