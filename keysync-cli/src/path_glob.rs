use std::collections::HashSet;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobSetBuilder};
use ignore::WalkBuilder;
use rayon::prelude::*;

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

/// Directory part of `pattern` before its first glob meta-character.
fn walk_root(pattern: &str) -> PathBuf {
    let end = pattern
        .bytes()
        .position(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
        .unwrap_or(pattern.len());
    let prefix = &pattern[..end];
    if let Some(dir) = prefix.strip_suffix('/') {
        return if dir.is_empty() {
            PathBuf::from("/")
        } else {
            PathBuf::from(dir)
        };
    }
    Path::new(prefix)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Expands source file patterns into concrete paths.
///
/// Plain paths are passed through untouched so that a missing file is
/// reported by the caller. Glob patterns are matched against a
/// `.gitignore`-aware walk of their static prefix directory; matches are
/// sorted and deduplicated.
pub fn expand_source_globs(patterns: &[String]) -> Result<Vec<String>, String> {
    let (globs, literals): (Vec<&String>, Vec<&String>) =
        patterns.iter().partition(|p| has_glob_meta(p));

    let mut results: Vec<String> = literals.into_iter().cloned().collect();
    if globs.is_empty() {
        return Ok(results);
    }

    let mut builder = GlobSetBuilder::new();
    for pattern in &globs {
        let glob = GlobBuilder::new(pattern.trim_start_matches("./"))
            .literal_separator(true)
            .build()
            .map_err(|e| format!("Invalid glob pattern '{}': {}", pattern, e))?;
        builder.add(glob);
    }
    let set = builder
        .build()
        .map_err(|e| format!("Failed to build glob set: {}", e))?;

    let mut roots: Vec<PathBuf> = Vec::new();
    for pattern in &globs {
        let root = walk_root(pattern);
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    let mut matched: Vec<String> = roots
        .par_iter()
        .flat_map_iter(|root| {
            WalkBuilder::new(root)
                .hidden(false)
                .git_ignore(true)
                .git_exclude(true)
                .parents(true)
                .build()
                .filter_map(Result::ok)
                .filter(|entry| entry.file_type().is_some_and(|t| t.is_file()))
                .map(|entry| entry.path().to_string_lossy().to_string())
                .filter(|path| set.is_match(path.trim_start_matches("./")))
                .collect::<Vec<_>>()
        })
        .collect();
    matched.sort();
    results.extend(matched);

    let mut seen: HashSet<String> = HashSet::new();
    results.retain(|path| seen.insert(path.clone()));
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_root() {
        assert_eq!(walk_root("Sources/**/*.m"), PathBuf::from("Sources"));
        assert_eq!(walk_root("*.m"), PathBuf::from("."));
        assert_eq!(walk_root("App/View*.swift"), PathBuf::from("App"));
    }

    #[test]
    fn test_literals_pass_through() {
        let inputs = vec!["Missing.m".to_string(), "Other.m".to_string()];
        assert_eq!(expand_source_globs(&inputs).unwrap(), inputs);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = expand_source_globs(&["Sources/[.m".to_string()]).unwrap_err();
        assert!(err.contains("Invalid glob pattern"));
    }
}
