//! Hygiene: production sources under `src/` must not contain panicking or
//! error-swallowing constructs. Budgets only ever go down.

use std::fs;
use std::path::{Path, PathBuf};

/// `(pattern, budget, why)`.
const PANIC_BUDGETS: &[(&str, usize, &str)] = &[
    (".unwrap()", 0, "propagate with `?` or handle the None/Err case"),
    (".expect(", 0, "propagate with `?` or handle the None/Err case"),
    ("panic!(", 0, "return an error instead"),
    ("unreachable!(", 0, "make the state unrepresentable"),
    ("todo!(", 0, "finish the stub"),
    ("unimplemented!(", 0, "finish the stub"),
];

const DISCARD_BUDGETS: &[(&str, usize, &str)] = &[
    ("let _ =", 0, "inspect the result"),
    // Env lookups and numeric cfg/env values that fall back to defaults.
    (".ok()", 4, "inspect the error before dropping it"),
    (".unwrap_or_default()", 6, "decide what a missing value means"),
];

const STYLE_BUDGETS: &[(&str, usize, &str)] = &[("#[allow(dead_code)]", 0, "delete unused code")];

fn production_files() -> Vec<(PathBuf, String)> {
    let mut out = Vec::new();
    walk(Path::new("src"), &mut out);
    out
}

fn walk(dir: &Path, out: &mut Vec<(PathBuf, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
            continue;
        }
        let is_rs = path.extension().is_some_and(|e| e == "rs");
        let is_test = path.to_string_lossy().ends_with("_test.rs");
        if is_rs && !is_test {
            if let Ok(content) = fs::read_to_string(&path) {
                out.push((path, production_part(&content)));
            }
        }
    }
}

/// Inline `mod tests` blocks sit at the end of a file and may unwrap freely.
fn production_part(content: &str) -> String {
    match content.find("#[cfg(test)]\nmod tests {") {
        Some(at) => content[..at].to_owned(),
        None => content.to_owned(),
    }
}

fn check(budgets: &[(&str, usize, &str)]) {
    let files = production_files();
    assert!(!files.is_empty(), "no sources found under src/");

    let mut failures = Vec::new();
    for (pattern, budget, why) in budgets {
        let hits: Vec<String> = files
            .iter()
            .filter_map(|(path, content)| {
                let n = content.lines().filter(|l| l.contains(pattern)).count();
                (n > 0).then(|| format!("  {}: {n}", path.display()))
            })
            .collect();
        let count: usize = hits
            .iter()
            .filter_map(|h| h.rsplit(": ").next())
            .filter_map(|n| n.parse::<usize>().ok())
            .sum();
        if count > *budget {
            failures.push(format!("`{pattern}` found {count}, budget {budget} ({why})\n{}", hits.join("\n")));
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n\n"));
}

#[test]
fn no_panicking_constructs() {
    check(PANIC_BUDGETS);
}

#[test]
fn no_silent_discards() {
    check(DISCARD_BUDGETS);
}

#[test]
fn no_dead_code_allowances() {
    check(STYLE_BUDGETS);
}
