use std::path::{Path, PathBuf};
use std::process::Command;

const MAX_LINES: usize = 750;

const CHECKED_EXTENSIONS: &[&str] = &["rs", "yaml"];

/// Only the crate's own sources are policed.
const CHECKED_ROOTS: &[&str] = &["src", "workflow.yaml"];

const EXCLUDED_DIRS: &[&str] = &["target", ".git"];

type Violations = Vec<(PathBuf, Vec<(usize, String)>)>;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/main");
    println!("cargo:rerun-if-changed=.git/packed-refs");

    let sha = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                String::from_utf8(output.stdout)
                    .ok()
                    .map(|s| s.trim().to_string())
            } else {
                None
            }
        })
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=TRACE_AUTOGEN_GIT_SHA={}", sha);

    let root = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR must be set"));
    let files = collect_files_to_check(&root);
    for file in &files {
        println!("cargo:rerun-if-changed={}", file.display());
    }
    let rust_files: Vec<PathBuf> = files
        .iter()
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("rs"))
        .cloned()
        .collect();

    enforce_line_limits(&root, &files);
    enforce_no_dead_code_allows(&root, &rust_files);
    enforce_no_test_skips(&root, &rust_files);
    enforce_serial_for_env_mutations(&root, &rust_files);
}

fn collect_files_to_check(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in CHECKED_ROOTS {
        let path = root.join(entry);
        if path.is_dir() {
            walk_directory(&path, &mut files);
        } else if should_check_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn walk_directory(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if EXCLUDED_DIRS.contains(&name) {
                    continue;
                }
            }
            walk_directory(&path, files);
        } else if should_check_file(&path) {
            files.push(path);
        }
    }
}

fn should_check_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| CHECKED_EXTENSIONS.contains(&ext))
}

fn relative(root: &Path, file: &Path) -> PathBuf {
    file.strip_prefix(root).unwrap_or(file).to_path_buf()
}

fn count_non_empty_lines(content: &str) -> usize {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .count()
}

fn enforce_line_limits(root: &Path, files: &[PathBuf]) {
    let mut violations = Vec::new();
    for file in files {
        match std::fs::read_to_string(file) {
            Ok(content) => {
                let line_count = count_non_empty_lines(&content);
                if line_count > MAX_LINES {
                    violations.push((relative(root, file), line_count));
                }
            }
            Err(e) => println!(
                "cargo:warning=Could not read file {}: {}",
                relative(root, file).display(),
                e
            ),
        }
    }

    if !violations.is_empty() {
        eprintln!("\n========================================");
        eprintln!("FILE LINE LIMIT EXCEEDED (max {} lines)", MAX_LINES);
        eprintln!("========================================");
        for (path, lines) in &violations {
            eprintln!(
                "  {} - {} lines (exceeds by {})",
                path.display(),
                lines,
                lines - MAX_LINES
            );
        }
        eprintln!("========================================\n");
        eprintln!("Please split these files into smaller modules.\n");
        panic!(
            "Build failed: {} file(s) exceed the {} line limit",
            violations.len(),
            MAX_LINES
        );
    }
}

fn report(root: &Path, title: &str, violations: &Violations, advice: &[&str]) -> usize {
    let total: usize = violations.iter().map(|(_, v)| v.len()).sum();
    if total == 0 {
        return 0;
    }
    eprintln!("\n========================================");
    eprintln!("{}", title);
    eprintln!("========================================");
    eprintln!();
    for (path, lines) in violations {
        for (line_num, message) in lines {
            eprintln!("  {}:{}", relative(root, path).display(), line_num);
            eprintln!("    {}", message.trim());
            eprintln!();
        }
    }
    eprintln!("========================================");
    for line in advice {
        eprintln!("{}", line);
    }
    eprintln!("========================================\n");
    total
}

fn enforce_no_dead_code_allows(root: &Path, rust_files: &[PathBuf]) {
    let mut violations: Violations = Vec::new();

    for file in rust_files {
        if let Ok(content) = std::fs::read_to_string(file) {
            let file_violations: Vec<(usize, String)> = content
                .lines()
                .enumerate()
                .filter(|(_, line)| {
                    let trimmed = line.trim();
                    (trimmed.starts_with("#[allow(") || trimmed.starts_with("#![allow("))
                        && trimmed.contains("dead_code")
                })
                .map(|(i, line)| (i + 1, line.to_string()))
                .collect();
            if !file_violations.is_empty() {
                violations.push((file.clone(), file_violations));
            }
        }
    }

    let total = report(
        root,
        "#[allow(dead_code)] IS NOT ALLOWED",
        &violations,
        &[
            "Delete unused code instead of silencing the warning.",
            "Test-only helpers belong behind #[cfg(test)].",
        ],
    );
    if total > 0 {
        panic!(
            "Build failed: {} #[allow(dead_code)] occurrence(s) found. Remove the dead code.",
            total
        );
    }
}

/// A test function body located by [`scan_test_functions`].
struct TestFn<'a> {
    name: String,
    start_line: usize,
    has_serial: bool,
    body: Vec<(&'a str, usize)>,
}

/// Finds `#[test]` / `#[tokio::test]` functions and the lines of their
/// bodies, each paired with the brace depth at the end of that line.
fn scan_test_functions(content: &str) -> Vec<TestFn<'_>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut found = Vec::new();
    let mut pending_serial = false;
    let mut current: Option<TestFn> = None;
    let mut depth: i32 = 0;
    let mut opened = false;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
            pending_serial = true;
        }

        if current.is_none() && (trimmed == "#[test]" || trimmed.starts_with("#[tokio::test")) {
            let name = lines
                .iter()
                .skip(i + 1)
                .take(4)
                .find_map(|l| {
                    let after = l.split_once("fn ")?.1;
                    Some(after.split('(').next().unwrap_or(after).trim().to_string())
                })
                .unwrap_or_default();
            current = Some(TestFn {
                name,
                start_line: i + 1,
                has_serial: pending_serial,
                body: Vec::new(),
            });
            depth = 0;
            opened = false;
            continue;
        }

        if let Some(ref mut test_fn) = current {
            if trimmed == "#[serial]" || trimmed == "#[serial_test::serial]" {
                test_fn.has_serial = true;
            }
            for c in line.chars() {
                match c {
                    '{' => {
                        depth += 1;
                        opened = true;
                    }
                    '}' => depth -= 1,
                    _ => {}
                }
            }
            test_fn.body.push((*line, depth.max(0) as usize));
            if opened && depth <= 0 {
                if let Some(done) = current.take() {
                    found.push(done);
                }
                pending_serial = false;
            }
        }
    }
    found
}

/// Bans tests that silently skip instead of failing.
fn enforce_no_test_skips(root: &Path, rust_files: &[PathBuf]) {
    let skip_patterns = ["Skipping test", "skipping test", "Test skipped", "test skipped"];
    let mut violations: Violations = Vec::new();

    for file in rust_files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        let mut file_violations = Vec::new();
        for test_fn in scan_test_functions(&content) {
            let skipped = test_fn.body.iter().find_map(|(line, depth)| {
                if let Some(pattern) = skip_patterns.iter().find(|p| line.contains(*p)) {
                    return Some(format!("contains skip pattern: {}", pattern));
                }
                // An early return inside a nested block is a conditional skip.
                (line.trim() == "return;" && *depth > 1)
                    .then(|| "has conditional early return (silent skip)".to_string())
            });
            if let Some(reason) = skipped {
                file_violations.push((test_fn.start_line, format!("test `{}` {}", test_fn.name, reason)));
            }
        }
        if !file_violations.is_empty() {
            violations.push((file.clone(), file_violations));
        }
    }

    let total = report(
        root,
        "SILENT TEST SKIPS ARE NOT ALLOWED",
        &violations,
        &[
            "Tests must FAIL if they cannot run, not silently pass.",
            "Use assert!() to verify preconditions, or #[ignore] with a reason.",
        ],
    );
    if total > 0 {
        panic!(
            "Build failed: {} silent test skip(s) found. Make tests fail instead of skip.",
            total
        );
    }
}

/// Requires #[serial] for tests that mutate environment variables.
fn enforce_serial_for_env_mutations(root: &Path, rust_files: &[PathBuf]) {
    let mut violations: Violations = Vec::new();

    for file in rust_files {
        let Ok(content) = std::fs::read_to_string(file) else {
            continue;
        };
        let file_violations: Vec<(usize, String)> = scan_test_functions(&content)
            .into_iter()
            .filter(|test_fn| {
                !test_fn.has_serial
                    && test_fn.body.iter().any(|(line, _)| {
                        let trimmed = line.trim();
                        !trimmed.starts_with("//")
                            && (trimmed.contains("env::set_var") || trimmed.contains("env::remove_var"))
                    })
            })
            .map(|test_fn| {
                (
                    test_fn.start_line,
                    format!("test `{}` mutates env without #[serial]", test_fn.name),
                )
            })
            .collect();
        if !file_violations.is_empty() {
            violations.push((file.clone(), file_violations));
        }
    }

    let total = report(
        root,
        "ENV MUTATIONS REQUIRE #[serial]",
        &violations,
        &[
            "Tests that call std::env::set_var or std::env::remove_var",
            "modify global state and race when run in parallel.",
            "Add #[serial] from the serial_test crate.",
        ],
    );
    if total > 0 {
        panic!(
            "Build failed: {} test(s) mutate env vars without #[serial].",
            total
        );
    }
}
