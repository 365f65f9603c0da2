//! Interactive input picker for `approval batch`.
//!
//! Lists `*.csv` files under the working directory, marks the ones whose
//! header carries both required columns, and accepts a number or a path.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{AppError, EXIT_ARTIFACT};

/// Directory recursion depth for finding CSV files.
const SEARCH_DEPTH: usize = 3;

/// Prompt the user to choose a batch input file.
pub fn prompt_for_input(required: &[&str]) -> Result<PathBuf, AppError> {
    let files = discover_csv_files(Path::new("."));
    if files.is_empty() {
        return Err(AppError::new(
            EXIT_ARTIFACT,
            "No .csv files found. Provide one with `approval batch -i <file.csv>`.",
        ));
    }

    println!("Found {} CSV file(s):", files.len());
    for (idx, path) in files.iter().enumerate() {
        let mark = if has_columns(path, required) { "" } else { "  (missing columns)" };
        println!("{:>3}) {}{mark}", idx + 1, pretty_path(path));
    }

    loop {
        print!("Select a file by number (1-{}) or type a path (q to quit): ", files.len());
        io::stdout()
            .flush()
            .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to write prompt: {e}")))?;

        let mut input = String::new();
        let bytes = io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::new(EXIT_ARTIFACT, format!("Failed to read input: {e}")))?;
        if bytes == 0 {
            return Err(AppError::new(EXIT_ARTIFACT, "No input received."));
        }

        let input = input.trim();
        if input.eq_ignore_ascii_case("q") {
            return Err(AppError::new(EXIT_ARTIFACT, "Canceled."));
        }

        let candidate = match input.parse::<usize>() {
            Ok(choice) if (1..=files.len()).contains(&choice) => files[choice - 1].clone(),
            Ok(choice) => {
                println!("Invalid choice: {choice}. Enter a number between 1 and {}.", files.len());
                continue;
            }
            Err(_) => PathBuf::from(input),
        };

        match validate_csv_path(&candidate) {
            Ok(path) => return Ok(path),
            Err(err) => println!("{err}"),
        }
    }
}

/// Validate that `path` points to an existing `.csv` file.
pub fn validate_csv_path(path: &Path) -> Result<PathBuf, AppError> {
    if !path.is_file() {
        return Err(AppError::new(
            EXIT_ARTIFACT,
            format!("CSV file not found: {}", path.display()),
        ));
    }
    if !is_csv(path) {
        return Err(AppError::new(
            EXIT_ARTIFACT,
            format!("Expected a .csv file (got: {}).", path.display()),
        ));
    }
    Ok(path.to_path_buf())
}

/// Whether the CSV header names every column in `required`.
pub fn has_columns(path: &Path, required: &[&str]) -> bool {
    let Ok(mut reader) = csv::Reader::from_path(path) else {
        return false;
    };
    let Ok(headers) = reader.headers() else {
        return false;
    };
    required
        .iter()
        .all(|col| headers.iter().any(|h| h.trim() == *col))
}

/// `*.csv` files under `root` in deterministic order.
pub fn discover_csv_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    walk(root, 0, &mut out);
    out.sort_by_key(|p| pretty_path(p));
    out
}

fn walk(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > SEARCH_DEPTH {
        return;
    }
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");
            if !matches!(name, ".git" | "target" | "node_modules" | "debug") {
                walk(&path, depth + 1, out);
            }
        } else if file_type.is_file() && is_csv(&path) {
            out.push(path);
        }
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

fn pretty_path(path: &Path) -> String {
    path.strip_prefix("./").unwrap_or(path).display().to_string()
}
