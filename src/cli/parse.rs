//! Parsers for the ai-services CLI's human-oriented output.
//!
//! Each parser is a pure function from the combined CLI output to a record.
//! They never fail: unrecognised lines are skipped and missing values fall
//! back to documented defaults. `raw_output` always carries the input.

use serde::{Deserialize, Serialize};

/// Value used for version fields the output did not mention.
pub const UNKNOWN: &str = "unknown";

const TEMPLATES_BANNER: &str = "available application templates";
const IMAGES_BANNER: &str = "Container images for application template";
const ENTRY_PREFIX: &str = "- ";

/// Parsed output of `ai-services version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_commit: String,
    pub build_date: Option<String>,
    pub raw_output: String,
}

/// Parsed output of `ai-services application templates`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateList {
    pub count: usize,
    pub templates: Vec<String>,
    pub raw_output: String,
}

/// Parsed output of `ai-services application image list --template <name>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageList {
    /// The template name as supplied by the caller.
    pub template: String,
    pub count: usize,
    pub images: Vec<String>,
    pub raw_output: String,
}

/// Parse `Version:`, `GitCommit:` and `BuildDate:` lines, in any order and case.
///
/// A label with an empty value leaves the previous value in place.
#[must_use]
pub fn parse_version(output: &str) -> VersionInfo {
    let mut version = UNKNOWN.to_string();
    let mut git_commit = UNKNOWN.to_string();
    let mut build_date = None;

    for line in output.lines().map(str::trim) {
        if let Some(value) = labelled_value(line, "version:") {
            version = value.to_string();
        } else if let Some(value) = labelled_value(line, "gitcommit:") {
            git_commit = value.to_string();
        } else if let Some(value) = labelled_value(line, "builddate:") {
            build_date = Some(value.to_string());
        }
    }

    VersionInfo {
        version,
        git_commit,
        build_date,
        raw_output: output.to_string(),
    }
}

/// Parse the `- <name>` entries following the "Available application templates" banner.
#[must_use]
pub fn parse_templates(output: &str) -> TemplateList {
    let templates = scan_list(output, |line| {
        starts_with_ignore_ascii_case(line, TEMPLATES_BANNER)
    });

    TemplateList {
        count: templates.len(),
        templates,
        raw_output: output.to_string(),
    }
}

/// Parse the `- <image>` entries following the "Container images for application template" banner.
#[must_use]
pub fn parse_images(template: &str, output: &str) -> ImageList {
    let images = scan_list(output, |line| line.starts_with(IMAGES_BANNER));

    ImageList {
        template: template.to_string(),
        count: images.len(),
        images,
        raw_output: output.to_string(),
    }
}

/// Collect `- ` entries after the first trigger line.
///
/// Lines without the prefix inside the list are skipped rather than ending
/// it; the scan always runs to the end of the output.
fn scan_list(output: &str, is_trigger: impl Fn(&str) -> bool) -> Vec<String> {
    let mut entries = Vec::new();
    let mut in_list = false;

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if is_trigger(line) {
            in_list = true;
            continue;
        }
        if !in_list {
            continue;
        }
        if let Some(entry) = line.strip_prefix(ENTRY_PREFIX) {
            let entry = entry.trim();
            if !entry.is_empty() {
                entries.push(entry.to_string());
            }
        }
    }

    entries
}

/// The trimmed, non-empty text after a case-insensitive `label`.
fn labelled_value<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    if !starts_with_ignore_ascii_case(line, label) {
        return None;
    }
    Some(line[label.len()..].trim()).filter(|v| !v.is_empty())
}

fn starts_with_ignore_ascii_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
