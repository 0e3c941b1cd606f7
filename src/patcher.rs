//! # Patcher Logic
//!
//! This module contains the core business logic for vcxpatch. It is responsible for:
//! 1. The three fixed text rewrites applied to each project file (`PatchRules`).
//! 2. Driving the sequential read-transform-write cycle over the discovered
//!    candidates (`run_patch`).
//! 3. The report-only health check (`doctor`).
//!
//! The rewrites are deliberately pure text substitutions. Project files are never
//! parsed as XML; the consuming build toolchain is sensitive to attribute order
//! and whitespace, and a parse-mutate-serialize round trip does not guarantee
//! either. The trade-off is that only the exact tag spellings below are patched.

use std::path::PathBuf;
use anyhow::Result;
use lazy_static::lazy_static;
use log::{debug, info};
use regex::{Captures, Regex};
use crate::discovery::Candidate;
use crate::invariant_ppt::assert_invariant;
use crate::system::FileOps;

lazy_static! {
    /// A bare `<PropertyGroup>` block: opening tag, any number of lines, closing
    /// tag followed by a newline. Lazy repetition keeps the match per-block, so
    /// text between two blocks survives. Attributed openings
    /// (`<PropertyGroup Label=...>`) are intentionally not matched.
    static ref PROPERTY_GROUP: Regex =
        Regex::new(r"<PropertyGroup>(?:\n.*?)*?</PropertyGroup>\n").unwrap();

    /// The bare compile-options opening tag. File items
    /// (`<ClCompile Include=...>`) carry attributes and never match.
    static ref CL_COMPILE_OPEN: Regex = Regex::new("<ClCompile>").unwrap();

    /// A Windows target platform version element with its current content.
    static ref WINDOWS_TARGET: Regex = Regex::new(
        r"(<WindowsTargetPlatformVersion>)(.*)(</WindowsTargetPlatformVersion>)"
    )
    .unwrap();
}

/// The three substitutions, configured once per run.
///
/// The patterns themselves are fixed for the process lifetime; only the injected
/// standard and the pinned version vary with the command line.
pub struct PatchRules {
    standard_element: String,
    platform_version: String,
}

impl PatchRules {
    pub fn new(standard: &str, platform_version: &str) -> Self {
        Self {
            standard_element: format!("<LanguageStandard>{}</LanguageStandard>", standard),
            platform_version: platform_version.to_string(),
        }
    }

    /// Step 1: delete every bare property-group block.
    pub fn strip_property_groups(&self, text: &str) -> String {
        PROPERTY_GROUP.replace_all(text, "").into_owned()
    }

    /// Step 2: insert the language-standard element on its own six-space-indented
    /// line directly after every compile-options opening tag.
    ///
    /// Every occurrence is patched independently; a file with one `<ClCompile>`
    /// section per build configuration gets one element per section.
    pub fn inject_language_standard(&self, text: &str) -> String {
        CL_COMPILE_OPEN
            .replace_all(text, |_: &Captures| {
                format!("<ClCompile>\n      {}", self.standard_element)
            })
            .into_owned()
    }

    /// Step 3: rewrite the content of every Windows target platform version
    /// element to the pinned version, keeping the tags.
    pub fn pin_platform_version(&self, text: &str) -> String {
        WINDOWS_TARGET
            .replace_all(text, |caps: &Captures| {
                format!("{}{}{}", &caps[1], self.platform_version, &caps[3])
            })
            .into_owned()
    }

    /// Applies the three rewrites in their fixed order, each over the previous
    /// step's output. Stripping runs first so the standard is never injected
    /// into a block that is about to be deleted. A pattern with zero matches
    /// leaves its step as a no-op.
    pub fn apply(&self, text: &str) -> String {
        let text = self.strip_property_groups(text);
        let text = self.inject_language_standard(&text);
        let out = self.pin_platform_version(&text);

        assert_invariant(
            !PROPERTY_GROUP.is_match(&out),
            "patched text contains no property-group blocks",
            Some("Patcher"),
        );
        assert_invariant(
            WINDOWS_TARGET
                .captures_iter(&out)
                .all(|c| &c[2] == self.platform_version.as_str()),
            "patched text pins every target platform version",
            Some("Patcher"),
        );

        out
    }

    /// Read-only classification of one file's text, used by `doctor`.
    pub fn inspect(&self, text: &str) -> FileHealth {
        FileHealth {
            property_groups: PROPERTY_GROUP.find_iter(text).count(),
            compile_sections: CL_COMPILE_OPEN.find_iter(text).count(),
            language_standards: text.matches("<LanguageStandard>").count(),
            stale_versions: WINDOWS_TARGET
                .captures_iter(text)
                .filter(|c| &c[2] != self.platform_version.as_str())
                .count(),
        }
    }
}

/// What `doctor` found in one project file.
#[derive(Debug)]
pub struct FileHealth {
    /// Bare property-group blocks still present.
    pub property_groups: usize,
    /// Bare `<ClCompile>` opening tags.
    pub compile_sections: usize,
    /// `<LanguageStandard>` elements present.
    pub language_standards: usize,
    /// Target platform version elements whose content differs from the pin.
    pub stale_versions: usize,
}

impl FileHealth {
    /// True when a `patch` run would leave the file's patch targets satisfied.
    pub fn is_patched(&self) -> bool {
        self.property_groups == 0
            && self.stale_versions == 0
            && self.language_standards >= self.compile_sections
    }
}

/// Result of one patch run.
#[derive(Debug, Default)]
pub struct PatchSummary {
    /// Files rewritten (or, in a dry run, files that would be rewritten).
    pub patched: Vec<PathBuf>,
    /// Files whose transformed text already equals their current text.
    pub unchanged: Vec<PathBuf>,
}

/// Runs the read-transform-write cycle over every candidate, strictly in
/// traversal order. Each file's cycle completes before the next begins; file
/// contents never influence each other.
///
/// Any read, decode, or write failure aborts the run immediately. Files already
/// rewritten stay rewritten; there is no multi-file transaction and no rollback.
pub fn run_patch(
    candidates: &[Candidate],
    rules: &PatchRules,
    files: &impl FileOps,
    dry_run: bool,
) -> Result<PatchSummary> {
    let mut summary = PatchSummary::default();

    for candidate in candidates {
        let path = candidate.path();
        let content = files.read_text(&path)?;
        let patched = rules.apply(&content);

        if patched == content {
            debug!("Already up to date: {:?}", path);
            summary.unchanged.push(path);
            continue;
        }

        if dry_run {
            println!("--- DRY RUN: would rewrite {} ---", path.display());
        } else {
            files.write_text(&path, &patched)?;
            info!("Rewrote {:?}", path);
        }
        summary.patched.push(path);
    }

    Ok(summary)
}

/// Inspects every candidate and prints a health report. Never writes.
pub fn doctor(candidates: &[Candidate], rules: &PatchRules, files: &impl FileOps) -> Result<()> {
    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                  Project File Health Report");
    println!("═══════════════════════════════════════════════════════════════");
    println!();

    if candidates.is_empty() {
        println!("No matching project files found.");
        println!();
        return Ok(());
    }

    let mut needs_patch = 0;
    for candidate in candidates {
        let path = candidate.path();
        let content = files.read_text(&path)?;
        let health = rules.inspect(&content);

        println!("{}", path.display());
        if health.property_groups > 0 {
            println!("   ⚠ {} property group(s) still present", health.property_groups);
        }
        if health.stale_versions > 0 {
            println!(
                "   ⚠ {} target platform version(s) not pinned",
                health.stale_versions
            );
        }
        if health.compile_sections > health.language_standards {
            println!(
                "   ⚠ {} of {} compile section(s) missing a language standard",
                health.compile_sections - health.language_standards,
                health.compile_sections
            );
        }
        if health.compile_sections > 0 && health.language_standards > health.compile_sections {
            // Patching an already-patched file stacks another element per section.
            println!(
                "   ⚠ more language-standard elements than compile sections ({} vs {})",
                health.language_standards, health.compile_sections
            );
        }
        if health.is_patched() {
            println!("   ✓ patched");
        } else {
            needs_patch += 1;
        }
        println!();
    }

    println!("───────────────────────────────────────────────────────────────");
    if needs_patch == 0 {
        println!();
        println!("✓ All {} project file(s) are patched. No action needed.", candidates.len());
    } else {
        println!();
        println!(
            "{} of {} project file(s) need patching. Run 'vcxpatch patch' to fix.",
            needs_patch,
            candidates.len()
        );
    }
    println!();

    Ok(())
}
