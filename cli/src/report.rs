use std::path::{Path, PathBuf};

use renditioner_core::RenditionTarget;

/// One rendition written by a run.
pub struct RenditionResult {
    pub name: &'static str,
    pub path: PathBuf,
    pub size: Option<u64>,
}

/// What a run produced, read back from the output directory.
pub struct Report {
    pub source_size: u64,
    pub results: Vec<RenditionResult>,
}

impl Report {
    pub fn new(source_size: u64) -> Self {
        Self {
            source_size,
            results: Vec::new(),
        }
    }

    /// Stat every planned output under `output_root`.
    pub fn collect(source_size: u64, output_root: &Path, targets: &[RenditionTarget]) -> Self {
        let mut report = Self::new(source_size);
        for target in targets {
            let path = output_root.join(&target.output_path);
            let size = std::fs::metadata(&path).ok().map(|m| m.len());
            report.add(RenditionResult {
                name: target.name,
                path,
                size,
            });
        }
        report
    }

    pub fn add(&mut self, result: RenditionResult) {
        self.results.push(result);
    }

    pub fn total_written(&self) -> u64 {
        self.results.iter().filter_map(|r| r.size).sum()
    }

    pub fn print_summary(&self) {
        println!("\n--- Summary ---");
        println!("Source: {}", format_size(self.source_size));
        for r in &self.results {
            match r.size {
                Some(size) => println!("  {:<8} {} ({})", r.name, r.path.display(), format_size(size)),
                None => println!("  {:<8} {} (missing)", r.name, r.path.display()),
            }
        }
        println!("Total written: {}", format_size(self.total_written()));
    }
}

/// Print the plan for a dry run or the `plan` subcommand.
pub fn print_plan(targets: &[RenditionTarget]) {
    for t in targets {
        if t.is_passthrough {
            println!("  {:<8} → {} (copy of source)", t.name, t.output_path);
        } else {
            println!(
                "  {:<8} → {} ({} px wide, JPEG q{})",
                t.name, t.output_path, t.width, t.quality
            );
        }
    }
}

pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
