//! Main processor that replaces icon markers across a directory of HTML files.
//!
//! Files are rewritten with `lol_html`, which matches markers anywhere in the
//! token stream, template content included. Only the marker elements change; every
//! other byte of the file is written back as it was read. Each marker's icon is
//! built by [`IconReplacer`] on a one-element document.

use crate::dom::Namespace;
use crate::html::{outer_html, parse_document};
use crate::icons::{IconRegistry, RegistryError};
use crate::replace::{CreateIconsOptions, DEFAULT_NAME_ATTR, IconReplacer, ReplaceStats};
use indexmap::IndexMap;
use indicatif::{ProgressBar, ProgressStyle};
use lol_html::html_content::{ContentType, Element, EndTag};
use lol_html::{ElementContentHandlers, HandlerResult, RewriteStrSettings, Selector, rewrite_str};
use rayon::prelude::*;
use std::borrow::Cow;
use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Options for the processor.
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input directory containing HTML files.
    pub input_dir: PathBuf,
    /// Output directory (if None, modifies in place).
    pub output_dir: Option<PathBuf>,
    /// JSON icon registry.
    pub icons_path: PathBuf,
    /// Attribute identifying icon markers.
    pub name_attr: String,
    /// Extra attributes for every generated `<svg>`.
    pub attrs: IndexMap<String, String>,
    /// Whether to show verbose output.
    pub verbose: bool,
}

impl ProcessOptions {
    pub fn new(input_dir: impl Into<PathBuf>, icons_path: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: None,
            icons_path: icons_path.into(),
            name_attr: DEFAULT_NAME_ATTR.to_string(),
            attrs: IndexMap::new(),
            verbose: false,
        }
    }
}

/// Statistics from processing.
#[derive(Debug, Default)]
pub struct ProcessorStats {
    /// Number of HTML files processed.
    pub files_processed: usize,
    /// Number of HTML files rewritten.
    pub files_modified: usize,
    /// Number of markers replaced with inline SVG.
    pub icons_replaced: usize,
    /// Number of markers left in place.
    pub markers_skipped: usize,
    /// Icon names that were not in the registry.
    pub unknown_icons: Vec<String>,
    /// Total bytes read from input HTML files.
    pub bytes_input: u64,
    /// Total bytes written to output HTML files.
    pub bytes_output: u64,
    /// Time spent processing HTML files (excludes clone time).
    pub process_duration: Duration,
}

impl ProcessorStats {
    /// Calculate HTML inflation ratio (output / input).
    pub fn html_inflation_ratio(&self) -> f64 {
        if self.bytes_input == 0 {
            1.0
        } else {
            self.bytes_output as f64 / self.bytes_input as f64
        }
    }

    /// Calculate processing throughput in MB/s (excludes clone time).
    pub fn throughput_mb_s(&self) -> f64 {
        let secs = self.process_duration.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            (self.bytes_input as f64 / (1024.0 * 1024.0)) / secs
        }
    }
}

/// Processor for a directory of HTML files.
pub struct Processor {
    options: ProcessOptions,
}

impl Processor {
    /// Create a new processor with the given options.
    pub fn new(options: ProcessOptions) -> Self {
        Self { options }
    }

    /// Process the input directory.
    pub fn process(&mut self) -> Result<ProcessorStats, ProcessError> {
        let selector = marker_selector(&self.options.name_attr);
        let _: Selector = selector.parse()?;

        let icons = IconRegistry::from_path(&self.options.icons_path)?;
        debug!(
            icons = icons.len(),
            path = %self.options.icons_path.display(),
            "loaded icon registry"
        );

        // Determine the actual output directory
        let output_dir = self
            .options
            .output_dir
            .as_ref()
            .unwrap_or(&self.options.input_dir);

        // If output_dir is different from input_dir, copy everything first
        if let Some(ref out) = self.options.output_dir
            && out != &self.options.input_dir
        {
            // Remove output directory if it exists (clean slate)
            if out.exists() {
                fs::remove_dir_all(out)?;
            }

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                spinner.set_style(style);
            }
            spinner.set_message("Cloning directory tree...");
            spinner.enable_steady_tick(Duration::from_millis(80));

            clonetree::clone_tree(&self.options.input_dir, out, &clonetree::Options::new())
                .map_err(|e| ProcessError::Clone(e.to_string()))?;

            spinner.finish_with_message("Clone complete");
        }

        let html_files: Vec<PathBuf> = WalkDir::new(output_dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
            .map(|e| e.path().to_path_buf())
            .collect();

        let mut options = CreateIconsOptions::new(&icons).name_attr(self.options.name_attr.clone());
        options.attrs = self.options.attrs.clone();
        let replacer = IconReplacer::new(options);

        let progress = ProgressBar::new(html_files.len() as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
        {
            progress.set_style(style.progress_chars("█▉▊▋▌▍▎▏  "));
        }

        let process_start = Instant::now();

        // Atomic counters for parallel aggregation
        let files_processed = AtomicUsize::new(0);
        let files_modified = AtomicUsize::new(0);
        let icons_replaced = AtomicUsize::new(0);
        let markers_skipped = AtomicUsize::new(0);
        let bytes_input = AtomicUsize::new(0);
        let bytes_output = AtomicUsize::new(0);
        let unknown_icons = Mutex::new(Vec::<String>::new());

        let verbose = self.options.verbose;

        html_files.par_iter().for_each(|path| {
            if verbose {
                progress.println(format!("Processing: {}", path.display()));
            }

            match Self::process_html_file(path, &replacer, &selector) {
                Ok((result, input_size, output_size)) => {
                    files_processed.fetch_add(1, Ordering::Relaxed);
                    if result.icons_replaced > 0 {
                        files_modified.fetch_add(1, Ordering::Relaxed);
                    }
                    icons_replaced.fetch_add(result.icons_replaced, Ordering::Relaxed);
                    markers_skipped.fetch_add(result.markers_skipped(), Ordering::Relaxed);
                    bytes_input.fetch_add(input_size, Ordering::Relaxed);
                    bytes_output.fetch_add(output_size, Ordering::Relaxed);

                    if !result.unknown_icons.is_empty() {
                        let mut names = unknown_icons.lock().unwrap_or_else(|e| e.into_inner());
                        for name in result.unknown_icons {
                            if !names.contains(&name) {
                                names.push(name);
                            }
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to process file");
                    progress.println(format!(
                        "Warning: Failed to process {}: {}",
                        path.display(),
                        e
                    ));
                }
            }
            progress.inc(1);
        });

        let process_duration = process_start.elapsed();
        progress.finish_and_clear();

        let mut unknown_icons = unknown_icons.into_inner().unwrap_or_else(|e| e.into_inner());
        unknown_icons.sort();

        Ok(ProcessorStats {
            files_processed: files_processed.load(Ordering::Relaxed),
            files_modified: files_modified.load(Ordering::Relaxed),
            icons_replaced: icons_replaced.load(Ordering::Relaxed),
            markers_skipped: markers_skipped.load(Ordering::Relaxed),
            unknown_icons,
            bytes_input: bytes_input.load(Ordering::Relaxed) as u64,
            bytes_output: bytes_output.load(Ordering::Relaxed) as u64,
            process_duration,
        })
    }

    /// Process a single HTML file, returning (result, input_bytes, output_bytes).
    fn process_html_file(
        path: &Path,
        replacer: &IconReplacer<'_>,
        selector: &str,
    ) -> Result<(ReplaceStats, usize, usize), ProcessError> {
        let html = fs::read_to_string(path)?;
        let input_size = html.len();

        // Quick check: skip lol_html parsing if the name attribute never appears
        if !html.contains(replacer.options().name_attr.as_str()) {
            return Ok((ReplaceStats::default(), input_size, input_size));
        }

        let (transformed, result) = Self::transform_html(&html, replacer, selector)?;

        // Only write if we actually changed something
        if result.icons_replaced == 0 {
            return Ok((result, input_size, input_size));
        }

        let output_size = transformed.len();
        fs::write(path, &transformed)?;
        debug!(
            path = %path.display(),
            replaced = result.icons_replaced,
            "rewrote file"
        );

        Ok((result, input_size, output_size))
    }

    /// Swap every resolvable marker in `html` for its icon, leaving the rest untouched.
    fn transform_html(
        html: &str,
        replacer: &IconReplacer<'_>,
        selector: &str,
    ) -> Result<(String, ReplaceStats), ProcessError> {
        let mut result = ReplaceStats::default();
        // Replaced markers whose end tag has not been seen yet.
        let open = Rc::new(Cell::new(0usize));

        let handler = |el: &mut Element<'_, '_>| -> HandlerResult {
            // Content of a replaced marker is dropped, markers inside it included.
            if open.get() > 0 || el.tag_name() == "svg" {
                return Ok(());
            }

            let attrs: Vec<(String, String)> = el
                .attributes()
                .iter()
                .map(|attr| (attr.name(), attr.value()))
                .collect();
            let (svg, marker) = render_marker(replacer, &attrs)?;

            result.markers_found += marker.markers_found;
            result.icons_replaced += marker.icons_replaced;
            for name in marker.unknown_icons {
                if !result.unknown_icons.contains(&name) {
                    result.unknown_icons.push(name);
                }
            }

            if let Some(svg) = svg {
                el.replace(&svg, ContentType::Html);
                if let Some(handlers) = el.end_tag_handlers() {
                    let open = Rc::clone(&open);
                    open.set(open.get() + 1);
                    handlers.push(Box::new(move |_end: &mut EndTag<'_>| {
                        open.set(open.get() - 1);
                        Ok(())
                    }));
                }
            }
            Ok(())
        };

        let transformed = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![(
                    Cow::Owned(selector.parse::<Selector>()?),
                    ElementContentHandlers::default().element(handler),
                )],
                ..RewriteStrSettings::new()
            },
        )?;

        Ok((transformed, result))
    }
}

/// CSS selector matching elements that carry `name_attr`.
fn marker_selector(name_attr: &str) -> String {
    format!("[{name_attr}]")
}

/// The icon for a marker with these attributes, plus what the replacement pass saw.
///
/// `lol_html` hands out attribute values as written in the source, entities and
/// all. The marker is re-parsed as a lone `<span>` so its values are decoded
/// exactly once before [`IconReplacer`] copies them onto the `<svg>`.
fn render_marker(
    replacer: &IconReplacer<'_>,
    attrs: &[(String, String)],
) -> Result<(Option<String>, ReplaceStats), ProcessError> {
    let mut markup = String::from("<span");
    for (name, value) in attrs {
        markup.push_str(&format!(" {name}=\"{}\"", value.replace('"', "&quot;")));
    }
    markup.push_str("></span>");

    let mut document = parse_document(&markup);
    let stats = replacer.run(&mut document);
    if stats.icons_replaced == 0 {
        return Ok((None, stats));
    }

    let svg = document
        .find_element(document.root(), |el| el.is(Namespace::Svg, "svg"))
        .map(|svg| outer_html(&document, svg))
        .transpose()?;
    Ok((svg, stats))
}

/// Errors that can occur during processing.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
    #[error("Clone error: {0}")]
    Clone(String),
    #[error("Invalid marker attribute: {0}")]
    Selector(#[from] lol_html::errors::SelectorError),
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] lol_html::errors::RewritingError),
}
