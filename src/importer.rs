/*!
 * Bulk import of community translation packs into the cache.
 *
 * A pack ships one language file per unit and locale under
 * `assets/<unit>/.../<locale>.json`. For every unit that has both the source
 * and the target locale, the keys present in both files give
 * `source text -> translated text` pairs.
 */

use log::{debug, info, warn};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;
use walkdir::WalkDir;

use crate::database::{Repository, TranslationEntry};
use crate::errors::ImportError;

/// Where the pack comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportSource {
    /// Zip archive on disk
    Archive(PathBuf),
    /// Already unpacked archive
    Directory(PathBuf),
    /// Zip archive to download
    Url(String),
}

impl ImportSource {
    /// Classify a command-line argument
    pub fn parse(source: &str) -> Self {
        if source.starts_with("http://") || source.starts_with("https://") {
            return Self::Url(source.to_string());
        }

        let path = PathBuf::from(source);
        if path.is_dir() {
            Self::Directory(path)
        } else {
            Self::Archive(path)
        }
    }
}

impl std::fmt::Display for ImportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Archive(path) | Self::Directory(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{}", url),
        }
    }
}

/// Import settings
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Locale of the source strings, e.g. `en_us`
    pub source_locale: String,
    /// Locale of the translations, e.g. `zh_cn`
    pub target_locale: String,
    /// Clear the cache before writing
    pub fresh: bool,
    /// Timeout for downloading a remote archive
    pub download_timeout_secs: u64,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            source_locale: "en_us".to_string(),
            target_locale: "zh_cn".to_string(),
            fresh: false,
            download_timeout_secs: 300,
        }
    }
}

/// Summary of one import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Language files that were read successfully
    pub files_read: usize,
    /// Language files that could not be decoded
    pub files_skipped: usize,
    /// Units seen in the pack
    pub units: usize,
    /// Units with both locales present
    pub units_paired: usize,
    /// Distinct source strings collected
    pub pairs: usize,
    /// Rows written to the cache
    pub written: usize,
    /// Rows removed by `fresh`
    pub cleared: i64,
}

/// Which side of a pair a language file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Source,
    Target,
}

/// Merged language tables of one unit
#[derive(Debug, Default)]
struct UnitTables {
    source: Map<String, Value>,
    target: Map<String, Value>,
}

/// Language tables of a whole pack, keyed by unit
#[derive(Debug, Default)]
struct PackTables {
    units: BTreeMap<String, UnitTables>,
    files_read: usize,
    files_skipped: usize,
}

impl PackTables {
    fn add_file(&mut self, unit: String, side: Side, name: &str, bytes: &[u8]) {
        let Some(table) = decode_lang_file(bytes) else {
            debug!("Skipping unreadable language file: {}", name);
            self.files_skipped += 1;
            return;
        };

        self.files_read += 1;
        let tables = self.units.entry(unit).or_default();
        let merged = match side {
            Side::Source => &mut tables.source,
            Side::Target => &mut tables.target,
        };
        merged.extend(table);
    }

    /// Collect pairs, first unit in sorted order wins on conflicting sources
    fn into_pairs(self) -> (Vec<TranslationEntry>, ImportReport) {
        let mut report = ImportReport {
            files_read: self.files_read,
            files_skipped: self.files_skipped,
            units: self.units.len(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for (unit, tables) in self.units {
            if tables.source.is_empty() || tables.target.is_empty() {
                continue;
            }
            report.units_paired += 1;

            let mut keys: Vec<&String> = tables.source.keys().collect();
            keys.sort();

            let before = entries.len();
            for key in keys {
                let (Some(Value::String(source)), Some(Value::String(target))) =
                    (tables.source.get(key), tables.target.get(key))
                else {
                    continue;
                };
                if source.is_empty() || target.is_empty() {
                    continue;
                }
                if seen.insert(source.clone()) {
                    entries.push(TranslationEntry::new(source.clone(), target.clone()));
                }
            }
            debug!("Unit '{}' contributed {} pairs", unit, entries.len() - before);
        }

        report.pairs = entries.len();
        (entries, report)
    }
}

/// Decode one language file into its key/value table
fn decode_lang_file(bytes: &[u8]) -> Option<Map<String, Value>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match serde_json::from_slice::<Value>(bytes).ok()? {
        Value::Object(table) => Some(table),
        _ => None,
    }
}

/// Unit and side of a pack-relative path, if it is a language file of interest
fn classify(path: &str, options: &ImportOptions) -> Option<(String, Side)> {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let assets = parts.iter().position(|p| *p == "assets")?;
    // assets/<unit>/.../<file>
    if parts.len() < assets + 3 {
        return None;
    }

    let unit = parts[assets + 1];
    let file_name = parts.last()?;
    let stem = file_name.strip_suffix(".json")?;

    let side = if stem.eq_ignore_ascii_case(&options.source_locale) {
        Side::Source
    } else if stem.eq_ignore_ascii_case(&options.target_locale) {
        Side::Target
    } else {
        return None;
    };

    Some((unit.to_string(), side))
}

/// Read language tables from a zip archive
fn read_archive<R: Read + Seek>(
    reader: R,
    options: &ImportOptions,
    progress: &(dyn Fn(usize, usize) + Send + Sync),
) -> Result<PackTables, ImportError> {
    let mut archive =
        zip::ZipArchive::new(reader).map_err(|e| ImportError::InvalidArchive(e.to_string()))?;

    let mut names: Vec<(usize, String, String, Side)> = Vec::new();
    for index in 0..archive.len() {
        let entry = archive
            .by_index(index)
            .map_err(|e| ImportError::InvalidArchive(e.to_string()))?;
        if !entry.is_file() {
            continue;
        }
        let name = entry.name().to_string();
        if let Some((unit, side)) = classify(&name, options) {
            names.push((index, name, unit, side));
        }
    }
    names.sort_by(|a, b| a.1.cmp(&b.1));

    let total = names.len();
    let mut tables = PackTables::default();
    for (position, (index, name, unit, side)) in names.into_iter().enumerate() {
        let mut buffer = Vec::new();
        let read = archive
            .by_index(index)
            .map_err(|e| ImportError::InvalidArchive(e.to_string()))
            .and_then(|mut entry| {
                entry
                    .read_to_end(&mut buffer)
                    .map_err(|e| ImportError::Read(format!("{}: {}", name, e)))
            });

        match read {
            Ok(_) => tables.add_file(unit, side, &name, &buffer),
            Err(e) => {
                warn!("Skipping archive entry: {}", e);
                tables.files_skipped += 1;
            }
        }
        progress(position + 1, total);
    }

    Ok(tables)
}

/// Read language tables from an unpacked directory
fn read_directory(
    root: &Path,
    options: &ImportOptions,
    progress: &(dyn Fn(usize, usize) + Send + Sync),
) -> Result<PackTables, ImportError> {
    if !root.is_dir() {
        return Err(ImportError::Read(format!("Not a directory: {}", root.display())));
    }

    let mut files: Vec<(PathBuf, String, String, Side)> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| {
            let relative = entry.path().strip_prefix(root).ok()?;
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            let (unit, side) = classify(&name, options)?;
            Some((entry.path().to_path_buf(), name, unit, side))
        })
        .collect();
    files.sort_by(|a, b| a.1.cmp(&b.1));

    let total = files.len();
    let mut tables = PackTables::default();
    for (position, (path, name, unit, side)) in files.into_iter().enumerate() {
        match std::fs::read(&path) {
            Ok(bytes) => tables.add_file(unit, side, &name, &bytes),
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                tables.files_skipped += 1;
            }
        }
        progress(position + 1, total);
    }

    Ok(tables)
}

/// Fetch a remote archive into memory
async fn download(url: &str, timeout_secs: u64) -> Result<Vec<u8>, ImportError> {
    info!("Downloading translation pack from {}", url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ImportError::Read(e.to_string()))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| ImportError::Read(format!("Download failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ImportError::Read(format!("Download failed with status {}", status)));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ImportError::Read(format!("Download interrupted: {}", e)))?;
    info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Loads community packs into the translation cache
pub struct Importer {
    cache: Repository,
    options: ImportOptions,
}

impl Importer {
    pub fn new(cache: Repository, options: ImportOptions) -> Self {
        Self { cache, options }
    }

    /// Import without progress reporting
    pub async fn run(&self, source: &ImportSource) -> Result<ImportReport, ImportError> {
        self.run_with_progress(source, |_, _| {}).await
    }

    /// Import, calling `progress(done, total)` after every language file
    pub async fn run_with_progress<F>(
        &self,
        source: &ImportSource,
        progress: F,
    ) -> Result<ImportReport, ImportError>
    where
        F: Fn(usize, usize) + Send + Sync + 'static,
    {
        info!("Importing translation pack from {}", source);
        let options = self.options.clone();

        let tables = match source {
            ImportSource::Archive(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || {
                    let file = std::fs::File::open(&path)
                        .map_err(|e| ImportError::Read(format!("{}: {}", path.display(), e)))?;
                    read_archive(std::io::BufReader::new(file), &options, &progress)
                })
                .await
                .map_err(|e| ImportError::Read(format!("Import task failed: {}", e)))??
            }
            ImportSource::Directory(path) => {
                let path = path.clone();
                tokio::task::spawn_blocking(move || read_directory(&path, &options, &progress))
                    .await
                    .map_err(|e| ImportError::Read(format!("Import task failed: {}", e)))??
            }
            ImportSource::Url(url) => {
                let bytes = download(url, options.download_timeout_secs).await?;
                tokio::task::spawn_blocking(move || read_archive(Cursor::new(bytes), &options, &progress))
                    .await
                    .map_err(|e| ImportError::Read(format!("Import task failed: {}", e)))??
            }
        };

        let (entries, mut report) = tables.into_pairs();
        info!(
            "Read {} language files ({} skipped) from {} units, {} with both locales",
            report.files_read, report.files_skipped, report.units, report.units_paired
        );

        if self.options.fresh {
            report.cleared = self.cache.clear().await?;
            info!("Cleared {} existing cache entries", report.cleared);
        }

        report.written = self.cache.upsert_many(entries).await?;
        info!("Imported {} translation pairs", report.written);

        Ok(report)
    }
}
