//! Theme discovery: packs, themes and their animation frames.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Extension of the descriptor file that marks a directory as a theme.
pub const DESCRIPTOR_EXTENSION: &str = "plymouth";
/// File name prefix of numbered animation frames.
pub const FRAME_PREFIX: &str = "progress-";

/// A single installable theme directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Theme {
    /// Directory name of the theme.
    pub name: String,
    /// Theme directory on disk.
    pub path: PathBuf,
    /// First `.plymouth` descriptor found in the directory.
    pub descriptor: PathBuf,
    /// Frame files in playback order.
    pub frames: Vec<PathBuf>,
}

impl Theme {
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// A directory grouping related themes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ThemePack {
    /// Directory name of the pack.
    pub name: String,
    pub path: PathBuf,
    /// Themes in lexicographic directory order.
    pub themes: Vec<Theme>,
}

/// Result of a single scan of the themes root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    pub packs: Vec<ThemePack>,
}

impl Catalog {
    /// Scan `root` for packs whose directory names start with `pack_prefix`.
    ///
    /// Unreadable directories are skipped; the scan never fails.
    pub fn scan(root: &Path, pack_prefix: &str) -> Self {
        let packs: Vec<ThemePack> = child_dirs(root)
            .filter(|entry| file_name(entry).starts_with(pack_prefix))
            .map(|entry| scan_pack(entry.path()))
            .collect();

        let catalog = Self { packs };
        log::info!(
            "scanned {}: {} packs, {} themes",
            root.display(),
            catalog.packs.len(),
            catalog.theme_count()
        );
        catalog
    }

    pub fn theme_count(&self) -> usize {
        self.packs.iter().map(|pack| pack.themes.len()).sum()
    }

    /// Look up a catalogued theme by its directory path.
    pub fn find_theme(&self, path: &Path) -> Option<&Theme> {
        self.packs
            .iter()
            .flat_map(|pack| pack.themes.iter())
            .find(|theme| theme.path == path)
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

fn scan_pack(path: &Path) -> ThemePack {
    let themes = child_dirs(path)
        .filter_map(|entry| scan_theme(entry.path()))
        .collect();
    ThemePack {
        name: dir_name(path),
        path: path.to_path_buf(),
        themes,
    }
}

/// Build a theme record when `path` holds at least one descriptor file.
fn scan_theme(path: &Path) -> Option<Theme> {
    let descriptor = child_files(path)
        .map(|entry| entry.into_path())
        .find(|file| has_extension(file, DESCRIPTOR_EXTENSION))?;

    Some(Theme {
        name: dir_name(path),
        path: path.to_path_buf(),
        descriptor,
        frames: discover_frames(path),
    })
}

/// Collect the frame images of a theme directory in playback order.
///
/// `progress-<N>.png` files win; otherwise any PNG whose stem has a digit.
pub fn discover_frames(theme_dir: &Path) -> Vec<PathBuf> {
    let pngs: Vec<PathBuf> = child_files(theme_dir)
        .map(|entry| entry.into_path())
        .filter(|file| has_extension(file, "png"))
        .collect();

    let mut frames: Vec<PathBuf> = pngs
        .iter()
        .filter(|file| stem(file).starts_with(FRAME_PREFIX))
        .cloned()
        .collect();
    if frames.is_empty() {
        frames = pngs
            .into_iter()
            .filter(|file| stem(file).chars().any(|c| c.is_ascii_digit()))
            .collect();
    }

    sort_frames(&mut frames);
    frames
}

/// Order frames by their embedded number, then by file name.
pub fn sort_frames(frames: &mut [PathBuf]) {
    frames.sort_by(|a, b| {
        frame_number(a)
            .cmp(&frame_number(b))
            .then_with(|| a.file_name().cmp(&b.file_name()))
    });
}

/// Number embedded in a frame file name; 0 when none can be parsed.
///
/// `name-12-x.png` yields the second dash-separated segment, other names
/// yield their first run of digits.
pub fn frame_number(path: &Path) -> u64 {
    let stem = stem(path);
    if stem.contains('-') {
        return stem
            .split('-')
            .nth(1)
            .and_then(|segment| segment.parse().ok())
            .unwrap_or(0);
    }
    let digits: String = stem
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

/// Immediate subdirectories of `dir`, sorted by name, unreadable ones dropped.
fn child_dirs(dir: &Path) -> impl Iterator<Item = DirEntry> {
    children(dir).filter(|entry| entry.file_type().is_dir())
}

fn child_files(dir: &Path) -> impl Iterator<Item = DirEntry> {
    children(dir).filter(|entry| entry.file_type().is_file())
}

fn children(dir: &Path) -> impl Iterator<Item = DirEntry> {
    WalkDir::new(dir)
        .follow_links(true)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("skipping unreadable entry: {err}");
                None
            }
        })
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    match path.extension().and_then(OsStr::to_str) {
        Some(ext) => ext.eq_ignore_ascii_case(wanted),
        None => false,
    }
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(entry: &DirEntry) -> String {
    entry.file_name().to_string_lossy().into_owned()
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
