//! Reverse-hash dictionary for recovering names.
//!
//! Names are never stored in a GFPAK, only their FNV-64a hashes. The
//! dictionary hashes every line of a wordlist, every path segment and every
//! directory prefix, and keeps the string each hash came from. Lines that
//! contain the template token (`pm0000` by default) are expanded into
//! numbered variants, since whole families of assets share one naming
//! template.
//!
//! Expansion depends on the archive title, so a dictionary is built per
//! archive session and should not be shared across titles.

use std::borrow::Cow;
use std::cell::OnceCell;

use gflx_common::fnv;
use rustc_hash::FxHashMap;
use tracing::debug;

/// Wordlist compiled into the crate.
pub const BUNDLED_WORDLIST: &str = include_str!("../resources/hashlist.txt");

/// Placeholder that marks a templated wordlist line.
pub const DEFAULT_TEMPLATE_TOKEN: &str = "pm0000";

/// Number of numbered variants generated per templated line.
pub const DEFAULT_VARIANT_COUNT: u32 = 1000;

/// Inputs that determine the contents of a [`FilenameDictionary`].
#[derive(Debug, Clone)]
pub struct DictionaryConfig {
    /// Newline-delimited wordlist.
    pub wordlist: Cow<'static, str>,
    /// Token substituted by numbered variants, e.g. `pm0000`.
    pub template_token: String,
    /// How many numbered variants to generate per templated line.
    pub variant_count: u32,
    /// Archive title; a `pmNNNN_NN` prefix in it yields one extra variant.
    pub title: Option<String>,
}

impl DictionaryConfig {
    /// Configuration seeded from the bundled wordlist.
    pub fn bundled() -> Self {
        Self::with_wordlist(BUNDLED_WORDLIST)
    }

    /// Configuration seeded from a caller-supplied wordlist.
    pub fn with_wordlist(wordlist: impl Into<Cow<'static, str>>) -> Self {
        Self {
            wordlist: wordlist.into(),
            template_token: DEFAULT_TEMPLATE_TOKEN.to_string(),
            variant_count: DEFAULT_VARIANT_COUNT,
            title: None,
        }
    }

    /// Set the archive title used for title-specific expansion.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the template token and variant count.
    pub fn template(mut self, token: impl Into<String>, variant_count: u32) -> Self {
        self.template_token = token.into();
        self.variant_count = variant_count;
        self
    }
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self::bundled()
    }
}

/// Lazily built map from FNV-64a hash to the string it was computed from.
///
/// The map is built on the first lookup and cached for the lifetime of the
/// dictionary.
#[derive(Debug)]
pub struct FilenameDictionary {
    config: DictionaryConfig,
    entries: OnceCell<FxHashMap<u64, String>>,
}

impl FilenameDictionary {
    /// Create a dictionary; nothing is hashed until the first lookup.
    pub fn new(config: DictionaryConfig) -> Self {
        Self {
            config,
            entries: OnceCell::new(),
        }
    }

    /// Dictionary over the bundled wordlist, expanded for `title`.
    pub fn bundled_for(title: &str) -> Self {
        Self::new(DictionaryConfig::bundled().title(title))
    }

    /// Dictionary that never resolves anything.
    pub fn empty() -> Self {
        Self::new(DictionaryConfig::with_wordlist(""))
    }

    /// Look up the string that hashes to `hash`.
    pub fn lookup(&self, hash: u64) -> Option<&str> {
        self.entries().get(&hash).map(String::as_str)
    }

    /// Number of distinct hashes known.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    /// Check if the dictionary resolves nothing.
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    /// Check whether the map has been built yet.
    pub fn is_built(&self) -> bool {
        self.entries.get().is_some()
    }

    fn entries(&self) -> &FxHashMap<u64, String> {
        self.entries.get_or_init(|| build(&self.config))
    }
}

fn build(config: &DictionaryConfig) -> FxHashMap<u64, String> {
    let mut map = FxHashMap::default();
    let token = config.template_token.as_str();
    let (token_alpha, token_digits) = split_token(token);
    let title_prefix = config
        .title
        .as_deref()
        .and_then(|title| find_title_prefix(title, token_alpha, token_digits));
    let title_template = format!("{token}_00");

    for raw in config.wordlist.lines() {
        let line = raw.trim_end();
        if line.is_empty() {
            continue;
        }

        insert_path(&mut map, line);

        if token.is_empty() || !line.contains(token) {
            continue;
        }

        if let Some(prefix) = title_prefix {
            insert_path(&mut map, &line.replace(&title_template, prefix));
        }

        for i in 0..config.variant_count {
            let numbered = format!("{token_alpha}{i:0width$}", width = token_digits);
            insert_path(&mut map, &line.replace(token, &numbered));
        }
    }

    debug!(
        entries = map.len(),
        title = config.title.as_deref().unwrap_or(""),
        "built filename dictionary"
    );
    map
}

/// Hash a path, each directory prefix (with its trailing `/`) and each segment.
fn insert_path(map: &mut FxHashMap<u64, String>, path: &str) {
    insert(map, path);

    for (i, _) in path.match_indices('/') {
        insert(map, &path[..=i]);
    }

    for segment in path.split('/').filter(|s| !s.is_empty()) {
        insert(map, segment);
    }
}

fn insert(map: &mut FxHashMap<u64, String>, value: &str) {
    map.entry(fnv::hash_str(value))
        .or_insert_with(|| value.to_string());
}

/// Split `pm0000` into (`pm`, 4).
fn split_token(token: &str) -> (&str, usize) {
    let alpha_len = token
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(token.len());
    (&token[..alpha_len], token.len() - alpha_len)
}

/// Find the first `<alpha><digits>_<2 digits>` run in `title`, e.g. `pm0025_00`.
fn find_title_prefix<'t>(title: &'t str, alpha: &str, digits: usize) -> Option<&'t str> {
    if alpha.is_empty() || digits == 0 {
        return None;
    }

    let bytes = title.as_bytes();
    let len = alpha.len() + digits + 3;

    title.match_indices(alpha).find_map(|(start, _)| {
        let candidate = bytes.get(start..start + len)?;
        let (number, rest) = candidate[alpha.len()..].split_at(digits);
        let well_formed = number.iter().all(u8::is_ascii_digit)
            && rest[0] == b'_'
            && rest[1..].iter().all(u8::is_ascii_digit);
        well_formed.then(|| &title[start..start + len])
    })
}
