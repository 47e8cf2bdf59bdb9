use ahash::AHashMap;
use parking_lot::RwLock;
use regex::Regex;
use std::sync::OnceLock;

// Distinct patterns come from definitions, so the set is small; the bound only
// guards against patterns built from user input.
const MAX_CACHED_PATTERNS: usize = 512;

fn patterns() -> &'static RwLock<AHashMap<String, Regex>> {
    static PATTERNS: OnceLock<RwLock<AHashMap<String, Regex>>> = OnceLock::new();
    PATTERNS.get_or_init(|| RwLock::new(AHashMap::new()))
}

/// Returns the compiled regex for `source`, compiling it on first use.
///
/// Invalid patterns are not cached and report the compile error every time.
pub fn cached_regex(source: &str) -> Result<Regex, regex::Error> {
    if let Some(re) = patterns().read().get(source) {
        return Ok(re.clone());
    }

    let re = Regex::new(source)?;
    let mut cache = patterns().write();
    if cache.len() >= MAX_CACHED_PATTERNS {
        log::debug!("Pattern cache full ({} entries), clearing", cache.len());
        cache.clear();
    }
    cache.insert(source.to_string(), re.clone());
    Ok(re)
}
