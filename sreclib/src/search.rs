use regex::bytes::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchType {
    Hex(Vec<u8>),
    Ascii(String),
    Regex(String),
}

/// Searches for a pattern in assembled image data.
pub fn search<'a>(
    runs: impl Iterator<Item = (u32, &'a [u8])>,
    search_type: &SearchType,
) -> Vec<u32> {
    match search_type {
        SearchType::Hex(p) => search_bytes(runs, p),
        SearchType::Ascii(s) => search_bytes(runs, s.as_bytes()),
        SearchType::Regex(p) => search_regex(runs, p),
    }
}

/// Slide window search over contiguous `(address, bytes)` runs.
/// Returns the absolute starting addresses of all matches.
fn search_bytes<'a>(
    runs: impl Iterator<Item = (u32, &'a [u8])>,
    pattern: &[u8],
) -> Vec<u32> {
    let size = pattern.len();
    if size == 0 {
        return vec![];
    }

    let mut matches = Vec::new();

    for (addr, data) in runs {
        // A run is contiguous by construction, so search within the slice.
        for (offset, window) in data.windows(size).enumerate() {
            if window == pattern {
                matches.push(addr + offset as u32);
            }
        }
    }

    matches
}

/// Regex search over contiguous `(address, bytes)` runs.
/// Returns the absolute starting addresses of all matches.
fn search_regex<'a>(
    runs: impl Iterator<Item = (u32, &'a [u8])>,
    pattern: &str,
) -> Vec<u32> {
    let Ok(re) = Regex::new(pattern) else {
        return vec![];
    };
    let mut matches = Vec::new();

    for (addr, data) in runs {
        for mtch in re.find_iter(data) {
            matches.push(addr + mtch.start() as u32);
        }
    }

    matches
}
