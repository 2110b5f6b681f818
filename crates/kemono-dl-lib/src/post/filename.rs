use std::collections::HashSet;
use std::fmt;

const RESERVED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const FALLBACK: &str = "file";

/// A single, filesystem-safe path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileName(String);

impl FileName {
    pub fn sanitize(raw: &str) -> Self {
        let replaced: String = raw
            .chars()
            .map(|c| {
                if c.is_control() || RESERVED.contains(&c) {
                    '_'
                } else {
                    c
                }
            })
            .collect();
        let trimmed = replaced.trim_matches(|c: char| c == '.' || c.is_whitespace());

        match trimmed {
            "" => Self(FALLBACK.to_string()),
            name => Self(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits off the extension (including its dot).
    fn split_extension(&self) -> (&str, &str) {
        match self.0.rfind('.') {
            Some(index) if index > 0 => self.0.split_at(index),
            _ => (self.0.as_str(), ""),
        }
    }

    fn with_suffix(&self, n: usize) -> Self {
        let (stem, extension) = self.split_extension();
        Self(format!("{stem}_{n}{extension}"))
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Makes every name unique, keeping order. The first occurrence keeps its name and
/// later ones get the lowest free `_N` suffix before the extension.
pub fn disambiguate(names: impl IntoIterator<Item = FileName>) -> Vec<FileName> {
    let mut taken = HashSet::new();
    let mut unique_names = Vec::new();

    for name in names {
        let mut unique = name.clone();
        let mut n = 0;
        while taken.contains(&unique) {
            n += 1;
            unique = name.with_suffix(n);
        }
        taken.insert(unique.clone());
        unique_names.push(unique);
    }

    unique_names
}
