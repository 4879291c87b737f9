use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

/// A set of package names.
///
/// List files hold one package per line. Blank lines and lines starting with
/// `#` are skipped and surrounding whitespace is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PackageAllowlist {
    names: HashSet<String>,
}

impl PackageAllowlist {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn allows(&self, pkg_name: &str) -> bool {
        self.names.contains(pkg_name)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Add every entry of a newline separated list, returning how many
    /// entries were read
    pub fn read_list<R: Read>(&mut self, reader: R) -> io::Result<usize> {
        let mut count = 0;
        for line in BufReader::new(reader).lines() {
            let line = line?;
            let entry = line.trim();
            if entry.is_empty() || entry.starts_with('#') {
                continue;
            }
            self.names.insert(entry.to_string());
            count += 1;
        }
        Ok(count)
    }

    pub fn read_list_file(&mut self, path: &Path) -> io::Result<usize> {
        let f = File::open(path)?;
        self.read_list(f)
    }
}

impl<S: AsRef<str>> FromIterator<S> for PackageAllowlist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut lst = Self::new();
        lst.extend(iter);
        lst
    }
}

impl<S: AsRef<str>> Extend<S> for PackageAllowlist {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.names
            .extend(iter.into_iter().map(|it| it.as_ref().to_string()))
    }
}
