//! Name filters. A [`Filter`] is compiled once per listing into a
//! [`Matcher`]; after that nothing cares whether it started as a regex
//! or a glob.

use regex::Regex;

use super::error::ListResult;

/// Caller supplied filter over entry names
#[derive(Debug, Clone)]
pub enum Filter {
    /// Tested against the name unanchored, like a search
    Regex(Regex),
    /// `*` and `?` wildcards, everything else literal
    Glob(String),
}

impl Filter {
    /// Compiles `source` as a regular expression
    pub fn regex(source: &str) -> ListResult<Self> {
        Ok(Self::Regex(Regex::new(source)?))
    }

    /// Wraps `pattern` as a glob. Globs always compile, so this cannot fail.
    pub fn glob<T: Into<String>>(pattern: T) -> Self {
        Self::Glob(pattern.into())
    }
}

impl From<Regex> for Filter {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<&str> for Filter {
    fn from(pattern: &str) -> Self {
        Self::glob(pattern)
    }
}

impl From<String> for Filter {
    fn from(pattern: String) -> Self {
        Self::glob(pattern)
    }
}

/// Predicate over entry base names
#[derive(Debug, Clone)]
pub enum Matcher {
    /// No filter was given
    All,
    /// The empty glob, which only an empty name matches
    EmptyName,
    /// A regex, or a glob translated into one
    Regex(Regex),
}

impl Matcher {
    pub fn is_match(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::EmptyName => name.is_empty(),
            Self::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Turns an optional filter into a predicate. No filter matches everything;
/// an empty glob matches only the empty name.
pub fn compile(filter: Option<&Filter>) -> ListResult<Matcher> {
    let matcher = match filter {
        None => Matcher::All,
        Some(Filter::Regex(regex)) => Matcher::Regex(regex.clone()),
        Some(Filter::Glob(glob)) if glob.is_empty() => Matcher::EmptyName,
        Some(Filter::Glob(glob)) => {
            let source = glob_to_regex(glob);
            trace!("glob {:?} compiled to {:?}", glob, source);
            Matcher::Regex(Regex::new(&source)?)
        }
    };

    Ok(matcher)
}

/// Translates a glob into a regex anchored at the start of the name.
/// The end is left open, so `*txt` also accepts `notes.txt.gz`.
pub fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::from("^");
    let mut buf = [0; 4];

    for c in pattern.chars() {
        match c {
            '*' => regex.push_str("[^/]*"),
            '?' => regex.push('.'),
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }

    regex
}
