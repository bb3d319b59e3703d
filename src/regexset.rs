use alloc::{boxed::Box, string::String, sync::Arc, vec, vec::Vec};

use crate::{
    error::Error,
    hir::{self, Hir},
    nfa::{self, NFA},
    pikevm::{Cache, Mode, PikeVM},
    pool::CachePool,
};

/// Match multiple, possibly overlapping, regexes in a single search.
///
/// A regex set reports *which* of its patterns match a haystack, not where.
/// All patterns are compiled into one program and simulated together, so a
/// haystack is scanned once regardless of how many patterns there are.
///
/// ```
/// use rregex::RegexSet;
///
/// let set = RegexSet::new([
///     r"\w+",
///     r"\d+",
///     r"\pL+",
///     r"foo",
///     r"bar",
///     r"barfoo",
///     r"foobar",
/// ]).unwrap();
/// let matches: Vec<_> = set.matches("foobar").into_iter().collect();
/// assert_eq!(vec![0, 2, 3, 4, 6], matches);
/// ```
pub struct RegexSet {
    pikevm: Arc<PikeVM>,
    patterns: Arc<[String]>,
    pool: CachePool,
}

impl RegexSet {
    /// Compiles every pattern in `exprs` into one set. Fails with the error
    /// of the first pattern that doesn't compile.
    pub fn new<I, S>(exprs: I) -> Result<RegexSet, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RegexSetBuilder::new(exprs).build()
    }

    /// Returns a set with no patterns. It never matches.
    ///
    /// ```
    /// use rregex::RegexSet;
    ///
    /// let set = RegexSet::empty();
    /// assert!(set.is_empty());
    /// assert!(!set.is_match(""));
    /// ```
    pub fn empty() -> RegexSet {
        let empty: [&str; 0] = [];
        // An empty set has nothing that could fail to compile.
        match RegexSetBuilder::new(empty).build() {
            Ok(set) => set,
            Err(err) => unreachable!("empty regex set failed: {}", err),
        }
    }

    /// Returns true if any pattern matches anywhere in `haystack`.
    #[inline]
    pub fn is_match(&self, haystack: &str) -> bool {
        self.is_match_at(haystack, 0)
    }

    /// Returns true if any pattern matches at or after `start`. An offset
    /// that isn't on a character boundary never matches.
    #[inline]
    pub fn is_match_at(&self, haystack: &str, start: usize) -> bool {
        let mut cache = self.pool.get();
        let mode = Mode { anchored: false, earliest: true };
        self.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            mode,
            &mut [],
        )
    }

    /// Returns the set of patterns that match anywhere in `haystack`.
    ///
    /// ```
    /// use rregex::RegexSet;
    ///
    /// let set = RegexSet::new([r"[a-z]+@[a-z]+\.(com|org)", r"\d+"]).unwrap();
    /// let m = set.matches("mail bob@example.com");
    /// assert!(m.matched(0));
    /// assert!(!m.matched(1));
    /// assert!(m.matched_any());
    /// ```
    #[inline]
    pub fn matches(&self, haystack: &str) -> SetMatches {
        self.matches_at(haystack, 0)
    }

    /// Returns the set of patterns that match at or after `start`.
    #[inline]
    pub fn matches_at(&self, haystack: &str, start: usize) -> SetMatches {
        let mut matches = vec![false; self.len()];
        let mut cache = self.pool.get();
        let matched_any = self.pikevm.which_patterns(
            &mut cache,
            haystack.as_bytes(),
            start,
            false,
            &mut matches,
        );
        SetMatches { matched_any, matches }
    }

    /// Returns the number of patterns in this set.
    #[inline]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Returns true if this set has no patterns.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Returns the patterns this set was built from, in order.
    #[inline]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

impl Clone for RegexSet {
    fn clone(&self) -> RegexSet {
        let pikevm = Arc::clone(&self.pikevm);
        let pool = new_pool(&pikevm);
        RegexSet { pikevm, patterns: Arc::clone(&self.patterns), pool }
    }
}

impl Default for RegexSet {
    fn default() -> RegexSet {
        RegexSet::empty()
    }
}

impl core::fmt::Debug for RegexSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "RegexSet({:?})", self.patterns())
    }
}

fn new_pool(pikevm: &Arc<PikeVM>) -> CachePool {
    let pikevm = Arc::clone(pikevm);
    let create = Box::new(move || Cache::new(&pikevm));
    CachePool::new(create)
}

/// The result of [`RegexSet::matches`]: which patterns matched.
#[derive(Clone, Debug)]
pub struct SetMatches {
    matched_any: bool,
    matches: Vec<bool>,
}

impl SetMatches {
    /// Returns true if at least one pattern matched.
    #[inline]
    pub fn matched_any(&self) -> bool {
        self.matched_any
    }

    /// Returns true if every pattern matched. Vacuously true for an empty
    /// set.
    #[inline]
    pub fn matched_all(&self) -> bool {
        self.matches.iter().all(|&m| m)
    }

    /// Returns true if the pattern at `index` matched.
    ///
    /// # Panics
    ///
    /// If `index` is not less than the number of patterns in the set.
    #[inline]
    pub fn matched(&self, index: usize) -> bool {
        self.matches[index]
    }

    /// Returns the number of patterns in the set that produced this result,
    /// which is not the number of patterns that matched.
    #[inline]
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Returns an iterator over the indices of matching patterns, in
    /// ascending order.
    #[inline]
    pub fn iter(&self) -> SetMatchesIter<'_> {
        SetMatchesIter(self.matches.iter().enumerate())
    }
}

impl IntoIterator for SetMatches {
    type IntoIter = SetMatchesIntoIter;
    type Item = usize;

    fn into_iter(self) -> Self::IntoIter {
        SetMatchesIntoIter(self.matches.into_iter().enumerate())
    }
}

impl<'a> IntoIterator for &'a SetMatches {
    type IntoIter = SetMatchesIter<'a>;
    type Item = usize;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An owned iterator over the indices of matching patterns.
#[derive(Debug)]
pub struct SetMatchesIntoIter(
    core::iter::Enumerate<alloc::vec::IntoIter<bool>>,
);

impl Iterator for SetMatchesIntoIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.0.by_ref().find(|&(_, m)| m).map(|(i, _)| i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.0.size_hint().1)
    }
}

impl DoubleEndedIterator for SetMatchesIntoIter {
    fn next_back(&mut self) -> Option<usize> {
        self.0.by_ref().rev().find(|&(_, m)| m).map(|(i, _)| i)
    }
}

impl core::iter::FusedIterator for SetMatchesIntoIter {}

/// A borrowed iterator over the indices of matching patterns.
#[derive(Clone, Debug)]
pub struct SetMatchesIter<'a>(
    core::iter::Enumerate<core::slice::Iter<'a, bool>>,
);

impl<'a> Iterator for SetMatchesIter<'a> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        self.0.by_ref().find(|&(_, &m)| m).map(|(i, _)| i)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.0.size_hint().1)
    }
}

impl<'a> DoubleEndedIterator for SetMatchesIter<'a> {
    fn next_back(&mut self) -> Option<usize> {
        self.0.by_ref().rev().find(|&(_, &m)| m).map(|(i, _)| i)
    }
}

impl<'a> core::iter::FusedIterator for SetMatchesIter<'a> {}

/// Configures and compiles a [`RegexSet`]. The flags apply to every
/// pattern.
#[derive(Clone, Debug)]
pub struct RegexSetBuilder {
    patterns: Vec<String>,
    syntax: hir::Config,
    limits: nfa::Config,
}

impl RegexSetBuilder {
    /// Creates a builder for the given patterns.
    pub fn new<I, S>(patterns: I) -> RegexSetBuilder
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        RegexSetBuilder {
            patterns: patterns.into_iter().map(|p| p.as_ref().into()).collect(),
            syntax: hir::Config::default(),
            limits: nfa::Config::default(),
        }
    }

    /// Compiles the patterns.
    pub fn build(&self) -> Result<RegexSet, Error> {
        let hirs = self
            .patterns
            .iter()
            .map(|p| hir::parse(&self.syntax, p).map(|(hir, _)| hir))
            .collect::<Result<Vec<Hir>, Error>>()?;
        let nfa = NFA::new_many(self.limits, &hirs)?;
        let pikevm = Arc::new(PikeVM::new(nfa));
        let pool = new_pool(&pikevm);
        Ok(RegexSet { pikevm, patterns: self.patterns.clone().into(), pool })
    }

    /// The `i` flag for every pattern.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.case_insensitive = yes;
        self
    }

    /// The `m` flag for every pattern.
    pub fn multi_line(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.multi_line = yes;
        self
    }

    /// The `s` flag for every pattern.
    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.dot_matches_new_line = yes;
        self
    }

    /// The `R` flag for every pattern.
    pub fn crlf(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.crlf = yes;
        self
    }

    /// The `U` flag for every pattern.
    pub fn swap_greed(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.swap_greed = yes;
        self
    }

    /// The `x` flag for every pattern.
    pub fn ignore_whitespace(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.ignore_whitespace = yes;
        self
    }

    /// The `u` flag for every pattern.
    pub fn unicode(&mut self, yes: bool) -> &mut RegexSetBuilder {
        self.syntax.flags.unicode = yes;
        self
    }

    /// Sets the approximate heap limit, in bytes, of the combined program.
    pub fn size_limit(&mut self, limit: usize) -> &mut RegexSetBuilder {
        self.limits.size_limit = Some(limit);
        self
    }

    /// Sets the nesting limit for each pattern.
    pub fn nest_limit(&mut self, limit: u32) -> &mut RegexSetBuilder {
        self.syntax.nest_limit = limit;
        self
    }
}
