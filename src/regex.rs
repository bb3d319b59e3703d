use alloc::{
    borrow::Cow, boxed::Box, string::String, string::ToString, sync::Arc, vec,
    vec::Vec,
};

use crate::{
    error::Error,
    hir::{self, Hir},
    int::NonMaxUsize,
    interpolate,
    nfa::{self, NFA},
    pikevm::{self, Cache, Mode, PikeVM},
    pool::CachePool,
};

/// A compiled regular expression for searching Unicode haystacks.
///
/// A `Regex` can be used to search haystacks, split haystacks into
/// substrings or replace substrings in a haystack with a different
/// substring. All searching is done with an implicit `(?s:.)*?` at the
/// beginning and end of a pattern. To force an expression to match the whole
/// string (or a prefix or a suffix), you must use an anchor like `^` or `$`
/// (or `\A` and `\z`).
///
/// Searching takes time proportional to `m * n`, where `m` is the size of
/// the compiled program and `n` is the length of the haystack, no matter the
/// pattern.
///
/// All offsets reported are byte offsets into the haystack, and always fall
/// on UTF-8 character boundaries.
///
/// # Example
///
/// ```
/// use rregex::Regex;
///
/// let re = Regex::new(r"[0-9]{3}-[0-9]{3}-[0-9]{4}").unwrap();
/// let m = re.find("phone: 111-222-3333").unwrap();
/// assert_eq!((7, 19), (m.start(), m.end()));
/// ```
///
/// # Sharing
///
/// A `Regex` is `Send` and `Sync` and may be used from many threads at once.
/// Each search borrows scratch space from an internal pool, so concurrent
/// searches never contend on anything but that pool.
pub struct Regex {
    meta: Arc<Meta>,
    pool: CachePool,
}

/// Everything about a compiled regex that is shared by its clones and by
/// the `Captures` it produces.
#[derive(Debug)]
struct Meta {
    pattern: Box<str>,
    hir: Hir,
    pikevm: PikeVM,
}

impl Meta {
    fn nfa(&self) -> &NFA {
        self.pikevm.nfa()
    }
}

fn new_pool(meta: &Arc<Meta>) -> CachePool {
    let meta = Arc::clone(meta);
    let create = Box::new(move || Cache::new(&meta.pikevm));
    CachePool::new(create)
}

impl Clone for Regex {
    fn clone(&self) -> Regex {
        let meta = Arc::clone(&self.meta);
        let pool = new_pool(&meta);
        Regex { meta, pool }
    }
}

impl core::fmt::Display for Regex {
    /// Shows the original regular expression.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl core::fmt::Debug for Regex {
    /// Shows the original regular expression.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_tuple("Regex").field(&self.as_str()).finish()
    }
}

impl core::str::FromStr for Regex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Regex, Error> {
        Regex::new(s)
    }
}

impl TryFrom<&str> for Regex {
    type Error = Error;

    fn try_from(s: &str) -> Result<Regex, Error> {
        Regex::new(s)
    }
}

impl TryFrom<String> for Regex {
    type Error = Error;

    fn try_from(s: String) -> Result<Regex, Error> {
        Regex::new(&s)
    }
}

impl Regex {
    /// Compiles a regular expression with the default configuration.
    ///
    /// If the pattern is invalid or the compiled program would exceed the
    /// default size limit, then an error is returned. Use a
    /// [`RegexBuilder`] to change the configuration.
    pub fn new(pattern: &str) -> Result<Regex, Error> {
        RegexBuilder::new(pattern).build()
    }

    /// Returns true if and only if there is a match for the regex anywhere
    /// in the haystack given.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"\b\w{13}\b").unwrap();
    /// assert!(re.is_match("I categorically deny having triskaidekaphobia."));
    /// assert!(!Regex::new("a").unwrap().is_match("def"));
    /// ```
    #[inline]
    pub fn is_match(&self, haystack: &str) -> bool {
        let mut cache = self.pool.get();
        let mode = Mode { anchored: false, earliest: true };
        self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            0,
            mode,
            &mut [],
        )
    }

    /// Returns the leftmost-first match in `haystack`, if one exists.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new("a").unwrap();
    /// let m = re.find("abcabcabc").unwrap();
    /// assert_eq!((0, 1, "a"), (m.start(), m.end(), m.as_str()));
    /// assert!(re.find("def").is_none());
    /// ```
    #[inline]
    pub fn find<'h>(&self, haystack: &'h str) -> Option<Match<'h>> {
        self.find_at(haystack, 0)
    }

    /// Returns an iterator over every successive non-overlapping match in
    /// `haystack`.
    ///
    /// After an empty match, the next search begins one character later, and
    /// an empty match that ends where the previous match ended is never
    /// reported. So the iterator can skip a match that `find_at` would
    /// return when started at the previous match's end:
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new("a").unwrap();
    /// let spans: Vec<_> = re.find_iter("abcabcabc").map(|m| m.range()).collect();
    /// assert_eq!(vec![0..1, 3..4, 6..7], spans);
    ///
    /// let re = Regex::new("a|").unwrap();
    /// let spans: Vec<_> = re.find_iter("ab").map(|m| m.range()).collect();
    /// assert_eq!(vec![0..1, 2..2], spans);
    /// assert_eq!(Some(1..1), re.find_at("ab", 1).map(|m| m.range()));
    /// ```
    #[inline]
    pub fn find_iter<'r, 'h>(&'r self, haystack: &'h str) -> Matches<'r, 'h> {
        Matches {
            haystack,
            it: self.meta.pikevm.find_iter(self.pool.get(), haystack.as_bytes()),
        }
    }

    /// Returns the capture groups of the leftmost-first match in
    /// `haystack`.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})").unwrap();
    /// let caps = re.captures("2012-03-14").unwrap();
    /// assert_eq!("2012", &caps["y"]);
    /// assert_eq!(5..7, caps.name("m").unwrap().range());
    /// assert_eq!("14", &caps[3]);
    /// ```
    #[inline]
    pub fn captures<'h>(&self, haystack: &'h str) -> Option<Captures<'h>> {
        self.captures_at(haystack, 0)
    }

    /// Returns an iterator over the capture groups of every successive
    /// non-overlapping match in `haystack`.
    #[inline]
    pub fn captures_iter<'r, 'h>(
        &'r self,
        haystack: &'h str,
    ) -> CaptureMatches<'r, 'h> {
        CaptureMatches {
            haystack,
            re: self,
            it: self
                .meta
                .pikevm
                .captures_iter(self.pool.get(), haystack.as_bytes()),
        }
    }

    /// Returns an iterator over the substrings of `haystack` delimited by
    /// matches of this regex.
    ///
    /// Concatenating the pieces with the matched text between them gives
    /// back `haystack`. A match at either end yields an empty piece.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"[ \t]+").unwrap();
    /// let fields: Vec<&str> = re.split("a b \t  c\td    e").collect();
    /// assert_eq!(vec!["a", "b", "c", "d", "e"], fields);
    /// ```
    #[inline]
    pub fn split<'r, 'h>(&'r self, haystack: &'h str) -> Split<'r, 'h> {
        Split { haystack, finder: self.find_iter(haystack), rest: Some(0) }
    }

    /// Like [`Regex::split`], but yields at most `limit` pieces. The last
    /// piece holds the rest of the haystack. A limit of zero yields nothing
    /// and never searches.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(",").unwrap();
    /// assert_eq!(vec!["a", "b,c"], re.splitn("a,b,c", 2).collect::<Vec<_>>());
    /// assert_eq!(0, re.splitn("a,b,c", 0).count());
    /// ```
    #[inline]
    pub fn splitn<'r, 'h>(
        &'r self,
        haystack: &'h str,
        limit: usize,
    ) -> SplitN<'r, 'h> {
        SplitN { splits: self.split(haystack), limit }
    }

    /// Replaces the leftmost-first match with the replacement provided.
    ///
    /// `rep` may be a template string in which `$N`, `$name`, `${N}` and
    /// `${name}` refer to capture groups and `$$` is a literal `$`, a
    /// closure from [`Captures`] to text, or a [`NoExpand`] to use the text
    /// verbatim. If there is no match, the haystack is returned unchanged
    /// without allocating.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"(?P<last>[^,\s]+),\s+(?P<first>\S+)").unwrap();
    /// assert_eq!("Bruce Springsteen", re.replace("Springsteen, Bruce", "$first $last"));
    /// ```
    #[inline]
    pub fn replace<'h, R: Replacer>(
        &self,
        haystack: &'h str,
        rep: R,
    ) -> Cow<'h, str> {
        self.replace_count(haystack, Some(1), rep)
    }

    /// Replaces every non-overlapping match with the replacement provided.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new("[^01]+").unwrap();
    /// assert_eq!("1010", re.replace_all("1078910", ""));
    /// ```
    #[inline]
    pub fn replace_all<'h, R: Replacer>(
        &self,
        haystack: &'h str,
        rep: R,
    ) -> Cow<'h, str> {
        self.replace_count(haystack, None, rep)
    }

    /// Replaces the first `limit` non-overlapping matches. A `limit` of zero
    /// replaces every match, like [`Regex::replace_all`].
    #[inline]
    pub fn replacen<'h, R: Replacer>(
        &self,
        haystack: &'h str,
        limit: usize,
        rep: R,
    ) -> Cow<'h, str> {
        let count = if limit == 0 { None } else { Some(limit) };
        self.replace_count(haystack, count, rep)
    }

    /// Replaces the first `count` non-overlapping matches, or every match
    /// when `count` is `None`.
    ///
    /// `Some(0)` returns the haystack without searching it.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new("o").unwrap();
    /// assert_eq!("f00o", re.replace_count("fooo", Some(2), "0"));
    /// assert_eq!("fooo", re.replace_count("fooo", Some(0), "0"));
    /// assert_eq!("f000", re.replace_count("fooo", None, "0"));
    /// ```
    pub fn replace_count<'h, R: Replacer>(
        &self,
        haystack: &'h str,
        count: Option<usize>,
        mut rep: R,
    ) -> Cow<'h, str> {
        let limit = match count {
            Some(0) => return Cow::Borrowed(haystack),
            Some(n) => n,
            None => usize::MAX,
        };
        // A template without `$` never needs the groups, and finding matches
        // is cheaper than resolving captures.
        if let Some(text) = rep.no_expansion() {
            let found = self.find_iter(haystack).take(limit);
            return splice(haystack, found, Match::range, |_, out| {
                out.push_str(&text)
            });
        }
        let found = self.captures_iter(haystack).take(limit);
        splice(
            haystack,
            found,
            |caps| caps.get_match().range(),
            |caps, out| rep.replace_append(caps, out),
        )
    }
}

/// Copies `haystack`, substituting the output of `write` for the span of
/// each item in `found`. Borrows when `found` is empty.
fn splice<'h, T>(
    haystack: &'h str,
    found: impl Iterator<Item = T>,
    span: impl Fn(&T) -> core::ops::Range<usize>,
    mut write: impl FnMut(&T, &mut String),
) -> Cow<'h, str> {
    let mut found = found.peekable();
    if found.peek().is_none() {
        return Cow::Borrowed(haystack);
    }
    let mut out = String::with_capacity(haystack.len());
    let mut copied = 0;
    for item in found {
        let range = span(&item);
        out.push_str(&haystack[copied..range.start]);
        write(&item, &mut out);
        copied = range.end;
    }
    out.push_str(&haystack[copied..]);
    Cow::Owned(out)
}

/// Searches that start at an offset other than zero.
///
/// An offset past the end of the haystack, or inside the encoding of a
/// character, never matches. Look-around assertions like `\b` and `^` still
/// see the text before the offset, which is why slicing the haystack is not
/// the same thing.
impl Regex {
    /// Returns the end offset of some match, reporting it as soon as any
    /// match is seen. The offset may be less than the end of the
    /// leftmost-first match.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new("a+").unwrap();
    /// assert_eq!(Some(1), re.shortest_match("aaaaa"));
    /// ```
    #[inline]
    pub fn shortest_match(&self, haystack: &str) -> Option<usize> {
        self.shortest_match_at(haystack, 0)
    }

    /// Like [`Regex::shortest_match`], but searches from `start`.
    #[inline]
    pub fn shortest_match_at(
        &self,
        haystack: &str,
        start: usize,
    ) -> Option<usize> {
        let mut cache = self.pool.get();
        let mut slots = [None, None];
        let mode = Mode { anchored: false, earliest: true };
        let matched = self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            mode,
            &mut slots,
        );
        if !matched {
            return None;
        }
        Some(slots[1]?.get())
    }

    /// Returns true if and only if a match begins exactly at `start`.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"\d+").unwrap();
    /// assert!(re.is_match_at("ab12", 2));
    /// assert!(!re.is_match_at("ab12", 1));
    /// assert!(!re.is_match_at("ab12", 5));
    /// ```
    #[inline]
    pub fn is_match_at(&self, haystack: &str, start: usize) -> bool {
        let mut cache = self.pool.get();
        let mode = Mode { anchored: true, earliest: true };
        self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            mode,
            &mut [],
        )
    }

    /// Returns the leftmost-first match at or after `start`.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"\bchew\b").unwrap();
    /// let hay = "eschew";
    /// // `find` on the slice would match, since `\b` can't see the "es".
    /// assert!(re.find(&hay[2..]).is_some());
    /// assert!(re.find_at(hay, 2).is_none());
    /// ```
    #[inline]
    pub fn find_at<'h>(
        &self,
        haystack: &'h str,
        start: usize,
    ) -> Option<Match<'h>> {
        let mut cache = self.pool.get();
        let mut slots = [None, None];
        let matched = self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            Mode::default(),
            &mut slots,
        );
        if !matched {
            return None;
        }
        let (start, end) = (slots[0]?.get(), slots[1]?.get());
        Some(Match::new(haystack, start, end))
    }

    /// Returns the capture groups of the leftmost-first match at or after
    /// `start`.
    #[inline]
    pub fn captures_at<'h>(
        &self,
        haystack: &'h str,
        start: usize,
    ) -> Option<Captures<'h>> {
        let mut caps = Captures {
            haystack,
            slots: self.capture_locations(),
            meta: Arc::clone(&self.meta),
        };
        let mut cache = self.pool.get();
        let matched = self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            Mode::default(),
            &mut caps.slots.0,
        );
        if !matched {
            return None;
        }
        Some(caps)
    }

    /// Like [`Regex::captures`], but writes the group offsets into `locs`
    /// so that repeated searches can reuse one allocation. Returns the
    /// overall match.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"(\w+)@(\w+)").unwrap();
    /// let mut locs = re.capture_locations();
    /// let m = re.captures_read(&mut locs, "me: bob@example").unwrap();
    /// assert_eq!(4..15, m.range());
    /// assert_eq!(Some((8, 15)), locs.get(2));
    /// ```
    #[inline]
    pub fn captures_read<'h>(
        &self,
        locs: &mut CaptureLocations,
        haystack: &'h str,
    ) -> Option<Match<'h>> {
        self.captures_read_at(locs, haystack, 0)
    }

    /// Like [`Regex::captures_read`], but searches from `start`.
    #[inline]
    pub fn captures_read_at<'h>(
        &self,
        locs: &mut CaptureLocations,
        haystack: &'h str,
        start: usize,
    ) -> Option<Match<'h>> {
        let mut cache = self.pool.get();
        let matched = self.meta.pikevm.search(
            &mut cache,
            haystack.as_bytes(),
            start,
            Mode::default(),
            &mut locs.0,
        );
        if !matched {
            return None;
        }
        let (start, end) = locs.get(0)?;
        Some(Match::new(haystack, start, end))
    }
}

/// Introspection.
impl Regex {
    /// Returns the pattern this regex was compiled from.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.meta.pattern
    }

    /// Returns the translated syntax of this regex.
    ///
    /// The [`Hir`] implements `serde::Serialize`, which gives tooling a
    /// tagged tree of how the pattern was understood.
    ///
    /// ```
    /// use rregex::{hir::HirKind, Regex};
    ///
    /// let re = Regex::new("ab|c").unwrap();
    /// // Group 0 is added when compiling, so it isn't part of the syntax.
    /// assert!(matches!(re.syntax().kind(), HirKind::Alternation(_)));
    /// ```
    #[inline]
    pub fn syntax(&self) -> &Hir {
        &self.meta.hir
    }

    /// Returns an iterator over the name of every capture group, in index
    /// order. Group 0 and unnamed groups yield `None`.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"(?<year>\d+)-(\d+)").unwrap();
    /// let names: Vec<_> = re.capture_names().collect();
    /// assert_eq!(vec![None, Some("year"), None], names);
    /// ```
    #[inline]
    pub fn capture_names(&self) -> CaptureNames<'_> {
        CaptureNames(self.meta.nfa().group_names())
    }

    /// Returns the number of capture groups, including the implicit group
    /// 0 for the whole match.
    #[inline]
    pub fn captures_len(&self) -> usize {
        self.meta.nfa().group_len()
    }

    /// Returns the number of groups that participate in every match, if
    /// that number is the same for all matches. Includes group 0.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// assert_eq!(Some(3), Regex::new(r"(a)(b)").unwrap().static_captures_len());
    /// assert_eq!(None, Regex::new(r"(a)|b").unwrap().static_captures_len());
    /// ```
    #[inline]
    pub fn static_captures_len(&self) -> Option<usize> {
        self.meta
            .nfa()
            .fixed_groups_len()
            .map(|len| len.saturating_add(1))
    }

    /// Returns a fresh set of capture locations for use with
    /// [`Regex::captures_read`].
    #[inline]
    pub fn capture_locations(&self) -> CaptureLocations {
        // The compiler bounds the group count well below usize::MAX / 2.
        let len = self.meta.nfa().group_len().saturating_mul(2);
        CaptureLocations(vec![None; len])
    }
}

/// A single match: its byte offsets and the text it covers.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Match<'h> {
    haystack: &'h str,
    start: usize,
    end: usize,
}

impl<'h> Match<'h> {
    #[inline]
    fn new(haystack: &'h str, start: usize, end: usize) -> Match<'h> {
        Match { haystack, start, end }
    }

    /// The byte offset of the start of the match.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// The byte offset just past the end of the match.
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The length of the match, in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn range(&self) -> core::ops::Range<usize> {
        self.start..self.end
    }

    /// The matched text.
    #[inline]
    pub fn as_str(&self) -> &'h str {
        &self.haystack[self.range()]
    }
}

impl<'h> core::fmt::Debug for Match<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_struct("Match")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("string", &self.as_str())
            .finish()
    }
}

impl<'h> From<Match<'h>> for &'h str {
    fn from(m: Match<'h>) -> &'h str {
        m.as_str()
    }
}

impl<'h> From<Match<'h>> for core::ops::Range<usize> {
    fn from(m: Match<'h>) -> core::ops::Range<usize> {
        m.range()
    }
}

/// The capture groups of a single match.
///
/// There is always one entry per group in the pattern, plus group 0 for the
/// whole match. A group that did not participate in the match has no entry.
///
/// Index with a number or a name to get a group's text, which panics if the
/// group didn't match. [`Captures::get`] and [`Captures::name`] return
/// `Option` instead.
pub struct Captures<'h> {
    haystack: &'h str,
    slots: CaptureLocations,
    meta: Arc<Meta>,
}

impl<'h> Captures<'h> {
    /// Returns the match for the group at index `i`, if it participated.
    #[inline]
    pub fn get(&self, i: usize) -> Option<Match<'h>> {
        self.slots.get(i).map(|(s, e)| Match::new(self.haystack, s, e))
    }

    /// Returns the match for the group named `name`, if it exists and
    /// participated.
    #[inline]
    pub fn name(&self, name: &str) -> Option<Match<'h>> {
        let i = self.meta.nfa().group_index(name)?;
        self.get(i)
    }

    /// Returns the overall match. A `Captures` only exists for a match, so
    /// group 0 is always present.
    #[inline]
    pub fn get_match(&self) -> Match<'h> {
        let (start, end) = self.slots.get(0).unwrap_or((0, 0));
        Match::new(self.haystack, start, end)
    }

    /// Expands `replacement` into `dst`, replacing `$N`, `$name`, `${N}` and
    /// `${name}` with the text of the corresponding group and `$$` with
    /// `$`.
    ///
    /// A reference to a group that doesn't exist or didn't participate
    /// expands to nothing. A `$` that doesn't begin a valid reference is
    /// kept as is. Unbraced names are as long as possible, so `$1a` refers
    /// to a group named `1a`; write `${1}a` for group 1 followed by `a`.
    ///
    /// ```
    /// use rregex::Regex;
    ///
    /// let re = Regex::new(r"(?<day>\d+) (\w+)").unwrap();
    /// let caps = re.captures("14 March").unwrap();
    /// let mut dst = String::new();
    /// caps.expand("$2 ${day}th, $$5 $nope", &mut dst);
    /// assert_eq!("March 14th, $5 ", dst);
    /// ```
    #[inline]
    pub fn expand(&self, replacement: &str, dst: &mut String) {
        interpolate::string(
            replacement,
            |index, dst| {
                if let Some(m) = self.get(index) {
                    dst.push_str(m.as_str());
                }
            },
            |name| self.meta.nfa().group_index(name),
            dst,
        );
    }

    /// Returns an iterator over every group in index order, yielding `None`
    /// for groups that didn't participate.
    #[inline]
    pub fn iter<'c>(&'c self) -> SubCaptureMatches<'c, 'h> {
        SubCaptureMatches { caps: self, indices: 0..self.len() }
    }

    /// Returns the number of groups, including group 0. This is the same
    /// for every match of a regex.
    #[inline]
    pub fn len(&self) -> usize {
        self.meta.nfa().group_len()
    }
}

impl<'h> core::fmt::Debug for Captures<'h> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (i, name) in self.meta.nfa().group_names().enumerate() {
            let span = self.get(i).map(|m| (m.range(), m.as_str()));
            match name {
                Some(name) => map.entry(&format_args!("{}<{}>", i, name), &span),
                None => map.entry(&i, &span),
            };
        }
        map.finish()
    }
}

impl<'h> core::ops::Index<usize> for Captures<'h> {
    type Output = str;

    /// Returns the text of group `i`.
    ///
    /// # Panics
    ///
    /// If there is no group at index `i` or it didn't participate.
    fn index(&self, i: usize) -> &str {
        self.get(i)
            .map(|m| m.as_str())
            .unwrap_or_else(|| panic!("no group at index '{}'", i))
    }
}

impl<'h, 'n> core::ops::Index<&'n str> for Captures<'h> {
    type Output = str;

    /// Returns the text of the group named `name`.
    ///
    /// # Panics
    ///
    /// If there is no group named `name` or it didn't participate.
    fn index<'a>(&'a self, name: &'n str) -> &'a str {
        self.name(name)
            .map(|m| m.as_str())
            .unwrap_or_else(|| panic!("no group named '{}'", name))
    }
}

/// The raw offsets of every capture group, reusable across searches.
///
/// Created by [`Regex::capture_locations`] and filled in by
/// [`Regex::captures_read`].
#[derive(Clone, Debug)]
pub struct CaptureLocations(Vec<Option<NonMaxUsize>>);

impl CaptureLocations {
    /// Returns the start and end offsets of group `i`, if it participated
    /// in the last match.
    #[inline]
    pub fn get(&self, i: usize) -> Option<(usize, usize)> {
        match *self.0.chunks_exact(2).nth(i)? {
            [Some(start), Some(end)] => Some((start.get(), end.get())),
            _ => None,
        }
    }

    /// Returns the number of groups, including group 0.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len() / 2
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An iterator over all non-overlapping matches in a haystack.
///
/// Created by [`Regex::find_iter`].
#[derive(Debug)]
pub struct Matches<'r, 'h> {
    haystack: &'h str,
    it: pikevm::FindIter<'r, 'h>,
}

impl<'r, 'h> Iterator for Matches<'r, 'h> {
    type Item = Match<'h>;

    #[inline]
    fn next(&mut self) -> Option<Match<'h>> {
        self.it.next().map(|(s, e)| Match::new(self.haystack, s, e))
    }

    #[inline]
    fn count(self) -> usize {
        self.it.count()
    }
}

impl<'r, 'h> core::iter::FusedIterator for Matches<'r, 'h> {}

/// An iterator over the capture groups of all non-overlapping matches.
///
/// Created by [`Regex::captures_iter`].
#[derive(Debug)]
pub struct CaptureMatches<'r, 'h> {
    haystack: &'h str,
    re: &'r Regex,
    it: pikevm::CapturesIter<'r, 'h>,
}

impl<'r, 'h> Iterator for CaptureMatches<'r, 'h> {
    type Item = Captures<'h>;

    #[inline]
    fn next(&mut self) -> Option<Captures<'h>> {
        self.it.next().map(|slots| Captures {
            haystack: self.haystack,
            slots: CaptureLocations(slots),
            meta: Arc::clone(&self.re.meta),
        })
    }

    #[inline]
    fn count(self) -> usize {
        self.it.count()
    }
}

impl<'r, 'h> core::iter::FusedIterator for CaptureMatches<'r, 'h> {}

/// An iterator over the substrings between matches.
///
/// Created by [`Regex::split`].
#[derive(Debug)]
pub struct Split<'r, 'h> {
    haystack: &'h str,
    finder: Matches<'r, 'h>,
    /// Start of the next piece, or `None` once the final piece is out.
    rest: Option<usize>,
}

impl<'r, 'h> Iterator for Split<'r, 'h> {
    type Item = &'h str;

    #[inline]
    fn next(&mut self) -> Option<&'h str> {
        let start = self.rest?;
        let end = match self.finder.next() {
            Some(m) => {
                self.rest = Some(m.end());
                m.start()
            }
            None => {
                self.rest = None;
                self.haystack.len()
            }
        };
        Some(&self.haystack[start..end])
    }
}

impl<'r, 'h> core::iter::FusedIterator for Split<'r, 'h> {}

/// An iterator over at most `limit` substrings between matches.
///
/// Created by [`Regex::splitn`].
#[derive(Debug)]
pub struct SplitN<'r, 'h> {
    splits: Split<'r, 'h>,
    limit: usize,
}

impl<'r, 'h> Iterator for SplitN<'r, 'h> {
    type Item = &'h str;

    #[inline]
    fn next(&mut self) -> Option<&'h str> {
        match self.limit {
            0 => None,
            1 => {
                // The final piece runs to the end, matches and all.
                self.limit = 0;
                let start = self.splits.rest.take()?;
                Some(&self.splits.haystack[start..])
            }
            _ => {
                self.limit -= 1;
                self.splits.next()
            }
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.limit))
    }
}

impl<'r, 'h> core::iter::FusedIterator for SplitN<'r, 'h> {}

/// An iterator over the names of capture groups.
///
/// Created by [`Regex::capture_names`].
#[derive(Clone, Debug)]
pub struct CaptureNames<'r>(nfa::GroupNames<'r>);

impl<'r> Iterator for CaptureNames<'r> {
    type Item = Option<&'r str>;

    #[inline]
    fn next(&mut self) -> Option<Option<&'r str>> {
        self.0.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'r> ExactSizeIterator for CaptureNames<'r> {}

impl<'r> core::iter::FusedIterator for CaptureNames<'r> {}

/// An iterator over the groups of one match.
///
/// Created by [`Captures::iter`].
#[derive(Clone, Debug)]
pub struct SubCaptureMatches<'c, 'h> {
    caps: &'c Captures<'h>,
    indices: core::ops::Range<usize>,
}

impl<'c, 'h> Iterator for SubCaptureMatches<'c, 'h> {
    type Item = Option<Match<'h>>;

    #[inline]
    fn next(&mut self) -> Option<Option<Match<'h>>> {
        self.indices.next().map(|i| self.caps.get(i))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.indices.size_hint()
    }
}

impl<'c, 'h> ExactSizeIterator for SubCaptureMatches<'c, 'h> {}

impl<'c, 'h> core::iter::FusedIterator for SubCaptureMatches<'c, 'h> {}

/// Produces the replacement text for a match.
///
/// Implemented for template strings (`&str`, `String`, `Cow<str>`), for
/// closures `FnMut(&Captures) -> T` where `T: AsRef<str>`, and for
/// [`NoExpand`].
pub trait Replacer {
    /// Appends the replacement for the match in `caps` to `dst`.
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String);

    /// Returns the replacement text if it is the same for every match and
    /// needs no group expansion. Searching can then skip resolving groups.
    fn no_expansion<'r>(&'r mut self) -> Option<Cow<'r, str>> {
        None
    }

    /// Borrows this replacer so it can be used more than once.
    ///
    /// ```
    /// use rregex::{Regex, Replacer};
    ///
    /// fn replace_all_twice<R: Replacer>(re: &Regex, src: &str, mut rep: R) -> String {
    ///     let once = re.replace_all(src, rep.by_ref()).into_owned();
    ///     re.replace_all(&once, rep.by_ref()).into_owned()
    /// }
    ///
    /// let re = Regex::new("x").unwrap();
    /// let mut n = 0;
    /// let out = replace_all_twice(&re, "xx", |_: &rregex::Captures| {
    ///     n += 1;
    ///     if n < 3 { "x" } else { "y" }
    /// });
    /// assert_eq!("yy", out);
    /// ```
    fn by_ref<'r>(&'r mut self) -> ReplacerRef<'r, Self> {
        ReplacerRef(self)
    }
}

impl<'a> Replacer for &'a str {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<'a> Replacer for &'a String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl Replacer for String {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<'a> Replacer for Cow<'a, str> {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        caps.expand(self, dst);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        no_expansion(self)
    }
}

impl<F, T> Replacer for F
where
    F: FnMut(&Captures<'_>) -> T,
    T: AsRef<str>,
{
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        dst.push_str((*self)(caps).as_ref());
    }
}

/// A borrowed [`Replacer`], created by [`Replacer::by_ref`].
#[derive(Debug)]
pub struct ReplacerRef<'a, R: ?Sized>(&'a mut R);

impl<'a, R: Replacer + ?Sized + 'a> Replacer for ReplacerRef<'a, R> {
    fn replace_append(&mut self, caps: &Captures<'_>, dst: &mut String) {
        self.0.replace_append(caps, dst)
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        self.0.no_expansion()
    }
}

/// Replacement text used verbatim, with no `$` expansion.
///
/// ```
/// use rregex::{NoExpand, Regex};
///
/// let re = Regex::new(r"(\w+)").unwrap();
/// assert_eq!("$1 $1", re.replace_all("a b", NoExpand("$1")));
/// ```
#[derive(Clone, Debug)]
pub struct NoExpand<'t>(pub &'t str);

impl<'t> Replacer for NoExpand<'t> {
    fn replace_append(&mut self, _: &Captures<'_>, dst: &mut String) {
        dst.push_str(self.0);
    }

    fn no_expansion(&mut self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed(self.0))
    }
}

fn no_expansion<T: AsRef<str>>(t: &T) -> Option<Cow<'_, str>> {
    let s = t.as_ref();
    match memchr::memchr(b'$', s.as_bytes()) {
        Some(_) => None,
        None => Some(Cow::Borrowed(s)),
    }
}

/// Configures and compiles a [`Regex`].
///
/// Every flag set here is the initial state of the corresponding inline
/// flag, so the pattern can still override it, as in `(?-i)`.
///
/// ```
/// use rregex::RegexBuilder;
///
/// let re = RegexBuilder::new("^foo(?-i:BAR)$")
///     .case_insensitive(true)
///     .multi_line(true)
///     .build()
///     .unwrap();
/// assert!(re.is_match("x\nFOOBAR\ny"));
/// assert!(!re.is_match("foobar"));
/// ```
#[derive(Clone, Debug)]
pub struct RegexBuilder {
    pattern: String,
    syntax: hir::Config,
    limits: nfa::Config,
}

impl RegexBuilder {
    /// Creates a builder for `pattern` with the default configuration.
    pub fn new(pattern: &str) -> RegexBuilder {
        RegexBuilder {
            pattern: pattern.to_string(),
            syntax: hir::Config::default(),
            limits: nfa::Config::default(),
        }
    }

    /// Compiles the pattern.
    pub fn build(&self) -> Result<Regex, Error> {
        let (hir, names) = hir::parse(&self.syntax, &self.pattern)?;
        let nfa = NFA::new(self.limits, &hir, &names)?;
        let meta = Arc::new(Meta {
            pattern: self.pattern.as_str().into(),
            hir,
            pikevm: PikeVM::new(nfa),
        });
        let pool = new_pool(&meta);
        Ok(Regex { meta, pool })
    }

    /// The `i` flag: letters match both their upper and lower case forms.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.case_insensitive = yes;
        self
    }

    /// The `m` flag: `^` and `$` also match at the start and end of lines.
    pub fn multi_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.multi_line = yes;
        self
    }

    /// The `s` flag: `.` matches `\n`.
    pub fn dot_matches_new_line(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.dot_matches_new_line = yes;
        self
    }

    /// The `R` flag: `\r\n`, `\r` and `\n` all terminate lines for `^`,
    /// `$` and `.`.
    pub fn crlf(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.crlf = yes;
        self
    }

    /// The `U` flag: `a*` is lazy and `a*?` is greedy.
    pub fn swap_greed(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.swap_greed = yes;
        self
    }

    /// The `x` flag: whitespace in the pattern is ignored and `#` starts a
    /// comment.
    pub fn ignore_whitespace(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.ignore_whitespace = yes;
        self
    }

    /// The `u` flag, on by default. Disabling it makes `\w`, `\d`, `\s`,
    /// `\b` and case folding ASCII only.
    pub fn unicode(&mut self, yes: bool) -> &mut RegexBuilder {
        self.syntax.flags.unicode = yes;
        self
    }

    /// Sets the approximate heap limit, in bytes, of the compiled program.
    /// Exceeding it is an [`Error::ProgramTooLarge`]. The default is 10 MiB.
    pub fn size_limit(&mut self, limit: usize) -> &mut RegexBuilder {
        self.limits.size_limit = Some(limit);
        self
    }

    /// Sets how deeply groups, repetitions and classes may nest. The default
    /// is 250.
    pub fn nest_limit(&mut self, limit: u32) -> &mut RegexBuilder {
        self.syntax.nest_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync + core::panic::UnwindSafe>() {}

    #[test]
    fn regex_is_send_sync() {
        assert_send_sync::<Regex>();
    }

    #[test]
    fn clone_shares_program() {
        let re = Regex::new(r"(\w+) (\w+)").unwrap();
        let re2 = re.clone();
        assert!(Arc::ptr_eq(&re.meta, &re2.meta));
        assert_eq!("b a", re2.replace("a b", "$2 $1"));
    }

    #[test]
    fn display_and_debug() {
        let re = Regex::new(r"a\d+").unwrap();
        assert_eq!(r"a\d+", re.to_string());
        assert_eq!(r#"Regex("a\\d+")"#, format!("{:?}", re));
    }

    #[test]
    fn captures_debug() {
        let re = Regex::new(r"(?<x>a)(b)?").unwrap();
        let caps = re.captures("a").unwrap();
        assert_eq!(
            r#"{0: Some((0..1, "a")), 1<x>: Some((0..1, "a")), 2: None}"#,
            format!("{:?}", caps)
        );
    }

    #[test]
    fn capture_locations_reuse() {
        let re = Regex::new(r"(\d)(x)?").unwrap();
        let mut locs = re.capture_locations();
        assert_eq!(3, locs.len());
        re.captures_read(&mut locs, "a1x").unwrap();
        assert_eq!(Some((2, 3)), locs.get(2));
        re.captures_read(&mut locs, "2").unwrap();
        assert_eq!(Some((0, 1)), locs.get(1));
        assert_eq!(None, locs.get(2));
        assert_eq!(None, locs.get(3));
    }

    #[test]
    fn replace_fast_and_slow_paths() {
        let re = Regex::new(r"(\d+)").unwrap();
        assert_eq!("a#b#", re.replace_all("a1b22", "#"));
        assert_eq!("a<1>b<22>", re.replace_all("a1b22", "<$1>"));
        assert_eq!("a<1>b22", re.replacen("a1b22", 1, "<$1>"));
        assert_eq!("a<1>b<22>", re.replacen("a1b22", 0, "<$1>"));
        assert!(matches!(re.replace_all("abc", "<$1>"), Cow::Borrowed(_)));
        let doubled = re.replace_all("3 4", |caps: &Captures| {
            (caps[1].parse::<u32>().unwrap() * 2).to_string()
        });
        assert_eq!("6 8", doubled);
    }

    #[test]
    fn builder_flags() {
        let re = RegexBuilder::new("a.b").dot_matches_new_line(true).build().unwrap();
        assert!(re.is_match("a\nb"));
        let re = RegexBuilder::new("a+").swap_greed(true).build().unwrap();
        assert_eq!("a", re.find("aaa").unwrap().as_str());
        let re = RegexBuilder::new("a b # comment").ignore_whitespace(true).build().unwrap();
        assert!(re.is_match("ab"));
        let re = RegexBuilder::new(r"^\w+$").unicode(false).build().unwrap();
        assert!(!re.is_match("δ"));
        let err = RegexBuilder::new(r"\w{50}").size_limit(1000).build().unwrap_err();
        assert_eq!(Error::ProgramTooLarge(1000), err);
        let err = RegexBuilder::new("((a))").nest_limit(1).build().unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }
}
