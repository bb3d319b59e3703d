/*!
The high-level intermediate representation of a regular expression.

A [`Hir`] is what an [`Ast`](crate::ast::Ast) means once flags, escapes,
classes and Unicode properties have been resolved: literals are byte
strings, classes are canonical sets of ranges and captures carry their
final indices. Values are only built through smart constructors that keep
the tree normalized, e.g., adjacent literals are merged and `x{0}` becomes
the empty expression.
*/

use alloc::{boxed::Box, string::String, vec, vec::Vec};

use crate::{
    ast::{self, Span},
    hir::interval::{Interval, IntervalSet},
    unicode, utf8,
};

mod interval;
mod serialize;
pub mod translate;

/// Escapes all regular expression meta characters in `text`.
///
/// The string returned may be safely used as a literal in a regular
/// expression.
pub fn escape(text: &str) -> String {
    let mut buf = String::with_capacity(text.len());
    for ch in text.chars() {
        if is_meta_character(ch) {
            buf.push('\\');
        }
        buf.push(ch);
    }
    buf
}

/// Returns true if the given character has significance in a regex.
///
/// These are the characters that must be escaped to match their literal
/// meaning in every context.
pub(crate) fn is_meta_character(c: char) -> bool {
    matches!(
        c,
        '\\' | '.'
            | '+'
            | '*'
            | '?'
            | '('
            | ')'
            | '|'
            | '['
            | ']'
            | '{'
            | '}'
            | '^'
            | '$'
            | '#'
            | '&'
            | '-'
            | '~'
    )
}

/// Returns true if the given character can be escaped in a regex.
///
/// Besides every meta character, this includes ASCII punctuation without a
/// special meaning (so `\%` is a `%`). Letters, digits, `<` and `>` are
/// excluded because escapes using them either have a meaning of their own
/// or are reserved.
pub(crate) fn is_escapeable_character(c: char) -> bool {
    if is_meta_character(c) {
        return true;
    }
    if !c.is_ascii() {
        return false;
    }
    !matches!(c, '0'..='9' | 'A'..='Z' | 'a'..='z' | '<' | '>')
}

/// The configuration for parsing and translating a pattern.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Config {
    /// The maximum nesting depth of the pattern.
    pub(crate) nest_limit: u32,
    /// The flags in effect at the start of the pattern.
    pub(crate) flags: Flags,
    /// When enabled, translation fails for any construct that could match
    /// invalid UTF-8.
    pub(crate) utf8: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { nest_limit: 250, flags: Flags::default(), utf8: true }
    }
}

/// Various flags that control the interpretation of the pattern.
///
/// These can be set via explicit configuration in code, or change
/// dynamically during translation via inline flags. For example,
/// `foo(?i:bar)baz` matches `foo` and `baz` case sensitively and `bar` case
/// insensitively.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Flags {
    /// The `i` flag.
    pub(crate) case_insensitive: bool,
    /// The `m` flag: `^` and `$` match at line boundaries.
    pub(crate) multi_line: bool,
    /// The `s` flag: `.` matches `\n`.
    pub(crate) dot_matches_new_line: bool,
    /// The `U` flag: swap the meaning of greedy and lazy operators.
    pub(crate) swap_greed: bool,
    /// The `R` flag: `\r\n` is the line terminator for `^`, `$` and `.`.
    pub(crate) crlf: bool,
    /// The `x` flag: verbose mode.
    pub(crate) ignore_whitespace: bool,
    /// The `u` flag: Unicode mode. When disabled, classes and literals
    /// describe bytes.
    pub(crate) unicode: bool,
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            case_insensitive: false,
            multi_line: false,
            dot_matches_new_line: false,
            swap_greed: false,
            crlf: false,
            ignore_whitespace: false,
            unicode: true,
        }
    }
}

/// An error that occurred while translating an `Ast` into a `Hir`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    pattern: String,
    span: Span,
}

impl Error {
    /// The kind of this error.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The original pattern that failed to translate.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The span of the pattern where the error occurred.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        crate::error::render(
            f,
            "regex translate error",
            &self.pattern,
            &self.span,
            &self.kind,
        )
    }
}

/// The type of a translation error.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// A Unicode construct was used while Unicode mode was disabled.
    UnicodeNotAllowed,
    /// The construct could match invalid UTF-8 while UTF-8 mode is on.
    InvalidUtf8,
    /// A Unicode property name was not recognized.
    UnicodePropertyNotFound,
    /// A Unicode property value was not recognized.
    UnicodePropertyValueNotFound,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use self::ErrorKind::*;
        let msg = match *self {
            UnicodeNotAllowed => "Unicode not allowed here",
            InvalidUtf8 => "pattern can match invalid UTF-8",
            UnicodePropertyNotFound => "Unicode property not found",
            UnicodePropertyValueNotFound => "Unicode property value not found",
        };
        f.write_str(msg)
    }
}

/// A high-level intermediate representation for a regular expression.
///
/// The kind is only reachable by reference. Building a `Hir` goes through
/// the smart constructors, which also compute a few properties used by the
/// compiler and the search API.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hir {
    kind: HirKind,
    props: Properties,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Properties {
    is_start_anchored: bool,
    is_match_empty: bool,
    explicit_captures_len: usize,
    static_explicit_captures_len: Option<usize>,
}

impl Properties {
    fn leaf(is_match_empty: bool) -> Properties {
        Properties {
            is_start_anchored: false,
            is_match_empty,
            explicit_captures_len: 0,
            static_explicit_captures_len: Some(0),
        }
    }
}

/// The kind of an arbitrary `Hir` expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HirKind {
    /// The empty regular expression, which matches everything, including
    /// the empty string.
    Empty,
    /// A literal string that matches exactly these bytes.
    Literal(Literal),
    /// A single character class that matches any of the characters in the
    /// class. A class can either consist of Unicode scalar values as
    /// characters, or it can use bytes.
    Class(Class),
    /// A look-around assertion. A look-around match always has zero length.
    Look(Look),
    /// A repetition operation applied to a sub-expression.
    Repetition(Repetition),
    /// A capturing group, which contains a sub-expression.
    Capture(Capture),
    /// A concatenation of expressions.
    ///
    /// A concatenation always has at least two sub-expressions, and never
    /// contains another concatenation or two adjacent literals.
    Concat(Vec<Hir>),
    /// An alternation of expressions.
    ///
    /// An alternation always has at least two sub-expressions and never
    /// directly contains another alternation.
    Alternation(Vec<Hir>),
}

impl HirKind {
    /// Returns a slice of this kind's sub-expressions, if any.
    pub fn subs(&self) -> &[Hir] {
        use core::slice::from_ref;

        match *self {
            HirKind::Empty
            | HirKind::Literal(_)
            | HirKind::Class(_)
            | HirKind::Look(_) => &[],
            HirKind::Repetition(Repetition { ref sub, .. }) => from_ref(sub),
            HirKind::Capture(Capture { ref sub, .. }) => from_ref(sub),
            HirKind::Concat(ref subs) => subs,
            HirKind::Alternation(ref subs) => subs,
        }
    }
}

impl Hir {
    /// Returns the underlying kind of this expression.
    pub fn kind(&self) -> &HirKind {
        &self.kind
    }

    /// Consumes this expression and returns its kind.
    pub fn into_kind(mut self) -> HirKind {
        core::mem::replace(&mut self.kind, HirKind::Empty)
    }

    /// Returns true if this expression can only match at the beginning of
    /// a haystack.
    pub fn is_start_anchored(&self) -> bool {
        self.props.is_start_anchored
    }

    /// Returns true if this expression can match the empty string.
    pub fn is_match_empty(&self) -> bool {
        self.props.is_match_empty
    }

    /// The number of capture groups in this expression, not counting the
    /// implicit group for the whole match.
    pub fn explicit_captures_len(&self) -> usize {
        self.props.explicit_captures_len
    }

    /// If every match of this expression has the same number of
    /// participating explicit capture groups, then return that number.
    pub fn static_explicit_captures_len(&self) -> Option<usize> {
        self.props.static_explicit_captures_len
    }

    /// An expression that never matches anything: an empty byte class.
    pub fn fail() -> Hir {
        Hir {
            kind: HirKind::Class(Class::Bytes(ClassBytes::empty())),
            props: Properties::leaf(false),
        }
    }

    /// The empty expression, which matches the empty string everywhere.
    pub fn empty() -> Hir {
        Hir { kind: HirKind::Empty, props: Properties::leaf(true) }
    }

    /// A literal matching exactly the given bytes. An empty literal is the
    /// empty expression.
    pub fn literal<B: Into<Box<[u8]>>>(bytes: B) -> Hir {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Hir::empty();
        }
        Hir {
            kind: HirKind::Literal(Literal(bytes)),
            props: Properties::leaf(false),
        }
    }

    /// A class expression. An empty class never matches and becomes
    /// `Hir::fail()`. A class of exactly one character becomes a literal.
    pub fn class(class: Class) -> Hir {
        if class.is_empty() {
            return Hir::fail();
        }
        if let Some(bytes) = class.literal() {
            return Hir::literal(bytes);
        }
        Hir { kind: HirKind::Class(class), props: Properties::leaf(false) }
    }

    /// A zero-width assertion.
    pub fn look(look: Look) -> Hir {
        let mut props = Properties::leaf(true);
        props.is_start_anchored = look == Look::Start;
        Hir { kind: HirKind::Look(look), props }
    }

    /// A repetition. `x{0}` is the empty expression and `x{1}` is `x`.
    pub fn repetition(rep: Repetition) -> Hir {
        if rep.min == 0 && rep.max == Some(0) {
            return Hir::empty();
        } else if rep.min == 1 && rep.max == Some(1) {
            return *rep.sub;
        }
        let sub = rep.sub.props;
        let mut static_explicit_captures_len = sub.static_explicit_captures_len;
        // A sub-expression that may be skipped entirely makes the number of
        // participating groups vary, unless it has no groups at all.
        if rep.min == 0 && static_explicit_captures_len.map_or(false, |n| n > 0)
        {
            static_explicit_captures_len = None;
        }
        let props = Properties {
            is_start_anchored: rep.min > 0 && sub.is_start_anchored,
            is_match_empty: rep.min == 0 || sub.is_match_empty,
            explicit_captures_len: sub.explicit_captures_len,
            static_explicit_captures_len,
        };
        Hir { kind: HirKind::Repetition(rep), props }
    }

    /// A capturing group.
    pub fn capture(cap: Capture) -> Hir {
        let sub = cap.sub.props;
        let props = Properties {
            is_start_anchored: sub.is_start_anchored,
            is_match_empty: sub.is_match_empty,
            explicit_captures_len: sub.explicit_captures_len.saturating_add(1),
            static_explicit_captures_len: sub
                .static_explicit_captures_len
                .map(|n| n.saturating_add(1)),
        };
        Hir { kind: HirKind::Capture(cap), props }
    }

    /// A concatenation. Nested concatenations are flattened, adjacent
    /// literals are merged and empty expressions are dropped.
    pub fn concat(subs: Vec<Hir>) -> Hir {
        let mut flat: Vec<Hir> = Vec::with_capacity(subs.len());
        let mut pending: Vec<u8> = vec![];
        let mut stack: Vec<Hir> = subs.into_iter().rev().collect();
        while let Some(sub) = stack.pop() {
            match sub.kind {
                HirKind::Empty => {}
                HirKind::Literal(Literal(ref bytes)) => {
                    pending.extend_from_slice(bytes);
                }
                HirKind::Concat(_) => match sub.into_kind() {
                    HirKind::Concat(inner) => stack.extend(inner.into_iter().rev()),
                    _ => unreachable!(),
                },
                _ => {
                    if !pending.is_empty() {
                        flat.push(Hir::literal(core::mem::take(&mut pending)));
                    }
                    flat.push(sub);
                }
            }
        }
        if !pending.is_empty() {
            flat.push(Hir::literal(pending));
        }
        match flat.len() {
            0 => Hir::empty(),
            1 => flat.pop().unwrap_or_else(Hir::empty),
            _ => {
                let mut props = Properties {
                    is_start_anchored: flat[0].props.is_start_anchored,
                    is_match_empty: true,
                    explicit_captures_len: 0,
                    static_explicit_captures_len: Some(0),
                };
                for sub in flat.iter() {
                    props.is_match_empty &= sub.props.is_match_empty;
                    props.explicit_captures_len = props
                        .explicit_captures_len
                        .saturating_add(sub.props.explicit_captures_len);
                    props.static_explicit_captures_len = props
                        .static_explicit_captures_len
                        .zip(sub.props.static_explicit_captures_len)
                        .map(|(n1, n2)| n1.saturating_add(n2));
                }
                Hir { kind: HirKind::Concat(flat), props }
            }
        }
    }

    /// An alternation. Nested alternations are flattened. An empty
    /// alternation never matches.
    pub fn alternation(subs: Vec<Hir>) -> Hir {
        let mut flat: Vec<Hir> = Vec::with_capacity(subs.len());
        for sub in subs {
            match sub.kind {
                HirKind::Alternation(_) => match sub.into_kind() {
                    HirKind::Alternation(inner) => flat.extend(inner),
                    _ => unreachable!(),
                },
                _ => flat.push(sub),
            }
        }
        match flat.len() {
            0 => Hir::fail(),
            1 => flat.pop().unwrap_or_else(Hir::fail),
            _ => {
                let first = flat[0].props;
                let mut props = Properties {
                    is_start_anchored: first.is_start_anchored,
                    is_match_empty: first.is_match_empty,
                    explicit_captures_len: 0,
                    static_explicit_captures_len: first
                        .static_explicit_captures_len,
                };
                for sub in flat.iter() {
                    props.is_start_anchored &= sub.props.is_start_anchored;
                    props.is_match_empty |= sub.props.is_match_empty;
                    props.explicit_captures_len = props
                        .explicit_captures_len
                        .saturating_add(sub.props.explicit_captures_len);
                    if props.static_explicit_captures_len
                        != sub.props.static_explicit_captures_len
                    {
                        props.static_explicit_captures_len = None;
                    }
                }
                Hir { kind: HirKind::Alternation(flat), props }
            }
        }
    }

    /// Returns the "any character" class, matching any Unicode scalar value
    /// (or any byte, when `bytes` is true).
    pub(crate) fn dot(flags: Flags) -> Class {
        let mut class = if flags.unicode {
            Class::Unicode(ClassUnicode::new([ClassUnicodeRange::new(
                '\0',
                '\u{10FFFF}',
            )]))
        } else {
            Class::Bytes(ClassBytes::new([ClassBytesRange::new(0, 0xFF)]))
        };
        if !flags.dot_matches_new_line {
            class.remove_byte(b'\n');
            if flags.crlf {
                class.remove_byte(b'\r');
            }
        }
        class
    }
}

impl Drop for Hir {
    fn drop(&mut self) {
        use core::mem;

        match *self.kind() {
            HirKind::Empty
            | HirKind::Literal(_)
            | HirKind::Class(_)
            | HirKind::Look(_) => return,
            HirKind::Capture(ref x) if x.sub.kind.subs().is_empty() => return,
            HirKind::Repetition(ref x) if x.sub.kind.subs().is_empty() => {
                return
            }
            HirKind::Concat(ref x) if x.is_empty() => return,
            HirKind::Alternation(ref x) if x.is_empty() => return,
            _ => {}
        }

        let mut stack = vec![mem::replace(self, Hir::empty())];
        while let Some(mut expr) = stack.pop() {
            match expr.kind {
                HirKind::Empty
                | HirKind::Literal(_)
                | HirKind::Class(_)
                | HirKind::Look(_) => {}
                HirKind::Capture(ref mut x) => {
                    stack.push(mem::replace(&mut x.sub, Hir::empty()));
                }
                HirKind::Repetition(ref mut x) => {
                    stack.push(mem::replace(&mut x.sub, Hir::empty()));
                }
                HirKind::Concat(ref mut x) => stack.extend(x.drain(..)),
                HirKind::Alternation(ref mut x) => stack.extend(x.drain(..)),
            }
        }
    }
}

/// A literal string of bytes. In UTF-8 mode the bytes are always valid
/// UTF-8.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Literal(pub Box<[u8]>);

/// A character class: either a set of Unicode scalar values or a set of
/// bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Class {
    /// A set of Unicode scalar values.
    Unicode(ClassUnicode),
    /// A set of bytes.
    Bytes(ClassBytes),
}

impl Class {
    /// Returns true if this class matches nothing.
    pub fn is_empty(&self) -> bool {
        match *self {
            Class::Unicode(ref x) => x.ranges().is_empty(),
            Class::Bytes(ref x) => x.ranges().is_empty(),
        }
    }

    /// If this class matches exactly one character, then return its
    /// encoding.
    fn literal(&self) -> Option<Vec<u8>> {
        match *self {
            Class::Unicode(ref x) => {
                let c = x.single()?;
                let mut buf = [0; 4];
                Some(c.encode_utf8(&mut buf).as_bytes().to_vec())
            }
            Class::Bytes(ref x) => Some(vec![x.single()?]),
        }
    }

    /// Removes one ASCII byte from this class.
    fn remove_byte(&mut self, byte: u8) {
        match *self {
            Class::Unicode(ref mut x) => {
                let c = char::from(byte);
                x.difference(&ClassUnicode::new([ClassUnicodeRange::new(c, c)]));
            }
            Class::Bytes(ref mut x) => {
                x.difference(&ClassBytes::new([ClassBytesRange::new(byte, byte)]));
            }
        }
    }

    /// Returns true if this class only matches ASCII.
    pub fn is_ascii(&self) -> bool {
        match *self {
            Class::Unicode(ref x) => {
                x.ranges().last().map_or(true, |r| r.end <= '\x7F')
            }
            Class::Bytes(ref x) => {
                x.ranges().last().map_or(true, |r| r.end <= 0x7F)
            }
        }
    }
}

/// A set of characters represented by Unicode scalar values.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassUnicode {
    set: IntervalSet<ClassUnicodeRange>,
}

impl ClassUnicode {
    /// Create a new class from a sequence of ranges, in any order.
    pub fn new<I>(ranges: I) -> ClassUnicode
    where
        I: IntoIterator<Item = ClassUnicodeRange>,
    {
        ClassUnicode { set: IntervalSet::new(ranges) }
    }

    /// Create a new class with no ranges.
    pub fn empty() -> ClassUnicode {
        ClassUnicode::new(vec![])
    }

    /// Add a new range to this set.
    pub fn push(&mut self, range: ClassUnicodeRange) {
        self.set.push(range);
    }

    /// The sorted, non-overlapping, non-adjacent ranges of this class.
    pub fn ranges(&self) -> &[ClassUnicodeRange] {
        self.set.intervals()
    }

    /// Returns true if this class contains `c`.
    pub fn contains(&self, c: char) -> bool {
        self.set.contains(c)
    }

    /// Negate this class.
    pub fn negate(&mut self) {
        self.set.negate();
    }

    /// Union this class with the given class, in place.
    pub fn union(&mut self, other: &ClassUnicode) {
        self.set.union(&other.set);
    }

    /// Intersect this class with the given class, in place.
    pub fn intersect(&mut self, other: &ClassUnicode) {
        self.set.intersect(&other.set);
    }

    /// Subtract the given class from this class, in place.
    pub fn difference(&mut self, other: &ClassUnicode) {
        self.set.difference(&other.set);
    }

    /// Compute the symmetric difference with the given class, in place.
    pub fn symmetric_difference(&mut self, other: &ClassUnicode) {
        self.set.symmetric_difference(&other.set);
    }

    /// Expand this class to be closed under simple case folding, using the
    /// given case mapping table.
    pub(crate) fn case_fold_simple(&mut self, folder: &unicode::CaseFolder) {
        let mut added = folder.fold(self.ranges());
        while !added.is_empty() {
            let before = self.clone();
            for c in added {
                self.push(ClassUnicodeRange::new(c, c));
            }
            if *self == before {
                break;
            }
            added = folder.fold(self.ranges());
        }
    }

    /// Converts this class to a byte class if all of its ranges are ASCII.
    pub fn to_byte_class(&self) -> Option<ClassBytes> {
        if !Class::Unicode(self.clone()).is_ascii() {
            return None;
        }
        Some(ClassBytes::new(self.ranges().iter().map(|r| {
            // Both ends are ASCII, checked above.
            ClassBytesRange::new(r.start as u8, r.end as u8)
        })))
    }

    fn single(&self) -> Option<char> {
        match *self.ranges() {
            [ClassUnicodeRange { start, end }] if start == end => Some(start),
            _ => None,
        }
    }
}

/// A single range of characters represented by Unicode scalar values.
///
/// Both ends are inclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub struct ClassUnicodeRange {
    start: char,
    end: char,
}

impl ClassUnicodeRange {
    /// Create a new range. The bounds are swapped if out of order.
    pub fn new(start: char, end: char) -> ClassUnicodeRange {
        ClassUnicodeRange::create(start, end)
    }

    /// The start of this range.
    pub fn start(&self) -> char {
        self.start
    }

    /// The end of this range.
    pub fn end(&self) -> char {
        self.end
    }

    /// The number of codepoints in this range. Surrogates are counted when
    /// the range spans them.
    pub fn len(&self) -> usize {
        let diff = 1 + u32::from(self.end) - u32::from(self.start);
        diff as usize
    }
}

impl Interval for ClassUnicodeRange {
    type Bound = char;

    fn lower(&self) -> char {
        self.start
    }
    fn upper(&self) -> char {
        self.end
    }
    fn set_lower(&mut self, bound: char) {
        self.start = bound;
    }
    fn set_upper(&mut self, bound: char) {
        self.end = bound;
    }
}

/// A set of bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassBytes {
    set: IntervalSet<ClassBytesRange>,
}

impl ClassBytes {
    /// Create a new class from a sequence of ranges, in any order.
    pub fn new<I>(ranges: I) -> ClassBytes
    where
        I: IntoIterator<Item = ClassBytesRange>,
    {
        ClassBytes { set: IntervalSet::new(ranges) }
    }

    /// Create a new class with no ranges.
    pub fn empty() -> ClassBytes {
        ClassBytes::new(vec![])
    }

    /// Add a new range to this set.
    pub fn push(&mut self, range: ClassBytesRange) {
        self.set.push(range);
    }

    /// The sorted, non-overlapping, non-adjacent ranges of this class.
    pub fn ranges(&self) -> &[ClassBytesRange] {
        self.set.intervals()
    }

    /// Negate this class.
    pub fn negate(&mut self) {
        self.set.negate();
    }

    /// Union this class with the given class, in place.
    pub fn union(&mut self, other: &ClassBytes) {
        self.set.union(&other.set);
    }

    /// Intersect this class with the given class, in place.
    pub fn intersect(&mut self, other: &ClassBytes) {
        self.set.intersect(&other.set);
    }

    /// Subtract the given class from this class, in place.
    pub fn difference(&mut self, other: &ClassBytes) {
        self.set.difference(&other.set);
    }

    /// Compute the symmetric difference with the given class, in place.
    pub fn symmetric_difference(&mut self, other: &ClassBytes) {
        self.set.symmetric_difference(&other.set);
    }

    /// Expand this class so that ASCII letters match case insensitively.
    pub fn case_fold_simple(&mut self) {
        let mut folded = vec![];
        for r in self.ranges() {
            for (lo, hi, delta) in [(b'a', b'z', -32i16), (b'A', b'Z', 32)] {
                let (s, e) = (r.start.max(lo), r.end.min(hi));
                if s <= e {
                    let shift = |b: u8| (i16::from(b) + delta) as u8;
                    folded.push(ClassBytesRange::new(shift(s), shift(e)));
                }
            }
        }
        for range in folded {
            self.push(range);
        }
    }

    /// Converts this class to a Unicode class, if it is all ASCII.
    pub fn to_unicode_class(&self) -> Option<ClassUnicode> {
        if self.ranges().last().map_or(false, |r| r.end > 0x7F) {
            return None;
        }
        Some(ClassUnicode::new(self.ranges().iter().map(|r| {
            ClassUnicodeRange::new(char::from(r.start), char::from(r.end))
        })))
    }

    fn single(&self) -> Option<u8> {
        match *self.ranges() {
            [ClassBytesRange { start, end }] if start == end => Some(start),
            _ => None,
        }
    }
}

/// A single range of bytes.
///
/// Both ends are inclusive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, PartialOrd, Ord)]
pub struct ClassBytesRange {
    start: u8,
    end: u8,
}

impl ClassBytesRange {
    /// Create a new range. The bounds are swapped if out of order.
    pub fn new(start: u8, end: u8) -> ClassBytesRange {
        ClassBytesRange::create(start, end)
    }

    /// The start of this range.
    pub fn start(&self) -> u8 {
        self.start
    }

    /// The end of this range.
    pub fn end(&self) -> u8 {
        self.end
    }

    /// The number of bytes in this range.
    pub fn len(&self) -> usize {
        usize::from(self.end) - usize::from(self.start) + 1
    }
}

impl Interval for ClassBytesRange {
    type Bound = u8;

    fn lower(&self) -> u8 {
        self.start
    }
    fn upper(&self) -> u8 {
        self.end
    }
    fn set_lower(&mut self, bound: u8) {
        self.start = bound;
    }
    fn set_upper(&mut self, bound: u8) {
        self.end = bound;
    }
}

/// A look-around assertion. Every assertion matches the empty string.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Look {
    /// Match the beginning of text.
    Start,
    /// Match the end of text.
    End,
    /// Match the beginning of text or the position after a `\n`.
    StartLF,
    /// Match the end of text or the position before a `\n`.
    EndLF,
    /// Match the beginning of text or the position after a `\r` or `\n`,
    /// but never between a `\r` and a `\n`.
    StartCRLF,
    /// Match the end of text or the position before a `\r` or `\n`, but
    /// never between a `\r` and a `\n`.
    EndCRLF,
    /// An ASCII word boundary.
    WordAscii,
    /// An ASCII "not a word boundary".
    WordAsciiNegate,
    /// A Unicode word boundary.
    WordUnicode,
    /// A Unicode "not a word boundary".
    WordUnicodeNegate,
    /// The start of an ASCII word: a non-word character (or the start of
    /// text) on the left and a word character on the right.
    WordStartAscii,
    /// The end of an ASCII word.
    WordEndAscii,
    /// The start of a Unicode word.
    WordStartUnicode,
    /// The end of a Unicode word.
    WordEndUnicode,
    /// No ASCII word character on the left.
    WordStartHalfAscii,
    /// No ASCII word character on the right.
    WordEndHalfAscii,
    /// No Unicode word character on the left.
    WordStartHalfUnicode,
    /// No Unicode word character on the right.
    WordEndHalfUnicode,
}

impl Look {
    /// The name of this variant.
    pub fn as_str(&self) -> &'static str {
        use self::Look::*;
        match *self {
            Start => "Start",
            End => "End",
            StartLF => "StartLF",
            EndLF => "EndLF",
            StartCRLF => "StartCRLF",
            EndCRLF => "EndCRLF",
            WordAscii => "WordAscii",
            WordAsciiNegate => "WordAsciiNegate",
            WordUnicode => "WordUnicode",
            WordUnicodeNegate => "WordUnicodeNegate",
            WordStartAscii => "WordStartAscii",
            WordEndAscii => "WordEndAscii",
            WordStartUnicode => "WordStartUnicode",
            WordEndUnicode => "WordEndUnicode",
            WordStartHalfAscii => "WordStartHalfAscii",
            WordEndHalfAscii => "WordEndHalfAscii",
            WordStartHalfUnicode => "WordStartHalfUnicode",
            WordEndHalfUnicode => "WordEndHalfUnicode",
        }
    }

    /// Returns true if the given position in the given haystack satisfies
    /// this assertion. Positions past the end never match.
    pub fn is_match(&self, haystack: &[u8], at: usize) -> bool {
        use self::Look::*;

        if at > haystack.len() {
            return false;
        }
        let before = |b| at > 0 && haystack[at - 1] == b;
        let after = |b| at < haystack.len() && haystack[at] == b;
        match *self {
            Start => at == 0,
            End => at == haystack.len(),
            StartLF => at == 0 || before(b'\n'),
            EndLF => at == haystack.len() || after(b'\n'),
            StartCRLF => {
                at == 0 || before(b'\n') || (before(b'\r') && !after(b'\n'))
            }
            EndCRLF => {
                at == haystack.len()
                    || after(b'\r')
                    || (after(b'\n') && !before(b'\r'))
            }
            WordAscii => {
                let (b, a) = word_ascii(haystack, at);
                b != a
            }
            WordAsciiNegate => {
                let (b, a) = word_ascii(haystack, at);
                b == a
            }
            WordStartAscii => {
                let (b, a) = word_ascii(haystack, at);
                !b && a
            }
            WordEndAscii => {
                let (b, a) = word_ascii(haystack, at);
                b && !a
            }
            WordStartHalfAscii => !word_ascii(haystack, at).0,
            WordEndHalfAscii => !word_ascii(haystack, at).1,
            WordUnicode => {
                let (b, a) = word_unicode(haystack, at);
                b != a
            }
            WordUnicodeNegate => {
                let (b, a) = word_unicode(haystack, at);
                b == a
            }
            WordStartUnicode => {
                let (b, a) = word_unicode(haystack, at);
                !b && a
            }
            WordEndUnicode => {
                let (b, a) = word_unicode(haystack, at);
                b && !a
            }
            WordStartHalfUnicode => !word_unicode(haystack, at).0,
            WordEndHalfUnicode => !word_unicode(haystack, at).1,
        }
    }
}

/// Whether the bytes immediately before and after `at` are ASCII word
/// bytes.
fn word_ascii(haystack: &[u8], at: usize) -> (bool, bool) {
    let before = at > 0 && utf8::is_word_byte(haystack[at - 1]);
    let after = at < haystack.len() && utf8::is_word_byte(haystack[at]);
    (before, after)
}

/// Whether the characters immediately before and after `at` are Unicode
/// word characters. Invalid UTF-8 counts as a non-word character.
fn word_unicode(haystack: &[u8], at: usize) -> (bool, bool) {
    let before = utf8::decode_last(&haystack[..at])
        .0
        .map_or(false, unicode::is_word_character);
    let after = utf8::decode(&haystack[at..])
        .0
        .map_or(false, unicode::is_word_character);
    (before, after)
}

/// A repetition operator applied to a sub-expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repetition {
    /// The minimum number of times the sub-expression must match.
    pub min: u32,
    /// The maximum number of times the sub-expression may match, or `None`
    /// when unbounded.
    pub max: Option<u32>,
    /// Whether this repetition prefers more iterations (greedy) or fewer
    /// (lazy).
    pub greedy: bool,
    /// The expression being repeated.
    pub sub: Box<Hir>,
}

/// A capturing group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Capture {
    /// The capture index. The implicit group of the whole match has index
    /// 0, so explicit groups start at 1.
    pub index: u32,
    /// The name of the group, if it has one.
    pub name: Option<Box<str>>,
    /// The expression inside the group, which may be empty.
    pub sub: Box<Hir>,
}

/// Parses and translates `pattern` with the given configuration. On
/// success, returns the expression along with the name of every explicit
/// capture group, indexed by capture index minus one.
pub(crate) fn parse(
    config: &Config,
    pattern: &str,
) -> Result<(Hir, Vec<Option<Box<str>>>), crate::Error> {
    let ast = ast::parse::ParserBuilder::new()
        .nest_limit(config.nest_limit)
        .ignore_whitespace(config.flags.ignore_whitespace)
        .build()
        .parse(pattern)?;
    let mut translator = translate::TranslatorBuilder::from_config(config).build();
    let hir = translator.translate(pattern, &ast)?;
    Ok((hir, translator.capture_names().to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit(s: &str) -> Hir {
        Hir::literal(s.as_bytes())
    }

    #[test]
    fn escape_meta() {
        assert_eq!(r"\[a\-z\]\+\.", escape("[a-z]+."));
        assert_eq!("☃%", escape("☃%"));
    }

    #[test]
    fn escapeable() {
        assert!(is_escapeable_character('%'));
        assert!(is_escapeable_character('-'));
        assert!(!is_escapeable_character('e'));
        assert!(!is_escapeable_character('<'));
        assert!(!is_escapeable_character('☃'));
    }

    #[test]
    fn concat_merges_literals() {
        let hir = Hir::concat(vec![
            lit("a"),
            Hir::concat(vec![lit("b"), lit("c")]),
            Hir::empty(),
            Hir::look(Look::End),
            lit("d"),
        ]);
        match *hir.kind() {
            HirKind::Concat(ref subs) => {
                assert_eq!(3, subs.len());
                assert_eq!(lit("abc"), subs[0]);
                assert_eq!(Hir::look(Look::End), subs[1]);
                assert_eq!(lit("d"), subs[2]);
            }
            ref kind => panic!("{:?}", kind),
        }
        assert_eq!(lit("ab"), Hir::concat(vec![lit("a"), lit("b")]));
        assert_eq!(Hir::empty(), Hir::concat(vec![]));
    }

    #[test]
    fn degenerate_constructors() {
        assert_eq!(Hir::fail(), Hir::alternation(vec![]));
        assert_eq!(lit("a"), Hir::alternation(vec![lit("a")]));
        assert_eq!(
            Hir::fail(),
            Hir::class(Class::Unicode(ClassUnicode::empty()))
        );
        let single = ClassUnicode::new([ClassUnicodeRange::new('☃', '☃')]);
        assert_eq!(lit("☃"), Hir::class(Class::Unicode(single)));
        let rep = |min, max| {
            Hir::repetition(Repetition {
                min,
                max,
                greedy: true,
                sub: Box::new(lit("a")),
            })
        };
        assert_eq!(Hir::empty(), rep(0, Some(0)));
        assert_eq!(lit("a"), rep(1, Some(1)));
    }

    #[test]
    fn properties() {
        let cap = |sub| {
            Hir::capture(Capture { index: 1, name: None, sub: Box::new(sub) })
        };
        let hir = Hir::concat(vec![Hir::look(Look::Start), cap(lit("a"))]);
        assert!(hir.is_start_anchored());
        assert!(!hir.is_match_empty());
        assert_eq!(1, hir.explicit_captures_len());
        assert_eq!(Some(1), hir.static_explicit_captures_len());

        let alt = Hir::alternation(vec![cap(lit("a")), lit("b")]);
        assert_eq!(None, alt.static_explicit_captures_len());
        assert_eq!(1, alt.explicit_captures_len());
        let opt = Hir::repetition(Repetition {
            min: 0,
            max: Some(1),
            greedy: true,
            sub: Box::new(cap(lit("a"))),
        });
        assert!(opt.is_match_empty());
        assert_eq!(None, opt.static_explicit_captures_len());
    }

    #[test]
    fn dot_classes() {
        let flags = Flags::default();
        match Hir::dot(flags) {
            Class::Unicode(ref cls) => {
                assert!(!cls.contains('\n'));
                assert!(cls.contains('\r'));
                assert!(cls.contains('\u{10FFFF}'));
            }
            ref cls => panic!("{:?}", cls),
        }
        let crlf = Flags { crlf: true, ..flags };
        match Hir::dot(crlf) {
            Class::Unicode(ref cls) => assert!(!cls.contains('\r')),
            ref cls => panic!("{:?}", cls),
        }
        let bytes = Flags { unicode: false, dot_matches_new_line: true, ..flags };
        assert!(!Hir::dot(bytes).is_ascii());
    }

    #[test]
    fn look_lines() {
        let hay = b"a\r\nb";
        assert!(Look::StartLF.is_match(hay, 3));
        assert!(!Look::StartLF.is_match(hay, 2));
        assert!(Look::StartCRLF.is_match(hay, 3));
        assert!(!Look::StartCRLF.is_match(hay, 2));
        assert!(Look::EndCRLF.is_match(hay, 1));
        assert!(!Look::EndCRLF.is_match(hay, 2));
        assert!(!Look::End.is_match(hay, 5));
    }

    #[test]
    fn look_words() {
        let hay = "aδ b".as_bytes();
        // Between 'a' and 'δ': an ASCII boundary but not a Unicode one.
        assert!(Look::WordAscii.is_match(hay, 1));
        assert!(!Look::WordUnicode.is_match(hay, 1));
        assert!(Look::WordEndUnicode.is_match(hay, 3));
        assert!(Look::WordStartUnicode.is_match(hay, 4));
        assert!(Look::WordStartHalfUnicode.is_match(hay, 0));
        assert!(!Look::WordEndHalfUnicode.is_match(hay, 0));
        assert!(Look::WordAsciiNegate.is_match(hay, 2));
    }

    #[test]
    fn byte_class_case_fold() {
        let mut cls = ClassBytes::new([ClassBytesRange::new(b'X', b'c')]);
        cls.case_fold_simple();
        let got: Vec<(u8, u8)> =
            cls.ranges().iter().map(|r| (r.start(), r.end())).collect();
        assert_eq!(vec![(b'A', b'C'), (b'X', b'c'), (b'x', b'z')], got);
    }

    #[test]
    fn drop_deep() {
        let mut hir = lit("a");
        for _ in 0..100_000 {
            hir = Hir::capture(Capture { index: 1, name: None, sub: Box::new(hir) });
        }
        drop(hir);
    }
}
