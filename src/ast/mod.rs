/*!
The abstract syntax of a regular expression.

An [`Ast`] mirrors the concrete syntax of a pattern closely: every node
carries the span of the pattern it came from, escapes remember how they were
written and inline flags appear where they were set. Nothing is resolved
yet. Translating an `Ast` into a [`Hir`](crate::hir::Hir) is the job of
[`Translator`](crate::hir::translate::Translator).
*/

use alloc::{boxed::Box, string::String, vec::Vec};

pub mod parse;

/// An error that occurred while parsing a pattern into an [`Ast`].
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

    /// The original pattern that failed to parse.
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
            "regex parse error",
            &self.pattern,
            &self.span,
            &self.kind,
        )
    }
}

/// The type of a parse error.
#[derive(Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The number of capture groups exceeds `u32::MAX`.
    CaptureLimitExceeded,
    /// An invalid escape sequence was found inside a character class set.
    ClassEscapeInvalid,
    /// An invalid range was found, i.e., the start is greater than the end.
    ClassRangeInvalid,
    /// A range where an endpoint is a class instead of a single character.
    ClassRangeLiteral,
    /// A bracketed class was opened but never closed.
    ClassUnclosed,
    /// A decimal number was expected but none was found.
    DecimalEmpty,
    /// A decimal number was too big to fit in a `u32`.
    DecimalInvalid,
    /// A hexadecimal number was expected but none was found.
    EscapeHexEmpty,
    /// A hexadecimal number did not map to a Unicode scalar value.
    EscapeHexInvalid,
    /// A non-hexadecimal digit was found where one was expected.
    EscapeHexInvalidDigit,
    /// The pattern ended in the middle of an escape sequence.
    EscapeUnexpectedEof,
    /// An escape sequence this parser does not recognize.
    EscapeUnrecognized,
    /// A dangling negation was found in a set of flags, e.g., `(?i-)`.
    FlagDanglingNegation,
    /// The same flag appeared more than once in one set of flags.
    FlagDuplicate,
    /// The negation operator appeared more than once, e.g., `(?-i-s)`.
    FlagRepeatedNegation,
    /// The pattern ended while parsing flags.
    FlagUnexpectedEof,
    /// An unrecognized flag.
    FlagUnrecognized,
    /// A capture group name was used twice.
    GroupNameDuplicate,
    /// A capture group name was empty, e.g., `(?P<>a)`.
    GroupNameEmpty,
    /// A capture group name contains an invalid character.
    GroupNameInvalid,
    /// The pattern ended before a capture group name was closed.
    GroupNameUnexpectedEof,
    /// A group was opened but never closed.
    GroupUnclosed,
    /// A group was closed but never opened.
    GroupUnopened,
    /// The nest limit was exceeded. The value is the configured limit.
    NestLimitExceeded(u32),
    /// A counted repetition was opened but never closed.
    RepetitionCountUnclosed,
    /// A counted repetition where `min > max`.
    RepetitionCountInvalid,
    /// A repetition operator with nothing to repeat.
    RepetitionMissing,
    /// A special word boundary like `\b{start}` was malformed.
    SpecialWordBoundaryUnclosed,
    /// A special word boundary name was not recognized.
    SpecialWordBoundaryUnrecognized,
    /// `\b{` was followed by the end of the pattern.
    SpecialWordOrRepetitionUnexpectedEof,
    /// A Unicode class like `\p{...}` was opened but never closed.
    UnicodeClassUnclosed,
    /// Look-around such as `(?=...)` was used.
    UnsupportedLookAround,
    /// A backreference such as `\1` was used.
    UnsupportedBackreference,
    /// An empty flag directive, `(?)`.
    FlagsEmpty,
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        use self::ErrorKind::*;
        match *self {
            CaptureLimitExceeded => write!(
                f,
                "exceeded the maximum number of capturing groups ({})",
                u32::MAX
            ),
            ClassEscapeInvalid => {
                write!(f, "invalid escape sequence found in character class")
            }
            ClassRangeInvalid => write!(
                f,
                "invalid character class range, \
                 the start must be <= the end"
            ),
            ClassRangeLiteral => {
                write!(f, "invalid range boundary, must be a literal")
            }
            ClassUnclosed => write!(f, "unclosed character class"),
            DecimalEmpty => write!(f, "decimal literal empty"),
            DecimalInvalid => write!(f, "decimal literal invalid"),
            EscapeHexEmpty => write!(f, "hexadecimal literal empty"),
            EscapeHexInvalid => {
                write!(f, "hexadecimal literal is not a Unicode scalar value")
            }
            EscapeHexInvalidDigit => write!(f, "invalid hexadecimal digit"),
            EscapeUnexpectedEof => write!(
                f,
                "incomplete escape sequence, \
                 reached end of pattern prematurely"
            ),
            EscapeUnrecognized => write!(f, "unrecognized escape sequence"),
            FlagDanglingNegation => {
                write!(f, "dangling flag negation operator")
            }
            FlagDuplicate => write!(f, "duplicate flag"),
            FlagRepeatedNegation => {
                write!(f, "flag negation operator repeated")
            }
            FlagUnexpectedEof => {
                write!(f, "expected flag but got end of regex")
            }
            FlagUnrecognized => write!(f, "unrecognized flag"),
            FlagsEmpty => write!(f, "empty flag directive is not allowed"),
            GroupNameDuplicate => write!(f, "duplicate capture group name"),
            GroupNameEmpty => write!(f, "empty capture group name"),
            GroupNameInvalid => write!(f, "invalid capture group character"),
            GroupNameUnexpectedEof => write!(f, "unclosed capture group name"),
            GroupUnclosed => write!(f, "unclosed group"),
            GroupUnopened => write!(f, "unopened group"),
            NestLimitExceeded(limit) => write!(
                f,
                "exceed the maximum number of \
                 nested parentheses/brackets ({})",
                limit
            ),
            RepetitionCountUnclosed => {
                write!(f, "unclosed counted repetition")
            }
            RepetitionCountInvalid => write!(
                f,
                "invalid repetition range, \
                 the start must be <= the end"
            ),
            RepetitionMissing => {
                write!(f, "repetition operator missing expression")
            }
            SpecialWordBoundaryUnclosed => write!(
                f,
                "special word boundary assertion is either \
                 unclosed or contains an invalid character",
            ),
            SpecialWordBoundaryUnrecognized => write!(
                f,
                "unrecognized special word boundary assertion, \
                 valid choices are: start, end, start-half \
                 or end-half",
            ),
            SpecialWordOrRepetitionUnexpectedEof => write!(
                f,
                "found either the beginning of a special word \
                 boundary or a bounded repetition on a \\b with \
                 an opening brace, but no closing brace",
            ),
            UnicodeClassUnclosed => {
                write!(f, "unclosed Unicode class, expected '}}'")
            }
            UnsupportedLookAround => write!(
                f,
                "look-around, including look-ahead and look-behind, \
                 is not supported"
            ),
            UnsupportedBackreference => {
                write!(f, "backreferences are not supported")
            }
        }
    }
}

/// A half-open byte range `[start, end)` into a pattern string.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Span {
    /// The start byte offset.
    pub start: usize,
    /// The end byte offset, exclusive.
    pub end: usize,
}

impl Span {
    /// Create a new span.
    pub fn new(start: usize, end: usize) -> Span {
        Span { start, end }
    }

    /// Create a new span with the given end offset.
    pub fn with_end(self, end: usize) -> Span {
        Span { end, ..self }
    }

    /// Create a new span with the given start offset.
    pub fn with_start(self, start: usize) -> Span {
        Span { start, ..self }
    }
}

/// An abstract syntax tree for a single regular expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Ast {
    /// An empty regex that matches everything.
    Empty(Span),
    /// A set of flags, e.g., `(?is)`, that applies to the rest of the
    /// enclosing group.
    Flags(SetFlags),
    /// A single character literal, which includes escape sequences.
    Literal(Literal),
    /// The "any character" class.
    Dot(Span),
    /// A single zero-width assertion.
    Assertion(Assertion),
    /// A single character class: Unicode, Perl or bracketed.
    Class(Class),
    /// A repetition operator applied to an arbitrary regular expression.
    Repetition(Repetition),
    /// A grouped regular expression.
    Group(Group),
    /// An alternation of regular expressions.
    Alternation(Alternation),
    /// A concatenation of regular expressions.
    Concat(Concat),
}

impl Ast {
    /// Return the span of this abstract syntax tree.
    pub fn span(&self) -> &Span {
        match *self {
            Ast::Empty(ref span) | Ast::Dot(ref span) => span,
            Ast::Flags(ref x) => &x.span,
            Ast::Literal(ref x) => &x.span,
            Ast::Assertion(ref x) => &x.span,
            Ast::Class(ref x) => x.span(),
            Ast::Repetition(ref x) => &x.span,
            Ast::Group(ref x) => &x.span,
            Ast::Alternation(ref x) => &x.span,
            Ast::Concat(ref x) => &x.span,
        }
    }

    /// Return the sub-expressions of this node.
    fn subs(&self) -> &[Ast] {
        use core::slice::from_ref;

        match *self {
            Ast::Repetition(ref x) => from_ref(&x.ast),
            Ast::Group(ref x) => from_ref(&x.ast),
            Ast::Alternation(ref x) => &x.asts,
            Ast::Concat(ref x) => &x.asts,
            _ => &[],
        }
    }
}

/// An alternation of regular expressions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Alternation {
    /// The span of this alternation.
    pub span: Span,
    /// The alternate regular expressions.
    pub asts: Vec<Ast>,
}

impl Alternation {
    /// Return this alternation as an AST, unwrapping a lone branch.
    pub fn into_ast(mut self) -> Ast {
        match self.asts.len() {
            0 => Ast::Empty(self.span),
            1 => self.asts.pop().unwrap_or(Ast::Empty(self.span)),
            _ => Ast::Alternation(self),
        }
    }
}

/// A concatenation of regular expressions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Concat {
    /// The span of this concatenation.
    pub span: Span,
    /// The concatenation regular expressions.
    pub asts: Vec<Ast>,
}

impl Concat {
    /// Return this concatenation as an AST, unwrapping a lone element.
    pub fn into_ast(mut self) -> Ast {
        match self.asts.len() {
            0 => Ast::Empty(self.span),
            1 => self.asts.pop().unwrap_or(Ast::Empty(self.span)),
            _ => Ast::Concat(self),
        }
    }
}

/// A single literal expression.
///
/// A literal corresponds to a single Unicode scalar value. Literals may be
/// represented in their literal form, e.g., `a` or in their escaped form,
/// e.g., `\x61`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Literal {
    /// The span of this literal.
    pub span: Span,
    /// The kind of this literal.
    pub kind: LiteralKind,
    /// The Unicode scalar value corresponding to this literal.
    pub c: char,
}

impl Literal {
    /// If this literal was written as a `\x` hex escape with a value that
    /// fits in a byte, then return it. In byte mode such escapes denote raw
    /// bytes rather than code points.
    pub fn byte(&self) -> Option<u8> {
        match self.kind {
            LiteralKind::HexFixed(HexLiteralKind::X) => u8::try_from(self.c).ok(),
            _ => None,
        }
    }
}

/// The kind of a single literal expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LiteralKind {
    /// The literal is written verbatim, e.g., `a` or `☃`.
    Verbatim,
    /// The literal is written as an escape because it is otherwise a meta
    /// character, e.g., `\*` or `\[`.
    Meta,
    /// The literal is written as an escape despite the fact that the escape
    /// is unnecessary, e.g., `\%` or `\/`.
    Superfluous,
    /// The literal is written as a fixed length hex code, e.g., `\x7F`.
    HexFixed(HexLiteralKind),
    /// The literal is written as a hex code with braces, e.g., `\x{1F600}`.
    HexBrace(HexLiteralKind),
    /// The literal is written as a specially recognized escape, e.g., `\f`
    /// or `\n`.
    Special(SpecialLiteralKind),
}

/// The type of a special literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SpecialLiteralKind {
    /// Bell, spelled `\a` (`\x07`).
    Bell,
    /// Form feed, spelled `\f` (`\x0C`).
    FormFeed,
    /// Tab, spelled `\t` (`\x09`).
    Tab,
    /// Line feed, spelled `\n` (`\x0A`).
    LineFeed,
    /// Carriage return, spelled `\r` (`\x0D`).
    CarriageReturn,
    /// Vertical tab, spelled `\v` (`\x0B`).
    VerticalTab,
    /// Space, spelled `\ ` (`\x20`). Only escapable when verbose mode is
    /// enabled.
    Space,
}

/// The type of a Unicode hex literal.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HexLiteralKind {
    /// A `\x` prefix. When used without brackets, this form is limited to
    /// two digits.
    X,
    /// A `\u` prefix. When used without brackets, this form is limited to
    /// four digits.
    UnicodeShort,
    /// A `\U` prefix. When used without brackets, this form is limited to
    /// eight digits.
    UnicodeLong,
}

impl HexLiteralKind {
    /// The number of digits that must be used with this literal form when
    /// used without brackets.
    pub fn digits(&self) -> u32 {
        match *self {
            HexLiteralKind::X => 2,
            HexLiteralKind::UnicodeShort => 4,
            HexLiteralKind::UnicodeLong => 8,
        }
    }
}

/// A single zero-width assertion.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assertion {
    /// The span of this assertion.
    pub span: Span,
    /// The assertion kind, e.g., `\b` or `^`.
    pub kind: AssertionKind,
}

/// An assertion kind.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssertionKind {
    /// `^`
    StartLine,
    /// `$`
    EndLine,
    /// `\A`
    StartText,
    /// `\z`
    EndText,
    /// `\b`
    WordBoundary,
    /// `\B`
    NotWordBoundary,
    /// `\b{start}` or `\<`
    WordBoundaryStart,
    /// `\b{end}` or `\>`
    WordBoundaryEnd,
    /// `\b{start-half}`
    WordBoundaryStartHalf,
    /// `\b{end-half}`
    WordBoundaryEndHalf,
}

/// A single character class expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Class {
    /// A Unicode character class, e.g., `\pL` or `\p{Greek}`.
    Unicode(ClassUnicode),
    /// A perl character class, e.g., `\d` or `\W`.
    Perl(ClassPerl),
    /// A bracketed character class set, which may contain zero or more
    /// character ranges and/or zero or more nested classes. e.g.,
    /// `[a-zA-Z\pL]`.
    Bracketed(ClassBracketed),
}

impl Class {
    /// Return the span of this character class.
    pub fn span(&self) -> &Span {
        match *self {
            Class::Perl(ref x) => &x.span,
            Class::Unicode(ref x) => &x.span,
            Class::Bracketed(ref x) => &x.span,
        }
    }
}

/// A Perl character class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassPerl {
    /// The span of this class.
    pub span: Span,
    /// The kind of Perl class.
    pub kind: ClassPerlKind,
    /// Whether the class is negated or not. e.g., `\d` is not negated but
    /// `\D` is.
    pub negated: bool,
}

/// The available Perl character classes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassPerlKind {
    /// Decimal numbers.
    Digit,
    /// Whitespace.
    Space,
    /// Word characters.
    Word,
}

/// An ASCII character class, e.g., `[:alpha:]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassAscii {
    /// The span of this class.
    pub span: Span,
    /// The kind of ASCII class.
    pub kind: ClassAsciiKind,
    /// Whether the class is negated or not. e.g., `[[:alpha:]]` is not
    /// negated but `[[:^alpha:]]` is.
    pub negated: bool,
}

/// The available ASCII character classes.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassAsciiKind {
    /// `[0-9A-Za-z]`
    Alnum,
    /// `[A-Za-z]`
    Alpha,
    /// `[\x00-\x7F]`
    Ascii,
    /// `[ \t]`
    Blank,
    /// `[\x00-\x1F\x7F]`
    Cntrl,
    /// `[0-9]`
    Digit,
    /// `[!-~]`
    Graph,
    /// `[a-z]`
    Lower,
    /// `[ -~]`
    Print,
    /// `[!-/:-@\[-`{-~]`
    Punct,
    /// `[\t\n\v\f\r ]`
    Space,
    /// `[A-Z]`
    Upper,
    /// `[0-9A-Za-z_]`
    Word,
    /// `[0-9A-Fa-f]`
    Xdigit,
}

impl ClassAsciiKind {
    /// Return the corresponding ClassAsciiKind variant for the given name.
    ///
    /// The name given should correspond to the lowercase version of the
    /// variant name. e.g., `cntrl` is the name for `ClassAsciiKind::Cntrl`.
    ///
    /// If no variant with the corresponding name exists, then `None` is
    /// returned.
    pub fn from_name(name: &str) -> Option<ClassAsciiKind> {
        use self::ClassAsciiKind::*;
        match name {
            "alnum" => Some(Alnum),
            "alpha" => Some(Alpha),
            "ascii" => Some(Ascii),
            "blank" => Some(Blank),
            "cntrl" => Some(Cntrl),
            "digit" => Some(Digit),
            "graph" => Some(Graph),
            "lower" => Some(Lower),
            "print" => Some(Print),
            "punct" => Some(Punct),
            "space" => Some(Space),
            "upper" => Some(Upper),
            "word" => Some(Word),
            "xdigit" => Some(Xdigit),
            _ => None,
        }
    }

    /// The byte ranges making up this class.
    pub(crate) fn ranges(&self) -> &'static [(u8, u8)] {
        use self::ClassAsciiKind::*;
        match *self {
            Alnum => &[(b'0', b'9'), (b'A', b'Z'), (b'a', b'z')],
            Alpha => &[(b'A', b'Z'), (b'a', b'z')],
            Ascii => &[(b'\x00', b'\x7F')],
            Blank => &[(b'\t', b'\t'), (b' ', b' ')],
            Cntrl => &[(b'\x00', b'\x1F'), (b'\x7F', b'\x7F')],
            Digit => &[(b'0', b'9')],
            Graph => &[(b'!', b'~')],
            Lower => &[(b'a', b'z')],
            Print => &[(b' ', b'~')],
            Punct => &[(b'!', b'/'), (b':', b'@'), (b'[', b'`'), (b'{', b'~')],
            Space => &[(b'\t', b'\r'), (b' ', b' ')],
            Upper => &[(b'A', b'Z')],
            Word => &[(b'0', b'9'), (b'A', b'Z'), (b'_', b'_'), (b'a', b'z')],
            Xdigit => &[(b'0', b'9'), (b'A', b'F'), (b'a', b'f')],
        }
    }
}

/// A Unicode character class.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassUnicode {
    /// The span of this class.
    pub span: Span,
    /// Whether this class is negated or not.
    ///
    /// Note: be careful when using this attribute. This specifically refers
    /// to whether the class is written as `\p` or `\P`, where the latter
    /// is `negated = true`. However, it also possible to write something like
    /// `\P{scx!=Katakana}` which is actually equivalent to
    /// `\p{scx=Katakana}` and is therefore not actually negated even though
    /// `negated = true` here. To test whether this class is truly negated
    /// or not, use the `is_negated` method.
    pub negated: bool,
    /// The kind of Unicode class.
    pub kind: ClassUnicodeKind,
}

impl ClassUnicode {
    /// Returns true if this class has been negated.
    ///
    /// Note that this takes the Unicode op into account, if it's present.
    /// e.g., `is_negated` for `\P{scx!=Katakana}` will return `false`.
    pub fn is_negated(&self) -> bool {
        match self.kind {
            ClassUnicodeKind::NamedValue {
                op: ClassUnicodeOpKind::NotEqual,
                ..
            } => !self.negated,
            _ => self.negated,
        }
    }
}

/// The available forms of Unicode character classes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassUnicodeKind {
    /// A one letter abbreviated class, e.g., `\pN`.
    OneLetter(char),
    /// A binary property, general category or script. The string may be
    /// empty.
    Named(String),
    /// A property name and an associated value.
    NamedValue {
        /// The type of Unicode op used to associate `name` with `value`.
        op: ClassUnicodeOpKind,
        /// The property name (which may be empty).
        name: String,
        /// The property value (which may be empty).
        value: String,
    },
}

/// The type of op used in a Unicode character class.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassUnicodeOpKind {
    /// A property set to a specific value, e.g., `\p{scx=Katakana}`.
    Equal,
    /// A property set to a specific value using a colon, e.g.,
    /// `\p{scx:Katakana}`.
    Colon,
    /// A property that isn't a particular value, e.g., `\p{scx!=Katakana}`.
    NotEqual,
}

/// A bracketed character class, e.g., `[a-z0-9]`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassBracketed {
    /// The span of this class.
    pub span: Span,
    /// Whether this class is negated or not. e.g., `[a]` is not negated but
    /// `[^a]` is.
    pub negated: bool,
    /// The type of this set. A set is either a normal union of things, e.g.,
    /// `[abc]` or a result of applying set operations, e.g., `[\pL--c]`.
    pub kind: ClassSet,
}

/// A character class set.
///
/// This type corresponds to the internal structure of a bracketed character
/// class. That is, every bracketed character is one of two types: a union of
/// items (literals, ranges, other bracketed classes) or a tree of binary set
/// operations.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassSet {
    /// An item, which can be a single literal, range, nested character class
    /// or a union of items.
    Item(ClassSetItem),
    /// A single binary operation (i.e., &&, -- or ~~).
    BinaryOp(ClassSetBinaryOp),
}

impl ClassSet {
    /// Return the span of this character class set.
    pub fn span(&self) -> &Span {
        match *self {
            ClassSet::Item(ref x) => x.span(),
            ClassSet::BinaryOp(ref x) => &x.span,
        }
    }
}

/// A single component of a character class set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ClassSetItem {
    /// An empty item.
    ///
    /// Note that a bracketed character class cannot contain a single empty
    /// item. Empty items can appear when using one of the binary operators.
    /// For example, `[&&]` is the intersection of two empty classes.
    Empty(Span),
    /// A single literal.
    Literal(Literal),
    /// A range between two literals.
    Range(ClassSetRange),
    /// An ASCII character class, e.g., `[:alnum:]` or `[:punct:]`.
    Ascii(ClassAscii),
    /// A Unicode character class, e.g., `\pL` or `\p{Greek}`.
    Unicode(ClassUnicode),
    /// A perl character class, e.g., `\d` or `\W`.
    Perl(ClassPerl),
    /// A bracketed character class set, which may contain zero or more
    /// character ranges and/or zero or more nested classes. e.g.,
    /// `[a-zA-Z\pL]`.
    Bracketed(Box<ClassBracketed>),
    /// A union of items.
    Union(ClassSetUnion),
}

impl ClassSetItem {
    /// Return the span of this character class set item.
    pub fn span(&self) -> &Span {
        match *self {
            ClassSetItem::Empty(ref span) => span,
            ClassSetItem::Literal(ref x) => &x.span,
            ClassSetItem::Range(ref x) => &x.span,
            ClassSetItem::Ascii(ref x) => &x.span,
            ClassSetItem::Perl(ref x) => &x.span,
            ClassSetItem::Unicode(ref x) => &x.span,
            ClassSetItem::Bracketed(ref x) => &x.span,
            ClassSetItem::Union(ref x) => &x.span,
        }
    }
}

/// A single character class range in a set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassSetRange {
    /// The span of this range.
    pub span: Span,
    /// The start of this range.
    pub start: Literal,
    /// The end of this range.
    pub end: Literal,
}

/// A union of items inside a character class set.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassSetUnion {
    /// The span of the items in this operation. e.g., the `a-z0-9` in
    /// `[^a-z0-9]`
    pub span: Span,
    /// The sequence of items that make up this union.
    pub items: Vec<ClassSetItem>,
}

impl ClassSetUnion {
    /// Push a new item in this union.
    ///
    /// The ending position of this union's span is updated to the ending
    /// position of the span of the item given. If the union is empty, then
    /// the starting position of this union is set to the starting position
    /// of this item.
    pub fn push(&mut self, item: ClassSetItem) {
        if self.items.is_empty() {
            self.span.start = item.span().start;
        }
        self.span.end = item.span().end;
        self.items.push(item);
    }

    /// Return this union as a character class set item.
    ///
    /// If this union contains zero items, then an empty union is
    /// returned. If this concatenation contains exactly 1 item, then the
    /// corresponding item is returned. Otherwise, ClassSetItem::Union is
    /// returned.
    pub fn into_item(mut self) -> ClassSetItem {
        match self.items.len() {
            0 => ClassSetItem::Empty(self.span),
            1 => self.items.pop().unwrap_or(ClassSetItem::Empty(self.span)),
            _ => ClassSetItem::Union(self),
        }
    }
}

/// A Unicode character class set operation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClassSetBinaryOp {
    /// The span of this operation. e.g., the `a-z--[h-p]` in `[a-z--h-p]`.
    pub span: Span,
    /// The type of this set operation.
    pub kind: ClassSetBinaryOpKind,
    /// The left hand side of the operation.
    pub lhs: Box<ClassSet>,
    /// The right hand side of the operation.
    pub rhs: Box<ClassSet>,
}

/// The type of a Unicode character class set operation.
///
/// Note that this doesn't explicitly represent union since there is no
/// explicit union operator. Concatenation inside a character class
/// corresponds to the union operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassSetBinaryOpKind {
    /// The intersection of two sets, e.g., `\pN&&[a-z]`.
    Intersection,
    /// The difference of two sets, e.g., `\pN--[0-9]`.
    Difference,
    /// The symmetric difference of two sets. The symmetric difference is the
    /// set of elements belonging to one but not both sets.
    /// e.g., `[\pL~~[:ascii:]]`.
    SymmetricDifference,
}

/// A repetition operation applied to a regular expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Repetition {
    /// The span of this operation.
    pub span: Span,
    /// The actual operation.
    pub op: RepetitionOp,
    /// Whether this operation was applied greedily or not.
    pub greedy: bool,
    /// The regular expression under repetition.
    pub ast: Box<Ast>,
}

/// The repetition operator itself.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RepetitionOp {
    /// The span of this operator. This includes things like `+`, `*?` and
    /// `{m,n}`.
    pub span: Span,
    /// The type of operation.
    pub kind: RepetitionKind,
}

impl RepetitionOp {
    /// The `(min, max)` bounds of this operator, with `None` meaning no upper
    /// bound.
    pub fn bounds(&self) -> (u32, Option<u32>) {
        match self.kind {
            RepetitionKind::ZeroOrOne => (0, Some(1)),
            RepetitionKind::ZeroOrMore => (0, None),
            RepetitionKind::OneOrMore => (1, None),
            RepetitionKind::Range(RepetitionRange::Exactly(n)) => (n, Some(n)),
            RepetitionKind::Range(RepetitionRange::AtLeast(n)) => (n, None),
            RepetitionKind::Range(RepetitionRange::Bounded(m, n)) => {
                (m, Some(n))
            }
        }
    }
}

/// The kind of a repetition operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepetitionKind {
    /// `?`
    ZeroOrOne,
    /// `*`
    ZeroOrMore,
    /// `+`
    OneOrMore,
    /// `{m,n}`
    Range(RepetitionRange),
}

/// A range repetition operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RepetitionRange {
    /// `{m}`
    Exactly(u32),
    /// `{m,}`
    AtLeast(u32),
    /// `{m,n}`
    Bounded(u32, u32),
}

/// A grouped regular expression.
///
/// This includes both capturing and non-capturing groups. Non-capturing
/// groups may also include a set of flags that are enabled within the
/// group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Group {
    /// The span of this group.
    pub span: Span,
    /// The kind of this group.
    pub kind: GroupKind,
    /// The regular expression in this group.
    pub ast: Box<Ast>,
}

impl Group {
    /// If this group is capturing, then return the capture index.
    pub fn capture_index(&self) -> Option<u32> {
        match self.kind {
            GroupKind::CaptureIndex(i) => Some(i),
            GroupKind::CaptureName { ref name, .. } => Some(name.index),
            GroupKind::NonCapturing(_) => None,
        }
    }
}

/// The kind of a group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GroupKind {
    /// `(a)`
    CaptureIndex(u32),
    /// `(?<name>a)` or `(?P<name>a)`
    CaptureName {
        /// True if the `?P<` syntax is used and false if the `?<` syntax is
        /// used.
        starts_with_p: bool,
        /// The capture name.
        name: CaptureName,
    },
    /// `(?:a)` and `(?i:a)`
    NonCapturing(Flags),
}

/// A capture name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptureName {
    /// The span of this capture name.
    pub span: Span,
    /// The capture name.
    pub name: String,
    /// The capture index.
    pub index: u32,
}

/// A group of flags that is not applied to a particular regular expression.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetFlags {
    /// The span of these flags, including the grouping parentheses.
    pub span: Span,
    /// The actual sequence of flags.
    pub flags: Flags,
}

/// A group of flags.
///
/// This corresponds only to the sequence of flags themselves, e.g., `is-u`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Flags {
    /// The span of this group of flags.
    pub span: Span,
    /// A sequence of flag items. Each item is either a flag or a negation
    /// operator.
    pub items: Vec<FlagsItem>,
}

impl Flags {
    /// Returns the state of the given flag in this set: `Some(true)` when
    /// enabled, `Some(false)` when negated and `None` when absent.
    pub fn flag_state(&self, flag: Flag) -> Option<bool> {
        let mut negated = false;
        for item in &self.items {
            match item.kind {
                FlagsItemKind::Negation => negated = true,
                FlagsItemKind::Flag(ref foundflag) if *foundflag == flag => {
                    return Some(!negated);
                }
                FlagsItemKind::Flag(_) => {}
            }
        }
        None
    }
}

/// A single item in a group of flags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FlagsItem {
    /// The span of this item.
    pub span: Span,
    /// The kind of this item.
    pub kind: FlagsItemKind,
}

/// The kind of an item in a group of flags.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlagsItemKind {
    /// A negation operator applied to all subsequent flags in the enclosing
    /// group.
    Negation,
    /// A single flag in a group.
    Flag(Flag),
}

/// A single flag.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Flag {
    /// `i`
    CaseInsensitive,
    /// `m`
    MultiLine,
    /// `s`
    DotMatchesNewLine,
    /// `U`
    SwapGreed,
    /// `u`
    Unicode,
    /// `R`
    CRLF,
    /// `x`
    IgnoreWhitespace,
}

/// Checks that no path through `ast` nests deeper than `limit`.
///
/// Groups, repetitions, bracketed classes and class set operations each add
/// one level. Concatenations and alternations do not, so a flat pattern sits
/// at depth zero. Repetition operators count even though the parser does not
/// recurse for them.
pub(crate) fn check_nesting(ast: &Ast, limit: u32) -> Result<(), Span> {
    fn deeper(depth: u32, span: &Span) -> Result<u32, Span> {
        depth.checked_add(1).ok_or(*span)
    }

    fn recurse(ast: &Ast, limit: u32, depth: u32) -> Result<(), Span> {
        if depth > limit {
            return Err(*ast.span());
        }
        let next_depth = match *ast {
            Ast::Class(Class::Bracketed(ref class)) => {
                return recurse_set(&class.kind, limit, deeper(depth, &class.span)?);
            }
            Ast::Concat(_) | Ast::Alternation(_) => depth,
            _ => deeper(depth, ast.span())?,
        };
        for sub in ast.subs() {
            recurse(sub, limit, next_depth)?;
        }
        Ok(())
    }

    fn recurse_set(set: &ClassSet, limit: u32, depth: u32) -> Result<(), Span> {
        if depth > limit {
            return Err(*set.span());
        }
        match *set {
            ClassSet::BinaryOp(ref op) => {
                let next_depth = deeper(depth, &op.span)?;
                recurse_set(&op.lhs, limit, next_depth)?;
                recurse_set(&op.rhs, limit, next_depth)
            }
            ClassSet::Item(ref item) => recurse_item(item, limit, depth),
        }
    }

    fn recurse_item(
        item: &ClassSetItem,
        limit: u32,
        depth: u32,
    ) -> Result<(), Span> {
        if depth > limit {
            return Err(*item.span());
        }
        match *item {
            ClassSetItem::Bracketed(ref class) => {
                recurse_set(&class.kind, limit, deeper(depth, &class.span)?)
            }
            ClassSetItem::Union(ref union) => {
                for item in &union.items {
                    recurse_item(item, limit, depth)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    recurse(ast, limit, 0)
}

impl Drop for Ast {
    fn drop(&mut self) {
        use core::mem;

        if self.subs().iter().all(|sub| sub.subs().is_empty()) {
            return;
        }
        let empty = Span::default();
        let mut stack = alloc::vec![mem::replace(self, Ast::Empty(empty))];
        while let Some(mut ast) = stack.pop() {
            match ast {
                Ast::Repetition(ref mut x) => {
                    stack.push(mem::replace(&mut *x.ast, Ast::Empty(empty)));
                }
                Ast::Group(ref mut x) => {
                    stack.push(mem::replace(&mut *x.ast, Ast::Empty(empty)));
                }
                Ast::Alternation(ref mut x) => stack.extend(x.asts.drain(..)),
                Ast::Concat(ref mut x) => stack.extend(x.asts.drain(..)),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_state_tracks_negation() {
        let item = |kind| FlagsItem { span: Span::default(), kind };
        let flags = Flags {
            span: Span::default(),
            items: alloc::vec![
                item(FlagsItemKind::Flag(Flag::CaseInsensitive)),
                item(FlagsItemKind::Negation),
                item(FlagsItemKind::Flag(Flag::Unicode)),
            ],
        };
        assert_eq!(Some(true), flags.flag_state(Flag::CaseInsensitive));
        assert_eq!(Some(false), flags.flag_state(Flag::Unicode));
        assert_eq!(None, flags.flag_state(Flag::MultiLine));
    }

    #[test]
    fn negated_unicode_class() {
        let class = |negated, op| ClassUnicode {
            span: Span::default(),
            negated,
            kind: ClassUnicodeKind::NamedValue {
                op,
                name: "sc".into(),
                value: "Greek".into(),
            },
        };
        assert!(!class(false, ClassUnicodeOpKind::Equal).is_negated());
        assert!(class(true, ClassUnicodeOpKind::Equal).is_negated());
        assert!(class(false, ClassUnicodeOpKind::NotEqual).is_negated());
        assert!(!class(true, ClassUnicodeOpKind::NotEqual).is_negated());
    }

    #[test]
    fn repetition_bounds() {
        let op = |kind| RepetitionOp { span: Span::default(), kind };
        assert_eq!((0, Some(1)), op(RepetitionKind::ZeroOrOne).bounds());
        assert_eq!((1, None), op(RepetitionKind::OneOrMore).bounds());
        assert_eq!(
            (2, Some(5)),
            op(RepetitionKind::Range(RepetitionRange::Bounded(2, 5))).bounds()
        );
    }

    // Dropping a deeply nested tree must not overflow the stack.
    #[test]
    fn drop_deep() {
        let mut ast = Ast::Empty(Span::default());
        for _ in 0..100_000 {
            ast = Ast::Group(Group {
                span: Span::default(),
                kind: GroupKind::CaptureIndex(1),
                ast: Box::new(ast),
            });
        }
        drop(ast);
    }
}
