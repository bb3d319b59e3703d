/*!
A recursive descent parser from a pattern string to an [`Ast`].
*/

use core::cell::{Cell, RefCell};

use alloc::{
    boxed::Box,
    string::{String, ToString},
    vec,
    vec::Vec,
};

use crate::ast::{self, Ast, Error, ErrorKind, Span};

/// A builder for a regular expression parser.
///
/// This builder permits modifying configuration options for the parser.
#[derive(Clone, Debug)]
pub struct ParserBuilder {
    nest_limit: u32,
    ignore_whitespace: bool,
}

impl Default for ParserBuilder {
    fn default() -> ParserBuilder {
        ParserBuilder::new()
    }
}

impl ParserBuilder {
    /// Create a new parser builder with a default configuration.
    pub fn new() -> ParserBuilder {
        ParserBuilder { nest_limit: 250, ignore_whitespace: false }
    }

    /// Build a parser from this configuration.
    pub fn build(&self) -> Parser {
        Parser {
            nest_limit: self.nest_limit,
            ignore_whitespace: self.ignore_whitespace,
        }
    }

    /// Set the nesting limit for this parser.
    ///
    /// The nesting limit controls how deep the abstract syntax tree is
    /// allowed to be. Groups, bracketed classes and repetition operators
    /// each add a level. Exceeding the limit is an error, which protects
    /// every recursive pass over the tree from overflowing the stack.
    pub fn nest_limit(&mut self, limit: u32) -> &mut ParserBuilder {
        self.nest_limit = limit;
        self
    }

    /// Enable verbose mode in the regular expression.
    ///
    /// When enabled, whitespace is ignored everywhere except inside
    /// escapes, and `#` starts a comment that runs to the end of the line.
    /// This can be toggled inside the pattern with the `x` flag.
    pub fn ignore_whitespace(&mut self, yes: bool) -> &mut ParserBuilder {
        self.ignore_whitespace = yes;
        self
    }
}

/// A regular expression parser.
///
/// This parses a string representation of a regular expression into an
/// abstract syntax tree. The size of the tree is proportional to the length
/// of the regular expression pattern.
#[derive(Clone, Debug)]
pub struct Parser {
    nest_limit: u32,
    ignore_whitespace: bool,
}

impl Default for Parser {
    fn default() -> Parser {
        ParserBuilder::new().build()
    }
}

impl Parser {
    /// Create a new parser with a default configuration.
    pub fn new() -> Parser {
        ParserBuilder::new().build()
    }

    /// Parse the regular expression into an abstract syntax tree.
    pub fn parse(&self, pattern: &str) -> Result<Ast, Error> {
        ParserI::new(self, pattern).parse()
    }
}

/// The state of a single parse. The fields use interior mutability so that
/// every routine can take `&self`.
#[derive(Debug)]
struct ParserI<'s> {
    pattern: &'s str,
    nest_limit: u32,
    /// The call depth of the parser. Its peak value is the maximum nesting
    /// of groups and bracketed classes seen so far.
    depth: Cell<u32>,
    pos: Cell<usize>,
    /// The codepoint at `pos`, or `None` if and only if
    /// `pos == pattern.len()`.
    char: Cell<Option<char>>,
    capture_index: Cell<u32>,
    /// Whether the `x` flag is in effect at the current position.
    ignore_whitespace: Cell<bool>,
    /// A sorted sequence of capture names, for detecting duplicates.
    capture_names: RefCell<Vec<String>>,
}

/// A parsed escape sequence or other primitive. Depending on context a
/// primitive becomes an `Ast`, an item of a class set or the endpoint of a
/// class range.
#[derive(Clone, Debug)]
enum Primitive {
    Literal(ast::Literal),
    Assertion(ast::Assertion),
    Dot(Span),
    Perl(ast::ClassPerl),
    Unicode(ast::ClassUnicode),
}

impl Primitive {
    fn span(&self) -> &Span {
        match *self {
            Primitive::Literal(ref x) => &x.span,
            Primitive::Assertion(ref x) => &x.span,
            Primitive::Dot(ref span) => span,
            Primitive::Perl(ref x) => &x.span,
            Primitive::Unicode(ref x) => &x.span,
        }
    }

    fn into_ast(self) -> Ast {
        match self {
            Primitive::Literal(lit) => Ast::Literal(lit),
            Primitive::Assertion(assert) => Ast::Assertion(assert),
            Primitive::Dot(span) => Ast::Dot(span),
            Primitive::Perl(cls) => Ast::Class(ast::Class::Perl(cls)),
            Primitive::Unicode(cls) => Ast::Class(ast::Class::Unicode(cls)),
        }
    }
}

impl<'s> ParserI<'s> {
    fn new(parser: &Parser, pattern: &'s str) -> ParserI<'s> {
        ParserI {
            pattern,
            nest_limit: parser.nest_limit,
            depth: Cell::new(0),
            pos: Cell::new(0),
            char: Cell::new(pattern.chars().next()),
            capture_index: Cell::new(0),
            ignore_whitespace: Cell::new(parser.ignore_whitespace),
            capture_names: RefCell::new(vec![]),
        }
    }

    fn error(&self, span: Span, kind: ErrorKind) -> Error {
        Error { kind, pattern: self.pattern.to_string(), span }
    }

    fn pos(&self) -> usize {
        self.pos.get()
    }

    /// An empty span at the current position.
    fn span(&self) -> Span {
        Span::new(self.pos(), self.pos())
    }

    /// The span of the current character.
    fn span_char(&self) -> Span {
        let len = self.char.get().map_or(0, |c| c.len_utf8());
        Span::new(self.pos(), self.pos() + len)
    }

    /// Increments the call depth, failing once it would exceed the nest
    /// limit. Returns the old depth.
    fn increment_depth(&self, span: Span) -> Result<u32, Error> {
        let old = self.depth.get();
        if old >= self.nest_limit {
            return Err(
                self.error(span, ErrorKind::NestLimitExceeded(self.nest_limit))
            );
        }
        // Bounded by the nest limit checked above.
        self.depth.set(old + 1);
        Ok(old)
    }

    fn decrement_depth(&self) {
        // Every decrement is paired with a successful increment.
        let old = self.depth.get();
        self.depth.set(old.saturating_sub(1));
    }

    /// Return the codepoint at the current position.
    ///
    /// Callers must check `is_done` first.
    fn char(&self) -> char {
        self.char.get().unwrap_or('\0')
    }

    fn is_done(&self) -> bool {
        self.pos() == self.pattern.len()
    }

    /// Bump the parser to the next Unicode scalar value. Returns false if
    /// the end of the pattern has been reached.
    fn bump(&self) -> bool {
        if self.is_done() {
            return false;
        }
        self.pos.set(self.pos() + self.char().len_utf8());
        self.char.set(self.pattern[self.pos()..].chars().next());
        self.char.get().is_some()
    }

    /// If the rest of the pattern starts with `prefix`, bump past it and
    /// return true.
    fn bump_if(&self, prefix: &str) -> bool {
        if self.pattern[self.pos()..].starts_with(prefix) {
            for _ in 0..prefix.chars().count() {
                self.bump();
            }
            true
        } else {
            false
        }
    }

    /// Bump, then skip whitespace and comments when `x` is enabled. Returns
    /// true if and only if the parser is not done.
    fn bump_and_bump_space(&self) -> bool {
        if !self.bump() {
            return false;
        }
        self.bump_space();
        !self.is_done()
    }

    /// In verbose mode, advance through whitespace and `#` comments. A no-op
    /// otherwise.
    fn bump_space(&self) {
        if !self.ignore_whitespace.get() {
            return;
        }
        while !self.is_done() {
            if self.char().is_whitespace() {
                self.bump();
            } else if self.char() == '#' {
                self.bump();
                while !self.is_done() {
                    let c = self.char();
                    self.bump();
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        if self.is_done() {
            return None;
        }
        self.pattern[self.pos() + self.char().len_utf8()..].chars().next()
    }

    /// Like `peek`, but skips whitespace and comments in verbose mode.
    fn peek_space(&self) -> Option<char> {
        if !self.ignore_whitespace.get() {
            return self.peek();
        }
        if self.is_done() {
            return None;
        }
        let start = self.pos() + self.char().len_utf8();
        let mut in_comment = false;
        for ch in self.pattern[start..].chars() {
            if in_comment {
                if ch == '\n' {
                    in_comment = false;
                }
            } else if ch == '#' {
                in_comment = true;
            } else if !ch.is_whitespace() {
                return Some(ch);
            }
        }
        None
    }

    fn next_capture_index(&self, span: Span) -> Result<u32, Error> {
        let current = self.capture_index.get();
        let next = current
            .checked_add(1)
            .ok_or_else(|| self.error(span, ErrorKind::CaptureLimitExceeded))?;
        self.capture_index.set(next);
        Ok(next)
    }

    fn add_capture_name(&self, name: &str, span: Span) -> Result<(), Error> {
        let mut names = self.capture_names.borrow_mut();
        match names.binary_search_by(|n| n.as_str().cmp(name)) {
            Ok(_) => Err(self.error(span, ErrorKind::GroupNameDuplicate)),
            Err(i) => {
                names.insert(i, name.to_string());
                Ok(())
            }
        }
    }

    /// Consumes a look-around prefix, if one is present. Only called right
    /// after an opening parenthesis.
    fn is_lookaround_prefix(&self) -> bool {
        self.bump_if("?=")
            || self.bump_if("?!")
            || self.bump_if("?<=")
            || self.bump_if("?<!")
    }
}

impl<'s> ParserI<'s> {
    fn parse(&self) -> Result<Ast, Error> {
        let ast = self.parse_inner()?;
        // The recursive calls above are bounded, but repetition operators
        // nest without recursing, so check the finished tree as well.
        if let Err(span) = ast::check_nesting(&ast, self.nest_limit) {
            return Err(
                self.error(span, ErrorKind::NestLimitExceeded(self.nest_limit))
            );
        }
        Ok(ast)
    }

    /// Parses an alternation of concatenations until the end of the pattern
    /// or a closing parenthesis, which is left unconsumed.
    fn parse_inner(&self) -> Result<Ast, Error> {
        let start = self.pos();
        let depth = self.depth.get();
        let mut alternates: Vec<Ast> = vec![];
        let mut concat = ast::Concat { span: self.span(), asts: vec![] };
        loop {
            self.bump_space();
            if self.is_done() {
                break;
            }
            match self.char() {
                '(' => {
                    let old_ignore_whitespace = self.ignore_whitespace.get();
                    let ast = self.parse_group()?;
                    // A bare flag directive stays in effect until the end of
                    // the enclosing group.
                    if !matches!(ast, Ast::Flags(_)) {
                        self.ignore_whitespace.set(old_ignore_whitespace);
                    }
                    concat.asts.push(ast);
                }
                ')' => {
                    if depth == 0 {
                        return Err(
                            self.error(self.span_char(), ErrorKind::GroupUnopened)
                        );
                    }
                    break;
                }
                '|' => {
                    concat.span.end = self.pos();
                    alternates.push(concat.into_ast());
                    self.bump();
                    concat = ast::Concat { span: self.span(), asts: vec![] };
                }
                '[' => {
                    let class = self.parse_set_class()?;
                    concat.asts.push(Ast::Class(ast::Class::Bracketed(class)));
                }
                '?' | '*' | '+' => self.parse_uncounted_repetition(&mut concat)?,
                '{' => self.parse_counted_repetition(&mut concat)?,
                _ => concat.asts.push(self.parse_primitive()?.into_ast()),
            }
        }
        concat.span.end = self.pos();
        if alternates.is_empty() {
            return Ok(concat.into_ast());
        }
        alternates.push(concat.into_ast());
        let alt = ast::Alternation {
            span: Span::new(start, self.pos()),
            asts: alternates,
        };
        Ok(alt.into_ast())
    }

    /// Parses anything that starts with `(`: a group or a flag directive.
    fn parse_group(&self) -> Result<Ast, Error> {
        debug_assert_eq!(self.char(), '(');
        let open = self.span_char();
        if !self.bump_and_bump_space() {
            return Err(self.error(open, ErrorKind::GroupUnclosed));
        }
        if self.is_lookaround_prefix() {
            let span = Span::new(open.start, self.pos());
            return Err(self.error(span, ErrorKind::UnsupportedLookAround));
        }
        let kind = if self.bump_if("?P<") || self.bump_if("?<") {
            let starts_with_p = self.pattern[open.start..].starts_with("(?P");
            let index = self.next_capture_index(open)?;
            let name = self.parse_capture_name(index)?;
            ast::GroupKind::CaptureName { starts_with_p, name }
        } else if self.char() == '?' {
            if !self.bump() {
                return Err(self.error(open, ErrorKind::GroupUnclosed));
            }
            let flags = self.parse_flags()?;
            if self.char() == ')' {
                if flags.items.is_empty() {
                    let span = Span::new(open.start, self.pos() + 1);
                    return Err(self.error(span, ErrorKind::FlagsEmpty));
                }
                self.bump();
                let span = Span::new(open.start, self.pos());
                return Ok(Ast::Flags(ast::SetFlags { span, flags }));
            }
            debug_assert_eq!(self.char(), ':');
            self.bump();
            ast::GroupKind::NonCapturing(flags)
        } else {
            ast::GroupKind::CaptureIndex(self.next_capture_index(open)?)
        };
        self.increment_depth(open)?;
        let sub = self.parse_inner()?;
        self.decrement_depth();
        if self.is_done() || self.char() != ')' {
            return Err(self.error(open, ErrorKind::GroupUnclosed));
        }
        self.bump();
        Ok(Ast::Group(ast::Group {
            span: Span::new(open.start, self.pos()),
            kind,
            ast: Box::new(sub),
        }))
    }

    /// Parses a capture name after the opening `<`, through the closing `>`.
    fn parse_capture_name(&self, index: u32) -> Result<ast::CaptureName, Error> {
        if self.is_done() {
            return Err(self.error(self.span(), ErrorKind::GroupNameUnexpectedEof));
        }
        let start = self.pos();
        while !self.is_done() && self.char() != '>' {
            if !is_capture_char(self.char(), self.pos() == start) {
                return Err(
                    self.error(self.span_char(), ErrorKind::GroupNameInvalid)
                );
            }
            self.bump();
        }
        let end = self.pos();
        if self.is_done() {
            let span = Span::new(start, end);
            return Err(self.error(span, ErrorKind::GroupNameUnexpectedEof));
        }
        self.bump();
        let span = Span::new(start, end);
        let name = &self.pattern[start..end];
        if name.is_empty() {
            return Err(self.error(span, ErrorKind::GroupNameEmpty));
        }
        self.add_capture_name(name, span)?;
        Ok(ast::CaptureName { span, name: name.to_string(), index })
    }

    /// Parses a sequence of flags, stopping at (but not consuming) `:` or
    /// `)`. A verbose mode toggle takes effect immediately, since it changes
    /// how the rest of the pattern is parsed.
    fn parse_flags(&self) -> Result<ast::Flags, Error> {
        let mut flags = ast::Flags { span: self.span(), items: vec![] };
        let mut last_was_negation: Option<Span> = None;
        let mut negated = false;
        while self.char() != ':' && self.char() != ')' {
            let span = self.span_char();
            let kind = if self.char() == '-' {
                if negated {
                    return Err(
                        self.error(span, ErrorKind::FlagRepeatedNegation)
                    );
                }
                negated = true;
                last_was_negation = Some(span);
                ast::FlagsItemKind::Negation
            } else {
                last_was_negation = None;
                let flag = self.parse_flag()?;
                if flags.flag_state(flag).is_some() {
                    return Err(self.error(span, ErrorKind::FlagDuplicate));
                }
                if flag == ast::Flag::IgnoreWhitespace {
                    self.ignore_whitespace.set(!negated);
                }
                ast::FlagsItemKind::Flag(flag)
            };
            flags.items.push(ast::FlagsItem { span, kind });
            if !self.bump() {
                return Err(self.error(self.span(), ErrorKind::FlagUnexpectedEof));
            }
        }
        if let Some(span) = last_was_negation {
            return Err(self.error(span, ErrorKind::FlagDanglingNegation));
        }
        flags.span.end = self.pos();
        Ok(flags)
    }

    fn parse_flag(&self) -> Result<ast::Flag, Error> {
        match self.char() {
            'i' => Ok(ast::Flag::CaseInsensitive),
            'm' => Ok(ast::Flag::MultiLine),
            's' => Ok(ast::Flag::DotMatchesNewLine),
            'U' => Ok(ast::Flag::SwapGreed),
            'u' => Ok(ast::Flag::Unicode),
            'R' => Ok(ast::Flag::CRLF),
            'x' => Ok(ast::Flag::IgnoreWhitespace),
            _ => Err(self.error(self.span_char(), ErrorKind::FlagUnrecognized)),
        }
    }

    /// Applies `?`, `*` or `+` (with an optional lazy `?`) to the last
    /// expression of `concat`.
    fn parse_uncounted_repetition(
        &self,
        concat: &mut ast::Concat,
    ) -> Result<(), Error> {
        let op_start = self.pos();
        let kind = match self.char() {
            '?' => ast::RepetitionKind::ZeroOrOne,
            '*' => ast::RepetitionKind::ZeroOrMore,
            _ => ast::RepetitionKind::OneOrMore,
        };
        let sub = match concat.asts.pop() {
            Some(ast) if !matches!(ast, Ast::Flags(_)) => ast,
            _ => {
                return Err(
                    self.error(self.span_char(), ErrorKind::RepetitionMissing)
                );
            }
        };
        let mut greedy = true;
        if self.bump() && self.char() == '?' {
            greedy = false;
            self.bump();
        }
        let op = ast::RepetitionOp {
            span: Span::new(op_start, self.pos()),
            kind,
        };
        concat.asts.push(Ast::Repetition(ast::Repetition {
            span: Span::new(sub.span().start, self.pos()),
            op,
            greedy,
            ast: Box::new(sub),
        }));
        Ok(())
    }

    /// Applies a `{m}`, `{m,}` or `{m,n}` operator (with an optional lazy
    /// `?`) to the last expression of `concat`.
    fn parse_counted_repetition(
        &self,
        concat: &mut ast::Concat,
    ) -> Result<(), Error> {
        debug_assert_eq!(self.char(), '{');
        let start = self.pos();
        let sub = match concat.asts.pop() {
            Some(ast) if !matches!(ast, Ast::Flags(_)) => ast,
            _ => {
                return Err(
                    self.error(self.span_char(), ErrorKind::RepetitionMissing)
                );
            }
        };
        let unclosed = || {
            let span = Span::new(start, self.pos());
            self.error(span, ErrorKind::RepetitionCountUnclosed)
        };
        if !self.bump_and_bump_space() {
            return Err(unclosed());
        }
        let min = self.parse_decimal()?;
        if self.is_done() {
            return Err(unclosed());
        }
        let range = if self.char() == ',' {
            if !self.bump_and_bump_space() {
                return Err(unclosed());
            }
            if self.char() == '}' {
                ast::RepetitionRange::AtLeast(min)
            } else {
                let max = self.parse_decimal()?;
                ast::RepetitionRange::Bounded(min, max)
            }
        } else {
            ast::RepetitionRange::Exactly(min)
        };
        if self.is_done() || self.char() != '}' {
            return Err(unclosed());
        }
        self.bump();
        let op_span = Span::new(start, self.pos());
        if let ast::RepetitionRange::Bounded(m, n) = range {
            if m > n {
                return Err(self.error(op_span, ErrorKind::RepetitionCountInvalid));
            }
        }
        let mut greedy = true;
        if self.char.get() == Some('?') {
            greedy = false;
            self.bump();
        }
        let op = ast::RepetitionOp {
            span: op_span,
            kind: ast::RepetitionKind::Range(range),
        };
        concat.asts.push(Ast::Repetition(ast::Repetition {
            span: Span::new(sub.span().start, self.pos()),
            op,
            greedy,
            ast: Box::new(sub),
        }));
        Ok(())
    }

    /// Parses a decimal number, leaving the parser at the first non-digit.
    fn parse_decimal(&self) -> Result<u32, Error> {
        let start = self.pos();
        let mut digits = String::new();
        while !self.is_done() && self.char().is_ascii_digit() {
            digits.push(self.char());
            self.bump_and_bump_space();
        }
        let span = Span::new(start, self.pos());
        if digits.is_empty() {
            return Err(self.error(span, ErrorKind::DecimalEmpty));
        }
        digits
            .parse::<u32>()
            .map_err(|_| self.error(span, ErrorKind::DecimalInvalid))
    }

    /// Parses a primitive outside of a class: a literal, `.`, an anchor or
    /// an escape sequence.
    fn parse_primitive(&self) -> Result<Primitive, Error> {
        let span = self.span_char();
        let ch = self.char();
        self.bump();
        match ch {
            '\\' => self.parse_escape(span.start),
            '.' => Ok(Primitive::Dot(span)),
            '^' => Ok(Primitive::Assertion(ast::Assertion {
                span,
                kind: ast::AssertionKind::StartLine,
            })),
            '$' => Ok(Primitive::Assertion(ast::Assertion {
                span,
                kind: ast::AssertionKind::EndLine,
            })),
            c => Ok(Primitive::Literal(ast::Literal {
                span,
                kind: ast::LiteralKind::Verbatim,
                c,
            })),
        }
    }

    /// Parses an escape sequence. `start` is the offset of the backslash;
    /// the parser is positioned immediately after it.
    fn parse_escape(&self, start: usize) -> Result<Primitive, Error> {
        if self.is_done() {
            let span = Span::new(start, self.pos());
            return Err(self.error(span, ErrorKind::EscapeUnexpectedEof));
        }
        let ch = self.char();
        match ch {
            '0'..='9' => {
                let span = Span::new(start, self.span_char().end);
                return Err(self.error(span, ErrorKind::UnsupportedBackreference));
            }
            'x' | 'u' | 'U' => return self.parse_hex(start),
            'p' | 'P' => return self.parse_unicode_class(start),
            'd' | 's' | 'w' | 'D' | 'S' | 'W' => {
                return Ok(self.parse_perl_class(start))
            }
            _ => {}
        }

        self.bump();
        let span = Span::new(start, self.pos());
        let literal = |kind| Ok(Primitive::Literal(ast::Literal { span, kind, c: ch }));
        let special = |kind, c| {
            Ok(Primitive::Literal(ast::Literal {
                span,
                kind: ast::LiteralKind::Special(kind),
                c,
            }))
        };
        let assertion = |kind| Ok(Primitive::Assertion(ast::Assertion { span, kind }));
        if crate::hir::is_meta_character(ch) {
            return literal(ast::LiteralKind::Meta);
        }
        if ch == ' ' && self.ignore_whitespace.get() {
            return special(ast::SpecialLiteralKind::Space, ' ');
        }
        if crate::hir::is_escapeable_character(ch) {
            return literal(ast::LiteralKind::Superfluous);
        }
        match ch {
            'a' => special(ast::SpecialLiteralKind::Bell, '\x07'),
            'f' => special(ast::SpecialLiteralKind::FormFeed, '\x0C'),
            't' => special(ast::SpecialLiteralKind::Tab, '\t'),
            'n' => special(ast::SpecialLiteralKind::LineFeed, '\n'),
            'r' => special(ast::SpecialLiteralKind::CarriageReturn, '\r'),
            'v' => special(ast::SpecialLiteralKind::VerticalTab, '\x0B'),
            'A' => assertion(ast::AssertionKind::StartText),
            'z' => assertion(ast::AssertionKind::EndText),
            'B' => assertion(ast::AssertionKind::NotWordBoundary),
            '<' => assertion(ast::AssertionKind::WordBoundaryStart),
            '>' => assertion(ast::AssertionKind::WordBoundaryEnd),
            'b' => {
                let mut kind = ast::AssertionKind::WordBoundary;
                if self.char.get() == Some('{') {
                    if let Some(special) =
                        self.maybe_parse_special_word_boundary(start)?
                    {
                        kind = special;
                    }
                }
                Ok(Primitive::Assertion(ast::Assertion {
                    span: Span::new(start, self.pos()),
                    kind,
                }))
            }
            _ => Err(self.error(span, ErrorKind::EscapeUnrecognized)),
        }
    }

    /// Attempts to parse `{start}`, `{end}`, `{start-half}` or `{end-half}`
    /// after a `\b`. If what follows the brace cannot be a word boundary
    /// name, the parser is rewound to the brace and `None` is returned so
    /// that it is parsed as a counted repetition instead.
    fn maybe_parse_special_word_boundary(
        &self,
        wb_start: usize,
    ) -> Result<Option<ast::AssertionKind>, Error> {
        let is_valid_char = |c| matches!(c, 'A'..='Z' | 'a'..='z' | '-');
        let brace = self.pos();
        if !self.bump_and_bump_space() {
            let span = Span::new(wb_start, self.pos());
            return Err(self.error(
                span,
                ErrorKind::SpecialWordOrRepetitionUnexpectedEof,
            ));
        }
        if !is_valid_char(self.char()) {
            self.pos.set(brace);
            self.char.set(Some('{'));
            return Ok(None);
        }
        let mut scratch = String::new();
        while !self.is_done() && is_valid_char(self.char()) {
            scratch.push(self.char());
            self.bump_and_bump_space();
        }
        if self.is_done() || self.char() != '}' {
            let span = Span::new(brace, self.pos());
            return Err(self.error(span, ErrorKind::SpecialWordBoundaryUnclosed));
        }
        self.bump();
        let kind = match scratch.as_str() {
            "start" => ast::AssertionKind::WordBoundaryStart,
            "end" => ast::AssertionKind::WordBoundaryEnd,
            "start-half" => ast::AssertionKind::WordBoundaryStartHalf,
            "end-half" => ast::AssertionKind::WordBoundaryEndHalf,
            _ => {
                let span = Span::new(brace, self.pos());
                return Err(
                    self.error(span, ErrorKind::SpecialWordBoundaryUnrecognized)
                );
            }
        };
        Ok(Some(kind))
    }

    /// Parses `\xNN`, `\uNNNN`, `\UNNNNNNNN` or any of them with braces.
    /// The parser is positioned at the `x`, `u` or `U`.
    fn parse_hex(&self, start: usize) -> Result<Primitive, Error> {
        let kind = match self.char() {
            'x' => ast::HexLiteralKind::X,
            'u' => ast::HexLiteralKind::UnicodeShort,
            _ => ast::HexLiteralKind::UnicodeLong,
        };
        if !self.bump_and_bump_space() {
            let span = Span::new(start, self.pos());
            return Err(self.error(span, ErrorKind::EscapeUnexpectedEof));
        }
        if self.char() == '{' {
            self.parse_hex_brace(start, kind)
        } else {
            self.parse_hex_digits(start, kind)
        }
    }

    fn parse_hex_digits(
        &self,
        start: usize,
        kind: ast::HexLiteralKind,
    ) -> Result<Primitive, Error> {
        let mut scratch = String::new();
        for i in 0..kind.digits() {
            if i > 0 && !self.bump_and_bump_space() {
                let span = Span::new(start, self.pos());
                return Err(self.error(span, ErrorKind::EscapeUnexpectedEof));
            }
            if !self.char().is_ascii_hexdigit() {
                return Err(
                    self.error(self.span_char(), ErrorKind::EscapeHexInvalidDigit)
                );
            }
            scratch.push(self.char());
        }
        self.bump_and_bump_space();
        let span = Span::new(start, self.pos());
        match u32::from_str_radix(&scratch, 16).ok().and_then(char::from_u32) {
            None => Err(self.error(span, ErrorKind::EscapeHexInvalid)),
            Some(c) => Ok(Primitive::Literal(ast::Literal {
                span,
                kind: ast::LiteralKind::HexFixed(kind),
                c,
            })),
        }
    }

    fn parse_hex_brace(
        &self,
        start: usize,
        kind: ast::HexLiteralKind,
    ) -> Result<Primitive, Error> {
        let brace = self.pos();
        let mut scratch = String::new();
        while self.bump_and_bump_space() && self.char() != '}' {
            if !self.char().is_ascii_hexdigit() {
                return Err(
                    self.error(self.span_char(), ErrorKind::EscapeHexInvalidDigit)
                );
            }
            scratch.push(self.char());
        }
        if self.is_done() {
            let span = Span::new(brace, self.pos());
            return Err(self.error(span, ErrorKind::EscapeUnexpectedEof));
        }
        self.bump();
        let span = Span::new(start, self.pos());
        if scratch.is_empty() {
            return Err(self.error(span, ErrorKind::EscapeHexEmpty));
        }
        match u32::from_str_radix(&scratch, 16).ok().and_then(char::from_u32) {
            None => Err(self.error(span, ErrorKind::EscapeHexInvalid)),
            Some(c) => Ok(Primitive::Literal(ast::Literal {
                span,
                kind: ast::LiteralKind::HexBrace(kind),
                c,
            })),
        }
    }

    /// Parses `\pN`, `\p{...}` or their negated `\P` forms. The parser is
    /// positioned at the `p` or `P`.
    fn parse_unicode_class(&self, start: usize) -> Result<Primitive, Error> {
        let negated = self.char() == 'P';
        if !self.bump_and_bump_space() {
            let span = Span::new(start, self.pos());
            return Err(self.error(span, ErrorKind::EscapeUnexpectedEof));
        }
        let (negated, kind) = if self.char() == '{' {
            let brace = self.pos();
            self.bump_and_bump_space();
            let name_start = self.pos();
            while !self.is_done() && self.char() != '}' {
                self.bump();
            }
            if self.is_done() {
                let span = Span::new(brace, self.pos());
                return Err(self.error(span, ErrorKind::UnicodeClassUnclosed));
            }
            let mut name = self.pattern[name_start..self.pos()].trim();
            self.bump();
            let mut negated = negated;
            if let Some(rest) = name.strip_prefix('^') {
                negated = !negated;
                name = rest;
            }
            (negated, unicode_class_kind(name))
        } else {
            let c = self.char();
            self.bump();
            (negated, ast::ClassUnicodeKind::OneLetter(c))
        };
        Ok(Primitive::Unicode(ast::ClassUnicode {
            span: Span::new(start, self.pos()),
            negated,
            kind,
        }))
    }

    /// Parses `\d`, `\s`, `\w` or their negations. The parser is positioned
    /// at the class letter.
    fn parse_perl_class(&self, start: usize) -> Primitive {
        let c = self.char();
        self.bump();
        let kind = match c.to_ascii_lowercase() {
            'd' => ast::ClassPerlKind::Digit,
            's' => ast::ClassPerlKind::Space,
            _ => ast::ClassPerlKind::Word,
        };
        Primitive::Perl(ast::ClassPerl {
            span: Span::new(start, self.pos()),
            kind,
            negated: c.is_ascii_uppercase(),
        })
    }

    /// Parses a bracketed class, including nested classes and the `&&`,
    /// `--` and `~~` set operators. The parser is positioned at the opening
    /// `[` and is advanced past the closing `]`.
    fn parse_set_class(&self) -> Result<ast::ClassBracketed, Error> {
        debug_assert_eq!(self.char(), '[');
        let open = self.span_char();
        self.increment_depth(open)?;
        let unclosed = || self.error(open, ErrorKind::ClassUnclosed);
        if !self.bump_and_bump_space() {
            return Err(unclosed());
        }
        let negated = if self.char() == '^' {
            if !self.bump_and_bump_space() {
                return Err(unclosed());
            }
            true
        } else {
            false
        };

        let mut union = ast::ClassSetUnion { span: self.span(), items: vec![] };
        // A leading `]` is a literal, which makes empty classes impossible
        // to write. Any number of leading `-` are literals too.
        if self.char() == ']' {
            union.push(self.class_literal());
            if !self.bump_and_bump_space() {
                return Err(unclosed());
            }
        }
        while self.char() == '-' && self.peek_space() != Some('-') {
            union.push(self.class_literal());
            if !self.bump_and_bump_space() {
                return Err(unclosed());
            }
        }

        // The left hand side of a pending binary operator, if any.
        let mut lhs: Option<(ast::ClassSet, ast::ClassSetBinaryOpKind)> = None;
        loop {
            self.bump_space();
            if self.is_done() {
                return Err(unclosed());
            }
            let op = match self.char() {
                '[' => {
                    if let Some(ascii) = self.maybe_parse_ascii_class() {
                        union.push(ast::ClassSetItem::Ascii(ascii));
                    } else {
                        let nested = self.parse_set_class()?;
                        union.push(ast::ClassSetItem::Bracketed(Box::new(nested)));
                    }
                    continue;
                }
                ']' => {
                    self.bump();
                    break;
                }
                '&' if self.peek() == Some('&') => {
                    ast::ClassSetBinaryOpKind::Intersection
                }
                '-' if self.peek() == Some('-') => {
                    ast::ClassSetBinaryOpKind::Difference
                }
                '~' if self.peek() == Some('~') => {
                    ast::ClassSetBinaryOpKind::SymmetricDifference
                }
                _ => {
                    self.parse_set_class_range(&mut union)?;
                    continue;
                }
            };
            self.bump();
            self.bump();
            let rhs = core::mem::replace(
                &mut union,
                ast::ClassSetUnion { span: self.span(), items: vec![] },
            );
            let rhs = ast::ClassSet::Item(rhs.into_item());
            lhs = Some((Self::combine(lhs, rhs), op));
        }
        self.decrement_depth();

        let last = ast::ClassSet::Item(union.into_item());
        Ok(ast::ClassBracketed {
            span: Span::new(open.start, self.pos()),
            negated,
            kind: Self::combine(lhs, last),
        })
    }

    /// Applies a pending set operator, if any, to `rhs`.
    fn combine(
        lhs: Option<(ast::ClassSet, ast::ClassSetBinaryOpKind)>,
        rhs: ast::ClassSet,
    ) -> ast::ClassSet {
        match lhs {
            None => rhs,
            Some((lhs, kind)) => ast::ClassSet::BinaryOp(ast::ClassSetBinaryOp {
                span: Span::new(lhs.span().start, rhs.span().end),
                kind,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            }),
        }
    }

    /// The current character as a verbatim class literal. Does not advance.
    fn class_literal(&self) -> ast::ClassSetItem {
        ast::ClassSetItem::Literal(ast::Literal {
            span: self.span_char(),
            kind: ast::LiteralKind::Verbatim,
            c: self.char(),
        })
    }

    /// Parses a single class item or a range `a-z`, and adds it to `union`.
    fn parse_set_class_range(
        &self,
        union: &mut ast::ClassSetUnion,
    ) -> Result<(), Error> {
        let prim1 = self.parse_set_class_item()?;
        self.bump_space();
        if self.is_done() {
            return Err(self.error(*prim1.span(), ErrorKind::ClassUnclosed));
        }
        // `-` before `]` is a literal, and `--` is the difference operator.
        if self.char() != '-'
            || self.peek_space() == Some(']')
            || self.peek_space() == Some('-')
        {
            union.push(self.into_class_set_item(prim1)?);
            return Ok(());
        }
        if !self.bump_and_bump_space() {
            return Err(self.error(*prim1.span(), ErrorKind::ClassUnclosed));
        }
        let prim2 = self.parse_set_class_item()?;
        let start = self.into_class_literal(prim1)?;
        let end = self.into_class_literal(prim2)?;
        let range = ast::ClassSetRange {
            span: Span::new(start.span.start, end.span.end),
            start,
            end,
        };
        if range.start.c > range.end.c {
            return Err(self.error(range.span, ErrorKind::ClassRangeInvalid));
        }
        union.push(ast::ClassSetItem::Range(range));
        Ok(())
    }

    fn parse_set_class_item(&self) -> Result<Primitive, Error> {
        let span = self.span_char();
        let c = self.char();
        self.bump();
        if c == '\\' {
            self.parse_escape(span.start)
        } else {
            Ok(Primitive::Literal(ast::Literal {
                span,
                kind: ast::LiteralKind::Verbatim,
                c,
            }))
        }
    }

    fn into_class_set_item(
        &self,
        prim: Primitive,
    ) -> Result<ast::ClassSetItem, Error> {
        match prim {
            Primitive::Literal(lit) => Ok(ast::ClassSetItem::Literal(lit)),
            Primitive::Perl(cls) => Ok(ast::ClassSetItem::Perl(cls)),
            Primitive::Unicode(cls) => Ok(ast::ClassSetItem::Unicode(cls)),
            prim => Err(self.error(*prim.span(), ErrorKind::ClassEscapeInvalid)),
        }
    }

    fn into_class_literal(&self, prim: Primitive) -> Result<ast::Literal, Error> {
        match prim {
            Primitive::Literal(lit) => Ok(lit),
            prim => Err(self.error(*prim.span(), ErrorKind::ClassRangeLiteral)),
        }
    }

    /// Attempts to parse an ASCII class such as `[:alnum:]` or `[:^digit:]`.
    /// On failure the parser is rewound to the `[` and `None` is returned,
    /// in which case the caller treats the bracket as a nested class.
    fn maybe_parse_ascii_class(&self) -> Option<ast::ClassAscii> {
        debug_assert_eq!(self.char(), '[');
        let start = self.pos();
        let start_char = self.char.get();
        let reset = || {
            self.pos.set(start);
            self.char.set(start_char);
        };

        if !self.bump() || self.char() != ':' || !self.bump() {
            reset();
            return None;
        }
        let negated = self.char() == '^';
        if negated && !self.bump() {
            reset();
            return None;
        }
        let name_start = self.pos();
        while self.char() != ':' && self.bump() {}
        if self.is_done() {
            reset();
            return None;
        }
        let name = &self.pattern[name_start..self.pos()];
        if !self.bump_if(":]") {
            reset();
            return None;
        }
        match ast::ClassAsciiKind::from_name(name) {
            Some(kind) => Some(ast::ClassAscii {
                span: Span::new(start, self.pos()),
                kind,
                negated,
            }),
            None => {
                reset();
                None
            }
        }
    }
}

/// Splits the inside of `\p{...}` into a name or a name/value pair.
fn unicode_class_kind(name: &str) -> ast::ClassUnicodeKind {
    let split = |op, at: usize, oplen: usize| ast::ClassUnicodeKind::NamedValue {
        op,
        name: name[..at].trim().to_string(),
        value: name[at + oplen..].trim().to_string(),
    };
    if let Some(i) = name.find("!=") {
        split(ast::ClassUnicodeOpKind::NotEqual, i, 2)
    } else if let Some(i) = name.find(':') {
        split(ast::ClassUnicodeOpKind::Colon, i, 1)
    } else if let Some(i) = name.find('=') {
        split(ast::ClassUnicodeOpKind::Equal, i, 1)
    } else {
        ast::ClassUnicodeKind::Named(name.to_string())
    }
}

/// Returns true if the given character is valid in a capture group name.
///
/// The first character must be alphabetic or an underscore.
fn is_capture_char(c: char, first: bool) -> bool {
    if first {
        c == '_' || c.is_alphabetic()
    } else {
        c == '_' || c == '.' || c == '[' || c == ']' || c.is_alphanumeric()
    }
}
