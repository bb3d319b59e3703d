/*!
Defines a translator that converts an `Ast` to a `Hir`.
*/

use core::cell::{Cell, OnceCell, RefCell};

use alloc::{boxed::Box, string::ToString, vec, vec::Vec};

use crate::{
    ast::{self, Ast, Span},
    hir::{
        Capture, Class, ClassBytes, ClassBytesRange, ClassUnicode,
        ClassUnicodeRange, Config, Error, ErrorKind, Flags, Hir, Look,
        Repetition,
    },
    unicode::{self, CaseFolder, PropertyError},
};

type Result<T> = core::result::Result<T, Error>;

/// A builder for constructing an AST->HIR translator.
#[derive(Clone, Debug)]
pub struct TranslatorBuilder {
    utf8: bool,
    flags: Flags,
}

impl Default for TranslatorBuilder {
    fn default() -> TranslatorBuilder {
        TranslatorBuilder::new()
    }
}

impl TranslatorBuilder {
    /// Create a new translator builder with a default configuration.
    pub fn new() -> TranslatorBuilder {
        TranslatorBuilder { utf8: true, flags: Flags::default() }
    }

    pub(crate) fn from_config(config: &Config) -> TranslatorBuilder {
        TranslatorBuilder { utf8: config.utf8, flags: config.flags }
    }

    /// Build a translator using the current configuration.
    pub fn build(&self) -> Translator {
        Translator {
            flags: self.flags,
            utf8: self.utf8,
            captures: vec![],
            folder: OnceCell::new(),
        }
    }

    /// When enabled (the default), translation fails for any expression
    /// that could match invalid UTF-8, such as `(?-u:\xFF)`.
    pub fn utf8(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.utf8 = yes;
        self
    }

    /// Enable or disable the case insensitive flag (`i`) by default.
    pub fn case_insensitive(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.flags.case_insensitive = yes;
        self
    }

    /// Enable or disable the multi-line matching flag (`m`) by default.
    pub fn multi_line(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.flags.multi_line = yes;
        self
    }

    /// Enable or disable the "dot matches any character" flag (`s`) by
    /// default.
    pub fn dot_matches_new_line(
        &mut self,
        yes: bool,
    ) -> &mut TranslatorBuilder {
        self.flags.dot_matches_new_line = yes;
        self
    }

    /// Enable or disable the CRLF mode flag (`R`) by default.
    pub fn crlf(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.flags.crlf = yes;
        self
    }

    /// Enable or disable the "swap greed" flag (`U`) by default.
    pub fn swap_greed(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.flags.swap_greed = yes;
        self
    }

    /// Enable or disable the Unicode flag (`u`) by default.
    pub fn unicode(&mut self, yes: bool) -> &mut TranslatorBuilder {
        self.flags.unicode = yes;
        self
    }
}

/// A translator maps abstract syntax to a high level intermediate
/// representation.
///
/// A translator may be reused. After each translation, the names of the
/// capture groups it saw are available through
/// [`capture_names`](Translator::capture_names).
#[derive(Debug)]
pub struct Translator {
    flags: Flags,
    utf8: bool,
    captures: Vec<Option<Box<str>>>,
    folder: OnceCell<CaseFolder>,
}

impl Translator {
    /// Create a new translator using the default configuration.
    pub fn new() -> Translator {
        TranslatorBuilder::new().build()
    }

    /// Translate the given abstract syntax tree into a high level
    /// intermediate representation. `pattern` must be the string the AST
    /// was parsed from, since it is used to report errors.
    pub fn translate(&mut self, pattern: &str, ast: &Ast) -> Result<Hir> {
        let t = TranslatorI {
            trans: self,
            pattern,
            flags: Cell::new(self.flags),
            captures: RefCell::new(vec![]),
        };
        let hir = t.hir(ast)?;
        let captures = t.captures.into_inner();
        self.captures = captures;
        Ok(hir)
    }

    /// The name of every explicit capture group seen by the last
    /// translation, indexed by capture index minus one. Unnamed groups are
    /// `None`.
    ///
    /// This includes groups that were removed from the `Hir`, such as the
    /// group in `(a){0}`, so that capture indices stay contiguous.
    pub fn capture_names(&self) -> &[Option<Box<str>>] {
        &self.captures
    }
}

impl Default for Translator {
    fn default() -> Translator {
        Translator::new()
    }
}

/// The state of a single translation.
struct TranslatorI<'t, 'p> {
    trans: &'t Translator,
    pattern: &'p str,
    flags: Cell<Flags>,
    captures: RefCell<Vec<Option<Box<str>>>>,
}

impl<'t, 'p> TranslatorI<'t, 'p> {
    fn flags(&self) -> Flags {
        self.flags.get()
    }

    /// Applies every flag mentioned in `ast_flags` and returns the flags
    /// that were in effect before.
    fn set_flags(&self, ast_flags: &ast::Flags) -> Flags {
        use crate::ast::Flag;

        let old = self.flags();
        let mut new = old;
        let apply = |flag, field: &mut bool| {
            if let Some(yes) = ast_flags.flag_state(flag) {
                *field = yes;
            }
        };
        apply(Flag::CaseInsensitive, &mut new.case_insensitive);
        apply(Flag::MultiLine, &mut new.multi_line);
        apply(Flag::DotMatchesNewLine, &mut new.dot_matches_new_line);
        apply(Flag::SwapGreed, &mut new.swap_greed);
        apply(Flag::Unicode, &mut new.unicode);
        apply(Flag::CRLF, &mut new.crlf);
        apply(Flag::IgnoreWhitespace, &mut new.ignore_whitespace);
        self.flags.set(new);
        old
    }

    fn error(&self, span: Span, kind: ErrorKind) -> Error {
        Error { kind, pattern: self.pattern.to_string(), span }
    }

    fn folder(&self) -> &CaseFolder {
        self.trans.folder.get_or_init(CaseFolder::new)
    }

    fn hir(&self, ast: &Ast) -> Result<Hir> {
        Ok(match *ast {
            Ast::Empty(_) => Hir::empty(),
            Ast::Flags(ref x) => {
                self.set_flags(&x.flags);
                Hir::empty()
            }
            Ast::Literal(ref x) => self.hir_literal(x)?,
            Ast::Dot(span) => {
                let class = Hir::dot(self.flags());
                if self.trans.utf8 && !class.is_unicode_or_ascii() {
                    return Err(self.error(span, ErrorKind::InvalidUtf8));
                }
                Hir::class(class)
            }
            Ast::Assertion(ref x) => Hir::look(self.hir_look(x)),
            Ast::Class(ast::Class::Unicode(ref x)) => {
                if !self.flags().unicode {
                    return Err(
                        self.error(x.span, ErrorKind::UnicodeNotAllowed)
                    );
                }
                let mut class = self.hir_unicode_class(x)?;
                if x.is_negated() {
                    class.negate();
                }
                Hir::class(Class::Unicode(class))
            }
            Ast::Class(ast::Class::Perl(ref x)) => {
                if self.flags().unicode {
                    Hir::class(Class::Unicode(self.hir_perl_unicode_class(x)))
                } else {
                    let class = self.hir_perl_byte_class(x);
                    Hir::class(Class::Bytes(self.check_bytes(x.span, class)?))
                }
            }
            Ast::Class(ast::Class::Bracketed(ref x)) => {
                if self.flags().unicode {
                    let mut class = self.class_set_unicode(&x.kind)?;
                    if x.negated {
                        class.negate();
                    }
                    Hir::class(Class::Unicode(class))
                } else {
                    let mut class = self.class_set_bytes(&x.kind)?;
                    if x.negated {
                        class.negate();
                    }
                    Hir::class(Class::Bytes(self.check_bytes(x.span, class)?))
                }
            }
            Ast::Repetition(ref x) => {
                let sub = self.hir(&x.ast)?;
                let (min, max) = x.op.bounds();
                let greedy =
                    if self.flags().swap_greed { !x.greedy } else { x.greedy };
                Hir::repetition(Repetition {
                    min,
                    max,
                    greedy,
                    sub: Box::new(sub),
                })
            }
            Ast::Group(ref x) => {
                let old = match x.kind {
                    ast::GroupKind::NonCapturing(ref flags) => {
                        self.set_flags(flags)
                    }
                    _ => self.flags(),
                };
                let sub = self.hir(&x.ast);
                self.flags.set(old);
                let sub = sub?;
                match x.capture_index() {
                    None => sub,
                    Some(index) => {
                        let name = match x.kind {
                            ast::GroupKind::CaptureName { ref name, .. } => {
                                Some(Box::from(name.name.as_str()))
                            }
                            _ => None,
                        };
                        self.record_capture(index, name.clone());
                        Hir::capture(Capture { index, name, sub: Box::new(sub) })
                    }
                }
            }
            Ast::Alternation(ref x) => {
                let mut subs = Vec::with_capacity(x.asts.len());
                for ast in x.asts.iter() {
                    subs.push(self.hir(ast)?);
                }
                Hir::alternation(subs)
            }
            Ast::Concat(ref x) => {
                let mut subs = Vec::with_capacity(x.asts.len());
                for ast in x.asts.iter() {
                    subs.push(self.hir(ast)?);
                }
                Hir::concat(subs)
            }
        })
    }

    fn record_capture(&self, index: u32, name: Option<Box<str>>) {
        let mut captures = self.captures.borrow_mut();
        // Capture indices start at 1 and are checked against u32::MAX by
        // the parser.
        let slot = (index as usize).saturating_sub(1);
        if captures.len() <= slot {
            captures.resize(slot + 1, None);
        }
        captures[slot] = name;
    }

    fn hir_literal(&self, lit: &ast::Literal) -> Result<Hir> {
        let flags = self.flags();
        if flags.unicode {
            if !flags.case_insensitive {
                let mut buf = [0; 4];
                return Ok(Hir::literal(lit.c.encode_utf8(&mut buf).as_bytes()));
            }
            let mut class =
                ClassUnicode::new([ClassUnicodeRange::new(lit.c, lit.c)]);
            class.case_fold_simple(self.folder());
            return Ok(Hir::class(Class::Unicode(class)));
        }
        let byte = match lit.byte() {
            Some(byte) => byte,
            None if lit.c.is_ascii() => lit.c as u8,
            None => {
                // A non-ASCII character written verbatim still means its
                // UTF-8 encoding in byte mode.
                let mut buf = [0; 4];
                return Ok(Hir::literal(lit.c.encode_utf8(&mut buf).as_bytes()));
            }
        };
        if self.trans.utf8 && !byte.is_ascii() {
            return Err(self.error(lit.span, ErrorKind::InvalidUtf8));
        }
        if !flags.case_insensitive {
            return Ok(Hir::literal(vec![byte]));
        }
        let mut class = ClassBytes::new([ClassBytesRange::new(byte, byte)]);
        class.case_fold_simple();
        Ok(Hir::class(Class::Bytes(class)))
    }

    fn hir_look(&self, asst: &ast::Assertion) -> Look {
        use crate::ast::AssertionKind::*;

        let flags = self.flags();
        let unicode = flags.unicode;
        match asst.kind {
            StartLine if !flags.multi_line => Look::Start,
            StartLine if flags.crlf => Look::StartCRLF,
            StartLine => Look::StartLF,
            EndLine if !flags.multi_line => Look::End,
            EndLine if flags.crlf => Look::EndCRLF,
            EndLine => Look::EndLF,
            StartText => Look::Start,
            EndText => Look::End,
            WordBoundary if unicode => Look::WordUnicode,
            WordBoundary => Look::WordAscii,
            NotWordBoundary if unicode => Look::WordUnicodeNegate,
            NotWordBoundary => Look::WordAsciiNegate,
            WordBoundaryStart if unicode => Look::WordStartUnicode,
            WordBoundaryStart => Look::WordStartAscii,
            WordBoundaryEnd if unicode => Look::WordEndUnicode,
            WordBoundaryEnd => Look::WordEndAscii,
            WordBoundaryStartHalf if unicode => Look::WordStartHalfUnicode,
            WordBoundaryStartHalf => Look::WordStartHalfAscii,
            WordBoundaryEndHalf if unicode => Look::WordEndHalfUnicode,
            WordBoundaryEndHalf => Look::WordEndHalfAscii,
        }
    }

    /// Resolves a `\p` class without applying its negation.
    fn hir_unicode_class(&self, x: &ast::ClassUnicode) -> Result<ClassUnicode> {
        use crate::ast::ClassUnicodeKind::*;

        let mut buf = [0; 4];
        let result = match x.kind {
            OneLetter(c) => unicode::property(c.encode_utf8(&mut buf), None),
            Named(ref name) => unicode::property(name, None),
            NamedValue { ref name, ref value, .. } => {
                unicode::property(name, Some(value))
            }
        };
        let mut class = result.map_err(|err| {
            let kind = match err {
                PropertyError::NameNotFound => ErrorKind::UnicodePropertyNotFound,
                PropertyError::ValueNotFound => {
                    ErrorKind::UnicodePropertyValueNotFound
                }
            };
            self.error(x.span, kind)
        })?;
        if self.flags().case_insensitive {
            class.case_fold_simple(self.folder());
        }
        Ok(class)
    }

    fn hir_perl_unicode_class(&self, x: &ast::ClassPerl) -> ClassUnicode {
        use crate::ast::ClassPerlKind::*;

        let mut class = match x.kind {
            Digit => unicode::perl_digit(),
            Space => unicode::perl_space(),
            Word => unicode::perl_word(),
        };
        if x.negated {
            class.negate();
        }
        class
    }

    fn hir_perl_byte_class(&self, x: &ast::ClassPerl) -> ClassBytes {
        use crate::ast::{ClassAsciiKind, ClassPerlKind::*};

        let kind = match x.kind {
            Digit => ClassAsciiKind::Digit,
            Space => ClassAsciiKind::Space,
            Word => ClassAsciiKind::Word,
        };
        let mut class = ascii_class_bytes(kind);
        if x.negated {
            class.negate();
        }
        class
    }

    /// In UTF-8 mode, a byte class may only match ASCII.
    fn check_bytes(&self, span: Span, class: ClassBytes) -> Result<ClassBytes> {
        if self.trans.utf8 && !Class::Bytes(class.clone()).is_ascii() {
            return Err(self.error(span, ErrorKind::InvalidUtf8));
        }
        Ok(class)
    }

    fn class_set_unicode(&self, set: &ast::ClassSet) -> Result<ClassUnicode> {
        match *set {
            ast::ClassSet::Item(ref item) => self.class_item_unicode(item),
            ast::ClassSet::BinaryOp(ref op) => {
                let mut lhs = self.class_set_unicode(&op.lhs)?;
                let rhs = self.class_set_unicode(&op.rhs)?;
                match op.kind {
                    ast::ClassSetBinaryOpKind::Intersection => lhs.intersect(&rhs),
                    ast::ClassSetBinaryOpKind::Difference => lhs.difference(&rhs),
                    ast::ClassSetBinaryOpKind::SymmetricDifference => {
                        lhs.symmetric_difference(&rhs)
                    }
                }
                Ok(lhs)
            }
        }
    }

    fn class_item_unicode(
        &self,
        item: &ast::ClassSetItem,
    ) -> Result<ClassUnicode> {
        use crate::ast::ClassSetItem::*;

        let fold = self.flags().case_insensitive;
        let mut class = match *item {
            Empty(_) => return Ok(ClassUnicode::empty()),
            Literal(ref x) => {
                ClassUnicode::new([ClassUnicodeRange::new(x.c, x.c)])
            }
            Range(ref x) => {
                ClassUnicode::new([ClassUnicodeRange::new(x.start.c, x.end.c)])
            }
            Ascii(ref x) => {
                let bytes = ascii_class_bytes(x.kind);
                let mut class = bytes.to_unicode_class().unwrap_or_else(ClassUnicode::empty);
                if x.negated {
                    class.negate();
                }
                class
            }
            Unicode(ref x) => {
                // Already case folded when needed.
                let mut class = self.hir_unicode_class(x)?;
                if x.is_negated() {
                    class.negate();
                }
                return Ok(class);
            }
            Perl(ref x) => return Ok(self.hir_perl_unicode_class(x)),
            Bracketed(ref x) => {
                let mut class = self.class_set_unicode(&x.kind)?;
                if x.negated {
                    class.negate();
                }
                return Ok(class);
            }
            Union(ref x) => {
                let mut class = ClassUnicode::empty();
                for item in x.items.iter() {
                    class.union(&self.class_item_unicode(item)?);
                }
                return Ok(class);
            }
        };
        if fold {
            class.case_fold_simple(self.folder());
        }
        Ok(class)
    }

    fn class_set_bytes(&self, set: &ast::ClassSet) -> Result<ClassBytes> {
        match *set {
            ast::ClassSet::Item(ref item) => self.class_item_bytes(item),
            ast::ClassSet::BinaryOp(ref op) => {
                let mut lhs = self.class_set_bytes(&op.lhs)?;
                let rhs = self.class_set_bytes(&op.rhs)?;
                match op.kind {
                    ast::ClassSetBinaryOpKind::Intersection => lhs.intersect(&rhs),
                    ast::ClassSetBinaryOpKind::Difference => lhs.difference(&rhs),
                    ast::ClassSetBinaryOpKind::SymmetricDifference => {
                        lhs.symmetric_difference(&rhs)
                    }
                }
                Ok(lhs)
            }
        }
    }

    fn class_item_bytes(&self, item: &ast::ClassSetItem) -> Result<ClassBytes> {
        use crate::ast::ClassSetItem::*;

        let fold = self.flags().case_insensitive;
        let mut class = match *item {
            Empty(_) => return Ok(ClassBytes::empty()),
            Literal(ref x) => {
                let b = self.class_literal_byte(x)?;
                ClassBytes::new([ClassBytesRange::new(b, b)])
            }
            Range(ref x) => {
                let start = self.class_literal_byte(&x.start)?;
                let end = self.class_literal_byte(&x.end)?;
                ClassBytes::new([ClassBytesRange::new(start, end)])
            }
            Ascii(ref x) => {
                let mut class = ascii_class_bytes(x.kind);
                if x.negated {
                    class.negate();
                }
                class
            }
            Unicode(ref x) => {
                return Err(self.error(x.span, ErrorKind::UnicodeNotAllowed))
            }
            Perl(ref x) => return Ok(self.hir_perl_byte_class(x)),
            Bracketed(ref x) => {
                let mut class = self.class_set_bytes(&x.kind)?;
                if x.negated {
                    class.negate();
                }
                return Ok(class);
            }
            Union(ref x) => {
                let mut class = ClassBytes::empty();
                for item in x.items.iter() {
                    class.union(&self.class_item_bytes(item)?);
                }
                return Ok(class);
            }
        };
        if fold {
            class.case_fold_simple();
        }
        Ok(class)
    }

    fn class_literal_byte(&self, lit: &ast::Literal) -> Result<u8> {
        match lit.byte() {
            Some(byte) => Ok(byte),
            None if lit.c.is_ascii() => Ok(lit.c as u8),
            None => Err(self.error(lit.span, ErrorKind::UnicodeNotAllowed)),
        }
    }
}

fn ascii_class_bytes(kind: ast::ClassAsciiKind) -> ClassBytes {
    ClassBytes::new(
        kind.ranges().iter().map(|&(s, e)| ClassBytesRange::new(s, e)),
    )
}

impl Class {
    /// True if this is a Unicode class or an ASCII-only byte class, i.e.,
    /// it can only match valid UTF-8.
    fn is_unicode_or_ascii(&self) -> bool {
        match *self {
            Class::Unicode(_) => true,
            Class::Bytes(_) => self.is_ascii(),
        }
    }
}
