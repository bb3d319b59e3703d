/*!
Unicode data lookups backed by the `icu_properties` compiled tables.

This covers general categories, scripts, the handful of binary properties
the syntax exposes, the Perl classes `\w`, `\d` and `\s`, and simple case
folding.
*/

use core::ops::RangeInclusive;

use alloc::{string::String, vec::Vec};

use icu_properties::{
    maps, script, sets, GeneralCategory, GeneralCategoryGroup, Script,
};

use crate::hir::{ClassUnicode, ClassUnicodeRange};

/// The reason a property lookup failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum PropertyError {
    /// The property name (or the lone value) is unknown.
    NameNotFound,
    /// The property name is known but its value is not.
    ValueNotFound,
}

/// Returns true if `c` is a Unicode word character: Alphabetic, a mark, a
/// decimal digit, connector punctuation or Join_Control.
pub(crate) fn is_word_character(c: char) -> bool {
    if c.is_ascii() {
        return crate::utf8::is_word_byte(c as u8);
    }
    let gc = maps::general_category().get(c);
    sets::alphabetic().contains(c)
        || GeneralCategoryGroup::Mark.contains(gc)
        || gc == GeneralCategory::DecimalNumber
        || gc == GeneralCategory::ConnectorPunctuation
        || sets::join_control().contains(c)
}

/// The Unicode `\w` class.
pub(crate) fn perl_word() -> ClassUnicode {
    let gc = maps::general_category();
    let mut class = from_ranges(sets::alphabetic().iter_ranges());
    class.union(&from_ranges(gc.iter_ranges_for_group(GeneralCategoryGroup::Mark)));
    class.union(&from_ranges(
        gc.iter_ranges_for_value(GeneralCategory::DecimalNumber),
    ));
    class.union(&from_ranges(
        gc.iter_ranges_for_value(GeneralCategory::ConnectorPunctuation),
    ));
    class.union(&from_ranges(sets::join_control().iter_ranges()));
    class
}

/// The Unicode `\d` class.
pub(crate) fn perl_digit() -> ClassUnicode {
    from_ranges(
        maps::general_category()
            .iter_ranges_for_value(GeneralCategory::DecimalNumber),
    )
}

/// The Unicode `\s` class.
pub(crate) fn perl_space() -> ClassUnicode {
    from_ranges(sets::white_space().iter_ranges())
}

/// Resolves `\p{name}` (when `value` is `None`) or `\p{name=value}`.
pub(crate) fn property(
    name: &str,
    value: Option<&str>,
) -> Result<ClassUnicode, PropertyError> {
    let norm = normalize(name);
    if let Some(value) = value {
        return match norm.as_str() {
            "gc" | "generalcategory" => {
                general_category(value).ok_or(PropertyError::ValueNotFound)
            }
            "sc" | "script" => {
                script(value).ok_or(PropertyError::ValueNotFound)
            }
            "scx" | "scriptextensions" => {
                script_extensions(value).ok_or(PropertyError::ValueNotFound)
            }
            _ => Err(PropertyError::NameNotFound),
        };
    }
    let class = match norm.as_str() {
        "any" => Some(ClassUnicode::new([ClassUnicodeRange::new(
            '\0',
            '\u{10FFFF}',
        )])),
        "ascii" => {
            Some(ClassUnicode::new([ClassUnicodeRange::new('\0', '\x7F')]))
        }
        "assigned" => {
            let mut class = from_ranges(
                maps::general_category()
                    .iter_ranges_for_value(GeneralCategory::Unassigned),
            );
            class.negate();
            Some(class)
        }
        "alphabetic" | "alpha" => Some(from_ranges(sets::alphabetic().iter_ranges())),
        "whitespace" | "wspace" | "space" => {
            Some(from_ranges(sets::white_space().iter_ranges()))
        }
        "joincontrol" | "joinc" => {
            Some(from_ranges(sets::join_control().iter_ranges()))
        }
        "lowercase" | "lower" => Some(from_ranges(sets::lowercase().iter_ranges())),
        "uppercase" | "upper" => Some(from_ranges(sets::uppercase().iter_ranges())),
        _ => None,
    };
    class
        .or_else(|| general_category(name))
        .or_else(|| script(name))
        .ok_or(PropertyError::NameNotFound)
}

fn general_category(name: &str) -> Option<ClassUnicode> {
    let group = GeneralCategoryGroup::name_to_enum_mapper().get_loose(name)?;
    trace!("resolved general category {:?} to {:?}", name, group);
    Some(from_ranges(maps::general_category().iter_ranges_for_group(group)))
}

fn script(name: &str) -> Option<ClassUnicode> {
    let script = Script::name_to_enum_mapper().get_loose(name)?;
    trace!("resolved script {:?} to {:?}", name, script);
    Some(from_ranges(maps::script().iter_ranges_for_value(script)))
}

/// Every code point whose Script_Extensions contains the named script.
/// This is a superset of the Script property's set for that script.
fn script_extensions(name: &str) -> Option<ClassUnicode> {
    let sc = Script::name_to_enum_mapper().get_loose(name)?;
    trace!("resolved script extensions {:?} to {:?}", name, sc);
    Some(from_ranges(
        script::script_with_extensions().get_script_extensions_ranges(sc),
    ))
}

/// Lowercases `name` and strips spaces, `_` and `-`.
fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Builds a class from code point ranges. Surrogates are dropped.
fn from_ranges<I>(ranges: I) -> ClassUnicode
where
    I: IntoIterator<Item = RangeInclusive<u32>>,
{
    let mut class = ClassUnicode::empty();
    for r in ranges {
        let (mut start, mut end) = (*r.start(), *r.end());
        if (0xD800..=0xDFFF).contains(&start) {
            start = 0xE000;
        }
        if (0xD800..=0xDFFF).contains(&end) {
            end = 0xD7FF;
        }
        if start > end {
            continue;
        }
        if let (Some(s), Some(e)) = (char::from_u32(start), char::from_u32(end))
        {
            class.push(ClassUnicodeRange::new(s, e));
        }
    }
    class
}

/// A table of simple, one-to-one case mappings.
///
/// Every character with a single-character lowercase or uppercase mapping
/// is paired with that mapping in both directions. Applying the table until
/// nothing new is added gives the full simple case folding orbit.
#[derive(Debug)]
pub(crate) struct CaseFolder {
    pairs: Vec<(char, char)>,
}

impl CaseFolder {
    pub(crate) fn new() -> CaseFolder {
        let mut pairs = Vec::new();
        for r in sets::changes_when_casemapped().iter_ranges() {
            for cp in r {
                let Some(c) = char::from_u32(cp) else { continue };
                for other in [single(c.to_lowercase()), single(c.to_uppercase())]
                {
                    if let Some(other) = other.filter(|&o| o != c) {
                        pairs.push((c, other));
                        pairs.push((other, c));
                    }
                }
            }
        }
        pairs.sort_unstable();
        pairs.dedup();
        CaseFolder { pairs }
    }

    /// Returns every character that some character in `ranges` maps to.
    pub(crate) fn fold(&self, ranges: &[ClassUnicodeRange]) -> Vec<char> {
        let mut out = Vec::new();
        for r in ranges {
            let i = self.pairs.partition_point(|&(c, _)| c < r.start());
            for &(c, other) in self.pairs[i..].iter() {
                if c > r.end() {
                    break;
                }
                out.push(other);
            }
        }
        out
    }
}

fn single<I: Iterator<Item = char>>(mut it: I) -> Option<char> {
    let c = it.next()?;
    match it.next() {
        None => Some(c),
        Some(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fold(c: char) -> Vec<char> {
        let mut class = ClassUnicode::new([ClassUnicodeRange::new(c, c)]);
        class.case_fold_simple(&CaseFolder::new());
        class
            .ranges()
            .iter()
            .flat_map(|r| (r.start()..=r.end()).collect::<Vec<char>>())
            .collect()
    }

    #[test]
    fn word_characters() {
        assert!(is_word_character('a'));
        assert!(is_word_character('_'));
        assert!(is_word_character('δ'));
        assert!(is_word_character('٣'));
        assert!(!is_word_character(' '));
        assert!(!is_word_character('☃'));
        let word = perl_word();
        assert!(word.contains('δ'));
        assert!(word.contains('\u{200D}'));
        assert!(!word.contains('-'));
    }

    #[test]
    fn perl_classes() {
        assert!(perl_digit().contains('٣'));
        assert!(!perl_digit().contains('a'));
        assert!(perl_space().contains('\u{3000}'));
        assert!(!perl_space().contains('a'));
    }

    #[test]
    fn property_names() {
        let greek = property("Greek", None).unwrap();
        assert!(greek.contains('α'));
        assert!(!greek.contains('a'));
        assert!(property("sc", Some("grek")).unwrap().contains('α'));
        assert!(property("L", None).unwrap().contains('a'));
        assert!(property("Uppercase_Letter", None).unwrap().contains('A'));
        assert!(property("gc", Some("Nd")).unwrap().contains('5'));
        assert!(property("White Space", None).unwrap().contains(' '));
        assert!(!property("Assigned", None).unwrap().contains('\u{10FFFF}'));
        assert_eq!(1, property("ASCII", None).unwrap().ranges().len());
    }

    #[test]
    fn script_extensions_include_shared_marks() {
        // U+0342 COMBINING GREEK PERISPOMENI has Script=Inherited.
        let scx = property("scx", Some("Greek")).unwrap();
        assert!(scx.contains('\u{0342}'));
        assert!(scx.contains('α'));
        assert!(!property("sc", Some("Greek")).unwrap().contains('\u{0342}'));
        let long = property("Script_Extensions", Some("Grek")).unwrap();
        assert_eq!(scx, long);
    }

    #[test]
    fn property_errors() {
        assert_eq!(Err(PropertyError::NameNotFound), property("Foo", None));
        assert_eq!(
            Err(PropertyError::ValueNotFound),
            property("gc", Some("Foo"))
        );
        assert_eq!(
            Err(PropertyError::NameNotFound),
            property("Foo", Some("L"))
        );
    }

    #[test]
    fn case_folding() {
        assert_eq!(vec!['A', 'a'], fold('a'));
        assert_eq!(vec!['K', 'k', '\u{212A}'], fold('k'));
        assert_eq!(vec!['S', 's', 'ſ'], fold('s'));
        assert_eq!(vec!['Σ', 'ς', 'σ'], fold('σ'));
        assert_eq!(vec!['☃'], fold('☃'));
    }
}
