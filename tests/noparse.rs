use rregex::{Error, Regex};

// Both kinds of error quote the offending pattern line and underline the
// span at fault.
fn assert_rendered(msg: &str, header: &str, re: &str) {
    let mut lines = msg.lines();
    assert_eq!(Some(format!("{}:", header).as_str()), lines.next(), "{}", msg);
    assert_eq!(Some(format!("    {}", re).as_str()), lines.next(), "{}", msg);
    let carets = lines.next().unwrap_or("");
    assert!(carets.trim_start().starts_with('^'), "{}", msg);
    assert!(lines.next().map_or(false, |l| l.starts_with("error: ")), "{}", msg);
}

macro_rules! noparse(
    ($name:ident, $re:expr) => (
        #[test]
        fn $name() {
            match Regex::new($re) {
                Err(Error::Syntax(msg)) => {
                    assert_rendered(&msg, "regex parse error", $re)
                }
                Err(err) => panic!("{:?}: wrong error kind {:?}", $re, err),
                Ok(_) => panic!("{:?} should not parse", $re),
            }
        }
    );
);

macro_rules! notranslate(
    ($name:ident, $re:expr) => (
        #[test]
        fn $name() {
            match Regex::new($re) {
                Err(Error::Translate(msg)) => {
                    assert_rendered(&msg, "regex translate error", $re)
                }
                Err(err) => panic!("{:?}: wrong error kind {:?}", $re, err),
                Ok(_) => panic!("{:?} should not translate", $re),
            }
        }
    );
);

// Groups and flags.
noparse!(group_unclosed, "(ab");
noparse!(group_unopened, "ab)");
noparse!(group_unclosed_flags, "(?i");
noparse!(group_name_digit_first, "(?P<1st>x)");
noparse!(group_name_empty, "(?<>x)");
noparse!(group_name_dash, "(?P<first-name>x)");
noparse!(group_name_eof, "(?P<year");
noparse!(group_name_duplicate, "(?P<y>a)|(?P<y>b)");
noparse!(group_name_duplicate_mixed, "(?<y>a)(?P<y>b)");
noparse!(flags_empty, "x(?)");
noparse!(flags_unknown, "(?q)x");
noparse!(flags_repeated, "(?ss)x");
noparse!(flags_double_negation, "(?-i-s)x");
noparse!(flags_dangling_negation, "(?m-)x");
noparse!(look_ahead, "x(?=y)");
noparse!(look_ahead_negative, "x(?!y)");
noparse!(look_behind, "(?<=x)y");
noparse!(look_behind_negative, "(?<!x)y");

// Repetitions.
noparse!(repeat_nothing, "*x");
noparse!(repeat_alternation_start, "a|+");
noparse!(repeat_after_flags, "(?s)?");
noparse!(repeat_counted_nothing, "{3}x");
noparse!(repeat_counted_unclosed, "x{2,");
noparse!(repeat_counted_no_min, "x{,9}");
noparse!(repeat_counted_reversed, "x{9,3}");
noparse!(repeat_counted_huge, "x{12345678901}");

// Escapes.
noparse!(escape_trailing, r"ab\");
noparse!(escape_unknown, r"\y");
noparse!(escape_octal, r"\7");
noparse!(escape_backreference, r"(x)\1");
noparse!(escape_hex_bad_digit, r"\xQ1");
noparse!(escape_hex_too_short, r"\x7");
noparse!(escape_hex_braced_empty, r"\x{}");
noparse!(escape_hex_surrogate, r"\u{DFFF}");
noparse!(escape_property_unclosed, r"\p{Latin");
noparse!(escape_boundary_unknown, r"\b{middle}");
noparse!(escape_boundary_unclosed, r"\b{end");

// Bracketed classes.
noparse!(class_unclosed, "[xyz");
noparse!(class_only_bracket, "[]");
noparse!(class_negated_unclosed, "[^");
noparse!(class_range_reversed, "[9-0]");
noparse!(class_range_to_perl, r"[0-\w]");
noparse!(class_range_to_ascii, "[a-[:digit:]]");
noparse!(class_text_anchor, r"[\z]");
noparse!(class_boundary, r"[\b]");

notranslate!(property_unknown, r"\p{Klingon}");
notranslate!(property_value_unknown, r"\p{Script=Klingon}");
notranslate!(property_name_unknown, r"\p{Color=Red}");
notranslate!(property_in_byte_mode, r"(?-u)\p{Greek}");
notranslate!(byte_mode_high_byte, r"(?-u)\x80");
notranslate!(byte_mode_negated_class, r"(?-u)[^x]");
notranslate!(byte_mode_dot, r"(?-u:.)");
notranslate!(byte_mode_non_word, r"(?-u)\W");

#[test]
fn nest_limit() {
    use rregex::RegexBuilder;

    assert!(RegexBuilder::new("a").nest_limit(0).build().is_ok());
    assert!(RegexBuilder::new("ab|cd").nest_limit(0).build().is_ok());
    assert!(RegexBuilder::new("(a)").nest_limit(0).build().is_err());
    assert!(RegexBuilder::new("[a]").nest_limit(1).build().is_ok());
    assert!(RegexBuilder::new("a+").nest_limit(0).build().is_err());
    assert!(RegexBuilder::new("(a)").nest_limit(1).build().is_ok());
    assert!(RegexBuilder::new("((a))").nest_limit(1).build().is_err());
    let deep = format!("{}a{}", "(".repeat(300), ")".repeat(300));
    assert!(matches!(Regex::new(&deep), Err(Error::Syntax(_))));
}

#[test]
fn too_big() {
    let err = Regex::new("a{10000000}").unwrap_err();
    assert!(matches!(err, Error::ProgramTooLarge(_)), "{:?}", err);
}

#[test]
fn accepted_oddities() {
    // None of these are errors, even though some look like they might be.
    for re in ["a**", "|a", "a|", "()", "(?P<name>)", "(?i)", r"\%", "[]]"] {
        assert!(Regex::new(re).is_ok(), "{} should compile", re);
    }
}
