use rregex::{RegexSet, RegexSetBuilder};

macro_rules! setmat {
    ($name:ident, $res:expr, $text:expr, $($match_index:expr),*) => {
        #[test]
        fn $name() {
            let set = regex_set!($res);
            assert!(set.is_match($text));
            let expected = vec![$($match_index),*];
            let matches = set.matches($text);
            assert!(matches.matched_any());
            let got: Vec<_> = matches.into_iter().collect();
            assert_eq!(expected, got);
        }
    }
}

macro_rules! setnomat {
    ($name:ident, $res:expr, $text:expr) => {
        #[test]
        fn $name() {
            let set = regex_set!($res);
            assert!(!set.is_match($text));
            let matches = set.matches($text);
            assert!(!matches.matched_any());
            assert_eq!(0, matches.into_iter().count());
        }
    }
}

setmat!(set1, &["a", "a"], "a", 0, 1);
setmat!(set2, &["a", "a"], "ba", 0, 1);
setmat!(set3, &["a", "b"], "a", 0);
setmat!(set4, &["a", "b"], "b", 1);
setmat!(set5, &["a|b", "b|a"], "b", 0, 1);
setmat!(set6, &["foo", "oo"], "foo", 0, 1);
setmat!(set7, &["^foo", "bar$"], "foo", 0);
setmat!(set8, &["^foo", "bar$"], "foo bar", 0, 1);
setmat!(set9, &["^foo", "bar$"], "bar", 1);
setmat!(set10, &[r"[a-z]+$", "foo"], "01234 foo", 0, 1);
setmat!(set11, &[r"[a-z]+$", "foo"], "foo 01234", 1);
setmat!(set12, &[r".*?", "a"], "zzzzzza", 0, 1);
setmat!(set13, &[r".*", "a"], "zzzzzza", 0, 1);
setmat!(set14, &[r".*", "a"], "zzzzzz", 0);
setmat!(set15, &[r"(?-u)\ba\b"], "hello a bye", 0);
setmat!(set16, &["a"], "a", 0);
setmat!(set17, &[".*a"], "a", 0);
setmat!(set18, &["a", "β"], "β", 1);
setmat!(set19, &[r"\w+", r"\d+", r"\pL+", "foo", "bar", "barfoo", "foobar"],
        "foobar", 0, 2, 3, 4, 6);

setnomat!(nset1, &["a", "a"], "b");
setnomat!(nset2, &["^foo", "bar$"], "bar foo");
setnomat!(nset3, {
    let xs: &[&str] = &[];
    xs
}, "a");
setnomat!(nset4, &[r"^rooted$", r"\.log$"], "notrooted");

#[test]
fn set_len() {
    let set = RegexSet::new(&["a", "b", "c"]).unwrap();
    assert_eq!(3, set.len());
    assert_eq!(vec!["a", "b", "c"], set.patterns());
    let m = set.matches("zzz");
    assert_eq!(3, m.len());
    assert!(!m.matched(0));
}

#[test]
fn set_empty() {
    let set = RegexSet::empty();
    assert_eq!(0, set.len());
    assert!(set.is_empty());
    assert!(!set.is_match(""));
    assert!(!set.matches("").matched_any());
    assert!(RegexSet::default().is_empty());
}

#[test]
fn set_matches_iter_both_ways() {
    let set = regex_set!(&["a", "b", "c", "d"]);
    let m = set.matches("db");
    let fwd: Vec<usize> = m.iter().collect();
    let rev: Vec<usize> = m.iter().rev().collect();
    assert_eq!(vec![1, 3], fwd);
    assert_eq!(vec![3, 1], rev);
    let borrowed: Vec<usize> = (&m).into_iter().collect();
    assert_eq!(fwd, borrowed);
}

#[test]
fn set_at_offset() {
    let set = regex_set!(&[r"^a", "b"]);
    assert!(!set.matches_at("ab", 1).matched(0));
    assert!(set.matches_at("ab", 1).matched(1));
    assert!(!set.is_match_at("ab", 2));
}

#[test]
fn set_builder() {
    let set = RegexSetBuilder::new(&["ABC", "x.y"])
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
        .unwrap();
    let got: Vec<usize> = set.matches("abc x\ny").into_iter().collect();
    assert_eq!(vec![0, 1], got);
}

#[test]
fn set_error() {
    assert!(regex_set_new!(&["a", r"\p{Bogus}"]).is_err());
}

#[test]
fn set_agrees_with_regex() {
    let patterns = [r"\bfoo\b", r"[0-9]{3}", r"(?i)BAR", r"^x", r"y$"];
    let set = RegexSet::new(patterns).unwrap();
    for hay in ["foo 123", "xbar", "food", "zzy", "12", "", "x y"] {
        let got: Vec<usize> = set.matches(hay).into_iter().collect();
        let expected: Vec<usize> = patterns
            .iter()
            .enumerate()
            .filter(|(_, p)| regex!(p).is_match(hay))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(expected, got, "haystack: {:?}", hay);
    }
}
