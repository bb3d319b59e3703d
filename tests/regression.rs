#[test]
fn invalid_regexes_no_crash() {
    assert!(regex_new!("(*)").is_err());
    assert!(regex_new!("(?:?)").is_err());
    assert!(regex_new!("(?)").is_err());
    assert!(regex_new!("*").is_err());
}

#[test]
fn many_repeat_no_stack_overflow() {
    let re = regex!("^.{1,2500}");
    let got: Vec<_> = re.find_iter("a").map(|m| (m.start(), m.end())).collect();
    assert_eq!(vec![(0, 1)], got);
}

#[test]
fn deeply_nested_repetition_compiles() {
    let re = regex!("((((((((((a*)*)*)*)*)*)*)*)*)*)*");
    assert_eq!(Some(0..3), re.find("aaa").map(|m| m.range()));
}

// Case folding of classes must keep them sorted.
mat!(unsorted_binary_search_1, r"(?i)[a_]+", "A_", Some((0, 2)));
mat!(unsorted_binary_search_2, r"(?i)[A_]+", "a_", Some((0, 2)));

// Negation happens after case folding.
mat!(negated_char_class_1, r"(?i)[^x]", "x", None);
mat!(negated_char_class_2, r"(?i)[^x]", "X", None);

mat!(ascii_word_underscore, r"[[:word:]]", "_", Some((0, 1)));

#[test]
fn captures_rep() {
    let re = regex!(r"([a-f]){2}(?P<foo>[x-z])");
    let caps = re.captures("abx").unwrap();
    assert_eq!("x", caps.name("foo").unwrap().as_str());
    assert_eq!("b", &caps[1]);
}

mat!(alt_in_alt1, r"ab?|$", "az", Some((0, 1)));
mat!(alt_in_alt2, r"^(.*?)(\n|\r\n?|$)", "ab\rcd", Some((0, 3)));

mat!(leftmost_first_prefix, r"z*azb", "azb", Some((0, 3)));

mat!(uni_case_lower_nocase_flag, r"(?i)\p{Ll}+", "ΛΘΓΔα", Some((0, 10)));

mat!(many_alternates, r"1|2|3|4|5|6|7|8|9|10|int", "int", Some((0, 3)));

mat!(anchored_prefix1, r"^a\S", "a ", None);
mat!(anchored_prefix2, r"^a\S", "foo boo a ", None);
mat!(anchored_prefix3, r"^-[a-z]", "r-f", None);

split!(
    split_on_word_boundary,
    r"\b",
    r"Should this (work?)",
    &["", "Should", " ", "this", " (", "work", "?)"]
);
matiter!(
    word_boundary_iter,
    r"\b",
    "a b c",
    (0, 0),
    (1, 1),
    (2, 2),
    (3, 3),
    (4, 4),
    (5, 5)
);

// An empty match where the previous match ended is skipped.
matiter!(empty_after_nonempty, r"a|", "ab", (0, 1), (2, 2));

// Empty alternation branches and empty groups.
mat!(empty_alt_before, r"|a", "a", Some((0, 0)));
mat!(empty_alt_after, r"a|", "a", Some((0, 1)));
mat!(empty_group, r"()", "a", Some((0, 0)), Some((0, 0)));
mat!(empty_named_group, r"(?P<x>)a", "a", Some((0, 1)), Some((0, 0)));

// A capture inside a repetition that can match empty still reports the
// last iteration.
mat!(capture_in_star, r"(a|b)*", "abab", Some((0, 4)), Some((3, 4)));
mat!(capture_skipped_star, r"(a)*", "b", Some((0, 0)), None);

// Large repetition counts of classes stay within the default size limit.
mat!(counted_class_large, r"[a-z]{100}", &"q".repeat(100), Some((0, 100)));

// Matching continues correctly across a code point that is not in any
// class.
mat!(skip_foreign_code_point, r"b", "☃b", Some((3, 4)));

#[test]
fn non_boundary_start_offsets() {
    let re = regex!(r"\w");
    for at in 1..3 {
        assert!(re.find_at("☃a", at).is_none(), "offset {}", at);
    }
    assert_eq!(Some(3..4), re.find_at("☃a", 3).map(|m| m.range()));
}

#[test]
fn same_regex_many_threads_distinct_results() {
    let re = regex!(r"\d+");
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let re = &re;
                s.spawn(move || {
                    let hay = format!("x{}y", i * 11);
                    re.find(&hay).map(|m| m.as_str().to_string())
                })
            })
            .collect();
        for (i, h) in handles.into_iter().enumerate() {
            assert_eq!(Some((i * 11).to_string()), h.join().unwrap());
        }
    });
}
