use rregex::{escape, Captures, Error, Regex, RegexBuilder};

#[test]
fn empty_regex_empty_match() {
    let re = regex!("");
    let ms: Vec<_> = re.find_iter("").map(|m| m.range()).collect();
    assert_eq!(vec![0..0], ms);
}

#[test]
fn empty_regex_nonempty_match() {
    let re = regex!("");
    let ms: Vec<_> = re.find_iter("abc").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 1..1, 2..2, 3..3], ms);
}

#[test]
fn one_zero_length_match() {
    let re = regex!(r"[0-9]*");
    let ms: Vec<_> = re.find_iter("a1b2").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 1..2, 3..4], ms);
}

#[test]
fn many_zero_length_match() {
    let re = regex!(r"[0-9]*");
    let ms: Vec<_> = re.find_iter("a1bbb2").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 1..2, 3..3, 4..4, 5..6], ms);
}

#[test]
fn many_sequential_zero_length_match() {
    let re = regex!(r"[0-9]?");
    let ms: Vec<_> = re.find_iter("a12b3c").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 1..2, 2..3, 4..5, 6..6], ms);
}

#[test]
fn find_iter_skips_empty_match_after_previous_match() {
    let re = regex!(r"a|");
    let ms: Vec<_> = re.find_iter("ab").map(|m| m.range()).collect();
    assert_eq!(vec![0..1, 2..2], ms);
    // A fresh search from the end of the first match still finds it.
    assert_eq!(Some(1..1), re.find_at("ab", 1).map(|m| m.range()));
    let ms: Vec<_> =
        re.captures_iter("ab").map(|c| c.get_match().range()).collect();
    assert_eq!(vec![0..1, 2..2], ms);
}

#[test]
fn empty_match_unicode_find_iter() {
    let re = regex!(r".*?");
    let ms: Vec<_> = re.find_iter("Ⅰ1Ⅱ2").map(|m| m.range()).collect();
    assert_eq!(vec![0..0, 3..3, 4..4, 7..7, 8..8], ms);
}

#[test]
fn empty_match_unicode_captures_iter() {
    let re = regex!(r".*?");
    let ms: Vec<_> = re
        .captures_iter("Ⅰ1Ⅱ2")
        .map(|c| c.get(0).unwrap().range())
        .collect();
    assert_eq!(vec![0..0, 3..3, 4..4, 7..7, 8..8], ms);
}

#[test]
fn find_scenario() {
    let re = regex!("a");
    let m = re.find("abcabcabc").unwrap();
    assert_eq!((0, 1, "a"), (m.start(), m.end(), m.as_str()));
    let all: Vec<_> = re.find_iter("abcabcabc").map(|m| m.range()).collect();
    assert_eq!(vec![0..1, 3..4, 6..7], all);
    assert!(re.find("def").is_none());
    assert!(!re.is_match("def"));
}

#[test]
fn captures_scenario() {
    let re = regex!(r"(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})");
    let caps = re.captures("2012-03-14").unwrap();
    let y = caps.name("y").unwrap();
    let m = caps.name("m").unwrap();
    let d = caps.name("d").unwrap();
    assert_eq!(("2012", 0..4), (y.as_str(), y.range()));
    assert_eq!(("03", 5..7), (m.as_str(), m.range()));
    assert_eq!(("14", 8..10), (d.as_str(), d.range()));
    assert_eq!(4, caps.len());
    assert_eq!("2012-03-14", &caps[0]);
}

#[test]
fn captures_len_and_names() {
    let re = regex!(r"(a)(?P<named>b)(?:c)(d)?");
    assert_eq!(4, re.captures_len());
    let names: Vec<_> = re.capture_names().collect();
    assert_eq!(vec![None, None, Some("named"), None], names);
    assert_eq!(4, re.capture_names().len());
    assert_eq!(None, re.static_captures_len());
    assert_eq!(Some(1), regex!("abc").static_captures_len());
}

#[test]
fn captures_iter_all() {
    let re = regex!(r"(\w+)=(\d+)?");
    let got: Vec<(String, Option<String>)> = re
        .captures_iter("a=1 b= c=33")
        .map(|c| {
            (c[1].to_string(), c.get(2).map(|m| m.as_str().to_string()))
        })
        .collect();
    assert_eq!(
        vec![
            ("a".to_string(), Some("1".to_string())),
            ("b".to_string(), None),
            ("c".to_string(), Some("33".to_string())),
        ],
        got
    );
}

#[test]
fn capture_completeness() {
    let re = regex!(r"(a)|(b)|(c)");
    let caps = re.captures("b").unwrap();
    assert_eq!(4, caps.len());
    let present: Vec<bool> = caps.iter().map(|m| m.is_some()).collect();
    assert_eq!(vec![true, false, true, false], present);
}

#[test]
fn capture_misc() {
    let re = regex!(r"(.)(?P<a>a)?(.)(?P<b>.)");
    let cap = re.captures("abc").unwrap();

    assert_eq!(5, cap.len());

    assert_eq!((0, 3), {
        let m = cap.get(0).unwrap();
        (m.start(), m.end())
    });
    assert_eq!(None, cap.get(2));
    assert_eq!((2, 3), {
        let m = cap.get(4).unwrap();
        (m.start(), m.end())
    });

    assert_eq!("abc", cap.get(0).unwrap().as_str());
    assert_eq!(None, cap.get(2));
    assert_eq!("c", cap.get(4).unwrap().as_str());

    assert_eq!(None, cap.name("a"));
    assert_eq!("c", cap.name("b").unwrap().as_str());
}

#[test]
#[should_panic(expected = "no group named 'nope'")]
fn capture_index_panic_name() {
    let re = regex!(r"(?P<a>a)");
    let caps = re.captures("a").unwrap();
    let _ = &caps["nope"];
}

#[test]
#[should_panic(expected = "no group at index '2'")]
fn capture_index_panic_usize() {
    let re = regex!(r"(a)");
    let caps = re.captures("a").unwrap();
    let _ = &caps[2];
}

#[test]
fn expand() {
    let re = regex!(r"(?P<first>\w+)\s+(?P<second>\w+)");
    let caps = re.captures("hello world").unwrap();
    let mut dst = String::new();
    caps.expand("$second, $first! ${first}x $1x $$ $", &mut dst);
    assert_eq!("world, hello! hellox  $ $", dst);
}

#[test]
fn at_offsets() {
    let re = regex!(r"\d+");
    let hay = "ab12cd345";
    assert_eq!(Some(2..4), re.find_at(hay, 0).map(|m| m.range()));
    assert_eq!(Some(3..4), re.find_at(hay, 3).map(|m| m.range()));
    assert_eq!(Some(6..9), re.find_at(hay, 4).map(|m| m.range()));
    assert_eq!(None, re.find_at(hay, 9));
    assert_eq!(None, re.find_at(hay, 10));

    assert!(re.is_match_at(hay, 2));
    assert!(!re.is_match_at(hay, 1));
    assert!(!re.is_match_at(hay, 100));

    assert_eq!(Some(7), re.shortest_match_at(hay, 4));
    assert_eq!(None, re.shortest_match_at(hay, 100));

    let caps = re.captures_at(hay, 4).unwrap();
    assert_eq!("345", &caps[0]);
}

#[test]
fn at_offsets_respect_char_boundaries() {
    let re = regex!(r".");
    let hay = "☃x";
    assert_eq!(None, re.find_at(hay, 1));
    assert_eq!(None, re.find_at(hay, 2));
    assert_eq!(Some(3..4), re.find_at(hay, 3).map(|m| m.range()));
    assert!(!re.is_match_at(hay, 1));
    assert!(re.captures_at(hay, 2).is_none());
}

#[test]
fn at_offsets_see_context() {
    let re = regex!(r"^a");
    assert!(re.find_at("aa", 1).is_none());
    let re = regex!(r"\Bb");
    assert_eq!(Some(1..2), re.find_at("ab", 1).map(|m| m.range()));
}

#[test]
fn shortest_match() {
    let re = regex!(r"a+");
    assert_eq!(Some(1), re.shortest_match("aaaaa"));
    assert_eq!(Some(3), re.shortest_match("xxaaa"));
    assert_eq!(None, re.shortest_match("xyz"));
    let re = regex!(r"abc|a");
    assert_eq!(Some(1), re.shortest_match("abc"));
}

#[test]
fn captures_read() {
    let re = regex!(r"(\d+)-(\d+)?");
    let mut locs = re.capture_locations();
    assert_eq!(3, locs.len());
    let m = re.captures_read(&mut locs, "x 12-").unwrap();
    assert_eq!(2..5, m.range());
    assert_eq!(Some((2, 4)), locs.get(1));
    assert_eq!(None, locs.get(2));
    let m = re.captures_read_at(&mut locs, "1-2 33-44", 1).unwrap();
    assert_eq!(4..9, m.range());
    assert_eq!(Some((7, 9)), locs.get(2));
}

#[test]
fn split_scenarios() {
    let re = regex!(",");
    let got: Vec<&str> = re.splitn("a,b,c", 2).collect();
    assert_eq!(vec!["a", "b,c"], got);
    assert_eq!(0, re.splitn("a,b,c", 0).count());
    let got: Vec<&str> = re.split("a,b,c").collect();
    assert_eq!(vec!["a", "b", "c"], got);
}

#[test]
fn as_str_and_display() {
    let pattern = r"(?i)\b\w+\b";
    let re = regex!(pattern);
    assert_eq!(pattern, re.as_str());
    assert_eq!(pattern, re.to_string());
    let parsed: Regex = pattern.parse().unwrap();
    assert_eq!(pattern, parsed.as_str());
    assert!(Regex::try_from(String::from("a")).is_ok());
}

#[test]
fn escape_roundtrip() {
    let text = r"1+1=2? (yes) [a-z] {3} ^$ .* |&~# \";
    let re = regex!(&escape(text));
    let m = re.find(text).unwrap();
    assert_eq!(0..text.len(), m.range());
}

#[test]
fn builder() {
    let re = RegexBuilder::new(r"HELLO\s+WORLD")
        .case_insensitive(true)
        .build()
        .unwrap();
    assert!(re.is_match("hello   world"));

    let err = RegexBuilder::new(r"a{1000}{1000}").build().unwrap_err();
    assert!(matches!(err, Error::ProgramTooLarge(_)), "{:?}", err);

    let re = RegexBuilder::new(r"a{1000}{1000}")
        .size_limit(1 << 30)
        .build();
    assert!(re.is_ok());
}

#[test]
fn threads_share_regex() {
    let re = std::sync::Arc::new(regex!(r"(\w+)@(\w+)\.com"));
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let re = std::sync::Arc::clone(&re);
            std::thread::spawn(move || {
                let hay = format!("user{}@host{}.com", i, i);
                let caps = re.captures(&hay).unwrap();
                (caps[1].to_string(), caps[2].to_string())
            })
        })
        .collect();
    for (i, h) in handles.into_iter().enumerate() {
        let (user, host) = h.join().unwrap();
        assert_eq!(format!("user{}", i), user);
        assert_eq!(format!("host{}", i), host);
    }
}

#[test]
fn closure_replacer_sees_captures() {
    let re = regex!(r"(?P<n>\d+)");
    let out = re.replace_all("1 2 3", |caps: &Captures| {
        format!("[{}]", caps["n"].parse::<u32>().unwrap() + 1)
    });
    assert_eq!("[2] [3] [4]", out);
}
