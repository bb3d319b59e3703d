// Compares the spans of the leftmost-first match's groups against the
// expected list. Groups past the end of the list are ignored. The overall
// span must also agree with `find` and `is_match`.
macro_rules! mat(
    ($name:ident, $re:expr, $text:expr, $($loc:tt)+) => (
        #[test]
        fn $name() {
            let (re, hay) = (regex!($re), $text);
            let want: Vec<Option<(usize, usize)>> = vec!($($loc)+);
            let spans: Vec<Option<(usize, usize)>> = re
                .captures(hay)
                .map(|caps| caps.iter().map(|g| g.map(|m| (m.start(), m.end()))).collect())
                .unwrap_or_else(|| vec![None]);
            let got = &spans[..spans.len().min(want.len())];
            assert_eq!(
                want, got,
                "groups of {:?} in {:?}", $re, hay,
            );
            let overall = re.find(hay).map(|m| (m.start(), m.end()));
            assert_eq!(want[0], overall, "find of {:?} in {:?}", $re, hay);
            assert_eq!(want[0].is_some(), re.is_match(hay));
        }
    );
);

// Compares every span yielded by `find_iter`, and checks that
// `captures_iter` walks the same matches.
macro_rules! matiter(
    ($name:ident, $re:expr, $text:expr) => (
        #[test]
        fn $name() {
            let (re, hay) = (regex!($re), $text);
            assert_eq!(None, re.find_iter(hay).next(), "{:?} in {:?}", $re, hay);
            assert!(re.captures_iter(hay).next().is_none());
        }
    );
    ($name:ident, $re:expr, $text:expr, $($loc:tt)+) => (
        #[test]
        fn $name() {
            let (re, hay) = (regex!($re), $text);
            let want: Vec<(usize, usize)> = vec!($($loc)+);
            let found: Vec<(usize, usize)> =
                re.find_iter(hay).map(|m| (m.start(), m.end())).collect();
            assert_eq!(want, found, "matches of {:?} in {:?}", $re, hay);
            let captured: Vec<(usize, usize)> = re
                .captures_iter(hay)
                .map(|caps| caps.get_match())
                .map(|m| (m.start(), m.end()))
                .collect();
            assert_eq!(want, captured, "captures of {:?} in {:?}", $re, hay);
        }
    );
);

// Asserts that no search API finds anything.
macro_rules! nomat(
    ($name:ident, $re:expr, $text:expr) => (
        #[test]
        fn $name() {
            let (re, hay) = (regex!($re), $text);
            assert!(!re.is_match(hay));
            assert_eq!(None, re.find(hay));
            assert_eq!(None, re.shortest_match(hay));
            assert!(re.captures(hay).is_none());
            assert_eq!(vec![hay], re.split(hay).collect::<Vec<_>>());
        }
    );
);

macro_rules! split(
    ($name:ident, $re:expr, $text:expr, $expected:expr) => (
        #[test]
        fn $name() {
            let pieces: Vec<&str> = regex!($re).split($text).collect();
            assert_eq!($expected, &pieces[..]);
        }
    );
);

macro_rules! splitn(
    ($name:ident, $re:expr, $text:expr, $limit:expr, $expected:expr) => (
        #[test]
        fn $name() {
            let pieces: Vec<&str> = regex!($re).splitn($text, $limit).collect();
            assert_eq!($expected, &pieces[..]);
            assert!(pieces.len() <= $limit);
        }
    );
);

// `$which` names the replacement method: `replace` or `replace_all`.
macro_rules! replace(
    ($name:ident, $which:ident, $re:expr,
     $search:expr, $replace:expr, $result:expr) => (
        #[test]
        fn $name() {
            let got = regex!($re).$which($search, $replace);
            assert_eq!($result, got);
        }
    );
);
