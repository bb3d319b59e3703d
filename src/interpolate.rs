/*!
Expansion of replacement templates.

A template is ordinary text in which `$` introduces a reference to a capture
group: `$N` and `${N}` by index, `$name` and `${name}` by name, and `$$` for a
literal `$`. An unbraced reference takes the longest run of `[_0-9A-Za-z]`
that follows the `$`, so `$1a` refers to the group named `1a`. A `$` that
doesn't start a valid reference is copied through unchanged.
*/

use alloc::string::String;

use memchr::memchr;

/// Expands `replacement` into `dst`.
///
/// `name_to_index` resolves a group name and `append` writes the text of the
/// group with the given index, if it participated in the match. Unknown
/// names expand to nothing.
pub(crate) fn string(
    mut replacement: &str,
    mut append: impl FnMut(usize, &mut String),
    name_to_index: impl Fn(&str) -> Option<usize>,
    dst: &mut String,
) {
    while !replacement.is_empty() {
        match memchr(b'$', replacement.as_bytes()) {
            None => break,
            Some(i) => {
                dst.push_str(&replacement[..i]);
                replacement = &replacement[i..];
            }
        }
        if replacement.as_bytes().get(1) == Some(&b'$') {
            dst.push('$');
            replacement = &replacement[2..];
            continue;
        }
        let Some(cap_ref) = find_cap_ref(replacement.as_bytes()) else {
            dst.push('$');
            replacement = &replacement[1..];
            continue;
        };
        replacement = &replacement[cap_ref.end..];
        match cap_ref.cap {
            Ref::Number(i) => append(i, dst),
            Ref::Named(name) => {
                if let Some(i) = name_to_index(name) {
                    append(i, dst);
                }
            }
        }
    }
    dst.push_str(replacement);
}

/// A reference found in a template, along with the offset just past it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct CaptureRef<'a> {
    cap: Ref<'a>,
    end: usize,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Ref<'a> {
    Named(&'a str),
    Number(usize),
}

/// Parses a reference at the start of `rep`, which must begin with `$`.
fn find_cap_ref(rep: &[u8]) -> Option<CaptureRef<'_>> {
    if rep.len() <= 1 || rep[0] != b'$' {
        return None;
    }
    if rep[1] == b'{' {
        return find_cap_ref_braced(rep, 2);
    }
    let mut cap_end = 1;
    while rep.get(cap_end).copied().map_or(false, is_valid_cap_letter) {
        cap_end += 1;
    }
    if cap_end == 1 {
        return None;
    }
    // Everything in 1..cap_end is ASCII.
    let cap = core::str::from_utf8(&rep[1..cap_end]).ok()?;
    Some(CaptureRef { cap: to_ref(cap), end: cap_end })
}

/// Parses `{name}` with `start` just past the `{`. Anything up to the
/// closing brace is accepted as a name, but a missing brace means this
/// isn't a reference at all.
fn find_cap_ref_braced(rep: &[u8], start: usize) -> Option<CaptureRef<'_>> {
    let close = start + memchr(b'}', &rep[start..])?;
    let cap = core::str::from_utf8(&rep[start..close]).ok()?;
    if cap.is_empty() {
        return None;
    }
    Some(CaptureRef { cap: to_ref(cap), end: close + 1 })
}

fn to_ref(cap: &str) -> Ref<'_> {
    match cap.parse::<usize>() {
        Ok(i) => Ref::Number(i),
        Err(_) => Ref::Named(cap),
    }
}

fn is_valid_cap_letter(b: u8) -> bool {
    matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'_')
}

#[cfg(test)]
mod tests {
    use alloc::{string::String, vec, vec::Vec};

    use super::{find_cap_ref, string, CaptureRef, Ref};

    macro_rules! find {
        ($name:ident, $text:expr) => {
            #[test]
            fn $name() {
                assert_eq!(None, find_cap_ref($text.as_bytes()));
            }
        };
        ($name:ident, $text:expr, $capref:expr) => {
            #[test]
            fn $name() {
                assert_eq!(Some($capref), find_cap_ref($text.as_bytes()));
            }
        };
    }

    macro_rules! c {
        ($name_or_number:expr, $pos:expr) => {
            CaptureRef { cap: $name_or_number.into(), end: $pos }
        };
    }

    impl<'a> From<&'a str> for Ref<'a> {
        fn from(x: &'a str) -> Ref<'a> {
            Ref::Named(x)
        }
    }

    impl From<usize> for Ref<'static> {
        fn from(x: usize) -> Ref<'static> {
            Ref::Number(x)
        }
    }

    find!(find_cap_ref1, "$foo", c!("foo", 4));
    find!(find_cap_ref2, "${foo}", c!("foo", 6));
    find!(find_cap_ref3, "$0", c!(0, 2));
    find!(find_cap_ref4, "$5", c!(5, 2));
    find!(find_cap_ref5, "$10", c!(10, 3));
    find!(find_cap_ref6, "$42a", c!("42a", 4));
    find!(find_cap_ref7, "${42}a", c!(42, 5));
    find!(find_cap_ref8, "${a-b}", c!("a-b", 6));
    find!(find_cap_ref9, "$x-y", c!("x", 2));
    find!(find_cap_ref10, "${☃}", c!("☃", 6));
    find!(find_cap_ref11, "$");
    find!(find_cap_ref12, "$-");
    find!(find_cap_ref13, "${");
    find!(find_cap_ref14, "${}");
    find!(find_cap_ref15, "${foo");
    find!(find_cap_ref16, "$☃");

    /// Expands against fixed groups: 0 = "whole", 1 = "one", 2 = absent,
    /// and the name "first" = group 1.
    fn expand(template: &str) -> String {
        let groups: Vec<Option<&str>> = vec![Some("whole"), Some("one"), None];
        let mut dst = String::new();
        string(
            template,
            |i, dst| {
                if let Some(Some(text)) = groups.get(i) {
                    dst.push_str(text);
                }
            },
            |name| if name == "first" { Some(1) } else { None },
            &mut dst,
        );
        dst
    }

    #[test]
    fn expansion() {
        assert_eq!("whole", expand("$0"));
        assert_eq!("[one]", expand("[$1]"));
        assert_eq!("[one]", expand("[${first}]"));
        assert_eq!("one-x", expand("$first-x"));
        assert_eq!("", expand("$firstx"));
        assert_eq!("[]", expand("[$2]"));
        assert_eq!("[]", expand("[$99]"));
        assert_eq!("$1", expand("$$1"));
        assert_eq!("cost: $", expand("cost: $"));
        assert_eq!("a ${ b", expand("a ${ b"));
        assert_eq!("no refs here", expand("no refs here"));
    }
}
