/*!
A regular expression engine with guaranteed linear time searching.

Patterns are parsed into an [`ast::Ast`], translated into a normalized
[`hir::Hir`], compiled into a Thompson NFA over bytes and run with a PikeVM,
which tracks every possible match at once instead of backtracking. Searching
a haystack of length `n` with a program of size `m` therefore takes
`O(m * n)` time for every pattern. The price is that look-around and
backreferences are not supported.

# Example

```
use rregex::Regex;

let re = Regex::new(r"(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})").unwrap();
let caps = re.captures("released on 2012-03-14").unwrap();
assert_eq!("2012", &caps["y"]);
assert_eq!("03", &caps["m"]);
assert_eq!(20..22, caps.name("d").unwrap().range());
```

# Offsets

Haystacks are `&str` and every offset is a byte offset into their UTF-8
encoding. Matches always start and end on character boundaries:

```
use rregex::Regex;

let re = Regex::new(r"\p{Greek}+").unwrap();
let m = re.find("Greek: αβγδ").unwrap();
assert_eq!((7, 15, "αβγδ"), (m.start(), m.end(), m.as_str()));
```

# Syntax

```text
.             any character except new line (includes new line with s flag)
[xyz]         a character class matching either x, y or z
[^xyz]        any character except x, y and z
[a-z]         any character in the range a-z
[[:alpha:]]   an ASCII class
[x[^xyz]]     a nested class
[a-y&&xyz]    intersection (matches x or y)
[0-9&&[^4]]   subtraction using intersection and negation
[0-9--4]      direct subtraction
[a-g~~b-h]    symmetric difference (matches a and h)
\d \s \w      Perl classes, Unicode aware unless the u flag is off
\D \S \W      their negations
\pN \p{Greek} Unicode classes by general category, script or property
\p{gc=Lu}     a qualified Unicode class
\PN \P{Greek} negated Unicode classes

xy    concatenation
x|y   alternation, preferring x
x*    zero or more of x (greedy)
x+    one or more of x (greedy)
x?    zero or one of x (greedy)
x*?   zero or more of x (lazy)
x{n,m} x{n,} x{n}   counted repetition, with a trailing ? for lazy

(exp)          numbered capture group
(?P<name>exp)  named capture group, also written (?<name>exp)
(?:exp)        non-capturing group
(?flags)       set flags within the current group
(?flags:exp)   set flags for exp

i   case insensitive
m   multi-line: ^ and $ match at line boundaries
s   . matches \n
R   CRLF mode: \r\n is a line terminator
U   swap the meaning of x* and x*?
u   Unicode support (enabled by default)
x   ignore whitespace and allow # comments

^ $ \A \z      start and end of text (or line, with m)
\b \B          word boundary and its negation
\b{start} \<   start of a word
\b{end} \>     end of a word
\b{start-half} \b{end-half}   half word boundaries
```

# Crate features

* **logging** (enabled by default) - Emits `debug` messages through the
  [`log`](https://docs.rs/log) crate describing each compiled program, and
  `trace` messages for Unicode property resolution. Searching never logs.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

#[cfg(not(any(target_pointer_width = "32", target_pointer_width = "64")))]
compile_error!("not supported on non-{32,64}, please file an issue");

extern crate alloc;

pub use crate::{
    error::Error,
    hir::escape,
    regex::{
        CaptureLocations, CaptureMatches, CaptureNames, Captures, Match,
        Matches, NoExpand, Regex, RegexBuilder, Replacer, ReplacerRef, Split,
        SplitN, SubCaptureMatches,
    },
    regexset::{
        RegexSet, RegexSetBuilder, SetMatches, SetMatchesIntoIter,
        SetMatchesIter,
    },
};

#[macro_use]
mod macros;

pub mod ast;
mod error;
pub mod hir;
mod int;
mod interpolate;
mod nfa;
mod pikevm;
mod pool;
mod regex;
mod regexset;
mod unicode;
mod utf8;
