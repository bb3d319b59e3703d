/*!
UTF-8 helpers for searching byte haystacks that are known to be valid UTF-8:
decoding a single scalar value at either end of a slice, and finding code
point boundaries.
*/

/// Returns true if and only if the given byte is an ASCII word character,
/// i.e., `[0-9A-Za-z_]`.
pub(crate) fn is_word_byte(b: u8) -> bool {
    const fn mkwordset() -> [bool; 256] {
        let mut set = [false; 256];
        set[b'_' as usize] = true;

        let mut byte = b'0';
        while byte <= b'9' {
            set[byte as usize] = true;
            byte += 1;
        }
        byte = b'A';
        while byte <= b'Z' {
            set[byte as usize] = true;
            byte += 1;
        }
        byte = b'a';
        while byte <= b'z' {
            set[byte as usize] = true;
            byte += 1;
        }
        set
    }
    const WORD: [bool; 256] = mkwordset();
    WORD[usize::from(b)]
}

/// Returns true when `at` falls on a code point boundary of `haystack`.
/// Both ends of the haystack are boundaries; offsets past the end are not.
pub(crate) fn is_boundary(haystack: &[u8], at: usize) -> bool {
    match haystack.get(at) {
        None => at == haystack.len(),
        // Continuation bytes are exactly 0b10xx_xxxx.
        Some(&b) => b & 0b1100_0000 != 0b1000_0000,
    }
}

/// The accept state index. When we enter this state, we know we've found a
/// valid Unicode scalar value.
const ACCEPT: usize = 12;
/// The reject state index. When we enter this state, we know that we've found
/// invalid UTF-8.
const REJECT: usize = 0;

/// UTF-8 decode a single Unicode scalar value from the beginning of a slice.
///
/// On success, returns the scalar value and its encoded length (1 to 4).
/// On failure, returns `None` with the length of the longest prefix that
/// could begin a valid encoding (never 0 unless `slice` is empty).
pub(crate) fn decode<B: AsRef<[u8]>>(slice: B) -> (Option<char>, usize) {
    let slice = slice.as_ref();
    match slice.first() {
        None => return (None, 0),
        Some(&b) if b <= 0x7F => return (Some(char::from(b)), 1),
        _ => {}
    }

    let (mut state, mut cp, mut i) = (ACCEPT, 0, 0);
    while i < slice.len() {
        decode_step(&mut state, &mut cp, slice[i]);
        i += 1;

        if state == ACCEPT {
            // `decode_step` only reaches ACCEPT with a valid scalar value,
            // so this conversion cannot fail.
            return (char::from_u32(cp), i);
        } else if state == REJECT {
            return (None, core::cmp::max(1, i.saturating_sub(1)));
        }
    }
    (None, i)
}

/// Like `decode`, but decodes the last scalar value of the slice.
pub(crate) fn decode_last<B: AsRef<[u8]>>(slice: B) -> (Option<char>, usize) {
    let slice = slice.as_ref();
    if slice.is_empty() {
        return (None, 0);
    }
    // A scalar value is at most 4 bytes, so look back no further than that
    // for the lead byte.
    let limit = slice.len().saturating_sub(4);
    let mut start = slice.len() - 1;
    while start > limit && !is_boundary(slice, start) {
        start -= 1;
    }
    match decode(&slice[start..]) {
        (Some(ch), size) if start + size == slice.len() => (Some(ch), size),
        _ => (None, 1),
    }
}

/// Transitions to the next state and updates `cp` while it does.
fn decode_step(state: &mut usize, cp: &mut u32, b: u8) {
    // Splits the space of all bytes into equivalence classes, such that
    // any byte in the same class can never discriminate between whether a
    // particular sequence is valid UTF-8 or not.
    #[rustfmt::skip]
    const CLASSES: [u8; 256] = [
       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
       0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,  0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,0,
       1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,1,  9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,9,
       7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,  7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,7,
       8,8,2,2,2,2,2,2,2,2,2,2,2,2,2,2,  2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,2,
      10,3,3,3,3,3,3,3,3,3,3,3,3,4,3,3, 11,6,6,6,5,8,8,8,8,8,8,8,8,8,8,8,
    ];

    // Bjoern Hoehrmann's UTF-8 decoding DFA, by way of `bstr`:
    // https://bjoern.hoehrmann.de/utf-8/decoder/dfa/
    #[rustfmt::skip]
    const STATES_FORWARD: &[u8] = &[
      0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
      12, 0, 24, 36, 60, 96, 84, 0, 0, 0, 48, 72,
      0, 12, 0, 0, 0, 0, 0, 12, 0, 12, 0, 0,
      0, 24, 0, 0, 0, 0, 0, 24, 0, 24, 0, 0,
      0, 0, 0, 0, 0, 0, 0, 24, 0, 0, 0, 0,
      0, 24, 0, 0, 0, 0, 0, 0, 0, 24, 0, 0,
      0, 0, 0, 0, 0, 0, 0, 36, 0, 36, 0, 0,
      0, 36, 0, 0, 0, 0, 0, 36, 0, 36, 0, 0,
      0, 36, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    ];

    let class = CLASSES[usize::from(b)];
    if *state == ACCEPT {
        *cp = (0xFF >> class) & u32::from(b);
    } else {
        *cp = (u32::from(b) & 0b111111) | (*cp << 6);
    }
    *state = usize::from(STATES_FORWARD[*state + usize::from(class)]);
}
