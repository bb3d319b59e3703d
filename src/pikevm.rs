use alloc::{vec, vec::Vec};

use crate::{
    int::{NonMaxUsize, U32},
    nfa::{State, StateID, NFA},
    pool::CacheLease,
    utf8,
};

/// Simulates an NFA over a haystack, one byte at a time, with every thread
/// carrying its own capture offsets.
///
/// Work per byte is bounded by the number of NFA states, so a search takes
/// time linear in the haystack no matter the pattern.
#[derive(Clone, Debug)]
pub(crate) struct PikeVM {
    nfa: NFA,
}

/// How a single search should run.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Mode {
    /// Only report a match that starts exactly at the search's start
    /// offset.
    pub(crate) anchored: bool,
    /// Stop as soon as any match is found, rather than continuing to find
    /// the leftmost-first match.
    pub(crate) earliest: bool,
}

impl PikeVM {
    pub(crate) fn new(nfa: NFA) -> PikeVM {
        PikeVM { nfa }
    }

    pub(crate) fn nfa(&self) -> &NFA {
        &self.nfa
    }

    /// Successive non-overlapping matches, as `(start, end)` pairs.
    pub(crate) fn find_iter<'r, 'h>(
        &'r self,
        cache: CacheLease<'r>,
        haystack: &'h [u8],
    ) -> FindIter<'r, 'h> {
        FindIter {
            pikevm: self,
            cache,
            haystack,
            at: 0,
            slots: vec![None, None],
            last_end: None,
        }
    }

    /// Successive non-overlapping matches with every capture slot filled
    /// in.
    pub(crate) fn captures_iter<'r, 'h>(
        &'r self,
        cache: CacheLease<'r>,
        haystack: &'h [u8],
    ) -> CapturesIter<'r, 'h> {
        let len = self.nfa().group_len().saturating_mul(2);
        CapturesIter {
            it: FindIter {
                pikevm: self,
                cache,
                haystack,
                at: 0,
                slots: vec![None; len],
                last_end: None,
            },
        }
    }

    /// Runs a leftmost-first search and writes the winning thread's offsets
    /// into `slots`. Returns true on a match.
    ///
    /// `slots` may be shorter than the NFA's slot count (even empty), in
    /// which case only that prefix is tracked.
    ///
    /// A `start` past the end of the haystack or inside the encoding of a
    /// code point never matches. Look-around assertions still see the bytes
    /// before `start`.
    pub(crate) fn search(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        start: usize,
        mode: Mode,
        slots: &mut [Option<NonMaxUsize>],
    ) -> bool {
        cache.prepare(slots.len());
        if !utf8::is_boundary(haystack, start) {
            return false;
        }
        let Cache { ref mut stack, ref mut curr, ref mut next, .. } = *cache;
        let start_id = self.nfa().start();
        let anchored = mode.anchored || self.nfa().is_start_anchored();
        let mut matched = false;
        // Matches are delayed by one step: a match state reached by the
        // epsilon closure at `at` is only reported when `curr` is processed
        // at `at`. So the loop runs through `haystack.len()` inclusive.
        let mut at = start;
        loop {
            if curr.set.is_empty() {
                if matched {
                    break;
                }
                if anchored && at > start {
                    break;
                }
            }
            // Simulate an unanchored '(?s:.)*?' prefix by seeding the start
            // state at every code point boundary, until a match is found.
            let seed = !matched
                && (!anchored || at == start)
                && utf8::is_boundary(haystack, at);
            if seed {
                let slots = next.rows.blank_row();
                self.closure(stack, slots, curr, haystack, at, start_id);
            }
            if self.nexts(stack, curr, next, haystack, at, slots) {
                matched = true;
            }
            if (mode.earliest && matched) || at >= haystack.len() {
                break;
            }
            core::mem::swap(curr, next);
            next.set.clear();
            at += 1;
        }
        matched
    }

    /// Runs a search that reports every pattern with a match anywhere in
    /// the haystack (starting exactly at `start` when `anchored` is set),
    /// by setting `patset[pattern_id]`.
    ///
    /// Returns true if at least one pattern matched.
    pub(crate) fn which_patterns(
        &self,
        cache: &mut Cache,
        haystack: &[u8],
        start: usize,
        anchored: bool,
        patset: &mut [bool],
    ) -> bool {
        cache.prepare(0);
        if !utf8::is_boundary(haystack, start) {
            return false;
        }
        let Cache { ref mut stack, ref mut curr, ref mut next, .. } = *cache;
        let start_id = self.nfa().start();
        let mut remaining = patset.iter().filter(|&&m| !m).count();
        let mut at = start;
        loop {
            if curr.set.is_empty() && anchored && at > start {
                break;
            }
            if (!anchored || at == start) && utf8::is_boundary(haystack, at) {
                let slots = next.rows.blank_row();
                self.closure(stack, slots, curr, haystack, at, start_id);
            }
            let Threads { ref set, ref mut rows } = *curr;
            for sid in set.iter() {
                match *self.nfa.state(sid) {
                    State::Match { pattern_id } => {
                        let seen = &mut patset[pattern_id.as_usize()];
                        if !*seen {
                            *seen = true;
                            remaining -= 1;
                        }
                    }
                    _ => {
                        self.next(stack, rows, next, haystack, at, sid);
                    }
                }
            }
            if remaining == 0 || at >= haystack.len() {
                break;
            }
            core::mem::swap(curr, next);
            next.set.clear();
            at += 1;
        }
        patset.iter().any(|&m| m)
    }

    /// Steps every thread in `curr` over the byte at `at`, building `next`.
    ///
    /// Threads are visited in priority order. Reaching a match state copies
    /// its offsets to `slots` and drops the rest of `curr`, since those
    /// threads could only produce lower priority matches.
    fn nexts(
        &self,
        stack: &mut Vec<Frame>,
        curr: &mut Threads,
        next: &mut Threads,
        haystack: &[u8],
        at: usize,
        slots: &mut [Option<NonMaxUsize>],
    ) -> bool {
        let Threads { ref set, ref mut rows } = *curr;
        for sid in set.iter() {
            if let State::Match { .. } = *self.nfa.state(sid) {
                let row = rows.row(sid);
                let len = core::cmp::min(slots.len(), row.len());
                slots[..len].copy_from_slice(&row[..len]);
                return true;
            }
            self.next(stack, rows, next, haystack, at, sid);
        }
        false
    }

    /// If the byte at `at` has a transition out of `sid`, then add the
    /// state transitioned to, along with its epsilon closure, to `next`.
    fn next(
        &self,
        stack: &mut Vec<Frame>,
        curr_rows: &mut SlotRows,
        next: &mut Threads,
        haystack: &[u8],
        at: usize,
        sid: StateID,
    ) {
        let Some(&byte) = haystack.get(at) else { return };
        if let Some(target) = self.nfa.state(sid).next(byte) {
            let slots = curr_rows.row(sid);
            self.closure(stack, slots, next, haystack, at + 1, target);
        }
    }

    /// Adds `sid` and everything reachable from it without consuming input
    /// to `next`, in priority order. `scratch` holds the offsets of the
    /// thread arriving at `sid` and is left unchanged on return.
    ///
    /// Look-around transitions are only followed when they hold at `at`.
    fn closure(
        &self,
        stack: &mut Vec<Frame>,
        scratch: &mut [Option<NonMaxUsize>],
        next: &mut Threads,
        haystack: &[u8],
        at: usize,
        sid: StateID,
    ) {
        stack.push(Frame::Explore(sid));
        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Restore { slot, offset } => {
                    scratch[slot.as_usize()] = offset;
                }
                Frame::Explore(sid) => {
                    self.explore(
                        stack, scratch, next, haystack, at, sid,
                    );
                }
            }
        }
    }

    /// Follows the highest priority epsilon path out of `sid` in place and
    /// defers the others to `stack`.
    ///
    /// A `Capture` state records `at` in `scratch` and pushes a `Restore`
    /// frame, so the write is only visible to the states explored after it.
    fn explore(
        &self,
        stack: &mut Vec<Frame>,
        scratch: &mut [Option<NonMaxUsize>],
        next: &mut Threads,
        haystack: &[u8],
        at: usize,
        mut sid: StateID,
    ) {
        loop {
            if !next.set.insert(sid) {
                return;
            }
            match *self.nfa.state(sid) {
                State::Fail
                | State::Match { .. }
                | State::ByteRange { .. }
                | State::Sparse { .. } => {
                    next.rows.row(sid).copy_from_slice(scratch);
                    return;
                }
                State::Goto { target, look: None } => {
                    sid = target;
                }
                State::Goto { target, look: Some(look) } => {
                    if !look.is_match(haystack, at) {
                        return;
                    }
                    sid = target;
                }
                State::Splits { ref targets, reverse: false } => {
                    sid = match targets.first() {
                        None => return,
                        Some(&sid) => sid,
                    };
                    stack.extend(
                        targets[1..]
                            .iter()
                            .copied()
                            .rev()
                            .map(Frame::Explore),
                    );
                }
                State::Splits { ref targets, reverse: true } => {
                    sid = match targets.last() {
                        None => return,
                        Some(&sid) => sid,
                    };
                    stack.extend(
                        targets[..targets.len() - 1]
                            .iter()
                            .copied()
                            .map(Frame::Explore),
                    );
                }
                State::Capture { target, slot } => {
                    // Slots the caller didn't ask for are never tracked.
                    if slot.as_usize() < scratch.len() {
                        stack.push(Frame::Restore {
                            slot,
                            offset: scratch[slot.as_usize()],
                        });
                        scratch[slot.as_usize()] = NonMaxUsize::new(at);
                    }
                    sid = target;
                }
            }
        }
    }
}

/// Iterates over non-overlapping matches. `'r` borrows the PikeVM and `'h`
/// the haystack.
#[derive(Debug)]
pub(crate) struct FindIter<'r, 'h> {
    pikevm: &'r PikeVM,
    cache: CacheLease<'r>,
    haystack: &'h [u8],
    at: usize,
    slots: Vec<Option<NonMaxUsize>>,
    last_end: Option<usize>,
}

impl<'r, 'h> FindIter<'r, 'h> {
    fn search(&mut self) -> Option<(usize, usize)> {
        if self.at > self.haystack.len() {
            return None;
        }
        let found = self.pikevm.search(
            &mut self.cache,
            self.haystack,
            self.at,
            Mode::default(),
            &mut self.slots,
        );
        if !found {
            return None;
        }
        Some((self.slots[0]?.get(), self.slots[1]?.get()))
    }

    /// An empty match ending where the previous match ended is dropped, and
    /// the search moves forward by one code point.
    #[cold]
    #[inline(never)]
    fn skip_empty_overlap(
        &mut self,
        mut m: (usize, usize),
    ) -> Option<(usize, usize)> {
        debug_assert!(m.0 >= m.1);
        if Some(m.1) == self.last_end {
            let len = core::cmp::max(1, utf8::decode(&self.haystack[self.at..]).1);
            self.at = self.at.checked_add(len)?;
            m = self.search()?;
        }
        Some(m)
    }
}

impl<'r, 'h> Iterator for FindIter<'r, 'h> {
    type Item = (usize, usize);

    fn next(&mut self) -> Option<(usize, usize)> {
        let mut m = self.search()?;
        if m.0 >= m.1 {
            m = self.skip_empty_overlap(m)?;
        }
        self.at = m.1;
        self.last_end = Some(m.1);
        Some(m)
    }
}

impl<'r, 'h> core::iter::FusedIterator for FindIter<'r, 'h> {}

/// An iterator over all successive non-overlapping capture matches in a
/// particular haystack. Each item holds every slot of the match.
#[derive(Debug)]
pub(crate) struct CapturesIter<'r, 'h> {
    it: FindIter<'r, 'h>,
}

impl<'r, 'h> Iterator for CapturesIter<'r, 'h> {
    type Item = Vec<Option<NonMaxUsize>>;

    fn next(&mut self) -> Option<Vec<Option<NonMaxUsize>>> {
        self.it.next()?;
        Some(self.it.slots.clone())
    }
}

impl<'r, 'h> core::iter::FusedIterator for CapturesIter<'r, 'h> {}

/// Scratch space for one search at a time. Sized for the `PikeVM` that
/// created it and never shared with another.
#[derive(Clone, Debug)]
pub(crate) struct Cache {
    /// Pending work for `closure`.
    stack: Vec<Frame>,
    /// Threads at the current position.
    curr: Threads,
    /// Threads at the next position.
    next: Threads,
}

impl Cache {
    pub(crate) fn new(re: &PikeVM) -> Cache {
        Cache {
            stack: vec![],
            curr: Threads::new(re),
            next: Threads::new(re),
        }
    }

    /// Clears this cache and sets the number of slots the caller wants
    /// tracked in the coming search. Tracking fewer slots (e.g., none for
    /// `is_match`) means less copying while stepping.
    fn prepare(&mut self, slot_len: usize) {
        self.stack.clear();
        self.curr.prepare(slot_len);
        self.next.prepare(slot_len);
    }
}

/// The threads alive at one position: a set of NFA states plus one row of
/// capture offsets for each.
#[derive(Clone, Debug)]
struct Threads {
    /// Insertion order is thread priority.
    set: StateSet,
    rows: SlotRows,
}

impl Threads {
    fn new(re: &PikeVM) -> Threads {
        let mut active = Threads {
            set: StateSet::new(0),
            rows: SlotRows::new(),
        };
        active.set.resize(re.nfa().len());
        active.rows.reset(re);
        active
    }

    fn prepare(&mut self, slot_len: usize) {
        self.set.clear();
        self.rows.prepare(slot_len);
    }
}

/// Capture offsets for every NFA state, in one flat allocation. Row `i`
/// belongs to state `i`; a group's start and end are adjacent slots.
#[derive(Clone, Debug)]
struct SlotRows {
    table: Vec<Option<NonMaxUsize>>,
    /// Slots per row.
    stride: usize,
    /// Slots tracked in the current search, at most `stride`.
    tracked: usize,
}

impl SlotRows {
    fn new() -> SlotRows {
        SlotRows { table: vec![], tracked: 0, stride: 0 }
    }

    fn reset(&mut self, re: &PikeVM) {
        let nfa = re.nfa();
        self.stride = nfa.group_len().saturating_mul(2);
        self.tracked = self.stride;
        // One extra row stays absent. It seeds the epsilon closure of the
        // start state.
        let len = nfa
            .len()
            .saturating_add(1)
            .saturating_mul(self.stride);
        self.table.resize(len, None);
    }

    fn prepare(&mut self, slot_len: usize) {
        self.tracked =
            core::cmp::min(slot_len, self.stride);
    }

    fn row(&mut self, sid: StateID) -> &mut [Option<NonMaxUsize>] {
        let i = sid.as_usize() * self.stride;
        &mut self.table[i..i + self.tracked]
    }

    /// A row that is never written outside of `closure`, so it is always
    /// entirely absent when a thread is seeded.
    fn blank_row(&mut self) -> &mut [Option<NonMaxUsize>] {
        let i = self.table.len() - self.stride;
        &mut self.table[i..i + self.tracked]
    }
}

/// Deferred work in `closure`.
#[derive(Clone, Debug)]
enum Frame {
    Explore(StateID),
    /// Undo a `Capture` write.
    Restore { slot: u32, offset: Option<NonMaxUsize> },
}

/// A set of state IDs with constant time insert, lookup and clear that
/// remembers insertion order (Briggs and Torczon's sparse set).
#[derive(Clone)]
struct StateSet {
    len: usize,
    /// Members in insertion order. Only `dense[..len]` is meaningful.
    dense: Vec<StateID>,
    /// `id` is a member iff `sparse[id] < len && dense[sparse[id]] == id`.
    sparse: Vec<StateID>,
}

impl StateSet {
    fn new(capacity: usize) -> StateSet {
        let mut set = StateSet { len: 0, dense: vec![], sparse: vec![] };
        set.resize(capacity);
        set
    }

    /// Resizes this set to the given capacity and clears it. The NFA
    /// compiler guarantees state IDs fit in a `u32`.
    fn resize(&mut self, new_capacity: usize) {
        self.clear();
        self.dense.resize(new_capacity, 0);
        self.sparse.resize(new_capacity, 0);
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns false if `id` was already present.
    fn insert(&mut self, id: StateID) -> bool {
        if self.contains(id) {
            return false;
        }
        self.dense[self.len] = id;
        // `len` never exceeds the state count, which fits in a `StateID`.
        self.sparse[id.as_usize()] = self.len as StateID;
        self.len += 1;
        true
    }

    fn contains(&self, id: StateID) -> bool {
        let i = self.sparse[id.as_usize()].as_usize();
        i < self.len && self.dense[i] == id
    }

    fn clear(&mut self) {
        self.len = 0;
    }

    /// Members in insertion order.
    fn iter(&self) -> impl Iterator<Item = StateID> + '_ {
        self.dense[..self.len].iter().copied()
    }
}

impl core::fmt::Debug for StateSet {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{hir, nfa};

    fn vm(pattern: &str) -> PikeVM {
        let (hir, names) = hir::parse(&hir::Config::default(), pattern).unwrap();
        PikeVM::new(NFA::new(nfa::Config::default(), &hir, &names).unwrap())
    }

    fn find(vm: &PikeVM, haystack: &str, start: usize, mode: Mode) -> Option<(usize, usize)> {
        let mut cache = Cache::new(vm);
        let mut slots = vec![None, None];
        if !vm.search(&mut cache, haystack.as_bytes(), start, mode, &mut slots) {
            return None;
        }
        Some((slots[0]?.get(), slots[1]?.get()))
    }

    #[test]
    fn leftmost_first() {
        let re = vm("samwise|sam");
        assert_eq!(Some((0, 7)), find(&re, "samwise", 0, Mode::default()));
        let re = vm("sam|samwise");
        assert_eq!(Some((0, 3)), find(&re, "samwise", 0, Mode::default()));
        let re = vm("a+?");
        assert_eq!(Some((1, 2)), find(&re, "baaa", 0, Mode::default()));
        let re = vm("a+");
        assert_eq!(Some((1, 4)), find(&re, "baaa", 0, Mode::default()));
    }

    #[test]
    fn earliest_and_anchored() {
        let re = vm("a+");
        let earliest = Mode { earliest: true, ..Mode::default() };
        assert_eq!(Some((1, 2)), find(&re, "baaa", 0, earliest));
        let anchored = Mode { anchored: true, ..Mode::default() };
        assert_eq!(None, find(&re, "baaa", 0, anchored));
        assert_eq!(Some((1, 4)), find(&re, "baaa", 1, anchored));
    }

    #[test]
    fn start_offsets() {
        let re = vm(r"\bb");
        // The byte before the start offset is still visible.
        assert_eq!(None, find(&re, "ab", 1, Mode::default()));
        let re = vm("δ");
        assert_eq!(None, find(&re, "δ", 1, Mode::default()));
        assert_eq!(None, find(&re, "δ", 3, Mode::default()));
        let re = vm("");
        assert_eq!(Some((2, 2)), find(&re, "δ", 2, Mode::default()));
    }

    #[test]
    fn unicode_class_steps_bytes() {
        let re = vm(r"\p{Greek}+");
        assert_eq!(
            Some((7, 15)),
            find(&re, "Greek: αβγδ", 0, Mode::default())
        );
        // Empty matches only start at code point boundaries.
        let re = vm("x*");
        assert_eq!(Some((0, 0)), find(&re, "☃", 0, Mode::default()));
    }

    #[test]
    fn set_search() {
        let hirs: Vec<hir::Hir> = [r"\w+", r"\d+", r"^[a-z]+$", "xyz"]
            .iter()
            .map(|p| hir::parse(&hir::Config::default(), p).unwrap().0)
            .collect();
        let re = PikeVM::new(NFA::new_many(nfa::Config::default(), &hirs).unwrap());
        let mut cache = Cache::new(&re);
        let mut patset = vec![false; 4];
        assert!(re.which_patterns(
            &mut cache,
            b"foo 123",
            0,
            false,
            &mut patset
        ));
        assert_eq!(vec![true, true, false, false], patset);

        let mut patset = vec![false; 4];
        assert!(re.which_patterns(
            &mut cache, b"abc", 0, false, &mut patset
        ));
        assert_eq!(vec![true, false, true, false], patset);

        let mut patset = vec![false; 4];
        assert!(!re.which_patterns(
            &mut cache, b"!!", 0, false, &mut patset
        ));
    }

    #[test]
    fn captures_iter_slots() {
        let re = vm(r"(\w)(\d)?");
        let pool = crate::pool::CachePool::new({
            let re = re.clone();
            Box::new(move || Cache::new(&re))
        });
        let all: Vec<Vec<Option<usize>>> = re
            .captures_iter(pool.get(), b"a1 b")
            .map(|slots| slots.iter().map(|s| s.map(|o| o.get())).collect())
            .collect();
        assert_eq!(
            vec![
                vec![Some(0), Some(2), Some(0), Some(1), Some(1), Some(2)],
                vec![Some(3), Some(4), Some(3), Some(4), None, None],
            ],
            all
        );
    }
}
