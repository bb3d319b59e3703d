use core::{fmt::Write, mem::size_of};

use alloc::{boxed::Box, sync::Arc, vec, vec::Vec};

use std::collections::HashMap;

use utf8_ranges::Utf8Sequences;

use crate::{
    error::Error,
    hir::{self, Hir, HirKind},
    int::{Usize, U32},
};

pub(crate) type StateID = u32;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Config {
    /// Upper bound, in bytes, on the heap used by the compiled program.
    pub(crate) size_limit: Option<usize>,
    /// When false, groups compile to their body alone and the NFA has no
    /// groups, not even group 0.
    pub(crate) captures: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config { size_limit: Some(10 * (1 << 20)), captures: true }
    }
}

/// A Thompson NFA over bytes.
///
/// Several patterns may share one NFA. Each gets its own `Match` state and
/// the start state branches to them in pattern order.
#[derive(Clone)]
pub(crate) struct NFA {
    states: Vec<State>,
    start: StateID,
    patterns_len: usize,
    anchored: bool,
    fixed_groups_len: Option<usize>,
    group_by_name: HashMap<Arc<str>, u32>,
    /// Indexed by group. Group 0 is always unnamed.
    group_names: Vec<Option<Arc<str>>>,
    /// Heap owned by states and names, on top of the fixed size of each
    /// state.
    heap: usize,
}

impl NFA {
    /// Builds the NFA for one pattern. `names[i]` names group `i + 1`.
    pub(crate) fn new(
        config: Config,
        hir: &Hir,
        names: &[Option<Box<str>>],
    ) -> Result<NFA, Error> {
        let nfa =
            Compiler::new(config).build(core::slice::from_ref(hir), names)?;
        debug!(
            "compiled NFA with {} states using {} bytes of heap",
            nfa.len(),
            nfa.memory_usage(),
        );
        Ok(nfa)
    }

    /// Builds one NFA for all of `hirs`. Groups are never compiled.
    pub(crate) fn new_many(config: Config, hirs: &[Hir]) -> Result<NFA, Error> {
        let config = Config { captures: false, ..config };
        let nfa = Compiler::new(config).build(hirs, &[])?;
        debug!(
            "compiled NFA for {} patterns with {} states using {} bytes of heap",
            nfa.patterns_len(),
            nfa.len(),
            nfa.memory_usage(),
        );
        Ok(nfa)
    }

    /// Panics when `id` was not produced by this NFA.
    pub(crate) fn state(&self, id: StateID) -> &State {
        &self.states[id.as_usize()]
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }

    pub(crate) fn start(&self) -> StateID {
        self.start
    }

    pub(crate) fn patterns_len(&self) -> usize {
        self.patterns_len
    }

    /// Looks up a group by name.
    pub(crate) fn group_index(&self, name: &str) -> Option<usize> {
        self.group_by_name.get(name).map(|&i| i.as_usize())
    }

    /// Yields the name, if any, of each group in index order, starting with
    /// group 0.
    pub(crate) fn group_names(&self) -> GroupNames<'_> {
        GroupNames(self.group_names.iter())
    }

    /// Counts groups, group 0 included. Zero when captures are disabled.
    pub(crate) fn group_len(&self) -> usize {
        self.group_names.len()
    }

    /// True when every pattern begins with `\A`.
    pub(crate) fn is_start_anchored(&self) -> bool {
        self.anchored
    }

    /// The number of explicit groups taking part in every match, when that
    /// number never varies.
    pub(crate) fn fixed_groups_len(&self) -> Option<usize> {
        self.fixed_groups_len
    }

    pub(crate) fn memory_usage(&self) -> usize {
        usage(&self.states, &self.group_names, self.heap)
    }
}

/// Heap accounting shared by the compiler and the finished NFA.
fn usage(states: &[State], names: &[Option<Arc<str>>], heap: usize) -> usize {
    let fixed = states.len() * size_of::<State>()
        + names.len() * size_of::<Option<Arc<str>>>();
    fixed.saturating_add(heap)
}

impl core::fmt::Debug for NFA {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "NFA(start={}, patterns={})", self.start, self.patterns_len)?;
        for (id, state) in self.states.iter().enumerate() {
            writeln!(f, "  {:>6}: {:?}", id, state)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub(crate) struct GroupNames<'a>(core::slice::Iter<'a, Option<Arc<str>>>);

impl<'a> Iterator for GroupNames<'a> {
    type Item = Option<&'a str>;

    fn next(&mut self) -> Option<Option<&'a str>> {
        self.0.next().map(Option::as_deref)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a> ExactSizeIterator for GroupNames<'a> {}

impl<'a> core::iter::FusedIterator for GroupNames<'a> {}

/// Consumes one byte in `start..=end` and moves to `next`.
#[derive(Clone, Copy, Eq, PartialEq)]
pub(crate) struct Transition {
    pub(crate) start: u8,
    pub(crate) end: u8,
    pub(crate) next: StateID,
}

impl Transition {
    pub(crate) fn matches(&self, byte: u8) -> bool {
        (self.start..=self.end).contains(&byte)
    }
}

impl core::fmt::Debug for Transition {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", Escaped(self.start))?;
        if self.end != self.start {
            write!(f, "-{}", Escaped(self.end))?;
        }
        write!(f, " => {}", self.next)
    }
}

#[derive(Clone, Eq, PartialEq)]
pub(crate) enum State {
    /// Consume one byte in `start..=end`.
    ByteRange { trans: Transition },
    /// Consume one byte matching one of several disjoint, sorted ranges.
    Sparse { transitions: Box<[Transition]> },
    /// An alternation of epsilon transitions, in priority order (or the
    /// reverse of it when `reverse` is set).
    Splits { targets: Vec<StateID>, reverse: bool },
    /// An epsilon transition, conditional on an assertion when `look` is
    /// set.
    Goto { target: StateID, look: Option<hir::Look> },
    /// An epsilon transition that records the current offset in `slot`.
    Capture { target: StateID, slot: u32 },
    /// A state with no transitions.
    Fail,
    /// A match of the pattern with the given ID.
    Match { pattern_id: u32 },
}

impl State {
    fn heap(&self) -> usize {
        match *self {
            State::Splits { ref targets, .. } => {
                targets.len() * size_of::<StateID>()
            }
            State::Sparse { ref transitions } => {
                transitions.len() * size_of::<Transition>()
            }
            _ => 0,
        }
    }

    /// The state reached by consuming `byte`, if any.
    pub(crate) fn next(&self, byte: u8) -> Option<StateID> {
        match *self {
            State::ByteRange { ref trans } if trans.matches(byte) => {
                Some(trans.next)
            }
            State::Sparse { ref transitions } => transitions
                .iter()
                .take_while(|t| t.start <= byte)
                .find(|t| byte <= t.end)
                .map(|t| t.next),
            _ => None,
        }
    }
}

impl core::fmt::Debug for State {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match *self {
            State::ByteRange { ref trans } => write!(f, "{:?}", trans),
            State::Sparse { ref transitions } => {
                f.debug_list().entries(transitions.iter()).finish()
            }
            State::Splits { ref targets, reverse } => {
                let order = if reverse { "lazy" } else { "greedy" };
                write!(f, "split/{} {:?}", order, targets)
            }
            State::Goto { target, look: None } => write!(f, "-> {}", target),
            State::Goto { target, look: Some(look) } => {
                write!(f, "{} -> {}", look.as_str(), target)
            }
            State::Capture { target, slot } => {
                write!(f, "slot {} -> {}", slot, target)
            }
            State::Fail => f.write_str("fail"),
            State::Match { pattern_id } => write!(f, "match {}", pattern_id),
        }
    }
}

struct Escaped(u8);

impl core::fmt::Display for Escaped {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::ascii::escape_default(self.0)
            .try_for_each(|b| f.write_char(char::from(b)))
    }
}

/// A piece of the NFA under construction. `exit` is the one state whose
/// outgoing edge is still unresolved.
#[derive(Clone, Copy, Debug)]
struct Frag {
    entry: StateID,
    exit: StateID,
}

/// Turns `Hir` values into an `NFA`.
///
/// States are pushed with placeholder targets and wired up afterwards with
/// `link`. The size limit is checked every time the program grows.
#[derive(Debug)]
struct Compiler {
    config: Config,
    states: Vec<State>,
    group_by_name: HashMap<Arc<str>, u32>,
    group_names: Vec<Option<Arc<str>>>,
    heap: usize,
}

impl Compiler {
    fn new(config: Config) -> Compiler {
        Compiler {
            config,
            states: vec![],
            group_by_name: HashMap::new(),
            group_names: vec![],
            heap: 0,
        }
    }

    fn build(
        mut self,
        hirs: &[Hir],
        names: &[Option<Box<str>>],
    ) -> Result<NFA, Error> {
        if self.config.captures {
            self.name_groups(names);
        }
        let mut starts = Vec::with_capacity(hirs.len());
        for (pid, hir) in hirs.iter().enumerate() {
            let body = if self.config.captures {
                self.group(0, hir)?
            } else {
                self.frag(hir)?
            };
            let done = self.push(State::Match { pattern_id: pid.as_u32() })?;
            self.link(body.exit, done)?;
            starts.push(body.entry);
        }
        let start = match *starts.as_slice() {
            [] => self.push(State::Fail)?,
            [only] => only,
            _ => self.push(State::Splits { targets: starts, reverse: false })?,
        };
        let fixed_groups_len = match *hirs {
            [ref hir] => hir.static_explicit_captures_len(),
            _ => None,
        };
        Ok(NFA {
            states: self.states,
            start,
            patterns_len: hirs.len(),
            anchored: !hirs.is_empty()
                && hirs.iter().all(Hir::is_start_anchored),
            fixed_groups_len,
            group_by_name: self.group_by_name,
            group_names: self.group_names,
            heap: self.heap,
        })
    }

    /// Every group parsed gets an index, including groups the translator
    /// dropped, like the one in `(a){0}`.
    fn name_groups(&mut self, names: &[Option<Box<str>>]) {
        self.group_names.push(None);
        for (i, name) in names.iter().enumerate() {
            let name = name.as_deref().map(Arc::<str>::from);
            if let Some(ref name) = name {
                self.group_by_name.insert(Arc::clone(name), (i + 1).as_u32());
                // Approximate: ignores the map's own overhead.
                self.heap += name.len() + size_of::<u32>();
            }
            self.group_names.push(name);
        }
    }

    fn frag(&mut self, hir: &Hir) -> Result<Frag, Error> {
        match *hir.kind() {
            HirKind::Empty => self.empty(),
            HirKind::Literal(hir::Literal(ref bytes)) => self.literal(bytes),
            HirKind::Class(hir::Class::Bytes(ref class)) => {
                self.byte_class(class)
            }
            HirKind::Class(hir::Class::Unicode(ref class)) => {
                self.unicode_class(class)
            }
            HirKind::Look(look) => {
                self.single(State::Goto { target: 0, look: Some(look) })
            }
            HirKind::Repetition(ref rep) => self.repetition(rep),
            HirKind::Capture(ref cap) if self.config.captures => {
                self.group(cap.index, &cap.sub)
            }
            HirKind::Capture(ref cap) => self.frag(&cap.sub),
            HirKind::Concat(ref subs) => self.concat(subs),
            HirKind::Alternation(ref subs) => self.alternation(subs),
        }
    }

    fn single(&mut self, state: State) -> Result<Frag, Error> {
        let id = self.push(state)?;
        Ok(Frag { entry: id, exit: id })
    }

    fn empty(&mut self) -> Result<Frag, Error> {
        self.single(State::Goto { target: 0, look: None })
    }

    /// Appends `next` to `prev`, or starts a new sequence with it.
    fn then(&mut self, prev: Option<Frag>, next: Frag) -> Result<Frag, Error> {
        match prev {
            None => Ok(next),
            Some(prev) => {
                self.link(prev.exit, next.entry)?;
                Ok(Frag { entry: prev.entry, exit: next.exit })
            }
        }
    }

    fn finish(&mut self, seq: Option<Frag>) -> Result<Frag, Error> {
        match seq {
            Some(frag) => Ok(frag),
            None => self.empty(),
        }
    }

    fn literal(&mut self, bytes: &[u8]) -> Result<Frag, Error> {
        let mut seq = None;
        for &b in bytes {
            let trans = Transition { start: b, end: b, next: 0 };
            let step = self.single(State::ByteRange { trans })?;
            seq = Some(self.then(seq, step)?);
        }
        self.finish(seq)
    }

    fn concat(&mut self, subs: &[Hir]) -> Result<Frag, Error> {
        let mut seq = None;
        for sub in subs {
            let step = self.frag(sub)?;
            seq = Some(self.then(seq, step)?);
        }
        self.finish(seq)
    }

    /// `hir` repeated exactly `n` times.
    fn exactly(&mut self, hir: &Hir, n: u32) -> Result<Frag, Error> {
        let mut seq = None;
        for _ in 0..n {
            let step = self.frag(hir)?;
            seq = Some(self.then(seq, step)?);
        }
        self.finish(seq)
    }

    /// Branches are tried in order. No branches means no match.
    fn alternation(&mut self, subs: &[Hir]) -> Result<Frag, Error> {
        match *subs {
            [] => self.single(State::Fail),
            [ref only] => self.frag(only),
            _ => {
                let fork = self.fork(true)?;
                let join = self.empty()?.exit;
                for sub in subs {
                    let branch = self.frag(sub)?;
                    self.link(fork, branch.entry)?;
                    self.link(branch.exit, join)?;
                }
                Ok(Frag { entry: fork, exit: join })
            }
        }
    }

    fn byte_class(&mut self, class: &hir::ClassBytes) -> Result<Frag, Error> {
        let mut transitions: Vec<Transition> = class
            .ranges()
            .iter()
            .map(|r| Transition { start: r.start(), end: r.end(), next: 0 })
            .collect();
        match transitions.len() {
            0 => self.single(State::Fail),
            1 => self.single(State::ByteRange { trans: transitions.remove(0) }),
            _ => self.single(State::Sparse {
                transitions: transitions.into_boxed_slice(),
            }),
        }
    }

    /// Compiles the UTF-8 encodings of a class into a trie of byte range
    /// states. All leaves lead to one shared exit.
    fn unicode_class(
        &mut self,
        class: &hir::ClassUnicode,
    ) -> Result<Frag, Error> {
        if class.ranges().is_empty() {
            return self.single(State::Fail);
        }
        if let Some(bytes) = class.to_byte_class() {
            return self.byte_class(&bytes);
        }
        let mut trie = Utf8Trie::new();
        for r in class.ranges() {
            for seq in Utf8Sequences::new(r.start(), r.end()) {
                trie.insert(seq.as_slice().iter().map(|r| (r.start, r.end)));
            }
        }
        let exit = self.empty()?.exit;
        let entry = self.trie_node(&trie, 0, exit)?;
        Ok(Frag { entry, exit })
    }

    /// Children are emitted before their parent, so every edge target
    /// exists when the parent state is built.
    fn trie_node(
        &mut self,
        trie: &Utf8Trie,
        node: usize,
        exit: StateID,
    ) -> Result<StateID, Error> {
        let mut transitions = Vec::with_capacity(trie.nodes[node].len());
        for &(start, end, child) in trie.nodes[node].iter() {
            let next = match child {
                None => exit,
                Some(child) => self.trie_node(trie, child, exit)?,
            };
            transitions.push(Transition { start, end, next });
        }
        if transitions.len() == 1 {
            self.push(State::ByteRange { trans: transitions[0] })
        } else {
            self.push(State::Sparse { transitions: transitions.into() })
        }
    }

    fn repetition(&mut self, rep: &hir::Repetition) -> Result<Frag, Error> {
        let (sub, greedy) = (&*rep.sub, rep.greedy);
        match (rep.min, rep.max) {
            (0, Some(1)) => self.optional(sub, greedy),
            (min, None) => self.at_least(sub, greedy, min),
            (min, Some(max)) if min == max => self.exactly(sub, min),
            (min, Some(max)) => self.bounded(sub, greedy, min, max),
        }
    }

    /// A split preferring its first target when `greedy`, its last
    /// otherwise.
    fn fork(&mut self, greedy: bool) -> Result<StateID, Error> {
        self.push(State::Splits { targets: vec![], reverse: !greedy })
    }

    fn optional(&mut self, hir: &Hir, greedy: bool) -> Result<Frag, Error> {
        let fork = self.fork(greedy)?;
        let body = self.frag(hir)?;
        let exit = self.empty()?.exit;
        self.link(fork, body.entry)?;
        self.link(fork, exit)?;
        self.link(body.exit, exit)?;
        Ok(Frag { entry: fork, exit })
    }

    fn at_least(
        &mut self,
        hir: &Hir,
        greedy: bool,
        min: u32,
    ) -> Result<Frag, Error> {
        if min == 0 && !hir.is_match_empty() {
            let fork = self.fork(greedy)?;
            let body = self.frag(hir)?;
            self.link(fork, body.entry)?;
            self.link(body.exit, fork)?;
            return Ok(Frag { entry: fork, exit: fork });
        }
        if min == 0 {
            // A loop straight back into a body that can match empty would
            // rank the empty iteration wrongly, so `x*` is built as `(x+)?`.
            let body = self.frag(hir)?;
            let again = self.fork(greedy)?;
            let skip = self.fork(greedy)?;
            let exit = self.empty()?.exit;
            self.link(body.exit, again)?;
            self.link(again, body.entry)?;
            self.link(again, exit)?;
            self.link(skip, body.entry)?;
            self.link(skip, exit)?;
            return Ok(Frag { entry: skip, exit });
        }
        let prefix =
            if min > 1 { Some(self.exactly(hir, min - 1)?) } else { None };
        let last = self.frag(hir)?;
        let again = self.fork(greedy)?;
        self.link(last.exit, again)?;
        self.link(again, last.entry)?;
        let looped = self.then(prefix, last)?;
        Ok(Frag { entry: looped.entry, exit: again })
    }

    /// `a{2,4}` becomes `aa(?:a(?:a)?)?`, with every optional copy leaving
    /// through the same exit.
    fn bounded(
        &mut self,
        hir: &Hir,
        greedy: bool,
        min: u32,
        max: u32,
    ) -> Result<Frag, Error> {
        let prefix = self.exactly(hir, min)?;
        let exit = self.empty()?.exit;
        let mut tail = prefix.exit;
        for _ in min..max {
            let fork = self.fork(greedy)?;
            let copy = self.frag(hir)?;
            self.link(tail, fork)?;
            self.link(fork, copy.entry)?;
            self.link(fork, exit)?;
            tail = copy.exit;
        }
        self.link(tail, exit)?;
        Ok(Frag { entry: prefix.entry, exit })
    }

    /// Wraps `hir` in the two slot-recording states of group `index`.
    fn group(&mut self, index: u32, hir: &Hir) -> Result<Frag, Error> {
        // Group indices stay far below u32::MAX / 2.
        let slot = index.saturating_mul(2);
        let open = self.push(State::Capture { target: 0, slot })?;
        let body = self.frag(hir)?;
        let close = self
            .push(State::Capture { target: 0, slot: slot.saturating_add(1) })?;
        self.link(open, body.entry)?;
        self.link(body.exit, close)?;
        Ok(Frag { entry: open, exit: close })
    }

    fn push(&mut self, state: State) -> Result<StateID, Error> {
        let id = StateID::try_from(self.states.len())
            .map_err(|_| self.too_large())?;
        self.heap += state.heap();
        self.states.push(state);
        self.check_size()?;
        Ok(id)
    }

    /// Points the unresolved edge of `from` at `to`. On a split this adds
    /// a branch, which is the only way linking can grow the program.
    fn link(&mut self, from: StateID, to: StateID) -> Result<(), Error> {
        match self.states[from.as_usize()] {
            State::ByteRange { ref mut trans } => trans.next = to,
            State::Sparse { ref mut transitions } => {
                transitions.iter_mut().for_each(|t| t.next = to);
            }
            State::Goto { ref mut target, .. }
            | State::Capture { ref mut target, .. } => *target = to,
            State::Splits { ref mut targets, .. } => {
                targets.push(to);
                self.heap += size_of::<StateID>();
                return self.check_size();
            }
            State::Fail | State::Match { .. } => {}
        }
        Ok(())
    }

    fn check_size(&self) -> Result<(), Error> {
        let used = usage(&self.states, &self.group_names, self.heap);
        match self.config.size_limit {
            Some(limit) if used > limit => Err(self.too_large()),
            _ => Ok(()),
        }
    }

    fn too_large(&self) -> Error {
        Error::ProgramTooLarge(self.config.size_limit.unwrap_or(usize::MAX))
    }
}

/// A prefix trie of UTF-8 byte range sequences.
///
/// Sequences for a class arrive sorted, and two sequences that share a node
/// always have either equal or disjoint ranges at that node. So a new
/// sequence can reuse an existing edge when its range is equal.
#[derive(Debug)]
struct Utf8Trie {
    /// Each node is a list of `(start, end, child)` edges. An edge without
    /// a child completes a sequence.
    nodes: Vec<Vec<(u8, u8, Option<usize>)>>,
}

impl Utf8Trie {
    fn new() -> Utf8Trie {
        Utf8Trie { nodes: vec![vec![]] }
    }

    fn insert<I>(&mut self, ranges: I)
    where
        I: ExactSizeIterator<Item = (u8, u8)>,
    {
        let len = ranges.len();
        let mut node = 0;
        for (i, (start, end)) in ranges.enumerate() {
            if i + 1 == len {
                self.nodes[node].push((start, end, None));
                break;
            }
            let existing = self.nodes[node].iter().find_map(|&(s, e, child)| {
                if (s, e) == (start, end) {
                    child
                } else {
                    None
                }
            });
            node = match existing {
                Some(child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(vec![]);
                    self.nodes[node].push((start, end, Some(child)));
                    child
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(pattern: &str) -> Result<NFA, Error> {
        let (hir, names) = hir::parse(&hir::Config::default(), pattern)?;
        NFA::new(Config::default(), &hir, &names)
    }

    #[test]
    fn group_names_include_dropped_groups() {
        let nfa = compile(r"(a)(?P<foo>b)((c){0})").unwrap();
        assert_eq!(5, nfa.group_len());
        assert_eq!(Some(2), nfa.group_index("foo"));
        assert_eq!(None, nfa.group_index("bar"));
        let names: Vec<Option<&str>> = nfa.group_names().collect();
        assert_eq!(vec![None, None, Some("foo"), None, None], names);
    }

    #[test]
    fn no_groups_without_captures() {
        let config = Config { captures: false, ..Config::default() };
        let (hir, names) = hir::parse(&hir::Config::default(), "(a)").unwrap();
        let nfa = NFA::new(config, &hir, &names).unwrap();
        assert_eq!(0, nfa.group_len());
        assert!(!nfa
            .states
            .iter()
            .any(|s| matches!(*s, State::Capture { .. })));
    }

    #[test]
    fn properties() {
        let nfa = compile("^a|^b").unwrap();
        assert!(nfa.is_start_anchored());
        let nfa = compile("a*").unwrap();
        assert!(!nfa.is_start_anchored());
        assert_eq!(Some(0), nfa.fixed_groups_len());
    }

    #[test]
    fn multi_pattern() {
        let hirs: Vec<Hir> = ["a", "b", "c"]
            .iter()
            .map(|p| hir::parse(&hir::Config::default(), p).unwrap().0)
            .collect();
        let nfa = NFA::new_many(Config::default(), &hirs).unwrap();
        assert_eq!(3, nfa.patterns_len());
        assert_eq!(0, nfa.group_len());
        match *nfa.state(nfa.start()) {
            State::Splits { ref targets, .. } => assert_eq!(3, targets.len()),
            ref state => panic!("{:?}", state),
        }
        let empty = NFA::new_many(Config::default(), &[]).unwrap();
        assert_eq!(State::Fail, *empty.state(empty.start()));
    }

    #[test]
    fn unicode_class_trie() {
        // Two scalar values sharing the lead byte 0xCE share one edge.
        let nfa = compile("[αγ]").unwrap();
        let consuming = nfa
            .states
            .iter()
            .filter(|s| {
                matches!(*s, State::ByteRange { .. } | State::Sparse { .. })
            })
            .count();
        assert_eq!(2, consuming);
    }

    #[test]
    fn state_next() {
        let state = State::Sparse {
            transitions: vec![
                Transition { start: b'a', end: b'c', next: 1 },
                Transition { start: b'x', end: b'x', next: 2 },
            ]
            .into_boxed_slice(),
        };
        assert_eq!(Some(1), state.next(b'b'));
        assert_eq!(Some(2), state.next(b'x'));
        assert_eq!(None, state.next(b'd'));
        assert_eq!(None, state.next(b'z'));
        assert_eq!(None, State::Fail.next(b'a'));
    }

    #[test]
    fn debug_output() {
        let nfa = compile("a").unwrap();
        let text = format!("{:?}", nfa);
        assert!(text.starts_with("NFA(start=0, patterns=1)"), "{}", text);
        assert!(text.contains("a => "), "{}", text);
        assert!(text.contains("match 0"), "{}", text);
    }

    #[test]
    fn size_limit() {
        assert_eq!(
            Err(Error::ProgramTooLarge(10 * (1 << 20))),
            compile(r"\w{1000}").map(|_| ()),
        );
        assert_eq!(
            Err(Error::ProgramTooLarge(10 * (1 << 20))),
            compile(r"((a{100}){100}){100}").map(|_| ()),
        );
        let config = Config { size_limit: Some(0), captures: true };
        let (hir, names) = hir::parse(&hir::Config::default(), "a").unwrap();
        assert!(NFA::new(config, &hir, &names).is_err());
    }
}
