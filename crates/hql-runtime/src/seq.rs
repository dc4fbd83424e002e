//! Seq protocol core: `Cons`, `LazySeq`, `ArraySeq`, the `EMPTY`
//! singleton, and the coercion entry points.
//!
//! A seq is a logical list. `LazySeq` defers realization behind a thunk
//! and memoizes the result; realization is trampolined so a thunk that
//! returns another lazy seq (to arbitrary depth) never grows the stack.

use std::cell::RefCell;
use std::mem;
use std::rc::Rc;

use bitflags::bitflags;

use crate::chunk::ChunkedCons;
use crate::error::{RunResult, RuntimeError};
use crate::value::Value;

bitflags! {
    /// Capability tags for seq sources.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct SeqFlags: u8 {
        const SEQ     = 1 << 0;
        const COUNTED = 1 << 1;
        const INDEXED = 1 << 2;
        const CHUNKED = 1 << 3;
    }
}

/// An immutable pair: the canonical non-empty seq cell.
#[derive(Debug)]
pub struct Cons {
    pub first: Value,
    pub rest: Seq,
}

/// An indexed, counted seq over a shared vector with an offset.
///
/// `rest()` is O(1): it produces a new `ArraySeq` at `offset + 1`.
#[derive(Debug)]
pub struct ArraySeq {
    pub array: Rc<Vec<Value>>,
    pub offset: usize,
}

impl ArraySeq {
    /// A seq over `array` from `offset`, or `None` when out of elements.
    #[must_use]
    pub fn new(array: Rc<Vec<Value>>, offset: usize) -> Option<Seq> {
        if offset < array.len() {
            Some(Seq::Array(Rc::new(ArraySeq { array, offset })))
        } else {
            None
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.array.len() - self.offset
    }

    #[must_use]
    pub fn nth(&self, i: usize) -> Option<&Value> {
        self.array.get(self.offset + i)
    }
}

type Thunk = Box<dyn FnOnce() -> RunResult<Option<Seq>>>;

enum LazyState {
    Pending(Thunk),
    /// The thunk is running; observing this state means the seq forced
    /// itself during its own realization.
    Forcing,
    Realized(Option<Seq>),
}

/// A memoized, single-shot lazy seq.
pub struct LazySeq {
    state: RefCell<LazyState>,
}

impl LazySeq {
    #[must_use]
    pub fn new(thunk: impl FnOnce() -> RunResult<Option<Seq>> + 'static) -> Rc<Self> {
        Rc::new(LazySeq {
            state: RefCell::new(LazyState::Pending(Box::new(thunk))),
        })
    }

    /// Whether the thunk has fired.
    #[must_use]
    pub fn is_realized(&self) -> bool {
        matches!(&*self.state.borrow(), LazyState::Realized(_))
    }
}

impl std::fmt::Debug for LazySeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.borrow() {
            LazyState::Pending(_) => "pending",
            LazyState::Forcing => "forcing",
            LazyState::Realized(_) => "realized",
        };
        write!(f, "LazySeq({state})")
    }
}

/// Realize a lazy seq to a non-lazy seq (or `None` for empty).
///
/// The trampoline: thunks that return further lazy seqs are resolved in
/// one loop, and every lazy seq along the chain is memoized with the
/// final result, so nesting depth costs neither stack nor repeat work.
pub fn force_lazy(root: &Rc<LazySeq>) -> RunResult<Option<Seq>> {
    if let LazyState::Realized(result) = &*root.state.borrow() {
        return Ok(result.clone());
    }

    let mut chain: Vec<Rc<LazySeq>> = Vec::new();
    let mut current = Rc::clone(root);
    let final_result = loop {
        if chain.len() > hql_common::limits::MAX_LAZY_TRAMPOLINE {
            for lazy in &chain {
                *lazy.state.borrow_mut() = LazyState::Realized(None);
            }
            return Err(RuntimeError::type_error(
                "lazy seq nesting exceeded the trampoline bound",
            ));
        }
        let state = mem::replace(&mut *current.state.borrow_mut(), LazyState::Forcing);
        let thunk = match state {
            LazyState::Pending(thunk) => thunk,
            LazyState::Forcing => {
                // Leave the chain consistent before reporting.
                for lazy in &chain {
                    *lazy.state.borrow_mut() = LazyState::Realized(None);
                }
                return Err(RuntimeError::ReentrantRealization);
            }
            LazyState::Realized(result) => {
                *current.state.borrow_mut() = LazyState::Realized(result.clone());
                break result;
            }
        };
        match thunk() {
            Ok(Some(Seq::Lazy(inner))) => {
                chain.push(current);
                current = inner;
            }
            Ok(result) => {
                // Normalize degenerate "empty but Some" results so that
                // `None` is the single representation of emptiness.
                let result = match result {
                    Some(Seq::Empty) => None,
                    Some(Seq::Array(array)) if array.offset >= array.array.len() => None,
                    other => other,
                };
                *current.state.borrow_mut() = LazyState::Realized(result.clone());
                break result;
            }
            Err(err) => {
                *current.state.borrow_mut() = LazyState::Realized(None);
                for lazy in &chain {
                    *lazy.state.borrow_mut() = LazyState::Realized(None);
                }
                return Err(err);
            }
        }
    };

    for lazy in &chain {
        *lazy.state.borrow_mut() = LazyState::Realized(final_result.clone());
    }
    Ok(final_result)
}

/// A logical sequence: one of the five seq representations.
#[derive(Debug, Clone)]
pub enum Seq {
    /// The singleton empty seq. `rest()` returns itself, `seq()` is null.
    Empty,
    Cons(Rc<Cons>),
    Lazy(Rc<LazySeq>),
    Array(Rc<ArraySeq>),
    Chunked(Rc<ChunkedCons>),
}

impl Seq {
    #[must_use]
    pub fn cons(first: Value, rest: Seq) -> Seq {
        Seq::Cons(Rc::new(Cons { first, rest }))
    }

    #[must_use]
    pub fn lazy(thunk: impl FnOnce() -> RunResult<Option<Seq>> + 'static) -> Seq {
        Seq::Lazy(LazySeq::new(thunk))
    }

    /// Capability flags of this representation.
    #[must_use]
    pub fn flags(&self) -> SeqFlags {
        match self {
            Seq::Empty => SeqFlags::SEQ | SeqFlags::COUNTED,
            Seq::Cons(_) | Seq::Lazy(_) => SeqFlags::SEQ,
            Seq::Array(_) => SeqFlags::SEQ | SeqFlags::COUNTED | SeqFlags::INDEXED,
            Seq::Chunked(_) => SeqFlags::SEQ | SeqFlags::CHUNKED,
        }
    }

    /// Resolve to a non-lazy seq; `None` means empty (nil punning).
    pub fn seq(&self) -> RunResult<Option<Seq>> {
        match self {
            Seq::Empty => Ok(None),
            Seq::Lazy(lazy) => force_lazy(lazy),
            Seq::Array(array) => {
                if array.offset < array.array.len() {
                    Ok(Some(self.clone()))
                } else {
                    Ok(None)
                }
            }
            Seq::Cons(_) | Seq::Chunked(_) => Ok(Some(self.clone())),
        }
    }

    /// The first element, or `Undefined` when empty.
    pub fn first(&self) -> RunResult<Value> {
        match self.seq()? {
            None => Ok(Value::Undefined),
            Some(Seq::Cons(cons)) => Ok(cons.first.clone()),
            Some(Seq::Array(array)) => Ok(array.nth(0).cloned().unwrap_or(Value::Undefined)),
            Some(Seq::Chunked(chunked)) => Ok(chunked.first()),
            Some(Seq::Empty) | Some(Seq::Lazy(_)) => Ok(Value::Undefined),
        }
    }

    /// The rest of the seq; never null, `EMPTY` at the end.
    pub fn rest(&self) -> RunResult<Seq> {
        match self.seq()? {
            None => Ok(Seq::Empty),
            Some(Seq::Cons(cons)) => Ok(cons.rest.clone()),
            Some(Seq::Array(array)) => {
                Ok(ArraySeq::new(Rc::clone(&array.array), array.offset + 1)
                    .unwrap_or(Seq::Empty))
            }
            Some(Seq::Chunked(chunked)) => Ok(chunked.rest()),
            Some(Seq::Empty) | Some(Seq::Lazy(_)) => Ok(Seq::Empty),
        }
    }

    /// The rest as `Some(seq)`, or `None` when the rest is empty.
    pub fn next(&self) -> RunResult<Option<Seq>> {
        self.rest()?.seq()
    }

    /// Whether this seq has no elements. Forces lazy heads.
    pub fn is_empty(&self) -> RunResult<bool> {
        Ok(self.seq()?.is_none())
    }

    /// Count the elements. O(1) for counted representations.
    pub fn count(&self) -> RunResult<usize> {
        match self {
            Seq::Empty => Ok(0),
            Seq::Array(array) => Ok(array.count()),
            _ => {
                let mut n = 0usize;
                for item in self.iter() {
                    item?;
                    n += 1;
                }
                Ok(n)
            }
        }
    }

    /// Iterate elements, transparently forcing lazy tails.
    #[must_use]
    pub fn iter(&self) -> SeqIter {
        SeqIter {
            current: self.clone(),
        }
    }

    /// Identity for hashing: the address of the backing cell.
    #[must_use]
    pub fn identity(&self) -> usize {
        match self {
            Seq::Empty => 0,
            Seq::Cons(rc) => Rc::as_ptr(rc) as usize,
            Seq::Lazy(rc) => Rc::as_ptr(rc) as usize,
            Seq::Array(rc) => Rc::as_ptr(rc) as usize,
            Seq::Chunked(rc) => Rc::as_ptr(rc) as usize,
        }
    }

    /// Pointer identity.
    #[must_use]
    pub fn ptr_eq(&self, other: &Seq) -> bool {
        match (self, other) {
            (Seq::Empty, Seq::Empty) => true,
            _ => self.identity() == other.identity() && self.identity() != 0,
        }
    }

    /// Collect into a vector, forcing everything.
    pub fn to_vec(&self) -> RunResult<Vec<Value>> {
        self.iter().collect()
    }
}

/// Iterator over a seq. Yields `RunResult<Value>` because realization of
/// lazy tails can fail.
pub struct SeqIter {
    current: Seq,
}

impl Iterator for SeqIter {
    type Item = RunResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.current.seq() {
            Err(err) => {
                self.current = Seq::Empty;
                Some(Err(err))
            }
            Ok(None) => None,
            Ok(Some(resolved)) => {
                let first = resolved.first();
                match resolved.rest() {
                    Ok(rest) => self.current = rest,
                    Err(err) => {
                        self.current = Seq::Empty;
                        return Some(Err(err));
                    }
                }
                Some(first)
            }
        }
    }
}

// =============================================================================
// Value-level protocol entry points
// =============================================================================

/// Coerce a value to a seq, or `None` when the source is empty.
///
/// Empty arrays, strings, sets, maps and null/undefined all collapse to
/// `None`; a one-element array of `undefined` does not.
pub fn to_seq(value: &Value) -> RunResult<Option<Seq>> {
    match value {
        Value::Null | Value::Undefined => Ok(None),
        Value::Seq(seq) => seq.seq(),
        Value::Vector(items) => Ok(ArraySeq::new(Rc::clone(items), 0)),
        Value::Str(s) => {
            let chars: Vec<Value> = s.chars().map(|c| Value::str(c.to_string())).collect();
            Ok(ArraySeq::new(Rc::new(chars), 0))
        }
        Value::Set(set) => {
            let items: Vec<Value> = set.iter().cloned().collect();
            Ok(ArraySeq::new(Rc::new(items), 0))
        }
        Value::Map(map) => {
            let entries: Vec<Value> = map
                .iter()
                .map(|(k, v)| Value::vector(vec![Value::Str(Rc::clone(k)), v.clone()]))
                .collect();
            Ok(ArraySeq::new(Rc::new(entries), 0))
        }
        other => Err(RuntimeError::type_error(format!(
            "{} is not seqable",
            other.type_name()
        ))),
    }
}

/// `first`: the first element, or `undefined`.
pub fn first(value: &Value) -> RunResult<Value> {
    match to_seq(value)? {
        None => Ok(Value::Undefined),
        Some(seq) => seq.first(),
    }
}

/// `rest`: always a seq, `EMPTY` at the end.
pub fn rest(value: &Value) -> RunResult<Value> {
    match to_seq(value)? {
        None => Ok(Value::Seq(Seq::Empty)),
        Some(seq) => Ok(Value::Seq(seq.rest()?)),
    }
}

/// `next`: like `rest` but `null` when the rest is empty.
pub fn next(value: &Value) -> RunResult<Value> {
    match to_seq(value)? {
        None => Ok(Value::Null),
        Some(seq) => Ok(match seq.next()? {
            None => Value::Null,
            Some(rest) => Value::Seq(rest),
        }),
    }
}

/// `seq`: `null` for empty sources, otherwise a seq value.
pub fn seq(value: &Value) -> RunResult<Value> {
    Ok(match to_seq(value)? {
        None => Value::Null,
        Some(seq) => Value::Seq(seq),
    })
}

/// `count`: O(1) for counted sources.
pub fn count(value: &Value) -> RunResult<usize> {
    match value {
        Value::Vector(items) => Ok(items.len()),
        Value::Str(s) => Ok(s.chars().count()),
        Value::Set(set) => Ok(set.len()),
        Value::Map(map) => Ok(map.len()),
        Value::Null | Value::Undefined => Ok(0),
        Value::Seq(seq) => seq.count(),
        other => Err(RuntimeError::type_error(format!(
            "cannot count {}",
            other.type_name()
        ))),
    }
}

/// `nth`: O(1) for indexed sources. Distinguishes an in-bounds value that
/// happens to be `undefined` from out-of-bounds: the latter throws unless
/// `not_found` is supplied. Negative indexes always need `not_found`.
pub fn nth(value: &Value, index: i64, not_found: Option<Value>) -> RunResult<Value> {
    let out_of_bounds = |count: Option<usize>| match not_found {
        Some(ref fallback) => Ok(fallback.clone()),
        None => Err(RuntimeError::IndexOutOfBounds { index, count }),
    };

    if index < 0 {
        return out_of_bounds(None);
    }
    let i = index as usize;

    match value {
        Value::Vector(items) => match items.get(i) {
            Some(item) => Ok(item.clone()),
            None => out_of_bounds(Some(items.len())),
        },
        Value::Seq(Seq::Array(array)) => match array.nth(i) {
            Some(item) => Ok(item.clone()),
            None => out_of_bounds(Some(array.count())),
        },
        Value::Str(s) => match s.chars().nth(i) {
            Some(c) => Ok(Value::str(c.to_string())),
            None => out_of_bounds(Some(s.chars().count())),
        },
        _ => {
            // Walk the prefix lazily; stop as soon as index is reached.
            match to_seq(value)? {
                None => out_of_bounds(Some(0)),
                Some(seq) => {
                    for (walked, item) in seq.iter().enumerate() {
                        let item = item?;
                        if walked == i {
                            return Ok(item);
                        }
                    }
                    out_of_bounds(None)
                }
            }
        }
    }
}

/// `realized`: true for non-lazy sources; for a lazy seq, true once its
/// thunk has fired.
#[must_use]
pub fn realized(value: &Value) -> bool {
    match value {
        Value::Seq(Seq::Lazy(lazy)) => lazy.is_realized(),
        _ => true,
    }
}
