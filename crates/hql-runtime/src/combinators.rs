//! Lazy sequence combinators.
//!
//! Everything here is lazy unless the name implies realization (`reduce`,
//! `doall`, `into`). The laziness contract: for any pipeline ending in
//! `take(k)`, at most `k` source elements (plus constant overhead) are
//! realized.
//!
//! Chunk-aware variants of `map`, `filter` and `reduce` propagate chunk
//! structure when the input is chunked; non-chunked inputs take the plain
//! lazy-seq path.

use std::rc::Rc;

use indexmap::{IndexMap, IndexSet};

use crate::chunk::{ChunkBuffer, ChunkedCons};
use crate::error::{RunResult, RuntimeError};
use crate::seq::{Seq, to_seq};
use crate::value::Value;

fn source_seq(coll: &Value) -> RunResult<Seq> {
    Ok(to_seq(coll)?.unwrap_or(Seq::Empty))
}

fn whole_number(value: &Value, context: &str) -> RunResult<i64> {
    Ok(value.as_number(context)?.trunc() as i64)
}

/// `(cons x coll)` — prepend an element.
pub fn cons(x: Value, coll: &Value) -> RunResult<Value> {
    Ok(Value::Seq(Seq::cons(x, source_seq(coll)?)))
}

// =============================================================================
// range / iterate
// =============================================================================

/// Variadic `range`: `(range)`, `(range end)`, `(range start end)`,
/// `(range start end step)`. Infinite with no arguments; empty when the
/// step walks away from `end`.
pub fn range(args: &[Value]) -> RunResult<Value> {
    let (start, end, step) = match args {
        [] => (0.0, f64::INFINITY, 1.0),
        [end] => (0.0, end.as_number("range")?, 1.0),
        [start, end] => (start.as_number("range")?, end.as_number("range")?, 1.0),
        [start, end, step] => (
            start.as_number("range")?,
            end.as_number("range")?,
            step.as_number("range")?,
        ),
        _ => return Err(RuntimeError::arity("range", "0 to 3", args.len())),
    };
    if step == 0.0 {
        return Err(RuntimeError::type_error("range step must be non-zero"));
    }
    Ok(Value::Seq(range_seq(start, end, step)))
}

fn range_seq(current: f64, end: f64, step: f64) -> Seq {
    Seq::lazy(move || {
        let done = if step > 0.0 {
            current >= end
        } else {
            current <= end
        };
        if done {
            Ok(None)
        } else {
            Ok(Some(Seq::cons(
                Value::Number(current),
                range_seq(current + step, end, step),
            )))
        }
    })
}

/// `(iterate f x)` — the infinite seq `x, f(x), f(f(x)), ...`.
pub fn iterate(f: Value, x: Value) -> Value {
    Value::Seq(iterate_seq(f, x))
}

fn iterate_seq(f: Value, x: Value) -> Seq {
    Seq::lazy(move || {
        let next_x = f.call(std::slice::from_ref(&x))?;
        Ok(Some(Seq::cons(x, iterate_seq(f, next_x))))
    })
}

// =============================================================================
// take / drop family
// =============================================================================

/// `(take n coll)` — at most `n` elements, lazily.
pub fn take(n: &Value, coll: &Value) -> RunResult<Value> {
    let n = whole_number(n, "take")?.max(0) as usize;
    Ok(Value::Seq(take_seq(n, source_seq(coll)?)))
}

fn take_seq(n: usize, source: Seq) -> Seq {
    Seq::lazy(move || {
        if n == 0 {
            return Ok(None);
        }
        match source.seq()? {
            None => Ok(None),
            Some(resolved) => Ok(Some(Seq::cons(
                resolved.first()?,
                take_seq(n - 1, resolved.rest()?),
            ))),
        }
    })
}

/// `(drop n coll)` — everything past the first `n` elements, lazily.
pub fn drop(n: &Value, coll: &Value) -> RunResult<Value> {
    let n = whole_number(n, "drop")?.max(0) as usize;
    let source = source_seq(coll)?;
    Ok(Value::Seq(Seq::lazy(move || {
        let mut cursor = source.clone();
        for _ in 0..n {
            match cursor.seq()? {
                None => return Ok(None),
                Some(resolved) => cursor = resolved.rest()?,
            }
        }
        Ok(cursor.seq()?)
    })))
}

/// `(take-while pred coll)` — stops at the first falsy predicate result.
pub fn take_while(pred: &Value, coll: &Value) -> RunResult<Value> {
    Ok(Value::Seq(take_while_seq(pred.clone(), source_seq(coll)?)))
}

fn take_while_seq(pred: Value, source: Seq) -> Seq {
    Seq::lazy(move || match source.seq()? {
        None => Ok(None),
        Some(resolved) => {
            let head = resolved.first()?;
            if pred.call(std::slice::from_ref(&head))?.is_truthy() {
                Ok(Some(Seq::cons(
                    head,
                    take_while_seq(pred, resolved.rest()?),
                )))
            } else {
                Ok(None)
            }
        }
    })
}

/// `(drop-while pred coll)` — skips while the predicate holds.
pub fn drop_while(pred: &Value, coll: &Value) -> RunResult<Value> {
    let pred = pred.clone();
    let source = source_seq(coll)?;
    Ok(Value::Seq(Seq::lazy(move || {
        let mut cursor = source.clone();
        loop {
            match cursor.seq()? {
                None => return Ok(None),
                Some(resolved) => {
                    let head = resolved.first()?;
                    if pred.call(std::slice::from_ref(&head))?.is_truthy() {
                        cursor = resolved.rest()?;
                    } else {
                        return Ok(Some(resolved));
                    }
                }
            }
        }
    })))
}

// =============================================================================
// partition family
// =============================================================================

/// `(partition n step? coll)` — groups of exactly `n`; the incomplete
/// final group is dropped. `step` defaults to `n`.
pub fn partition(n: &Value, step: Option<&Value>, coll: &Value) -> RunResult<Value> {
    partition_impl(n, step, coll, false)
}

/// `(partition-all n step? coll)` — like `partition` but keeps the
/// trailing incomplete group.
pub fn partition_all(n: &Value, step: Option<&Value>, coll: &Value) -> RunResult<Value> {
    partition_impl(n, step, coll, true)
}

fn partition_impl(
    n: &Value,
    step: Option<&Value>,
    coll: &Value,
    keep_partial: bool,
) -> RunResult<Value> {
    let n = whole_number(n, "partition")?.max(1) as usize;
    let step = match step {
        Some(step) => whole_number(step, "partition")?.max(1) as usize,
        None => n,
    };
    Ok(Value::Seq(partition_seq(
        n,
        step,
        source_seq(coll)?,
        keep_partial,
    )))
}

fn partition_seq(n: usize, step: usize, source: Seq, keep_partial: bool) -> Seq {
    Seq::lazy(move || {
        let mut group = Vec::with_capacity(n);
        let mut cursor = source.clone();
        while group.len() < n {
            match cursor.seq()? {
                None => break,
                Some(resolved) => {
                    group.push(resolved.first()?);
                    cursor = resolved.rest()?;
                }
            }
        }
        if group.is_empty() || (group.len() < n && !keep_partial) {
            return Ok(None);
        }
        let mut advanced = source.clone();
        for _ in 0..step {
            match advanced.seq()? {
                None => {
                    advanced = Seq::Empty;
                    break;
                }
                Some(resolved) => advanced = resolved.rest()?,
            }
        }
        Ok(Some(Seq::cons(
            Value::vector(group),
            partition_seq(n, step, advanced, keep_partial),
        )))
    })
}

/// `(partition-by f coll)` — groups consecutive elements with equal
/// `f` results.
pub fn partition_by(f: &Value, coll: &Value) -> RunResult<Value> {
    Ok(Value::Seq(partition_by_seq(f.clone(), source_seq(coll)?)))
}

fn partition_by_seq(f: Value, source: Seq) -> Seq {
    Seq::lazy(move || match source.seq()? {
        None => Ok(None),
        Some(resolved) => {
            let head = resolved.first()?;
            let marker = f.call(std::slice::from_ref(&head))?;
            let mut group = vec![head];
            let mut cursor = resolved.rest()?;
            loop {
                match cursor.seq()? {
                    None => break,
                    Some(run) => {
                        let candidate = run.first()?;
                        if f.call(std::slice::from_ref(&candidate))? != marker {
                            break;
                        }
                        group.push(candidate);
                        cursor = run.rest()?;
                    }
                }
            }
            Ok(Some(Seq::cons(
                Value::vector(group),
                partition_by_seq(f, cursor),
            )))
        }
    })
}

// =============================================================================
// interleave / interpose
// =============================================================================

/// `(interleave coll...)` — round-robin across the inputs, stopping at
/// the shortest. A single input passes through; no inputs yield empty.
pub fn interleave(colls: &[Value]) -> RunResult<Value> {
    match colls {
        [] => Ok(Value::Seq(Seq::Empty)),
        [sole] => Ok(Value::Seq(source_seq(sole)?)),
        many => {
            let sources = many
                .iter()
                .map(source_seq)
                .collect::<RunResult<Vec<Seq>>>()?;
            Ok(Value::Seq(interleave_seq(sources)))
        }
    }
}

fn interleave_seq(sources: Vec<Seq>) -> Seq {
    Seq::lazy(move || {
        let mut firsts = Vec::with_capacity(sources.len());
        let mut rests = Vec::with_capacity(sources.len());
        for source in &sources {
            match source.seq()? {
                None => return Ok(None),
                Some(resolved) => {
                    firsts.push(resolved.first()?);
                    rests.push(resolved.rest()?);
                }
            }
        }
        let mut seq = interleave_seq(rests);
        for first in firsts.into_iter().rev() {
            seq = Seq::cons(first, seq);
        }
        Ok(Some(seq))
    })
}

/// `(interpose sep coll)` — `sep` between consecutive elements; empty and
/// singleton inputs pass through unchanged.
pub fn interpose(sep: &Value, coll: &Value) -> RunResult<Value> {
    let source = source_seq(coll)?;
    let sep = sep.clone();
    Ok(Value::Seq(Seq::lazy(move || match source.seq()? {
        None => Ok(None),
        Some(resolved) => Ok(Some(Seq::cons(
            resolved.first()?,
            interpose_tail(sep, resolved.rest()?),
        ))),
    })))
}

fn interpose_tail(sep: Value, source: Seq) -> Seq {
    Seq::lazy(move || match source.seq()? {
        None => Ok(None),
        Some(resolved) => Ok(Some(Seq::cons(
            sep.clone(),
            Seq::cons(resolved.first()?, interpose_tail(sep, resolved.rest()?)),
        ))),
    })
}

// =============================================================================
// reductions
// =============================================================================

/// `(reductions f init? coll)` — the lazy seq of prefix reductions, in
/// source order. With `init`, yields `init, f(init, x0), ...`; without,
/// seeds from the first element (empty input yields empty).
pub fn reductions(f: &Value, init: Option<&Value>, coll: &Value) -> RunResult<Value> {
    let f = f.clone();
    let source = source_seq(coll)?;
    match init {
        Some(init) => Ok(Value::Seq(reductions_seq(f, init.clone(), source))),
        None => Ok(Value::Seq(Seq::lazy(move || match source.seq()? {
            None => Ok(None),
            Some(resolved) => {
                let seed = resolved.first()?;
                Ok(Some(reductions_seq(f, seed, resolved.rest()?)))
            }
        }))),
    }
}

fn reductions_seq(f: Value, acc: Value, source: Seq) -> Seq {
    Seq::lazy(move || {
        let tail_acc = acc.clone();
        let tail = Seq::lazy(move || match source.seq()? {
            None => Ok(None),
            Some(resolved) => {
                let next_acc = f.call(&[tail_acc, resolved.first()?])?;
                Ok(Some(reductions_seq(f, next_acc, resolved.rest()?)))
            }
        });
        Ok(Some(Seq::cons(acc, tail)))
    })
}

// =============================================================================
// map / filter / reduce
// =============================================================================

/// `(map f coll...)` — lazy. The multi-collection variant applies `f`
/// positionally across the inputs and stops at the shortest. The
/// single-collection variant is chunk-aware.
pub fn map(f: &Value, colls: &[Value]) -> RunResult<Value> {
    match colls {
        [] => Err(RuntimeError::arity("map", "at least 1 collection", 0)),
        [coll] => Ok(Value::Seq(map_seq(f.clone(), source_seq(coll)?))),
        many => {
            let sources = many
                .iter()
                .map(source_seq)
                .collect::<RunResult<Vec<Seq>>>()?;
            Ok(Value::Seq(map_multi_seq(f.clone(), sources)))
        }
    }
}

fn map_seq(f: Value, source: Seq) -> Seq {
    Seq::lazy(move || match source.seq()? {
        None => Ok(None),
        Some(Seq::Chunked(chunked)) => {
            let chunk = chunked.chunk_first();
            let mut buffer = ChunkBuffer::new(chunk.count());
            for item in chunk.iter() {
                buffer.push(f.call(std::slice::from_ref(item))?);
            }
            let more = map_seq(f, chunked.chunk_rest());
            Ok(Some(ChunkedCons::new(buffer.chunk(), more)))
        }
        Some(resolved) => {
            let mapped = f.call(&[resolved.first()?])?;
            Ok(Some(Seq::cons(mapped, map_seq(f, resolved.rest()?))))
        }
    })
}

fn map_multi_seq(f: Value, sources: Vec<Seq>) -> Seq {
    Seq::lazy(move || {
        let mut firsts = Vec::with_capacity(sources.len());
        let mut rests = Vec::with_capacity(sources.len());
        for source in &sources {
            match source.seq()? {
                None => return Ok(None),
                Some(resolved) => {
                    firsts.push(resolved.first()?);
                    rests.push(resolved.rest()?);
                }
            }
        }
        let mapped = f.call(&firsts)?;
        Ok(Some(Seq::cons(mapped, map_multi_seq(f, rests))))
    })
}

/// `(filter pred coll)` — lazy, chunk-aware.
pub fn filter(pred: &Value, coll: &Value) -> RunResult<Value> {
    Ok(Value::Seq(filter_seq(pred.clone(), source_seq(coll)?)))
}

fn filter_seq(pred: Value, source: Seq) -> Seq {
    Seq::lazy(move || {
        let mut cursor = source.clone();
        loop {
            match cursor.seq()? {
                None => return Ok(None),
                Some(Seq::Chunked(chunked)) => {
                    let chunk = chunked.chunk_first();
                    let mut buffer = ChunkBuffer::new(chunk.count());
                    for item in chunk.iter() {
                        if pred.call(std::slice::from_ref(item))?.is_truthy() {
                            buffer.push(item.clone());
                        }
                    }
                    let more = chunked.chunk_rest();
                    if buffer.count() > 0 {
                        return Ok(Some(ChunkedCons::new(
                            buffer.chunk(),
                            filter_seq(pred, more),
                        )));
                    }
                    cursor = more;
                }
                Some(resolved) => {
                    let head = resolved.first()?;
                    let rest = resolved.rest()?;
                    if pred.call(std::slice::from_ref(&head))?.is_truthy() {
                        return Ok(Some(Seq::cons(head, filter_seq(pred, rest))));
                    }
                    cursor = rest;
                }
            }
        }
    })
}

/// `(reduce f init? coll)` — eager, chunk-aware, short-circuits on a
/// `Reduced` result and returns it unwrapped.
pub fn reduce(f: &Value, init: Option<&Value>, coll: &Value) -> RunResult<Value> {
    let mut cursor = source_seq(coll)?;
    let mut acc = match init {
        Some(init) => init.clone(),
        None => match cursor.seq()? {
            // No init and no elements: the reducing function decides.
            None => return f.call(&[]),
            Some(resolved) => {
                let seed = resolved.first()?;
                cursor = resolved.rest()?;
                seed
            }
        },
    };
    loop {
        match cursor.seq()? {
            None => return Ok(acc),
            Some(Seq::Chunked(chunked)) => {
                acc = chunked
                    .chunk_first()
                    .reduce(acc, |acc, item| f.call(&[acc, item.clone()]))?;
                if acc.is_reduced() {
                    return Ok(acc.unreduced());
                }
                cursor = chunked.chunk_rest();
            }
            Some(resolved) => {
                acc = f.call(&[acc, resolved.first()?])?;
                if acc.is_reduced() {
                    return Ok(acc.unreduced());
                }
                cursor = resolved.rest()?;
            }
        }
    }
}

// =============================================================================
// realization
// =============================================================================

/// `(doall coll)` — force every element, return the input.
pub fn doall(coll: &Value) -> RunResult<Value> {
    let source = source_seq(coll)?;
    for item in source.iter() {
        item?;
    }
    Ok(coll.clone())
}

/// `(into target coll)` — pour a collection into a vector, set, map or
/// string target.
pub fn into(target: &Value, coll: &Value) -> RunResult<Value> {
    let source = source_seq(coll)?;
    match target {
        Value::Vector(existing) => {
            let mut items: Vec<Value> = existing.as_ref().clone();
            for item in source.iter() {
                items.push(item?);
            }
            Ok(Value::vector(items))
        }
        Value::Set(existing) => {
            let mut items: IndexSet<Value> = existing.as_ref().clone();
            for item in source.iter() {
                items.insert(item?);
            }
            Ok(Value::Set(Rc::new(items)))
        }
        Value::Map(existing) => {
            let mut entries: IndexMap<Rc<str>, Value> = existing.as_ref().clone();
            for item in source.iter() {
                let item = item?;
                let pair = match &item {
                    Value::Vector(pair) if pair.len() == 2 => pair,
                    other => {
                        return Err(RuntimeError::type_error(format!(
                            "into a map expects [key value] pairs, got {}",
                            other.type_name()
                        )));
                    }
                };
                let key: Rc<str> = Rc::from(pair[0].to_string().as_str());
                entries.insert(key, pair[1].clone());
            }
            Ok(Value::Map(Rc::new(entries)))
        }
        Value::Str(existing) => {
            let mut out = existing.to_string();
            for item in source.iter() {
                out.push_str(&item?.to_string());
            }
            Ok(Value::str(out))
        }
        other => Err(RuntimeError::type_error(format!(
            "cannot pour into {}",
            other.type_name()
        ))),
    }
}
