//! Transducers: composable reducing-function transformers.
//!
//! A reducing function is three operations: an initial value (supplied by
//! the driver), a step, and a completion. A transducer wraps one reducing
//! function in another. Early termination travels as a `Reduced` wrapper
//! through the step results; the driver unwraps it once at the end.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::combinators;
use crate::error::RunResult;
use crate::seq::to_seq;
use crate::value::Value;

/// A reducing function: step plus completion.
pub trait Reducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value>;

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        Ok(acc)
    }
}

/// A transducer: a transformer from reducing function to reducing function.
pub type Transducer = Box<dyn FnOnce(Box<dyn Reducer>) -> Box<dyn Reducer>>;

/// Wrap a value in the early-termination sentinel.
#[must_use]
pub fn reduced(value: Value) -> Value {
    Value::Reduced(Rc::new(value))
}

/// Wrap unless already wrapped.
#[must_use]
pub fn ensure_reduced(value: Value) -> Value {
    if value.is_reduced() { value } else { reduced(value) }
}

/// Lift a two-argument function value into a reducing function.
struct FnReducer {
    f: Value,
}

impl Reducer for FnReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        self.f.call(&[acc, input])
    }
}

// =============================================================================
// Transducer constructors
// =============================================================================

struct MapReducer {
    f: Value,
    down: Box<dyn Reducer>,
}

impl Reducer for MapReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        let mapped = self.f.call(std::slice::from_ref(&input))?;
        self.down.step(acc, mapped)
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(map f)` as a transducer.
pub fn map_t(f: Value) -> Transducer {
    Box::new(move |down| Box::new(MapReducer { f, down }))
}

struct FilterReducer {
    pred: Value,
    down: Box<dyn Reducer>,
}

impl Reducer for FilterReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.pred.call(std::slice::from_ref(&input))?.is_truthy() {
            self.down.step(acc, input)
        } else {
            Ok(acc)
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(filter pred)` as a transducer.
pub fn filter_t(pred: Value) -> Transducer {
    Box::new(move |down| Box::new(FilterReducer { pred, down }))
}

struct TakeReducer {
    remaining: usize,
    down: Box<dyn Reducer>,
}

impl Reducer for TakeReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.remaining == 0 {
            return Ok(ensure_reduced(acc));
        }
        self.remaining -= 1;
        let result = self.down.step(acc, input)?;
        if self.remaining == 0 {
            Ok(ensure_reduced(result))
        } else {
            Ok(result)
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(take n)` as a transducer. Terminates the reduction after `n` inputs.
pub fn take_t(n: usize) -> Transducer {
    Box::new(move |down| Box::new(TakeReducer { remaining: n, down }))
}

struct DropReducer {
    remaining: usize,
    down: Box<dyn Reducer>,
}

impl Reducer for DropReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.remaining > 0 {
            self.remaining -= 1;
            Ok(acc)
        } else {
            self.down.step(acc, input)
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(drop n)` as a transducer.
pub fn drop_t(n: usize) -> Transducer {
    Box::new(move |down| Box::new(DropReducer { remaining: n, down }))
}

struct TakeWhileReducer {
    pred: Value,
    down: Box<dyn Reducer>,
}

impl Reducer for TakeWhileReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.pred.call(std::slice::from_ref(&input))?.is_truthy() {
            self.down.step(acc, input)
        } else {
            Ok(ensure_reduced(acc))
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(take-while pred)` as a transducer.
pub fn take_while_t(pred: Value) -> Transducer {
    Box::new(move |down| Box::new(TakeWhileReducer { pred, down }))
}

struct DropWhileReducer {
    pred: Value,
    dropping: bool,
    down: Box<dyn Reducer>,
}

impl Reducer for DropWhileReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.dropping {
            if self.pred.call(std::slice::from_ref(&input))?.is_truthy() {
                return Ok(acc);
            }
            self.dropping = false;
        }
        self.down.step(acc, input)
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(drop-while pred)` as a transducer.
pub fn drop_while_t(pred: Value) -> Transducer {
    Box::new(move |down| {
        Box::new(DropWhileReducer {
            pred,
            dropping: true,
            down,
        })
    })
}

struct DistinctReducer {
    seen: IndexSet<Value>,
    down: Box<dyn Reducer>,
}

impl Reducer for DistinctReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        if self.seen.insert(input.clone()) {
            self.down.step(acc, input)
        } else {
            Ok(acc)
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        self.down.complete(acc)
    }
}

/// `(distinct)` as a transducer.
pub fn distinct_t() -> Transducer {
    Box::new(move |down| {
        Box::new(DistinctReducer {
            seen: IndexSet::new(),
            down,
        })
    })
}

struct PartitionAllReducer {
    n: usize,
    buffer: Vec<Value>,
    down: Box<dyn Reducer>,
}

impl Reducer for PartitionAllReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        self.buffer.push(input);
        if self.buffer.len() >= self.n {
            let group = std::mem::take(&mut self.buffer);
            self.down.step(acc, Value::vector(group))
        } else {
            Ok(acc)
        }
    }

    fn complete(&mut self, acc: Value) -> RunResult<Value> {
        let acc = if self.buffer.is_empty() {
            acc
        } else {
            let group = std::mem::take(&mut self.buffer);
            // A completion flush must not re-enter early termination.
            self.down.step(acc, Value::vector(group))?.unreduced()
        };
        self.down.complete(acc)
    }
}

/// `(partition-all n)` as a transducer.
pub fn partition_all_t(n: usize) -> Transducer {
    let n = n.max(1);
    Box::new(move |down| {
        Box::new(PartitionAllReducer {
            n,
            buffer: Vec::new(),
            down,
        })
    })
}

// =============================================================================
// Composition and drivers
// =============================================================================

/// Compose transducers left-to-right: in `compose([t1, t2])`, `t1` sees
/// each input first.
pub fn compose(transducers: Vec<Transducer>) -> Transducer {
    Box::new(move |mut rf| {
        for transducer in transducers.into_iter().rev() {
            rf = transducer(rf);
        }
        rf
    })
}

/// Drive a reduction through a transducer stack.
pub fn transduce(xf: Transducer, rf: Value, init: Value, coll: &Value) -> RunResult<Value> {
    let mut reducer = xf(Box::new(FnReducer { f: rf }));
    let mut acc = init;
    if let Some(source) = to_seq(coll)? {
        for item in source.iter() {
            acc = reducer.step(acc, item?)?;
            if acc.is_reduced() {
                acc = acc.unreduced();
                break;
            }
        }
    }
    reducer.complete(acc)
}

/// Collects stepped inputs into a shared vector; used by `into_with`.
struct CollectReducer {
    out: Rc<RefCell<Vec<Value>>>,
}

impl Reducer for CollectReducer {
    fn step(&mut self, acc: Value, input: Value) -> RunResult<Value> {
        self.out.borrow_mut().push(input);
        Ok(acc)
    }
}

/// `(into target xf coll)` — transduce `coll` and pour the results into
/// `target`.
pub fn into_with(target: &Value, xf: Transducer, coll: &Value) -> RunResult<Value> {
    let out = Rc::new(RefCell::new(Vec::new()));
    let mut reducer = xf(Box::new(CollectReducer {
        out: Rc::clone(&out),
    }));
    let mut acc = Value::Null;
    if let Some(source) = to_seq(coll)? {
        for item in source.iter() {
            acc = reducer.step(acc, item?)?;
            if acc.is_reduced() {
                acc = acc.unreduced();
                break;
            }
        }
    }
    reducer.complete(acc)?;
    drop(reducer);
    let collected = Value::vector(Rc::try_unwrap(out).map_or_else(
        |shared| shared.borrow().clone(),
        |owned| owned.into_inner(),
    ));
    combinators::into(target, &collected)
}
