//! Named runtime helpers.
//!
//! These are the functions the lowering pipeline emits calls to. Each has
//! a canonical JavaScript-facing name, listed in [`HELPERS`]; the compiler
//! references those names and an emitter links them against this library.

use std::rc::Rc;

use indexmap::IndexMap;

use crate::combinators;
use crate::error::{RunResult, RuntimeError};
use crate::seq::{Seq, to_seq};
use crate::value::Value;

/// One runtime export: the Rust function and the name generated code uses.
pub struct HelperExport {
    pub rust_name: &'static str,
    pub js_name: &'static str,
}

/// Every helper the lowering pipeline may reference, by canonical name.
pub const HELPERS: &[HelperExport] = &[
    HelperExport {
        rust_name: "hash_map",
        js_name: "__hql_hash_map",
    },
    HelperExport {
        rust_name: "get",
        js_name: "__hql_get",
    },
    HelperExport {
        rust_name: "get_numeric",
        js_name: "__hql_getNumeric",
    },
    HelperExport {
        rust_name: "range",
        js_name: "__hql_range",
    },
    HelperExport {
        rust_name: "lazy_seq",
        js_name: "__hql_lazy_seq",
    },
    HelperExport {
        rust_name: "deep_freeze",
        js_name: "__hql_deepFreeze",
    },
    HelperExport {
        rust_name: "get_op",
        js_name: "__hql_get_op",
    },
    HelperExport {
        rust_name: "throw_value",
        js_name: "__hql_throw",
    },
    HelperExport {
        rust_name: "for_each",
        js_name: "__hql_for_each",
    },
    HelperExport {
        rust_name: "to_sequence",
        js_name: "__hql_toSequence",
    },
];

/// Look up a helper's JS name.
#[must_use]
pub fn js_name(rust_name: &str) -> Option<&'static str> {
    HELPERS
        .iter()
        .find(|h| h.rust_name == rust_name)
        .map(|h| h.js_name)
}

fn key_of(value: &Value) -> Rc<str> {
    match value {
        Value::Str(s) => Rc::clone(s),
        other => Rc::from(other.to_string().as_str()),
    }
}

/// `__hql_hash_map`: build an insertion-ordered mapping from alternating
/// key/value arguments. Later duplicates win.
pub fn hash_map(args: &[Value]) -> RunResult<Value> {
    if args.len() % 2 != 0 {
        return Err(RuntimeError::arity(
            "hash-map",
            "an even number of",
            args.len(),
        ));
    }
    let mut map = IndexMap::with_capacity(args.len() / 2);
    for pair in args.chunks(2) {
        map.insert(key_of(&pair[0]), pair[1].clone());
    }
    Ok(Value::Map(Rc::new(map)))
}

/// `__hql_get`: property-or-function accessor. A function target is
/// called with the key; otherwise the key is looked up as a property.
pub fn get(obj: &Value, key: &Value, default: Option<&Value>) -> RunResult<Value> {
    let fallback = || default.cloned().unwrap_or(Value::Undefined);
    match obj {
        Value::Fn(f) => f(std::slice::from_ref(key)),
        Value::Map(map) => Ok(map.get(&key_of(key)).cloned().unwrap_or_else(fallback)),
        Value::Vector(items) => match key {
            Value::Number(n) if *n >= 0.0 => {
                Ok(items.get(*n as usize).cloned().unwrap_or_else(fallback))
            }
            _ => Ok(fallback()),
        },
        Value::Str(s) => match key {
            Value::Number(n) if *n >= 0.0 => Ok(s
                .chars()
                .nth(*n as usize)
                .map(|c| Value::str(c.to_string()))
                .unwrap_or_else(fallback)),
            _ => Ok(fallback()),
        },
        Value::Set(set) => Ok(Value::Bool(set.contains(key))),
        _ => Ok(fallback()),
    }
}

/// `__hql_getNumeric`: accessor for numeric keys; tries an array index
/// first, then a function call.
pub fn get_numeric(obj: &Value, idx: &Value, default: Option<&Value>) -> RunResult<Value> {
    match obj {
        Value::Vector(_) | Value::Str(_) | Value::Map(_) | Value::Set(_) => {
            get(obj, idx, default)
        }
        Value::Seq(_) => {
            let index = idx.as_number("collection index")?.trunc() as i64;
            crate::seq::nth(obj, index, default.cloned().or(Some(Value::Undefined)))
        }
        Value::Fn(f) => f(std::slice::from_ref(idx)),
        _ => Ok(default.cloned().unwrap_or(Value::Undefined)),
    }
}

/// `__hql_lazy_seq`: the primary lazy-seq constructor. The thunk runs at
/// most once and may return any seqable (or null for empty).
pub fn lazy_seq(thunk: &Value) -> RunResult<Value> {
    let thunk = thunk.as_fn("lazy-seq")?.clone();
    Ok(Value::Seq(Seq::lazy(move || {
        let produced = thunk(&[])?;
        to_seq(&produced)
    })))
}

/// `__hql_deepFreeze`: recursive freeze for `const` initializers.
///
/// Runtime values here are structurally immutable already (shared via
/// `Rc`), so freezing is the identity; the helper exists because lowered
/// `const` initializers call it by name.
#[must_use]
pub fn deep_freeze(value: Value) -> Value {
    value
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null | Value::Undefined, Value::Null | Value::Undefined) => true,
        (Value::Number(n), Value::Str(s)) | (Value::Str(s), Value::Number(n)) => {
            s.parse::<f64>().is_ok_and(|parsed| parsed == *n)
        }
        _ => a == b,
    }
}

fn to_i32(value: &Value, context: &str) -> RunResult<i32> {
    Ok(value.as_number(context)?.trunc() as i64 as i32)
}

/// `__hql_get_op`: reify an operator symbol as a callable.
///
/// Binary operators return two-argument functions; `!` and `~` are
/// unary. Unknown operators are a type error.
pub fn get_op(op: &str) -> RunResult<Value> {
    let name: Rc<str> = Rc::from(op);
    macro_rules! binary_num {
        ($body:expr) => {{
            let name = Rc::clone(&name);
            Ok(Value::native_fn(move |args: &[Value]| {
                let [a, b] = args else {
                    return Err(RuntimeError::arity(name.to_string(), "2", args.len()));
                };
                $body(a, b)
            }))
        }};
    }

    match op {
        "+" => binary_num!(|a: &Value, b: &Value| match (a, b) {
            (Value::Str(x), _) => Ok(Value::str(format!("{x}{b}"))),
            (_, Value::Str(y)) => Ok(Value::str(format!("{a}{y}"))),
            _ => Ok(Value::Number(a.as_number("+")? + b.as_number("+")?)),
        }),
        "-" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            a.as_number("-")? - b.as_number("-")?
        ))),
        "*" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            a.as_number("*")? * b.as_number("*")?
        ))),
        "/" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            a.as_number("/")? / b.as_number("/")?
        ))),
        "%" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            a.as_number("%")? % b.as_number("%")?
        ))),
        "**" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            a.as_number("**")?.powf(b.as_number("**")?)
        ))),
        "===" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(a == b))),
        "!==" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(a != b))),
        "==" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(loose_eq(a, b)))),
        "!=" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(!loose_eq(a, b)))),
        "<" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(
            a.as_number("<")? < b.as_number("<")?
        ))),
        ">" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(
            a.as_number(">")? > b.as_number(">")?
        ))),
        "<=" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(
            a.as_number("<=")? <= b.as_number("<=")?
        ))),
        ">=" => binary_num!(|a: &Value, b: &Value| Ok(Value::Bool(
            a.as_number(">=")? >= b.as_number(">=")?
        ))),
        "&&" => binary_num!(|a: &Value, b: &Value| Ok(if a.is_truthy() {
            b.clone()
        } else {
            a.clone()
        })),
        "||" => binary_num!(|a: &Value, b: &Value| Ok(if a.is_truthy() {
            a.clone()
        } else {
            b.clone()
        })),
        "&" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            (to_i32(a, "&")? & to_i32(b, "&")?) as f64
        ))),
        "|" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            (to_i32(a, "|")? | to_i32(b, "|")?) as f64
        ))),
        "^" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            (to_i32(a, "^")? ^ to_i32(b, "^")?) as f64
        ))),
        "<<" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            (to_i32(a, "<<")?.wrapping_shl(to_i32(b, "<<")? as u32 & 31)) as f64
        ))),
        ">>" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            (to_i32(a, ">>")?.wrapping_shr(to_i32(b, ">>")? as u32 & 31)) as f64
        ))),
        ">>>" => binary_num!(|a: &Value, b: &Value| Ok(Value::Number(
            ((to_i32(a, ">>>")? as u32).wrapping_shr(to_i32(b, ">>>")? as u32 & 31)) as f64
        ))),
        "!" => Ok(Value::native_fn(|args: &[Value]| {
            let [a] = args else {
                return Err(RuntimeError::arity("!", "1", args.len()));
            };
            Ok(Value::Bool(!a.is_truthy()))
        })),
        "~" => Ok(Value::native_fn(|args: &[Value]| {
            let [a] = args else {
                return Err(RuntimeError::arity("~", "1", args.len()));
            };
            Ok(Value::Number(!to_i32(a, "~")? as f64))
        })),
        _ => Err(RuntimeError::type_error(format!(
            "unknown operator `{op}`"
        ))),
    }
}

/// `__hql_throw`: raise a user value as a runtime error.
pub fn throw_value(value: Value) -> RunResult<Value> {
    Err(RuntimeError::Thrown(value))
}

/// `__hql_for_each`: call `f` on every element for effect.
pub fn for_each(coll: &Value, f: &Value) -> RunResult<Value> {
    if let Some(source) = to_seq(coll)? {
        for item in source.iter() {
            f.call(&[item?])?;
        }
    }
    Ok(Value::Null)
}

/// `__hql_toSequence`: materialize any seqable as a vector.
pub fn to_sequence(value: &Value) -> RunResult<Value> {
    match to_seq(value)? {
        None => Ok(Value::vector(Vec::new())),
        Some(seq) => Ok(Value::vector(seq.to_vec()?)),
    }
}

/// `reduced`: wrap a value so `reduce` and `transduce` stop early.
#[must_use]
pub fn reduced(value: Value) -> Value {
    crate::transducers::reduced(value)
}

/// Convenience alias for the combinator module's `range`, matching the
/// helper table.
pub fn range(args: &[Value]) -> RunResult<Value> {
    combinators::range(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn hash_map_builds_in_insertion_order() {
        let map = hash_map(&[
            Value::str("b"),
            num(2.0),
            Value::str("a"),
            num(1.0),
        ])
        .expect("hash-map");
        let Value::Map(map) = &map else {
            panic!("expected map");
        };
        let keys: Vec<&str> = map.keys().map(|k| k.as_ref()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn hash_map_rejects_odd_arity() {
        assert!(hash_map(&[Value::str("a")]).is_err());
    }

    #[test]
    fn hash_map_duplicate_keys_last_wins() {
        let map = hash_map(&[
            Value::str("k"),
            num(1.0),
            Value::str("k"),
            num(2.0),
        ])
        .expect("hash-map");
        assert_eq!(
            get(&map, &Value::str("k"), None).expect("get"),
            num(2.0)
        );
    }

    #[test]
    fn get_looks_up_properties_and_calls_functions() {
        let map = hash_map(&[Value::str("x"), num(5.0)]).expect("hash-map");
        assert_eq!(get(&map, &Value::str("x"), None).expect("get"), num(5.0));
        assert_eq!(
            get(&map, &Value::str("y"), None).expect("get"),
            Value::Undefined
        );
        assert_eq!(
            get(&map, &Value::str("y"), Some(&num(0.0))).expect("get"),
            num(0.0)
        );

        let f = Value::native_fn(|args| Ok(args[0].clone()));
        assert_eq!(
            get(&f, &Value::str("key"), None).expect("get"),
            Value::str("key")
        );
    }

    #[test]
    fn get_numeric_tries_index_then_call() {
        let vec = Value::vector(vec![num(10.0), num(20.0)]);
        assert_eq!(get_numeric(&vec, &num(1.0), None).expect("get"), num(20.0));
        assert_eq!(
            get_numeric(&vec, &num(9.0), None).expect("get"),
            Value::Undefined
        );

        let f = Value::native_fn(|args| {
            Ok(Value::Number(args[0].as_number("f")? * 3.0))
        });
        assert_eq!(get_numeric(&f, &num(2.0), None).expect("get"), num(6.0));
    }

    #[test]
    fn get_op_reifies_operators() {
        let plus = get_op("+").expect("operator");
        assert_eq!(plus.call(&[num(2.0), num(3.0)]).expect("call"), num(5.0));
        let plus_str = plus
            .call(&[Value::str("a"), Value::str("b")])
            .expect("call");
        assert_eq!(plus_str, Value::str("ab"));

        let lt = get_op("<").expect("operator");
        assert_eq!(
            lt.call(&[num(1.0), num(2.0)]).expect("call"),
            Value::Bool(true)
        );

        let ushr = get_op(">>>").expect("operator");
        assert_eq!(
            ushr.call(&[num(-1.0), num(28.0)]).expect("call"),
            num(15.0)
        );

        let not = get_op("!").expect("operator");
        assert_eq!(not.call(&[Value::Null]).expect("call"), Value::Bool(true));

        assert!(get_op("nope").is_err());
    }

    #[test]
    fn lazy_seq_helper_defers_and_memoizes() {
        use std::cell::Cell;
        let runs = Rc::new(Cell::new(0usize));
        let runs_inner = Rc::clone(&runs);
        let thunk = Value::native_fn(move |_| {
            runs_inner.set(runs_inner.get() + 1);
            Ok(Value::vector(vec![Value::Number(1.0)]))
        });
        let seq = lazy_seq(&thunk).expect("lazy-seq");
        assert_eq!(runs.get(), 0, "construction must not run the thunk");
        assert_eq!(crate::seq::first(&seq).expect("first"), Value::Number(1.0));
        crate::seq::first(&seq).expect("first");
        assert_eq!(runs.get(), 1);
    }

    #[test]
    fn throw_value_surfaces_the_value() {
        match throw_value(Value::str("boom")) {
            Err(RuntimeError::Thrown(v)) => assert_eq!(v, Value::str("boom")),
            other => panic!("expected thrown error, got {other:?}"),
        }
    }

    #[test]
    fn for_each_visits_every_element() {
        use std::cell::RefCell;
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_inner = Rc::clone(&seen);
        let record = Value::native_fn(move |args| {
            seen_inner.borrow_mut().push(args[0].clone());
            Ok(Value::Null)
        });
        let coll = Value::vector(vec![num(1.0), num(2.0)]);
        for_each(&coll, &record).expect("for-each");
        assert_eq!(seen.borrow().len(), 2);
    }
}
