use std::cell::Cell;
use std::rc::Rc;

use hql_runtime::combinators::{
    cons, doall, drop, drop_while, filter, interleave, interpose, into, iterate, map, partition,
    partition_all, partition_by, range, reduce, reductions, take, take_while,
};
use hql_runtime::helpers;
use hql_runtime::seq::{self, Seq};
use hql_runtime::value::Value;

fn num_vec(items: &[f64]) -> Value {
    Value::vector(items.iter().map(|n| Value::Number(*n)).collect())
}

fn to_numbers(value: &Value) -> Vec<f64> {
    let seq = match seq::to_seq(value).expect("seqable") {
        None => return Vec::new(),
        Some(seq) => seq,
    };
    seq.iter()
        .map(|item| match item.expect("no realization error") {
            Value::Number(n) => n,
            other => panic!("expected number, got {other:?}"),
        })
        .collect()
}

fn to_groups(value: &Value) -> Vec<Vec<f64>> {
    let seq = match seq::to_seq(value).expect("seqable") {
        None => return Vec::new(),
        Some(seq) => seq,
    };
    seq.iter()
        .map(|item| to_numbers(&item.expect("group")))
        .collect()
}

fn add_fn() -> Value {
    Value::native_fn(|args| {
        Ok(Value::Number(
            args[0].as_number("+")? + args[1].as_number("+")?,
        ))
    })
}

fn num(n: f64) -> Value {
    Value::Number(n)
}

#[test]
fn test_take_on_infinite_range() {
    let naturals = range(&[]).expect("range");
    let taken = take(&num(5.0), &naturals).expect("take");
    assert_eq!(to_numbers(&taken), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
}

#[test]
fn test_range_variants() {
    assert_eq!(to_numbers(&range(&[num(4.0)]).expect("range")), vec![
        0.0, 1.0, 2.0, 3.0
    ]);
    assert_eq!(
        to_numbers(&range(&[num(2.0), num(5.0)]).expect("range")),
        vec![2.0, 3.0, 4.0]
    );
    assert_eq!(
        to_numbers(&range(&[num(10.0), num(4.0), num(-2.0)]).expect("range")),
        vec![10.0, 8.0, 6.0]
    );
    assert!(range(&[num(0.0), num(1.0), num(0.0)]).is_err());
}

#[test]
fn test_take_realizes_at_most_k_source_elements() {
    // (take 5 (map f (range))) must invoke f exactly 5 times.
    let calls = Rc::new(Cell::new(0usize));
    let calls_inner = Rc::clone(&calls);
    let double = Value::native_fn(move |args| {
        calls_inner.set(calls_inner.get() + 1);
        Ok(Value::Number(args[0].as_number("double")? * 2.0))
    });
    let naturals = range(&[]).expect("range");
    let mapped = map(&double, &[naturals]).expect("map");
    let taken = take(&num(5.0), &mapped).expect("take");
    let realized = doall(&taken).expect("doall");
    assert_eq!(to_numbers(&realized), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    assert_eq!(calls.get(), 5, "laziness law: exactly 5 realizations");
}

#[test]
fn test_take_while_stops_at_first_false() {
    let calls = Rc::new(Cell::new(0usize));
    let calls_inner = Rc::clone(&calls);
    let below = Value::native_fn(move |args| {
        calls_inner.set(calls_inner.get() + 1);
        Ok(Value::Bool(args[0].as_number("below")? < 3.0))
    });
    let naturals = range(&[]).expect("range");
    let taken = take_while(&below, &naturals).expect("take-while");
    assert_eq!(to_numbers(&taken), vec![0.0, 1.0, 2.0]);
    assert_eq!(calls.get(), 4, "predicate sees the first failing element only");
}

#[test]
fn test_drop_and_drop_while() {
    let coll = num_vec(&[1.0, 2.0, 3.0, 4.0, 1.0]);
    assert_eq!(
        to_numbers(&drop(&num(2.0), &coll).expect("drop")),
        vec![3.0, 4.0, 1.0]
    );
    let below3 = Value::native_fn(|args| Ok(Value::Bool(args[0].as_number("p")? < 3.0)));
    // Lazy: skips while true, keeps everything after (including later
    // elements that would satisfy the predicate again).
    assert_eq!(
        to_numbers(&drop_while(&below3, &coll).expect("drop-while")),
        vec![3.0, 4.0, 1.0]
    );
}

#[test]
fn test_partition_drops_incomplete_group() {
    let coll = num_vec(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let grouped = partition(&num(3.0), Some(&num(1.0)), &coll).expect("partition");
    assert_eq!(
        to_groups(&grouped),
        vec![
            vec![1.0, 2.0, 3.0],
            vec![2.0, 3.0, 4.0],
            vec![3.0, 4.0, 5.0]
        ]
    );
    let chunks = partition(&num(2.0), None, &coll).expect("partition");
    assert_eq!(to_groups(&chunks), vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
}

#[test]
fn test_partition_all_keeps_trailing_group() {
    let coll = num_vec(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    let grouped = partition_all(&num(3.0), None, &coll).expect("partition-all");
    assert_eq!(
        to_groups(&grouped),
        vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0], vec![7.0]]
    );
}

#[test]
fn test_partition_by_groups_runs() {
    let parity = Value::native_fn(|args| {
        Ok(Value::Number(args[0].as_number("parity")?.rem_euclid(2.0)))
    });
    let coll = num_vec(&[1.0, 3.0, 2.0, 4.0, 5.0]);
    let grouped = partition_by(&parity, &coll).expect("partition-by");
    assert_eq!(
        to_groups(&grouped),
        vec![vec![1.0, 3.0], vec![2.0, 4.0], vec![5.0]]
    );
}

#[test]
fn test_interleave_stops_at_shortest() {
    let a = num_vec(&[1.0, 2.0, 3.0]);
    let b = num_vec(&[10.0, 20.0]);
    let woven = interleave(&[a, b]).expect("interleave");
    assert_eq!(to_numbers(&woven), vec![1.0, 10.0, 2.0, 20.0]);
}

#[test]
fn test_interleave_edge_cases() {
    let sole = num_vec(&[1.0, 2.0]);
    assert_eq!(
        to_numbers(&interleave(std::slice::from_ref(&sole)).expect("interleave")),
        vec![1.0, 2.0]
    );
    let empty = num_vec(&[]);
    assert_eq!(
        to_numbers(&interleave(&[sole, empty]).expect("interleave")),
        Vec::<f64>::new()
    );
}

#[test]
fn test_interpose() {
    let coll = num_vec(&[1.0, 2.0, 3.0]);
    let spaced = interpose(&num(0.0), &coll).expect("interpose");
    assert_eq!(to_numbers(&spaced), vec![1.0, 0.0, 2.0, 0.0, 3.0]);

    let single = num_vec(&[9.0]);
    assert_eq!(
        to_numbers(&interpose(&num(0.0), &single).expect("interpose")),
        vec![9.0]
    );
    assert_eq!(
        to_numbers(&interpose(&num(0.0), &num_vec(&[])).expect("interpose")),
        Vec::<f64>::new()
    );
}

#[test]
fn test_reductions_with_and_without_init() {
    let coll = num_vec(&[1.0, 2.0, 3.0]);
    let with_init = reductions(&add_fn(), Some(&num(0.0)), &coll).expect("reductions");
    assert_eq!(to_numbers(&with_init), vec![0.0, 1.0, 3.0, 6.0]);

    let seeded = reductions(&add_fn(), None, &coll).expect("reductions");
    assert_eq!(to_numbers(&seeded), vec![1.0, 3.0, 6.0]);
}

#[test]
fn test_map_multi_collection_stops_at_shortest() {
    let a = num_vec(&[1.0, 2.0, 3.0]);
    let b = num_vec(&[10.0, 20.0]);
    let summed = map(&add_fn(), &[a, b]).expect("map");
    assert_eq!(to_numbers(&summed), vec![11.0, 22.0]);
}

#[test]
fn test_filter() {
    let even = Value::native_fn(|args| {
        Ok(Value::Bool(args[0].as_number("even")?.rem_euclid(2.0) == 0.0))
    });
    let coll = range(&[num(10.0)]).expect("range");
    let kept = filter(&even, &coll).expect("filter");
    assert_eq!(to_numbers(&kept), vec![0.0, 2.0, 4.0, 6.0, 8.0]);
}

#[test]
fn test_reduce_sums() {
    let coll = num_vec(&[1.0, 2.0, 3.0, 4.0]);
    let total = reduce(&add_fn(), Some(&num(0.0)), &coll).expect("reduce");
    assert_eq!(total, Value::Number(10.0));
    // Without init, seeds from the first element.
    let total = reduce(&add_fn(), None, &coll).expect("reduce");
    assert_eq!(total, Value::Number(10.0));
}

#[test]
fn test_reduce_short_circuits_on_reduced() {
    let calls = Rc::new(Cell::new(0usize));
    let calls_inner = Rc::clone(&calls);
    let capped = Value::native_fn(move |args| {
        calls_inner.set(calls_inner.get() + 1);
        let acc = args[0].as_number("acc")?;
        if acc > 5.0 {
            Ok(helpers::reduced(args[0].clone()))
        } else {
            Ok(Value::Number(acc + args[1].as_number("x")?))
        }
    });
    let coll = num_vec(&[1.0, 2.0, 3.0, 4.0, 5.0]);
    let result = reduce(&capped, Some(&num(0.0)), &coll).expect("reduce");
    assert_eq!(result, Value::Number(6.0), "stops after exceeding 5");
    assert_eq!(calls.get(), 4, "remaining elements are never consumed");
}

#[test]
fn test_iterate() {
    let inc = Value::native_fn(|args| Ok(Value::Number(args[0].as_number("inc")? + 1.0)));
    let naturals = iterate(inc, num(0.0));
    let taken = take(&num(4.0), &naturals).expect("take");
    assert_eq!(to_numbers(&taken), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_cons_and_into() {
    let tail = num_vec(&[2.0, 3.0]);
    let whole = cons(num(1.0), &tail).expect("cons");
    assert_eq!(to_numbers(&whole), vec![1.0, 2.0, 3.0]);

    let poured = into(&num_vec(&[0.0]), &whole).expect("into");
    assert_eq!(to_numbers(&poured), vec![0.0, 1.0, 2.0, 3.0]);
}

#[test]
fn test_chunked_source_propagates_chunks_through_map() {
    let items: Vec<Value> = (0..80).map(|n| Value::Number(f64::from(n))).collect();
    let chunked = Value::Seq(hql_runtime::chunked_seq(Rc::new(items)));
    let double =
        Value::native_fn(|args| Ok(Value::Number(args[0].as_number("double")? * 2.0)));
    let mapped = map(&double, std::slice::from_ref(&chunked)).expect("map");

    // The mapped seq keeps chunk structure.
    let Value::Seq(mapped_seq) = &mapped else {
        panic!("expected seq");
    };
    let resolved = mapped_seq.seq().expect("resolve").expect("non-empty");
    assert!(
        matches!(resolved, Seq::Chunked(_)),
        "chunked input should stay chunked through map"
    );
    let expected: Vec<f64> = (0..80).map(|n| f64::from(n) * 2.0).collect();
    assert_eq!(to_numbers(&mapped), expected);
}

#[test]
fn test_chunked_source_through_filter_and_reduce() {
    let items: Vec<Value> = (0..64).map(|n| Value::Number(f64::from(n))).collect();
    let chunked = Value::Seq(hql_runtime::chunked_seq(Rc::new(items)));
    let even = Value::native_fn(|args| {
        Ok(Value::Bool(args[0].as_number("even")?.rem_euclid(2.0) == 0.0))
    });
    let kept = filter(&even, &chunked).expect("filter");
    let total = reduce(&add_fn(), Some(&num(0.0)), &kept).expect("reduce");
    // 0 + 2 + ... + 62 = 992
    assert_eq!(total, Value::Number(992.0));
}

#[test]
fn test_non_chunked_input_passes_through_standard_path() {
    let coll = num_vec(&[1.0, 2.0, 3.0]);
    let double =
        Value::native_fn(|args| Ok(Value::Number(args[0].as_number("double")? * 2.0)));
    let mapped = map(&double, &[coll]).expect("map");
    let Value::Seq(mapped_seq) = &mapped else {
        panic!("expected seq");
    };
    let resolved = mapped_seq.seq().expect("resolve").expect("non-empty");
    assert!(matches!(resolved, Seq::Cons(_)));
}
