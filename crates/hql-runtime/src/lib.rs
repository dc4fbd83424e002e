//! Lazy-sequence runtime library for compiled HQL programs.
//!
//! Implements the seq protocol (`Cons`, `LazySeq`, `ArraySeq`, chunked
//! sequences, the `EMPTY` singleton), the lazy combinators, transducers
//! with early termination, and the named helpers the lowering pipeline
//! emits calls to.
//!
//! Everything is single-threaded cooperative: state is owned by its
//! producing seq, `LazySeq` memoization is written exactly once, and no
//! locks exist anywhere in the crate.

pub mod chunk;
pub mod combinators;
pub mod error;
pub mod helpers;
pub mod seq;
pub mod transducers;
pub mod value;

pub use chunk::{ArrayChunk, ChunkBuffer, ChunkedCons, chunked_seq};
pub use error::{RunResult, RuntimeError};
pub use seq::{ArraySeq, Cons, LazySeq, Seq, SeqFlags, count, first, next, nth, realized, rest,
    seq, to_seq};
pub use value::{NativeFn, Value};
