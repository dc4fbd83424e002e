//! Centralized limits and thresholds for the HQL compiler and runtime.
//!
//! Centralizing these values prevents duplicate definitions with
//! inconsistent values and documents the rationale for each limit.

/// Maximum nesting depth the reader accepts before reporting a `TooDeep`
/// parse error.
///
/// Each open delimiter adds a frame to the reader's recursion, so this bound
/// keeps pathological input (thousands of unmatched `(`) from overflowing the
/// stack. Realistic HQL source nests well under a hundred levels.
pub const MAX_READER_DEPTH: usize = 512;

/// Maximum nesting depth the lowering pipeline accepts.
///
/// Lowering recursion roughly tracks reader nesting, but quasiquote expansion
/// and IIFE wrapping can add a few synthetic levels on top.
pub const MAX_LOWERING_DEPTH: usize = 768;

/// Number of elements per chunk in chunked sequences.
///
/// Matches Clojure's chunk size. Chunked iteration amortizes per-element
/// overhead by realizing elements in blocks of this size.
pub const CHUNK_SIZE: usize = 32;

/// Trampoline iteration bound for `LazySeq` realization.
///
/// A thunk that keeps returning lazy seqs beyond this many levels is a
/// producer bug (a self-referential seq); the runtime reports it instead of
/// spinning forever.
pub const MAX_LAZY_TRAMPOLINE: usize = 1_000_000;
