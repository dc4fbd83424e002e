//! Chunked sequences: bulk iteration in 32-element blocks.
//!
//! Chunking is a performance amplifier, not a semantic change: a chunked
//! seq yields the same elements as its unchunked equivalent, but chunk-aware
//! combinators get to process a block at a time.

use std::rc::Rc;

use hql_common::limits::CHUNK_SIZE;

use crate::error::RunResult;
use crate::seq::Seq;
use crate::value::Value;

/// A contiguous view of up to [`CHUNK_SIZE`] elements.
#[derive(Debug, Clone)]
pub struct ArrayChunk {
    array: Rc<Vec<Value>>,
    off: usize,
    end: usize,
}

impl ArrayChunk {
    /// View of `array[off..end]`. Callers keep `off < end`; an empty chunk
    /// never appears in a `ChunkedCons`.
    #[must_use]
    pub fn new(array: Rc<Vec<Value>>, off: usize, end: usize) -> Self {
        let end = end.min(array.len());
        Self { array, off, end }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.end - self.off
    }

    #[must_use]
    pub fn nth(&self, i: usize) -> Value {
        self.array
            .get(self.off + i)
            .cloned()
            .unwrap_or(Value::Undefined)
    }

    /// The chunk minus its first element.
    #[must_use]
    pub fn drop_first(&self) -> Self {
        Self {
            array: Rc::clone(&self.array),
            off: (self.off + 1).min(self.end),
            end: self.end,
        }
    }

    /// Reduce over the chunk's elements. The reducing function may return
    /// `Reduced`, which short-circuits and is returned still wrapped.
    pub fn reduce(
        &self,
        mut acc: Value,
        mut f: impl FnMut(Value, &Value) -> RunResult<Value>,
    ) -> RunResult<Value> {
        for item in self.iter() {
            acc = f(acc, item)?;
            if acc.is_reduced() {
                return Ok(acc);
            }
        }
        Ok(acc)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.array[self.off..self.end].iter()
    }
}

/// Accumulates up to `capacity` elements, then hands them off as a chunk.
#[derive(Debug)]
pub struct ChunkBuffer {
    buffer: Vec<Value>,
    capacity: usize,
}

impl ChunkBuffer {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
        }
    }

    #[must_use]
    pub fn standard() -> Self {
        Self::new(CHUNK_SIZE)
    }

    pub fn push(&mut self, value: Value) {
        self.buffer.push(value);
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Take the accumulated elements as a chunk, resetting the buffer.
    #[must_use]
    pub fn chunk(&mut self) -> ArrayChunk {
        let items = std::mem::take(&mut self.buffer);
        let len = items.len();
        ArrayChunk::new(Rc::new(items), 0, len)
    }
}

/// A seq whose head is a whole chunk.
#[derive(Debug)]
pub struct ChunkedCons {
    chunk: ArrayChunk,
    more: Seq,
}

impl ChunkedCons {
    /// A chunked cons cell; an empty chunk collapses to the tail.
    #[must_use]
    pub fn new(chunk: ArrayChunk, more: Seq) -> Seq {
        if chunk.count() == 0 {
            more
        } else {
            Seq::Chunked(Rc::new(ChunkedCons { chunk, more }))
        }
    }

    #[must_use]
    pub fn first(&self) -> Value {
        self.chunk.nth(0)
    }

    /// Rest within the chunk when more than one element remains, else the
    /// tail seq.
    #[must_use]
    pub fn rest(&self) -> Seq {
        if self.chunk.count() > 1 {
            Seq::Chunked(Rc::new(ChunkedCons {
                chunk: self.chunk.drop_first(),
                more: self.more.clone(),
            }))
        } else {
            self.more.clone()
        }
    }

    /// The head chunk, for bulk processing.
    #[must_use]
    pub fn chunk_first(&self) -> &ArrayChunk {
        &self.chunk
    }

    /// The seq past the head chunk.
    #[must_use]
    pub fn chunk_rest(&self) -> Seq {
        self.more.clone()
    }
}

/// Build a chunked seq over a vector, in [`CHUNK_SIZE`] blocks.
#[must_use]
pub fn chunked_seq(items: Rc<Vec<Value>>) -> Seq {
    chunked_seq_from(items, 0)
}

fn chunked_seq_from(items: Rc<Vec<Value>>, offset: usize) -> Seq {
    if offset >= items.len() {
        return Seq::Empty;
    }
    let end = (offset + CHUNK_SIZE).min(items.len());
    let chunk = ArrayChunk::new(Rc::clone(&items), offset, end);
    let more = if end < items.len() {
        Seq::lazy(move || Ok(Some(chunked_seq_from(items, end))))
    } else {
        Seq::Empty
    };
    ChunkedCons::new(chunk, more)
}
