use ringbuf::{traits::*, HeapRb};
use std::sync::Arc;
use parking_lot::Mutex;

/// Ring buffer that collects captured samples and hands them out in
/// fixed-size chunks. When full, the oldest samples are dropped.
pub struct ChunkBuffer {
    buffer: Arc<Mutex<HeapRb<f32>>>,
    chunk_size: usize,
}

impl ChunkBuffer {
    /// Create a buffer holding up to `capacity` samples, cut into `chunk_size` pieces
    pub fn new(capacity: usize, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            buffer: Arc::new(Mutex::new(HeapRb::new(capacity.max(chunk_size)))),
            chunk_size,
        }
    }

    /// Append samples, overwriting the oldest ones on overflow.
    /// Returns the number of samples that were dropped.
    pub fn push(&self, samples: &[f32]) -> usize {
        let mut buffer = self.buffer.lock();
        let mut dropped = 0;

        for &sample in samples {
            if buffer.try_push(sample).is_err() {
                let _ = buffer.try_pop();
                let _ = buffer.try_push(sample);
                dropped += 1;
            }
        }

        dropped
    }

    /// Take the next full chunk, if one is available
    pub fn pop_chunk(&self) -> Option<Vec<f32>> {
        let mut buffer = self.buffer.lock();
        if buffer.occupied_len() < self.chunk_size {
            return None;
        }

        let mut chunk = Vec::with_capacity(self.chunk_size);
        for _ in 0..self.chunk_size {
            match buffer.try_pop() {
                Some(sample) => chunk.push(sample),
                None => break,
            }
        }
        Some(chunk)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of buffered samples not yet handed out
    pub fn len(&self) -> usize {
        self.buffer.lock().occupied_len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }

    pub fn clear(&self) {
        self.buffer.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.buffer.lock().capacity().get()
    }
}

impl Clone for ChunkBuffer {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            chunk_size: self.chunk_size,
        }
    }
}
