/// Number of frame samples kept for reporting.
pub const FRAME_SAMPLE_CAPACITY: usize = 512;

/// Fixed-capacity circular buffer of nanosecond samples.
///
/// Once full, each push overwrites the oldest entry.
#[derive(Debug, Clone)]
pub struct SampleRing {
    buf: Box<[u64]>,
    head: usize,
    len: usize,
}

impl SampleRing {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![0; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, sample: u64) {
        if self.len > 0 {
            self.head = (self.head + 1) % self.buf.len();
        }
        self.buf[self.head] = sample;
        self.len = (self.len + 1).min(self.buf.len());
    }

    /// Most recent sample.
    pub fn latest(&self) -> Option<u64> {
        (self.len > 0).then(|| self.buf[self.head])
    }

    /// Samples from most recent to oldest.
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        let cap = self.buf.len();
        (0..self.len).map(move |i| self.buf[(self.head + cap - i) % cap])
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }
}

impl Default for SampleRing {
    fn default() -> Self {
        Self::with_capacity(FRAME_SAMPLE_CAPACITY)
    }
}
