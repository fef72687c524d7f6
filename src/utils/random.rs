use rand::Rng;
use rand::rngs::OsRng;

/// Source of uniform draws in `[0, 1)`. Shared across request handlers.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

/// OS CSPRNG. Stateless, so concurrent callers never share or correlate a stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandomSource;

impl RandomSource for OsRandomSource {
    fn next_f64(&self) -> f64 {
        OsRng.r#gen::<f64>()
    }
}
