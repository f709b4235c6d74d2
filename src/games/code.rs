use crate::games::clock::Clock;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::{Arc, Mutex};

/// Source of game codes for requests that do not name one
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Produces `bg_<unix-millis>_<0..=9999>` codes
pub struct TimestampCodeGenerator {
    clock: Arc<dyn Clock>,
    rng: Mutex<StdRng>,
}

impl TimestampCodeGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Deterministic suffixes for tests
    pub fn with_seed(clock: Arc<dyn Clock>, seed: u64) -> Self {
        Self {
            clock,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl CodeGenerator for TimestampCodeGenerator {
    fn generate(&self) -> String {
        let suffix: u32 = match self.rng.lock() {
            Ok(mut rng) => rng.gen_range(0..10_000),
            Err(poisoned) => poisoned.into_inner().gen_range(0..10_000),
        };
        format!("bg_{}_{}", self.clock.now_millis(), suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::clock::ManualClock;

    #[test]
    fn test_code_format() {
        let clock = Arc::new(ManualClock::new(1_700_000_000_123));
        let generator = TimestampCodeGenerator::new(clock);
        let code = generator.generate();

        let parts: Vec<&str> = code.split('_').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "bg");
        assert_eq!(parts[1], "1700000000123");
        let suffix: u32 = parts[2].parse().expect("numeric suffix");
        assert!(suffix < 10_000);
    }

    #[test]
    fn test_seeded_codes_repeat() {
        let clock: Arc<dyn Clock> = Arc::new(ManualClock::new(42));
        let a = TimestampCodeGenerator::with_seed(clock.clone(), 7);
        let b = TimestampCodeGenerator::with_seed(clock, 7);

        assert_eq!(a.generate(), b.generate());
        assert_eq!(a.generate(), b.generate());
    }
}
