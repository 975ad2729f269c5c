//! Offline oracle: random alphanumeric candidates shaped like the hint.

use std::sync::{Mutex, PoisonError};

use rand::rngs::StdRng;

use super::DecoyOracle;
use crate::crypto::random::generate_key;
use crate::errors::Result;

/// Default number of candidates per request.
pub const DEFAULT_DECOY_COUNT: usize = 9;

/// Oracle that draws `count` random strings as long as the hint.
pub struct RandomDecoyOracle {
    count: usize,
    rng: Mutex<StdRng>,
}

impl RandomDecoyOracle {
    pub fn new(count: usize, rng: StdRng) -> Self {
        Self {
            count,
            rng: Mutex::new(rng),
        }
    }
}

impl DecoyOracle for RandomDecoyOracle {
    fn suggest_decoys(&self, _name: &str, secret_hint: &str) -> Result<Vec<String>> {
        let len = secret_hint.chars().count().max(1);
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        Ok((0..self.count).map(|_| generate_key(&mut *rng, len)).collect())
    }
}
