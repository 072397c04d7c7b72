use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// Where `CXNN` gets its bytes from. Injected so tests can pin the sequence.
pub trait RandomSource {
    fn next_byte(&mut self) -> u8;
}

/// RandMode controls generator behaviour. May be predictable for testing or
/// reproducible runs, or truly random for play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RandMode {
    Predictable,
    RandomUniform,
}

pub struct ChipRand {
    rng: Box<dyn RngCore>,
    rand_mode: RandMode,
}

impl ChipRand {
    pub fn new_uniform() -> ChipRand {
        ChipRand {
            rng: Box::new(rand::thread_rng()),
            rand_mode: RandMode::RandomUniform,
        }
    }

    pub fn new_predictable(seed: u64) -> ChipRand {
        ChipRand {
            rng: Box::new(StdRng::seed_from_u64(seed)),
            rand_mode: RandMode::Predictable,
        }
    }

    pub fn from_seed(seed: Option<u64>) -> ChipRand {
        match seed {
            Some(seed) => ChipRand::new_predictable(seed),
            None => ChipRand::new_uniform(),
        }
    }

    pub fn mode(&self) -> RandMode {
        self.rand_mode
    }
}

impl RandomSource for ChipRand {
    fn next_byte(&mut self) -> u8 {
        self.rng.gen()
    }
}
