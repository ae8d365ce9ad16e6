use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::engine::RandomSource;

//
// NATIVE: системный CSPRNG (getrandom под капотом).
//
#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRng;

#[cfg(not(target_arch = "wasm32"))]
impl RandomSource for SystemRng {
    fn next_below(&mut self, bound: usize) -> usize {
        rand::rngs::OsRng.gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        rand::rngs::OsRng.gen::<f64>()
    }
}

/// Детерминированный RNG для тестов и реплея.
/// Одинаковый seed → одинаковые раздачи. Работает и на wasm.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            inner: StdRng::from_seed(seed),
        }
    }

    pub fn from_u64(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    fn next_below(&mut self, bound: usize) -> usize {
        // gen_range даёт несмещённую выборку (rejection sampling).
        self.inner.gen_range(0..bound)
    }

    fn next_unit(&mut self) -> f64 {
        self.inner.gen::<f64>()
    }
}

/// Заранее заданная последовательность чисел (тесты ботов и граничных случаев).
/// Значения берутся по кругу и приводятся к диапазону.
#[derive(Clone, Debug)]
pub struct ScriptedRng {
    units: Vec<f64>,
    pos: usize,
}

impl ScriptedRng {
    pub fn new(units: Vec<f64>) -> Self {
        Self { units, pos: 0 }
    }

    fn next_raw(&mut self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        let v = self.units[self.pos % self.units.len()];
        self.pos += 1;
        v.clamp(0.0, 0.999_999)
    }
}

impl RandomSource for ScriptedRng {
    fn next_below(&mut self, bound: usize) -> usize {
        ((self.next_raw() * bound as f64) as usize).min(bound.saturating_sub(1))
    }

    fn next_unit(&mut self) -> f64 {
        self.next_raw()
    }
}
