//! Degree sampler (spec.md §4.2).
//!
//! Decides how many source blocks a freshly-minted output symbol XORs
//! together. The distribution is a clamped Robust Soliton, the concrete
//! answer to the Open Question in spec.md §9 ("implementers should pick and
//! document a Robust Soliton or LT-style distribution").
//!
//! Robust Soliton biases heavily toward degree 1 and 2 (so peeling starts
//! immediately and cascades fast) while keeping a thin tail out to `k`, so
//! the decoder eventually sees symbols that tie together the stragglers a
//! pure degree-1/2 stream would never touch.

use rand::Rng;

/// Parameters of the Robust Soliton distribution (Luby, 2002).
///
/// `c` and `delta` control the shape of the extra "robustness" term added
/// on top of the ideal soliton distribution; smaller `delta` asks for a
/// higher decode-success probability at the cost of a fatter tail. The
/// defaults below (`c = 0.1`, `delta = 0.5`) are the values this crate
/// documents and tests against (spec.md §8 erasure-resilience property).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RobustSoliton {
    /// Number of source blocks the distribution is defined over.
    pub k: usize,
    /// Shape constant, typically small and positive.
    pub c: f64,
    /// Target failure probability.
    pub delta: f64,
}

impl RobustSoliton {
    /// Default shape constant.
    pub const DEFAULT_C: f64 = 0.1;
    /// Default failure-probability target.
    pub const DEFAULT_DELTA: f64 = 0.5;

    /// Builds a Robust Soliton distribution over `k` source blocks using
    /// the documented default shape constants.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self { k, c: Self::DEFAULT_C, delta: Self::DEFAULT_DELTA }
    }

    fn ideal_soliton(&self, d: usize) -> f64 {
        if d == 1 {
            1.0 / self.k as f64
        } else {
            1.0 / (d as f64 * (d as f64 - 1.0))
        }
    }

    fn spike_position(&self) -> f64 {
        let k = self.k as f64;
        (k / self.expected_ripple_size()).max(1.0)
    }

    fn expected_ripple_size(&self) -> f64 {
        let k = self.k as f64;
        self.c * (k / self.delta).ln() * k.sqrt()
    }

    fn robustness_term(&self, d: usize) -> f64 {
        let r = self.expected_ripple_size();
        let spike = self.spike_position();
        let d = d as f64;
        if d < spike {
            r / (d * spike)
        } else if (d - spike).abs() < f64::EPSILON {
            r * (r + 1.0).ln() / self.k as f64
        } else {
            0.0
        }
    }

    /// Un-normalised weights `rho(d) + tau(d)` for `d` in `1..=k`.
    fn weights(&self) -> Vec<f64> {
        (1..=self.k).map(|d| self.ideal_soliton(d) + self.robustness_term(d)).collect()
    }

    /// Draws one degree in `[1, k]` from `rng`.
    ///
    /// `k == 0` is treated as a degenerate empty session and always
    /// returns `0`. Callers must not draw degrees for a session with no
    /// source blocks.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        if self.k == 0 {
            return 0;
        }
        if self.k == 1 {
            return 1;
        }

        let weights = self.weights();
        let total: f64 = weights.iter().sum();
        let mut draw = rng.gen_range(0.0..total);

        for (i, weight) in weights.iter().enumerate() {
            if draw < *weight {
                return i + 1;
            }
            draw -= weight;
        }
        // Floating-point rounding can leave a residual draw; fall back to
        // the highest degree rather than panicking.
        self.k
    }
}

/// Wraps a distribution with the RNG it draws from, so the encoder holds
/// one object instead of threading the RNG through every call site.
#[derive(Debug)]
pub struct DegreeSampler<R> {
    distribution: RobustSoliton,
    rng: R,
}

impl<R: Rng> DegreeSampler<R> {
    /// Builds a sampler over `k` source blocks using `rng` for all draws.
    pub fn new(k: usize, rng: R) -> Self {
        Self { distribution: RobustSoliton::new(k), rng }
    }

    /// Draws the next degree, `1..=k` (or `0` if `k == 0`).
    pub fn next_degree(&mut self) -> usize {
        self.distribution.sample(&mut self.rng)
    }

    /// Draws `d` distinct source-block indices uniformly without
    /// replacement from `[0, k)` (spec.md §4.3 step 2).
    pub fn sample_indices(&mut self, d: usize) -> Vec<usize> {
        let k = self.distribution.k;
        debug_assert!(d <= k);
        let mut pool: Vec<usize> = (0..k).collect();
        let mut chosen = Vec::with_capacity(d);
        for _ in 0..d {
            let i = self.rng.gen_range(0..pool.len());
            chosen.push(pool.swap_remove(i));
        }
        chosen.sort_unstable();
        chosen
    }
}
