use rand::{rngs::ThreadRng, thread_rng};
use rand_distr::{Distribution, Normal};

/// Zero-mean gaussian truncated at two standard deviations, draws outside
/// the bound are redrawn.
struct TruncatedNormal {
    dist: Normal<f32>,
    bound: f32,
}

impl TruncatedNormal {
    fn new(stdev: f32) -> Self {
        Self { dist: Normal::new(0.0, stdev).unwrap(), bound: 2.0 * stdev }
    }

    fn sample(&self, rng: &mut ThreadRng) -> f32 {
        loop {
            let x = self.dist.sample(rng);
            if x.abs() <= self.bound {
                return x;
            }
        }
    }
}

/// He-scaled weight initialisation: truncated normal with
/// stddev = sqrt(2 / fan_in).
pub fn fan_in_scaled(length: usize, fan_in: usize) -> Vec<f32> {
    assert!(fan_in > 0, "Cannot scale to 0 fan-in!");

    let dist = TruncatedNormal::new((2.0 / fan_in as f32).sqrt());
    let mut rng = thread_rng();

    let mut res = Vec::with_capacity(length);
    for _ in 0..length {
        res.push(dist.sample(&mut rng));
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_respect_truncation_bound() {
        let fan_in = 25 * 10;
        let bound = 2.0 * (2.0 / fan_in as f32).sqrt();

        for x in fan_in_scaled(10_000, fan_in) {
            assert!(x.abs() <= bound + f32::EPSILON);
        }
    }

    #[test]
    fn spread_tracks_fan_in() {
        // Wider fan-in must give a tighter spread.
        let narrow: f32 = fan_in_scaled(10_000, 9).iter().map(|x| x * x).sum();
        let wide: f32 = fan_in_scaled(10_000, 900).iter().map(|x| x * x).sum();
        assert!(wide < narrow);
    }
}
