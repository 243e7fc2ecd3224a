use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of device level signals the browser can't observe: unlocks and received
/// notifications. Each sample reports how many events happened since the previous sample.
#[cfg_attr(test, mockall::automock)]
pub trait ActivitySignalSource {
    fn sample_unlocks(&mut self) -> u32;

    fn sample_notifications(&mut self) -> u32;

    /// Whether the numbers are made up. Simulated counts are flagged as such wherever they are
    /// displayed.
    fn is_simulated(&self) -> bool;
}

pub const DEFAULT_UNLOCK_PROBABILITY: f64 = 0.3;
pub const DEFAULT_NOTIFICATION_PROBABILITY: f64 = 0.2;

/// SIMULATED signal source. There is no real unlock or notification sensor behind it: each
/// sample reports a single event with a fixed probability. It stands in until a platform
/// integration provides the real numbers.
pub struct SimulatedSignalSource {
    rng: StdRng,
    unlock_probability: f64,
    notification_probability: f64,
}

impl SimulatedSignalSource {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            unlock_probability: DEFAULT_UNLOCK_PROBABILITY,
            notification_probability: DEFAULT_NOTIFICATION_PROBABILITY,
        }
    }

    pub fn with_probabilities(mut self, unlock: f64, notification: f64) -> Self {
        self.unlock_probability = unlock.clamp(0., 1.);
        self.notification_probability = notification.clamp(0., 1.);
        self
    }
}

impl ActivitySignalSource for SimulatedSignalSource {
    fn sample_unlocks(&mut self) -> u32 {
        self.rng.gen_bool(self.unlock_probability) as u32
    }

    fn sample_notifications(&mut self) -> u32 {
        self.rng.gen_bool(self.notification_probability) as u32
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

/// Source that never reports anything. Used when simulation is turned off.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSignalSource;

impl ActivitySignalSource for SilentSignalSource {
    fn sample_unlocks(&mut self) -> u32 {
        0
    }

    fn sample_notifications(&mut self) -> u32 {
        0
    }

    fn is_simulated(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::{ActivitySignalSource, SilentSignalSource, SimulatedSignalSource};

    #[test]
    fn test_seeded_simulation_is_reproducible() {
        let mut a = SimulatedSignalSource::new(Some(7));
        let mut b = SimulatedSignalSource::new(Some(7));

        let a_samples = (0..50).map(|_| a.sample_unlocks()).collect::<Vec<_>>();
        let b_samples = (0..50).map(|_| b.sample_unlocks()).collect::<Vec<_>>();

        assert_eq!(a_samples, b_samples);
        assert!(a_samples.iter().all(|v| *v <= 1));
        assert!(a.is_simulated());
    }

    #[test]
    fn test_probabilities_at_the_edges() {
        let mut always = SimulatedSignalSource::new(Some(1)).with_probabilities(1., 1.);
        let mut never = SimulatedSignalSource::new(Some(1)).with_probabilities(0., -4.);

        for _ in 0..20 {
            assert_eq!(always.sample_unlocks(), 1);
            assert_eq!(always.sample_notifications(), 1);
            assert_eq!(never.sample_unlocks(), 0);
            assert_eq!(never.sample_notifications(), 0);
        }
    }

    #[test]
    fn test_silent_source_reports_nothing() {
        let mut source = SilentSignalSource;
        assert_eq!(source.sample_unlocks(), 0);
        assert_eq!(source.sample_notifications(), 0);
        assert!(!source.is_simulated());
    }
}
