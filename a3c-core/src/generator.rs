//! Assembly of training batches from the experience of many players.
mod config;
use crate::{
    error::A3cError, record::Recorder, ActionId, ActorCritic, CategoricalSampler, Env, Player,
    PlayerConfig, Sample,
};
use anyhow::Result;
pub use config::BatchGeneratorConfig;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::VecDeque;

/// A batch of training samples.
///
/// The samples are stored as parallel sequences; the `i`-th elements of all
/// sequences belong to the same sample.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<O> {
    states: Vec<O>,
    actions: Vec<ActionId>,
    returns: Vec<f64>,
    advantages: Vec<f64>,
}

impl<O> Batch<O> {
    /// Transposes samples into a batch, keeping their order.
    pub fn from_samples(samples: impl IntoIterator<Item = Sample<O>>) -> Self {
        let samples = samples.into_iter();
        let n = samples.size_hint().0;
        let mut batch = Self {
            states: Vec::with_capacity(n),
            actions: Vec::with_capacity(n),
            returns: Vec::with_capacity(n),
            advantages: Vec::with_capacity(n),
        };
        for s in samples {
            batch.states.push(s.state);
            batch.actions.push(s.action);
            batch.returns.push(s.ret);
            batch.advantages.push(s.advantage);
        }
        batch
    }

    /// Returns the number of samples.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns `true` if the batch has no sample.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Observations.
    pub fn states(&self) -> &[O] {
        &self.states
    }

    /// Actions.
    pub fn actions(&self) -> &[ActionId] {
        &self.actions
    }

    /// n-step returns.
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Advantages.
    pub fn advantages(&self) -> &[f64] {
        &self.advantages
    }

    /// Inputs of an optimization step, `(states, actions, advantages)`.
    pub fn inputs(&self) -> (&[O], &[ActionId], &[f64]) {
        (&self.states, &self.actions, &self.advantages)
    }

    /// Targets of an optimization step.
    ///
    /// The value head and the policy head are both given the returns.
    pub fn targets(&self) -> (&[f64], &[f64]) {
        (&self.returns, &self.returns)
    }

    /// Unpacks the batch into inputs and targets.
    #[allow(clippy::type_complexity)]
    pub fn unpack(self) -> ((Vec<O>, Vec<ActionId>, Vec<f64>), (Vec<f64>, Vec<f64>)) {
        let returns = self.returns.clone();
        (
            (self.states, self.actions, self.advantages),
            (self.returns, returns),
        )
    }

    /// Mean of the returns in the batch.
    pub fn mean_return(&self) -> f64 {
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }
}

/// Advances players in round-robin order and slices their samples into batches.
///
/// In a round, every player takes one step, in the order of their indices, and
/// the samples they produce are appended to a pool. Batches are the leading
/// `batch_size` samples of the pool; the rest is carried over. A batch can mix
/// samples of different players and episodes.
pub struct BatchGenerator<E: Env, S = StdRng> {
    players: Vec<Player<E>>,
    sampler: S,
    batch_size: usize,
    pool: VecDeque<Sample<E::Obs>>,
}

impl<E: Env> BatchGenerator<E, StdRng> {
    /// Builds players and a generator sampling actions with a seeded [`StdRng`].
    pub fn build(
        config: &BatchGeneratorConfig,
        player_config: &PlayerConfig,
        env_config: &E::Config,
    ) -> Result<Self> {
        config.validate()?;
        let players = (0..config.n_players)
            .map(|ix| {
                let seed = config.seed.wrapping_add(ix as u64) as i64;
                Player::build(player_config, env_config, ix, seed)
            })
            .collect::<Result<Vec<_>>>()?;
        let sampler = StdRng::seed_from_u64(config.seed);

        Self::new(players, config.batch_size, sampler)
    }
}

impl<E: Env, S: CategoricalSampler> BatchGenerator<E, S> {
    /// Constructs a generator with the given players and sampler.
    pub fn new(players: Vec<Player<E>>, batch_size: usize, sampler: S) -> Result<Self> {
        if players.is_empty() {
            return Err(A3cError::InvalidConfig("no players".to_string()).into());
        }
        if batch_size == 0 {
            return Err(A3cError::InvalidConfig("batch_size must be positive".to_string()).into());
        }

        Ok(Self {
            players,
            sampler,
            batch_size,
            pool: VecDeque::with_capacity(2 * batch_size),
        })
    }

    /// Returns the players.
    pub fn players(&self) -> &[Player<E>] {
        &self.players
    }

    /// Returns the batch size.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Returns the number of samples waiting for a batch.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Advances every player by one step and pools the samples.
    fn round<P>(&mut self, policy: &P, recorder: &mut dyn Recorder) -> Result<()>
    where
        P: ActorCritic<E::Obs> + ?Sized,
    {
        for player in self.players.iter_mut() {
            let samples = player.advance(1, policy, &mut self.sampler, recorder)?;
            self.pool.extend(samples);
        }
        Ok(())
    }

    /// Returns the next batch, running rounds until enough samples are pooled.
    ///
    /// Players act with `policy` and write episode ends to `recorder`.
    pub fn next_batch<P>(
        &mut self,
        policy: &P,
        recorder: &mut dyn Recorder,
    ) -> Result<Batch<E::Obs>>
    where
        P: ActorCritic<E::Obs> + ?Sized,
    {
        while self.pool.len() < self.batch_size {
            self.round(policy, recorder)?;
        }
        Ok(Batch::from_samples(self.pool.drain(..self.batch_size)))
    }

    /// Returns a never-ending iterator of batches.
    pub fn batches<'a, P>(
        &'a mut self,
        policy: &'a P,
        recorder: &'a mut dyn Recorder,
    ) -> Batches<'a, E, S, P>
    where
        P: ActorCritic<E::Obs> + ?Sized,
    {
        Batches {
            generator: self,
            policy,
            recorder,
        }
    }
}

/// Iterator of batches, see [`BatchGenerator::batches`].
pub struct Batches<'a, E: Env, S, P: ?Sized> {
    generator: &'a mut BatchGenerator<E, S>,
    policy: &'a P,
    recorder: &'a mut dyn Recorder,
}

impl<'a, E, S, P> Iterator for Batches<'a, E, S, P>
where
    E: Env,
    S: CategoricalSampler,
    P: ActorCritic<E::Obs> + ?Sized,
{
    type Item = Result<Batch<E::Obs>>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generator.next_batch(self.policy, &mut *self.recorder))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::{ConstantPolicy, CyclicSampler, DummyEnv, DummyEnvConfig, DummyObs},
        record::{BufferedRecorder, NullRecorder},
    };

    fn generator(
        n_players: usize,
        batch_size: usize,
        reward_steps: usize,
        episode_len: Option<usize>,
    ) -> BatchGenerator<DummyEnv, CyclicSampler> {
        let config = PlayerConfig::default().reward_steps(reward_steps).gamma(1.0);
        let env_config = DummyEnvConfig { episode_len };
        let players = (0..n_players)
            .map(|ix| Player::build(&config, &env_config, ix, ix as i64).unwrap())
            .collect();
        BatchGenerator::new(players, batch_size, CyclicSampler::new(vec![0])).unwrap()
    }

    #[test]
    fn test_batches_have_exact_size() {
        let mut gen = generator(3, 7, 2, Some(5));
        let policy = ConstantPolicy::new(vec![1.0], 0.0);
        let mut recorder = NullRecorder::new();

        for batch in gen.batches(&policy, &mut recorder).take(20) {
            let batch = batch.unwrap();
            assert_eq!(batch.len(), 7);
            assert_eq!(batch.states().len(), 7);
            assert_eq!(batch.actions().len(), 7);
            assert_eq!(batch.returns().len(), 7);
            assert_eq!(batch.advantages().len(), 7);
        }
        assert!(gen.pool_len() < 7 + 2 * 3);
    }

    #[test]
    fn test_round_robin_fifo_order() {
        // Two players flush 2 samples each every 3 steps
        let mut gen = generator(2, 3, 2, None);
        let policy = ConstantPolicy::new(vec![1.0], 0.0);
        let mut recorder = NullRecorder::new();

        let b1 = gen.next_batch(&policy, &mut recorder).unwrap();
        // After 3 rounds the pool holds [p0: t1, t0, p1: t1, t0]
        assert_eq!(
            b1.states(),
            &[
                DummyObs { episode: 1, t: 1 },
                DummyObs { episode: 1, t: 0 },
                DummyObs { episode: 1, t: 1 },
            ]
        );
        assert_eq!(gen.pool_len(), 1);

        let b2 = gen.next_batch(&policy, &mut recorder).unwrap();
        // The carried sample of player 1 comes first
        assert_eq!(b2.states()[0], DummyObs { episode: 1, t: 0 });
        assert_eq!(b2.states()[1], DummyObs { episode: 1, t: 3 });
        assert_eq!(b2.states()[2], DummyObs { episode: 1, t: 2 });
        assert_eq!(gen.players()[0].step_index(), 5);
        assert_eq!(gen.players()[1].step_index(), 5);
    }

    #[test]
    fn test_batch_inputs_and_targets() {
        let mut gen = generator(1, 4, 5, Some(4));
        let policy = ConstantPolicy::new(vec![1.0], 1.0);
        let mut recorder = BufferedRecorder::new();

        let batch = gen.next_batch(&policy, &mut recorder).unwrap();
        // One terminal flush of rewards 1, 2, 3, 4
        assert_eq!(batch.returns(), &[4.0, 7.0, 9.0, 10.0]);
        assert_eq!(batch.advantages(), &[3.0, 6.0, 8.0, 9.0]);
        assert_eq!(batch.mean_return(), 7.5);
        assert_eq!(recorder.len(), 1);

        let (states, actions, advantages) = batch.inputs();
        assert_eq!(states.len(), 4);
        assert_eq!(actions, &[0, 0, 0, 0]);
        assert_eq!(advantages, batch.advantages());
        let (value_target, policy_target) = batch.targets();
        assert_eq!(value_target, policy_target);

        let ((_, _, advantages), (r1, r2)) = batch.clone().unpack();
        assert_eq!(advantages, vec![3.0, 6.0, 8.0, 9.0]);
        assert_eq!(r1, r2);
        assert_eq!(r1, batch.returns().to_vec());
    }

    #[test]
    fn test_build_validates_config() {
        let env_config = DummyEnvConfig { episode_len: None };
        let player_config = PlayerConfig::default();
        let config = BatchGeneratorConfig::default().n_players(0);
        assert!(BatchGenerator::<DummyEnv>::build(&config, &player_config, &env_config).is_err());

        let config = BatchGeneratorConfig::default().n_players(4).batch_size(8);
        let gen = BatchGenerator::<DummyEnv>::build(&config, &player_config, &env_config).unwrap();
        assert_eq!(gen.players().len(), 4);
        assert_eq!(gen.players()[3].index(), 3);
        assert_eq!(gen.batch_size(), 8);
    }

    #[test]
    fn test_build_with_largest_seed() {
        let env_config = DummyEnvConfig { episode_len: None };
        let config = BatchGeneratorConfig::default().n_players(3).seed(u64::MAX);
        let gen = BatchGenerator::<DummyEnv>::build(&config, &PlayerConfig::default(), &env_config);
        assert_eq!(gen.unwrap().players().len(), 3);
    }
}
