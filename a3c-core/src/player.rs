//! Players acting in their own environments.
mod config;
use crate::{
    record::{Record, RecordValue, Recorder},
    ActorCritic, CategoricalSampler, Env, Prediction, ReturnEstimator, Sample, Transition,
};
use anyhow::Result;
pub use config::PlayerConfig;
use log::info;

/// Owns an environment and turns its trajectory into training samples.
///
/// A player keeps the transitions observed since the last flush in its memory.
/// The memory is flushed through a [`ReturnEstimator`]:
///
/// * as a non-terminal segment when it holds `reward_steps + 1` transitions.
///   The last transition stays in the memory and bootstraps the returns.
/// * as a terminal segment when the episode ends, either because the
///   environment says so or because the step counter of the episode exceeds
///   `max_steps`. In both cases the return after the last transition is zero.
pub struct Player<E: Env> {
    index: usize,
    env: E,
    state: E::Obs,
    memory: Vec<Transition<E::Obs>>,
    estimator: ReturnEstimator,
    reward_steps: usize,
    max_steps: usize,
    step_index: usize,
    episode_reward: f64,
}

impl<E: Env> Player<E> {
    /// Builds a player and its environment.
    ///
    /// `index` identifies the player in logs.
    pub fn build(
        config: &PlayerConfig,
        env_config: &E::Config,
        index: usize,
        seed: i64,
    ) -> Result<Self> {
        let env = E::build(env_config, seed)?;
        Self::new(config, env, index)
    }

    /// Constructs a player with the given environment and resets it.
    pub fn new(config: &PlayerConfig, mut env: E, index: usize) -> Result<Self> {
        config.validate()?;
        let state = env.reset()?;

        Ok(Self {
            index,
            env,
            state,
            memory: Vec::with_capacity(config.reward_steps + 1),
            estimator: ReturnEstimator::new(config.gamma),
            reward_steps: config.reward_steps,
            max_steps: config.max_steps,
            step_index: 0,
            episode_reward: 0.0,
        })
    }

    /// Returns the index of the player.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the environment.
    pub fn env(&self) -> &E {
        &self.env
    }

    /// Returns the current observation.
    pub fn state(&self) -> &E::Obs {
        &self.state
    }

    /// Returns the transitions not yet turned into samples.
    pub fn memory(&self) -> &[Transition<E::Obs>] {
        &self.memory
    }

    /// Returns the number of steps taken in the current episode.
    pub fn step_index(&self) -> usize {
        self.step_index
    }

    /// Returns the sum of rewards in the current episode.
    pub fn episode_reward(&self) -> f64 {
        self.episode_reward
    }

    /// Takes up to `max_steps_to_run` environment steps.
    ///
    /// Returns the samples produced by the flushes during the call, each flush
    /// contributing its samples from the most recent one. The call returns
    /// early when an episode ends; the episode end is logged and written to
    /// `recorder` as `episode_reward` and `episode_steps`.
    pub fn advance<P, S>(
        &mut self,
        max_steps_to_run: usize,
        policy: &P,
        sampler: &mut S,
        recorder: &mut dyn Recorder,
    ) -> Result<Vec<Sample<E::Obs>>>
    where
        P: ActorCritic<E::Obs> + ?Sized,
        S: CategoricalSampler + ?Sized,
    {
        let mut samples = vec![];

        for _ in 0..max_steps_to_run {
            self.step_index += 1;
            let Prediction { probs, value } = policy.predict(&self.state)?;
            let action = sampler.draw(&probs)?;
            let step = self.env.step(action)?;

            self.episode_reward += step.reward;
            self.memory.push(Transition::new(
                self.state.clone(),
                action,
                step.reward,
                value,
            ));

            if step.is_done() || self.step_index > self.max_steps {
                samples.extend(self.flush(true));
                self.end_episode(recorder)?;
                break;
            } else if self.memory.len() == self.reward_steps + 1 {
                samples.extend(self.flush(false));
            }

            self.state = step.obs;
        }

        Ok(samples)
    }

    fn flush(&mut self, is_terminal: bool) -> Vec<Sample<E::Obs>> {
        let segment = std::mem::take(&mut self.memory);
        let (rest, samples) = self.estimator.estimate(segment, is_terminal);
        self.memory = rest;
        samples
    }

    fn end_episode(&mut self, recorder: &mut dyn Recorder) -> Result<()> {
        info!(
            "{:3}: Episode done @ step {}: sum reward {}",
            self.index, self.step_index, self.episode_reward as i64
        );
        recorder.write(Record::from_slice(&[
            ("episode_reward", RecordValue::Scalar(self.episode_reward as _)),
            ("episode_steps", RecordValue::Scalar(self.step_index as _)),
        ]));

        self.state = self.env.reset()?;
        self.episode_reward = 0.0;
        self.step_index = 0;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        dummy::{ConstantPolicy, CyclicSampler, DummyEnv, DummyEnvConfig, DummyObs},
        record::{BufferedRecorder, NullRecorder},
    };
    use test_log::test;

    fn player(config: PlayerConfig, episode_len: Option<usize>) -> Player<DummyEnv> {
        let env_config = DummyEnvConfig { episode_len };
        Player::build(&config, &env_config, 0, 0).unwrap()
    }

    fn obs(episode: usize, t: usize) -> DummyObs {
        DummyObs { episode, t }
    }

    #[test]
    fn test_non_terminal_flush() {
        let config = PlayerConfig::default().reward_steps(3).gamma(0.5);
        let mut player = player(config, None);
        let policy = ConstantPolicy::new(vec![0.5, 0.5], 2.0);
        let mut sampler = CyclicSampler::new(vec![0, 1]);
        let mut recorder = NullRecorder::new();

        // Three steps fill the memory up to reward_steps
        let samples = player
            .advance(3, &policy, &mut sampler, &mut recorder)
            .unwrap();
        assert!(samples.is_empty());
        assert_eq!(player.memory().len(), 3);

        // The fourth step triggers a flush, the last transition bootstraps
        let samples = player
            .advance(1, &policy, &mut sampler, &mut recorder)
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(player.memory().len(), 1);
        assert_eq!(player.memory()[0].state, obs(1, 3));
        assert_eq!(player.memory()[0].reward, 4.0);

        // Rewards are 1, 2, 3 and the bootstrap value is 2
        assert_eq!(samples[0].state, obs(1, 2));
        assert_eq!(samples[0].action, 0);
        assert_eq!(samples[0].ret, 3.0 + 0.5 * 2.0);
        assert_eq!(samples[1].state, obs(1, 1));
        assert_eq!(samples[1].action, 1);
        assert_eq!(samples[1].ret, 2.0 + 0.5 * 4.0);
        assert_eq!(samples[2].state, obs(1, 0));
        assert_eq!(samples[2].ret, 1.0 + 0.5 * 4.0);
        for s in samples.iter() {
            assert_eq!(s.advantage, s.ret - 2.0);
        }
        assert_eq!(player.step_index(), 4);
        assert_eq!(player.state(), &obs(1, 4));

        // Later flushes label reward_steps transitions each
        let samples = player
            .advance(3, &policy, &mut sampler, &mut recorder)
            .unwrap();
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[2].state, obs(1, 3));
        assert_eq!(player.memory().len(), 1);
    }

    #[test]
    fn test_episode_end_flushes_terminal_and_stops() {
        let config = PlayerConfig::default().reward_steps(5).gamma(1.0);
        let mut player = player(config, Some(3));
        let policy = ConstantPolicy::new(vec![1.0], 10.0);
        let mut sampler = CyclicSampler::new(vec![0]);
        let mut recorder = BufferedRecorder::new();

        let samples = player
            .advance(10, &policy, &mut sampler, &mut recorder)
            .unwrap();

        // Stopped at the end of the episode
        assert_eq!(player.env().actions().len(), 3);
        assert_eq!(samples.len(), 3);
        assert!(player.memory().is_empty());
        assert_eq!(samples[0].ret, 3.0);
        assert_eq!(samples[1].ret, 5.0);
        assert_eq!(samples[2].ret, 6.0);
        assert_eq!(samples[2].advantage, -4.0);

        // Counters and state are reset
        assert_eq!(player.step_index(), 0);
        assert_eq!(player.episode_reward(), 0.0);
        assert_eq!(player.env().n_resets(), 2);
        assert_eq!(player.state(), &obs(2, 0));

        // Episode end is recorded
        assert_eq!(recorder.len(), 1);
        let record = recorder.iter().next().unwrap();
        assert_eq!(record.get_scalar("episode_reward").unwrap(), 6.0);
        assert_eq!(record.get_scalar("episode_steps").unwrap(), 3.0);
    }

    #[test]
    fn test_truncation_flushes_as_terminal() {
        let config = PlayerConfig::default()
            .reward_steps(10)
            .gamma(1.0)
            .max_steps(2);
        let mut player = player(config, None);
        let policy = ConstantPolicy::new(vec![1.0], 100.0);
        let mut sampler = CyclicSampler::new(vec![0]);
        let mut recorder = BufferedRecorder::new();

        let samples = player
            .advance(5, &policy, &mut sampler, &mut recorder)
            .unwrap();

        // The episode is cut off at step 3 and the value 100 is not used as bootstrap
        assert_eq!(player.env().actions().len(), 3);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0].ret, 3.0);
        assert_eq!(samples[1].ret, 5.0);
        assert_eq!(samples[2].ret, 6.0);
        assert!(player.memory().is_empty());
        assert_eq!(player.step_index(), 0);
        assert_eq!(player.episode_reward(), 0.0);
        assert_eq!(player.state(), &obs(2, 0));
        assert_eq!(recorder.len(), 1);
    }

    #[test]
    fn test_episode_end_right_after_flush() {
        // Memory holds only the bootstrap transition when the episode ends
        let config = PlayerConfig::default().reward_steps(2).gamma(1.0);
        let mut player = player(config, Some(4));
        let policy = ConstantPolicy::new(vec![1.0], 0.0);
        let mut sampler = CyclicSampler::new(vec![0]);
        let mut recorder = NullRecorder::new();

        let mut n_samples = 0;
        for _ in 0..4 {
            n_samples += player
                .advance(1, &policy, &mut sampler, &mut recorder)
                .unwrap()
                .len();
        }

        // Each transition of the episode is labeled exactly once
        assert_eq!(n_samples, 4);
        assert!(player.memory().is_empty());
    }
}
