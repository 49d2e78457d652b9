//! Training loop.
mod config;
use crate::{
    record::{AggregateRecorder, BufferedRecorder, RecordValue::Scalar},
    ActorCritic, BatchGenerator, BatchGeneratorConfig, CategoricalSampler, Env, PlayerConfig,
    SyncModel, TrainableModel,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{debug, info, warn};
use std::{
    path::Path,
    time::{Duration, SystemTime},
};

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// Two models take part in training. The acting model, implementing
/// [`ActorCritic`], is shared by the players to sample actions. The trained
/// model, implementing [`TrainableModel`], is updated with the batches.
/// Parameters flow from the trained model to the acting model with
/// [`SyncModel`].
///
/// ```mermaid
/// graph LR
///     A[Acting model]-->|Prediction|B[Player]
///     B -->|Sample|C[BatchGenerator]
///     C -->|Batch|D[Trained model]
///     D -->|Weights|A
/// ```
///
/// # Training loop
///
/// For `opt_steps` in `0..max_opts`:
///
/// 1. Take the next batch from the [`BatchGenerator`]. Episode ends of the
///    players are stored in the recorder.
/// 2. Do an optimization step of the trained model with the batch.
/// 3. If `opt_steps % record_interval == 0`, store the metrics of the
///    optimization step, the mean of the returns in the batch as `"reward"`
///    and optimization steps per second as `"opt_steps_per_sec"`.
/// 4. If `opt_steps % sync_interval == 0`, copy the parameters of the trained
///    model into the acting model.
/// 5. If `opt_steps % save_interval == 0` and `opt_steps > 0`, save the
///    trained model as `(model_dir)/model-(opt_steps)`.
/// 6. If `opt_steps % flush_record_interval == 0`, flush the recorder.
///
/// After the last optimization step the recorder is flushed once more, so
/// that records stored since the last periodic flush are written.
pub struct Trainer<E: Env> {
    /// Configuration of the environments of the players.
    env_config: E::Config,

    /// Configuration of the players.
    player_config: PlayerConfig,

    /// Configuration of the batch generator.
    generator_config: BatchGeneratorConfig,

    /// Where to save the trained model.
    model_dir: Option<String>,

    /// The number of optimization steps.
    max_opts: usize,

    /// Interval of model synchronization in optimization steps.
    sync_interval: usize,

    /// Interval of recording metrics in optimization steps.
    record_interval: usize,

    /// Interval of flushing records in optimization steps.
    flush_record_interval: usize,

    /// Interval of saving the model in optimization steps.
    save_interval: usize,

    /// Optimization steps for computing optimization steps per second.
    opt_steps_for_ops: usize,

    /// Timer for computing for optimization steps per second.
    timer_for_ops: Duration,
}

impl<E: Env> Trainer<E> {
    /// Constructs a trainer.
    pub fn build(
        config: TrainerConfig,
        generator_config: BatchGeneratorConfig,
        player_config: PlayerConfig,
        env_config: E::Config,
    ) -> Result<Self> {
        config.validate()?;
        generator_config.validate()?;
        player_config.validate()?;

        Ok(Self {
            env_config,
            player_config,
            generator_config,
            model_dir: config.model_dir,
            max_opts: config.max_opts,
            sync_interval: config.sync_interval,
            record_interval: config.record_interval,
            flush_record_interval: config.flush_record_interval,
            save_interval: config.save_interval,
            opt_steps_for_ops: 0,
            timer_for_ops: Duration::new(0, 0),
        })
    }

    fn save_model<A: TrainableModel<E::Obs>>(agent: &A, model_dir: &str, steps: usize) {
        let path = Path::new(model_dir).join(format!("model-{:06}", steps));
        let result = std::fs::create_dir_all(model_dir)
            .map_err(anyhow::Error::from)
            .and_then(|_| agent.save(&path));
        match result {
            Ok(()) => info!("Saved the model in {:?}.", &path),
            Err(e) => warn!("Failed to save model in {:?}: {}", &path, e),
        }
    }

    /// Returns optimization steps per second, then reset the internal counter.
    fn opt_steps_per_sec(&mut self) -> f32 {
        let secs = self.timer_for_ops.as_secs_f32();
        let osps = if secs > 0.0 {
            self.opt_steps_for_ops as f32 / secs
        } else {
            0.0
        };
        self.opt_steps_for_ops = 0;
        self.timer_for_ops = Duration::new(0, 0);
        osps
    }

    /// Train the model with a fresh set of players.
    pub fn train<A, P, R>(
        &mut self,
        train_model: &mut A,
        run_model: &mut P,
        recorder: &mut R,
    ) -> Result<()>
    where
        A: TrainableModel<E::Obs>,
        P: ActorCritic<E::Obs> + SyncModel<Weights = A::Weights>,
        R: AggregateRecorder + ?Sized,
    {
        let mut generator =
            BatchGenerator::build(&self.generator_config, &self.player_config, &self.env_config)?;
        info!(
            "Starts training with {} players, batch size {}",
            generator.players().len(),
            generator.batch_size()
        );
        self.train_with_generator(&mut generator, train_model, run_model, recorder)
    }

    /// Train the model with batches from the given generator.
    pub fn train_with_generator<S, A, P, R>(
        &mut self,
        generator: &mut BatchGenerator<E, S>,
        train_model: &mut A,
        run_model: &mut P,
        recorder: &mut R,
    ) -> Result<()>
    where
        S: CategoricalSampler,
        A: TrainableModel<E::Obs>,
        P: ActorCritic<E::Obs> + SyncModel<Weights = A::Weights>,
        R: AggregateRecorder + ?Sized,
    {
        let mut episodes = BufferedRecorder::new();

        for opt_steps in 0..self.max_opts {
            let batch = generator.next_batch(&*run_model, &mut episodes)?;
            for record in episodes.drain() {
                recorder.store(record);
            }

            let timer = SystemTime::now();
            let mut record = train_model.train_on_batch(&batch)?;
            self.timer_for_ops += timer.elapsed()?;
            self.opt_steps_for_ops += 1;

            if opt_steps % self.record_interval == 0 {
                record.insert("reward", Scalar(batch.mean_return() as _));
                record.insert("opt_steps_per_sec", Scalar(self.opt_steps_per_sec()));
                recorder.store(record);
            }

            if opt_steps % self.sync_interval == 0 {
                run_model.set_weights(&train_model.weights());
                debug!("Models synchronized, iter {}", opt_steps);
            }

            if self.save_interval > 0 && opt_steps % self.save_interval == 0 && opt_steps > 0 {
                if let Some(model_dir) = self.model_dir.as_ref() {
                    Self::save_model(train_model, model_dir, opt_steps);
                }
            }

            if opt_steps % self.flush_record_interval == 0 {
                recorder.flush(opt_steps as _);
            }
        }

        // Records stored after the last periodic flush
        if self.max_opts > 0 {
            recorder.flush((self.max_opts - 1) as _);
        }

        Ok(())
    }
}
