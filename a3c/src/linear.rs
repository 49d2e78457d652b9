//! Linear policy/value model.
use crate::corridor::CorridorObs;
use a3c_core::{
    record::{Record, RecordValue::Scalar},
    ActorCritic, Batch, Obs, Prediction, SyncModel, TrainableModel,
};
use anyhow::{bail, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

/// Observations given to [`LinearActorCritic`] as feature vectors.
pub trait Features {
    /// Returns the feature vector.
    fn features(&self) -> &Array1<f64>;
}

impl Features for CorridorObs {
    fn features(&self) -> &Array1<f64> {
        &self.0
    }
}

/// Configuration of [`LinearActorCritic`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LinearConfig {
    /// Learning rate.
    pub lr: f64,

    /// Coefficient of the entropy bonus of the policy.
    pub entropy_beta: f64,
}

impl Default for LinearConfig {
    fn default() -> Self {
        Self {
            lr: 0.1,
            entropy_beta: 0.01,
        }
    }
}

impl LinearConfig {
    /// Sets the learning rate.
    pub fn lr(mut self, v: f64) -> Self {
        self.lr = v;
        self
    }

    /// Sets the coefficient of the entropy bonus.
    pub fn entropy_beta(mut self, v: f64) -> Self {
        self.entropy_beta = v;
        self
    }
}

/// Parameters of [`LinearActorCritic`].
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct LinearWeights {
    /// Logits of the actions, `n_actions x dim`.
    pub policy: Array2<f64>,

    /// State value, `dim`.
    pub value: Array1<f64>,
}

/// A softmax policy and a value function, both linear in the features.
///
/// Training does one gradient step per batch on the mean of
/// `-A log pi(a|x) - beta H(pi(.|x)) + (R - v(x))^2 / 2`.
pub struct LinearActorCritic {
    config: LinearConfig,
    weights: LinearWeights,
}

fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exp = logits.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

impl LinearActorCritic {
    /// Constructs a model with all parameters zero, a uniform policy.
    pub fn new(config: LinearConfig, dim: usize, n_actions: usize) -> Self {
        Self {
            config,
            weights: LinearWeights {
                policy: Array2::zeros((n_actions, dim)),
                value: Array1::zeros(dim),
            },
        }
    }

    /// Loads parameters saved with [`TrainableModel::save`].
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let rdr = BufReader::new(File::open(path)?);
        let weights: LinearWeights = bincode::deserialize_from(rdr)?;
        if weights.policy.dim() != self.weights.policy.dim() {
            bail!(
                "Shape mismatch of policy weights: {:?} != {:?}",
                weights.policy.dim(),
                self.weights.policy.dim()
            );
        }
        self.weights = weights;
        Ok(())
    }

    fn forward(&self, x: &Array1<f64>) -> Result<(Array1<f64>, f64)> {
        if x.len() != self.weights.value.len() {
            bail!(
                "Expected features of dimension {}, got {}",
                self.weights.value.len(),
                x.len()
            );
        }
        let probs = softmax(&self.weights.policy.dot(x));
        let value = self.weights.value.dot(x);
        Ok((probs, value))
    }
}

impl<O: Obs + Features> ActorCritic<O> for LinearActorCritic {
    fn predict(&self, obs: &O) -> Result<Prediction> {
        let (probs, value) = self.forward(obs.features())?;
        Ok(Prediction::new(probs.to_vec(), value))
    }
}

impl SyncModel for LinearActorCritic {
    type Weights = LinearWeights;

    fn weights(&self) -> Self::Weights {
        self.weights.clone()
    }

    fn set_weights(&mut self, weights: &Self::Weights) {
        self.weights.clone_from(weights);
    }
}

impl<O: Obs + Features> TrainableModel<O> for LinearActorCritic {
    fn train_on_batch(&mut self, batch: &Batch<O>) -> Result<Record> {
        if batch.is_empty() {
            bail!("Empty batch");
        }
        let (states, actions, advantages) = batch.inputs();
        let (returns, _) = batch.targets();
        let n_actions = self.weights.policy.nrows();
        let beta = self.config.entropy_beta;

        let mut grad_policy = Array2::<f64>::zeros(self.weights.policy.raw_dim());
        let mut grad_value = Array1::<f64>::zeros(self.weights.value.raw_dim());
        let (mut policy_loss, mut value_loss, mut entropy) = (0.0, 0.0, 0.0);

        let samples = states.iter().zip(actions).zip(advantages).zip(returns);
        for (((obs, &act), &adv), &ret) in samples {
            if act >= n_actions {
                bail!("Action {} out of {} actions", act, n_actions);
            }
            let x = obs.features();
            let (probs, value) = self.forward(x)?;
            let log_probs = probs.mapv(|p| p.max(f64::MIN_POSITIVE).ln());
            let h = -(&probs * &log_probs).sum();

            for k in 0..n_actions {
                let taken = if k == act { 1.0 } else { 0.0 };
                let g = -adv * (taken - probs[k]) + beta * probs[k] * (log_probs[k] + h);
                grad_policy.row_mut(k).scaled_add(g, x);
            }
            grad_value.scaled_add(value - ret, x);

            policy_loss -= adv * log_probs[act];
            value_loss += 0.5 * (ret - value).powi(2);
            entropy += h;
        }

        let n = batch.len() as f64;
        self.weights.policy.scaled_add(-self.config.lr / n, &grad_policy);
        self.weights.value.scaled_add(-self.config.lr / n, &grad_value);

        let (policy_loss, value_loss, entropy) = (policy_loss / n, value_loss / n, entropy / n);
        Ok(Record::from_slice(&[
            ("loss", Scalar((policy_loss + value_loss - beta * entropy) as f32)),
            ("policy_loss", Scalar(policy_loss as f32)),
            ("loss_value", Scalar(value_loss as f32)),
            ("entropy", Scalar(entropy as f32)),
        ]))
    }

    fn save(&self, path: &Path) -> Result<()> {
        let wtr = BufWriter::new(File::create(path)?);
        bincode::serialize_into(wtr, &self.weights)?;
        Ok(())
    }
}
