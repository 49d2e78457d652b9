//! n-step return and advantage estimation.
use crate::ActionId;

/// An observed step `(o_t, a_t, r_t, v(o_t))`.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition<O> {
    /// Observation before the action was taken.
    pub state: O,

    /// Action.
    pub action: ActionId,

    /// Reward.
    pub reward: f64,

    /// Value estimate of `state` at the time the action was sampled.
    pub value: f64,
}

impl<O> Transition<O> {
    /// Constructs a [`Transition`].
    pub fn new(state: O, action: ActionId, reward: f64, value: f64) -> Self {
        Self {
            state,
            action,
            reward,
            value,
        }
    }
}

/// A labeled training sample `(o_t, a_t, R_t, R_t - v(o_t))`.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample<O> {
    /// Observation.
    pub state: O,

    /// Action.
    pub action: ActionId,

    /// Discounted n-step return.
    pub ret: f64,

    /// Advantage of the action, `ret - value`.
    pub advantage: f64,
}

/// Computes discounted n-step returns and advantages of trajectory segments.
///
/// Given a segment `(o_t, a_t, r_t, v_t), ..., (o_T, a_T, r_T, v_T)`, returns
/// are computed backwards with `R_t = r_t + gamma * R_{t+1}`. If the segment
/// ends the episode, `R_{T+1} = 0`. Otherwise the last transition is not
/// labeled; its value estimate bootstraps the return and the transition is
/// kept as the head of the next segment.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnEstimator {
    gamma: f64,
}

impl ReturnEstimator {
    /// Constructs an estimator with the discount factor `gamma`.
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    /// Turns a segment into training samples.
    ///
    /// Returns the remaining segment, which is empty if `is_terminal` and holds
    /// the bootstrap transition otherwise, and the samples. Samples are ordered
    /// from the most recent transition to the oldest one.
    ///
    /// # Panics
    ///
    /// Panics if `segment` is empty.
    pub fn estimate<O>(
        &self,
        mut segment: Vec<Transition<O>>,
        is_terminal: bool,
    ) -> (Vec<Transition<O>>, Vec<Sample<O>>) {
        assert!(!segment.is_empty(), "Estimation of an empty segment");

        let last = if is_terminal { None } else { segment.pop() };
        let mut ret = last.as_ref().map_or(0.0, |t| t.value);

        let samples = segment
            .into_iter()
            .rev()
            .map(|t| {
                ret = t.reward + ret * self.gamma;
                Sample {
                    state: t.state,
                    action: t.action,
                    ret,
                    advantage: ret - t.value,
                }
            })
            .collect();

        (last.into_iter().collect(), samples)
    }
}
