//! Environment step.
use super::{ActionId, Env};

/// Additional information to `Obs`.
pub trait Info {}

impl Info for () {}

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`
/// with some additional information.
///
/// An environment emits [`Step`] object at every interaction steps.
pub struct Step<E: Env> {
    /// Action.
    pub act: ActionId,

    /// Observation.
    pub obs: E::Obs,

    /// Reward.
    pub reward: f64,

    /// Flag denoting if episode is terminated.
    pub is_terminated: bool,

    /// Flag denoting if episode is truncated by the environment itself.
    pub is_truncated: bool,

    /// Information defined by user.
    pub info: E::Info,
}

impl<E: Env> Step<E> {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: E::Obs,
        act: ActionId,
        reward: f64,
        is_terminated: bool,
        is_truncated: bool,
        info: E::Info,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
            info,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated || self.is_truncated
    }
}
