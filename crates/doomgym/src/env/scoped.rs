//! Close-on-drop guard for environments.

use super::Env;
use std::ops::{Deref, DerefMut};

/// Owns an environment and closes it when dropped.
///
/// The environment can still be released early with [`Scoped::close`]; the
/// guard then skips closing it again on drop.
///
/// ```rust,ignore
/// let mut env = Scoped::new(DoomEnv::new(BasicScenario::new(), config)?);
/// env.reset(None, None)?;
/// // simulator released here
/// ```
pub struct Scoped<E: Env> {
    env: E,
    closed: bool,
}

impl<E: Env> Scoped<E> {
    pub fn new(env: E) -> Self {
        Self { env, closed: false }
    }

    /// Close the environment now instead of at the end of the scope
    pub fn close(mut self) {
        self.env.close();
        self.closed = true;
    }
}

impl<E: Env> Deref for Scoped<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.env
    }
}

impl<E: Env> DerefMut for Scoped<E> {
    fn deref_mut(&mut self) -> &mut E {
        &mut self.env
    }
}

impl<E: Env> Drop for Scoped<E> {
    fn drop(&mut self) {
        if !self.closed {
            self.env.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{EnvInfo, ResetOptions, StepResult};
    use crate::spaces::Discrete;
    use crate::Result;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingEnv {
        closes: Rc<Cell<u32>>,
        space: Discrete,
    }

    impl Env for CountingEnv {
        type Observation = i64;
        type Action = i64;
        type ObservationSpace = Discrete;
        type ActionSpace = Discrete;

        fn observation_space(&self) -> &Discrete {
            &self.space
        }

        fn action_space(&self) -> &Discrete {
            &self.space
        }

        fn reset(
            &mut self,
            _seed: Option<u64>,
            _options: Option<&ResetOptions>,
        ) -> Result<(i64, EnvInfo)> {
            Ok((0, EnvInfo::new()))
        }

        fn step(&mut self, action: i64) -> Result<StepResult<i64>> {
            Ok(StepResult {
                observation: action,
                reward: 0.0,
                terminated: true,
                truncated: false,
                info: EnvInfo::new(),
            })
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    fn counting() -> (CountingEnv, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let env = CountingEnv {
            closes: Rc::clone(&closes),
            space: Discrete::new(1),
        };
        (env, closes)
    }

    #[test]
    fn test_closes_on_drop() {
        let (env, closes) = counting();
        {
            let mut scoped = Scoped::new(env);
            scoped.step(0).unwrap();
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_early_close_is_not_repeated() {
        let (env, closes) = counting();
        let scoped = Scoped::new(env);
        scoped.close();
        assert_eq!(closes.get(), 1);
    }
}
