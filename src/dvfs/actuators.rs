//! Hardware actuators invoked when a frequency plan changes.

use async_trait::async_trait;

use crate::{DvfsResult, Handle};

use super::estimator::FrequencyPlan;

/// Trait implemented by the host's clock/regulator layer.
#[async_trait]
pub trait FreqActuator: Send + Sync {
    async fn apply(&self, handle: Handle, plan: &FrequencyPlan) -> DvfsResult<()>;
}

/// No-op actuator used for environments without clock bindings.
pub struct NullActuator;

impl Default for NullActuator {
    fn default() -> Self {
        Self
    }
}

#[async_trait]
impl FreqActuator for NullActuator {
    async fn apply(&self, _handle: Handle, _plan: &FrequencyPlan) -> DvfsResult<()> {
        Ok(())
    }
}
