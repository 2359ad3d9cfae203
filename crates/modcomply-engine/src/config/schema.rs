use serde::Deserialize;

use modcomply_core::error::{ModcomplyError, Result};
use modcomply_core::Address;

use crate::compliance::MAX_MODULES;
use crate::module::ModuleKind;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    pub version: u32,

    pub engine: EngineSection,

    #[serde(default)]
    pub modules: Vec<ModuleConfig>,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ModcomplyError::UnsupportedVersion);
        }

        self.engine.validate()?;

        if self.modules.len() > self.engine.max_modules {
            return Err(ModcomplyError::BadRequest(format!(
                "{} modules configured but engine.max_modules is {}",
                self.modules.len(),
                self.engine.max_modules
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Engine owner; also the deployer and owner of configured modules.
    pub owner: Address,

    #[serde(default = "default_max_modules")]
    pub max_modules: usize,

    /// Token allowed to drive post-transfer hooks.
    #[serde(default)]
    pub token: Option<Address>,
}

impl EngineSection {
    pub fn validate(&self) -> Result<()> {
        if self.owner.is_zero() {
            return Err(ModcomplyError::BadRequest(
                "engine.owner must not be the null identity".into(),
            ));
        }
        if !(1..=MAX_MODULES).contains(&self.max_modules) {
            return Err(ModcomplyError::BadRequest(format!(
                "engine.max_modules must be between 1 and {MAX_MODULES}"
            )));
        }
        if self.token.is_some_and(|t| t.is_zero()) {
            return Err(ModcomplyError::BadRequest(
                "engine.token must not be the null identity".into(),
            ));
        }
        Ok(())
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}
fn default_max_modules() -> usize {
    MAX_MODULES
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModuleConfig {
    pub kind: ModuleKind,

    /// Seed allow-list, routed through the engine after binding.
    #[serde(default)]
    pub allow: Vec<Address>,
}
