//! Environment lookups consulted while describing the plugin.

use std::collections::HashMap;

/// Primary variable holding the default vocabulary tree path.
pub const ENV_DEFAULT_GENERIC_VOCTREE: &str = "DEFAULT_GENERIC_VOCTREE";
/// Fallback variable holding the default vocabulary tree path.
pub const ENV_OPENMVG_VOCTREE: &str = "OPENMVG_VOCTREE";

/// Source of environment variables.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The process environment.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key).and_then(|v| v.into_string().ok())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Default vocabulary tree path: `DEFAULT_GENERIC_VOCTREE`, then
/// `OPENMVG_VOCTREE`. A set variable wins even when empty.
pub fn default_voctree_path(env: &impl EnvSource) -> Option<String> {
    [ENV_DEFAULT_GENERIC_VOCTREE, ENV_OPENMVG_VOCTREE]
        .into_iter()
        .find_map(|key| env.var(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn generic_voctree_wins() {
        let env = env(&[
            (ENV_DEFAULT_GENERIC_VOCTREE, "/data/generic.tree"),
            (ENV_OPENMVG_VOCTREE, "/data/openmvg.tree"),
        ]);
        assert_eq!(
            default_voctree_path(&env).as_deref(),
            Some("/data/generic.tree")
        );
    }

    #[test]
    fn falls_back_to_openmvg_voctree() {
        let env = env(&[(ENV_OPENMVG_VOCTREE, "/data/openmvg.tree")]);
        assert_eq!(
            default_voctree_path(&env).as_deref(),
            Some("/data/openmvg.tree")
        );
    }

    #[test]
    fn empty_generic_voctree_still_wins() {
        let env = env(&[
            (ENV_DEFAULT_GENERIC_VOCTREE, ""),
            (ENV_OPENMVG_VOCTREE, "/data/openmvg.tree"),
        ]);
        assert_eq!(default_voctree_path(&env).as_deref(), Some(""));
    }

    #[test]
    fn no_default_without_variables() {
        assert_eq!(default_voctree_path(&HashMap::new()), None);
    }
}
