// Environment variable loading

use std::env;

/// Environment variable loader.
///
/// Variable names map onto tree paths by replacing `__` with `:`, so
/// `APP_Features__Beta=true` with prefix `APP` becomes `Features:Beta`.
pub struct EnvLoader {
    prefix: Option<String>,
}

impl EnvLoader {
    /// Create a new environment loader
    pub fn new(prefix: Option<String>) -> Self {
        Self { prefix }
    }

    /// Load matching environment variables as `(path, value)` pairs
    pub fn load(&self) -> Vec<(String, String)> {
        // non-unicode variables are skipped rather than panicking like env::vars
        self.load_from(
            env::vars_os()
                .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?))),
        )
    }

    /// Same as [`load`](Self::load) over an explicit variable list.
    pub fn load_from<I>(&self, vars: I) -> Vec<(String, String)>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        vars.into_iter()
            .filter_map(|(key, value)| {
                let name = match self.prefix {
                    Some(ref prefix) => strip_env_prefix(&key, prefix)?.to_string(),
                    None => key,
                };
                if name.is_empty() {
                    return None;
                }
                Some((name.replace("__", ":"), value))
            })
            .collect()
    }
}

/// `APP_Features__Beta` under `APP` (or `APP_`) → `Features__Beta`.
/// The prefix must end at an underscore, so `APPX_Beta` does not match.
fn strip_env_prefix<'k>(key: &'k str, prefix: &str) -> Option<&'k str> {
    let rest = key.strip_prefix(prefix.trim_end_matches('_'))?;
    if rest.is_empty() {
        return Some(rest);
    }
    rest.strip_prefix('_')
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_double_underscore_becomes_delimiter() {
        let loader = EnvLoader::default();
        let loaded = loader.load_from(vars(&[("Features__Shop__Cart", "true")]));

        assert_eq!(loaded, vars(&[("Features:Shop:Cart", "true")]));
    }

    #[test]
    fn test_prefix_filters_and_strips() {
        let loader = EnvLoader::new(Some("MYAPP".to_string()));
        let loaded = loader.load_from(vars(&[
            ("MYAPP_Features__Beta", "false"),
            ("OTHER_Features__Beta", "true"),
            ("MYAPP_", "ignored"),
        ]));

        assert_eq!(loaded, vars(&[("Features:Beta", "false")]));
    }

    #[test]
    fn test_prefix_must_end_at_underscore() {
        let loader = EnvLoader::new(Some("MYAPP".to_string()));
        let loaded = loader.load_from(vars(&[
            ("MYAPPX_Features__Beta", "true"),
            ("MYAPP_Features__Gamma", "true"),
        ]));

        assert_eq!(loaded, vars(&[("Features:Gamma", "true")]));
    }

    #[test]
    fn test_prefix_with_trailing_underscore() {
        let loader = EnvLoader::new(Some("MYAPP_".to_string()));
        let loaded = loader.load_from(vars(&[("MYAPP_Features__Beta", "true")]));

        assert_eq!(loaded, vars(&[("Features:Beta", "true")]));
    }

    #[test]
    fn test_load_reads_process_environment() {
        // PATH is almost always set on any system
        if env::var("PATH").is_ok() {
            let loaded = EnvLoader::default().load();
            assert!(loaded.iter().any(|(k, _)| k == "PATH"));
        }
    }
}
