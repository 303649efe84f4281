use chvote::PublicParameters;
use log::LevelFilter;
use std::env::var;

pub struct Config {
    pub params_path: Option<String>,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Self {
        let params_path = match var("CHVOTE_PARAMS") {
            Ok(val) => Some(crate::expand(&val)),
            Err(_e) => None,
        };

        let log_level = match var("CHVOTE_LOG_LEVEL") {
            Ok(val) => val.parse().unwrap_or_else(|_| {
                eprintln!("chvote: invalid CHVOTE_LOG_LEVEL {}, using warn", val);
                LevelFilter::Warn
            }),
            Err(_e) => LevelFilter::Warn,
        };

        Config {
            params_path,
            log_level,
        }
    }

    /// Load public parameters from `path`, falling back to `CHVOTE_PARAMS`.
    ///
    /// Returns `Ok(None)` when neither is set.
    pub fn load_params(&self, path: Option<&str>) -> Result<Option<PublicParameters>, String> {
        let path = match path.map(crate::expand).or_else(|| self.params_path.clone()) {
            Some(path) => path,
            None => return Ok(None),
        };

        let json = std::fs::read_to_string(&path)
            .map_err(|e| format!("unable to read {}: {}", path, e))?;
        let params = PublicParameters::from_json(&json)
            .map_err(|e| format!("invalid parameters in {}: {}", path, e))?;
        Ok(Some(params))
    }
}
