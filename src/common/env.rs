use std::env;
use std::error::Error;
use std::str::FromStr;

pub trait FromEnv: Sized {
    fn from_env(env_var: &str) -> anyhow::Result<Self>;

    /// Like [`FromEnv::from_env`], but falls back to `default` when the variable is unset.
    /// A value that is present but unparsable is still an error.
    fn from_env_or(env_var: &str, default: Self) -> anyhow::Result<Self>;
}

impl<T: FromStr> FromEnv for T
where
    <T as FromStr>::Err: 'static + Error + Send + Sync,
{
    fn from_env(env_var: &str) -> anyhow::Result<Self> {
        let value = env::var(env_var)?;
        Ok(T::from_str(&value)?)
    }

    fn from_env_or(env_var: &str, default: Self) -> anyhow::Result<Self> {
        match env::var(env_var) {
            Ok(value) => Ok(T::from_str(&value)?),
            Err(env::VarError::NotPresent) => Ok(default),
            Err(e) => Err(e.into()),
        }
    }
}

/// Parses a comma separated list, skipping blank entries.
pub fn list_from_env<T: FromStr>(env_var: &str) -> anyhow::Result<Vec<T>>
where
    <T as FromStr>::Err: 'static + Error + Send + Sync,
{
    let value = match env::var(env_var) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => return Ok(vec![]),
        Err(e) => return Err(e.into()),
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| T::from_str(item).map_err(anyhow::Error::from))
        .collect()
}
