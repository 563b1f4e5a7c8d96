use std::env;
use std::env::VarError;
use std::fmt::{Display, Formatter};
use std::time::Duration;

const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECONDS: u64 = 30;

/// Connection settings of the PostgreSQL data store
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    /// Maximum number of pooled connections
    pub pool_size: u32,
    /// Maximum time to wait for a free connection from the pool
    pub connect_timeout: Duration,
}

/// Get the database connection settings from the environment variables DATABASE_URL,
/// DATABASE_POOL_SIZE and DATABASE_CONNECT_TIMEOUT (in seconds). Only the first one is required.
pub fn get_database_config_from_env() -> Result<DatabaseConfig, SetupError> {
    Ok(DatabaseConfig {
        url: get_database_url_from_env()?,
        pool_size: get_pool_size_from_env()?,
        connect_timeout: get_connect_timeout_from_env()?,
    })
}

/// Get the database URL from the environment variable.
pub fn get_database_url_from_env() -> Result<String, SetupError> {
    env::var("DATABASE_URL").map_err(|e| SetupError::from_env_error(e, "DATABASE_URL"))
}

/// Get the maximum size of the database connection pool from the environment variable
pub fn get_pool_size_from_env() -> Result<u32, SetupError> {
    let pool_size = get_optional_env_var("DATABASE_POOL_SIZE")?
        .map(|v| {
            v.parse::<u32>().map_err(|_| SetupError::EnvVariableInvalid {
                variable_name: "DATABASE_POOL_SIZE",
                problem: "Not a valid uint32",
            })
        })
        .transpose()?
        .unwrap_or(DEFAULT_POOL_SIZE);
    if pool_size == 0 {
        return Err(SetupError::EnvVariableInvalid {
            variable_name: "DATABASE_POOL_SIZE",
            problem: "Must be at least 1",
        });
    }
    Ok(pool_size)
}

/// Get the connection checkout timeout from the environment variable
pub fn get_connect_timeout_from_env() -> Result<Duration, SetupError> {
    get_optional_env_var("DATABASE_CONNECT_TIMEOUT")?
        .map(|v| {
            v.parse::<u64>().map_err(|_| SetupError::EnvVariableInvalid {
                variable_name: "DATABASE_CONNECT_TIMEOUT",
                problem: "Not a valid number of seconds",
            })
        })
        .transpose()
        .map(|seconds| Duration::from_secs(seconds.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECONDS)))
}

fn get_optional_env_var(variable_name: &'static str) -> Result<Option<String>, SetupError> {
    match env::var(variable_name) {
        Ok(value) => Ok(Some(value)),
        Err(VarError::NotPresent) => Ok(None),
        Err(e) => Err(SetupError::from_env_error(e, variable_name)),
    }
}

#[derive(Debug)]
pub enum SetupError {
    EnvVariableMissing {
        variable_name: &'static str,
    },
    EnvVariableInvalid {
        variable_name: &'static str,
        problem: &'static str,
    },
}

impl SetupError {
    fn from_env_error(error: VarError, variable_name: &'static str) -> Self {
        match error {
            VarError::NotPresent => Self::EnvVariableMissing { variable_name },
            VarError::NotUnicode(_) => Self::EnvVariableInvalid {
                variable_name,
                problem: "no valid unicode",
            },
        }
    }
}

impl Display for SetupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SetupError::EnvVariableMissing { variable_name } => {
                write!(f, "Environment variable {} must be defined", variable_name)
            }
            SetupError::EnvVariableInvalid {
                variable_name,
                problem,
            } => write!(
                f,
                "Value of environment variable {} is invalid: {}",
                variable_name, problem
            ),
        }
    }
}
