//! Connection configuration from the process environment (§6
//! "Environment"): no in-program configuration is required, so the
//! libpq-compatible `PG*` variables are the only source.

use std::env;

use slicedb_errors::{ObjectId, SliceError};
use tokio_postgres::config::SslMode;

#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: Option<String>,
    pub dbname: String,
    pub sslmode: SslMode,
}

impl ConnectionConfig {
    /// Reads `PGHOST`/`PGPORT`/`PGUSER`/`PGPASSWORD`/`PGDATABASE`/`PGSSLMODE`,
    /// falling back to libpq's own defaults where one is unset.
    pub fn from_env() -> Result<ConnectionConfig, SliceError> {
        let host = env::var("PGHOST").unwrap_or_else(|_| "localhost".to_string());
        let port = match env::var("PGPORT") {
            Ok(raw) => raw.parse::<u16>().map_err(|_| {
                SliceError::configuration(ObjectId::None, format!("PGPORT is not a valid port: {raw:?}"))
            })?,
            Err(_) => 5432,
        };
        let user = env::var("PGUSER").or_else(|_| env::var("USER")).map_err(|_| {
            SliceError::configuration(ObjectId::None, "PGUSER is not set and USER is unavailable".to_string())
        })?;
        let password = env::var("PGPASSWORD").ok();
        let dbname = env::var("PGDATABASE").unwrap_or_else(|_| user.clone());
        let sslmode = match env::var("PGSSLMODE").as_deref() {
            Ok("disable") | Err(_) => SslMode::Disable,
            Ok("require") => SslMode::Require,
            Ok("prefer") => SslMode::Prefer,
            Ok(other) => {
                return Err(SliceError::configuration(
                    ObjectId::None,
                    format!("unsupported PGSSLMODE {other:?}"),
                ))
            }
        };

        Ok(ConnectionConfig {
            host,
            port,
            user,
            password,
            dbname,
            sslmode,
        })
    }

    pub fn to_tokio_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.dbname)
            .ssl_mode(self.sslmode);
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_port() {
        std::env::set_var("PGPORT", "not-a-number");
        let err = ConnectionConfig::from_env().unwrap_err();
        std::env::remove_var("PGPORT");
        assert_eq!(err.kind(), "configuration");
    }

    #[test]
    fn rejects_unknown_sslmode() {
        std::env::set_var("PGUSER", "tester");
        std::env::set_var("PGSSLMODE", "verify-full");
        let err = ConnectionConfig::from_env().unwrap_err();
        std::env::remove_var("PGSSLMODE");
        std::env::remove_var("PGUSER");
        assert_eq!(err.kind(), "configuration");
    }
}
