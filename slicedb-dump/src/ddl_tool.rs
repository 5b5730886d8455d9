//! The external DDL collaborator (§6 "Out of scope"/§4.3.6): an interface
//! the core consumes without specifying its internals. The spec treats the
//! `pg-dump`-style pre-data/post-data emitter as an outside tool; this crate
//! only needs *something* that hands back one text blob per section, which
//! `DdlProvider` captures so the engine and its tests never depend on the
//! real `pg_dump` binary being on `PATH`.

use async_trait::async_trait;
use slicedb_archive::Section;
use slicedb_db::ConnectionConfig;
use slicedb_errors::{ObjectId, SliceError};

/// Produces the text of one schema section (`pre-data` or `post-data`).
#[async_trait]
pub trait DdlProvider: Send + Sync {
    async fn dump_section(&self, section: Section) -> Result<String, SliceError>;
}

/// Shells out to `pg_dump --section=pre-data|post-data --schema-only`
/// against the same database the dump's snapshot pool is reading from.
/// Kept to a single, narrow call so this external dependency is easy to
/// swap out.
pub struct PgDumpTool {
    config: ConnectionConfig,
}

impl PgDumpTool {
    pub fn new(config: ConnectionConfig) -> Self {
        PgDumpTool { config }
    }

    fn section_flag(section: Section) -> &'static str {
        match section {
            Section::PreData => "pre-data",
            Section::PostData => "post-data",
        }
    }
}

#[async_trait]
impl DdlProvider for PgDumpTool {
    async fn dump_section(&self, section: Section) -> Result<String, SliceError> {
        let mut command = tokio::process::Command::new("pg_dump");
        command
            .arg("--schema-only")
            .arg("--no-owner")
            .arg("--no-privileges")
            .arg(format!("--section={}", Self::section_flag(section)))
            .arg("-h")
            .arg(&self.config.host)
            .arg("-p")
            .arg(self.config.port.to_string())
            .arg("-U")
            .arg(&self.config.user)
            .arg("-d")
            .arg(&self.config.dbname)
            .env("PGSSLMODE", sslmode_str(self.config.sslmode));
        if let Some(password) = &self.config.password {
            command.env("PGPASSWORD", password);
        }

        let output = command.output().await.map_err(|e| {
            SliceError::io(ObjectId::None, std::io::Error::new(std::io::ErrorKind::Other, e))
        })?;
        if !output.status.success() {
            return Err(SliceError::io(
                ObjectId::None,
                std::io::Error::new(
                    std::io::ErrorKind::Other,
                    format!("pg_dump exited with {}: {}", output.status, String::from_utf8_lossy(&output.stderr)),
                ),
            ));
        }
        String::from_utf8(output.stdout)
            .map_err(|e| SliceError::data(ObjectId::None, format!("pg_dump output is not UTF-8: {e}")))
    }
}

fn sslmode_str(mode: tokio_postgres::config::SslMode) -> &'static str {
    match mode {
        tokio_postgres::config::SslMode::Disable => "disable",
        tokio_postgres::config::SslMode::Prefer => "prefer",
        tokio_postgres::config::SslMode::Require => "require",
        _ => "prefer",
    }
}
