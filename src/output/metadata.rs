//! `metadata.toml`: what was run, with which seed, by which build, on which machine.
use anyhow::{Result, anyhow};
use chrono::Local;
use platform_info::{PlatformInfo, PlatformInfoAPI, UNameAPI};
use serde::Serialize;
use std::fs;
use std::path::Path;

const METADATA_FILE_NAME: &str = "metadata.toml";

mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

#[derive(Serialize)]
struct Metadata<'a> {
    run: RunMetadata<'a>,
    program: ProgramMetadata,
    platform: PlatformMetadata,
}

/// Enough to repeat the run exactly
#[derive(Serialize)]
struct RunMetadata<'a> {
    model_path: &'a Path,
    started: String,
    seed: u64,
}

#[derive(Serialize)]
struct ProgramMetadata {
    name: &'static str,
    version: &'static str,
    git_commit: String,
    target: &'static str,
    debug_build: bool,
    rustc_version: &'static str,
    built_utc: &'static str,
}

impl ProgramMetadata {
    fn current() -> Self {
        let git_commit = match (built_info::GIT_COMMIT_HASH_SHORT, built_info::GIT_DIRTY) {
            (Some(hash), Some(true)) => format!("{hash}-dirty"),
            (Some(hash), _) => hash.to_string(),
            (None, _) => "unknown".to_string(),
        };

        Self {
            name: built_info::PKG_NAME,
            version: built_info::PKG_VERSION,
            git_commit,
            target: built_info::TARGET,
            debug_build: built_info::DEBUG,
            rustc_version: built_info::RUSTC_VERSION,
            built_utc: built_info::BUILT_TIME_UTC,
        }
    }
}

/// The `uname` fields of the machine running the simulation
#[derive(Serialize)]
struct PlatformMetadata {
    sysname: String,
    release: String,
    version: String,
    machine: String,
    osname: String,
}

impl PlatformMetadata {
    fn current() -> Result<Self> {
        let info = PlatformInfo::new()
            .map_err(|err| anyhow!("Unable to determine platform info: {err}"))?;
        let field = |value: &std::ffi::OsStr| value.to_string_lossy().into_owned();

        Ok(Self {
            sysname: field(info.sysname()),
            release: field(info.release()),
            version: field(info.version()),
            machine: field(info.machine()),
            osname: field(info.osname()),
        })
    }
}

/// Write `metadata.toml` into `output_path`
pub fn write_metadata(output_path: &Path, model_path: &Path, seed: u64) -> Result<()> {
    let metadata = Metadata {
        run: RunMetadata {
            model_path,
            started: Local::now().to_rfc2822(),
            seed,
        },
        program: ProgramMetadata::current(),
        platform: PlatformMetadata::current()?,
    };
    fs::write(
        output_path.join(METADATA_FILE_NAME),
        toml::to_string(&metadata)?,
    )?;

    Ok(())
}
