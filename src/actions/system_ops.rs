//! Process, host and network operations behind the built-in actions

use super::context::OpContext;
use super::params::Params;
use super::{OpError, OpResult};
use std::fs;
use std::time::Duration;
use sysinfo::System;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub fn echo(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    Ok(params.required_text("text")?.to_string())
}

pub fn pwd(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    if let Some(dir) = params.workdir() {
        return Ok(dir.display().to_string());
    }
    let dir = std::env::current_dir().map_err(|e| OpError::io("Error reading working directory", e))?;
    Ok(dir.display().to_string())
}

pub fn uname(_params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let unknown = || "unknown".to_string();
    Ok(format!(
        "system={}, node={}, release={}, version={}, machine={}",
        System::name().unwrap_or_else(unknown),
        System::host_name().unwrap_or_else(unknown),
        System::kernel_version().unwrap_or_else(unknown),
        System::os_version().unwrap_or_else(unknown),
        std::env::consts::ARCH,
    ))
}

pub fn ps(_params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let mut system = System::new();
    system.refresh_processes();

    let mut procs: Vec<(u32, String)> = system
        .processes()
        .iter()
        .map(|(pid, process)| (pid.as_u32(), process.name().to_string()))
        .collect();
    procs.sort();

    if procs.is_empty() {
        return Err(OpError::Unsupported("process listing"));
    }
    Ok(procs
        .into_iter()
        .map(|(pid, name)| format!("{} {}", pid, name))
        .collect::<Vec<_>>()
        .join("\n"))
}

/// Blocking download; must not be called from inside an async runtime
pub fn wget(params: &Params, _ctx: &OpContext<'_>) -> OpResult<String> {
    let url = params.required_text("url")?;
    let output = params.required_path("output_path")?;

    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| OpError::Http(e.to_string()))?;
    let response = client
        .get(url)
        .send()
        .and_then(|r| r.error_for_status())
        .map_err(|e| OpError::Http(e.to_string()))?;
    let body = response.bytes().map_err(|e| OpError::Http(e.to_string()))?;

    fs::write(output, &body).map_err(|e| OpError::at(output, e))?;
    Ok(format!("Downloaded {} to {}", url, output.display()))
}
