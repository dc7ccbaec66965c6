//! `install`, `list` and `detect` subcommands.

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    evolver_config::{DefaultScope, EvolverConfig},
    evolver_skills::{
        AdapterRegistry, AgentType, FsSkillRepository, InstallPaths, InstallReport,
        InstallRequest, InstallStatus, Installer, Scope, SkillRepository, SkillSelector,
        detect::{SystemProbe, detect_agent, detect_all},
    },
    tracing::debug,
};

pub struct InstallOptions {
    pub agent: Option<String>,
    pub skill: Option<String>,
    pub global: bool,
    pub json: bool,
}

pub async fn handle_install(
    config: &EvolverConfig,
    skills_dir: PathBuf,
    options: InstallOptions,
) -> anyhow::Result<()> {
    let paths = InstallPaths::from_env().context("failed to resolve install paths")?;

    let agent = match options.agent.or_else(|| config.install.agent.clone()) {
        Some(id) => AgentType::from(id),
        None => detect_agent(&SystemProbe, &paths.home_dir).context(
            "no supported coding assistant detected; pass --agent (claude-code, cursor, aider)",
        )?,
    };

    let scope = if options.global {
        Scope::Global
    } else {
        match config.install.scope {
            DefaultScope::Local => Scope::Local,
            DefaultScope::Global => Scope::Global,
        }
    };

    let selector = options
        .skill
        .map_or(SkillSelector::All, SkillSelector::Named);

    let installer = Installer::new(
        Arc::new(FsSkillRepository::new(skills_dir)),
        AdapterRegistry::with_defaults(),
        paths,
    );
    let report = installer
        .install(&InstallRequest {
            agent,
            selector,
            scope,
        })
        .await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    let code = exit_code(report.status());
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Process exit code for an install outcome. Any failed skill is non-zero so
/// scripts notice partial installs; host-file warnings never are.
pub fn exit_code(status: InstallStatus) -> i32 {
    match status {
        InstallStatus::Success | InstallStatus::Empty => 0,
        InstallStatus::Partial | InstallStatus::Failed => 1,
    }
}

fn print_report(report: &InstallReport) {
    println!(
        "Installing skills for {} ({}) into {}",
        report.agent,
        report.scope,
        report.target_dir.display()
    );
    println!();

    for skill in &report.installed {
        println!("  + {}", skill.name);
    }
    for failure in &report.failures {
        println!("  x {}: {}", failure.skill, failure.error);
    }

    if let Some(ref host) = report.host_file {
        println!();
        println!("Updated {}", host.display());
    }
    for warning in &report.warnings {
        println!("Warning: {warning}");
    }

    println!();
    match report.status() {
        InstallStatus::Empty => println!("No skills found to install."),
        InstallStatus::Success => println!("Installed {} skill(s).", report.succeeded()),
        InstallStatus::Partial => println!(
            "Installed {} of {} skill(s); {} failed.",
            report.succeeded(),
            report.attempted,
            report.failures.len()
        ),
        InstallStatus::Failed => println!("No skills were installed."),
    }

    if report.agent == AgentType::ClaudeCode && report.succeeded() > 0 {
        println!("Restart Claude Code to load the new skills.");
    }
}

pub async fn handle_list(skills_dir: PathBuf) -> anyhow::Result<()> {
    let repository = FsSkillRepository::new(skills_dir);
    let ids = repository.list().await.with_context(|| {
        format!(
            "failed to read skills from {}",
            repository.root().display()
        )
    })?;

    let mut shown = 0;
    for id in &ids {
        match repository.load(id).await {
            Ok(skill) => {
                println!("{} (v{})", skill.name, skill.version);
                println!("    {}", skill.description.trim());
                shown += 1;
            },
            Err(e) => debug!(skill = %id, error = %e, "skipping unloadable skill"),
        }
    }

    if shown == 0 {
        println!("No skills found in {}.", repository.root().display());
    }
    Ok(())
}

pub fn handle_detect() -> anyhow::Result<()> {
    let paths = InstallPaths::from_env().context("failed to resolve home directory")?;
    let agents = detect_all(&SystemProbe, &paths.home_dir);

    if agents.is_empty() {
        println!("No supported coding assistants detected.");
        return Ok(());
    }
    for (i, agent) in agents.iter().enumerate() {
        let marker = if i == 0 {
            " (default)"
        } else {
            ""
        };
        println!("  {agent}{marker}");
    }
    Ok(())
}
