//! Run command implementation

use std::path::Path;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::output::{format_steps, print_info, print_success, print_warning};
use fw_core::config::{ConfigFile, TaskConfig};
use fw_core::{Action, ToolTransport, Transition};
use fw_env::{BrowserEnv, EnvError, McpClient, ScriptedFormFiller};

/// What happened in one scripted episode
#[derive(Debug, Default)]
pub struct EpisodeReport {
    /// Actions taken with their outcomes
    pub steps: Vec<(Action, Transition)>,
}

impl EpisodeReport {
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|(_, t)| t.reward).sum()
    }

    /// True when the last step ended the episode successfully
    pub fn succeeded(&self) -> bool {
        self.steps.last().is_some_and(|(_, t)| t.info.success)
    }
}

/// Reset, plan from the first rendered snapshot, and step through the plan
pub async fn run_episode<T: ToolTransport>(
    env: &mut BrowserEnv<T>,
    filler: &ScriptedFormFiller,
) -> Result<EpisodeReport, EnvError> {
    env.reset().await?;
    let snapshot = env.render().await?;

    let plan = filler.plan(&snapshot);
    tracing::info!("Planned {} actions", plan.len());

    let mut report = EpisodeReport::default();
    for action in plan {
        let transition = env.step(&action).await?;
        tracing::info!(
            "Step {}: {} reward={} done={}",
            transition.info.step,
            action.kind(),
            transition.reward,
            transition.done
        );
        let done = transition.done;
        report.steps.push((action, transition));
        if done {
            break;
        }
    }

    Ok(report)
}

/// Run a scripted episode for the task in `task_path`
pub async fn run_command(
    settings: &ConfigFile,
    task_path: &Path,
    text: &str,
    cancel: CancellationToken,
) -> Result<()> {
    let task = TaskConfig::load(task_path)
        .with_context(|| format!("Failed to load task from {:?}", task_path))?;

    print_info(&format!("Connecting to {}", settings.client.endpoint));
    let client = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            anyhow::bail!("Interrupted while connecting to {}", settings.client.endpoint)
        }
        result = McpClient::connect(&settings.client) => result
            .with_context(|| format!("Failed to connect to {}", settings.client.endpoint))?,
    };

    print_info(&format!("Running episode at {} (max {} steps)", task.url, task.max_steps));
    let mut env = BrowserEnv::with_config(task, settings.env.clone(), Some(client))
        .with_cancellation(cancel);

    let filler = ScriptedFormFiller::new(text);
    let result = run_episode(&mut env, &filler).await;
    env.close().await?;

    let report = result.with_context(|| "Episode aborted")?;
    if report.steps.is_empty() {
        print_warning("No input field found in the page snapshot, nothing to do");
        return Ok(());
    }

    println!("{}", format_steps(&report.steps));
    let total = report.total_reward();
    if report.succeeded() {
        print_success(&format!("Form submitted (total reward {:.2})", total));
    } else {
        print_warning(&format!("Success marker not found (total reward {:.2})", total));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn settings_for(endpoint: String) -> ConfigFile {
        let mut settings = ConfigFile::default();
        settings.client.endpoint = endpoint;
        settings
    }

    fn task_file(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("task.json");
        std::fs::write(&path, r#"{"url": "https://x/form", "max_steps": 3}"#).unwrap();
        path
    }

    #[tokio::test]
    async fn test_cancel_interrupts_handshake() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = settings_for(format!("http://{}/mcp", listener.local_addr().unwrap()));
        let dir = tempfile::tempdir().unwrap();
        let task = task_file(dir.path());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_command(&settings, &task, "John Doe", cancel),
        )
        .await
        .expect("handshake should stop once cancelled");

        let err = result.unwrap_err();
        assert!(err.to_string().contains("Interrupted"), "{:#}", err);
        drop(listener);
    }

    #[tokio::test]
    async fn test_cancelled_before_connect() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let settings = settings_for(format!("http://{}/mcp", listener.local_addr().unwrap()));
        let dir = tempfile::tempdir().unwrap();
        let task = task_file(dir.path());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = run_command(&settings, &task, "John Doe", cancel)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Interrupted"), "{:#}", err);
    }
}
