//! Browser environment driven through MCP browser tools

use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use fw_core::config::{EnvConfig, TaskConfig};
use fw_core::{Action, Environment, Observation, StepInfo, ToolTransport, Transition};
use fw_protocol::ToolOutput;

use super::episode::EpisodeState;
use super::reward::StepOutcome;
use super::EnvError;
use crate::backoff::ExponentialBackoff;
use crate::client::McpClient;
use crate::tools;

/// Element description used by `submit` when the action carries none
const SUBMIT_DESCRIPTION: &str = "submit button";

/// Form-filling environment.
///
/// Each episode navigates to the task URL, then applies one action per
/// step and looks for the task's success marker in the page snapshot.
///
/// Without a transport every remote call has no effect and the episode runs
/// on empty observations. Transport errors are treated the same way unless
/// [`EnvConfig::strict`] is set.
pub struct BrowserEnv<T = McpClient> {
    task: TaskConfig,
    config: EnvConfig,
    transport: Option<T>,
    episode: EpisodeState,
    current_url: Option<String>,
    last_snapshot: Option<Observation>,
    cancel: CancellationToken,
}

impl<T: ToolTransport> BrowserEnv<T> {
    /// Create an environment with the default configuration
    pub fn new(task: TaskConfig, transport: T) -> Self {
        Self::with_config(task, EnvConfig::default(), Some(transport))
    }

    /// Create an environment with an explicit configuration
    pub fn with_config(task: TaskConfig, config: EnvConfig, transport: Option<T>) -> Self {
        let episode = EpisodeState::new(task.max_steps);
        Self {
            task,
            config,
            transport,
            episode,
            current_url: None,
            last_snapshot: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Create an environment with no transport
    pub fn without_transport(task: TaskConfig) -> Self {
        Self::with_config(task, EnvConfig::default(), None)
    }

    /// Use `token` to cancel in-flight operations
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn task(&self) -> &TaskConfig {
        &self.task
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    pub fn episode(&self) -> &EpisodeState {
        &self.episode
    }

    /// Steps taken in the current episode
    pub fn current_step(&self) -> u32 {
        self.episode.step()
    }

    pub fn is_done(&self) -> bool {
        self.episode.is_done()
    }

    /// URL of the last navigation
    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn transport(&self) -> Option<&T> {
        self.transport.as_ref()
    }

    /// Start a new episode.
    ///
    /// Navigates to the task URL and polls for a snapshot, backing off
    /// between attempts until one is ready or the backoff budget is spent.
    /// In the latter case the last attempt is returned.
    pub async fn reset(&mut self) -> Result<Observation, EnvError> {
        self.episode.reset();
        self.last_snapshot = None;

        let url = self.task.url.clone();
        tracing::info!("Resetting episode at {}", url);
        self.navigate(&url).await?;

        let mut backoff = self.reset_backoff();
        if let Some(delay) = backoff.next_delay() {
            self.wait_for(None, Some(delay.as_secs_f64())).await?;
        }

        let mut observation = self.snapshot().await?;
        while !self.is_ready(&observation) {
            let Some(delay) = backoff.next_delay() else {
                tracing::warn!(
                    "No usable snapshot after waiting {:?}, continuing with last attempt",
                    backoff.elapsed()
                );
                break;
            };
            tracing::debug!("Snapshot not ready, polling again in {:?}", delay);
            self.wait_for(None, Some(delay.as_secs_f64())).await?;
            observation = self.snapshot().await?;
        }

        Ok(observation)
    }

    /// Apply one action.
    ///
    /// Order is fixed: act, settle, snapshot, check for success.
    pub async fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        if self.episode.is_done() {
            return Err(EnvError::EpisodeDone);
        }

        let step = self.episode.advance();
        tracing::debug!("Step {}: {}", step, action.kind());

        match action {
            Action::Click { element_ref, .. } => self.click(element_ref).await?,
            Action::Type {
                element_ref,
                text,
                description,
            } => {
                let element = description.as_deref().unwrap_or("");
                self.type_text(element, element_ref, text).await?
            }
            Action::Submit {
                element_ref,
                description,
            } => {
                let element = description.as_deref().unwrap_or(SUBMIT_DESCRIPTION);
                tracing::debug!("Submitting via {} ({})", element_ref, element);
                self.click(element_ref).await?
            }
            Action::Wait { time } => {
                let time = time.unwrap_or_else(|| self.config.default_wait.as_secs_f64());
                self.wait_for(None, Some(time)).await?
            }
        }

        let settle = self.config.settle_delay.as_secs_f64();
        self.wait_for(None, Some(settle)).await?;

        let observation = self.snapshot().await?;
        let success = self.is_success(&observation);

        let outcome = StepOutcome::classify(success, step, self.episode.max_steps());
        self.episode.record(outcome);

        let reward = outcome.reward(&self.config.rewards);
        match outcome {
            StepOutcome::Success => tracing::info!("Success at step {}", step),
            StepOutcome::LimitReached => tracing::info!("Step limit reached at step {}", step),
            StepOutcome::Continue => {}
        }

        Ok(Transition {
            observation,
            reward,
            done: outcome.is_terminal(),
            info: StepInfo {
                step,
                success: outcome.is_success(),
                action_type: action.kind(),
            },
        })
    }

    /// Fetch the current observation without acting
    pub async fn render(&mut self) -> Result<Observation, EnvError> {
        self.snapshot().await
    }

    /// Close the transport, if any
    pub async fn close(&mut self) -> Result<(), EnvError> {
        let Some(transport) = self.transport.as_mut() else {
            return Ok(());
        };

        match transport.close().await {
            Ok(()) => Ok(()),
            Err(e) if self.config.strict => Err(e.into()),
            Err(e) => {
                tracing::warn!("Failed to close transport: {}", e);
                Ok(())
            }
        }
    }

    fn reset_backoff(&self) -> ExponentialBackoff {
        let config = &self.config.reset_backoff;
        // Without a budget the total wait is capped at the largest single delay
        let budget = config.budget.or(Some(config.max));
        ExponentialBackoff::from_config(config).with_budget(budget)
    }

    fn is_ready(&self, observation: &Observation) -> bool {
        !observation.is_empty()
            && (observation.is_structured() || self.config.accept_text_observation)
    }

    fn is_success(&self, observation: &Observation) -> bool {
        match self.task.success_condition.as_deref() {
            Some(marker) if !marker.is_empty() => observation.contains_marker(marker),
            _ => false,
        }
    }

    async fn call_tool(
        &mut self,
        name: &str,
        arguments: Value,
    ) -> Result<Option<ToolOutput>, EnvError> {
        if self.cancel.is_cancelled() {
            return Err(EnvError::Cancelled);
        }
        let Some(transport) = self.transport.as_mut() else {
            tracing::debug!("No transport, skipping {}", name);
            return Ok(None);
        };

        tracing::debug!("Calling {} with {}", name, arguments);
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(EnvError::Cancelled),
            result = transport.call_tool(name, arguments) => result,
        };

        match result {
            Ok(output) => Ok(output),
            Err(e) if self.config.strict => Err(e.into()),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                Ok(None)
            }
        }
    }

    async fn navigate(&mut self, url: &str) -> Result<(), EnvError> {
        self.call_tool(tools::NAVIGATE, tools::navigate_args(url)).await?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    /// Fresh snapshot, or the cached one when the fetch comes back empty
    async fn snapshot(&mut self) -> Result<Observation, EnvError> {
        match self.call_tool(tools::SNAPSHOT, tools::snapshot_args()).await? {
            Some(output) if !output.is_empty() => {
                let observation = Observation::from(output);
                self.last_snapshot = Some(observation.clone());
                Ok(observation)
            }
            _ => Ok(self.last_snapshot.clone().unwrap_or_default()),
        }
    }

    async fn click(&mut self, element_ref: &str) -> Result<(), EnvError> {
        self.call_tool(tools::CLICK, tools::click_args(element_ref)).await?;
        Ok(())
    }

    async fn type_text(
        &mut self,
        element: &str,
        element_ref: &str,
        text: &str,
    ) -> Result<(), EnvError> {
        self.call_tool(tools::TYPE, tools::type_args(element, element_ref, text))
            .await?;
        Ok(())
    }

    async fn wait_for(&mut self, text: Option<&str>, time: Option<f64>) -> Result<(), EnvError> {
        self.call_tool(tools::WAIT_FOR, tools::wait_for_args(text, time)).await?;
        Ok(())
    }
}

#[async_trait]
impl<T: ToolTransport> Environment for BrowserEnv<T> {
    type Error = EnvError;

    async fn reset(&mut self) -> Result<Observation, EnvError> {
        BrowserEnv::reset(self).await
    }

    async fn step(&mut self, action: &Action) -> Result<Transition, EnvError> {
        BrowserEnv::step(self, action).await
    }

    async fn render(&mut self) -> Result<Observation, EnvError> {
        BrowserEnv::render(self).await
    }

    async fn close(&mut self) -> Result<(), EnvError> {
        BrowserEnv::close(self).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fw_core::error::ConnectionError;
    use fw_core::ActionKind;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type CallLog = Arc<Mutex<Vec<(String, Value)>>>;

    /// Scripted transport: snapshots are served from a queue, then `fallback`
    #[derive(Default)]
    struct MockTransport {
        calls: CallLog,
        snapshots: VecDeque<Option<ToolOutput>>,
        fallback: Option<ToolOutput>,
        failing: bool,
        hanging: bool,
        closed: bool,
    }

    impl MockTransport {
        fn with_snapshots(snapshots: Vec<Option<ToolOutput>>) -> (Self, CallLog) {
            let transport = Self {
                snapshots: snapshots.into(),
                ..Self::default()
            };
            let calls = transport.calls.clone();
            (transport, calls)
        }
    }

    #[async_trait]
    impl ToolTransport for MockTransport {
        async fn call_tool(
            &mut self,
            name: &str,
            arguments: Value,
        ) -> Result<Option<ToolOutput>, ConnectionError> {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments));

            if self.hanging {
                std::future::pending::<()>().await;
            }
            if self.failing || self.closed {
                return Err(ConnectionError::Http("connection refused".to_string()));
            }
            if name == tools::SNAPSHOT {
                return Ok(self
                    .snapshots
                    .pop_front()
                    .unwrap_or_else(|| self.fallback.clone()));
            }
            Ok(Some(ToolOutput::Text("ok".to_string())))
        }

        async fn close(&mut self) -> Result<(), ConnectionError> {
            self.closed = true;
            Ok(())
        }
    }

    fn task(max_steps: u32) -> TaskConfig {
        TaskConfig::new("https://x/form")
            .with_success_condition("Thank you")
            .with_max_steps(max_steps)
    }

    fn page(text: &str) -> Option<ToolOutput> {
        Some(ToolOutput::Json(json!({ "snapshot": text })))
    }

    fn calls_to(calls: &CallLog, tool: &str) -> Vec<Value> {
        calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(name, _)| name == tool)
            .map(|(_, args)| args.clone())
            .collect()
    }

    fn wait_times(calls: &CallLog) -> Vec<f64> {
        calls_to(calls, tools::WAIT_FOR)
            .iter()
            .filter_map(|args| args["time"].as_f64())
            .collect()
    }

    #[tokio::test]
    async fn test_click_then_submit_succeeds() {
        let (transport, calls) = MockTransport::with_snapshots(vec![
            page("form"),
            page("- textbox \"Name\" [ref=e1]"),
            page("- heading \"Thank you for submitting!\""),
        ]);
        let mut env = BrowserEnv::new(task(2), transport);

        let initial = env.reset().await.unwrap();
        assert_eq!(initial.as_value(), &json!({"snapshot": "form"}));
        assert_eq!(env.current_url(), Some("https://x/form"));
        assert_eq!(
            calls_to(&calls, tools::NAVIGATE),
            vec![json!({"url": "https://x/form"})]
        );

        let first = env.step(&Action::click("e1")).await.unwrap();
        assert_eq!(first.reward, -0.01);
        assert!(!first.done);
        assert_eq!(
            first.info,
            StepInfo {
                step: 1,
                success: false,
                action_type: ActionKind::Click
            }
        );

        let second = env.step(&Action::submit("e2")).await.unwrap();
        assert_eq!(second.reward, 1.0);
        assert!(second.done);
        assert!(second.info.success);
        assert_eq!(second.info.step, 2);
        assert_eq!(second.info.action_type, ActionKind::Submit);
        assert!(env.is_done());
    }

    #[tokio::test]
    async fn test_step_limit_ends_episode() {
        let (transport, _calls) =
            MockTransport::with_snapshots(vec![page("form"), page("still the form")]);
        let mut env = BrowserEnv::new(task(1), transport);
        env.reset().await.unwrap();

        let transition = env.step(&Action::click("e1")).await.unwrap();
        assert_eq!(transition.reward, -1.0);
        assert!(transition.done);
        assert!(!transition.info.success);

        let again = env.step(&Action::click("e1")).await;
        assert!(matches!(again, Err(EnvError::EpisodeDone)));
        assert_eq!(env.current_step(), 1);
    }

    #[tokio::test]
    async fn test_reset_starts_new_episode() {
        let (mut transport, _calls) = MockTransport::with_snapshots(vec![]);
        transport.fallback = page("form");
        let mut env = BrowserEnv::new(task(1), transport);

        env.reset().await.unwrap();
        env.step(&Action::click("e1")).await.unwrap();
        assert!(env.is_done());

        env.reset().await.unwrap();
        assert_eq!(env.current_step(), 0);
        assert!(!env.is_done());
        assert!(env.step(&Action::click("e1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_actions_map_to_tool_calls() {
        let (mut transport, calls) = MockTransport::with_snapshots(vec![]);
        transport.fallback = page("form");
        let mut env = BrowserEnv::new(task(10), transport);

        env.step(
            &Action::type_text("e1", "John Doe").with_description("Name input field"),
        )
        .await
        .unwrap();
        env.step(&Action::submit("e2")).await.unwrap();
        env.step(&Action::wait(None)).await.unwrap();
        env.step(&Action::wait(Some(2.0))).await.unwrap();

        let log: Vec<(String, Value)> = calls.lock().unwrap().clone();
        assert_eq!(
            log[..3],
            [
                (
                    tools::TYPE.to_string(),
                    json!({"element": "Name input field", "ref": "e1", "text": "John Doe"})
                ),
                (tools::WAIT_FOR.to_string(), json!({"time": 0.3})),
                (tools::SNAPSHOT.to_string(), json!({})),
            ]
        );
        assert_eq!(calls_to(&calls, tools::CLICK), vec![json!({"ref": "e2"})]);
        assert_eq!(wait_times(&calls), vec![0.3, 0.3, 0.5, 0.3, 2.0, 0.3]);
    }

    #[tokio::test]
    async fn test_reset_backoff_stays_within_budget() {
        let (transport, calls) = MockTransport::with_snapshots(vec![]);
        let mut env = BrowserEnv::new(task(5), transport);

        let observation = env.reset().await.unwrap();
        assert!(observation.is_empty());

        let waits = wait_times(&calls);
        assert_eq!(waits, vec![0.5, 1.0, 2.0, 4.0, 8.0, 16.0, 28.5]);
        assert_eq!(waits.iter().sum::<f64>(), 60.0);
        assert_eq!(calls_to(&calls, tools::SNAPSHOT).len(), waits.len());
    }

    #[tokio::test]
    async fn test_reset_without_budget_is_capped_by_max() {
        let (transport, calls) = MockTransport::with_snapshots(vec![]);
        let config = EnvConfig {
            reset_backoff: fw_core::config::BackoffConfig {
                max: Duration::from_secs(4),
                budget: None,
                ..Default::default()
            },
            ..EnvConfig::default()
        };
        let mut env = BrowserEnv::with_config(task(5), config, Some(transport));

        env.reset().await.unwrap();
        assert_eq!(wait_times(&calls), vec![0.5, 1.0, 2.0, 0.5]);
    }

    #[tokio::test]
    async fn test_reset_polls_until_structured() {
        let (transport, calls) = MockTransport::with_snapshots(vec![
            None,
            Some(ToolOutput::Json(json!({}))),
            page("form"),
        ]);
        let mut env = BrowserEnv::new(task(5), transport);

        let observation = env.reset().await.unwrap();
        assert_eq!(observation.as_value(), &json!({"snapshot": "form"}));
        assert_eq!(wait_times(&calls), vec![0.5, 1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_text_snapshot_accepted_when_configured() {
        let snapshot = "- textbox \"Name\" [ref=e1]";
        let (transport, calls) =
            MockTransport::with_snapshots(vec![Some(ToolOutput::Text(snapshot.to_string()))]);
        let config = EnvConfig {
            accept_text_observation: true,
            ..EnvConfig::default()
        };
        let mut env = BrowserEnv::with_config(task(5), config, Some(transport));

        let observation = env.reset().await.unwrap();
        assert_eq!(observation.as_text(), snapshot);
        assert_eq!(wait_times(&calls), vec![0.5]);
    }

    #[tokio::test]
    async fn test_render_does_not_advance_episode() {
        let (mut transport, calls) = MockTransport::with_snapshots(vec![]);
        transport.fallback = page("form");
        let mut env = BrowserEnv::new(task(3), transport);
        env.reset().await.unwrap();
        env.step(&Action::click("e1")).await.unwrap();

        for _ in 0..3 {
            let observation = env.render().await.unwrap();
            assert_eq!(observation.as_value(), &json!({"snapshot": "form"}));
        }
        assert_eq!(env.current_step(), 1);
        assert!(!env.is_done());
        assert!(calls_to(&calls, tools::CLICK).len() == 1);
    }

    #[tokio::test]
    async fn test_empty_snapshot_reuses_last_known() {
        let (transport, _calls) = MockTransport::with_snapshots(vec![page("form"), None]);
        let mut env = BrowserEnv::new(task(3), transport);
        env.reset().await.unwrap();

        let transition = env.step(&Action::click("e1")).await.unwrap();
        assert_eq!(transition.observation.as_value(), &json!({"snapshot": "form"}));
    }

    #[tokio::test]
    async fn test_no_transport_degrades_silently() {
        let mut env = BrowserEnv::<MockTransport>::without_transport(task(2));

        let initial = env.reset().await.unwrap();
        assert!(initial.is_empty());

        let first = env.step(&Action::click("e1")).await.unwrap();
        assert_eq!((first.reward, first.done), (-0.01, false));
        let second = env.step(&Action::submit("e2")).await.unwrap();
        assert_eq!((second.reward, second.done), (-1.0, true));

        env.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_transport_errors_degrade_by_default() {
        let transport = MockTransport {
            failing: true,
            ..MockTransport::default()
        };
        let mut env = BrowserEnv::new(task(1), transport);

        assert!(env.reset().await.unwrap().is_empty());
        let transition = env.step(&Action::click("e1")).await.unwrap();
        assert_eq!(transition.reward, -1.0);
    }

    #[tokio::test]
    async fn test_strict_mode_surfaces_transport_errors() {
        let transport = MockTransport {
            failing: true,
            ..MockTransport::default()
        };
        let config = EnvConfig {
            strict: true,
            ..EnvConfig::default()
        };
        let mut env = BrowserEnv::with_config(task(1), config, Some(transport));

        let err = env.reset().await.unwrap_err();
        assert!(matches!(err, EnvError::Remote(ConnectionError::Http(_))));
    }

    #[tokio::test]
    async fn test_absent_results_degrade_in_strict_mode() {
        let (transport, _calls) = MockTransport::with_snapshots(vec![]);
        let config = EnvConfig {
            strict: true,
            reset_backoff: fw_core::config::BackoffConfig {
                budget: Some(Duration::from_secs(1)),
                ..Default::default()
            },
            ..EnvConfig::default()
        };
        let mut env = BrowserEnv::with_config(task(2), config, Some(transport));

        assert!(env.reset().await.unwrap().is_empty());
        assert!(env.step(&Action::click("e1")).await.is_ok());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_calls() {
        let (transport, calls) = MockTransport::with_snapshots(vec![]);
        let mut env = BrowserEnv::new(task(2), transport);
        env.cancellation_token().cancel();

        assert!(matches!(env.reset().await, Err(EnvError::Cancelled)));
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_interrupts_hanging_call() {
        let transport = MockTransport {
            hanging: true,
            ..MockTransport::default()
        };
        let token = CancellationToken::new();
        let mut env = BrowserEnv::new(task(2), transport).with_cancellation(token.clone());

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        assert!(matches!(env.render().await, Err(EnvError::Cancelled)));
    }

    #[tokio::test]
    async fn test_close_closes_transport() {
        let (transport, _calls) = MockTransport::with_snapshots(vec![]);
        let mut env = BrowserEnv::new(task(2), transport);

        env.close().await.unwrap();
        env.close().await.unwrap();
        assert!(env.transport().unwrap().closed);
    }

    #[tokio::test]
    async fn test_usable_as_environment() {
        async fn run_one<E: Environment>(env: &mut E, action: &Action) -> Transition {
            env.reset().await.unwrap();
            env.step(action).await.unwrap()
        }

        let (transport, _calls) = MockTransport::with_snapshots(vec![
            page("form"),
            page("Thank you!"),
        ]);
        let mut env = BrowserEnv::new(task(5), transport);

        let transition = run_one(&mut env, &Action::submit("e2")).await;
        assert!(transition.info.success);
    }
}
