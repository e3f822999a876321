use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mini_agent_action::agent::{command::run_agent, validate::run_validation};
use mini_agent_action::config::AppConfig;
use mini_agent_action::error::AppError;
use mini_agent_action::platform::github::GitHubPlatform;
use mini_agent_action::platform::http::HttpJsonClient;
use mini_agent_action::webhook::WebhookNotifier;
use mini_agent_action::workflow::types::WorkflowConfig;
use mini_agent_action::workflow::WorkflowContext;
use mini_agent_action::workspace::git::GitCli;

#[derive(Parser)]
#[command(
    name = "mini-agent-action",
    about = "Run an agent against a fresh checkout and open a pull request with its changes"
)]
struct Cli {
    /// Repository as owner/name or a clone URL
    repo: String,

    /// Command that performs the changes; runs via `sh -c` inside the checkout
    #[arg(long = "agent-command")]
    agent_command: String,

    /// Validation command; a non-zero exit fails the run
    #[arg(long)]
    exec: Option<String>,

    /// Access token used for clone, push and the pull-request API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Commit or ref to start from instead of the default branch
    #[arg(long = "ref")]
    start_ref: Option<String>,

    /// Pull request target branch (detected from the remote when omitted)
    #[arg(long)]
    base_branch: Option<String>,

    /// Prefix for generated branch names
    #[arg(long)]
    branch_prefix: Option<String>,

    /// Explicit working branch name
    #[arg(long)]
    branch: Option<String>,

    #[arg(long)]
    pr_title: Option<String>,

    #[arg(long)]
    pr_body: Option<String>,

    /// URL that receives the run outcome
    #[arg(long)]
    webhook_url: Option<String>,

    /// Keep the temporary workspace after the run
    #[arg(long)]
    no_cleanup: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Verbose logging
    #[arg(long)]
    debug: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn init_tracing(debug: bool, json: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Logs go to stderr; stdout carries the outcome JSON
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn workflow_config(cli: &Cli, config: &AppConfig) -> WorkflowConfig {
    let settings = &config.workflow;
    WorkflowConfig {
        start_ref: cli.start_ref.clone(),
        base_branch: cli.base_branch.clone().or_else(|| settings.base_branch.clone()),
        branch_prefix: cli
            .branch_prefix
            .clone()
            .unwrap_or_else(|| settings.branch_prefix.clone()),
        branch_name: cli.branch.clone(),
        pr_title: cli.pr_title.clone(),
        pr_body: cli.pr_body.clone(),
        commit_message: settings.commit_message.clone(),
        author_name: settings.commit_author_name.clone(),
        author_email: settings.commit_author_email.clone(),
        cleanup: settings.cleanup && !cli.no_cleanup,
        workspace_dir: settings.workspace_dir.clone(),
        switch_working_dir: settings.switch_working_dir,
        ..WorkflowConfig::new(
            cli.repo.clone(),
            cli.token
                .clone()
                .or_else(|| config.github.token.clone())
                .unwrap_or_default(),
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.debug, cli.json_logs);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.webhook_url.is_some() {
        config.webhook.url = cli.webhook_url.clone();
    }

    let workflow = workflow_config(&cli, &config);
    tracing::info!(repo = %workflow.repository, "Starting mini-agent-action");

    let http = HttpJsonClient::new(&config.github.user_agent)?;
    let platform = GitHubPlatform::new(
        http.clone(),
        &workflow.token,
        config.github.api_url.clone(),
    );
    let notifier = WebhookNotifier::new(http, &config.webhook);
    let context = WorkflowContext::new(
        workflow,
        Arc::new(GitCli::default()),
        Arc::new(platform),
        notifier,
    );

    let agent_command = cli.agent_command.clone();
    let exec = cli.exec.clone();
    let report = context
        .run(|checkout| async move {
            run_agent(&agent_command, &checkout).await?;
            if let Some(exec) = exec {
                run_validation(&exec, &checkout).await?;
            }
            Ok::<_, AppError>(())
        })
        .await?;

    println!("{}", serde_json::to_string_pretty(&report.outcome)?);

    if !report.outcome.is_success() {
        anyhow::bail!(
            "run failed: {}",
            report.outcome.error.as_deref().unwrap_or("unknown error")
        );
    }

    Ok(())
}
