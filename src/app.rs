use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::cli::{parse_cli_args, usage_text, version_text, CliCommand};
use crate::command_handlers::{handle_scan, handle_watch};
use crate::config::MonitorConfig;
use crate::presenter::{Presenter, TerminalPresenter};
use crate::scanner::{HostProber, NeighborSource, PingProber, SystemNeighborSource};

pub type OutputHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Builds the presenter a `watch` run draws frames with
pub type PresenterFactory = Arc<dyn Fn() -> Box<dyn Presenter> + Send + Sync>;

/// Produces the future whose completion stops a `watch` run
pub type InterruptSignal = Arc<dyn Fn() -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Collaborators and sinks a command runs against
#[derive(Clone)]
pub struct AppContext {
    config: MonitorConfig,
    source: Arc<dyn NeighborSource>,
    prober: Arc<dyn HostProber>,
    output_hook: OutputHook,
    presenter_factory: PresenterFactory,
    interrupt: InterruptSignal,
}

impl Default for AppContext {
    fn default() -> Self {
        Self::from_env()
    }
}

impl AppContext {
    /// System neighbor table, `ping` prober, env-derived timing, stdout output,
    /// terminal presenter and Ctrl+C as the stop signal.
    pub fn from_env() -> Self {
        let config = MonitorConfig::from_env();
        Self {
            config,
            source: Arc::new(SystemNeighborSource::default()),
            prober: Arc::new(PingProber::new(config.ping_timeout)),
            output_hook: Arc::new(|line| println!("{}", line)),
            presenter_factory: Arc::new(|| -> Box<dyn Presenter> {
                Box::new(TerminalPresenter::stdout())
            }),
            interrupt: Arc::new(|| -> Pin<Box<dyn Future<Output = ()> + Send>> {
                Box::pin(wait_for_interrupt())
            }),
        }
    }

    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_source(mut self, source: Arc<dyn NeighborSource>) -> Self {
        self.source = source;
        self
    }

    pub fn with_prober(mut self, prober: Arc<dyn HostProber>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_output_hook(mut self, hook: OutputHook) -> Self {
        self.output_hook = hook;
        self
    }

    pub fn with_presenter_factory(mut self, factory: PresenterFactory) -> Self {
        self.presenter_factory = factory;
        self
    }

    pub fn with_interrupt(mut self, interrupt: InterruptSignal) -> Self {
        self.interrupt = interrupt;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn source(&self) -> Arc<dyn NeighborSource> {
        Arc::clone(&self.source)
    }

    pub fn prober(&self) -> Arc<dyn HostProber> {
        Arc::clone(&self.prober)
    }

    pub fn emit(&self, line: &str) {
        (self.output_hook)(line);
    }

    pub fn presenter(&self) -> Box<dyn Presenter> {
        (self.presenter_factory)()
    }

    pub fn interrupt(&self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        (self.interrupt)()
    }
}

/// Resolves on Ctrl+C; never resolves if the handler cannot be installed.
async fn wait_for_interrupt() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        crate::log_error!("Unable to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the app by parsing CLI-style args and dispatching the command.
pub async fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let command = parse_cli_args(args)?;
    execute_command(command).await
}

/// Execute a pre-parsed command against the system collaborators.
pub async fn execute_command(command: CliCommand) -> Result<()> {
    execute_command_with_context(command, &AppContext::from_env()).await
}

/// Execute a pre-parsed command with an explicit context.
pub async fn execute_command_with_context(command: CliCommand, context: &AppContext) -> Result<()> {
    match command {
        CliCommand::Help => {
            context.emit(&usage_text());
            Ok(())
        }
        CliCommand::Version => {
            context.emit(&version_text());
            Ok(())
        }
        CliCommand::Scan => handle_scan(context).await,
        CliCommand::Watch(options) => handle_watch(options, context).await,
    }
}
