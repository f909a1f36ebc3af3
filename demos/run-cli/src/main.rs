//! Demo shell for the `run` command over an in-memory connection.
//!
//! Run with: cargo run -p run-cli-demo -- run -b demo:type=Counter add 5
//!
//! Without arguments an interactive prompt starts; try `bean demo:type=Text`
//! followed by `run join "[a, b]" -` or `run -m stats [3,1,2]`.

mod demo;

use std::io::{self, BufRead, Write};

use clap::{Args, Parser, Subcommand};
use mbean_run_core::{BeanResolver, Output};
use mbean_run_executor::{RunOptions, execute, suggest_operation_names};
use mbean_run_session::{MemoryConnection, SessionBeans, WriterOutput};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "mbean-run", about = "Invoke MBean operations")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Invoke an MBean operation
    #[command(after_help = "Syntax is \n run <operationName> [parameter1] [parameter2]")]
    Run(RunArgs),
    /// Show or set the current bean
    Bean { name: Option<String> },
    /// Show or set the default domain
    Domain { name: Option<String> },
    /// List the operations of a bean
    Operations {
        /// MBean to inspect
        #[arg(short, long)]
        bean: Option<String>,
    },
}

#[derive(Args, Debug)]
struct RunArgs {
    /// MBean to invoke
    #[arg(short, long)]
    bean: Option<String>,
    /// Domain of MBean to invoke
    #[arg(short, long)]
    domain: Option<String>,
    /// Measure the time spent on the invocation of operation
    #[arg(short, long)]
    measure: bool,
    /// Require parameters to have specific types (comma separated)
    #[arg(short, long)]
    types: Option<String>,
    /// Flag for quotation marks
    #[arg(short, long = "quots")]
    quots: bool,
    /// The first parameter is operation name, which is followed by list of arguments
    #[arg(allow_negative_numbers = true)]
    parameters: Vec<String>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        Self {
            bean: args.bean,
            domain: args.domain,
            measure: args.measure,
            types: args.types,
            show_quotation_marks: args.quots,
            parameters: args.parameters,
        }
    }
}

struct Shell {
    connection: MemoryConnection,
    beans: SessionBeans,
    output: WriterOutput<io::Stdout, io::Stderr>,
}

impl Shell {
    async fn dispatch(&mut self, command: Command) -> anyhow::Result<()> {
        match command {
            Command::Run(args) => {
                execute(args.into(), &self.beans, &self.connection, &self.output).await?;
            }
            Command::Bean { name: Some(name) } => {
                let resolved = self.beans.resolve(Some(name.as_str()), None);
                self.beans.set_bean(resolved.map(|b| b.to_string()));
                self.output.print_message(&format!("#bean is set to {name}"));
            }
            Command::Bean { name: None } => {
                self.output.println(self.beans.bean().unwrap_or("null"));
            }
            Command::Domain { name: Some(name) } => {
                self.output.print_message(&format!("#domain is set to {name}"));
                self.beans.set_domain(Some(name));
            }
            Command::Domain { name: None } => {
                self.output.println(self.beans.domain().unwrap_or("null"));
            }
            Command::Operations { bean } => {
                let target = self
                    .beans
                    .resolve(bean.as_deref(), None)
                    .ok_or_else(|| anyhow::anyhow!("No bean selected"))?;
                for name in suggest_operation_names(&self.connection, &target).await? {
                    self.output.println(&name);
                }
            }
        }
        Ok(())
    }

    async fn interactive(&mut self) -> anyhow::Result<()> {
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("$>");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if matches!(line, "quit" | "exit" | "bye") {
                break;
            }

            let Some(words) = shlex::split(line) else {
                self.output.print_message("#Unbalanced quotes in command line");
                continue;
            };
            let cli = match Cli::try_parse_from(std::iter::once("mbean-run".to_string()).chain(words)) {
                Ok(cli) => cli,
                Err(e) => {
                    let _ = e.print();
                    continue;
                }
            };
            if let Some(command) = cli.command {
                if let Err(e) = self.dispatch(command).await {
                    tracing::debug!(error = ?e, "command failed");
                    self.output.print_message(&format!("#{e}"));
                }
            }
        }
        Ok(())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let mut shell = Shell {
        connection: demo::connection()?,
        beans: SessionBeans::with_bean(demo::COUNTER),
        output: WriterOutput::stdio(),
    };
    tracing::info!(
        beans = ?[demo::COUNTER, demo::TEXT, demo::MEMORY],
        "demo connection ready"
    );

    match Cli::parse().command {
        Some(command) => shell.dispatch(command).await,
        None => shell.interactive().await,
    }
}
