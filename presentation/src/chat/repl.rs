//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use colored::Colorize;
use rag_application::{DispatchError, Dispatcher, NoProgress, ProgressNotifier};
use rag_domain::{AgentContext, AgentDomain};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// What the loop should do after a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandOutcome {
    Continue,
    Exit,
}

/// Interactive chat REPL over one agent session
pub struct ChatRepl {
    dispatcher: Arc<Dispatcher>,
    context: AgentContext,
    show_progress: bool,
    history_file: Option<PathBuf>,
}

impl ChatRepl {
    /// Start a fresh session with the agent of `domain`
    pub fn new(dispatcher: Arc<Dispatcher>, domain: AgentDomain) -> Result<Self, DispatchError> {
        let context = dispatcher.new_session(domain)?;
        Ok(Self {
            dispatcher,
            context,
            show_progress: true,
            history_file: dirs::data_dir().map(|p| p.join("hybrid-rag").join("history.txt")),
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Override where line-editor history is kept (`None` disables it)
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    pub fn domain(&self) -> AgentDomain {
        self.context.domain
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        if let Some(path) = &self.history_file {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline(&format!("{}> ", self.context.domain)) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        if self.handle_command(line) == CommandOutcome::Exit {
                            break;
                        }
                        continue;
                    }

                    let _ = rl.add_history_entry(line);
                    self.process_question(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        if let Some(path) = &self.history_file {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│           Hybrid RAG - Chat Mode            │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Agent: {}", self.context.domain.as_str().bold());
        if !self.context.domain.is_multi_turn() {
            println!(
                "{}",
                "This agent answers each question on its own; earlier turns are not remembered."
                    .dimmed()
            );
        }
        println!();
        Self::print_help();
    }

    fn print_help() {
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /sources          - Show sources of the last answer");
        println!("  /clear            - Forget the conversation so far");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    fn handle_command(&mut self, cmd: &str) -> CommandOutcome {
        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandOutcome::Exit
            }
            "/help" | "/h" | "/?" => {
                println!();
                Self::print_help();
                CommandOutcome::Continue
            }
            "/clear" => {
                self.context.reset();
                println!("Conversation cleared.");
                CommandOutcome::Continue
            }
            "/sources" => {
                if self.context.merged_results.is_empty() {
                    println!("No sources yet.");
                } else {
                    print!("{}", ConsoleFormatter::format_sources(&self.context.merged_results));
                }
                CommandOutcome::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandOutcome::Continue
            }
        }
    }

    async fn process_question(&mut self, question: &str) {
        println!();

        let cancel = CancellationToken::new();
        let watcher = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            })
        };

        let reporter = ProgressReporter::new();
        let progress: &dyn ProgressNotifier = if self.show_progress {
            &reporter
        } else {
            &NoProgress
        };

        let result = self
            .dispatcher
            .dispatch_with(question, &mut self.context, progress, &cancel)
            .await;
        watcher.abort();

        match result {
            Ok(response) => println!("{}", ConsoleFormatter::format(&response)),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
        println!();
    }
}
