/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `init_db` - Create the chat database tables
- `chat`    - Interactive image chat
*/

use crate::chat::{ChatContext, ChatOrchestrator, ConversationTurn};
use crate::config::Config;
use crate::error::{ChatWarning, Result};
use crate::storage::SqliteStorage;
use colored::Colorize;

// Special commands parser for the chat prompt
pub mod special_commands;

/// Create the database tables and report where they live
pub fn init_db() -> Result<()> {
    let storage = SqliteStorage::new()?;
    let accounts = storage.count_accounts()?;

    println!("Database ready: {}", storage.db_path().display());
    println!("Accounts: {}", accounts);
    Ok(())
}

// Chat command handler
pub mod chat {
    //! Interactive chat handler.
    //!
    //! Opens the store, builds the configured vision provider and runs a
    //! readline loop that feeds every line through the orchestrator.

    use super::*;
    use crate::attachment::AttachedImage;
    use crate::commands::special_commands::{
        contains_credentials, parse_special_command, print_help, SpecialCommand,
    };
    use crate::providers::create_provider;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use std::path::Path;

    /// Start the interactive chat
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `provider_name` - Optional override for the configured provider
    pub async fn run_chat(config: Config, provider_name: Option<String>) -> Result<()> {
        let provider_type = provider_name
            .as_deref()
            .unwrap_or(&config.provider.provider_type);

        let storage = SqliteStorage::new()?;
        let provider = create_provider(provider_type, &config.provider)?;
        let orchestrator =
            ChatOrchestrator::new(storage, provider).with_guest_quota(config.chat.guest_quota);

        let mut ctx = ChatContext::new();
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&orchestrator);

        loop {
            match rl.readline(&format_prompt(&ctx)) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if !contains_credentials(trimmed) {
                        rl.add_history_entry(trimmed)?;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            println!("{}\n", e.to_string().yellow());
                            continue;
                        }
                    };

                    if command == SpecialCommand::Exit {
                        break;
                    }

                    if let Err(e) =
                        handle_command(&orchestrator, &mut ctx, command, trimmed, &config).await
                    {
                        report_error(&e);
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("EOF");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_command(
        orchestrator: &ChatOrchestrator,
        ctx: &mut ChatContext,
        command: SpecialCommand,
        input: &str,
        config: &Config,
    ) -> Result<()> {
        match command {
            SpecialCommand::SignUp {
                username,
                password,
                confirm,
            } => {
                orchestrator.sign_up(&username, &password, &confirm)?;
                println!("{}\n", "Account created! Please login.".green());
            }
            SpecialCommand::Login { username, password } => {
                orchestrator.login(ctx, &username, &password)?;
                println!("{}\n", format!("Welcome, {}!", username).green());
                print_sessions(&orchestrator.list_sessions(ctx)?);
            }
            SpecialCommand::Logout => {
                orchestrator.logout(ctx);
                println!("Logged out.\n");
            }
            SpecialCommand::NewSession(name) => {
                let session = orchestrator.create_session(ctx, &name)?;
                println!("{}\n", format!("Session {} created", session).green());
            }
            SpecialCommand::ListSessions => {
                print_sessions(&orchestrator.list_sessions(ctx)?);
            }
            SpecialCommand::OpenSession(session) => {
                orchestrator.open_session(ctx, session)?;
                println!("Opened session {}\n", session);
                print_conversation(&ctx.conversation);
            }
            SpecialCommand::RenameSession { id, name } => {
                let sessions = orchestrator.rename_session(ctx, id, &name)?;
                print_sessions(&sessions);
            }
            SpecialCommand::DeleteSession(session) => {
                let sessions = orchestrator.delete_session(ctx, session)?;
                println!("Deleted session {}\n", session);
                print_sessions(&sessions);
            }
            SpecialCommand::AttachImage(path) => {
                let image = AttachedImage::load(Path::new(&path), config.chat.max_image_dimension)?;
                let (width, height) = image.dimensions();
                println!(
                    "Attached {} ({}x{}, {})\n",
                    image.file_name().cyan(),
                    width,
                    height,
                    image.mime_type()
                );
                orchestrator.attach_image(ctx, image);
            }
            SpecialCommand::ShowHistory => print_conversation(&ctx.conversation),
            SpecialCommand::ShowStatus => print_status(orchestrator, ctx),
            SpecialCommand::Help => print_help(),
            SpecialCommand::Exit => {}
            SpecialCommand::None => {
                let turn = orchestrator.ask(ctx, input).await?;
                println!("{}\n{}\n", "Bot:".green().bold(), turn.answer);
            }
        }
        Ok(())
    }

    fn report_error(error: &anyhow::Error) {
        match error.downcast_ref::<ChatWarning>() {
            Some(warning) => println!("{}\n", warning.to_string().yellow()),
            None => {
                tracing::error!("Chat action failed: {:#}", error);
                println!("{}\n", format!("Error: {:#}", error).red());
            }
        }
    }

    fn format_prompt(ctx: &ChatContext) -> String {
        let who = ctx.username().unwrap_or("guest");
        let image = if ctx.attached_image.is_some() { "*" } else { "" };
        match ctx.selected_session {
            Some(session) => format!("[{}#{}{}] >> ", who, session, image),
            None => format!("[{}{}] >> ", who, image),
        }
    }

    fn print_welcome_banner(orchestrator: &ChatOrchestrator) {
        println!("{}", "Saanra - Image Chat".bold());
        println!("Provider: {}", orchestrator.provider_name().cyan());
        println!(
            "Guests may ask {} question(s). Attach a picture with /image <path>.",
            orchestrator.guest_quota()
        );
        println!("Type '/help' for commands, 'exit' to quit.\n");
    }

    fn print_status(orchestrator: &ChatOrchestrator, ctx: &ChatContext) {
        println!("User:     {}", ctx.username().unwrap_or("guest"));
        match ctx.selected_session {
            Some(session) => println!("Session:  {}", session),
            None => println!("Session:  none"),
        }
        match &ctx.attached_image {
            Some(image) => println!("Image:    {}", image.file_name()),
            None => println!("Image:    none"),
        }
        if !ctx.is_authenticated() {
            println!(
                "Free questions used: {}/{}",
                ctx.guest_messages,
                orchestrator.guest_quota()
            );
        }
        println!("Turns:    {}\n", ctx.conversation.len());
    }
}

/// Print sessions as a table, newest first
pub fn print_sessions(sessions: &[crate::storage::SessionSummary]) {
    use prettytable::{format, Table};

    if sessions.is_empty() {
        println!("{}\n", "No sessions yet. Create one with /new <name>.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "ID".bold(),
        "Name".bold(),
        "Created".bold()
    ]);

    for session in sessions {
        let name = if session.name.chars().count() > 40 {
            format!("{}...", session.name.chars().take(37).collect::<String>())
        } else {
            session.name.clone()
        };
        let created = session.created_at.format("%Y-%m-%d %H:%M").to_string();

        table.add_row(prettytable::row![session.id.to_string().cyan(), name, created]);
    }

    println!("\nYour Sessions:");
    table.printstd();
    println!();
}

/// Print the conversation view, oldest turn first
pub fn print_conversation(turns: &[ConversationTurn]) {
    if turns.is_empty() {
        println!("No messages yet.\n");
        return;
    }

    for turn in turns {
        if !turn.question.is_empty() {
            println!("{} {}", "You:".blue().bold(), turn.question);
        }
        if !turn.answer.is_empty() {
            println!("{} {}", "Bot:".green().bold(), turn.answer);
        }
    }
    println!();
}
