use clap::{Subcommand, ValueEnum};
use mtlresto_core::{ContactForm, SubmissionOutcome, ValidationMode};

/// Sub-commands available under `contact`.
#[derive(Debug, Subcommand)]
pub enum ContactCommands {
    /// Validate and store one contact message
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        /// Validation rules applied before anything is written
        #[arg(long, value_enum, default_value = "strict")]
        mode: ModeArg,
    },
    /// List the most recent messages
    List {
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Presence,
    Strict,
}

impl From<ModeArg> for ValidationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Presence => ValidationMode::Presence,
            ModeArg::Strict => ValidationMode::Strict,
        }
    }
}

pub(crate) async fn run_contact(
    pool: &sqlx::PgPool,
    command: ContactCommands,
) -> anyhow::Result<()> {
    match command {
        ContactCommands::Send {
            name,
            email,
            message,
            mode,
        } => {
            let form = ContactForm {
                name,
                email,
                message,
            };
            if let Err(e) = form.validate(mode.into()) {
                anyhow::bail!("{e}");
            }

            let outcome = match mtlresto_db::insert_contact_message(pool, &form).await {
                Ok(stored) => {
                    tracing::info!(message_id = stored.id, "contact message stored");
                    SubmissionOutcome::Sent
                }
                Err(e) => {
                    tracing::error!(error = %e, "failed to store contact message");
                    SubmissionOutcome::failed()
                }
            };

            match outcome {
                SubmissionOutcome::Sent => println!("Message sent successfully!"),
                SubmissionOutcome::Failed(message) => anyhow::bail!("{message}"),
            }
        }
        ContactCommands::List { limit } => {
            let messages = mtlresto_db::list_contact_messages(pool, limit).await?;
            for m in &messages {
                println!(
                    "{:>6}  {}  {} <{}>",
                    m.id,
                    m.received_at.format("%Y-%m-%d %H:%M:%S"),
                    m.name,
                    m.email
                );
                println!("        {}", m.message);
            }
            println!("{} message(s)", messages.len());
        }
    }
    Ok(())
}
