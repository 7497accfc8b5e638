use clap::{Args, Subcommand};
use mtlresto_core::{AppConfig, ProfileEditor, ProfileUpdate, UserProfile};

/// Sub-commands available under `profile`.
#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    /// Print the stored profile
    Show {
        /// Profile to show (defaults to `MTLRESTO_DEFAULT_USER_ID`)
        #[arg(long)]
        user_id: Option<String>,
    },
    /// Stage the given fields and save the whole document
    Edit {
        /// Profile to edit (defaults to `MTLRESTO_DEFAULT_USER_ID`)
        #[arg(long)]
        user_id: Option<String>,
        #[command(flatten)]
        fields: ProfileFieldArgs,
    },
}

#[derive(Debug, Default, Args)]
pub struct ProfileFieldArgs {
    #[arg(long)]
    pub first_name: Option<String>,
    #[arg(long)]
    pub last_name: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    /// Remote image URL; wins over `--uploaded-image`
    #[arg(long)]
    pub image_url: Option<String>,
    /// Reference to an uploaded image preview
    #[arg(long)]
    pub uploaded_image: Option<String>,
}

impl From<ProfileFieldArgs> for ProfileUpdate {
    fn from(args: ProfileFieldArgs) -> Self {
        ProfileUpdate {
            first_name: args.first_name,
            last_name: args.last_name,
            phone: args.phone,
            address: args.address,
            image_url: args.image_url,
            uploaded_image: args.uploaded_image,
        }
    }
}

/// Picks the explicit `--user-id`, else the configured default.
pub(crate) fn resolve_user_id(
    explicit: Option<String>,
    config: &AppConfig,
) -> anyhow::Result<String> {
    explicit
        .or_else(|| config.default_user_id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| anyhow::anyhow!("--user-id is required when MTLRESTO_DEFAULT_USER_ID is not set"))
}

pub(crate) async fn run_profile(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: ProfileCommands,
) -> anyhow::Result<()> {
    match command {
        ProfileCommands::Show { user_id } => {
            let user_id = resolve_user_id(user_id, config)?;
            let profile = load_profile(pool, &user_id).await?;
            print_profile(&profile);
        }
        ProfileCommands::Edit { user_id, fields } => {
            let user_id = resolve_user_id(user_id, config)?;
            let stored = load_profile(pool, &user_id).await?;

            let mut editor = ProfileEditor::new(stored);
            editor.start_editing();
            editor.apply(fields.into());
            if !editor.has_changes() {
                println!("no changes for {user_id}");
                return Ok(());
            }

            let saved = mtlresto_db::save_profile(pool, &editor.staged()).await?;
            editor.mark_saved(saved);
            tracing::info!(user_id = %user_id, "profile saved");
            print_profile(editor.stored());
        }
    }
    Ok(())
}

async fn load_profile(pool: &sqlx::PgPool, user_id: &str) -> anyhow::Result<UserProfile> {
    match mtlresto_db::get_profile(pool, user_id).await {
        Ok(profile) => Ok(profile),
        Err(mtlresto_db::DbError::NotFound) => anyhow::bail!("profile '{user_id}' not found"),
        Err(e) => Err(e.into()),
    }
}

fn print_profile(profile: &UserProfile) {
    println!("{}", profile.user_id);
    println!("  name:    {} {}", profile.first_name, profile.last_name);
    println!("  email:   {}", profile.email);
    println!("  phone:   {}", profile.phone);
    println!("  address: {}", profile.address);
    println!(
        "  image:   {}",
        profile.profile_image.as_deref().unwrap_or("\u{2014}")
    );
}
