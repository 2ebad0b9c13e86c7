use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use nv_crypto::{generate_key_file, KeyProvider};
use nv_store::{NoteId, OwnerId, Store};
use std::path::PathBuf;
use tracing::info;

mod paths;
mod render;
mod settings;

use crate::render::render_notes;
use crate::settings::load_settings;

#[derive(Parser, Debug)]
#[command(name = "nv-cli")]
#[command(author, version, about = "Per-owner encrypted notes", long_about = None)]
struct Cli {
    /// SQLite database file (default: $NOTEVAULT_DB or <data dir>/notes.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Key file (default: $NOTEVAULT_KEY_FILE or <data dir>/secret.key)
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new random key file. Never overwrites an existing one.
    Keygen,

    /// Add a note with a title
    Add {
        #[arg(long)]
        owner: OwnerId,
        title: String,
        content: String,
    },

    /// View your notes
    List {
        #[arg(long)]
        owner: OwnerId,
        /// Print all notes as JSON instead of the capped text view
        #[arg(long)]
        json: bool,
    },

    /// Edit a note by its ID
    Edit {
        #[arg(long)]
        owner: OwnerId,
        note_id: NoteId,
        new_content: String,
    },

    /// Delete a note by its ID
    Delete {
        #[arg(long)]
        owner: OwnerId,
        note_id: NoteId,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nv_cli=info,nv_store=info,nv_crypto=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let key_path = paths::key_path(cli.key_file)?;

    if let Commands::Keygen = cli.command {
        generate_key_file(&key_path)?;
        println!("Key written to {}", key_path.display());
        return Ok(());
    }

    let store = open_store(cli.db, key_path).await?;
    let result = run_command(&store, cli.command).await;
    store.close().await;
    result
}

async fn open_store(db_flag: Option<PathBuf>, key_path: PathBuf) -> Result<Store> {
    let keys = KeyProvider::new(&key_path);
    keys.preload()
        .await
        .with_context(|| format!("loading note key from {}", key_path.display()))?;

    let db_path = paths::db_path(db_flag)?;
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = Store::open(&db_path, keys)
        .await
        .with_context(|| format!("opening note store at {}", db_path.display()))?;
    info!(db = %db_path.display(), "ready");
    Ok(store)
}

async fn run_command(store: &Store, command: Commands) -> Result<()> {
    match command {
        Commands::Keygen => Err(anyhow!("keygen does not use the store")),
        Commands::Add {
            owner,
            title,
            content,
        } => {
            let id = store.add(owner, &title, &content).await?;
            println!("Note added! (ID #{id})");
            Ok(())
        }
        Commands::List { owner, json } => {
            if json {
                let notes = store.list(owner).await?;
                println!("{}", serde_json::to_string_pretty(&notes)?);
            } else {
                let settings = load_settings(&paths::settings_path()?)?;
                let entries = store.list_entries(owner).await?;
                print!("{}", render_notes(&owner.to_string(), &entries, &settings));
            }
            Ok(())
        }
        Commands::Edit {
            owner,
            note_id,
            new_content,
        } => {
            store.edit(owner, note_id, &new_content).await?;
            println!("Edited note #{note_id} if it existed.");
            Ok(())
        }
        Commands::Delete { owner, note_id } => {
            store.delete(owner, note_id).await?;
            println!("Deleted note #{note_id} if it existed.");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nv_crypto::NoteKey;

    #[test]
    fn cli_parses_note_commands() {
        let cli = Cli::parse_from(["nv-cli", "add", "--owner", "1", "shopping", "milk, eggs"]);
        match cli.command {
            Commands::Add {
                owner,
                title,
                content,
            } => {
                assert_eq!(owner, 1);
                assert_eq!(title, "shopping");
                assert_eq!(content, "milk, eggs");
            }
            other => panic!("unexpected command {other:?}"),
        }

        let cli = Cli::parse_from(["nv-cli", "--db", "x.db", "delete", "--owner", "9", "3"]);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(cli.command, Commands::Delete { owner: 9, note_id: 3 }));
    }

    #[tokio::test]
    async fn commands_drive_the_store() {
        let store = Store::open_in_memory(KeyProvider::from_key(NoteKey::from_bytes([1u8; 32])))
            .await
            .unwrap();

        run_command(
            &store,
            Commands::Add {
                owner: 1,
                title: "todo".into(),
                content: "finish report".into(),
            },
        )
        .await
        .unwrap();
        run_command(
            &store,
            Commands::Edit {
                owner: 1,
                note_id: 1,
                new_content: "report done".into(),
            },
        )
        .await
        .unwrap();
        run_command(&store, Commands::Delete { owner: 2, note_id: 1 })
            .await
            .unwrap();

        let notes = store.list(1).await.unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].content, "report done");
    }

    #[tokio::test]
    async fn missing_key_fails_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_store(
            Some(dir.path().join("notes.db")),
            dir.path().join("secret.key"),
        )
        .await
        .err()
        .expect("startup must fail without a key");
        assert!(format!("{err:#}").contains("not found"));
        assert!(!dir.path().join("notes.db").exists());
    }
}
