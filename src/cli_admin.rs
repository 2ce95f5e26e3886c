use anyhow::{bail, Context, Result};
use clap::builder::styling::{AnsiColor, Color, Style, Styles};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use unread_posts_server::account::{AccountManager, AccountStore, SqliteAccountStore};
use unread_posts_server::content::{
    ContentQuery, ContentStore, NewPost, PostOrder, PostStatus, PostType, SqliteContentStore,
};
use unread_posts_server::read_state::{
    PersistentReadStateStore, PostId, ReadStateStore, DEFAULT_READ_POSTS_META_KEY,
};

fn get_styles() -> Styles {
    Styles::styled()
        .header(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .usage(
            Style::new()
                .bold()
                .fg_color(Some(Color::Ansi(AnsiColor::Yellow))),
        )
        .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::BrightBlack))))
}

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser)]
#[command(styles = get_styles())]
struct CliArgs {
    /// Directory holding the server databases.
    #[clap(long, value_parser = parse_path)]
    db_dir: PathBuf,

    /// Public base URL, used to print permalinks.
    #[clap(long, default_value = "http://localhost:3001")]
    site_url: String,

    /// Account metadata key holding the read posts.
    #[clap(long, default_value = DEFAULT_READ_POSTS_META_KEY)]
    read_posts_meta_key: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Creates an account with a password.
    AddAccount {
        handle: String,
        password: String,
        /// Grants access to the settings endpoints.
        #[clap(long)]
        admin: bool,
    },

    /// Replaces the password of an account.
    SetPassword { handle: String, password: String },

    /// Grants or revokes admin rights.
    SetAdmin {
        handle: String,
        #[clap(long)]
        revoke: bool,
    },

    /// Shows all accounts.
    ListAccounts,

    /// Registers a post type, or updates an existing one.
    AddPostType {
        name: String,
        label: String,
        /// Keeps the type out of the listings' type choices.
        #[clap(long)]
        private: bool,
    },

    /// Shows all post types.
    ListPostTypes,

    /// Creates a post and prints its id.
    AddPost {
        title: String,
        #[clap(long, default_value = "")]
        content: String,
        #[clap(long = "type", default_value = "post")]
        post_type: String,
        /// Explicit id, otherwise the next free one.
        #[clap(long)]
        id: Option<PostId>,
        #[clap(long)]
        draft: bool,
    },

    /// Shows the published posts, newest first.
    ListPosts,

    /// Shows the posts an account has read.
    ShowReadPosts { handle: String },

    /// Forgets every post an account has read.
    ClearReadPosts { handle: String },
}

struct Stores {
    accounts: Arc<SqliteAccountStore>,
    content: SqliteContentStore,
}

fn account_id(accounts: &SqliteAccountStore, handle: &str) -> Result<usize> {
    match accounts.get_account_by_handle(handle)? {
        Some(account) => Ok(account.id),
        None => bail!("No account with handle {}", handle),
    }
}

fn read_posts_store(
    stores: &Stores,
    handle: &str,
    meta_key: &str,
) -> Result<PersistentReadStateStore> {
    let account_id = account_id(&stores.accounts, handle)?;
    Ok(PersistentReadStateStore::load(
        stores.accounts.clone(),
        account_id,
        meta_key,
    )?)
}

fn execute(command: Command, stores: &Stores, meta_key: &str) -> Result<()> {
    let manager = AccountManager::new(stores.accounts.clone());
    match command {
        Command::AddAccount {
            handle,
            password,
            admin,
        } => {
            let id = manager.create_account(&handle, &password, admin)?;
            println!("Created account {} with id {}", handle, id);
        }
        Command::SetPassword { handle, password } => {
            manager.set_password(&handle, &password)?;
            println!("Password of {} updated", handle);
        }
        Command::SetAdmin { handle, revoke } => {
            manager.set_admin(&handle, !revoke)?;
            println!("{} is {}an admin", handle, if revoke { "not " } else { "" });
        }
        Command::ListAccounts => {
            let accounts = stores.accounts.list_accounts()?;
            if accounts.is_empty() {
                println!("(no accounts)");
            }
            for account in accounts {
                println!(
                    "{:>5}  {}{}",
                    account.id,
                    account.handle,
                    if account.is_admin { " (admin)" } else { "" }
                );
            }
        }
        Command::AddPostType {
            name,
            label,
            private,
        } => {
            stores.content.put_post_type(&PostType {
                name: name.clone(),
                label,
                public: !private,
            })?;
            println!("Post type {} saved", name);
        }
        Command::ListPostTypes => {
            for post_type in stores.content.get_post_types(false)? {
                println!(
                    "{:<16} {}{}",
                    post_type.name,
                    post_type.label,
                    if post_type.public { "" } else { " (private)" }
                );
            }
        }
        Command::AddPost {
            title,
            content,
            post_type,
            id,
            draft,
        } => {
            let id = stores.content.create_post(NewPost {
                id,
                post_type,
                status: if draft {
                    PostStatus::Draft
                } else {
                    PostStatus::Publish
                },
                title,
                content,
                published: None,
            })?;
            println!("Created post {} at {}", id, stores.content.permalink(id));
        }
        Command::ListPosts => {
            let result = stores.content.query_posts(&ContentQuery {
                post_types: vec![],
                status: PostStatus::Publish,
                exclude: vec![],
                order: PostOrder::Date,
                limit: None,
            })?;
            println!("{} published posts", result.found);
            for item in result.items {
                println!("{:>5}  [{}] {}", item.id, item.post_type, item.title);
            }
        }
        Command::ShowReadPosts { handle } => {
            let store = read_posts_store(stores, &handle, meta_key)?;
            let read_ids: Vec<String> = store.read_ids().iter().map(|id| id.to_string()).collect();
            if read_ids.is_empty() {
                println!("{} has not read any post", handle);
            } else {
                println!("{} has read: {}", handle, read_ids.join(", "));
            }
        }
        Command::ClearReadPosts { handle } => {
            let mut store = read_posts_store(stores, &handle, meta_key)?;
            store.delete_all()?;
            println!("Read posts of {} cleared", handle);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    if !cli_args.db_dir.is_dir() {
        bail!("Database directory does not exist: {:?}", cli_args.db_dir);
    }

    let stores = Stores {
        accounts: Arc::new(
            SqliteAccountStore::new(cli_args.db_dir.join("accounts.db"))
                .context("Failed to open accounts database")?,
        ),
        content: SqliteContentStore::new(
            cli_args.db_dir.join("content.db"),
            cli_args.site_url.trim_end_matches('/'),
        )
        .context("Failed to open content database")?,
    };

    execute(cli_args.command, &stores, &cli_args.read_posts_meta_key)
}
