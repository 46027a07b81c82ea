use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Give rows typed in by hand a short id
    FillIds {
        #[arg(default_values_t = process::DEFAULT_FILL_TABLES.map(String::from))]
        tables: Vec<String>,
    },

    /// Swap a URL prefix in one column, e.g. after a deploy
    Rebase {
        table: String,

        column: String,

        from: String,

        to: String,
    },

    /// Print the row count and the first row of a table
    Inspect { table: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    server::init_tracing();

    let args = Args::parse();
    let store = process::open_store().await?;

    match args.command {
        Command::FillIds { tables } => {
            process::fill_ids(store.as_ref(), &tables).await?;
        }
        Command::Rebase {
            table,
            column,
            from,
            to,
        } => {
            process::rebase(store.as_ref(), &table, &column, &from, &to).await?;
        }
        Command::Inspect { table } => process::inspect(store.as_ref(), &table).await?,
    }

    Ok(())
}
