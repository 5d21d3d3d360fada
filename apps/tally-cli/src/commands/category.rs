//! Category commands

use clap::{Args, Subcommand};
use serde_json::{json, Value};

use crate::commands::to_json;
use crate::error::CliError;
use crate::App;

#[derive(Debug, Args)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// Add a category
    Add { name: String },
    /// Delete a category (its products become uncategorised)
    Delete { name: String },
    /// List categories by name
    List,
}

pub async fn execute(app: &App, args: CategoryArgs) -> Result<Value, CliError> {
    let categories = app.db.categories();

    match args.command {
        CategoryCommand::Add { name } => to_json(&categories.add(&name).await?),
        CategoryCommand::Delete { name } => {
            categories.delete(&name).await?;
            Ok(json!({ "name": name, "deleted": true }))
        }
        CategoryCommand::List => to_json(&categories.list().await?),
    }
}
