// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::import::import_catalog;
use crate::cmd::migrate::migrate_records;
use crate::cmd::serve::server::ServerConfig;
use crate::cmd::serve::server::start_server;
use crate::config::Config;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Serve the review API.
    Serve {
        /// Path to the configuration file. By default, `repeetcode.toml` in the working directory is used if present.
        #[arg(long)]
        config: Option<PathBuf>,
        /// The host address to bind to. Overrides the configuration file.
        #[arg(long)]
        host: Option<String>,
        /// The port to use for the web server. Overrides the configuration file.
        #[arg(long)]
        port: Option<u16>,
        /// Path to the SQLite database. Overrides the configuration file.
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Load a LeetCode problem list (`problemslist.json`) into the problem catalog.
    ImportCatalog {
        /// Path to the problem list JSON file.
        file: PathBuf,
        /// Path to the configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to the SQLite database. Overrides the configuration file.
        #[arg(long)]
        database: Option<PathBuf>,
    },
    /// Convert version 1 problem records and store them for a user.
    Migrate {
        /// Path to a JSON array of version 1 records.
        file: PathBuf,
        /// The user the records belong to.
        #[arg(long)]
        user: String,
        /// Path to the configuration file.
        #[arg(long)]
        config: Option<PathBuf>,
        /// Path to the SQLite database. Overrides the configuration file.
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Serve {
            config,
            host,
            port,
            database,
        } => {
            let mut config = Config::load(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(database) = database {
                config.database = database;
            }
            start_server(ServerConfig::from_config(config)).await
        }
        Command::ImportCatalog {
            file,
            config,
            database,
        } => {
            let config = Config::load(config.as_deref())?;
            let database = database.unwrap_or(config.database);
            import_catalog(&database, &file).map(|_| ())
        }
        Command::Migrate {
            file,
            user,
            config,
            database,
        } => {
            let config = Config::load(config.as_deref())?;
            let database = database.unwrap_or(config.database);
            migrate_records(&database, &file, &user, &config.policy).map(|_| ())
        }
    }
}
