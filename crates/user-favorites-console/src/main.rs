// SPDX-License-Identifier: AGPL-3.0
// User Favorites Console - terminal frontend

mod app;

use app::{App, Command, HELP};
use tokio::io::{AsyncBufReadExt, BufReader};
use user_favorites_core::{AppSettings, SettingsStore};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // Logs go to stderr so they don't interleave with the list on stdout
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("user_favorites_console=info".parse().expect("valid directive"))
                .add_directive("user_favorites_core=info".parse().expect("valid directive")),
        )
        .init();

    tracing::info!("Starting User Favorites v{}", env!("CARGO_PKG_VERSION"));

    let settings = match SettingsStore::new() {
        Ok(store) => store.get(),
        Err(e) => {
            tracing::warn!("Settings unavailable, using defaults: {}", e);
            AppSettings::default()
        }
    };

    let mut app = App::from_settings(&settings);
    app.start().await;
    println!("{}", app.render());
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match Command::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                println!("{}", message);
                continue;
            }
        };

        if command == Command::Help {
            println!("{}", HELP);
            continue;
        }

        match app.handle(command).await {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("{}", e),
        }

        app.sync();
        println!("{}", app.render());
    }

    Ok(())
}
