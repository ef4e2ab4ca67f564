// SPDX-FileCopyrightText: 2024 Clinic Desk contributors
//
// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]
#![deny(elided_lifetimes_in_paths)]
#![warn(
    rust_2018_idioms,
    future_incompatible,
    unused,
    unused_lifetimes,
    unused_qualifications,
    unused_results,
    anonymous_parameters,
    deprecated_in_future,
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    keyword_idents,
    macro_use_extern_crate,
    missing_doc_code_examples,
    private_doc_tests,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::unseparated_literal_suffix,
    clippy::decimal_literal_representation,
    clippy::single_char_lifetime_names,
    clippy::fallible_impl_from,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::wildcard_enum_match_arm,
    clippy::deref_by_slicing,
    clippy::default_numeric_fallback,
    clippy::shadow_reuse,
    clippy::clone_on_ref_ptr,
    clippy::todo,
    clippy::string_add,
    clippy::use_debug,
    clippy::future_not_send
)]
#![cfg_attr(not(test), warn(clippy::panic_in_result_fn))]

mod api;
mod app;
mod command;
mod dashboard;
mod error;
mod gate;
mod http;
mod login;
mod metadata;
mod model;
mod password;
mod storage;
#[cfg(test)]
mod testing;
mod token_store;
mod view;

use std::{path::PathBuf, process, sync::Arc};

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use command::Command as _;
use error::Result;
use log::{error, warn};
use serde::{Deserialize, Serialize};
use url::Url;

#[derive(Debug, Subcommand)]
enum Command {
    Login(command::session::Login),
    Register(command::session::Register),
    Logout(command::session::Logout),
    Status(command::session::Status),
    Dashboard(command::dashboard::Command),
    Doctors(command::doctors::Command),
    Patients(command::care::Patients),
    Appointments(command::care::Appointments),
    Prescribe(command::care::Prescribe),
    Slots(command::booking::Slots),
    Book(command::booking::Book),
}

#[async_trait]
impl command::Command for Command {
    async fn execute(self, app: &app::App) -> Result<()> {
        match self {
            Self::Login(cmd) => cmd.execute(app).await,
            Self::Register(cmd) => cmd.execute(app).await,
            Self::Logout(cmd) => cmd.execute(app).await,
            Self::Status(cmd) => cmd.execute(app).await,
            Self::Dashboard(cmd) => cmd.execute(app).await,
            Self::Doctors(cmd) => cmd.execute(app).await,
            Self::Patients(cmd) => cmd.execute(app).await,
            Self::Appointments(cmd) => cmd.execute(app).await,
            Self::Prescribe(cmd) => cmd.execute(app).await,
            Self::Slots(cmd) => cmd.execute(app).await,
            Self::Book(cmd) => cmd.execute(app).await,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// The base URL of the clinic backend.
    #[arg(long, env = "CLINIC_DESK_URL", default_value = "http://localhost:8080", value_parser = Url::parse)]
    url: Url,

    /// Keep the session in memory only. It ends when the command exits.
    #[arg(long)]
    ephemeral: bool,

    /// Where to keep the session instead of the platform's data directory.
    #[arg(long, env = "CLINIC_DESK_STATE_DIR", value_hint = clap::ValueHint::DirPath)]
    state_dir: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

fn session_storage<T: Send + Serialize + Sync + for<'de> Deserialize<'de> + Clone + 'static>(
    args: &Args,
    key: &str,
) -> Box<dyn storage::Storage<T>> {
    if !args.ephemeral {
        if let Some(ref dir) = args.state_dir {
            return Box::new(storage::File::in_dir(dir, key));
        }

        if let Some(file_storage) = storage::File::new(key) {
            return Box::new(file_storage);
        }
        warn!("We need to fall back to in-memory storage because there is no data directory for this user");
    }

    Box::new(storage::Memory::<T>::new())
}

async fn run(args: Args) -> Result<()> {
    let store = token_store::TokenStore::new(
        session_storage(&args, metadata::CREDENTIAL_KEY),
        session_storage(&args, metadata::IDENTITY_KEY),
    );
    let app = app::App::new(
        args.url,
        store,
        Arc::new(gate::Terminal),
        Box::new(password::RpasswordPrompt),
    )?;

    args.command.execute(&app).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let logger_env = env_logger::Env::new()
        .filter_or("CLINIC_DESK_LOG", "warn")
        .write_style("CLINIC_DESK_LOG_STYLE");
    env_logger::Builder::from_env(logger_env).init();

    if let Err(e) = run(Args::parse()).await {
        error!("We encountered an error: {}", e);
        if let error::Error::Api(ref api) = e {
            if api.kind() == error::ApiErrorKind::Network {
                error!("Check that the clinic backend is running, or point --url at it");
            }
        }
        process::exit(1);
    };
}
