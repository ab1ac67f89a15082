//! CLI command definitions and execution
//!
//! Mirrors the chat front end's operation set: key management, activation
//! channel, custom prompt, and a one-shot ask that exercises the fallback
//! dispatcher.

use anyhow::{Context, Result};
use clap::Subcommand;
use keywarden_core::{Dispatcher, TenantStore};
use log::warn;
use std::sync::Arc;

use crate::output::mask_key;

#[derive(Subcommand)]
pub enum Command {
    /// Manage a tenant's API keys
    #[command(subcommand)]
    Key(KeyCommand),

    /// Manage the activation channel
    #[command(subcommand)]
    Channel(ChannelCommand),

    /// Manage the custom system prompt
    #[command(subcommand)]
    Prompt(PromptCommand),

    /// Send one message through the fallback dispatcher
    Ask {
        /// Tenant (guild) identifier
        tenant: String,
        /// Message to send upstream
        message: String,
    },
}

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Encrypt and store a new API key
    Add { tenant: String, api_key: String },
    /// List stored keys, masked
    List { tenant: String },
    /// Remove a previously stored key
    Remove { tenant: String, api_key: String },
    /// Remove all keys for a tenant
    Clear { tenant: String },
}

#[derive(Subcommand)]
pub enum ChannelCommand {
    /// Set the activation channel
    Set { tenant: String, channel_id: String },
    /// Show the activation channel
    Get { tenant: String },
}

#[derive(Subcommand)]
pub enum PromptCommand {
    /// Set the custom system prompt
    Set { tenant: String, text: String },
    /// Show the custom system prompt
    Get { tenant: String },
}

pub async fn run(command: Command, store: Arc<TenantStore>, dispatcher: Dispatcher) -> Result<()> {
    match command {
        Command::Key(key_command) => run_key(key_command, &store).await,
        Command::Channel(channel_command) => run_channel(channel_command, &store).await,
        Command::Prompt(prompt_command) => run_prompt(prompt_command, &store).await,
        Command::Ask { tenant, message } => {
            let reply = dispatcher
                .dispatch(&tenant, &message)
                .await
                .context("dispatch failed")?;
            println!("{reply}");
            Ok(())
        }
    }
}

async fn run_key(command: KeyCommand, store: &TenantStore) -> Result<()> {
    match command {
        KeyCommand::Add { tenant, api_key } => {
            store
                .add_credential(&tenant, &api_key)
                .await
                .context("failed to store API key")?;
            println!("API key added for tenant {tenant}");
        }
        KeyCommand::List { tenant } => {
            let snapshot = store.credential_snapshot(&tenant).await?;
            if snapshot.is_empty() {
                println!("no API keys configured for tenant {tenant}");
                return Ok(());
            }

            // Decryption for display only; output is always masked
            for (index, entry) in snapshot.iter().enumerate() {
                match entry {
                    Ok(secret) => {
                        println!("{}. {}", index + 1, mask_key(&secret.expose()));
                    }
                    Err(e) => {
                        warn!("credential #{} could not be decrypted: {e}", index + 1);
                        println!("{}. <undecryptable>", index + 1);
                    }
                }
            }
        }
        KeyCommand::Remove { tenant, api_key } => {
            store
                .remove_credential(&tenant, &api_key)
                .await
                .context("failed to remove API key")?;
            println!("API key removed for tenant {tenant}");
        }
        KeyCommand::Clear { tenant } => {
            store
                .clear_credentials(&tenant)
                .await
                .context("failed to clear API keys")?;
            println!("all API keys cleared for tenant {tenant}");
        }
    }
    Ok(())
}

async fn run_channel(command: ChannelCommand, store: &TenantStore) -> Result<()> {
    match command {
        ChannelCommand::Set { tenant, channel_id } => {
            store.set_activation_channel(&tenant, &channel_id).await?;
            println!("activation channel set for tenant {tenant}");
        }
        ChannelCommand::Get { tenant } => {
            let channel = store.activation_channel(&tenant).await?;
            if channel.is_empty() {
                println!("tenant {tenant} is not activated");
            } else {
                println!("{channel}");
            }
        }
    }
    Ok(())
}

async fn run_prompt(command: PromptCommand, store: &TenantStore) -> Result<()> {
    match command {
        PromptCommand::Set { tenant, text } => {
            store.set_instruction_text(&tenant, &text).await?;
            println!("prompt set for tenant {tenant}");
        }
        PromptCommand::Get { tenant } => {
            let text = store.instruction_text(&tenant).await?;
            if text.is_empty() {
                println!("tenant {tenant} uses the default prompt");
            } else {
                println!("{text}");
            }
        }
    }
    Ok(())
}
