//! testflow config - Show or edit configuration

use std::path::Path;

use clap::Args;

use crate::app::AppContext;
use crate::cli::output::{emit_json, robot_ok};
use crate::config::Config;
use crate::error::{FlowError, Result};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Dotted key to read or write, e.g. flow.default_catalog
    pub key: Option<String>,

    /// Value to set (written to the project config file)
    pub value: Option<String>,

    /// Remove the key from the project config file
    #[arg(long)]
    pub unset: bool,
}

pub fn run(ctx: &AppContext, args: &ConfigArgs) -> Result<()> {
    let Some(key) = args.key.as_deref() else {
        return emit_config(ctx);
    };

    if args.unset {
        if args.value.is_some() {
            return Err(FlowError::Config(
                "cannot use --unset with a value".to_string(),
            ));
        }
        edit_doc(&ctx.config_path, |doc| unset_path(doc, key))?;
        return emit_edit(ctx, key, None);
    }

    match args.value.as_deref() {
        Some(raw) => {
            let value = parse_value(raw);
            edit_doc(&ctx.config_path, |doc| set_path(doc, key, value.clone()))?;
            emit_edit(ctx, key, Some(&value))
        }
        None => get_key(ctx, key),
    }
}

fn emit_edit(ctx: &AppContext, key: &str, value: Option<&toml::Value>) -> Result<()> {
    if ctx.robot_mode {
        return emit_json(&robot_ok(serde_json::json!({
            "key": key,
            "value": value,
            "path": ctx.config_path,
        })));
    }
    match value {
        Some(value) => println!("{key} = {} ({})", format_value(value), ctx.config_path.display()),
        None => println!("unset {key} ({})", ctx.config_path.display()),
    }
    Ok(())
}

fn emit_config(ctx: &AppContext) -> Result<()> {
    if ctx.robot_mode {
        return emit_json(&robot_ok(&ctx.config));
    }

    let rendered = toml::to_string_pretty(&ctx.config)
        .map_err(|err| FlowError::Config(format!("render config: {err}")))?;
    println!("{rendered}");
    Ok(())
}

fn get_key(ctx: &AppContext, key: &str) -> Result<()> {
    let value = config_value_at(&ctx.config, key)?;
    if ctx.robot_mode {
        return emit_json(&robot_ok(&value));
    }
    println!("{}", format_value(&value));
    Ok(())
}

/// Apply an edit to the TOML file and make sure the result still loads.
fn edit_doc(path: &Path, edit: impl FnOnce(&mut toml::Value) -> Result<()>) -> Result<()> {
    let mut doc = load_config_doc(path)?;
    edit(&mut doc)?;
    let rendered = toml::to_string_pretty(&doc)
        .map_err(|err| FlowError::Config(format!("render config: {err}")))?;
    Config::validate_file_contents(&rendered)
        .map_err(|err| FlowError::Config(format!("edit would make config invalid: {err}")))?;
    crate::storage::write_atomic(path, &rendered)
}

fn load_config_doc(path: &Path) -> Result<toml::Value> {
    if !path.exists() {
        return Ok(toml::Value::Table(toml::map::Map::new()));
    }
    let raw = std::fs::read_to_string(path)
        .map_err(|err| FlowError::Config(format!("read config: {err}")))?;
    toml::from_str(&raw).map_err(|err| FlowError::Config(format!("parse config: {err}")))
}

/// TOML literal if it parses as one, otherwise a string.
fn parse_value(raw: &str) -> toml::Value {
    let direct = format!("value = {raw}");
    toml::from_str::<toml::Table>(&direct)
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| toml::Value::String(raw.to_string()))
}

fn config_value_at(config: &Config, key: &str) -> Result<toml::Value> {
    let doc = toml::Value::try_from(config)
        .map_err(|err| FlowError::Config(format!("serialize config: {err}")))?;
    let mut current = &doc;
    for part in key.split('.') {
        current = current
            .get(part)
            .ok_or_else(|| FlowError::Config(format!("unknown key: {key}")))?;
    }
    Ok(current.clone())
}

fn split_key(key: &str) -> Result<(Vec<&str>, &str)> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let last = parts
        .pop()
        .filter(|part| !part.is_empty())
        .ok_or_else(|| FlowError::Config("empty key".to_string()))?;
    Ok((parts, last))
}

fn set_path(doc: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let (parents, last) = split_key(key)?;
    let mut current = doc;
    for part in parents {
        let table = current
            .as_table_mut()
            .ok_or_else(|| FlowError::Config(format!("{key}: parent is not a table")))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
    current
        .as_table_mut()
        .ok_or_else(|| FlowError::Config(format!("{key}: parent is not a table")))?
        .insert(last.to_string(), value);
    Ok(())
}

fn unset_path(doc: &mut toml::Value, key: &str) -> Result<()> {
    let (parents, last) = split_key(key)?;
    let mut current = doc;
    for part in parents {
        current = match current.get_mut(part) {
            Some(next) => next,
            None => return Ok(()),
        };
    }
    if let Some(table) = current.as_table_mut() {
        table.remove(last);
    }
    Ok(())
}

fn format_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
