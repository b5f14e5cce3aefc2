//! Subcommand handlers
//!
//! Dataset commands go through the store, which sits on the throttled REST
//! client. Spec commands are pure text-in/text-out and never touch the network.

use anyhow::{Context, Result};
use clap::ArgMatches;
use datavis_client::{ClientConfig, RestDatasetClient, ThrottledDatasetApi};
use datavis_dataset::{csv, field_options, DatasetDraft, DatasetSummary, Filename, PostId};
use datavis_spec::{bind_option, chart_type, render_block, renderer_spec, ChartSpec, ChartType};
use datavis_store::DatasetStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn path_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing argument <{name}>"))
}

fn str_arg<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a str> {
    args.get_one::<String>(name)
        .map(String::as_str)
        .with_context(|| format!("missing argument <{name}>"))
}

fn pretty(value: &impl serde::Serialize) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode JSON")
}

/// Resolve client configuration from an optional file plus environment
pub(crate) fn load_config(path: Option<&PathBuf>) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::load(path)?,
        None => {
            let config = ClientConfig::default().with_env_overrides();
            config.validate()?;
            config
        }
    };
    tracing::debug!("Using dataset collection {}", config.collection_url());
    Ok(config)
}

/// `datavis datasets ...`
pub(crate) async fn datasets(config: ClientConfig, args: &ArgMatches) -> Result<String> {
    let window = config.throttle_window();
    let rest = Arc::new(RestDatasetClient::new(config)?);
    let api = Arc::new(ThrottledDatasetApi::new(rest.clone(), window));

    let Some((name, sub)) = args.subcommand() else {
        anyhow::bail!("missing datasets subcommand");
    };
    let post = PostId::new(*sub.get_one::<u64>("post").context("missing --post")?)?;
    let store = DatasetStore::new(post, api);

    match name {
        "list" => {
            let summaries = store.refresh().await?;
            Ok(format_summaries(&summaries))
        }
        "get" => {
            let filename = Filename::new(str_arg(sub, "filename")?)?;
            if sub.get_flag("csv") {
                Ok(rest.fetch_csv(post, &filename).await?)
            } else {
                pretty(&store.load_dataset(&filename).await?)
            }
        }
        "put" => {
            let content = read(path_arg(sub, "file")?)?;
            let draft = match sub.get_one::<String>("filename") {
                Some(filename) => DatasetDraft::new(filename.as_str(), content)?,
                None => DatasetDraft::for_filename(Filename::default_name(), content)?,
            };
            let saved = store.create_dataset(&draft).await?;
            pretty(&saved.summary())
        }
        "delete" => {
            let filename = Filename::new(str_arg(sub, "filename")?)?;
            let deleted = store.delete_dataset(&filename).await?;
            Ok(if deleted {
                format!("deleted {filename}")
            } else {
                format!("{filename} was not present")
            })
        }
        other => anyhow::bail!("unknown datasets subcommand '{other}'"),
    }
}

/// `datavis spec ...`
pub(crate) fn spec(args: &ArgMatches) -> Result<String> {
    let Some((name, sub)) = args.subcommand() else {
        anyhow::bail!("missing spec subcommand");
    };

    match name {
        "transform" => transform(&read(path_arg(sub, "spec")?)?, str_arg(sub, "to")?),
        "type" => detect(&read(path_arg(sub, "spec")?)?),
        "fields" => fields(&read(path_arg(sub, "csv")?)?),
        "bind" => bind(
            &read(path_arg(sub, "spec")?)?,
            str_arg(sub, "channel")?,
            str_arg(sub, "field")?,
            &read(path_arg(sub, "data")?)?,
        ),
        "render" => {
            let rows = match sub.get_one::<PathBuf>("data") {
                Some(path) => Some(read(path)?),
                None => None,
            };
            render(
                &read(path_arg(sub, "spec")?)?,
                rows.as_deref(),
                sub.get_flag("renderer"),
            )
        }
        other => anyhow::bail!("unknown spec subcommand '{other}'"),
    }
}

pub(crate) fn transform(spec_text: &str, to: &str) -> Result<String> {
    let spec = ChartSpec::from_json_str(spec_text)?;
    let mode: ChartType = to.parse()?;
    pretty(&mode.transform(&spec))
}

pub(crate) fn detect(spec_text: &str) -> Result<String> {
    let spec = ChartSpec::from_json_str(spec_text)?;
    Ok(chart_type(&spec).map_or("error", ChartType::value).to_string())
}

pub(crate) fn fields(csv_text: &str) -> Result<String> {
    pretty(&field_options(csv_text))
}

pub(crate) fn bind(spec_text: &str, channel: &str, field: &str, csv_text: &str) -> Result<String> {
    let spec = ChartSpec::from_json_str(spec_text)?;
    let options = field_options(csv_text);
    pretty(&bind_option(&spec, channel, field, &options)?)
}

pub(crate) fn render(spec_text: &str, csv_text: Option<&str>, renderer: bool) -> Result<String> {
    let spec = ChartSpec::from_json_str(spec_text)?;
    let rows = csv_text.map(csv::parse);
    if renderer {
        pretty(&renderer_spec(&spec, rows.as_deref()))
    } else {
        let attribute: Value = match rows {
            Some(rows) => renderer_spec(&spec, Some(&rows)),
            None => spec.into_value(),
        };
        Ok(render_block(Some(&attribute)))
    }
}

fn format_summaries(summaries: &[DatasetSummary]) -> String {
    if summaries.is_empty() {
        return "no datasets".to_string();
    }
    let width = summaries
        .iter()
        .map(|s| s.filename.as_str().len())
        .max()
        .unwrap_or(0);
    summaries
        .iter()
        .map(|s| format!("{:<width$}  {:>6}  {}", s.filename, s.rows, s.url))
        .collect::<Vec<_>>()
        .join("\n")
}
