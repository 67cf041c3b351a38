//! Component query CLI - resolve components declared in a manifest
//!
//! Loads a registry manifest, then answers one query against it.
//!
//! Usage:
//!     component-query --manifest pets.json filter Animal
//!     component-query --manifest pets.json require Feeder --context Dog --name morning
//!     component-query --manifest pets.json --json describe

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use component_core::cache::CacheStats;
use component_core::{
    ComponentError, ComponentRegistry, Query, RegistryConfig, RegistryManifest, Resolved,
    TypeTable,
};

#[derive(Parser, Debug)]
#[command(name = "component-query")]
#[command(about = "Resolve components from a registry manifest")]
#[command(version)]
struct Args {
    /// Path to a registry manifest (JSON)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// The single matching component, if any
    Query(QueryArgs),
    /// The single matching component; absence is an error
    Require(QueryArgs),
    /// Every matching component
    Filter(QueryArgs),
    /// Summarize the loaded registry
    Describe,
}

#[derive(clap::Args, Debug)]
struct QueryArgs {
    /// Identity to resolve (a declared type or a plain name)
    identity: String,

    /// Context type, repeatable; order matters
    #[arg(short, long = "context")]
    context: Vec<String>,

    /// Registration name
    #[arg(short, long, default_value = "")]
    name: String,
}

#[derive(Debug, Serialize)]
struct JsonMatch {
    component: String,
    name: String,
}

impl JsonMatch {
    fn new(resolved: &Resolved, name: &str) -> Self {
        Self {
            component: resolved.label().to_string(),
            name: name.to_string(),
        }
    }
}

#[derive(Serialize)]
struct JsonDescription {
    backend: &'static str,
    types: Vec<JsonType>,
    cache: Option<CacheStats>,
}

#[derive(Serialize)]
struct JsonType {
    name: String,
    ancestors: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "component_core=debug"
    } else {
        "component_core=warn"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if args.json {
                match serde_json::to_string_pretty(&err.to_error_response()) {
                    Ok(json) => println!("{}", json),
                    Err(_) => eprintln!("Error: {}", err),
                }
            } else {
                eprintln!("Error: {}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), ComponentError> {
    let registry = ComponentRegistry::with_config(&RegistryConfig::from_env()?)?;
    let types = match &args.manifest {
        Some(path) => RegistryManifest::load(path)?.apply(&registry)?,
        None => TypeTable::default(),
    };

    match &args.command {
        Command::Query(query_args) => {
            let found = registry.query_one(&build_query(&types, query_args))?;
            print_matches(args.json, &single_match(found.as_ref(), query_args))
        }
        Command::Require(query_args) => {
            let found = registry.require_one(&build_query(&types, query_args))?;
            print_matches(args.json, &single_match(Some(&found), query_args))
        }
        Command::Filter(query_args) => {
            let found = registry.filter_all(&build_query(&types, query_args))?;
            let matches = found
                .iter()
                .map(|e| JsonMatch::new(&e.resolved, &e.name))
                .collect::<Vec<_>>();
            print_matches(args.json, &matches)
        }
        Command::Describe => describe(args.json, &registry, &types),
    }
}

fn build_query(types: &TypeTable, args: &QueryArgs) -> Query {
    Query::new(types.resolve(&args.identity))
        .context(args.context.iter().map(|name| types.resolve(name)))
        .named(args.name.as_str())
}

/// Exact-key lookups report the name they were asked for
fn single_match(found: Option<&Resolved>, args: &QueryArgs) -> Vec<JsonMatch> {
    found
        .map(|resolved| JsonMatch::new(resolved, &args.name))
        .into_iter()
        .collect()
}

fn print_matches(json: bool, matches: &[JsonMatch]) -> Result<(), ComponentError> {
    if json {
        println!("{}", serde_json::to_string_pretty(matches)?);
        return Ok(());
    }

    if matches.is_empty() {
        println!("(no match)");
    }
    for m in matches {
        if m.name.is_empty() {
            println!("{}", m.component);
        } else {
            println!("{} (name: {})", m.component, m.name);
        }
    }
    Ok(())
}

fn describe(
    json: bool,
    registry: &ComponentRegistry,
    types: &TypeTable,
) -> Result<(), ComponentError> {
    let description = JsonDescription {
        backend: registry.backend_name(),
        types: types
            .iter()
            .map(|ty| JsonType {
                name: ty.name().to_string(),
                ancestors: ty.ancestor_names(),
            })
            .collect(),
        cache: registry.cache_stats(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&description)?);
        return Ok(());
    }

    println!("Backend: {}", description.backend);
    println!("Types: {}", description.types.len());
    for ty in &description.types {
        println!("  {}", ty.ancestors.join(" -> "));
    }
    if let Some(stats) = &description.cache {
        println!("Cache: {} entries", stats.entries);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_core::Component;

    fn args(name: &str) -> QueryArgs {
        QueryArgs {
            identity: "Feeder".to_string(),
            context: vec!["Dog".to_string()],
            name: name.to_string(),
        }
    }

    #[test]
    fn test_single_match_reports_requested_name() {
        let found = Resolved::Component(Component::opaque("feed_dog"));
        let rows = single_match(Some(&found), &args("morning"));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].component, "feed_dog");
        assert_eq!(rows[0].name, "morning");
    }

    #[test]
    fn test_single_match_without_result() {
        assert!(single_match(None, &args("morning")).is_empty());
    }

    #[test]
    fn test_query_args_parse() {
        let parsed = Args::try_parse_from([
            "component-query",
            "query",
            "Feeder",
            "--context",
            "Dog",
            "--name",
            "morning",
        ])
        .unwrap();
        match parsed.command {
            Command::Query(query) => {
                assert_eq!(query.context, vec!["Dog"]);
                assert_eq!(query.name, "morning");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
