use std::ops::Range;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cst_explorer::config::{self, ExplorerSettings, SelectionSettings, TextSettings};
use cst_explorer::document::Document;
use cst_explorer::language::{FiletypeResolver, TreeSitterParser};
use cst_explorer::selection::{MultiRangePolicy, TextSelection};
use cst_explorer::syntax::{NodeDetails, breadcrumbs, describe::node_row, dump_tree};
use cst_explorer::text::{IndexEncoding, TextMapper};
use cst_explorer::{Explorer, ExplorerError, ExplorerResult};
use serde::Serialize;

/// Inspect the concrete syntax tree of a source file
#[derive(Parser)]
#[command(name = "cst-explorer")]
#[command(version)]
#[command(about = "Inspect the concrete syntax tree of a source file alongside its text")]
struct Cli {
    /// Settings file applied on top of the user config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Language of the file (default: detected from the extension)
    #[arg(long, global = true)]
    language: Option<String>,

    /// Index space of selection ranges given on the command line
    #[arg(long, global = true, value_parser = parse_encoding)]
    encoding: Option<IndexEncoding>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every node with its byte range and trivia
    Tree {
        file: PathBuf,

        #[arg(long)]
        json: bool,
    },
    /// Show the deepest node at a byte offset and its ancestor path
    Locate {
        file: PathBuf,

        /// Byte offset into the file
        offset: usize,

        #[arg(long)]
        json: bool,
    },
    /// Run a selection through the synchronizer and print the other side
    Select(SelectArgs),
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Args)]
struct SelectArgs {
    file: PathBuf,

    /// Text selection START..END in native indices; repeat for several ranges
    #[arg(
        long,
        value_parser = parse_range,
        conflicts_with = "node",
        required_unless_present = "node"
    )]
    range: Vec<Range<usize>>,

    /// Tree selection by pre-order node index, as listed by `tree`
    #[arg(long)]
    node: Option<u32>,

    /// Map nodes to their full range, trivia included
    #[arg(long)]
    include_trivia: bool,

    /// How several ranges pick a node
    #[arg(long, value_parser = parse_multi_range)]
    multi_range: Option<MultiRangePolicy>,

    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the default configuration as TOML
    Init,
    /// Print the path of the user configuration file
    Path,
}

fn parse_range(value: &str) -> Result<Range<usize>, String> {
    let (start, end) = value
        .split_once("..")
        .ok_or_else(|| format!("expected START..END, got '{}'", value))?;
    let start: usize = start.trim().parse().map_err(|e| format!("bad start: {}", e))?;
    let end: usize = end.trim().parse().map_err(|e| format!("bad end: {}", e))?;
    if end < start {
        return Err(format!("range end {} is before start {}", end, start));
    }
    Ok(start..end)
}

fn parse_encoding(value: &str) -> Result<IndexEncoding, String> {
    match value {
        "utf-8" | "utf8" => Ok(IndexEncoding::Utf8),
        "utf-16" | "utf16" => Ok(IndexEncoding::Utf16),
        "utf-32" | "utf32" => Ok(IndexEncoding::Utf32),
        other => Err(format!("unknown encoding '{}'", other)),
    }
}

fn parse_multi_range(value: &str) -> Result<MultiRangePolicy, String> {
    match value {
        "first" => Ok(MultiRangePolicy::First),
        "enclosing" => Ok(MultiRangePolicy::Enclosing),
        other => Err(format!("unknown multi-range policy '{}'", other)),
    }
}

#[derive(Serialize)]
struct TreeRow {
    depth: usize,
    #[serde(flatten)]
    node: NodeDetails,
}

#[derive(Serialize)]
struct LocateReport {
    node: NodeDetails,
    path: Vec<String>,
}

#[derive(Serialize)]
struct SelectReport {
    text: Vec<Range<usize>>,
    node: Option<NodeDetails>,
    path: Vec<String>,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> ExplorerResult<()> {
    let settings = config::merge_settings(
        config::load_settings(cli.config.as_deref())?,
        cli_overrides(&cli),
    );
    init_logging(cli.verbose, settings.log_level());
    let language = cli.language.as_deref();

    match cli.command {
        Commands::Tree { ref file, json } => {
            let explorer = open(file, &settings, language)?;
            if json {
                let links = explorer.snapshot().links();
                let rows: Vec<TreeRow> = explorer
                    .snapshot()
                    .tree()
                    .nodes()
                    .map(|node| TreeRow {
                        depth: links.depth(node),
                        node: explorer.details(node),
                    })
                    .collect();
                print_json(&rows)
            } else {
                println!("{}", dump_tree(explorer.snapshot()));
                Ok(())
            }
        }
        Commands::Locate {
            ref file,
            offset,
            json,
        } => {
            let explorer = open(file, &settings, language)?;
            let Some(node) = explorer.locate(offset) else {
                println!("No node at offset {}", offset);
                return Ok(());
            };
            let path = breadcrumbs(explorer.snapshot().links(), node);
            if json {
                print_json(&LocateReport {
                    node: explorer.details(node),
                    path,
                })
            } else {
                println!("{}", node_row(explorer.snapshot(), node));
                println!("{}", path.join(" > "));
                Ok(())
            }
        }
        Commands::Select(ref args) => select(args, &settings, language),
        Commands::Config { command } => match command {
            ConfigCommands::Init => {
                print!("{}", config::default_config_toml()?);
                Ok(())
            }
            ConfigCommands::Path => {
                match config::user_config_path() {
                    Some(path) => println!("{}", path.display()),
                    None => println!("No user configuration directory"),
                }
                Ok(())
            }
        },
    }
}

/// Settings given as command line flags, the top merge layer
fn cli_overrides(cli: &Cli) -> ExplorerSettings {
    let (include_trivia, multi_range) = match &cli.command {
        Commands::Select(args) => (args.include_trivia.then_some(true), args.multi_range),
        _ => (None, None),
    };
    ExplorerSettings {
        text: TextSettings {
            encoding: cli.encoding,
        },
        selection: SelectionSettings {
            include_trivia,
            multi_range,
        },
        ..ExplorerSettings::default()
    }
}

fn init_logging(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn open(
    path: &Path,
    settings: &ExplorerSettings,
    language_flag: Option<&str>,
) -> ExplorerResult<Explorer> {
    let document = Document::open(path)?;
    let resolver = FiletypeResolver::with_mappings(&settings.filetypes);
    // --language, then the file extension, then the configured fallback
    let language = language_flag
        .or_else(|| resolver.language_for_path(path))
        .or(settings.language.as_deref())
        .ok_or_else(|| ExplorerError::language_not_found(path.display().to_string()))?
        .to_string();
    log::info!(target: "cst_explorer::cli", "Parsing {} as {}", path.display(), language);

    let parser = TreeSitterParser::builtin(language)?;
    Explorer::with_settings(Box::new(parser), document, settings)
}

fn select(
    args: &SelectArgs,
    settings: &ExplorerSettings,
    language: Option<&str>,
) -> ExplorerResult<()> {
    let mut explorer = open(&args.file, settings, language)?;

    match args.node {
        Some(index) => {
            let node = explorer.snapshot().tree().node(index).ok_or_else(|| {
                ExplorerError::internal(format!(
                    "no node with index {} ({} nodes)",
                    index,
                    explorer.snapshot().tree().len()
                ))
            })?;
            let id = explorer.id(node);
            explorer.tree_selection_changed(Some(id));
        }
        None => {
            explorer.text_selection_changed(TextSelection::new(args.range.clone()));
        }
    }

    let text: Vec<Range<usize>> = explorer.text_selection().ranges().to_vec();
    let node = explorer.selected_node();
    let path = node
        .map(|node| breadcrumbs(explorer.snapshot().links(), node))
        .unwrap_or_default();

    if args.json {
        return print_json(&SelectReport {
            text,
            node: node.map(|node| explorer.details(node)),
            path,
        });
    }

    let mapper = TextMapper::new(explorer.snapshot().source(), explorer.encoding());
    for range in &text {
        let selected = mapper
            .range_to_bytes(range.clone())
            .and_then(|bytes| explorer.snapshot().source().get(bytes))
            .unwrap_or_default();
        println!("text {}..{} {:?}", range.start, range.end, selected);
    }
    match node {
        Some(node) => {
            println!("node #{} {}", node.index(), node_row(explorer.snapshot(), node));
            println!("{}", path.join(" > "));
        }
        None => println!("node none"),
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> ExplorerResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| ExplorerError::internal(format!("failed to serialize output: {}", e)))?;
    println!("{}", json);
    Ok(())
}
