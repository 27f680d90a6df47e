use linkmap_layout::{
    Canvas, ForceOptions, GraphEdge, GraphNode, LayoutEngine, LayoutStats, NodeDegree,
    RadiusRange, Repulsion, SimNode, degrees, max_degree, node_radius,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::{Read, Write};
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Caller metadata (title, orphan/hub flags, ...) carried through untouched.
type Meta = Map<String, Value>;

/// Keys the output records write next to the flattened metadata.
const RESERVED_KEYS: [&str; 7] = ["x", "y", "vx", "vy", "in_degree", "out_degree", "radius"];

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(&'static str),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Layout(#[from] linkmap_layout::Error),
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Degrees,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    config: Option<String>,
    width: f64,
    height: f64,
    iterations: Option<usize>,
    barnes_hut: Option<f64>,
    pretty: bool,
    out: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphInput {
    #[serde(default)]
    nodes: Vec<GraphNode<Meta>>,
    #[serde(default, alias = "links")]
    edges: Vec<GraphEdge>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    force: ForceOptions,
    radius: RadiusRange,
}

#[derive(Serialize)]
struct LayoutNodeOut<'a> {
    #[serde(flatten)]
    node: &'a SimNode<Meta>,
    #[serde(flatten)]
    degree: NodeDegree,
    radius: f64,
}

#[derive(Serialize)]
struct LayoutOut<'a> {
    width: f64,
    height: f64,
    nodes: Vec<LayoutNodeOut<'a>>,
    stats: LayoutStats,
}

#[derive(Serialize)]
struct DegreeNodeOut<'a> {
    #[serde(flatten)]
    node: &'a GraphNode<Meta>,
    #[serde(flatten)]
    degree: NodeDegree,
    radius: f64,
}

#[derive(Serialize)]
struct DegreesOut<'a> {
    max_degree: usize,
    nodes: Vec<DegreeNodeOut<'a>>,
}

fn usage() -> &'static str {
    "linkmap-cli\n\
\n\
USAGE:\n\
  linkmap-cli [layout] [--width <w>] [--height <h>] [--config <path>] [--iterations <n>] [--barnes-hut <theta>] [--pretty] [--out <path>] [<path>|-]\n\
  linkmap-cli degrees [--config <path>] [--pretty] [--out <path>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', the graph JSON is read from stdin.\n\
  - Input: {\"nodes\": [{\"id\": ...}], \"edges\": [{\"source\": ..., \"target\": ...}]} ('links' is accepted for 'edges').\n\
  - --config reads {\"force\": {...}, \"radius\": {...}}; flags override the file.\n\
  - The canvas defaults to 800x600.\n\
  - Set RUST_LOG (e.g. RUST_LOG=debug) for diagnostics on stderr.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        command: Command::Layout,
        width: 800.0,
        height: 600.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "degrees" => args.command = Command::Degrees,
            "--pretty" => args.pretty = true,
            "--width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--height" => {
                let Some(h) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.height = h.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
            }
            "--iterations" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.iterations = Some(n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--barnes-hut" => {
                let Some(theta) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.barnes_hut =
                    Some(theta.parse::<f64>().map_err(|_| CliError::Usage(usage()))?);
            }
            "--config" => {
                let Some(path) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.config = Some(path.clone());
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            "-" => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some("-".to_string());
            }
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_config(path: Option<&str>) -> Result<ConfigFile, CliError> {
    let Some(path) = path else {
        return Ok(ConfigFile::default());
    };
    let text = std::fs::read_to_string(path)?;
    let config: ConfigFile = serde_json::from_str(&text)?;
    debug!(path, ?config, "loaded layout config");
    Ok(config)
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let mut bytes = if pretty {
        serde_json::to_vec_pretty(value)?
    } else {
        serde_json::to_vec(value)?
    };
    bytes.push(b'\n');
    match out {
        None => std::io::stdout().lock().write_all(&bytes)?,
        Some(path) => std::fs::write(path, &bytes)?,
    }
    Ok(())
}

fn warn_on_duplicate_ids(nodes: &[GraphNode<Meta>]) {
    let mut seen: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for n in nodes {
        if !seen.insert(n.id.as_str()) {
            warn!(id = %n.id, "duplicate node id; edges bind to its first occurrence");
        }
    }
}

fn strip_reserved_keys(nodes: &mut [GraphNode<Meta>]) {
    for n in nodes {
        for key in RESERVED_KEYS {
            if n.data.remove(key).is_some() {
                warn!(id = %n.id, key, "dropping node metadata that collides with an output field");
            }
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;
    config.radius.validate()?;

    let mut force = config.force;
    if let Some(n) = args.iterations {
        force.iterations = n;
    }
    if let Some(theta) = args.barnes_hut {
        force.repulsion = Repulsion::BarnesHut { theta };
    }

    let text = read_input(args.input.as_deref())?;
    let mut graph: GraphInput = serde_json::from_str(&text)?;
    info!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        "loaded link graph"
    );
    warn_on_duplicate_ids(&graph.nodes);
    strip_reserved_keys(&mut graph.nodes);

    let node_degrees = degrees(&graph.nodes, &graph.edges);
    let max = max_degree(&node_degrees);

    match args.command {
        Command::Layout => {
            let engine = LayoutEngine::new(force)?;
            let canvas = Canvas::try_new(args.width, args.height)?;
            let result = engine.run(&graph.nodes, &graph.edges, canvas);
            let nodes = result
                .nodes
                .iter()
                .zip(&node_degrees)
                .map(|(node, &degree)| LayoutNodeOut {
                    node,
                    degree,
                    radius: node_radius(degree, max, &config.radius),
                })
                .collect();
            write_json(
                &LayoutOut {
                    width: canvas.width,
                    height: canvas.height,
                    nodes,
                    stats: result.stats,
                },
                args.pretty,
                args.out.as_deref(),
            )
        }
        Command::Degrees => {
            let nodes = graph
                .nodes
                .iter()
                .zip(&node_degrees)
                .map(|(node, &degree)| DegreeNodeOut {
                    node,
                    degree,
                    radius: node_radius(degree, max, &config.radius),
                })
                .collect();
            write_json(
                &DegreesOut {
                    max_degree: max,
                    nodes,
                },
                args.pretty,
                args.out.as_deref(),
            )
        }
    }
}

fn main() {
    init_tracing();

    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
