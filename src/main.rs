use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use graphbin_vis::config::{
    parse_delimiter, ImageFormat, InputFiles, OutputFiles, RenderConfig,
};
use graphbin_vis::export::{describe_node, InteractiveGraph, NodeFilter, Snapshot};
use graphbin_vis::layout::{FruchtermanReingold, Layout};
use graphbin_vis::render::{save_scene, Scene};
use graphbin_vis::transitions::{BinTransitions, TransitionOptions};
use graphbin_vis::{Annotations, AssemblyGraph, ContigNumber};

#[derive(Parser, Debug)]
#[command(name = "graphbin-vis")]
#[command(about = "Draw and export SPAdes contig graphs coloured by binning results.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbosity level (0 = error, 1 = info, 2 = debug).
    #[arg(short = 'v', long = "verbose", value_name = "N", default_value_t = 1, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draw the contig graph twice, coloured by the initial and by the
    /// final binning result.
    Plot(PlotArgs),
    /// Write the annotated graph as JSON for interactive viewing.
    Export(ExportArgs),
    /// Write how many contigs moved between each pair of bins.
    Transitions(TransitionArgs),
    /// Print a summary of one contig.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Assembly graph file (assembly_graph_with_scaffolds.gfa).
    #[arg(long = "graph", value_name = "FILE")]
    graph: PathBuf,

    /// Contig paths file (contigs.paths).
    #[arg(long = "paths", value_name = "FILE")]
    paths: PathBuf,

    /// Contig sequences (contigs.fasta), for lengths, GC content and coverage.
    #[arg(long = "contigs", value_name = "FILE")]
    contigs: Option<PathBuf>,

    /// Initial binning result.
    #[arg(long = "initial", value_name = "FILE")]
    initial: PathBuf,

    /// Final binning result.
    #[arg(long = "final", value_name = "FILE")]
    final_bins: PathBuf,

    /// Column delimiter of the binning files (a character, or tab, comma, space, semicolon).
    #[arg(long = "delimiter", value_name = "CHAR", default_value = ",")]
    delimiter: String,
}

impl InputArgs {
    fn to_inputs(&self) -> Result<InputFiles> {
        Ok(InputFiles {
            graph: self.graph.clone(),
            paths: self.paths.clone(),
            contigs: self.contigs.clone(),
            initial: self.initial.clone(),
            final_bins: self.final_bins.clone(),
            delimiter: parse_delimiter(&self.delimiter)?,
        })
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output directory.
    #[arg(short = 'o', long = "output", value_name = "DIR", default_value = ".")]
    output: PathBuf,

    /// Prefix of every output file name.
    #[arg(long = "prefix", value_name = "STRING", default_value = "")]
    prefix: String,
}

impl OutputArgs {
    fn files(&self) -> Result<OutputFiles> {
        std::fs::create_dir_all(&self.output)
            .with_context(|| format!("Could not create output directory {:?}", self.output))?;
        Ok(OutputFiles::new(&self.output, &self.prefix))
    }
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Iterations of the force-directed layout.
    #[arg(long = "iterations", value_name = "N", default_value_t = 500)]
    iterations: usize,

    /// Seed of the initial node placement.
    #[arg(long = "seed", value_name = "N", default_value_t = 1_234_567)]
    seed: u64,
}

impl LayoutArgs {
    fn layout(&self) -> FruchtermanReingold {
        FruchtermanReingold::new(self.iterations, self.seed)
    }
}

#[derive(Args, Debug)]
struct PlotArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    /// Image resolution.
    #[arg(long = "dpi", value_name = "N", default_value_t = 300)]
    dpi: u32,

    /// Image width in pixels.
    #[arg(long = "width", value_name = "N", default_value_t = 2000)]
    width: u32,

    /// Image height in pixels.
    #[arg(long = "height", value_name = "N", default_value_t = 2000)]
    height: u32,

    /// Node size in points.
    #[arg(long = "vsize", value_name = "PT", default_value_t = 12.0)]
    vsize: f64,

    /// Label size in points.
    #[arg(long = "lsize", value_name = "PT", default_value_t = 8.0)]
    lsize: f64,

    /// Margin around the drawing in pixels.
    #[arg(long = "margin", value_name = "N", default_value_t = 10)]
    margin: u32,

    /// Image type: png, jpg or svg.
    #[arg(long = "imgtype", value_name = "TYPE", default_value = "png")]
    imgtype: String,
}

impl PlotArgs {
    fn render_config(&self) -> Result<RenderConfig> {
        Ok(RenderConfig {
            width: self.width,
            height: self.height,
            dpi: self.dpi,
            vertex_size: self.vsize,
            label_size: self.lsize,
            margin: self.margin,
            format: self.imgtype.parse::<ImageFormat>()?,
        })
    }
}

#[derive(Args, Debug)]
struct FilterArgs {
    /// Snapshot the bin filters look at: initial or final.
    #[arg(long = "snapshot", value_name = "MODE", default_value = "final")]
    snapshot: String,

    /// Keep only contigs in this bin.
    #[arg(long = "bin", value_name = "LABEL")]
    bin: Option<String>,

    /// Drop contigs without a bin.
    #[arg(long = "hide-unbinned")]
    hide_unbinned: bool,

    /// Keep only contigs whose bin changed.
    #[arg(long = "only-changed")]
    only_changed: bool,

    /// Keep only contigs within --hops edges of this contig number.
    #[arg(long = "focus", value_name = "N")]
    focus: Option<u64>,

    /// Neighbourhood radius for --focus.
    #[arg(long = "hops", value_name = "K", default_value_t = 1)]
    hops: usize,

    /// Drop tips and isolated contigs (degree 0 or 1).
    #[arg(long = "collapse-tips")]
    collapse_tips: bool,
}

fn parse_snapshot(s: &str) -> Result<Snapshot> {
    match s {
        "initial" => Ok(Snapshot::Initial),
        "final" => Ok(Snapshot::Final),
        other => anyhow::bail!("Unknown snapshot `{}` (use initial or final)", other),
    }
}

impl FilterArgs {
    fn filter(&self) -> Result<NodeFilter> {
        Ok(NodeFilter {
            snapshot: parse_snapshot(&self.snapshot)?,
            bin: self.bin.clone(),
            hide_unbinned: self.hide_unbinned,
            only_changed: self.only_changed,
            k_hop: self.focus.map(|n| (ContigNumber(n), self.hops)),
            collapse_tips: self.collapse_tips,
        })
    }
}

#[derive(Args, Debug)]
struct ExportArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    layout: LayoutArgs,

    #[command(flatten)]
    filter: FilterArgs,

    /// JSON output file, instead of <output>/<prefix>interactive_graph.json.
    #[arg(long = "json", value_name = "FILE")]
    json: Option<PathBuf>,

    /// Also save the node index to contig number mapping as JSON.
    #[arg(long = "save-index", value_name = "FILE")]
    save_index: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TransitionArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    output: OutputArgs,

    /// Count only contigs whose bin changed.
    #[arg(long = "only-changed")]
    only_changed: bool,

    /// Leave out pairs where either side is unbinned.
    #[arg(long = "hide-unbinned")]
    hide_unbinned: bool,
}

#[derive(Args, Debug)]
struct InspectArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Contig number, as in NODE_<N>.
    #[arg(long = "contig", value_name = "N")]
    contig: u64,

    /// Snapshot used for the neighbour bins: initial or final.
    #[arg(long = "snapshot", value_name = "MODE", default_value = "final")]
    snapshot: String,
}

fn load(input: &InputArgs) -> Result<(AssemblyGraph, Annotations)> {
    let inputs = input.to_inputs()?;
    let assembly = AssemblyGraph::load(&inputs.graph, &inputs.paths)
        .context("Could not reconstruct the contig graph")?;
    let ann = Annotations::resolve(&assembly, &inputs)
        .context("Could not read the binning results")?;
    Ok((assembly, ann))
}

fn plot(args: &PlotArgs) -> Result<()> {
    let config = args.render_config()?;
    let files = args.output.files()?;
    let (assembly, ann) = load(&args.input)?;

    info!("Computing layout of {} nodes", assembly.node_count());
    let coords = args.layout.layout().layout(&assembly.graph);

    let initial = Scene::new(&assembly, &ann, &coords, Snapshot::Initial)?;
    save_scene(&initial, &config, files.initial_image(config.format))?;

    let final_scene = Scene::new(&assembly, &ann, &coords, Snapshot::Final)?;
    save_scene(&final_scene, &config, files.final_image(config.format))?;
    Ok(())
}

fn export(args: &ExportArgs) -> Result<()> {
    let filter = args.filter.filter()?;
    let files = args.output.files()?;
    let (assembly, ann) = load(&args.input)?;

    info!("Computing layout of {} nodes", assembly.node_count());
    let coords = args.layout.layout().layout(&assembly.graph);

    let graph = InteractiveGraph::build_filtered(&assembly, &ann, &coords, &filter)?;
    let path = args.json.clone().unwrap_or_else(|| files.json());
    graph.save_json(&path)?;

    if let Some(index_path) = &args.save_index {
        assembly
            .index()
            .save_json(index_path)
            .with_context(|| format!("Could not save the node index to {:?}", index_path))?;
        info!("Saved node index to {:?}", index_path);
    }
    Ok(())
}

fn transitions(args: &TransitionArgs) -> Result<()> {
    let files = args.output.files()?;
    let (assembly, ann) = load(&args.input)?;

    let opts = TransitionOptions {
        only_changed: args.only_changed,
        hide_unbinned: args.hide_unbinned,
    };
    let table = BinTransitions::compute(
        &ann.initial,
        &ann.final_bins,
        assembly.node_count(),
        opts,
    );

    let path = files.transitions();
    let file = File::create(&path).with_context(|| format!("Could not create {:?}", path))?;
    let mut writer = BufWriter::new(file);
    table.write_tsv(&mut writer)?;
    writer.flush()?;
    info!(
        "Wrote {} bin pairs covering {} contigs to {:?}",
        table.transitions.len(),
        table.total(),
        path
    );
    Ok(())
}

fn inspect(args: &InspectArgs) -> Result<()> {
    let snapshot = parse_snapshot(&args.snapshot)?;
    let (assembly, ann) = load(&args.input)?;
    let text = describe_node(&assembly, &ann, ContigNumber(args.contig), snapshot)?;
    print!("{}", text);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .init();

    match &cli.command {
        Command::Plot(args) => plot(args),
        Command::Export(args) => export(args),
        Command::Transitions(args) => transitions(args),
        Command::Inspect(args) => inspect(args),
    }
}
