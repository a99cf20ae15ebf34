//! stwtag - STW subject indexing CLI
//!
//! Two batch entry points and two interactive helpers:
//!
//! ```bash
//! # train on a gold-labeled corpus, evaluate on a test corpus
//! stwtag train-eval --train train.csv --test test.csv --out predicted.csv \
//!     --model-dir models/ --thesaurus stw.nt --score
//!
//! # load a persisted model and apply it
//! stwtag apply --model models/train.csv.model --test test.csv --out predicted.csv
//!
//! # annotate JSON records ({"id", "content"} array, stdin or file)
//! stwtag annotate < records.json
//!
//! # service metadata
//! stwtag about
//! ```
//!
//! The thesaurus location falls back to the `STW_PTH` / `STW_DIR`
//! environment variables when `--thesaurus` is not given.

use std::fs;
use std::io::{BufWriter, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use stwtag::{
    batch, serve, thesaurus, Annotator, DictEngine, MatchingEngine, ReportOptions, StemmerKind,
    Thesaurus, TrainOptions,
};

/// Showcase titles from the original experiments; used by `apply --example`.
const EXAMPLE_TITLES: &[&str] = &[
    "German multinationals and ethics : a case panel study",
    "Germany and its European partners : political crisis and banking",
    "Crustacea : increasing prices",
    "fishery : an emerging market?",
    "what do fishers do when the cod has gone",
    "The Norwegian winter herring fishery : a story of technological progress and stock collapse",
];

#[derive(Parser)]
#[command(name = "stwtag")]
#[command(author, version, about = "Short-text subject indexing against the STW thesaurus")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on a gold-labeled corpus, then evaluate on a test corpus
    TrainEval(TrainEvalArgs),
    /// Load a persisted model and apply it to a test corpus
    Apply(ApplyArgs),
    /// Annotate JSON records from stdin or a file
    Annotate(AnnotateArgs),
    /// Print the service about document
    About(ThesaurusArg),
}

#[derive(clap::Args)]
struct ThesaurusArg {
    /// Thesaurus N-Triples file (default: $STW_PTH or $STW_DIR/stw.nt)
    #[arg(long, short = 'v')]
    thesaurus: Option<PathBuf>,
}

#[derive(clap::Args)]
struct SharedEvalArgs {
    /// Test corpus (tab-separated .csv)
    #[arg(long)]
    test: Option<PathBuf>,

    /// Predictions output file
    #[arg(long)]
    out: Option<PathBuf>,

    /// Test corpus has no gold column (docid<TAB>content pairs)
    #[arg(long)]
    pairs: bool,

    /// Include the probability score column in the report
    #[arg(long)]
    score: bool,

    /// Include the label text column in the report
    #[arg(long, short = 'a')]
    additional_info: bool,

    /// Ranked topics requested per document
    #[arg(long, default_value_t = batch::DEFAULT_TOPIC_LIMIT)]
    limit: usize,
}

#[derive(clap::Args)]
struct TrainEvalArgs {
    /// Training corpus (tab-separated .csv, gold column required)
    #[arg(long)]
    train: PathBuf,

    /// Directory for the persisted model artifact; omit to skip persistence
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Stemmer name (see `--help` for registered names)
    #[arg(long, default_value = "english")]
    stemmer: String,

    #[command(flatten)]
    eval: SharedEvalArgs,

    #[command(flatten)]
    thesaurus: ThesaurusArg,
}

#[derive(clap::Args)]
struct ApplyArgs {
    /// Persisted model artifact
    #[arg(long, short = 'm')]
    model: PathBuf,

    /// Run the showcase titles instead of a test corpus
    #[arg(long)]
    example: bool,

    #[command(flatten)]
    eval: SharedEvalArgs,

    #[command(flatten)]
    thesaurus: ThesaurusArg,
}

#[derive(clap::Args)]
struct AnnotateArgs {
    /// JSON input file; stdin when omitted
    #[arg(long)]
    input: Option<PathBuf>,

    #[command(flatten)]
    thesaurus: ThesaurusArg,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> stwtag::Result<()> {
    match cli.command {
        Commands::TrainEval(args) => train_eval(args),
        Commands::Apply(args) => apply(args),
        Commands::Annotate(args) => annotate(args),
        Commands::About(args) => {
            let stw = load_thesaurus(&args)?;
            let about = serde_json::to_string_pretty(&serve::about(&stw))
                .map_err(|e| stwtag::Error::config(e.to_string()))?;
            println!("{about}");
            println!("{}", serve::version_string());
            Ok(())
        }
    }
}

fn load_thesaurus(args: &ThesaurusArg) -> stwtag::Result<Thesaurus> {
    let path = thesaurus::stw_location(args.thesaurus.as_deref())?;
    Thesaurus::from_ntriples(&path)
}

fn train_eval(args: TrainEvalArgs) -> stwtag::Result<()> {
    let stw = load_thesaurus(&args.thesaurus)?;
    let options = TrainOptions {
        stemmer: StemmerKind::from_name(&args.stemmer)?,
        ..TrainOptions::default()
    };
    let mut engine = DictEngine::new(&stw, options.clone())?;

    // model file named after the training corpus, as the original did
    let model_path = args.model_dir.as_ref().map(|dir| {
        let name = args
            .train
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "train".to_string());
        dir.join(format!("{name}.model"))
    });

    let trained = batch::train(
        &mut engine,
        &stw,
        &args.train,
        model_path.as_deref(),
        &options,
    )?;
    log::info!("trained on {trained} documents");

    run_evaluation(&engine, &stw, &args.eval)
}

fn apply(args: ApplyArgs) -> stwtag::Result<()> {
    let stw = load_thesaurus(&args.thesaurus)?;
    let mut engine = DictEngine::new(&stw, TrainOptions::default())?;
    engine.load_model(&args.model)?;

    if args.example {
        for title in EXAMPLE_TITLES {
            println!("{title}");
            let doc = stwtag::Document::new("example", *title);
            for topic in engine.rank_topics(&doc, args.eval.limit)? {
                println!(">> {} ({:.3})", topic.label, topic.probability);
            }
        }
        return Ok(());
    }

    run_evaluation(&engine, &stw, &args.eval)
}

fn run_evaluation(
    engine: &dyn MatchingEngine,
    stw: &Thesaurus,
    args: &SharedEvalArgs,
) -> stwtag::Result<()> {
    let test = args
        .test
        .as_deref()
        .ok_or_else(|| stwtag::Error::config("missing --test corpus"))?;
    let out = args
        .out
        .as_deref()
        .ok_or_else(|| stwtag::Error::config("missing --out predictions file"))?;
    let evaluation = batch::evaluate(engine, stw, test, args.pairs, args.limit)?;
    let file = fs::File::create(out)?;
    let mut sink = BufWriter::new(file);
    let options = ReportOptions {
        include_score: args.score,
        additional_info: args.additional_info,
    };
    stwtag::write_topics_csv(&mut sink, &evaluation.predictions, &options)?;
    let report = &evaluation.report;
    println!(
        "precision {:.4}  recall {:.4}  f-measure {:.4}  ({} documents, {} evaluated)",
        report.precision,
        report.recall,
        report.f_measure,
        report.document_count,
        report.evaluated_count
    );
    Ok(())
}

fn annotate(args: AnnotateArgs) -> stwtag::Result<()> {
    let stw = load_thesaurus(&args.thesaurus)?;
    let engine = DictEngine::new(&stw, TrainOptions::default())?;
    let annotator = Annotator::new(&stw, &engine);

    let body = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let out = serve::process_json(&annotator, &body)?;
    println!("{out}");
    Ok(())
}
