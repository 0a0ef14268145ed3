use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use spam_labeler::server::{self, ServerConfig};
use spam_labeler::{Labeler, LabelerConfig, LearnerConfig, Link, Loss};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LossArg {
    Logistic,
    Squared,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LinkArg {
    Logistic,
    Identity,
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding train_docs.json and test_docs.txt
    #[arg(long, env = "SPAM_LABELER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Model snapshot; created if it does not exist
    #[arg(long, env = "SPAM_LABELER_MODEL")]
    model: Option<PathBuf>,

    /// Label store snapshot; created if it does not exist
    #[arg(long, env = "SPAM_LABELER_LABELS")]
    labels: Option<PathBuf>,

    #[arg(long, env = "SPAM_LABELER_HOST", default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, env = "SPAM_LABELER_PORT", default_value_t = 4000)]
    port: u16,

    /// Front-end build to serve at /
    #[arg(long, env = "SPAM_LABELER_STATIC_DIR")]
    static_dir: Option<PathBuf>,

    /// Learning passes allowed per label before giving up (0 = no limit)
    #[arg(long, default_value_t = spam_labeler::config::DEFAULT_MAX_PASSES)]
    max_passes: usize,

    #[arg(long, value_enum, default_value_t = LossArg::Logistic)]
    loss: LossArg,

    #[arg(long, value_enum, default_value_t = LinkArg::Logistic)]
    link: LinkArg,

    #[arg(long, default_value_t = 0.0)]
    l2: f32,

    #[arg(long, default_value_t = 0.5)]
    learning_rate: f32,

    /// Size of the weight table as a power of two
    #[arg(long, default_value_t = 18)]
    bits: u8,

    #[arg(long, default_value_t = 11399)]
    seed: u64,
}

impl Args {
    fn labeler_config(&self) -> LabelerConfig {
        LabelerConfig {
            data_dir: self
                .data_dir
                .clone()
                .unwrap_or_else(LabelerConfig::default_data_dir),
            model_path: self.model.clone(),
            labels_path: self.labels.clone(),
            learner: LearnerConfig {
                loss: match self.loss {
                    LossArg::Logistic => Loss::Logistic,
                    LossArg::Squared => Loss::Squared,
                },
                link: match self.link {
                    LinkArg::Logistic => Link::Logistic,
                    LinkArg::Identity => Link::Identity,
                },
                l2: self.l2,
                learning_rate: self.learning_rate,
                bits: self.bits,
                seed: self.seed,
            },
            max_passes: NonZeroUsize::new(self.max_passes),
        }
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.host.clone(),
            port: self.port,
            static_dir: self.static_dir.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    spam_labeler::init_logger();
    let args = Args::parse();

    info!("=== Starting Spam Labeler ===");
    let start_time = Instant::now();

    let config = args.labeler_config();
    info!("Data directory: {:?}", config.data_dir);
    info!("Model snapshot: {:?}", config.model_path());
    info!("Label store: {:?}", config.labels_path());

    let labeler = Labeler::open(&config).context("failed to open the labeler")?;
    let (count_ham, count_spam) = labeler.counts();
    info!(
        "Ready with {} emails, {} ham and {} spam labels (took {:.2?})",
        labeler.corpus().len(),
        count_ham,
        count_spam,
        start_time.elapsed()
    );

    server::serve(Arc::new(labeler), args.server_config())
        .await
        .context("server failed")?;
    Ok(())
}
