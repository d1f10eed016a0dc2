use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::Colorize;

use innomine::config::Config;
use innomine::output::{markdown, terminal, ReportData};
use innomine::pipeline;
use innomine::reddit::client::RedditClient;
use innomine::reddit::source::RedditSource;
use innomine::topics::traits::NmfTopicModeler;

/// Innomine: find recurring developer pain points on Reddit.
///
/// Collects recent posts from programming subreddits, labels and ranks the
/// ones that describe problems, then groups them into topics and clusters.
#[derive(Parser)]
#[command(name = "innomine", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recent, relevant posts from the configured subreddits
    Collect,

    /// Clean collected posts and label problem posts
    Label,

    /// Rank posts by problem signals and engagement
    Rank {
        /// Rows in the ranked summary (default: 15)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Fit topics over the labeled posts
    Topics {
        /// Number of topics (default: 10)
        #[arg(long)]
        topics: Option<usize>,

        /// Keywords shown per topic (default: 10)
        #[arg(long)]
        top_words: Option<usize>,
    },

    /// Cluster the labeled posts and compute a 2D layout
    Cluster {
        /// Number of clusters (default: 5)
        #[arg(long)]
        clusters: Option<usize>,
    },

    /// Run every stage in order
    Run {
        /// Reuse data/raw_data.json instead of fetching
        #[arg(long)]
        skip_collect: bool,
    },

    /// Show ranked problems, topics and clusters
    Report {
        /// Only list posts from this topic id
        #[arg(long)]
        topic: Option<usize>,

        /// Don't write the markdown report
        #[arg(long)]
        no_markdown: bool,
    },

    /// Show corpus statistics from the labeled posts
    Insights {
        /// Show the monthly trend of this topic id instead of the busiest
        #[arg(long)]
        topic: Option<usize>,
    },

    /// Show which stage outputs exist
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("innomine=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;

    match cli.command {
        Commands::Collect => {
            config.ensure_dirs()?;
            collect(&config).await?;
        }

        Commands::Label => {
            config.ensure_dirs()?;
            let labeler = pipeline::label::default_labeler(&config.settings);
            pipeline::label::run(&config.paths, &labeler)?;
        }

        Commands::Rank { top } => {
            config.ensure_dirs()?;
            if let Some(top) = top {
                config.settings.top_n = top;
            }
            pipeline::rank::run(&config.paths, &config.settings)?;
        }

        Commands::Topics { topics, top_words } => {
            config.ensure_dirs()?;
            if let Some(topics) = topics {
                config.settings.n_topics = topics;
            }
            if let Some(top_words) = top_words {
                config.settings.n_top_words = top_words;
            }
            run_topics(&config)?;
        }

        Commands::Cluster { clusters } => {
            config.ensure_dirs()?;
            if let Some(clusters) = clusters {
                config.settings.n_clusters = clusters;
            }
            pipeline::cluster::run(&config.paths, &config.settings)?;
        }

        Commands::Run { skip_collect } => {
            config.ensure_dirs()?;
            if !skip_collect {
                collect(&config).await?;
            }

            println!("\n{}", "Labeling...".bold());
            let labeler = pipeline::label::default_labeler(&config.settings);
            pipeline::label::run(&config.paths, &labeler)?;

            println!("\n{}", "Ranking...".bold());
            pipeline::rank::run(&config.paths, &config.settings)?;

            println!("\n{}", "Modeling topics...".bold());
            run_topics(&config)?;

            println!("\n{}", "Clustering...".bold());
            pipeline::cluster::run(&config.paths, &config.settings)?;

            println!("\n{}", "Pipeline complete.".bold());
            println!("Run `innomine report` to see the results.");
        }

        Commands::Report { topic, no_markdown } => {
            let mut data = ReportData::load(&config.paths);
            if let Some(topic) = topic {
                data.focus_topic(topic);
            }

            terminal::display_trending_topics(&data.topics);
            terminal::display_ranked(&data.ranked);
            terminal::display_topic_posts(&data, topic);
            terminal::display_topic_chart(&data.topics);
            terminal::display_clusters(&data.clusters);

            if !no_markdown {
                config.ensure_dirs()?;
                let path = config.paths.report();
                markdown::write_report(&path, &data, topic, Utc::now())?;
                println!("\nReport written to {}", path.display());
            }
        }

        Commands::Insights { topic } => {
            let mut data = ReportData::load(&config.paths);
            if let Some(topic) = topic {
                data.focus_topic(topic);
            }
            match &data.insights {
                Some(insights) => terminal::display_insights(insights),
                None => println!("No labeled posts yet. Run `innomine label` first."),
            }
        }

        Commands::Status => {
            innomine::status::show(&config.paths)?;
        }
    }

    Ok(())
}

async fn collect(config: &Config) -> Result<()> {
    let client = RedditClient::from_config(config).await?;
    if !client.is_authenticated() {
        println!(
            "{}",
            "No REDDIT_CLIENT_ID/REDDIT_CLIENT_SECRET set; using public listings.".dimmed()
        );
    }
    let source = RedditSource::new(client);
    pipeline::collect::run(&source, &config.settings, &config.paths, Utc::now()).await?;
    Ok(())
}

fn run_topics(config: &Config) -> Result<()> {
    let modeler = NmfTopicModeler::new(
        config.settings.n_topics,
        config.settings.n_top_words,
        config.settings.seed,
    );
    pipeline::topics::run(&config.paths, &modeler)?;
    Ok(())
}
