//! Command-line interface for the `job-recommender` binary.
//!
//! Artifact locations and defaults come from the environment (see
//! [`crate::config::Config`]); flags only override per-invocation options.

use crate::catalog::SKILL_PREVIEW_LEN;
use crate::recommend::{Recommendation, RecommendOptions};
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::net::SocketAddr;

/// Recommend jobs from a fixed catalog for a resume or skill list.
#[derive(Debug, Parser)]
#[command(name = "job-recommender", version, about, long_about = None)]
#[command(after_help = ENV_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the best matching jobs for a resume text.
    Recommend {
        /// Resume or skills text. Read from stdin when omitted.
        text: Vec<String>,

        /// Maximum number of jobs to return.
        #[arg(long, short = 'k')]
        top_k: Option<usize>,

        /// Minimum cosine similarity, in [-1, 1].
        #[arg(long, short = 't', allow_negative_numbers = true)]
        threshold: Option<f32>,

        /// Output machine-readable JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API.
    Serve {
        /// Listen address (overrides SERVE_ADDR).
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
}

const ENV_HELP: &str = "\
Environment (defaults shown):
  ARTIFACTS_DIR=./trained_model
  JOBS_CSV_PATH=<ARTIFACTS_DIR>/jobs_embedded.csv
  JOB_EMBEDDINGS_PATH=<ARTIFACTS_DIR>/job_embeddings.npy
  EMBEDDINGS_BACKEND=fastembed|hash     (default: fastembed)
  EMBEDDINGS_MODEL_DIR=<ARTIFACTS_DIR>/sbert_job_model
  EMBEDDINGS_DEVICE=cpu|metal           (default: cpu)
  EMBEDDINGS_MAX_LENGTH=256
  HASH_EMBEDDING_DIM=384
  TOP_K=5
  SIMILARITY_THRESHOLD=0.3
  SERVE_ADDR=127.0.0.1:8787
  LOG_DIR=/path/to/logs                 (default: log to stderr)
  RUST_LOG=info";

/// Apply per-invocation flag overrides on top of configured defaults.
pub fn merge_options(
    defaults: RecommendOptions,
    top_k: Option<usize>,
    threshold: Option<f32>,
) -> RecommendOptions {
    RecommendOptions {
        top_k: top_k.unwrap_or(defaults.top_k),
        similarity_threshold: threshold.unwrap_or(defaults.similarity_threshold),
    }
}

/// Human-readable listing, one block per job.
pub fn format_recommendations(results: &[Recommendation]) -> String {
    if results.is_empty() {
        return "No closely matching jobs found.\n".to_string();
    }

    let mut out = String::new();
    for (i, rec) in results.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. {} at {} (score {:.2}, {})",
            i + 1,
            rec.job.title,
            rec.job.company,
            rec.similarity,
            strength_label(rec)
        );
        let _ = writeln!(out, "   Location: {}", rec.job.location);
        let skills = rec.job.skill_preview();
        if !skills.is_empty() {
            let more = rec.job.skill_list().len().saturating_sub(SKILL_PREVIEW_LEN);
            let suffix = if more > 0 {
                format!(" (+{more} more)")
            } else {
                String::new()
            };
            let _ = writeln!(out, "   Skills: {}{}", skills.join(", "), suffix);
        }
    }
    out
}

fn strength_label(rec: &Recommendation) -> &'static str {
    use crate::recommend::MatchStrength;
    match rec.strength {
        MatchStrength::Strong => "strong match",
        MatchStrength::Moderate => "moderate match",
        MatchStrength::Weak => "weak match",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::JobRecord;
    use crate::recommend::MatchStrength;
    use clap::CommandFactory;

    fn rec(title: &str, skills: &str, similarity: f32) -> Recommendation {
        Recommendation {
            job: JobRecord {
                title: title.to_string(),
                company: "Acme".to_string(),
                location: "NYC".to_string(),
                skills: skills.to_string(),
            },
            similarity,
            strength: MatchStrength::from_score(similarity),
        }
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_recommend_with_overrides() {
        let cli = Cli::try_parse_from([
            "job-recommender",
            "recommend",
            "--top-k",
            "3",
            "--threshold",
            "-0.1",
            "--json",
            "python",
            "pytorch",
        ])
        .unwrap();
        match cli.command {
            Command::Recommend {
                text,
                top_k,
                threshold,
                json,
            } => {
                assert_eq!(text, vec!["python", "pytorch"]);
                assert_eq!(top_k, Some(3));
                assert_eq!(threshold, Some(-0.1));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_serve_addr() {
        let cli = Cli::try_parse_from(["job-recommender", "serve", "--addr", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Command::Serve { addr } => assert_eq!(addr, Some("0.0.0.0:9000".parse().unwrap())),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn merge_prefers_flags() {
        let merged = merge_options(RecommendOptions::default(), Some(10), None);
        assert_eq!(merged.top_k, 10);
        assert!((merged.similarity_threshold - 0.3).abs() < f32::EPSILON);
    }

    #[test]
    fn formats_listing_with_skill_preview() {
        let text = format_recommendations(&[
            rec("ML Engineer", "python,pytorch,sql,aws,docker,k8s,spark", 0.81),
            rec("Data Analyst", "", 0.42),
        ]);
        assert!(text.contains("1. ML Engineer at Acme (score 0.81, strong match)"));
        assert!(text.contains("Skills: python, pytorch, sql, aws, docker (+2 more)"));
        assert!(text.contains("2. Data Analyst at Acme (score 0.42, weak match)"));
        assert_eq!(text.matches("Skills:").count(), 1);
    }

    #[test]
    fn formats_empty_result() {
        assert_eq!(
            format_recommendations(&[]),
            "No closely matching jobs found.\n"
        );
    }
}
