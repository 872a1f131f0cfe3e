use clap::Parser;

use medguard::{run, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "medguard")]
#[command(about = "Terminal dashboard for a dental-procedure compliance service")]
#[command(version)]
struct Args {
    /// Compliance-service base URL (falls back to MEDGUARD_API_URL, then localhost)
    #[arg(long)]
    api_url: Option<String>,

    /// Run with the built-in demo data set (no backend required)
    #[arg(long, short)]
    demo: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    run(RunOptions {
        api_url: args.api_url,
        demo: args.demo,
    })
}
