use anyhow::Result;
use clap::Parser;
use reportmap::cli::{Cli, Commands};

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            path,
            format,
            output,
            report_subdir,
            report_suffix,
            patterns,
            jobs,
            no_parallel,
        } => {
            let mut config = reportmap::config::load_config(&path);
            if let Some(subdir) = report_subdir {
                config.report_subdir = subdir;
            }
            if let Some(suffix) = report_suffix {
                config.report_suffix = suffix;
            }
            if let Some(patterns) = patterns {
                config.file_patterns = patterns;
            }
            if jobs > 0 {
                config.jobs = jobs;
            }

            let parallel = !no_parallel;
            if parallel {
                configure_thread_pool(config.jobs)?;
            }

            let results = reportmap::pipeline::run(&path, &config, parallel)?;

            let mut writer = reportmap::create_writer(format.into(), output)?;
            writer.write_results(&results)?;
            Ok(())
        }
    }
}

fn configure_thread_pool(jobs: usize) -> Result<()> {
    if jobs > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()?;
    }
    Ok(())
}
