use clap::Parser;
use console::style;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{format_bytes, format_duration};

use vid_gif::{convert, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let verbosity = cli.verbosity();

    let _ = init_logging("vid_gif", LogConfig::default().with_verbosity(verbosity));

    let options = cli.into_options()?;
    let result = convert(&options)?;

    if !verbosity.is_quiet() {
        println!(
            "{} {} → {}",
            style("✅").green(),
            options.input.display(),
            style(result.output.display()).cyan().bold()
        );
        let mut details = vec![
            format_bytes(result.output_size),
            format_duration(result.elapsed),
        ];
        if let Some(crop) = &result.crop {
            details.push(crop.to_string());
        }
        if let Some(track) = &result.subtitles {
            details.push(format!("subtitles #{} ({})", track.index, track.codec));
        }
        println!("   {}", style(details.join(" • ")).dim());
    }

    Ok(())
}
