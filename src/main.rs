// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::error::Error;
use std::path::{Path, PathBuf};

use clap::{crate_version, Parser, Subcommand};
use cliptrack::audio::decibels::format_decibels;
use cliptrack::audio::render::WavDevice;
use cliptrack::config::{Project, SourceKind};
use cliptrack::project::ProjectGraph;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A clip-based multitrack renderer."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Renders a project to a 32-bit float WAV file.
    Render {
        /// The path to the project file.
        project_path: String,
        /// The path of the WAV file to write.
        output_path: String,
        /// The timeline position to start rendering from, in samples.
        #[arg[short, long]]
        start: Option<i64>,
        /// The number of samples to render. Defaults to the project duration.
        #[arg[short, long]]
        duration: Option<i64>,
    },
    /// Prints the tracks and clips of a project.
    Inspect {
        /// The path to the project file.
        project_path: String,
    },
    /// Writes an example project to the given path.
    Template {
        /// Where to write the project.
        path: String,
    },
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            project_path,
            output_path,
            start,
            duration,
        } => {
            let project = Project::deserialize(Path::new(&project_path))?;
            let graph = ProjectGraph::build(&project)?;

            let (start, duration) = graph.render_span(start, duration)?;

            let device = WavDevice::new(
                PathBuf::from(&output_path),
                project.sample_rate(),
                project.channels(),
                project.buffer_size(),
            );
            graph.render(&device, start, duration)?;
            println!("Rendered {} samples to {}.", duration, output_path);
        }
        Commands::Inspect { project_path } => {
            let project = Project::deserialize(Path::new(&project_path))?;
            let graph = ProjectGraph::build(&project)?;

            println!(
                "Project {} ({}Hz, {} channels, {} samples per block)",
                project.name(),
                project.sample_rate(),
                project.channels(),
                project.buffer_size()
            );
            println!(
                "Gain: {}, pan: {}, duration: {} samples",
                format_decibels(project.gain_db(), 1),
                project.pan(),
                graph.duration()
            );
            if let Some(range) = project.loop_range() {
                println!("Loop: {}..{}", range.start, range.end);
            }

            println!("\nTracks (count: {}):", project.tracks().len());
            for (track, node) in project.tracks().iter().zip(graph.tracks()) {
                let mut flags = String::new();
                if track.solo() {
                    flags.push_str(" [solo]");
                }
                if track.mute() {
                    flags.push_str(" [mute]");
                }
                println!(
                    "- {} (gain {}, pan {}){}: {} clips, ends at {}",
                    track.name(),
                    format_decibels(track.gain_db(), 1),
                    track.pan(),
                    flags,
                    node.clips().len(),
                    node.clips().effective_length()
                );

                for clip in track.clips() {
                    let content = match clip.source() {
                        SourceKind::Sine => format!(
                            "sine {}Hz at {}",
                            clip.frequency(),
                            format_decibels(clip.amplitude_db(), 1)
                        ),
                        SourceKind::Silence => clip.source().to_string(),
                    };
                    println!(
                        "  - {}..{} from {}: {}",
                        clip.position(),
                        clip.position() + clip.length(),
                        clip.start(),
                        content
                    );
                }
            }
        }
        Commands::Template { path } => {
            let path = PathBuf::from(path);
            if path.exists() {
                return Err(format!("{} already exists", path.display()).into());
            }
            Project::example().save(&path)?;
            println!("Wrote an example project to {}.", path.display());
        }
    }

    Ok(())
}
