use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deckview")]
#[command(author, version, about)]
#[command(long_about = "A desktop player for slide-deck course presentations.\n\n\
    Decks are JSON parameter files: slides, positioned content elements,\n\
    keywords and behaviour overrides.\n\n\
    Examples:\n  \
    deckview deck.json               Play a deck (fullscreen)\n  \
    deckview deck.json --windowed    Play in a window\n  \
    deckview --state progress.json   Run the demo deck, resumable\n  \
    deckview                         Run the built-in demo deck")]
pub struct Cli {
    /// Deck parameter file (JSON). Runs the built-in demo deck when omitted.
    pub file: Option<PathBuf>,

    /// Launch in a window instead of fullscreen
    #[arg(long)]
    pub windowed: bool,

    /// Start on a specific slide (1-indexed)
    #[arg(long)]
    pub slide: Option<usize>,

    /// Authoring mode: placeholder menu titles, no summary scoring
    #[arg(long)]
    pub editor: bool,

    /// Resume-state file, loaded at start and written with Ctrl+S
    #[arg(long)]
    pub state: Option<PathBuf>,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let json = match &self.file {
            Some(file) => {
                if !file.exists() {
                    anyhow::bail!("File not found: {}", file.display());
                }
                std::fs::read_to_string(file)?
            }
            None => crate::demo::DEMO_DECK.to_string(),
        };
        let params = coursedeck::DeckParameters::from_json(&json)?;
        crate::app::run(params, self)
    }
}
