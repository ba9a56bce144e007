//! Side-by-side dump of one event from one or two captures.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use cscfed_core::compare::dump_words;
use cscfed_core::stream::Event;
use cscfed_core::types::{SequenceId, Word};

use crate::input::{self, InputFormat};
use crate::output;

#[derive(Args)]
pub struct DumpArgs {
    /// Left capture
    a: PathBuf,

    /// Right capture
    b: Option<PathBuf>,

    /// Event position in each capture
    #[arg(short, long, default_value_t = 0, conflicts_with = "l1a")]
    event: usize,

    /// Pick the event by L1A number instead of position
    #[arg(long)]
    l1a: Option<SequenceId>,

    /// Layout of the left capture
    #[arg(long, value_enum, default_value = "raw")]
    format_a: InputFormat,

    /// Layout of the right capture
    #[arg(long, value_enum, default_value = "raw")]
    format_b: InputFormat,
}

pub fn execute(args: DumpArgs) -> Result<()> {
    let a = select(&args.a, args.format_a, args.event, args.l1a)?;
    let b = match &args.b {
        Some(path) => select(path, args.format_b, args.event, args.l1a)?,
        None => Vec::new(),
    };
    output::print_dump(&dump_words(&a, &b));
    Ok(())
}

fn select(path: &Path, format: InputFormat, index: usize, l1a: Option<SequenceId>) -> Result<Vec<Word>> {
    let found = match (format, l1a) {
        (InputFormat::Raw, Some(id)) => input::open_scanner(path)?
            .next_event(Some(id))
            .with_context(|| format!("reading {}", path.display()))?
            .map(Event::into_words),
        (_, Some(id)) => input::load_events(path, format)?
            .into_iter()
            .find(|e| e.sequence_id() == Some(id))
            .map(Event::into_words),
        (_, None) => input::word_source(path, format)?
            .nth(index)
            .transpose()
            .with_context(|| format!("reading {}", path.display()))?,
    };
    match found {
        Some(words) => Ok(words),
        None => match l1a {
            Some(id) => bail!("no event with L1A {id} in {}", path.display()),
            None => bail!("{} has no event {index}", path.display()),
        },
    }
}
