//! Tree art provider.
//!
//! The renderer asks for a preformatted text block per tier. A file-based
//! source reads `p1.txt` .. `p9.txt` from an art directory (one file per
//! tier, youngest first) and degrades to a placeholder line when a file is
//! missing or unreadable -- art can never fail the session.

use std::path::PathBuf;

use crate::growth::Tier;

pub trait ArtSource: Send {
    /// Preformatted block for the tier. Must always return something
    /// renderable.
    fn art(&self, tier: Tier) -> String;
}

/// Reads tier art from numbered files in a directory, with the built-in
/// blocks as fallback.
pub struct FileArtSource {
    dir: PathBuf,
}

impl FileArtSource {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }
}

impl ArtSource for FileArtSource {
    fn art(&self, tier: Tier) -> String {
        let file = self.dir.join(format!("p{}.txt", tier.index() + 1));
        match std::fs::read_to_string(&file) {
            Ok(block) if !block.trim().is_empty() => block,
            _ => BuiltinArtSource.art(tier),
        }
    }
}

/// The embedded art set, so a bare install renders without resource files.
pub struct BuiltinArtSource;

impl ArtSource for BuiltinArtSource {
    fn art(&self, tier: Tier) -> String {
        let block = match tier {
            Tier::Sprout => concat!("  ,  \n", " \\|/ \n", "  |  \n"),
            Tier::Seedling => concat!("  \\/ \n", " \\|/ \n", "  |  \n", " _|_ \n"),
            Tier::Sapling => concat!(
                "  \\ /  \n",
                " \\\\|// \n",
                "   |   \n",
                "   |   \n",
                " __|__ \n"
            ),
            Tier::Young => concat!(
                "  .oOo.  \n",
                " \\\\|//  \n",
                "   |/    \n",
                "   |     \n",
                " __|__   \n"
            ),
            Tier::Grown => concat!(
                "   .oOOo.   \n",
                "  oOO|OOo   \n",
                "  \\\\\\|///  \n",
                "     |/     \n",
                "    _|_     \n",
                " ___/|\\___ \n"
            ),
            Tier::Mature => concat!(
                "    .oOOOo.    \n",
                "  .oOOOOOOOo.  \n",
                "  oOO\\|/OOo    \n",
                "     \\|/       \n",
                "      |        \n",
                "     /|\\      \n",
                " ____/|\\____  \n"
            ),
            Tier::Elder => concat!(
                "    .oOOOOOo.    \n",
                "  .oOOOOOOOOOo.  \n",
                "  oOOOO\\|/OOOo   \n",
                "    \\\\ \\|/ //   \n",
                "       \\|/       \n",
                "        |        \n",
                "       /|\\      \n",
                " _____/ | \\____ \n"
            ),
            Tier::Venerable => concat!(
                "   .oOOOOOOOo.    \n",
                " .oOOOOOOOOOOOo.  \n",
                " oOOOOO\\|/OOOOo   \n",
                "   \\\\\\ \\|/ ///  \n",
                "       \\|/        \n",
                "        |         \n",
                "       /|\\       \n",
                "      //|\\\\     \n",
                " ____/ /|\\ \\___ \n"
            ),
            Tier::Ancient => concat!(
                "    .oOOOOOOOOOo.    \n",
                " .oOOOOOOOOOOOOOOOo. \n",
                " oOOOOOOO\\|/OOOOOOo  \n",
                "   \\\\\\\\ \\\\|// //// \n",
                "        \\\\|//        \n",
                "         \\|/         \n",
                "          |          \n",
                "         /|\\        \n",
                "       // | \\\\     \n",
                " _____/ / | \\ \\___ \n"
            ),
        };
        block.to_string()
    }
}
